use dataroom::db::{SESSION_TTL_MS, Storage, UserRole, now_ms};

async fn scratch_store(dir: &tempfile::TempDir) -> Storage {
    let db_path = dir.path().join("test.sqlite");
    let url = format!("sqlite:{}", db_path.display());
    dataroom::db::connect(&url).await.expect("connect scratch db")
}

#[tokio::test]
async fn validate_is_true_iff_present_and_unexpired() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let user = store
        .create_user("A", "a@x.com", "g1", UserRole::User, None)
        .await
        .unwrap();
    let token = user.access_token.as_deref().unwrap();

    let live = store
        .create_session(&user.id, token, now_ms() + SESSION_TTL_MS)
        .await
        .unwrap();
    assert!(store.validate_session(&live.id).await.unwrap());
    assert!(!store.validate_session("no-such-session").await.unwrap());
}

#[tokio::test]
async fn expired_session_is_reported_absent_but_not_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let user = store
        .create_user("A", "a@x.com", "g1", UserRole::User, None)
        .await
        .unwrap();

    let expired = store
        .create_session(&user.id, "tok", now_ms() - 1_000)
        .await
        .unwrap();

    assert!(store.get_session(&expired.id).await.unwrap().is_none());
    assert!(!store.validate_session(&expired.id).await.unwrap());
    // the row itself is still there: the cleanup gap is intentional
    let row = store.session_by_user(&user.id).await.unwrap();
    assert_eq!(row.map(|s| s.id), Some(expired.id));
}

#[tokio::test]
async fn refresh_extends_only_existing_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let user = store
        .create_user("A", "a@x.com", "g1", UserRole::User, None)
        .await
        .unwrap();

    assert!(store.refresh_session(&user.id).await.unwrap().is_none());

    let old = store
        .create_session(&user.id, "tok", now_ms() + 1_000)
        .await
        .unwrap();
    let refreshed = store.refresh_session(&user.id).await.unwrap().unwrap();
    assert_eq!(refreshed.id, old.id);
    assert!(refreshed.expires_at >= old.expires_at);

    // roughly now + 24h
    let expected = now_ms() + SESSION_TTL_MS;
    assert!((refreshed.expires_at - expected).abs() < 5_000);
}

#[tokio::test]
async fn session_deletion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    let user = store
        .create_user("A", "a@x.com", "g1", UserRole::User, None)
        .await
        .unwrap();
    let session = store
        .create_session(&user.id, "tok", now_ms() + SESSION_TTL_MS)
        .await
        .unwrap();

    store.delete_session(&session.id).await.unwrap();
    store.delete_session(&session.id).await.unwrap();
    store.delete_sessions_for_user(&user.id).await.unwrap();
    assert!(store.get_session(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn bootstrap_seeds_admin_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;

    store.bootstrap("Admin", "admin@example.com").await.unwrap();
    store.bootstrap("Admin", "admin@example.com").await.unwrap();

    assert!(store.is_email_allowed("admin@example.com").await.unwrap());
    let admins: Vec<_> = store
        .users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email.as_deref() == Some("admin@example.com"))
        .collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].role, UserRole::Admin);
    assert!(admins[0].access_token.is_some());
}

#[tokio::test]
async fn allow_list_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;

    assert!(!store.is_email_allowed("a@x.com").await.unwrap());
    let entry = store.add_allowed_email("a@x.com").await.unwrap();
    assert!(store.is_email_allowed("a@x.com").await.unwrap());

    store.remove_allowed_emails(&[entry.id]).await.unwrap();
    assert!(!store.is_email_allowed("a@x.com").await.unwrap());
}
