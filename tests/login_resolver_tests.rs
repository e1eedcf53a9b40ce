use dataroom::auth::{LoginError, LoginRequest, get_or_create_session};
use dataroom::billing::Billing;
use dataroom::db::{SESSION_TTL_MS, Storage, now_ms};

async fn scratch_store(dir: &tempfile::TempDir) -> Storage {
    let db_path = dir.path().join("test.sqlite");
    let url = format!("sqlite:{}", db_path.display());
    dataroom::db::connect(&url).await.expect("connect scratch db")
}

fn billing() -> Billing {
    Billing::disabled(reqwest::Client::new())
}

#[tokio::test]
async fn unknown_access_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;

    let err = get_or_create_session(&store, &billing(), LoginRequest::token("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::InvalidAccessToken));
    assert_eq!(
        err.to_string(),
        "Failed to login user. Invalid access token."
    );
}

#[tokio::test]
async fn partial_oauth_tuple_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;

    let request = LoginRequest {
        oauth_id: Some("g1".to_string()),
        name: Some("A".to_string()),
        email: None,
        access_token: None,
    };
    let err = get_or_create_session(&store, &billing(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::MissingOauthFields));
}

#[tokio::test]
async fn email_off_the_allow_list_is_denied_even_for_existing_users() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;

    // first login with the email allow-listed
    store.add_allowed_email("a@x.com").await.unwrap();
    get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
        .await
        .unwrap();

    // allow-list entry removed: the same, existing user is now denied
    let ids: Vec<String> = store
        .allowed_emails()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    store.remove_allowed_emails(&ids).await.unwrap();

    let err = get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::AccountDenied));
    assert_eq!(err.to_string(), "Account denied. Please request access.");
}

#[tokio::test]
async fn first_oauth_login_creates_one_user_and_one_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    store.add_allowed_email("a@x.com").await.unwrap();

    let before = store.users().await.unwrap().len();
    let session =
        get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
            .await
            .unwrap();

    let users = store.users().await.unwrap();
    assert_eq!(users.len(), before + 1);
    let user = users
        .iter()
        .find(|u| u.oauth_id.as_deref() == Some("g1"))
        .unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(Some(session.token.as_str()), user.access_token.as_deref());
    // without billing configured no customer is provisioned
    assert!(user.stripe_customer_id.is_none());

    let expected = now_ms() + SESSION_TTL_MS;
    assert!((session.expires_at - expected).abs() < 5_000);
}

#[tokio::test]
async fn oauth_relogin_invalidates_the_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    store.add_allowed_email("a@x.com").await.unwrap();

    let first =
        get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
            .await
            .unwrap();
    let second =
        get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
            .await
            .unwrap();

    assert_ne!(first.id, second.id);
    assert!(store.get_session(&first.id).await.unwrap().is_none());
    assert!(store.validate_session(&second.id).await.unwrap());
}

#[tokio::test]
async fn token_login_reuses_the_existing_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = scratch_store(&dir).await;
    store.add_allowed_email("a@x.com").await.unwrap();

    let session =
        get_or_create_session(&store, &billing(), LoginRequest::oauth("g1", "A", "a@x.com"))
            .await
            .unwrap();

    let again = get_or_create_session(
        &store,
        &billing(),
        LoginRequest::token(session.token.clone()),
    )
    .await
    .unwrap();
    assert_eq!(again.id, session.id);
}
