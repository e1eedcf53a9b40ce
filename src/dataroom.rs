//! Filesystem "dataroom": one directory per project, uploaded files at the
//! top level, generated result files under `<project>/results/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::DataroomError;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub files: Vec<String>,
}

#[derive(Clone)]
pub struct Dataroom {
    root: PathBuf,
}

impl Dataroom {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every project directory with its result-file listing.
    pub fn list_projects(&self) -> Result<Vec<ProjectEntry>, DataroomError> {
        let mut projects = Vec::new();
        if !self.root.is_dir() {
            return Ok(projects);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let files = self.result_files(&name)?;
            projects.push(ProjectEntry { name, files });
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    /// File names under `<project>/results`, empty when the directory is
    /// missing.
    pub fn result_files(&self, project: &str) -> Result<Vec<String>, DataroomError> {
        validate_name(project)?;
        let dir = self.root.join(project).join("results");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn read_result_file(&self, project: &str, name: &str) -> Result<String, DataroomError> {
        validate_name(project)?;
        validate_name(name)?;
        let path = self.root.join(project).join("results").join(name);
        if !path.is_file() {
            return Err(DataroomError::NotFound(format!(
                "result file {name} not found for project {project}"
            )));
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn create_project(&self, name: &str) -> Result<(), DataroomError> {
        validate_name(name)?;
        fs::create_dir_all(self.root.join(name))?;
        Ok(())
    }

    pub fn delete_project(&self, name: &str) -> Result<(), DataroomError> {
        validate_name(name)?;
        let dir = self.root.join(name);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
            info!(project = %name, "deleted project directory");
        }
        Ok(())
    }

    /// Replace the project's uploads wholesale: wipe the directory, recreate
    /// it, write every file. Returns the written paths.
    pub fn replace_uploads(
        &self,
        project: &str,
        files: &[(String, Vec<u8>)],
    ) -> Result<Vec<PathBuf>, DataroomError> {
        validate_name(project)?;
        let dir = self.root.join(project);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;

        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            validate_name(name)?;
            let path = dir.join(name);
            fs::write(&path, contents)?;
            written.push(path);
        }
        info!(project = %project, count = written.len(), "replaced uploads");
        Ok(written)
    }
}

/// Project and file names must be single normal path components.
fn validate_name(name: &str) -> Result<(), DataroomError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(DataroomError::BadRequest(format!(
            "invalid project or file name: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal_names() {
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("acme-deal").is_ok());
    }

    #[test]
    fn replace_uploads_wipes_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dataroom = Dataroom::new(tmp.path());

        dataroom
            .replace_uploads("deal", &[("old.txt".to_string(), b"old".to_vec())])
            .unwrap();
        dataroom
            .replace_uploads("deal", &[("new.txt".to_string(), b"new".to_vec())])
            .unwrap();

        let dir = tmp.path().join("deal");
        assert!(!dir.join("old.txt").exists());
        assert_eq!(std::fs::read_to_string(dir.join("new.txt")).unwrap(), "new");
    }

    #[test]
    fn missing_results_dir_lists_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dataroom = Dataroom::new(tmp.path());
        dataroom.create_project("deal").unwrap();
        assert!(dataroom.result_files("deal").unwrap().is_empty());

        let results = tmp.path().join("deal").join("results");
        std::fs::create_dir_all(&results).unwrap();
        std::fs::write(results.join("summary.md"), "ok").unwrap();
        assert_eq!(dataroom.result_files("deal").unwrap(), vec!["summary.md"]);
    }
}
