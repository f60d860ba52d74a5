//! Guessing which app a command is about from the working directory.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GuessError {
    #[error("Git repository not found")]
    RepositoryNotFound,

    #[error("Git remote \"{0}\" not found")]
    RemoteNotFound(String),

    #[error("Could not extract an app name from \"{0}\"")]
    UnrecognizedUrl(String),

    #[error("Failed to read git config: {0}")]
    Io(#[from] std::io::Error),
}

/// Finds the app name for a directory
pub trait AppGuesser {
    fn guess_name(&self, dir: &Path) -> Result<String, GuessError>;
}

/// Reads the URL of a named remote from the enclosing git repository.
///
/// A remote such as `git@paas.example.com:blog.git` yields `blog`.
#[derive(Debug, Clone)]
pub struct GitGuesser {
    remote: String,
}

impl GitGuesser {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
        }
    }

    fn find_git_config(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|d| d.join(".git").join("config"))
            .find(|p| p.is_file())
    }

    fn remote_url(&self, contents: &str) -> Option<String> {
        let section = format!("[remote \"{}\"]", self.remote);
        let mut in_section = false;
        for line in contents.lines().map(str::trim) {
            if line.starts_with('[') {
                in_section = line == section;
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "url" {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }
}

/// Last path component of a git URL without the `.git` suffix
fn app_name_from_url(url: &str) -> Option<&str> {
    let trimmed = url.trim_end_matches('/');
    let name = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed)
        .trim_end_matches(".git");
    (!name.is_empty()).then_some(name)
}

impl AppGuesser for GitGuesser {
    fn guess_name(&self, dir: &Path) -> Result<String, GuessError> {
        let config_path = Self::find_git_config(dir).ok_or(GuessError::RepositoryNotFound)?;
        debug!("Reading git config at {}", config_path.display());

        let contents = std::fs::read_to_string(&config_path)?;
        let url = self
            .remote_url(&contents)
            .ok_or_else(|| GuessError::RemoteNotFound(self.remote.clone()))?;

        app_name_from_url(&url)
            .map(str::to_string)
            .ok_or(GuessError::UnrecognizedUrl(url))
    }
}
