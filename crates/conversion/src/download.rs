//! Handing finished artifacts to the local save mechanism

use crate::{Artifact, DownloadConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Receives a converted file once an export has finished. Handoff is final:
/// nothing is reported back to the caller.
pub trait Downloader: Send + Sync {
    fn save(&self, artifact: &Artifact, file_name: &str);
}

/// Writes artifacts into a directory
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    directory: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            directory: config.directory.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Target path for a (sanitised) file name
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.directory.join(sanitize_file_name(file_name))
    }
}

impl Downloader for DirectoryDownloader {
    fn save(&self, artifact: &Artifact, file_name: &str) {
        let path = self.path_for(file_name);
        let written = std::fs::create_dir_all(&self.directory)
            .and_then(|_| std::fs::write(&path, artifact.bytes()));
        match written {
            Ok(()) => info!(path = %path.display(), bytes = artifact.len(), "download saved"),
            Err(err) => error!(path = %path.display(), error = %err, "failed to save download"),
        }
    }
}

/// Replace path separators and control characters, and strip leading dots
/// so the name cannot escape the target directory
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}
