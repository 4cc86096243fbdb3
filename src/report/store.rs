use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::ReportError;

/// Stores rendered reports on disk under deterministic names so they stay
/// downloadable after the session is gone
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn filename_for(session_id: &str) -> String {
        format!("score_report_{}.pdf", session_id)
    }

    /// Accepts plain `*.pdf` file names only; anything that could leave the directory is refused
    pub fn is_valid_filename(filename: &str) -> bool {
        filename.ends_with(".pdf")
            && filename.len() > ".pdf".len()
            && !filename.starts_with('.')
            && filename
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !filename.contains("..")
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf, ReportError> {
        if Self::is_valid_filename(filename) {
            Ok(self.dir.join(filename))
        } else {
            Err(ReportError::NotFound(filename.to_string()))
        }
    }

    #[instrument(skip(self, bytes))]
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Report written");
        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, filename: &str) -> Result<Vec<u8>, ReportError> {
        let path = self.path_for(filename)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::NotFound(filename.to_string()),
            _ => ReportError::Io(e),
        })
    }
}
