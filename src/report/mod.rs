// Public API
pub use handlers::download_report;
pub use layout::ScoreSheet;
pub use store::ReportStore;

// Internal modules
mod handlers;
pub mod layout;
pub mod pdf;
mod store;

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::game::RoundResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Report storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders finished games to PDF and files them in the report store
#[derive(Clone)]
pub struct ReportService {
    store: Arc<ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<ReportStore>) -> Self {
        Self { store }
    }

    /// Renders the scorecard and saves it under the session's report name.
    /// Returns the file name for download.
    #[instrument(skip(self, roster, history, totals))]
    pub async fn publish(
        &self,
        session_id: &str,
        roster: &[String],
        history: &[RoundResult],
        totals: &BTreeMap<String, f64>,
    ) -> Result<String, ReportError> {
        let sheet = ScoreSheet::build(roster, history, totals, Utc::now());
        let bytes = tokio::task::spawn_blocking(move || pdf::render_pdf(&sheet))
            .await
            .map_err(|e| ReportError::Render(e.to_string()))??;

        let filename = ReportStore::filename_for(session_id);
        self.store.save(&filename, &bytes).await?;

        info!(session_id = %session_id, filename = %filename, "Report published");
        Ok(filename)
    }
}
