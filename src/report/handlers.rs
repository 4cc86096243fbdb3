use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::{error, info, instrument, warn};

use super::ReportError;
use crate::shared::{AppError, AppState};

/// HTTP handler for downloading a rendered scorecard
///
/// GET /reports/:filename
/// Keyed by file name only, so no session is needed
#[instrument(name = "download_report", skip(state))]
pub async fn download_report(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state.report_store.load(&filename).await.map_err(|e| match e {
        ReportError::NotFound(name) => {
            warn!(filename = %name, "Report not found");
            AppError::NotFound(format!("Report not found: {}", name))
        }
        other => {
            error!(filename = %filename, error = %other, "Report download failed");
            AppError::Internal
        }
    })?;

    info!(filename = %filename, size = bytes.len(), "Report downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/reports/:filename", get(download_report))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_download_existing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppStateBuilder::new().with_report_dir(tmp.path()).build();
        state
            .report_store
            .save("score_report_abc.pdf", b"%PDF-1.3 test")
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/reports/score_report_abc.pdf")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"score_report_abc.pdf\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"%PDF-1.3 test");
    }

    #[tokio::test]
    async fn test_download_missing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppStateBuilder::new().with_report_dir(tmp.path()).build();

        let request = Request::builder()
            .uri("/reports/score_report_nope.pdf")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppStateBuilder::new().with_report_dir(tmp.path()).build();

        let request = Request::builder()
            .uri("/reports/..%2Fsecret.pdf")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
