/*!
 * HTTP front end.
 *
 * A single route, `POST /transcribe`, accepting `{"bucketName": .., "source": ..}`.
 * On success the captioned archive is returned as an attachment; any failure
 * produces a 500 with a plain-text message naming the failed step.
 */

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;

use crate::app_controller::{Controller, TranscribeRequest};
use crate::errors::{PipelineError, Stage, UpstreamError};
use crate::packaging::DOWNLOAD_FILE_NAME;

/// JSON body of `POST /transcribe`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeBody {
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<TranscribeBody> for TranscribeRequest {
    fn from(body: TranscribeBody) -> Self {
        TranscribeRequest::new(body.bucket_name.unwrap_or_default(), body.source.unwrap_or_default())
    }
}

/// Routes of the service
pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .with_state(controller)
}

async fn transcribe(
    State(controller): State<Arc<Controller>>,
    body: Result<Json<TranscribeBody>, JsonRejection>,
) -> Response {
    let request: TranscribeRequest = match body {
        Ok(Json(body)) => body.into(),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            let error = PipelineError::new(
                Stage::Request,
                UpstreamError::InvalidRequest(rejection.body_text()),
            );
            return error_response(&error);
        }
    };

    match controller.handle_request(&request).await {
        Ok(archive) => (
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", DOWNLOAD_FILE_NAME),
                ),
            ],
            archive.data,
        )
            .into_response(),
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &PipelineError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, error.user_message()).into_response()
}

/// Serve until Ctrl-C
pub async fn serve(controller: Arc<Controller>, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
