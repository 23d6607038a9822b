use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use log::*;
use serde_json::json;
use service::AppState;
use webhook_auth::error::webhook_error;
use webhook_auth::{Headers, VerificationRequest, VerificationResult, WebhookErrorKind};

use crate::controller::ApiResponse;
use crate::error::{Error, Result};

/// POST a webhook delivery for `provider`.
///
/// The raw body is verified against the provider's configured secret before anything
/// else looks at it. Accepted deliveries answer 200; rejections answer with the status
/// recommended for the rejection reason.
pub async fn receive(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: core::result::Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse> {
    let body = body.map_err(|rejection| {
        warn!("Failed to read {} webhook body: {}", provider, rejection);
        webhook_error(WebhookErrorKind::BodyReadError, "request body could not be read")
    })?;

    let mut request = VerificationRequest::new(body.to_vec(), to_headers(&headers));
    if let Some(query) = query {
        request = request.with_query(&query);
    }

    let secret = app_state.signing_secret(&provider);
    match app_state
        .registry_ref()
        .verify(&provider, &request, secret.as_ref())
        .await
    {
        VerificationResult::Accepted => {
            info!("Accepted {} webhook ({} bytes)", provider, request.body().len());
            Ok((
                StatusCode::OK,
                Json(ApiResponse::new(
                    StatusCode::OK.into(),
                    json!({ "received": true }),
                )),
            ))
        }
        VerificationResult::Rejected(err) => Err(Error::from(err)),
    }
}

/// Header values that are not visible ASCII are dropped.
fn to_headers(header_map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in header_map {
        if let Ok(value) = value.to_str() {
            headers.append(name.as_str(), value);
        }
    }
    headers
}
