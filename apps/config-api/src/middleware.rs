//! Caller identity extraction.
//!
//! Authentication happens in the gateway in front of this service, which
//! forwards the verified user id in a header. This layer turns that header
//! into the [`Caller`] extension the version routes expect. Requests without
//! a usable header pass through with no caller and are rejected downstream.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use dashcfg_api_versions::Caller;
use dashcfg_core::OwnerId;

/// Name of the header carrying the caller's user id.
#[derive(Debug, Clone)]
pub struct CallerHeader(pub HeaderName);

pub async fn caller_identity_middleware(
    State(CallerHeader(header)): State<CallerHeader>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = request
        .headers()
        .get(&header)
        .and_then(|v| v.to_str().ok())
        .map(str::parse::<OwnerId>);

    match caller {
        Some(Ok(user_id)) => {
            request.extensions_mut().insert(Caller::new(user_id));
        }
        Some(Err(e)) => {
            tracing::warn!(header = %header, error = %e, "Ignoring malformed caller header");
        }
        None => {}
    }

    next.run(request).await
}
