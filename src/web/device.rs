use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

pub const DEVICE_HEADER: &str = "x-device-id";
const MAX_DEVICE_ID_LEN: usize = 128;

/// Identifies the phone making the request. Falls back to the client IP, then
/// to a shared anonymous bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(pub String);

pub fn device_from_headers(headers: &HeaderMap) -> String {
    let explicit = headers
        .get(DEVICE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(id) = explicit {
        return id.chars().take(MAX_DEVICE_ID_LEN).collect();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|ip| format!("ip:{ip}"))
        .unwrap_or_else(|| "anonymous".to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for DeviceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(DeviceId(device_from_headers(&parts.headers)))
    }
}
