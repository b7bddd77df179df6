use crate::domain::geo::Notice;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced to the driver. Each carries a Spanish title and message
/// the app shows as an alert; none of them ends the session.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no recommended vehicle selected")]
    NoVehicles,
    #[error("coordinates out of range")]
    InvalidLocation,
    #[error("comment longer than {0} characters")]
    CommentTooLong(usize),
    #[error("too many submissions")]
    RateLimited,
    #[error("report submission failed: {0}")]
    CreateFailed(StoreError),
    #[error("vote failed: {0}")]
    VoteFailed(StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(flatten)]
    notice: Notice,
    retryable: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoVehicles | ApiError::InvalidLocation | ApiError::CommentTooLong(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::CreateFailed(_) | ApiError::VoteFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            ApiError::NoVehicles => Notice::new(
                "Selecciona un vehículo",
                "Indica al menos un tipo de vehículo recomendado.",
            ),
            ApiError::InvalidLocation => Notice::new(
                "Ubicación inválida",
                "No se pudo leer la ubicación del reporte.",
            ),
            ApiError::CommentTooLong(max) => Notice::new(
                "Comentario muy largo",
                &format!("El comentario no puede pasar de {max} caracteres."),
            ),
            ApiError::RateLimited => Notice::new(
                "Demasiados reportes",
                "Espera un momento antes de enviar otro reporte.",
            ),
            ApiError::CreateFailed(_) => {
                Notice::new("Error", "No se pudo enviar el reporte en este momento.")
            }
            ApiError::VoteFailed(_) => Notice::new(
                "Error",
                "No se pudo registrar tu validación. Intenta de nuevo.",
            ),
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::CreateFailed(_) | ApiError::VoteFailed(_)
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::CreateFailed(_) | ApiError::VoteFailed(_) => tracing::error!("{}", self),
            _ => tracing::debug!("request rejected: {}", self),
        }
        let body = ErrorBody {
            notice: self.notice(),
            retryable: self.retryable(),
        };
        (self.status(), Json(body)).into_response()
    }
}
