//! Lenient JSON body extractor.
//!
//! An empty body reads as `{}`, and the content type is not checked.
//! Rejections become [`AppError::Validation`] so they share the `{"error"}`
//! body of every other failure.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use memorb_types::tenant::TenantId;

use crate::http::error::AppError;

pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };
        serde_json::from_slice(raw)
            .map(JsonBody)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))
    }
}

/// `user_id` as a tenant, or `default_user` when absent or blank.
pub fn or_default_tenant(user_id: Option<String>) -> TenantId {
    user_id
        .filter(|id| !id.trim().is_empty())
        .map(TenantId::new)
        .unwrap_or_else(TenantId::default_user)
}

/// Body carrying just a tenant id.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UserBody {
    pub user_id: Option<String>,
}

impl UserBody {
    /// The tenant id, or a validation error when absent or blank.
    pub fn required(self) -> Result<String, AppError> {
        self.user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Validation("user_id is required".into()))
    }

    /// The tenant id, falling back to `default_user`.
    pub fn or_default(self) -> TenantId {
        or_default_tenant(self.user_id)
    }
}
