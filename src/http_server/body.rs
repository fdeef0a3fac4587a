//! Request body decoding
//!
//! Bodies must be a JSON object. serde's derived struct impls also accept
//! the sequence form (`[true]`), which is answered as an unparseable body.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};

/// Decode a JSON object body into `T`.
pub fn json_object<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> ApiResult<T> {
    let Json(value) = body.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    if !value.is_object() {
        return Err(ApiError::InvalidBody("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|err| ApiError::InvalidBody(err.to_string()))
}
