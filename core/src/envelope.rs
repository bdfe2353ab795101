//! Response normalization into the canonical `{code, message, data}` result.
//!
//! # Design
//! The backend speaks three conventions: a success envelope
//! `{message, data}`, a business error `{code, error}`, and bare HTTP error
//! statuses. `normalize` folds all of them, plus anything unrecognizable,
//! into one `ApiResult`. The two body schemas are explicit serde types
//! decoded into `ResponseBody`; a body matching neither lands in
//! `ResponseBody::Unknown` with the raw value kept for diagnostics.
//!
//! Classification order, first match wins:
//! 1. status outside `[200, 300)`
//! 2. success schema
//! 3. error schema
//! 4. unknown

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

pub const SUCCESS_CODE: i64 = 0;
pub const UNKNOWN_FORMAT_CODE: i64 = -1;

const DEFAULT_SUCCESS_MESSAGE: &str = "Success";
const UNKNOWN_FORMAT_MESSAGE: &str = "Unknown response format";

/// Canonical result envelope handed to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: i64,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl ApiResult<Value> {
    /// Turn a non-zero code into `ApiError::Api`, otherwise decode `data`.
    ///
    /// A missing payload decodes from `null`, so `()` and `Option<_>`
    /// targets accept success results without data.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Api {
                code: self.code,
                message: self.message,
            });
        }
        serde_json::from_value(self.data.unwrap_or(Value::Null))
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// `{message?, data}`; `data` must be present but may be `null`.
#[derive(Debug, Deserialize)]
struct SuccessBody {
    data: Value,
    #[serde(default)]
    message: Option<Value>,
}

/// `{code, error}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KnownBody {
    Success(SuccessBody),
    Error(ErrorBody),
}

#[derive(Debug)]
enum ResponseBody {
    Success(SuccessBody),
    Error(ErrorBody),
    Unknown(Value),
}

impl ResponseBody {
    /// Only objects can be envelopes; derived struct decoding would also
    /// accept arrays by position.
    fn decode(raw: Value) -> Self {
        if !raw.is_object() {
            return ResponseBody::Unknown(raw);
        }
        match KnownBody::deserialize(&raw) {
            Ok(KnownBody::Success(body)) => ResponseBody::Success(body),
            Ok(KnownBody::Error(body)) => ResponseBody::Error(body),
            Err(_) => ResponseBody::Unknown(raw),
        }
    }
}

/// Parse the raw body text; non-JSON text is kept as a JSON string.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Normalize a raw response. Never fails and depends only on `response`.
pub fn normalize(response: &HttpResponse) -> ApiResult<Value> {
    let raw = parse_body(&response.body);

    if !response.is_success() {
        let message = non_empty_str(raw.get("error"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP Error: {}", response.status));
        return ApiResult {
            code: i64::from(response.status),
            message,
            data: None,
        };
    }

    match ResponseBody::decode(raw) {
        ResponseBody::Success(body) => ApiResult {
            code: SUCCESS_CODE,
            message: non_empty_str(body.message.as_ref())
                .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
                .to_string(),
            data: Some(body.data),
        },
        ResponseBody::Error(body) => ApiResult {
            code: body.code,
            message: body.error,
            data: None,
        },
        ResponseBody::Unknown(raw) => ApiResult {
            code: UNKNOWN_FORMAT_CODE,
            message: UNKNOWN_FORMAT_MESSAGE.to_string(),
            data: Some(raw),
        },
    }
}
