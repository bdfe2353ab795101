//! Login and bearer-token checks.
//!
//! Tokens are opaque random strings held in memory with their issue time;
//! a token older than `ServerConfig::token_ttl` is rejected with the same
//! `ExpiredSignature` wording a JWT backend would use.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::response::{ApiResponse, ApiReturn, AppError, AppResult};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user_id: String,
    pub issued_at: Instant,
}

/// Identity of the caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginParams {
    #[validate(length(
        min = 1,
        max = 16,
        message = "Account must be between 1 and 16 characters long"
    ))]
    pub account: String,
    #[validate(length(
        min = 6,
        max = 16,
        message = "Password must be between 6 and 16 characters long"
    ))]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    params: Result<Json<LoginParams>, JsonRejection>,
) -> ApiReturn<String> {
    let Json(params) = params?;
    params.validate()?;

    let mut db = state.db.write().await;
    let user_id = db
        .users
        .iter()
        .find(|u| u.account == params.account && u.password == params.password)
        .map(|u| u.id.clone())
        .ok_or(AppError::Login)?;

    let token = Uuid::new_v4().simple().to_string();
    db.tokens.insert(
        token.clone(),
        IssuedToken {
            user_id,
            issued_at: Instant::now(),
        },
    );
    info!(account = %params.account, "user logged in");
    Ok(ApiResponse::success(token))
}

/// Reject requests without a live bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingAuthorization(
            "Header of type `authorization` was missing",
        ))?
        .to_string();

    let principal = {
        let mut db = state.db.write().await;
        let issued = db.tokens.get(&token).ok_or(AppError::Token("InvalidToken"))?;
        if issued.issued_at.elapsed() >= state.config.token_ttl {
            db.tokens.remove(&token);
            return Err(AppError::Token("ExpiredSignature"));
        }
        Principal {
            id: issued.user_id.clone(),
        }
    };

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
