//! User records and the CRUD handlers behind `/api/users`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use std::borrow::Cow;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::Principal;
use crate::response::{ApiResponse, ApiReturn, AppError};
use crate::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub account: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub mobile_phone: String,
    pub birthday: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u64,
    pub size: u64,
    pub total: u64,
    pub items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub gender: Gender,
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
    pub password: Option<String>,
    pub mobile_phone: String,
    pub birthday: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub mobile_phone: Option<String>,
    pub birthday: Option<String>,
    pub enabled: Option<bool>,
}

pub(crate) fn seed_admin() -> User {
    let now = Utc::now().to_rfc3339();
    User {
        id: Uuid::new_v4().to_string(),
        name: "Administrator".to_string(),
        gender: Gender::Male,
        account: crate::SEED_ACCOUNT.to_string(),
        password: crate::SEED_PASSWORD.to_string(),
        mobile_phone: String::new(),
        birthday: "1970-01-01".to_string(),
        enabled: true,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Name must not be empty")));
    }
    Ok(())
}

fn matches_keyword(user: &User, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    user.name.to_lowercase().contains(&keyword) || user.account.to_lowercase().contains(&keyword)
}

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiReturn<Page<User>> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1).max(1);
    let size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let keyword = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());

    let db = state.db.read().await;
    let matched: Vec<&User> = db
        .users
        .iter()
        .filter(|u| keyword.map_or(true, |k| matches_keyword(u, k)))
        .collect();
    let total = matched.len() as u64;
    let skip = usize::try_from((page - 1).saturating_mul(size)).unwrap_or(usize::MAX);
    let take = usize::try_from(size).unwrap_or(usize::MAX);
    let items = matched.into_iter().skip(skip).take(take).cloned().collect();

    Ok(ApiResponse::success(Page {
        page,
        size,
        total,
        items,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    input: Result<Json<CreateUser>, JsonRejection>,
) -> ApiReturn<User> {
    let Json(input) = input?;
    input.validate()?;

    let mut db = state.db.write().await;
    if db.users.iter().any(|u| u.account == input.account) {
        return Err(AppError::AccountTaken(input.account));
    }
    let now = Utc::now().to_rfc3339();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        gender: input.gender,
        account: input.account,
        password: input.password.unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        mobile_phone: input.mobile_phone,
        birthday: input.birthday,
        enabled: input.enabled,
        created_at: now.clone(),
        updated_at: now,
    };
    db.users.push(user.clone());
    info!(by = %principal.id, id = %user.id, account = %user.account, "user created");
    Ok(ApiResponse::success(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    input: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiReturn<User> {
    let Json(input) = input?;
    input.validate()?;

    let mut db = state.db.write().await;
    let user = db
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(AppError::NotFound)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(gender) = input.gender {
        user.gender = gender;
    }
    if let Some(mobile_phone) = input.mobile_phone {
        user.mobile_phone = mobile_phone;
    }
    if let Some(birthday) = input.birthday {
        user.birthday = birthday;
    }
    if let Some(enabled) = input.enabled {
        user.enabled = enabled;
    }
    user.updated_at = Utc::now().to_rfc3339();
    Ok(ApiResponse::success(user.clone()))
}

pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiReturn<()> {
    let mut db = state.db.write().await;
    let index = db.users.iter().position(|u| u.id == id).ok_or(AppError::NotFound)?;
    let removed = db.users.remove(index);
    db.tokens.retain(|_, t| t.user_id != removed.id);
    info!(id = %removed.id, "user deleted");
    Ok(ApiResponse::empty())
}
