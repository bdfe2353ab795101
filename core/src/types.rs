//! Domain DTOs for the admin API.
//!
//! # Design
//! Field names follow the wire format (camelCase) via serde renames. These
//! types are defined independently from the mock-server's; the integration
//! tests catch schema drift between the two.

use serde::{Deserialize, Serialize};

/// Credentials posted to `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A user record as returned by the API. The password never comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub account: String,
    pub mobile_phone: String,
    pub birthday: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u64,
    pub size: u64,
    pub total: u64,
    pub items: Vec<T>,
}

/// Filters for `GET /users`, sent as a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
    pub name: String,
    pub gender: Gender,
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub mobile_phone: String,
    pub birthday: String,
    pub enabled: bool,
}

/// Payload for updating a user. Only the fields present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
