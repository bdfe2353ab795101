//! Synchronous API client core for the admin console.
//!
//! # Overview
//! Builds `HttpRequest` values and normalizes `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the
//! actual HTTP round-trip, which keeps the core deterministic and testable.
//!
//! # Design
//! - `AdminClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces an authorized request
//!   for an explicit `Session`) and `parse_*` (normalizes, then decodes).
//! - `envelope::normalize` maps every backend response convention onto one
//!   `ApiResult { code, message, data }`; callers never look at HTTP status.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::AdminClient;
pub use config::ClientConfig;
pub use envelope::{normalize, ApiResult};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{authorize, MemoryTokenStore, Session, TokenStore, TOKEN_KEY};
pub use types::{Gender, LoginParams, Page, UpdateUser, User, UserParams, UserQuery};
