//! Stateless HTTP request builder and response parser for the admin API.
//!
//! # Design
//! `AdminClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an authorized `HttpRequest` for a given
//! `Session`, and a `parse_*` method that normalizes the `HttpResponse` and
//! turns a non-zero result code into `ApiError::Api`. The caller executes
//! the HTTP round-trip in between.

use serde::Serialize;
use url::form_urlencoded;

use crate::envelope::normalize;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::{authorize, Session};
use crate::types::{LoginParams, Page, UpdateUser, User, UserParams, UserQuery};

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// Synchronous, stateless client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(
        &self,
        session: &Session,
        params: &LoginParams,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", session, params)
    }

    pub fn build_list_users(&self, session: &Session, query: &UserQuery) -> HttpRequest {
        let mut path = format!("{}/users", self.base_url);
        let qs = encode_query(query);
        if !qs.is_empty() {
            path.push('?');
            path.push_str(&qs);
        }
        let mut req = HttpRequest::new(HttpMethod::Get, path);
        authorize(&mut req, session);
        req
    }

    pub fn build_create_user(
        &self,
        session: &Session,
        input: &UserParams,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users", session, input)
    }

    pub fn build_update_user(
        &self,
        session: &Session,
        id: &str,
        input: &UpdateUser,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &user_path(id), session, input)
    }

    pub fn build_delete_user(&self, session: &Session, id: &str) -> HttpRequest {
        let path = format!("{}{}", self.base_url, user_path(id));
        let mut req = HttpRequest::new(HttpMethod::Delete, path);
        authorize(&mut req, session);
        req
    }

    /// Returns the issued bearer token.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        normalize(&response).into_data()
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Page<User>, ApiError> {
        normalize(&response).into_data()
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        normalize(&response).into_data()
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        normalize(&response).into_data()
    }

    /// Only the result code matters; any payload is discarded.
    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        normalize(&response)
            .into_data::<serde_json::Value>()
            .map(drop)
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        session: &Session,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = HttpRequest::new(method, format!("{}{path}", self.base_url));
        req.set_header(CONTENT_TYPE, APPLICATION_JSON.to_string());
        req.body = Some(body);
        authorize(&mut req, session);
        Ok(req)
    }
}

fn user_path(id: &str) -> String {
    format!("/users/{}", encode_segment(id))
}

/// Percent-encode a single path segment.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn encode_query(query: &UserQuery) -> String {
    let mut qs = form_urlencoded::Serializer::new(String::new());
    if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
        qs.append_pair("keyword", keyword);
    }
    if let Some(page) = query.page {
        qs.append_pair("page", &page.to_string());
    }
    if let Some(size) = query.page_size {
        qs.append_pair("page_size", &size.to_string());
    }
    qs.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    fn client() -> AdminClient {
        AdminClient::new("http://localhost:3000/api")
    }

    fn signed_in() -> Session {
        Session::with_token("tok")
    }

    fn user_json() -> &'static str {
        concat!(
            r#"{"id":"u1","name":"Ada","gender":"female","account":"ada","mobilePhone":"555","#,
            r#""birthday":"1990-01-01","enabled":true,"#,
            r#""createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
    }

    #[test]
    fn build_login_produces_json_post() {
        let params = LoginParams {
            account: "admin".to_string(),
            password: "admin123".to_string(),
        };
        let req = client().build_login(&Session::anonymous(), &params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/auth/login");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["account"], "admin");
        assert_eq!(body["password"], "admin123");
    }

    #[test]
    fn build_list_users_without_query() {
        let req = client().build_list_users(&signed_in(), &UserQuery::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/users");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_users_encodes_query() {
        let query = UserQuery {
            keyword: Some("a b&c".to_string()),
            page: Some(2),
            page_size: Some(20),
        };
        let req = client().build_list_users(&signed_in(), &query);
        assert_eq!(
            req.path,
            "http://localhost:3000/api/users?keyword=a+b%26c&page=2&page_size=20"
        );
    }

    #[test]
    fn build_create_user_omits_missing_password() {
        let input = UserParams {
            name: "Ada".to_string(),
            gender: Gender::Female,
            account: "ada".to_string(),
            password: None,
            mobile_phone: "555".to_string(),
            birthday: "1990-01-01".to_string(),
            enabled: true,
        };
        let req = client().build_create_user(&signed_in(), &input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/users");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["mobilePhone"], "555");
        assert_eq!(body["gender"], "female");
        assert!(body.get("password").is_none());
    }

    #[test]
    fn build_update_user_sends_only_present_fields() {
        let input = UpdateUser {
            name: Some("Grace".to_string()),
            ..UpdateUser::default()
        };
        let req = client().build_update_user(&signed_in(), "u1", &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/users/u1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Grace"}));
    }

    #[test]
    fn build_delete_user_encodes_id() {
        let req = client().build_delete_user(&signed_in(), "a/b c");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/users/a%2Fb%20c");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = AdminClient::new("http://localhost:3000/api/");
        let req = client.build_list_users(&Session::anonymous(), &UserQuery::default());
        assert_eq!(req.path, "http://localhost:3000/api/users");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn parse_login_returns_token() {
        let response = HttpResponse::new(200, r#"{"code":0,"message":"success","data":"jwt"}"#);
        assert_eq!(client().parse_login(response).unwrap(), "jwt");
    }

    #[test]
    fn parse_login_surfaces_server_message() {
        let body = r#"{"code":401,"error":"Account or Password is incorrect"}"#;
        let response = HttpResponse::new(401, body);
        let err = client().parse_login(response).unwrap_err();
        assert!(matches!(err, ApiError::Api { code: 401, .. }));
        assert_eq!(err.to_string(), "Account or Password is incorrect");
    }

    #[test]
    fn parse_list_users_success() {
        let body = format!(
            r#"{{"message":"success","data":{{"page":1,"size":10,"total":1,"items":[{}]}}}}"#,
            user_json()
        );
        let page = client().parse_list_users(HttpResponse::new(200, body)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Ada");
        assert_eq!(page.items[0].gender, Gender::Female);
    }

    #[test]
    fn parse_create_user_success() {
        let body = format!(r#"{{"data":{}}}"#, user_json());
        let user = client().parse_create_user(HttpResponse::new(200, body)).unwrap();
        assert_eq!(user.account, "ada");
        assert_eq!(user.mobile_phone, "555");
    }

    #[test]
    fn parse_update_user_not_found() {
        let response = HttpResponse::new(404, r#"{"code":404,"error":"Not Found"}"#);
        let err = client().parse_update_user(response).unwrap_err();
        assert!(matches!(err, ApiError::Api { code: 404, .. }));
    }

    #[test]
    fn parse_delete_user_accepts_null_data() {
        let response = HttpResponse::new(200, r#"{"code":0,"message":"success","data":null}"#);
        assert!(client().parse_delete_user(response).is_ok());
    }

    #[test]
    fn parse_list_users_bad_payload() {
        let response = HttpResponse::new(200, r#"{"data":"not a page"}"#);
        let err = client().parse_list_users(response).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_unknown_format_is_an_error() {
        let response = HttpResponse::new(200, "not json");
        let err = client().parse_list_users(response).unwrap_err();
        assert!(matches!(err, ApiError::Api { code: -1, .. }));
    }
}
