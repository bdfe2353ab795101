//! Session lifecycle around the stateless core client.
//!
//! # Design
//! `Console` owns the three moving parts the core leaves to its host: the
//! transport, the token store, and the expiry policy. Before each request
//! it snapshots the store into a `Session`; after each response it lets the
//! core normalize and decode. An error whose message contains the expiry
//! marker clears the stored token.

use std::path::Path;

use admin_core::{
    AdminClient, ApiError, ClientConfig, HttpRequest, HttpResponse, LoginParams, Page, Session,
    TokenStore, UpdateUser, User, UserParams, UserQuery,
};
use tracing::{info, warn};

use crate::error::{ConsoleError, ConsoleResult};
use crate::store::FileTokenStore;
use crate::transport::{Transport, UreqTransport};

pub struct Console<T, S> {
    client: AdminClient,
    transport: T,
    store: S,
    expiry_marker: String,
}

impl Console<UreqTransport, FileTokenStore> {
    /// Network transport with the configured deadline, token persisted under `token_dir`.
    pub fn connect(config: &ClientConfig, token_dir: impl AsRef<Path>) -> Self {
        Self::new(
            config,
            UreqTransport::new(config.timeout),
            FileTokenStore::new(token_dir),
        )
    }
}

impl<T: Transport, S: TokenStore> Console<T, S> {
    pub fn new(config: &ClientConfig, transport: T, store: S) -> Self {
        Self {
            client: AdminClient::new(&config.base_url),
            transport,
            store,
            expiry_marker: config.expiry_marker.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Session {
        Session::from_store(&self.store)
    }

    /// Whether a token is stored; a missing token sends the user to login.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Exchange credentials for a token and persist it.
    pub fn login(&self, params: &LoginParams) -> ConsoleResult<()> {
        let req = self.client.build_login(&self.session(), params)?;
        let token = self.call(req, AdminClient::parse_login)?;
        self.store
            .set(&token)
            .map_err(|e| ConsoleError::Store(e.to_string()))?;
        info!(account = %params.account, "logged in");
        Ok(())
    }

    pub fn logout(&self) -> ConsoleResult<()> {
        self.store
            .clear()
            .map_err(|e| ConsoleError::Store(e.to_string()))?;
        info!("logged out");
        Ok(())
    }

    pub fn list_users(&self, query: &UserQuery) -> ConsoleResult<Page<User>> {
        let req = self.client.build_list_users(&self.session(), query);
        self.call(req, AdminClient::parse_list_users)
    }

    pub fn create_user(&self, input: &UserParams) -> ConsoleResult<User> {
        let req = self.client.build_create_user(&self.session(), input)?;
        self.call(req, AdminClient::parse_create_user)
    }

    pub fn update_user(&self, id: &str, input: &UpdateUser) -> ConsoleResult<User> {
        let req = self.client.build_update_user(&self.session(), id, input)?;
        self.call(req, AdminClient::parse_update_user)
    }

    pub fn delete_user(&self, id: &str) -> ConsoleResult<()> {
        let req = self.client.build_delete_user(&self.session(), id);
        self.call(req, AdminClient::parse_delete_user)
    }

    fn call<R, P>(&self, request: HttpRequest, parse: P) -> ConsoleResult<R>
    where
        P: FnOnce(&AdminClient, HttpResponse) -> Result<R, ApiError>,
    {
        let response = self.transport.execute(request)?;
        parse(&self.client, response).map_err(|err| self.classify(err))
    }

    fn classify(&self, err: ApiError) -> ConsoleError {
        if !err.is_session_expired(&self.expiry_marker) {
            return ConsoleError::Api(err);
        }
        warn!(error = %err, "session expired, clearing token");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear token");
        }
        ConsoleError::SessionExpired(err.to_string())
    }
}
