//! Host side of the admin API client.
//!
//! # Overview
//! `admin-core` builds and normalizes requests without doing I/O. This
//! crate supplies what it leaves out: a ureq transport with a fixed
//! deadline, a file-backed token store, and `Console`, which ties them
//! together and clears the token when the backend reports an expired
//! session.

pub mod console;
pub mod error;
pub mod store;
pub mod transport;

pub use console::Console;
pub use error::{ConsoleError, ConsoleResult};
pub use store::FileTokenStore;
pub use transport::{Transport, TransportError, UreqTransport};
