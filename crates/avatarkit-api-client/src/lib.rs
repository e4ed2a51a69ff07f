//! HTTP client for the avatarkit API.
//!
//! Attaches the stored access token as a bearer credential, transparently
//! refreshes it once when the API answers 401, and categorizes every other
//! failure for the caller. CLI and avatar flow use this client directly.

pub mod client;
pub mod error;
pub mod observer;
pub mod request;
pub mod session;

pub use client::ApiClient;
pub use error::{ClientError, ErrorCategory};
pub use observer::{LoggingObserver, SessionObserver};
pub use request::{RequestAttempt, RequestSpec};
pub use session::{AuthSession, FileSessionStore, MemorySessionStore, SessionStore};
