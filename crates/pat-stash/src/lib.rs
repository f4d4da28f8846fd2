//! Bitbucket Server (Stash) personal access token issuing and revocation.
//!
//! Both operations run through the shared retry engine: a `401` means the
//! freshly changed password has not propagated yet and is retried, any other
//! unexpected status aborts immediately.

pub mod client;
pub mod error;
pub mod issuer;
pub mod record;
pub mod revoker;

pub use client::{StashClient, StashEndpoint, DEFAULT_PAT_URI, DEFAULT_REQUEST_TIMEOUT};
pub use error::StashError;
pub use issuer::{token_name, IssueRequest, TokenIssuer, LOCAL_TOKEN_NAME};
pub use record::{TokenRecord, REVOKED_TOKEN_SENTINEL};
pub use revoker::TokenRevoker;
