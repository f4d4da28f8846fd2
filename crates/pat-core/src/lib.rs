//! Foundational types shared across pat-helper crates.
//!
//! Provides the generic bounded-retry engine used by directory binds and
//! token API calls, the project/repository permission mapper, the redacted
//! credential type, and the stable exit-reason enumeration.

pub mod credential;
pub mod exit_reason;
pub mod permissions;
pub mod retry;

pub use credential::Credential;
pub use exit_reason::ExitReason;
pub use permissions::{
    map_permissions, PermissionCode, PermissionError, PermissionGrant, PermissionRequest, Scope,
};
pub use retry::{
    OperationOutcome, RecordingSleeper, RetryConfig, RetryConfigError, RetryError, RetryPolicy,
    Sleeper, ThreadSleeper,
};
pub use secrecy::{ExposeSecret, SecretString};
