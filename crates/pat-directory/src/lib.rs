//! LDAP credential readiness probe for pat-helper.
//!
//! After a password change the directory may take a while to accept the new
//! credentials on every host. The probe binds against each configured host in
//! order, retrying rejected binds until the host accepts them or the attempt
//! budget runs out.

pub mod binder;
pub mod probe;

pub use binder::{BindStatus, DirectoryBinder, DirectoryError, LdapBinder, DEFAULT_LDAP_PORT};
pub use probe::{bind_dn, parse_hosts, CredentialProbe, DirectorySettings, ProbeError};
