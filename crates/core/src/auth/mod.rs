//! Authentication state, credential renewal and forced logout
//!
//! - [`AuthController`] is the only writer of the shared credential; it
//!   persists it, broadcasts [`studyarc_domain::AuthEvent`]s and owns the
//!   renewal timer.
//! - [`AuthReader`] is the read-only handle the gateway holds; every call
//!   takes an immutable [`AuthSnapshot`].
//! - [`RenewalScheduler`] keeps at most one pending renewal timer.

pub mod context;
pub mod controller;
pub mod ports;
pub mod renewal;

pub use context::{AuthReader, AuthSnapshot};
pub use controller::AuthController;
pub use ports::{CredentialStore, TokenRefresher};
pub use renewal::RenewalScheduler;
