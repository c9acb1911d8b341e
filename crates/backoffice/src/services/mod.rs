//! Application services shared by the route handlers.

pub mod auth;
pub mod credentials;
pub mod outbound;

pub use auth::AuthService;
pub use credentials::{CredentialResolver, CredentialSource, CredentialStatus};
pub use outbound::Gateway;
