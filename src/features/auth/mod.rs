//! Bearer-token authentication against the organisation's OIDC provider.
//!
//! Login pages live with the identity provider; this service only validates
//! RS256 access tokens and exposes the caller as [`model::AuthenticatedUser`].

mod jwks;
mod validator;

pub mod guards;
pub mod model;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
