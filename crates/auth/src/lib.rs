//! `npi-auth`: bearer token verification.
//!
//! Identities and sessions are issued by an external provider; this crate only
//! decodes and checks the tokens it mints. It is decoupled from HTTP and storage.

pub mod claims;
pub mod principal;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use principal::PrincipalId;
pub use validator::{Hs256JwtValidator, JwtValidator};
