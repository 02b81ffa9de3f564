//! `saledash-auth`: who is making the request.
//!
//! Decoupled from HTTP and storage: the API derives a [`SessionContext`] from
//! a bearer token (or its absence) and passes it explicitly to the host.

pub mod claims;
pub mod jwt;
pub mod roles;
pub mod session;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use roles::Role;
pub use session::SessionContext;
