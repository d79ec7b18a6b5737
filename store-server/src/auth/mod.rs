//! Authentication
//!
//! JWT validation and caller-identity extractors. Token issuance (login,
//! signup) lives in the external identity service; both sides share
//! `JWT_SECRET`.

pub mod extractor;
pub mod jwt;

pub use extractor::AdminUser;
pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
