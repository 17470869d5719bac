//! Actix-web frontend for Biolink custom domains.
//!
//! Dashboard endpoints live under `/api/domain` and take the account from
//! the `X-Account-Id` header. Collaborator endpoints live under `/internal`.

pub mod account;
pub mod error;
pub mod handlers;
pub mod logging;

pub use handlers::configure;
