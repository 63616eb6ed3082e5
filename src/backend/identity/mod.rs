//! Identity Resolver
//!
//! Boundary to the platform's identity provider. The messaging core
//! never handles credentials; it verifies bearer tokens minted by the
//! provider and looks up user records to project their public profile
//! fields into messaging responses.

pub mod sessions;
pub mod users;

pub use users::UserRecord;
