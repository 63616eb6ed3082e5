//! Storage Module
//!
//! Boundary to the platform's blob store. Messages only ever hold an
//! opaque storage ID; this module owns the two-phase upload contract
//! and the ID-to-URL resolution used when listing messages.

pub mod blob;

pub use blob::{BlobStore, UploadTicket};
