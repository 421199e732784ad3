//! # Domain Models
//!
//! Pure data shared by every Lyceum crate: platform configuration and the
//! records the course policy layer reads from and writes to the store.
//! Keep it lean: no I/O, networking, or heavy logic.

pub mod config;
pub mod course;
