//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports the domain models and owns configuration loading.
//!
//! ## Config loading
//! ```rust,ignore
//! use lyceum_kernel::config::load_config;
//! use lyceum_kernel::domain::config::PlatformConfig;
//!
//! let cfg: PlatformConfig = load_config(Some("lyceum.toml")).unwrap_or_default();
//! ```
pub mod config;

pub use lyceum_domain as domain;
