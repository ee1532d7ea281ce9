//! Repository implementations module.
//!
//! - `local`: in-memory store with per-user locking
pub mod local;

pub use local::LocalRepository;
