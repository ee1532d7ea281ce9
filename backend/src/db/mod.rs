//! Attention store.
//!
//! Per-user attention and calibration records live behind the
//! [`AttentionRepository`] trait. The store is an explicit object owned by
//! the application state and handed to services by reference; there is no
//! process-global instance.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers / services::attention         │
//! └───────────────────┬──────────────────────────┘
//!                     │ Arc<dyn AttentionRepository>
//! ┌───────────────────▼──────────────────────────┐
//! │  LocalRepository (in-memory)                 │
//! │  RwLock<HashMap<UserId, Arc<Mutex<Record>>>> │
//! │  + EvictionPolicy                            │
//! └──────────────────────────────────────────────┘
//! ```

pub mod eviction;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use eviction::{EvictionPolicy, IdleTimeout, RetainAll};
pub use factory::RepositoryFactory;
pub use repositories::LocalRepository;
pub use repository::{AttentionRepository, RecordHandle};
