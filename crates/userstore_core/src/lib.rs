//! Repository-pattern core for userstore.
//! Application code talks to `Repository<User>` and never to a storage backend.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, Settings};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{User, UserCreate, UserUpdate};
pub use model::{Entity, EntityId};
pub use repo::factory::{BackendKind, FactoryError, RepositoryFactory, UserRepositoryFactory};
pub use repo::in_memory::InMemoryRepository;
pub use repo::sqlite::{SqliteRepository, StoredRecord};
pub use repo::user_record::{SqliteUserRepository, UserRecord};
pub use repo::{RepoError, RepoResult, Repository, UserRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
