//! Seed data for academico.
//!
//! Populates the document store with a fixed set of students, courses and
//! enrollments, then writes the derived course cache entry and the student
//! ranking into the key-value store.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let config = SeedConfig::from_env();
//! let report = Seeder::run(
//!     MongoStore::connect(&config.mongodb_url, &config.database),
//!     || RedisStore::connect(&config.redis_url),
//!     &academic_dataset(),
//!     config.cache_ttl(),
//! )
//! .await?;
//! ```

pub mod config;
pub mod dataset;
pub mod db;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::SeedConfig;
    pub use crate::dataset::{Dataset, EnrollmentPlan, academic_dataset};
    pub use crate::db::{SeedError, SeedReport, SeededDocuments, Seeder};
    pub use academico::store::{
        Collection, DocumentStore, KeyValueStore, MemoryDocumentStore, MemoryKeyValueStore,
        MongoStore, RedisStore,
    };
}
