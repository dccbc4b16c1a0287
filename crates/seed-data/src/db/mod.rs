//! Store integration for seeding the academic dataset.
//!
//! The [`Seeder`] writes the dataset into any [`DocumentStore`] and
//! [`KeyValueStore`] pair, resolving enrollment references by natural key.
//!
//! [`DocumentStore`]: academico::store::DocumentStore
//! [`KeyValueStore`]: academico::store::KeyValueStore

mod seeder;

pub use seeder::{SeedError, SeedReport, SeededDocuments, Seeder};
