//! Default seed script - populates the academic stores with sample data
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed
//! ```

use academico::store::{MongoStore, RedisStore};
use seed_data::config::SeedConfig;
use seed_data::dataset::academic_dataset;
use seed_data::db::Seeder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SeedConfig::from_env();
    let dataset = academic_dataset();

    let report = Seeder::run(
        MongoStore::connect(&config.mongodb_url, &config.database),
        || RedisStore::connect(&config.redis_url),
        &dataset,
        config.cache_ttl(),
    )
    .await?;

    // Summary output
    tracing::info!("Seed completed!");
    tracing::info!("  Students: {}", report.documents.student_ids.len());
    tracing::info!("  Courses: {}", report.documents.course_ids.len());
    tracing::info!("  Enrollments: {}", report.documents.enrollment_ids.len());
    tracing::info!("  Cache keys: {}", report.cache_keys.join(", "));

    println!("Seed académico completo");

    Ok(())
}
