/// Database access layer
///
/// This module provides:
/// - Query helpers for the `posts` table
/// - The keyset-driven chunked scan and its `PostChunkSource` seam
/// - The per-user reading time aggregation
pub mod post_repo;

pub use post_repo::{chunk_by_id, PgPostSource, PostChunkSource};

use sqlx::PgPool;

/// Apply the bundled migrations (creates `posts` and its indexes).
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
