/// Post service - CRUD, chunked scans and the reading time report
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::db::post_repo::{self, chunk_by_id, PgPostSource};
use crate::error::{AppError, Result};
use crate::metrics::{
    record_outcome, Outcome, POST_SCAN_CHUNKS_TOTAL, POST_SCAN_DURATION_SECONDS,
    POST_SCAN_ROWS_TOTAL,
};
use crate::models::{ChunkScan, NewPost, Post, PostChanges, ReadingTime};
use sqlx::PgPool;
use validator::Validate;

pub struct PostService {
    pool: PgPool,
    chunk_size: i64,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self::with_chunk_size(pool, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(pool: PgPool, chunk_size: i64) -> Self {
        Self { pool, chunk_size }
    }

    /// Batch size used when a scan does not ask for one
    pub fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    /// Walk the whole table in id order, handing each batch to `visit`.
    ///
    /// `visit` returns `false` to stop early.
    pub async fn for_each_chunk<V>(&self, size: i64, visit: V) -> Result<ChunkScan>
    where
        V: FnMut(&[Post]) -> bool,
    {
        let source = PgPostSource::new(self.pool.clone());
        let timer = POST_SCAN_DURATION_SECONDS.start_timer();
        let scan = chunk_by_id(&source, size, visit).await?;
        timer.observe_duration();

        tracing::info!(
            chunk_size = size,
            chunks = scan.chunks,
            rows = scan.rows,
            completed = scan.completed,
            "post chunk scan finished"
        );

        Ok(scan)
    }

    /// Scan every post with the configured (or requested) batch size.
    pub async fn scan_in_chunks(&self, size: Option<i64>) -> Result<ChunkScan> {
        let size = size.unwrap_or(self.chunk_size);

        let result = self
            .for_each_chunk(size, |batch| {
                if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
                    tracing::debug!(
                        rows = batch.len(),
                        first_id = first.id,
                        last_id = last.id,
                        "post chunk"
                    );
                }
                POST_SCAN_CHUNKS_TOTAL.inc();
                POST_SCAN_ROWS_TOTAL.inc_by(batch.len() as u64);
                true
            })
            .await;
        record_outcome("index", Outcome::of_result(&result));
        result
    }

    /// Average minutes to read, one entry per author.
    pub async fn reading_time_by_user(&self) -> Result<Vec<ReadingTime>> {
        let result = post_repo::average_min_to_read_by_user(&self.pool).await;
        record_outcome("reading_time", Outcome::of_result(&result));
        Ok(result?)
    }

    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post> {
        if let Err(e) = new_post.validate() {
            record_outcome("store", Outcome::Invalid);
            return Err(e.into());
        }

        let result = post_repo::insert_post(&self.pool, new_post).await;
        record_outcome("store", Outcome::of_result(&result));
        let post = result?;
        tracing::info!(post_id = post.id, user_id = post.user_id, "post created");

        Ok(post)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        self.find_post("show", post_id).await
    }

    /// Same lookup as `get_post`, counted as an edit form request
    pub async fn get_post_for_edit(&self, post_id: i64) -> Result<Option<Post>> {
        self.find_post("edit", post_id).await
    }

    async fn find_post(&self, operation: &str, post_id: i64) -> Result<Option<Post>> {
        let result = post_repo::find_post_by_id(&self.pool, post_id).await;
        record_outcome(operation, Outcome::of_lookup(&result));
        Ok(result?)
    }

    /// Apply a partial update; `None` when the post does not exist
    pub async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>> {
        if changes.is_empty() {
            record_outcome("update", Outcome::Invalid);
            return Err(AppError::ValidationError(
                "at least one of title, body, min_to_read must be provided".to_string(),
            ));
        }
        if let Err(e) = changes.validate() {
            record_outcome("update", Outcome::Invalid);
            return Err(e.into());
        }

        let result = post_repo::update_post(&self.pool, post_id, changes).await;
        record_outcome("update", Outcome::of_lookup(&result));
        let updated = result?;

        if updated.is_some() {
            tracing::info!(post_id, "post updated");
        }

        Ok(updated)
    }

    /// Delete a post, returning whether it existed
    pub async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = post_repo::delete_post(&self.pool, post_id).await;
        record_outcome("destroy", Outcome::of_delete(&result));
        let deleted = result?;

        if deleted {
            tracing::info!(post_id, "post deleted");
        }

        Ok(deleted)
    }

    /// One page of posts plus the total row count
    pub async fn list_posts(&self, limit: i64, offset: i64) -> Result<(Vec<Post>, i64)> {
        let result = async {
            let posts = post_repo::list_posts(&self.pool, limit, offset).await?;
            let total = post_repo::count_posts(&self.pool).await?;
            Ok::<_, sqlx::Error>((posts, total))
        }
        .await;
        record_outcome("page", Outcome::of_result(&result));

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::requests_recorded;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    /// A pool that never reaches a database.
    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:1/posts")
            .unwrap()
    }

    #[tokio::test]
    async fn store_and_destroy_are_counted() {
        let service = PostService::new(unreachable_pool());

        let invalid_before = requests_recorded("store", Outcome::Invalid);
        let bad_post = NewPost {
            user_id: 1,
            title: String::new(),
            body: "body".to_string(),
            min_to_read: 3,
        };
        assert!(matches!(
            service.create_post(&bad_post).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(requests_recorded("store", Outcome::Invalid), invalid_before + 1);

        let error_before = requests_recorded("destroy", Outcome::Error);
        assert!(service.delete_post(42).await.is_err());
        assert_eq!(requests_recorded("destroy", Outcome::Error), error_before + 1);
    }

    #[tokio::test]
    async fn empty_update_is_counted_as_invalid() {
        let service = PostService::new(unreachable_pool());
        let before = requests_recorded("update", Outcome::Invalid);

        let result = service.update_post(1, &PostChanges::default()).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(requests_recorded("update", Outcome::Invalid), before + 1);
    }
}
