use crate::models::{ChunkScan, NewPost, Post, PostChanges, ReadingTime};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// Anything that can hand out posts in ascending id order after a cursor.
#[async_trait]
pub trait PostChunkSource: Send + Sync {
    /// Up to `limit` posts with `id > after_id`, ordered by id ascending.
    async fn fetch_after(&self, after_id: i64, limit: i64) -> Result<Vec<Post>, sqlx::Error>;
}

/// `PostChunkSource` backed by the `posts` table.
#[derive(Clone)]
pub struct PgPostSource {
    pool: PgPool,
}

impl PgPostSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostChunkSource for PgPostSource {
    async fn fetch_after(&self, after_id: i64, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, body, min_to_read, created_at, updated_at
            FROM posts
            WHERE id > $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Walk every post ordered by id, `size` rows at a time.
///
/// Each non-empty batch is passed to `visit`; returning `false` stops the
/// scan and leaves `completed` unset. A short batch ends the scan. A
/// non-positive `size` issues no query and reports an incomplete scan.
pub async fn chunk_by_id<S, V>(source: &S, size: i64, mut visit: V) -> Result<ChunkScan, sqlx::Error>
where
    S: PostChunkSource + ?Sized,
    V: FnMut(&[Post]) -> bool,
{
    let mut scan = ChunkScan::new(size);
    if size <= 0 {
        return Ok(scan);
    }

    let mut after_id = i64::MIN;
    loop {
        let batch = source.fetch_after(after_id, size).await?;
        let last_id = match batch.last() {
            Some(last) => last.id,
            None => break,
        };

        // A cursor that does not move would loop forever.
        if last_id <= after_id {
            return Err(sqlx::Error::Protocol(format!(
                "chunk cursor did not advance past id {}",
                after_id
            )));
        }

        scan.record(&batch);
        if !visit(batch.as_slice()) {
            return Ok(scan);
        }

        if (batch.len() as i64) < size {
            break;
        }
        after_id = last_id;
    }

    scan.completed = true;
    Ok(scan)
}

/// Average `min_to_read` per author, one row per distinct `user_id`.
pub async fn average_min_to_read_by_user(pool: &PgPool) -> Result<Vec<ReadingTime>, sqlx::Error> {
    sqlx::query_as::<_, ReadingTime>(
        r#"
        SELECT user_id,
               AVG(min_to_read)::float8 AS avg_min_to_read,
               COUNT(*) AS post_count
        FROM posts
        GROUP BY user_id
        ORDER BY user_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Insert a post and return the stored row
pub async fn insert_post(pool: &PgPool, post: &NewPost) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, title, body, min_to_read)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, body, min_to_read, created_at, updated_at
        "#,
    )
    .bind(post.user_id)
    .bind(&post.title)
    .bind(&post.body)
    .bind(post.min_to_read)
    .fetch_one(pool)
    .await
}

pub async fn find_post_by_id(pool: &PgPool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, body, min_to_read, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Apply the present fields of `changes`; `None` when the post does not exist
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    changes: &PostChanges,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            body = COALESCE($3, body),
            min_to_read = COALESCE($4, min_to_read),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, title, body, min_to_read, created_at, updated_at
        "#,
    )
    .bind(post_id)
    .bind(changes.title.as_deref())
    .bind(changes.body.as_deref())
    .bind(changes.min_to_read)
    .fetch_optional(pool)
    .await
}

/// Delete a post, returning whether a row was removed
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// One page of posts ordered by id
pub async fn list_posts(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, body, min_to_read, created_at, updated_at
        FROM posts
        ORDER BY id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_posts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM posts")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}
