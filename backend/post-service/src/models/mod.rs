/// Data models for post-service
///
/// This module defines structures for:
/// - Post: a row of the `posts` table
/// - NewPost / PostChanges: validated request bodies for writes
/// - ReadingTime: one row of the per-user reading time report
/// - ChunkScan: the outcome of a chunked scan over the table
/// - PostForm: field schema handed to clients that render create/edit forms
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const TITLE_MAX_LEN: u64 = 255;
pub const MIN_TO_READ_MAX: i32 = 1_440;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub min_to_read: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPost {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[validate(range(min = 1, max = 1440))]
    pub min_to_read: i32,
}

/// Partial update; PUT and PATCH both only touch the fields that are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostChanges {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub min_to_read: Option<i32>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.min_to_read.is_none()
    }
}

/// Average minutes to read for one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingTime {
    pub user_id: i64,
    pub avg_min_to_read: f64,
    pub post_count: i64,
}

/// Summary of a chunked scan.
///
/// `completed` is `false` when the visitor stopped the scan early or the
/// chunk size was not positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkScan {
    pub completed: bool,
    pub chunk_size: i64,
    pub chunks: u64,
    pub rows: u64,
    pub first_id: Option<i64>,
    pub last_id: Option<i64>,
}

impl ChunkScan {
    pub fn new(chunk_size: i64) -> Self {
        Self {
            completed: false,
            chunk_size,
            chunks: 0,
            rows: 0,
            first_id: None,
            last_id: None,
        }
    }

    pub(crate) fn record(&mut self, batch: &[Post]) {
        if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
            self.first_id.get_or_insert(first.id);
            self.last_id = Some(last.id);
        }
        self.chunks += 1;
        self.rows += batch.len() as u64;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// What a client needs to render the create or edit form for a post.
#[derive(Debug, Clone, Serialize)]
pub struct PostForm {
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<FormField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Post>,
}

impl PostForm {
    pub fn for_create() -> Self {
        let mut fields = vec![FormField {
            name: "user_id",
            kind: "integer",
            required: true,
            min: Some(1),
            max: None,
        }];
        fields.extend(editable_fields(true));

        Self {
            action: "/api/v1/posts".to_string(),
            method: "POST",
            fields,
            values: None,
        }
    }

    pub fn for_edit(post: Post) -> Self {
        Self {
            action: format!("/api/v1/posts/{}", post.id),
            method: "PATCH",
            fields: editable_fields(false),
            values: Some(post),
        }
    }
}

fn editable_fields(required: bool) -> Vec<FormField> {
    vec![
        FormField {
            name: "title",
            kind: "string",
            required,
            min: Some(1),
            max: Some(TITLE_MAX_LEN as i64),
        },
        FormField {
            name: "body",
            kind: "text",
            required,
            min: Some(1),
            max: None,
        },
        FormField {
            name: "min_to_read",
            kind: "integer",
            required,
            min: Some(1),
            max: Some(MIN_TO_READ_MAX as i64),
        },
    ]
}

#[cfg(test)]
pub(crate) fn sample_post(id: i64, user_id: i64, min_to_read: i32) -> Post {
    let now = Utc::now();
    Post {
        id,
        user_id,
        title: format!("post {}", id),
        body: "body".to_string(),
        min_to_read,
        created_at: now,
        updated_at: now,
    }
}
