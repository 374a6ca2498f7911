use serde::{Deserialize, Serialize};

pub type UserId = i32;
pub type PostId = i32;
pub type CommentId = i32;

/// The administrator is structurally the first user ever registered.
///
/// There is no role column: reseeding the `users` table must keep id 1
/// assigned to the intended administrator.
pub const ADMIN_USER_ID: UserId = 1;

/// User model representing the users table
///
/// Security notes:
/// - `password`: Stores the argon2 digest (never plain text), and is never serialized
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Blog post as read back from the posts table, joined with its author's username.
///
/// `date` is a display string ("October 16, 2026") stamped once at creation.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    #[serde(rename = "authorUsername")]
    pub author_username: String,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// Comment attached to a post, joined with its author's username.
///
/// - `author_id`: References users.id
/// - `post_id`: References posts.id (deleted together with the post)
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    #[serde(rename = "authorUsername")]
    pub author_username: String,
    pub text: String,
}

/// Editable post columns. Updates overwrite every one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFields {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}
