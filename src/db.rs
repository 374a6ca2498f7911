use sqlx::{Pool, Postgres};

mod user;
pub use user::UserExt;

mod post;
pub use post::PostExt;

mod comment;
pub use comment::CommentExt;

#[cfg(test)]
pub mod memory;

/// Postgres-backed store. Cloning is cheap, the pool is an `Arc` inside.
#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }

    /// Apply the schema in `./migrations` (embedded at compile time).
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}
