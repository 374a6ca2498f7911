use super::DBClient;
use crate::error::StoreError;
use crate::models::{User, UserId};

/// User database operations trait
pub trait UserExt {
    /// Get single user by ID, username or email (first one given wins)
    /// Returns Option - Some(user) if found, None if not found
    async fn get_user(
        &self,
        user_id: Option<UserId>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    /// Insert a user. `password` must already be a digest.
    /// Email and username uniqueness are enforced here, whatever the caller checked.
    async fn save_user<T: Into<String> + Send>(
        &self,
        username: T,
        email: T,
        password: T,
    ) -> Result<User, StoreError>;

    /// Replace the stored digest
    async fn update_user_password(
        &self,
        user_id: UserId,
        password: String,
    ) -> Result<User, StoreError>;
}

impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<UserId>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                "SELECT id, username, email, password FROM users WHERE id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(username) = username {
            user = sqlx::query_as::<_, User>(
                "SELECT id, username, email, password FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                "SELECT id, username, email, password FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        username: T,
        email: T,
        password: T,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password
            "#,
        )
        .bind(username.into())
        .bind(email.into())
        .bind(password.into())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user_password(
        &self,
        user_id: UserId,
        password: String,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password = $1
            WHERE id = $2
            RETURNING id, username, email, password
            "#,
        )
        .bind(password)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
