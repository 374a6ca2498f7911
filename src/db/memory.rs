//! In-memory store with the same constraints as the Postgres schema:
//! unique email/username/title, foreign keys, comments cascade with their post.
//! Ids come from per-table sequences starting at 1 and are never reused.

use tokio::sync::RwLock;

use super::{CommentExt, PostExt, UserExt};
use crate::error::{ForeignField, StoreError, UniqueField};
use crate::models::{Comment, Post, PostFields, PostId, User, UserId};

struct PostRow {
    id: PostId,
    author_id: UserId,
    fields: PostFields,
    date: String,
}

struct CommentRow {
    id: i32,
    post_id: PostId,
    author_id: UserId,
    text: String,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    user_seq: i32,
    post_seq: i32,
    comment_seq: i32,
}

impl Tables {
    fn username_of(&self, user_id: UserId) -> Result<String, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .ok_or(StoreError::ForeignKeyViolation(ForeignField::Author))
    }

    fn post_view(&self, row: &PostRow) -> Result<Post, StoreError> {
        Ok(Post {
            id: row.id,
            author_id: row.author_id,
            author_username: self.username_of(row.author_id)?,
            title: row.fields.title.clone(),
            subtitle: row.fields.subtitle.clone(),
            date: row.date.clone(),
            body: row.fields.body.clone(),
            img_url: row.fields.img_url.clone(),
        })
    }

    fn comment_view(&self, row: &CommentRow) -> Result<Comment, StoreError> {
        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: self.username_of(row.author_id)?,
            text: row.text.clone(),
        })
    }

    fn title_taken(&self, title: &str, except: Option<PostId>) -> bool {
        self.posts
            .iter()
            .any(|p| p.fields.title == title && Some(p.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn comment_count(&self, post_id: PostId) -> usize {
        self.tables
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }
}

impl UserExt for MemoryStore {
    async fn get_user(
        &self,
        user_id: Option<UserId>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        let found = if let Some(user_id) = user_id {
            tables.users.iter().find(|u| u.id == user_id)
        } else if let Some(username) = username {
            tables.users.iter().find(|u| u.username == username)
        } else if let Some(email) = email {
            tables.users.iter().find(|u| u.email == email)
        } else {
            None
        };
        Ok(found.cloned())
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        username: T,
        email: T,
        password: T,
    ) -> Result<User, StoreError> {
        let (username, email) = (username.into(), email.into());
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if tables.users.iter().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation(UniqueField::Username));
        }

        tables.user_seq += 1;
        let user = User {
            id: tables.user_seq,
            username,
            email,
            password: password.into(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user_password(
        &self,
        user_id: UserId,
        password: String,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        user.password = password;
        Ok(user.clone())
    }
}

impl PostExt for MemoryStore {
    async fn get_posts(&self) -> Result<Vec<Post>, StoreError> {
        let tables = self.tables.read().await;
        tables.posts.iter().map(|row| tables.post_view(row)).collect()
    }

    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|row| tables.post_view(row))
            .transpose()
    }

    async fn create_post(
        &self,
        author_id: UserId,
        fields: &PostFields,
        date: &str,
    ) -> Result<Post, StoreError> {
        let mut tables = self.tables.write().await;

        tables.username_of(author_id)?;
        if tables.title_taken(&fields.title, None) {
            return Err(StoreError::UniqueViolation(UniqueField::Title));
        }

        tables.post_seq += 1;
        let row = PostRow {
            id: tables.post_seq,
            author_id,
            fields: fields.clone(),
            date: date.to_string(),
        };
        let post = tables.post_view(&row)?;
        tables.posts.push(row);
        Ok(post)
    }

    async fn edit_post(
        &self,
        post_id: PostId,
        author_id: UserId,
        fields: &PostFields,
    ) -> Result<Option<Post>, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.posts.iter().position(|p| p.id == post_id) else {
            return Ok(None);
        };
        tables.username_of(author_id)?;
        if tables.title_taken(&fields.title, Some(post_id)) {
            return Err(StoreError::UniqueViolation(UniqueField::Title));
        }

        let row = &mut tables.posts[index];
        row.author_id = author_id;
        row.fields = fields.clone();

        tables.post_view(&tables.posts[index]).map(Some)
    }

    async fn delete_post(&self, post_id: PostId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != post_id);
        if tables.posts.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.post_id != post_id);
        Ok(true)
    }
}

impl CommentExt for MemoryStore {
    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|row| tables.comment_view(row))
            .collect()
    }

    async fn create_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;

        tables.username_of(author_id)?;
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(StoreError::ForeignKeyViolation(ForeignField::Post));
        }

        tables.comment_seq += 1;
        let row = CommentRow {
            id: tables.comment_seq,
            post_id,
            author_id,
            text: text.to_string(),
        };
        let comment = tables.comment_view(&row)?;
        tables.comments.push(row);
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            subtitle: "sub".to_string(),
            body: "<p>body</p>".to_string(),
            img_url: "https://example.com/a.png".to_string(),
        }
    }

    #[tokio::test]
    async fn first_user_gets_id_one() {
        let store = MemoryStore::new();
        let first = store.save_user("ann", "a@x.com", "digest").await.unwrap();
        let second = store.save_user("bob", "b@x.com", "digest").await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn unique_columns_are_enforced() {
        let store = MemoryStore::new();
        store.save_user("ann", "a@x.com", "digest").await.unwrap();

        let err = store.save_user("other", "a@x.com", "d").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueField::Email)));

        let err = store.save_user("ann", "new@x.com", "d").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueField::Username)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments_only() {
        let store = MemoryStore::new();
        let user = store.save_user("ann", "a@x.com", "digest").await.unwrap();
        let doomed = store.create_post(user.id, &fields("one"), "d").await.unwrap();
        let kept = store.create_post(user.id, &fields("two"), "d").await.unwrap();
        store.create_comment(user.id, doomed.id, "bye").await.unwrap();
        store.create_comment(user.id, kept.id, "stay").await.unwrap();

        assert!(store.delete_post(doomed.id).await.unwrap());
        assert!(!store.delete_post(doomed.id).await.unwrap());
        assert_eq!(store.comment_count(doomed.id).await, 0);
        assert_eq!(store.comment_count(kept.id).await, 1);
    }

    #[tokio::test]
    async fn comment_needs_an_existing_post() {
        let store = MemoryStore::new();
        let user = store.save_user("ann", "a@x.com", "digest").await.unwrap();
        let err = store.create_comment(user.id, 42, "hi").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation(ForeignField::Post)
        ));
    }

    #[tokio::test]
    async fn comment_needs_an_existing_author() {
        let store = MemoryStore::new();
        let user = store.save_user("ann", "a@x.com", "digest").await.unwrap();
        let post = store.create_post(user.id, &fields("one"), "d").await.unwrap();

        let err = store.create_comment(77, post.id, "hi").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation(ForeignField::Author)
        ));
        assert_eq!(store.comment_count(post.id).await, 0);
    }
}
