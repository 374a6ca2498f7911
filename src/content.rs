//! Posts and comments: the operations behind the blog pages, with the
//! integrity rules the store alone does not express.
//!
//! Post mutations take `&Admin`, so they are only callable after the
//! authorization gate. Comments need any authenticated actor.

use chrono::{Local, NaiveDate};
use tracing::instrument;

use crate::{
    db::{CommentExt, PostExt},
    error::{AccessError, ContentError, ForeignField, Resource, StoreError},
    middleware::{Admin, require_user},
    models::{Comment, Post, PostFields, PostId, UserId},
};

/// "October 16, 2026"
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Every post, in id order.
pub async fn list_posts<S: PostExt>(store: &S) -> Result<Vec<Post>, ContentError> {
    Ok(store.get_posts().await?)
}

pub async fn get_post<S: PostExt>(store: &S, post_id: PostId) -> Result<Option<Post>, ContentError> {
    Ok(store.get_post(post_id).await?)
}

/// Publish a post authored by the administrator, dated today.
///
/// An administrator session whose user row is gone is sent back to login.
#[instrument(skip_all, fields(admin = admin.id(), title = %fields.title))]
pub async fn create_post<S: PostExt>(
    store: &S,
    admin: &Admin,
    fields: PostFields,
) -> Result<Post, ContentError> {
    let date = display_date(Local::now().date_naive());

    let post = store
        .create_post(admin.id(), &fields, &date)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(ForeignField::Author) => {
                tracing::warn!("Session refers to a missing user");
                ContentError::Access(AccessError::NotAuthenticated)
            }
            other => other.into(),
        })?;

    tracing::info!(post_id = post.id, "Post created");
    Ok(post)
}

/// Overwrite title, subtitle, image URL, author and body in place.
#[instrument(skip_all, fields(admin = admin.id(), post_id = post_id, author_id = author_id))]
pub async fn update_post<S: PostExt>(
    store: &S,
    admin: &Admin,
    post_id: PostId,
    author_id: UserId,
    fields: PostFields,
) -> Result<Post, ContentError> {
    let post = store
        .edit_post(post_id, author_id, &fields)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(ForeignField::Author) => {
                ContentError::NotFound(Resource::User)
            }
            other => other.into(),
        })?
        .ok_or(ContentError::NotFound(Resource::Post))?;

    tracing::info!("Post updated");
    Ok(post)
}

/// Permanently remove a post. Its comments go with it.
#[instrument(skip_all, fields(admin = admin.id(), post_id = post_id))]
pub async fn delete_post<S: PostExt>(
    store: &S,
    admin: &Admin,
    post_id: PostId,
) -> Result<(), ContentError> {
    if !store.delete_post(post_id).await? {
        return Err(ContentError::NotFound(Resource::Post));
    }

    tracing::info!("Post deleted");
    Ok(())
}

/// All comments whose parent is `post_id`.
pub async fn list_comments_for_post<S: CommentExt>(
    store: &S,
    post_id: PostId,
) -> Result<Vec<Comment>, ContentError> {
    Ok(store.get_comments(post_id).await?)
}

/// Attach a comment to an existing post. Anonymous actors are refused before anything is written.
///
/// An actor whose user row no longer exists is treated like an anonymous one.
#[instrument(skip_all, fields(actor = ?actor, post_id = post_id))]
pub async fn add_comment<S: CommentExt>(
    store: &S,
    actor: Option<UserId>,
    post_id: PostId,
    text: &str,
) -> Result<Comment, ContentError> {
    let author_id = require_user(actor)?;

    let comment = store
        .create_comment(author_id, post_id, text)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(ForeignField::Post) => {
                ContentError::NotFound(Resource::Post)
            }
            StoreError::ForeignKeyViolation(ForeignField::Author) => {
                tracing::warn!("Session refers to a missing user");
                ContentError::Access(AccessError::NotAuthenticated)
            }
            other => other.into(),
        })?;

    tracing::info!(comment_id = comment.id, "Comment added");
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{UserExt, memory::MemoryStore};
    use crate::error::{ErrorMessage, HttpError};
    use crate::middleware::require_admin;
    use axum::http::StatusCode;

    fn fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            subtitle: "A subtitle".to_string(),
            body: "<p>Some body</p>".to_string(),
            img_url: "https://images.example.com/cover.jpg".to_string(),
        }
    }

    /// Store with the admin (id 1) and a regular user (id 2).
    async fn seeded() -> (MemoryStore, Admin) {
        let store = MemoryStore::new();
        store.save_user("admin", "admin@x.com", "digest").await.unwrap();
        store.save_user("reader", "reader@x.com", "digest").await.unwrap();
        (store, require_admin(Some(1)).unwrap())
    }

    #[test]
    fn date_is_month_day_year() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(display_date(date), "March 07, 2026");
    }

    #[tokio::test]
    async fn created_post_reads_back_with_a_date() {
        let (store, admin) = seeded().await;

        let created = create_post(&store, &admin, fields("Hello")).await.unwrap();
        let read = get_post(&store, created.id).await.unwrap().unwrap();

        assert_eq!(read.title, "Hello");
        assert_eq!(read.subtitle, "A subtitle");
        assert_eq!(read.body, "<p>Some body</p>");
        assert_eq!(read.img_url, "https://images.example.com/cover.jpg");
        assert_eq!(read.author_id, 1);
        assert_eq!(read.author_username, "admin");
        assert!(!read.date.is_empty());
    }

    #[tokio::test]
    async fn titles_are_unique() {
        let (store, admin) = seeded().await;
        create_post(&store, &admin, fields("Hello")).await.unwrap();

        let err = create_post(&store, &admin, fields("Hello")).await.unwrap_err();
        assert!(matches!(err, ContentError::DuplicateTitle));
        assert_eq!(list_posts(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn posts_are_listed_in_id_order() {
        let (store, admin) = seeded().await;
        for title in ["b", "a", "c"] {
            create_post(&store, &admin, fields(title)).await.unwrap();
        }

        let ids: Vec<PostId> = list_posts(&store).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn only_the_administrator_obtains_the_admin_capability() {
        assert_eq!(require_admin(Some(2)), Err(AccessError::Forbidden));
        assert_eq!(require_admin(None), Err(AccessError::Forbidden));
        assert_eq!(require_admin(Some(1)).unwrap().id(), 1);
    }

    #[tokio::test]
    async fn update_overwrites_all_five_fields() {
        let (store, admin) = seeded().await;
        let post = create_post(&store, &admin, fields("Hello")).await.unwrap();

        let edited = PostFields {
            title: "Hello again".to_string(),
            subtitle: "New subtitle".to_string(),
            body: "<p>New body</p>".to_string(),
            img_url: "https://images.example.com/new.jpg".to_string(),
        };
        update_post(&store, &admin, post.id, 2, edited.clone())
            .await
            .unwrap();

        let read = get_post(&store, post.id).await.unwrap().unwrap();
        assert_eq!(read.title, edited.title);
        assert_eq!(read.subtitle, edited.subtitle);
        assert_eq!(read.body, edited.body);
        assert_eq!(read.img_url, edited.img_url);
        assert_eq!(read.author_id, 2);
        assert_eq!(read.author_username, "reader");
        assert_eq!(read.date, post.date);
    }

    #[tokio::test]
    async fn update_reports_missing_post_and_missing_author() {
        let (store, admin) = seeded().await;
        let post = create_post(&store, &admin, fields("Hello")).await.unwrap();

        let err = update_post(&store, &admin, 99, 1, fields("x")).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(Resource::Post)));

        let err = update_post(&store, &admin, post.id, 99, fields("x")).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(Resource::User)));
    }

    #[tokio::test]
    async fn delete_removes_post_and_its_comments() {
        let (store, admin) = seeded().await;
        let post = create_post(&store, &admin, fields("Hello")).await.unwrap();
        add_comment(&store, Some(2), post.id, "nice").await.unwrap();

        delete_post(&store, &admin, post.id).await.unwrap();

        assert!(get_post(&store, post.id).await.unwrap().is_none());
        assert!(list_comments_for_post(&store, post.id).await.unwrap().is_empty());

        let err = delete_post(&store, &admin, post.id).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(Resource::Post)));
    }

    #[tokio::test]
    async fn anonymous_comment_is_refused_and_nothing_is_written() {
        let (store, admin) = seeded().await;
        let post = create_post(&store, &admin, fields("Hello")).await.unwrap();

        let err = add_comment(&store, None, post.id, "hi").await.unwrap_err();

        assert!(matches!(
            err,
            ContentError::Access(AccessError::NotAuthenticated)
        ));
        assert_eq!(store.comment_count(post.id).await, 0);
    }

    #[tokio::test]
    async fn comments_are_filtered_by_parent_post() {
        let (store, admin) = seeded().await;
        let first = create_post(&store, &admin, fields("one")).await.unwrap();
        let second = create_post(&store, &admin, fields("two")).await.unwrap();
        add_comment(&store, Some(2), first.id, "a").await.unwrap();
        add_comment(&store, Some(1), second.id, "b").await.unwrap();
        add_comment(&store, Some(2), first.id, "c").await.unwrap();

        let mut texts: Vec<String> = list_comments_for_post(&store, first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let (store, _) = seeded().await;
        let err = add_comment(&store, Some(2), 5, "hi").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(Resource::Post)));
        assert_eq!(store.comment_count(5).await, 0);
    }

    #[tokio::test]
    async fn comment_from_a_deleted_user_sends_them_to_login() {
        let (store, admin) = seeded().await;
        let post = create_post(&store, &admin, fields("Hello")).await.unwrap();

        // a still-valid cookie for a user that is not in the store
        let err = add_comment(&store, Some(77), post.id, "hi").await.unwrap_err();
        assert!(matches!(
            err,
            ContentError::Access(AccessError::NotAuthenticated)
        ));

        let http: HttpError = err.into();
        assert_eq!(http.status, StatusCode::UNAUTHORIZED);
        assert_eq!(http.message, ErrorMessage::UserNotAuthenticated.to_string());
        assert!(get_post(&store, post.id).await.unwrap().is_some());
        assert_eq!(store.comment_count(post.id).await, 0);
    }

    #[tokio::test]
    async fn create_post_for_a_missing_administrator_row_sends_them_to_login() {
        // the admin's cookie outlived a reseed that left the users table empty
        let store = MemoryStore::new();
        let admin = require_admin(Some(1)).unwrap();

        let err = create_post(&store, &admin, fields("Hello")).await.unwrap_err();
        assert!(matches!(
            err,
            ContentError::Access(AccessError::NotAuthenticated)
        ));
        assert!(list_posts(&store).await.unwrap().is_empty());
    }
}
