use crate::models::{ADMIN_USER_ID, Comment, Post, PostFields, UserId};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use validator::Validate;

// DTOs (Data Transfer Objects) define the structure of data exchanged with clients
// They are separate from database models to control exactly what data is exposed

// ============================================================================
// Authentication DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub username: String,

    #[validate(
        length(min = 1, max = 100, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request (requires the current password)
#[derive(Debug, Validate, Default, Clone, Serialize, Deserialize)]
pub struct UserPasswordUpdateDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "new password must be at least 6 characters"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "new passwords do not match"))]
    pub new_password_confirm: String,
}

/// Who is looking at the page. Lets the client decide which controls to show.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewerDto {
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
    #[serde(rename = "userId")]
    pub user_id: Option<UserId>,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl ViewerDto {
    pub fn from_session(session: &Session) -> Self {
        let user_id = session.current_actor();
        ViewerDto {
            logged_in: session.is_authenticated(),
            user_id,
            is_admin: user_id == Some(ADMIN_USER_ID),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponseDto {
    pub status: String,
    pub viewer: ViewerDto,
}

/// Generic success response
#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

// ============================================================================
// Post DTOs
// ============================================================================

/// Post creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InputPostDto {
    #[validate(length(min = 1, max = 250, message = "Title is required."))]
    pub title: String,

    #[validate(length(min = 1, max = 250, message = "Subtitle is required."))]
    pub subtitle: String,

    #[validate(length(min = 1, message = "Body is required."))]
    pub body: String,

    #[validate(
        length(max = 250),
        url(message = "Blog image must be a URL.")
    )]
    pub img_url: String,
}

impl InputPostDto {
    /// Body is rich text from the editor; strip scripts and unsafe attributes before storing.
    pub fn into_fields(self) -> PostFields {
        PostFields {
            title: self.title,
            subtitle: self.subtitle,
            body: ammonia::clean(&self.body),
            img_url: self.img_url,
        }
    }
}

/// Post edit request. Every field is overwritten, the author included.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditPostDto {
    #[validate(nested)]
    #[serde(flatten)]
    pub post: InputPostDto,

    #[validate(range(min = 1, message = "Author is required."))]
    #[serde(rename = "authorId")]
    pub author_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponseDto {
    pub status: String,
    pub data: Vec<Post>,
    pub viewer: ViewerDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailDto {
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailResponseDto {
    pub status: String,
    pub data: PostDetailDto,
    pub viewer: ViewerDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponseDto {
    pub status: String,
    pub data: Post,
}

// ============================================================================
// Comment DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct InputCommentDto {
    #[validate(length(
        min = 1,
        max = 250,
        message = "Comment must be between 1 and 250 characters"
    ))]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub status: String,
    pub data: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SingleCommentResponse {
    pub status: String,
    pub data: Comment,
}
