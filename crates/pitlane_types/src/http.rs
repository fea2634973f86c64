use crate::error::EnvelopeError;
use crate::forum::User;
use crate::pagination::{Page, Pagination};
use serde::{Deserialize, Serialize};

/// Front-end route the views redirect to when an action needs a signed-in user
pub const SIGN_IN_ROUTE: &str = "/signin";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routes {
    AuthLogin,
    AuthRegister,
    AuthLogout,
    AuthMe,
    Posts,
    Post(String),
    PostLike(String),
    PostComments(String),
    UserPosts(String),
    Comment(String),
    CommentLike(String),
    Notifications,
    NotificationRead(String),
    NotificationsReadAll,
    NotificationsUnreadCount,
    User(String),
    Profile,
    AdminUsers,
    AdminUser(String),
    AdminUserRole(String),
    AdminUserBan(String),
}

impl Routes {
    pub fn as_path(&self) -> String {
        match self {
            Routes::AuthLogin => "auth/login".to_string(),
            Routes::AuthRegister => "auth/register".to_string(),
            Routes::AuthLogout => "auth/logout".to_string(),
            Routes::AuthMe => "auth/me".to_string(),
            Routes::Posts => "posts".to_string(),
            Routes::Post(id) => format!("posts/{id}"),
            Routes::PostLike(id) => format!("posts/{id}/like"),
            Routes::PostComments(id) => format!("posts/{id}/comments"),
            Routes::UserPosts(id) => format!("users/{id}/posts"),
            Routes::Comment(id) => format!("comments/{id}"),
            Routes::CommentLike(id) => format!("comments/{id}/like"),
            Routes::Notifications => "notifications".to_string(),
            Routes::NotificationRead(id) => format!("notifications/{id}/read"),
            Routes::NotificationsReadAll => "notifications/read-all".to_string(),
            Routes::NotificationsUnreadCount => "notifications/unread-count".to_string(),
            Routes::User(id) => format!("users/{id}"),
            Routes::Profile => "users/profile".to_string(),
            Routes::AdminUsers => "admin/users".to_string(),
            Routes::AdminUser(id) => format!("admin/users/{id}"),
            Routes::AdminUserRole(id) => format!("admin/users/{id}/role"),
            Routes::AdminUserBan(id) => format!("admin/users/{id}/ban"),
        }
    }
}

/// Response shape shared by every forum API endpoint.
///
/// Decoded once at the network boundary via [`ApiEnvelope::into_result`] so
/// downstream code never re-checks `success`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,

    pub data: Option<T>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ApiEnvelope<T> {
    fn rejection(message: Option<String>) -> EnvelopeError {
        EnvelopeError::Rejected(message.unwrap_or_else(|| "Request failed".to_string()))
    }

    pub fn into_result(self) -> Result<T, EnvelopeError> {
        if !self.success {
            return Err(Self::rejection(self.message));
        }
        self.data.ok_or(EnvelopeError::MissingData)
    }

    /// Success check for endpoints that carry no payload (likes, deletes)
    pub fn into_ack(self) -> Result<(), EnvelopeError> {
        if self.success {
            Ok(())
        } else {
            Err(Self::rejection(self.message))
        }
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    /// Converts a list response into a [`Page`].
    ///
    /// A response without pagination metadata is treated as the final page.
    pub fn into_page(self, requested: u32) -> Result<Page<T>, EnvelopeError> {
        if !self.success {
            return Err(Self::rejection(self.message));
        }

        let items = self.data.unwrap_or_default();
        let page = match self.pagination {
            Some(pagination) => Page {
                items,
                page: requested,
                total_pages: pagination.pages,
                total: Some(pagination.total),
            },
            None => Page {
                items,
                page: requested,
                total_pages: requested,
                total: None,
            },
        };
        Ok(page)
    }
}
