use crate::loader::{PageFetcher, PaginatedLoader};
use crate::optimistic::{EngagementBoard, ReadBoard, ReadMark, Reentrancy, ToggleOutcome};
use async_trait::async_trait;
use pitlane_http::{encode_query, Auth, ClientError, HttpClient, Session, SessionStore};
use pitlane_settings::{ForumSettings, PagingSettings};
use pitlane_types::{
    AuthToken, Comment, Credentials, EngagementState, NewComment, NewPost, NewUser, Notification,
    Page, PageQuery, Post, PostQuery, PostUpdate, ProfileUpdate, RequestType, Role, Routes,
    UnreadCount, User,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

fn to_body<B: Serialize>(body: &B) -> Result<Option<Value>, ClientError> {
    Ok(Some(serde_json::to_value(body)?))
}

/// Typed surface of the forum REST API
#[derive(Debug, Clone)]
pub struct ForumClient {
    http: HttpClient,
    store: Arc<dyn SessionStore>,
    reader: Arc<dyn Session>,
    paging: PagingSettings,
}

impl ForumClient {
    pub fn new<S: SessionStore + 'static>(
        settings: &ForumSettings,
        session: Arc<S>,
    ) -> Result<Self, ClientError> {
        let store: Arc<dyn SessionStore> = session.clone();
        let reader: Arc<dyn Session> = session;

        Ok(ForumClient {
            http: HttpClient::new(&settings.http, store.clone())?,
            store,
            reader,
            paging: settings.paging.clone(),
        })
    }

    /// Client configured from `PITLANE_*` environment variables
    pub fn from_env<S: SessionStore + 'static>(session: Arc<S>) -> Result<Self, ClientError> {
        Self::new(&ForumSettings::default(), session)
    }

    pub fn session(&self) -> Arc<dyn Session> {
        self.reader.clone()
    }

    pub fn paging(&self) -> &PagingSettings {
        &self.paging
    }

    async fn fetch_page<T: serde::de::DeserializeOwned>(
        &self,
        route: Routes,
        page: u32,
        limit: u32,
        filters: Option<String>,
        auth: Auth,
    ) -> Result<Page<T>, ClientError> {
        if page == 0 {
            return Err(ClientError::InvalidPage(page));
        }
        self.http
            .get_page(route, &PageQuery::new(page, limit), filters, auth)
            .await
    }

    // auth

    fn start_session(&self, auth: AuthToken) -> User {
        self.store.sign_in(auth.token, auth.user.id.clone());
        auth.user
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthToken = self
            .http
            .send(
                Routes::AuthLogin,
                RequestType::Post,
                to_body(&credentials)?,
                None,
                Auth::Optional,
            )
            .await?;

        debug!("Logged in as {}", auth.user.username);
        Ok(self.start_session(auth))
    }

    #[instrument(skip_all)]
    pub async fn register(&self, new_user: &NewUser) -> Result<User, ClientError> {
        let auth: AuthToken = self
            .http
            .send(
                Routes::AuthRegister,
                RequestType::Post,
                to_body(new_user)?,
                None,
                Auth::Optional,
            )
            .await?;

        Ok(self.start_session(auth))
    }

    /// Ends the session locally. The server call is best effort; the local
    /// session is cleared even when it fails.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.reader.token().is_some() {
            if let Err(e) = self
                .http
                .send_ack(Routes::AuthLogout, RequestType::Post, None, Auth::Required)
                .await
            {
                warn!("Server logout failed: {}", e);
            }
        }
        self.store.sign_out();
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.http
            .send(Routes::AuthMe, RequestType::Get, None, None, Auth::Required)
            .await
    }

    // posts

    pub async fn list_posts(
        &self,
        query: &PostQuery,
        page: u32,
    ) -> Result<Page<Post>, ClientError> {
        let filters = encode_query(query)?;
        self.fetch_page(
            Routes::Posts,
            page,
            self.paging.feed_page_size,
            Some(filters),
            Auth::Optional,
        )
        .await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, ClientError> {
        self.http
            .send(
                Routes::Post(id.to_string()),
                RequestType::Get,
                None,
                None,
                Auth::Optional,
            )
            .await
    }

    #[instrument(skip_all)]
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        self.http
            .send(
                Routes::Posts,
                RequestType::Post,
                to_body(post)?,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn update_post(&self, id: &str, update: &PostUpdate) -> Result<Post, ClientError> {
        self.http
            .send(
                Routes::Post(id.to_string()),
                RequestType::Put,
                to_body(update)?,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::Post(id.to_string()),
                RequestType::Delete,
                None,
                Auth::Required,
            )
            .await
    }

    /// Flips the viewer's like on a post server-side
    pub async fn like_post(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::PostLike(id.to_string()),
                RequestType::Post,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn user_posts(&self, user_id: &str, page: u32) -> Result<Page<Post>, ClientError> {
        self.fetch_page(
            Routes::UserPosts(user_id.to_string()),
            page,
            self.paging.feed_page_size,
            None,
            Auth::Optional,
        )
        .await
    }

    // comments

    pub async fn list_comments(
        &self,
        post_id: &str,
        page: u32,
    ) -> Result<Page<Comment>, ClientError> {
        self.fetch_page(
            Routes::PostComments(post_id.to_string()),
            page,
            self.paging.comment_page_size,
            None,
            Auth::Optional,
        )
        .await
    }

    /// Posts a comment, or a reply when `parent_id` is set
    pub async fn add_comment(
        &self,
        post_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, ClientError> {
        let comment = NewComment {
            content: content.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        self.http
            .send(
                Routes::PostComments(post_id.to_string()),
                RequestType::Post,
                to_body(&comment)?,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::Comment(id.to_string()),
                RequestType::Delete,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn like_comment(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::CommentLike(id.to_string()),
                RequestType::Post,
                None,
                Auth::Required,
            )
            .await
    }

    // notifications

    pub async fn list_notifications(&self, page: u32) -> Result<Page<Notification>, ClientError> {
        self.fetch_page(
            Routes::Notifications,
            page,
            self.paging.notification_page_size,
            None,
            Auth::Required,
        )
        .await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::NotificationRead(id.to_string()),
                RequestType::Put,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::NotificationsReadAll,
                RequestType::Put,
                None,
                Auth::Required,
            )
            .await
    }

    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        let unread: UnreadCount = self
            .http
            .send(
                Routes::NotificationsUnreadCount,
                RequestType::Get,
                None,
                None,
                Auth::Required,
            )
            .await?;
        Ok(unread.count)
    }

    // profiles

    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        self.http
            .send(
                Routes::User(id.to_string()),
                RequestType::Get,
                None,
                None,
                Auth::Optional,
            )
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        self.http
            .send(
                Routes::Profile,
                RequestType::Put,
                to_body(update)?,
                None,
                Auth::Required,
            )
            .await
    }

    // admin

    pub async fn list_users(&self, page: u32) -> Result<Page<User>, ClientError> {
        self.fetch_page(
            Routes::AdminUsers,
            page,
            self.paging.admin_page_size,
            None,
            Auth::Required,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<User, ClientError> {
        self.http
            .send(
                Routes::AdminUserRole(id.to_string()),
                RequestType::Put,
                Some(json!({ "role": role })),
                None,
                Auth::Required,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_user_banned(&self, id: &str, banned: bool) -> Result<User, ClientError> {
        self.http
            .send(
                Routes::AdminUserBan(id.to_string()),
                RequestType::Put,
                Some(json!({ "banned": banned })),
                None,
                Auth::Required,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .send_ack(
                Routes::AdminUser(id.to_string()),
                RequestType::Delete,
                None,
                Auth::Required,
            )
            .await
    }

    // view state

    /// Infinite-scroll discussion feed
    pub fn post_feed(&self, query: PostQuery) -> PaginatedLoader<Post> {
        PaginatedLoader::infinite(
            PostFeed {
                client: self.clone(),
                query,
            },
            self.paging.feed_page_size,
        )
    }

    pub fn user_post_feed(&self, user_id: &str) -> PaginatedLoader<Post> {
        PaginatedLoader::infinite(
            UserPostFeed {
                client: self.clone(),
                user_id: user_id.to_string(),
            },
            self.paging.feed_page_size,
        )
    }

    pub fn comment_feed(&self, post_id: &str) -> PaginatedLoader<Comment> {
        PaginatedLoader::infinite(
            CommentFeed {
                client: self.clone(),
                post_id: post_id.to_string(),
            },
            self.paging.comment_page_size,
        )
    }

    pub fn notification_feed(&self) -> PaginatedLoader<Notification> {
        PaginatedLoader::infinite(
            NotificationFeed {
                client: self.clone(),
            },
            self.paging.notification_page_size,
        )
    }

    /// Admin user table, paged with numbered controls
    pub fn user_directory(&self) -> PaginatedLoader<User> {
        PaginatedLoader::numbered(
            UserDirectory {
                client: self.clone(),
            },
            self.paging.admin_page_size,
        )
    }

    pub fn engagement_board(&self, policy: Reentrancy) -> EngagementBoard {
        EngagementBoard::new(self.reader.clone(), policy)
    }

    pub fn read_board(&self) -> ReadBoard {
        ReadBoard::new(self.reader.clone(), Reentrancy::Serialize)
    }

    /// Like or unlike a post, applied locally before the request
    pub async fn toggle_post_like(
        &self,
        board: &EngagementBoard,
        post_id: &str,
    ) -> Result<ToggleOutcome<EngagementState>, ClientError> {
        board
            .run(post_id, |id| async move { self.like_post(&id).await })
            .await
    }

    pub async fn toggle_comment_like(
        &self,
        board: &EngagementBoard,
        comment_id: &str,
    ) -> Result<ToggleOutcome<EngagementState>, ClientError> {
        board
            .run(comment_id, |id| async move { self.like_comment(&id).await })
            .await
    }

    /// Marks a notification read locally, then on the server
    pub async fn read_notification(
        &self,
        board: &ReadBoard,
        notification_id: &str,
    ) -> Result<ToggleOutcome<ReadMark>, ClientError> {
        board
            .run(notification_id, |id| async move {
                self.mark_notification_read(&id).await
            })
            .await
    }
}

pub struct PostFeed {
    client: ForumClient,
    query: PostQuery,
}

#[async_trait]
impl PageFetcher<Post> for PostFeed {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Post>, ClientError> {
        let filters = encode_query(&self.query)?;
        self.client
            .fetch_page(Routes::Posts, page, limit, Some(filters), Auth::Optional)
            .await
    }
}

pub struct UserPostFeed {
    client: ForumClient,
    user_id: String,
}

#[async_trait]
impl PageFetcher<Post> for UserPostFeed {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Post>, ClientError> {
        self.client
            .fetch_page(
                Routes::UserPosts(self.user_id.clone()),
                page,
                limit,
                None,
                Auth::Optional,
            )
            .await
    }
}

pub struct CommentFeed {
    client: ForumClient,
    post_id: String,
}

#[async_trait]
impl PageFetcher<Comment> for CommentFeed {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Comment>, ClientError> {
        self.client
            .fetch_page(
                Routes::PostComments(self.post_id.clone()),
                page,
                limit,
                None,
                Auth::Optional,
            )
            .await
    }
}

pub struct NotificationFeed {
    client: ForumClient,
}

#[async_trait]
impl PageFetcher<Notification> for NotificationFeed {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Notification>, ClientError> {
        self.client
            .fetch_page(Routes::Notifications, page, limit, None, Auth::Required)
            .await
    }
}

pub struct UserDirectory {
    client: ForumClient,
}

#[async_trait]
impl PageFetcher<User> for UserDirectory {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<User>, ClientError> {
        self.client
            .fetch_page(Routes::AdminUsers, page, limit, None, Auth::Required)
            .await
    }
}
