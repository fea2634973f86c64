use mockito::{Matcher, Mock, ServerGuard};
use pitlane_settings::{ForumSettings, HttpConfig, PagingSettings};
use pitlane_types::User;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const API_PREFIX: &str = "api";

/// `{ success: true, data }`
pub fn envelope<T: Serialize>(data: &T) -> Value {
    json!({ "success": true, "data": data })
}

/// List response with pagination metadata
pub fn page_envelope<T: Serialize>(
    items: &[T],
    page: u32,
    limit: u32,
    pages: u32,
    total: u64,
) -> Value {
    json!({
        "success": true,
        "data": items,
        "pagination": { "page": page, "limit": limit, "pages": pages, "total": total }
    })
}

/// A mockito server speaking the forum API's envelope format
pub struct MockForumApi {
    server: ServerGuard,
}

impl MockForumApi {
    pub async fn start() -> Self {
        let server = mockito::Server::new_async().await;
        debug!("Mock forum API listening on {}", server.url());
        MockForumApi { server }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Settings pointing at this server with small page sizes
    pub fn settings(&self, page_size: u32) -> ForumSettings {
        ForumSettings {
            http: HttpConfig::new(Some(self.url()), Some(API_PREFIX.to_string()), Some(5)),
            paging: PagingSettings {
                feed_page_size: page_size,
                comment_page_size: page_size,
                notification_page_size: page_size,
                admin_page_size: page_size,
            },
        }
    }

    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    fn path(route: &str) -> String {
        format!("/{}/{}", API_PREFIX, route.trim_start_matches('/'))
    }

    pub async fn mock_json(
        &mut self,
        method: &str,
        route: &str,
        status: usize,
        body: Value,
    ) -> Mock {
        self.server
            .mock(method, Self::path(route).as_str())
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_ok<T: Serialize>(&mut self, method: &str, route: &str, data: &T) -> Mock {
        self.mock_json(method, route, 200, envelope(data)).await
    }

    pub async fn mock_ack(&mut self, method: &str, route: &str) -> Mock {
        self.mock_json(method, route, 200, json!({ "success": true })).await
    }

    pub async fn mock_rejection(
        &mut self,
        method: &str,
        route: &str,
        status: usize,
        message: &str,
    ) -> Mock {
        self.mock_json(
            method,
            route,
            status,
            json!({ "success": false, "message": message }),
        )
        .await
    }

    /// `GET <route>?page=<page>&limit=<limit>` answered with `items`
    pub async fn mock_page<T: Serialize>(
        &mut self,
        route: &str,
        page: u32,
        limit: u32,
        items: &[T],
        pages: u32,
        total: u64,
    ) -> Mock {
        self.server
            .mock("GET", Self::path(route).as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), page.to_string()),
                Matcher::UrlEncoded("limit".into(), limit.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page_envelope(items, page, limit, pages, total).to_string())
            .create_async()
            .await
    }

    /// An endpoint that must never be hit
    pub async fn mock_untouched(&mut self, method: &str, route: &str) -> Mock {
        self.server
            .mock(method, Self::path(route).as_str())
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await
    }

    pub async fn mock_login(&mut self, user: &User, token: &str) -> Mock {
        let auth = json!({ "token": token, "user": user });
        self.mock_ok("POST", "auth/login", &auth).await
    }
}
