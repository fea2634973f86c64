pub mod error;
pub mod session;

pub use error::ClientError;
pub use session::{MemorySession, Session, SessionStore};

use pitlane_settings::HttpConfig;
use pitlane_types::{ApiEnvelope, Page, PageQuery, RequestType, Routes};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Whether a request must carry the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Sent with the token when one exists (feeds show the viewer's likes)
    Optional,
    /// Rejected with [`ClientError::SignInRequired`] before any network call
    Required,
}

/// Create a new HTTP client that can be shared across different clients
pub fn build_http_client(settings: &HttpConfig) -> Result<Client, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client_builder = Client::builder().timeout(settings.timeout());
    let client = client_builder.default_headers(headers).build()?;
    Ok(client)
}

pub fn encode_query<Q: Serialize>(query: &Q) -> Result<String, ClientError> {
    Ok(serde_qs::to_string(query)?)
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_path: String,
    session: Arc<dyn SessionStore>,
}

impl HttpClient {
    pub fn new(config: &HttpConfig, session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let client = build_http_client(config)?;

        let api_client = HttpClient {
            client,
            base_path: config.base_path(),
            session,
        };

        debug!(
            "HttpClient initialized with base path: {}",
            api_client.base_path
        );
        Ok(api_client)
    }

    pub fn session(&self) -> Arc<dyn SessionStore> {
        self.session.clone()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn bearer(&self, auth: Auth) -> Result<Option<String>, ClientError> {
        match (auth, self.session.token()) {
            (_, Some(token)) => Ok(Some(token)),
            (Auth::Optional, None) => Ok(None),
            (Auth::Required, None) => {
                debug!("No session token for an authenticated request");
                Err(ClientError::SignInRequired)
            }
        }
    }

    fn update_token_from_response(&self, response: &Response) {
        if let Some(new_token) = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            debug!("Server issued a refreshed token");
            self.session.refresh_token(new_token.to_string());
        }
    }

    async fn _request(
        &self,
        route: &Routes,
        request_type: RequestType,
        body_params: Option<Value>,
        query_string: Option<String>,
        token: Option<String>,
    ) -> Result<Response, ClientError> {
        let url = format!("{}/{}", self.base_path, route.as_path());
        let url = match query_string {
            Some(query_string) if !query_string.is_empty() => format!("{url}?{query_string}"),
            _ => url,
        };

        let builder = match request_type {
            RequestType::Get => self.client.get(url),
            RequestType::Post => self.client.post(url),
            RequestType::Put => self.client.put(url),
            RequestType::Delete => self.client.delete(url),
        };

        let builder = match body_params {
            Some(body) => builder.json(&body),
            None => builder,
        };

        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        Ok(builder.send().await?)
    }

    #[instrument(skip_all, fields(route = %route.as_path()))]
    pub async fn request(
        &self,
        route: Routes,
        request_type: RequestType,
        body_params: Option<Value>,
        query_string: Option<String>,
        auth: Auth,
    ) -> Result<Response, ClientError> {
        let token = self.bearer(auth)?;
        let response = self
            ._request(&route, request_type, body_params, query_string, token)
            .await?;

        // Check and update token if a new one was provided
        self.update_token_from_response(&response);

        Ok(response)
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: Response,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            error!("Unauthorized request");
            return Err(ClientError::Unauthorized);
        }

        match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if !status.is_success() && envelope.success => {
                Err(ClientError::Status(status.as_u16()))
            }
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => {
                error!("Failed to parse response body: {}", e);
                Err(e.into())
            }
            Err(_) => Err(ClientError::Status(status.as_u16())),
        }
    }

    /// Sends a request and decodes the `data` payload of the response
    pub async fn send<T: DeserializeOwned>(
        &self,
        route: Routes,
        request_type: RequestType,
        body_params: Option<Value>,
        query_string: Option<String>,
        auth: Auth,
    ) -> Result<T, ClientError> {
        let response = self
            .request(route, request_type, body_params, query_string, auth)
            .await?;
        let envelope = Self::read_envelope::<T>(response).await?;
        Ok(envelope.into_result()?)
    }

    /// Sends a request whose response carries no payload beyond `success`
    pub async fn send_ack(
        &self,
        route: Routes,
        request_type: RequestType,
        body_params: Option<Value>,
        auth: Auth,
    ) -> Result<(), ClientError> {
        let response = self
            .request(route, request_type, body_params, None, auth)
            .await?;
        let envelope = Self::read_envelope::<Value>(response).await?;
        Ok(envelope.into_ack()?)
    }

    /// Fetches one page of a list resource: `GET <route>?page=<n>&limit=<size>`
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        route: Routes,
        page: &PageQuery,
        filters: Option<String>,
        auth: Auth,
    ) -> Result<Page<T>, ClientError> {
        let mut query_string = encode_query(page)?;
        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            query_string = format!("{query_string}&{filters}");
        }

        let response = self
            .request(route, RequestType::Get, None, Some(query_string), auth)
            .await?;
        let envelope = Self::read_envelope::<Vec<T>>(response).await?;
        Ok(envelope.into_page(page.page)?)
    }
}
