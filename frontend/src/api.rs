//! Typed calls against the forum's REST API.
//!
//! Each method issues exactly one request. The active identity, when there
//! is one, rides along as the percent-encoded `x-username` header. Any
//! non-2xx status fails the call; nothing is retried or cached.

use std::rc::Rc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::identity::IdentityStore;
use crate::models::{
    Comment, ContentRequest, HealthStatus, LikeRequest, LikeResponse, Post,
};
use crate::transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
use crate::wire;
use crate::USERNAME_HEADER;

pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    identity: Rc<IdentityStore>,
}

impl ApiClient<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig, identity: Rc<IdentityStore>) -> Self {
        ApiClient::new(ReqwestTransport::new(config.base_url.as_str()), identity)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, identity: Rc<IdentityStore>) -> Self {
        ApiClient {
            transport,
            identity,
        }
    }

    pub fn identity(&self) -> &Rc<IdentityStore> {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn health(&self) -> Result<Option<HealthStatus>, ApiError> {
        self.fetch_optional(Method::Get, "/api/health".to_owned(), None)
            .await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.fetch_list(Method::Get, "/api/posts".to_owned()).await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError> {
        self.fetch_optional(Method::Get, post_path(post_id), None)
            .await
    }

    pub async fn create_post(
        &self,
        content: &str,
        username: &str,
    ) -> Result<Option<Post>, ApiError> {
        let path = "/api/posts".to_owned();
        let body = self.encode_body(Method::Post, &path, &ContentRequest::new(username, content))?;
        self.fetch_optional(Method::Post, path, Some(body)).await
    }

    pub async fn update_post(
        &self,
        post_id: &str,
        content: &str,
        username: &str,
    ) -> Result<Option<Post>, ApiError> {
        let path = post_path(post_id);
        let body =
            self.encode_body(Method::Patch, &path, &ContentRequest::new(username, content))?;
        self.fetch_optional(Method::Patch, path, Some(body)).await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::Delete, post_path(post_id), None))
            .await
            .map(|_| ())
    }

    pub async fn like_post(
        &self,
        post_id: &str,
        username: &str,
    ) -> Result<Option<LikeResponse>, ApiError> {
        let path = likes_path(post_id);
        let like = LikeRequest {
            username: username.to_owned(),
        };
        let body = self.encode_body(Method::Post, &path, &like)?;
        self.fetch_optional(Method::Post, path, Some(body)).await
    }

    /// Succeeds on any 2xx without looking at the body.
    pub async fn unlike_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::Delete, likes_path(post_id), None))
            .await
            .map(|_| ())
    }

    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.fetch_list(Method::Get, comments_path(post_id)).await
    }

    pub async fn create_comment(
        &self,
        post_id: &str,
        content: &str,
        username: &str,
    ) -> Result<Option<Comment>, ApiError> {
        let path = comments_path(post_id);
        let body = self.encode_body(Method::Post, &path, &ContentRequest::new(username, content))?;
        self.fetch_optional(Method::Post, path, Some(body)).await
    }

    pub async fn update_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        content: &str,
        username: &str,
    ) -> Result<Option<Comment>, ApiError> {
        let path = comment_path(post_id, comment_id);
        let body =
            self.encode_body(Method::Patch, &path, &ContentRequest::new(username, content))?;
        self.fetch_optional(Method::Patch, path, Some(body)).await
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::Delete, comment_path(post_id, comment_id), None))
            .await
            .map(|_| ())
    }

    /// Builds a request stamped with the active identity.
    pub fn request(&self, method: Method, path: String, body: Option<String>) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.body = body;

        if let Some(identity) = self.identity.current_identity() {
            if !identity.username.is_empty() {
                request.headers.push((
                    USERNAME_HEADER.to_owned(),
                    urlencoding::encode(&identity.username).into_owned(),
                ));
            }
        }

        request
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        debug!("{} {}", method, path);

        let response = self.transport.send(request).await.map_err(|err| {
            warn!("{} {} did not complete: {}", method, path, err);
            ApiError::from(err)
        })?;

        if !response.is_success() {
            warn!("{} {} returned {}", method, path, response.status);
            return Err(ApiError::HttpFailure {
                method,
                path,
                status: response.status,
            });
        }

        Ok(response)
    }

    async fn fetch_list<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
    ) -> Result<Vec<R>, ApiError> {
        let response = self.execute(self.request(method, path.clone(), None)).await?;
        wire::decode_list(&response.body).map_err(|source| decode_failure(method, path, source))
    }

    async fn fetch_optional<R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<String>,
    ) -> Result<Option<R>, ApiError> {
        let response = self.execute(self.request(method, path.clone(), body)).await?;
        wire::decode_optional(&response.body)
            .map_err(|source| decode_failure(method, path, source))
    }

    fn encode_body<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        wire::encode(body).map_err(|source| ApiError::EncodeFailure {
            method,
            path: path.to_owned(),
            source,
        })
    }
}

fn decode_failure(method: Method, path: String, source: serde_json::Error) -> ApiError {
    warn!("{} {} returned an unexpected body: {}", method, path, source);
    ApiError::DecodeFailure {
        method,
        path,
        source,
    }
}

fn post_path(post_id: &str) -> String {
    format!("/api/posts/{}", post_id)
}

fn likes_path(post_id: &str) -> String {
    format!("/api/posts/{}/likes", post_id)
}

fn comments_path(post_id: &str) -> String {
    format!("/api/posts/{}/comments", post_id)
}

fn comment_path(post_id: &str, comment_id: &str) -> String {
    format!("/api/posts/{}/comments/{}", post_id, comment_id)
}
