use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Serialize;

use super::*;

impl DiscordApiClient {
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn into_body(resp: reqwest::Response) -> Result<String, DiscordError> {
        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("Discord rejected the bot token");
            return Err(DiscordError::AuthRequired);
        }

        if !status.is_success() {
            return Err(DiscordError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    /// Execute a GET request with auth headers.
    pub(super) async fn authenticated_get(&self, path: &str) -> Result<String, DiscordError> {
        let resp = self
            .http
            .get(self.url(path))
            .headers(self.auth_headers())
            .send()
            .await?;
        Self::into_body(resp).await
    }

    /// Execute a POST request with auth headers and JSON body.
    pub(super) async fn authenticated_post(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<String, DiscordError> {
        let resp = self
            .http
            .post(self.url(path))
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;
        Self::into_body(resp).await
    }

    /// Execute a PATCH request with auth headers and JSON body.
    pub(super) async fn authenticated_patch(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<String, DiscordError> {
        let resp = self
            .http
            .patch(self.url(path))
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await?;
        Self::into_body(resp).await
    }

    /// Execute a PUT request with auth headers and no body.
    pub(super) async fn authenticated_put_no_body(&self, path: &str) -> Result<(), DiscordError> {
        let resp = self
            .http
            .put(self.url(path))
            .headers(self.auth_headers())
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        Self::into_body(resp).await.map(|_| ())
    }

    /// Execute a DELETE request with auth headers.
    pub(super) async fn authenticated_delete(&self, path: &str) -> Result<(), DiscordError> {
        let resp = self
            .http
            .delete(self.url(path))
            .headers(self.auth_headers())
            .send()
            .await?;
        Self::into_body(resp).await.map(|_| ())
    }
}
