// Copyright 2025 The shuttle-sdk Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{convert::TryFrom, fmt::Debug, sync::Arc};

use http::{HeaderValue, Method as HttpMethod, StatusCode};
use reqwest::Response;
use tokio::sync::RwLock;
use tracing::trace;
use url::Url;

use shuttle_sdk_base::Session;

use crate::{
    api::OutgoingRequest,
    error::{HttpError, HttpResult},
    ClientConfig,
};

/// Abstraction around the underlying transport.
///
/// Any type that implements this trait can be plugged into the client via
/// [`ClientConfig::client`](crate::ClientConfig::client) to handle sending
/// requests and receiving responses.
#[async_trait::async_trait]
pub trait HttpSend: Send + Sync + Debug {
    /// Send the given raw HTTP request and return the raw response.
    async fn send_request(&self, request: http::Request<Vec<u8>>) -> HttpResult<Response>;
}

#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    pub(crate) inner: Arc<dyn HttpSend>,
    pub(crate) base_url: Arc<Url>,
    pub(crate) session: Arc<RwLock<Option<Session>>>,
}

impl HttpClient {
    async fn send_request<Request: OutgoingRequest>(
        &self,
        request: &Request,
    ) -> HttpResult<Response> {
        let url = self.base_url.join(Request::METADATA.path)?;

        let mut builder = http::Request::builder()
            .method(Request::METADATA.method)
            .uri(url.as_str());

        if Request::METADATA.requires_authentication {
            let read_guard = self.session.read().await;

            if let Some(session) = read_guard.as_ref() {
                builder = builder.header(
                    http::header::AUTHORIZATION,
                    format!("Bearer {}", session.access_token),
                );
            } else {
                return Err(HttpError::AuthenticationRequired);
            }
        }

        let body = if Request::METADATA.method == HttpMethod::GET {
            Vec::new()
        } else {
            builder = builder.header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            serde_json::to_vec(request)?
        };

        let request = builder.body(body)?;

        self.inner.send_request(request).await
    }

    pub async fn send<Request>(&self, request: Request) -> HttpResult<Request::IncomingResponse>
    where
        Request: OutgoingRequest,
    {
        let response = self.send_request(&request).await?;

        trace!("Got response: {:?}", response);

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => HttpError::AuthenticationRequired,
                StatusCode::NOT_FOUND => HttpError::NotFound,
                _ => error_from_body(status, &body),
            });
        }

        // Data-less endpoints may answer with an empty body.
        if body.is_empty() {
            Ok(serde_json::from_slice(b"null")?)
        } else {
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

/// Try to extract a structured error from a non-success response body,
/// falling back to the bare status code.
fn error_from_body(status: StatusCode, body: &[u8]) -> HttpError {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: Option<crate::api::ApiErrorBody>,
    }

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: Some(error) }) => HttpError::Api(error),
        _ => HttpError::Server(status),
    }
}

/// Default http client used if none is specified using
/// [`ClientConfig::client`](crate::ClientConfig::client).
#[derive(Clone, Debug)]
pub struct DefaultHttpClient {
    inner: reqwest::Client,
}

impl DefaultHttpClient {
    /// Build a client with the specified configuration.
    pub fn with_config(config: &ClientConfig) -> HttpResult<Self> {
        let http_client = reqwest::Client::builder();

        let http_client = match config.timeout {
            Some(x) => http_client.timeout(x),
            None => http_client,
        };

        let http_client = if config.disable_ssl_verification {
            http_client.danger_accept_invalid_certs(true)
        } else {
            http_client
        };

        let http_client = match &config.proxy {
            Some(p) => http_client.proxy(p.clone()),
            None => http_client,
        };

        let mut headers = reqwest::header::HeaderMap::new();

        let user_agent = match &config.user_agent {
            Some(a) => a.clone(),
            None => HeaderValue::from_static(concat!("shuttle-sdk ", env!("CARGO_PKG_VERSION"))),
        };

        headers.insert(reqwest::header::USER_AGENT, user_agent);

        Ok(Self {
            inner: http_client.default_headers(headers).build()?,
        })
    }
}

#[async_trait::async_trait]
impl HttpSend for DefaultHttpClient {
    async fn send_request(&self, request: http::Request<Vec<u8>>) -> HttpResult<Response> {
        Ok(self
            .inner
            .execute(reqwest::Request::try_from(request)?)
            .await?)
    }
}
