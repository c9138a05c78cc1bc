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

//! Error conditions.

use http::StatusCode;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

use crate::{api::ApiErrorBody, geolocation::GeolocationError};

/// Result type of the shuttle-sdk.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Result type of a pure HTTP request.
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// An HTTP error, representing either a connection error or an error
/// response from the server.
#[derive(Error, Debug)]
pub enum HttpError {
    /// An error at the HTTP layer.
    #[error(transparent)]
    Reqwest(#[from] ReqwestError),

    /// Queried endpoint requires authentication but was called on an
    /// anonymous client.
    #[error("the queried endpoint requires authentication but was called before logging in")]
    AuthenticationRequired,

    /// The server rejected the request with a structured error body.
    #[error("the server returned an error: [{}] {}", .0.code, .0.message)]
    Api(ApiErrorBody),

    /// The requested resource does not exist.
    ///
    /// On the sharing-session read this is the normal "not sharing" answer,
    /// not a failure; callers in that path absorb it.
    #[error("the requested resource was not found")]
    NotFound,

    /// The server returned a non-success status without a parsable body.
    #[error("the server returned an unexpected status: {0}")]
    Server(StatusCode),

    /// A 2xx response that did not carry the payload the endpoint promises.
    #[error("the server response was missing the expected data")]
    MissingData,

    /// An error deserializing a response body.
    #[error(transparent)]
    Json(#[from] JsonError),

    /// An error constructing the raw HTTP request.
    #[error(transparent)]
    IntoHttp(#[from] http::Error),

    /// An error when joining the endpoint path onto the base URL.
    #[error(transparent)]
    Url(#[from] UrlParseError),
}

/// Internal representation of errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error doing an HTTP request.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// An error from the position sampling primitive.
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Queried endpoint requires authentication but was called on an
    /// anonymous client.
    #[error("the queried endpoint requires authentication but was called before logging in")]
    AuthenticationRequired,

    /// The user has not granted the standing location sharing consent, so no
    /// sharing window may be opened.
    #[error("location sharing requires the standing consent setting to be enabled")]
    ConsentRequired,

    /// A sharing window is already open for this client.
    #[error("a location sharing session is already active")]
    AlreadySharing,

    /// An error when parsing a string as a URL.
    #[error(transparent)]
    Url(#[from] UrlParseError),

    /// An error when serializing or deserializing a JSON value.
    #[error(transparent)]
    Json(#[from] JsonError),
}
