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

//! Wire types for the shuttle-tracker HTTP API.
//!
//! Every endpoint lives in its own module with a `Request` type describing
//! the body and a `Response` alias for what the server sends back. The
//! authentication endpoints return bare payloads; the location endpoints
//! wrap theirs in the [`ApiResponse`] envelope.

use http::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{HttpError, HttpResult};

/// Static description of an endpoint.
#[derive(Clone, Debug)]
pub struct Metadata {
    /// The HTTP method.
    pub method: Method,
    /// The path of the endpoint, relative to the base URL.
    pub path: &'static str,
    /// Whether the endpoint needs a bearer token.
    pub requires_authentication: bool,
}

/// A request that can be sent to the shuttle-tracker server.
pub trait OutgoingRequest: Serialize {
    /// The deserialized response to this request.
    type IncomingResponse: DeserializeOwned;

    /// Metadata of the endpoint this request goes to.
    const METADATA: Metadata;
}

/// The envelope the location endpoints wrap their payloads in.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The payload, absent on failure and on data-less endpoints.
    pub data: Option<T>,
    /// The structured error, present on failure.
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, converting a server-side error body into an
    /// [`HttpError`].
    pub fn into_data(self) -> HttpResult<T> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(HttpError::Api(error)),
            (None, None) => Err(HttpError::MissingData),
        }
    }

    /// Check the envelope of a data-less endpoint.
    pub fn ok(self) -> HttpResult<()> {
        match self.error {
            Some(error) => Err(HttpError::Api(error)),
            None => Ok(()),
        }
    }
}

/// A structured error returned inside the [`ApiResponse`] envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// A machine readable error code.
    pub code: String,
    /// A human readable description.
    pub message: String,
    /// The HTTP status the server associates with this error.
    pub http_status: u16,
}

/// Authentication endpoints. These return bare payloads.
pub mod auth {
    /// `POST /auth/login`
    pub mod login {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::AuthResponse;

        use crate::api::{Metadata, OutgoingRequest};

        /// The login request body.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request {
            /// The email address to log in with.
            pub email: String,
            /// The account password.
            pub password: String,
        }

        /// The response to a login request.
        pub type Response = AuthResponse;

        impl OutgoingRequest for Request {
            type IncomingResponse = Response;

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/auth/login",
                requires_authentication: false,
            };
        }
    }

    /// `POST /auth/signup`
    pub mod signup {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::AuthResponse;

        use crate::api::{Metadata, OutgoingRequest};

        /// The signup request body.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request {
            /// The email address to register, doubling as the login name.
            pub email: String,
            /// The account password.
            pub password: String,
            /// Display name.
            pub name: String,
        }

        /// The response to a signup request; the account is logged in right
        /// away.
        pub type Response = AuthResponse;

        impl OutgoingRequest for Request {
            type IncomingResponse = Response;

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/auth/signup",
                requires_authentication: false,
            };
        }
    }

    /// `PUT /auth/password`
    pub mod change_password {
        use http::Method;
        use serde::Serialize;

        use crate::api::{Metadata, OutgoingRequest};

        /// The password change body.
        #[derive(Clone, Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Request {
            /// The password the account currently has.
            pub current_password: String,
            /// The password to change to.
            pub new_password: String,
        }

        impl OutgoingRequest for Request {
            type IncomingResponse = ();

            const METADATA: Metadata = Metadata {
                method: Method::PUT,
                path: "/auth/password",
                requires_authentication: true,
            };
        }
    }

    /// `POST /auth/logout`
    pub mod logout {
        use http::Method;
        use serde::Serialize;

        use crate::api::{Metadata, OutgoingRequest};

        /// The body-less logout request.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request;

        impl OutgoingRequest for Request {
            type IncomingResponse = ();

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/auth/logout",
                requires_authentication: true,
            };
        }
    }

    /// `GET /auth/me`
    pub mod me {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::User;

        use crate::api::{Metadata, OutgoingRequest};

        /// The body-less account data request.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request;

        impl OutgoingRequest for Request {
            type IncomingResponse = User;

            const METADATA: Metadata = Metadata {
                method: Method::GET,
                path: "/auth/me",
                requires_authentication: true,
            };
        }
    }

    /// `PUT /auth/location-share-agree`
    pub mod set_location_share_agree {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::User;

        use crate::api::{Metadata, OutgoingRequest};

        /// The consent update body.
        #[derive(Clone, Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Request {
            /// The new value of the standing consent flag.
            pub location_share_agree: bool,
        }

        impl OutgoingRequest for Request {
            type IncomingResponse = User;

            const METADATA: Metadata = Metadata {
                method: Method::PUT,
                path: "/auth/location-share-agree",
                requires_authentication: true,
            };
        }
    }
}

/// Location sharing endpoints. These use the [`ApiResponse`] envelope.
pub mod location {
    /// `POST /api/v1/location/start`
    pub mod start {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::{Location, LocationShare};

        use crate::api::{ApiResponse, Metadata, OutgoingRequest};

        /// The body of the open-session request: the position to start
        /// broadcasting from.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request {
            /// Latitude in degrees.
            pub latitude: f64,
            /// Longitude in degrees.
            pub longitude: f64,
        }

        impl Request {
            /// Build a start request from a location.
            pub fn new(location: Location) -> Self {
                Self { latitude: location.lat, longitude: location.lng }
            }
        }

        impl OutgoingRequest for Request {
            type IncomingResponse = ApiResponse<LocationShare>;

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/api/v1/location/start",
                requires_authentication: true,
            };
        }
    }

    /// `POST /api/v1/location/stop`
    pub mod stop {
        use http::Method;
        use serde::Serialize;
        use serde_json::Value as JsonValue;

        use crate::api::{ApiResponse, Metadata, OutgoingRequest};

        /// The body-less close-session request.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request;

        impl OutgoingRequest for Request {
            type IncomingResponse = ApiResponse<JsonValue>;

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/api/v1/location/stop",
                requires_authentication: true,
            };
        }
    }

    /// `POST /api/v1/location/update`
    pub mod update {
        use http::Method;
        use serde::Serialize;
        use serde_json::Value as JsonValue;
        use shuttle_sdk_base::Location;

        use crate::api::{ApiResponse, Metadata, OutgoingRequest};

        /// The body of the fire-and-forget position update.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request {
            /// Latitude in degrees.
            pub latitude: f64,
            /// Longitude in degrees.
            pub longitude: f64,
        }

        impl Request {
            /// Build an update request from a location.
            pub fn new(location: Location) -> Self {
                Self { latitude: location.lat, longitude: location.lng }
            }
        }

        impl OutgoingRequest for Request {
            type IncomingResponse = ApiResponse<JsonValue>;

            const METADATA: Metadata = Metadata {
                method: Method::POST,
                path: "/api/v1/location/update",
                requires_authentication: true,
            };
        }
    }

    /// `GET /api/v1/location/me`
    pub mod mine {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::LocationShare;

        use crate::api::{ApiResponse, Metadata, OutgoingRequest};

        /// The body-less own-session read. A 404 answer means no session is
        /// open.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request;

        impl OutgoingRequest for Request {
            type IncomingResponse = ApiResponse<LocationShare>;

            const METADATA: Metadata = Metadata {
                method: Method::GET,
                path: "/api/v1/location/me",
                requires_authentication: true,
            };
        }
    }

    /// `GET /api/v1/location/friends`
    pub mod friends {
        use http::Method;
        use serde::Serialize;
        use shuttle_sdk_base::FriendLocation;

        use crate::api::{ApiResponse, Metadata, OutgoingRequest};

        /// The body-less friends-location read.
        #[derive(Clone, Debug, Serialize)]
        pub struct Request;

        impl OutgoingRequest for Request {
            type IncomingResponse = ApiResponse<Vec<FriendLocation>>;

            const METADATA: Metadata = Metadata {
                method: Method::GET,
                path: "/api/v1/location/friends",
                requires_authentication: true,
            };
        }
    }
}
