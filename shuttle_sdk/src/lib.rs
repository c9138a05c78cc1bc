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

//! This crate implements a client SDK for the shuttle-tracker service: login
//! and account handling, time-bounded location sharing windows with a
//! one-second countdown, continuous position tracking through a pluggable
//! [`PositionSource`], and the read endpoints the live map consumes.
//!
//! The heavy lifting is split between this crate, which owns all IO, and
//! [`shuttle_sdk_base`], a no-IO state machine that can be driven and tested
//! on its own.
//!
//! # Enabling logging
//!
//! Users of the shuttle-sdk crate can enable log output by depending on the
//! `tracing-subscriber` crate and including the following line in their
//! application (e.g. at the start of `main`):
//!
//! ```text
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The log output is controlled via the `RUST_LOG` environment variable by
//! setting it to one of the `error`, `warn`, `info`, `debug` or `trace`
//! levels. The output can be more granular by specifying the level per
//! module, e.g. `RUST_LOG=shuttle_sdk=debug` to only see the log output of
//! this crate.

#![deny(
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

#[cfg(not(any(feature = "native-tls", feature = "rustls-tls")))]
compile_error!("one of the `native-tls` or `rustls-tls` features must be enabled");

pub use reqwest;
pub use shuttle_sdk_base::{
    AuthResponse, BaseClient, FriendLocation, Location, LocationShare, Session, User,
    SHARE_WINDOW_SECS,
};

pub mod api;
mod client;
mod error;
mod geolocation;
mod http_client;
mod tracker;

pub use client::{Client, ClientConfig, CountdownOutcome, LoopCtrl};
pub use error::{Error, HttpError, Result};
pub use geolocation::{FixOptions, GeolocationError, PositionSource, PositionSubscription};
pub use http_client::{DefaultHttpClient, HttpSend};
