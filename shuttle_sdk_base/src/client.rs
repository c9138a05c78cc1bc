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

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    session::Session,
    types::{AuthResponse, Location, LocationShare, User, SHARE_WINDOW_SECS},
};

/// A no IO client implementation.
///
/// This client is a state machine that receives responses and updates its
/// state accordingly: it is the single source of truth for "is this device
/// currently broadcasting its location, and until when". Opening or closing
/// a sharing window on the server and sampling positions are orchestrated by
/// the caller; none of the operations here have side effects beyond the
/// state they own.
///
/// All state is behind `Arc`s, so the client can be cloned freely and every
/// clone observes the same state.
#[derive(Clone, Default)]
pub struct BaseClient {
    /// The current session containing the access token and account data of
    /// the logged in user.
    session: Arc<RwLock<Option<Session>>>,
    /// The sharing window cached from the last server response.
    share: Arc<RwLock<Option<LocationShare>>>,
    /// Whether a sharing window is currently open.
    is_sharing: Arc<AtomicBool>,
    /// Seconds left in the current sharing window, `None` while not sharing.
    remaining: Arc<RwLock<Option<u32>>>,
    /// The device's last known position.
    my_location: Arc<RwLock<Option<Location>>>,
}

impl fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseClient")
            .field("is_sharing", &self.is_sharing())
            .finish()
    }
}

impl BaseClient {
    /// Create a new, logged out client with no sharing window.
    pub fn new() -> Self {
        Default::default()
    }

    /// Is the client logged in.
    pub async fn logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The shared session lock.
    ///
    /// The HTTP layer reads the access token out of this when an endpoint
    /// requires authentication.
    pub fn session(&self) -> &Arc<RwLock<Option<Session>>> {
        &self.session
    }

    /// Receive a successful login or signup response and update the session.
    pub async fn receive_login_response(&self, response: &AuthResponse) {
        info!("Logged in as {}", response.email);
        *self.session.write().await = Some(Session::from(response));
    }

    /// Restore a previously persisted session without a new login call.
    pub async fn restore_login(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Refresh the cached account data, in particular the standing location
    /// sharing consent, from a `User` returned by the server.
    pub async fn receive_account_update(&self, user: &User) {
        if let Some(session) = self.session.write().await.as_mut() {
            session.name = user.name.clone();
            session.location_share_agree = user.location_share_agree;
        }
    }

    /// Clear the session and all location data.
    ///
    /// Used on logout; the sharing window and the cached position belong to
    /// the user that is going away.
    pub async fn receive_logout(&self) {
        *self.session.write().await = None;
        self.stop_sharing().await;
        *self.my_location.write().await = None;
    }

    /// Record a sharing window freshly opened on the server.
    ///
    /// Sets the sharing flag and initializes the countdown to the full
    /// window length. The caller is responsible for having obtained the
    /// `LocationShare` from the server first.
    pub async fn start_sharing(&self, share: LocationShare) {
        info!(share_id = share.id, "Location sharing started");

        *self.share.write().await = Some(share);
        *self.remaining.write().await = Some(SHARE_WINDOW_SECS);
        self.is_sharing.store(true, Ordering::SeqCst);
    }

    /// Re-hydrate a sharing window that is already open on the server, e.g.
    /// after a page reload mid-session.
    ///
    /// Unlike [`start_sharing`](Self::start_sharing) the countdown resumes
    /// from the window's real `end_time` instead of restarting at the full
    /// hour.
    pub async fn restore_sharing(&self, share: LocationShare) {
        let remaining = share.remaining_secs(Utc::now());
        info!(share_id = share.id, remaining, "Location sharing restored");

        *self.share.write().await = Some(share);
        *self.remaining.write().await = Some(remaining);
        self.is_sharing.store(true, Ordering::SeqCst);
    }

    /// Forget the current sharing window.
    ///
    /// Idempotent: calling this while not sharing changes nothing.
    pub async fn stop_sharing(&self) {
        if self.is_sharing.swap(false, Ordering::SeqCst) {
            info!("Location sharing stopped");
        }
        *self.share.write().await = None;
        *self.remaining.write().await = None;
    }

    /// Set the remaining time of the current window to the given number of
    /// seconds.
    ///
    /// Callers compute `previous.saturating_sub(1)` once per second. A tick
    /// arriving after the window was already stopped is dropped, so a queued
    /// timer callback cannot resurrect a cleared countdown.
    pub async fn tick(&self, remaining: u32) {
        let mut guard = self.remaining.write().await;

        // The flag is checked under the write lock: a stop that wins the
        // lock clears the flag and the value before this tick observes them.
        if self.is_sharing() {
            *guard = Some(remaining);
        }
    }

    /// Update the device's last known position.
    ///
    /// Independent of the sharing state; the position is tracked while
    /// merely viewing the map as well.
    pub async fn set_my_location(&self, location: Location) {
        *self.my_location.write().await = Some(location);
    }

    /// Whether a sharing window is currently open.
    pub fn is_sharing(&self) -> bool {
        self.is_sharing.load(Ordering::SeqCst)
    }

    /// Seconds left in the current sharing window, `None` while not sharing.
    pub async fn remaining_time(&self) -> Option<u32> {
        *self.remaining.read().await
    }

    /// The cached sharing window, if one is open.
    pub async fn share(&self) -> Option<LocationShare> {
        self.share.read().await.clone()
    }

    /// The device's last known position.
    pub async fn my_location(&self) -> Option<Location> {
        *self.my_location.read().await
    }
}
