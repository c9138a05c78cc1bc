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

use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};

use futures_timer::Delay as sleep;
use http::header::{HeaderValue, InvalidHeaderValue};
use tracing::{info, instrument, warn};
use url::Url;

use shuttle_sdk_base::{AuthResponse, BaseClient, FriendLocation, Location, LocationShare, Session, User};

use crate::{
    api::{auth, location},
    error::{Error, HttpError, Result},
    geolocation::PositionSource,
    http_client::{DefaultHttpClient, HttpClient, HttpSend},
    tracker::PositionTracker,
};

const DEFAULT_COUNTDOWN_CADENCE: Duration = Duration::from_secs(1);

/// An async client to interact with a shuttle-tracker server.
///
/// The client is cheaply clonable; all clones share the same session,
/// sharing window and position tracker.
#[derive(Clone, Debug)]
pub struct Client {
    /// The URL the client's server lives under.
    base_url: Arc<Url>,
    /// The underlying HTTP client.
    http_client: HttpClient,
    /// User session data and the sharing state machine.
    base_client: BaseClient,
    /// The singleton position subscription and its forwarding task.
    tracker: PositionTracker,
}

/// Configuration for the client, a consuming builder.
///
/// # Example
///
/// ```
/// # use shuttle_sdk::ClientConfig;
/// let client_config = ClientConfig::new()
///     .proxy("http://localhost:8080")
///     .unwrap()
///     .disable_ssl_verification();
/// ```
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub(crate) proxy: Option<reqwest::Proxy>,
    pub(crate) user_agent: Option<HeaderValue>,
    pub(crate) disable_ssl_verification: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) client: Option<Arc<dyn HttpSend>>,
    pub(crate) position_source: Option<Arc<dyn PositionSource>>,
}

impl Debug for ClientConfig {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut res = fmt.debug_struct("ClientConfig");

        if let Some(proxy) = &self.proxy {
            res.field("proxy", proxy);
        }
        res.field("user_agent", &self.user_agent)
            .field("disable_ssl_verification", &self.disable_ssl_verification)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new default `ClientConfig`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the proxy through which all the HTTP requests should go.
    ///
    /// Note, only HTTP proxies are supported.
    pub fn proxy(mut self, proxy: &str) -> Result<Self> {
        self.proxy = Some(reqwest::Proxy::all(proxy).map_err(HttpError::Reqwest)?);
        Ok(self)
    }

    /// Set a custom HTTP user agent for the client.
    pub fn user_agent(mut self, user_agent: &str) -> std::result::Result<Self, InvalidHeaderValue> {
        self.user_agent = Some(HeaderValue::from_str(user_agent)?);
        Ok(self)
    }

    /// Disable SSL verification for the HTTP requests.
    pub fn disable_ssl_verification(mut self) -> Self {
        self.disable_ssl_verification = true;
        self
    }

    /// Set a timeout duration for all HTTP requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Specify a client to handle sending requests and receiving responses.
    ///
    /// Any type that implements the `HttpSend` trait can be used to send and
    /// receive requests and responses.
    pub fn client(mut self, client: Arc<dyn HttpSend>) -> Self {
        self.client = Some(client);
        self
    }

    /// Specify the source of device positions.
    ///
    /// Without a source every geolocation entry point fails with
    /// [`GeolocationError::Unsupported`](crate::GeolocationError::Unsupported).
    pub fn position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.position_source = Some(source);
        self
    }
}

/// Enum controlling if a loop running callbacks should continue or abort.
///
/// This is mainly used in the
/// [`run_countdown_with_callback`](Client::run_countdown_with_callback)
/// method, the return value of the provided callback controls if the loop
/// should be aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCtrl {
    /// Continue running the loop.
    Continue,
    /// Break out of the loop.
    Break,
}

/// How a countdown loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// The sharing window ran out and was closed by the countdown itself.
    Expired,
    /// The window was closed from elsewhere, or the callback broke out of
    /// the loop, before the window ran out.
    Stopped,
}

impl Client {
    /// Creates a new client for making requests to the given server.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The URL of the server the client should connect to.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let config = ClientConfig::new();
        Client::new_with_config(base_url, config)
    }

    /// Create a new client with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The URL of the server the client should connect to.
    ///
    /// * `config` - Configuration for the client.
    pub fn new_with_config(base_url: impl AsRef<str>, config: ClientConfig) -> Result<Self> {
        let base_url = Arc::new(Url::parse(base_url.as_ref())?);

        let client = if let Some(client) = config.client.clone() {
            client
        } else {
            Arc::new(DefaultHttpClient::with_config(&config)?)
        };

        let base_client = BaseClient::new();
        let session = base_client.session().clone();

        let http_client = HttpClient {
            inner: client,
            base_url: base_url.clone(),
            session,
        };

        let tracker =
            PositionTracker::new(config.position_source, base_client.clone(), http_client.clone());

        Ok(Self { base_url, http_client, base_client, tracker })
    }

    /// The URL of the server the client is connected to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Is the client logged in.
    pub async fn logged_in(&self) -> bool {
        self.base_client.logged_in().await
    }

    /// Whether a sharing window is currently open.
    pub fn is_sharing(&self) -> bool {
        self.base_client.is_sharing()
    }

    /// Seconds left in the current sharing window, `None` while not sharing.
    pub async fn remaining_time(&self) -> Option<u32> {
        self.base_client.remaining_time().await
    }

    /// The current sharing window, if one is open.
    pub async fn share(&self) -> Option<LocationShare> {
        self.base_client.share().await
    }

    /// The device's last known position.
    pub async fn my_location(&self) -> Option<Location> {
        self.base_client.my_location().await
    }

    /// Whether the position tracker currently holds a live subscription.
    pub async fn is_tracking(&self) -> bool {
        self.tracker.is_tracking().await
    }

    /// Login to the server with the given email address and password.
    ///
    /// On success the access token is remembered and used for every
    /// subsequent request that requires authentication.
    #[instrument(skip(password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        info!("Logging in to {} as {}", self.base_url, email);

        let request = auth::login::Request {
            email: email.to_owned(),
            password: password.to_owned(),
        };

        let response = self.http_client.send(request).await?;
        self.base_client.receive_login_response(&response).await;

        Ok(response)
    }

    /// Register a new account with the given email address, password and
    /// display name.
    ///
    /// On success the account is logged in right away, exactly as
    /// [`login`](Self::login) would have.
    #[instrument(skip(password))]
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<AuthResponse> {
        info!("Signing up to {} as {}", self.base_url, email);

        let request = auth::signup::Request {
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.to_owned(),
        };

        let response = self.http_client.send(request).await?;
        self.base_client.receive_login_response(&response).await;

        Ok(response)
    }

    /// Change the password of the logged in account.
    #[instrument(skip(current_password, new_password))]
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let request = auth::change_password::Request {
            current_password: current_password.to_owned(),
            new_password: new_password.to_owned(),
        };

        self.http_client.send(request).await?;

        Ok(())
    }

    /// Restore a previously logged in session.
    ///
    /// Alternative to [`login`](Self::login) when an access token was
    /// persisted from an earlier run.
    pub async fn restore_login(&self, session: Session) -> Result<()> {
        self.base_client.restore_login(session).await;
        Ok(())
    }

    /// Log out from the server and clear all local state.
    ///
    /// Stops any active position tracking; the sharing window, if one is
    /// open, belongs to the departing user and is forgotten locally.
    pub async fn logout(&self) -> Result<()> {
        self.http_client.send(auth::logout::Request).await?;

        self.tracker.stop_tracking().await;
        self.base_client.receive_logout().await;

        Ok(())
    }

    /// Fetch the account data of the logged in user.
    ///
    /// Also refreshes the locally cached standing consent flag.
    pub async fn account(&self) -> Result<User> {
        let user = self.http_client.send(auth::me::Request).await?;
        self.base_client.receive_account_update(&user).await;

        Ok(user)
    }

    /// Change the standing location sharing consent of the account.
    ///
    /// While the consent is off, [`start_sharing`](Self::start_sharing)
    /// fails with [`Error::ConsentRequired`].
    pub async fn set_location_share_agree(&self, agree: bool) -> Result<User> {
        let request = auth::set_location_share_agree::Request { location_share_agree: agree };

        let user = self.http_client.send(request).await?;
        self.base_client.receive_account_update(&user).await;

        Ok(user)
    }

    /// Open a one-hour location sharing window on the server.
    ///
    /// Takes a fresh position fix, starts continuous tracking and opens the
    /// window with it. All preconditions are checked before any IO happens,
    /// and a failure at any point surfaces an error and leaves the sharing
    /// state untouched:
    ///
    /// * not logged in → [`Error::AuthenticationRequired`]
    /// * standing consent off → [`Error::ConsentRequired`]
    /// * a window is already open → [`Error::AlreadySharing`]
    /// * no fix or no subscription → [`Error::Geolocation`]
    #[instrument]
    pub async fn start_sharing(&self) -> Result<LocationShare> {
        {
            let session = self.base_client.session().read().await;
            let session = session.as_ref().ok_or(Error::AuthenticationRequired)?;

            if !session.location_share_agree {
                return Err(Error::ConsentRequired);
            }
        }

        if self.base_client.is_sharing() {
            return Err(Error::AlreadySharing);
        }

        let location = self.tracker.current_position().await?;

        // Tracking comes first: a window must never be opened that the
        // device cannot broadcast into.
        self.tracker.start_tracking().await?;

        let response = self.http_client.send(location::start::Request::new(location)).await?;
        let share = response.into_data()?;

        // Another caller may have opened a window while our request was in
        // flight; the stale response must not clobber their state.
        if self.base_client.is_sharing() {
            return Err(Error::AlreadySharing);
        }

        self.base_client.start_sharing(share.clone()).await;

        Ok(share)
    }

    /// Close the current sharing window.
    ///
    /// Closes the window on the server first, then cancels the position
    /// subscription, then clears the local state, so a failure on the remote
    /// call leaves the window intact everywhere. Calling this while not
    /// sharing is a no-op.
    #[instrument]
    pub async fn stop_sharing(&self) -> Result<()> {
        if !self.base_client.is_sharing() {
            return Ok(());
        }

        self.http_client.send(location::stop::Request).await?.ok()?;

        self.tracker.stop_tracking().await;
        self.base_client.stop_sharing().await;

        Ok(())
    }

    /// Re-hydrate a sharing window that is still open on the server, e.g.
    /// after the application was restarted mid-window.
    ///
    /// Returns `Ok(None)` when no window is open; the countdown of a
    /// restored window resumes from its real end time.
    #[instrument]
    pub async fn restore_sharing(&self) -> Result<Option<LocationShare>> {
        let response = match self.http_client.send(location::mine::Request).await {
            Ok(response) => response,
            // The server answers the own-session read with a 404 when no
            // window is open. That is the common case, not a failure.
            Err(HttpError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let share = response.into_data()?;

        if !share.is_active {
            return Ok(None);
        }

        // A window opened locally while the read was in flight wins over
        // the stale response.
        if !self.base_client.is_sharing() {
            self.base_client.restore_sharing(share.clone()).await;

            if let Err(e) = self.tracker.start_tracking().await {
                warn!("The sharing window was restored but tracking could not start: {e}");
            }
        }

        Ok(Some(share))
    }

    /// Drive the countdown of the current sharing window until it ends.
    ///
    /// Convenience wrapper around
    /// [`run_countdown_with_callback`](Self::run_countdown_with_callback)
    /// with a callback that always continues.
    pub async fn run_countdown(&self) -> Result<CountdownOutcome> {
        self.run_countdown_with_callback(|_| async { LoopCtrl::Continue }).await
    }

    /// Drive the countdown of the current sharing window, calling the given
    /// callback with the new remaining value after every one-second tick.
    ///
    /// When the countdown reaches zero the window is closed through the
    /// same path a manual stop takes, exactly once, and the loop returns
    /// [`CountdownOutcome::Expired`]. If the window is closed from elsewhere
    /// while the loop runs, or the callback returns [`LoopCtrl::Break`], the
    /// loop returns [`CountdownOutcome::Stopped`] without touching the
    /// state.
    ///
    /// The caller owns the loop: dropping or aborting the returned future is
    /// how a view tears the countdown down.
    pub async fn run_countdown_with_callback<C>(
        &self,
        callback: impl Fn(u32) -> C,
    ) -> Result<CountdownOutcome>
    where
        C: Future<Output = LoopCtrl>,
    {
        loop {
            let previous = match self.base_client.remaining_time().await {
                Some(previous) => previous,
                None => return Ok(CountdownOutcome::Stopped),
            };

            sleep::new(DEFAULT_COUNTDOWN_CADENCE).await;

            // The window may have been closed while we slept; a queued tick
            // must not run after a stop.
            if !self.base_client.is_sharing() {
                return Ok(CountdownOutcome::Stopped);
            }

            let remaining = previous.saturating_sub(1);
            self.base_client.tick(remaining).await;

            if remaining == 0 {
                self.stop_sharing().await?;
                return Ok(CountdownOutcome::Expired);
            }

            if callback(remaining).await == LoopCtrl::Break {
                return Ok(CountdownOutcome::Stopped);
            }
        }
    }

    /// Start continuous position tracking without opening a sharing window.
    ///
    /// Used while merely viewing the map. Replaces any previous
    /// subscription.
    pub async fn start_tracking(&self) -> Result<()> {
        self.tracker.start_tracking().await?;
        Ok(())
    }

    /// Cancel the position subscription unconditionally.
    pub async fn stop_tracking(&self) {
        self.tracker.stop_tracking().await;
    }

    /// Cancel the position subscription unless a sharing window is open.
    ///
    /// A view that started tracking for its own display calls this on
    /// teardown; an open window keeps broadcasting in the background.
    pub async fn stop_tracking_if_idle(&self) {
        if !self.base_client.is_sharing() {
            self.tracker.stop_tracking().await;
        }
    }

    /// Fetch the current positions of all friends that are sharing.
    pub async fn friends_locations(&self) -> Result<Vec<FriendLocation>> {
        let response = self.http_client.send(location::friends::Request).await?;
        Ok(response.into_data()?)
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use mockito::mock;
    use serde_json::json;
    use tokio::sync::{mpsc, oneshot};

    use shuttle_sdk_base::{Location, Session, SHARE_WINDOW_SECS};

    use super::{Client, ClientConfig, CountdownOutcome};
    use crate::{
        geolocation::{FixOptions, GeolocationError, PositionSource, PositionSubscription},
        Error,
    };

    /// A source with a fixed position whose subscriptions stay open until
    /// cancelled.
    #[derive(Debug, Default)]
    struct FixedSource;

    #[async_trait::async_trait]
    impl PositionSource for FixedSource {
        async fn current_position(
            &self,
            _options: &FixOptions,
        ) -> Result<Location, GeolocationError> {
            Ok(Location::new(36.1076, 128.4188))
        }

        async fn subscribe(
            &self,
            _options: &FixOptions,
        ) -> Result<PositionSubscription, GeolocationError> {
            let (sample_tx, sample_rx) = mpsc::channel(8);
            let (cancel_tx, cancel_rx) = oneshot::channel();

            tokio::spawn(async move {
                let _ = cancel_rx.await;
                drop(sample_tx);
            });

            Ok(PositionSubscription::new(sample_rx, cancel_tx))
        }
    }

    /// A source that can take single fixes but never gets permission for a
    /// continuous subscription.
    #[derive(Debug, Default)]
    struct DeniedSource;

    #[async_trait::async_trait]
    impl PositionSource for DeniedSource {
        async fn current_position(
            &self,
            _options: &FixOptions,
        ) -> Result<Location, GeolocationError> {
            Ok(Location::new(36.1076, 128.4188))
        }

        async fn subscribe(
            &self,
            _options: &FixOptions,
        ) -> Result<PositionSubscription, GeolocationError> {
            Err(GeolocationError::PermissionDenied)
        }
    }

    fn session() -> Session {
        Session {
            access_token: "1234".to_owned(),
            email: "example@ssafy.com".to_owned(),
            name: "example".to_owned(),
            location_share_agree: true,
        }
    }

    async fn logged_in_client() -> Client {
        let config = ClientConfig::new().position_source(Arc::new(FixedSource));
        let client = Client::new_with_config(mockito::server_url(), config).unwrap();
        client.restore_login(session()).await.unwrap();

        client
    }

    fn share_body(minutes_left: i64) -> String {
        let now = chrono::Utc::now();

        json!({
            "success": true,
            "data": {
                "id": 3,
                "userId": 7,
                "startTime": (now - chrono::Duration::minutes(60 - minutes_left)).to_rfc3339(),
                "endTime": (now + chrono::Duration::minutes(minutes_left)).to_rfc3339(),
                "isActive": true,
            },
            "error": null,
        })
        .to_string()
    }

    fn mock_start() -> mockito::Mock {
        mock("POST", "/api/v1/location/start")
            .with_status(200)
            .with_body(share_body(60))
            .create()
    }

    fn mock_stop() -> mockito::Mock {
        mock("POST", "/api/v1/location/stop")
            .with_status(200)
            .with_body(json!({ "success": true, "data": null, "error": null }).to_string())
            .create()
    }

    #[tokio::test]
    async fn login() {
        let _m = mock("POST", "/auth/login")
            .with_status(200)
            .with_body(
                json!({
                    "accessToken": "1234",
                    "email": "example@ssafy.com",
                    "name": "example",
                    "locationShareAgree": true,
                })
                .to_string(),
            )
            .create();

        let client = Client::new(mockito::server_url()).unwrap();
        assert!(!client.logged_in().await);

        let response = client.login("example@ssafy.com", "wordpass").await.unwrap();

        assert!(client.logged_in().await);
        assert_eq!(response.access_token, "1234");
    }

    #[tokio::test]
    async fn signup_logs_the_account_in() {
        let _m = mock("POST", "/auth/signup")
            .with_status(200)
            .with_body(
                json!({
                    "accessToken": "5678",
                    "email": "new@ssafy.com",
                    "name": "newcomer",
                    "locationShareAgree": false,
                })
                .to_string(),
            )
            .create();

        let client = Client::new(mockito::server_url()).unwrap();
        let response = client.signup("new@ssafy.com", "wordpass", "newcomer").await.unwrap();

        assert!(client.logged_in().await);
        assert_eq!(response.access_token, "5678");
        assert!(!response.location_share_agree);
    }

    #[tokio::test]
    async fn change_password_needs_a_session() {
        let _m = mock("PUT", "/auth/password").with_status(200).create();

        let client = Client::new(mockito::server_url()).unwrap();
        assert!(client.change_password("old", "new").await.is_err());

        client.restore_login(session()).await.unwrap();
        client.change_password("old", "new").await.unwrap();
    }

    #[tokio::test]
    async fn login_error() {
        let _m = mock("POST", "/auth/login").with_status(401).create();

        let client = Client::new(mockito::server_url()).unwrap();

        match client.login("example@ssafy.com", "wrong").await {
            Err(Error::Http(crate::HttpError::AuthenticationRequired)) => {}
            other => panic!("expected an authentication error, got {other:?}"),
        }
        assert!(!client.logged_in().await);
    }

    #[tokio::test]
    async fn start_sharing_requires_a_login() {
        let client = Client::new(mockito::server_url()).unwrap();

        assert!(matches!(
            client.start_sharing().await,
            Err(Error::AuthenticationRequired)
        ));
    }

    #[tokio::test]
    async fn start_sharing_requires_consent() {
        // No mock is registered for the start endpoint: the consent check
        // must reject before any network traffic happens.
        let client = Client::new(mockito::server_url()).unwrap();
        client
            .restore_login(Session {
                location_share_agree: false,
                ..session()
            })
            .await
            .unwrap();

        assert!(matches!(client.start_sharing().await, Err(Error::ConsentRequired)));
        assert!(!client.is_sharing());
    }

    #[tokio::test]
    async fn start_sharing_opens_a_window_and_tracks() {
        let _m = mock_start();

        let client = logged_in_client().await;
        let share = client.start_sharing().await.unwrap();

        assert_eq!(share.id, 3);
        assert!(client.is_sharing());
        assert_eq!(client.remaining_time().await, Some(SHARE_WINDOW_SECS));
        assert!(client.is_tracking().await);

        assert!(matches!(client.start_sharing().await, Err(Error::AlreadySharing)));
    }

    #[tokio::test]
    async fn start_sharing_surfaces_a_tracking_failure() {
        // No mock is registered for the start endpoint: the subscription
        // failure must abort before the window is opened on the server.
        let config = ClientConfig::new().position_source(Arc::new(DeniedSource));
        let client = Client::new_with_config(mockito::server_url(), config).unwrap();
        client.restore_login(session()).await.unwrap();

        match client.start_sharing().await {
            Err(Error::Geolocation(GeolocationError::PermissionDenied)) => {}
            other => panic!("expected a geolocation error, got {other:?}"),
        }

        assert!(!client.is_sharing());
        assert_eq!(client.remaining_time().await, None);
        assert!(!client.is_tracking().await);
    }

    #[tokio::test]
    async fn stop_sharing_closes_the_window_and_stops_tracking() {
        let _start = mock_start();
        let _stop = mock_stop();

        let client = logged_in_client().await;
        client.start_sharing().await.unwrap();

        client.stop_sharing().await.unwrap();

        assert!(!client.is_sharing());
        assert_eq!(client.remaining_time().await, None);
        assert!(!client.is_tracking().await);

        // Stopping again is a no-op.
        client.stop_sharing().await.unwrap();
    }

    #[tokio::test]
    async fn restore_sharing_resumes_an_open_window() {
        let _m = mock("GET", "/api/v1/location/me")
            .with_status(200)
            .with_body(share_body(30))
            .create();

        let client = logged_in_client().await;
        let share = client.restore_sharing().await.unwrap().expect("an open window");

        assert_eq!(share.id, 3);
        assert!(client.is_sharing());
        assert!(client.is_tracking().await);

        let remaining = client.remaining_time().await.unwrap();
        assert!((1795..=1800).contains(&remaining), "got {remaining}");
    }

    #[tokio::test]
    async fn restore_sharing_absorbs_not_found() {
        let _m = mock("GET", "/api/v1/location/me")
            .with_status(404)
            .with_body(
                json!({
                    "success": false,
                    "data": null,
                    "error": {
                        "code": "LOCATION_SHARE_NOT_FOUND",
                        "message": "no active session",
                        "httpStatus": 404,
                    },
                })
                .to_string(),
            )
            .create();

        let client = logged_in_client().await;

        assert!(client.restore_sharing().await.unwrap().is_none());
        assert!(!client.is_sharing());
        assert!(!client.is_tracking().await);
    }

    #[tokio::test]
    async fn countdown_expiry_closes_the_window_once() {
        let _start = mock_start();
        let _stop = mock_stop();

        let client = logged_in_client().await;
        client.start_sharing().await.unwrap();

        // Shorten the window so the test does not wait for an hour.
        client.base_client.tick(1).await;

        let outcome = client.run_countdown().await.unwrap();

        assert_eq!(outcome, CountdownOutcome::Expired);
        assert!(!client.is_sharing());
        assert_eq!(client.remaining_time().await, None);
        assert!(!client.is_tracking().await);

        // A countdown on an already closed window stops immediately.
        assert_eq!(client.run_countdown().await.unwrap(), CountdownOutcome::Stopped);
    }

    #[tokio::test]
    async fn countdown_observes_a_manual_stop() {
        let _start = mock_start();
        let _stop = mock_stop();

        let client = logged_in_client().await;
        client.start_sharing().await.unwrap();

        let countdown = {
            let client = client.clone();
            tokio::spawn(async move { client.run_countdown().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        client.stop_sharing().await.unwrap();

        let outcome = countdown.await.unwrap().unwrap();
        assert_eq!(outcome, CountdownOutcome::Stopped);
        assert!(!client.is_sharing());
    }

    #[tokio::test]
    async fn countdown_callback_can_break_the_loop() {
        let _start = mock_start();

        let client = logged_in_client().await;
        client.start_sharing().await.unwrap();

        let outcome = client
            .run_countdown_with_callback(|_remaining| async { super::LoopCtrl::Break })
            .await
            .unwrap();

        // Breaking out leaves the window open; only expiry closes it.
        assert_eq!(outcome, CountdownOutcome::Stopped);
        assert!(client.is_sharing());
        assert_eq!(client.remaining_time().await, Some(SHARE_WINDOW_SECS - 1));
    }

    #[tokio::test]
    async fn idle_tracking_is_cleaned_up_only_while_not_sharing() {
        let _start = mock_start();

        let client = logged_in_client().await;

        client.start_tracking().await.unwrap();
        assert!(client.is_tracking().await);

        client.start_sharing().await.unwrap();
        client.stop_tracking_if_idle().await;
        assert!(client.is_tracking().await, "an open window keeps broadcasting");
    }

    #[tokio::test]
    async fn idle_tracking_is_cancelled_on_teardown() {
        let client = logged_in_client().await;

        client.start_tracking().await.unwrap();
        assert!(client.is_tracking().await);

        client.stop_tracking_if_idle().await;
        assert!(!client.is_tracking().await);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let _login = mock("POST", "/auth/logout").with_status(200).create();
        let _start = mock_start();

        let client = logged_in_client().await;
        client.start_sharing().await.unwrap();

        client.logout().await.unwrap();

        assert!(!client.logged_in().await);
        assert!(!client.is_sharing());
        assert!(!client.is_tracking().await);
    }

    #[tokio::test]
    async fn friends_locations_are_decoded() {
        let _m = mock("GET", "/api/v1/location/friends")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": [{
                        "friendId": 9,
                        "friendEmail": "friend@ssafy.com",
                        "friendName": "friend",
                        "latitude": 36.11,
                        "longitude": 128.42,
                        "isActive": true,
                    }],
                    "error": null,
                })
                .to_string(),
            )
            .create();

        let client = logged_in_client().await;
        let friends = client.friends_locations().await.unwrap();

        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].friend_name, "friend");
        assert_eq!(friends[0].location(), Location::new(36.11, 128.42));
    }

    #[tokio::test]
    async fn account_refreshes_the_consent_flag() {
        let _m = mock("GET", "/auth/me")
            .with_status(200)
            .with_body(
                json!({
                    "email": "example@ssafy.com",
                    "name": "example",
                    "locationShareAgree": false,
                })
                .to_string(),
            )
            .create();

        let client = logged_in_client().await;
        let user = client.account().await.unwrap();
        assert!(!user.location_share_agree);

        // The refreshed consent gates the next start attempt.
        assert!(matches!(client.start_sharing().await, Err(Error::ConsentRequired)));
    }
}
