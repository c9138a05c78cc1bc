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

//! The position sampling seam.
//!
//! The SDK never talks to a positioning device directly; the embedding
//! application provides an implementation of [`PositionSource`] (a browser
//! geolocation bridge, a platform location service, a replay file in tests)
//! via [`ClientConfig::position_source`](crate::ClientConfig::position_source).

use std::{fmt::Debug, time::Duration};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use shuttle_sdk_base::Location;

/// Options for a position fix or a continuous subscription.
#[derive(Clone, Debug)]
pub struct FixOptions {
    /// Prefer a precise fix over a fast, battery-friendly one.
    pub high_accuracy: bool,
    /// How long a single fix attempt may take before it fails with
    /// [`GeolocationError::Timeout`].
    pub timeout: Duration,
    /// How old a cached fix may be to be reused instead of forcing a fresh
    /// read.
    pub maximum_age: Duration,
}

impl Default for FixOptions {
    /// The sampling policy used throughout the SDK: low accuracy for fast,
    /// battery-friendly fixes, a 30 second cap per attempt, and reuse of
    /// fixes up to 5 seconds old.
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(30),
            maximum_age: Duration::from_secs(5),
        }
    }
}

/// An error from the position sampling primitive.
#[derive(Clone, Debug, Error)]
pub enum GeolocationError {
    /// The user or the OS denied location access. Retryable after the user
    /// changes their settings.
    #[error("location permission was denied")]
    PermissionDenied,

    /// The environment has no positioning capability at all. Not retryable.
    #[error("no geolocation capability is available")]
    Unsupported,

    /// The device could not determine a position.
    #[error("the position is currently unavailable")]
    Unavailable,

    /// A single fix attempt exceeded its deadline.
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// A continuous stream of position samples from a [`PositionSource`].
///
/// At most one subscription exists per client; starting a new one supersedes
/// the old one. Dropping the subscription, or calling
/// [`cancel`](Self::cancel), stops the producer; no further samples are
/// delivered afterwards.
#[derive(Debug)]
pub struct PositionSubscription {
    samples: mpsc::Receiver<Result<Location, GeolocationError>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl PositionSubscription {
    /// Create a subscription from a sample channel and a cancellation
    /// signal.
    ///
    /// The producing side should stop sampling once `cancel` fires or is
    /// dropped.
    pub fn new(
        samples: mpsc::Receiver<Result<Location, GeolocationError>>,
        cancel: oneshot::Sender<()>,
    ) -> Self {
        Self { samples, cancel: Some(cancel) }
    }

    /// Wait for the next sample. Returns `None` once the producer has gone
    /// away.
    pub async fn next_sample(&mut self) -> Option<Result<Location, GeolocationError>> {
        self.samples.recv().await
    }

    /// Cancel the subscription, consuming it.
    pub fn cancel(mut self) {
        self.notify_producer();
    }

    fn notify_producer(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for PositionSubscription {
    fn drop(&mut self) {
        self.notify_producer();
    }
}

/// A source of device positions.
///
/// Implementations are expected to honor the [`FixOptions`] sampling policy
/// and to map their native failure codes onto [`GeolocationError`].
#[async_trait::async_trait]
pub trait PositionSource: Send + Sync + Debug {
    /// Obtain a single position fix.
    async fn current_position(&self, options: &FixOptions)
        -> Result<Location, GeolocationError>;

    /// Open a continuous stream of position samples.
    ///
    /// Fails with [`GeolocationError::PermissionDenied`] if location access
    /// is not granted.
    async fn subscribe(
        &self,
        options: &FixOptions,
    ) -> Result<PositionSubscription, GeolocationError>;
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::sync::{mpsc, oneshot};

    use super::{FixOptions, PositionSubscription};
    use shuttle_sdk_base::Location;

    #[test]
    fn default_options_match_the_sampling_policy() {
        let options = FixOptions::default();

        assert!(!options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.maximum_age, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn cancel_reaches_the_producer() {
        let (sample_tx, sample_rx) = mpsc::channel(8);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        let mut subscription = PositionSubscription::new(sample_rx, cancel_tx);

        sample_tx.send(Ok(Location::new(36.1, 128.4))).await.unwrap();
        assert!(subscription.next_sample().await.is_some());

        subscription.cancel();
        cancel_rx.try_recv().expect("producer should see the cancellation");
    }

    #[tokio::test]
    async fn drop_counts_as_cancellation() {
        let (_sample_tx, sample_rx) =
            mpsc::channel::<Result<Location, super::GeolocationError>>(8);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        drop(PositionSubscription::new(sample_rx, cancel_tx));
        cancel_rx.try_recv().expect("producer should see the drop");
    }
}
