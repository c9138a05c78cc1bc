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

use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::warn;

use shuttle_sdk_base::BaseClient;

use crate::{
    api::location::update,
    geolocation::{FixOptions, GeolocationError, PositionSource},
    http_client::HttpClient,
};

/// Bridges the position sampling primitive into the state machine and
/// mirrors samples to the server.
///
/// The tracker owns the single continuous subscription of the client.
/// Every sample is written into the `BaseClient` and then pushed to the
/// server on a best-effort basis: a failed push is logged and swallowed,
/// since transient network failure during background tracking is expected
/// and must never kill the subscription.
#[derive(Clone, Debug)]
pub(crate) struct PositionTracker {
    source: Option<Arc<dyn PositionSource>>,
    options: FixOptions,
    base_client: BaseClient,
    http_client: HttpClient,
    /// The forwarding task; at most one exists at any time.
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PositionTracker {
    pub fn new(
        source: Option<Arc<dyn PositionSource>>,
        base_client: BaseClient,
        http_client: HttpClient,
    ) -> Self {
        Self {
            source,
            options: FixOptions::default(),
            base_client,
            http_client,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Obtain a single position fix from the configured source.
    pub async fn current_position(&self) -> Result<shuttle_sdk_base::Location, GeolocationError> {
        let source = self.source.as_ref().ok_or(GeolocationError::Unsupported)?;
        source.current_position(&self.options).await
    }

    /// Start forwarding position samples.
    ///
    /// If a subscription is already active it is cancelled first, so the
    /// last caller always wins and no subscription is ever leaked.
    pub async fn start_tracking(&self) -> Result<(), GeolocationError> {
        let source = self.source.as_ref().ok_or(GeolocationError::Unsupported)?;

        // Hold the lock across cancel + subscribe so concurrent starts
        // serialize instead of racing for the singleton slot.
        let mut task = self.task.lock().await;

        if let Some(stale) = task.take() {
            stale.abort();
        }

        let mut subscription = source.subscribe(&self.options).await?;

        let base_client = self.base_client.clone();
        let http_client = self.http_client.clone();

        *task = Some(tokio::spawn(async move {
            while let Some(sample) = subscription.next_sample().await {
                match sample {
                    Ok(location) => {
                        base_client.set_my_location(location).await;

                        let request = update::Request::new(location);
                        if let Err(e) =
                            http_client.send(request).await.and_then(|response| response.ok())
                        {
                            warn!("Failed to push the position to the server: {e}");
                        }
                    }
                    Err(e) => {
                        warn!("Position sample error: {e}");
                    }
                }
            }
        }));

        Ok(())
    }

    /// Stop forwarding samples and cancel the subscription.
    ///
    /// Idempotent: stopping an idle tracker is a no-op.
    pub async fn stop_tracking(&self) {
        if let Some(task) = self.task.lock().await.take() {
            // Aborting drops the subscription at its await point, which
            // cancels the producer; queued samples are never delivered.
            task.abort();
        }
    }

    /// Whether a forwarding task is currently active.
    pub async fn is_tracking(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }
}
