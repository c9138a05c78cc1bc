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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed length of a location sharing window, in seconds (one hour).
///
/// The window is set by the server when a sharing session is opened and is
/// not renegotiated afterwards.
pub const SHARE_WINDOW_SECS: u32 = 3600;

/// Mean earth radius in kilometers, used for the haversine distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic position as reported by the device or a peer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Location {
    /// Create a new location from a latitude/longitude pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to another location in kilometers, using the
    /// haversine formula.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// One location sharing window, as stored by the server.
///
/// The server is the authority over the window: it assigns the id and the
/// wall-clock bounds, enforces at most one active share per user, and may
/// keep the record alive across a client restart. The client only caches it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationShare {
    /// Identifier assigned by the server.
    pub id: u64,
    /// The user that owns this sharing window.
    pub user_id: u64,
    /// When the window was opened.
    pub start_time: DateTime<Utc>,
    /// When the window closes, `start_time` plus one hour.
    pub end_time: DateTime<Utc>,
    /// Whether the window is still open.
    pub is_active: bool,
    /// The owner's last published position, if the server included one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<Location>,
}

impl LocationShare {
    /// Seconds left until `end_time` as seen at `now`, clamped to the
    /// `0..=SHARE_WINDOW_SECS` range.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        let secs = (self.end_time - now).num_seconds();
        secs.clamp(0, i64::from(SHARE_WINDOW_SECS)) as u32
    }
}

/// Account data for the logged in user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's email address, doubling as their login name.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Standing consent to open location sharing windows.
    ///
    /// This is a persistent account setting, distinct from the per-session
    /// toggle. No sharing window can be opened while it is false.
    pub location_share_agree: bool,
}

/// The response to a login or signup call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The access token for the authenticated session.
    pub access_token: String,
    /// The user's email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Standing location sharing consent.
    pub location_share_agree: bool,
}

/// A friend's published position, as returned by the friends-location read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendLocation {
    /// The friend's user id.
    pub friend_id: u64,
    /// The friend's email address.
    pub friend_email: String,
    /// The friend's display name.
    pub friend_name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Whether the friend's sharing window is still open.
    pub is_active: bool,
}

impl FriendLocation {
    /// The friend's position as a `Location`.
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::{Location, LocationShare, SHARE_WINDOW_SECS};

    fn share_ending_in(secs: i64) -> LocationShare {
        let now = Utc::now();
        LocationShare {
            id: 1,
            user_id: 7,
            start_time: now - Duration::seconds(i64::from(SHARE_WINDOW_SECS) - secs),
            end_time: now + Duration::seconds(secs),
            is_active: true,
            current_location: None,
        }
    }

    #[test]
    fn remaining_secs_is_clamped() {
        let now = Utc::now();

        assert_eq!(share_ending_in(-30).remaining_secs(now), 0);
        assert_eq!(share_ending_in(60).remaining_secs(now), 60);
        // A window can never report more than its full length.
        assert_eq!(share_ending_in(90_000).remaining_secs(now), SHARE_WINDOW_SECS);
    }

    #[test]
    fn haversine_distance() {
        let daejeon = Location::new(36.3504, 127.3845);
        let seoul = Location::new(37.5665, 126.9780);

        let distance = daejeon.distance_to(&seoul);
        assert!((130.0..145.0).contains(&distance), "got {distance} km");

        assert!(daejeon.distance_to(&daejeon) < 1e-9);
    }

    #[test]
    fn share_wire_format_is_camel_case() {
        let json = serde_json::json!({
            "id": 1,
            "userId": 7,
            "startTime": "2025-03-01T12:00:00Z",
            "endTime": "2025-03-01T13:00:00Z",
            "isActive": true,
        });

        let share: LocationShare = serde_json::from_value(json).unwrap();
        assert_eq!(share.user_id, 7);
        assert!(share.is_active);
        assert_eq!((share.end_time - share.start_time).num_seconds(), 3600);
    }
}
