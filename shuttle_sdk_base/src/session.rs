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

//! User sessions.

use serde::{Deserialize, Serialize};

use crate::types::AuthResponse;

/// A user session, containing an access token and information about the
/// associated user account.
///
/// The embedding application is expected to persist this and hand it back to
/// `BaseClient::restore_login` after a restart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The access token used for this session.
    pub access_token: String,
    /// The email address the token was issued for.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// Standing location sharing consent at login time.
    pub location_share_agree: bool,
}

impl From<&AuthResponse> for Session {
    fn from(response: &AuthResponse) -> Self {
        Self {
            access_token: response.access_token.clone(),
            email: response.email.clone(),
            name: response.name.clone(),
            location_share_agree: response.location_share_agree,
        }
    }
}
