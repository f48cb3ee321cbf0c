// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envelopes for the few response fields the client extracts. Everything
//! else is passed through as `serde_json::Value`.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticateResponse {
    pub user: AuthenticatedUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticatedUser {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShowsResponse {
    pub shows: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaUploadResponse {
    pub media: UploadedMedia,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedMedia {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtworkResponse {
    pub artwork: Value,
}
