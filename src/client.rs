// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::episode::NewEpisode;
use crate::error::{CaptivateError, Result};
use crate::http::{ApiRequest, FormPart, HttpClient, ReqwestClient};
use crate::response::{
    ArtworkResponse, AuthenticateResponse, MediaUploadResponse, ShowsResponse,
};
use crate::upload::open_upload;

/// Production API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.captivate.fm";

/// Client for the Captivate.fm hosting API
///
/// Identity (`user_id`, `api_key`) is fixed at construction. The bearer token
/// starts out empty and is only ever written by [`authenticate_user`], so
/// every other call sends whatever token the last successful authentication
/// produced. A call racing an authentication may still go out with the
/// previous token.
///
/// [`authenticate_user`]: CaptivateClient::authenticate_user
pub struct CaptivateClient<C = ReqwestClient> {
    http: C,
    api_base: String,
    user_id: String,
    api_key: String,
    token: RwLock<String>,
}

impl CaptivateClient<ReqwestClient> {
    /// Create a client talking to the production API with default HTTP settings
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(ReqwestClient::new(), user_id, api_key)
    }
}

impl<C: HttpClient> CaptivateClient<C> {
    /// Create a client that sends its requests through `http`
    pub fn with_client(http: C, user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            user_id: user_id.into(),
            api_key: api_key.into(),
            token: RwLock::new(String::new()),
        }
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        let trimmed = api_base.trim_end_matches('/');
        Url::parse(trimmed)?;
        self.api_base = trimmed.to_string();
        Ok(self)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// The current bearer token, empty before the first successful authentication
    pub async fn token(&self) -> String {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        !self.token.read().await.is_empty()
    }

    /// Exchange the user id and API key for a bearer token
    ///
    /// On failure the previous token is kept.
    pub async fn authenticate_user(&self) -> Result<()> {
        let url = format!("{}/authenticate/token", self.api_base);
        let request = ApiRequest::post(url).multipart(vec![
            FormPart::text("username", self.user_id.as_str()),
            FormPart::text("token", self.api_key.as_str()),
        ]);

        let response: AuthenticateResponse = self.send(request).await?;

        *self.token.write().await = response.user.token;
        info!(user_id = %self.user_id, "Authenticated with Captivate");
        Ok(())
    }

    /// List the shows the user has access to
    pub async fn get_user_shows(&self) -> Result<Vec<Value>> {
        let url = format!("{}/users/{}/shows", self.api_base, self.user_id);
        let request = ApiRequest::get(url).bearer(self.token().await);

        let response: ShowsResponse = self.send(request).await?;
        Ok(response.shows)
    }

    /// Fetch the episode list of a show, returning the body as sent by the API
    pub async fn list_episodes(&self, show_id: &str) -> Result<Value> {
        let url = format!("{}/shows/{}/episodes", self.api_base, show_id);
        let request = ApiRequest::get(url).bearer(self.token().await);

        self.send(request).await
    }

    /// Upload an episode's audio file, returning the media id to pass to
    /// [`create_episode`](Self::create_episode)
    pub async fn upload_episode(&self, file_path: &Path, show_id: &str) -> Result<String> {
        let url = format!("{}/shows/{}/media", self.api_base, show_id);
        let upload = open_upload(file_path).await?;
        debug!(
            file = %file_path.display(),
            size = upload.length,
            show_id = %show_id,
            "Uploading episode media"
        );

        let request = ApiRequest::post(url)
            .bearer(self.token().await)
            .multipart(vec![FormPart::file("file", upload)]);

        let response: MediaUploadResponse = self.send(request).await?;
        info!(media_id = %response.media.id, show_id = %show_id, "Episode media uploaded");
        Ok(response.media.id)
    }

    /// Create an episode from previously uploaded media
    pub async fn create_episode(&self, episode: &NewEpisode) -> Result<Value> {
        let url = format!("{}/episodes", self.api_base);
        let request = ApiRequest::post(url)
            .bearer(self.token().await)
            .multipart(episode.form_parts());

        self.send(request).await
    }

    /// Upload a show's cover art, returning the `artwork` field of the response
    pub async fn create_show_artwork(&self, file_path: &Path, show_id: &str) -> Result<Value> {
        let url = format!("{}/shows/{}/artwork", self.api_base, show_id);
        let upload = open_upload(file_path).await?;
        debug!(file = %file_path.display(), show_id = %show_id, "Uploading show artwork");

        let request = ApiRequest::post(url)
            .bearer(self.token().await)
            .multipart(vec![FormPart::file("file", upload)]);

        let response: ArtworkResponse = self.send(request).await?;
        Ok(response.artwork)
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let url = request.url.clone();
        debug!(method = %request.method, url = %url, "Sending Captivate API request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "Captivate API request failed");
            CaptivateError::Transport {
                url: url.clone(),
                source: e,
            }
        })?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            warn!(url = %url, status = response.status, body = %body, "Captivate API returned an error");
            return Err(CaptivateError::HttpStatus {
                url,
                status: response.status,
                body,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(url = %url, error = %e, "Unexpected Captivate API response");
            CaptivateError::Decode { url, source: e }
        })
    }
}

impl<C> fmt::Debug for CaptivateClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptivateClient")
            .field("api_base", &self.api_base)
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::{EpisodeOptions, EpisodeType};
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::http::mock::MockHttpClient;
    use serde_json::json;
    use tempfile::tempdir;

    fn make_episode() -> NewEpisode {
        NewEpisode {
            show_id: "showId".to_string(),
            title: "Episode Title".to_string(),
            media_id: "mediaId123".to_string(),
            publish_date: "2025-05-30".to_string(),
            episode_number: 1,
            episode_type: EpisodeType::Full,
            show_notes: "Show notes".to_string(),
            summary: "Summary".to_string(),
            options: EpisodeOptions::default(),
        }
    }

    async fn authenticated(mock: MockHttpClient) -> CaptivateClient<MockHttpClient> {
        let mock = MockHttpClient::new()
            .respond_json(200, json!({ "user": { "token": "fakeToken" } }))
            .append(mock);
        let client = CaptivateClient::with_client(mock, "testUser", "testKey");
        client.authenticate_user().await.unwrap();
        client
    }

    #[tokio::test]
    async fn authenticate_user_stores_token() {
        let mock = MockHttpClient::new().respond_json(200, json!({ "user": { "token": "tok-9" } }));
        let client = CaptivateClient::with_client(mock, "u1", "k1");
        assert!(!client.is_authenticated().await);

        client.authenticate_user().await.unwrap();

        assert_eq!(client.token().await, "tok-9");
        assert!(client.is_authenticated().await);

        let request = client.http.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.captivate.fm/authenticate/token");
        assert_eq!(request.text("username"), Some("u1"));
        assert_eq!(request.text("token"), Some("k1"));
    }

    #[tokio::test]
    async fn failed_authentication_keeps_previous_token() {
        let mock = MockHttpClient::new()
            .respond_json(200, json!({ "user": { "token": "first" } }))
            .respond_json(401, json!({ "message": "invalid credentials" }));
        let client = CaptivateClient::with_client(mock, "u1", "k1");

        client.authenticate_user().await.unwrap();
        let error = client.authenticate_user().await.unwrap_err();

        assert_eq!(error.status(), Some(401));
        assert_eq!(client.token().await, "first");
    }

    #[tokio::test]
    async fn authentication_without_token_is_decode_error() {
        let mock = MockHttpClient::new().respond_json(200, json!({ "user": {} }));
        let client = CaptivateClient::with_client(mock, "u1", "k1");

        let error = client.authenticate_user().await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn get_user_shows_returns_shows_field() {
        let client =
            authenticated(MockHttpClient::new().respond_json(200, json!({ "shows": ["a", "b"] })))
                .await;

        let shows = client.get_user_shows().await.unwrap();

        assert_eq!(shows, vec![json!("a"), json!("b")]);
        let request = client.http.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.captivate.fm/users/testUser/shows");
        assert_eq!(request.bearer.as_deref(), Some("fakeToken"));
    }

    #[tokio::test]
    async fn calls_before_authentication_send_empty_bearer() {
        let mock = MockHttpClient::new().respond_json(200, json!({ "episodes": [] }));
        let client = CaptivateClient::with_client(mock, "u1", "k1");

        client.list_episodes("show123").await.unwrap();

        assert_eq!(client.http.last_request().bearer.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn list_episodes_returns_full_body() {
        let body = json!({ "episodes": [{ "id": "e1" }], "count": 1 });
        let client = authenticated(MockHttpClient::new().respond_json(200, body.clone())).await;

        let data = client.list_episodes("show123").await.unwrap();

        assert_eq!(data, body);
        let request = client.http.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.captivate.fm/shows/show123/episodes");
        assert_eq!(request.bearer.as_deref(), Some("fakeToken"));
    }

    #[tokio::test]
    async fn list_episodes_http_error_carries_status_and_body() {
        let client = authenticated(MockHttpClient::new().respond_raw(404, "Not Found")).await;

        let error = client.list_episodes("nope").await.unwrap_err();

        match error {
            CaptivateError::HttpStatus { url, status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
                assert!(url.ends_with("/shows/nope/episodes"));
            }
            other => panic!("Expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_episode_returns_media_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mockPath.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let client = authenticated(MockHttpClient::new().respond_json(
            200,
            json!({ "media": { "id": "media123", "url": "https://cdn.example.com/x.mp3" } }),
        ))
        .await;

        let media_id = client.upload_episode(&path, "showId").await.unwrap();

        assert_eq!(media_id, "media123");
        let request = client.http.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.captivate.fm/shows/showId/media");
        assert_eq!(request.bearer.as_deref(), Some("fakeToken"));
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].name, "file");
        assert_eq!(request.files[0].file_name, "mockPath.mp3");
        assert_eq!(request.files[0].mime_type, "audio/mpeg");
        assert_eq!(request.files[0].length, 5);
        assert_eq!(request.files[0].contents, b"audio");
    }

    #[tokio::test]
    async fn upload_of_missing_file_sends_nothing() {
        let dir = tempdir().unwrap();
        let client = authenticated(MockHttpClient::new()).await;

        let error = client
            .upload_episode(&dir.path().join("missing.mp3"), "showId")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Filesystem);
        // Only the authentication request went out
        assert_eq!(client.http.requests().len(), 1);
    }

    #[tokio::test]
    async fn create_episode_posts_fields_and_returns_body() {
        let client =
            authenticated(MockHttpClient::new().respond_json(200, json!({ "success": true }))).await;

        let result = client.create_episode(&make_episode()).await.unwrap();

        assert_eq!(result, json!({ "success": true }));
        let request = client.http.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.captivate.fm/episodes");
        assert_eq!(request.bearer.as_deref(), Some("fakeToken"));
        assert_eq!(request.text("shows_id"), Some("showId"));
        assert_eq!(request.text("media_id"), Some("mediaId123"));
        assert_eq!(request.text("episode_season"), None);
        assert!(request.files.is_empty());
    }

    #[tokio::test]
    async fn create_episode_sends_zero_season() {
        let client =
            authenticated(MockHttpClient::new().respond_json(200, json!({ "success": true }))).await;
        let mut episode = make_episode();
        episode.options.episode_season = Some(0);

        client.create_episode(&episode).await.unwrap();

        assert_eq!(client.http.last_request().text("episode_season"), Some("0"));
    }

    #[tokio::test]
    async fn create_show_artwork_returns_artwork() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mockArtwork.png");
        std::fs::write(&path, b"png").unwrap();

        let client =
            authenticated(MockHttpClient::new().respond_json(200, json!({ "artwork": "url/to/art" })))
                .await;

        let artwork = client.create_show_artwork(&path, "showId").await.unwrap();

        assert_eq!(artwork, json!("url/to/art"));
        let request = client.http.last_request();
        assert_eq!(request.url, "https://api.captivate.fm/shows/showId/artwork");
        assert_eq!(request.bearer.as_deref(), Some("fakeToken"));
        assert_eq!(request.files[0].name, "file");
        assert_eq!(request.files[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn non_json_success_body_is_decode_error() {
        let client = authenticated(MockHttpClient::new().respond_raw(200, "<html>")).await;

        let error = client.list_episodes("show123").await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Decode);
    }

    #[test]
    fn api_base_is_validated_and_trimmed() {
        let client = CaptivateClient::new("u1", "k1")
            .with_api_base("http://localhost:8080/")
            .unwrap();
        assert_eq!(client.api_base(), "http://localhost:8080");

        let error = CaptivateClient::new("u1", "k1")
            .with_api_base("not a url")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let client = CaptivateClient::new("u1", "super-secret");
        let output = format!("{client:?}");
        assert!(output.contains("u1"));
        assert!(!output.contains("super-secret"));
    }
}
