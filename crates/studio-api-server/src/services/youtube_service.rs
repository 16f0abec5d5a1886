use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::ProvidersConfig;
use crate::services::upstream;
use crate::utils::error::ApiError;

const PROVIDER: &str = "YouTube";
const OAUTH_PROVIDER: &str = "Google OAuth";

pub const OAUTH_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/youtube.upload",
    "https://www.googleapis.com/auth/youtube.readonly",
];

pub const DEFAULT_TRENDING_RESULTS: u32 = 12;
pub const MAX_RESULTS: u32 = 50;

#[derive(Debug, Clone)]
pub enum ChannelRef {
    Handle(String),
    Id(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy_status: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedVideo {
    pub video_id: String,
    pub url: String,
    pub upload_status: Option<String>,
    pub privacy_status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub enum TokenGrant {
    AuthorizationCode(String),
    RefreshToken(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

// Data API wire types

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    title: String,
    #[serde(default)]
    description: String,
    custom_url: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

// The Data API serializes counts as strings
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Thumbnails {
    maxres: Option<Thumbnail>,
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best(self) -> Option<String> {
        self.maxres
            .or(self.high)
            .or(self.medium)
            .or(self.default)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    id: String,
    status: Option<UploadStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadStatus {
    upload_status: Option<String>,
    privacy_status: Option<String>,
}

fn parse_count(value: &Option<String>) -> Option<u64> {
    value.as_deref().and_then(|v| v.parse().ok())
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn shorts_url(video_id: &str) -> String {
    format!("https://www.youtube.com/shorts/{}", video_id)
}

impl VideoItem {
    fn into_summary(self) -> VideoSummary {
        let url = watch_url(&self.id);
        VideoSummary {
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            thumbnail_url: self.snippet.thumbnails.best(),
            view_count: parse_count(&self.statistics.view_count),
            like_count: parse_count(&self.statistics.like_count),
            duration: self.content_details.and_then(|d| d.duration),
            id: self.id,
            url,
        }
    }
}

/// Sample trending list served when no API key is configured.
pub fn fallback_trending() -> Vec<VideoSummary> {
    [
        ("fallback-1", "3 editing tricks that double watch time", "Studio Tips", 1_250_000),
        ("fallback-2", "I tried posting a Short every day for 30 days", "Creator Lab", 980_000),
        ("fallback-3", "The 2-second hook formula", "Hook School", 640_000),
        ("fallback-4", "Text-to-speech voiceovers that don't sound robotic", "Voice Works", 410_000),
        ("fallback-5", "Stock footage that actually looks good", "B-Roll Daily", 275_000),
        ("fallback-6", "How the Shorts algorithm picks winners", "Growth Notes", 190_000),
    ]
    .into_iter()
    .map(|(id, title, channel, views)| VideoSummary {
        id: id.to_string(),
        title: title.to_string(),
        channel_title: channel.to_string(),
        published_at: None,
        thumbnail_url: None,
        view_count: Some(views),
        like_count: None,
        duration: None,
        url: "https://www.youtube.com/shorts".to_string(),
    })
    .collect()
}

#[derive(Clone)]
pub struct YoutubeService {
    client: Client,
    providers: ProvidersConfig,
}

impl YoutubeService {
    pub fn new(client: Client, providers: ProvidersConfig) -> Self {
        Self { client, providers }
    }

    fn data_url(&self, resource: &str) -> String {
        format!("{}/youtube/v3/{}", self.providers.youtube_api_base_url, resource)
    }

    pub async fn channel(&self, api_key: &str, channel: &ChannelRef) -> Result<ChannelSummary, ApiError> {
        let (param, value, label) = match channel {
            ChannelRef::Handle(handle) => ("forHandle", handle.as_str(), "handle"),
            ChannelRef::Id(id) => ("id", id.as_str(), "id"),
        };

        debug!("Looking up YouTube channel by {} {}", label, value);

        let response: ListResponse<ChannelItem> = upstream::send_json(
            PROVIDER,
            self.client
                .get(self.data_url("channels"))
                .query(&[("part", "snippet,statistics"), (param, value), ("key", api_key)]),
        )
        .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("No YouTube channel found for {} {}", label, value)))?;

        Ok(ChannelSummary {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            custom_url: item.snippet.custom_url,
            thumbnail_url: item.snippet.thumbnails.best(),
            subscriber_count: parse_count(&item.statistics.subscriber_count).unwrap_or(0),
            video_count: parse_count(&item.statistics.video_count).unwrap_or(0),
            view_count: parse_count(&item.statistics.view_count).unwrap_or(0),
        })
    }

    pub async fn trending(
        &self,
        api_key: &str,
        region: &str,
        category: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<VideoSummary>, ApiError> {
        let mut params = vec![
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region.to_string()),
            ("maxResults", max_results.to_string()),
            ("key", api_key.to_string()),
        ];
        if let Some(category) = category {
            params.push(("videoCategoryId", category.to_string()));
        }

        let response: ListResponse<VideoItem> = upstream::send_json(
            PROVIDER,
            self.client.get(self.data_url("videos")).query(&params),
        )
        .await?;

        Ok(response.items.into_iter().map(VideoItem::into_summary).collect())
    }

    pub async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
        short_only: bool,
    ) -> Result<Vec<VideoSummary>, ApiError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("q", query.to_string()),
            ("maxResults", max_results.to_string()),
            ("key", api_key.to_string()),
        ];
        if short_only {
            params.push(("videoDuration", "short".to_string()));
        }

        let response: ListResponse<SearchItem> = upstream::send_json(
            PROVIDER,
            self.client.get(self.data_url("search")).query(&params),
        )
        .await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let url = if short_only { shorts_url(&id) } else { watch_url(&id) };
                Some(VideoSummary {
                    title: item.snippet.title,
                    channel_title: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                    thumbnail_url: item.snippet.thumbnails.best(),
                    view_count: None,
                    like_count: None,
                    duration: None,
                    id,
                    url,
                })
            })
            .collect();

        Ok(videos)
    }

    /// Google consent-screen URL for the upload and read-only scopes.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, ApiError> {
        let scope = OAUTH_SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.providers.google_oauth_url,
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("include_granted_scopes", "true"),
                ("state", state),
            ],
        )
        .map_err(|e| ApiError::Internal(format!("Invalid OAuth URL: {}", e)))?;

        Ok(url.to_string())
    }

    pub async fn exchange_token(
        &self,
        oauth: &OAuthClient,
        grant: TokenGrant,
    ) -> Result<OAuthTokens, ApiError> {
        let mut form = vec![
            ("client_id", oauth.client_id.clone()),
            ("client_secret", oauth.client_secret.clone()),
        ];
        match grant {
            TokenGrant::AuthorizationCode(code) => {
                form.push(("grant_type", "authorization_code".to_string()));
                form.push(("code", code));
                form.push(("redirect_uri", oauth.redirect_uri.clone()));
            }
            TokenGrant::RefreshToken(refresh_token) => {
                form.push(("grant_type", "refresh_token".to_string()));
                form.push(("refresh_token", refresh_token));
            }
        }

        upstream::send_json(
            OAUTH_PROVIDER,
            self.client.post(&self.providers.google_token_url).form(&form),
        )
        .await
    }

    /// Resumable upload: open a session with the metadata, then PUT the bytes
    /// to the session URL returned in `Location`.
    pub async fn upload(
        &self,
        access_token: &str,
        metadata: UploadMetadata,
        video: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedVideo, ApiError> {
        let body = json!({
            "snippet": {
                "title": metadata.title,
                "description": metadata.description,
                "tags": metadata.tags,
                "categoryId": metadata.category_id,
            },
            "status": {
                "privacyStatus": metadata.privacy_status,
                "selfDeclaredMadeForKids": false,
            },
        });

        let init = upstream::send(
            PROVIDER,
            self.client
                .post(format!(
                    "{}/upload/youtube/v3/videos",
                    self.providers.youtube_upload_base_url
                ))
                .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
                .bearer_auth(access_token)
                .header("X-Upload-Content-Type", content_type)
                .header("X-Upload-Content-Length", video.len().to_string())
                .json(&body),
        )
        .await?;

        let session_url = init
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Upstream {
                provider: PROVIDER,
                status: 502,
                message: "YouTube did not return an upload session URL".to_string(),
            })?;

        debug!("Uploading {} bytes to resumable session", video.len());

        let uploaded: UploadResponse = upstream::send_json(
            PROVIDER,
            self.client
                .put(session_url)
                .bearer_auth(access_token)
                .header(CONTENT_TYPE, content_type)
                .body(video),
        )
        .await?;

        info!("Uploaded YouTube video {}", uploaded.id);

        let (upload_status, privacy_status) = match uploaded.status {
            Some(status) => (status.upload_status, status.privacy_status),
            None => (None, None),
        };

        Ok(UploadedVideo {
            url: watch_url(&uploaded.id),
            video_id: uploaded.id,
            upload_status,
            privacy_status,
        })
    }
}
