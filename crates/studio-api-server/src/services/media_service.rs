//! Stock photo and video search over Pexels and Pixabay.
//!
//! Both providers are reshaped into one `MediaItem` list so the editor can
//! treat results uniformly.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigKey, ProvidersConfig};
use crate::services::upstream;
use crate::utils::error::ApiError;

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 80;

// Pixabay rejects per_page below 3
const PIXABAY_MIN_PER_PAGE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    #[default]
    Pexels,
    Pixabay,
}

impl MediaProvider {
    pub fn config_key(self) -> ConfigKey {
        match self {
            MediaProvider::Pexels => ConfigKey::PexelsApiKey,
            MediaProvider::Pixabay => ConfigKey::PixabayApiKey,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaProvider::Pexels => "Pexels",
            MediaProvider::Pixabay => "Pixabay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    #[serde(alias = "image", alias = "photos")]
    Photo,
    #[serde(alias = "videos")]
    Video,
}

#[derive(Debug, Clone)]
pub struct MediaQuery {
    pub query: String,
    pub kind: MediaKind,
    pub per_page: u32,
    pub orientation: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MediaItem {
    pub id: String,
    pub page_url: String,
    pub download_url: String,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaResults {
    pub provider: MediaProvider,
    pub kind: MediaKind,
    pub total: u64,
    pub results: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoPage {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    id: u64,
    width: u32,
    height: u32,
    url: String,
    photographer: Option<String>,
    src: PexelsPhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSrc {
    original: String,
    large2x: Option<String>,
    medium: Option<String>,
    tiny: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoPage {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    width: u32,
    height: u32,
    url: String,
    duration: Option<u32>,
    image: Option<String>,
    user: Option<PexelsUser>,
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct PexelsVideoFile {
    link: String,
    quality: Option<String>,
    file_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixabayPage<T> {
    #[serde(default)]
    total_hits: u64,
    #[serde(default = "Vec::new")]
    hits: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixabayImage {
    id: u64,
    #[serde(rename = "pageURL")]
    page_url: String,
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
    #[serde(rename = "webformatURL")]
    webformat_url: String,
    #[serde(rename = "previewURL")]
    preview_url: Option<String>,
    image_width: u32,
    image_height: u32,
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixabayVideo {
    id: u64,
    #[serde(rename = "pageURL")]
    page_url: String,
    duration: Option<u32>,
    user: Option<String>,
    videos: PixabayVideoSizes,
}

#[derive(Debug, Deserialize)]
struct PixabayVideoSizes {
    large: Option<PixabayVideoFile>,
    medium: Option<PixabayVideoFile>,
    small: Option<PixabayVideoFile>,
    tiny: Option<PixabayVideoFile>,
}

#[derive(Debug, Deserialize, Clone)]
struct PixabayVideoFile {
    url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    thumbnail: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    client: Client,
    providers: ProvidersConfig,
}

impl MediaService {
    pub fn new(client: Client, providers: ProvidersConfig) -> Self {
        Self { client, providers }
    }

    pub async fn search(
        &self,
        provider: MediaProvider,
        api_key: &str,
        query: MediaQuery,
    ) -> Result<MediaResults, ApiError> {
        debug!(
            "{} {:?} search '{}' ({} per page, {})",
            provider.label(),
            query.kind,
            query.query,
            query.per_page,
            query.orientation
        );

        let (total, results) = match (provider, query.kind) {
            (MediaProvider::Pexels, MediaKind::Photo) => self.pexels_photos(api_key, &query).await?,
            (MediaProvider::Pexels, MediaKind::Video) => self.pexels_videos(api_key, &query).await?,
            (MediaProvider::Pixabay, MediaKind::Photo) => self.pixabay_photos(api_key, &query).await?,
            (MediaProvider::Pixabay, MediaKind::Video) => self.pixabay_videos(api_key, &query).await?,
        };

        Ok(MediaResults {
            provider,
            kind: query.kind,
            total,
            results,
        })
    }

    async fn pexels_photos(
        &self,
        api_key: &str,
        query: &MediaQuery,
    ) -> Result<(u64, Vec<MediaItem>), ApiError> {
        let page: PexelsPhotoPage = upstream::send_json(
            MediaProvider::Pexels.label(),
            self.client
                .get(format!("{}/v1/search", self.providers.pexels_base_url))
                .header("Authorization", api_key)
                .query(&pexels_params(query)),
        )
        .await?;

        let results = page
            .photos
            .into_iter()
            .map(|photo| MediaItem {
                id: photo.id.to_string(),
                page_url: photo.url,
                thumbnail_url: photo
                    .src
                    .medium
                    .or(photo.src.tiny)
                    .unwrap_or_else(|| photo.src.original.clone()),
                download_url: photo.src.large2x.unwrap_or(photo.src.original),
                width: photo.width,
                height: photo.height,
                duration_seconds: None,
                author: photo.photographer,
            })
            .collect();

        Ok((page.total_results, results))
    }

    async fn pexels_videos(
        &self,
        api_key: &str,
        query: &MediaQuery,
    ) -> Result<(u64, Vec<MediaItem>), ApiError> {
        let page: PexelsVideoPage = upstream::send_json(
            MediaProvider::Pexels.label(),
            self.client
                .get(format!("{}/videos/search", self.providers.pexels_base_url))
                .header("Authorization", api_key)
                .query(&pexels_params(query)),
        )
        .await?;

        let results = page
            .videos
            .into_iter()
            .filter_map(|video| {
                let file = pick_pexels_file(&video.video_files)?;
                Some(MediaItem {
                    id: video.id.to_string(),
                    page_url: video.url,
                    download_url: file.link.clone(),
                    thumbnail_url: video.image.unwrap_or_default(),
                    width: file.width.unwrap_or(video.width),
                    height: file.height.unwrap_or(video.height),
                    duration_seconds: video.duration,
                    author: video.user.and_then(|u| u.name),
                })
            })
            .collect();

        Ok((page.total_results, results))
    }

    async fn pixabay_photos(
        &self,
        api_key: &str,
        query: &MediaQuery,
    ) -> Result<(u64, Vec<MediaItem>), ApiError> {
        let mut params = pixabay_params(api_key, query);
        params.push(("image_type", "photo".to_string()));
        params.push(("orientation", pixabay_orientation(&query.orientation).to_string()));

        let page: PixabayPage<PixabayImage> = upstream::send_json(
            MediaProvider::Pixabay.label(),
            self.client
                .get(format!("{}/api/", self.providers.pixabay_base_url))
                .query(&params),
        )
        .await?;

        let results = page
            .hits
            .into_iter()
            .map(|hit| MediaItem {
                id: hit.id.to_string(),
                page_url: hit.page_url,
                thumbnail_url: hit
                    .preview_url
                    .unwrap_or_else(|| hit.webformat_url.clone()),
                download_url: hit.large_image_url.unwrap_or(hit.webformat_url),
                width: hit.image_width,
                height: hit.image_height,
                duration_seconds: None,
                author: hit.user,
            })
            .collect();

        Ok((page.total_hits, results))
    }

    async fn pixabay_videos(
        &self,
        api_key: &str,
        query: &MediaQuery,
    ) -> Result<(u64, Vec<MediaItem>), ApiError> {
        let params = pixabay_params(api_key, query);

        let page: PixabayPage<PixabayVideo> = upstream::send_json(
            MediaProvider::Pixabay.label(),
            self.client
                .get(format!("{}/api/videos/", self.providers.pixabay_base_url))
                .query(&params),
        )
        .await?;

        let results = page
            .hits
            .into_iter()
            .filter_map(|hit| {
                let file = pick_pixabay_file(&hit.videos)?;
                Some(MediaItem {
                    id: hit.id.to_string(),
                    page_url: hit.page_url,
                    download_url: file.url.clone(),
                    thumbnail_url: file.thumbnail.clone().unwrap_or_default(),
                    width: file.width,
                    height: file.height,
                    duration_seconds: hit.duration,
                    author: hit.user,
                })
            })
            .collect();

        Ok((page.total_hits, results))
    }
}

fn pexels_params(query: &MediaQuery) -> Vec<(&'static str, String)> {
    vec![
        ("query", query.query.clone()),
        ("per_page", query.per_page.to_string()),
        ("orientation", query.orientation.clone()),
    ]
}

fn pixabay_params(api_key: &str, query: &MediaQuery) -> Vec<(&'static str, String)> {
    vec![
        ("key", api_key.to_string()),
        ("q", query.query.clone()),
        ("per_page", query.per_page.max(PIXABAY_MIN_PER_PAGE).to_string()),
        ("safesearch", "true".to_string()),
    ]
}

fn pixabay_orientation(orientation: &str) -> &'static str {
    match orientation {
        "portrait" | "vertical" => "vertical",
        "landscape" | "horizontal" => "horizontal",
        _ => "all",
    }
}

/// Prefer HD mp4 renditions, then the widest one.
fn pick_pexels_file(files: &[PexelsVideoFile]) -> Option<&PexelsVideoFile> {
    let mp4: Vec<&PexelsVideoFile> = files
        .iter()
        .filter(|f| f.file_type.as_deref().map_or(true, |t| t == "video/mp4"))
        .filter(|f| !f.link.is_empty())
        .collect();

    mp4.iter()
        .copied()
        .filter(|f| f.quality.as_deref() == Some("hd"))
        .max_by_key(|f| f.width.unwrap_or(0))
        .or_else(|| mp4.iter().copied().max_by_key(|f| f.width.unwrap_or(0)))
}

fn pick_pixabay_file(sizes: &PixabayVideoSizes) -> Option<&PixabayVideoFile> {
    [&sizes.large, &sizes.medium, &sizes.small, &sizes.tiny]
        .into_iter()
        .flatten()
        .find(|f| !f.url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> MediaService {
        let mut settings = Settings::for_tests();
        settings.providers.pexels_base_url = server.uri();
        settings.providers.pixabay_base_url = server.uri();
        MediaService::new(Client::new(), settings.providers)
    }

    fn query(kind: MediaKind) -> MediaQuery {
        MediaQuery {
            query: "ocean".to_string(),
            kind,
            per_page: 2,
            orientation: "portrait".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pexels_photos_reshaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("authorization", "px-key"))
            .and(query_param("query", "ocean"))
            .and(query_param("orientation", "portrait"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_results": 120,
                "photos": [{
                    "id": 42, "width": 3000, "height": 4000,
                    "url": "https://www.pexels.com/photo/42/",
                    "photographer": "Ana",
                    "src": {
                        "original": "https://images.pexels.com/42.jpeg",
                        "large2x": "https://images.pexels.com/42-large2x.jpeg",
                        "medium": "https://images.pexels.com/42-medium.jpeg"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let results = service(&server)
            .search(MediaProvider::Pexels, "px-key", query(MediaKind::Photo))
            .await
            .unwrap();

        assert_eq!(results.total, 120);
        let item = &results.results[0];
        assert_eq!(item.id, "42");
        assert_eq!(item.download_url, "https://images.pexels.com/42-large2x.jpeg");
        assert_eq!(item.thumbnail_url, "https://images.pexels.com/42-medium.jpeg");
        assert_eq!(item.author.as_deref(), Some("Ana"));
        assert!(item.duration_seconds.is_none());
    }

    #[tokio::test]
    async fn test_pexels_videos_pick_hd_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_results": 1,
                "videos": [{
                    "id": 7, "width": 1080, "height": 1920, "duration": 14,
                    "url": "https://www.pexels.com/video/7/",
                    "image": "https://images.pexels.com/videos/7/poster.jpeg",
                    "user": { "name": "Ben" },
                    "video_files": [
                        { "link": "https://v/sd.mp4", "quality": "sd", "file_type": "video/mp4", "width": 540, "height": 960 },
                        { "link": "https://v/hd.mp4", "quality": "hd", "file_type": "video/mp4", "width": 1080, "height": 1920 },
                        { "link": "https://v/uhd.mp4", "quality": "uhd", "file_type": "video/mp4", "width": 2160, "height": 3840 }
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let results = service(&server)
            .search(MediaProvider::Pexels, "px-key", query(MediaKind::Video))
            .await
            .unwrap();

        let item = &results.results[0];
        assert_eq!(item.download_url, "https://v/hd.mp4");
        assert_eq!(item.duration_seconds, Some(14));
        assert_eq!(item.author.as_deref(), Some("Ben"));
    }

    #[tokio::test]
    async fn test_pixabay_photos_send_key_and_vertical_orientation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("key", "pb-key"))
            .and(query_param("orientation", "vertical"))
            .and(query_param("per_page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 500, "totalHits": 500,
                "hits": [{
                    "id": 9, "pageURL": "https://pixabay.com/photos/9/",
                    "previewURL": "https://cdn.pixabay.com/9_150.jpg",
                    "webformatURL": "https://pixabay.com/get/9_640.jpg",
                    "largeImageURL": "https://pixabay.com/get/9_1280.jpg",
                    "imageWidth": 1920, "imageHeight": 2880, "user": "cara"
                }]
            })))
            .mount(&server)
            .await;

        let results = service(&server)
            .search(MediaProvider::Pixabay, "pb-key", query(MediaKind::Photo))
            .await
            .unwrap();

        assert_eq!(results.total, 500);
        assert_eq!(results.results[0].download_url, "https://pixabay.com/get/9_1280.jpg");
        assert_eq!(results.results[0].width, 1920);
    }

    #[tokio::test]
    async fn test_pixabay_videos_skip_empty_renditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalHits": 1,
                "hits": [{
                    "id": 11, "pageURL": "https://pixabay.com/videos/11/", "duration": 20, "user": "dan",
                    "videos": {
                        "large": { "url": "", "width": 0, "height": 0, "thumbnail": "" },
                        "medium": { "url": "https://cdn.pixabay.com/11_medium.mp4", "width": 1280, "height": 720, "thumbnail": "https://cdn.pixabay.com/11.jpg" }
                    }
                }]
            })))
            .mount(&server)
            .await;

        let results = service(&server)
            .search(MediaProvider::Pixabay, "pb-key", query(MediaKind::Video))
            .await
            .unwrap();

        let item = &results.results[0];
        assert_eq!(item.download_url, "https://cdn.pixabay.com/11_medium.mp4");
        assert_eq!(item.thumbnail_url, "https://cdn.pixabay.com/11.jpg");
        assert_eq!(item.duration_seconds, Some(20));
    }

    #[tokio::test]
    async fn test_pixabay_plain_text_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(400).set_body_string("[ERROR 400] Invalid or missing API key"))
            .mount(&server)
            .await;

        let err = service(&server)
            .search(MediaProvider::Pixabay, "bad", query(MediaKind::Photo))
            .await
            .unwrap_err();

        assert_eq!(err.status().as_u16(), 400);
        assert!(err.to_string().contains("Invalid or missing API key"));
    }
}
