use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Video search + statistics lookups, as used by the search orchestrator.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn search(&self, api_key: &str, query: &str, max_results: u32)
        -> Result<Vec<SearchItem>>;

    /// Statistics for a batch of ids. The response order is not relied upon.
    async fn statistics(&self, api_key: &str, video_ids: &[String]) -> Result<Vec<VideoDetails>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best available resolution: high, then medium, then default.
    pub fn best_url(&self) -> Option<String> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|thumbnail| thumbnail.url.clone())
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(default)]
    pub id: String,
    pub statistics: Option<Statistics>,
    pub content_details: Option<ContentDetails>,
}

impl VideoDetails {
    pub fn views(&self) -> u64 {
        self.statistics
            .as_ref()
            .map_or(0, |s| parse_count(&s.view_count))
    }

    pub fn likes(&self) -> u64 {
        self.statistics
            .as_ref()
            .map_or(0, |s| parse_count(&s.like_count))
    }

    pub fn comments(&self) -> u64 {
        self.statistics
            .as_ref()
            .map_or(0, |s| parse_count(&s.comment_count))
    }

    pub fn duration(&self) -> &str {
        self.content_details
            .as_ref()
            .and_then(|c| c.duration.as_deref())
            .unwrap_or("PT0M0S")
    }
}

// Counts come back as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
}

fn parse_count(count: &Option<String>) -> u64 {
    count
        .as_deref()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(0)
}

/// YouTube Data API v3 client.
pub struct YouTubeDataApi {
    client: Client,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(base_url: &str) -> Result<Self> {
        // fail at startup rather than on the first request
        Url::parse(base_url).with_context(|| format!("Invalid YouTube API base URL: {base_url}"))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        Url::parse(&format!("{}/{resource}", self.base_url))
            .with_context(|| format!("Invalid YouTube endpoint for '{resource}'"))
    }

    async fn get(&self, resource: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.endpoint(resource)?;
        debug!("GET {url} ({} params)", params.len());

        // without_url keeps the api key out of error messages
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "status {}: {}",
                status.as_u16(),
                provider_error_message(&body)
            ));
        }

        Ok(response)
    }
}

/// Pull `error.message` out of the provider's error envelope, or fall back to
/// the raw body.
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl VideoProvider for YouTubeDataApi {
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchItem>> {
        // Documentation: https://developers.google.com/youtube/v3/docs/search/list
        let max_results = max_results.to_string();
        let response = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("q", query),
                    ("maxResults", max_results.as_str()),
                    ("order", "relevance"),
                    ("relevanceLanguage", "en"),
                    ("key", api_key),
                ],
            )
            .await
            .context("YouTube search request failed")?
            .json::<SearchListResponse>()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse YouTube search response")?;

        Ok(response.items)
    }

    async fn statistics(&self, api_key: &str, video_ids: &[String]) -> Result<Vec<VideoDetails>> {
        // Documentation: https://developers.google.com/youtube/v3/docs/videos/list
        let ids = video_ids.join(",");
        let response = self
            .get(
                "videos",
                &[
                    ("part", "statistics,contentDetails"),
                    ("id", ids.as_str()),
                    ("key", api_key),
                ],
            )
            .await
            .context("YouTube statistics request failed")?
            .json::<VideoListResponse>()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse YouTube statistics response")?;

        Ok(response.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_response() {
        let body = r#"{
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "abc123" },
                    "snippet": {
                        "title": "5G NR explained",
                        "description": "New radio basics",
                        "channelTitle": "Wireless Academy",
                        "publishedAt": "2024-01-10T12:00:00Z",
                        "thumbnails": {
                            "default": { "url": "https://i.ytimg.com/d.jpg" },
                            "medium": { "url": "https://i.ytimg.com/m.jpg" }
                        }
                    }
                },
                { "id": { "kind": "youtube#channel", "channelId": "UC1" } }
            ]
        }"#;

        let parsed: SearchListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.items.len(), 2);

        let first = &parsed.items[0];
        assert_eq!(first.id.video_id.as_deref(), Some("abc123"));
        assert_eq!(first.snippet.channel_title, "Wireless Academy");
        assert_eq!(
            first.snippet.thumbnails.best_url().as_deref(),
            Some("https://i.ytimg.com/m.jpg")
        );

        assert!(parsed.items[1].id.video_id.is_none());
    }

    #[test]
    fn empty_search_response_has_no_items() {
        let parsed: SearchListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn thumbnail_prefers_high_then_falls_back() {
        let thumbs = Thumbnails {
            default: Some(Thumbnail {
                url: "d".to_string(),
            }),
            medium: None,
            high: Some(Thumbnail {
                url: "h".to_string(),
            }),
        };
        assert_eq!(thumbs.best_url().as_deref(), Some("h"));

        let only_default = Thumbnails {
            default: Some(Thumbnail {
                url: "d".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(only_default.best_url().as_deref(), Some("d"));

        assert_eq!(Thumbnails::default().best_url(), None);
    }

    #[test]
    fn parses_statistics_with_missing_fields() {
        let body = r#"{
            "items": [
                {
                    "id": "abc123",
                    "statistics": { "viewCount": "1500", "likeCount": "40" },
                    "contentDetails": { "duration": "PT4M5S" }
                },
                { "id": "def456" }
            ]
        }"#;

        let parsed: VideoListResponse = serde_json::from_str(body).unwrap();
        let first = &parsed.items[0];
        assert_eq!(first.views(), 1500);
        assert_eq!(first.likes(), 40);
        assert_eq!(first.comments(), 0);
        assert_eq!(first.duration(), "PT4M5S");

        let second = &parsed.items[1];
        assert_eq!(second.views(), 0);
        assert_eq!(second.duration(), "PT0M0S");
    }

    #[test]
    fn unparseable_counts_become_zero() {
        assert_eq!(parse_count(&Some("n/a".to_string())), 0);
        assert_eq!(parse_count(&Some(" 42 ".to_string())), 42);
        assert_eq!(parse_count(&None), 0);
    }

    #[test]
    fn extracts_provider_error_message() {
        let body = r#"{"error":{"code":403,"message":"API key not valid. Please pass a valid API key."}}"#;
        assert_eq!(
            provider_error_message(body),
            "API key not valid. Please pass a valid API key."
        );
        assert_eq!(provider_error_message(" Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(YouTubeDataApi::new("not a url").is_err());
        let api = YouTubeDataApi::new("http://localhost:9000/youtube/v3/").unwrap();
        assert_eq!(
            api.endpoint("search").unwrap().as_str(),
            "http://localhost:9000/youtube/v3/search"
        );
    }

    mod http {
        use super::super::*;
        use serde_json::json;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const KEY: &str = "SECRETKEY123";

        fn api_for(server: &MockServer) -> YouTubeDataApi {
            YouTubeDataApi::new(&format!("{}/youtube/v3", server.uri())).unwrap()
        }

        #[rocket::async_test]
        async fn search_sends_expected_query() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/youtube/v3/search"))
                .and(query_param("part", "snippet"))
                .and(query_param("type", "video"))
                .and(query_param("q", "5g nr & mimo"))
                .and(query_param("maxResults", "25"))
                .and(query_param("order", "relevance"))
                .and(query_param("relevanceLanguage", "en"))
                .and(query_param("key", KEY))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": [{
                        "id": { "kind": "youtube#video", "videoId": "abc123" },
                        "snippet": { "title": "5G NR", "channelTitle": "RF Lab" }
                    }]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let items = api_for(&server)
                .search(KEY, "5g nr & mimo", 25)
                .await
                .unwrap();

            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id.video_id.as_deref(), Some("abc123"));
            assert_eq!(items[0].snippet.channel_title, "RF Lab");
        }

        #[rocket::async_test]
        async fn statistics_sends_comma_joined_ids() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/youtube/v3/videos"))
                .and(query_param("part", "statistics,contentDetails"))
                .and(query_param("id", "a,b"))
                .and(query_param("key", KEY))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "items": [
                        { "id": "b", "statistics": { "viewCount": "7" } },
                        { "id": "a", "contentDetails": { "duration": "PT1M" } }
                    ]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let details = api_for(&server)
                .statistics(KEY, &["a".to_string(), "b".to_string()])
                .await
                .unwrap();

            assert_eq!(details.len(), 2);
            assert_eq!(details[0].id, "b");
            assert_eq!(details[0].views(), 7);
            assert_eq!(details[1].duration(), "PT1M");
        }

        #[rocket::async_test]
        async fn error_status_reports_provider_message() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/youtube/v3/search"))
                .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                    "error": {
                        "code": 403,
                        "message": "API key not valid. Please pass a valid API key."
                    }
                })))
                .mount(&server)
                .await;

            let err = api_for(&server).search(KEY, "5g", 20).await.unwrap_err();
            let message = format!("{err:#}");

            assert_eq!(
                message,
                "YouTube search request failed: status 403: API key not valid. Please pass a valid API key."
            );
            assert!(!message.contains(KEY));
        }

        #[rocket::async_test]
        async fn malformed_body_is_a_parse_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/youtube/v3/videos"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
                .mount(&server)
                .await;

            let err = api_for(&server)
                .statistics(KEY, &["a".to_string()])
                .await
                .unwrap_err();
            let message = format!("{err:#}");

            assert!(message.starts_with("Failed to parse YouTube statistics response"));
            assert!(!message.contains(KEY));
        }

        #[rocket::async_test]
        async fn connection_errors_do_not_leak_the_key() {
            // nothing listens on the discard port
            let api = YouTubeDataApi::new("http://127.0.0.1:9/youtube/v3").unwrap();

            let err = api.search(KEY, "5g", 20).await.unwrap_err();
            let message = format!("{err:#}");

            assert!(message.starts_with("YouTube search request failed: "));
            assert!(!message.contains(KEY), "key leaked: {message}");
            assert!(!message.contains("key="), "url leaked: {message}");
        }
    }
}
