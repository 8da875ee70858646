//! YouTube Data API v3 client
//!
//! Issues paginated search queries and batched statistics lookups, and
//! normalizes every video into the dashboard's `VideoRecord` shape. A
//! search-stage failure is returned to the caller; a failed statistics
//! batch only degrades the result set.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{normalize_date_str, Platform, VideoRecord};

const YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for the search endpoint and batch size for statistics lookups.
const PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("unexpected response body: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListPage {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
}

/// Statistics arrive as decimal strings, and any counter may be absent
/// (e.g. likes hidden on a video).
#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, YouTubeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YouTubeError::Network(e.to_string()))?;

        Ok(Self { http, api_key })
    }

    /// Search for videos in the publish window and enrich the hits with
    /// view/like/comment counts.
    pub async fn search_and_enrich(
        &self,
        query: &str,
        start: &str,
        end: &str,
        max_results: usize,
    ) -> Result<Vec<VideoRecord>, YouTubeError> {
        let query = clean_query(query).ok_or(YouTubeError::EmptyQuery)?;
        let ids = self.collect_ids(&query, start, end, max_results).await?;
        debug!("[youtube] collected {} video ids for '{}'", ids.len(), query);
        Ok(self.enrich(&ids, &query).await)
    }

    /// Walk the search endpoint's continuation tokens, accumulating video
    /// ids until `max_results` are collected or the provider runs out of
    /// pages.
    async fn collect_ids(
        &self,
        query: &str,
        start: &str,
        end: &str,
        max_results: usize,
    ) -> Result<Vec<String>, YouTubeError> {
        let mut ids = Vec::new();
        let mut page_token = String::new();

        loop {
            let page: SearchPage = self
                .get_json(
                    &format!("{}/search", YOUTUBE_BASE_URL),
                    &[
                        ("part", "snippet"),
                        ("type", "video"),
                        ("maxResults", &PAGE_SIZE.to_string()),
                        ("q", query),
                        ("publishedAfter", &format!("{}T00:00:00Z", start)),
                        ("publishedBefore", &format!("{}T23:59:59Z", end)),
                        ("pageToken", &page_token),
                        ("key", &self.api_key),
                    ],
                )
                .await?;

            for item in page.items {
                if let Some(id) = item.id.video_id {
                    ids.push(id);
                    if ids.len() >= max_results {
                        return Ok(ids);
                    }
                }
            }

            match page.next_page_token {
                Some(token) => page_token = token,
                None => return Ok(ids),
            }
        }
    }

    /// Look up statistics for the collected ids in batches. A failed batch
    /// is logged and skipped rather than failing the whole query.
    async fn enrich(&self, ids: &[String], keywords: &str) -> Vec<VideoRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(ids.len());

        for batch in ids.chunks(PAGE_SIZE) {
            let page: VideoListPage = match self
                .get_json(
                    &format!("{}/videos", YOUTUBE_BASE_URL),
                    &[
                        ("part", "snippet,statistics"),
                        ("id", &batch.join(",")),
                        ("key", &self.api_key),
                    ],
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "[youtube] statistics batch failed, dropping {} ids: {}",
                        batch.len(),
                        e
                    );
                    continue;
                }
            };

            append_records(page, keywords, &mut seen, &mut records);
        }

        records
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, YouTubeError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| YouTubeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YouTubeError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| YouTubeError::Parse(e.to_string()))
    }
}

/// Convert one statistics page into records, skipping ids already emitted.
/// The provider can return the same video in two batches.
fn append_records(
    page: VideoListPage,
    keywords: &str,
    seen: &mut HashSet<String>,
    records: &mut Vec<VideoRecord>,
) {
    for item in page.items {
        if !seen.insert(item.id.clone()) {
            continue;
        }
        records.push(VideoRecord {
            url: format!("https://youtu.be/{}", item.id),
            video_id: Some(item.id),
            title: repair_text(&item.snippet.title),
            channel: repair_text(&item.snippet.channel_title),
            published: normalize_date_str(&item.snippet.published_at),
            views: parse_count(item.statistics.view_count.as_deref()),
            likes: parse_count(item.statistics.like_count.as_deref()),
            comments: parse_count(item.statistics.comment_count.as_deref()),
            platform: Platform::YouTube,
            keywords: keywords.to_lowercase(),
        });
    }
}

/// Strip a leading hashtag; `None` if nothing remains.
fn clean_query(query: &str) -> Option<String> {
    let cleaned = query.strip_prefix('#').unwrap_or(query).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Best-effort repair for text that was decoded with the wrong charset
/// upstream. If every char fits in Latin-1 and those bytes form valid
/// UTF-8, the text was double-decoded; reinterpret it. Otherwise return
/// the input with NUL bytes stripped.
fn repair_text(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let latin1: Option<Vec<u8>> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    if let Some(bytes) = latin1 {
        if let Ok(repaired) = String::from_utf8(bytes) {
            return repaired;
        }
    }

    text.replace('\0', "")
}
