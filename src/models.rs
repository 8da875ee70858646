use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::store::ManualStore;
use crate::youtube::YouTubeClient;

/// Sentinel for missing or unparseable publish dates. Zero-padded so it
/// compares lexicographically below every real date and sorts last in the
/// newest-first combined output.
pub const SENTINEL_DATE: &str = "0000-00-00";

/// A video entry from either source, in the dashboard's unified shape.
///
/// `published` is always a 10-character `YYYY-MM-DD` string once a record
/// has been constructed; use [`normalize_date_str`] to uphold that.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub title: String,
    pub channel: String,
    pub url: String,
    pub published: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub platform: Platform,
    pub keywords: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Manual,
}

/// Reduce a date-like string to its 10-character `YYYY-MM-DD` prefix.
/// Anything that does not start with a valid calendar date becomes the
/// sentinel date.
pub fn normalize_date_str(value: &str) -> String {
    let prefix: String = value.trim().chars().take(10).collect();
    if chrono::NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").is_ok() {
        prefix
    } else {
        SENTINEL_DATE.to_string()
    }
}

pub struct AppState {
    pub config: Config,
    pub youtube: YouTubeClient,
    pub store: ManualStore,
}

pub type SharedState = Arc<AppState>;

/// Which sources feed a combined query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    All,
    Youtube,
    Manual,
}

fn default_max_results() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct CombinedParams {
    pub query: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub source: Source,
}

#[derive(Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
