//! Merge & filter engine
//!
//! Filters persisted manual records by publish window and keyword, fills
//! the documented defaults for missing fields, and merges both sources
//! into one newest-first list.

use crate::models::{normalize_date_str, Platform, VideoRecord};
use crate::store::ManualVideo;

/// Filter manual rows by publish window and keyword substring, converting
/// the survivors to the unified record shape.
///
/// The date comparison is lexicographic, which equals chronological order
/// because both sides are zero-padded ISO dates. An empty query matches
/// every record.
pub fn filter_manual(rows: Vec<ManualVideo>, query: &str, start: &str, end: &str) -> Vec<VideoRecord> {
    let needle = query.trim().to_lowercase();

    rows.into_iter()
        .filter(|row| {
            let published = row.published.as_str();
            start <= published && published <= end
        })
        .filter(|row| needle.is_empty() || row.keywords.to_lowercase().contains(&needle))
        .map(manual_to_record)
        .collect()
}

/// Convert a stored row to a `VideoRecord`, applying the documented
/// defaults so the merged list never carries missing required fields.
pub fn manual_to_record(row: ManualVideo) -> VideoRecord {
    let channel = if row.channel.trim().is_empty() {
        if row.id > 0 {
            row.id.to_string()
        } else {
            "Unknown".to_string()
        }
    } else {
        row.channel
    };

    VideoRecord {
        video_id: None,
        title: default_if_empty(row.title, "Untitled"),
        channel,
        url: default_if_empty(row.url, "#"),
        published: normalize_date_str(&row.published),
        views: row.views.max(0) as u64,
        likes: row.likes.max(0) as u64,
        comments: row.comments.max(0) as u64,
        platform: Platform::Manual,
        keywords: row.keywords.to_lowercase(),
    }
}

/// Concatenate both sources (API results first) and sort newest-first.
/// The sort is stable, so same-day entries keep their source order.
pub fn combine_and_sort(api: Vec<VideoRecord>, manual: Vec<VideoRecord>) -> Vec<VideoRecord> {
    let mut combined = api;
    combined.extend(manual);
    combined.sort_by(|a, b| b.published.cmp(&a.published));
    combined
}

fn default_if_empty(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL_DATE;

    fn manual_row(id: i64, published: &str, keywords: &str) -> ManualVideo {
        ManualVideo {
            id,
            title: "T".to_string(),
            channel: "C".to_string(),
            published: published.to_string(),
            views: 100,
            likes: 10,
            comments: 2,
            url: "http://x".to_string(),
            keywords: keywords.to_string(),
        }
    }

    fn api_record(id: &str, published: &str) -> VideoRecord {
        VideoRecord {
            video_id: Some(id.to_string()),
            title: id.to_string(),
            channel: "yt".to_string(),
            url: format!("https://youtu.be/{}", id),
            published: published.to_string(),
            views: 1,
            likes: 1,
            comments: 1,
            platform: Platform::YouTube,
            keywords: "q".to_string(),
        }
    }

    #[test]
    fn records_outside_the_window_are_dropped() {
        let rows = vec![
            manual_row(1, "2023-12-31", "music"),
            manual_row(2, "2024-01-05", "music"),
            manual_row(3, "2024-02-01", "music"),
        ];

        let out = filter_manual(rows, "music", "2024-01-01", "2024-01-31");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].published, "2024-01-05");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let rows = vec![
            manual_row(1, "2024-01-01", "music"),
            manual_row(2, "2024-01-31", "music"),
        ];

        let out = filter_manual(rows, "music", "2024-01-01", "2024-01-31");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let rows = vec![
            manual_row(1, "2024-01-05", "Music,Pop"),
            manual_row(2, "2024-01-06", "news"),
        ];

        let out = filter_manual(rows, "POP", "2024-01-01", "2024-01-31");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].published, "2024-01-05");
    }

    #[test]
    fn empty_query_matches_everything_in_window() {
        let rows = vec![
            manual_row(1, "2024-01-05", "music"),
            manual_row(2, "2024-01-06", ""),
        ];

        let out = filter_manual(rows, "", "2024-01-01", "2024-01-31");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn missing_fields_get_documented_defaults() {
        let row = ManualVideo {
            id: 7,
            title: "  ".to_string(),
            channel: "".to_string(),
            published: "bogus".to_string(),
            views: -3,
            likes: 0,
            comments: 0,
            url: "".to_string(),
            keywords: "MUSIC".to_string(),
        };

        let rec = manual_to_record(row);
        assert_eq!(rec.title, "Untitled");
        assert_eq!(rec.channel, "7");
        assert_eq!(rec.url, "#");
        assert_eq!(rec.published, SENTINEL_DATE);
        assert_eq!(rec.published.len(), 10);
        assert_eq!(rec.views, 0);
        assert_eq!(rec.platform, Platform::Manual);
        assert_eq!(rec.keywords, "music");
    }

    #[test]
    fn combined_output_is_sorted_newest_first() {
        let api = vec![api_record("a", "2024-01-10"), api_record("b", "2024-01-20")];
        let manual = filter_manual(
            vec![
                manual_row(1, "2024-01-15", "q"),
                manual_row(2, "2024-01-25", "q"),
            ],
            "q",
            "2024-01-01",
            "2024-01-31",
        );

        let out = combine_and_sort(api, manual);
        let dates: Vec<_> = out.iter().map(|r| r.published.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-25", "2024-01-20", "2024-01-15", "2024-01-10"]);
    }

    #[test]
    fn sentinel_dates_sort_last_and_api_wins_ties() {
        let api = vec![api_record("a", "2024-01-10")];
        let manual = vec![
            manual_to_record(manual_row(1, "2024-01-10", "q")),
            manual_to_record(ManualVideo {
                published: "unknown".to_string(),
                ..manual_row(2, "", "q")
            }),
        ];

        let out = combine_and_sort(api, manual);
        assert_eq!(out.last().unwrap().published, SENTINEL_DATE);
        // stable sort keeps the API record ahead of the same-day manual one
        assert_eq!(out[0].platform, Platform::YouTube);
        assert_eq!(out[1].platform, Platform::Manual);
    }
}
