// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Remote lyrics search against the lrclib.net API.
//!
//! Only the search endpoint is used; the response carries the plain
//! lyrics inline, so "download" is just writing a hit to the text store.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::store::song_key;
use crate::viewer::PLACEHOLDER_TEXT;

const SEARCH_URL: &str = "https://lrclib.net/api/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search returned status {0}")]
    Status(u16),
}

/// A single search hit from lrclib.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
}

impl SearchHit {
    /// Display name, also the stem of the saved file name.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist_name, self.track_name)
    }

    /// Storage key this hit is saved under.
    pub fn storage_key(&self) -> String {
        song_key(&self.display_name())
    }

    /// Lyric text to store or display; empty lyrics become the fixed
    /// placeholder so a saved file is never blank.
    pub fn lyrics_or_placeholder(&self) -> &str {
        match self.plain_lyrics.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => PLACEHOLDER_TEXT,
        }
    }
}

/// Search lrclib for tracks matching `query` (artist, title, or both).
pub async fn search(client: &reqwest::Client, query: &str) -> Result<Vec<SearchHit>, SearchError> {
    let response = client
        .get(SEARCH_URL)
        .query(&[("q", query)])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SearchError::Status(response.status().as_u16()));
    }

    Ok(response.json::<Vec<SearchHit>>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_response() {
        let raw = r#"[
            {
                "trackName": "Alright",
                "artistName": "Supergrass",
                "plainLyrics": "We are young\nWe run green"
            },
            {
                "trackName": "Instrumental",
                "artistName": "Nobody",
                "plainLyrics": null
            }
        ]"#;

        let hits: Vec<SearchHit> = serde_json::from_str(raw).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].track_name, "Alright");
        assert_eq!(hits[0].artist_name, "Supergrass");
        assert_eq!(
            hits[0].plain_lyrics.as_deref(),
            Some("We are young\nWe run green")
        );
        assert_eq!(hits[1].plain_lyrics, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let raw = r#"[{"trackName": "Solo"}]"#;
        let hits: Vec<SearchHit> = serde_json::from_str(raw).unwrap();
        assert_eq!(hits[0].artist_name, "");
        assert_eq!(hits[0].plain_lyrics, None);
    }

    #[test]
    fn test_file_naming() {
        let hit = SearchHit {
            track_name: "Alright".into(),
            artist_name: "Supergrass".into(),
            plain_lyrics: None,
        };
        assert_eq!(hit.display_name(), "Supergrass - Alright");
        assert_eq!(hit.storage_key(), "Supergrass - Alright.txt");
    }

    #[test]
    fn test_empty_lyrics_become_placeholder() {
        let mut hit = SearchHit {
            track_name: "T".into(),
            artist_name: "A".into(),
            plain_lyrics: Some("   ".into()),
        };
        assert_eq!(hit.lyrics_or_placeholder(), PLACEHOLDER_TEXT);

        hit.plain_lyrics = None;
        assert_eq!(hit.lyrics_or_placeholder(), PLACEHOLDER_TEXT);

        hit.plain_lyrics = Some("real words".into());
        assert_eq!(hit.lyrics_or_placeholder(), "real words");
    }
}
