// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Setlists: named, ordered collections of song references.
//!
//! The whole collection is one JSON document persisted through the
//! settings store after every mutation. Songs are referenced by display
//! name only; the lyric text lives in the text store under
//! `"<name>.txt"`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::SettingsHandle;

/// Storage key for the serialized setlist collection.
const SETLISTS_KEY: &str = "setlists";

/// A song reference. The name doubles as the storage key stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
}

impl Song {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named, ordered collection of songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Setlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            songs: Vec::new(),
        }
    }
}

fn fresh_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

/// The full collection of setlists, with persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetlistBook {
    pub setlists: Vec<Setlist>,
}

impl SetlistBook {
    /// Load the collection from the settings store. An absent or
    /// unparseable entry yields an empty book.
    pub fn load(settings: &SettingsHandle) -> Self {
        settings
            .raw_get(SETLISTS_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(book) => Some(book),
                Err(e) => {
                    warn!(error = %e, "ignoring malformed setlist data");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Persist the collection, fire-and-forget.
    pub fn save(&self, settings: &SettingsHandle) {
        match serde_json::to_string(self) {
            Ok(raw) => settings.raw_set(SETLISTS_KEY, &raw),
            Err(e) => warn!(error = %e, "failed to serialize setlists"),
        }
    }

    /// Create a setlist with the given name. Blank names are rejected.
    pub fn create(&mut self, name: &str) -> Option<&Setlist> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.setlists.push(Setlist::new(name));
        self.setlists.last()
    }

    /// Remove the setlist with the given id.
    pub fn remove(&mut self, id: &str) {
        self.setlists.retain(|s| s.id != id);
    }

    pub fn get(&self, id: &str) -> Option<&Setlist> {
        self.setlists.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Setlist> {
        self.setlists.iter_mut().find(|s| s.id == id)
    }

    /// Append the named songs to a setlist, skipping names already
    /// present. Returns the number actually added.
    pub fn add_songs(&mut self, id: &str, names: &[String]) -> usize {
        let Some(setlist) = self.get_mut(id) else {
            return 0;
        };
        let mut added = 0;
        for name in names {
            if !setlist.songs.iter().any(|s| &s.name == name) {
                setlist.songs.push(Song::new(name.clone()));
                added += 1;
            }
        }
        added
    }

    /// Remove the song at `index` from a setlist.
    pub fn remove_song(&mut self, id: &str, index: usize) {
        if let Some(setlist) = self.get_mut(id) {
            if index < setlist.songs.len() {
                setlist.songs.remove(index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.setlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setlists.is_empty()
    }
}
