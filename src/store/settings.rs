// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persisted scalar settings.
//!
//! A `SettingsStore` is a string-to-string map with durable backing.
//! `SettingsHandle` layers the viewer's two shared settings on top:
//! font size and auto-scroll speed, clamped and written back on every
//! change. Writes are fire-and-forget; a failed write is logged and
//! otherwise swallowed.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Font size bounds (inclusive), adjusted in steps of 2.
pub const FONT_SIZE_MIN: u16 = 12;
pub const FONT_SIZE_MAX: u16 = 40;
pub const FONT_SIZE_DEFAULT: u16 = 16;
pub const FONT_SIZE_STEP: i16 = 2;

/// Scroll speed bounds (inclusive), adjusted in steps of 0.1.
pub const SCROLL_SPEED_MIN: f64 = 0.1;
pub const SCROLL_SPEED_MAX: f64 = 5.0;
pub const SCROLL_SPEED_DEFAULT: f64 = 1.0;
pub const SCROLL_SPEED_STEP: f64 = 0.1;

const FONT_SIZE_KEY: &str = "font_size";
const SCROLL_SPEED_KEY: &str = "scroll_speed";

/// Durable key-value storage for scalar settings.
pub trait SettingsStore: Send + Sync {
    /// Fetch a value, `None` when the key was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// JSON-file backed settings store: a single object of string values.
pub struct FileSettingsStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettingsStore {
    /// Open the store at `path`, loading existing values if present.
    /// A missing or unparseable file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(&self.path, raw)
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "settings lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }
}

/// In-memory settings store, used in tests and as a fallback.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Shared viewer settings, loaded once at startup and written through to
/// the store on every change.
pub struct SettingsHandle {
    font_size: u16,
    scroll_speed: f64,
    store: Box<dyn SettingsStore>,
}

impl SettingsHandle {
    /// Load settings from the store, falling back to defaults for absent
    /// or malformed values.
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|v| v.parse::<u16>().ok())
            .map(|v| v.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))
            .unwrap_or(FONT_SIZE_DEFAULT);
        let scroll_speed = store
            .get(SCROLL_SPEED_KEY)
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v.clamp(SCROLL_SPEED_MIN, SCROLL_SPEED_MAX))
            .unwrap_or(SCROLL_SPEED_DEFAULT);
        Self {
            font_size,
            scroll_speed,
            store,
        }
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn scroll_speed(&self) -> f64 {
        self.scroll_speed
    }

    /// Adjust font size by `delta`, clamped to [12, 40], and persist.
    pub fn adjust_font_size(&mut self, delta: i16) -> u16 {
        let next = (self.font_size as i16 + delta).clamp(FONT_SIZE_MIN as i16, FONT_SIZE_MAX as i16);
        self.font_size = next as u16;
        self.persist(FONT_SIZE_KEY, &self.font_size.to_string());
        self.font_size
    }

    /// Adjust scroll speed by `delta`, rounded to one decimal and clamped
    /// to [0.1, 5.0], and persist.
    pub fn adjust_scroll_speed(&mut self, delta: f64) -> f64 {
        let next = ((self.scroll_speed + delta) * 10.0).round() / 10.0;
        self.scroll_speed = next.clamp(SCROLL_SPEED_MIN, SCROLL_SPEED_MAX);
        self.persist(SCROLL_SPEED_KEY, &format!("{:.1}", self.scroll_speed));
        self.scroll_speed
    }

    /// Read an arbitrary key from the underlying store.
    pub fn raw_get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Write an arbitrary key, fire-and-forget.
    pub fn raw_set(&self, key: &str, value: &str) {
        self.persist(key, value);
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "failed to persist setting");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn handle() -> SettingsHandle {
        SettingsHandle::load(Box::new(MemorySettingsStore::new()))
    }

    #[test]
    fn test_defaults() {
        let settings = handle();
        assert_eq!(settings.font_size(), 16);
        assert!((settings.scroll_speed() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_font_size_clamps_high() {
        let mut settings = handle();
        // 16 + 20 * 2 = 56 unclamped; must stop at 40.
        for _ in 0..20 {
            settings.adjust_font_size(FONT_SIZE_STEP);
        }
        assert_eq!(settings.font_size(), 40);
    }

    #[test]
    fn test_font_size_clamps_low_and_is_idempotent_at_bound() {
        let mut settings = handle();
        for _ in 0..50 {
            settings.adjust_font_size(-FONT_SIZE_STEP);
        }
        assert_eq!(settings.font_size(), 12);
        settings.adjust_font_size(-FONT_SIZE_STEP);
        assert_eq!(settings.font_size(), 12);
    }

    #[test]
    fn test_speed_stays_in_range_and_on_tenths() {
        let mut settings = handle();
        for _ in 0..100 {
            settings.adjust_scroll_speed(SCROLL_SPEED_STEP);
        }
        assert!((settings.scroll_speed() - 5.0).abs() < 1e-9);

        for _ in 0..100 {
            settings.adjust_scroll_speed(-SCROLL_SPEED_STEP);
        }
        assert!((settings.scroll_speed() - 0.1).abs() < 1e-9);

        // Every intermediate value is a multiple of 0.1.
        let mut settings = handle();
        for _ in 0..13 {
            let v = settings.adjust_scroll_speed(SCROLL_SPEED_STEP);
            let tenths = v * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9, "not a tenth: {}", v);
        }
    }

    #[test]
    fn test_values_persist_through_store() {
        let store = Box::new(MemorySettingsStore::new());
        store.set("font_size", "24").unwrap();
        store.set("scroll_speed", "2.5").unwrap();
        let settings = SettingsHandle::load(store);
        assert_eq!(settings.font_size(), 24);
        assert!((settings.scroll_speed() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_values_fall_back_to_defaults() {
        let store = Box::new(MemorySettingsStore::new());
        store.set("font_size", "huge").unwrap();
        store.set("scroll_speed", "").unwrap();
        let settings = SettingsHandle::load(store);
        assert_eq!(settings.font_size(), FONT_SIZE_DEFAULT);
        assert!((settings.scroll_speed() - SCROLL_SPEED_DEFAULT).abs() < 1e-9);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileSettingsStore::open(&path);
        store.set("font_size", "20").unwrap();
        drop(store);

        let reopened = FileSettingsStore::open(&path);
        assert_eq!(reopened.get("font_size").as_deref(), Some("20"));
        assert_eq!(reopened.get("missing"), None);
    }
}
