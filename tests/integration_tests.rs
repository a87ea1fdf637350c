// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for Atril
//!
//! These tests verify that multiple components work together correctly.

use atril::setlist::{SetlistBook, Song};
use atril::store::settings::{
    FONT_SIZE_MAX, FONT_SIZE_STEP, SCROLL_SPEED_MAX, SCROLL_SPEED_STEP,
};
use atril::store::{
    song_key, FsTextStore, MemorySettingsStore, SettingsHandle, StoreError, TextStore,
};
use atril::viewer::{HostCommand, LyricsViewer, NavDirection, PLACEHOLDER_TEXT};

fn songs(names: &[&str]) -> Vec<Song> {
    names.iter().map(|n| Song::new(*n)).collect()
}

fn load_requested(cmds: &[HostCommand]) -> Option<(u64, String)> {
    cmds.iter().find_map(|cmd| match cmd {
        HostCommand::Load { seq, name } => Some((*seq, name.clone())),
        _ => None,
    })
}

/// Walk a three-song setlist with swipes, answering each load request
/// from a real on-disk store.
#[test]
fn test_setlist_playback_through_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsTextStore::open(dir.path()).expect("store");
    for (name, text) in [("A", "alpha"), ("B", "bravo"), ("C", "charlie")] {
        store.write(&song_key(name), text).expect("write");
    }

    let mut viewer = LyricsViewer::sequence(songs(&["A", "B", "C"]), 0);
    let cmds = viewer.start();
    let (seq, name) = load_requested(&cmds).expect("initial load");
    viewer.on_load_complete(seq, store.read(&song_key(&name)));
    assert_eq!(viewer.text(), "alpha");

    // Swipe left twice: A -> B -> C.
    for expected in ["bravo", "charlie"] {
        let cmds = viewer.on_swipe(-80.0, 0.0);
        let (seq, name) = load_requested(&cmds).expect("load on swipe");
        viewer.on_load_complete(seq, store.read(&song_key(&name)));
        assert_eq!(viewer.text(), expected);
    }

    // Swiping past the end stays at the last song.
    assert!(viewer.on_swipe(-80.0, 0.0).is_empty());
    assert_eq!(viewer.position(), Some((2, 3)));

    // Swipe right back to the middle.
    let cmds = viewer.on_swipe(80.0, 0.0);
    let (seq, name) = load_requested(&cmds).expect("load on swipe back");
    viewer.on_load_complete(seq, store.read(&song_key(&name)));
    assert_eq!(viewer.text(), "bravo");
}

/// A missing file shows the placeholder instead of an error.
#[test]
fn test_missing_song_shows_placeholder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsTextStore::open(dir.path()).expect("store");

    let mut viewer = LyricsViewer::sequence(songs(&["Gone"]), 0);
    let cmds = viewer.start();
    let (seq, name) = load_requested(&cmds).expect("initial load");
    let result = store.read(&song_key(&name));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    viewer.on_load_complete(seq, result);
    assert_eq!(viewer.text(), PLACEHOLDER_TEXT);
}

/// A load that finishes after navigation has moved on is discarded.
#[test]
fn test_stale_load_is_discarded() {
    let mut viewer = LyricsViewer::sequence(songs(&["A", "B"]), 0);
    let cmds = viewer.start();
    let (stale_seq, _) = load_requested(&cmds).expect("initial load");

    // Navigate before the first load completes.
    let cmds = viewer.navigate(NavDirection::Next);
    let (fresh_seq, _) = load_requested(&cmds).expect("load for B");
    assert_ne!(stale_seq, fresh_seq);

    // The stale completion must not overwrite anything.
    viewer.on_load_complete(stale_seq, Ok("stale text".to_string()));
    assert!(viewer.is_loading());

    viewer.on_load_complete(fresh_seq, Ok("fresh text".to_string()));
    assert_eq!(viewer.text(), "fresh text");
}

/// Repeated adjustments stop at the maxima instead of overshooting.
#[test]
fn test_settings_adjustments_clamp() {
    let store = MemorySettingsStore::new();
    let mut settings = SettingsHandle::load(Box::new(store));

    for _ in 0..20 {
        settings.adjust_font_size(FONT_SIZE_STEP);
    }
    assert_eq!(settings.font_size(), FONT_SIZE_MAX);

    for _ in 0..60 {
        settings.adjust_scroll_speed(SCROLL_SPEED_STEP);
    }
    assert_eq!(settings.scroll_speed(), SCROLL_SPEED_MAX);
}

/// Setlists round-trip through the settings store as JSON.
#[test]
fn test_setlist_book_round_trip() {
    let settings = SettingsHandle::load(Box::new(MemorySettingsStore::new()));

    let mut book = SetlistBook::default();
    book.create("Friday Night");
    let id = book.setlists[0].id.clone();
    book.add_songs(&id, &["Opener".to_string(), "Closer".to_string()]);
    book.save(&settings);

    let reloaded = SetlistBook::load(&settings);
    assert_eq!(reloaded, book);
    let setlist = reloaded.get(&id).expect("setlist");
    assert_eq!(setlist.songs.len(), 2);
    assert_eq!(setlist.songs[0].name, "Opener");
}
