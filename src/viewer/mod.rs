// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The lyrics viewer state machine.
//!
//! `LyricsViewer` is a reducer: every user gesture, timer tick, or load
//! completion is applied as a method call, and each call returns the
//! `HostCommand`s the hosting shell must carry out (scrolling, loading a
//! song's text, navigation, chrome changes). The viewer itself never
//! touches the terminal or the filesystem, which keeps the whole state
//! machine testable without a UI.
//!
//! Two construction modes, mutually exclusive: single-song (lyric text
//! supplied directly, navigation inactive) and sequence mode (an ordered
//! song list with clamped previous/next navigation).

mod gesture;
mod ticker;

pub use gesture::SwipeTracker;
pub use ticker::Ticker;

use std::time::Duration;

use crate::setlist::Song;
use crate::store::{SettingsHandle, StoreError};

/// Text shown when a lyric file cannot be read. Load failures are
/// absorbed into display content, never surfaced as errors.
pub const PLACEHOLDER_TEXT: &str = "Lyrics unavailable.";

/// Cadence of the auto-scroll tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Scroll units advanced per tick per unit of speed.
pub const SCROLL_STEP_FACTOR: f64 = 1.5;

/// Minimum horizontal travel (logical units) for a swipe to register.
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Maximum vertical travel (logical units) a swipe may carry.
pub const SWIPE_VERTICAL_TOLERANCE: f32 = 50.0;

/// Notice shown when fullscreen blocks the swipe-exit at the first song.
pub const FULLSCREEN_BLOCK_NOTICE: &str = "Action blocked in fullscreen";

/// Navigation direction within a playback sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Next,
    Previous,
}

/// Requested device orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Load lifecycle. Failures still reach `Displaying`, showing the
/// placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Displaying,
}

/// Instructions for the hosting shell, emitted by reducer methods.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Read `"<name>.txt"` and deliver the result via
    /// [`LyricsViewer::on_load_complete`] with the same `seq`.
    Load { seq: u64, name: String },
    /// Scroll the lyric view to `offset`.
    ScrollTo { offset: f32, animate: bool },
    SetOrientation(Orientation),
    SetChromeVisible(bool),
    SetTabBarVisible(bool),
    SetBackGestureEnabled(bool),
    /// Leave the viewer via the host's back navigation.
    GoBack,
    /// Show an ephemeral notice.
    Notice(String),
}

/// Outcome of the hardware/system back action.
#[derive(Debug, Clone, PartialEq)]
pub enum BackAction {
    /// The viewer handled it; apply these commands.
    Consumed(Vec<HostCommand>),
    /// Not handled; the host performs its default back navigation.
    PassThrough,
}

#[derive(Debug, Clone)]
enum Mode {
    Single { title: String },
    Sequence { songs: Vec<Song>, index: usize },
}

/// The viewer reducer. See the module docs for the protocol.
#[derive(Debug)]
pub struct LyricsViewer {
    mode: Mode,
    load: LoadState,
    text: String,
    scroll_offset: f32,
    scrolling: bool,
    fullscreen: bool,
    /// Monotonic load request counter; completions carrying an older
    /// value are discarded so a late read can never overwrite the text
    /// of the now-current song.
    load_seq: u64,
}

impl LyricsViewer {
    /// Single-song mode: the lyric text is supplied directly and
    /// navigation is inactive.
    pub fn with_text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mode: Mode::Single {
                title: title.into(),
            },
            load: LoadState::Displaying,
            text: text.into(),
            scroll_offset: 0.0,
            scrolling: false,
            fullscreen: false,
            load_seq: 0,
        }
    }

    /// Sequence mode over an ordered song list. `start_index` is clamped
    /// into range. Call [`start`](Self::start) to kick off the first load.
    pub fn sequence(songs: Vec<Song>, start_index: usize) -> Self {
        let index = if songs.is_empty() {
            0
        } else {
            start_index.min(songs.len() - 1)
        };
        Self {
            mode: Mode::Sequence { songs, index },
            load: LoadState::Idle,
            text: String::new(),
            scroll_offset: 0.0,
            scrolling: false,
            fullscreen: false,
            load_seq: 0,
        }
    }

    /// Begin loading the current song (sequence mode). No-op for
    /// single-song mode or an empty sequence.
    pub fn start(&mut self) -> Vec<HostCommand> {
        match &self.mode {
            Mode::Sequence { songs, index } if !songs.is_empty() => {
                let name = songs[*index].name.clone();
                vec![self.begin_load(name)]
            }
            _ => Vec::new(),
        }
    }

    fn begin_load(&mut self, name: String) -> HostCommand {
        self.load_seq += 1;
        self.load = LoadState::Loading;
        HostCommand::Load {
            seq: self.load_seq,
            name,
        }
    }

    /// Apply a completed text read. Stale completions (an older `seq`)
    /// are dropped without touching state.
    pub fn on_load_complete(
        &mut self,
        seq: u64,
        result: Result<String, StoreError>,
    ) -> Vec<HostCommand> {
        if seq != self.load_seq {
            return Vec::new();
        }
        self.load = LoadState::Displaying;
        match result {
            Ok(text) => {
                self.text = text;
                self.scroll_offset = 0.0;
                vec![HostCommand::ScrollTo {
                    offset: 0.0,
                    animate: false,
                }]
            }
            Err(_) => {
                self.text = PLACEHOLDER_TEXT.to_string();
                Vec::new()
            }
        }
    }

    /// Step to the next or previous song, clamped. `Previous` at the
    /// first song exits the viewer, unless fullscreen blocks it.
    pub fn navigate(&mut self, direction: NavDirection) -> Vec<HostCommand> {
        let Mode::Sequence { songs, index } = &mut self.mode else {
            return Vec::new();
        };
        if songs.is_empty() {
            return Vec::new();
        }
        match direction {
            NavDirection::Next => {
                if *index + 1 >= songs.len() {
                    return Vec::new();
                }
                *index += 1;
            }
            NavDirection::Previous => {
                if *index == 0 {
                    if self.fullscreen {
                        return vec![HostCommand::Notice(FULLSCREEN_BLOCK_NOTICE.to_string())];
                    }
                    return vec![HostCommand::GoBack];
                }
                *index -= 1;
            }
        }
        let name = songs[*index].name.clone();
        vec![self.begin_load(name)]
    }

    /// Interpret a completed horizontal drag (logical units). Rightward
    /// drags go to the previous song, leftward to the next; drags below
    /// threshold or with too much vertical travel are ignored.
    pub fn on_swipe(&mut self, dx: f32, dy: f32) -> Vec<HostCommand> {
        if !self.is_sequence() {
            return Vec::new();
        }
        if dy.abs() >= SWIPE_VERTICAL_TOLERANCE {
            return Vec::new();
        }
        if dx <= -SWIPE_THRESHOLD {
            self.navigate(NavDirection::Next)
        } else if dx >= SWIPE_THRESHOLD {
            self.navigate(NavDirection::Previous)
        } else {
            Vec::new()
        }
    }

    /// Hardware/system back action. Consumed as `navigate(previous)`
    /// when not at the first song; otherwise passed through to the
    /// host's default back navigation.
    pub fn on_back(&mut self) -> BackAction {
        let mid_sequence = matches!(
            &self.mode,
            Mode::Sequence { songs, index } if !songs.is_empty() && *index > 0
        );
        if mid_sequence {
            BackAction::Consumed(self.navigate(NavDirection::Previous))
        } else {
            BackAction::PassThrough
        }
    }

    /// Flip auto-scroll. The host owns the tick task and must cancel it
    /// whenever this returns with `is_scrolling() == false`.
    pub fn toggle_scrolling(&mut self) {
        self.scrolling = !self.scrolling;
    }

    /// Advance auto-scroll by one tick. No-op while scrolling is off.
    pub fn on_tick(&mut self, settings: &SettingsHandle) -> Vec<HostCommand> {
        if !self.scrolling {
            return Vec::new();
        }
        self.scroll_offset += (settings.scroll_speed() * SCROLL_STEP_FACTOR) as f32;
        vec![HostCommand::ScrollTo {
            offset: self.scroll_offset,
            animate: false,
        }]
    }

    /// Track a manual scroll reported by the host, so auto-scroll
    /// resumes from the user's position instead of jumping.
    pub fn on_user_scroll(&mut self, offset: f32) {
        self.scroll_offset = offset.max(0.0);
    }

    /// Flip fullscreen; orientation, chrome, tab bar and back-gesture
    /// state follow in lockstep.
    pub fn toggle_fullscreen(&mut self) -> Vec<HostCommand> {
        self.fullscreen = !self.fullscreen;
        if self.fullscreen {
            vec![
                HostCommand::SetOrientation(Orientation::Landscape),
                HostCommand::SetChromeVisible(false),
                HostCommand::SetTabBarVisible(false),
                HostCommand::SetBackGestureEnabled(false),
            ]
        } else {
            vec![
                HostCommand::SetOrientation(Orientation::Portrait),
                HostCommand::SetChromeVisible(true),
                HostCommand::SetTabBarVisible(true),
                HostCommand::SetBackGestureEnabled(true),
            ]
        }
    }

    /// Adjust scroll speed by `delta` through the shared settings.
    pub fn adjust_speed(&mut self, settings: &mut SettingsHandle, delta: f64) {
        settings.adjust_scroll_speed(delta);
    }

    /// Adjust font size by `delta` through the shared settings.
    pub fn adjust_font_size(&mut self, settings: &mut SettingsHandle, delta: i16) {
        settings.adjust_font_size(delta);
    }

    pub fn title(&self) -> &str {
        match &self.mode {
            Mode::Single { title } => title,
            Mode::Sequence { songs, index } => songs
                .get(*index)
                .map(|s| s.name.as_str())
                .unwrap_or("No song"),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.mode, Mode::Sequence { .. })
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Current position as `(index, length)` in sequence mode.
    pub fn position(&self) -> Option<(usize, usize)> {
        match &self.mode {
            Mode::Sequence { songs, index } => Some((*index, songs.len())),
            Mode::Single { .. } => None,
        }
    }
}
