// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application shell: event loop, screen navigation, and the glue
//! between the viewer state machine and the terminal.
//!
//! All state changes flow through a single event channel. Input from a
//! blocking reader thread, auto-scroll ticks, and completed background
//! tasks (searches, file reads, downloads) all arrive as [`AppEvent`]s
//! and are applied in arrival order, so no screen state needs a lock.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::search::{self, SearchError, SearchHit};
use crate::setlist::SetlistBook;
use crate::store::settings::{FONT_SIZE_STEP, SCROLL_SPEED_STEP};
use crate::store::{self, FileSettingsStore, FsTextStore, SettingsHandle, StoreError, TextStore};
use crate::ui::{StatusLine, Tab, Tui};
use crate::viewer::{
    BackAction, HostCommand, LyricsViewer, NavDirection, SwipeTracker, Ticker, PLACEHOLDER_TEXT,
    TICK_INTERVAL,
};

/// What the content area is currently showing. Tab roots are implied
/// by [`App::tab`]; pushed screens live on the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Search,
    Setlists,
    Songs,
    SetlistSongs { setlist_id: String, selected: usize },
    Viewer,
}

/// A dialog drawn over the current screen, capturing all input.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    NewSetlist {
        input: String,
    },
    SongPicker {
        setlist_id: String,
        options: Vec<String>,
        checked: Vec<bool>,
        cursor: usize,
    },
    Confirm {
        prompt: String,
        action: ConfirmAction,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteSetlist(String),
    DeleteSong(String),
}

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    /// Periodic wakeup so expired status messages clear while idle.
    Heartbeat,
    ScrollTick,
    SearchDone {
        seq: u64,
        result: Result<Vec<SearchHit>, SearchError>,
    },
    /// A lyric read requested by the viewer finished. `gen` identifies
    /// the viewer instance that asked for it.
    LyricLoaded {
        gen: u64,
        seq: u64,
        result: Result<String, StoreError>,
    },
    /// A song opened directly from the songs tab finished loading.
    SongOpened {
        name: String,
        result: Result<String, StoreError>,
    },
    DownloadDone {
        name: String,
        ok: bool,
    },
}

/// Search tab state.
#[derive(Debug, Default)]
pub struct SearchPanel {
    pub input: String,
    pub editing: bool,
    pub hits: Vec<SearchHit>,
    pub selected: usize,
    pub searching: bool,
    seq: u64,
}

/// The viewer plus the host-side pieces it cannot own: the gesture
/// tracker and the applied scroll position.
pub struct ViewerScreen {
    pub viewer: LyricsViewer,
    pub swipe: SwipeTracker,
    pub view_top: f32,
}

impl ViewerScreen {
    fn new(viewer: LyricsViewer) -> Self {
        Self {
            viewer,
            swipe: SwipeTracker::new(),
            view_top: 0.0,
        }
    }
}

pub struct App {
    pub tab: Tab,
    pub search: SearchPanel,
    pub song_names: Vec<String>,
    pub songs_selected: usize,
    pub setlists_selected: usize,
    pub book: SetlistBook,
    pub modal: Modal,
    pub viewer: Option<ViewerScreen>,
    pub settings: SettingsHandle,
    pub status: StatusLine,
    pub show_help: bool,
    pub tab_bar_visible: bool,
    pub chrome_visible: bool,
    pub back_gesture_enabled: bool,
    stack: Vec<Screen>,
    /// Bumped every time a viewer opens, so a load started by a closed
    /// viewer can never be mistaken for one the current viewer asked for
    /// (their per-instance sequence counters both start at zero).
    viewer_gen: u64,
    text_store: Arc<FsTextStore>,
    http: reqwest::Client,
    tx: UnboundedSender<AppEvent>,
    ticker: Option<Ticker>,
    running: bool,
}

const ROOT_SEARCH: Screen = Screen::Search;
const ROOT_SETLISTS: Screen = Screen::Setlists;
const ROOT_SONGS: Screen = Screen::Songs;

impl App {
    pub fn new(data_dir: &Path, tx: UnboundedSender<AppEvent>) -> Result<Self> {
        let text_store = Arc::new(FsTextStore::open(data_dir.join("songs"))?);
        let settings =
            SettingsHandle::load(Box::new(FileSettingsStore::open(data_dir.join("settings.json"))));
        let book = SetlistBook::load(&settings);

        let mut app = Self {
            tab: Tab::Search,
            search: SearchPanel::default(),
            song_names: Vec::new(),
            songs_selected: 0,
            setlists_selected: 0,
            book,
            modal: Modal::None,
            viewer: None,
            settings,
            status: StatusLine::default(),
            show_help: false,
            tab_bar_visible: true,
            chrome_visible: true,
            back_gesture_enabled: true,
            stack: Vec::new(),
            viewer_gen: 0,
            text_store,
            http: reqwest::Client::new(),
            tx,
            ticker: None,
            running: true,
        };
        app.refresh_songs();
        info!(songs = app.song_names.len(), setlists = app.book.len(), "loaded library");
        Ok(app)
    }

    pub fn current_screen(&self) -> &Screen {
        if let Some(screen) = self.stack.last() {
            return screen;
        }
        match self.tab {
            Tab::Search => &ROOT_SEARCH,
            Tab::Setlists => &ROOT_SETLISTS,
            Tab::Songs => &ROOT_SONGS,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
            }
            AppEvent::Input(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppEvent::Input(_) | AppEvent::Heartbeat => {}
            AppEvent::ScrollTick => {
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => screen.viewer.on_tick(&self.settings),
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
            AppEvent::SearchDone { seq, result } => self.on_search_done(seq, result),
            AppEvent::LyricLoaded { gen, seq, result } => {
                if gen != self.viewer_gen {
                    debug!(gen, seq, "dropping load for a closed viewer");
                    return;
                }
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => screen.viewer.on_load_complete(seq, result),
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
            AppEvent::SongOpened { name, result } => {
                let text = match result {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(%name, %err, "failed to open song");
                        PLACEHOLDER_TEXT.to_string()
                    }
                };
                self.open_single(name, text);
            }
            AppEvent::DownloadDone { name, ok } => {
                if ok {
                    self.refresh_songs();
                    self.status.set(format!("Saved \"{}\"", name));
                } else {
                    self.status.set(format!("Failed to save \"{}\"", name));
                }
            }
        }
    }

    /// Keep the auto-scroll ticker alive exactly while the viewer is
    /// scrolling. Dropping the guard aborts the tick task.
    pub fn reconcile_ticker(&mut self) {
        let want = self
            .viewer
            .as_ref()
            .map(|s| s.viewer.is_scrolling())
            .unwrap_or(false);
        if want && self.ticker.is_none() {
            let tx = self.tx.clone();
            self.ticker = Some(Ticker::spawn(TICK_INTERVAL, move || {
                let _ = tx.send(AppEvent::ScrollTick);
            }));
        } else if !want && self.ticker.is_some() {
            self.ticker = None;
        }
    }

    // ------------------------------------------------------------------
    // Input routing
    // ------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        if self.show_help {
            match key.code {
                KeyCode::Char('q') => self.running = false,
                _ => self.show_help = false,
            }
            return;
        }

        if self.modal != Modal::None {
            self.handle_modal_key(key.code);
            return;
        }

        if self.viewer.is_some() {
            self.handle_viewer_key(key.code);
            return;
        }

        let editing = self.search.editing && self.tab == Tab::Search && self.stack.is_empty();
        if !editing {
            match key.code {
                KeyCode::Char('q') => {
                    self.running = false;
                    return;
                }
                KeyCode::Char('h') | KeyCode::Char('?') => {
                    self.show_help = true;
                    return;
                }
                KeyCode::Char('1') if self.stack.is_empty() => {
                    self.tab = Tab::Search;
                    return;
                }
                KeyCode::Char('2') if self.stack.is_empty() => {
                    self.tab = Tab::Setlists;
                    return;
                }
                KeyCode::Char('3') if self.stack.is_empty() => {
                    self.tab = Tab::Songs;
                    return;
                }
                _ => {}
            }
        }

        match self.current_screen().clone() {
            Screen::Search => self.handle_search_key(key.code),
            Screen::Setlists => self.handle_setlists_key(key.code),
            Screen::Songs => self.handle_songs_key(key.code),
            Screen::SetlistSongs {
                setlist_id,
                selected,
            } => self.handle_setlist_songs_key(key.code, setlist_id, selected),
            Screen::Viewer => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.viewer.is_none() {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_viewer_by(-1.0),
            MouseEventKind::ScrollDown => self.scroll_viewer_by(1.0),
            _ => {
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => match screen.swipe.on_mouse(&mouse) {
                        Some(swipe) => screen.viewer.on_swipe(swipe.dx, swipe.dy),
                        None => Vec::new(),
                    },
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        if self.search.editing {
            match code {
                KeyCode::Esc => self.search.editing = false,
                KeyCode::Enter => {
                    self.search.editing = false;
                    self.start_search();
                }
                KeyCode::Backspace => {
                    self.search.input.pop();
                }
                KeyCode::Char(c) => self.search.input.push(c),
                _ => {}
            }
            return;
        }
        match code {
            KeyCode::Char('e') | KeyCode::Char('/') => self.search.editing = true,
            KeyCode::Up => {
                self.search.selected = move_selection(self.search.selected, -1, self.search.hits.len());
            }
            KeyCode::Down => {
                self.search.selected = move_selection(self.search.selected, 1, self.search.hits.len());
            }
            KeyCode::Enter => {
                if let Some(hit) = self.search.hits.get(self.search.selected) {
                    let title = hit.display_name();
                    let text = hit.lyrics_or_placeholder().to_string();
                    self.open_single(title, text);
                }
            }
            KeyCode::Char('d') => self.start_download(),
            _ => {}
        }
    }

    fn handle_setlists_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.setlists_selected = move_selection(self.setlists_selected, -1, self.book.len());
            }
            KeyCode::Down => {
                self.setlists_selected = move_selection(self.setlists_selected, 1, self.book.len());
            }
            KeyCode::Char('n') => {
                self.modal = Modal::NewSetlist {
                    input: String::new(),
                };
            }
            KeyCode::Char('x') => {
                if let Some(setlist) = self.book.setlists.get(self.setlists_selected) {
                    self.modal = Modal::Confirm {
                        prompt: format!("Delete setlist \"{}\"?", setlist.name),
                        action: ConfirmAction::DeleteSetlist(setlist.id.clone()),
                    };
                }
            }
            KeyCode::Enter => {
                if let Some(setlist) = self.book.setlists.get(self.setlists_selected) {
                    self.stack.push(Screen::SetlistSongs {
                        setlist_id: setlist.id.clone(),
                        selected: 0,
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_songs_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.songs_selected = move_selection(self.songs_selected, -1, self.song_names.len());
            }
            KeyCode::Down => {
                self.songs_selected = move_selection(self.songs_selected, 1, self.song_names.len());
            }
            KeyCode::Enter => {
                if let Some(name) = self.song_names.get(self.songs_selected) {
                    self.spawn_song_open(name.clone());
                }
            }
            KeyCode::Char('x') => {
                if let Some(name) = self.song_names.get(self.songs_selected) {
                    self.modal = Modal::Confirm {
                        prompt: format!("Delete \"{}\"?", name),
                        action: ConfirmAction::DeleteSong(name.clone()),
                    };
                }
            }
            _ => {}
        }
    }

    fn handle_setlist_songs_key(&mut self, code: KeyCode, setlist_id: String, selected: usize) {
        let song_count = self
            .book
            .get(&setlist_id)
            .map(|s| s.songs.len())
            .unwrap_or(0);
        match code {
            KeyCode::Esc => {
                self.stack.pop();
            }
            KeyCode::Up => self.set_setlist_cursor(move_selection(selected, -1, song_count)),
            KeyCode::Down => self.set_setlist_cursor(move_selection(selected, 1, song_count)),
            KeyCode::Char('a') => {
                let present: Vec<String> = self
                    .book
                    .get(&setlist_id)
                    .map(|s| s.songs.iter().map(|song| song.name.clone()).collect())
                    .unwrap_or_default();
                let options: Vec<String> = self
                    .song_names
                    .iter()
                    .filter(|name| !present.contains(name))
                    .cloned()
                    .collect();
                let checked = vec![false; options.len()];
                self.modal = Modal::SongPicker {
                    setlist_id,
                    options,
                    checked,
                    cursor: 0,
                };
            }
            KeyCode::Char('x') => {
                if song_count > 0 {
                    self.book.remove_song(&setlist_id, selected);
                    self.book.save(&self.settings);
                    let remaining = song_count - 1;
                    self.set_setlist_cursor(move_selection(selected, 0, remaining));
                }
            }
            KeyCode::Enter => {
                if let Some(setlist) = self.book.get(&setlist_id) {
                    if !setlist.songs.is_empty() {
                        self.open_sequence(setlist.songs.clone(), selected);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_viewer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') => {
                if let Some(screen) = self.viewer.as_mut() {
                    screen.viewer.toggle_scrolling();
                }
            }
            KeyCode::Char(',') => {
                if let Some(screen) = self.viewer.as_mut() {
                    screen.viewer.adjust_speed(&mut self.settings, -SCROLL_SPEED_STEP);
                }
            }
            KeyCode::Char('.') => {
                if let Some(screen) = self.viewer.as_mut() {
                    screen.viewer.adjust_speed(&mut self.settings, SCROLL_SPEED_STEP);
                }
            }
            KeyCode::Char('-') => {
                if let Some(screen) = self.viewer.as_mut() {
                    screen.viewer.adjust_font_size(&mut self.settings, -FONT_SIZE_STEP);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if let Some(screen) = self.viewer.as_mut() {
                    screen.viewer.adjust_font_size(&mut self.settings, FONT_SIZE_STEP);
                }
            }
            KeyCode::Left => {
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => screen.viewer.navigate(NavDirection::Previous),
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
            KeyCode::Right => {
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => screen.viewer.navigate(NavDirection::Next),
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
            KeyCode::Char('f') => {
                let cmds = match self.viewer.as_mut() {
                    Some(screen) => screen.viewer.toggle_fullscreen(),
                    None => Vec::new(),
                };
                self.apply_commands(cmds);
            }
            KeyCode::Up => self.scroll_viewer_by(-1.0),
            KeyCode::Down => self.scroll_viewer_by(1.0),
            KeyCode::Esc => self.viewer_back(),
            KeyCode::Backspace => {
                if self.back_gesture_enabled {
                    self.viewer_back();
                }
            }
            KeyCode::Char('q') => self.running = false,
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, code: KeyCode) {
        match &mut self.modal {
            Modal::None => {}
            Modal::NewSetlist { input } => match code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Enter => {
                    let name = input.clone();
                    self.modal = Modal::None;
                    if self.book.create(&name).is_some() {
                        self.book.save(&self.settings);
                        self.status.set(format!("Created \"{}\"", name.trim()));
                    } else {
                        self.status.set("Setlist name cannot be empty");
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            },
            Modal::SongPicker {
                setlist_id,
                options,
                checked,
                cursor,
            } => match code {
                KeyCode::Esc => self.modal = Modal::None,
                KeyCode::Up => *cursor = move_selection(*cursor, -1, options.len()),
                KeyCode::Down => *cursor = move_selection(*cursor, 1, options.len()),
                KeyCode::Char(' ') => {
                    if let Some(flag) = checked.get_mut(*cursor) {
                        *flag = !*flag;
                    }
                }
                KeyCode::Enter => {
                    let id = setlist_id.clone();
                    let picked: Vec<String> = options
                        .iter()
                        .zip(checked.iter())
                        .filter(|(_, on)| **on)
                        .map(|(name, _)| name.clone())
                        .collect();
                    self.modal = Modal::None;
                    let added = self.book.add_songs(&id, &picked);
                    if added > 0 {
                        self.book.save(&self.settings);
                    }
                    self.status.set(format!("Added {} song(s)", added));
                }
                _ => {}
            },
            Modal::Confirm { action, .. } => match code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let action = action.clone();
                    self.modal = Modal::None;
                    self.run_confirm(action);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.modal = Modal::None,
                _ => {}
            },
        }
    }

    fn run_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteSetlist(id) => {
                self.book.remove(&id);
                self.book.save(&self.settings);
                self.setlists_selected = move_selection(self.setlists_selected, 0, self.book.len());
                self.status.set("Setlist deleted");
            }
            ConfirmAction::DeleteSong(name) => {
                let key = store::song_key(&name);
                match self.text_store.delete(&key) {
                    Ok(()) => {
                        self.refresh_songs();
                        self.status.set(format!("Deleted \"{}\"", name));
                    }
                    Err(err) => {
                        error!(%name, %err, "delete failed");
                        self.status.set(format!("Failed to delete \"{}\"", name));
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Viewer hosting
    // ------------------------------------------------------------------

    fn open_single(&mut self, title: String, text: String) {
        let mut viewer = LyricsViewer::with_text(title, text);
        let cmds = viewer.start();
        self.viewer_gen += 1;
        self.viewer = Some(ViewerScreen::new(viewer));
        if self.stack.last() != Some(&Screen::Viewer) {
            self.stack.push(Screen::Viewer);
        }
        self.apply_commands(cmds);
    }

    fn open_sequence(&mut self, songs: Vec<crate::setlist::Song>, start: usize) {
        let mut viewer = LyricsViewer::sequence(songs, start);
        let cmds = viewer.start();
        self.viewer_gen += 1;
        self.viewer = Some(ViewerScreen::new(viewer));
        self.stack.push(Screen::Viewer);
        self.apply_commands(cmds);
    }

    /// Hardware-back equivalent. The viewer consumes it mid-sequence;
    /// otherwise the screen closes.
    fn viewer_back(&mut self) {
        let action = match self.viewer.as_mut() {
            Some(screen) => screen.viewer.on_back(),
            None => BackAction::PassThrough,
        };
        match action {
            BackAction::Consumed(cmds) => self.apply_commands(cmds),
            BackAction::PassThrough => self.close_viewer(),
        }
    }

    fn close_viewer(&mut self) {
        self.viewer = None;
        self.ticker = None;
        // Chrome may have been hidden by fullscreen; restore it.
        self.tab_bar_visible = true;
        self.chrome_visible = true;
        self.back_gesture_enabled = true;
        if self.stack.last() == Some(&Screen::Viewer) {
            self.stack.pop();
        }
    }

    fn scroll_viewer_by(&mut self, lines: f32) {
        let line_height = self.settings.font_size() as f32 * 1.5;
        if let Some(screen) = self.viewer.as_mut() {
            screen.view_top = (screen.view_top + lines * line_height).max(0.0);
            let offset = screen.view_top;
            screen.viewer.on_user_scroll(offset);
        }
    }

    fn apply_commands(&mut self, cmds: Vec<HostCommand>) {
        for cmd in cmds {
            match cmd {
                HostCommand::Load { seq, name } => self.spawn_lyric_load(seq, name),
                HostCommand::ScrollTo { offset, .. } => {
                    if let Some(screen) = self.viewer.as_mut() {
                        screen.view_top = offset;
                    }
                }
                HostCommand::SetOrientation(orientation) => {
                    // No terminal analog; recorded for the log only.
                    debug!(?orientation, "orientation request");
                }
                HostCommand::SetChromeVisible(visible) => self.chrome_visible = visible,
                HostCommand::SetTabBarVisible(visible) => self.tab_bar_visible = visible,
                HostCommand::SetBackGestureEnabled(enabled) => {
                    self.back_gesture_enabled = enabled;
                }
                HostCommand::GoBack => self.close_viewer(),
                HostCommand::Notice(message) => self.status.set(message),
            }
        }
    }

    // ------------------------------------------------------------------
    // Background tasks
    // ------------------------------------------------------------------

    fn start_search(&mut self) {
        let query = self.search.input.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.search.seq += 1;
        self.search.searching = true;
        self.search.hits.clear();
        self.search.selected = 0;

        let seq = self.search.seq;
        let client = self.http.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = search::search(&client, &query).await;
            let _ = tx.send(AppEvent::SearchDone { seq, result });
        });
    }

    fn on_search_done(&mut self, seq: u64, result: Result<Vec<SearchHit>, SearchError>) {
        if seq != self.search.seq {
            debug!(seq, "dropping stale search result");
            return;
        }
        self.search.searching = false;
        match result {
            Ok(hits) => {
                if hits.is_empty() {
                    self.status.set("No results");
                }
                self.search.hits = hits;
                self.search.selected = 0;
            }
            Err(err) => {
                warn!(%err, "search failed");
                self.status.set("Search failed");
            }
        }
    }

    fn start_download(&mut self) {
        let Some(hit) = self.search.hits.get(self.search.selected) else {
            return;
        };
        let name = hit.display_name();
        let key = hit.storage_key();
        let contents = hit.lyrics_or_placeholder().to_string();
        let store = Arc::clone(&self.text_store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let written = tokio::task::spawn_blocking(move || store.write(&key, &contents)).await;
            let ok = matches!(written, Ok(Ok(())));
            let _ = tx.send(AppEvent::DownloadDone { name, ok });
        });
    }

    fn spawn_song_open(&self, name: String) {
        let key = store::song_key(&name);
        let store = Arc::clone(&self.text_store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(move || store.read(&key)).await {
                Ok(result) => result,
                Err(err) => Err(StoreError::Io(io::Error::other(err.to_string()))),
            };
            let _ = tx.send(AppEvent::SongOpened { name, result });
        });
    }

    fn spawn_lyric_load(&self, seq: u64, name: String) {
        let gen = self.viewer_gen;
        let key = store::song_key(&name);
        let store = Arc::clone(&self.text_store);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(move || store.read(&key)).await {
                Ok(result) => result,
                Err(err) => Err(StoreError::Io(io::Error::other(err.to_string()))),
            };
            let _ = tx.send(AppEvent::LyricLoaded { gen, seq, result });
        });
    }

    fn refresh_songs(&mut self) {
        match self.text_store.list() {
            Ok(keys) => {
                self.song_names = keys
                    .iter()
                    .map(|key| store::display_name(key).to_string())
                    .collect();
            }
            Err(err) => {
                error!(%err, "listing songs failed");
                self.song_names.clear();
            }
        }
        self.songs_selected = move_selection(self.songs_selected, 0, self.song_names.len());
    }

    fn set_setlist_cursor(&mut self, value: usize) {
        if let Some(Screen::SetlistSongs { selected, .. }) = self.stack.last_mut() {
            *selected = value;
        }
    }
}

/// Move a list cursor by `delta`, clamped to `[0, len)`. With an empty
/// list the cursor stays at zero.
fn move_selection(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta;
    next.clamp(0, len as i64 - 1) as usize
}

/// Blocking terminal reader. Sends every event into the channel and a
/// heartbeat while idle; exits when the receiver is gone.
fn spawn_input_thread(tx: UnboundedSender<AppEvent>) {
    thread::spawn(move || loop {
        let message = match event::poll(Duration::from_millis(250)) {
            Ok(true) => match event::read() {
                Ok(ev) => AppEvent::Input(ev),
                Err(err) => {
                    error!(%err, "input read failed");
                    break;
                }
            },
            Ok(false) => AppEvent::Heartbeat,
            Err(err) => {
                error!(%err, "input poll failed");
                break;
            }
        };
        if tx.send(message).is_err() {
            break;
        }
    });
}

/// Run the full-screen application until quit.
pub async fn run(data_dir: PathBuf) -> Result<()> {
    let (tx, mut rx): (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) =
        mpsc::unbounded_channel();
    let mut app = App::new(&data_dir, tx.clone())?;
    spawn_input_thread(tx);

    let mut tui = Tui::new()?;
    while app.is_running() {
        tui.draw(&app)?;
        let Some(event) = rx.recv().await else {
            break;
        };
        app.handle_event(event);
        // Coalesce anything already queued before the next draw.
        while let Ok(event) = rx.try_recv() {
            if !app.is_running() {
                break;
            }
            app.handle_event(event);
        }
        app.status.clear_expired();
        app.reconcile_ticker();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_clamps() {
        assert_eq!(move_selection(0, -1, 5), 0);
        assert_eq!(move_selection(4, 1, 5), 4);
        assert_eq!(move_selection(2, 1, 5), 3);
        assert_eq!(move_selection(0, 1, 0), 0);
        assert_eq!(move_selection(9, 0, 3), 2);
    }

    fn test_app() -> (App, UnboundedReceiver<AppEvent>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(dir.path(), tx).expect("app");
        (app, rx, dir)
    }

    #[tokio::test]
    async fn test_tab_switching_at_root() {
        let (mut app, _rx, _dir) = test_app();
        assert_eq!(app.current_screen(), &Screen::Search);
        app.handle_key(KeyEvent::from(KeyCode::Char('2')));
        assert_eq!(app.current_screen(), &Screen::Setlists);
        app.handle_key(KeyEvent::from(KeyCode::Char('3')));
        assert_eq!(app.current_screen(), &Screen::Songs);
    }

    #[tokio::test]
    async fn test_new_setlist_modal_creates_and_saves() {
        let (mut app, _rx, _dir) = test_app();
        app.handle_key(KeyEvent::from(KeyCode::Char('2')));
        app.handle_key(KeyEvent::from(KeyCode::Char('n')));
        assert!(matches!(app.modal, Modal::NewSetlist { .. }));
        for c in "Friday Gig".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.book.len(), 1);
        assert_eq!(app.book.setlists[0].name, "Friday Gig");
    }

    #[tokio::test]
    async fn test_confirm_cancel_leaves_setlist() {
        let (mut app, _rx, _dir) = test_app();
        app.book.create("Keep Me");
        app.handle_key(KeyEvent::from(KeyCode::Char('2')));
        app.handle_key(KeyEvent::from(KeyCode::Char('x')));
        assert!(matches!(app.modal, Modal::Confirm { .. }));
        app.handle_key(KeyEvent::from(KeyCode::Char('n')));
        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.book.len(), 1);
    }

    #[tokio::test]
    async fn test_viewer_close_restores_chrome() {
        let (mut app, _rx, _dir) = test_app();
        app.open_single("A Song".to_string(), "la la".to_string());
        assert_eq!(app.current_screen(), &Screen::Viewer);

        // Fullscreen hides the chrome.
        app.handle_key(KeyEvent::from(KeyCode::Char('f')));
        assert!(!app.chrome_visible);
        assert!(!app.tab_bar_visible);

        // Closing the viewer restores everything.
        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert!(app.viewer.is_none());
        assert!(app.chrome_visible);
        assert!(app.tab_bar_visible);
        assert!(app.back_gesture_enabled);
        assert_ne!(app.current_screen(), &Screen::Viewer);
    }

    #[tokio::test]
    async fn test_scroll_tick_moves_view_top() {
        let (mut app, _rx, _dir) = test_app();
        app.open_single("A Song".to_string(), "line\nline\nline".to_string());
        if let Some(screen) = app.viewer.as_mut() {
            screen.viewer.toggle_scrolling();
        }
        app.handle_event(AppEvent::ScrollTick);
        let top = app.viewer.as_ref().map(|s| s.view_top).unwrap_or(0.0);
        assert!(top > 0.0);
    }

    #[tokio::test]
    async fn test_load_for_closed_viewer_dropped() {
        let (mut app, _rx, _dir) = test_app();

        // Open a sequence viewer; its first load is pending (seq 1).
        app.open_sequence(vec![crate::setlist::Song::new("Old")], 0);
        let old_gen = app.viewer_gen;
        app.close_viewer();

        // A new viewer also issues seq 1 for its own first load.
        app.open_sequence(vec![crate::setlist::Song::new("New")], 0);

        // The old viewer's completion must not reach the new one.
        app.handle_event(AppEvent::LyricLoaded {
            gen: old_gen,
            seq: 1,
            result: Ok("old text".to_string()),
        });
        let viewer = &app.viewer.as_ref().unwrap().viewer;
        assert!(viewer.is_loading());
        assert_eq!(viewer.text(), "");

        app.handle_event(AppEvent::LyricLoaded {
            gen: app.viewer_gen,
            seq: 1,
            result: Ok("new text".to_string()),
        });
        assert_eq!(app.viewer.as_ref().unwrap().viewer.text(), "new text");
    }

    #[tokio::test]
    async fn test_stale_search_result_dropped() {
        let (mut app, _rx, _dir) = test_app();
        app.search.seq = 5;
        app.search.searching = true;
        app.on_search_done(4, Ok(vec![]));
        assert!(app.search.searching);
        app.on_search_done(5, Ok(vec![]));
        assert!(!app.search.searching);
    }
}
