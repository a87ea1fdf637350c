// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Atril: a terminal lyrics manager and setlist prompter.
//!
//! Lyrics are fetched from lrclib.net, stored as plain `.txt` files,
//! organized into ordered setlists, and presented in a performance
//! viewer with auto-scroll, adjustable text size, and fullscreen.

pub mod app;
pub mod search;
pub mod setlist;
pub mod store;
pub mod ui;
pub mod viewer;
