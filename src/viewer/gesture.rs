// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Swipe recognition over terminal mouse events.
//!
//! Terminal cells are coarser than touch points, so cell deltas are
//! scaled to the viewer's logical units before thresholding: a ~5-column
//! horizontal drag reaches the 50-unit swipe threshold.

use crossterm::event::{MouseEvent, MouseEventKind};

/// Logical units per terminal column.
pub const UNITS_PER_COLUMN: f32 = 10.0;
/// Logical units per terminal row. Rows are roughly twice as tall as
/// columns are wide, so vertical travel weighs double.
pub const UNITS_PER_ROW: f32 = 20.0;

/// A finished drag, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub dx: f32,
    pub dy: f32,
}

/// Tracks an in-progress left-button drag and reports the completed
/// swipe on release.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    origin: Option<(u16, u16)>,
    last: Option<(u16, u16)>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a mouse event. Returns the completed swipe when the button
    /// is released after a drag.
    pub fn on_mouse(&mut self, event: &MouseEvent) -> Option<Swipe> {
        match event.kind {
            MouseEventKind::Down(_) => {
                self.origin = Some((event.column, event.row));
                self.last = self.origin;
                None
            }
            MouseEventKind::Drag(_) => {
                if self.origin.is_some() {
                    self.last = Some((event.column, event.row));
                }
                None
            }
            MouseEventKind::Up(_) => {
                let origin = self.origin.take()?;
                let end = self.last.take().unwrap_or(origin);
                Some(Swipe {
                    dx: (end.0 as f32 - origin.0 as f32) * UNITS_PER_COLUMN,
                    dy: (end.1 as f32 - origin.1 as f32) * UNITS_PER_ROW,
                })
            }
            _ => None,
        }
    }
}
