#![forbid(unsafe_code)]

use std::ops::Range;

use time::UtcOffset;
use unicode_width::UnicodeWidthChar;

use crate::app::Session;
use crate::fs_ops::{format_time, size_label, sort_label};
use crate::keymap::help_line;
use crate::model::{ActivePane, Entry, Pane};
use crate::vfs::FileSystem;

const MARKERS_WIDTH: usize = 4;
const SIZE_WIDTH: usize = 12;
const TIME_WIDTH: usize = 16;
pub const MIN_PANEL_WIDTH: usize = 40;
/// Title, help, blank line above the panels and blank line below them.
pub const CHROME_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Entry(usize),
    Blank,
}

/// Truncates or pads `text` to exactly `width` terminal columns. Control
/// characters print as `?`.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let ch = if ch.is_control() { '?' } else { ch };
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

fn column(text: &str, width: usize) -> String {
    let mut out = fit(text, width.saturating_sub(1));
    out.push(' ');
    out
}

pub fn render_row(
    pane: &Pane,
    row: RowKind,
    active: bool,
    width: usize,
    offset: UtcOffset,
) -> String {
    match row {
        RowKind::Header => {
            let marker = if active { ">>> " } else { "    " };
            let path = pane.snapshot.dir.display().to_string();
            format!("{marker}{}", fit(&path, width.saturating_sub(MARKERS_WIDTH)))
        }
        RowKind::Entry(idx) => match pane.snapshot.entries.get(idx) {
            Some(entry) => entry_row(pane, idx, entry, width, offset),
            None => fit("", width),
        },
        RowKind::Blank => fit("", width),
    }
}

fn entry_row(pane: &Pane, idx: usize, entry: &Entry, width: usize, offset: UtcOffset) -> String {
    let cursor = if idx == pane.cursor { " > " } else { "   " };
    let mark = if pane.selected.contains(&entry.path) { "*" } else { " " };
    let name = if entry.is_dir() {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };
    let name_width = width.saturating_sub(MARKERS_WIDTH + SIZE_WIDTH + TIME_WIDTH);
    format!(
        "{cursor}{mark}{}{}{}",
        column(&name, name_width),
        column(&size_label(entry), SIZE_WIDTH),
        fit(&format_time(entry.modified, offset), TIME_WIDTH),
    )
}

/// Entry indices to show so the cursor stays on screen.
pub fn visible_range(pane: &Pane, view_height: Option<usize>) -> Range<usize> {
    let len = pane.snapshot.len();
    let Some(height) = view_height else {
        return 0..len;
    };
    let start = if pane.cursor < height {
        0
    } else {
        pane.cursor + 1 - height
    };
    start..len.min(start + height)
}

pub fn panel_lines(
    pane: &Pane,
    active: bool,
    width: usize,
    offset: UtcOffset,
    view_height: Option<usize>,
) -> Vec<String> {
    std::iter::once(RowKind::Header)
        .chain(visible_range(pane, view_height).map(RowKind::Entry))
        .map(|row| render_row(pane, row, active, width, offset))
        .collect()
}

pub fn render_screen<F: FileSystem>(
    session: &Session<F>,
    view_height: Option<usize>,
) -> Vec<String> {
    let settings = session.settings();
    let width = settings.panel_width;
    let left_active = session.active() == ActivePane::Left;
    let left = panel_lines(session.left(), left_active, width, settings.offset, view_height);
    let right = panel_lines(session.right(), !left_active, width, settings.offset, view_height);

    let mut lines = vec![
        format!(
            "=== twinpanel === clipboard: {} item(s), sort: {}",
            session.clipboard().len(),
            sort_label(settings.sort_mode)
        ),
        help_line(),
    ];
    let blank = render_row(session.left(), RowKind::Blank, false, width, settings.offset);
    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).unwrap_or(&blank);
        let r = right.get(i).unwrap_or(&blank);
        lines.push(format!("{l} | {r}"));
    }
    lines.push(String::new());
    lines.extend(session.status().lines().map(str::to_string));
    lines
}
