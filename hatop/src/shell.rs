//! Embedded command line: line editor, input history, output scrollback.

use std::collections::VecDeque;

use tracing::info;

use crate::session::{SessionError, Transport};

/// Upper bound on retained scrollback lines.
pub const MAX_SCROLLBACK_LINES: usize = 1000;
pub const PROMPT: &str = "> ";

/// Single-line text buffer with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Submitted lines, oldest first. Browsing never edits the entries.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    // None = editing the live line
    cursor: Option<usize>,
}

impl History {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
        self.cursor = None;
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Step to an older entry.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Step to a newer entry; `None` once past the newest (live line).
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                self.entries.get(i + 1).map(String::as_str)
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }
}

/// A command echo plus the peer's response lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub command: String,
    pub lines: Vec<String>,
}

impl Block {
    fn line_count(&self) -> usize {
        1 + self.lines.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scrollback {
    blocks: VecDeque<Block>,
    lines: usize,
}

impl Scrollback {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn push(&mut self, block: Block) {
        self.lines += block.line_count();
        self.blocks.push_back(block);
        while self.lines > MAX_SCROLLBACK_LINES && self.blocks.len() > 1 {
            if let Some(old) = self.blocks.pop_front() {
                self.lines -= old.line_count();
            }
        }
    }

    /// Flattened lines, `> command` first in each block.
    pub fn render_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines);
        for b in &self.blocks {
            out.push(format!("{PROMPT}{}", b.command));
            out.extend(b.lines.iter().cloned());
        }
        out
    }

    pub fn widest(&self) -> usize {
        self.render_lines()
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Shell {
    pub input: LineEditor,
    pub history: History,
    pub scrollback: Scrollback,
    /// Lines scrolled up from the bottom of the scrollback.
    pub scroll_up: usize,
    pub hscroll: usize,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_older(&mut self) {
        if let Some(line) = self.history.older().map(str::to_string) {
            self.input.set(&line);
        }
    }

    pub fn history_newer(&mut self) {
        match self.history.newer().map(str::to_string) {
            Some(line) => self.input.set(&line),
            None => self.input.clear(),
        }
    }

    /// Record a finished exchange in the scrollback and jump to its end.
    pub fn log(&mut self, command: &str, result: Result<String, SessionError>) {
        let lines = match result {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(e) => vec![format!("error: {e}")],
        };
        self.scrollback.push(Block {
            command: command.to_string(),
            lines,
        });
        self.scroll_up = 0;
    }

    /// Submit the input line through `transport`.
    ///
    /// Returns false and does nothing when the line is blank. Otherwise the
    /// line is added to history exactly once and exactly one scrollback block
    /// is appended, whatever the peer answered.
    pub async fn submit<T: Transport>(&mut self, transport: &mut T) -> bool {
        let command = self.input.text().trim().to_string();
        if command.is_empty() {
            return false;
        }
        self.history.push(&command);
        self.input.clear();
        info!(command = %command, "cli command");
        let result = transport.request(&command).await;
        self.log(&command, result);
        true
    }

    pub fn scroll_page(&mut self, delta: isize, visible: usize) {
        let max = self.scrollback.line_count().saturating_sub(visible);
        let next = (self.scroll_up as isize + delta).max(0) as usize;
        self.scroll_up = next.min(max);
    }

    pub fn scroll_horizontal(&mut self, delta: isize, visible_cols: usize) {
        let max = self.scrollback.widest().saturating_sub(visible_cols);
        let next = (self.hscroll as isize + delta).max(0) as usize;
        self.hscroll = next.min(max);
    }
}
