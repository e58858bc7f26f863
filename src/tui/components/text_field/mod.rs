//! # TextField Component
//!
//! An editable, bordered text field. Used for the configuration fields
//! (single line, optionally masked) and the source text (multi-line).
//!
//! ## Responsibilities
//!
//! - Capture text input
//! - Handle editing (backspace, delete, cursor movement, paste)
//! - Handle submission (Enter)
//! - Wrap and scroll content to the area it is given
//!
//! ## State Management
//!
//! The buffer is internal state. `title`, `focused` and `placeholder` are
//! props set by the parent each frame. Cursor position and scroll state are
//! encapsulated in `CursorState`.

mod cursor;
mod text_wrap;

use std::borrow::Cow;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{inner_width, next_char_boundary, prev_char_boundary, visible_lines, wrap_lines};

const MASK: char = '•';

/// High-level events emitted by the TextField
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// Enter pressed; carries the current text. The buffer is kept.
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct TextField {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Block title (Prop)
    pub title: String,
    /// Whether the field has focus (Prop)
    pub focused: bool,
    /// Shown dimmed when the buffer is empty (Prop)
    pub placeholder: String,
    masked: bool,
    multiline: bool,
    cursor: CursorState,
}

impl TextField {
    /// A single-line field. Newlines are dropped.
    pub fn single_line(title: &str, initial: &str) -> Self {
        let mut field = Self {
            buffer: String::new(),
            title: title.to_string(),
            focused: false,
            placeholder: String::new(),
            masked: false,
            multiline: false,
            cursor: CursorState::new(),
        };
        field.set_text(initial);
        field
    }

    /// A single-line field that renders every character as a bullet.
    pub fn masked(title: &str, initial: &str) -> Self {
        Self {
            masked: true,
            ..Self::single_line(title, initial)
        }
    }

    /// A multi-line field. Ctrl+J inserts newlines; Enter still submits.
    pub fn multiline(title: &str) -> Self {
        Self {
            multiline: true,
            ..Self::single_line(title, "")
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    /// Replace the buffer, leaving the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = if self.multiline {
            text.to_string()
        } else {
            text.replace(['\n', '\r'], "")
        };
        self.cursor.move_to_end(&self.buffer);
    }

    /// Displayed text and the cursor's byte offset within it.
    fn display(&self) -> (Cow<'_, str>, usize) {
        if self.masked {
            let count = self.buffer[..self.cursor.pos].chars().count();
            let masked: String = self.buffer.chars().map(|_| MASK).collect();
            (Cow::Owned(masked), count * MASK.len_utf8())
        } else {
            (Cow::Borrowed(self.buffer.as_str()), self.cursor.pos)
        }
    }

    fn insert(&mut self, text: &str) -> Option<FieldEvent> {
        let text: Cow<str> = if self.multiline {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.replace(['\n', '\r'], ""))
        };
        if text.is_empty() {
            return None;
        }
        self.buffer.insert_str(self.cursor.pos, &text);
        self.cursor.pos += text.len();
        Some(FieldEvent::ContentChanged)
    }
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_content_width = area.width;
        let visible = visible_lines(area.height);

        let (text, pos) = self.display();
        let text = text.into_owned();
        self.cursor
            .update_scroll_offset(&text, pos, area.width, visible);

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str());

        let paragraph = if self.buffer.is_empty() && !self.focused {
            Paragraph::new(self.placeholder.as_str()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            let lines = wrap_lines(&text, inner_width(area.width));
            let start = (self.cursor.scroll_offset as usize).min(lines.len());
            let end = (start + visible as usize).min(lines.len());
            Paragraph::new(lines[start..end].join("\n")).style(Style::default().fg(Color::Green))
        };

        frame.render_widget(paragraph.block(block), area);

        if self.focused {
            let (cursor_x, cursor_y) = self.cursor.screen_pos(&text, pos, area);
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert(c.encode_utf8(&mut tmp))
            }
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => {
                if self.cursor.pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(prev..self.cursor.pos);
                    self.cursor.pos = prev;
                    Some(FieldEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                    Some(FieldEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => (self.cursor.pos > 0).then(|| {
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                FieldEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor.pos < self.buffer.len()).then(|| {
                self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                FieldEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor.pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor.pos != line_start).then(|| {
                    self.cursor.pos = line_start;
                    FieldEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor.pos..]
                    .find('\n')
                    .map(|i| self.cursor.pos + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor.pos != line_end).then(|| {
                    self.cursor.pos = line_end;
                    FieldEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp if self.multiline => self
                .cursor
                .move_vertically(&self.buffer, -1, self.cursor.last_content_width)
                .then_some(FieldEvent::ContentChanged),
            TuiEvent::CursorDown if self.multiline => self
                .cursor
                .move_vertically(&self.buffer, 1, self.cursor.last_content_width)
                .then_some(FieldEvent::ContentChanged),
            TuiEvent::Submit => Some(FieldEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}
