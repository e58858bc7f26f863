//! Cursor position tracking and navigation for the TextField.
//!
//! `CursorState` owns the cursor byte offset, scroll offset, and cached
//! layout. Layout methods take the displayed text and cursor offset
//! explicitly, because a masked field displays different bytes than it
//! stores.

use super::text_wrap::{BORDER_OFFSET, inner_width, wrap_line_count, wrap_lines};
use ratatui::layout::Rect;

/// Cursor and scroll state, separated from the text buffer.
pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// Line offset for internal scrolling (0 when content fits in viewport)
    pub scroll_offset: u16,
    /// Cached content width from last render (used for cursor movement)
    pub last_content_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
        }
    }

    /// Move the cursor to the end of `buffer`.
    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
        self.scroll_offset = 0;
    }

    /// Move cursor vertically (up or down) while trying to maintain column position.
    ///
    /// Returns `true` if cursor moved, `false` if already at boundary.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, content_width: u16) -> bool {
        let width = inner_width(content_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let lines = textwrap::wrap(buffer, super::text_wrap::wrap_options(width));
        if lines.is_empty() {
            return false;
        }

        // Byte length of a wrapped line including its trailing newline (if present)
        let line_byte_span = |line: &str, offset: usize| -> usize {
            let has_newline = offset + line.len() < buffer.len()
                && buffer.as_bytes()[offset + line.len()] == b'\n';
            line.len() + usize::from(has_newline)
        };

        let mut byte_offset = 0;
        let mut current_line_idx = 0;
        let mut column_in_line = 0;

        for (idx, line) in lines.iter().enumerate() {
            if byte_offset + line.len() >= self.pos {
                current_line_idx = idx;
                column_in_line = self.pos - byte_offset;
                break;
            }
            byte_offset += line_byte_span(line, byte_offset);
        }

        let target_line_idx = if direction < 0 {
            if current_line_idx == 0 {
                return false;
            }
            current_line_idx - 1
        } else {
            if current_line_idx >= lines.len() - 1 {
                return false;
            }
            current_line_idx + 1
        };

        let mut target_line_start = 0;
        for line in lines.iter().take(target_line_idx) {
            target_line_start += line_byte_span(line, target_line_start);
        }

        // Same column, clamped to the target line and snapped to a char boundary
        let mut target = target_line_start + column_in_line.min(lines[target_line_idx].len());
        while !buffer.is_char_boundary(target) {
            target -= 1;
        }
        self.pos = target;

        true
    }

    /// Calculate which wrapped line (0-based) the cursor is on.
    pub fn calculate_line(text: &str, pos: usize, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        if width == 0 {
            return 0;
        }
        wrap_lines(&text[..pos], width).len().saturating_sub(1) as u16
    }

    /// Update scroll offset to keep cursor visible within `visible` lines.
    pub fn update_scroll_offset(&mut self, text: &str, pos: usize, content_width: u16, visible: u16) {
        let width = inner_width(content_width);
        let total_lines = wrap_line_count(text, width);

        if total_lines <= visible {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = Self::calculate_line(text, pos, content_width);

        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + visible {
            self.scroll_offset = cursor_line.saturating_sub(visible - 1);
        }
    }

    /// Calculate screen position for cursor based on wrapped text layout.
    /// Returns (column, row) in screen coordinates.
    pub fn screen_pos(&self, text: &str, pos: usize, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }

        let text_before_cursor = &text[..pos];
        let cursor_line = Self::calculate_line(text, pos, area.width);

        // Count chars from the last newline: textwrap trims trailing
        // whitespace, so wrapped line lengths undercount spaces.
        let last_newline = text_before_cursor
            .rfind('\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        let logical_line_to_cursor = &text_before_cursor[last_newline..];
        let logical_line_wrapped = wrap_lines(logical_line_to_cursor, width);

        let chars_in_prev_segments: usize = logical_line_wrapped
            .iter()
            .take(logical_line_wrapped.len().saturating_sub(1))
            .map(|seg| seg.chars().count())
            .sum();
        let total_chars = logical_line_to_cursor.chars().count();
        let cursor_col = total_chars.saturating_sub(chars_in_prev_segments) as u16;

        let visible_line = cursor_line.saturating_sub(self.scroll_offset);

        (
            area.x + BORDER_OFFSET + cursor_col.min(width),
            area.y + BORDER_OFFSET + visible_line,
        )
    }
}
