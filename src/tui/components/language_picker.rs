//! # Language Picker Component
//!
//! Centered overlay for choosing the source or target language. Opened with
//! Enter on a language field. Typing filters by code, English name or
//! native name.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `LanguagePickerState` lives in `TuiState`
//! - `LanguagePicker` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::translator::Language;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

/// Which selection the picker writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    Source,
    Target,
}

/// Persistent state for the language picker overlay.
pub struct LanguagePickerState {
    pub target: PickerTarget,
    languages: Vec<Language>,
    filter: String,
    /// Indices into `languages` that match `filter`.
    matches: Vec<usize>,
    pub list_state: ListState,
}

impl LanguagePickerState {
    /// Opens the picker with `current` preselected when present.
    pub fn new(target: PickerTarget, languages: Vec<Language>, current: &str) -> Self {
        let mut state = Self {
            target,
            languages,
            filter: String::new(),
            matches: Vec::new(),
            list_state: ListState::default(),
        };
        state.refilter();
        let preselect = state
            .matches
            .iter()
            .position(|&i| state.languages[i].code == current);
        if preselect.is_some() {
            state.list_state.select(preselect);
        }
        state
    }

    /// Languages currently shown, in order.
    pub fn visible(&self) -> impl Iterator<Item = &Language> {
        self.matches.iter().map(|&i| &self.languages[i])
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.matches = self
            .languages
            .iter()
            .enumerate()
            .filter(|(_, lang)| {
                needle.is_empty()
                    || lang.code.to_lowercase().starts_with(&needle)
                    || lang.name.to_lowercase().contains(&needle)
                    || lang.native_name.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        self.list_state
            .select(if self.matches.is_empty() { None } else { Some(0) });
    }

    fn selected_code(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        let language = self.languages.get(*self.matches.get(index)?)?;
        Some(language.code.clone())
    }
}

/// Events emitted by the language picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    Select(PickerTarget, String),
    Dismiss,
}

impl EventHandler for LanguagePickerState {
    type Event = PickerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PickerEvent> {
        match event {
            TuiEvent::Escape => Some(PickerEvent::Dismiss),
            TuiEvent::CursorUp => {
                if let Some(selected) = self.list_state.selected() {
                    self.list_state.select(Some(selected.saturating_sub(1)));
                }
                None
            }
            TuiEvent::CursorDown => {
                if let Some(selected) = self.list_state.selected() {
                    let last = self.matches.len().saturating_sub(1);
                    self.list_state.select(Some((selected + 1).min(last)));
                }
                None
            }
            TuiEvent::InputChar(c) if !c.is_control() => {
                self.filter.push(*c);
                self.refilter();
                None
            }
            TuiEvent::Paste(text) => {
                self.filter.push_str(text.trim());
                self.refilter();
                None
            }
            TuiEvent::Backspace => {
                if self.filter.pop().is_some() {
                    self.refilter();
                }
                None
            }
            TuiEvent::Submit => self
                .selected_code()
                .map(|code| PickerEvent::Select(self.target, code)),
            _ => None,
        }
    }
}

/// Transient render wrapper for the language picker overlay.
pub struct LanguagePicker<'a> {
    state: &'a mut LanguagePickerState,
    current: &'a str,
}

impl<'a> LanguagePicker<'a> {
    pub fn new(state: &'a mut LanguagePickerState, current: &'a str) -> Self {
        Self { state, current }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 70, area);

        // Clear underlying content
        frame.render_widget(Clear, overlay);

        let title = match self.state.target {
            PickerTarget::Source => " Source language ",
            PickerTarget::Target => " Target language ",
        };
        let filter_line = if self.state.filter.is_empty() {
            " Type to filter ".to_string()
        } else {
            format!(" Filter: {} ", self.state.filter)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_alignment(Alignment::Left)
            .title(Line::from(filter_line).right_aligned())
            .title_bottom(Line::from(" Enter Select  Esc Back ").centered())
            .padding(Padding::horizontal(1));

        if self.state.matches.is_empty() {
            let empty = Paragraph::new("No matching languages")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        // borders + padding
        let inner_width = overlay.width.saturating_sub(4) as usize;
        let selected = self.state.list_state.selected();

        let items: Vec<ListItem> = self
            .state
            .visible()
            .enumerate()
            .map(|(i, lang)| {
                let is_current = lang.code == self.current;
                let marker = if is_current { " *" } else { "" };
                let code = format!("{:<8}", lang.code);
                let label = if lang.native_name == lang.name {
                    lang.name.clone()
                } else {
                    format!("{} ({})", lang.name, lang.native_name)
                };
                let label_width = inner_width.saturating_sub(code.width() + marker.len());
                let label = truncate_to_width(&label, label_width);

                let style = if Some(i) == selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else if is_current {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let code_style = if Some(i) == selected {
                    style
                } else {
                    Style::default().fg(Color::Yellow)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(code, code_style),
                    Span::styled(label, style),
                    Span::styled(marker, style),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}

/// Truncate to fit within `max_width` display columns, adding "..." if needed.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
