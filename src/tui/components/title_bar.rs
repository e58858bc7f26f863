//! # TitleBar Component
//!
//! Top status bar: the active language pair, session phase, and the
//! current status message.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(
//!     "English → Italian".to_string(),
//!     app.status_message.clone(),
//!     app.phase() == SessionPhase::Configured,
//! );
//! title_bar.spinner = app.is_loading().then_some(spinner_frame);
//! title_bar.render(frame, title_area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Status message**: `"Lingo (English → Italian) ● | Ready (130 languages)"`
//! 2. **Default**: `"Lingo (English → Italian) ●"`
//!
//! The dot is green once a translator is live and grey before that.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct TitleBar {
    /// e.g. "English → Italian"
    pub language_pair: String,
    pub status_message: String,
    /// Whether a translator client is live
    pub configured: bool,
    /// Animation frame while work is in flight
    pub spinner: Option<usize>,
}

impl TitleBar {
    pub fn new(language_pair: String, status_message: String, configured: bool) -> Self {
        Self {
            language_pair,
            status_message,
            configured,
            spinner: None,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dot_style = if self.configured {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
            Span::raw(format!("Lingo ({}) ", self.language_pair)),
            Span::styled("●", dot_style),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            if let Some(frame_index) = self.spinner {
                spans.push(Span::styled(
                    format!("{} ", SPINNER[frame_index % SPINNER.len()]),
                    Style::default().fg(Color::Cyan),
                ));
            }
            spans.push(Span::raw(self.status_message.as_str()));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
