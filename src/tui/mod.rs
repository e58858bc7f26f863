//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//! crossterm event → TuiEvent → route_event() → Vec<Action>
//!                                                 │
//!                   update(&mut app, action) ◄────┘
//!                          │
//!                       Effect ──► tokio::spawn(run_effect) ──► Action (mpsc)
//! ```
//!
//! ## Redraw Strategy
//!
//! - **Loading** (reconfigure/translate/detect in flight): draws every ~80ms
//!   so the spinner animates.
//! - **Idle**: sleeps up to 500ms and only redraws on events.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::clients::ClientFactory;
use crate::core::config::ResolvedConfig;
use crate::core::controller::run_effect;
use crate::core::state::{App, ConfigField};
use crate::translator::azure::DEFAULT_ENDPOINT;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    FieldEvent, LanguagePickerState, PickerEvent, PickerTarget, TextField,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Focusable regions, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    ApiKey,
    Endpoint,
    ConnectionString,
    SourceLanguage,
    TargetLanguage,
    SourceText,
    Output,
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::ApiKey,
        Focus::Endpoint,
        Focus::ConnectionString,
        Focus::SourceLanguage,
        Focus::TargetLanguage,
        Focus::SourceText,
        Focus::Output,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// The configuration field edited while this region has focus.
    pub fn config_field(self) -> Option<ConfigField> {
        match self {
            Focus::ApiKey => Some(ConfigField::ApiKey),
            Focus::Endpoint => Some(ConfigField::Endpoint),
            Focus::ConnectionString => Some(ConfigField::TelemetryConnectionString),
            _ => None,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub(crate) struct TuiState {
    pub focus: Focus,
    pub api_key: TextField,
    pub endpoint: TextField,
    pub connection_string: TextField,
    pub source_text: TextField,
    /// Line offset of the output pane
    pub output_scroll: u16,
    /// Language picker overlay (None = hidden)
    pub picker: Option<LanguagePickerState>,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            focus: if app.config.api_key.is_empty() {
                Focus::ApiKey
            } else {
                Focus::SourceText
            },
            api_key: TextField::masked("API key", &app.config.api_key)
                .with_placeholder("32-character subscription key"),
            endpoint: TextField::single_line("Endpoint", &app.config.endpoint)
                .with_placeholder(DEFAULT_ENDPOINT),
            connection_string: TextField::masked(
                "Telemetry connection string",
                &app.config.telemetry_connection_string,
            )
            .with_placeholder("optional"),
            source_text: TextField::multiline("Source text")
                .with_placeholder("Type here, Enter to translate"),
            output_scroll: 0,
            picker: None,
        }
    }

    fn field_mut(&mut self, field: ConfigField) -> &mut TextField {
        match field {
            ConfigField::ApiKey => &mut self.api_key,
            ConfigField::Endpoint => &mut self.endpoint,
            ConfigField::TelemetryConnectionString => &mut self.connection_string,
        }
    }

    /// Pushes focus flags down to the components.
    fn sync_props(&mut self) {
        self.api_key.focused = self.focus == Focus::ApiKey && self.picker.is_none();
        self.endpoint.focused = self.focus == Focus::Endpoint && self.picker.is_none();
        self.connection_string.focused =
            self.focus == Focus::ConnectionString && self.picker.is_none();
        self.source_text.focused = self.focus == Focus::SourceText && self.picker.is_none();
    }

    /// Pulls state the core may have rewritten (swap replaces the source text).
    fn sync_from(&mut self, app: &App) {
        if self.source_text.buffer != app.source_text {
            self.source_text.set_text(&app.source_text);
        }
    }

    /// Commits the focused configuration field; unchanged values are a no-op in update().
    fn commit_focused(&mut self, actions: &mut Vec<Action>) {
        if let Some(field) = self.focus.config_field() {
            let value = self.field_mut(field).buffer.clone();
            actions.push(Action::ConfigurationChanged(field, value));
        }
    }

    fn move_focus(&mut self, next: Focus, actions: &mut Vec<Action>) {
        self.commit_focused(actions);
        self.focus = next;
    }
}

/// Maps one terminal event to the core actions it causes.
pub(crate) fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Vec<Action> {
    let mut actions = Vec::new();

    match event {
        TuiEvent::ForceQuit => return vec![Action::Quit],
        TuiEvent::Resize => return actions,
        _ => {}
    }

    // When the picker is open, route all events to it
    if let Some(picker) = tui.picker.as_mut() {
        match picker.handle_event(event) {
            Some(PickerEvent::Select(PickerTarget::Source, code)) => {
                actions.push(Action::SelectSourceLanguage(code));
                tui.picker = None;
            }
            Some(PickerEvent::Select(PickerTarget::Target, code)) => {
                actions.push(Action::SelectTargetLanguage(code));
                tui.picker = None;
            }
            Some(PickerEvent::Dismiss) => tui.picker = None,
            None => {}
        }
        return actions;
    }

    match event {
        TuiEvent::Translate | TuiEvent::Swap | TuiEvent::Detect => {
            tui.commit_focused(&mut actions);
            actions.push(match event {
                TuiEvent::Swap => Action::Swap,
                TuiEvent::Detect => Action::Detect,
                _ => Action::Translate,
            });
            return actions;
        }
        TuiEvent::NextField => {
            tui.move_focus(tui.focus.next(), &mut actions);
            return actions;
        }
        TuiEvent::PrevField => {
            tui.move_focus(tui.focus.prev(), &mut actions);
            return actions;
        }
        _ => {}
    }

    match tui.focus {
        focus @ (Focus::ApiKey | Focus::Endpoint | Focus::ConnectionString) => {
            let Some(field) = focus.config_field() else {
                return actions;
            };
            if let Some(FieldEvent::Submit(value)) = tui.field_mut(field).handle_event(event) {
                actions.push(Action::ConfigurationChanged(field, value));
            }
        }
        focus @ (Focus::SourceLanguage | Focus::TargetLanguage) => {
            if matches!(event, TuiEvent::Submit) && !app.catalog.is_empty() {
                let (target, current) = if focus == Focus::SourceLanguage {
                    (PickerTarget::Source, &app.session.source_language)
                } else {
                    (PickerTarget::Target, &app.session.target_language)
                };
                tui.picker = Some(LanguagePickerState::new(
                    target,
                    app.catalog.languages().to_vec(),
                    current,
                ));
            }
        }
        Focus::SourceText => match tui.source_text.handle_event(event) {
            Some(FieldEvent::Submit(text)) => {
                actions.push(Action::SourceTextChanged(text));
                actions.push(Action::Translate);
            }
            Some(FieldEvent::ContentChanged) => {
                actions.push(Action::SourceTextChanged(tui.source_text.buffer.clone()));
            }
            None => {}
        },
        Focus::Output => match event {
            TuiEvent::CursorUp => tui.output_scroll = tui.output_scroll.saturating_sub(1),
            TuiEvent::CursorDown => tui.output_scroll = tui.output_scroll.saturating_add(1),
            TuiEvent::CursorHome => tui.output_scroll = 0,
            _ => {}
        },
    }

    actions
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Keyboard enhancement is harmlessly ignored by terminals that lack it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

/// Applies an action and starts whatever effect it requests.
/// Returns true when the app should quit.
fn apply(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::Quit => true,
        Effect::None => false,
        effect => {
            debug!("Spawning effect: {:?}", effect);
            tokio::spawn(run_effect(effect, tx.clone()));
            false
        }
    }
}

pub fn run(config: ResolvedConfig, clients: Arc<dyn ClientFactory>) -> std::io::Result<()> {
    let mut app = App::new(clients, &config);
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Populate the catalog (and configure, if a key was supplied) at startup
    let mut should_quit = apply(&mut app, Action::Configure, &tx);

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    while !should_quit {
        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            tui.sync_props();
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in route_event(&app, &mut tui, &event) {
                should_quit |= apply(&mut app, action, &tx);
            }
            if should_quit {
                break;
            }
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            should_quit |= apply(&mut app, action, &tx);
        }

        tui.sync_from(&app);
    }

    info!("Lingo shutting down");
    ratatui::restore();
    Ok(())
}
