use crate::core::state::{App, SessionPhase};
use crate::tui::component::Component;
use crate::tui::components::{LanguagePicker, PickerTarget, TitleBar};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

const HELP: &str =
    " Tab focus · Enter apply/translate · Ctrl+T translate · Ctrl+S swap · Ctrl+D detect · Ctrl+C quit";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min, Percentage};
    let layout = Layout::vertical([
        Length(1), // title
        Length(3), // key + endpoint
        Length(3), // telemetry
        Length(3), // languages
        Min(4),    // source text
        Min(4),    // output
        Length(1), // help
    ]);
    let [
        title_area,
        credentials_area,
        telemetry_area,
        languages_area,
        source_area,
        output_area,
        help_area,
    ] = layout.areas(frame.area());

    let source_name = app.catalog.display_name(&app.session.source_language);
    let target_name = app.catalog.display_name(&app.session.target_language);
    let mut title_bar = TitleBar::new(
        format!("{source_name} → {target_name}"),
        app.status_message.clone(),
        app.phase() == SessionPhase::Configured,
    );
    title_bar.spinner = app.is_loading().then_some(spinner_frame);
    title_bar.render(frame, title_area);

    let [key_area, endpoint_area] =
        Layout::horizontal([Percentage(40), Percentage(60)]).areas(credentials_area);
    tui.api_key.render(frame, key_area);
    tui.endpoint.render(frame, endpoint_area);
    tui.connection_string.render(frame, telemetry_area);

    let [source_lang_area, target_lang_area] =
        Layout::horizontal([Percentage(50), Percentage(50)]).areas(languages_area);
    draw_language_box(
        frame,
        source_lang_area,
        "From",
        source_name,
        &app.session.source_language,
        tui.focus == Focus::SourceLanguage,
    );
    draw_language_box(
        frame,
        target_lang_area,
        "To",
        target_name,
        &app.session.target_language,
        tui.focus == Focus::TargetLanguage,
    );

    tui.source_text.render(frame, source_area);
    draw_output(frame, output_area, app, tui);

    frame.render_widget(
        Span::styled(HELP, Style::default().fg(Color::DarkGray)),
        help_area,
    );

    if let Some(picker) = tui.picker.as_mut() {
        let current = match picker.target {
            PickerTarget::Source => app.session.source_language.as_str(),
            PickerTarget::Target => app.session.target_language.as_str(),
        };
        LanguagePicker::new(picker, current).render(frame, frame.area());
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_language_box(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    name: &str,
    code: &str,
    focused: bool,
) {
    let line = Line::from(vec![
        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  [{code}]"), Style::default().fg(Color::DarkGray)),
    ]);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(focus_style(focused))
        .title(title);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_output(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let (title, style) = if app.output_is_error {
        ("Error", Style::default().fg(Color::Red))
    } else {
        ("Translation", Style::default().fg(Color::White))
    };

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(focus_style(tui.focus == Focus::Output))
        .title(title);
    let paragraph = Paragraph::new(app.output.as_str())
        .style(style)
        .wrap(Wrap { trim: false });

    // Clamp scrolling to the wrapped content
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = paragraph.line_count(inner_width) as u16;
    tui.output_scroll = tui.output_scroll.min(total.saturating_sub(inner_height));

    frame.render_widget(
        paragraph.block(block).scroll((tui.output_scroll, 0)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::LanguageCatalog;
    use crate::test_support::{sample_languages, test_app};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(app: &App, tui: &mut TuiState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        tui.sync_props();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_shows_language_names_from_catalog() {
        let mut app = test_app();
        app.catalog = LanguageCatalog::new(sample_languages());
        let mut tui = TuiState::new(&app);

        let text = render(&app, &mut tui);
        assert!(text.contains("English"));
        assert!(text.contains("Italian"));
        assert!(text.contains("Welcome to Lingo!"));
    }

    #[test]
    fn test_draw_falls_back_to_codes_without_catalog() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        let text = render(&app, &mut tui);
        assert!(text.contains("[en]"));
        assert!(text.contains("[it]"));
    }

    #[test]
    fn test_draw_labels_errors() {
        let mut app = test_app();
        app.output = "unauthorized: bad key".to_string();
        app.output_is_error = true;
        let mut tui = TuiState::new(&app);

        let text = render(&app, &mut tui);
        assert!(text.contains("Error"));
        assert!(text.contains("unauthorized: bad key"));
    }

    #[test]
    fn test_draw_with_picker_open() {
        let mut app = test_app();
        app.catalog = LanguageCatalog::new(sample_languages());
        let mut tui = TuiState::new(&app);
        tui.picker = Some(crate::tui::components::LanguagePickerState::new(
            PickerTarget::Source,
            app.catalog.languages().to_vec(),
            "en",
        ));

        let text = render(&app, &mut tui);
        assert!(text.contains("Source language"));
        assert!(text.contains("Français"));
    }
}
