//! Layout components (sidebar, status bar)

use super::components::{render_sidebar_button, ButtonState, BUTTON_HEIGHT};
use crate::app::App;
use crate::platform::CALCULATOR_SHORTCUT;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Sidebar items: (key, label, views that highlight the item)
const SIDEBAR_ITEMS: &[(&str, &str, &[View])] = &[
    ("", "Dashboard", &[View::Dashboard, View::ApplicationDetail]),
    ("", "File Return", &[View::Filing, View::Confirmation]),
    (CALCULATOR_SHORTCUT, "Calculator", &[View::TaxCalculator]),
];

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Sidebar
            Constraint::Min(0),     // Main content
        ])
        .split(area);

    // Reserve bottom line for status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(chunks[1]);

    let sidebar_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(chunks[0]);

    (sidebar_chunks[0], main_chunks[0])
}

/// Draw the sidebar with boxed buttons
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Min(0)];
    constraints.extend(SIDEBAR_ITEMS.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, (key, label, views)) in SIDEBAR_ITEMS.iter().enumerate() {
        let is_selected = views.contains(&app.state.current_view);
        // everything but the calculator needs an account
        let is_enabled = app.state.is_signed_in() || views.iter().all(|v| !v.requires_session());
        render_sidebar_button(
            frame,
            chunks[idx + 1],
            key,
            label,
            ButtonState::from_flags(is_selected, is_enabled),
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Session indicator
    match &app.state.session {
        Some(session) => {
            spans.push(Span::styled(" ● ", Style::default().fg(Color::Green)));
            spans.push(Span::styled(
                format!("{} ", session.email),
                Style::default().fg(Color::Gray),
            ));
        }
        None => spans.push(Span::styled(" ○ ", Style::default().fg(Color::Red))),
    }
    spans.push(Span::styled(
        format!("{} ", app.state.current_view.title()),
        Style::default().fg(Color::Cyan),
    ));

    let hints = get_view_hints(app);
    spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(app: &App) -> String {
    match app.state.current_view {
        View::Login => "Tab:next  Enter:sign in".to_string(),
        View::Dashboard => {
            "j/k:nav  Enter:open  n:file  c:calculator  d:delete draft  r:refresh  s:sign out"
                .to_string()
        }
        View::ApplicationDetail => "j/k:scroll  r:reload  Esc:back".to_string(),
        View::TaxCalculator => "Tab:next  ←/→:year  Esc:back".to_string(),
        View::Filing if app.state.submitting => "Submitting...  Esc:stop waiting".to_string(),
        View::Filing => "Tab:next  ←/→:choose  Enter:continue  Esc:back".to_string(),
        View::Confirmation => "y:copy reference  n:new return  Enter:dashboard".to_string(),
    }
}
