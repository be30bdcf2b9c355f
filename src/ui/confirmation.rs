//! Submission confirmation view

use super::components::{render_button, ButtonState, BUTTON_HEIGHT};
use super::widgets::format_date;
use crate::app::App;
use crate::state::format_rupees;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the confirmation shown after a successful submission
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Return Submitted ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = &app.state.last_submission else {
        let message = Paragraph::new("No submission to show. Press Enter for the dashboard.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(message, inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .margin(1)
        .split(inner);

    let label = Style::default().fg(Color::DarkGray);
    let payment_color = match record.payment_status.as_str() {
        "unpaid" => Color::Yellow,
        "not_required" | "paid" => Color::Green,
        _ => Color::Gray,
    };

    let content = vec![
        Line::from(Span::styled(
            "✓ Your tax return has been submitted",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Reference number  ", label),
            Span::styled(
                record.reference_or_placeholder(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Tax year          ", label),
            Span::raw(record.tax_year.as_deref().unwrap_or("—")),
        ]),
        Line::from(vec![
            Span::styled("Status            ", label),
            Span::raw(record.status.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Tax payable       ", label),
            Span::raw(format!("Rs. {}", format_rupees(record.tax_payable))),
        ]),
        Line::from(vec![
            Span::styled("Payment           ", label),
            Span::styled(
                record.payment_status.replace('_', " "),
                Style::default().fg(payment_color),
            ),
        ]),
        Line::from(vec![
            Span::styled("Filed on          ", label),
            Span::raw(format_date(record.created_at.as_ref())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "We will notify you as your return is processed.",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(content), chunks[0]);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22),
            Constraint::Length(20),
            Constraint::Length(22),
            Constraint::Min(0),
        ])
        .split(chunks[1]);
    render_button(frame, buttons[0], "Dashboard (Enter)", ButtonState::Active);
    render_button(frame, buttons[1], "New return (n)", ButtonState::Normal);
    let copy_state = if record.reference_number.is_some() {
        ButtonState::Normal
    } else {
        ButtonState::Disabled
    };
    render_button(frame, buttons[2], "Copy reference (y)", copy_state);
}
