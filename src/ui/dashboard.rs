//! Dashboard: the signed-in user's tax applications

use super::widgets::{format_date, render_scrollable_list};
use crate::app::App;
use crate::backend::ApplicationRecord;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the dashboard
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(area);

    draw_applications(frame, chunks[0], app);
    draw_profile_panel(frame, chunks[1], app);
}

fn status_color(status: &str) -> Color {
    match status {
        "draft" => Color::Yellow,
        "submitted" | "processing" => Color::Cyan,
        "completed" | "filed" => Color::Green,
        "rejected" => Color::Red,
        _ => Color::Gray,
    }
}

fn draw_applications(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" My Tax Returns ({}) ", app.state.applications.len());

    if app.state.applications.is_empty() {
        let content = Paragraph::new(
            "No tax returns yet.\nPress 'n' to file a return or 'c' to estimate your tax.",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(content, area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .applications
        .iter()
        .enumerate()
        .map(|(idx, application)| {
            application_item(app, application, idx == app.state.selected_index)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    render_scrollable_list(frame, area, list, app.state.selected_index);
}

fn application_item<'a>(
    app: &'a App,
    application: &'a ApplicationRecord,
    is_selected: bool,
) -> ListItem<'a> {
    let prefix = if is_selected { "▸ " } else { "  " };
    let style = if is_selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let payment = app
        .state
        .submission_for(&application.id)
        .map(|s| s.payment_status.replace('_', " "))
        .unwrap_or_default();

    let header = Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(
            application.tax_year.as_deref().unwrap_or("—").to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", application.status),
            Style::default().fg(status_color(&application.status)),
        ),
        Span::raw(" "),
        Span::styled(payment, Style::default().fg(Color::Magenta)),
    ]);
    let detail = Line::from(Span::styled(
        format!(
            "    Ref {}  ·  {}",
            application.reference_or_placeholder(),
            format_date(application.created_at.as_ref())
        ),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(vec![header, detail])
}

fn draw_profile_panel(frame: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![Line::from("")];

    let name = app
        .state
        .profile
        .as_ref()
        .map(|p| p.full_name.as_str())
        .filter(|n| !n.is_empty());
    let email = app
        .state
        .session
        .as_ref()
        .map(|s| s.email.as_str())
        .unwrap_or("");

    content.push(Line::from(Span::styled(
        format!(" Welcome, {}", name.unwrap_or("taxpayer")),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    content.push(Line::from(Span::styled(
        format!(" {email}"),
        Style::default().fg(Color::DarkGray),
    )));

    if let Some(profile) = &app.state.profile {
        content.push(Line::from(""));
        if !profile.cnic.is_empty() {
            content.push(Line::from(vec![
                Span::styled(" CNIC  ", Style::default().fg(Color::DarkGray)),
                Span::raw(profile.cnic.clone()),
            ]));
        }
        if !profile.phone.is_empty() {
            content.push(Line::from(vec![
                Span::styled(" Phone ", Style::default().fg(Color::DarkGray)),
                Span::raw(profile.phone.clone()),
            ]));
        }
    }

    let drafts = app
        .state
        .applications
        .iter()
        .filter(|a| a.status == "draft")
        .count();
    let unpaid = app
        .state
        .submissions
        .iter()
        .filter(|s| s.payment_status == "unpaid")
        .count();

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "─".repeat(26),
        Style::default().fg(Color::DarkGray),
    )));
    content.push(Line::from(format!(" Drafts       {drafts}")));
    content.push(Line::from(format!(" Unpaid tax   {unpaid}")));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        " n  file a return",
        Style::default().fg(Color::Green),
    )));
    content.push(Line::from(Span::styled(
        " c  tax calculator",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Account ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_color() {
        assert_eq!(status_color("draft"), Color::Yellow);
        assert_eq!(status_color("submitted"), Color::Cyan);
        assert_eq!(status_color("unknown"), Color::Gray);
    }
}
