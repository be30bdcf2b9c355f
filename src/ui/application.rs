//! Application detail view: submission status, timeline and documents

use super::widgets::format_date;
use crate::app::App;
use crate::state::format_rupees;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw the application detail view
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(application) = app.state.viewed_application() else {
        let message = Paragraph::new("Application not found")
            .style(Style::default().fg(Color::Red))
            .block(
                Block::default()
                    .title(" Application ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(message, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let heading = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let title = format!(
        " Tax Return {} ",
        application.tax_year.as_deref().unwrap_or("")
    );

    let mut content = vec![
        Line::from(vec![
            Span::raw("Status: "),
            Span::styled(&application.status, Style::default().fg(Color::Cyan)),
            Span::raw(" | Reference: "),
            Span::styled(
                application.reference_or_placeholder(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Created: ", label),
            Span::raw(format_date(application.created_at.as_ref())),
            Span::styled("  Updated: ", label),
            Span::raw(format_date(application.updated_at.as_ref())),
        ]),
        Line::from(""),
    ];

    if let Some(submission) = app.state.submission_for(&application.id) {
        content.push(Line::from(Span::styled("Submission", heading)));
        content.push(Line::from(vec![
            Span::styled("Payment: ", label),
            Span::raw(submission.payment_status.replace('_', " ")),
            Span::styled("  Tax payable: ", label),
            Span::raw(format!("Rs. {}", format_rupees(submission.tax_payable))),
        ]));
        content.push(Line::from(vec![
            Span::styled("Filed: ", label),
            Span::raw(format_date(submission.created_at.as_ref())),
        ]));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled("─".repeat(40), label)));
    content.push(Line::from(Span::styled("Timeline", heading)));
    if app.state.timeline.is_empty() {
        content.push(Line::from(Span::styled("No activity yet.", label)));
    } else {
        for entry in &app.state.timeline {
            content.push(Line::from(vec![
                Span::styled(format!("{}  ", format_date(entry.created_at.as_ref())), label),
                Span::raw(entry.title.clone()),
            ]));
            if !entry.description.is_empty() {
                content.push(Line::from(Span::styled(
                    format!("             {}", entry.description),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("Documents", heading)));
    if app.state.documents.is_empty() {
        content.push(Line::from(Span::styled("No documents uploaded.", label)));
    } else {
        for doc in &app.state.documents {
            content.push(Line::from(vec![
                Span::styled(format!("[{}] ", doc.doc_type), Style::default().fg(Color::Magenta)),
                Span::raw(doc.name.clone()),
                Span::styled(format!("  {} KB", doc.size_bytes.div_ceil(1024)), label),
            ]));
        }
    }

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.state.scroll_offset as u16, 0));

    frame.render_widget(paragraph, area);
}
