//! Field rendering utilities for forms

use crate::state::{FieldKind, FormField};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field: bordered input plus its error line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a form field with its validation error, if any, underneath
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &FormField,
    is_active: bool,
    error: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let accent = if error.is_some() {
        Color::Red
    } else if is_active {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let display_value = field.display_value();
    let display_str = if field.as_text().is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    // choice fields show arrows instead of a cursor
    let cursor = if is_active && !matches!(field.kind, FieldKind::Choice(_)) {
        "▌"
    } else {
        ""
    };

    let value_style = if is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };

    let required = if field.is_required() { " *" } else { "" };
    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_str, value_style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    let block = Block::default()
        .title(format!(" {}{} ", field.label, required))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    frame.render_widget(content.block(block), chunks[0]);

    if let Some(message) = error {
        let line = Paragraph::new(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red),
        ));
        frame.render_widget(line, chunks[1]);
    }
}

/// Draw a one-line help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Split `area` into one slot per field, keeping `active` on screen
pub fn field_slots(area: Rect, count: usize, active: usize) -> (usize, Vec<Rect>) {
    let fits = (area.height / FIELD_HEIGHT).max(1) as usize;
    let first = if active >= fits { active + 1 - fits } else { 0 };
    let shown = count.saturating_sub(first).min(fits);

    let mut constraints: Vec<Constraint> =
        (0..shown).map(|_| Constraint::Length(FIELD_HEIGHT)).collect();
    constraints.push(Constraint::Min(0));

    let rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    (first, rects[..shown].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_slots_fit_everything_when_tall_enough() {
        let (first, slots) = field_slots(Rect::new(0, 0, 40, 40), 5, 4);
        assert_eq!(first, 0);
        assert_eq!(slots.len(), 5);
    }

    #[test]
    fn test_field_slots_scroll_to_active() {
        // room for two fields
        let (first, slots) = field_slots(Rect::new(0, 0, 40, 9), 7, 5);
        assert_eq!(first, 4);
        assert_eq!(slots.len(), 2);
    }
}
