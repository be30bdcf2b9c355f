//! Error dialog component

use super::base::{key_hint, render_dialog, DialogConfig};
use ratatui::{style::Color, text::Span, Frame};

/// Render the front of the error queue; `queued` counts it too
pub fn render_error_dialog(frame: &mut Frame, error_message: &str, queued: usize) {
    let mut hint = vec![Span::raw("Press ")];
    hint.extend(key_hint("Enter"));
    hint.push(Span::raw(" or "));
    hint.extend(key_hint("Esc"));
    hint.push(Span::raw(" to dismiss"));
    if queued > 1 {
        hint.push(Span::styled(
            format!("  (+{} more)", queued - 1),
            ratatui::style::Style::default().fg(Color::DarkGray),
        ));
    }

    render_dialog(
        frame,
        DialogConfig {
            title: "Error",
            title_color: Color::Red,
            border_color: Color::Red,
            message: error_message,
            hint: Some(hint),
            max_width: 60,
        },
    );
}
