//! Confirmation dialog for destructive actions

use super::base::{key_hint, render_dialog, DialogConfig};
use crate::state::ConfirmAction;
use ratatui::{style::Color, text::Span, Frame};

/// Render a yes/no dialog for the pending action
pub fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction) {
    let message = action.message();

    let mut hint = key_hint("y");
    hint.push(Span::raw(" confirm  "));
    hint.extend(key_hint("n"));
    hint.push(Span::raw(" cancel"));

    let color = match action {
        ConfirmAction::SignOut => Color::Yellow,
        ConfirmAction::ResetFiling | ConfirmAction::DeleteApplication { .. } => Color::Red,
    };

    render_dialog(
        frame,
        DialogConfig {
            title: action.title(),
            title_color: color,
            border_color: color,
            message: &message,
            hint: Some(hint),
            max_width: 56,
        },
    );
}
