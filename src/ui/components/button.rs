//! Bordered buttons for the sidebar and action rows

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// How a button is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Current view or default action
    Active,
    Normal,
    /// Not reachable right now (e.g. needs a session)
    Disabled,
}

impl ButtonState {
    pub fn from_flags(is_selected: bool, is_enabled: bool) -> Self {
        match (is_selected, is_enabled) {
            (true, _) => Self::Active,
            (false, true) => Self::Normal,
            (false, false) => Self::Disabled,
        }
    }

    fn border_style(self) -> Style {
        match self {
            Self::Active => Style::default().fg(Color::Cyan),
            Self::Normal | Self::Disabled => Style::default().fg(Color::DarkGray),
        }
    }

    fn text_style(self) -> Style {
        match self {
            Self::Active => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Self::Normal => Style::default(),
            Self::Disabled => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        }
    }
}

/// Render a bordered button
pub fn render_button(frame: &mut Frame, area: Rect, label: &str, state: ButtonState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(state.border_style());
    let button = Paragraph::new(format!(" {label} "))
        .style(state.text_style())
        .block(block);
    frame.render_widget(button, area);
}

/// Render a sidebar entry; the shortcut, when there is one, trails the label
pub fn render_sidebar_button(
    frame: &mut Frame,
    area: Rect,
    shortcut: &str,
    label: &str,
    state: ButtonState,
) {
    render_button(frame, area, &sidebar_label(shortcut, label), state);
}

fn sidebar_label(shortcut: &str, label: &str) -> String {
    if shortcut.is_empty() {
        label.to_string()
    } else {
        format!("{label} {shortcut}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wins_over_disabled() {
        assert_eq!(ButtonState::from_flags(true, false), ButtonState::Active);
        assert_eq!(ButtonState::from_flags(false, true), ButtonState::Normal);
        assert_eq!(ButtonState::from_flags(false, false), ButtonState::Disabled);
    }

    #[test]
    fn test_sidebar_label_trails_shortcut() {
        assert_eq!(sidebar_label("", "Dashboard"), "Dashboard");
        assert_eq!(sidebar_label("^K", "Calculator"), "Calculator ^K");
    }
}
