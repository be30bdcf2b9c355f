//! Sign-in form rendering

use super::field_renderer::{draw_field, draw_help_text, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::CALCULATOR_SHORTCUT;
use crate::state::Form;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

pub fn draw_login(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Sign In ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let form = &app.state.login_form;
    for index in 0..form.field_count() {
        if let Some(field) = form.get_field(index) {
            draw_field(
                frame,
                chunks[index],
                field,
                form.active_field() == index,
                app.state.login_errors.get(&field.name).map(String::as_str),
            );
        }
    }

    draw_help_text(
        frame,
        chunks[2],
        &format!("Enter: sign in  ·  {CALCULATOR_SHORTCUT}: tax calculator without an account"),
    );
}
