//! Salary tax calculator rendering

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::App;
use crate::state::{format_rupees, Form};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_calculator(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_inputs(frame, chunks[0], app);
    draw_results(frame, chunks[1], app);
}

fn draw_inputs(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Salary Tax Calculator ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let form = &app.state.calculator_form;
    for index in 0..form.field_count() {
        if let Some(field) = form.get_field(index) {
            draw_field(frame, slots[index], field, form.active_field() == index, None);
        }
    }
}

fn draw_results(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Breakdown ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(breakdown) = app.state.calculator_form.breakdown() else {
        let empty = Paragraph::new("Enter a monthly salary to see the tax breakdown.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let row = |label: &str, value: String, highlight: bool| {
        let style = if highlight {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<22}"), Style::default().fg(Color::Gray)),
            Span::styled(value, style),
        ])
    };

    let lines = vec![
        row("Tax year", breakdown.tax_year.clone(), false),
        Line::from(""),
        row(
            "Monthly income",
            format!("Rs. {}", format_rupees(breakdown.monthly_income)),
            false,
        ),
        row("Monthly tax", format!("Rs. {}", format_rupees(breakdown.monthly_tax)), true),
        row(
            "Monthly take-home",
            format!("Rs. {}", format_rupees(breakdown.monthly_take_home)),
            false,
        ),
        Line::from(""),
        row(
            "Yearly income",
            format!("Rs. {}", format_rupees(breakdown.yearly_income)),
            false,
        ),
        row("Yearly tax", format!("Rs. {}", format_rupees(breakdown.yearly_tax)), true),
        row(
            "Yearly take-home",
            format!("Rs. {}", format_rupees(breakdown.yearly_take_home)),
            false,
        ),
        Line::from(""),
        row("Effective rate", format!("{:.2}%", breakdown.effective_rate), false),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
