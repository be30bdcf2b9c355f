//! Filing wizard rendering: step progress, the active step form and review

use super::field_renderer::{draw_field, draw_help_text, field_slots};
use crate::app::App;
use crate::flow::{FlowTrack, FormSession, StepId};
use crate::platform::{CONTINUE_SHORTCUT, DRAFT_SHORTCUT, RESET_SHORTCUT};
use crate::state::{format_rupees, StepForm};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw_filing(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(40)])
        .split(area);

    draw_progress(frame, chunks[0], app);
    draw_step(frame, chunks[1], app);
}

/// Step list with completed, current and unreached markers
fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.flow.session();
    let current = app.flow.current_index();

    let mut items: Vec<ListItem> = app
        .flow
        .steps()
        .iter()
        .map(|d| {
            let (marker, style) = if d.index == current {
                (
                    "▸",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else if d.index <= session.furthest_step_index {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("·", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(Span::styled(
                format!("{marker} {}. {}", d.index, d.title),
                style,
            )))
        })
        .collect();

    if session.track == FlowTrack::Undecided {
        items.push(ListItem::new(Line::from(Span::styled(
            "  ... depends on method",
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let block = Block::default()
        .title(format!(" {} ", session.tax_year_or_default()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(List::new(items).block(block), area);
}

fn draw_step(frame: &mut Frame, area: Rect, app: &App) {
    let step = app.flow.current_step();
    let total = app.flow.track().step_count();
    let title = format!(
        " Step {} of {}: {} ",
        app.flow.current_index(),
        total,
        step.title()
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Intro
            Constraint::Min(4),    // Body
            Constraint::Length(1), // Help
        ])
        .margin(1)
        .split(inner);

    draw_help_text(frame, chunks[2], &help_text());

    if app.state.submitting {
        let waiting = Paragraph::new(vec![
            Line::from(Span::styled(
                "Submitting your return...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Documents are uploaded and the filing is recorded with your account."),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(waiting, chunks[1]);
        return;
    }

    let intro = Paragraph::new(step_intro(step, app.flow.session()))
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(intro, chunks[0]);

    if step == StepId::Review {
        draw_review(frame, chunks[1], app);
        return;
    }

    if let Some(form) = &app.state.step_form {
        draw_step_fields(frame, chunks[1], form);
    }
}

fn help_text() -> String {
    format!(
        "Enter/{CONTINUE_SHORTCUT}: continue  Esc: back  \
         {DRAFT_SHORTCUT}: save draft  {RESET_SHORTCUT}: start over"
    )
}

fn step_intro(step: StepId, session: &FormSession) -> String {
    match step {
        StepId::TaxYear => "Choose the tax year you are filing for.".to_string(),
        StepId::FilingMethod if session.track != FlowTrack::Undecided => {
            format!(
                "Filing method is fixed for this return. \
                 Use {RESET_SHORTCUT} to start over with a different one."
            )
        }
        StepId::FilingMethod => {
            "File online by entering each section, \
             or upload your documents and let us prepare the return."
                .to_string()
        }
        StepId::PersonalInfo => "Your identity and the account refunds are paid into.".to_string(),
        StepId::Income => "All income for the year, in rupees.".to_string(),
        StepId::TaxCredits => "Donations and pension contributions reduce the tax due.".to_string(),
        StepId::Deductions => "Deductible payments made during the year.".to_string(),
        StepId::WealthStatement => "Assets and liabilities at the end of the tax year.".to_string(),
        StepId::Expenses => "Personal expenses for the wealth reconciliation.".to_string(),
        StepId::UploadDocuments => {
            "Paths to the documents to upload. The CNIC copy is required.".to_string()
        }
        StepId::Review => "Check every section. Select one and press e to change it.".to_string(),
        StepId::FbrSubmission => {
            "IRIS portal login used to file on your behalf. The password is not stored.".to_string()
        }
    }
}

fn draw_step_fields(frame: &mut Frame, area: Rect, form: &StepForm) {
    let (first, slots) = field_slots(area, form.fields.len(), form.active_field_index);
    for (offset, slot) in slots.into_iter().enumerate() {
        let index = first + offset;
        if let Some(field) = form.fields.get(index) {
            let is_active = !form.locked && index == form.active_field_index;
            draw_field(frame, slot, field, is_active, form.error_for(&field.name));
        }
    }
}

/// Completed sections on the left, computed tax on the right
fn draw_review(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let session = app.flow.session();
    let completed = app.flow.current_index().saturating_sub(1);

    let items: Vec<ListItem> = app
        .flow
        .steps()
        .iter()
        .take(completed)
        .enumerate()
        .map(|(i, d)| {
            let selected = i == app.state.review_index;
            let style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let prefix = if selected { "▸ " } else { "  " };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{prefix}{}", d.title), style)),
                Line::from(Span::styled(
                    format!("    {}", section_summary(d.step, session)),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let sections = List::new(items).block(
        Block::default()
            .title(" Sections ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(sections, chunks[0]);

    let summary = session.tax_summary();
    let row = |label: &str, value: u64, bold: bool| {
        let style = if bold {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<18}"), Style::default().fg(Color::Gray)),
            Span::styled(format!("Rs. {}", format_rupees(value)), style),
        ])
    };
    let lines = vec![
        row("Total income", summary.total_income, false),
        row("Deductions", summary.total_deductions, false),
        row("Taxable income", summary.taxable_income, false),
        Line::from(""),
        row("Tax on income", summary.gross_tax, false),
        row("Tax credits", summary.credit, false),
        row("Already deducted", summary.tax_withheld, false),
        Line::from(""),
        row("Tax payable", summary.net_payable, true),
    ];
    let figures = Paragraph::new(lines).block(
        Block::default()
            .title(" Tax ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(figures, chunks[1]);
}

/// One-line summary of a completed section
fn section_summary(step: StepId, session: &FormSession) -> String {
    let rupees = |v: u64| format!("Rs. {}", format_rupees(v));
    match step {
        StepId::TaxYear => session.tax_year_or_default().to_string(),
        StepId::FilingMethod => session
            .track
            .method()
            .map(|m| m.label().to_string())
            .unwrap_or_else(|| "—".to_string()),
        StepId::PersonalInfo => session
            .basic_info
            .as_ref()
            .map(|b| format!("{} · {}", b.full_name, b.cnic))
            .unwrap_or_else(|| "—".to_string()),
        StepId::Income => session
            .income
            .as_ref()
            .map(|i| rupees(i.total()))
            .unwrap_or_else(|| "—".to_string()),
        StepId::TaxCredits => session
            .credits
            .as_ref()
            .map(|c| format!("{} eligible", rupees(c.eligible())))
            .unwrap_or_else(|| "—".to_string()),
        StepId::Deductions => session
            .deductions
            .as_ref()
            .map(|d| rupees(d.total()))
            .unwrap_or_else(|| "—".to_string()),
        StepId::WealthStatement => session
            .wealth
            .as_ref()
            .map(|w| {
                let net = w.net_worth();
                let sign = if net < 0 { "-" } else { "" };
                let magnitude = u64::try_from(net.unsigned_abs()).unwrap_or(u64::MAX);
                format!("net worth {sign}{}", rupees(magnitude))
            })
            .unwrap_or_else(|| "—".to_string()),
        StepId::Expenses => session
            .expenses
            .as_ref()
            .map(|e| rupees(e.total()))
            .unwrap_or_else(|| "—".to_string()),
        StepId::UploadDocuments => session
            .documents
            .as_ref()
            .map(|d| format!("{} file(s)", d.files.len()))
            .unwrap_or_else(|| "—".to_string()),
        StepId::Review | StepId::FbrSubmission => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{IncomeDetails, WealthStatement};

    #[test]
    fn test_wrapped_text_keeps_single_spacing() {
        assert_eq!(
            help_text(),
            format!(
                "Enter/Ctrl+S: continue  Esc: back  {DRAFT_SHORTCUT}: save draft  \
                 Ctrl+R: start over"
            )
        );
        let locked = FormSession {
            track: FlowTrack::Online,
            ..Default::default()
        };
        assert_eq!(
            step_intro(StepId::FilingMethod, &locked),
            "Filing method is fixed for this return. Use Ctrl+R to start over with a different one."
        );
        assert!(step_intro(StepId::FilingMethod, &FormSession::default())
            .contains("each section, or upload"));
    }

    #[test]
    fn test_section_summary_placeholders() {
        let session = FormSession::default();
        assert_eq!(section_summary(StepId::Income, &session), "—");
        assert_eq!(section_summary(StepId::TaxYear, &session), "2024-2025");
    }

    #[test]
    fn test_section_summary_values() {
        let session = FormSession {
            income: Some(IncomeDetails {
                salary_income: 1_800_000,
                ..Default::default()
            }),
            wealth: Some(WealthStatement {
                bank_balances: 100,
                liabilities: 600,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(section_summary(StepId::Income, &session), "Rs. 1,800,000");
        assert_eq!(
            section_summary(StepId::WealthStatement, &session),
            "net worth -Rs. 500"
        );
    }
}
