//! UI module for rendering the TUI

mod application;
mod components;
mod confirmation;
mod dashboard;
mod forms;
mod layout;
mod widgets;

use crate::app::App;
use crate::state::View;
use components::{render_confirm_dialog, render_error_dialog};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Draw the main layout with sidebar
    let (sidebar_area, main_area) = layout::create_layout(area);

    // Draw sidebar
    layout::draw_sidebar(frame, sidebar_area, app);

    // Draw main content based on current view
    match app.state.current_view {
        View::Login => forms::draw_login(frame, main_area, app),
        View::Dashboard => dashboard::draw(frame, main_area, app),
        View::ApplicationDetail => application::draw(frame, main_area, app),
        View::TaxCalculator => forms::draw_calculator(frame, main_area, app),
        View::Filing => forms::draw_filing(frame, main_area, app),
        View::Confirmation => confirmation::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Modal overlays, errors on top
    if let Some(action) = &app.state.confirm_action {
        render_confirm_dialog(frame, action);
    }
    if let Some(message) = app.state.current_error() {
        render_error_dialog(frame, message, app.state.errors.len());
    }
}
