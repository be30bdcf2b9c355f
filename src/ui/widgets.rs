//! Reusable UI widget helpers

use ratatui::{
    layout::Rect,
    widgets::{List, ListState},
    Frame,
};

/// Render a list that keeps the selected row in view
pub fn render_scrollable_list(frame: &mut Frame, area: Rect, list: List, selected_index: usize) {
    let mut list_state = ListState::default().with_selected(Some(selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Format an optional timestamp as a local-agnostic date
pub fn format_date(value: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let date = chrono::Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap();
        assert_eq!(format_date(Some(&date)), "30 Sep 2024");
        assert_eq!(format_date(None), "—");
    }
}
