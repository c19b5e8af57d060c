use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct PageLayout {
    pub header: Rect,
    pub body: Rect,
    pub help_bar: Rect,
}

pub fn compute_layout(area: Rect, show_help_bar: bool) -> PageLayout {
    let help_height = if show_help_bar { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Header
            Constraint::Min(3),              // Body
            Constraint::Length(help_height), // Help bar
        ])
        .split(area);

    PageLayout {
        header: chunks[0],
        body: chunks[1],
        help_bar: chunks[2],
    }
}

/// Center a `percent_w` x `height` popup, clamped to the area with a margin.
pub fn centered_popup(area: Rect, percent_w: u16, min_w: u16, height: u16) -> Rect {
    let w = (area.width * percent_w / 100)
        .max(min_w)
        .min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// A one-line-high banner of `width`, centered horizontally `top` rows down.
pub fn top_banner(area: Rect, width: u16, top: u16) -> Rect {
    let w = width.min(area.width);
    let x = area.x + (area.width - w) / 2;
    let y = area.y + top.min(area.height.saturating_sub(1));
    Rect::new(x, y, w, 1.min(area.height))
}
