pub mod info_modal;

pub use info_modal::InfoModal;

use crate::ui::theme::Theme;
use crate::ui::DrawContext;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

/// Clear `area` and draw the standard modal frame around it. Returns the
/// inner area left for content.
pub fn render_frame(ctx: &mut DrawContext<'_, '_>, title: &str, area: Rect) -> Rect {
    ctx.render_widget(Clear, area);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border_focused())
        .style(Theme::surface());
    if !title.is_empty() {
        block = block
            .title(format!(" {} ", title))
            .title_style(Theme::title());
    }

    let inner = block.inner(area);
    ctx.render_widget(block, area);
    inner
}
