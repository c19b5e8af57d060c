pub mod layout;
pub mod modal;
pub mod pages;
pub mod theme;
pub mod toast;

use ratatui::prelude::*;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use std::time::Instant;

pub use toast::Toast;

/// Everything a page or modal needs to draw itself for one frame.
pub struct DrawContext<'a, 'f> {
    pub frame: &'a mut Frame<'f>,
    /// Area assigned to the layer being drawn.
    pub area: Rect,
    /// Time of the frame event being drawn.
    pub now: Instant,
    disabled: bool,
}

impl<'a, 'f> DrawContext<'a, 'f> {
    pub fn new(frame: &'a mut Frame<'f>, now: Instant) -> Self {
        let area = frame.area();
        Self {
            frame,
            area,
            now,
            disabled: false,
        }
    }

    /// True while a modal covers the layer being drawn. Disabled layers are
    /// still drawn, only dimmed.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// `style`, dimmed when the layer is disabled.
    pub fn style(&self, style: Style) -> Style {
        if self.disabled {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        }
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        self.frame.render_widget(widget, area);
    }

    pub fn render_stateful_widget<W: StatefulWidget>(
        &mut self,
        widget: W,
        area: Rect,
        state: &mut W::State,
    ) {
        self.frame.render_stateful_widget(widget, area, state);
    }
}

/// Fill the whole window with the background color.
pub fn fill_background(ctx: &mut DrawContext<'_, '_>) {
    let area = ctx.area;
    ctx.render_widget(Block::default().style(theme::Theme::background()), area);
}
