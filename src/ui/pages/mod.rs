//! Application screens and what they share.

pub mod account_page;
pub mod start_page;

pub use account_page::AccountPage;
pub use start_page::StartPage;

use crate::config::{AppConfig, KeyBindings};
use crate::nav::KeySet;
use crate::ui::theme::Theme;
use crate::ui::{DrawContext, Toast};
use crate::wallet::Wallet;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::sync::Arc;

/// Collaborators every page is built with.
#[derive(Clone)]
pub struct Load {
    pub wallet: Arc<dyn Wallet>,
    pub toast: Arc<Toast>,
    pub keys: Arc<KeyBindings>,
    pub config: Arc<AppConfig>,
}

/// Short label for the first combination of a binding, e.g. `"q"`.
pub fn key_hint(keys: &KeySet) -> String {
    keys.combos()
        .first()
        .map(|combo| combo.to_string())
        .unwrap_or_default()
}

pub fn render_header(ctx: &mut DrawContext<'_, '_>, area: Rect, title: &str, subtitle: &str) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_type(Theme::border_type())
        .border_style(ctx.style(Theme::border()));
    let inner = block.inner(area);
    ctx.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(format!(" {}", title), ctx.style(Theme::title())),
        Span::styled(format!("  {}", subtitle), ctx.style(Theme::muted())),
    ]);
    ctx.render_widget(Paragraph::new(line), inner);
}

/// One-line key help: pairs of (key label, action).
pub fn render_help_bar(ctx: &mut DrawContext<'_, '_>, area: Rect, items: &[(String, &str)]) {
    if area.height == 0 {
        return;
    }
    let key_style = ctx.style(Theme::help_bar().add_modifier(Modifier::BOLD));
    let text_style = ctx.style(Theme::help_bar());
    let mut spans = Vec::with_capacity(items.len() * 2);
    for (key, action) in items {
        if key.is_empty() {
            continue;
        }
        spans.push(Span::styled(format!(" {}", key), key_style));
        spans.push(Span::styled(format!(" {} ", action), text_style));
    }
    ctx.render_widget(Paragraph::new(Line::from(spans)).style(text_style), area);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_hint() {
        let keys: KeySet = "Esc|Backspace".parse().unwrap();
        assert_eq!(key_hint(&keys), "Esc");
        assert_eq!(key_hint(&"Ctrl-C".parse().unwrap()), "Ctrl-C");
        assert_eq!(key_hint(&KeySet::new()), "");
    }
}
