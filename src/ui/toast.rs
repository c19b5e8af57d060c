//! Transient notification drawn above every other layer.

use crate::nav::{lock, WindowHost};
use crate::ui::layout::top_banner;
use crate::ui::theme::Theme;
use crate::ui::DrawContext;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    Short,
    Long,
}

struct ToastState {
    message: String,
    success: bool,
    expires_at: Instant,
}

/// Thread-safe toast. Background tasks report outcomes here; the event loop
/// draws it on top of the page and modal until it expires.
pub struct Toast {
    state: Mutex<Option<ToastState>>,
    host: Arc<dyn WindowHost>,
    short: Duration,
    long: Duration,
}

impl Toast {
    pub fn new(host: Arc<dyn WindowHost>, short: Duration, long: Duration) -> Self {
        Self {
            state: Mutex::new(None),
            host,
            short,
            long,
        }
    }

    pub fn notify(&self, message: impl Into<String>, duration: ToastDuration) {
        self.show(message.into(), true, duration);
    }

    pub fn notify_error(&self, message: impl Into<String>, duration: ToastDuration) {
        self.show(message.into(), false, duration);
    }

    /// The message currently showing at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<(String, bool)> {
        lock(&self.state)
            .as_ref()
            .filter(|s| now < s.expires_at)
            .map(|s| (s.message.clone(), s.success))
    }

    fn show(&self, message: String, success: bool, duration: ToastDuration) {
        let ttl = match duration {
            ToastDuration::Short => self.short,
            ToastDuration::Long => self.long,
        };
        *lock(&self.state) = Some(ToastState {
            message,
            success,
            expires_at: Instant::now() + ttl,
        });
        self.host.invalidate();

        // Redraw once more after expiry so the toast disappears without input.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let host = Arc::clone(&self.host);
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                host.invalidate();
            });
        }
    }

    /// Draw the current message, if any. Returns whether anything was drawn.
    pub fn layout(&self, ctx: &mut DrawContext<'_, '_>) -> bool {
        let Some((message, success)) = self.current(ctx.now) else {
            return false;
        };

        let width = u16::try_from(message.width())
            .unwrap_or(u16::MAX)
            .saturating_add(4);
        let area = top_banner(ctx.area, width, 2);
        if area.height == 0 {
            return false;
        }
        ctx.render_widget(Clear, area);
        ctx.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Theme::toast(success)),
            area,
        );
        true
    }
}
