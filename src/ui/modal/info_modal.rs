use crate::nav::{KeyEventHandler, KeySet, Modal, Navigator};
use crate::ui::layout::centered_popup;
use crate::ui::theme::Theme;
use crate::ui::DrawContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

pub const INFO_MODAL_ID: &str = "info_modal";

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Returns true when the modal should be dismissed.
pub type PositiveAction = Box<dyn FnMut(&Navigator) -> bool + Send>;
pub type NegativeAction = Box<dyn FnMut(&Navigator) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pressed {
    Positive,
    Negative,
}

/// General purpose dialog: a title, a body, and up to two actions bound to
/// Enter (positive) and Esc (negative). A loading dialog shows a spinner
/// instead of its actions and ignores input.
pub struct InfoModal {
    id: String,
    title: String,
    body: String,
    positive: Option<(String, PositiveAction)>,
    negative: Option<(String, NegativeAction)>,
    cancelable: bool,
    loading: bool,
    pressed: Option<Pressed>,
    navigator: Option<Navigator>,
    shown_at: Instant,
    tick_pending: Arc<AtomicBool>,
}

impl Default for InfoModal {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoModal {
    pub fn new() -> Self {
        Self {
            id: INFO_MODAL_ID.to_string(),
            title: String::new(),
            body: String::new(),
            positive: None,
            negative: None,
            cancelable: true,
            loading: false,
            pressed: None,
            navigator: None,
            shown_at: Instant::now(),
            tick_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn positive_button(
        mut self,
        label: impl Into<String>,
        action: impl FnMut(&Navigator) -> bool + Send + 'static,
    ) -> Self {
        self.positive = Some((label.into(), Box::new(action)));
        self
    }

    pub fn negative_button(
        mut self,
        label: impl Into<String>,
        action: impl FnMut(&Navigator) + Send + 'static,
    ) -> Self {
        self.negative = Some((label.into(), Box::new(action)));
        self
    }

    /// Whether Esc dismisses the dialog when it has no negative action.
    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn trigger(&mut self, pressed: Pressed, navigator: &Navigator) {
        match pressed {
            Pressed::Positive => {
                if let Some((_, action)) = &mut self.positive {
                    if action(navigator) {
                        navigator.dismiss_modal(&self.id);
                    }
                }
            }
            Pressed::Negative => match &mut self.negative {
                Some((_, action)) => {
                    navigator.dismiss_modal(&self.id);
                    action(navigator);
                }
                None if self.cancelable => {
                    navigator.dismiss_modal(&self.id);
                }
                None => {}
            },
        }
    }

    /// Keep the spinner moving with one delayed redraw at a time.
    fn schedule_spinner_tick(&self) {
        let Some(navigator) = self.navigator.clone() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        if self.tick_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let pending = Arc::clone(&self.tick_pending);
        handle.spawn(async move {
            tokio::time::sleep(SPINNER_INTERVAL).await;
            pending.store(false, Ordering::Release);
            navigator.reload();
        });
    }

    fn footer(&self, now: Instant) -> Line<'static> {
        if self.loading {
            let elapsed = now.saturating_duration_since(self.shown_at);
            let frame = (elapsed.as_millis() / SPINNER_INTERVAL.as_millis()) as usize % SPINNER.len();
            return Line::from(vec![
                Span::styled(SPINNER[frame], Theme::border_focused()),
                Span::styled(" Please wait…", Theme::muted()),
            ])
            .alignment(Alignment::Right);
        }

        let key_style = Theme::border_focused().add_modifier(Modifier::BOLD);
        let mut spans = Vec::new();
        if let Some((label, _)) = &self.negative {
            spans.push(Span::styled("Esc", key_style));
            spans.push(Span::styled(format!(" {}  ", label), Theme::muted()));
        } else if self.cancelable {
            spans.push(Span::styled("Esc", key_style));
            spans.push(Span::styled(" Close  ", Theme::muted()));
        }
        if let Some((label, _)) = &self.positive {
            spans.push(Span::styled("Enter", key_style));
            spans.push(Span::styled(format!(" {}", label), Theme::text()));
        }
        Line::from(spans).alignment(Alignment::Right)
    }
}

impl Modal for InfoModal {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_attached_to_navigator(&mut self, navigator: Navigator) {
        self.navigator = Some(navigator);
    }

    fn on_resume(&mut self) {
        self.shown_at = Instant::now();
        self.pressed = None;
    }

    fn handle(&mut self) {
        if self.loading {
            self.pressed = None;
            self.schedule_spinner_tick();
            return;
        }
        let (Some(pressed), Some(navigator)) = (self.pressed.take(), self.navigator.clone()) else {
            return;
        };
        self.trigger(pressed, &navigator);
    }

    fn layout(&self, ctx: &mut DrawContext<'_, '_>) {
        let width = centered_popup(ctx.area, 50, 36, 0).width;
        let text_width = width.saturating_sub(4).max(1) as usize;
        let body_lines: usize = self
            .body
            .lines()
            .map(|line| line.width().div_ceil(text_width).max(1))
            .sum();
        let height = (body_lines as u16).saturating_add(4);

        let area = centered_popup(ctx.area, 50, 36, height);
        let inner = super::render_frame(ctx, &self.title, area);
        if inner.height == 0 {
            return;
        }
        let inner = inner.inner(Margin::new(1, 0));

        let footer = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(2));
        ctx.render_widget(
            Paragraph::new(self.body.as_str())
                .style(Theme::text())
                .wrap(Wrap { trim: true }),
            body,
        );
        ctx.render_widget(Paragraph::new(self.footer(ctx.now)), footer);
    }

    fn on_dismiss(&mut self) {
        self.pressed = None;
    }

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        Some(self)
    }
}

impl KeyEventHandler for InfoModal {
    fn keys_to_handle(&self) -> KeySet {
        let mut keys = KeySet::new();
        if self.loading {
            return keys;
        }
        if self.positive.is_some() {
            keys = keys.with_code(KeyCode::Enter);
        }
        if self.negative.is_some() || self.cancelable {
            keys = keys.with_code(KeyCode::Esc);
        }
        keys
    }

    fn handle_key_press(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Enter => self.pressed = Some(Pressed::Positive),
            KeyCode::Esc => self.pressed = Some(Pressed::Negative),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::testing::harness;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::atomic::AtomicUsize;

    fn press(modal: &mut Box<dyn Modal>, code: KeyCode) {
        modal
            .as_key_handler()
            .unwrap()
            .handle_key_press(&KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn test_enter_runs_positive_and_dismisses() {
        let h = harness();
        let calls = counter();
        let c = Arc::clone(&calls);
        h.window.show_modal(Box::new(
            InfoModal::new().title("Retry?").positive_button("Retry", move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ));

        let top = h.window.top_modal().unwrap();
        {
            let mut modal = top.lock();
            press(&mut modal, KeyCode::Enter);
            modal.handle();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!h.window.has_modal());
        assert_eq!(h.window.finish_retired_modals(), 1);
    }

    #[test]
    fn test_positive_returning_false_keeps_modal() {
        let h = harness();
        h.window
            .show_modal(Box::new(InfoModal::new().positive_button("Ok", |_| false)));

        let top = h.window.top_modal().unwrap();
        {
            let mut modal = top.lock();
            press(&mut modal, KeyCode::Enter);
            modal.handle();
            // The press is consumed.
            modal.handle();
        }
        assert_eq!(h.window.modal_ids(), vec![INFO_MODAL_ID]);
    }

    #[test]
    fn test_esc_runs_negative_after_dismissing() {
        let h = harness();
        let calls = counter();
        let c = Arc::clone(&calls);
        h.window.show_modal(Box::new(
            InfoModal::new()
                .with_id("exit")
                .negative_button("Exit", move |nav| {
                    assert!(nav.top_modal_id().is_none());
                    c.fetch_add(1, Ordering::SeqCst);
                }),
        ));

        let top = h.window.top_modal().unwrap();
        {
            let mut modal = top.lock();
            press(&mut modal, KeyCode::Esc);
            modal.handle();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!h.window.has_modal());
    }

    #[test]
    fn test_cancelable_controls_esc() {
        let h = harness();
        let mut modal = InfoModal::new().cancelable(false);
        assert!(modal.keys_to_handle().is_empty());
        modal = modal.cancelable(true);
        assert!(!modal.keys_to_handle().is_empty());

        h.window.show_modal(Box::new(modal));
        let top = h.window.top_modal().unwrap();
        {
            let mut modal = top.lock();
            press(&mut modal, KeyCode::Esc);
            modal.handle();
        }
        assert!(!h.window.has_modal());
    }

    #[test]
    fn test_loading_ignores_input() {
        let h = harness();
        let calls = counter();
        let c = Arc::clone(&calls);
        let modal = InfoModal::new().loading(true).positive_button("Go", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            true
        });
        assert!(modal.keys_to_handle().is_empty());

        h.window.show_modal(Box::new(modal));
        let top = h.window.top_modal().unwrap();
        {
            let mut modal = top.lock();
            press(&mut modal, KeyCode::Enter);
            modal.handle();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(h.window.has_modal());
    }

    #[test]
    fn test_layout_draws_title_body_and_actions() {
        let modal = InfoModal::new()
            .title("Could not load accounts")
            .body("bank unavailable")
            .positive_button("Retry", |_| true)
            .negative_button("Exit", |_| {});

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| {
                let mut ctx = DrawContext::new(frame, Instant::now());
                modal.layout(&mut ctx);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Could not load accounts"));
        assert!(text.contains("bank unavailable"));
        assert!(text.contains("Retry"));
        assert!(text.contains("Exit"));
    }
}
