//! Recording pages, modals and hosts shared by the navigation tests.

use super::{
    lock, Closable, KeyEventHandler, KeySet, Modal, ModalStack, Navigator, Page, WindowHost,
    WindowNavigator,
};
use crate::app::shutdown::Shutdown;
use crate::ui::DrawContext;
use crossterm::event::KeyEvent;
use ratatui::widgets::Paragraph;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        lock(&self.0).push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.0))
    }

    pub fn clear(&self) {
        lock(&self.0).clear();
    }
}

#[derive(Default)]
pub struct CountingHost {
    invalidations: AtomicUsize,
    wakes: AtomicUsize,
    closes: AtomicUsize,
}

impl CountingHost {
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn wakes(&self) -> usize {
        self.wakes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.invalidations.store(0, Ordering::SeqCst);
        self.wakes.store(0, Ordering::SeqCst);
    }
}

impl WindowHost for CountingHost {
    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    fn wake(&self) {
        self.wakes.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub host: Arc<CountingHost>,
    pub shutdown: Shutdown,
    pub window: WindowNavigator,
    pub navigator: Navigator,
    pub modals: Arc<ModalStack>,
}

pub fn harness() -> Harness {
    let host = Arc::new(CountingHost::default());
    let shutdown = Shutdown::new();
    let window = WindowNavigator::new(host.clone(), shutdown.clone());
    Harness {
        navigator: window.navigator(),
        modals: window.modal_stack(),
        host,
        shutdown,
        window,
    }
}

type NavHook = Box<dyn Fn(&Navigator) + Send>;

pub struct TestPage {
    id: String,
    log: EventLog,
    closable: bool,
    keys: Option<KeySet>,
    on_key: Option<NavHook>,
    navigator: Option<Navigator>,
}

impl TestPage {
    pub fn new(id: &str, log: &EventLog) -> Self {
        Self {
            id: id.to_string(),
            log: log.clone(),
            closable: false,
            keys: None,
            on_key: None,
            navigator: None,
        }
    }

    pub fn boxed(id: &str, log: &EventLog) -> Box<dyn Page> {
        Box::new(Self::new(id, log))
    }

    pub fn closable(id: &str, log: &EventLog) -> Box<dyn Page> {
        let mut page = Self::new(id, log);
        page.closable = true;
        Box::new(page)
    }

    pub fn keys(mut self, keys: &str) -> Self {
        self.keys = Some(keys.parse().unwrap());
        self
    }

    pub fn on_key(mut self, hook: impl Fn(&Navigator) + Send + 'static) -> Self {
        self.on_key = Some(Box::new(hook));
        self
    }

    fn record(&self, event: &str) {
        self.log.push(format!("{}:{}", self.id, event));
    }
}

impl Page for TestPage {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_attached_to_navigator(&mut self, navigator: Navigator) {
        self.navigator = Some(navigator);
        self.record("attached");
    }

    fn on_navigated_to(&mut self) {
        self.record("navigated_to");
    }

    fn handle_user_interactions(&mut self) {
        self.record("interact");
    }

    fn layout(&self, ctx: &mut DrawContext<'_, '_>) {
        if ctx.disabled() {
            self.record("layout(disabled)");
        } else {
            self.record("layout");
        }
        let area = ctx.area;
        ctx.render_widget(Paragraph::new(self.id.as_str()), area);
    }

    fn on_navigated_from(&mut self) {
        self.record("navigated_from");
    }

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        if self.keys.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        if self.closable {
            Some(self)
        } else {
            None
        }
    }
}

impl KeyEventHandler for TestPage {
    fn keys_to_handle(&self) -> KeySet {
        self.keys.clone().unwrap_or_default()
    }

    fn handle_key_press(&mut self, event: &KeyEvent) {
        self.record(&format!("key:{:?}", event.code));
        if let (Some(hook), Some(nav)) = (&self.on_key, &self.navigator) {
            hook(nav);
        }
    }
}

impl Closable for TestPage {
    fn on_closed(&mut self) {
        self.record("closed");
    }
}

pub struct TestModal {
    id: String,
    label: String,
    log: EventLog,
    closable: bool,
    keys: Option<KeySet>,
}

impl TestModal {
    pub fn new(id: &str, label: &str, log: &EventLog) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            log: log.clone(),
            closable: false,
            keys: None,
        }
    }

    pub fn boxed(id: &str, label: &str, log: &EventLog) -> Box<dyn Modal> {
        Box::new(Self::new(id, label, log))
    }

    pub fn closable(id: &str, label: &str, log: &EventLog) -> Box<dyn Modal> {
        let mut modal = Self::new(id, label, log);
        modal.closable = true;
        Box::new(modal)
    }

    pub fn keys(mut self, keys: &str) -> Self {
        self.keys = Some(keys.parse().unwrap());
        self
    }

    fn record(&self, event: &str) {
        self.log.push(format!("{}:{}", self.label, event));
    }
}

impl Modal for TestModal {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_attached_to_navigator(&mut self, _navigator: Navigator) {
        self.record("attached");
    }

    fn on_resume(&mut self) {
        self.record("resumed");
    }

    fn handle(&mut self) {
        self.record("handle");
    }

    fn layout(&self, ctx: &mut DrawContext<'_, '_>) {
        self.record("layout");
        let area = ctx.area;
        ctx.render_widget(Paragraph::new(self.label.as_str()), area);
    }

    fn on_dismiss(&mut self) {
        self.record("dismissed");
    }

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        if self.keys.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        if self.closable {
            Some(self)
        } else {
            None
        }
    }
}

impl KeyEventHandler for TestModal {
    fn keys_to_handle(&self) -> KeySet {
        self.keys.clone().unwrap_or_default()
    }

    fn handle_key_press(&mut self, event: &KeyEvent) {
        self.record(&format!("key:{:?}", event.code));
    }
}

impl Closable for TestModal {
    fn on_closed(&mut self) {
        self.record("closed");
    }
}

/// Dismisses itself from inside `handle`, like a modal reacting to its own
/// button.
pub struct SelfDismissModal {
    id: String,
    log: EventLog,
    navigator: Option<Navigator>,
}

impl SelfDismissModal {
    pub fn boxed(id: &str, log: &EventLog) -> Box<dyn Modal> {
        Box::new(Self {
            id: id.to_string(),
            log: log.clone(),
            navigator: None,
        })
    }
}

impl Modal for SelfDismissModal {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_attached_to_navigator(&mut self, navigator: Navigator) {
        self.navigator = Some(navigator);
    }

    fn on_resume(&mut self) {}

    fn handle(&mut self) {
        self.log.push(format!("{}:handle", self.id));
        if let Some(nav) = &self.navigator {
            nav.dismiss_modal(&self.id);
        }
    }

    fn layout(&self, _ctx: &mut DrawContext<'_, '_>) {}

    fn on_dismiss(&mut self) {
        self.log.push(format!("{}:dismissed", self.id));
    }
}
