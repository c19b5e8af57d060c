use super::{Modal, ModalEntry, ModalStack, Page, PageStack};
use crate::app::shutdown::Shutdown;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// The hosting window, as seen by the navigation core.
pub trait WindowHost: Send + Sync {
    /// Request that the next frame be rendered. Implementations coalesce
    /// repeated calls into a single pending request.
    fn invalidate(&self);

    /// Ask the host to run the event loop so queued page requests get applied.
    /// Waking does not draw a frame by itself.
    fn wake(&self);

    /// Ask the host to close the window. The host answers with `Destroy`.
    fn close(&self);
}

/// Page navigation queued by a [`Navigator`] handle, applied on the event loop.
enum PageRequest {
    Display(Box<dyn Page>),
    CloseCurrent,
    CloseAfter(String),
    ClearAndDisplay(Box<dyn Page>),
    CloseAll,
}

impl PageRequest {
    fn name(&self) -> &'static str {
        match self {
            PageRequest::Display(_) => "display",
            PageRequest::CloseCurrent => "close_current_page",
            PageRequest::CloseAfter(_) => "close_pages_after",
            PageRequest::ClearAndDisplay(_) => "clear_stack_and_display",
            PageRequest::CloseAll => "close_all_pages",
        }
    }
}

/// Handle to the window navigator, given to every page and modal when it is
/// attached and safe to use from any thread.
///
/// Modals are shown and dismissed immediately through the lock-protected
/// modal stack. Page changes are queued and applied by the event loop before
/// the next draw. Once the window is shutting down every request is dropped.
#[derive(Clone)]
pub struct Navigator {
    requests: mpsc::UnboundedSender<PageRequest>,
    modals: Arc<ModalStack>,
    host: Arc<dyn WindowHost>,
    shutdown: Shutdown,
}

impl Navigator {
    pub fn display(&self, page: impl Page + 'static) {
        self.request(PageRequest::Display(Box::new(page)));
    }

    pub fn close_current_page(&self) {
        self.request(PageRequest::CloseCurrent);
    }

    pub fn close_pages_after(&self, keep_id: &str) {
        self.request(PageRequest::CloseAfter(keep_id.to_string()));
    }

    pub fn clear_stack_and_display(&self, page: impl Page + 'static) {
        self.request(PageRequest::ClearAndDisplay(Box::new(page)));
    }

    pub fn close_all_pages(&self) {
        self.request(PageRequest::CloseAll);
    }

    pub fn show_modal(&self, modal: impl Modal + 'static) {
        if self.refuse("show_modal") {
            return;
        }
        self.modals.push(Box::new(modal), self);
        self.host.invalidate();
    }

    /// Dismiss the most recently shown modal with `id`.
    pub fn dismiss_modal(&self, id: &str) -> bool {
        if self.refuse("dismiss_modal") {
            return false;
        }
        let dismissed = self.modals.dismiss(id);
        if dismissed {
            self.host.invalidate();
        }
        dismissed
    }

    pub fn top_modal_id(&self) -> Option<String> {
        self.modals.top().map(|m| m.id().to_string())
    }

    pub fn reload(&self) {
        self.host.invalidate();
    }

    pub fn close_window(&self) {
        self.host.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    fn refuse(&self, op: &str) -> bool {
        if self.shutdown.is_triggered() {
            debug!(op, "window closing, ignoring navigation request");
            return true;
        }
        false
    }

    fn request(&self, request: PageRequest) {
        if self.refuse(request.name()) {
            return;
        }
        if self.requests.send(request).is_err() {
            debug!("window navigator is gone, dropping page request");
            return;
        }
        self.host.wake();
    }
}

/// Root navigator of the window: the page back-stack plus the modal stack.
///
/// Owned by the event loop. Every mutator asks the host for exactly one
/// redraw when it changes something and none otherwise.
pub struct WindowNavigator {
    pages: PageStack,
    modals: Arc<ModalStack>,
    requests: mpsc::UnboundedReceiver<PageRequest>,
    navigator: Navigator,
}

impl WindowNavigator {
    pub fn new(host: Arc<dyn WindowHost>, shutdown: Shutdown) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let modals = Arc::new(ModalStack::new());
        Self {
            pages: PageStack::new("main window"),
            modals: Arc::clone(&modals),
            requests: rx,
            navigator: Navigator {
                requests: tx,
                modals,
                host,
                shutdown,
            },
        }
    }

    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    pub fn current_page(&self) -> Option<&dyn Page> {
        self.pages.top()
    }

    pub fn current_page_mut(&mut self) -> Option<&mut (dyn Page + 'static)> {
        self.pages.top_mut()
    }

    pub fn current_page_id(&self) -> Option<&str> {
        self.pages.top_id()
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.pages.ids()
    }

    pub fn display(&mut self, page: Box<dyn Page>) -> bool {
        let changed = self.pages.push(page, &self.navigator);
        self.reload_if(changed)
    }

    pub fn close_current_page(&mut self) -> bool {
        let changed = self.pages.pop();
        self.reload_if(changed)
    }

    pub fn close_pages_after(&mut self, keep_id: &str) -> bool {
        let changed = self.pages.pop_after(keep_id);
        self.reload_if(changed)
    }

    pub fn clear_stack_and_display(&mut self, page: Box<dyn Page>) -> bool {
        let changed = self.pages.reset(Some(page), &self.navigator);
        self.reload_if(changed)
    }

    pub fn close_all_pages(&mut self) -> bool {
        let changed = self.pages.reset(None, &self.navigator);
        self.reload_if(changed)
    }

    pub fn show_modal(&self, modal: Box<dyn Modal>) {
        self.modals.push(modal, &self.navigator);
        self.navigator.host.invalidate();
    }

    pub fn dismiss_modal(&self, id: &str) -> bool {
        let dismissed = self.modals.dismiss(id);
        self.reload_if(dismissed)
    }

    pub fn top_modal(&self) -> Option<ModalEntry> {
        self.modals.top()
    }

    pub fn has_modal(&self) -> bool {
        !self.modals.is_empty()
    }

    pub fn modal_ids(&self) -> Vec<String> {
        self.modals.ids()
    }

    #[cfg(test)]
    pub(crate) fn modal_stack(&self) -> Arc<ModalStack> {
        Arc::clone(&self.modals)
    }

    /// Run dismiss notifications deferred because the modal was busy.
    pub fn finish_retired_modals(&self) -> usize {
        self.modals.finish_retired()
    }

    /// Apply page requests queued through [`Navigator`] handles, in order.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(request) = self.requests.try_recv() {
            debug!(op = request.name(), "applying queued page request");
            match request {
                PageRequest::Display(page) => self.display(page),
                PageRequest::CloseCurrent => self.close_current_page(),
                PageRequest::CloseAfter(id) => self.close_pages_after(&id),
                PageRequest::ClearAndDisplay(page) => self.clear_stack_and_display(page),
                PageRequest::CloseAll => self.close_all_pages(),
            };
            applied += 1;
        }
        applied
    }

    fn reload_if(&self, changed: bool) -> bool {
        if changed {
            self.navigator.host.invalidate();
        }
        changed
    }
}
