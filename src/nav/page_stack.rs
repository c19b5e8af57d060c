use super::{Navigator, Page};
use tracing::debug;

struct Entry {
    page: Box<dyn Page>,
    /// Whether the page has been navigated to and not navigated from since.
    displayed: bool,
}

impl Entry {
    fn navigate_to(&mut self) {
        self.page.on_navigated_to();
        self.displayed = true;
    }

    fn navigate_from(&mut self) {
        if self.displayed {
            self.displayed = false;
            self.page.on_navigated_from();
        }
    }

    fn close(mut self) {
        self.navigate_from();
        if let Some(closable) = self.page.as_closable() {
            closable.on_closed();
        }
    }
}

/// Ordered back-stack of pages. The last entry is the current page.
///
/// Each operation reports whether the stack changed so the caller can decide
/// whether to redraw.
pub struct PageStack {
    name: String,
    entries: Vec<Entry>,
}

impl PageStack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&dyn Page> {
        self.entries.last().map(|e| &*e.page)
    }

    pub fn top_mut(&mut self) -> Option<&mut (dyn Page + 'static)> {
        self.entries.last_mut().map(|e| &mut *e.page)
    }

    pub fn top_id(&self) -> Option<&str> {
        self.entries.last().map(|e| e.page.id())
    }

    /// Page ids from bottom to top.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.page.id().to_string()).collect()
    }

    /// Display `page` on top of the stack.
    ///
    /// Pushing the page that is already on top does nothing. Any other instance
    /// with the same id is closed and removed first, so an id appears at most
    /// once in the stack.
    pub fn push(&mut self, mut page: Box<dyn Page>, navigator: &Navigator) -> bool {
        if self.top_id() == Some(page.id()) {
            debug!(stack = %self.name, page = page.id(), "page already on top");
            return false;
        }

        let id = page.id().to_string();
        let mut i = self.entries.len();
        while i > 0 {
            i -= 1;
            if self.entries[i].page.id() == id {
                debug!(stack = %self.name, page = %id, "closing previous instance");
                self.entries.remove(i).close();
            }
        }

        if let Some(top) = self.entries.last_mut() {
            top.navigate_from();
        }

        page.on_attached_to_navigator(navigator.clone());
        self.entries.push(Entry {
            page,
            displayed: false,
        });
        if let Some(top) = self.entries.last_mut() {
            top.navigate_to();
        }
        debug!(stack = %self.name, page = %id, depth = self.entries.len(), "pushed page");
        true
    }

    /// Close the current page. The page underneath becomes current again
    /// without another `on_navigated_to`, and is navigated from once more when
    /// it is later covered or closed.
    pub fn pop(&mut self) -> bool {
        match self.entries.pop() {
            Some(entry) => {
                debug!(stack = %self.name, page = entry.page.id(), "popped page");
                entry.close();
                if let Some(top) = self.entries.last_mut() {
                    top.displayed = true;
                }
                true
            }
            None => false,
        }
    }

    /// Close every page above the topmost page with `keep_id`. Nothing happens
    /// when no such page exists. Returns whether any page was closed.
    pub fn pop_after(&mut self, keep_id: &str) -> bool {
        let Some(pos) = self.entries.iter().rposition(|e| e.page.id() == keep_id) else {
            debug!(stack = %self.name, page = keep_id, "pop_after target not in stack");
            return false;
        };

        let count = self.entries.len() - 1 - pos;
        for _ in 0..count {
            self.pop();
        }
        count > 0
    }

    /// Close every page, top to bottom, then display `replacement` if given.
    pub fn reset(&mut self, replacement: Option<Box<dyn Page>>, navigator: &Navigator) -> bool {
        let mut changed = false;
        while self.pop() {
            changed = true;
        }
        if let Some(page) = replacement {
            changed |= self.push(page, navigator);
        }
        changed
    }
}
