use super::{lock, Modal, Navigator};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use tracing::debug;

/// A displayed modal. The id is captured when the modal is shown so the list
/// can be searched without locking individual modals.
#[derive(Clone)]
pub struct ModalEntry {
    id: Arc<str>,
    modal: Arc<Mutex<Box<dyn Modal>>>,
}

impl ModalEntry {
    fn new(modal: Box<dyn Modal>) -> Self {
        Self {
            id: Arc::from(modal.id()),
            modal: Arc::new(Mutex::new(modal)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock the modal to drive it. Never hold this while locking another
    /// entry or calling into the stack from the same thread with `lock`.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Modal>> {
        lock(&self.modal)
    }

    /// `None` when the modal is currently being driven elsewhere.
    fn try_lock(&self) -> Option<MutexGuard<'_, Box<dyn Modal>>> {
        match self.modal.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

fn finish_dismiss(modal: &mut dyn Modal) {
    modal.on_dismiss();
    if let Some(closable) = modal.as_closable() {
        closable.on_closed();
    }
}

/// Insertion-ordered list of displayed modals, safe to mutate from any thread.
///
/// The list lock only ever covers list mutation. Lifecycle callbacks run with
/// the list unlocked so a callback may show or dismiss modals itself.
#[derive(Default)]
pub struct ModalStack {
    entries: Mutex<Vec<ModalEntry>>,
    /// Dismissed modals whose `on_dismiss` could not run because the modal
    /// was busy at the time.
    retired: Mutex<Vec<ModalEntry>>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Ids from the oldest to the most recent modal.
    pub fn ids(&self) -> Vec<String> {
        lock(&self.entries).iter().map(|e| e.id().to_string()).collect()
    }

    pub fn top(&self) -> Option<ModalEntry> {
        lock(&self.entries).last().cloned()
    }

    /// Append `modal` and bring it up. The modal stays locked until
    /// `on_resume` returns so no frame can drive it half-initialized.
    pub fn push(&self, modal: Box<dyn Modal>, navigator: &Navigator) {
        let entry = ModalEntry::new(modal);
        let mut guard = entry.lock();
        lock(&self.entries).push(entry.clone());
        debug!(modal = entry.id(), "showing modal");

        guard.on_attached_to_navigator(navigator.clone());
        guard.on_resume();
    }

    /// Remove the most recently shown modal with `id`.
    pub fn dismiss(&self, id: &str) -> bool {
        let removed = {
            let mut entries = lock(&self.entries);
            entries
                .iter()
                .rposition(|e| e.id() == id)
                .map(|pos| entries.remove(pos))
        };
        let Some(entry) = removed else {
            debug!(modal = id, "no modal to dismiss");
            return false;
        };

        match entry.try_lock() {
            Some(mut modal) => finish_dismiss(&mut **modal),
            None => {
                debug!(modal = id, "modal busy, deferring on_dismiss");
                lock(&self.retired).push(entry.clone());
            }
        }
        true
    }

    /// Run the dismiss notifications that were deferred by [`dismiss`].
    ///
    /// [`dismiss`]: ModalStack::dismiss
    pub fn finish_retired(&self) -> usize {
        let retired = std::mem::take(&mut *lock(&self.retired));
        let count = retired.len();
        for entry in retired {
            finish_dismiss(&mut **entry.lock());
        }
        count
    }
}
