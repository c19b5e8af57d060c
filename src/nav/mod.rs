//! Navigation core: the page back-stack, the modal overlay stack and the
//! capability contracts that screens implement.
//!
//! Pages and modals are driven only through the trait methods below, in the
//! documented order. Optional behavior (key handling, close notifications) is
//! discovered through typed probes rather than downcasts.

pub mod keys;
pub mod modal_stack;
pub mod navigator;
pub mod page_stack;

#[cfg(test)]
pub(crate) mod testing;

use crate::ui::DrawContext;
use crossterm::event::KeyEvent;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use keys::KeySet;
pub use modal_stack::{ModalEntry, ModalStack};
pub use navigator::{Navigator, WindowHost, WindowNavigator};
pub use page_stack::PageStack;

/// A full-screen navigable unit managed on the back-stack.
///
/// Lifecycle: `on_attached_to_navigator` -> `on_navigated_to` -> repeated
/// `handle_user_interactions` / `layout` while current -> `on_navigated_from`
/// when superseded or popped -> `on_closed` (if [`Closable`]) once the instance
/// is discarded for good.
pub trait Page: Send {
    /// Stable identifier. The back-stack never holds two pages with the same id.
    fn id(&self) -> &str;

    /// Called just before `on_navigated_to`, with the window's navigator.
    fn on_attached_to_navigator(&mut self, navigator: Navigator);

    /// The page is about to be displayed.
    fn on_navigated_to(&mut self);

    /// Called once per frame before `layout` while this page is current.
    fn handle_user_interactions(&mut self);

    /// Draw the page. Must not mutate anything beyond the frame buffer.
    fn layout(&self, ctx: &mut DrawContext<'_, '_>);

    /// The page is no longer displayed. It may be displayed again later, so
    /// state that `on_navigated_to` does not rebuild must survive this call.
    fn on_navigated_from(&mut self);

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        None
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        None
    }
}

/// An overlay displayed above the current page. Not part of the back-stack;
/// several instances with the same id may be shown at once.
pub trait Modal: Send {
    fn id(&self) -> &str;

    /// Called right after the modal is appended, before `on_resume`.
    fn on_attached_to_navigator(&mut self, navigator: Navigator);

    /// Get ready for display. Called before the first `handle`/`layout`.
    fn on_resume(&mut self);

    /// Called once per frame before `layout` while this modal is on top.
    fn handle(&mut self);

    fn layout(&self, ctx: &mut DrawContext<'_, '_>);

    /// The modal was removed from display. It may be shown again, in which
    /// case `on_resume` runs again.
    fn on_dismiss(&mut self);

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        None
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        None
    }
}

/// Implemented by pages and modals that need to clean up when an instance is
/// removed for good.
pub trait Closable {
    fn on_closed(&mut self);
}

/// Implemented by pages and modals that want key press notifications.
pub trait KeyEventHandler {
    /// Key combinations this layer wants to receive on the next frame.
    fn keys_to_handle(&self) -> KeySet;

    /// Called once per matching key press, in the order the presses arrived.
    fn handle_key_press(&mut self, event: &KeyEvent);
}

/// Lock a mutex, carrying on with the inner value if a holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
