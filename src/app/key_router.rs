//! Routes key presses to whichever layer asked for them on the previous frame.

use crate::nav::{KeySet, WindowNavigator};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use tracing::trace;

/// The layer a key subscription belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyTarget {
    Page(String),
    Modal(String),
}

/// Keys a layer registered for while the last frame was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySubscription {
    pub target: KeyTarget,
    pub keys: KeySet,
}

/// Only the top layer (top modal, else the current page) is ever subscribed,
/// so each key press reaches at most one layer.
#[derive(Debug, Default)]
pub struct KeyRouter {
    subscription: Option<KeySubscription>,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription(&self) -> Option<&KeySubscription> {
        self.subscription.as_ref()
    }

    /// Deliver matching presses from `queue`, in order, to the subscribed
    /// layer if it is still on top. Returns how many presses were delivered.
    pub fn deliver(&self, navigator: &mut WindowNavigator, queue: &[Event]) -> usize {
        let Some(sub) = &self.subscription else {
            return 0;
        };
        let presses: Vec<&KeyEvent> = queue
            .iter()
            .filter_map(|event| match event {
                Event::Key(key) if key.kind == KeyEventKind::Press && sub.keys.contains(key) => {
                    Some(key)
                }
                _ => None,
            })
            .collect();
        if presses.is_empty() {
            return 0;
        }

        if let Some(modal) = navigator.top_modal() {
            if sub.target != KeyTarget::Modal(modal.id().to_string()) {
                trace!(layer = ?sub.target, "key target no longer on top");
                return 0;
            }
            let mut guard = modal.lock();
            let Some(handler) = guard.as_key_handler() else {
                return 0;
            };
            for key in &presses {
                handler.handle_key_press(key);
            }
            return presses.len();
        }

        let Some(page) = navigator.current_page_mut() else {
            return 0;
        };
        if sub.target != KeyTarget::Page(page.id().to_string()) {
            trace!(layer = ?sub.target, "key target no longer current");
            return 0;
        }
        let Some(handler) = page.as_key_handler() else {
            return 0;
        };
        for key in &presses {
            handler.handle_key_press(key);
        }
        presses.len()
    }

    /// Replace the subscription with the keys the top layer wants now. Layers
    /// that are not key handlers, or want no keys, get nothing.
    pub fn register(&mut self, navigator: &mut WindowNavigator) -> Option<&KeySubscription> {
        self.subscription = Self::top_subscription(navigator);
        self.subscription.as_ref()
    }

    fn top_subscription(navigator: &mut WindowNavigator) -> Option<KeySubscription> {
        if let Some(modal) = navigator.top_modal() {
            let mut guard = modal.lock();
            let keys = guard.as_key_handler()?.keys_to_handle();
            return (!keys.is_empty()).then(|| KeySubscription {
                target: KeyTarget::Modal(modal.id().to_string()),
                keys,
            });
        }

        let page = navigator.current_page_mut()?;
        let target = KeyTarget::Page(page.id().to_string());
        let keys = page.as_key_handler()?.keys_to_handle();
        (!keys.is_empty()).then_some(KeySubscription { target, keys })
    }
}
