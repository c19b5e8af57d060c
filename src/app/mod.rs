//! Window plumbing: the host event source, the frame-driven event loop, key
//! routing and the shutdown signal shared with background work.

pub mod event;
pub mod event_loop;
pub mod key_router;
pub mod shutdown;
pub mod window;
