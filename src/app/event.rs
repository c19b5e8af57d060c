use crossterm::event::Event as CrosstermEvent;
use ratatui::layout::Size;
use std::time::Instant;

/// Raw events posted to the window host.
#[derive(Debug)]
pub enum HostEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Something asked for the window to be redrawn
    Reload,

    /// Page requests were queued through a navigator handle
    Wake,

    /// The window should close
    Close,
}

/// Ordered events consumed by the event loop. Exactly one `Destroy` is ever
/// produced and it ends the sequence.
#[derive(Debug)]
pub enum WindowEvent {
    /// Draw a new frame
    Frame(FrameEvent),

    /// Apply queued page requests without drawing
    Wake,

    /// Window state changes the loop does not act on
    Stage(StageEvent),

    /// The window is going away
    Destroy,
}

#[derive(Debug)]
pub struct FrameEvent {
    /// Input received since the previous frame, in arrival order.
    pub queue: Vec<CrosstermEvent>,
    pub size: Size,
    pub now: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Focused,
    Unfocused,
}
