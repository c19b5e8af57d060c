//! Terminal window host: turns raw terminal input and redraw requests into the
//! ordered [`WindowEvent`] stream the event loop consumes.

use crate::app::event::{FrameEvent, HostEvent, StageEvent, WindowEvent};
use crate::nav::WindowHost;
use crossterm::event::{Event as CrosstermEvent, EventStream};
use futures::StreamExt;
use ratatui::layout::Size;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// [`WindowHost`] backed by the host event channel. Redraw requests are
/// coalesced: at most one `Reload` is in flight until the next frame goes out.
/// Wake requests are coalesced the same way until the next frame or wake.
pub struct TerminalHost {
    tx: mpsc::UnboundedSender<HostEvent>,
    reload_pending: Arc<AtomicBool>,
    wake_pending: Arc<AtomicBool>,
}

impl WindowHost for TerminalHost {
    fn invalidate(&self) {
        if !self.reload_pending.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(HostEvent::Reload);
        }
    }

    fn wake(&self) {
        if !self.wake_pending.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(HostEvent::Wake);
        }
    }

    fn close(&self) {
        let _ = self.tx.send(HostEvent::Close);
    }
}

/// Produces [`WindowEvent`]s from host events.
pub struct FrameSource {
    rx: mpsc::UnboundedReceiver<HostEvent>,
    reload_pending: Arc<AtomicBool>,
    wake_pending: Arc<AtomicBool>,
    queue: Vec<CrosstermEvent>,
    /// Event that ended a batch, to be handled on the next call.
    held: Option<HostEvent>,
    size: Size,
    destroyed: bool,
}

/// Create a connected host and frame source for a window of `size`. The
/// returned sender feeds terminal input into the source.
pub fn window(size: Size) -> (Arc<TerminalHost>, FrameSource, mpsc::UnboundedSender<HostEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let reload_pending = Arc::new(AtomicBool::new(false));
    let wake_pending = Arc::new(AtomicBool::new(false));
    let host = Arc::new(TerminalHost {
        tx: tx.clone(),
        reload_pending: Arc::clone(&reload_pending),
        wake_pending: Arc::clone(&wake_pending),
    });
    let source = FrameSource {
        rx,
        reload_pending,
        wake_pending,
        queue: Vec::new(),
        held: None,
        size,
        destroyed: false,
    };
    (host, source, tx)
}

enum Absorbed {
    Frame,
    Wake,
    Stage(StageEvent),
    Close,
}

fn starts_frame(event: &HostEvent) -> bool {
    !matches!(
        event,
        HostEvent::Close
            | HostEvent::Terminal(CrosstermEvent::FocusGained)
            | HostEvent::Terminal(CrosstermEvent::FocusLost)
    )
}

impl FrameSource {
    /// Wait for the next window event. Input that is already waiting is
    /// batched into a single frame, and a wake arriving behind it is folded
    /// into that frame. Returns `None` after `Destroy`.
    pub async fn next_event(&mut self) -> Option<WindowEvent> {
        if self.destroyed {
            return None;
        }

        let first = match self.held.take() {
            Some(event) => event,
            None => match self.rx.recv().await {
                Some(event) => event,
                None => {
                    debug!("host channel closed");
                    self.destroyed = true;
                    return Some(WindowEvent::Destroy);
                }
            },
        };

        match self.absorb(first) {
            Absorbed::Frame => {}
            Absorbed::Wake => {
                self.wake_pending.store(false, Ordering::Release);
                return Some(WindowEvent::Wake);
            }
            Absorbed::Stage(stage) => return Some(WindowEvent::Stage(stage)),
            Absorbed::Close => {
                self.destroyed = true;
                return Some(WindowEvent::Destroy);
            }
        }

        while let Ok(event) = self.rx.try_recv() {
            if !starts_frame(&event) {
                self.held = Some(event);
                break;
            }
            self.absorb(event);
        }

        // A frame applies queued page requests too.
        self.wake_pending.store(false, Ordering::Release);
        self.reload_pending.store(false, Ordering::Release);
        Some(WindowEvent::Frame(FrameEvent {
            queue: std::mem::take(&mut self.queue),
            size: self.size,
            now: Instant::now(),
        }))
    }

    fn absorb(&mut self, event: HostEvent) -> Absorbed {
        match event {
            HostEvent::Terminal(CrosstermEvent::FocusGained) => Absorbed::Stage(StageEvent::Focused),
            HostEvent::Terminal(CrosstermEvent::FocusLost) => {
                Absorbed::Stage(StageEvent::Unfocused)
            }
            HostEvent::Terminal(event) => {
                if let CrosstermEvent::Resize(width, height) = event {
                    self.size = Size::new(width, height);
                }
                self.queue.push(event);
                Absorbed::Frame
            }
            HostEvent::Reload => Absorbed::Frame,
            HostEvent::Wake => Absorbed::Wake,
            HostEvent::Close => Absorbed::Close,
        }
    }
}

/// Forward terminal input into the host channel until either side goes away.
pub fn spawn_input_pump(tx: mpsc::UnboundedSender<HostEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if tx.send(HostEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input failed");
                    let _ = tx.send(HostEvent::Close);
                    break;
                }
                None => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> HostEvent {
        HostEvent::Terminal(CrosstermEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
    }

    #[tokio::test]
    async fn test_reloads_coalesce() {
        let (host, mut source, _tx) = window(Size::new(80, 24));
        host.invalidate();
        host.invalidate();
        host.invalidate();

        match source.next_event().await {
            Some(WindowEvent::Frame(frame)) => assert!(frame.queue.is_empty()),
            other => panic!("expected frame, got {:?}", other),
        }
        assert!(source.rx.try_recv().is_err());

        // The frame went out, so the next request goes through again.
        host.invalidate();
        assert!(matches!(source.rx.try_recv(), Ok(HostEvent::Reload)));
    }

    #[tokio::test]
    async fn test_wake_is_not_a_frame() {
        let (host, mut source, _tx) = window(Size::new(80, 24));
        host.wake();
        host.wake();

        assert!(matches!(source.next_event().await, Some(WindowEvent::Wake)));
        assert!(source.rx.try_recv().is_err());

        // A wake behind a reload rides along with the frame.
        host.invalidate();
        host.wake();
        assert!(matches!(source.next_event().await, Some(WindowEvent::Frame(_))));
        assert!(source.rx.try_recv().is_err());
        host.wake();
        assert!(matches!(source.rx.try_recv(), Ok(HostEvent::Wake)));
    }

    #[tokio::test]
    async fn test_input_is_batched_and_close_comes_last() {
        let (host, mut source, tx) = window(Size::new(80, 24));
        tx.send(key('a')).unwrap();
        tx.send(key('b')).unwrap();
        tx.send(HostEvent::Terminal(CrosstermEvent::Resize(100, 30)))
            .unwrap();
        host.close();
        tx.send(key('c')).unwrap();

        match source.next_event().await {
            Some(WindowEvent::Frame(frame)) => {
                assert_eq!(frame.queue.len(), 3);
                assert_eq!(frame.size, Size::new(100, 30));
            }
            other => panic!("expected frame, got {:?}", other),
        }
        assert!(matches!(source.next_event().await, Some(WindowEvent::Destroy)));
        assert!(source.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_focus_changes_are_stage_events() {
        let (_host, mut source, tx) = window(Size::new(80, 24));
        tx.send(key('a')).unwrap();
        tx.send(HostEvent::Terminal(CrosstermEvent::FocusLost)).unwrap();

        assert!(matches!(source.next_event().await, Some(WindowEvent::Frame(_))));
        assert!(matches!(
            source.next_event().await,
            Some(WindowEvent::Stage(StageEvent::Unfocused))
        ));
    }

    #[tokio::test]
    async fn test_closed_channel_destroys_once() {
        let (host, mut source, tx) = window(Size::new(80, 24));
        drop(host);
        drop(tx);
        assert!(matches!(source.next_event().await, Some(WindowEvent::Destroy)));
        assert!(source.next_event().await.is_none());
    }
}
