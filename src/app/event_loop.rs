use crate::app::event::{FrameEvent, WindowEvent};
use crate::app::key_router::{KeyRouter, KeySubscription};
use crate::app::shutdown::Shutdown;
use crate::app::window::FrameSource;
use crate::nav::{Page, WindowNavigator};
use crate::ui::{self, DrawContext, Toast};
use anyhow::{Context, Result};
use ratatui::backend::Backend;
use ratatui::layout::Size;
use ratatui::Terminal;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Builds the page shown whenever the back-stack is empty on a frame.
pub type PageFactory = Box<dyn FnMut() -> Box<dyn Page> + Send>;

/// One layer drawn during a frame, bottom first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Background,
    Page { id: String, disabled: bool },
    Modal { id: String },
    Toast,
}

/// What a frame did. Mostly useful to tests and trace logging.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// The initial page was displayed instead of processing input.
    pub bootstrapped: bool,
    pub keys_delivered: usize,
    pub layers: Vec<Layer>,
    pub subscription: Option<KeySubscription>,
}

/// Drives the window: one frame per [`WindowEvent::Frame`], drawing the
/// current page, the top modal and the toast, then re-registering keys.
pub struct EventLoop<B: Backend> {
    terminal: Terminal<B>,
    navigator: WindowNavigator,
    keys: KeyRouter,
    toast: Arc<Toast>,
    initial_page: PageFactory,
    shutdown: Shutdown,
    viewport: Option<Size>,
}

impl<B: Backend> EventLoop<B> {
    pub fn new(
        terminal: Terminal<B>,
        navigator: WindowNavigator,
        toast: Arc<Toast>,
        shutdown: Shutdown,
        initial_page: PageFactory,
    ) -> Self {
        Self {
            terminal,
            navigator,
            keys: KeyRouter::new(),
            toast,
            initial_page,
            shutdown,
            viewport: None,
        }
    }

    pub fn navigator(&self) -> &WindowNavigator {
        &self.navigator
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Process window events until the window is destroyed.
    pub async fn run(&mut self, source: &mut FrameSource) -> Result<()> {
        while let Some(event) = source.next_event().await {
            if self.handle_event(event)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: WindowEvent) -> Result<ControlFlow<()>> {
        match event {
            WindowEvent::Frame(frame) => {
                let report = self.handle_frame(frame)?;
                debug!(
                    bootstrapped = report.bootstrapped,
                    keys = report.keys_delivered,
                    layers = report.layers.len(),
                    "frame drawn"
                );
                Ok(ControlFlow::Continue(()))
            }
            WindowEvent::Wake => {
                // Changes ask for their own redraw.
                let applied = self.navigator.apply_pending();
                debug!(applied, "applied queued page requests");
                Ok(ControlFlow::Continue(()))
            }
            WindowEvent::Stage(stage) => {
                debug!(?stage, "ignoring stage event");
                Ok(ControlFlow::Continue(()))
            }
            WindowEvent::Destroy => {
                info!("window destroyed, shutting down");
                self.shutdown.trigger();
                self.navigator.close_all_pages();
                Ok(ControlFlow::Break(()))
            }
        }
    }

    pub fn handle_frame(&mut self, frame: FrameEvent) -> Result<FrameReport> {
        let mut report = FrameReport::default();
        if self.viewport != Some(frame.size) {
            debug!(width = frame.size.width, height = frame.size.height, "viewport changed");
            self.viewport = Some(frame.size);
        }

        self.navigator.apply_pending();
        if self.navigator.current_page().is_none() {
            let page = (self.initial_page)();
            info!(page = page.id(), "no page to show, displaying initial page");
            self.navigator.display(page);
            report.bootstrapped = true;
        } else {
            report.keys_delivered = self.keys.deliver(&mut self.navigator, &frame.queue);
            if let Some(page) = self.navigator.current_page_mut() {
                page.handle_user_interactions();
            }
            if let Some(modal) = self.navigator.top_modal() {
                modal.lock().handle();
            }
            self.navigator.finish_retired_modals();
            self.navigator.apply_pending();
        }

        report.layers = self.draw(frame.now)?;
        report.subscription = self.keys.register(&mut self.navigator).cloned();
        Ok(report)
    }

    fn draw(&mut self, now: Instant) -> Result<Vec<Layer>> {
        let Self {
            terminal,
            navigator,
            toast,
            ..
        } = self;
        let mut layers = Vec::with_capacity(4);

        terminal
            .draw(|frame| {
                let mut ctx = DrawContext::new(frame, now);
                let full = ctx.area;
                ui::fill_background(&mut ctx);
                layers.push(Layer::Background);

                let top_modal = navigator.top_modal();
                if let Some(page) = navigator.current_page() {
                    ctx.set_disabled(top_modal.is_some());
                    page.layout(&mut ctx);
                    layers.push(Layer::Page {
                        id: page.id().to_string(),
                        disabled: ctx.disabled(),
                    });
                    ctx.set_disabled(false);
                    ctx.area = full;
                }

                if let Some(modal) = &top_modal {
                    modal.lock().layout(&mut ctx);
                    layers.push(Layer::Modal {
                        id: modal.id().to_string(),
                    });
                    ctx.area = full;
                }

                if toast.layout(&mut ctx) {
                    layers.push(Layer::Toast);
                }
            })
            .context("failed to draw frame")?;

        Ok(layers)
    }
}
