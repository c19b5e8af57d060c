//! First screen: fetches the account list and lets the user pick one.

use super::{key_hint, render_header, render_help_bar, AccountPage, Load};
use crate::nav::{lock, Closable, KeyEventHandler, KeySet, Navigator, Page};
use crate::ui::layout::compute_layout;
use crate::ui::modal::InfoModal;
use crate::ui::theme::Theme;
use crate::ui::toast::ToastDuration;
use crate::ui::DrawContext;
use crate::wallet::retry::{retry, Attempt, RetryError};
use crate::wallet::Account;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const START_PAGE_ID: &str = "start_page";
pub const LOADING_MODAL_ID: &str = "start_page.loading";
pub const ERROR_MODAL_ID: &str = "start_page.error";

#[derive(Debug, Clone, PartialEq)]
enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

struct Accounts {
    list: Vec<Account>,
    status: FetchStatus,
}

/// Runs the account fetch in the background and reports through modals,
/// the toast and the shared account list.
#[derive(Clone)]
struct Fetcher {
    load: Load,
    navigator: Navigator,
    accounts: Arc<Mutex<Accounts>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Fetcher {
    fn start(&self) {
        if self.navigator.is_shut_down() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime, cannot fetch accounts");
            lock(&self.accounts).status = FetchStatus::Failed("no async runtime".into());
            return;
        };

        lock(&self.accounts).status = FetchStatus::Loading;
        self.navigator.show_modal(
            InfoModal::new()
                .with_id(LOADING_MODAL_ID)
                .title("Loading accounts")
                .body("Fetching your accounts from the bank.")
                .loading(true)
                .cancelable(false),
        );

        let fetcher = self.clone();
        let task = runtime.spawn(async move { fetcher.run().await });
        if let Some(previous) = lock(&self.task).replace(task) {
            previous.abort();
        }
    }

    async fn run(self) {
        let wallet_config = &self.load.config.wallet;
        let result = retry(
            wallet_config.retry_attempts,
            Duration::from_millis(wallet_config.retry_delay_ms),
            self.navigator.shutdown(),
            |attempt| {
                let wallet = Arc::clone(&self.load.wallet);
                let toast = Arc::clone(&self.load.toast);
                async move {
                    debug!(attempt, "fetching accounts");
                    wallet.fetch_accounts().await.map_err(|e| {
                        warn!(attempt, error = %e, "fetching accounts failed");
                        toast.notify_error(e.to_string(), ToastDuration::Short);
                        if e.is_permanent() {
                            Attempt::Stop(e)
                        } else {
                            Attempt::Retry(e)
                        }
                    })
                }
            },
        )
        .await;

        match result {
            Ok(list) => {
                info!(count = list.len(), "accounts loaded");
                {
                    let mut accounts = lock(&self.accounts);
                    accounts.list = list;
                    accounts.status = FetchStatus::Loaded;
                }
                self.navigator.dismiss_modal(LOADING_MODAL_ID);
            }
            Err(RetryError::Cancelled) => debug!("account fetch cancelled"),
            Err(e) => {
                let message = e.to_string();
                lock(&self.accounts).status = FetchStatus::Failed(message.clone());
                self.navigator.dismiss_modal(LOADING_MODAL_ID);
                self.load
                    .toast
                    .notify_error(format!("Could not load accounts: {}", message), ToastDuration::Long);
                self.show_error(message);
            }
        }
    }

    fn show_error(&self, message: String) {
        let fetcher = self.clone();
        self.navigator.show_modal(
            InfoModal::new()
                .with_id(ERROR_MODAL_ID)
                .title("Could not load accounts")
                .body(message)
                .cancelable(false)
                .positive_button("Retry", move |_| {
                    fetcher.start();
                    true
                })
                .negative_button("Exit", |nav| nav.close_window()),
        );
    }

    fn abort(&self) {
        if let Some(task) = lock(&self.task).take() {
            debug!("aborting account fetch");
            task.abort();
        }
        self.navigator.dismiss_modal(LOADING_MODAL_ID);
    }
}

pub struct StartPage {
    load: Load,
    accounts: Arc<Mutex<Accounts>>,
    fetcher: Option<Fetcher>,
    navigator: Option<Navigator>,
    selected: usize,
    open_requested: bool,
}

impl StartPage {
    pub fn new(load: Load) -> Self {
        Self {
            load,
            accounts: Arc::new(Mutex::new(Accounts {
                list: Vec::new(),
                status: FetchStatus::Idle,
            })),
            fetcher: None,
            navigator: None,
            selected: 0,
            open_requested: false,
        }
    }

    fn account_count(&self) -> usize {
        lock(&self.accounts).list.len()
    }
}

impl Page for StartPage {
    fn id(&self) -> &str {
        START_PAGE_ID
    }

    fn on_attached_to_navigator(&mut self, navigator: Navigator) {
        self.fetcher = Some(Fetcher {
            load: self.load.clone(),
            navigator: navigator.clone(),
            accounts: Arc::clone(&self.accounts),
            task: Arc::new(Mutex::new(None)),
        });
        self.navigator = Some(navigator);
    }

    fn on_navigated_to(&mut self) {
        if lock(&self.accounts).status != FetchStatus::Idle {
            return;
        }
        if let Some(fetcher) = &self.fetcher {
            fetcher.start();
        }
    }

    fn handle_user_interactions(&mut self) {
        if !std::mem::take(&mut self.open_requested) {
            return;
        }
        let account = lock(&self.accounts).list.get(self.selected).cloned();
        if let (Some(account), Some(navigator)) = (account, &self.navigator) {
            debug!(account = %account.id, "opening account");
            navigator.display(AccountPage::new(self.load.clone(), account));
        }
    }

    fn layout(&self, ctx: &mut DrawContext<'_, '_>) {
        let layout = compute_layout(ctx.area, self.load.config.ui.show_help_bar);
        render_header(ctx, layout.header, "crabwallet", "Your accounts");

        let accounts = lock(&self.accounts);
        let body = layout.body.inner(Margin::new(2, 1));
        match &accounts.status {
            FetchStatus::Idle | FetchStatus::Loading => {
                ctx.render_widget(
                    Paragraph::new("Loading accounts…")
                        .alignment(Alignment::Center)
                        .style(ctx.style(Theme::muted())),
                    body,
                );
            }
            FetchStatus::Failed(message) => {
                ctx.render_widget(
                    Paragraph::new(format!("Could not load accounts: {}", message))
                        .alignment(Alignment::Center)
                        .style(ctx.style(Theme::muted())),
                    body,
                );
            }
            FetchStatus::Loaded => {
                let items: Vec<ListItem> = accounts
                    .list
                    .iter()
                    .map(|account| {
                        ListItem::new(Line::from(vec![
                            Span::styled(format!("{:<24}", account.label()), ctx.style(Theme::text())),
                            Span::styled(
                                format!("{:<12}", account.account_number),
                                ctx.style(Theme::muted()),
                            ),
                            Span::styled(
                                format!("£{:>12.2}", account.balance),
                                ctx.style(Theme::amount(account.balance)),
                            ),
                        ]))
                    })
                    .collect();
                let list = List::new(items)
                    .highlight_style(ctx.style(Theme::selected()))
                    .highlight_symbol("› ");
                let mut state = ListState::default().with_selected(Some(self.selected));
                ctx.render_stateful_widget(list, body, &mut state);
            }
        }
        drop(accounts);

        let keys = &self.load.keys;
        render_help_bar(
            ctx,
            layout.help_bar,
            &[
                (format!("{}/{}", key_hint(&keys.up), key_hint(&keys.down)), "Select"),
                (key_hint(&keys.select), "Open"),
                (key_hint(&keys.quit), "Quit"),
            ],
        );
    }

    fn on_navigated_from(&mut self) {}

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        Some(self)
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        Some(self)
    }
}

impl KeyEventHandler for StartPage {
    fn keys_to_handle(&self) -> KeySet {
        let keys = &self.load.keys;
        let mut set = keys.quit.clone();
        if self.account_count() > 0 {
            set = set.union(&keys.up).union(&keys.down).union(&keys.select);
        }
        set
    }

    fn handle_key_press(&mut self, event: &KeyEvent) {
        let keys = Arc::clone(&self.load.keys);
        let count = self.account_count();
        if keys.quit.contains(event) {
            info!("quit requested");
            if let Some(navigator) = &self.navigator {
                navigator.close_window();
            }
        } else if keys.up.contains(event) {
            self.selected = self.selected.saturating_sub(1);
        } else if keys.down.contains(event) {
            if self.selected + 1 < count {
                self.selected += 1;
            }
        } else if keys.select.contains(event) && count > 0 {
            self.open_requested = true;
        }
    }
}

impl Closable for StartPage {
    fn on_closed(&mut self) {
        if let Some(fetcher) = &self.fetcher {
            fetcher.abort();
        }
    }
}
