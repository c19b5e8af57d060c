//! Balance and transaction history of one account.

use super::{key_hint, render_header, render_help_bar, Load};
use crate::nav::{KeyEventHandler, KeySet, Navigator, Page};
use crate::ui::layout::compute_layout;
use crate::ui::theme::Theme;
use crate::ui::DrawContext;
use crate::wallet::Account;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{
    Block, Borders, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
};

pub const ACCOUNT_PAGE_ID: &str = "account_page";

pub struct AccountPage {
    load: Load,
    account: Account,
    navigator: Option<Navigator>,
    scroll: usize,
}

impl AccountPage {
    pub fn new(load: Load, account: Account) -> Self {
        Self {
            load,
            account,
            navigator: None,
            scroll: 0,
        }
    }
}

impl Page for AccountPage {
    fn id(&self) -> &str {
        ACCOUNT_PAGE_ID
    }

    fn on_attached_to_navigator(&mut self, navigator: Navigator) {
        self.navigator = Some(navigator);
    }

    fn on_navigated_to(&mut self) {
        self.scroll = 0;
    }

    fn handle_user_interactions(&mut self) {}

    fn layout(&self, ctx: &mut DrawContext<'_, '_>) {
        let layout = compute_layout(ctx.area, self.load.config.ui.show_help_bar);
        render_header(
            ctx,
            layout.header,
            self.account.label(),
            &format!("No. {}", self.account.account_number),
        );

        let date_format = &self.load.config.ui.date_format;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(layout.body.inner(Margin::new(2, 0)));

        // Balance summary
        let summary = Line::from(vec![
            Span::styled("Balance  ", ctx.style(Theme::muted())),
            Span::styled(
                format!("£{:.2}", self.account.balance),
                ctx.style(Theme::amount(self.account.balance).add_modifier(Modifier::BOLD)),
            ),
            Span::styled(
                format!("   opened {}", self.account.created.format(date_format)),
                ctx.style(Theme::muted()),
            ),
        ]);
        ctx.render_widget(Paragraph::new(summary), chunks[0].inner(Margin::new(0, 1)));

        let block = Block::default()
            .title(" Transactions ")
            .title_style(ctx.style(Theme::title()))
            .borders(Borders::ALL)
            .border_type(Theme::border_type())
            .border_style(ctx.style(Theme::border()));
        let inner = block.inner(chunks[1]);
        ctx.render_widget(block, chunks[1]);

        let transactions = &self.account.transactions;
        if transactions.is_empty() {
            ctx.render_widget(
                Paragraph::new("No transactions yet.")
                    .alignment(Alignment::Center)
                    .style(ctx.style(Theme::muted())),
                inner,
            );
        } else {
            let visible = inner.height.saturating_sub(1) as usize;
            let rows: Vec<Row> = transactions
                .iter()
                .skip(self.scroll)
                .take(visible)
                .map(|tx| {
                    Row::new(vec![
                        Span::styled(tx.created.format(date_format).to_string(), ctx.style(Theme::muted())),
                        Span::styled(tx.merchant.clone(), ctx.style(Theme::text())),
                        Span::styled(format!("{:>10.2}", tx.amount), ctx.style(Theme::amount(tx.amount))),
                    ])
                })
                .collect();
            let table = Table::new(
                rows,
                [Constraint::Length(12), Constraint::Min(10), Constraint::Length(11)],
            )
            .header(Row::new(vec!["Date", "Merchant", "    Amount"]).style(ctx.style(Theme::title())));
            ctx.render_widget(table, inner);

            if transactions.len() > visible {
                let mut state = ScrollbarState::new(transactions.len().saturating_sub(visible))
                    .position(self.scroll);
                ctx.render_stateful_widget(
                    Scrollbar::new(ScrollbarOrientation::VerticalRight),
                    chunks[1],
                    &mut state,
                );
            }
        }

        let keys = &self.load.keys;
        render_help_bar(
            ctx,
            layout.help_bar,
            &[
                (format!("{}/{}", key_hint(&keys.up), key_hint(&keys.down)), "Scroll"),
                (key_hint(&keys.back), "Back"),
            ],
        );
    }

    fn on_navigated_from(&mut self) {}

    fn as_key_handler(&mut self) -> Option<&mut dyn KeyEventHandler> {
        Some(self)
    }
}

impl KeyEventHandler for AccountPage {
    fn keys_to_handle(&self) -> KeySet {
        let keys = &self.load.keys;
        keys.back.clone().union(&keys.up).union(&keys.down)
    }

    fn handle_key_press(&mut self, event: &KeyEvent) {
        let keys = &self.load.keys;
        if keys.back.contains(event) {
            if let Some(navigator) = &self.navigator {
                navigator.close_current_page();
            }
        } else if keys.up.contains(event) {
            self.scroll = self.scroll.saturating_sub(1);
        } else if keys.down.contains(event)
            && self.scroll + 1 < self.account.transactions.len()
        {
            self.scroll += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::testing::harness;
    use crate::ui::pages::testing::load;
    use crate::wallet::sample_accounts;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_back_closes_page() {
        let mut h = harness();
        let load = load(h.host.clone(), 0, 3);
        let account = sample_accounts().remove(0);
        h.window
            .display(Box::new(AccountPage::new(load, account)));

        let page = h.window.current_page_mut().unwrap();
        page.as_key_handler()
            .unwrap()
            .handle_key_press(&key(KeyCode::Esc));
        assert_eq!(h.window.apply_pending(), 1);
        assert!(h.window.current_page().is_none());
    }

    #[test]
    fn test_scroll_stays_in_range() {
        let h = harness();
        let account = sample_accounts().remove(1);
        let count = account.transactions.len();
        let mut page = AccountPage::new(load(h.host.clone(), 0, 3), account);

        page.handle_key_press(&key(KeyCode::Up));
        assert_eq!(page.scroll, 0);
        for _ in 0..10 {
            page.handle_key_press(&key(KeyCode::Down));
        }
        assert_eq!(page.scroll, count - 1);
        page.handle_key_press(&key(KeyCode::Char('k')));
        assert_eq!(page.scroll, count - 2);
    }

    #[test]
    fn test_layout_shows_balance_and_transactions() {
        let h = harness();
        let account = sample_accounts().remove(0);
        let page = AccountPage::new(load(h.host.clone(), 0, 3), account);

        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal
            .draw(|frame| {
                let mut ctx = DrawContext::new(frame, Instant::now());
                page.layout(&mut ctx);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Current account"));
        assert!(text.contains("£1204.55"));
        assert!(text.contains("Grocer & Co"));
    }
}
