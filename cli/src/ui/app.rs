//! Application Shell and Event Loop
//!
//! This module owns the top-level screen selector and everything that
//! crosses screens:
//!
//! - `Screen`: Home, Owner or Customer, each owning its workflow state
//! - The blocking alert slot
//! - Background request tasks and the channel their replies come back on
//! - Key dispatch for every screen
//!
//! Switching screens aborts outstanding tasks and bumps the epoch, so a
//! reply that outlives its screen is dropped instead of landing in a
//! workflow the user has left.

use super::customer::{CustomerCall, CustomerFlow, CustomerReply, StageKind};
use super::owner::{OwnerCall, OwnerDashboard, OwnerFocus, OwnerReply};
use super::requests::{Action, Dispatch, RequestId};
use crate::api::FuelClient;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Entry {
    #[default]
    Owner,
    Customer,
}

impl Entry {
    pub fn title(self) -> &'static str {
        match self {
            Entry::Owner => "Owner Dashboard",
            Entry::Customer => "Customer App",
        }
    }

    fn toggle(self) -> Self {
        match self {
            Entry::Owner => Entry::Customer,
            Entry::Customer => Entry::Owner,
        }
    }
}

#[derive(Debug, Default)]
pub struct Landing {
    pub selected: Entry,
}

pub enum Screen {
    Home(Landing),
    Owner(OwnerDashboard),
    Customer(CustomerFlow),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Home(_) => "home",
            Screen::Owner(_) => "owner",
            Screen::Customer(_) => "customer",
        }
    }
}

enum Reply {
    Owner(OwnerReply),
    Customer(CustomerReply),
}

struct Envelope {
    epoch: u64,
    id: RequestId,
    reply: Reply,
}

pub struct App {
    pub client: FuelClient,
    pub screen: Screen,
    pub alert: Option<String>,
    pub running: bool,
    epoch: u64,
    tasks: JoinSet<()>,
    tx: UnboundedSender<Envelope>,
    rx: UnboundedReceiver<Envelope>,
}

impl App {
    pub fn new(client: FuelClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            screen: Screen::Home(Landing::default()),
            alert: None,
            running: true,
            epoch: 0,
            tasks: JoinSet::new(),
            tx,
            rx,
        }
    }

    // Screen switching

    fn switch_to(&mut self, screen: Screen) {
        self.tasks.abort_all();
        self.epoch += 1;
        info!(from = self.screen.name(), to = screen.name(), "switching screen");
        self.screen = screen;
    }

    pub fn go_home(&mut self) {
        self.switch_to(Screen::Home(Landing::default()));
    }

    pub fn open_owner(&mut self) {
        let (dashboard, action) = OwnerDashboard::open();
        self.switch_to(Screen::Owner(dashboard));
        self.perform_owner(action);
    }

    pub fn open_customer(&mut self) {
        self.switch_to(Screen::Customer(CustomerFlow::new()));
    }

    fn open(&mut self, entry: Entry) {
        match entry {
            Entry::Owner => self.open_owner(),
            Entry::Customer => self.open_customer(),
        }
    }

    // Actions and background calls

    fn perform_owner(&mut self, action: Action<OwnerCall>) {
        match action {
            Action::None => {}
            Action::Call(Dispatch { id, call }) => {
                let client = self.client.clone();
                self.spawn(id, async move { Reply::Owner(call.execute(&client).await) });
            }
            Action::Alert(message) => self.alert = Some(message),
            Action::Home => self.go_home(),
        }
    }

    fn perform_customer(&mut self, action: Action<CustomerCall>) {
        match action {
            Action::None => {}
            Action::Call(Dispatch { id, call }) => {
                let client = self.client.clone();
                self.spawn(id, async move { Reply::Customer(call.execute(&client).await) });
            }
            Action::Alert(message) => self.alert = Some(message),
            Action::Home => self.go_home(),
        }
    }

    fn spawn<F>(&mut self, id: RequestId, call: F)
    where
        F: Future<Output = Reply> + Send + 'static,
    {
        let tx = self.tx.clone();
        let epoch = self.epoch;
        self.tasks.spawn(async move {
            let reply = call.await;
            // The receiver lives as long as the app.
            let _ = tx.send(Envelope { epoch, id, reply });
        });
    }

    /// Applies every reply that has arrived since the last tick.
    pub fn drain_replies(&mut self) {
        while let Ok(envelope) = self.rx.try_recv() {
            self.handle_reply(envelope);
        }
        while self.tasks.try_join_next().is_some() {}
    }

    fn handle_reply(&mut self, envelope: Envelope) {
        if envelope.epoch != self.epoch {
            debug!(epoch = envelope.epoch, current = self.epoch, "dropping reply from a previous screen");
            return;
        }
        match envelope.reply {
            Reply::Owner(reply) => {
                if let Screen::Owner(dashboard) = &mut self.screen {
                    let action = dashboard.apply(envelope.id, reply);
                    self.perform_owner(action);
                }
            }
            Reply::Customer(reply) => {
                if let Screen::Customer(flow) = &mut self.screen {
                    let action = flow.apply(envelope.id, reply);
                    self.perform_customer(action);
                }
            }
        }
    }

    // Keys

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        // The alert is modal: dismiss it before anything else.
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        match &mut self.screen {
            Screen::Home(landing) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Left
                | KeyCode::Right
                | KeyCode::Up
                | KeyCode::Down
                | KeyCode::Tab
                | KeyCode::BackTab => landing.selected = landing.selected.toggle(),
                KeyCode::Char('1') => self.open(Entry::Owner),
                KeyCode::Char('2') => self.open(Entry::Customer),
                KeyCode::Enter => {
                    let entry = landing.selected;
                    self.open(entry);
                }
                _ => {}
            },
            Screen::Owner(_) => self.handle_owner_key(key),
            Screen::Customer(_) => self.handle_customer_key(key),
        }
    }

    fn handle_owner_key(&mut self, key: KeyEvent) {
        let Screen::Owner(dashboard) = &mut self.screen else {
            return;
        };
        let action = match key.code {
            KeyCode::Esc => Action::Home,
            KeyCode::Tab => {
                dashboard.focus_next();
                Action::None
            }
            KeyCode::BackTab => {
                dashboard.focus_prev();
                Action::None
            }
            KeyCode::Enter => dashboard.submit(),
            code if dashboard.focus == OwnerFocus::Customers => match code {
                KeyCode::Down | KeyCode::Char('j') => {
                    dashboard.select_next();
                    Action::None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    dashboard.select_prev();
                    Action::None
                }
                KeyCode::Home => {
                    dashboard.select_first();
                    Action::None
                }
                KeyCode::End => {
                    dashboard.select_last();
                    Action::None
                }
                KeyCode::Char('r') => dashboard.refresh(),
                _ => Action::None,
            },
            KeyCode::Down => {
                dashboard.focus_next();
                Action::None
            }
            KeyCode::Up => {
                dashboard.focus_prev();
                Action::None
            }
            KeyCode::Char(c) => {
                dashboard.handle_char(c);
                Action::None
            }
            KeyCode::Backspace => {
                dashboard.handle_backspace();
                Action::None
            }
            _ => Action::None,
        };
        self.perform_owner(action);
    }

    fn handle_customer_key(&mut self, key: KeyEvent) {
        let Screen::Customer(flow) = &mut self.screen else {
            return;
        };
        let action = match key.code {
            KeyCode::Esc => Action::Home,
            KeyCode::Enter => flow.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                flow.toggle_field();
                Action::None
            }
            KeyCode::Right if flow.kind() == StageKind::Select => flow.next_grade(),
            KeyCode::Left if flow.kind() == StageKind::Select => flow.prev_grade(),
            KeyCode::Char(c) => {
                flow.handle_char(c);
                Action::None
            }
            KeyCode::Backspace => {
                flow.handle_backspace();
                Action::None
            }
            _ => Action::None,
        };
        self.perform_customer(action);
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.drain_replies();
        terminal.draw(|f| super::views::draw(f, &mut app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if !app.running {
            return Ok(());
        }
    }
}
