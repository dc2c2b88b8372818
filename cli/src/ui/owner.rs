//! Owner dashboard: customer list, new-customer form, credit top-up.
//!
//! Nothing is updated optimistically. Every successful mutation is followed
//! by a full refetch of the customer list.

use super::form::TextField;
use super::requests::{Action, RequestId, RequestIds};
use crate::api::{ApiError, Customer, FuelClient, NewCustomer, TopUpRequest};
use chrono::{DateTime, Local};
use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum OwnerCall {
    ListCustomers,
    Create(NewCustomer),
    TopUp {
        customer_id: String,
        request: TopUpRequest,
    },
}

#[derive(Debug)]
pub enum OwnerReply {
    Customers(Result<Vec<Customer>, ApiError>),
    Created(Result<Customer, ApiError>),
    ToppedUp(Result<Customer, ApiError>),
}

impl OwnerCall {
    pub async fn execute(self, client: &FuelClient) -> OwnerReply {
        match self {
            OwnerCall::ListCustomers => OwnerReply::Customers(client.list_customers().await),
            OwnerCall::Create(customer) => OwnerReply::Created(client.create_customer(&customer).await),
            OwnerCall::TopUp {
                customer_id,
                request,
            } => OwnerReply::ToppedUp(client.top_up(&customer_id, &request).await),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerFocus {
    #[default]
    Customers,
    Name,
    Phone,
    Email,
    Pin,
    Amount,
}

impl OwnerFocus {
    const ORDER: [OwnerFocus; 6] = [
        OwnerFocus::Customers,
        OwnerFocus::Name,
        OwnerFocus::Phone,
        OwnerFocus::Email,
        OwnerFocus::Pin,
        OwnerFocus::Amount,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_create_form(self) -> bool {
        matches!(
            self,
            OwnerFocus::Name | OwnerFocus::Phone | OwnerFocus::Email | OwnerFocus::Pin
        )
    }
}

#[derive(Debug, Clone)]
pub struct CustomerForm {
    pub name: TextField,
    pub phone: TextField,
    pub email: TextField,
    pub pin: TextField,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self {
            name: TextField::default(),
            phone: TextField::default(),
            email: TextField::default(),
            pin: TextField::masked(),
        }
    }
}

impl CustomerForm {
    fn to_request(&self) -> NewCustomer {
        let email = self.email.trimmed();
        NewCustomer {
            name: self.name.trimmed(),
            phone: self.phone.trimmed(),
            email: (!email.is_empty()).then_some(email),
            pin: self.pin.value().to_string(),
        }
    }
}

pub struct OwnerDashboard {
    pub customers: Vec<Customer>,
    pub list_state: ListState,
    pub form: CustomerForm,
    pub amount: TextField,
    pub focus: OwnerFocus,
    pub last_refreshed: Option<DateTime<Local>>,
    selected: Option<String>,
    ids: RequestIds,
    /// Outstanding create or top-up.
    pending: Option<RequestId>,
    /// Latest list request; older list replies are dropped.
    refresh: Option<RequestId>,
}

impl OwnerDashboard {
    /// A fresh dashboard and the list request it needs on mount.
    pub fn open() -> (Self, Action<OwnerCall>) {
        let mut dashboard = Self {
            customers: Vec::new(),
            list_state: ListState::default(),
            form: CustomerForm::default(),
            amount: TextField::default(),
            focus: OwnerFocus::Customers,
            last_refreshed: None,
            selected: None,
            ids: RequestIds::default(),
            pending: None,
            refresh: None,
        };
        let action = dashboard.refresh();
        (dashboard, action)
    }

    pub fn refresh(&mut self) -> Action<OwnerCall> {
        let id = self.ids.issue();
        self.refresh = Some(id);
        Action::call(id, OwnerCall::ListCustomers)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_some()
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        let id = self.selected.as_deref()?;
        self.customers.iter().find(|c| c.id == id)
    }

    // Navigation

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn select_next(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        if i < self.customers.len().saturating_sub(1) {
            self.list_state.select(Some(i + 1));
        }
    }

    pub fn select_prev(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        if i > 0 {
            self.list_state.select(Some(i - 1));
        }
    }

    pub fn select_first(&mut self) {
        if !self.customers.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.customers.is_empty() {
            self.list_state.select(Some(self.customers.len() - 1));
        }
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            OwnerFocus::Customers => None,
            OwnerFocus::Name => Some(&mut self.form.name),
            OwnerFocus::Phone => Some(&mut self.form.phone),
            OwnerFocus::Email => Some(&mut self.form.email),
            OwnerFocus::Pin => Some(&mut self.form.pin),
            OwnerFocus::Amount => Some(&mut self.amount),
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.focused_field() {
            field.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.focused_field() {
            field.backspace();
        }
    }

    /// Enter: pick the highlighted customer, or submit the focused form.
    pub fn submit(&mut self) -> Action<OwnerCall> {
        match self.focus {
            OwnerFocus::Customers => {
                let highlighted = self
                    .list_state
                    .selected()
                    .and_then(|i| self.customers.get(i))
                    .map(|c| c.id.clone());
                if highlighted.is_some() {
                    self.selected = highlighted;
                }
                Action::None
            }
            OwnerFocus::Amount => self.top_up(),
            _ => self.create(),
        }
    }

    fn create(&mut self) -> Action<OwnerCall> {
        if self.is_loading() {
            return Action::None;
        }
        let id = self.ids.issue();
        self.pending = Some(id);
        Action::call(id, OwnerCall::Create(self.form.to_request()))
    }

    fn top_up(&mut self) -> Action<OwnerCall> {
        if self.is_loading() {
            return Action::None;
        }
        let Some(customer_id) = self.selected_customer().map(|c| c.id.clone()) else {
            return Action::None;
        };
        let Some(amount) = self.amount.as_number() else {
            return Action::alert("Invalid amount");
        };
        let id = self.ids.issue();
        self.pending = Some(id);
        Action::call(
            id,
            OwnerCall::TopUp {
                customer_id,
                request: TopUpRequest { amount },
            },
        )
    }

    // Replies

    pub fn apply(&mut self, id: RequestId, reply: OwnerReply) -> Action<OwnerCall> {
        match reply {
            OwnerReply::Customers(result) => {
                if self.refresh != Some(id) {
                    debug!(?id, "dropping superseded customer list");
                    return Action::None;
                }
                self.refresh = None;
                match result {
                    Ok(customers) => {
                        self.replace_customers(customers);
                        Action::None
                    }
                    Err(e) => {
                        warn!(error = %e, "listing customers failed");
                        Action::alert(e.alert_message("Unable to load customers"))
                    }
                }
            }
            OwnerReply::Created(result) => {
                if !self.take_pending(id) {
                    return Action::None;
                }
                match result {
                    Ok(customer) => {
                        info!(customer_id = %customer.id, "customer created");
                        self.form = CustomerForm::default();
                        self.refresh()
                    }
                    Err(e) => {
                        warn!(error = %e, "create customer failed");
                        Action::alert(e.alert_message("Failed to create"))
                    }
                }
            }
            OwnerReply::ToppedUp(result) => {
                if !self.take_pending(id) {
                    return Action::None;
                }
                match result {
                    Ok(customer) => {
                        info!(customer_id = %customer.id, balance = customer.balance(), "balance topped up");
                        self.amount.clear();
                        self.refresh()
                    }
                    Err(e) => {
                        warn!(error = %e, "top up failed");
                        Action::alert(e.alert_message("Topup failed"))
                    }
                }
            }
        }
    }

    fn take_pending(&mut self, id: RequestId) -> bool {
        if self.pending != Some(id) {
            debug!(?id, "ignoring reply for a request this dashboard no longer waits on");
            return false;
        }
        self.pending = None;
        true
    }

    fn replace_customers(&mut self, customers: Vec<Customer>) {
        self.customers = customers;
        self.last_refreshed = Some(Local::now());

        if self.selected_customer().is_none() {
            self.selected = None;
        }
        let highlight = match self.list_state.selected() {
            _ if self.customers.is_empty() => None,
            Some(i) => Some(i.min(self.customers.len() - 1)),
            None => Some(0),
        };
        self.list_state.select(highlight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn customer(id: &str, name: &str, balance: f64) -> Customer {
        Customer {
            id: id.into(),
            name: name.into(),
            phone: "0555".into(),
            email: None,
            balance: Some(balance),
        }
    }

    fn type_text(dashboard: &mut OwnerDashboard, text: &str) {
        text.chars().for_each(|c| dashboard.handle_char(c));
    }

    /// Opens the dashboard and answers the mount fetch with two customers.
    fn loaded() -> OwnerDashboard {
        let (mut dashboard, action) = OwnerDashboard::open();
        let list = action.into_call().unwrap();
        dashboard.apply(
            list.id,
            OwnerReply::Customers(Ok(vec![customer("c1", "Ali", 120.5), customer("c2", "Sara", 0.0)])),
        );
        dashboard
    }

    fn expect_refetch(action: Action<OwnerCall>) -> RequestId {
        let dispatch = action.into_call().expect("a refetch");
        assert!(matches!(dispatch.call, OwnerCall::ListCustomers));
        dispatch.id
    }

    #[test]
    fn mount_fetches_customers() {
        let (dashboard, action) = OwnerDashboard::open();
        expect_refetch(action);
        assert!(dashboard.is_refreshing());
    }

    #[test]
    fn list_reply_fills_customers_and_highlights_first() {
        let dashboard = loaded();
        assert_eq!(dashboard.customers.len(), 2);
        assert_eq!(dashboard.list_state.selected(), Some(0));
        assert!(dashboard.last_refreshed.is_some());
        assert!(dashboard.selected_customer().is_none());
    }

    #[test]
    fn create_sends_form_then_clears_and_refetches() {
        let mut dashboard = loaded();
        dashboard.focus = OwnerFocus::Name;
        type_text(&mut dashboard, "Omar");
        dashboard.focus_next();
        type_text(&mut dashboard, "0557");
        dashboard.focus_next();
        dashboard.focus_next();
        type_text(&mut dashboard, "4321");

        let dispatch = dashboard.submit().into_call().unwrap();
        match &dispatch.call {
            OwnerCall::Create(request) => assert_eq!(
                request,
                &NewCustomer {
                    name: "Omar".into(),
                    phone: "0557".into(),
                    email: None,
                    pin: "4321".into(),
                }
            ),
            other => panic!("unexpected call {other:?}"),
        }
        assert!(dashboard.is_loading());
        assert!(dashboard.submit().is_none());

        let next = dashboard.apply(dispatch.id, OwnerReply::Created(Ok(customer("c3", "Omar", 0.0))));

        expect_refetch(next);
        assert!(!dashboard.is_loading());
        assert!(dashboard.form.name.is_empty());
        assert!(dashboard.form.pin.is_empty());
    }

    #[test]
    fn failed_create_keeps_form_and_alerts() {
        let mut dashboard = loaded();
        dashboard.focus = OwnerFocus::Name;
        type_text(&mut dashboard, "Omar");
        let dispatch = dashboard.submit().into_call().unwrap();

        let action = dashboard.apply(
            dispatch.id,
            OwnerReply::Created(Err(ApiError::Status {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: None,
            })),
        );

        assert_eq!(action.alert_text(), Some("Failed to create"));
        assert_eq!(dashboard.form.name.value(), "Omar");
    }

    #[test]
    fn top_up_requires_a_selected_customer() {
        let mut dashboard = loaded();
        dashboard.focus = OwnerFocus::Amount;
        type_text(&mut dashboard, "50");

        assert!(dashboard.submit().is_none());
        assert!(!dashboard.is_loading());
    }

    #[test]
    fn top_up_rejects_non_numeric_amount() {
        let mut dashboard = loaded();
        dashboard.submit();
        dashboard.focus = OwnerFocus::Amount;
        type_text(&mut dashboard, "fifty");

        assert_eq!(dashboard.submit().alert_text(), Some("Invalid amount"));
    }

    #[test]
    fn top_up_posts_amount_then_clears_and_refetches() {
        let mut dashboard = loaded();
        dashboard.select_next();
        dashboard.submit();
        assert_eq!(dashboard.selected_customer().map(|c| c.name.as_str()), Some("Sara"));

        dashboard.focus = OwnerFocus::Amount;
        type_text(&mut dashboard, "50");
        let dispatch = dashboard.submit().into_call().unwrap();
        match &dispatch.call {
            OwnerCall::TopUp {
                customer_id,
                request,
            } => {
                assert_eq!(customer_id, "c2");
                assert_eq!(request.amount, 50.0);
            }
            other => panic!("unexpected call {other:?}"),
        }

        let next = dashboard.apply(dispatch.id, OwnerReply::ToppedUp(Ok(customer("c2", "Sara", 50.0))));

        expect_refetch(next);
        assert!(dashboard.amount.is_empty());
    }

    #[test]
    fn failed_top_up_alerts() {
        let mut dashboard = loaded();
        dashboard.submit();
        dashboard.focus = OwnerFocus::Amount;
        type_text(&mut dashboard, "50");
        let dispatch = dashboard.submit().into_call().unwrap();

        let action = dashboard.apply(
            dispatch.id,
            OwnerReply::ToppedUp(Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                detail: None,
            })),
        );

        assert_eq!(action.alert_text(), Some("Topup failed"));
        assert_eq!(dashboard.amount.value(), "50");
    }

    #[test]
    fn selection_follows_the_refetched_list() {
        let mut dashboard = loaded();
        dashboard.submit();
        assert_eq!(dashboard.selected_customer().map(|c| c.id.as_str()), Some("c1"));

        let id = expect_refetch(dashboard.refresh());
        dashboard.apply(id, OwnerReply::Customers(Ok(vec![customer("c1", "Ali", 170.5)])));
        assert_eq!(dashboard.selected_customer().map(|c| c.balance()), Some(170.5));

        let id = expect_refetch(dashboard.refresh());
        dashboard.apply(id, OwnerReply::Customers(Ok(vec![customer("c2", "Sara", 0.0)])));
        assert!(dashboard.selected_customer().is_none());
    }

    #[test]
    fn superseded_list_reply_is_dropped() {
        let mut dashboard = loaded();
        let old = expect_refetch(dashboard.refresh());
        let new = expect_refetch(dashboard.refresh());

        dashboard.apply(new, OwnerReply::Customers(Ok(vec![customer("c9", "New", 1.0)])));
        dashboard.apply(old, OwnerReply::Customers(Ok(vec![customer("c8", "Old", 1.0)])));

        assert_eq!(dashboard.customers[0].id, "c9");
    }

    #[test]
    fn focus_wraps_around() {
        assert_eq!(OwnerFocus::Amount.next(), OwnerFocus::Customers);
        assert_eq!(OwnerFocus::Customers.prev(), OwnerFocus::Amount);
    }
}
