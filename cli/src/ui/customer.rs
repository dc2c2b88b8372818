//! Customer workflow.
//!
//! `Login → Select → Dispense → Done`, forward only. Each stage owns the
//! data it needs, so a dispense stage cannot exist without a session token
//! and the receipt stage cannot exist without a receipt number. Leaving the
//! workflow (back to the landing screen) is the only way to start over.

use super::form::TextField;
use super::requests::{Action, RequestId, RequestIds};
use crate::api::{
    ApiError, ConfirmRequest, FuelClient, LoginRequest, MaxLitersRequest, Receipt, SessionToken,
    SessionUser, StartSessionRequest,
};
use crate::fuel::{estimate_total, Grade};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum CustomerCall {
    Login(LoginRequest),
    MaxLiters {
        customer_id: String,
        request: MaxLitersRequest,
    },
    StartSession {
        customer_id: String,
        request: StartSessionRequest,
    },
    Confirm(ConfirmRequest),
}

#[derive(Debug)]
pub enum CustomerReply {
    LoggedIn(Result<SessionUser, ApiError>),
    MaxLiters(Result<f64, ApiError>),
    SessionStarted(Result<SessionToken, ApiError>),
    Confirmed(Result<Receipt, ApiError>),
}

impl CustomerCall {
    pub async fn execute(self, client: &FuelClient) -> CustomerReply {
        match self {
            CustomerCall::Login(request) => CustomerReply::LoggedIn(client.login(&request).await),
            CustomerCall::MaxLiters {
                customer_id,
                request,
            } => CustomerReply::MaxLiters(client.max_liters(&customer_id, &request).await),
            CustomerCall::StartSession {
                customer_id,
                request,
            } => CustomerReply::SessionStarted(client.start_session(&customer_id, &request).await),
            CustomerCall::Confirm(request) => {
                CustomerReply::Confirmed(client.confirm_dispense(&request).await)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Phone,
    Pin,
}

#[derive(Debug, Clone)]
pub struct LoginStep {
    pub phone: TextField,
    pub pin: TextField,
    pub focus: LoginField,
}

impl Default for LoginStep {
    fn default() -> Self {
        Self {
            phone: TextField::default(),
            pin: TextField::masked(),
            focus: LoginField::Phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxLiters {
    Loading,
    Known(f64),
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectField {
    #[default]
    PumpId,
    Liters,
}

#[derive(Debug, Clone)]
pub struct SelectStep {
    pub user: SessionUser,
    pub grade: Grade,
    pub max_liters: MaxLiters,
    pub pump_id: TextField,
    pub liters: TextField,
    pub focus: SelectField,
    /// The only max-liters request whose reply is still wanted.
    max_request: Option<RequestId>,
    /// Grade and liters captured when "Start Session" was pressed.
    starting: Option<(Grade, f64)>,
}

impl SelectStep {
    fn new(user: SessionUser) -> Self {
        Self {
            user,
            grade: Grade::default(),
            max_liters: MaxLiters::Loading,
            pump_id: TextField::default(),
            liters: TextField::default(),
            focus: SelectField::PumpId,
            max_request: None,
            starting: None,
        }
    }

    fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            SelectField::PumpId => &mut self.pump_id,
            SelectField::Liters => &mut self.liters,
        }
    }
}

/// An authorised pump session waiting for confirmation.
#[derive(Debug, Clone)]
pub struct FuelSession {
    pub token: SessionToken,
    pub grade: Grade,
    pub liters: f64,
}

impl FuelSession {
    pub fn estimated_total(&self) -> f64 {
        estimate_total(self.liters, self.grade)
    }
}

#[derive(Debug, Clone)]
pub struct DispenseStep {
    pub user: SessionUser,
    pub session: FuelSession,
}

#[derive(Debug, Clone)]
pub enum Stage {
    Login(LoginStep),
    Select(SelectStep),
    Dispense(DispenseStep),
    Done(Receipt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Login,
    Select,
    Dispense,
    Done,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Login(_) => StageKind::Login,
            Stage::Select(_) => StageKind::Select,
            Stage::Dispense(_) => StageKind::Dispense,
            Stage::Done(_) => StageKind::Done,
        }
    }
}

pub struct CustomerFlow {
    stage: Stage,
    ids: RequestIds,
    /// Outstanding login, start-session or confirm request.
    pending: Option<RequestId>,
}

impl Default for CustomerFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerFlow {
    pub fn new() -> Self {
        Self {
            stage: Stage::Login(LoginStep::default()),
            ids: RequestIds::default(),
            pending: None,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    // Input

    pub fn handle_char(&mut self, c: char) {
        if self.is_busy() {
            return;
        }
        match &mut self.stage {
            Stage::Login(step) => match step.focus {
                LoginField::Phone => step.phone.push(c),
                LoginField::Pin => step.pin.push(c),
            },
            Stage::Select(step) => step.focused_field().push(c),
            Stage::Dispense(_) | Stage::Done(_) => {}
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.is_busy() {
            return;
        }
        match &mut self.stage {
            Stage::Login(step) => match step.focus {
                LoginField::Phone => step.phone.backspace(),
                LoginField::Pin => step.pin.backspace(),
            },
            Stage::Select(step) => step.focused_field().backspace(),
            Stage::Dispense(_) | Stage::Done(_) => {}
        }
    }

    /// Both forms have two fields, so next and previous are the same move.
    pub fn toggle_field(&mut self) {
        match &mut self.stage {
            Stage::Login(step) => {
                step.focus = match step.focus {
                    LoginField::Phone => LoginField::Pin,
                    LoginField::Pin => LoginField::Phone,
                }
            }
            Stage::Select(step) => {
                step.focus = match step.focus {
                    SelectField::PumpId => SelectField::Liters,
                    SelectField::Liters => SelectField::PumpId,
                }
            }
            Stage::Dispense(_) | Stage::Done(_) => {}
        }
    }

    pub fn next_grade(&mut self) -> Action<CustomerCall> {
        self.change_grade(Grade::next)
    }

    pub fn prev_grade(&mut self) -> Action<CustomerCall> {
        self.change_grade(Grade::prev)
    }

    fn change_grade(&mut self, pick: impl FnOnce(Grade) -> Grade) -> Action<CustomerCall> {
        if self.is_busy() {
            return Action::None;
        }
        let Stage::Select(step) = &mut self.stage else {
            return Action::None;
        };
        let grade = pick(step.grade);
        if grade == step.grade {
            return Action::None;
        }
        step.grade = grade;
        self.request_max_liters()
    }

    /// Enter: the primary button of whichever stage is showing.
    pub fn submit(&mut self) -> Action<CustomerCall> {
        if self.is_busy() {
            return Action::None;
        }
        let id = self.ids.issue();
        let call = match &mut self.stage {
            Stage::Login(step) => CustomerCall::Login(LoginRequest {
                phone: step.phone.trimmed(),
                pin: step.pin.value().to_string(),
            }),
            Stage::Select(step) => {
                let Some(liters) = step.liters.as_number().filter(|l| *l >= 0.0) else {
                    return Action::alert("Enter a valid number of liters");
                };
                step.starting = Some((step.grade, liters));
                CustomerCall::StartSession {
                    customer_id: step.user.customer_id.clone(),
                    request: StartSessionRequest {
                        pump_id: step.pump_id.trimmed(),
                    },
                }
            }
            Stage::Dispense(step) => CustomerCall::Confirm(ConfirmRequest {
                token: step.session.token.as_str().to_string(),
                liters: step.session.liters,
                grade: step.session.grade,
            }),
            Stage::Done(_) => return Action::Home,
        };
        self.pending = Some(id);
        Action::call(id, call)
    }

    // Replies

    pub fn apply(&mut self, id: RequestId, reply: CustomerReply) -> Action<CustomerCall> {
        if let CustomerReply::MaxLiters(result) = reply {
            self.apply_max_liters(id, result);
            return Action::None;
        }

        if self.pending != Some(id) {
            debug!(?id, "ignoring reply for a request this step no longer waits on");
            return Action::None;
        }
        self.pending = None;

        match (reply, self.stage.kind()) {
            (CustomerReply::LoggedIn(Ok(user)), StageKind::Login) => {
                info!(customer_id = %user.customer_id, "customer logged in");
                self.stage = Stage::Select(SelectStep::new(user));
                self.request_max_liters()
            }
            (CustomerReply::LoggedIn(Err(e)), _) => {
                warn!(error = %e, "login failed");
                Action::alert(e.alert_message("Invalid credentials"))
            }
            (CustomerReply::SessionStarted(Ok(token)), StageKind::Select) => self.begin_dispense(token),
            (CustomerReply::SessionStarted(Err(e)), _) => {
                warn!(error = %e, "start session failed");
                if let Stage::Select(step) = &mut self.stage {
                    step.starting = None;
                }
                Action::alert(e.alert_message("Unable to start session"))
            }
            (CustomerReply::Confirmed(Ok(receipt)), StageKind::Dispense) => {
                info!(receipt_no = %receipt.receipt_no, total = receipt.total, "dispense confirmed");
                self.stage = Stage::Done(receipt);
                Action::None
            }
            (CustomerReply::Confirmed(Err(e)), _) => {
                warn!(error = %e, "confirm dispense failed");
                Action::alert(e.alert_message("Failed"))
            }
            (reply, kind) => {
                debug!(?reply, ?kind, "reply does not match the current stage");
                Action::None
            }
        }
    }

    fn apply_max_liters(&mut self, id: RequestId, result: Result<f64, ApiError>) {
        let Stage::Select(step) = &mut self.stage else {
            debug!(?id, "max liters arrived after leaving selection");
            return;
        };
        if step.max_request != Some(id) {
            debug!(?id, "dropping max liters for a previous grade");
            return;
        }
        step.max_request = None;
        step.max_liters = match result {
            Ok(max) => MaxLiters::Known(max),
            Err(e) => {
                warn!(error = %e, grade = %step.grade, "max liters unavailable");
                MaxLiters::Unavailable
            }
        };
    }

    fn request_max_liters(&mut self) -> Action<CustomerCall> {
        let Stage::Select(step) = &mut self.stage else {
            return Action::None;
        };
        let id = self.ids.issue();
        step.max_request = Some(id);
        step.max_liters = MaxLiters::Loading;
        Action::call(
            id,
            CustomerCall::MaxLiters {
                customer_id: step.user.customer_id.clone(),
                request: MaxLitersRequest { grade: step.grade },
            },
        )
    }

    fn begin_dispense(&mut self, token: SessionToken) -> Action<CustomerCall> {
        let step = match std::mem::replace(&mut self.stage, Stage::Login(LoginStep::default())) {
            Stage::Select(step) => step,
            other => {
                self.stage = other;
                return Action::None;
            }
        };
        let (grade, liters) = step
            .starting
            .unwrap_or((step.grade, step.liters.as_number().unwrap_or(0.0)));
        info!(grade = %grade, liters, "pump session started");
        self.stage = Stage::Dispense(DispenseStep {
            user: step.user,
            session: FuelSession {
                token,
                grade,
                liters,
            },
        });
        Action::None
    }
}
