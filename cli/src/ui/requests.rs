//! What a workflow hands back to the shell after an input or a reply.
//!
//! Workflows never touch the network themselves. They describe the call
//! they want (`Dispatch`) and the shell runs it on a background task, then
//! feeds the reply back tagged with the same `RequestId`. A workflow only
//! applies replies whose id it is still waiting for.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

#[derive(Debug, Default)]
pub struct RequestIds {
    last: u64,
}

impl RequestIds {
    pub fn issue(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}

#[derive(Debug)]
pub struct Dispatch<C> {
    pub id: RequestId,
    pub call: C,
}

#[derive(Debug)]
pub enum Action<C> {
    None,
    Call(Dispatch<C>),
    /// Raise the blocking alert.
    Alert(String),
    /// Leave the workflow for the landing screen.
    Home,
}

impl<C> Action<C> {
    pub fn call(id: RequestId, call: C) -> Self {
        Action::Call(Dispatch { id, call })
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Action::Alert(message.into())
    }

    #[cfg(test)]
    pub fn into_call(self) -> Option<Dispatch<C>> {
        match self {
            Action::Call(d) => Some(d),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn alert_text(&self) -> Option<&str> {
        match self {
            Action::Alert(m) => Some(m),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }
}
