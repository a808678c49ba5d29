use super::{Action, DeviceInfo};
use crate::midi;

#[derive(Debug, PartialEq)]
pub enum Msg {
    ToApp(Action),
    ToDevice(midi::Msg),
    Status(Status),
}

/// Device lifecycle notifications.
#[derive(Debug, PartialEq, Eq)]
pub enum Status {
    /// Both ports connected (`true`) or one of them lost (`false`).
    Active(bool),
    Identified(DeviceInfo),
    ProtocolMode(bool),
}

impl Msg {
    pub fn none() -> Vec<Msg> {
        Vec::with_capacity(0)
    }
}

impl Action {
    pub fn to_app(self) -> Msg {
        Msg::ToApp(self)
    }
}

impl midi::Msg {
    pub fn to_device(self) -> Msg {
        Msg::ToDevice(self)
    }
}

impl From<Msg> for Vec<Msg> {
    fn from(msg: Msg) -> Vec<Msg> {
        vec![msg]
    }
}

impl From<Status> for Msg {
    fn from(status: Status) -> Self {
        Self::Status(status)
    }
}
