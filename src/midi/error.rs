use crate::bytes;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't create the MIDI client")]
    Init(#[from] midir::InitError),

    #[error("Couldn't connect to {}", .0)]
    Connection(Arc<str>),

    #[error("Out Port not connected")]
    NotConnected,

    #[error("Port connection failed")]
    PortConnection,

    #[error("Couldn't read a port name")]
    PortInfo(#[from] midir::PortInfoError),

    #[error("No port named {}", .0)]
    PortNotFound(Arc<str>),

    #[error("Not a sysex: {}", .0)]
    InvalidSysExInitTag(bytes::Displayable<'static>),

    #[error("Unterminated sysex: {}", .0)]
    InvalidSysExFinalTag(bytes::Displayable<'static>),

    #[error("Couldn't send MIDI message: {}", .0)]
    Send(#[from] midir::SendError),
}
