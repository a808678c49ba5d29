use super::{identity, DeviceInfo, Msg, Status, Variant};
use crate::midi::port::Direction;

/// Commands on the device's DAW control channel.
pub mod daw {
    use crate::midi::{self, Channel};

    pub const CHANNEL: Channel = Channel::number(16);

    pub const PROTOCOL_MODE: u8 = 0x0c;
    pub const POT_PICKUP: u8 = 0x0a;

    pub const ON: u8 = 0x7f;
    pub const OFF: u8 = 0x00;

    pub fn enter() -> [midi::Msg; 2] {
        [
            midi::Msg::new_note_on(CHANNEL, PROTOCOL_MODE, ON),
            midi::Msg::new_note_on(CHANNEL, POT_PICKUP, ON),
        ]
    }

    pub fn exit() -> [midi::Msg; 2] {
        [
            midi::Msg::new_note_off(CHANNEL, PROTOCOL_MODE, OFF),
            midi::Msg::new_note_off(CHANNEL, POT_PICKUP, OFF),
        ]
    }
}

bitflags::bitflags! {
    pub struct ConnectionState: u8 {
        const INPUT  = 0b01;
        const OUTPUT = 0b10;
    }
}

impl From<Direction> for ConnectionState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => ConnectionState::INPUT,
            Direction::Out => ConnectionState::OUTPUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Disconnected,
    BothPortsConnected,
    Active(DeviceInfo),
}

/// Connection & handshake state machine.
///
/// Operations return the messages to forward instead of sending them,
/// so that a sequence is always handed over as a whole.
#[derive(Debug)]
pub struct DeviceSession {
    connection: ConnectionState,
    state: State,
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self {
            connection: ConnectionState::empty(),
            state: State::Disconnected,
        }
    }
}

impl DeviceSession {
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn device_active(&self) -> bool {
        !matches!(self.state, State::Disconnected)
    }

    pub fn in_protocol_mode(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        match self.state {
            State::Active(info) => Some(info),
            _ => None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.device_info()
            .map_or(Variant::Unknown, |info| info.variant)
    }

    pub fn has_faders(&self) -> bool {
        self.variant().has_faders()
    }

    pub fn connectivity_changed(&mut self, direction: Direction, is_connected: bool) -> Vec<Msg> {
        self.connection.set(direction.into(), is_connected);

        match (self.state, self.connection.is_all()) {
            (State::Disconnected, true) => {
                log::debug!("Device now connected for both input and output");
                self.state = State::BothPortsConnected;

                log::debug!("Sending device inquiry");
                vec![
                    Status::Active(true).into(),
                    identity::request().to_device(),
                ]
            }
            (State::Disconnected, false) | (_, true) => Msg::none(),
            (_, false) => {
                log::debug!("Device disconnected ({direction} lost)");
                let mut msg_list = self.leave_protocol_mode();
                self.state = State::Disconnected;
                msg_list.push(Status::Active(false).into());

                msg_list
            }
        }
    }

    /// Handles a sysex from the device, `buf` holding the whole message.
    pub fn sysex(&mut self, buf: &[u8]) -> Vec<Msg> {
        if self.state != State::BothPortsConnected {
            log::trace!(
                "Ignoring sysex in state {:?}: {}",
                self.state,
                crate::bytes::Displayable::from(buf),
            );
            return Msg::none();
        }

        let info = match identity::parse_reply(buf) {
            Ok(info) => info,
            Err(err) => {
                log::debug!("Ignoring sysex: {err}");
                return Msg::none();
            }
        };

        log::info!(
            "{} identified, firmware {} in {} mode",
            info.variant,
            info.version,
            info.firmware_mode,
        );

        log::debug!("Entering DAW mode & enabling pot pickup");
        let [protocol_mode, pickup] = daw::enter();
        self.state = State::Active(info);

        vec![
            protocol_mode.to_device(),
            pickup.to_device(),
            Status::Identified(info).into(),
            Status::ProtocolMode(true).into(),
        ]
    }

    /// Leaves protocol mode if it was entered.
    ///
    /// The session then behaves as if disconnected until
    /// the ports are reported connected again: the ports must be
    /// closed after a teardown.
    pub fn teardown(&mut self) -> Vec<Msg> {
        let mut msg_list = self.leave_protocol_mode();
        if self.device_active() {
            self.state = State::Disconnected;
            self.connection = ConnectionState::empty();
            msg_list.push(Status::Active(false).into());
        }

        msg_list
    }

    fn leave_protocol_mode(&mut self) -> Vec<Msg> {
        if !self.in_protocol_mode() {
            return Msg::none();
        }

        log::debug!("Leaving DAW mode & disabling pot pickup");
        let [protocol_mode, pickup] = daw::exit();
        self.state = State::BothPortsConnected;

        vec![
            protocol_mode.to_device(),
            pickup.to_device(),
            Status::ProtocolMode(false).into(),
        ]
    }
}
