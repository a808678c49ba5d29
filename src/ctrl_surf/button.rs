use super::{
    event::{Device, Edit, Navigation, Transport},
    Action, PadMode,
};
use crate::midi::{u7, Channel};

pub const DAW_CHANNEL: Channel = Channel::number(16);
pub const MAIN_CHANNEL: Channel = Channel::number(1);

pub const PAD_MODE_SELECT: u8 = 0x03;

/// Translates button CCs to `Action`s.
///
/// Only presses are reported.
#[derive(Debug, Default)]
pub struct ButtonRouter;

impl ButtonRouter {
    pub fn route(chan: Channel, ctrl: u8, value: u8) -> Option<Action> {
        if chan == DAW_CHANNEL && ctrl == PAD_MODE_SELECT {
            return match PadMode::from_code(value) {
                Some(mode) => Some(mode.into()),
                None => {
                    log::debug!("Ignoring unknown pad mode {value:#04x}");
                    None
                }
            };
        }

        if value < u7::ON_THRSD {
            return None;
        }

        let action = if chan == DAW_CHANNEL {
            Self::daw_button(ctrl)?
        } else if chan == MAIN_CHANNEL {
            Self::main_button(ctrl)?
        } else {
            return None;
        };

        log::trace!("{action:?}");

        Some(action)
    }

    fn daw_button(ctrl: u8) -> Option<Action> {
        use Navigation::*;
        use Transport::*;

        let action = match ctrl {
            0x67 => PreviousTrack.into(),
            0x66 => NextTrack.into(),
            0x6a => Up.into(),
            0x6b => Down.into(),
            0x33 => Device::Select.into(),
            0x34 => Device::Lock.into(),
            0x4a => Edit::CaptureMidi.into(),
            0x4b => Edit::Quantize.into(),
            0x4c => Click.into(),
            0x4d => Edit::Undo.into(),
            0x73 => Play.into(),
            0x74 => Stop.into(),
            0x75 => Record.into(),
            0x76 => Loop.into(),
            _ => return None,
        };

        Some(action)
    }

    fn main_button(ctrl: u8) -> Option<Action> {
        match ctrl {
            0x6c => Some(Action::Shift),
            0x68 => Some(Navigation::TrackSelectRight.into()),
            0x69 => Some(Action::StopSoloMute),
            _ => None,
        }
    }
}
