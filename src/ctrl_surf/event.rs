use super::PadMode;

/// Abstract actions triggered from the device buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Transport(Transport),
    Navigation(Navigation),
    Edit(Edit),
    Device(Device),
    PadMode(PadMode),
    Shift,
    StopSoloMute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Play,
    Stop,
    Record,
    Loop,
    Click,
}

impl From<Transport> for Action {
    fn from(evt: Transport) -> Self {
        Self::Transport(evt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    PreviousTrack,
    NextTrack,
    Up,
    Down,
    TrackSelectRight,
}

impl From<Navigation> for Action {
    fn from(evt: Navigation) -> Self {
        Self::Navigation(evt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    CaptureMidi,
    Quantize,
    Undo,
}

impl From<Edit> for Action {
    fn from(evt: Edit) -> Self {
        Self::Edit(evt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Select,
    Lock,
}

impl From<Device> for Action {
    fn from(evt: Device) -> Self {
        Self::Device(evt)
    }
}

impl From<PadMode> for Action {
    fn from(mode: PadMode) -> Self {
        Self::PadMode(mode)
    }
}
