//! An in-memory mixer the surface can drive.
//!
//! Tracks expose gain, pan, two sends and the parameters of one plugin.
//! Index 8 in Volume mode is the master bus.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::ctrl_surf::{
    event::{Navigation, Transport},
    param::{GroupControl, TargetId},
    Action, ActionHandler, BankMode, Outcome, Parameter, ParameterHandle, ParameterProvider,
};

/// Position of the master fader.
pub const MASTER_INDEX: usize = 8;

const MIN_DB: f64 = -60.0;
const MAX_DB: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// Maps `[0.0, 1.0]` linearly to `[min, max]`.
    Linear { min: f64, max: f64 },
    /// Maps `[0.0, 1.0]` to an amplitude factor, `0.0` being silence.
    Gain,
}

impl Curve {
    pub fn apply(self, normalized: f64) -> f64 {
        let normalized = normalized.clamp(0.0, 1.0);
        match self {
            Curve::Linear { min, max } => min + normalized * (max - min),
            Curve::Gain => {
                if normalized <= 0.0 {
                    0.0
                } else {
                    let db = MIN_DB + normalized * (MAX_DB - MIN_DB);
                    10f64.powf(db / 20.0)
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Control {
    name: String,
    curve: Curve,
    value: Mutex<f64>,
    touched: AtomicBool,
}

impl Control {
    pub fn new(name: impl ToString, curve: Curve, value: f64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            curve,
            value: Mutex::new(value),
            touched: AtomicBool::new(false),
        })
    }

    pub fn value(&self) -> f64 {
        self.value.lock().map_or(0.0, |value| *value)
    }

    pub fn is_touched(&self) -> bool {
        self.touched.load(Ordering::Acquire)
    }
}

impl Parameter for Control {
    fn name(&self) -> &str {
        &self.name
    }

    fn interface_to_internal(&self, normalized: f64) -> f64 {
        self.curve.apply(normalized)
    }

    fn set_value(&self, value: f64, group: GroupControl) {
        log::trace!("{}: {value:.3} ({group:?})", self.name);
        if let Ok(mut cur) = self.value.lock() {
            *cur = value;
        }
    }

    fn start_touch(&self) {
        self.touched.store(true, Ordering::Release);
    }

    fn stop_touch(&self) {
        self.touched.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct Track {
    pub gain: Arc<Control>,
    pub pan: Arc<Control>,
    pub sends: [Arc<Control>; 2],
    pub plugin: Vec<Arc<Control>>,
}

impl Track {
    fn new(idx: usize, plugin_params: usize) -> Self {
        let num = idx + 1;
        let send = |name| Control::new(format!("Track {num} Send {name}"), Curve::Gain, 0.0);

        Self {
            gain: Control::new(format!("Track {num} Gain"), Curve::Gain, 1.0),
            pan: Control::new(
                format!("Track {num} Pan"),
                Curve::Linear { min: 0.0, max: 1.0 },
                0.5,
            ),
            sends: [send("A"), send("B")],
            plugin: (0..plugin_params)
                .map(|param| {
                    Control::new(
                        format!("Track {num} Plugin {}", param + 1),
                        Curve::Linear { min: 0.0, max: 1.0 },
                        0.0,
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TransportState {
    pub is_playing: bool,
    pub is_recording: bool,
    pub is_looping: bool,
    pub click: bool,
}

#[derive(Debug)]
pub struct Mixer {
    tracks: Vec<Track>,
    master: Arc<Control>,
    selected: usize,
    transport: TransportState,
}

impl Mixer {
    pub fn new(tracks: usize, plugin_params: usize) -> Self {
        Self {
            tracks: (0..tracks).map(|idx| Track::new(idx, plugin_params)).collect(),
            master: Control::new("Master Gain", Curve::Gain, 1.0),
            selected: 0,
            transport: TransportState::default(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn master(&self) -> &Arc<Control> {
        &self.master
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    fn select(&mut self, selected: usize) -> Outcome {
        if selected == self.selected || selected >= self.tracks.len() {
            return Outcome::Done;
        }

        log::info!("Selected Track {}", selected + 1);
        self.selected = selected;

        Outcome::SelectionChanged
    }

    fn handle_transport(&mut self, transport: Transport) {
        use Transport::*;

        let state = &mut self.transport;
        match transport {
            Play => state.is_playing = true,
            Stop => {
                state.is_playing = false;
                state.is_recording = false;
            }
            Record => state.is_recording = !state.is_recording,
            Loop => state.is_looping = !state.is_looping,
            Click => state.click = !state.click,
        }

        log::info!("Transport: {state:?}");
    }
}

impl ParameterProvider for Mixer {
    fn resolve(&self, mode: BankMode, index: usize) -> Option<ParameterHandle> {
        use BankMode::*;

        if mode == Volume && index == MASTER_INDEX {
            return Some(self.master.clone());
        }

        if index >= MASTER_INDEX {
            return None;
        }

        let track = self.tracks.get(index)?;
        let control = match mode {
            Volume => &track.gain,
            Pan => &track.pan,
            SendA => &track.sends[0],
            SendB => &track.sends[1],
            DeviceParams | Custom0 | Custom1 | Custom2 | Custom3 => return None,
        };

        Some(control.clone())
    }

    fn selected_target(&self) -> Option<TargetId> {
        (self.selected < self.tracks.len()).then(|| TargetId(self.selected))
    }

    fn device_param_count(&self, target: TargetId) -> usize {
        self.tracks
            .get(target.0)
            .map_or(0, |track| track.plugin.len())
    }

    fn resolve_device_param(&self, target: TargetId, index: usize) -> Option<ParameterHandle> {
        let control = self.tracks.get(target.0)?.plugin.get(index)?;
        Some(control.clone())
    }
}

impl ActionHandler for Mixer {
    fn handle_action(&mut self, action: Action) -> Outcome {
        use Navigation::*;

        match action {
            Action::Transport(transport) => {
                self.handle_transport(transport);
                Outcome::Done
            }
            Action::Navigation(PreviousTrack) => {
                self.select(self.selected.saturating_sub(1))
            }
            Action::Navigation(NextTrack | TrackSelectRight) => self.select(self.selected + 1),
            _ => Outcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ctrl_surf::{identity::tests::reply, ControlSurface, Launchkey},
        midi::{self, port::Direction, Channel},
    };

    #[test]
    fn gain_curve() {
        assert_eq!(Curve::Gain.apply(0.0), 0.0);
        assert!((Curve::Gain.apply(1.0) - 10f64.powf(0.3)).abs() < 1e-9);
        let unity = -MIN_DB / (MAX_DB - MIN_DB);
        assert!((Curve::Gain.apply(unity) - 1.0).abs() < 1e-9);

        let pan = Curve::Linear { min: -1.0, max: 1.0 };
        assert_eq!(pan.apply(0.5), 0.0);
        assert_eq!(pan.apply(2.0), 1.0);
    }

    #[test]
    fn resolution() {
        let mixer = Mixer::new(3, 4);

        let name = |mode, idx| mixer.resolve(mode, idx).map(|p| p.name().to_string());
        assert_eq!(name(BankMode::Volume, 0).as_deref(), Some("Track 1 Gain"));
        assert_eq!(name(BankMode::Volume, 8).as_deref(), Some("Master Gain"));
        assert_eq!(name(BankMode::Pan, 2).as_deref(), Some("Track 3 Pan"));
        assert_eq!(name(BankMode::SendB, 1).as_deref(), Some("Track 2 Send B"));
        assert!(name(BankMode::Volume, 3).is_none());
        assert!(name(BankMode::Pan, 8).is_none());
        assert!(name(BankMode::Custom2, 0).is_none());
        assert!(name(BankMode::DeviceParams, 0).is_none());

        let target = mixer.selected_target().unwrap();
        assert_eq!(mixer.device_param_count(target), 4);
        assert!(mixer.resolve_device_param(target, 4).is_none());
    }

    #[test]
    fn track_selection() {
        let mut mixer = Mixer::new(2, 1);

        assert_eq!(mixer.handle_action(Navigation::PreviousTrack.into()), Outcome::Done);
        assert_eq!(
            mixer.handle_action(Navigation::NextTrack.into()),
            Outcome::SelectionChanged
        );
        assert_eq!(mixer.selected_target(), Some(TargetId(1)));
        assert_eq!(mixer.handle_action(Navigation::NextTrack.into()), Outcome::Done);
        assert_eq!(mixer.handle_action(Navigation::Up.into()), Outcome::Ignored);

        assert!(Mixer::new(0, 0).selected_target().is_none());
    }

    #[test]
    fn transport() {
        let mut mixer = Mixer::new(1, 0);

        mixer.handle_action(Transport::Play.into());
        mixer.handle_action(Transport::Record.into());
        assert!(mixer.transport().is_playing);
        assert!(mixer.transport().is_recording);

        mixer.handle_action(Transport::Stop.into());
        assert!(!mixer.transport().is_playing);
        assert!(!mixer.transport().is_recording);
    }

    #[test]
    fn driven_by_launchkey() {
        let mixer = Mixer::new(8, 12);
        let mut surface = Launchkey::default();
        surface.connectivity_changed(Direction::In, true);
        surface.connectivity_changed(Direction::Out, true);
        surface.msg_from_device(reply(0x37).into(), &mixer);

        let cc = |chan, ctrl, value| midi::Msg::new_cc(Channel::number(chan), ctrl, value);

        // Master fader
        surface.msg_from_device(cc(15, 0x3d, 0x7f), &mixer);
        surface.msg_from_device(cc(16, 0x3d, 0x00), &mixer);
        assert_eq!(mixer.master().value(), 0.0);
        assert!(mixer.master().is_touched());
        surface.msg_from_device(cc(15, 0x3d, 0x00), &mixer);
        assert!(!mixer.master().is_touched());

        // Pan pot
        surface.msg_from_device(cc(16, 0x15 + 1, 0x7f), &mixer);
        assert_eq!(mixer.tracks()[1].pan.value(), 1.0);

        // Plugin params on the pots
        surface.msg_from_device(cc(16, 0x09, BankMode::DeviceParams.code()), &mixer);
        assert_eq!(surface.pots().unwrap().bound_count(), 8);
        surface.msg_from_device(cc(16, 0x15 + 7, 0x7f), &mixer);
        assert_eq!(mixer.tracks()[0].plugin[7].value(), 1.0);
        assert!(mixer.tracks()[0].plugin[7].is_touched());

        // Leaving DAW mode releases the touched plugin param
        surface.teardown();
        assert!(!mixer.tracks()[0].plugin[7].is_touched());
    }
}
