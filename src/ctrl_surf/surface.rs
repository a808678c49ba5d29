use super::{
    button::{ButtonRouter, DAW_CHANNEL},
    Action, BankKind, BankMode, ControlBank, ControlSurface, DeviceSession, Msg, PadMode,
    ParameterProvider,
};
use crate::midi::{self, cc, port::Direction, Channel};

/// Channel on which the device reports control touch.
pub const TOUCH_CHANNEL: Channel = Channel::number(15);

#[derive(Debug)]
struct Banks {
    pots: ControlBank,
    faders: Option<ControlBank>,
}

impl Banks {
    fn iter_mut(&mut self) -> impl Iterator<Item = &mut ControlBank> {
        std::iter::once(&mut self.pots).chain(self.faders.as_mut())
    }
}

/// Novation Launchkey MK3 in DAW mode.
#[derive(Debug, Default)]
pub struct Launchkey {
    session: DeviceSession,
    banks: Option<Banks>,
    pad_mode: PadMode,
}

impl Launchkey {
    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn pad_mode(&self) -> PadMode {
        self.pad_mode
    }

    pub fn pots(&self) -> Option<&ControlBank> {
        self.banks.as_ref().map(|banks| &banks.pots)
    }

    pub fn faders(&self) -> Option<&ControlBank> {
        self.banks.as_ref()?.faders.as_ref()
    }

    fn setup_banks(&mut self, params: &dyn ParameterProvider) {
        if self.banks.is_some() {
            return;
        }

        let faders = self
            .session
            .has_faders()
            .then(|| ControlBank::new(BankKind::Faders, params));

        log::debug!(
            "Bank setup: pots in {} mode, faders {}",
            BankKind::Pots.default_mode(),
            if faders.is_some() { "in Volume mode" } else { "not available" },
        );

        self.banks = Some(Banks {
            pots: ControlBank::new(BankKind::Pots, params),
            faders,
        });
        self.pad_mode = PadMode::default();
    }

    fn drop_banks(&mut self) {
        if let Some(mut banks) = self.banks.take() {
            log::debug!("Releasing banks");
            banks.iter_mut().for_each(ControlBank::release);
        }
    }

    fn cc(&mut self, chan: Channel, ctrl: u8, value: u8, params: &dyn ParameterProvider) -> Vec<Msg> {
        if let Some(banks) = self.banks.as_mut() {
            if chan == TOUCH_CHANNEL {
                if !banks.iter_mut().any(|bank| bank.handle_touch(ctrl, value)) {
                    log::trace!("Ignoring touch {ctrl:#04x} {value:#04x}");
                }

                return Msg::none();
            }

            if chan == DAW_CHANNEL
                && banks
                    .iter_mut()
                    .any(|bank| bank.handle_value(ctrl, value, params))
            {
                return Msg::none();
            }
        }

        match ButtonRouter::route(chan, ctrl, value) {
            Some(action) => {
                if let Action::PadMode(pad_mode) = action {
                    log::debug!("Pad mode {:?} -> {pad_mode:?}", self.pad_mode);
                    self.pad_mode = pad_mode;
                }

                action.to_app().into()
            }
            None => Msg::none(),
        }
    }
}

impl ControlSurface for Launchkey {
    fn connectivity_changed(&mut self, direction: Direction, is_connected: bool) -> Vec<Msg> {
        let msg_list = self.session.connectivity_changed(direction, is_connected);
        if !self.session.in_protocol_mode() {
            self.drop_banks();
        }

        msg_list
    }

    fn msg_from_device(&mut self, msg: midi::Msg, params: &dyn ParameterProvider) -> Vec<Msg> {
        if msg.is_sysex() {
            if let Err(err) = msg.parse_sysex() {
                log::debug!("{err}");
                return Msg::none();
            }

            let msg_list = self.session.sysex(msg.inner());
            if self.session.in_protocol_mode() {
                self.setup_banks(params);
            }

            return msg_list;
        }

        if !self.session.in_protocol_mode() {
            log::trace!("Not in DAW mode, ignoring {}", msg.display());
            return Msg::none();
        }

        match msg.tag_chan() {
            Some((tag, chan)) if tag == cc::TAG && msg.len() >= 3 => {
                self.cc(chan, msg[1], msg[2], params)
            }
            _ => {
                log::trace!("Ignoring {}", msg.display());
                Msg::none()
            }
        }
    }

    fn selection_changed(&mut self, params: &dyn ParameterProvider) {
        if let Some(banks) = self.banks.as_mut() {
            for bank in banks.iter_mut() {
                if bank.mode() == BankMode::DeviceParams {
                    log::debug!("{}: selection changed, rebinding", bank.kind());
                    bank.rebind(params);
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.session.device_active()
    }

    fn teardown(&mut self) -> Vec<Msg> {
        let msg_list = self.session.teardown();
        self.drop_banks();

        msg_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctrl_surf::{
        event::{Navigation, Transport},
        identity::{self, tests::reply},
        param::{
            tests::{Call, FakeParam, FakeProvider},
            GroupControl::NoGroup,
            TargetId,
        },
        session::daw,
        Status, Variant,
    };

    const MODES: [BankMode; 4] = [
        BankMode::Volume,
        BankMode::Pan,
        BankMode::SendA,
        BankMode::Custom0,
    ];

    fn cc(chan: u8, ctrl: u8, value: u8) -> midi::Msg {
        midi::Msg::new_cc(Channel::number(chan), ctrl, value)
    }

    fn active(size_code: u8, params: &FakeProvider) -> Launchkey {
        let mut surface = Launchkey::default();
        surface.connectivity_changed(Direction::In, true);
        surface.connectivity_changed(Direction::Out, true);
        let resp = surface.msg_from_device(reply(size_code).as_slice().into(), params);
        assert!(resp.contains(&Msg::Status(Status::ProtocolMode(true))));

        surface
    }

    #[test]
    fn banks_follow_protocol_mode() {
        let params = FakeProvider::populated(&MODES, 9);

        let mut surface = Launchkey::default();
        surface.connectivity_changed(Direction::Out, true);
        let resp = surface.connectivity_changed(Direction::In, true);
        assert!(resp.contains(&Msg::Status(Status::Active(true))));
        assert!(surface.is_active());
        assert!(surface.pots().is_none());

        surface.msg_from_device(reply(0x36).as_slice().into(), &params);
        assert_eq!(surface.pots().unwrap().mode(), BankMode::Pan);
        assert_eq!(surface.faders().unwrap().mode(), BankMode::Volume);

        surface.connectivity_changed(Direction::Out, false);
        assert!(!surface.is_active());
        assert!(surface.pots().is_none());
        assert!(surface.faders().is_none());
    }

    #[test]
    fn reconnecting_one_port_restarts_handshake() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = active(0x36, &params);

        let resp = surface.connectivity_changed(Direction::In, false);
        let [protocol_mode, pickup] = daw::exit();
        assert!(resp.contains(&protocol_mode.to_device()));
        assert!(resp.contains(&pickup.to_device()));
        assert!(resp.contains(&Msg::Status(Status::ProtocolMode(false))));
        assert!(resp.contains(&Msg::Status(Status::Active(false))));
        assert!(surface.pots().is_none());

        let resp = surface.connectivity_changed(Direction::In, true);
        assert!(resp.contains(&Msg::Status(Status::Active(true))));
        assert!(resp.contains(&identity::request().to_device()));
        assert!(!surface.session().in_protocol_mode());

        let resp = surface.msg_from_device(reply(0x36).as_slice().into(), &params);
        assert!(resp.contains(&Msg::Status(Status::ProtocolMode(true))));
        assert!(surface.pots().is_some());
    }

    #[test]
    fn no_faders_on_small_keyboards() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = active(0x35, &params);

        assert_eq!(surface.session().variant(), Variant::Size37);
        assert!(surface.pots().is_some());
        assert!(surface.faders().is_none());

        assert!(surface.msg_from_device(cc(16, 0x35, 0x40), &params).is_empty());
        assert!(params.param(BankMode::Volume, 0).take_calls().is_empty());
    }

    #[test]
    fn controls_ignored_before_protocol_mode() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = Launchkey::default();
        surface.connectivity_changed(Direction::In, true);
        surface.connectivity_changed(Direction::Out, true);

        assert!(surface.msg_from_device(cc(16, 0x15, 0x40), &params).is_empty());
        assert!(surface.msg_from_device(cc(16, 0x73, 0x7f), &params).is_empty());
        assert!(params.param(BankMode::Pan, 0).take_calls().is_empty());
    }

    #[test]
    fn value_and_touch_routing() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = active(0x37, &params);

        assert!(surface.msg_from_device(cc(16, 0x15 + 2, 64), &params).is_empty());
        assert_eq!(
            params.param(BankMode::Pan, 2).take_calls(),
            vec![Call::StartTouch, Call::Set(64.0 / 127.0, NoGroup)],
        );

        surface.msg_from_device(cc(15, 0x35 + 8, 0x7f), &params);
        surface.msg_from_device(cc(16, 0x35 + 8, 0x7f), &params);
        surface.msg_from_device(cc(15, 0x35 + 8, 0x00), &params);
        assert_eq!(
            params.param(BankMode::Volume, 8).take_calls(),
            vec![Call::StartTouch, Call::Set(1.0, NoGroup), Call::StopTouch],
        );
        assert!(!surface.faders().unwrap().is_touched(8));
    }

    #[test]
    fn independent_mode_selection() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = active(0x40, &params);

        surface.msg_from_device(cc(16, 0x09, BankMode::SendA.code()), &params);
        surface.msg_from_device(cc(16, 0x0a, 0x00), &params);

        assert_eq!(surface.pots().unwrap().mode(), BankMode::SendA);
        assert_eq!(surface.faders().unwrap().mode(), BankMode::Custom0);
    }

    #[test]
    fn buttons() {
        let params = FakeProvider::default();
        let mut surface = active(0x34, &params);

        assert_eq!(
            surface.msg_from_device(cc(16, 0x73, 0x7f), &params),
            vec![Action::from(Transport::Play).to_app()],
        );
        assert!(surface.msg_from_device(cc(16, 0x73, 0x00), &params).is_empty());
        assert_eq!(
            surface.msg_from_device(cc(1, 0x68, 0x7f), &params),
            vec![Action::from(Navigation::TrackSelectRight).to_app()],
        );

        // Not a CC
        let note_on = midi::Msg::new_note_on(Channel::number(16), 0x73, 0x7f);
        assert!(surface.msg_from_device(note_on, &params).is_empty());
    }

    #[test]
    fn pad_mode() {
        let params = FakeProvider::default();
        let mut surface = active(0x36, &params);
        assert_eq!(surface.pad_mode(), PadMode::Session);

        let resp = surface.msg_from_device(cc(16, 0x03, 0x01), &params);
        assert_eq!(resp, vec![Action::PadMode(PadMode::Drum).to_app()]);
        assert_eq!(surface.pad_mode(), PadMode::Drum);

        // Reset on next entry
        surface.teardown();
        surface.connectivity_changed(Direction::In, true);
        surface.connectivity_changed(Direction::Out, true);
        surface.msg_from_device(reply(0x36).as_slice().into(), &params);
        assert_eq!(surface.pad_mode(), PadMode::Session);
    }

    #[test]
    fn selection_changed_rebinds_device_params() {
        let mut params = FakeProvider::populated(&MODES, 9);
        params.selected = Some(TargetId(0));
        params.device_params = vec![FakeParam::new("cutoff")];

        let mut surface = active(0x36, &params);
        surface.msg_from_device(cc(16, 0x09, BankMode::DeviceParams.code()), &params);
        let pots = surface.pots().unwrap();
        assert_eq!(pots.binding(0).unwrap().name(), "cutoff");

        params.selected = Some(TargetId(1));
        params.device_params = vec![FakeParam::new("resonance"), FakeParam::new("drive")];
        surface.selection_changed(&params);

        let pots = surface.pots().unwrap();
        assert_eq!(pots.binding(0).unwrap().name(), "resonance");
        assert_eq!(pots.bound_count(), 2);

        // Faders still in Volume mode
        assert_eq!(surface.faders().unwrap().bound_count(), 9);
    }

    #[test]
    fn teardown_releases_touches() {
        let params = FakeProvider::populated(&MODES, 9);
        let mut surface = active(0x36, &params);

        surface.msg_from_device(cc(15, 0x15, 0x7f), &params);
        let resp = surface.teardown();

        assert!(resp.contains(&Msg::Status(Status::ProtocolMode(false))));
        assert_eq!(
            params.param(BankMode::Pan, 0).take_calls(),
            vec![Call::StartTouch, Call::StopTouch],
        );
        assert!(surface.pots().is_none());
        assert!(!surface.is_active());
        assert!(surface.teardown().is_empty());
    }
}
