use crossbeam_channel as channel;
use std::{ops::ControlFlow, sync::Arc, time::Duration};

use crate::{
    ctrl_surf::{self, ActionHandler, ControlSurface, Launchkey, Outcome, ParameterProvider},
    midi::{
        self,
        port::{Direction, PortMatcher},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI error: {}", .0)]
    Midi(#[from] midi::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub client_name: Arc<str>,
    pub port_matcher: PortMatcher,
    /// Period of the port re-probe tick.
    pub probe_interval: Duration,
    /// Upper bound on the output drain at shutdown.
    pub drain_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_name: "launchkey-controller".into(),
            port_matcher: PortMatcher {
                patterns: vec!["Launchkey MK3".to_string(), "LKMK3".to_string()],
                marker: "DAW".to_string(),
            },
            probe_interval: Duration::from_millis(1000),
            drain_timeout: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
pub enum Request {
    /// Refreshes the port lists and connects to the device if found.
    Probe,
    Connect(Direction, Arc<str>),
    Disconnect(Direction),
    Shutdown,
}

pub struct Spawner<H> {
    pub req_rx: channel::Receiver<Request>,
    pub config: Config,
    pub host: H,
}

impl<H> Spawner<H>
where
    H: ParameterProvider + ActionHandler + Send + 'static,
{
    pub fn spawn(self) -> std::thread::JoinHandle<Result<(), Error>> {
        std::thread::spawn(move || {
            Controller::run(self.req_rx, self.config, self.host).map_err(|err| {
                log::error!("Error running Controller: {err}");
                err
            })
        })
    }
}

/// Owns the ports, the surface and the host.
///
/// This is the only place where the surface state is mutated.
struct Controller<H> {
    config: Config,
    ports: midi::InOutManager,
    ctrl_surf: Box<dyn ControlSurface>,
    host: H,
}

impl<H> Controller<H>
where
    H: ParameterProvider + ActionHandler + Send + 'static,
{
    fn run(req_rx: channel::Receiver<Request>, config: Config, host: H) -> Result<(), Error> {
        let (midi_tx, midi_rx) = channel::unbounded();
        let ports = midi::InOutManager::try_new(config.client_name.clone(), midi_tx)?;

        let mut this = Self {
            config,
            ports,
            ctrl_surf: Box::new(Launchkey::default()),
            host,
        };

        if let Err(err) = this.probe() {
            log::warn!("Initial probe: {err}");
        }

        this.run_loop(req_rx, midi_rx);

        Ok(())
    }

    fn handle_request(&mut self, request: Request) -> Result<ControlFlow<(), ()>, Error> {
        use Request::*;

        match request {
            Probe => self.probe()?,
            Connect(direction, port_name) => {
                self.ports.refresh()?;
                if self.ports.is_connected(direction) {
                    // Connecting closes the current port first.
                    self.connectivity_changed(direction, false);
                }

                self.ports.connect(direction, port_name)?;
                self.connectivity_changed(direction, true);
            }
            Disconnect(direction) => {
                if self.ports.is_connected(direction) {
                    // Let the surface leave DAW mode while Out is still there.
                    self.connectivity_changed(direction, false);
                    self.ports.disconnect(direction);
                }
            }
            Shutdown => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    fn probe(&mut self) -> Result<(), Error> {
        for change in self.ports.probe(&self.config.port_matcher)? {
            self.connectivity_changed(change.direction, change.is_connected);
        }

        Ok(())
    }

    fn connectivity_changed(&mut self, direction: Direction, is_connected: bool) {
        let resp = self.ctrl_surf.connectivity_changed(direction, is_connected);
        self.handle_ctrl_surf_resp(resp);
    }

    fn handle_midi_msg(&mut self, msg: midi::Msg) {
        let resp = self.ctrl_surf.msg_from_device(msg, &self.host);
        self.handle_ctrl_surf_resp(resp);
    }

    fn handle_ctrl_surf_resp(&mut self, resp: Vec<ctrl_surf::Msg>) {
        use ctrl_surf::Msg::*;

        for msg in resp {
            match msg {
                ToApp(action) => {
                    log::debug!("Ctrl surf: {action:?}");
                    match self.host.handle_action(action) {
                        Outcome::Done => (),
                        Outcome::SelectionChanged => self.ctrl_surf.selection_changed(&self.host),
                        Outcome::Ignored => log::debug!("Host ignored {action:?}"),
                    }
                }
                ToDevice(msg) => {
                    if !self.ports.outs.is_connected() {
                        log::debug!("Out Port gone, skipping {}", msg.display());
                        continue;
                    }

                    if let Err(err) = self.ports.send(&msg) {
                        log::warn!("Ctrl surf: {err}");
                    }
                }
                Status(status) => {
                    use ctrl_surf::Status::*;
                    match status {
                        Active(true) => log::info!("Device ports connected, identifying"),
                        Active(false) => log::info!("Device lost"),
                        Identified(info) => log::debug!("Identified {info:?}"),
                        ProtocolMode(true) => log::info!("Entered DAW mode"),
                        ProtocolMode(false) => log::info!("Left DAW mode"),
                    }
                }
            }
        }
    }

    fn shutdown(&mut self) {
        if self.ctrl_surf.is_active() {
            log::info!("Releasing the device");
        }

        let resp = self.ctrl_surf.teardown();
        self.handle_ctrl_surf_resp(resp);

        self.ports.outs.drain(self.config.drain_timeout);
        self.ports.disconnect(Direction::In);
        self.ports.disconnect(Direction::Out);
    }

    fn run_loop(
        mut self,
        req_rx: channel::Receiver<Request>,
        midi_rx: channel::Receiver<midi::Msg>,
    ) {
        let ticker = channel::tick(self.config.probe_interval);

        loop {
            channel::select! {
                recv(req_rx) -> request => {
                    match request {
                        Ok(request) => match self.handle_request(request) {
                            Ok(ControlFlow::Continue(())) => (),
                            Ok(ControlFlow::Break(())) => break,
                            Err(err) => log::error!("{err}"),
                        },
                        Err(err) => {
                            log::error!("Error request channel: {err}");
                            break;
                        }
                    }
                }
                recv(midi_rx) -> midi_msg => {
                    match midi_msg {
                        Ok(midi_msg) => self.handle_midi_msg(midi_msg),
                        Err(err) => {
                            log::error!("Error MIDI msg channel: {err}");
                            break;
                        }
                    }
                }
                recv(ticker) -> _ => {
                    if let Err(err) = self.probe() {
                        log::warn!("Probe: {err}");
                    }
                }
            }
        }

        log::debug!("Shutting down Controller loop");
        self.shutdown();
    }
}
