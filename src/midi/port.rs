use crossbeam_channel as channel;
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};

use super::{io, Error, Msg};

pub type PortsIn<D> = DirectionalPorts<midir::MidiInput, midir::MidiInputConnection<D>, D>;
pub type PortsOut = DirectionalPorts<midir::MidiOutput, io::OutConnection, ()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub fn as_str(&self) -> &str {
        match self {
            Direction::In => "In Port",
            Direction::Out => "Out Port",
        }
    }
}

/// Selects the device ports by name.
///
/// A port matches if its name contains one of the `patterns`
/// as well as the `marker`, e.g. "Launchkey MK3 49 LKMK3 DAW Out".
#[derive(Clone, Debug)]
pub struct PortMatcher {
    pub patterns: Vec<String>,
    pub marker: String,
}

impl PortMatcher {
    pub fn matches(&self, port_name: &str) -> bool {
        port_name.contains(self.marker.as_str())
            && self
                .patterns
                .iter()
                .any(|pattern| port_name.contains(pattern.as_str()))
    }
}

pub struct DirectionalPorts<IO: midir::MidiIO, Conn, D> {
    map: BTreeMap<Arc<str>, IO::Port>,
    cur: Option<Arc<str>>,
    midi_conn: io::DirectionalConnection<IO, Conn, D>,
    client_name: Arc<str>,
}

impl<IO: midir::MidiIO, Conn, D> DirectionalPorts<IO, Conn, D> {
    pub fn list(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.map.keys().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.midi_conn.is_connected()
    }

    /// Whether the port is connected but vanished from the last refresh.
    pub fn is_stale(&self) -> bool {
        self.is_connected() && self.cur.is_none()
    }

    pub fn find(&self, matcher: &PortMatcher) -> Option<Arc<str>> {
        self.map.keys().find(|name| matcher.matches(name)).cloned()
    }

    fn refresh_from(&mut self, conn: IO) -> Result<(), Error> {
        self.map.clear();

        let mut prev = self.cur.take();
        for port in conn.ports().iter() {
            let name = conn.port_name(port)?;
            if !name.starts_with(self.client_name.as_ref()) {
                if let Some(ref prev_ref) = prev {
                    if prev_ref.as_ref() == name {
                        self.cur = prev.take();
                    }
                }

                self.map.insert(name.into(), port.clone());
            }
        }

        Ok(())
    }
}

impl<D: Send + Clone> PortsIn<D> {
    pub fn try_new(client_name: Arc<str>, data: D) -> Result<Self, Error> {
        Ok(Self {
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiIn::<D>::try_new(&client_name, data)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiInput::new(&format!("{} refresh In ports", self.client_name))?;

        self.refresh_from(temp_conn)?;

        Ok(())
    }

    pub fn connect<C>(&mut self, port_name: Arc<str>, callback: C) -> Result<(), Error>
    where
        C: FnMut(u64, &[u8], &mut D) + Send + 'static,
    {
        let port = self
            .map
            .get(&port_name)
            .ok_or_else(|| Error::PortNotFound(port_name.clone()))?
            .clone();

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name, callback)
            .map_err(|_| {
                self.cur = None;
                Error::PortConnection
            })?;

        log::info!("Connected for Input to {}", port_name);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::info!("Disconnected Input from {}", cur);
        }
    }
}

impl PortsOut {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiOut::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn =
            midir::MidiOutput::new(&format!("{} refresh Out ports", self.client_name))?;

        self.refresh_from(temp_conn)?;

        Ok(())
    }

    pub fn connect(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        let port = self
            .map
            .get(&port_name)
            .ok_or_else(|| Error::PortNotFound(port_name.clone()))?
            .clone();

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name)
            .map_err(|_| {
                self.cur = None;
                Error::PortConnection
            })?;

        log::info!("Connected for Output to {}", port_name);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        self.midi_conn.send(msg)
    }

    pub fn drain(&mut self, timeout: Duration) {
        self.midi_conn.drain(timeout)
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::info!("Disconnected Output from {}", cur);
        }
    }
}

/// A connectivity transition for one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connectivity {
    pub direction: Direction,
    pub is_connected: bool,
}

pub struct InOutManager {
    pub ins: PortsIn<channel::Sender<Msg>>,
    pub outs: PortsOut,
}

impl InOutManager {
    pub fn try_new(client_name: Arc<str>, msg_tx: channel::Sender<Msg>) -> Result<Self, Error> {
        let ins = PortsIn::try_new(client_name.clone(), msg_tx)?;
        let outs = PortsOut::try_new(client_name)?;

        Ok(Self { ins, outs })
    }

    pub fn connect(&mut self, direction: Direction, port_name: Arc<str>) -> Result<(), Error> {
        use Direction::*;
        match direction {
            In => {
                self.ins.connect(port_name, |_ts, msg, msg_tx| {
                    let _ = msg_tx.send(msg.into());
                })?;
            }
            Out => {
                self.outs.connect(port_name)?;
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self, direction: Direction) {
        use Direction::*;
        match direction {
            In => self.ins.disconnect(),
            Out => self.outs.disconnect(),
        }
    }

    pub fn is_connected(&self, direction: Direction) -> bool {
        match direction {
            Direction::In => self.ins.is_connected(),
            Direction::Out => self.outs.is_connected(),
        }
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        self.outs.send(msg)
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        self.ins.refresh()?;
        self.outs.refresh()?;

        Ok(())
    }

    /// Refreshes the port lists and reconciles the connections with them.
    ///
    /// Ports which vanished are disconnected, missing connections
    /// are established with the first port matching `matcher`.
    ///
    /// Returns the connectivity transitions in the order they occurred.
    pub fn probe(&mut self, matcher: &PortMatcher) -> Result<Vec<Connectivity>, Error> {
        self.refresh()?;

        let mut changes = Vec::new();
        for direction in [Direction::In, Direction::Out] {
            let is_stale = match direction {
                Direction::In => self.ins.is_stale(),
                Direction::Out => self.outs.is_stale(),
            };

            if is_stale {
                log::debug!("{direction} vanished");
                self.disconnect(direction);
                changes.push(Connectivity {
                    direction,
                    is_connected: false,
                });
            }

            if self.is_connected(direction) {
                continue;
            }

            let (found, available) = match direction {
                Direction::In => (self.ins.find(matcher), self.ins.list().collect::<Vec<_>>()),
                Direction::Out => (self.outs.find(matcher), self.outs.list().collect()),
            };

            match found {
                Some(port_name) => match self.connect(direction, port_name) {
                    Ok(()) => changes.push(Connectivity {
                        direction,
                        is_connected: true,
                    }),
                    Err(err) => log::debug!("Probe {direction}: {err}"),
                },
                None => log::trace!("Probe {direction}: no match in {available:?}"),
            }
        }

        Ok(changes)
    }
}
