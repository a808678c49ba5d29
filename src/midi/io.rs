use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub type MidiIn<D> = DirectionalConnection<midir::MidiInput, midir::MidiInputConnection<D>, D>;
pub type MidiOut = DirectionalConnection<midir::MidiOutput, OutConnection, ()>;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub enum DirectionalConnection<IO: midir::MidiIO, C, D> {
    Connected(C),
    Disconnected((IO, D)),
    None,
}

impl<IO: midir::MidiIO, C, D> Default for DirectionalConnection<IO, C, D> {
    fn default() -> Self {
        Self::None
    }
}

impl<IO: midir::MidiIO, C, D> DirectionalConnection<IO, C, D> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl<D: Send + Clone> MidiIn<D> {
    pub fn try_new(client_name: &str, data: D) -> Result<Self, super::Error> {
        Ok(Self::Disconnected((
            midir::MidiInput::new(client_name)?,
            data,
        )))
    }

    pub fn connect<C>(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        client_port_name: &str,
        callback: C,
    ) -> Result<(), super::Error>
    where
        C: FnMut(u64, &[u8], &mut D) + Send + 'static,
    {
        self.disconnect();
        let (midi_input, data) = match std::mem::take(self) {
            Self::Disconnected(io_data) => io_data,
            other => {
                *self = other;
                return Err(super::Error::PortConnection);
            }
        };

        match midi_input.connect(port, client_port_name, callback, data.clone()) {
            Ok(conn) => *self = Self::Connected(conn),
            Err(err) => {
                // err.into_inner() doesn't give data back, hence the Clone bound on D.
                *self = Self::Disconnected((err.into_inner(), data));
                let err = super::Error::Connection(port_name);
                log::error!("{err}");
                return Err(err);
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        *self = match std::mem::take(self) {
            Self::Connected(conn) => Self::Disconnected(conn.close()),
            other => other,
        };
    }
}

/// An output connection which keeps track of the last emission.
pub struct OutConnection {
    conn: midir::MidiOutputConnection,
    last_sent: Option<Instant>,
}

impl MidiOut {
    pub fn try_new(client_name: &str) -> Result<Self, super::Error> {
        Ok(Self::Disconnected((
            midir::MidiOutput::new(client_name)?,
            (),
        )))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiOutputPort,
        client_port_name: &str,
    ) -> Result<(), super::Error> {
        self.disconnect();
        let midi_output = match std::mem::take(self) {
            Self::Disconnected((midi_output, ())) => midi_output,
            other => {
                *self = other;
                return Err(super::Error::PortConnection);
            }
        };

        match midi_output.connect(port, client_port_name) {
            Ok(conn) => {
                *self = Self::Connected(OutConnection {
                    conn,
                    last_sent: None,
                });

                Ok(())
            }
            Err(err) => {
                *self = Self::Disconnected((err.into_inner(), ()));
                let err = super::Error::Connection(port_name);
                log::error!("{err}");

                Err(err)
            }
        }
    }

    pub fn send(&mut self, msg: &[u8]) -> Result<(), super::Error> {
        match self {
            Self::Connected(out) => {
                out.conn.send(msg).map_err(|err| {
                    log::warn!(
                        "Failed to send MIDI msg {}: {err}",
                        crate::bytes::Displayable::from(msg)
                    );
                    err
                })?;
                out.last_sent = Some(Instant::now());
            }
            _ => return Err(super::Error::NotConnected),
        }

        Ok(())
    }

    /// Blocks until `grace` elapsed since the last message was sent.
    ///
    /// Returns immediately if nothing was sent on this connection.
    pub fn drain(&mut self, grace: Duration) {
        let last_sent = match self {
            Self::Connected(out) => match out.last_sent.take() {
                Some(last_sent) => last_sent,
                None => return,
            },
            _ => return,
        };

        while last_sent.elapsed() < grace {
            std::thread::sleep(DRAIN_POLL_INTERVAL.min(grace.saturating_sub(last_sent.elapsed())));
        }
    }

    pub fn disconnect(&mut self) {
        *self = match std::mem::take(self) {
            Self::Connected(out) => Self::Disconnected((out.conn.close(), ())),
            other => other,
        };
    }
}
