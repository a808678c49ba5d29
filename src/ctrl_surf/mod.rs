pub mod bank;
pub use bank::{BankKind, ControlBank};

pub mod button;
pub use button::ButtonRouter;

pub mod error;
pub use error::Error;

pub mod event;
pub use event::Action;

pub mod identity;
pub use identity::{DeviceInfo, Variant};

pub mod mode;
pub use mode::{BankMode, PadMode};

pub mod msg;
pub use msg::{Msg, Status};

pub mod param;
pub use param::{ActionHandler, Outcome, Parameter, ParameterHandle, ParameterProvider};

pub mod session;
pub use session::DeviceSession;

pub mod surface;
pub use surface::Launchkey;

use crate::midi;

/// A hardware control surface driven from a single control thread.
///
/// Implementors never perform I/O: they consume device messages and
/// connectivity transitions, and return the messages to forward.
pub trait ControlSurface: Send + 'static {
    fn connectivity_changed(&mut self, direction: midi::port::Direction, is_connected: bool)
        -> Vec<Msg>;

    fn msg_from_device(&mut self, msg: midi::Msg, params: &dyn ParameterProvider) -> Vec<Msg>;

    /// Notifies the surface that the host's selected target changed.
    fn selection_changed(&mut self, params: &dyn ParameterProvider);

    fn is_active(&self) -> bool;

    /// Leaves the host-aware mode, if entered. Safe to call more than once.
    ///
    /// The surface then considers both ports closed.
    fn teardown(&mut self) -> Vec<Msg>;
}
