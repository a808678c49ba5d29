use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, Weak},
};

use super::{BankMode, Parameter, ParameterHandle, ParameterProvider};
use crate::midi::u7;

/// Max number of effect parameters exposed in `DeviceParams` mode.
pub const DEVICE_PARAM_SLOTS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankKind {
    Pots,
    Faders,
}

impl BankKind {
    /// Controller number of the first control in the bank.
    pub fn base_cc(self) -> u8 {
        match self {
            BankKind::Pots => 0x15,
            BankKind::Faders => 0x35,
        }
    }

    /// Controller number the device uses to report a mode selection.
    pub fn mode_select_cc(self) -> u8 {
        match self {
            BankKind::Pots => 0x09,
            BankKind::Faders => 0x0a,
        }
    }

    /// Number of controls, including the master fader.
    pub fn size(self) -> usize {
        match self {
            BankKind::Pots => 8,
            BankKind::Faders => 9,
        }
    }

    pub fn default_mode(self) -> BankMode {
        match self {
            BankKind::Pots => BankMode::Pan,
            BankKind::Faders => BankMode::Volume,
        }
    }

    pub fn supports(self, mode: BankMode) -> bool {
        !(self == BankKind::Faders && mode == BankMode::Pan)
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankKind::Pots => f.write_str("pots"),
            BankKind::Faders => f.write_str("faders"),
        }
    }
}

/// A group of continuous controls sharing one mode.
///
/// Bindings only hold weak references: the `ParameterProvider` owns the
/// parameters and a binding whose parameter was dropped behaves as unbound.
pub struct ControlBank {
    kind: BankKind,
    mode: BankMode,
    bindings: Vec<Option<Weak<dyn Parameter>>>,
    touched: BTreeSet<usize>,
}

impl fmt::Debug for ControlBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlBank")
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .field("bound", &self.bound_count())
            .field("touched", &self.touched)
            .finish()
    }
}

impl ControlBank {
    /// Builds the bank in its default mode, binding it right away.
    pub fn new(kind: BankKind, params: &dyn ParameterProvider) -> Self {
        let mut this = Self {
            kind,
            mode: kind.default_mode(),
            bindings: Vec::new(),
            touched: BTreeSet::new(),
        };
        this.rebind(params);

        this
    }

    pub fn kind(&self) -> BankKind {
        self.kind
    }

    pub fn mode(&self) -> BankMode {
        self.mode
    }

    pub fn is_touched(&self, index: usize) -> bool {
        self.touched.contains(&index)
    }

    pub fn touched_count(&self) -> usize {
        self.touched.len()
    }

    /// Returns the parameter bound at `index`, if it's still alive.
    pub fn binding(&self, index: usize) -> Option<ParameterHandle> {
        self.bindings.get(index)?.as_ref()?.upgrade()
    }

    pub fn bound_count(&self) -> usize {
        (0..self.bindings.len())
            .filter(|&idx| self.binding(idx).is_some())
            .count()
    }

    fn index(&self, ctrl: u8) -> Option<usize> {
        ctrl.checked_sub(self.kind.base_cc())
            .map(usize::from)
            .filter(|&idx| idx < self.kind.size())
    }

    /// Handles a touch channel CC.
    ///
    /// Returns `false` if `ctrl` doesn't belong to this bank.
    pub fn handle_touch(&mut self, ctrl: u8, value: u8) -> bool {
        let index = match self.index(ctrl) {
            Some(index) => index,
            None => return false,
        };

        if u7::is_on(value) {
            self.touch(index);
        } else {
            self.release_touch(index);
        }

        true
    }

    /// Handles a value channel CC: either a mode selection or a control value.
    ///
    /// Returns `false` if `ctrl` doesn't belong to this bank.
    pub fn handle_value(&mut self, ctrl: u8, value: u8, params: &dyn ParameterProvider) -> bool {
        if ctrl == self.kind.mode_select_cc() {
            match BankMode::from_code(value) {
                Some(mode) => self.mode_switch(mode, params),
                None => log::debug!("{}: ignoring unknown mode code {value:#04x}", self.kind),
            }

            return true;
        }

        let index = match self.index(ctrl) {
            Some(index) => index,
            None => return false,
        };

        let param = match self.binding(index) {
            Some(param) => param,
            None => {
                log::trace!("{} {index}: unbound in {} mode", self.kind, self.mode);
                return true;
            }
        };

        // Touch messages can get lost: make sure the gesture is started.
        if self.touched.insert(index) {
            param.start_touch();
        }

        let normalized = u7::to_normalized(value);
        log::trace!("{} {index}: {} <- {normalized:.3}", self.kind, param.name());
        param.normalize_and_set(normalized);

        true
    }

    /// Switches to `mode` and rebinds every control.
    ///
    /// Modes the bank doesn't support are ignored.
    pub fn mode_switch(&mut self, mode: BankMode, params: &dyn ParameterProvider) {
        if !self.kind.supports(mode) {
            log::debug!("{}: {mode} mode not supported, ignoring", self.kind);
            return;
        }

        log::debug!("{}: switching mode {} -> {mode}", self.kind, self.mode);
        self.mode = mode;
        self.rebind(params);
    }

    /// Rebuilds all the bindings for current mode.
    ///
    /// Controls still touched are released first.
    pub fn rebind(&mut self, params: &dyn ParameterProvider) {
        self.release();

        let size = self.kind.size();
        let mut bindings: Vec<Option<Weak<dyn Parameter>>> = vec![None; size];

        if self.mode == BankMode::DeviceParams {
            if let Some(target) = params.selected_target() {
                let count = params.device_param_count(target).min(DEVICE_PARAM_SLOTS);
                for (idx, binding) in bindings.iter_mut().take(count).enumerate() {
                    *binding = params
                        .resolve_device_param(target, idx)
                        .as_ref()
                        .map(Arc::downgrade);
                }
            } else {
                log::debug!("{}: no selected target for device params", self.kind);
            }
        } else {
            for (idx, binding) in bindings.iter_mut().enumerate() {
                *binding = params.resolve(self.mode, idx).as_ref().map(Arc::downgrade);
            }
        }

        self.bindings = bindings;
        log::debug!(
            "{}: {} / {size} bound in {} mode",
            self.kind,
            self.bound_count(),
            self.mode,
        );
    }

    /// Stops pending touches and drops the bindings.
    pub fn release(&mut self) {
        for index in std::mem::take(&mut self.touched) {
            if let Some(param) = self.binding(index) {
                param.stop_touch();
            }
        }

        self.bindings.clear();
    }

    fn touch(&mut self, index: usize) {
        match self.binding(index) {
            Some(param) => {
                if self.touched.insert(index) {
                    log::trace!("{} {index}: touching {}", self.kind, param.name());
                    param.start_touch();
                }
            }
            None => log::trace!("{} {index}: touch on unbound control", self.kind),
        }
    }

    fn release_touch(&mut self, index: usize) {
        if !self.touched.remove(&index) {
            return;
        }

        if let Some(param) = self.binding(index) {
            log::trace!("{} {index}: releasing {}", self.kind, param.name());
            param.stop_touch();
        }
    }
}
