//! The host side: parameters the banks are bound to and actions the buttons trigger.

use std::sync::Arc;

use super::{Action, BankMode};

/// How a value change propagates to grouped or linked targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupControl {
    NoGroup,
    UseGroup,
}

/// A host parameter a hardware control can drive.
pub trait Parameter: Send + Sync {
    fn name(&self) -> &str;

    /// Maps a normalized interface value in `[0.0, 1.0]` to the parameter's internal value.
    fn interface_to_internal(&self, normalized: f64) -> f64;

    fn set_value(&self, value: f64, group: GroupControl);

    fn start_touch(&self);
    fn stop_touch(&self);

    /// Applies a normalized value to this parameter only.
    fn normalize_and_set(&self, normalized: f64) {
        self.set_value(self.interface_to_internal(normalized), GroupControl::NoGroup);
    }
}

pub type ParameterHandle = Arc<dyn Parameter>;

/// Identifies the target whose active effect is exposed in `DeviceParams` mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetId(pub usize);

/// Resolves the parameters the banks are bound to.
///
/// The provider owns the returned handles and must keep them alive as long as
/// they are meant to be controllable: the surface only keeps weak references.
pub trait ParameterProvider {
    fn resolve(&self, mode: BankMode, index: usize) -> Option<ParameterHandle>;

    fn selected_target(&self) -> Option<TargetId>;

    /// Number of parameters of the selected target's active effect.
    fn device_param_count(&self, target: TargetId) -> usize;

    fn resolve_device_param(&self, target: TargetId, index: usize) -> Option<ParameterHandle>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    SelectionChanged,
    Ignored,
}

pub trait ActionHandler {
    fn handle_action(&mut self, action: Action) -> Outcome;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub(crate) enum Call {
        Set(f64, GroupControl),
        StartTouch,
        StopTouch,
    }

    #[derive(Debug)]
    pub(crate) struct FakeParam {
        name: String,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeParam {
        pub(crate) fn new(name: impl ToString) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl Parameter for FakeParam {
        fn name(&self) -> &str {
            &self.name
        }

        fn interface_to_internal(&self, normalized: f64) -> f64 {
            normalized
        }

        fn set_value(&self, value: f64, group: GroupControl) {
            self.calls.lock().unwrap().push(Call::Set(value, group));
        }

        fn start_touch(&self) {
            self.calls.lock().unwrap().push(Call::StartTouch);
        }

        fn stop_touch(&self) {
            self.calls.lock().unwrap().push(Call::StopTouch);
        }
    }

    /// Resolves `(mode, index)` to parameters registered beforehand
    /// and records every resolution request.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub(crate) params: HashMap<(BankMode, usize), Arc<FakeParam>>,
        pub(crate) selected: Option<TargetId>,
        pub(crate) device_params: Vec<Arc<FakeParam>>,
        pub(crate) resolved: RefCell<Vec<(BankMode, usize)>>,
    }

    impl FakeProvider {
        /// Registers a parameter for each mode & index.
        pub(crate) fn populated(modes: &[BankMode], count: usize) -> Self {
            let mut this = Self::default();
            for &mode in modes {
                for idx in 0..count {
                    this.params
                        .insert((mode, idx), FakeParam::new(format!("{mode} {idx}")));
                }
            }

            this
        }

        pub(crate) fn param(&self, mode: BankMode, index: usize) -> &Arc<FakeParam> {
            &self.params[&(mode, index)]
        }
    }

    impl ParameterProvider for FakeProvider {
        fn resolve(&self, mode: BankMode, index: usize) -> Option<ParameterHandle> {
            self.resolved.borrow_mut().push((mode, index));
            self.params
                .get(&(mode, index))
                .map(|param| param.clone() as ParameterHandle)
        }

        fn selected_target(&self) -> Option<TargetId> {
            self.selected
        }

        fn device_param_count(&self, _target: TargetId) -> usize {
            self.device_params.len()
        }

        fn resolve_device_param(&self, _target: TargetId, index: usize) -> Option<ParameterHandle> {
            self.device_params
                .get(index)
                .map(|param| param.clone() as ParameterHandle)
        }
    }

    #[test]
    fn normalize_and_set_bypasses_groups() {
        let param = FakeParam::new("gain");
        param.normalize_and_set(0.5);
        assert_eq!(param.take_calls(), vec![Call::Set(0.5, GroupControl::NoGroup)]);
    }
}
