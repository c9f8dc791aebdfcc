//! The wizard host: where state updates and failures are delivered.

use std::sync::{Mutex, PoisonError};

use crate::refresh::HostError;
use crate::validation::WizardState;

/// Receiver of session notifications.
///
/// `state_changed` fires exactly once after every mutation, carrying the
/// freshly computed pair. Fetch failures arrive through `display_error`
/// before the accompanying state update.
pub trait WizardHost: Send + Sync {
    fn state_changed(&self, state: WizardState);

    fn display_error(&self, error: &HostError);

    fn show_busy(&self) {}

    fn hide_busy(&self) {}
}

/// A host that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl WizardHost for NullHost {
    fn state_changed(&self, _state: WizardState) {}

    fn display_error(&self, _error: &HostError) {}
}

/// One notification seen by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    StateChanged(WizardState),
    Error(HostError),
    ShowBusy,
    HideBusy,
}

/// A host that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().clone()
    }

    /// The most recently published state.
    pub fn last_state(&self) -> Option<WizardState> {
        self.lock().iter().rev().find_map(|e| match e {
            HostEvent::StateChanged(state) => Some(*state),
            _ => None,
        })
    }

    pub fn state_changes(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| matches!(e, HostEvent::StateChanged(_)))
            .count()
    }

    pub fn errors(&self) -> Vec<HostError> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, event: HostEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HostEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WizardHost for RecordingHost {
    fn state_changed(&self, state: WizardState) {
        self.push(HostEvent::StateChanged(state));
    }

    fn display_error(&self, error: &HostError) {
        self.push(HostEvent::Error(error.clone()));
    }

    fn show_busy(&self) {
        self.push(HostEvent::ShowBusy);
    }

    fn hide_busy(&self) {
        self.push(HostEvent::HideBusy);
    }
}
