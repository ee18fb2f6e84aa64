use super::error::{StateError, StateResult};
use super::{PickerEvent, PickerState};

#[derive(Debug, Default)]
pub struct StateMachine {
    state: PickerState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn next_state(&self, event: PickerEvent) -> Option<PickerState> {
        use PickerEvent::*;
        match (self.state, event) {
            (PickerState::Idle, StartTracking) => Some(PickerState::Tracking),
            (PickerState::Tracking, StopTracking) => Some(PickerState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: PickerEvent) -> StateResult<PickerState> {
        let from = self.state;
        let next = self.next_state(event).ok_or_else(|| {
            tracing::warn!(from = ?from, event = ?event, "invalid picker transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        self.state = next;
        tracing::debug!(from = ?from, event = ?event, to = ?next, "picker transition");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_state_accepts_only_the_opposite_event() {
        let mut machine = StateMachine::new();
        assert_eq!(
            machine.next_state(PickerEvent::StartTracking),
            Some(PickerState::Tracking)
        );
        assert_eq!(machine.next_state(PickerEvent::StopTracking), None);

        let _ = machine
            .transition(PickerEvent::StartTracking)
            .expect("idle -> tracking should transition");

        assert_eq!(
            machine.next_state(PickerEvent::StopTracking),
            Some(PickerState::Idle)
        );
        assert_eq!(machine.next_state(PickerEvent::StartTracking), None);
    }

    #[test]
    fn transitions_alternate_between_idle_and_tracking() {
        let mut machine = StateMachine::new();
        assert_eq!(
            machine.transition(PickerEvent::StartTracking).expect("start"),
            PickerState::Tracking
        );
        assert_eq!(
            machine.transition(PickerEvent::StopTracking).expect("stop"),
            PickerState::Idle
        );
        assert_eq!(
            machine.transition(PickerEvent::StartTracking).expect("restart"),
            PickerState::Tracking
        );
        assert_eq!(machine.state(), PickerState::Tracking);
    }

    #[test]
    fn invalid_transition_returns_error_without_changing_state() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(PickerEvent::StopTracking)
            .expect_err("idle -> stop tracking should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: PickerState::Idle,
                event: PickerEvent::StopTracking
            }
        ));
        assert_eq!(machine.state(), PickerState::Idle);
    }
}
