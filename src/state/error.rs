use super::event::PickerEvent;
use super::model::PickerState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid picker transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: PickerState,
        event: PickerEvent,
    },
}
