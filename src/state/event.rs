#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerEvent {
    StartTracking,
    StopTracking,
}
