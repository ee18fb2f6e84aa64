/// Whether the picker is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PickerState {
    /// No pointer tracking; the overlay is hidden.
    #[default]
    Idle,
    /// A pointer-move listener is registered and the overlay follows the pointer.
    Tracking,
}

impl PickerState {
    pub const fn is_tracking(self) -> bool {
        matches!(self, Self::Tracking)
    }
}
