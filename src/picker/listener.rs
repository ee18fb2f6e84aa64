/// Handle for one registered pointer-move listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Host-side registration of the window-wide pointer-move listener.
pub trait PointerSource {
    fn add_move_listener(&mut self) -> ListenerId;

    /// Removing an unknown or already removed id is a no-op.
    fn remove_move_listener(&mut self, id: ListenerId);
}

/// Bookkeeping pointer source for headless hosts and tests.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    active: Vec<ListenerId>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: ListenerId) -> bool {
        self.active.contains(&id)
    }
}

impl PointerSource for ListenerRegistry {
    fn add_move_listener(&mut self) -> ListenerId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = ListenerId::new(self.next_id);
        self.active.push(id);
        id
    }

    fn remove_move_listener(&mut self, id: ListenerId) {
        self.active.retain(|active| *active != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_hands_out_distinct_ids_and_forgets_removed_ones() {
        let mut registry = ListenerRegistry::new();
        let first = registry.add_move_listener();
        let second = registry.add_move_listener();
        assert_ne!(first, second);
        assert_eq!(registry.active_count(), 2);

        registry.remove_move_listener(first);
        registry.remove_move_listener(first);
        assert!(!registry.is_active(first));
        assert!(registry.is_active(second));
        assert_eq!(registry.active_count(), 1);
    }
}
