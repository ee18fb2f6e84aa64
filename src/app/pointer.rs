use std::collections::HashMap;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{ApplicationWindow, EventControllerMotion};

use crate::picker::{ListenerId, PointerSource};

pub(super) type MotionHandler = Rc<dyn Fn(f64, f64)>;

/// Window-wide pointer-move listeners backed by `EventControllerMotion`.
pub(super) struct WindowPointerSource {
    window: ApplicationWindow,
    on_motion: MotionHandler,
    next_id: u64,
    controllers: HashMap<ListenerId, EventControllerMotion>,
}

impl WindowPointerSource {
    pub(super) fn new(window: ApplicationWindow, on_motion: MotionHandler) -> Self {
        Self {
            window,
            on_motion,
            next_id: 0,
            controllers: HashMap::new(),
        }
    }
}

impl PointerSource for WindowPointerSource {
    fn add_move_listener(&mut self) -> ListenerId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = ListenerId::new(self.next_id);

        let motion = EventControllerMotion::new();
        let on_motion = self.on_motion.clone();
        motion.connect_motion(move |_, x, y| on_motion(x, y));
        self.window.add_controller(motion.clone());
        self.controllers.insert(id, motion);
        id
    }

    fn remove_move_listener(&mut self, id: ListenerId) {
        if let Some(motion) = self.controllers.remove(&id) {
            self.window.remove_controller(&motion);
        }
    }
}
