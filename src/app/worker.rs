use std::sync::mpsc;
use std::time::Duration;

const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

/// Runs `work` on a background thread and hands its result to `on_done` on
/// the GTK main loop.
pub(super) fn spawn_background<T, W, H>(label: &'static str, work: W, on_done: H)
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    H: FnOnce(T) + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        tracing::debug!(task = label, "background task started");
        let _ = tx.send(work());
    });

    let mut on_done = Some(on_done);
    gtk4::glib::timeout_add_local(RESULT_POLL_INTERVAL, move || match rx.try_recv() {
        Ok(result) => {
            if let Some(on_done) = on_done.take() {
                on_done(result);
            }
            gtk4::glib::ControlFlow::Break
        }
        Err(mpsc::TryRecvError::Empty) => gtk4::glib::ControlFlow::Continue,
        Err(mpsc::TryRecvError::Disconnected) => {
            tracing::warn!(task = label, "background task exited without a result");
            gtk4::glib::ControlFlow::Break
        }
    });
}
