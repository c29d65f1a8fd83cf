use gloo_timers::callback::Timeout;

/// A one-shot callback that can be cancelled before it fires.
///
/// Dropping the task cancels it, so keeping the task in an effect
/// destructor gives cancellation on unmount or dependency change.
#[must_use = "dropping a DelayedTask cancels it"]
pub struct DelayedTask {
    _timeout: Timeout,
}

impl DelayedTask {
    pub fn schedule<F>(millis: u32, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            _timeout: Timeout::new(millis, callback),
        }
    }
}
