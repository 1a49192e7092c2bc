//! Interpolation scheduling for short UI state transitions.
//!
//! An [`AnimationChannel`] represents one logical animation slot (a widget's
//! hover glow, a checkbox's check mark). Starting a new animation on a
//! channel cancels whatever was running there, so rapid state flips never
//! stack competing loops. Cancelling is synchronous and idempotent, and a
//! dropped channel cancels its animation, so a torn-down widget leaves no
//! ticking task behind.
//!
//! Two interpolators cover the transitions the grid needs:
//!
//! - a toggle interpolator stepping an `f32` progress between 0 and 1 in
//!   increments of 0.2 every 20 ms (check marks, switches);
//! - an intensity interpolator stepping an `i32` between 0 and 255 in
//!   increments of 20 every 10 ms (hover emphasis).
//!
//! Tick closures mutate their interpolator value and notify the host; they
//! never touch model or layout state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::scheduler::{SharedTaskScheduler, TaskControl, TaskId};

/// Tick interval for toggle (progress) animations.
pub const TOGGLE_INTERVAL: Duration = Duration::from_millis(20);

/// Per-tick increment for toggle animations.
pub const TOGGLE_STEP: f32 = 0.2;

/// Tick interval for intensity animations.
pub const INTENSITY_INTERVAL: Duration = Duration::from_millis(10);

/// Per-tick increment for intensity animations.
pub const INTENSITY_STEP: i32 = 20;

/// Upper bound of the intensity range.
pub const INTENSITY_MAX: i32 = 255;

/// Advance a toggle progress value one tick toward its target.
///
/// Returns the new value and whether the target (1.0 when `rising`, 0.0
/// otherwise) has been reached. The value lands exactly on the target.
pub fn advance_toggle(value: f32, rising: bool) -> (f32, bool) {
    if rising {
        let next = (value + TOGGLE_STEP).min(1.0);
        (next, next >= 1.0)
    } else {
        let next = (value - TOGGLE_STEP).max(0.0);
        (next, next <= 0.0)
    }
}

/// Advance an intensity value one tick toward its target.
///
/// Returns the new value and whether the target (255 when `rising`, 0
/// otherwise) has been reached.
pub fn advance_intensity(value: i32, rising: bool) -> (i32, bool) {
    if rising {
        let next = (value + INTENSITY_STEP).min(INTENSITY_MAX);
        (next, next >= INTENSITY_MAX)
    } else {
        let next = (value - INTENSITY_STEP).max(0);
        (next, next <= 0)
    }
}

/// One logical animation slot backed by the shared task scheduler.
///
/// At most one animation runs per channel; starting a new one replaces the
/// old. Dropping the channel cancels any running animation.
pub struct AnimationChannel {
    scheduler: Arc<SharedTaskScheduler>,
    task: Mutex<Option<TaskId>>,
}

impl std::fmt::Debug for AnimationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationChannel")
            .field("running", &self.is_running())
            .finish()
    }
}

impl AnimationChannel {
    /// Create a channel on the given scheduler.
    pub fn new(scheduler: Arc<SharedTaskScheduler>) -> Self {
        Self {
            scheduler,
            task: Mutex::new(None),
        }
    }

    /// Start an animation, replacing any animation already running on this
    /// channel.
    ///
    /// `step` runs every `interval` and votes whether to continue;
    /// `on_finish` runs once after the final tick (not on cancel).
    pub fn start<F, C>(&self, interval: Duration, step: F, on_finish: C)
    where
        F: FnMut() -> TaskControl + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let mut slot = self.task.lock();
        if let Some(old) = slot.take() {
            // The old task may have already finished itself.
            let _ = self.scheduler.cancel(old);
        }
        *slot = Some(
            self.scheduler
                .schedule_repeating_with(interval, step, on_finish),
        );
    }

    /// Animate a shared toggle value toward 1.0 (`rising`) or 0.0.
    ///
    /// `on_tick` runs after every step (typically a repaint notification);
    /// `on_finish` runs once the value lands on its target.
    pub fn animate_toggle<F, C>(&self, value: Arc<Mutex<f32>>, rising: bool, on_tick: F, on_finish: C)
    where
        F: Fn() + Send + Sync + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.start(
            TOGGLE_INTERVAL,
            move || {
                let mut v = value.lock();
                let (next, done) = advance_toggle(*v, rising);
                *v = next;
                drop(v);
                on_tick();
                if done {
                    TaskControl::Finished
                } else {
                    TaskControl::Continue
                }
            },
            on_finish,
        );
    }

    /// Animate a shared intensity value toward 255 (`rising`) or 0.
    pub fn animate_intensity<F>(&self, value: Arc<Mutex<i32>>, rising: bool, on_tick: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.start(
            INTENSITY_INTERVAL,
            move || {
                let mut v = value.lock();
                let (next, done) = advance_intensity(*v, rising);
                *v = next;
                drop(v);
                on_tick();
                if done {
                    TaskControl::Finished
                } else {
                    TaskControl::Continue
                }
            },
            || {},
        );
    }

    /// Cancel the running animation, if any. Idempotent.
    pub fn cancel(&self) {
        if let Some(id) = self.task.lock().take() {
            let _ = self.scheduler.cancel(id);
        }
    }

    /// Whether an animation task is currently registered on this channel.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .is_some_and(|id| self.scheduler.is_active(id))
    }
}

impl Drop for AnimationChannel {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;

    fn drive(scheduler: &SharedTaskScheduler, until_idle_for: Duration) {
        // Pump the scheduler until no task has been ready for a while.
        let mut last_activity = Instant::now();
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if scheduler.process_ready() > 0 {
                last_activity = Instant::now();
            } else if last_activity.elapsed() > until_idle_for {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_advance_toggle_steps() {
        let (v, done) = advance_toggle(0.0, true);
        assert!((v - 0.2).abs() < 1e-6);
        assert!(!done);

        // Lands exactly on the target.
        let (v, done) = advance_toggle(0.9, true);
        assert_eq!(v, 1.0);
        assert!(done);

        let (v, done) = advance_toggle(0.1, false);
        assert_eq!(v, 0.0);
        assert!(done);
    }

    #[test]
    fn test_advance_intensity_steps() {
        let (v, done) = advance_intensity(0, true);
        assert_eq!(v, 20);
        assert!(!done);

        let (v, done) = advance_intensity(250, true);
        assert_eq!(v, 255);
        assert!(done);

        let (v, done) = advance_intensity(15, false);
        assert_eq!(v, 0);
        assert!(done);
    }

    #[test]
    fn test_toggle_animation_completes() {
        let scheduler = Arc::new(SharedTaskScheduler::new());
        let channel = AnimationChannel::new(scheduler.clone());
        let progress = Arc::new(Mutex::new(0.0f32));
        let finished = Arc::new(AtomicUsize::new(0));

        let finished_clone = finished.clone();
        channel.animate_toggle(progress.clone(), true, || {}, move || {
            finished_clone.fetch_add(1, Ordering::SeqCst);
        });

        drive(&scheduler, Duration::from_millis(60));

        assert_eq!(*progress.lock(), 1.0);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert!(!channel.is_running());
    }

    #[test]
    fn test_start_replaces_running_animation() {
        let scheduler = Arc::new(SharedTaskScheduler::new());
        let channel = AnimationChannel::new(scheduler.clone());
        let progress = Arc::new(Mutex::new(0.0f32));
        let first_finished = Arc::new(AtomicUsize::new(0));

        let first_clone = first_finished.clone();
        channel.animate_toggle(progress.clone(), true, || {}, move || {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Immediately reverse direction; the first loop must be replaced
        // before it ever ticks.
        channel.animate_toggle(progress.clone(), false, || {}, || {});

        drive(&scheduler, Duration::from_millis(60));

        assert_eq!(*progress.lock(), 0.0);
        assert_eq!(first_finished.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_tick_may_start_animation_on_same_channel() {
        let scheduler = Arc::new(SharedTaskScheduler::new());
        let channel = Arc::new(AnimationChannel::new(scheduler.clone()));
        let value = Arc::new(Mutex::new(0i32));
        let reversed = Arc::new(AtomicUsize::new(0));

        // A tick callback reversing its own channel must not deadlock on
        // the scheduler lock.
        let channel_clone = channel.clone();
        let value_clone = value.clone();
        let reversed_clone = reversed.clone();
        channel.animate_intensity(value.clone(), true, move || {
            if reversed_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                channel_clone.animate_intensity(value_clone.clone(), false, || {});
            }
        });

        drive(&scheduler, Duration::from_millis(60));

        assert_eq!(*value.lock(), 0);
        assert_eq!(scheduler.active_count(), 0);
        assert!(!channel.is_running());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let scheduler = Arc::new(SharedTaskScheduler::new());
        let channel = AnimationChannel::new(scheduler.clone());
        let value = Arc::new(Mutex::new(0i32));

        channel.animate_intensity(value, true, || {});
        assert!(channel.is_running());

        channel.cancel();
        assert!(!channel.is_running());
        // Second cancel is a no-op.
        channel.cancel();
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let scheduler = Arc::new(SharedTaskScheduler::new());
        {
            let channel = AnimationChannel::new(scheduler.clone());
            channel.animate_intensity(Arc::new(Mutex::new(0)), true, || {});
            assert_eq!(scheduler.active_count(), 1);
        }
        assert_eq!(scheduler.active_count(), 0);
    }
}
