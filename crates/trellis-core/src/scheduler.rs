//! Timed-task scheduler for deferred and periodic work.
//!
//! Tasks are kept in a priority queue ordered by their next run time. A
//! repeating task's closure votes on every tick whether the task should keep
//! running; when it votes [`TaskControl::Finished`] the task's completion
//! callback (if any) runs and the task is removed. This lets animation loops
//! terminate themselves when their value reaches its target instead of
//! requiring the owner to watch them.
//!
//! The scheduler does not own a thread. Hosts call [`TaskScheduler::process_ready`]
//! from their event loop (or a timer) and can use
//! [`TaskScheduler::time_until_next`] to sleep precisely.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SchedulerError};

new_key_type! {
    /// A unique identifier for a scheduled task.
    pub struct TaskId;
}

/// A repeating task's per-tick vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Run again after the task's interval.
    Continue,
    /// Stop; the completion callback runs and the task is removed.
    Finished,
}

type BoxedStep = Box<dyn FnMut() -> TaskControl + Send + 'static>;
type BoxedFinish = Box<dyn FnOnce() + Send + 'static>;

/// Internal scheduled task data.
struct TaskData {
    /// When this task should next execute.
    next_run: Instant,
    /// The interval between runs.
    interval: Duration,
    /// Whether this task is active.
    active: bool,
    /// Per-tick closure. `None` while the closure is checked out of the
    /// scheduler for execution.
    step: Option<BoxedStep>,
    /// Runs once when the step closure votes `Finished`. Not run on cancel.
    on_finish: Option<BoxedFinish>,
}

/// An entry in the scheduler queue (min-heap by execution time).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TaskId,
    run_time: Instant,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_time == other.run_time
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.run_time.cmp(&self.run_time)
    }
}

/// Manages scheduled tasks ordered by their next execution time.
pub struct TaskScheduler {
    /// All registered tasks.
    tasks: SlotMap<TaskId, TaskData>,
    /// Priority queue of pending executions (min-heap by run time).
    queue: BinaryHeap<QueueEntry>,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("tasks", &self.tasks.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl TaskScheduler {
    /// Create a new task scheduler.
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Schedule a one-shot task to execute after the specified delay.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn schedule_once<F>(&mut self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let mut task = Some(task);
        self.insert(delay, None, move || {
            if let Some(task) = task.take() {
                task();
            }
            TaskControl::Finished
        })
    }

    /// Schedule a repeating task that executes every `interval`.
    ///
    /// The closure runs on every tick and decides whether the task keeps
    /// going. The first execution occurs after `interval`.
    pub fn schedule_repeating<F>(&mut self, interval: Duration, step: F) -> TaskId
    where
        F: FnMut() -> TaskControl + Send + 'static,
    {
        self.insert(interval, None, step)
    }

    /// Schedule a repeating task with a completion callback.
    ///
    /// `on_finish` runs exactly once, after the tick on which `step` votes
    /// [`TaskControl::Finished`]. It does not run if the task is cancelled.
    pub fn schedule_repeating_with<F, C>(
        &mut self,
        interval: Duration,
        step: F,
        on_finish: C,
    ) -> TaskId
    where
        F: FnMut() -> TaskControl + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.insert_with(interval, Some(Box::new(on_finish)), Box::new(step))
    }

    fn insert<F>(&mut self, interval: Duration, on_finish: Option<BoxedFinish>, step: F) -> TaskId
    where
        F: FnMut() -> TaskControl + Send + 'static,
    {
        self.insert_with(interval, on_finish, Box::new(step))
    }

    fn insert_with(
        &mut self,
        interval: Duration,
        on_finish: Option<BoxedFinish>,
        step: BoxedStep,
    ) -> TaskId {
        let next_run = Instant::now() + interval;
        let id = self.tasks.insert(TaskData {
            next_run,
            interval,
            active: true,
            step: Some(step),
            on_finish,
        });
        self.queue.push(QueueEntry {
            id,
            run_time: next_run,
        });
        id
    }

    /// Cancel and remove a scheduled task.
    ///
    /// The task's completion callback does not run. Returns an error if the
    /// task has already finished or was never scheduled.
    pub fn cancel(&mut self, id: TaskId) -> Result<()> {
        if let Some(task) = self.tasks.get_mut(id) {
            task.active = false;
            self.tasks.remove(id);
            Ok(())
        } else {
            Err(SchedulerError::InvalidTaskId)
        }
    }

    /// Check if a scheduled task is currently active.
    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.get(id).is_some_and(|t| t.active)
    }

    /// Get the duration until the next task should execute, if any.
    ///
    /// Returns `None` if there are no active scheduled tasks.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        // Drop stale entries for cancelled tasks from the front of the queue.
        while let Some(entry) = self.queue.peek() {
            if !self.tasks.get(entry.id).is_some_and(|t| t.active) {
                self.queue.pop();
            } else {
                break;
            }
        }

        self.queue.peek().map(|entry| {
            let now = Instant::now();
            if entry.run_time > now {
                entry.run_time - now
            } else {
                Duration::ZERO
            }
        })
    }

    /// Process all tasks that should execute now.
    ///
    /// Returns the number of task executions performed.
    pub fn process_ready(&mut self) -> usize {
        let now = Instant::now();
        let mut executed = 0;

        while let Some((id, run_time, mut step)) = self.check_out_ready(now) {
            let control = step();
            executed += 1;
            if let Some(on_finish) = self.check_in(id, run_time, step, control) {
                on_finish();
            }
        }

        executed
    }

    /// Pop the next due entry and check its step closure out of the task.
    ///
    /// The task stays registered (and cancellable) while its closure runs;
    /// callers must hand the closure back through [`Self::check_in`]. This
    /// split lets [`SharedTaskScheduler`] release its lock around the call,
    /// so callbacks may re-enter the scheduler.
    fn check_out_ready(&mut self, now: Instant) -> Option<(TaskId, Instant, BoxedStep)> {
        loop {
            let entry = *self.queue.peek()?;
            if entry.run_time > now {
                return None;
            }
            self.queue.pop();
            let id = entry.id;

            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };
            if !task.active {
                continue;
            }
            // Stale entry from a previous requeue of the same task.
            if entry.run_time != task.next_run {
                continue;
            }
            let Some(step) = task.step.take() else {
                continue;
            };

            tracing::trace!(target: "trellis_core::scheduler", ?id, "executing task");
            return Some((id, entry.run_time, step));
        }
    }

    /// Return a checked-out closure and apply its vote.
    ///
    /// If the task was cancelled while its closure ran, the closure is
    /// dropped and the completion callback is suppressed. On `Finished`, the
    /// completion callback is handed back for the caller to invoke (outside
    /// any lock).
    fn check_in(
        &mut self,
        id: TaskId,
        run_time: Instant,
        step: BoxedStep,
        control: TaskControl,
    ) -> Option<BoxedFinish> {
        let task = self.tasks.get_mut(id)?;
        match control {
            TaskControl::Continue => {
                // Requeue from the scheduled time to avoid drift.
                let next_run = run_time + task.interval;
                task.next_run = next_run;
                task.step = Some(step);
                self.queue.push(QueueEntry { id, run_time: next_run });
                None
            }
            TaskControl::Finished => {
                task.active = false;
                let on_finish = task.on_finish.take();
                self.tasks.remove(id);
                on_finish
            }
        }
    }

    /// Get the number of active scheduled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|(_, t)| t.active).count()
    }

    /// Check if there are any tasks ready to execute now.
    pub fn has_ready(&mut self) -> bool {
        while let Some(entry) = self.queue.peek() {
            if !self.tasks.get(entry.id).is_some_and(|t| t.active) {
                self.queue.pop();
            } else {
                break;
            }
        }

        self.queue
            .peek()
            .is_some_and(|entry| entry.run_time <= Instant::now())
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe wrapper around [`TaskScheduler`] for shared ownership.
#[derive(Debug, Default)]
pub struct SharedTaskScheduler {
    inner: Mutex<TaskScheduler>,
}

impl SharedTaskScheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TaskScheduler::new()),
        }
    }

    pub fn schedule_once<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().schedule_once(delay, task)
    }

    pub fn schedule_repeating<F>(&self, interval: Duration, step: F) -> TaskId
    where
        F: FnMut() -> TaskControl + Send + 'static,
    {
        self.inner.lock().schedule_repeating(interval, step)
    }

    pub fn schedule_repeating_with<F, C>(&self, interval: Duration, step: F, on_finish: C) -> TaskId
    where
        F: FnMut() -> TaskControl + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.inner
            .lock()
            .schedule_repeating_with(interval, step, on_finish)
    }

    pub fn cancel(&self, id: TaskId) -> Result<()> {
        self.inner.lock().cancel(id)
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.inner.lock().is_active(id)
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.lock().time_until_next()
    }

    /// Process all tasks that should execute now.
    ///
    /// The inner lock is released while each step closure and completion
    /// callback runs, so callbacks may schedule or cancel tasks on this
    /// scheduler without deadlocking.
    pub fn process_ready(&self) -> usize {
        let now = Instant::now();
        let mut executed = 0;

        loop {
            let Some((id, run_time, mut step)) = self.inner.lock().check_out_ready(now) else {
                break;
            };
            let control = step();
            executed += 1;
            let on_finish = self.inner.lock().check_in(id, run_time, step, control);
            if let Some(on_finish) = on_finish {
                on_finish();
            }
        }

        executed
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

    pub fn has_ready(&self) -> bool {
        self.inner.lock().has_ready()
    }
}
