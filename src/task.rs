//! Cooperative task scheduler
//!
//! Tasks are single-fire delayed actions advanced once per host tick. The
//! scheduler never calls back into its owner: `tick` hands the due actions
//! back in the order they became due, and the caller dispatches them. That
//! keeps firing reentrancy-free even when an action restarts or kills tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_SCHEDULER_ID: AtomicU64 = AtomicU64::new(1);

/// How long a task waits before it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDelay {
    /// Number of host ticks
    Ticks(u32),
    /// Wall-clock time, measured in the elapsed time passed to `tick`
    Duration(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fired,
    Killed,
}

#[derive(Debug, Clone, Copy)]
enum Countdown {
    Ticks(u32),
    Duration(Duration),
}

impl Countdown {
    fn start(delay: TaskDelay) -> Self {
        match delay {
            TaskDelay::Ticks(n) => Countdown::Ticks(n),
            TaskDelay::Duration(d) => Countdown::Duration(d),
        }
    }

    /// Advance by one tick, returning how far past due the task is
    fn advance(&mut self, elapsed: Duration) -> Option<Duration> {
        match self {
            Countdown::Ticks(n) => {
                *n = n.saturating_sub(1);
                (*n == 0).then_some(Duration::ZERO)
            }
            Countdown::Duration(remaining) => {
                if elapsed >= *remaining {
                    let overshoot = elapsed - *remaining;
                    *remaining = Duration::ZERO;
                    Some(overshoot)
                } else {
                    *remaining -= elapsed;
                    None
                }
            }
        }
    }
}

/// A "delay, then run" unit
///
/// Creating a task does not schedule it; it only fires once added to a
/// [`TaskScheduler`].
#[derive(Debug, Clone)]
pub struct Task<A> {
    delay: TaskDelay,
    action: A,
    state: TaskState,
    countdown: Countdown,
}

impl<A> Task<A> {
    /// Wait `delay`, then emit `action`
    pub fn sequence(delay: TaskDelay, action: A) -> Self {
        Self {
            delay,
            action,
            state: TaskState::Pending,
            countdown: Countdown::start(delay),
        }
    }

    /// Start out killed; nothing fires until the task is restarted
    pub fn killed(mut self) -> Self {
        self.state = TaskState::Killed;
        self
    }

    fn rearm(&mut self) {
        self.state = TaskState::Pending;
        self.countdown = Countdown::start(self.delay);
    }
}

/// Handle to a task owned by one scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    scheduler: u64,
    index: usize,
}

/// Owns tasks and the active queue
#[derive(Debug)]
pub struct TaskScheduler<A> {
    id: u64,
    tasks: Vec<Task<A>>,
    /// Indices of pending tasks, in the order they were (re)armed
    ///
    /// Restarting a pending task moves it to the back.
    active: Vec<usize>,
}

impl<A: Clone> Default for TaskScheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone> TaskScheduler<A> {
    pub fn new() -> Self {
        Self {
            id: NEXT_SCHEDULER_ID.fetch_add(1, Ordering::Relaxed),
            tasks: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Take ownership of `task`; pending tasks join the active queue
    pub fn add(&mut self, task: Task<A>) -> TaskId {
        let index = self.tasks.len();
        if task.state == TaskState::Pending {
            self.active.push(index);
        }
        self.tasks.push(task);
        TaskId {
            scheduler: self.id,
            index,
        }
    }

    /// Cancel a pending task without emitting its action
    ///
    /// Killing a fired or killed task does nothing.
    pub fn kill(&mut self, id: TaskId) {
        let index = self.index_of(id);
        if self.tasks[index].state == TaskState::Pending {
            self.tasks[index].state = TaskState::Killed;
            self.active.retain(|&i| i != index);
        }
    }

    /// Re-arm a task with its full delay, whatever state it is in
    pub fn restart(&mut self, id: TaskId) {
        let index = self.index_of(id);
        self.tasks[index].rearm();
        self.active.retain(|&i| i != index);
        self.active.push(index);
    }

    pub fn state(&self, id: TaskId) -> TaskState {
        self.tasks[self.index_of(id)].state
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.state(id) == TaskState::Pending
    }

    /// Advance every pending task by one tick of length `elapsed`
    ///
    /// Returns the actions of the tasks that fired, earliest due first.
    /// Tasks that became due at the same instant keep queue order.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<A> {
        let mut due: Vec<(Duration, usize, usize)> = Vec::new();
        for (position, &index) in self.active.iter().enumerate() {
            if let Some(overshoot) = self.tasks[index].countdown.advance(elapsed) {
                due.push((overshoot, position, index));
            }
        }
        if due.is_empty() {
            return Vec::new();
        }

        // larger overshoot means it was due earlier within this tick
        due.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut fired = Vec::with_capacity(due.len());
        for (_, _, index) in due {
            let task = &mut self.tasks[index];
            task.state = TaskState::Fired;
            fired.push(task.action.clone());
        }
        let tasks = &self.tasks;
        self.active.retain(|&i| tasks[i].state == TaskState::Pending);

        tracing::debug!(count = fired.len(), "tasks fired");
        fired
    }

    /// # Panics
    ///
    /// Panics when `id` was issued by another scheduler.
    fn index_of(&self, id: TaskId) -> usize {
        assert_eq!(
            id.scheduler, self.id,
            "task {:?} does not belong to this scheduler",
            id
        );
        id.index
    }
}
