//! Cancelable timers driven by the host's clock.
//!
//! The host calls [`TaskScheduler::advance`] with its current time (from a
//! frame loop or a test); tasks never fire on their own. Cancellation is
//! synchronous: once `cancel` returns, the task will not show up in any later
//! `advance`.

use fnv::FnvHashMap;
use smallvec::SmallVec;

/// Handle to a scheduled task. Canceling twice, or after a one-shot has
/// fired, is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelToken(u64);

#[derive(Clone, Debug)]
struct Task<T> {
    due_ms: f64,
    period_ms: Option<f64>,
    payload: T,
}

/// A task that came due during an `advance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fired<T> {
    pub token: CancelToken,
    pub due_ms: f64,
    pub payload: T,
}

pub type FiredTasks<T> = SmallVec<[Fired<T>; 4]>;

pub struct TaskScheduler<T> {
    tasks: FnvHashMap<u64, Task<T>>,
    next_token: u64,
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self {
            tasks: FnvHashMap::default(),
            next_token: 0,
        }
    }
}

impl<T: Copy> TaskScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, due_ms: f64, period_ms: Option<f64>, payload: T) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;
        self.tasks.insert(
            token.0,
            Task {
                due_ms,
                period_ms,
                payload,
            },
        );
        token
    }

    /// Fire `payload` every `period_ms`, first at `now_ms + period_ms`.
    /// Periods below 1 ms are raised to 1 ms.
    pub fn schedule_repeating(&mut self, now_ms: f64, period_ms: f64, payload: T) -> CancelToken {
        let period_ms = if period_ms.is_finite() {
            period_ms.max(1.0)
        } else {
            1.0
        };
        self.insert(now_ms + period_ms, Some(period_ms), payload)
    }

    /// Fire `payload` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> CancelToken {
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        self.insert(now_ms + delay_ms, None, payload)
    }

    /// Returns whether a live task was removed.
    pub fn cancel(&mut self, token: CancelToken) -> bool {
        self.tasks.remove(&token.0).is_some()
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| !pred(&task.payload));
        before - self.tasks.len()
    }

    pub fn is_scheduled(&self, token: CancelToken) -> bool {
        self.tasks.contains_key(&token.0)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Collect every task due at `now_ms`, in due order.
    ///
    /// A repeating task fires at most once per call; if the host stalled for
    /// several periods the next deadline restarts from `now_ms` instead of
    /// bursting to catch up.
    pub fn advance(&mut self, now_ms: f64) -> FiredTasks<T> {
        let mut fired: FiredTasks<T> = SmallVec::new();
        let mut spent: SmallVec<[u64; 4]> = SmallVec::new();
        for (&id, task) in self.tasks.iter_mut() {
            if task.due_ms > now_ms {
                continue;
            }
            fired.push(Fired {
                token: CancelToken(id),
                due_ms: task.due_ms,
                payload: task.payload,
            });
            match task.period_ms {
                Some(period) => {
                    let next = task.due_ms + period;
                    task.due_ms = if next > now_ms { next } else { now_ms + period };
                }
                None => spent.push(id),
            }
        }
        for id in spent {
            self.tasks.remove(&id);
        }
        fired.sort_by(|a, b| {
            a.due_ms
                .total_cmp(&b.due_ms)
                .then_with(|| a.token.cmp(&b.token))
        });
        fired
    }
}
