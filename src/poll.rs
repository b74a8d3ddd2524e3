// Fixed-interval polling of a generation job.
//
// The loop is written against a `Clock` so tests can drive it without real
// delays, and against a plain status-fetching closure so it does not care
// whether snapshots come from HTTP or from a fake.

use crate::api::StatusSnapshot;
use crate::config::PollPolicy;
use crate::error::ClientError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Source of time for the polling loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock; `sleep` blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Progress observed by one poll. `requested` is the count captured from
/// the first snapshot of the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub requested: u64,
    pub generated: u64,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        is_complete(self.requested, self.generated)
    }
}

/// Completion predicate for a job.
pub fn is_complete(requested: u64, generated: u64) -> bool {
    generated >= requested
}

/// Why a wait stopped. `polls` counts status calls, failed ones included.
#[derive(Debug)]
pub enum WaitOutcome {
    Completed { snapshot: StatusSnapshot, polls: u64 },
    TimedOut { last: Option<StatusSnapshot>, polls: u64 },
    /// A status call failed; the loop never retries.
    Aborted { error: ClientError, polls: u64 },
}

impl WaitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WaitOutcome::Completed { .. })
    }

    pub fn polls(&self) -> u64 {
        match self {
            WaitOutcome::Completed { polls, .. }
            | WaitOutcome::TimedOut { polls, .. }
            | WaitOutcome::Aborted { polls, .. } => *polls,
        }
    }
}

/// Poll `fetch` every `policy.interval` until the job completes, a fetch
/// fails, or `policy.max_wait` has elapsed since the first call.
///
/// `observer` sees every successful poll, which the UI uses to drive a
/// progress bar.
pub fn poll_until_complete<F, C, O>(
    mut fetch: F,
    policy: PollPolicy,
    clock: &C,
    mut observer: O,
) -> WaitOutcome
where
    F: FnMut() -> Result<StatusSnapshot, ClientError>,
    C: Clock + ?Sized,
    O: FnMut(&Progress),
{
    let start = clock.now();
    let mut total: Option<u64> = None;
    let mut last = None;
    let mut polls = 0;

    while clock.now().duration_since(start) < policy.max_wait {
        polls += 1;
        let snapshot = match fetch() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, polls, "status check failed, giving up on wait");
                return WaitOutcome::Aborted { error, polls };
            }
        };

        let requested = *total.get_or_insert(snapshot.cantidad);
        let progress = Progress {
            requested,
            generated: snapshot.generados,
        };
        debug!(requested, generated = progress.generated, polls, "polled status");
        observer(&progress);

        if progress.is_complete() {
            return WaitOutcome::Completed { snapshot, polls };
        }
        last = Some(snapshot);
        clock.sleep(policy.interval);
    }

    debug!(polls, max_wait = ?policy.max_wait, "wait budget exhausted");
    WaitOutcome::TimedOut { last, polls }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Time only moves when the loop sleeps.
    struct FakeClock {
        start: Instant,
        elapsed: Cell<Duration>,
    }

    impl FakeClock {
        fn new() -> Self {
            FakeClock {
                start: Instant::now(),
                elapsed: Cell::new(Duration::ZERO),
            }
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.start + self.elapsed.get()
        }

        fn sleep(&self, duration: Duration) {
            self.elapsed.set(self.elapsed.get() + duration);
        }
    }

    fn snapshot(cantidad: u64, generados: u64) -> StatusSnapshot {
        StatusSnapshot {
            id: Some("job".into()),
            cantidad,
            digitos: Some(12),
            generados,
        }
    }

    fn policy(max_wait: u64, interval: u64) -> PollPolicy {
        PollPolicy::new(Duration::from_secs(max_wait), Duration::from_secs(interval))
    }

    #[test]
    fn predicate() {
        assert!(!is_complete(3, 0));
        assert!(!is_complete(3, 2));
        assert!(is_complete(3, 3));
        assert!(is_complete(3, 4));
        assert!(is_complete(0, 0));
    }

    #[test]
    fn completes_on_third_poll() {
        let clock = FakeClock::new();
        let mut generated = [0, 0, 3].into_iter();
        let mut seen = Vec::new();

        let outcome = poll_until_complete(
            || Ok(snapshot(3, generated.next().unwrap())),
            policy(300, 2),
            &clock,
            |p| seen.push(*p),
        );

        assert!(outcome.is_completed());
        assert_eq!(outcome.polls(), 3);
        assert_eq!(clock.elapsed.get(), Duration::from_secs(4));
        assert_eq!(seen.last(), Some(&Progress { requested: 3, generated: 3 }));
    }

    #[test]
    fn times_out_within_poll_bound() {
        let clock = FakeClock::new();
        let budget = policy(5, 2);

        let outcome = poll_until_complete(|| Ok(snapshot(3, 0)), budget, &clock, |_| {});

        match outcome {
            WaitOutcome::TimedOut { last, polls } => {
                assert_eq!(polls, 3);
                assert!(polls <= budget.max_polls());
                assert_eq!(last.map(|s| s.generados), Some(0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn first_failure_aborts_without_retry() {
        let clock = FakeClock::new();
        let calls = Cell::new(0);

        let outcome = poll_until_complete(
            || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Ok(snapshot(5, 1))
                } else {
                    Err(ClientError::NotFound { id: "job".into() })
                }
            },
            policy(300, 2),
            &clock,
            |_| {},
        );

        match outcome {
            WaitOutcome::Aborted { error, polls } => {
                assert!(error.is_not_found());
                assert_eq!(polls, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn requested_count_is_taken_from_first_snapshot() {
        let clock = FakeClock::new();
        let mut snapshots = vec![snapshot(4, 0), snapshot(10, 4)].into_iter();

        let outcome = poll_until_complete(
            || Ok(snapshots.next().unwrap()),
            policy(300, 2),
            &clock,
            |_| {},
        );

        assert!(outcome.is_completed());
        assert_eq!(outcome.polls(), 2);
    }

    #[test]
    fn zero_budget_never_polls() {
        let clock = FakeClock::new();
        let outcome = poll_until_complete(
            || -> Result<StatusSnapshot, ClientError> { panic!("must not poll") },
            policy(0, 2),
            &clock,
            |_| {},
        );
        assert!(matches!(outcome, WaitOutcome::TimedOut { last: None, polls: 0 }));
    }
}
