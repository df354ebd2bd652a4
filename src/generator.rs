//! The shared generation loop that keeps generator output strictly
//! increasing.

use std::thread;
use std::time::Duration;

use crate::error::Error;
use crate::Uuid;

/// Backward-clock policy plus the last identifier a generator handed out.
///
/// Every clock-driven generator funnels its candidates through
/// [`run`](MonotonicGuard::run). A candidate that does not exceed the
/// previous output means the clock has not advanced far enough to guarantee
/// ordering; the guard then either fails with [`Error::BackwardClock`] or
/// sleeps one least-significant clock tick of the format and asks for a new
/// candidate. The loop only ends once the clock catches up, so with the
/// default policy two identifiers from the same generator always satisfy
/// `later > earlier`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct MonotonicGuard {
    least_tick: Duration,
    raise_on_backward: bool,
    last: Option<Uuid>,
}

impl MonotonicGuard {
    pub(crate) fn new(least_tick: Duration, raise_on_backward: bool) -> Self {
        Self {
            least_tick,
            raise_on_backward,
            last: None,
        }
    }

    /// Starts from a previously issued identifier instead of a clean slate.
    pub(crate) fn resume(least_tick: Duration, raise_on_backward: bool, last: Uuid) -> Self {
        Self {
            least_tick,
            raise_on_backward,
            last: Some(last),
        }
    }

    /// Runs `candidate` until it produces an identifier greater than the
    /// last one, storing and returning it.
    pub(crate) fn run(&mut self, mut candidate: impl FnMut() -> Uuid) -> Result<Uuid, Error> {
        loop {
            let uuid = candidate();
            match self.last {
                Some(last) if uuid <= last => {
                    if self.raise_on_backward {
                        return Err(Error::BackwardClock {
                            last,
                            backward: uuid,
                        });
                    }
                    tracing::trace!(
                        %last,
                        discarded = %uuid,
                        wait = ?self.least_tick,
                        "clock has not advanced; waiting before retry"
                    );
                    thread::sleep(self.least_tick);
                }
                _ => {
                    self.last = Some(uuid);
                    return Ok(uuid);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<Uuid> {
        self.last
    }
}
