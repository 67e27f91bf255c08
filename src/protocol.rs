use crate::arena::{DinerStatus, SymposiumArena};

/// Outcome of a fork request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkGrant {
    /// Both forks were claimed and the diner is now eating.
    Granted,
    /// The table is closing; nothing was claimed.
    Cancelled,
}

impl SymposiumArena {
    /// Blocks until both of `seat`'s forks are free, then claims them and
    /// moves the diner to `Eating`, all in one critical section.
    ///
    /// While ineligible the caller parks on its seat's wait slot; the lock
    /// is released for the duration of the park and the predicate is
    /// re-checked on every wake, so spurious wakeups are harmless. Returns
    /// [`ForkGrant::Cancelled`] without claiming anything if the table
    /// closes while waiting.
    ///
    /// The pair is tested and claimed in one critical section; a diner
    /// never holds one fork while waiting for the other.
    pub fn take_forks(&self, seat: usize) -> ForkGrant {
        let mut state = self.state.lock();
        state.statuses[seat] = DinerStatus::Waiting;

        while state.running && !state.can_eat(seat) {
            self.seats[seat].wait(&mut state);
        }

        if !state.running {
            return ForkGrant::Cancelled;
        }

        let right = state.right(seat);
        state.forks[seat] = false;
        state.forks[right] = false;
        state.statuses[seat] = DinerStatus::Eating;
        state.meals_served[seat] += 1;
        ForkGrant::Granted
    }

    /// Returns both forks and wakes each neighbour the release just made
    /// eligible. The eligibility check and the wake happen under the same
    /// lock as the release, so a woken neighbour's predicate still holds
    /// when it re-runs.
    pub fn put_forks(&self, seat: usize) {
        let mut state = self.state.lock();
        let right = state.right(seat);
        state.forks[seat] = true;
        state.forks[right] = true;
        state.statuses[seat] = DinerStatus::Thinking;

        for neighbour in [state.left(seat), right] {
            if state.can_eat(neighbour) {
                self.seats[neighbour].notify_one();
            }
        }
    }

    /// Clears the running flag and wakes every seat unconditionally, so no
    /// diner stays parked past shutdown.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.running = false;
        for slot in self.seats.iter() {
            slot.notify_all();
        }
    }
}
