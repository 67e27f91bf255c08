use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a single diner, as published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DinerStatus {
    #[default]
    Thinking,
    Waiting,
    Eating,
}

impl DinerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Waiting => "waiting",
            Self::Eating => "eating",
        }
    }
}

/// Mutable table state shared by every diner.
///
/// Every field is read and written with the arena lock held. Nothing in
/// here blocks; waiting happens on the arena's per-seat slots.
#[derive(Debug)]
pub struct TableState {
    pub statuses: Vec<DinerStatus>,
    pub forks: Vec<bool>,
    pub progress: Vec<u8>,
    pub finished: Vec<bool>,
    pub meals_served: Vec<u32>,
    pub running: bool,
}

impl TableState {
    fn new(seats: usize) -> Self {
        Self {
            statuses: vec![DinerStatus::Thinking; seats],
            forks: vec![true; seats],
            progress: vec![0; seats],
            finished: vec![false; seats],
            meals_served: vec![0; seats],
            running: true,
        }
    }

    pub fn seats(&self) -> usize {
        self.statuses.len()
    }

    /// Neighbouring seat to the left on the ring.
    pub fn left(&self, seat: usize) -> usize {
        (seat + self.seats() - 1) % self.seats()
    }

    /// Neighbouring seat to the right on the ring; also the index of a
    /// diner's second fork.
    pub fn right(&self, seat: usize) -> usize {
        (seat + 1) % self.seats()
    }

    /// Eligibility predicate: a waiting diner whose two forks are both free.
    pub fn can_eat(&self, seat: usize) -> bool {
        self.statuses[seat] == DinerStatus::Waiting
            && self.forks[seat]
            && self.forks[self.right(seat)]
    }

    pub fn all_finished(&self) -> bool {
        self.finished.iter().all(|&done| done)
    }
}

/// Point-in-time copy of the table, taken under a single lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSnapshot {
    pub statuses: Vec<DinerStatus>,
    pub progress: Vec<u8>,
    pub finished: Vec<bool>,
    pub meals_served: Vec<u32>,
    pub forks: Vec<bool>,
    pub running: bool,
}

/// Shared arena: the table state behind one lock, plus one wait slot per
/// seat for parking a diner whose forks are not both free.
pub struct SymposiumArena {
    pub(crate) state: Mutex<TableState>,
    pub(crate) seats: Box<[Condvar]>,
}

impl SymposiumArena {
    pub fn new(seats: usize) -> Self {
        Self {
            state: Mutex::new(TableState::new(seats)),
            seats: (0..seats).map(|_| Condvar::new()).collect(),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&TableState) -> R) -> R {
        let guard = self.state.lock();
        f(&guard)
    }

    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut TableState) -> R) -> R {
        let mut guard = self.state.lock();
        f(&mut guard)
    }

    /// Copies the whole table in one critical section, so a snapshot can
    /// never show an eating diner alongside two free forks.
    pub fn snapshot(&self) -> TableSnapshot {
        let state = self.state.lock();
        TableSnapshot {
            statuses: state.statuses.clone(),
            progress: state.progress.clone(),
            finished: state.finished.clone(),
            meals_served: state.meals_served.clone(),
            forks: state.forks.clone(),
            running: state.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fresh_table_is_thinking_with_all_forks_free() {
        let arena = SymposiumArena::new(5);
        arena.with_state(|state| {
            assert_eq!(state.seats(), 5);
            assert!(state.running);
            assert!(!state.all_finished());
            assert!(state.statuses.iter().all(|&s| s == DinerStatus::Thinking));
            assert!(state.forks.iter().all(|&fork| fork));
            assert!(state.progress.iter().all(|&p| p == 0));
            assert!(state.meals_served.iter().all(|&m| m == 0));
        });
    }

    #[test]
    fn ring_wraps_at_both_ends() {
        let state = TableState::new(5);
        assert_eq!(state.left(0), 4);
        assert_eq!(state.right(4), 0);
        assert_eq!(state.left(3), 2);
        assert_eq!(state.right(3), 4);
    }

    #[test]
    fn eligibility_needs_waiting_status_and_both_forks() {
        let mut state = TableState::new(5);
        assert!(!state.can_eat(1), "a thinking diner is not eligible");

        state.statuses[1] = DinerStatus::Waiting;
        assert!(state.can_eat(1));

        state.forks[2] = false;
        assert!(!state.can_eat(1), "missing right fork");

        state.forks[2] = true;
        state.forks[1] = false;
        assert!(!state.can_eat(1), "missing left fork");
    }

    #[test]
    fn snapshot_mirrors_state() {
        let arena = SymposiumArena::new(5);
        arena.with_state_mut(|state| {
            state.statuses[2] = DinerStatus::Eating;
            state.forks[2] = false;
            state.forks[3] = false;
            state.progress[2] = 45;
            state.meals_served[2] = 1;
        });

        let snapshot = arena.snapshot();
        assert_eq!(snapshot.statuses[2], DinerStatus::Eating);
        assert_eq!(snapshot.progress[2], 45);
        assert_eq!(snapshot.meals_served[2], 1);
        assert_eq!(snapshot.forks, vec![true, true, false, false, true]);
        assert!(snapshot.running);
    }

    proptest! {
        #[test]
        fn ring_neighbours_are_inverse(
            (seats, seat) in (5usize..64).prop_flat_map(|n| (Just(n), 0..n))
        ) {
            let state = TableState::new(seats);
            prop_assert_eq!(state.right(state.left(seat)), seat);
            prop_assert_eq!(state.left(state.right(seat)), seat);
            prop_assert_ne!(state.left(seat), seat);
            prop_assert_ne!(state.right(seat), seat);
        }
    }
}
