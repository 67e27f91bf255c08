use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::arena::SymposiumArena;
use crate::protocol::ForkGrant;

/// Bounded random delay for the thinking phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl Default for ThinkPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3),
        }
    }
}

impl ThinkPolicy {
    /// Uniform draw from `[min, max]`, with millisecond granularity.
    pub fn sample(&self) -> Duration {
        let span = self.max.saturating_sub(self.min);
        if span.is_zero() {
            return self.min;
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            use rand::RngExt;

            let extra = rand::rng().random_range(0..=span.as_millis() as u64);
            self.min + Duration::from_millis(extra)
        }

        #[cfg(target_arch = "wasm32")]
        {
            // No entropy source is wired up on the wasm build; the midpoint
            // keeps the delay bounded and non-zero.
            self.min + span / 2
        }
    }
}

/// Discrete eating progress: `steps` increments, one fixed interval apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EatingPolicy {
    pub steps: u32,
    pub step_interval: Duration,
}

impl Default for EatingPolicy {
    fn default() -> Self {
        Self {
            steps: 20,
            step_interval: Duration::from_millis(200),
        }
    }
}

impl EatingPolicy {
    /// Completion percentage after `step` of `steps`.
    pub fn progress_at(&self, step: u32) -> u8 {
        let steps = self.steps.max(1);
        ((step.min(steps) * 100) / steps) as u8
    }
}

/// One seated participant, driving itself through
/// think → wait → eat → finish.
pub struct Diner {
    seat: usize,
    arena: Arc<SymposiumArena>,
    think: ThinkPolicy,
    eating: EatingPolicy,
}

impl Diner {
    pub fn new(
        seat: usize,
        arena: Arc<SymposiumArena>,
        think: ThinkPolicy,
        eating: EatingPolicy,
    ) -> Self {
        Self {
            seat,
            arena,
            think,
            eating,
        }
    }

    /// Runs the lifecycle until this diner has finished its meal or the
    /// table closes. One meal per seat: once `finished` is set the loop
    /// never re-enters the request path.
    pub fn dine(&self) {
        loop {
            let keep_going = self
                .arena
                .with_state(|state| state.running && !state.finished[self.seat]);
            if !keep_going {
                break;
            }

            thread::sleep(self.think.sample());

            match self.arena.take_forks(self.seat) {
                ForkGrant::Cancelled => break,
                ForkGrant::Granted => {}
            }

            if self.eat_all_steps() {
                self.arena.with_state_mut(|state| {
                    state.progress[self.seat] = 100;
                    state.finished[self.seat] = true;
                });
            }

            self.arena.put_forks(self.seat);
        }
    }

    /// Advances progress one step at a time, re-checking the running flag
    /// before every write. Returns `false` when the table closed mid-meal;
    /// an interrupted meal is not marked finished.
    fn eat_all_steps(&self) -> bool {
        let steps = self.eating.steps.max(1);
        for step in 1..=steps {
            let still_running = self.arena.with_state_mut(|state| {
                if state.running {
                    state.progress[self.seat] = self.eating.progress_at(step);
                }
                state.running
            });
            if !still_running {
                return false;
            }
            thread::sleep(self.eating.step_interval);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DinerStatus;

    #[test]
    fn think_samples_stay_within_bounds() {
        let policy = ThinkPolicy {
            min: Duration::from_millis(5),
            max: Duration::from_millis(9),
        };
        for _ in 0..200 {
            let delay = policy.sample();
            assert!(delay >= policy.min);
            assert!(delay <= policy.max);
        }
    }

    #[test]
    fn degenerate_think_range_is_constant() {
        let policy = ThinkPolicy {
            min: Duration::from_millis(7),
            max: Duration::from_millis(7),
        };
        assert_eq!(policy.sample(), Duration::from_millis(7));
    }

    #[test]
    fn default_progress_advances_in_fives() {
        let policy = EatingPolicy::default();
        let progression: Vec<u8> = (1..=policy.steps).map(|s| policy.progress_at(s)).collect();
        let expected: Vec<u8> = (1..=20).map(|s| (s * 5) as u8).collect();
        assert_eq!(progression, expected);
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_full() {
        let policy = EatingPolicy {
            steps: 8,
            step_interval: Duration::ZERO,
        };
        let progression: Vec<u8> = (1..=policy.steps).map(|s| policy.progress_at(s)).collect();
        assert!(progression.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(progression.last().copied(), Some(100));
    }

    #[test]
    fn lone_diner_completes_one_meal() {
        let arena = Arc::new(SymposiumArena::new(5));
        let diner = Diner::new(
            2,
            Arc::clone(&arena),
            ThinkPolicy {
                min: Duration::from_millis(1),
                max: Duration::from_millis(1),
            },
            EatingPolicy {
                steps: 3,
                step_interval: Duration::from_millis(1),
            },
        );

        diner.dine();

        arena.with_state(|state| {
            assert!(state.finished[2]);
            assert_eq!(state.progress[2], 100);
            assert_eq!(state.meals_served[2], 1);
            assert_eq!(state.statuses[2], DinerStatus::Thinking);
            assert!(state.forks.iter().all(|&fork| fork));
        });
    }

    #[test]
    fn closed_table_serves_nothing() {
        let arena = Arc::new(SymposiumArena::new(5));
        arena.close();

        let diner = Diner::new(
            0,
            Arc::clone(&arena),
            ThinkPolicy {
                min: Duration::ZERO,
                max: Duration::ZERO,
            },
            EatingPolicy::default(),
        );
        diner.dine();

        arena.with_state(|state| {
            assert!(!state.finished[0]);
            assert_eq!(state.meals_served[0], 0);
            assert!(state.forks.iter().all(|&fork| fork));
        });
    }
}
