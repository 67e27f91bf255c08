use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bincode::config::standard;
use bincode::serde::encode_to_vec;
use serde::Serialize;

use crate::arena::{SymposiumArena, TableSnapshot};
use crate::diner::{Diner, EatingPolicy, ThinkPolicy};

/// Seat count below which the ring degenerates.
pub const MIN_SEATS: usize = 5;

/// Builder-input for a dinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DinnerConfig {
    pub seats: usize,
    pub think: ThinkPolicy,
    pub eating: EatingPolicy,
    /// Pause between global completion and the termination broadcast, so a
    /// final all-finished frame can still be observed.
    pub grace_period: Duration,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            seats: MIN_SEATS,
            think: ThinkPolicy::default(),
            eating: EatingPolicy::default(),
            grace_period: Duration::from_secs(5),
        }
    }
}

impl DinnerConfig {
    /// Structural validation, run before any thread starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seats < MIN_SEATS {
            return Err(ConfigError::TooFewSeats {
                value: self.seats,
                min: MIN_SEATS,
            });
        }
        Ok(())
    }
}

/// Rejected dinner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    TooFewSeats { value: usize, min: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSeats { value, min } => {
                write!(f, "a table needs at least {min} seats, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Serialize)]
struct DinnerRecord<'a> {
    seats: usize,
    table: &'a TableSnapshot,
}

/// Owns the table and the diner threads; supervises completion and drives
/// the cooperative shutdown.
pub struct SymposiumEngine {
    arena: Arc<SymposiumArena>,
    config: DinnerConfig,
    diners: Vec<JoinHandle<()>>,
}

impl SymposiumEngine {
    pub fn new(config: DinnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arena: Arc::new(SymposiumArena::new(config.seats)),
            config,
            diners: Vec::with_capacity(config.seats),
        })
    }

    /// Shared handle to the table, for observers.
    pub fn arena(&self) -> Arc<SymposiumArena> {
        Arc::clone(&self.arena)
    }

    pub fn config(&self) -> &DinnerConfig {
        &self.config
    }

    /// Seats every diner on its own named thread.
    pub fn begin_service(&mut self) {
        for seat in 0..self.config.seats {
            let diner = Diner::new(
                seat,
                Arc::clone(&self.arena),
                self.config.think,
                self.config.eating,
            );
            let handle = thread::Builder::new()
                .name(format!("symposium-diner-{seat}"))
                .spawn(move || diner.dine())
                .expect("failed to spawn symposium diner thread");
            self.diners.push(handle);
        }
    }

    /// Blocks until every diner has finished, polling under the lock.
    /// Returns early if the table was closed from elsewhere.
    pub fn await_completion(&self, poll_interval: Duration) {
        while self
            .arena
            .with_state(|state| state.running && !state.all_finished())
        {
            thread::sleep(poll_interval);
        }
    }

    /// Termination broadcast and join: closes the table (clearing the
    /// running flag and waking every wait slot) and waits for every diner
    /// thread to exit. Safe to call more than once.
    pub fn conclude(&mut self) {
        self.arena.close();
        for handle in self.diners.drain(..) {
            let _ = handle.join();
        }
    }

    /// Full supervised dinner: spawn, wait for global completion, allow a
    /// final observation window, then shut down.
    pub fn run(&mut self) {
        self.begin_service();
        self.await_completion(Duration::from_millis(200));
        thread::sleep(self.config.grace_period);
        self.conclude();
    }

    /// Serializes the final table snapshot to `file_path`.
    pub fn export_record(&self, file_path: &str) {
        let table = self.arena.snapshot();
        let record = DinnerRecord {
            seats: self.config.seats,
            table: &table,
        };

        match encode_to_vec(&record, standard()) {
            Ok(bytes) => {
                if let Err(err) = fs::write(file_path, bytes) {
                    eprintln!("failed to write dinner record `{file_path}`: {err}");
                }
            }
            Err(err) => {
                eprintln!("failed to serialize dinner record `{file_path}`: {err}");
            }
        }
    }
}

impl Drop for SymposiumEngine {
    fn drop(&mut self) {
        if !self.diners.is_empty() {
            self.conclude();
        }
    }
}
