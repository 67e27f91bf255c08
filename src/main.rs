use std::env;
use std::process;
use std::thread;
use std::time::Duration;

use Symposium::arena::DinerStatus;
use Symposium::engine::{DinnerConfig, SymposiumEngine};
use Symposium::observer::ObserverRuntime;

fn main() {
    let seats = match env::args().nth(1) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("seat count must be a number, got `{raw}`");
                process::exit(1);
            }
        },
        None => DinnerConfig::default().seats,
    };

    let config = DinnerConfig {
        seats,
        ..DinnerConfig::default()
    };
    let mut engine = match SymposiumEngine::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            process::exit(1);
        }
    };

    let runtime = ObserverRuntime::spawn(engine.arena(), 20, 360);
    let shared = runtime.shared_snapshot();

    engine.begin_service();

    loop {
        thread::sleep(Duration::from_millis(500));
        let snapshot = shared.read();
        let table = &snapshot.table;

        let thinking = table
            .statuses
            .iter()
            .filter(|&&status| status == DinerStatus::Thinking)
            .count();
        let waiting = table
            .statuses
            .iter()
            .filter(|&&status| status == DinerStatus::Waiting)
            .count();
        let eating = table
            .statuses
            .iter()
            .filter(|&&status| status == DinerStatus::Eating)
            .count();
        let finished = table.finished.iter().filter(|&&done| done).count();
        let free_forks = table.forks.iter().filter(|&&fork| fork).count();

        println!(
            "thinking={thinking} waiting={waiting} eating={eating} finished={finished}/{seats} forks_free={free_forks}"
        );

        if finished == seats {
            break;
        }
    }

    thread::sleep(engine.config().grace_period);
    engine.conclude();
    engine.export_record("symposium_dinner.record");
}
