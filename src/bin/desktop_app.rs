#[cfg(all(feature = "desktop", not(target_arch = "wasm32")))]
fn main() {
    use Symposium::engine::{DinnerConfig, SymposiumEngine};
    use Symposium::observer::{ObserverRuntime, SharedObserverSnapshot};

    #[tauri::command]
    fn read_observer_snapshot(
        state: tauri::State<'_, SharedObserverSnapshot>,
    ) -> Symposium::observer::ObserverSnapshot {
        state.read()
    }

    #[tauri::command]
    fn read_table_snapshot(
        state: tauri::State<'_, SharedObserverSnapshot>,
    ) -> Symposium::arena::TableSnapshot {
        state.read().table
    }

    #[tauri::command]
    fn read_completion_series(state: tauri::State<'_, SharedObserverSnapshot>) -> Vec<f64> {
        state.read().completion_series
    }

    let mut engine = SymposiumEngine::new(DinnerConfig::default())
        .expect("default dinner configuration is valid");
    let runtime = ObserverRuntime::spawn(engine.arena(), 20, 600);
    let shared = runtime.shared_snapshot();

    engine.begin_service();

    tauri::Builder::default()
        .manage(shared)
        .invoke_handler(tauri::generate_handler![
            read_observer_snapshot,
            read_table_snapshot,
            read_completion_series
        ])
        .run(tauri::generate_context!())
        .expect("failed to run the Symposium desktop app");
}

#[cfg(any(not(feature = "desktop"), target_arch = "wasm32"))]
fn main() {
    eprintln!("desktop app requires: cargo run --features desktop --bin desktop_app");
}
