use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::arena::{SymposiumArena, TableSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObserverSnapshot {
    pub table: TableSnapshot,
    /// Finished fraction per sample, oldest first, bounded.
    pub completion_series: Vec<f64>,
}

#[derive(Clone)]
pub struct SharedObserverSnapshot {
    inner: Arc<RwLock<ObserverSnapshot>>,
}

impl SharedObserverSnapshot {
    pub fn new(initial: ObserverSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn read(&self) -> ObserverSnapshot {
        self.inner.read().clone()
    }

    fn update(&self, next: ObserverSnapshot) {
        *self.inner.write() = next;
    }
}

pub struct ObserverRuntime {
    shared: SharedObserverSnapshot,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ObserverRuntime {
    /// Samples the table at a fixed rate on a dedicated thread.
    ///
    /// Each sample is one atomic [`SymposiumArena::snapshot`]; the table is
    /// never mutated from here.
    pub fn spawn(arena: Arc<SymposiumArena>, sample_hz: u64, max_samples: usize) -> Self {
        let sample_hz = sample_hz.max(1);
        let max_samples = max_samples.max(16);
        let sample_interval = Duration::from_nanos((1_000_000_000_u64 / sample_hz).max(1));

        let shared = SharedObserverSnapshot::new(ObserverSnapshot {
            table: arena.snapshot(),
            completion_series: Vec::with_capacity(max_samples),
        });
        let shared_for_thread = shared.clone();

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_for_thread = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("symposium-observer-thread".to_owned())
            .spawn(move || {
                let mut completion_history = VecDeque::with_capacity(max_samples);

                while !shutdown_for_thread.load(Ordering::Relaxed) {
                    let table = arena.snapshot();

                    let finished = table.finished.iter().filter(|&&done| done).count();
                    let fraction = finished as f64 / table.finished.len().max(1) as f64;
                    completion_history.push_back(fraction);
                    if completion_history.len() > max_samples {
                        let _ = completion_history.pop_front();
                    }

                    shared_for_thread.update(ObserverSnapshot {
                        table,
                        completion_series: completion_history.iter().copied().collect(),
                    });

                    thread::sleep(sample_interval);
                }
            })
            .expect("failed to spawn symposium observer thread");

        Self {
            shared,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn shared_snapshot(&self) -> SharedObserverSnapshot {
        self.shared.clone()
    }
}

impl Drop for ObserverRuntime {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(all(feature = "desktop", not(target_arch = "wasm32")))]
#[tauri::command]
pub fn read_observer_snapshot(state: tauri::State<'_, SharedObserverSnapshot>) -> ObserverSnapshot {
    state.read()
}

#[cfg(all(feature = "desktop", not(target_arch = "wasm32")))]
#[tauri::command]
pub fn read_table_snapshot(state: tauri::State<'_, SharedObserverSnapshot>) -> TableSnapshot {
    state.read().table
}

#[cfg(all(feature = "desktop", not(target_arch = "wasm32")))]
#[tauri::command]
pub fn read_completion_series(state: tauri::State<'_, SharedObserverSnapshot>) -> Vec<f64> {
    state.read().completion_series
}

#[cfg(all(feature = "desktop", not(target_arch = "wasm32")))]
pub fn wire_tauri_observer(builder: tauri::Builder<tauri::Wry>) -> tauri::Builder<tauri::Wry> {
    builder.invoke_handler(tauri::generate_handler![
        read_observer_snapshot,
        read_table_snapshot,
        read_completion_series
    ])
}

#[cfg(all(feature = "web-ui", target_arch = "wasm32"))]
pub mod yew_frontend {
    use std::cell::Cell;
    use std::rc::Rc;

    use gloo_timers::future::TimeoutFuture;
    use js_sys::Error;
    use wasm_bindgen::JsValue;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use yew::prelude::*;

    use crate::arena::TableSnapshot;
    use crate::observer::ObserverSnapshot;

    #[wasm_bindgen(inline_js = r#"
    export async function invoke_tauri(command) {
      if (window.__TAURI__ && window.__TAURI__.core && window.__TAURI__.core.invoke) {
        return await window.__TAURI__.core.invoke(command);
      }
      throw new Error("Tauri bridge unavailable");
    }
    "#)]
    extern "C" {
        #[wasm_bindgen(catch, js_name = invoke_tauri)]
        async fn invoke_tauri(command: &str) -> Result<JsValue, JsValue>;
    }

    async fn fetch_table_snapshot() -> Result<TableSnapshot, JsValue> {
        let value = invoke_tauri("read_table_snapshot").await?;
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| Error::new(&format!("table decode failed: {err}")).into())
    }

    async fn fetch_completion_series() -> Result<Vec<f64>, JsValue> {
        let value = invoke_tauri("read_completion_series").await?;
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| Error::new(&format!("series decode failed: {err}")).into())
    }

    fn progress_bar(percent: u8) -> String {
        const WIDTH: usize = 20;
        let filled = (percent as usize * WIDTH) / 100;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
    }

    #[derive(Properties, PartialEq)]
    pub struct DashboardProps {
        #[prop_or(75)]
        pub poll_ms: u32,
        #[prop_or(240)]
        pub max_points: usize,
    }

    #[function_component(Dashboard)]
    pub fn dashboard(props: &DashboardProps) -> Html {
        let snapshot = use_state_eq(ObserverSnapshot::default);
        let in_flight = use_mut_ref(|| false);

        {
            let snapshot = snapshot.clone();
            let poll_ms = props.poll_ms.max(16);
            let max_points = props.max_points.max(16);
            let in_flight = in_flight.clone();
            use_effect_with((poll_ms, max_points), move |_| {
                let running = Rc::new(Cell::new(true));
                let running_task = Rc::clone(&running);

                spawn_local(async move {
                    while running_task.get() {
                        TimeoutFuture::new(poll_ms).await;
                        if !running_task.get() {
                            break;
                        }

                        if *in_flight.borrow() {
                            continue;
                        }

                        *in_flight.borrow_mut() = true;

                        if let (Ok(table), Ok(mut completion_series)) =
                            (fetch_table_snapshot().await, fetch_completion_series().await)
                        {
                            if completion_series.len() > max_points {
                                let start = completion_series.len() - max_points;
                                completion_series = completion_series[start..].to_vec();
                            }

                            let next = ObserverSnapshot {
                                table,
                                completion_series,
                            };

                            if *snapshot != next {
                                snapshot.set(next);
                            }
                        }

                        *in_flight.borrow_mut() = false;
                    }
                });

                move || running.set(false)
            });
        }

        let table = &snapshot.table;
        let meals: u32 = table.meals_served.iter().sum();

        html! {
            <section class="symposium-dashboard" style="font-family: 'IBM Plex Sans', sans-serif; padding: 20px; background: linear-gradient(120deg, #f4f7e8 0%, #f8f0dd 100%); color: #2f3b2f; border-radius: 12px;">
                <h1 style="margin-top: 0;">{ "Symposium Observer" }</h1>
                <p>{ format!("Seats: {}", table.statuses.len()) }</p>
                <p>{ format!("Meals Served: {meals}") }</p>
                <p>{ format!("Table Open: {}", table.running) }</p>
                {
                    for table.statuses.iter().enumerate().map(|(seat, status)| {
                        let percent = table.progress.get(seat).copied().unwrap_or(0);
                        html! {
                            <p style="font-family: monospace;">
                                { format!("Diner {:2}: {:<8} {:3}% {}", seat + 1, status.label(), percent, progress_bar(percent)) }
                            </p>
                        }
                    })
                }
                {
                    for table.forks.iter().enumerate().map(|(fork, free)| html! {
                        <span style="font-family: monospace; margin-right: 10px;">
                            { format!("fork {:2}: {}", fork + 1, if *free { "free" } else { "held" }) }
                        </span>
                    })
                }
                <CompletionChart samples={snapshot.completion_series.clone()} />
            </section>
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct CompletionChartProps {
        pub samples: Vec<f64>,
        #[prop_or(680)]
        pub width: u32,
        #[prop_or(220)]
        pub height: u32,
    }

    #[function_component(CompletionChart)]
    pub fn completion_chart(props: &CompletionChartProps) -> Html {
        let width = props.width.max(100) as f64;
        let height = props.height.max(80) as f64;
        let samples = &props.samples;
        let count = samples.len().max(2);

        let points = samples
            .iter()
            .enumerate()
            .map(|(idx, sample)| {
                let x = if count <= 1 {
                    0.0
                } else {
                    (idx as f64 / (count - 1) as f64) * width
                };
                let y = height - (sample.clamp(0.0, 1.0) * height);
                format!("{x:.2},{y:.2}")
            })
            .collect::<Vec<String>>()
            .join(" ");

        // Full-completion reference line, just below the top edge.
        let target_line_y = height * 0.02;

        html! {
            <svg width={props.width.to_string()} height={props.height.to_string()} viewBox={format!("0 0 {width} {height}")} style="display: block; margin-top: 12px; background: #fffef7; border: 1px solid #d8d2bf; border-radius: 10px;">
                <line x1="0" y1={target_line_y.to_string()} x2={width.to_string()} y2={target_line_y.to_string()} stroke="#b94a48" stroke-dasharray="4 4" />
                <polyline points={points} fill="none" stroke="#0d5c63" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round" />
            </svg>
        }
    }
}
