//! Background CPU burner toggled by a shared flag.

use std::hint::black_box;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use crate::observability::metrics;

/// Multiplications per flag check while burning.
const BURN_BATCH: u64 = 10_000;

/// State shared between the generator handle and its worker thread.
#[derive(Debug)]
struct Shared {
    running: AtomicBool,
    shutdown: AtomicBool,
    iterations: AtomicU64,
    poll_interval: Duration,
}

/// Generates synthetic CPU load on a dedicated worker thread.
///
/// The worker is spawned once in [`LoadGenerator::new`] and lives until the
/// generator is dropped. [`start`](Self::start) and [`stop`](Self::stop) only
/// flip a flag; they never create or destroy threads.
#[derive(Debug)]
pub struct LoadGenerator {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl LoadGenerator {
    /// Spawn the worker thread. The generator starts stopped.
    ///
    /// `poll_interval` bounds how long the idle worker sleeps before it
    /// re-checks the flag.
    pub fn new(poll_interval: Duration) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            running: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            iterations: AtomicU64::new(0),
            poll_interval,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("load-generator".to_string())
            .spawn(move || burn_loop(&worker_shared))?;

        tracing::info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Load generator worker spawned"
        );

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Start burning CPU. Idempotent.
    pub fn start(&self) {
        let was_running = self.shared.running.swap(true, Ordering::SeqCst);
        if was_running {
            tracing::debug!("Load already running");
        } else {
            tracing::info!("Load generation started");
            self.wake_worker();
        }
        metrics::publish_flag(&self.shared.running, metrics::set_load_running);
    }

    /// Stop burning CPU. Idempotent.
    pub fn stop(&self) {
        let was_running = self.shared.running.swap(false, Ordering::SeqCst);
        if was_running {
            tracing::info!("Load generation stopped");
        } else {
            tracing::debug!("Load already stopped");
        }
        metrics::publish_flag(&self.shared.running, metrics::set_load_running);
    }

    /// Whether load generation is currently enabled.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Total busy-work iterations the worker has completed.
    pub fn iterations(&self) -> u64 {
        self.shared.iterations.load(Ordering::Relaxed)
    }

    /// Idle re-check interval of the worker.
    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval
    }

    /// Whether the worker thread is still alive.
    pub fn is_worker_alive(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn wake_worker(&self) {
        if let Some(handle) = &self.worker {
            handle.thread().unpark();
        }
    }
}

impl Drop for LoadGenerator {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.wake_worker();

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("Load generator worker panicked");
            } else {
                tracing::debug!("Load generator worker joined");
            }
        }
    }
}

fn burn_loop(shared: &Shared) {
    let mut rng = rand::thread_rng();

    while !shared.shutdown.load(Ordering::SeqCst) {
        if shared.running.load(Ordering::SeqCst) {
            for _ in 0..BURN_BATCH {
                black_box(rng.gen::<f64>() * rng.gen::<f64>());
            }
            shared.iterations.fetch_add(BURN_BATCH, Ordering::Relaxed);
        } else {
            // Spurious wakeups just re-check the flags.
            thread::park_timeout(shared.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const POLL: Duration = Duration::from_millis(10);

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn starts_stopped_with_live_worker() {
        let generator = LoadGenerator::new(POLL).unwrap();
        assert!(!generator.is_running());
        assert!(generator.is_worker_alive());
        assert_eq!(generator.poll_interval(), POLL);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let generator = LoadGenerator::new(POLL).unwrap();

        generator.start();
        generator.start();
        assert!(generator.is_running());

        generator.stop();
        generator.stop();
        assert!(!generator.is_running());
    }

    #[test]
    fn worker_burns_only_while_running() {
        let generator = LoadGenerator::new(POLL).unwrap();

        thread::sleep(POLL * 3);
        assert_eq!(generator.iterations(), 0);

        generator.start();
        assert!(wait_until(Duration::from_secs(5), || generator.iterations() > 0));

        generator.stop();
        thread::sleep(POLL * 5);
        let settled = generator.iterations();
        thread::sleep(POLL * 5);
        assert_eq!(generator.iterations(), settled);
    }

    #[test]
    fn toggling_keeps_single_worker() {
        let generator = LoadGenerator::new(POLL).unwrap();
        for _ in 0..200 {
            generator.start();
            generator.stop();
        }
        assert!(generator.is_worker_alive());
        assert!(!generator.is_running());
    }

    #[test]
    fn concurrent_toggles_resolve_to_last_call() {
        let generator = Arc::new(LoadGenerator::new(POLL).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let generator = generator.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        if i % 2 == 0 {
                            generator.start();
                        } else {
                            generator.stop();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        generator.start();
        assert!(generator.is_running());
        generator.stop();
        assert!(!generator.is_running());
        assert!(generator.is_worker_alive());
    }

    #[test]
    fn drop_joins_running_worker() {
        let generator = LoadGenerator::new(Duration::from_secs(60)).unwrap();
        generator.start();
        let started = Instant::now();
        drop(generator);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn drop_wakes_idle_worker() {
        let generator = LoadGenerator::new(Duration::from_secs(60)).unwrap();
        thread::sleep(POLL);
        let started = Instant::now();
        drop(generator);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn gauge_follows_flag() {
        use crate::observability::metrics::test_support::gauge_value;
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let generator = LoadGenerator::new(POLL).unwrap();

        ::metrics::with_local_recorder(&recorder, || generator.start());
        assert_eq!(
            gauge_value(&handle.render(), "node_load_running"),
            Some(1.0)
        );

        ::metrics::with_local_recorder(&recorder, || {
            generator.stop();
            generator.stop();
        });
        assert_eq!(
            gauge_value(&handle.render(), "node_load_running"),
            Some(0.0)
        );
        assert!(!generator.is_running());
    }
}
