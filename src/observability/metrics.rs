//! Metrics collection and exposition.
//!
//! # Metrics
//! - `node_requests_total` (counter): requests by method, route, status
//! - `node_request_duration_seconds` (histogram): latency by route
//! - `node_load_running` (gauge): 1=burning CPU, 0=idle
//! - `node_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `node_metadata_failures_total` (counter): failed lookups by field

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("node_requests_total", "Total HTTP requests handled");
    describe_histogram!(
        "node_request_duration_seconds",
        "Time spent building a response"
    );
    describe_gauge!("node_load_running", "Whether the CPU burner is enabled");
    describe_gauge!("node_healthy", "Whether the node reports healthy");
    describe_counter!(
        "node_metadata_failures_total",
        "Metadata lookups that fell back to unknown"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "node_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("node_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Mirror `flag` into a gauge through `set`.
///
/// Re-reads the flag after every write, so concurrent togglers leave the
/// gauge at the flag's final value rather than at whichever write ran last.
pub fn publish_flag(flag: &AtomicBool, mut set: impl FnMut(bool)) {
    let mut value = flag.load(Ordering::SeqCst);
    loop {
        set(value);
        let current = flag.load(Ordering::SeqCst);
        if current == value {
            break;
        }
        value = current;
    }
}

pub fn set_load_running(running: bool) {
    gauge!("node_load_running").set(if running { 1.0 } else { 0.0 });
}

pub fn set_healthy(healthy: bool) {
    gauge!("node_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_metadata_failure(field: &'static str) {
    counter!("node_metadata_failures_total", "field" => field).increment(1);
}


#[cfg(test)]
mod tests {
    use super::test_support::gauge_value;
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn publish_writes_current_flag() {
        let flag = AtomicBool::new(true);
        let mut written = Vec::new();
        publish_flag(&flag, |v| written.push(v));
        assert_eq!(written, vec![true]);
    }

    #[test]
    fn publish_corrects_write_overtaken_by_toggle() {
        let flag = AtomicBool::new(true);
        let mut written = Vec::new();
        publish_flag(&flag, |v| {
            written.push(v);
            // Another caller flips the flag between our read and our write.
            if written.len() == 1 {
                flag.store(false, Ordering::SeqCst);
            }
        });
        assert_eq!(written, vec![true, false]);
    }

    #[test]
    fn concurrent_publishers_converge_on_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mirror = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let flag = flag.clone();
                let mirror = mirror.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        flag.store(i % 2 == 0, Ordering::SeqCst);
                        publish_flag(&flag, |v| mirror.store(v, Ordering::SeqCst));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            mirror.load(Ordering::SeqCst),
            flag.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn flag_gauges_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            set_load_running(true);
            set_healthy(false);
        });

        let rendered = handle.render();
        assert_eq!(gauge_value(&rendered, "node_load_running"), Some(1.0));
        assert_eq!(gauge_value(&rendered, "node_healthy"), Some(0.0));
    }
}
