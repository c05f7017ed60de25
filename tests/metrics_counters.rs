// tests/metrics_counters.rs
use calamine::{Data, Range};
use gpt_catalog_migrate::telemetry::ENV_METRICS;
use gpt_catalog_migrate::{MemoryStore, Metrics, MigrationRunner, RunSettings, SourceRecord, Transformer};
use metrics_exporter_prometheus::PrometheusBuilder;

fn sheet(names: &[&str]) -> Range<Data> {
    let mut r = Range::new((0, 0), (names.len() as u32, 15));
    for (i, name) in names.iter().enumerate() {
        let y = i as u32 + 1;
        r.set_value((y, 0), Data::String(format!("g-{i}")));
        r.set_value((y, 1), Data::String(name.to_string()));
        r.set_value((y, 15), Data::Float(10.0 - i as f64));
    }
    r
}

#[test]
fn run_counters_reach_a_prometheus_recorder() {
    let store = MemoryStore::new();
    store.seed_prompt(
        Transformer::default()
            .transform(&SourceRecord::new("old"))
            .unwrap(),
    );
    store.fail_inserts_named("Broken");
    let runner = MigrationRunner::new(store, sheet(&["Good", "Broken", "Fine"]), RunSettings::default());

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let report = metrics::with_local_recorder(&recorder, || rt.block_on(runner.run())).unwrap();
    assert_eq!(report.inserted(), 2);

    let text = handle.render();
    assert!(text.contains("migrate_inserted_total 2"), "{text}");
    assert!(text.contains("migrate_insert_failures_total 1"), "{text}");
    assert!(text.contains("migrate_deleted_rows_total 1"), "{text}");
}

#[serial_test::serial]
#[test]
fn global_recorder_is_opt_in() {
    std::env::remove_var(ENV_METRICS);
    assert!(Metrics::from_env().is_none());

    std::env::set_var(ENV_METRICS, "0");
    assert!(Metrics::from_env().is_none());

    std::env::set_var(ENV_METRICS, "true");
    let m = Metrics::from_env().expect("recorder installed");
    metrics::counter!("migrate_inserted_total").increment(3);
    assert!(m.render().contains("migrate_inserted_total"));

    // Only one global recorder per process.
    assert!(Metrics::from_env().is_none());
    std::env::remove_var(ENV_METRICS);
}
