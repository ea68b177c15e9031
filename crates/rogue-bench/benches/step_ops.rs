//! Criterion micro-benchmarks for graph stepping, value access and sampling.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rogue_bench::{chain_profile, fan_out_profile};
use rogue_engine::SignalGraph;
use rogue_test_utils::two_device_graph_spec;

fn reference_graph() -> SignalGraph {
    let graph = SignalGraph::new();
    for (id, ports) in two_device_graph_spec() {
        graph.add_client(id, ports).unwrap();
    }
    graph.connect(("dev0", "port0"), ("dev1", "port3")).unwrap();
    graph
}

fn bench_step_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_chain");
    for len in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let graph = chain_profile(len).unwrap();
            b.iter(|| black_box(graph.step().unwrap()));
        });
    }
    group.finish();
}

fn bench_step_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_fan_out");
    for sinks in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(sinks), &sinks, |b, &sinks| {
            let graph = fan_out_profile(sinks).unwrap();
            b.iter(|| {
                let result = graph.step().unwrap();
                // Keep the recorder from growing across iterations.
                graph.clear_samples();
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_set_get(c: &mut Criterion) {
    let graph = reference_graph();
    c.bench_function("set_value", |b| {
        let mut n: i64 = 0;
        b.iter(|| {
            n += 1;
            graph.set_value("dev0", "port0", black_box(n)).unwrap();
        });
    });
    c.bench_function("get_value", |b| {
        b.iter(|| black_box(graph.get_value("dev1", "port3").unwrap()));
    });
}

fn bench_data_snapshot(c: &mut Criterion) {
    let graph = fan_out_profile(32).unwrap();
    for _ in 0..100 {
        graph.step().unwrap();
    }
    c.bench_function("data_snapshot_32x100", |b| {
        b.iter(|| black_box(graph.data()));
    });
}

criterion_group!(
    benches,
    bench_step_chain,
    bench_step_fan_out,
    bench_set_get,
    bench_data_snapshot
);
criterion_main!(benches);
