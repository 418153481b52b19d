//! # Connection Benchmarks
//!
//! Performance benchmarks for signet-core network construction.
//!
//! Run with: `cargo bench -p signet-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use signet_core::{
    Accession, ConnectOptions, Effect, EffectRecord, EndpointPolicy, Graph, Interaction, Network,
    TableResource, compare, graph_to_bytes,
};
use std::hint::black_box;
use std::sync::Arc;

fn acc(i: usize) -> Accession {
    Accession::parse(format!("P{i:05}")).expect("valid accession")
}

/// A resource where node i stimulates i+1 and i+7 (mod size).
fn create_lattice_resource(size: usize) -> Arc<TableResource> {
    let mut table = TableResource::new();
    for i in 0..size {
        for step in [1, 7] {
            table.insert(
                Interaction::new(acc(i), acc((i + step) % size), Effect::Stimulation)
                    .with_consensus(i % 3 != 0),
            );
        }
    }
    Arc::new(table)
}

/// A linear graph of `size` nodes.
fn create_linear_graph(size: usize) -> Graph {
    let mut graph = Graph::new();
    for i in 1..size {
        graph
            .add_edge(
                &acc(i - 1),
                &acc(i),
                EffectRecord::new(Effect::Stimulation),
                EndpointPolicy::Create,
            )
            .expect("edge");
    }
    graph
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_complete_connection(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_connection");

    for size in [100, 1000, 5000].iter() {
        let resource = create_lattice_resource(*size);
        let seeds: Vec<String> = (0..10).map(|i| acc(i * size / 10).to_string()).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut network = Network::builder(resource.clone())
                    .seeds(seeds.iter().cloned())
                    .build();
                let options = ConnectOptions {
                    max_len: 4,
                    ..ConnectOptions::default()
                };
                black_box(network.complete_connection(None, &options))
            });
        });
    }

    group.finish();
}

fn bench_radial_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("radial_expansion");

    for size in [100, 1000, 5000].iter() {
        let resource = create_lattice_resource(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut network = Network::builder(resource.clone()).seeds(["P00000"]).build();
                black_box(network.connect_network_radially(&ConnectOptions::default()))
            });
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for size in [100, 1000, 10000].iter() {
        let first = create_linear_graph(*size);
        let second = create_linear_graph(size / 2);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(compare(&first, &second)));
        });
    }

    group.finish();
}

fn bench_snapshot_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_encoding");

    for size in [100, 1000, 10000].iter() {
        let graph = create_linear_graph(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(graph_to_bytes(&graph)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_complete_connection,
    bench_radial_expansion,
    bench_compare,
    bench_snapshot_encoding
);
criterion_main!(benches);
