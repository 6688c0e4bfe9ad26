use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rjpsi_core::{
    data::{test_event, test_indices::JPSI},
    genealogy::walk_ancestors,
    AncestryRules, Inspector, OutputRow,
};

fn walk_benchmark(c: &mut Criterion) {
    let event = test_event();
    let rules = AncestryRules::default();
    c.bench_function("walk ancestors", |b| {
        b.iter(|| black_box(walk_ancestors(&event, black_box(JPSI), &rules)));
    });
}

fn inspect_benchmark(c: &mut Criterion) {
    let inspector = Inspector::default();
    let event = test_event();
    c.bench_function("inspect event", |b| {
        b.iter(|| black_box(inspector.inspect_event(black_box(&event))));
    });

    let mut group = c.benchmark_group("run");
    for n_events in [1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_events),
            &n_events,
            |b, &n_events| {
                b.iter_batched(
                    || (0..n_events).map(|_| Ok(test_event())).collect::<Vec<_>>(),
                    |events| {
                        let mut rows: Vec<OutputRow> = Vec::with_capacity(n_events);
                        black_box(inspector.run(events, &mut rows).unwrap());
                        rows
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, walk_benchmark, inspect_benchmark);
criterion_main!(benches);
