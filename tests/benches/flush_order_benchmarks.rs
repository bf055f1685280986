//! # Flush Order Benchmarks
//!
//! Build cost of the flush stack over three graph shapes:
//!
//! | Shape | Description |
//! |-------|-------------|
//! | chain | one head, each node owns the FK to the next |
//! | fan-out | one head referenced by N children that own the FK |
//! | ring | many-to-many cycle, every node a head |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;
use uow_flush_ordering::{
    build_flush_order, EntityType, LifecycleState, OwningSide, RelationKind, WorkRegistry,
};

fn add(registry: &mut WorkRegistry, id: &str) {
    registry
        .add_node(id, EntityType::new("Entity"), LifecycleState::New)
        .unwrap();
}

fn chain(size: usize) -> WorkRegistry {
    let mut registry = WorkRegistry::new();
    for i in 0..size {
        add(&mut registry, &format!("N#{i}"));
    }
    for i in 1..size {
        registry
            .link(
                &format!("N#{}", i - 1),
                &format!("N#{i}"),
                RelationKind::ManyToOne,
                Some(OwningSide::Parent),
            )
            .unwrap();
    }
    registry.register_head("N#0").unwrap();
    registry
}

fn fan_out(size: usize) -> WorkRegistry {
    let mut registry = WorkRegistry::new();
    add(&mut registry, "Root");
    for i in 0..size {
        let child = format!("C#{i}");
        add(&mut registry, &child);
        registry
            .link("Root", &child, RelationKind::OneToMany, Some(OwningSide::Child))
            .unwrap();
    }
    registry.register_head("Root").unwrap();
    registry
}

fn ring(size: usize) -> WorkRegistry {
    let mut registry = WorkRegistry::new();
    for i in 0..size {
        add(&mut registry, &format!("R#{i}"));
    }
    let mut rng = rand::thread_rng();
    for i in 0..size {
        let side = if rng.gen_bool(0.5) {
            OwningSide::Parent
        } else {
            OwningSide::Child
        };
        registry
            .link(
                &format!("R#{i}"),
                &format!("R#{}", (i + 1) % size),
                RelationKind::ManyToMany,
                Some(side),
            )
            .unwrap();
        registry.register_head(&format!("R#{i}")).unwrap();
    }
    registry
}

fn bench_flush_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush-order");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut registry = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, _| {
            b.iter(|| black_box(build_flush_order(&mut registry).unwrap()))
        });

        let mut registry = fan_out(size);
        group.bench_with_input(BenchmarkId::new("fan_out", size), &size, |b, _| {
            b.iter(|| black_box(build_flush_order(&mut registry).unwrap()))
        });

        let mut registry = ring(size);
        group.bench_with_input(BenchmarkId::new("ring", size), &size, |b, _| {
            b.iter(|| black_box(build_flush_order(&mut registry).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flush_order);
criterion_main!(benches);
