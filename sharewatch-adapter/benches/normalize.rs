//! Benchmarks for response normalization.
//!
//! Run with: cargo bench -p sharewatch-adapter --bench normalize

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use sharewatch_adapter::{normalize, parse_trip_flag};

fn payload(units: usize) -> Value {
    let data: Vec<Value> = (0..units)
        .map(|i| {
            json!({
                "unit_id": i,
                "name": format!("Unit {}", i),
                "lat": 52.5 + i as f64 * 0.001,
                "lng": "13.4",
                "speed": 42.3,
                "angle": 90,
                "in_trip": if i % 2 == 0 { json!(true) } else { json!("0") },
                "dt_unit": "2024-05-01 10:00:00",
            })
        })
        .collect();
    json!({"success": true, "data": data})
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for units in [1, 10, 100, 1000] {
        let payload = payload(units);
        group.bench_with_input(BenchmarkId::from_parameter(units), &payload, |b, p| {
            b.iter(|| normalize(black_box(p)))
        });
    }

    group.finish();
}

fn bench_trip_flag(c: &mut Criterion) {
    let values = [json!(true), json!("yes"), json!(" FALSE "), json!("maybe"), json!(1)];

    c.bench_function("parse_trip_flag", |b| {
        b.iter(|| {
            for value in &values {
                black_box(parse_trip_flag(black_box(value)));
            }
        })
    });
}

criterion_group!(benches, bench_normalize, bench_trip_flag);
criterion_main!(benches);
