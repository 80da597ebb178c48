use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_validator::{Normalizer, SensorReading};
use dispatcher::Dispatcher;

fn reading() -> SensorReading {
    SensorReading {
        soil_moisture: 1750.0,
        light: 2100.0,
        air_quality: 600.0,
        temperature: 23.5,
        humidity: 48.0,
    }
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::default();
    let reading = reading();
    c.bench_function("normalize", |b| b.iter(|| normalizer.normalize(black_box(&reading))));
}

fn bench_fallback_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::fallback_only();
    let reading = reading();
    c.bench_function("dispatch_fallback", |b| {
        b.iter(|| dispatcher.classify(black_box(&reading)))
    });
}

criterion_group!(benches, bench_normalize, bench_fallback_dispatch);
criterion_main!(benches);
