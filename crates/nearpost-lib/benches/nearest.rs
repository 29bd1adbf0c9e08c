use criterion::{criterion_group, criterion_main, Criterion};
use nearpost_lib::{
    distance_many, ingest, load_sources, nearest, AttributeValue, GeoRecord, LocalDirectory,
    ObserverPosition, PointIndex,
};
use once_cell::sync::Lazy;
use std::hint::black_box;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/lines")
}

static FIXTURE_INDEX: Lazy<PointIndex> = Lazy::new(|| {
    let sources = load_sources(&LocalDirectory::new(fixtures_dir()), &[]).expect("fixtures load");
    ingest(&sources).index
});

// A synthetic line of markers every ~100m along a diagonal, roughly the size
// of a regional railway dataset.
static SYNTHETIC_INDEX: Lazy<PointIndex> = Lazy::new(|| {
    let records = (0..5_000)
        .map(|i| {
            let step = i as f64 * 0.0009;
            let kp = format!("{:.1}", i as f64 / 10.0);
            GeoRecord::new(34.0 + step, 135.0 + step, "synthetic.csv")
                .with_attribute("KP", AttributeValue::from_raw(&kp))
        })
        .collect();
    PointIndex::from_records(records)
});

fn benchmark_nearest(c: &mut Criterion) {
    let observer = ObserverPosition::new(35.67, 139.76);

    c.bench_function("nearest_fixture", |b| {
        let index = &*FIXTURE_INDEX;
        b.iter(|| {
            let result = nearest(index, black_box(observer)).expect("fixture has data");
            black_box(result.position)
        });
    });

    c.bench_function("nearest_synthetic_5000", |b| {
        let index = &*SYNTHETIC_INDEX;
        let observer = ObserverPosition::new(36.1, 137.2);
        b.iter(|| {
            let result = nearest(index, black_box(observer)).expect("synthetic has data");
            black_box(result.distance_meters)
        });
    });

    c.bench_function("distance_many_5000", |b| {
        let index = &*SYNTHETIC_INDEX;
        b.iter(|| {
            let distances = distance_many(36.1, 137.2, index.latitudes(), index.longitudes());
            black_box(distances.len())
        });
    });
}

criterion_group!(benches, benchmark_nearest);
criterion_main!(benches);
