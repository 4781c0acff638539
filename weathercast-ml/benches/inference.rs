use criterion::{Criterion, black_box, criterion_group, criterion_main};
use weathercast_ml::features::build_features;
use weathercast_ml::inference::{ArtifactBundle, InferenceRequest, apply};
use weathercast_ml::{LinearRegression, ObservationGenerator};

fn fitted_bundle() -> ArtifactBundle {
    let observations = ObservationGenerator::new("Jakarta", Some(42)).generate(1000);
    let build = build_features(&observations).unwrap();
    let model = LinearRegression::fit(&build.table.features, &build.table.target).unwrap();
    ArtifactBundle::from_parts("bench", build.encoder, build.scaler, model).unwrap()
}

fn bench_apply(c: &mut Criterion) {
    let bundle = fitted_bundle();
    let known = InferenceRequest {
        humidity: 78.0,
        wind_kph: 12.5,
        condition: "Partly cloudy".into(),
        hour: 14,
        day: 3,
        month: 7,
        day_of_year: 184,
    };
    let unseen = InferenceRequest {
        condition: "Sandstorm".into(),
        ..known.clone()
    };

    c.bench_function("apply_known_condition", |b| {
        b.iter(|| apply(black_box(&bundle), black_box(&known)))
    });

    c.bench_function("apply_unseen_condition", |b| {
        b.iter(|| apply(black_box(&bundle), black_box(&unseen)))
    });
}

fn bench_build(c: &mut Criterion) {
    let observations = ObservationGenerator::new("Jakarta", Some(7)).generate(1000);
    c.bench_function("build_features_1000_rows", |b| {
        b.iter(|| build_features(black_box(&observations)))
    });
}

criterion_group!(benches, bench_apply, bench_build);
criterion_main!(benches);
