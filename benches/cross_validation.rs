use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use materials_eval::evaluation::{ClassPolarity, Evaluator, EvaluatorConfig};
use materials_eval::training::{CVStrategy, CrossValidator, ModelAdapter, ModelKind, ModelParams};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<u8>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);
    // Label from the first two features plus noise
    let y = Array1::from_shape_fn(n_rows, |r| {
        let s = x[[r, 0]] + x[[r, 1]] + rng.gen::<f64>() * 2.0;
        if s > 11.0 { 1 } else { 0 }
    });

    (x, y)
}

fn evaluator() -> Evaluator {
    let config = EvaluatorConfig::new(ClassPolarity::new(1, "FM"), ClassPolarity::new(0, "AFM"))
        .with_random_state(7);
    Evaluator::new(config)
}

fn bench_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("kfold_split");

    for n_rows in [1_000, 10_000, 100_000].iter() {
        let cv = CrossValidator::new(CVStrategy::default()).with_random_state(7);
        group.bench_with_input(BenchmarkId::new("split", n_rows), n_rows, |b, &n| {
            b.iter(|| cv.split(black_box(n), None).unwrap())
        });
    }

    group.finish();
}

fn bench_cross_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_validation");
    group.sample_size(10); // Each iteration fits five models

    let params = ModelParams::default().with_max_depth(8);
    for n_rows in [500, 2_000].iter() {
        let (x, y) = create_classification_data(*n_rows, 8);

        group.bench_with_input(BenchmarkId::new("shared", n_rows), &(&x, &y), |b, (x, y)| {
            b.iter(|| {
                let mut model = ModelAdapter::with_params(ModelKind::DecisionTree, params.clone());
                evaluator().cross_validate(black_box(*x), black_box(*y), &mut model).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("isolated", n_rows), &(&x, &y), |b, (x, y)| {
            let template = ModelAdapter::with_params(ModelKind::DecisionTree, params.clone());
            b.iter(|| {
                evaluator()
                    .cross_validate_isolated(black_box(*x), black_box(*y), || template.unfitted())
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_splitting, bench_cross_validation);
criterion_main!(benches);
