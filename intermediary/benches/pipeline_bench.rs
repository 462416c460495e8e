//! Benchmarks for pipeline runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intermediary::logging::NoOpErrorLog;
use intermediary::prelude::*;
use intermediary::Value;
use intermediary::testing::{increment_args, FailingMiddleware};
use std::sync::Arc;

fn pipeline_of(stages: usize) -> Pipeline {
    (0..stages)
        .fold(Pipeline::builder(), |builder, i| {
            builder
                .middleware_fn(format!("m{i}"), |_ctx, args| Ok(Some(increment_args(&args, 1))))
                .afterware_fn(format!("a{i}"), |_ctx, result, args| {
                    Ok(Some(AfterwareOutput::new(result, args)))
                })
        })
        .build()
}

fn echo() -> impl Target {
    target_fn("echo", |args| Ok(Value::from(args)))
}

fn pipeline_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("involved_call");
    for stages in [0, 1, 8, 32] {
        let involved = pipeline_of(stages).involve(echo(), None, None);
        group.bench_with_input(BenchmarkId::from_parameter(stages), &involved, |b, involved| {
            b.iter(|| runtime.block_on(involved.call(black_box(args![1, 2, 3]))));
        });
    }
    group.finish();

    let contained = Pipeline::builder()
        .middleware(FailingMiddleware::new("broken", "nope"))
        .build()
        .involve(echo(), None, InvolveConfig::contain_all())
        .with_log(Arc::new(NoOpErrorLog));
    c.bench_function("contained_failure", |b| {
        b.iter(|| runtime.block_on(contained.call(black_box(args![1]))));
    });

    let nested = Pipeline::concat(&[pipeline_of(4), pipeline_of(4)]).involve(
        pipeline_of(4).involve(echo(), None, None),
        None,
        None,
    );
    c.bench_function("nested_involved", |b| {
        b.iter(|| runtime.block_on(nested.call(black_box(args![1]))));
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
