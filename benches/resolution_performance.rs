// benches/resolution_performance.rs
//! Benchmarks for faultline resolution paths
//!
//! Covers each resolution branch, the effect of chain length on the fatal
//! scan, locator lookups with and without component overrides, and the cost
//! of writing a resolution log line.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use faultline::{
    classify, definitions::builtin_repository, resolve, ComponentId, Error, ErrorTypeLocator,
    Event, ExceptionMapper, Fault, FaultKind, MessagingFault, ResolverConfig,
};

// ============================================================================
// Fixtures
// ============================================================================

fn locator() -> ErrorTypeLocator {
    let repo = builtin_repository();
    ErrorTypeLocator::builtin_builder(repo)
        .add_component_mapper(
            "db:select",
            ExceptionMapper::builder()
                .add_mapping(FaultKind::CONNECTIVITY, repo.timeout().clone())
                .build(),
        )
        .build()
}

fn plain_chain(length: usize) -> Fault {
    Fault::from_chain((0..length).map(|_| Fault::new(FaultKind::PLAIN)))
        .unwrap_or_else(|| Fault::new(FaultKind::PLAIN))
}

// ============================================================================
// Branches
// ============================================================================

fn bench_branches(c: &mut Criterion) {
    let locator = locator();
    let config = ResolverConfig::default();
    let component = ComponentId::from("core:logger");
    let existing = Error::of_type(builtin_repository().transformation().clone());

    let fatal = Fault::new(FaultKind::PLAIN).caused_by(Fault::fatal("stop"));
    let severe_chain = Fault::severe("a").caused_by(Fault::severe("b"));
    let single_severe = Fault::severe("a");
    let located = Fault::new(FaultKind::CONNECTIVITY).with_message("refused");

    let mut group = c.benchmark_group("classify_branch");

    group.bench_function("fatal_signal", |b| {
        b.iter(|| black_box(classify(&fatal, &component, None, &locator, &config).branch()))
    });

    group.bench_function("severe_chain", |b| {
        b.iter(|| black_box(classify(&severe_chain, &component, None, &locator, &config).branch()))
    });

    group.bench_function("existing", |b| {
        b.iter(|| {
            black_box(classify(&located, &component, Some(&existing), &locator, &config).branch())
        })
    });

    group.bench_function("single_severe", |b| {
        b.iter(|| black_box(classify(&single_severe, &component, None, &locator, &config).branch()))
    });

    group.bench_function("located", |b| {
        b.iter(|| black_box(classify(&located, &component, None, &locator, &config).branch()))
    });

    group.finish();
}

// ============================================================================
// Chain Length
// ============================================================================

fn bench_chain_length(c: &mut Criterion) {
    let locator = locator();
    let config = ResolverConfig::default();
    let component = ComponentId::from("core:logger");

    let mut group = c.benchmark_group("fatal_scan_depth");
    for length in [1usize, 4, 16, 64] {
        let fault = plain_chain(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &fault, |b, fault| {
            b.iter(|| black_box(classify(fault, &component, None, &locator, &config).branch()))
        });
    }
    group.finish();
}

// ============================================================================
// Locator
// ============================================================================

fn bench_locator(c: &mut Criterion) {
    let locator = locator();
    let mut group = c.benchmark_group("locator_classify");

    group.bench_function("component_override", |b| {
        b.iter(|| black_box(locator.classify(black_box("db:select"), &FaultKind::CONNECTIVITY)))
    });

    group.bench_function("default_mapper", |b| {
        b.iter(|| black_box(locator.classify(black_box("http:request"), &FaultKind::CONNECTIVITY)))
    });

    group.bench_function("default_type", |b| {
        let kind = FaultKind::domain("UnmappedFault");
        b.iter(|| black_box(locator.classify(black_box("http:request"), &kind)))
    });

    group.finish();
}

// ============================================================================
// End-to-End
// ============================================================================

fn bench_resolve(c: &mut Criterion) {
    let locator = locator();

    c.bench_function("resolve_end_to_end", |b| {
        b.iter_batched(
            || {
                MessagingFault::new(
                    "Messaging Error Message",
                    Fault::new(FaultKind::CONNECTIVITY).with_message("refused"),
                    Event::new("evt"),
                    "db:select",
                )
            },
            |mf| black_box(resolve(mf, &locator)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_log_write(c: &mut Criterion) {
    let locator = locator();
    let config = ResolverConfig::default();
    let component = ComponentId::from("core:logger");
    let fault = Fault::severe("a").caused_by(Fault::severe("b"));
    let resolution = classify(&fault, &component, None, &locator, &config);

    c.bench_function("resolution_log_write_to", |b| {
        let mut buffer = String::with_capacity(256);
        b.iter(|| {
            buffer.clear();
            resolution.log().write_to(&mut buffer).ok();
            black_box(buffer.len())
        })
    });
}

criterion_group!(
    benches,
    bench_branches,
    bench_chain_length,
    bench_locator,
    bench_resolve,
    bench_log_write,
);
criterion_main!(benches);
