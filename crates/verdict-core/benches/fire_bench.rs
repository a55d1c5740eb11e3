use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use verdict_core::{
    DefaultRulesEngine, Facts, InferenceRulesEngine, Rule, RuleBuilder, RuleSet, RulesEngine,
};

fn generate_rules(count: usize) -> RuleSet {
    (0..count)
        .map(|i| {
            let field = format!("field_{}", i % 10);
            let threshold = (i % 100) as i64;
            Box::new(
                RuleBuilder::new()
                    .name(format!("rule_{i}"))
                    .priority((i % 7) as i32)
                    .when(move |facts: &Facts| {
                        Ok(facts.get_integer(&field).unwrap_or_default() > threshold)
                    })
                    .then(|facts: &mut Facts| {
                        let hits = facts.get_integer("hits").unwrap_or_default();
                        facts.put("hits", hits + 1);
                        Ok(())
                    })
                    .build(),
            ) as Box<dyn Rule>
        })
        .collect()
}

fn generate_facts() -> Facts {
    (0..10i64).map(|i| (format!("field_{i}"), i * 10)).fold(
        Facts::new(),
        |mut facts, (name, value)| {
            facts.put(name, value);
            facts
        },
    )
}

fn bench_single_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_pass");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1_000].iter() {
        let rules = generate_rules(*size);
        let engine = DefaultRulesEngine::new();
        group.bench_with_input(BenchmarkId::new("fire", size), size, |b, _| {
            b.iter_batched(
                generate_facts,
                |mut facts| {
                    engine.fire(&rules, &mut facts);
                    black_box(facts)
                },
                criterion::BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("check", size), size, |b, _| {
            let facts = generate_facts();
            b.iter(|| black_box(engine.check(&rules, &facts)));
        });
    }
    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new()
            .name("air conditioning rule")
            .when(|facts: &Facts| Ok(facts.get_integer("temperature").unwrap_or_default() > 25))
            .then(|facts: &mut Facts| {
                let temperature = facts.get_integer("temperature").unwrap_or_default();
                facts.put("temperature", temperature - 1);
                Ok(())
            })
            .build(),
    );
    let engine = InferenceRulesEngine::new();

    c.bench_function("inference_cool_down_from_1000", |b| {
        b.iter_batched(
            || {
                let mut facts = Facts::new();
                facts.put("temperature", 1_000);
                facts
            },
            |mut facts| {
                engine.fire(&rules, &mut facts);
                black_box(facts)
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_single_pass, bench_inference);
criterion_main!(benches);
