//! Query parsing performance benchmarks
//!
//! Measures call tree to query model parsing across:
//! - Chain shapes (filter/projection, multiple sources, grouping)
//! - Chain length (number of chained operators)

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use unified_query_ir::{BinaryOp, Expr};
use unified_query_parsing::QueryParser;
use unified_query_test_utils::{DomainFixtures, QueryBuilder, anonymous_new, member};

fn older_than(target: Expr, age: i32) -> Expr {
    Expr::binary(
        BinaryOp::GreaterThan,
        member(target, "Age"),
        DomainFixtures::int(age),
    )
    .expect("Failed to build comparison")
}

fn shapes() -> Vec<(&'static str, Expr)> {
    let filter = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |c| older_than(c, 18))
        .order_by("c", |c| member(c, "Name"))
        .select("c", |c| member(c, "FirstName"))
        .count();

    let select_many = QueryBuilder::queryable(DomainFixtures::cooks())
        .select_many_with(
            "c",
            |c| member(c, "Assistants"),
            ("c", "a"),
            |c, a| anonymous_new(&[("c", c), ("a", a)]),
        )
        .where_("x", |x| older_than(member(x, "a"), 30))
        .select("x", |x| member(member(x, "c"), "Name"))
        .build();

    let group = QueryBuilder::queryable(DomainFixtures::cooks())
        .group_by("c", |c| member(c, "Name"))
        .count();

    vec![
        ("filter", filter),
        ("select_many", select_many),
        ("group", group),
    ]
}

fn bench_shapes(c: &mut Criterion) {
    let parser = QueryParser::default();
    let mut group = c.benchmark_group("parsing/shapes");

    for (name, query) in shapes() {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let model = parser
                    .get_parsed_query(black_box(&query))
                    .expect("Parsing failed");
                black_box(model);
            });
        });
    }

    group.finish();
}

fn bench_chain_length(c: &mut Criterion) {
    let parser = QueryParser::default();
    let mut group = c.benchmark_group("parsing/chain_length");

    for length in [1, 8, 32] {
        let query = (0..length)
            .fold(QueryBuilder::queryable(DomainFixtures::cooks()), |builder, _| {
                builder.where_("c", |c| member(c, "IsStarredCook"))
            })
            .build();

        group.bench_function(BenchmarkId::from_parameter(length), |b| {
            b.iter(|| {
                let model = parser
                    .get_parsed_query(black_box(&query))
                    .expect("Parsing failed");
                black_box(model);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shapes, bench_chain_length);
criterion_main!(benches);
