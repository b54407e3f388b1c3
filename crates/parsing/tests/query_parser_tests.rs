// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end tests: operator call trees to query models

use unified_query_ir::{
    BinaryOp, BodyClause, Expr, QueryModel, ResultOperator, StreamedDataInfo, SubQueryExpr, Type,
};
use unified_query_parsing::{
    NodeKind, NodeTypeRegistry, ParseError, ParserConfig, QueryParser, MethodCallParseInfo,
    ParseResult,
};
use unified_query_test_utils::{
    DomainFixtures, QueryBuilder, TreeAssertions, anonymous_new, init_test_tracing, member,
};

fn parse(query: &Expr) -> QueryModel {
    init_test_tracing();
    match QueryParser::default().get_parsed_query(query) {
        Ok(model) => model,
        Err(err) => panic!("Failed to parse '{}': {}", query, err),
    }
}

fn parse_err(query: &Expr) -> ParseError {
    init_test_tracing();
    match QueryParser::default().get_parsed_query(query) {
        Ok(model) => panic!("Expected '{}' to fail, parsed '{}'", query, model),
        Err(err) => err,
    }
}

fn older_than(target: Expr, age: i32) -> Expr {
    Expr::binary(
        BinaryOp::GreaterThan,
        member(target, "Age"),
        DomainFixtures::int(age),
    )
    .unwrap()
}

// ============================================================================
// Single source pipelines
// ============================================================================

#[test]
fn test_bare_source() {
    let model = parse(&DomainFixtures::cooks());
    assert!(model.body_clauses.is_empty());
    assert!(model.result_operators.is_empty());
    TreeAssertions::assert_query_source_reference(
        &model.select_clause.selector,
        &model.main_from_clause.source,
    );
}

#[test]
fn test_where_select() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |c| older_than(c, 18))
        .select("c", |c| member(c, "FirstName"))
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) where ([c].Age > 18) select [c].FirstName",
    );
    assert_eq!(
        model.output_data_info().unwrap(),
        StreamedDataInfo::sequence(Type::String)
    );
}

#[test]
fn test_consecutive_filters() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |c| older_than(c, 18))
        .where_("x", |x| member(x, "IsStarredCook"))
        .build();

    let model = parse(&query);
    assert_eq!(model.body_clauses.len(), 2);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) where ([c].Age > 18) where [c].IsStarredCook select [c]",
    );
}

#[test]
fn test_ordering_chain_extends_one_clause() {
    let query = QueryBuilder::enumerable(DomainFixtures::numbers(&[3, 1, 2]))
        .order_by("n", |n| n)
        .then_by_descending("n", |n| n)
        .build();

    let model = parse(&query);
    match model.body_clauses.as_slice() {
        [BodyClause::OrderBy(order_by)] => assert_eq!(order_by.orderings.len(), 2),
        other => panic!("Expected a single orderby clause, found {:?}", other),
    }
    TreeAssertions::assert_model_text(
        &model,
        "from Int32 n in value(Int32[]) orderby [n] asc, [n] desc select [n]",
    );
}

#[test]
fn test_second_order_by_starts_new_clause() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .order_by("c", |c| member(c, "Name"))
        .order_by_descending("c", |c| member(c, "Age"))
        .build();

    let model = parse(&query);
    assert_eq!(model.body_clauses.len(), 2);
}

#[test]
fn test_enumerable_sum() {
    let query = QueryBuilder::enumerable(DomainFixtures::numbers(&[1, 2, 3]))
        .where_("n", |n| {
            Expr::binary(BinaryOp::GreaterThan, n, DomainFixtures::int(1)).unwrap()
        })
        .sum();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Int32 n in value(Int32[]) where ([n] > 1) select [n] => Sum()",
    );
    assert_eq!(
        model.output_data_info().unwrap(),
        StreamedDataInfo::scalar(Type::Int32)
    );
}

#[test]
fn test_result_operator_sequence() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select("c", |c| member(c, "Name"))
        .distinct()
        .take(5)
        .count();

    let model = parse(&query);
    assert_eq!(
        model
            .result_operators
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        vec!["Distinct()", "Take(5)", "Count()"]
    );
}

#[test]
fn test_first_or_default_is_single_value() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |c| member(c, "IsStarredCook"))
        .first_or_default();

    let model = parse(&query);
    assert_eq!(
        model.result_operators,
        vec![ResultOperator::First {
            return_default_when_empty: true
        }]
    );
    assert_eq!(
        model.output_data_info().unwrap(),
        StreamedDataInfo::single(DomainFixtures::cook_type(), true)
    );
}

#[test]
fn test_source_through_implemented_interface() {
    let table = Expr::constant(
        unified_query_ir::Value::Source("CookTable".to_string()),
        DomainFixtures::cook_table_type(),
    );
    let model = parse(&table);
    assert_eq!(
        model.main_from_clause.source.item_type,
        DomainFixtures::cook_type()
    );
}

// ============================================================================
// Nested lambdas
// ============================================================================

fn other_cooks() -> Expr {
    Expr::constant(
        unified_query_ir::Value::Source("OtherCooks".to_string()),
        Type::queryable(DomainFixtures::cook_type()),
    )
}

#[test]
fn test_nested_lambda_shadowing_outer_parameter() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |_| {
            QueryBuilder::enumerable(other_cooks()).any_where("c", |c| member(c, "IsStarredCook"))
        })
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) where value(OtherCooks).Any(c => c.IsStarredCook) select [c]",
    );
}

#[test]
fn test_nested_lambda_reading_outer_parameter() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .where_("c", |c| {
            QueryBuilder::enumerable(other_cooks()).any_where("o", |o| {
                Expr::binary(BinaryOp::GreaterThan, member(o, "Age"), member(c, "Age")).unwrap()
            })
        })
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) where value(OtherCooks).Any(o => (o.Age > [c].Age)) select [c]",
    );
}

#[test]
fn test_nested_lambda_through_transparent_identifier() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select_many_with(
            "c",
            |c| member(c, "Assistants"),
            ("c", "a"),
            |c, a| anonymous_new(&[("c", c), ("a", a)]),
        )
        .where_("x", |_| {
            QueryBuilder::enumerable(other_cooks()).any_where("x", |inner| {
                Expr::binary(BinaryOp::GreaterThan, member(inner, "Age"), DomainFixtures::int(30))
                    .unwrap()
            })
        })
        .select("x", |x| member(member(x, "c"), "Name"))
        .build();

    let model = parse(&query);
    match &model.body_clauses[1] {
        BodyClause::Where(clause) => assert_eq!(
            clause.predicate.to_string(),
            "value(OtherCooks).Any(x => (x.Age > 30))"
        ),
        other => panic!("Expected where clause, found {}", other),
    }
}

// ============================================================================
// Multiple query sources
// ============================================================================

#[test]
fn test_select_many_without_result_selector() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select_many("c", |c| member(c, "Assistants"))
        .where_("a", |a| older_than(a, 30))
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) from Assistant a in [c].Assistants where ([a].Age > 30) select [a]",
    );
}

#[test]
fn test_select_many_transparent_identifiers() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select_many_with(
            "c",
            |c| member(c, "Assistants"),
            ("c", "a"),
            |c, a| anonymous_new(&[("c", c), ("a", a)]),
        )
        .where_("x", |x| older_than(member(x, "a"), 18))
        .select("x", |x| member(member(x, "c"), "Name"))
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) from Assistant a in [c].Assistants where ([a].Age > 18) select [c].Name",
    );

    let sources = model.query_sources();
    assert_eq!(sources.len(), 2);
    TreeAssertions::assert_references_only(&model.select_clause.selector, &sources);
}

#[test]
fn test_select_many_projection_without_access() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select_many_with(
            "c",
            |c| member(c, "Assistants"),
            ("c", "a"),
            |c, a| anonymous_new(&[("c", c), ("a", a)]),
        )
        .build();

    let model = parse(&query);
    TreeAssertions::assert_expr_text(
        &model.select_clause.selector,
        "new AnonymousType(c = [c], a = [a])",
    );
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_group_by_key() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .group_by("c", |c| member(c, "Name"))
        .build();

    let model = parse(&query);
    TreeAssertions::assert_model_text(
        &model,
        "from Cook c in value(Cooks) select [c] => GroupBy([c].Name, [c])",
    );
    assert_eq!(
        model.output_data_info().unwrap(),
        StreamedDataInfo::sequence(Type::grouping(Type::String, DomainFixtures::cook_type()))
    );

    let ResultOperator::Group(group) = &model.result_operators[0] else {
        panic!("Expected group result operator");
    };
    let key = group
        .key_selector_lambda(&model.select_clause.selector)
        .unwrap();
    TreeAssertions::assert_lambda_text(&key, "input => input.Name");
}

#[test]
fn test_group_by_through_transparent_identifier() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .select("c", |c| {
            let name = member(c.clone(), "Name");
            anonymous_new(&[("c", c), ("n", name)])
        })
        .group_by_with_element("x", |x| member(x, "n"), |x| member(x, "c"))
        .count();

    let model = parse(&query);
    let ResultOperator::Group(group) = &model.result_operators[0] else {
        panic!("Expected group result operator");
    };
    TreeAssertions::assert_expr_text(&group.key_selector, "[c].Name");
    TreeAssertions::assert_expr_text(&group.element_selector, "[c]");

    let selector = &model.select_clause.selector;
    TreeAssertions::assert_lambda_text(
        &group.key_selector_lambda(selector).unwrap(),
        "input => input.c.Name",
    );
    TreeAssertions::assert_lambda_text(
        &group.element_selector_lambda(selector).unwrap(),
        "input => input.c",
    );
    assert_eq!(
        model.output_data_info().unwrap(),
        StreamedDataInfo::scalar(Type::Int32)
    );
}

#[test]
fn test_group_by_output_cannot_be_filtered() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .group_by("c", |c| member(c, "Name"))
        .where_("g", |_| DomainFixtures::int(1))
        .build();

    assert!(matches!(
        parse_err(&query),
        ParseError::UnsupportedExpression { .. }
    ));
}

// ============================================================================
// Sub-queries
// ============================================================================

#[test]
fn test_sub_query_source() {
    let inner = parse(
        &QueryBuilder::enumerable(DomainFixtures::numbers(&[1, 2, 3]))
            .where_("n", |n| {
                Expr::binary(BinaryOp::GreaterThan, n, DomainFixtures::int(1)).unwrap()
            })
            .build(),
    );
    let sub_query = Expr::SubQuery(SubQueryExpr::new(inner.clone()).unwrap());
    let query = QueryBuilder::enumerable(sub_query).count();

    let model = parse(&query);
    match &model.main_from_clause.from_expression {
        Expr::SubQuery(sub_query) => assert_eq!(*sub_query.model, inner),
        other => panic!("Expected sub-query from expression, found {}", other),
    }
    assert_eq!(model.main_from_clause.source.item_type, Type::Int32);
    assert_eq!(model.result_operators, vec![ResultOperator::Count]);
    model.check_references().unwrap();
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_non_sequence_source() {
    let err = parse_err(&DomainFixtures::int(3));
    assert_eq!(
        err.to_string(),
        "Query source type 'Int32' does not implement IEnumerable<T>"
    );
}

#[test]
fn test_unregistered_method() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks()).count();
    let parser = QueryParser::with_registry(ParserConfig::default(), NodeTypeRegistry::empty());

    match parser.get_parsed_query(&query).unwrap_err() {
        ParseError::UnsupportedExpression {
            position, reason, ..
        } => {
            assert_eq!(position, 0);
            assert_eq!(
                reason,
                "method 'Queryable.Count/1' is not a registered query operator"
            );
        }
        other => panic!("Expected UnsupportedExpression, found {:?}", other),
    }
}

#[test]
fn test_custom_operator() {
    fn unique(_: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
        Ok(NodeKind::ResultOperator(ResultOperator::Distinct))
    }

    let mut registry = NodeTypeRegistry::new();
    registry.register(
        unified_query_ir::MethodKey::new("Queryable", "Distinct", 1),
        unique,
    );
    let parser = QueryParser::with_registry(ParserConfig::default(), registry);
    let query = QueryBuilder::queryable(DomainFixtures::cooks()).distinct().build();

    let model = parser.get_parsed_query(&query).unwrap();
    assert_eq!(model.result_operators, vec![ResultOperator::Distinct]);
}

#[test]
fn test_parameter_outside_call_chain() {
    let stray = Expr::parameter("cooks", Type::queryable(DomainFixtures::cook_type()));
    let query = QueryBuilder::queryable(stray).count();

    match parse_err(&query) {
        ParseError::UnsupportedExpression {
            expression,
            position,
            ..
        } => {
            assert_eq!(expression, "cooks");
            assert_eq!(position, 1);
        }
        other => panic!("Expected UnsupportedExpression, found {:?}", other),
    }
}

#[test]
fn test_recursion_limit() {
    let query = (0..10)
        .fold(
            QueryBuilder::enumerable(DomainFixtures::numbers(&[1])),
            |builder, _| builder.distinct(),
        )
        .build();
    let parser = QueryParser::new(ParserConfig::default().with_max_chain_depth(5));

    assert_eq!(
        parser.get_parsed_query(&query).unwrap_err(),
        ParseError::RecursionLimitExceeded { depth: 6, limit: 5 }
    );
}

#[test]
fn test_then_by_after_where() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .order_by("c", |c| member(c, "Name"))
        .where_("c", |c| member(c, "IsStarredCook"))
        .then_by("c", |c| member(c, "Age"))
        .build();

    assert!(matches!(
        parse_err(&query),
        ParseError::InvalidClauseChaining { node_type, .. } if node_type == "ThenBy"
    ));
}

#[test]
fn test_select_after_result_operator() {
    let query = QueryBuilder::queryable(DomainFixtures::cooks())
        .take(2)
        .select("c", |c| member(c, "Name"))
        .build();

    assert!(matches!(
        parse_err(&query),
        ParseError::InvalidClauseChaining { node_type, .. } if node_type == "Select"
    ));
}

#[test]
fn test_error_serializes_for_clients() {
    let err = parse_err(&DomainFixtures::int(3));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["TypeMismatch"]["found"], "Int32");
}
