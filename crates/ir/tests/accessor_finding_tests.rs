// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Accessor finding and reverse resolution over anonymous-type items

use unified_query_ir::visitors::{find_accessor_lambda, reverse_resolve};
use unified_query_ir::{
    BinaryOp, ConstructorInfo, ElementInit, Expr, IrError, MemberBinding, MemberInfo, MethodInfo,
    NewExpr, ParameterExpr, QuerySourceHandle, Type,
};
use unified_query_test_utils::{
    DomainFixtures, TreeAssertions, anonymous_member_init, anonymous_new, anonymous_type,
};

fn cook_reference() -> (QuerySourceHandle, Expr) {
    let handle = QuerySourceHandle::new("c", DomainFixtures::cook_type());
    let reference = Expr::query_source_reference(handle.clone());
    (handle, reference)
}

fn input_for(full: &Expr) -> ParameterExpr {
    ParameterExpr::new("input", full.ty())
}

fn accessor_text(searched: &Expr, full: &Expr) -> String {
    find_accessor_lambda(searched, full, &input_for(full))
        .unwrap()
        .to_string()
}

fn not_found_message(searched: &Expr, full: &Expr) -> String {
    let err = find_accessor_lambda(searched, full, &input_for(full)).unwrap_err();
    assert!(matches!(err, IrError::AccessorNotFound { .. }));
    err.to_string()
}

// ============================================================================
// Found accessors
// ============================================================================

#[test]
fn test_trivial_expression() {
    let (_, c) = cook_reference();
    let input = input_for(&c);
    let lambda = find_accessor_lambda(&c, &c, &input).unwrap();
    TreeAssertions::assert_identity_lambda(&lambda, &input);
}

#[test]
fn test_equal_reference_built_separately() {
    let (handle, c) = cook_reference();
    let other = Expr::query_source_reference(handle);
    let full = anonymous_new(&[("a", DomainFixtures::int(1)), ("b", other)]);
    assert_eq!(accessor_text(&c, &full), "input => input.b");
}

#[test]
fn test_simple_new() {
    let (_, c) = cook_reference();
    let full = anonymous_new(&[("a", c.clone()), ("b", DomainFixtures::int(1))]);
    assert_eq!(accessor_text(&c, &full), "input => input.a");
}

#[test]
fn test_simple_member_init() {
    let (_, c) = cook_reference();
    let full = anonymous_member_init(&[("a", DomainFixtures::int(3)), ("b", c.clone())]);
    assert_eq!(accessor_text(&c, &full), "input => input.b");
}

#[test]
fn test_nested_new() {
    let (_, c) = cook_reference();
    let inner = anonymous_new(&[("a", c.clone()), ("b", DomainFixtures::int(2))]);
    let full = anonymous_new(&[("a", DomainFixtures::int(1)), ("b", inner)]);
    assert_eq!(accessor_text(&c, &full), "input => input.b.a");
}

#[test]
fn test_nested_member_init() {
    let (_, c) = cook_reference();
    let inner = anonymous_member_init(&[("a", c.clone())]);
    let full = anonymous_member_init(&[("a", DomainFixtures::int(1)), ("b", inner)]);
    assert_eq!(accessor_text(&c, &full), "input => input.b.a");
}

#[test]
fn test_convert_of_searched_expression() {
    let (_, c) = cook_reference();
    let full = Expr::convert(c.clone(), Type::Object);

    let lambda = find_accessor_lambda(&c, &full, &input_for(&full)).unwrap();
    assert_eq!(lambda.to_string(), "input => Convert(input)");
    assert_eq!(lambda.body.ty(), DomainFixtures::cook_type());
}

#[test]
fn test_convert_wraps_accessor() {
    let (_, c) = cook_reference();
    let item = anonymous_new(&[("a", c.clone())]);
    let full = Expr::convert(item.clone(), Type::Object);

    let lambda = find_accessor_lambda(&c, &full, &input_for(&full)).unwrap();
    assert_eq!(lambda.to_string(), "input => Convert(input).a");
    match lambda.body.as_ref() {
        Expr::MemberAccess {
            target: Some(target),
            ..
        } => assert_eq!(target.ty(), item.ty()),
        other => panic!("Expected member access, found {:?}", other),
    }
}

#[test]
fn test_convert_checked_wraps_accessor() {
    let (_, c) = cook_reference();
    let full = Expr::convert_checked(anonymous_new(&[("a", c.clone())]), Type::Object);
    assert_eq!(accessor_text(&c, &full), "input => Convert(input).a");
}

#[test]
fn test_getter_mapping_yields_property_access() {
    let (_, c) = cook_reference();
    let full = anonymous_new(&[("a", c.clone())]);
    let lambda = find_accessor_lambda(&c, &full, &input_for(&full)).unwrap();

    match lambda.body.as_ref() {
        Expr::MemberAccess { member, .. } => {
            assert_eq!(*member, MemberInfo::property("AnonymousType", "a", c.ty()))
        }
        other => panic!("Expected member access, found {:?}", other),
    }
}

// ============================================================================
// Not found
// ============================================================================

const NOT_FOUND_SUFFIX: &str =
    "in a nested NewExpression with member assignments or a MemberBindingExpression.";

#[test]
fn test_not_found_in_plain_expression() {
    let (_, c) = cook_reference();
    let full = DomainFixtures::int(0);
    assert_eq!(
        not_found_message(&c, &full),
        format!(
            "The given expression '0' does not contain the searched expression '[c]' {}",
            NOT_FOUND_SUFFIX
        )
    );
}

#[test]
fn test_not_found_in_binary() {
    let zero = DomainFixtures::int(0);
    let full = Expr::binary(BinaryOp::Add, zero.clone(), zero.clone()).unwrap();
    assert_eq!(
        not_found_message(&zero, &full),
        format!(
            "The given expression '(0 + 0)' does not contain the searched expression '0' {}",
            NOT_FOUND_SUFFIX
        )
    );
}

#[test]
fn test_not_found_in_unary_plus() {
    let zero = DomainFixtures::int(0);
    let full = Expr::unary_plus(zero.clone());
    assert_eq!(
        not_found_message(&zero, &full),
        format!(
            "The given expression '+0' does not contain the searched expression '0' {}",
            NOT_FOUND_SUFFIX
        )
    );
}

#[test]
fn test_not_found_in_new_without_members() {
    let zero = DomainFixtures::int(0);
    let ty = anonymous_type(&[("a", Type::Int32), ("b", Type::Int32)]);
    let new_expr = NewExpr::new(
        ConstructorInfo::new(ty, vec![Type::Int32, Type::Int32]),
        vec![zero.clone(), DomainFixtures::int(1)],
    )
    .unwrap();
    let full = Expr::new_object(new_expr);

    assert_eq!(
        not_found_message(&zero, &full),
        format!(
            "The given expression 'new AnonymousType(0, 1)' does not contain the searched expression '0' {}",
            NOT_FOUND_SUFFIX
        )
    );
}

#[test]
fn test_not_found_in_list_binding() {
    let zero = DomainFixtures::int(0);
    let list_type = Type::list(Type::Int32);
    let ty = anonymous_type(&[("a", list_type.clone())]);
    let add = MethodInfo::instance(
        list_type.to_string(),
        "Add",
        vec![Type::Int32],
        Type::Void,
    );
    let binding = MemberBinding::list(
        MemberInfo::property("AnonymousType", "a", list_type),
        vec![ElementInit::new(add, vec![zero.clone()]).unwrap()],
    );
    let full = Expr::member_init(
        NewExpr::new(ConstructorInfo::default_for(ty), Vec::new()).unwrap(),
        vec![binding],
    );

    not_found_message(&zero, &full);
}

// ============================================================================
// Reverse resolution
// ============================================================================

#[test]
fn test_reverse_resolve_identity_item() {
    let (_, c) = cook_reference();
    let name = unified_query_test_utils::member(c.clone(), "Name");

    let lambda = reverse_resolve(&c, &name).unwrap();
    TreeAssertions::assert_lambda_text(&lambda, "input => input.Name");
}

#[test]
fn test_reverse_resolve_two_sources() {
    let (_, c) = cook_reference();
    let a = Expr::query_source_reference(QuerySourceHandle::new(
        "a",
        DomainFixtures::assistant_type(),
    ));
    let item = anonymous_new(&[("c", c.clone()), ("a", a.clone())]);
    let resolved = Expr::binary(
        BinaryOp::GreaterThan,
        unified_query_test_utils::member(c, "Age"),
        unified_query_test_utils::member(a, "Age"),
    )
    .unwrap();

    let lambda = reverse_resolve(&item, &resolved).unwrap();
    TreeAssertions::assert_lambda_text(&lambda, "input => (input.c.Age > input.a.Age)");
}

#[test]
fn test_reverse_resolve_unknown_source() {
    let (_, c) = cook_reference();
    let stranger = Expr::query_source_reference(QuerySourceHandle::new(
        "k",
        DomainFixtures::kitchen_type(),
    ));
    let item = anonymous_new(&[("c", c)]);

    let err = reverse_resolve(&item, &stranger).unwrap_err();
    assert!(matches!(err, IrError::AccessorNotFound { searched, .. } if searched == "[k]"));
}
