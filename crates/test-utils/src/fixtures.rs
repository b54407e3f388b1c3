// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: a small object domain and anonymous-type helpers

use unified_query_ir::{
    ClassType, ConstructorInfo, Expr, MemberBinding, MemberInfo, NewExpr, Type, Value,
};

/// Name used for every anonymous type built by the helpers below
pub const ANONYMOUS_TYPE_NAME: &str = "AnonymousType";

/// Types and query sources of the test domain
pub struct DomainFixtures;

impl DomainFixtures {
    /// `Assistant { Name, Age }`
    pub fn assistant_type() -> Type {
        Type::class(
            ClassType::new("Assistant")
                .with_property("Name", Type::String)
                .with_property("Age", Type::Int32),
        )
    }

    /// `Cook { FirstName, Name, Age, IsStarredCook, Specialty, Assistants }`
    pub fn cook_type() -> Type {
        Type::class(
            ClassType::new("Cook")
                .with_property("FirstName", Type::String)
                .with_property("Name", Type::String)
                .with_property("Age", Type::Int32)
                .with_property("IsStarredCook", Type::Boolean)
                .with_field("Specialty", Type::String)
                .with_property("Assistants", Type::list(Self::assistant_type())),
        )
    }

    /// `Kitchen { Name, RoomNumber, Cook }`
    pub fn kitchen_type() -> Type {
        Type::class(
            ClassType::new("Kitchen")
                .with_property("Name", Type::String)
                .with_property("RoomNumber", Type::Int32)
                .with_property("Cook", Self::cook_type()),
        )
    }

    /// A table type that is queryable only through its implemented interface
    pub fn cook_table_type() -> Type {
        Type::class(ClassType::new("CookTable").implementing(Type::queryable(Self::cook_type())))
    }

    /// `value(Cooks)` of type `IQueryable<Cook>`
    pub fn cooks() -> Expr {
        Expr::constant(
            Value::Source("Cooks".to_string()),
            Type::queryable(Self::cook_type()),
        )
    }

    /// `value(Kitchens)` of type `IQueryable<Kitchen>`
    pub fn kitchens() -> Expr {
        Expr::constant(
            Value::Source("Kitchens".to_string()),
            Type::queryable(Self::kitchen_type()),
        )
    }

    /// An in-memory `Int32[]`
    pub fn numbers(values: &[i32]) -> Expr {
        Expr::constant(
            Value::Sequence(values.iter().copied().map(Value::Int32).collect()),
            Type::array(Type::Int32),
        )
    }

    pub fn int(value: i32) -> Expr {
        Expr::constant(value, Type::Int32)
    }

    pub fn string(value: &str) -> Expr {
        Expr::constant(value, Type::String)
    }
}

/// Member `name` declared on the class `ty`
///
/// Panics if `ty` is not a class declaring `name`.
pub fn property(ty: &Type, name: &str) -> MemberInfo {
    match ty.as_class().and_then(|class| class.member(name)) {
        Some(member) => member.clone(),
        None => panic!("Type '{}' declares no member '{}'", ty, name),
    }
}

/// `target.name`, looking the member up on the target's class type
pub fn member(target: Expr, name: &str) -> Expr {
    let member = property(&target.ty(), name);
    match Expr::member_access(target, member) {
        Ok(access) => access,
        Err(err) => panic!("Failed to build member access '{}': {}", name, err),
    }
}

/// Anonymous type with one property per `(name, type)` pair
pub fn anonymous_type(members: &[(&str, Type)]) -> Type {
    let class = members
        .iter()
        .fold(ClassType::new(ANONYMOUS_TYPE_NAME), |class, (name, ty)| {
            class.with_property(*name, ty.clone())
        });
    Type::class(class)
}

/// `new AnonymousType(a = x, b = y)`: constructor arguments mapped to getters
pub fn anonymous_new(members: &[(&str, Expr)]) -> Expr {
    let typed: Vec<(&str, Type)> = members.iter().map(|(name, e)| (*name, e.ty())).collect();
    let ty = anonymous_type(&typed);
    let ctor = ConstructorInfo::new(ty, typed.iter().map(|(_, t)| t.clone()).collect());
    let getters = typed
        .iter()
        .map(|(name, t)| MemberInfo::getter(ANONYMOUS_TYPE_NAME, *name, t.clone()))
        .collect();
    let arguments = members.iter().map(|(_, e)| e.clone()).collect();

    match NewExpr::with_members(ctor, arguments, getters) {
        Ok(new_expr) => Expr::new_object(new_expr),
        Err(err) => panic!("Failed to build anonymous construction: {}", err),
    }
}

/// `new AnonymousType() {a = x, b = y}`
pub fn anonymous_member_init(members: &[(&str, Expr)]) -> Expr {
    let typed: Vec<(&str, Type)> = members.iter().map(|(name, e)| (*name, e.ty())).collect();
    let ty = anonymous_type(&typed);
    let new_expr = match NewExpr::new(ConstructorInfo::default_for(ty), Vec::new()) {
        Ok(new_expr) => new_expr,
        Err(err) => panic!("Failed to build default construction: {}", err),
    };
    let bindings = members
        .iter()
        .map(|(name, e)| {
            let member = MemberInfo::property(ANONYMOUS_TYPE_NAME, *name, e.ty());
            match MemberBinding::bind(member, e.clone()) {
                Ok(binding) => binding,
                Err(err) => panic!("Failed to bind '{}': {}", name, err),
            }
        })
        .collect();
    Expr::member_init(new_expr, bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_sequences() {
        assert_eq!(
            DomainFixtures::cooks().ty().sequence_element_type(),
            Some(DomainFixtures::cook_type())
        );
        assert_eq!(
            DomainFixtures::numbers(&[1, 2]).ty().sequence_element_type(),
            Some(Type::Int32)
        );
    }

    #[test]
    fn test_anonymous_new_display() {
        let expr = anonymous_new(&[
            ("a", DomainFixtures::int(1)),
            ("b", DomainFixtures::int(2)),
        ]);
        assert_eq!(expr.to_string(), "new AnonymousType(a = 1, b = 2)");
    }

    #[test]
    fn test_member_lookup() {
        let c = Expr::parameter("c", DomainFixtures::cook_type());
        assert_eq!(member(c, "Name").to_string(), "c.Name");
    }

    #[test]
    #[should_panic(expected = "declares no member")]
    fn test_member_lookup_fails() {
        let c = Expr::parameter("c", DomainFixtures::cook_type());
        member(c, "Salary");
    }
}
