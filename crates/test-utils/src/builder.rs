// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fluent builder for query-operator call trees
//!
//! Builds the same trees a query provider receives, without writing the
//! method signatures by hand:
//!
//! ```rust,ignore
//! let query = QueryBuilder::queryable(DomainFixtures::cooks())
//!     .where_("c", |c| Expr::binary(BinaryOp::GreaterThan, member(c, "Age"), int(18)).unwrap())
//!     .select("c", |c| member(c, "Name"))
//!     .count();
//! ```
//!
//! Lambdas are quoted for `Queryable` operators and passed as plain lambdas
//! for `Enumerable` operators.

use unified_query_ir::{Expr, LambdaExpr, MethodInfo, ParameterExpr, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Queryable,
    Enumerable,
}

impl Flavor {
    fn declaring_type(self) -> &'static str {
        match self {
            Flavor::Queryable => "Queryable",
            Flavor::Enumerable => "Enumerable",
        }
    }

    fn sequence(self, item: Type) -> Type {
        match self {
            Flavor::Queryable => Type::queryable(item),
            Flavor::Enumerable => Type::enumerable(item),
        }
    }

    fn wrap(self, lambda: LambdaExpr) -> Expr {
        match self {
            Flavor::Queryable => Expr::quote(lambda),
            Flavor::Enumerable => Expr::Lambda(lambda),
        }
    }
}

/// Builder for a chain of query operator calls
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    expr: Expr,
    item_type: Type,
    flavor: Flavor,
}

impl QueryBuilder {
    /// Start a `Queryable` chain on `source`
    pub fn queryable(source: Expr) -> Self {
        Self::start(source, Flavor::Queryable)
    }

    /// Start an `Enumerable` chain on `source`
    pub fn enumerable(source: Expr) -> Self {
        Self::start(source, Flavor::Enumerable)
    }

    fn start(source: Expr, flavor: Flavor) -> Self {
        let item_type = match source.ty().sequence_element_type() {
            Some(item_type) => item_type,
            None => panic!("Query source '{}' is not a sequence", source),
        };
        Self {
            expr: source,
            item_type,
            flavor,
        }
    }

    /// Item type streamed out of the chain built so far
    pub fn item_type(&self) -> &Type {
        &self.item_type
    }

    pub fn build(self) -> Expr {
        self.expr
    }

    fn lambda(&self, name: &str, body: impl FnOnce(Expr) -> Expr) -> LambdaExpr {
        let parameter = ParameterExpr::new(name, self.item_type.clone());
        let body = body(parameter.to_expr());
        LambdaExpr::new(body, vec![parameter])
    }

    /// Call `name` with the chain as first argument
    fn call(&self, name: &str, generic_arguments: Vec<Type>, extra: Vec<Expr>, return_type: Type) -> Expr {
        let mut parameters = vec![self.flavor.sequence(self.item_type.clone())];
        parameters.extend(extra.iter().map(Expr::ty));
        let method = MethodInfo::extension(
            self.flavor.declaring_type(),
            name,
            generic_arguments,
            parameters,
            return_type,
        );

        let mut arguments = vec![self.expr.clone()];
        arguments.extend(extra);
        match Expr::call(None, method, arguments) {
            Ok(call) => call,
            Err(err) => panic!("Failed to build call to '{}': {}", name, err),
        }
    }

    fn chain(self, name: &str, generic_arguments: Vec<Type>, extra: Vec<Expr>, item_type: Type) -> Self {
        let return_type = self.flavor.sequence(item_type.clone());
        let expr = self.call(name, generic_arguments, extra, return_type);
        Self {
            expr,
            item_type,
            flavor: self.flavor,
        }
    }

    fn finish(self, name: &str, extra: Vec<Expr>, return_type: Type) -> Expr {
        self.call(name, vec![self.item_type.clone()], extra, return_type)
    }

    pub fn where_(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Self {
        let lambda = self.lambda(name, predicate);
        let item = self.item_type.clone();
        let argument = self.flavor.wrap(lambda);
        self.chain("Where", vec![item.clone()], vec![argument], item)
    }

    pub fn select(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Self {
        let lambda = self.lambda(name, selector);
        let result = lambda.body.ty();
        let generic = vec![self.item_type.clone(), result.clone()];
        let argument = self.flavor.wrap(lambda);
        self.chain("Select", generic, vec![argument], result)
    }

    /// `SelectMany(name => collection)`
    pub fn select_many(self, name: &str, collection: impl FnOnce(Expr) -> Expr) -> Self {
        let lambda = self.lambda(name, collection);
        let element = collection_element(&lambda);
        let generic = vec![self.item_type.clone(), element.clone()];
        let argument = self.collection_argument(lambda, &element);
        self.chain("SelectMany", generic, vec![argument], element)
    }

    /// `SelectMany(name => collection, (outer, inner) => result)`
    pub fn select_many_with(
        self,
        name: &str,
        collection: impl FnOnce(Expr) -> Expr,
        (outer, inner): (&str, &str),
        result: impl FnOnce(Expr, Expr) -> Expr,
    ) -> Self {
        let collection = self.lambda(name, collection);
        let element = collection_element(&collection);

        let outer = ParameterExpr::new(outer, self.item_type.clone());
        let inner = ParameterExpr::new(inner, element.clone());
        let body = result(outer.to_expr(), inner.to_expr());
        let result_type = body.ty();
        let result = LambdaExpr::new(body, vec![outer, inner]);

        let generic = vec![self.item_type.clone(), element.clone(), result_type.clone()];
        let collection_argument = self.collection_argument(collection, &element);
        let result_argument = self.flavor.wrap(result);
        self.chain(
            "SelectMany",
            generic,
            vec![collection_argument, result_argument],
            result_type,
        )
    }

    /// Wrap a collection selector, widening its declared result to
    /// `IEnumerable<element>`
    fn collection_argument(&self, lambda: LambdaExpr, element: &Type) -> Expr {
        let declared = Type::function(vec![self.item_type.clone()], Type::enumerable(element.clone()));
        let wrapped = self.flavor.wrap(lambda);
        match wrapped {
            Expr::Unary { op, operand, .. } => Expr::Unary {
                op,
                operand,
                ty: declared,
            },
            other => other,
        }
    }

    pub fn order_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        self.ordering("OrderBy", name, key)
    }

    pub fn order_by_descending(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        self.ordering("OrderByDescending", name, key)
    }

    pub fn then_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        self.ordering("ThenBy", name, key)
    }

    pub fn then_by_descending(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        self.ordering("ThenByDescending", name, key)
    }

    fn ordering(self, method: &str, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        let lambda = self.lambda(name, key);
        let item = self.item_type.clone();
        let generic = vec![item.clone(), lambda.body.ty()];
        let argument = self.flavor.wrap(lambda);
        self.chain(method, generic, vec![argument], item)
    }

    pub fn group_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Self {
        let lambda = self.lambda(name, key);
        let key_type = lambda.body.ty();
        let item = self.item_type.clone();
        let generic = vec![item.clone(), key_type.clone()];
        let argument = self.flavor.wrap(lambda);
        self.chain("GroupBy", generic, vec![argument], Type::grouping(key_type, item))
    }

    pub fn group_by_with_element(
        self,
        name: &str,
        key: impl FnOnce(Expr) -> Expr,
        element: impl FnOnce(Expr) -> Expr,
    ) -> Self {
        let key = self.lambda(name, key);
        let element = self.lambda(name, element);
        let (key_type, element_type) = (key.body.ty(), element.body.ty());
        let generic = vec![self.item_type.clone(), key_type.clone(), element_type.clone()];
        let arguments = vec![self.flavor.wrap(key), self.flavor.wrap(element)];
        self.chain(
            "GroupBy",
            generic,
            arguments,
            Type::grouping(key_type, element_type),
        )
    }

    pub fn distinct(self) -> Self {
        let item = self.item_type.clone();
        self.chain("Distinct", vec![item.clone()], Vec::new(), item)
    }

    pub fn take(self, count: i32) -> Self {
        let item = self.item_type.clone();
        self.chain("Take", vec![item.clone()], vec![Expr::constant(count, Type::Int32)], item)
    }

    pub fn skip(self, count: i32) -> Self {
        let item = self.item_type.clone();
        self.chain("Skip", vec![item.clone()], vec![Expr::constant(count, Type::Int32)], item)
    }

    pub fn count(self) -> Expr {
        self.finish("Count", Vec::new(), Type::Int32)
    }

    pub fn long_count(self) -> Expr {
        self.finish("LongCount", Vec::new(), Type::Int64)
    }

    pub fn any(self) -> Expr {
        self.finish("Any", Vec::new(), Type::Boolean)
    }

    /// `Any(predicate)`, typically nested inside another operator's lambda
    pub fn any_where(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Expr {
        let lambda = self.lambda(name, predicate);
        let argument = self.flavor.wrap(lambda);
        self.finish("Any", vec![argument], Type::Boolean)
    }

    pub fn contains(self, item: Expr) -> Expr {
        self.finish("Contains", vec![item], Type::Boolean)
    }

    pub fn first(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("First", Vec::new(), item)
    }

    pub fn first_or_default(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("FirstOrDefault", Vec::new(), item)
    }

    pub fn single(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("Single", Vec::new(), item)
    }

    pub fn last_or_default(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("LastOrDefault", Vec::new(), item)
    }

    pub fn sum(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("Sum", Vec::new(), item)
    }

    pub fn max(self) -> Expr {
        let item = self.item_type.clone();
        self.finish("Max", Vec::new(), item)
    }

    pub fn average(self) -> Expr {
        self.finish("Average", Vec::new(), Type::Double)
    }
}

fn collection_element(lambda: &LambdaExpr) -> Type {
    let collection = lambda.body.ty();
    match collection.sequence_element_type() {
        Some(element) => element,
        None => panic!("Collection selector '{}' does not produce a sequence", lambda),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{DomainFixtures, member};

    #[test]
    fn test_queryable_chain_display() {
        let query = QueryBuilder::queryable(DomainFixtures::cooks())
            .select("c", |c| member(c, "Name"))
            .count();
        assert_eq!(query.to_string(), "value(Cooks).Select(c => c.Name).Count()");
        assert_eq!(query.ty(), Type::Int32);
    }

    #[test]
    fn test_select_many_item_type() {
        let builder = QueryBuilder::queryable(DomainFixtures::cooks())
            .select_many("c", |c| member(c, "Assistants"));
        assert_eq!(builder.item_type(), &DomainFixtures::assistant_type());
    }

    #[test]
    fn test_enumerable_lambdas_are_not_quoted() {
        let query = QueryBuilder::enumerable(DomainFixtures::numbers(&[1, 2, 3]))
            .take(2)
            .build();
        match query {
            Expr::MethodCall { method, .. } => {
                assert_eq!(method.declaring_type, "Enumerable");
                assert_eq!(method.key().to_string(), "Enumerable.Take/2");
            }
            other => panic!("Expected MethodCall, found {:?}", other),
        }
    }
}
