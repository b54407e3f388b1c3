// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents expression trees: the generic AST consumed by query
//! parsing and produced by resolution.
//!
//! ## Design
//!
//! An [`Expr`] is a tagged union over node kinds. Every node carries a static
//! [`Type`], either stored on the node or derived from its parts:
//!
//! - **Constant**: a [`Value`] together with its declared static type
//! - **Parameter**: a named, typed lambda parameter
//! - **MemberAccess**: `target.member` (or a static member when `target` is absent)
//! - **Unary**: conversions, negation, unary plus, `Not`, and `Quote`
//! - **Binary**: arithmetic, comparison and logical operators
//! - **MethodCall**: instance, static and extension method calls
//! - **New**: constructor calls, optionally mapping arguments to members
//! - **MemberInit**: a `New` followed by member bindings
//! - **Lambda**: parameters and body
//! - **Conditional**: `test ? if_true : if_false`
//! - **QuerySourceReference**: back-reference to a query model clause
//! - **SubQuery**: an embedded, already built query model
//!
//! ## Type Consistency
//!
//! Nodes whose parts must agree (constructor arguments, member bindings,
//! binary operands, method arguments) are built through fallible constructors
//! that return [`IrError`] on a mismatch. Trees produced by rewriting keep the
//! types of the nodes they replace.
//!
//! ## Equality
//!
//! `PartialEq` is structural. Two parameters are equal when name and type are
//! equal, and two query-source references are equal when they refer to the same
//! query source, regardless of where each reference was created.
//!
//! ## Examples
//!
//! ```rust,ignore
//! // c => c.Name
//! let c = ParameterExpr::new("c", cook_type);
//! let body = Expr::member_access(c.to_expr(), name_property)?;
//! let selector = LambdaExpr::new(body, vec![c]);
//! ```

use crate::clause::QuerySourceHandle;
use crate::error::{IrError, IrResult};
use crate::query::QueryModel;
use crate::types::{ConstructorInfo, MemberInfo, MethodInfo, Type};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Expr {
    /// Constant value with its declared static type
    Constant { value: Value, ty: Type },

    /// Lambda parameter reference
    Parameter(ParameterExpr),

    /// Member access (`target.member`); `None` target means a static member
    MemberAccess {
        target: Option<Box<Expr>>,
        member: MemberInfo,
    },

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        ty: Type,
    },

    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: Type,
    },

    /// Method call; `None` target means a static method
    MethodCall {
        target: Option<Box<Expr>>,
        method: MethodInfo,
        arguments: Vec<Expr>,
    },

    /// Constructor call
    New(NewExpr),

    /// Constructor call followed by member bindings
    MemberInit {
        new_expr: NewExpr,
        bindings: Vec<MemberBinding>,
    },

    /// Lambda expression
    Lambda(LambdaExpr),

    /// Conditional expression
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
        ty: Type,
    },

    /// Reference to the items of a query model clause
    QuerySourceReference(QuerySourceHandle),

    /// Nested query model
    SubQuery(SubQueryExpr),
}

/// A named, typed lambda parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterExpr {
    pub name: String,
    pub ty: Type,
}

impl ParameterExpr {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Wrap this parameter into a parameter reference expression
    pub fn to_expr(&self) -> Expr {
        Expr::Parameter(self.clone())
    }
}

/// A lambda expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub parameters: Vec<ParameterExpr>,
    pub body: Box<Expr>,
}

impl LambdaExpr {
    pub fn new(body: Expr, parameters: Vec<ParameterExpr>) -> Self {
        Self {
            parameters,
            body: Box::new(body),
        }
    }

    /// Get the parameter at the given position
    pub fn parameter(&self, index: usize) -> Option<&ParameterExpr> {
        self.parameters.get(index)
    }

    /// Delegate type of this lambda
    pub fn ty(&self) -> Type {
        Type::function(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            self.body.ty(),
        )
    }
}

/// Constructor call with optional argument-to-member mapping
///
/// The member mapping is what anonymous types use: argument `i` initializes
/// member `members[i]`, which is how transparent identifiers are tunneled
/// through by accessor finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpr {
    pub constructor: ConstructorInfo,
    pub arguments: Vec<Expr>,
    pub members: Option<Vec<MemberInfo>>,
}

impl NewExpr {
    /// Create a positional constructor call
    pub fn new(constructor: ConstructorInfo, arguments: Vec<Expr>) -> IrResult<Self> {
        check_arguments(
            &format!("new {}", constructor.declaring_type),
            &constructor.parameters,
            &arguments,
        )?;
        Ok(Self {
            constructor,
            arguments,
            members: None,
        })
    }

    /// Create a constructor call whose arguments initialize the given members
    pub fn with_members(
        constructor: ConstructorInfo,
        arguments: Vec<Expr>,
        members: Vec<MemberInfo>,
    ) -> IrResult<Self> {
        let mut new_expr = Self::new(constructor, arguments)?;
        if members.len() != new_expr.arguments.len() {
            return Err(IrError::ArgumentCountMismatch {
                target: format!("members of new {}", new_expr.constructor.declaring_type),
                expected: new_expr.arguments.len(),
                found: members.len(),
            });
        }
        for (member, argument) in members.iter().zip(&new_expr.arguments) {
            check_member_value(member, argument)?;
        }
        new_expr.members = Some(members);
        Ok(new_expr)
    }

    /// Type of the constructed object
    pub fn ty(&self) -> Type {
        self.constructor.declaring_type.clone()
    }

    /// Member initialized by the argument at `index`, if the mapping is known
    pub fn member_for_argument(&self, index: usize) -> Option<&MemberInfo> {
        self.members.as_ref()?.get(index)
    }
}

/// A member binding in a member-init expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberBinding {
    /// `member = expression`
    Assignment { member: MemberInfo, expression: Expr },

    /// `member = { Add(..), Add(..) }`
    List {
        member: MemberInfo,
        initializers: Vec<ElementInit>,
    },

    /// `member = { nested bindings }`
    Member {
        member: MemberInfo,
        bindings: Vec<MemberBinding>,
    },
}

impl MemberBinding {
    /// Create a simple assignment binding
    pub fn bind(member: MemberInfo, expression: Expr) -> IrResult<Self> {
        check_member_value(&member, &expression)?;
        Ok(MemberBinding::Assignment { member, expression })
    }

    pub fn list(member: MemberInfo, initializers: Vec<ElementInit>) -> Self {
        MemberBinding::List {
            member,
            initializers,
        }
    }

    pub fn member(&self) -> &MemberInfo {
        match self {
            MemberBinding::Assignment { member, .. }
            | MemberBinding::List { member, .. }
            | MemberBinding::Member { member, .. } => member,
        }
    }
}

/// Element initializer of a list binding (`Add(args)`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInit {
    pub add_method: MethodInfo,
    pub arguments: Vec<Expr>,
}

impl ElementInit {
    pub fn new(add_method: MethodInfo, arguments: Vec<Expr>) -> IrResult<Self> {
        check_arguments(&add_method.name, &add_method.parameters, &arguments)?;
        Ok(Self {
            add_method,
            arguments,
        })
    }
}

/// A query model embedded as an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQueryExpr {
    pub model: Arc<QueryModel>,
    pub ty: Type,
}

impl SubQueryExpr {
    /// Embed a query model; the expression type follows the model's output
    pub fn new(model: QueryModel) -> IrResult<Self> {
        let ty = model.output_data_info()?.output_type();
        Ok(Self {
            model: Arc::new(model),
            ty,
        })
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UnaryOp {
    Convert,
    ConvertChecked,
    Negate,
    UnaryPlus,
    Not,
    /// Quoted lambda passed to a query operator
    Quote,
}

impl UnaryOp {
    pub fn is_conversion(&self) -> bool {
        matches!(self, UnaryOp::Convert | UnaryOp::ConvertChecked)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    AndAlso,
    OrElse,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::AndAlso => "AndAlso",
            BinaryOp::OrElse => "OrElse",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::AndAlso | BinaryOp::OrElse)
    }
}

impl Expr {
    pub fn constant(value: impl Into<Value>, ty: Type) -> Self {
        Expr::Constant {
            value: value.into(),
            ty,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: Type) -> Self {
        Expr::Parameter(ParameterExpr::new(name, ty))
    }

    /// Create `target.member`
    ///
    /// Getters are normalized to their property. If the target is a class
    /// type, the member must be declared on it.
    pub fn member_access(target: Expr, member: MemberInfo) -> IrResult<Self> {
        let member = member.as_property();
        if let Type::Class(class) = target.ty() {
            if class.member(&member.name).is_none() {
                return Err(IrError::MemberNotFound {
                    member: member.name,
                    type_name: class.to_string(),
                });
            }
        }
        Ok(Expr::MemberAccess {
            target: Some(Box::new(target)),
            member,
        })
    }

    pub fn static_member(member: MemberInfo) -> Self {
        Expr::MemberAccess {
            target: None,
            member: member.as_property(),
        }
    }

    pub fn convert(operand: Expr, ty: Type) -> Self {
        Expr::Unary {
            op: UnaryOp::Convert,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn convert_checked(operand: Expr, ty: Type) -> Self {
        Expr::Unary {
            op: UnaryOp::ConvertChecked,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn unary_plus(operand: Expr) -> Self {
        let ty = operand.ty();
        Expr::Unary {
            op: UnaryOp::UnaryPlus,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn negate(operand: Expr) -> Self {
        let ty = operand.ty();
        Expr::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
            ty: Type::Boolean,
        }
    }

    /// Quote a lambda, as done for lambdas passed to `Queryable` operators
    pub fn quote(lambda: LambdaExpr) -> Self {
        let ty = lambda.ty();
        Expr::Unary {
            op: UnaryOp::Quote,
            operand: Box::new(Expr::Lambda(lambda)),
            ty,
        }
    }

    /// Create a binary operation, checking operand types
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> IrResult<Self> {
        let (left_ty, right_ty) = (left.ty(), right.ty());
        let mismatch = || IrError::OperandTypeMismatch {
            op: op.symbol().to_string(),
            left: left_ty.to_string(),
            right: right_ty.to_string(),
        };

        let ty = if op.is_logical() {
            if left_ty != Type::Boolean || right_ty != Type::Boolean {
                return Err(mismatch());
            }
            Type::Boolean
        } else if op.is_comparison() {
            if left_ty != right_ty {
                return Err(mismatch());
            }
            Type::Boolean
        } else {
            if left_ty != right_ty {
                return Err(mismatch());
            }
            left_ty.clone()
        };

        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        })
    }

    /// Create a method call, checking argument count and types
    pub fn call(target: Option<Expr>, method: MethodInfo, arguments: Vec<Expr>) -> IrResult<Self> {
        check_arguments(&method.name, &method.parameters, &arguments)?;
        Ok(Expr::MethodCall {
            target: target.map(Box::new),
            method,
            arguments,
        })
    }

    pub fn new_object(new_expr: NewExpr) -> Self {
        Expr::New(new_expr)
    }

    pub fn member_init(new_expr: NewExpr, bindings: Vec<MemberBinding>) -> Self {
        Expr::MemberInit { new_expr, bindings }
    }

    pub fn lambda(body: Expr, parameters: Vec<ParameterExpr>) -> Self {
        Expr::Lambda(LambdaExpr::new(body, parameters))
    }

    /// Create a conditional expression, checking branch types
    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> IrResult<Self> {
        if test.ty() != Type::Boolean {
            return Err(IrError::ArgumentTypeMismatch {
                target: "conditional".to_string(),
                position: 0,
                expected: Type::Boolean.to_string(),
                found: test.ty().to_string(),
            });
        }
        if if_true.ty() != if_false.ty() {
            return Err(IrError::OperandTypeMismatch {
                op: "?:".to_string(),
                left: if_true.ty().to_string(),
                right: if_false.ty().to_string(),
            });
        }
        let ty = if_true.ty();
        Ok(Expr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            ty,
        })
    }

    pub fn query_source_reference(handle: QuerySourceHandle) -> Self {
        Expr::QuerySourceReference(handle)
    }

    /// Static type of this expression
    pub fn ty(&self) -> Type {
        match self {
            Expr::Constant { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Conditional { ty, .. } => ty.clone(),
            Expr::Parameter(parameter) => parameter.ty.clone(),
            Expr::MemberAccess { member, .. } => member.member_type.clone(),
            Expr::MethodCall { method, .. } => method.return_type.clone(),
            Expr::New(new_expr) | Expr::MemberInit { new_expr, .. } => new_expr.ty(),
            Expr::Lambda(lambda) => lambda.ty(),
            Expr::QuerySourceReference(handle) => handle.item_type.clone(),
            Expr::SubQuery(sub_query) => sub_query.ty.clone(),
        }
    }

    /// Node kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Constant { .. } => "Constant",
            Expr::Parameter(_) => "Parameter",
            Expr::MemberAccess { .. } => "MemberAccess",
            Expr::Unary { .. } => "Unary",
            Expr::Binary { .. } => "Binary",
            Expr::MethodCall { .. } => "MethodCall",
            Expr::New(_) => "New",
            Expr::MemberInit { .. } => "MemberInit",
            Expr::Lambda(_) => "Lambda",
            Expr::Conditional { .. } => "Conditional",
            Expr::QuerySourceReference(_) => "QuerySourceReference",
            Expr::SubQuery(_) => "SubQuery",
        }
    }

    /// Strip a `Quote` wrapper and return the lambda, if this is one
    pub fn as_lambda(&self) -> Option<&LambdaExpr> {
        match self {
            Expr::Lambda(lambda) => Some(lambda),
            Expr::Unary {
                op: UnaryOp::Quote,
                operand,
                ..
            } => operand.as_lambda(),
            _ => None,
        }
    }

    /// Direct sub-expressions in evaluation order
    ///
    /// Sub-query models are opaque and contribute no children.
    pub fn children(&self) -> Vec<&Expr> {
        let mut children = Vec::new();
        match self {
            Expr::Constant { .. }
            | Expr::Parameter(_)
            | Expr::QuerySourceReference(_)
            | Expr::SubQuery(_) => {}
            Expr::MemberAccess { target, .. } => children.extend(target.as_deref()),
            Expr::Unary { operand, .. } => children.push(&**operand),
            Expr::Binary { left, right, .. } => {
                children.push(&**left);
                children.push(&**right);
            }
            Expr::MethodCall {
                target, arguments, ..
            } => {
                children.extend(target.as_deref());
                children.extend(arguments.iter());
            }
            Expr::New(new_expr) => children.extend(new_expr.arguments.iter()),
            Expr::MemberInit { new_expr, bindings } => {
                children.extend(new_expr.arguments.iter());
                collect_binding_children(bindings, &mut children);
            }
            Expr::Lambda(lambda) => children.push(&*lambda.body),
            Expr::Conditional {
                test,
                if_true,
                if_false,
                ..
            } => {
                children.push(&**test);
                children.push(&**if_true);
                children.push(&**if_false);
            }
        }
        children
    }
}

fn collect_binding_children<'a>(bindings: &'a [MemberBinding], children: &mut Vec<&'a Expr>) {
    for binding in bindings {
        match binding {
            MemberBinding::Assignment { expression, .. } => children.push(expression),
            MemberBinding::List { initializers, .. } => {
                for init in initializers {
                    children.extend(init.arguments.iter());
                }
            }
            MemberBinding::Member { bindings, .. } => collect_binding_children(bindings, children),
        }
    }
}

fn check_arguments(target: &str, parameters: &[Type], arguments: &[Expr]) -> IrResult<()> {
    if parameters.len() != arguments.len() {
        return Err(IrError::ArgumentCountMismatch {
            target: target.to_string(),
            expected: parameters.len(),
            found: arguments.len(),
        });
    }
    for (position, (parameter, argument)) in parameters.iter().zip(arguments).enumerate() {
        let argument_ty = argument.ty();
        if !parameter.is_assignable_from(&argument_ty) {
            return Err(IrError::ArgumentTypeMismatch {
                target: target.to_string(),
                position,
                expected: parameter.to_string(),
                found: argument_ty.to_string(),
            });
        }
    }
    Ok(())
}

fn check_member_value(member: &MemberInfo, value: &Expr) -> IrResult<()> {
    let value_ty = value.ty();
    if member.member_type.is_assignable_from(&value_ty) {
        Ok(())
    } else {
        Err(IrError::MemberTypeMismatch {
            member: member.name.clone(),
            member_type: member.member_type.to_string(),
            found: value_ty.to_string(),
        })
    }
}
