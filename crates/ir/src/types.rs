// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Types
//!
//! Every expression node carries a static [`Type`]. The type model is small on
//! purpose: it only needs to express what query parsing asks of it.
//!
//! - **Primitives**: `Int32`, `Int64`, `Double`, `Boolean`, `Char`, `String`,
//!   `Object`, `Void`
//! - **Sequences**: `IEnumerable<T>`, `IQueryable<T>`, `List<T>` and `T[]`
//! - **Groupings**: `IGrouping<K, E>`, itself a sequence of `E`
//! - **Classes**: named types with members and implemented interfaces,
//!   including the anonymous types used for transparent identifiers
//! - **Functions**: the type of a lambda expression
//!
//! ## Element Type Matching
//!
//! [`Type::sequence_element_type`] answers "does this type implement
//! `IEnumerable<T>`, and if so what is `T`?". Classes match through their
//! implemented interfaces, and `String` matches as `IEnumerable<Char>`.
//!
//! ## Members
//!
//! [`MemberInfo`] names a property, field or property getter on a declaring
//! type. Constructor-to-member mappings on `New` expressions usually use the
//! getter form; member accesses always use the property form (see
//! [`MemberInfo::as_property`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Static type of an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Type {
    Void,
    Object,
    Boolean,
    Char,
    Int32,
    Int64,
    Double,
    String,

    /// Generic sequence type (e.g., `IQueryable<Cook>`)
    Sequence {
        kind: SequenceKind,
        element: Box<Type>,
    },

    /// Result element of a grouping operator
    Grouping { key: Box<Type>, element: Box<Type> },

    /// Named class type (user types and anonymous types)
    Class(Arc<ClassType>),

    /// Delegate type of a lambda expression
    Function {
        parameters: Vec<Type>,
        result: Box<Type>,
    },
}

/// Shape of a generic sequence type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    Enumerable,
    Queryable,
    List,
    Array,
}

impl Type {
    pub fn enumerable(element: Type) -> Self {
        Type::Sequence {
            kind: SequenceKind::Enumerable,
            element: Box::new(element),
        }
    }

    pub fn queryable(element: Type) -> Self {
        Type::Sequence {
            kind: SequenceKind::Queryable,
            element: Box::new(element),
        }
    }

    pub fn list(element: Type) -> Self {
        Type::Sequence {
            kind: SequenceKind::List,
            element: Box::new(element),
        }
    }

    pub fn array(element: Type) -> Self {
        Type::Sequence {
            kind: SequenceKind::Array,
            element: Box::new(element),
        }
    }

    pub fn grouping(key: Type, element: Type) -> Self {
        Type::Grouping {
            key: Box::new(key),
            element: Box::new(element),
        }
    }

    pub fn class(class: ClassType) -> Self {
        Type::Class(Arc::new(class))
    }

    pub fn function(parameters: Vec<Type>, result: Type) -> Self {
        Type::Function {
            parameters,
            result: Box::new(result),
        }
    }

    /// Get the `T` of the `IEnumerable<T>` implemented by this type
    ///
    /// Returns `None` if the type is not a sequence of any kind.
    pub fn sequence_element_type(&self) -> Option<Type> {
        match self {
            Type::Sequence { element, .. } | Type::Grouping { element, .. } => {
                Some((**element).clone())
            }
            Type::String => Some(Type::Char),
            Type::Class(class) => class
                .interfaces
                .iter()
                .find_map(|interface| interface.sequence_element_type()),
            _ => None,
        }
    }

    /// Check whether a value of type `other` can be used where `self` is expected
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        if self == other || *self == Type::Object {
            return true;
        }

        if let Type::Class(class) = other {
            if class
                .interfaces
                .iter()
                .any(|interface| self.is_assignable_from(interface))
            {
                return true;
            }
        }

        match self {
            Type::Sequence {
                kind: SequenceKind::Enumerable,
                element,
            } => other
                .sequence_element_type()
                .is_some_and(|other_element| **element == other_element),
            Type::Function { parameters, result } => match other {
                Type::Function {
                    parameters: other_parameters,
                    result: other_result,
                } => parameters == other_parameters && result.is_assignable_from(other_result),
                _ => false,
            },
            _ => false,
        }
    }

    /// Get the class definition if this is a class type
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Short type name used in diagnostics
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "Void"),
            Type::Object => write!(f, "Object"),
            Type::Boolean => write!(f, "Boolean"),
            Type::Char => write!(f, "Char"),
            Type::Int32 => write!(f, "Int32"),
            Type::Int64 => write!(f, "Int64"),
            Type::Double => write!(f, "Double"),
            Type::String => write!(f, "String"),
            Type::Sequence { kind, element } => match kind {
                SequenceKind::Enumerable => write!(f, "IEnumerable<{}>", element),
                SequenceKind::Queryable => write!(f, "IQueryable<{}>", element),
                SequenceKind::List => write!(f, "List<{}>", element),
                SequenceKind::Array => write!(f, "{}[]", element),
            },
            Type::Grouping { key, element } => write!(f, "IGrouping<{}, {}>", key, element),
            Type::Class(class) => write!(f, "{}", class),
            Type::Function { parameters, result } => {
                write!(f, "Func<")?;
                for parameter in parameters {
                    write!(f, "{}, ", parameter)?;
                }
                write!(f, "{}>", result)
            }
        }
    }
}

/// Definition of a named class type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    /// Type name without generic arguments
    pub name: String,
    /// Generic arguments (used for display and identity only)
    pub type_arguments: Vec<Type>,
    /// Declared properties and fields
    pub members: Vec<MemberInfo>,
    /// Implemented interfaces (e.g., `IQueryable<Cook>`)
    pub interfaces: Vec<Type>,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_arguments: Vec::new(),
            members: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_type_arguments(mut self, type_arguments: impl IntoIterator<Item = Type>) -> Self {
        self.type_arguments = type_arguments.into_iter().collect();
        self
    }

    /// Declare a property on this class
    pub fn with_property(mut self, name: impl Into<String>, member_type: Type) -> Self {
        let member = MemberInfo::property(self.name.clone(), name, member_type);
        self.members.push(member);
        self
    }

    /// Declare a field on this class
    pub fn with_field(mut self, name: impl Into<String>, member_type: Type) -> Self {
        let member = MemberInfo::field(self.name.clone(), name, member_type);
        self.members.push(member);
        self
    }

    pub fn implementing(mut self, interface: Type) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Lookup a declared member by name
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.type_arguments.is_empty() {
            let args = self
                .type_arguments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "<{}>", args)?;
        }
        Ok(())
    }
}

/// Kind of a type member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Property,
    Field,
    /// The getter method of a property (`get_a`)
    Getter,
}

/// A property, field or property getter declared on a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Name of the declaring type
    pub declaring_type: String,
    /// Member name (the property name for getters)
    pub name: String,
    /// Type of the value read through this member
    pub member_type: Type,
    pub kind: MemberKind,
}

impl MemberInfo {
    pub fn property(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        member_type: Type,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            member_type,
            kind: MemberKind::Property,
        }
    }

    pub fn field(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        member_type: Type,
    ) -> Self {
        Self {
            kind: MemberKind::Field,
            ..Self::property(declaring_type, name, member_type)
        }
    }

    pub fn getter(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        member_type: Type,
    ) -> Self {
        Self {
            kind: MemberKind::Getter,
            ..Self::property(declaring_type, name, member_type)
        }
    }

    /// Normalize a getter to the property it belongs to
    pub fn as_property(&self) -> MemberInfo {
        match self.kind {
            MemberKind::Getter => MemberInfo {
                kind: MemberKind::Property,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// Check whether two members denote the same value slot
    pub fn refers_to_same(&self, other: &MemberInfo) -> bool {
        self.as_property() == other.as_property()
    }
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Getter => write!(f, "get_{}", self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// A constructor of a class type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorInfo {
    pub declaring_type: Type,
    pub parameters: Vec<Type>,
}

impl ConstructorInfo {
    pub fn new(declaring_type: Type, parameters: Vec<Type>) -> Self {
        Self {
            declaring_type,
            parameters,
        }
    }

    /// Parameterless constructor
    pub fn default_for(declaring_type: Type) -> Self {
        Self::new(declaring_type, Vec::new())
    }
}

/// A (possibly generic, possibly extension) method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Name of the declaring type (e.g., `Queryable`)
    pub declaring_type: String,
    pub name: String,
    /// Closed generic arguments of the method
    pub generic_arguments: Vec<Type>,
    pub parameters: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    /// Static method called with its first argument as receiver
    pub is_extension: bool,
}

impl MethodInfo {
    pub fn instance(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Type>,
        return_type: Type,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            generic_arguments: Vec::new(),
            parameters,
            return_type,
            is_static: false,
            is_extension: false,
        }
    }

    pub fn extension(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        generic_arguments: Vec<Type>,
        parameters: Vec<Type>,
        return_type: Type,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            generic_arguments,
            parameters,
            return_type,
            is_static: true,
            is_extension: true,
        }
    }

    /// Lookup key identifying the method independent of generic arguments
    pub fn key(&self) -> MethodKey {
        MethodKey::new(
            self.declaring_type.clone(),
            self.name.clone(),
            self.parameters.len(),
        )
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} {}({})", self.return_type, self.name, params)
    }
}

/// Identity of a method irrespective of its closed generic arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodKey {
    pub declaring_type: String,
    pub name: String,
    pub parameter_count: usize,
}

impl MethodKey {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_count: usize,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_count,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}/{}",
            self.declaring_type, self.name, self.parameter_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cook() -> Type {
        Type::class(ClassType::new("Cook").with_property("Name", Type::String))
    }

    #[test]
    fn test_sequence_element_type() {
        assert_eq!(
            Type::queryable(Type::Int32).sequence_element_type(),
            Some(Type::Int32)
        );
        assert_eq!(
            Type::array(cook()).sequence_element_type(),
            Some(cook())
        );
        assert_eq!(Type::String.sequence_element_type(), Some(Type::Char));
        assert_eq!(Type::Int32.sequence_element_type(), None);
    }

    #[test]
    fn test_sequence_element_type_through_interface() {
        let table = Type::class(ClassType::new("CookTable").implementing(Type::queryable(cook())));
        assert_eq!(table.sequence_element_type(), Some(cook()));

        let plain = Type::class(ClassType::new("Kitchen"));
        assert_eq!(plain.sequence_element_type(), None);
    }

    #[test]
    fn test_assignability() {
        let table = Type::class(ClassType::new("CookTable").implementing(Type::queryable(cook())));

        assert!(Type::queryable(cook()).is_assignable_from(&table));
        assert!(Type::enumerable(cook()).is_assignable_from(&table));
        assert!(Type::enumerable(cook()).is_assignable_from(&Type::list(cook())));
        assert!(Type::Object.is_assignable_from(&Type::Int32));
        assert!(!Type::Int64.is_assignable_from(&Type::Int32));
        assert!(!Type::queryable(cook()).is_assignable_from(&Type::list(cook())));
    }

    #[test]
    fn test_getter_normalizes_to_property() {
        let getter = MemberInfo::getter("AnonymousType", "a", Type::Int32);
        let property = MemberInfo::property("AnonymousType", "a", Type::Int32);

        assert_ne!(getter, property);
        assert_eq!(getter.as_property(), property);
        assert!(getter.refers_to_same(&property));
        assert_eq!(getter.to_string(), "get_a");
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::queryable(cook()).to_string(), "IQueryable<Cook>");
        assert_eq!(Type::array(Type::Int32).to_string(), "Int32[]");
        assert_eq!(
            Type::grouping(Type::String, cook()).to_string(),
            "IGrouping<String, Cook>"
        );
        assert_eq!(
            Type::function(vec![cook()], Type::Boolean).to_string(),
            "Func<Cook, Boolean>"
        );

        let generic =
            ClassType::new("AnonymousType").with_type_arguments([Type::Int32, Type::String]);
        assert_eq!(generic.to_string(), "AnonymousType<Int32, String>");
    }

    #[test]
    fn test_method_key_ignores_generic_arguments() {
        let a = MethodInfo::extension(
            "Queryable",
            "Where",
            vec![Type::Int32],
            vec![Type::queryable(Type::Int32), Type::Object],
            Type::queryable(Type::Int32),
        );
        let b = MethodInfo::extension(
            "Queryable",
            "Where",
            vec![Type::String],
            vec![Type::queryable(Type::String), Type::Object],
            Type::queryable(Type::String),
        );
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "Queryable.Where/2");
    }
}
