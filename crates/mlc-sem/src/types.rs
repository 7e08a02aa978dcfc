//! MiniLang's type system: `int`, `float`, `bool`, `string`, arrays, `void`.

use std::fmt;

use mlc_par::ast::TypeName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Array(Box<Type>),
    Void,
}

impl Type {
    pub fn from_ast(ty: &TypeName) -> Self {
        match ty {
            TypeName::Int => Type::Int,
            TypeName::Float => Type::Float,
            TypeName::Bool => Type::Bool,
            TypeName::String => Type::String,
            TypeName::Array(inner) => Type::Array(Box::new(Type::from_ast(inner))),
        }
    }

    /// MiniLang's only implicit conversion: an `int` value may be assigned
    /// or passed where a `float` is expected. Every other combination
    /// requires an exact match.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if self == target {
            return true;
        }
        matches!((self, target), (Type::Int, Type::Float))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// The common numeric type of two operands, widening `int` to `float`
    /// when either side is a `float`.
    pub fn numeric_result(&self, other: &Type) -> Type {
        if *self == Type::Float || *other == Type::Float {
            Type::Float
        } else {
            Type::Int
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Array(inner) => write!(f, "{}[]", inner),
            Type::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_float() {
        assert!(Type::Int.is_assignable_to(&Type::Float));
        assert!(!Type::Float.is_assignable_to(&Type::Int));
    }

    #[test]
    fn bool_is_not_assignable_to_int() {
        assert!(!Type::Bool.is_assignable_to(&Type::Int));
    }

    #[test]
    fn array_types_compare_structurally() {
        let a = Type::Array(Box::new(Type::Int));
        let b = Type::Array(Box::new(Type::Int));
        assert!(a.is_assignable_to(&b));
    }

    #[test]
    fn display_matches_source_spelling() {
        assert_eq!(Type::Array(Box::new(Type::Int)).to_string(), "int[]");
        assert_eq!(Type::Bool.to_string(), "bool");
    }
}
