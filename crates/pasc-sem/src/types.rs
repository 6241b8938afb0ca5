//! The type system: five primitive types plus arrays over them.

use std::fmt;

use pasc_par::{SimpleType, TypeSpec};

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    /// Array with element type and one `(lo, hi)` bound pair per dimension.
    Array {
        elem: Box<Type>,
        dims: Vec<(i64, i64)>,
    },
}

impl Type {
    /// Resolve a parsed type annotation.
    pub fn from_spec(spec: &TypeSpec) -> Type {
        match spec {
            TypeSpec::Simple(simple, _) => Type::from_simple(*simple),
            TypeSpec::Array { elem, ranges, .. } => Type::Array {
                elem: Box::new(Type::from_simple(*elem)),
                dims: ranges.iter().map(|r| (r.lo, r.hi)).collect(),
            },
        }
    }

    fn from_simple(simple: SimpleType) -> Type {
        match simple {
            SimpleType::Integer => Type::Integer,
            SimpleType::Real => Type::Real,
            SimpleType::Boolean => Type::Boolean,
            SimpleType::Char => Type::Char,
            SimpleType::String => Type::String,
        }
    }

    /// `integer` or `real`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    /// Any non-array type.
    pub fn is_simple(&self) -> bool {
        !matches!(self, Type::Array { .. })
    }
}

/// Assignment compatibility: equal types, or the `integer → real` promotion.
///
/// The third compatibility rule - a one-character string literal targeting a
/// `char` - depends on the source *expression*, not its type, and is applied
/// by the analyzer where the literal is visible.
pub fn assignable(dst: &Type, src: &Type) -> bool {
    dst == src || (*dst == Type::Real && *src == Type::Integer)
}

/// The result type of mixed arithmetic: integer iff both sides are.
pub fn arithmetic_result(lhs: &Type, rhs: &Type) -> Type {
    if *lhs == Type::Integer && *rhs == Type::Integer {
        Type::Integer
    } else {
        Type::Real
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "integer"),
            Type::Real => write!(f, "real"),
            Type::Boolean => write!(f, "boolean"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
            Type::Array { elem, dims } => {
                write!(f, "array[")?;
                for (i, (lo, hi)) in dims.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}..{}", lo, hi)?;
                }
                write!(f, "] of {}", elem)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignable_promotion_is_one_way() {
        assert!(assignable(&Type::Real, &Type::Integer));
        assert!(!assignable(&Type::Integer, &Type::Real));
        assert!(assignable(&Type::Integer, &Type::Integer));
        assert!(!assignable(&Type::Char, &Type::String));
        assert!(!assignable(&Type::String, &Type::Char));
    }

    #[test]
    fn test_arithmetic_result() {
        assert_eq!(arithmetic_result(&Type::Integer, &Type::Integer), Type::Integer);
        assert_eq!(arithmetic_result(&Type::Integer, &Type::Real), Type::Real);
        assert_eq!(arithmetic_result(&Type::Real, &Type::Real), Type::Real);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Integer.to_string(), "integer");
        let matrix = Type::Array {
            elem: Box::new(Type::Real),
            dims: vec![(1, 3), (-2, 2)],
        };
        assert_eq!(matrix.to_string(), "array[1..3, -2..2] of real");
    }

    #[test]
    fn test_array_equality_includes_bounds() {
        let a = Type::Array {
            elem: Box::new(Type::Integer),
            dims: vec![(1, 10)],
        };
        let b = Type::Array {
            elem: Box::new(Type::Integer),
            dims: vec![(0, 9)],
        };
        assert_ne!(a, b);
        assert!(!assignable(&a, &b));
    }
}
