//! Type representations in the AST

use std::rc::Rc;

/// Width of a machine word, an `int` and a pointer, in bytes
pub const WORD_SIZE: i64 = 4;

/// Semantic type of an expression or object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Pointer(Rc<Type>),
    Function {
        return_type: Rc<Type>,
        params: Vec<Type>,
    },
}

impl Type {
    pub fn int() -> Self {
        Type::Int
    }

    pub fn pointer_to(base: Type) -> Self {
        Type::Pointer(Rc::new(base))
    }

    pub fn function(return_type: Type, params: Vec<Type>) -> Self {
        Type::Function {
            return_type: Rc::new(return_type),
            params,
        }
    }

    /// Size of a value of this type in bytes
    pub fn size(&self) -> i64 {
        match self {
            Type::Int | Type::Pointer(_) | Type::Function { .. } => WORD_SIZE,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    /// Pointee type for pointers
    pub fn base(&self) -> Option<&Type> {
        match self {
            Type::Pointer(base) => Some(base),
            _ => None,
        }
    }

    /// Number of parameters of a function type
    pub fn arity(&self) -> Option<usize> {
        match self {
            Type::Function { params, .. } => Some(params.len()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Pointer(base) => write!(f, "{}*", base),
            Type::Function { return_type, params } => {
                write!(f, "{}(", return_type)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
        }
    }
}
