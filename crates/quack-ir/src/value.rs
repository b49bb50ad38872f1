//! Operands of IR instructions.

use std::fmt;

use crate::builtins;
use crate::TempId;

/// Where a lowered expression's boxed value lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    Temp(TempId),
    /// A formal parameter or local variable
    Local(String),
    /// The implicit receiver
    This,
    True,
    False,
    Nothing,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Temp(id) => write!(f, "{}", id),
            Handle::Local(name) => write!(f, "{}", name),
            Handle::This => write!(f, "this"),
            Handle::True => write!(f, "{}", builtins::LIT_TRUE),
            Handle::False => write!(f, "{}", builtins::LIT_FALSE),
            Handle::Nothing => write!(f, "{}", builtins::NOTHING_VALUE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RValue {
    Use(Handle),
    /// Reinterpret `value` as an object of class `ty`
    Cast { value: Handle, ty: String },
    /// Box a C `int` through the runtime
    IntLiteral(i32),
    /// Box a C string through the runtime
    StrLiteral(String),
    Field { object: Handle, field: String },
}

impl RValue {
    pub fn cast(value: Handle, ty: &str) -> RValue {
        RValue::Cast {
            value,
            ty: ty.to_string(),
        }
    }

    /// `value` as-is when its class is already `to`, otherwise cast.
    pub fn coerce(value: Handle, from: &str, to: &str) -> RValue {
        if from == to {
            RValue::Use(value)
        } else {
            RValue::cast(value, to)
        }
    }
}

/// Destination of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    Local(String),
    Temp(TempId),
    Field { object: Handle, field: String },
}
