//! Host-side representation of converted script values

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Result of converting a script value without a caller-specified type.
///
/// Primitives are copied; objects become the facade chosen by the type
/// registry (or the generic object/array/function wrapper).
#[derive(Clone)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(Rc<dyn Any>),
}

impl HostValue {
    pub fn is_nullish(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// The facade, if this is an object converted as `T`.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        match self {
            HostValue::Object(object) => object.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        matches!(self, HostValue::Object(object) if object.is::<T>())
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("Undefined"),
            HostValue::Null => f.write_str("Null"),
            HostValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            HostValue::Number(value) => f.debug_tuple("Number").field(value).finish(),
            HostValue::String(value) => f.debug_tuple("String").field(value).finish(),
            HostValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Primitives compare by value; objects compare by facade identity.
impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) | (HostValue::Null, HostValue::Null) => {
                true
            }
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
