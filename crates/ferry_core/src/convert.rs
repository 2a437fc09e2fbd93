//! Typed conversions at the boundary
//!
//! [`FromScript`] and [`ToScript`] mirror each other: primitives are copied,
//! objects go through the identity map so each crossing of the same script
//! object yields the same facade and vice versa.

use crate::bridge::Scope;
use crate::engine::{ScriptHandle, ScriptValue};
use crate::error::{BridgeError, BridgeResult};
use crate::facade::Facade;
use crate::value::HostValue;
use std::rc::Rc;

pub trait FromScript<H: ScriptHandle>: Sized {
    fn from_script(scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self>;
}

pub trait ToScript<H: ScriptHandle> {
    fn to_script(self, scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>>;
}

/// Argument lists for script calls.
pub trait IntoArgs<H: ScriptHandle> {
    fn into_args(self, scope: &Scope<'_, H>) -> BridgeResult<Vec<ScriptValue<H>>>;
}

// ============================================================================
// Script -> host
// ============================================================================

impl<H: ScriptHandle> FromScript<H> for () {
    fn from_script(_scope: &Scope<'_, H>, _value: ScriptValue<H>) -> BridgeResult<Self> {
        Ok(())
    }
}

impl<H: ScriptHandle> FromScript<H> for bool {
    fn from_script(_scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        match value {
            ScriptValue::Bool(value) => Ok(value),
            other => Err(BridgeError::mismatch("boolean", other.kind())),
        }
    }
}

impl<H: ScriptHandle> FromScript<H> for f64 {
    fn from_script(_scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        match value {
            ScriptValue::Number(value) => Ok(value),
            other => Err(BridgeError::mismatch("number", other.kind())),
        }
    }
}

macro_rules! integer_from_script {
    ($($ty:ty),*) => {
        $(
            impl<H: ScriptHandle> FromScript<H> for $ty {
                fn from_script(_scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
                    match value {
                        ScriptValue::Number(number)
                            if number.fract() == 0.0
                                && number >= <$ty>::MIN as f64
                                && number < <$ty>::MAX as f64 + 1.0 =>
                        {
                            Ok(number as $ty)
                        }
                        ScriptValue::Number(number) => Err(BridgeError::mismatch(
                            stringify!($ty),
                            format!("number {number}"),
                        )),
                        other => Err(BridgeError::mismatch(stringify!($ty), other.kind())),
                    }
                }
            }
        )*
    };
}

integer_from_script!(i32, i64, u32);

impl<H: ScriptHandle> FromScript<H> for String {
    fn from_script(_scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        match value {
            ScriptValue::String(value) => Ok(value),
            other => Err(BridgeError::mismatch("string", other.kind())),
        }
    }
}

impl<H: ScriptHandle, T: FromScript<H>> FromScript<H> for Option<T> {
    fn from_script(scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_script(scope, value).map(Some)
        }
    }
}

impl<H: ScriptHandle> FromScript<H> for ScriptValue<H> {
    fn from_script(_scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        Ok(value)
    }
}

impl<H: ScriptHandle> FromScript<H> for HostValue {
    fn from_script(scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        scope.to_host(value)
    }
}

impl<H: ScriptHandle, T: Facade<H>> FromScript<H> for Rc<T> {
    fn from_script(scope: &Scope<'_, H>, value: ScriptValue<H>) -> BridgeResult<Self> {
        scope.to_host_as::<T>(value)
    }
}

// ============================================================================
// Host -> script
// ============================================================================

impl<H: ScriptHandle> ToScript<H> for () {
    fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        Ok(ScriptValue::Undefined)
    }
}

impl<H: ScriptHandle> ToScript<H> for bool {
    fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        Ok(ScriptValue::Bool(self))
    }
}

macro_rules! number_to_script {
    ($($ty:ty),*) => {
        $(
            impl<H: ScriptHandle> ToScript<H> for $ty {
                fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
                    Ok(ScriptValue::Number(self as f64))
                }
            }
        )*
    };
}

number_to_script!(f64, f32, i32, i64, u32);

impl<H: ScriptHandle> ToScript<H> for String {
    fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        Ok(ScriptValue::String(self))
    }
}

impl<H: ScriptHandle> ToScript<H> for &str {
    fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        Ok(ScriptValue::String(self.to_string()))
    }
}

impl<H: ScriptHandle, T: ToScript<H>> ToScript<H> for Option<T> {
    fn to_script(self, scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        match self {
            Some(value) => value.to_script(scope),
            None => Ok(ScriptValue::Null),
        }
    }
}

impl<H: ScriptHandle> ToScript<H> for ScriptValue<H> {
    fn to_script(self, _scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        Ok(self)
    }
}

/// Copied into a fresh script array; host vectors carry no identity.
impl<H: ScriptHandle, T: ToScript<H>> ToScript<H> for Vec<T> {
    fn to_script(self, scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        let items = self
            .into_iter()
            .map(|item| item.to_script(scope))
            .collect::<BridgeResult<Vec<_>>>()?;
        scope.new_array(items).map(ScriptValue::Object)
    }
}

impl<H: ScriptHandle, T: ?Sized + 'static> ToScript<H> for Rc<T> {
    fn to_script(self, scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        scope.object_to_script(&self)
    }
}

impl<H: ScriptHandle, T: ?Sized + 'static> ToScript<H> for &Rc<T> {
    fn to_script(self, scope: &Scope<'_, H>) -> BridgeResult<ScriptValue<H>> {
        scope.object_to_script(self)
    }
}

// ============================================================================
// Argument lists
// ============================================================================

impl<H: ScriptHandle> IntoArgs<H> for () {
    fn into_args(self, _scope: &Scope<'_, H>) -> BridgeResult<Vec<ScriptValue<H>>> {
        Ok(Vec::new())
    }
}

impl<H: ScriptHandle> IntoArgs<H> for Vec<ScriptValue<H>> {
    fn into_args(self, _scope: &Scope<'_, H>) -> BridgeResult<Vec<ScriptValue<H>>> {
        Ok(self)
    }
}

macro_rules! tuple_into_args {
    ($($name:ident),+) => {
        impl<H: ScriptHandle, $($name: ToScript<H>),+> IntoArgs<H> for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self, scope: &Scope<'_, H>) -> BridgeResult<Vec<ScriptValue<H>>> {
                let ($($name,)+) = self;
                Ok(vec![$($name.to_script(scope)?),+])
            }
        }
    };
}

tuple_into_args!(A);
tuple_into_args!(A, B);
tuple_into_args!(A, B, C);
tuple_into_args!(A, B, C, D);
tuple_into_args!(A, B, C, D, E);
tuple_into_args!(A, B, C, D, E, F);
