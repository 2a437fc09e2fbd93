//! Host facades over script objects
//!
//! A facade is a thin host type holding one script handle. The bridge creates
//! facades through the type registry and the identity map, so user code never
//! calls [`Facade::wrap`] directly.

use crate::bridge::Scope;
use crate::convert::{FromScript, IntoArgs, ToScript};
use crate::engine::{ScriptHandle, ScriptValue};
use crate::error::BridgeResult;
use crate::value::HostValue;
use std::any::Any;

pub trait Facade<H: ScriptHandle>: Any + Sized {
    /// Script constructor (or, for structural facades, interface) name.
    const SCRIPT_NAME: &'static str;

    /// Structural facades have no constructor and wrap any script object.
    const STRUCTURAL: bool = false;

    fn wrap(handle: H) -> Self;

    fn handle(&self) -> &H;

    fn get<T: FromScript<H>>(&self, scope: &Scope<'_, H>, name: &str) -> BridgeResult<T> {
        scope.member(self.handle(), name)
    }

    fn set(&self, scope: &Scope<'_, H>, name: &str, value: impl ToScript<H>) -> BridgeResult<()> {
        scope.set_member(self.handle(), name, value)
    }

    fn invoke<R: FromScript<H>>(
        &self,
        scope: &Scope<'_, H>,
        name: &str,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        scope.invoke(self.handle(), name, args)
    }
}

/// Implement [`Facade`] for a `struct Name<H> { handle: H }`.
///
/// ```ignore
/// pub struct SimpleObject<H> {
///     handle: H,
/// }
/// ferry_core::define_facade!(SimpleObject, "SimpleObject");
///
/// pub struct SimpleInterface<H> {
///     handle: H,
/// }
/// ferry_core::define_facade!(SimpleInterface, "SimpleInterface", structural);
/// ```
#[macro_export]
macro_rules! define_facade {
    (@impl $ty:ident, $name:literal, $structural:expr) => {
        impl<H: $crate::ScriptHandle> $crate::Facade<H> for $ty<H> {
            const SCRIPT_NAME: &'static str = $name;
            const STRUCTURAL: bool = $structural;

            fn wrap(handle: H) -> Self {
                Self { handle }
            }

            fn handle(&self) -> &H {
                &self.handle
            }
        }
    };
    ($ty:ident, $name:literal) => {
        $crate::define_facade!(@impl $ty, $name, false);
    };
    ($ty:ident, $name:literal, structural) => {
        $crate::define_facade!(@impl $ty, $name, true);
    };
}

// ============================================================================
// Generic facades (registered by every bridge)
// ============================================================================

/// Any script object without a more specific registered type.
#[derive(Debug)]
pub struct ScriptObject<H> {
    handle: H,
}

define_facade!(ScriptObject, "Object");

impl<H: ScriptHandle> ScriptObject<H> {
    pub fn keys(&self, scope: &Scope<'_, H>) -> BridgeResult<Vec<String>> {
        scope.keys(&self.handle)
    }

    /// Own members converted without a target type.
    pub fn entries(&self, scope: &Scope<'_, H>) -> BridgeResult<Vec<(String, HostValue)>> {
        self.keys(scope)?
            .into_iter()
            .map(|key| {
                let value = scope.member::<HostValue>(&self.handle, &key)?;
                Ok((key, value))
            })
            .collect()
    }
}

/// Lazy view of a script array; every access reads through to script.
#[derive(Debug)]
pub struct ScriptArray<H> {
    handle: H,
}

define_facade!(ScriptArray, "Array");

impl<H: ScriptHandle> ScriptArray<H> {
    pub fn len(&self, scope: &Scope<'_, H>) -> BridgeResult<usize> {
        scope.length(&self.handle)
    }

    pub fn is_empty(&self, scope: &Scope<'_, H>) -> BridgeResult<bool> {
        Ok(self.len(scope)? == 0)
    }

    pub fn item<T: FromScript<H>>(&self, scope: &Scope<'_, H>, index: usize) -> BridgeResult<T> {
        scope.item(&self.handle, index)
    }

    pub fn set_item(
        &self,
        scope: &Scope<'_, H>,
        index: usize,
        value: impl ToScript<H>,
    ) -> BridgeResult<()> {
        scope.set_item(&self.handle, index, value)
    }

    pub fn push(&self, scope: &Scope<'_, H>, value: impl ToScript<H>) -> BridgeResult<()> {
        let end = self.len(scope)?;
        self.set_item(scope, end, value)
    }

    /// Snapshot of every element converted to `T`.
    pub fn to_vec<T: FromScript<H>>(&self, scope: &Scope<'_, H>) -> BridgeResult<Vec<T>> {
        (0..self.len(scope)?)
            .map(|index| self.item(scope, index))
            .collect()
    }
}

#[derive(Debug)]
pub struct ScriptFunction<H> {
    handle: H,
}

define_facade!(ScriptFunction, "Function");

impl<H: ScriptHandle> ScriptFunction<H> {
    /// Call with an undefined receiver.
    pub fn call<R: FromScript<H>>(
        &self,
        scope: &Scope<'_, H>,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        scope.apply(&self.handle, ScriptValue::Undefined, args)
    }

    pub fn call_with_this<R: FromScript<H>>(
        &self,
        scope: &Scope<'_, H>,
        this: impl ToScript<H>,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        let this = this.to_script(scope)?;
        scope.apply(&self.handle, this, args)
    }
}
