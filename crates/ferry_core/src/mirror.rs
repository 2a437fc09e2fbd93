//! Mirrors: script-visible objects backed by host method bindings
//!
//! A mirror answers member reads from its method table first and falls back to
//! an optional prototype object for everything else. Writes always land on the
//! prototype, so host code cannot shadow script state through a mirror.

use crate::bridge::Scope;
use crate::convert::FromScript;
use crate::engine::{ScriptHandle, ScriptValue};
use crate::error::BridgeResult;
use std::rc::Rc;

/// Host implementation of a script-callable member.
pub type HostFn<H> = Rc<dyn Fn(&Scope<'_, H>, Arguments<H>) -> BridgeResult<ScriptValue<H>>>;

/// Receiver and arguments of a call arriving from script.
#[derive(Debug, Clone)]
pub struct Arguments<H> {
    pub this: ScriptValue<H>,
    pub values: Vec<ScriptValue<H>>,
}

impl<H: ScriptHandle> Arguments<H> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument; missing arguments read as `undefined`.
    pub fn raw(&self, index: usize) -> ScriptValue<H> {
        self.values
            .get(index)
            .cloned()
            .unwrap_or(ScriptValue::Undefined)
    }

    /// Argument converted to `T` through the bridge.
    pub fn get<T: FromScript<H>>(&self, scope: &Scope<'_, H>, index: usize) -> BridgeResult<T> {
        T::from_script(scope, self.raw(index))
    }
}

/// Method table plus fallback prototype for a mirror.
pub struct MirrorBuilder<H: ScriptHandle> {
    pub(crate) methods: Vec<(String, HostFn<H>)>,
    pub(crate) prototype: Option<H>,
}

impl<H: ScriptHandle> MirrorBuilder<H> {
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
            prototype: None,
        }
    }

    /// Object consulted for members the method table does not define.
    ///
    /// Must be fully constructed already; methods may read state its
    /// constructor set up.
    pub fn with_prototype(mut self, prototype: H) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Bind `name` to a host implementation. A later binding of the same name wins.
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&Scope<'_, H>, Arguments<H>) -> BridgeResult<ScriptValue<H>> + 'static,
    ) -> Self {
        let name = name.into();
        self.methods.retain(|(existing, _)| *existing != name);
        self.methods.push((name, Rc::new(method)));
        self
    }
}

impl<H: ScriptHandle> Default for MirrorBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}
