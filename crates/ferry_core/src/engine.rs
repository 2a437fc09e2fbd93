//! Capability interface to the script runtime
//!
//! The bridge never evaluates or collects script values itself. Everything it
//! needs from the script side goes through [`ScriptEngine`], which is kept
//! object-safe so host functions can receive the engine that invoked them.

use std::fmt;
use std::rc::Rc;

/// Stable identity of a script object.
///
/// Two handles referring to the same script object report the same id for as
/// long as that object is alive. Computing an id must not keep the object alive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Requirements on engine handle types.
pub trait ScriptHandle: Clone + fmt::Debug + 'static {}

impl<T: Clone + fmt::Debug + 'static> ScriptHandle for T {}

/// A value as it crosses the trait boundary.
///
/// Primitives are copied out of the script runtime; objects (including arrays
/// and functions) stay behind an engine handle.
#[derive(Debug, Clone)]
pub enum ScriptValue<H> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(H),
}

impl<H> ScriptValue<H> {
    pub fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    pub fn as_object(&self) -> Option<&H> {
        match self {
            ScriptValue::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// Name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptValue::Undefined => "undefined",
            ScriptValue::Null => "null",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Object(_) => "object",
        }
    }
}

/// Failure reported by the script runtime.
#[derive(Debug, Clone)]
pub enum EngineError<H> {
    /// Script code threw; carries the thrown value.
    Thrown(ScriptValue<H>),
    /// The engine itself failed (out of memory, unrelated runtime, ...).
    Internal(String),
}

pub type EngineResult<T, H> = Result<T, EngineError<H>>;

/// Host function callable from script.
///
/// Receives the engine performing the call, the receiver (`this`) and the
/// arguments. Returning [`EngineError::Thrown`] rethrows that exact value on the
/// script side; [`EngineError::Internal`] becomes a script `Error`.
pub type NativeFn<H> = Rc<
    dyn Fn(
        &dyn ScriptEngine<Handle = H>,
        ScriptValue<H>,
        Vec<ScriptValue<H>>,
    ) -> EngineResult<ScriptValue<H>, H>,
>;

/// Narrow view of an embedded script runtime.
pub trait ScriptEngine {
    /// Strong reference to a script object. Cloning shares the same object.
    type Handle: ScriptHandle;

    /// The root (global) object.
    fn global(&self) -> EngineResult<Self::Handle, Self::Handle>;

    /// Evaluate source text and return its completion value.
    fn evaluate(&self, source: &str) -> EngineResult<ScriptValue<Self::Handle>, Self::Handle>;

    fn get_member(
        &self,
        target: &Self::Handle,
        name: &str,
    ) -> EngineResult<ScriptValue<Self::Handle>, Self::Handle>;

    fn set_member(
        &self,
        target: &Self::Handle,
        name: &str,
        value: ScriptValue<Self::Handle>,
    ) -> EngineResult<(), Self::Handle>;

    fn get_index(
        &self,
        target: &Self::Handle,
        index: usize,
    ) -> EngineResult<ScriptValue<Self::Handle>, Self::Handle>;

    fn set_index(
        &self,
        target: &Self::Handle,
        index: usize,
        value: ScriptValue<Self::Handle>,
    ) -> EngineResult<(), Self::Handle>;

    /// Value of the target's `length` member as an index bound.
    fn length(&self, target: &Self::Handle) -> EngineResult<usize, Self::Handle>;

    /// Invoke a callable with an explicit receiver.
    fn call(
        &self,
        callable: &Self::Handle,
        this: ScriptValue<Self::Handle>,
        args: Vec<ScriptValue<Self::Handle>>,
    ) -> EngineResult<ScriptValue<Self::Handle>, Self::Handle>;

    /// Look up `name` on the target and invoke it with the target as receiver.
    fn call_member(
        &self,
        target: &Self::Handle,
        name: &str,
        args: Vec<ScriptValue<Self::Handle>>,
    ) -> EngineResult<ScriptValue<Self::Handle>, Self::Handle> {
        match self.get_member(target, name)? {
            ScriptValue::Object(callable) if self.is_callable(&callable)? => {
                self.call(&callable, ScriptValue::Object(target.clone()), args)
            }
            other => Err(EngineError::Internal(format!(
                "member '{name}' is not callable (found {})",
                other.kind()
            ))),
        }
    }

    /// `new constructor(...args)`.
    fn construct(
        &self,
        constructor: &Self::Handle,
        args: Vec<ScriptValue<Self::Handle>>,
    ) -> EngineResult<Self::Handle, Self::Handle>;

    fn own_keys(&self, target: &Self::Handle) -> EngineResult<Vec<String>, Self::Handle>;

    fn is_callable(&self, target: &Self::Handle) -> EngineResult<bool, Self::Handle>;

    fn is_array(&self, target: &Self::Handle) -> EngineResult<bool, Self::Handle>;

    /// Next object on the prototype chain, `None` at the end of the chain.
    fn prototype_of(
        &self,
        target: &Self::Handle,
    ) -> EngineResult<Option<Self::Handle>, Self::Handle>;

    fn identity(&self, target: &Self::Handle) -> EngineResult<HandleId, Self::Handle>;

    /// Script-side string conversion (`String(value)`).
    fn display(&self, value: &ScriptValue<Self::Handle>) -> EngineResult<String, Self::Handle>;

    fn new_array(
        &self,
        items: Vec<ScriptValue<Self::Handle>>,
    ) -> EngineResult<Self::Handle, Self::Handle>;

    fn new_function(
        &self,
        name: &str,
        function: NativeFn<Self::Handle>,
    ) -> EngineResult<Self::Handle, Self::Handle>;

    /// Object whose member reads consult `methods` first and then `prototype`,
    /// and whose member writes go to `prototype`. Without a prototype an empty
    /// object stands in.
    fn new_mirror(
        &self,
        methods: Vec<(String, Self::Handle)>,
        prototype: Option<&Self::Handle>,
    ) -> EngineResult<Self::Handle, Self::Handle>;
}
