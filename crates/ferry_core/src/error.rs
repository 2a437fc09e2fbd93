use crate::engine::{EngineError, ScriptValue};
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// A thrown script value, type-erased so errors stay independent of the engine.
#[derive(Clone)]
pub struct ThrownValue(Rc<dyn Any>);

impl ThrownValue {
    pub fn new<H: 'static>(value: ScriptValue<H>) -> Self {
        Self(Rc::new(value))
    }

    /// The thrown value, if it came from an engine with handle type `H`.
    pub fn get<H: 'static>(&self) -> Option<&ScriptValue<H>> {
        self.0.downcast_ref::<ScriptValue<H>>()
    }
}

impl fmt::Debug for ThrownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ThrownValue(..)")
    }
}

/// Script failure with no registered host exception type.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ScriptFailure {
    pub message: String,
    pub thrown: ThrownValue,
}

/// Script failure reclassified through a registered exception descriptor.
#[derive(Clone, Error)]
#[error("{type_name}: {message}")]
pub struct TypedScriptException {
    pub type_name: String,
    pub message: String,
    pub thrown: ThrownValue,
    pub(crate) facade: Rc<dyn Any>,
    pub(crate) facade_type: TypeId,
}

impl TypedScriptException {
    /// The host facade wrapping the thrown value.
    pub fn facade<T: Any>(&self) -> Option<Rc<T>> {
        self.facade.clone().downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.facade_type == TypeId::of::<T>()
    }
}

impl fmt::Debug for TypedScriptException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedScriptException")
            .field("type_name", &self.type_name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Errors raised at the bridge boundary.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("no conversion registered for {type_name}")]
    UnsupportedType { type_name: String },

    #[error(transparent)]
    Script(#[from] ScriptFailure),

    #[error(transparent)]
    Typed(#[from] TypedScriptException),

    #[error("'{name}' is not a constructor in the script namespace")]
    UnknownConstructor { name: String },

    #[error("type '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("bridge was dropped while script still held a host function")]
    BridgeDropped,

    #[error("script engine failure: {0}")]
    Engine(String),
}

impl BridgeError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        let error = BridgeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        };
        tracing::warn!(%error, "conversion rejected");
        error
    }

    /// The original thrown script value, for script-originated errors.
    pub fn thrown(&self) -> Option<&ThrownValue> {
        match self {
            BridgeError::Script(failure) => Some(&failure.thrown),
            BridgeError::Typed(exception) => Some(&exception.thrown),
            _ => None,
        }
    }

    /// Map back into an engine error when a host function fails.
    ///
    /// Script-originated errors rethrow the original value; everything else
    /// surfaces as a new script error carrying this message.
    pub(crate) fn into_engine<H: Clone + 'static>(self) -> EngineError<H> {
        match self.thrown().and_then(|thrown| thrown.get::<H>()) {
            Some(value) => EngineError::Thrown(value.clone()),
            None => EngineError::Internal(self.to_string()),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
