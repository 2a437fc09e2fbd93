//! Ferry Core - cross-runtime object bridge
//!
//! Connects host (Rust) values to objects living in an embedded script
//! runtime while preserving identity in both directions:
//!
//! - **Identity map:** one live facade per script object and host type, one
//!   script handle per host object, neither side pinned by the map
//! - **Type registry:** script constructors captured at registration time;
//!   conversion picks the nearest registered constructor on the prototype chain
//! - **Mirrors:** host implementations exposed to script as objects whose
//!   members dispatch back into host closures
//! - **Exceptions:** thrown script values reclassified into registered host
//!   exception types
//!
//! The engine is reached only through [`ScriptEngine`]; `ferry_script`
//! provides the QuickJS implementation.
//!
//! ```ignore
//! let bridge = Bridge::new(&engine, BridgeSettings::default())?;
//! let scope = bridge.scope(&engine);
//! scope.register::<SimpleObject<_>>()?;
//! let object: Rc<SimpleObject<_>> = scope.construct((5,))?;
//! let same: Rc<SimpleObject<_>> = scope.to_host_as(ScriptValue::Object(object.handle().clone()))?;
//! assert!(Rc::ptr_eq(&object, &same));
//! ```

pub mod bridge;
pub mod convert;
pub mod engine;
pub mod error;
pub mod facade;
pub mod identity;
pub mod mirror;
pub mod registry;
pub mod settings;
pub mod value;

pub use bridge::{Bridge, Scope};
pub use convert::{FromScript, IntoArgs, ToScript};
pub use engine::{
    EngineError, EngineResult, HandleId, NativeFn, ScriptEngine, ScriptHandle, ScriptValue,
};
pub use error::{BridgeError, BridgeResult, ScriptFailure, ThrownValue, TypedScriptException};
pub use facade::{Facade, ScriptArray, ScriptFunction, ScriptObject};
pub use mirror::{Arguments, HostFn, MirrorBuilder};
pub use registry::TypeDescriptor;
pub use settings::{BridgeSettings, IdentitySettings, LoggingSettings, SettingsError};
pub use value::HostValue;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
