//! Ferry Scripting Backend
//!
//! QuickJS implementation of [`ferry_core::ScriptEngine`] plus a runtime that
//! owns the context and the bridge.
//!
//! ```ignore
//! let runtime = ScriptRuntime::new()?;
//! runtime.execute("var answer = 6 * 7;")?;
//! let answer: i32 = runtime.scope(|scope| scope.get("answer"))??;
//! ```

pub mod engine;
pub mod handle;
pub mod runtime;

pub use engine::QuickEngine;
pub use handle::QuickHandle;
pub use runtime::{ScriptError, ScriptRuntime};

pub use ferry_core;
pub use rquickjs;
