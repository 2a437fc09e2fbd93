//! Script runtime management
//!
//! Owns the QuickJS runtime, one full context and the bridge bound to it.

use crate::engine::QuickEngine;
use crate::handle::QuickHandle;
use ferry_core::{Bridge, BridgeError, BridgeSettings, Scope};
use rquickjs::{Context, Runtime};
use std::mem::ManuallyDrop;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("quickjs: {0}")]
    Js(#[from] rquickjs::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Script execution context
///
/// Facades obtained through [`ScriptRuntime::scope`] should not outlive the
/// runtime. If any handle is still alive when the runtime drops, the QuickJS
/// runtime is leaked instead of freed and an error is logged.
pub struct ScriptRuntime {
    bridge: Rc<Bridge<QuickHandle>>,
    live: Rc<()>,
    context: ManuallyDrop<Context>,
    runtime: ManuallyDrop<Runtime>,
}

impl ScriptRuntime {
    pub fn new() -> Result<Self, ScriptError> {
        Self::with_settings(BridgeSettings::default())
    }

    pub fn with_settings(settings: BridgeSettings) -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        let live = Rc::new(());
        let bridge = context.with(|ctx| -> Result<_, ScriptError> {
            QuickEngine::install(&ctx)?;
            let engine = QuickEngine::new(ctx, Rc::downgrade(&live))?;
            Ok(Bridge::new(&engine, settings)?)
        })?;

        Ok(Self {
            bridge,
            live,
            context: ManuallyDrop::new(context),
            runtime: ManuallyDrop::new(runtime),
        })
    }

    pub fn bridge(&self) -> &Rc<Bridge<QuickHandle>> {
        &self.bridge
    }

    /// Run `f` with a bridge scope over this runtime's context.
    pub fn scope<R>(&self, f: impl FnOnce(&Scope<'_, QuickHandle>) -> R) -> Result<R, ScriptError> {
        self.context.with(|ctx| -> Result<R, ScriptError> {
            let engine = QuickEngine::new(ctx, Rc::downgrade(&self.live))?;
            let scope = self.bridge.scope(&engine);
            Ok(f(&scope))
        })
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.scope(|scope| scope.evaluate::<()>(source))??;
        Ok(())
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "executing script");
        self.execute(&source)
    }

    /// Sweep the bridge, then run a full script garbage collection.
    ///
    /// Sweeping first releases the handles of dropped host objects, so the
    /// same collection can free the script objects behind them.
    pub fn collect_garbage(&self) -> usize {
        let swept = self.bridge.sweep();
        self.runtime.run_gc();
        swept
    }

    /// Script handles saved from this runtime that are still alive, the
    /// bridge's own included. Call outside of [`ScriptRuntime::scope`].
    pub fn live_handles(&self) -> usize {
        Rc::strong_count(&self.live) - 1
    }

    /// Objects currently allocated by QuickJS. Call outside of
    /// [`ScriptRuntime::scope`]; the runtime lock is not reentrant.
    pub fn object_count(&self) -> usize {
        usize::try_from(self.runtime.memory_usage().obj_count).unwrap_or_default()
    }
}

impl Drop for ScriptRuntime {
    fn drop(&mut self) {
        self.bridge.clear();
        let outstanding = self.live_handles();
        if outstanding > 0 {
            tracing::error!(
                outstanding,
                "script handles outlived their runtime; leaking the QuickJS runtime"
            );
            return;
        }
        // SAFETY: both fields are dropped exactly once, here, and never used
        // again. The context goes before the runtime that owns it.
        unsafe {
            ManuallyDrop::drop(&mut self.context);
            ManuallyDrop::drop(&mut self.runtime);
        }
    }
}
