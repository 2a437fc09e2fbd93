//! Ferry Runtime
//!
//! Evaluates a script through the bridge and logs what each global binding
//! converts to on the host side.
//!
//! Usage: `ferry <script.js> [settings.json]`

use anyhow::{anyhow, bail, Result};
use ferry_core::bridge::{EXCEPTIONS_RAW, EXCEPTIONS_TYPED, IDENTITY_HIT, IDENTITY_MISS};
use ferry_core::{
    BridgeResult, BridgeSettings, HostValue, Scope, ScriptArray, ScriptFunction, ScriptObject,
};
use ferry_script::{QuickHandle, ScriptRuntime};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(script) = args.next().map(PathBuf::from) else {
        bail!("usage: ferry <script.js> [settings.json]");
    };
    let settings = match args.next() {
        Some(path) => BridgeSettings::load(Path::new(&path))?,
        None => BridgeSettings::default(),
    };

    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Ferry v{}", ferry_core::VERSION);
    let runtime = ScriptRuntime::with_settings(settings).map_err(report)?;
    runtime.execute_file(&script).map_err(report)?;

    let bindings = runtime
        .scope(|scope| -> BridgeResult<Vec<(String, String)>> {
            let global = scope.global_object()?;
            global
                .entries(scope)?
                .into_iter()
                .map(|(name, value)| Ok((name, describe(scope, &value)?)))
                .collect()
        })
        .map_err(report)?
        .map_err(report)?;

    for (name, value) in &bindings {
        tracing::info!(%name, %value, "global binding");
    }

    let bridge = runtime.bridge();
    tracing::info!(
        bindings = bindings.len(),
        registered_types = bridge.registered_types(),
        hits = bridge.counter(IDENTITY_HIT),
        misses = bridge.counter(IDENTITY_MISS),
        typed_exceptions = bridge.counter(EXCEPTIONS_TYPED),
        raw_exceptions = bridge.counter(EXCEPTIONS_RAW),
        "script finished"
    );
    for (name, total) in bridge.counters() {
        tracing::debug!(counter = name, total, "bridge counter");
    }
    let swept = runtime.collect_garbage();
    tracing::debug!(
        swept,
        objects = runtime.object_count(),
        live_handles = runtime.live_handles(),
        "final sweep"
    );

    Ok(())
}

/// Bridge errors hold script values and are not `Send`; keep only the message.
fn report(error: impl Display) -> anyhow::Error {
    anyhow!("{error}")
}

fn describe(scope: &Scope<'_, QuickHandle>, value: &HostValue) -> BridgeResult<String> {
    Ok(match value {
        HostValue::Undefined => "undefined".to_string(),
        HostValue::Null => "null".to_string(),
        HostValue::Bool(value) => value.to_string(),
        HostValue::Number(value) => value.to_string(),
        HostValue::String(value) => format!("{value:?}"),
        HostValue::Object(_) => {
            if let Some(array) = value.downcast::<ScriptArray<QuickHandle>>() {
                format!("array[{}]", array.len(scope)?)
            } else if value.is::<ScriptFunction<QuickHandle>>() {
                "function".to_string()
            } else if let Some(object) = value.downcast::<ScriptObject<QuickHandle>>() {
                format!("object {{ {} }}", object.keys(scope)?.join(", "))
            } else {
                "object".to_string()
            }
        }
    })
}
