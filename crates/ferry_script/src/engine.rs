//! QuickJS implementation of the bridge's engine interface
//!
//! Most operations go through a frozen helper object installed once per
//! context, so prototype walks, identity and mirrors behave exactly as the
//! script itself would observe them.

use crate::handle::QuickHandle;
use ferry_core::{EngineError, EngineResult, HandleId, NativeFn, ScriptEngine, ScriptValue};
use rquickjs::function::{IntoArgs as JsArgs, Rest, This};
use rquickjs::{Array, Ctx, Exception, FromJs, Function, Object, Type, Value};
use std::rc::Weak;

type QuickResult<T> = EngineResult<T, QuickHandle>;

/// Global property holding the helper object; not enumerable.
const HELPERS: &str = "__ferry";

const BOOTSTRAP: &str = r#"
Object.defineProperty(globalThis, "__ferry", {
    enumerable: false,
    value: (() => {
        const ids = new WeakMap();
        let next = 1;
        const own = (table, key) => Object.prototype.hasOwnProperty.call(table, key);
        return Object.freeze({
            identity(target) {
                let id = ids.get(target);
                if (id === undefined) {
                    id = next++;
                    ids.set(target, id);
                }
                return id;
            },
            get: (target, key) => target[key],
            set(target, key, value) {
                target[key] = value;
            },
            length: (target) => target.length >>> 0,
            prototype: (target) => Object.getPrototypeOf(target),
            keys: (target) => Object.keys(target),
            isCallable: (target) => typeof target === "function",
            isArray: (target) => Array.isArray(target),
            display: (value) => String(value),
            apply: (callable, receiver, args) => Reflect.apply(callable, receiver, args),
            construct: (constructor, args) => Reflect.construct(constructor, args),
            mirror(methods, prototype) {
                const target = prototype === null ? {} : prototype;
                return new Proxy(target, {
                    get: (t, key, receiver) =>
                        own(methods, key) ? methods[key] : Reflect.get(t, key, receiver),
                    has: (t, key) => own(methods, key) || Reflect.has(t, key),
                    set: (t, key, value) => Reflect.set(t, key, value),
                });
            },
        });
    })(),
});
"#;

/// Engine view of one QuickJS context, valid for the current `Context::with`.
pub struct QuickEngine<'js> {
    ctx: Ctx<'js>,
    helpers: Object<'js>,
    /// Token of the owning runtime; every saved handle holds a strong copy.
    live: Weak<()>,
}

impl<'js> QuickEngine<'js> {
    /// Install the helper object into the context. Idempotent.
    pub fn install(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
        if ctx.globals().contains_key(HELPERS)? {
            return Ok(());
        }
        ctx.eval::<(), _>(BOOTSTRAP)?;
        tracing::debug!("installed script helpers");
        Ok(())
    }

    pub fn new(ctx: Ctx<'js>, live: Weak<()>) -> rquickjs::Result<Self> {
        let helpers = ctx.globals().get(HELPERS)?;
        Ok(Self { ctx, helpers, live })
    }

    /// Take the pending exception for `Error::Exception`; anything else is
    /// an engine malfunction.
    fn fail(&self, error: rquickjs::Error) -> EngineError<QuickHandle> {
        if !matches!(error, rquickjs::Error::Exception) {
            return EngineError::Internal(error.to_string());
        }
        match self.lower(self.ctx.catch()) {
            Ok(thrown) => EngineError::Thrown(thrown),
            Err(error) => error,
        }
    }

    fn helper<A, R>(&self, name: &str, args: A) -> QuickResult<R>
    where
        A: JsArgs<'js>,
        R: FromJs<'js>,
    {
        let function: Function<'js> = self.helpers.get(name).map_err(|e| self.fail(e))?;
        function.call(args).map_err(|e| self.fail(e))
    }

    fn restore(&self, handle: &QuickHandle) -> QuickResult<Value<'js>> {
        handle.restore(&self.ctx).map_err(|e| self.fail(e))
    }

    fn save(&self, value: Value<'js>) -> QuickResult<QuickHandle> {
        let live = self
            .live
            .upgrade()
            .ok_or_else(|| EngineError::Internal("script runtime is shutting down".into()))?;
        Ok(QuickHandle::save(&self.ctx, value, live))
    }

    /// Copy primitives out; keep everything else behind a handle.
    pub fn lower(&self, value: Value<'js>) -> QuickResult<ScriptValue<QuickHandle>> {
        if value.is_undefined() {
            return Ok(ScriptValue::Undefined);
        }
        if value.is_null() {
            return Ok(ScriptValue::Null);
        }
        if let Some(value) = value.as_bool() {
            return Ok(ScriptValue::Bool(value));
        }
        if let Some(value) = value.as_number() {
            return Ok(ScriptValue::Number(value));
        }
        if let Some(value) = value.as_string() {
            return value
                .to_string()
                .map(ScriptValue::String)
                .map_err(|e| EngineError::Internal(e.to_string()));
        }
        match value.type_of() {
            Type::Symbol | Type::BigInt => {
                let text: String = self.helper("display", (value,))?;
                Ok(ScriptValue::String(text))
            }
            _ => Ok(ScriptValue::Object(self.save(value)?)),
        }
    }

    pub fn raise(&self, value: ScriptValue<QuickHandle>) -> QuickResult<Value<'js>> {
        let ctx = self.ctx.clone();
        Ok(match value {
            ScriptValue::Undefined => Value::new_undefined(ctx),
            ScriptValue::Null => Value::new_null(ctx),
            ScriptValue::Bool(value) => Value::new_bool(ctx, value),
            ScriptValue::Number(value) => Value::new_number(ctx, value),
            ScriptValue::String(value) => rquickjs::String::from_str(ctx, &value)
                .map_err(|e| self.fail(e))?
                .into_value(),
            ScriptValue::Object(handle) => self.restore(&handle)?,
        })
    }

    fn array(&self, items: Vec<ScriptValue<QuickHandle>>) -> QuickResult<Array<'js>> {
        let array = Array::new(self.ctx.clone()).map_err(|e| self.fail(e))?;
        for (index, item) in items.into_iter().enumerate() {
            let item = self.raise(item)?;
            array.set(index, item).map_err(|e| self.fail(e))?;
        }
        Ok(array)
    }

    fn expect_object(&self, value: Value<'js>, operation: &str) -> QuickResult<QuickHandle> {
        match self.lower(value)? {
            ScriptValue::Object(handle) => Ok(handle),
            other => Err(EngineError::Internal(format!(
                "{operation} produced {} instead of an object",
                other.kind()
            ))),
        }
    }
}

impl<'js> ScriptEngine for QuickEngine<'js> {
    type Handle = QuickHandle;

    fn global(&self) -> QuickResult<QuickHandle> {
        self.save(self.ctx.globals().into_value())
    }

    fn evaluate(&self, source: &str) -> QuickResult<ScriptValue<QuickHandle>> {
        let value: Value<'js> = self.ctx.eval(source).map_err(|e| self.fail(e))?;
        self.lower(value)
    }

    fn get_member(&self, target: &QuickHandle, name: &str) -> QuickResult<ScriptValue<QuickHandle>> {
        let value: Value<'js> = self.helper("get", (self.restore(target)?, name))?;
        self.lower(value)
    }

    fn set_member(
        &self,
        target: &QuickHandle,
        name: &str,
        value: ScriptValue<QuickHandle>,
    ) -> QuickResult<()> {
        self.helper("set", (self.restore(target)?, name, self.raise(value)?))
    }

    fn get_index(&self, target: &QuickHandle, index: usize) -> QuickResult<ScriptValue<QuickHandle>> {
        let value: Value<'js> = self.helper("get", (self.restore(target)?, index as f64))?;
        self.lower(value)
    }

    fn set_index(
        &self,
        target: &QuickHandle,
        index: usize,
        value: ScriptValue<QuickHandle>,
    ) -> QuickResult<()> {
        self.helper("set", (self.restore(target)?, index as f64, self.raise(value)?))
    }

    fn length(&self, target: &QuickHandle) -> QuickResult<usize> {
        let length: f64 = self.helper("length", (self.restore(target)?,))?;
        Ok(length as usize)
    }

    fn call(
        &self,
        callable: &QuickHandle,
        this: ScriptValue<QuickHandle>,
        args: Vec<ScriptValue<QuickHandle>>,
    ) -> QuickResult<ScriptValue<QuickHandle>> {
        let value: Value<'js> = self.helper(
            "apply",
            (self.restore(callable)?, self.raise(this)?, self.array(args)?),
        )?;
        self.lower(value)
    }

    fn construct(
        &self,
        constructor: &QuickHandle,
        args: Vec<ScriptValue<QuickHandle>>,
    ) -> QuickResult<QuickHandle> {
        let value: Value<'js> =
            self.helper("construct", (self.restore(constructor)?, self.array(args)?))?;
        self.expect_object(value, "construct")
    }

    fn own_keys(&self, target: &QuickHandle) -> QuickResult<Vec<String>> {
        self.helper("keys", (self.restore(target)?,))
    }

    fn is_callable(&self, target: &QuickHandle) -> QuickResult<bool> {
        self.helper("isCallable", (self.restore(target)?,))
    }

    fn is_array(&self, target: &QuickHandle) -> QuickResult<bool> {
        self.helper("isArray", (self.restore(target)?,))
    }

    fn prototype_of(&self, target: &QuickHandle) -> QuickResult<Option<QuickHandle>> {
        let prototype: Value<'js> = self.helper("prototype", (self.restore(target)?,))?;
        if prototype.is_null() {
            return Ok(None);
        }
        self.expect_object(prototype, "prototype lookup").map(Some)
    }

    fn identity(&self, target: &QuickHandle) -> QuickResult<HandleId> {
        let id: f64 = self.helper("identity", (self.restore(target)?,))?;
        Ok(HandleId(id as u64))
    }

    fn display(&self, value: &ScriptValue<QuickHandle>) -> QuickResult<String> {
        self.helper("display", (self.raise(value.clone())?,))
    }

    fn new_array(&self, items: Vec<ScriptValue<QuickHandle>>) -> QuickResult<QuickHandle> {
        let array = self.array(items)?;
        self.save(array.into_value())
    }

    fn new_function(&self, name: &str, function: NativeFn<QuickHandle>) -> QuickResult<QuickHandle> {
        let live = self.live.clone();
        let host = Function::new(
            self.ctx.clone(),
            move |ctx: Ctx<'js>, this: This<Value<'js>>, args: Rest<Value<'js>>| {
                dispatch(ctx, &live, &function, this.0, args.0)
            },
        )
        .and_then(|host| host.with_name(name))
        .map_err(|e| self.fail(e))?;
        self.save(host.into_value())
    }

    fn new_mirror(
        &self,
        methods: Vec<(String, QuickHandle)>,
        prototype: Option<&QuickHandle>,
    ) -> QuickResult<QuickHandle> {
        let table = Object::new(self.ctx.clone()).map_err(|e| self.fail(e))?;
        for (name, method) in methods {
            table
                .set(name.as_str(), self.restore(&method)?)
                .map_err(|e| self.fail(e))?;
        }
        let prototype = match prototype {
            Some(prototype) => self.restore(prototype)?,
            None => Value::new_null(self.ctx.clone()),
        };
        let mirror: Value<'js> = self.helper("mirror", (table, prototype))?;
        self.expect_object(mirror, "mirror")
    }
}

/// Entry point of every host function called from script.
fn dispatch<'js>(
    ctx: Ctx<'js>,
    live: &Weak<()>,
    function: &NativeFn<QuickHandle>,
    this: Value<'js>,
    args: Vec<Value<'js>>,
) -> rquickjs::Result<Value<'js>> {
    let engine = QuickEngine::new(ctx.clone(), live.clone())?;
    match run_native(&engine, function, this, args) {
        Ok(value) => Ok(value),
        Err(EngineError::Thrown(value)) => match engine.raise(value) {
            Ok(value) => Err(ctx.throw(value)),
            Err(error) => {
                let reason = match error {
                    EngineError::Internal(message) => message,
                    EngineError::Thrown(thrown) => format!("{} thrown", thrown.kind()),
                };
                tracing::warn!(%reason, "host error could not be rethrown");
                Err(Exception::throw_message(
                    &ctx,
                    &format!("failed to rethrow host error: {reason}"),
                ))
            }
        },
        Err(EngineError::Internal(message)) => Err(Exception::throw_message(&ctx, &message)),
    }
}

fn run_native<'js>(
    engine: &QuickEngine<'js>,
    function: &NativeFn<QuickHandle>,
    this: Value<'js>,
    args: Vec<Value<'js>>,
) -> QuickResult<Value<'js>> {
    let this = engine.lower(this)?;
    let args = args
        .into_iter()
        .map(|arg| engine.lower(arg))
        .collect::<QuickResult<Vec<_>>>()?;
    let view: &dyn ScriptEngine<Handle = QuickHandle> = engine;
    let result = function(view, this, args)?;
    engine.raise(result)
}
