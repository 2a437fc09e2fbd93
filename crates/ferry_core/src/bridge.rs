//! Bridge state and per-call scopes
//!
//! [`Bridge`] owns everything that must outlive a single call into the engine:
//! the identity map, the type registry and the mirror origins. A [`Scope`]
//! pairs the bridge with the engine currently executing, and every conversion
//! or script access goes through one.
//!
//! No `RefCell` borrow is held across a call into the engine or into user
//! code, so host functions invoked from script can re-enter the bridge freely.

use crate::convert::{FromScript, IntoArgs, ToScript};
use crate::engine::{
    EngineError, EngineResult, HandleId, NativeFn, ScriptEngine, ScriptHandle, ScriptValue,
};
use crate::error::{BridgeError, BridgeResult, ScriptFailure, ThrownValue, TypedScriptException};
use crate::facade::{Facade, ScriptArray, ScriptFunction, ScriptObject};
use crate::identity::IdentityMap;
use crate::mirror::{Arguments, HostFn, MirrorBuilder};
use crate::registry::{resolve, TypeDescriptor, TypeRegistry};
use crate::settings::BridgeSettings;
use crate::value::HostValue;
use ferry_metrics::Counter;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub const IDENTITY_HIT: &str = "identity.hit";
pub const IDENTITY_MISS: &str = "identity.miss";
pub const IDENTITY_SWEPT: &str = "identity.swept";
pub const EXCEPTIONS_TYPED: &str = "exceptions.typed";
pub const EXCEPTIONS_RAW: &str = "exceptions.raw";

/// Host object behind a mirror, held weakly.
struct MirrorOrigin {
    origin: Box<dyn Any>,
    alive: Box<dyn Fn() -> bool>,
}

pub struct Bridge<H: ScriptHandle> {
    identity: RefCell<IdentityMap<H>>,
    registry: RefCell<TypeRegistry<H>>,
    mirror_origins: RefCell<HashMap<HandleId, MirrorOrigin>>,
    counter: RefCell<Counter>,
}

impl<H: ScriptHandle> Bridge<H> {
    /// Create a bridge for `engine` with the generic facades registered.
    pub fn new(
        engine: &dyn ScriptEngine<Handle = H>,
        settings: BridgeSettings,
    ) -> BridgeResult<Rc<Self>> {
        let identity = IdentityMap::with_capacity(
            settings.identity.initial_capacity,
            settings.identity.sweep_interval,
        );
        let bridge = Rc::new(Self {
            identity: RefCell::new(identity),
            registry: RefCell::new(TypeRegistry::new()),
            mirror_origins: RefCell::new(HashMap::new()),
            counter: RefCell::new(Counter::new()),
        });

        let scope = bridge.scope(engine);
        scope.register::<ScriptObject<H>>()?;
        scope.register::<ScriptArray<H>>()?;
        scope.register::<ScriptFunction<H>>()?;

        tracing::debug!(
            sweep_interval = settings.identity.sweep_interval,
            initial_capacity = settings.identity.initial_capacity,
            "bridge initialized"
        );
        Ok(bridge)
    }

    pub fn scope<'e>(self: &Rc<Self>, engine: &'e dyn ScriptEngine<Handle = H>) -> Scope<'e, H> {
        Scope {
            bridge: self.clone(),
            engine,
        }
    }

    /// Drop identity entries and mirror origins whose host side is gone.
    pub fn sweep(&self) -> usize {
        let mut swept = self.identity.borrow_mut().sweep();
        let mut origins = self.mirror_origins.borrow_mut();
        let before = origins.len();
        origins.retain(|_, entry| (entry.alive)());
        swept += before - origins.len();
        drop(origins);

        self.count(IDENTITY_SWEPT, swept);
        tracing::debug!(swept, "identity sweep");
        swept
    }

    /// Release every script handle the bridge holds: mirrors, registered
    /// constructors and mirror origins. Registrations are gone afterwards.
    pub fn clear(&self) {
        self.identity.borrow_mut().clear();
        *self.registry.borrow_mut() = TypeRegistry::new();
        self.mirror_origins.borrow_mut().clear();
        tracing::debug!("bridge cleared");
    }

    /// Stored identity entries, stale ones included.
    pub fn identity_len(&self) -> usize {
        self.identity.borrow().len()
    }

    pub fn live_facades(&self) -> usize {
        self.identity.borrow().live_facades()
    }

    pub fn registered_types(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Value of a bridge counter; always 0 without the `metrics` feature.
    pub fn counter(&self, name: &str) -> usize {
        self.counter.borrow().get(name)
    }

    /// All non-zero counters ordered by name.
    pub fn counters(&self) -> Vec<(&'static str, usize)> {
        self.counter.borrow().snapshot()
    }

    fn count(&self, name: &'static str, value: usize) {
        self.counter.borrow_mut().add(name, value);
    }
}

/// The bridge bound to the engine executing the current call.
#[derive(Clone)]
pub struct Scope<'e, H: ScriptHandle> {
    bridge: Rc<Bridge<H>>,
    engine: &'e dyn ScriptEngine<Handle = H>,
}

impl<'e, H: ScriptHandle> Scope<'e, H> {
    pub fn bridge(&self) -> &Rc<Bridge<H>> {
        &self.bridge
    }

    pub fn engine(&self) -> &'e dyn ScriptEngine<Handle = H> {
        self.engine
    }

    fn lift<T>(&self, result: EngineResult<T, H>) -> BridgeResult<T> {
        result.map_err(|error| self.translate(error))
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register facade `T` under its script constructor (or structurally).
    pub fn register<T: Facade<H>>(&self) -> BridgeResult<()> {
        self.register_descriptor(facade_descriptor::<H, T>())
            .map(|_| ())
    }

    /// Register facade `T` as a host exception type for thrown values.
    pub fn register_exception<T: Facade<H>>(&self) -> BridgeResult<()> {
        self.register_descriptor(facade_descriptor::<H, T>().throwable())
            .map(|_| ())
    }

    /// Register host implementations of `T` (usually `dyn Trait`) as mirrors.
    ///
    /// `mirror` runs the first time a given host object crosses into script;
    /// later crossings reuse the cached mirror while the host object lives.
    pub fn register_interface<T: ?Sized + 'static>(
        &self,
        name: impl Into<String>,
        mirror: impl Fn(&Scope<'_, H>, &Rc<T>) -> BridgeResult<MirrorBuilder<H>> + 'static,
    ) -> BridgeResult<()> {
        let descriptor =
            TypeDescriptor::host_only::<T>(name).with_to_script::<T>(move |scope, object| {
                let builder = mirror(scope, object)?;
                let handle = scope.build_mirror(builder)?;
                scope.adopt_mirror(object, handle).map(ScriptValue::Object)
            });
        self.register_descriptor(descriptor).map(|_| ())
    }

    /// Bind the descriptor's constructor from the global namespace and store it.
    pub fn register_descriptor(
        &self,
        mut descriptor: TypeDescriptor<H>,
    ) -> BridgeResult<Rc<TypeDescriptor<H>>> {
        let constructor_id = match descriptor.constructor_name().map(str::to_string) {
            Some(name) => {
                let global = self.global()?;
                let constructor = match self.lift(self.engine.get_member(&global, &name))? {
                    ScriptValue::Object(handle) if self.lift(self.engine.is_callable(&handle))? => {
                        handle
                    }
                    _ => return Err(BridgeError::UnknownConstructor { name }),
                };
                let id = self.lift(self.engine.identity(&constructor))?;
                descriptor.bind_constructor(constructor);
                Some(id)
            }
            None => None,
        };

        let descriptor = self
            .bridge
            .registry
            .borrow_mut()
            .insert(descriptor, constructor_id)?;
        tracing::debug!(
            name = descriptor.name(),
            host_type = descriptor.host_type_name(),
            structural = descriptor.is_structural(),
            throwable = descriptor.is_throwable(),
            "registered type"
        );
        Ok(descriptor)
    }

    fn descriptor_for<T: ?Sized + 'static>(&self) -> BridgeResult<Rc<TypeDescriptor<H>>> {
        self.bridge
            .registry
            .borrow()
            .by_host(TypeId::of::<T>())
            .ok_or_else(|| BridgeError::UnsupportedType {
                type_name: type_name::<T>().to_string(),
            })
    }

    fn nearest(
        &self,
        handle: &H,
        accept: impl Fn(&TypeDescriptor<H>) -> bool,
    ) -> EngineResult<Option<Rc<TypeDescriptor<H>>>, H> {
        resolve(
            self.engine,
            handle,
            |id| self.bridge.registry.borrow().by_constructor(id),
            accept,
        )
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convert without a target type: the nearest registered constructor on
    /// the prototype chain decides the facade.
    pub fn to_host(&self, value: ScriptValue<H>) -> BridgeResult<HostValue> {
        Ok(match value {
            ScriptValue::Undefined => HostValue::Undefined,
            ScriptValue::Null => HostValue::Null,
            ScriptValue::Bool(value) => HostValue::Bool(value),
            ScriptValue::Number(value) => HostValue::Number(value),
            ScriptValue::String(value) => HostValue::String(value),
            ScriptValue::Object(handle) => {
                let descriptor = match self.lift(self.nearest(&handle, |descriptor| {
                    descriptor.from_script_fn().is_some()
                }))? {
                    Some(descriptor) => descriptor,
                    None => self.generic_descriptor(&handle)?,
                };
                HostValue::Object(self.facade_for(&descriptor, handle)?)
            }
        })
    }

    /// Convert to facade `T`, failing when the value is not assignable to it.
    pub fn to_host_as<T: Facade<H>>(&self, value: ScriptValue<H>) -> BridgeResult<Rc<T>> {
        let handle = match value {
            ScriptValue::Object(handle) => handle,
            other => return Err(BridgeError::mismatch(T::SCRIPT_NAME, other.kind())),
        };
        let descriptor = self.descriptor_for::<T>()?;
        self.check_assignable(&descriptor, &handle)?;
        self.facade_for(&descriptor, handle)?
            .downcast::<T>()
            .map_err(|_| BridgeError::mismatch(type_name::<T>(), descriptor.host_type_name()))
    }

    /// Objects outside every registered chain (`Object.create(null)`, foreign
    /// prototypes) still convert to one of the generic facades.
    fn generic_descriptor(&self, handle: &H) -> BridgeResult<Rc<TypeDescriptor<H>>> {
        if self.lift(self.engine.is_callable(handle))? {
            self.descriptor_for::<ScriptFunction<H>>()
        } else if self.lift(self.engine.is_array(handle))? {
            self.descriptor_for::<ScriptArray<H>>()
        } else {
            self.descriptor_for::<ScriptObject<H>>()
        }
    }

    fn check_assignable(&self, descriptor: &TypeDescriptor<H>, handle: &H) -> BridgeResult<()> {
        if descriptor.is_structural() || descriptor.host_type() == TypeId::of::<ScriptObject<H>>()
        {
            return Ok(());
        }
        let target = descriptor.host_type();
        if self
            .lift(self.nearest(handle, |candidate| candidate.host_type() == target))?
            .is_some()
        {
            return Ok(());
        }
        let found = self
            .lift(self.nearest(handle, |_| true))?
            .map(|nearest| nearest.name().to_string())
            .unwrap_or_else(|| "object".to_string());
        Err(BridgeError::mismatch(descriptor.name(), found))
    }

    fn facade_for(&self, descriptor: &TypeDescriptor<H>, handle: H) -> BridgeResult<Rc<dyn Any>> {
        let id = self.lift(self.engine.identity(&handle))?;
        self.facade_with_id(descriptor, id, handle)
    }

    fn facade_with_id(
        &self,
        descriptor: &TypeDescriptor<H>,
        id: HandleId,
        handle: H,
    ) -> BridgeResult<Rc<dyn Any>> {
        let host_type = descriptor.host_type();
        let existing = self.bridge.identity.borrow().lookup_erased(id, host_type);
        if let Some(existing) = existing {
            self.bridge.count(IDENTITY_HIT, 1);
            tracing::trace!(%id, type_name = descriptor.name(), "identity hit");
            return Ok(existing);
        }

        let create = descriptor
            .from_script_fn()
            .cloned()
            .ok_or_else(|| BridgeError::UnsupportedType {
                type_name: descriptor.host_type_name().to_string(),
            })?;
        self.bridge.count(IDENTITY_MISS, 1);
        tracing::debug!(%id, type_name = descriptor.name(), "creating facade");
        let facade = create(handle);
        Ok(self
            .bridge
            .identity
            .borrow_mut()
            .insert_erased(id, host_type, facade))
    }

    /// Host object to script: the mirror it already crossed as, else the
    /// registered conversion for `T` (a facade hands back its own handle).
    pub fn object_to_script<T: ?Sized + 'static>(
        &self,
        object: &Rc<T>,
    ) -> BridgeResult<ScriptValue<H>> {
        let known = self.bridge.identity.borrow().inverse(object);
        if let Some(handle) = known {
            tracing::trace!(type_name = type_name::<T>(), "inverse identity hit");
            return Ok(ScriptValue::Object(handle));
        }
        let descriptor = self.descriptor_for::<T>()?;
        let to_script =
            descriptor
                .to_script_fn()
                .cloned()
                .ok_or_else(|| BridgeError::UnsupportedType {
                    type_name: type_name::<T>().to_string(),
                })?;
        to_script(self, object as &dyn Any)
    }

    /// Facades over the same script object, whatever their host types.
    pub fn same_entity<A: Facade<H>, B: Facade<H>>(&self, a: &A, b: &B) -> BridgeResult<bool> {
        let left = self.lift(self.engine.identity(a.handle()))?;
        let right = self.lift(self.engine.identity(b.handle()))?;
        Ok(left == right)
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    /// Reclassify an engine failure, using registered exception types when
    /// the thrown value's prototype chain reaches one.
    pub fn translate(&self, error: EngineError<H>) -> BridgeError {
        let value = match error {
            EngineError::Internal(message) => return BridgeError::Engine(message),
            EngineError::Thrown(value) => value,
        };
        let message = self
            .engine
            .display(&value)
            .unwrap_or_else(|_| format!("uncaught {}", value.kind()));
        let thrown = ThrownValue::new(value.clone());

        if let ScriptValue::Object(handle) = &value {
            match self.typed_exception(handle, &message, &thrown) {
                Ok(Some(exception)) => {
                    self.bridge.count(EXCEPTIONS_TYPED, 1);
                    tracing::debug!(%exception, "typed script exception");
                    return BridgeError::Typed(exception);
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(%error, "exception classification failed"),
            }
        }

        self.bridge.count(EXCEPTIONS_RAW, 1);
        tracing::debug!(%message, "script exception");
        BridgeError::Script(ScriptFailure { message, thrown })
    }

    /// Engine calls here report failures as plain errors; translating them
    /// again could recurse.
    fn typed_exception(
        &self,
        handle: &H,
        raw_message: &str,
        thrown: &ThrownValue,
    ) -> BridgeResult<Option<TypedScriptException>> {
        let descriptor = self
            .nearest(handle, |descriptor| descriptor.is_throwable())
            .map_err(nested_failure)?;
        let Some(descriptor) = descriptor else {
            return Ok(None);
        };

        let id = self.engine.identity(handle).map_err(nested_failure)?;
        let facade = self.facade_with_id(&descriptor, id, handle.clone())?;
        let message = match self
            .engine
            .get_member(handle, "message")
            .map_err(nested_failure)?
        {
            ScriptValue::String(message) => message,
            _ => raw_message.to_string(),
        };

        Ok(Some(TypedScriptException {
            type_name: descriptor.name().to_string(),
            message,
            thrown: thrown.clone(),
            facade,
            facade_type: descriptor.host_type(),
        }))
    }

    // ========================================================================
    // Script access
    // ========================================================================

    pub fn global(&self) -> BridgeResult<H> {
        self.lift(self.engine.global())
    }

    pub fn global_object(&self) -> BridgeResult<Rc<ScriptObject<H>>> {
        let global = self.global()?;
        self.to_host_as(ScriptValue::Object(global))
    }

    /// Global binding converted to `T`.
    pub fn get<T: FromScript<H>>(&self, name: &str) -> BridgeResult<T> {
        let global = self.global()?;
        self.member(&global, name)
    }

    pub fn set(&self, name: &str, value: impl ToScript<H>) -> BridgeResult<()> {
        let global = self.global()?;
        self.set_member(&global, name, value)
    }

    /// Call a global function.
    pub fn call<R: FromScript<H>>(&self, name: &str, args: impl IntoArgs<H>) -> BridgeResult<R> {
        let global = self.global()?;
        self.invoke(&global, name, args)
    }

    pub fn member<T: FromScript<H>>(&self, target: &H, name: &str) -> BridgeResult<T> {
        let value = self.lift(self.engine.get_member(target, name))?;
        T::from_script(self, value)
    }

    pub fn set_member(&self, target: &H, name: &str, value: impl ToScript<H>) -> BridgeResult<()> {
        let value = value.to_script(self)?;
        self.lift(self.engine.set_member(target, name, value))
    }

    pub fn item<T: FromScript<H>>(&self, target: &H, index: usize) -> BridgeResult<T> {
        let value = self.lift(self.engine.get_index(target, index))?;
        T::from_script(self, value)
    }

    pub fn set_item(&self, target: &H, index: usize, value: impl ToScript<H>) -> BridgeResult<()> {
        let value = value.to_script(self)?;
        self.lift(self.engine.set_index(target, index, value))
    }

    pub fn length(&self, target: &H) -> BridgeResult<usize> {
        self.lift(self.engine.length(target))
    }

    pub fn keys(&self, target: &H) -> BridgeResult<Vec<String>> {
        self.lift(self.engine.own_keys(target))
    }

    pub fn new_array(&self, items: Vec<ScriptValue<H>>) -> BridgeResult<H> {
        self.lift(self.engine.new_array(items))
    }

    /// Call member `name` of `target` with `target` as receiver.
    pub fn invoke<R: FromScript<H>>(
        &self,
        target: &H,
        name: &str,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        let args = args.into_args(self)?;
        let value = self.lift(self.engine.call_member(target, name, args))?;
        R::from_script(self, value)
    }

    /// Call the implementation of `name` inherited by `receiver`, skipping
    /// anything the receiver itself (or its mirror) defines.
    pub fn invoke_super<R: FromScript<H>>(
        &self,
        receiver: &H,
        name: &str,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        let prototype = self
            .lift(self.engine.prototype_of(receiver))?
            .ok_or_else(|| BridgeError::mismatch(format!("inherited '{name}'"), "no prototype"))?;
        let callable = match self.lift(self.engine.get_member(&prototype, name))? {
            ScriptValue::Object(handle) if self.lift(self.engine.is_callable(&handle))? => handle,
            other => return Err(BridgeError::mismatch("function", other.kind())),
        };
        self.apply(&callable, ScriptValue::Object(receiver.clone()), args)
    }

    /// Call `callable` with an explicit receiver.
    pub fn apply<R: FromScript<H>>(
        &self,
        callable: &H,
        this: ScriptValue<H>,
        args: impl IntoArgs<H>,
    ) -> BridgeResult<R> {
        let args = args.into_args(self)?;
        let value = self.lift(self.engine.call(callable, this, args))?;
        R::from_script(self, value)
    }

    /// `new T(...args)` through the constructor captured at registration.
    pub fn construct<T: Facade<H>>(&self, args: impl IntoArgs<H>) -> BridgeResult<Rc<T>> {
        let instance = self.construct_raw::<T>(args)?;
        self.to_host_as(ScriptValue::Object(instance))
    }

    /// Construct `T`, then front the instance with a mirror carrying
    /// `overrides`. Members the mirror lacks fall through to the instance.
    pub fn construct_with_overrides<T: Facade<H>>(
        &self,
        args: impl IntoArgs<H>,
        overrides: MirrorBuilder<H>,
    ) -> BridgeResult<Rc<T>> {
        let instance = self.construct_raw::<T>(args)?;
        let mirror = self.build_mirror(overrides.with_prototype(instance))?;
        self.to_host_as(ScriptValue::Object(mirror))
    }

    fn construct_raw<T: Facade<H>>(&self, args: impl IntoArgs<H>) -> BridgeResult<H> {
        let descriptor = self.descriptor_for::<T>()?;
        let constructor =
            descriptor
                .constructor()
                .cloned()
                .ok_or_else(|| BridgeError::UnknownConstructor {
                    name: descriptor.name().to_string(),
                })?;
        let args = args.into_args(self)?;
        self.lift(self.engine.construct(&constructor, args))
    }

    pub fn evaluate<T: FromScript<H>>(&self, source: &str) -> BridgeResult<T> {
        let value = self.lift(self.engine.evaluate(source))?;
        T::from_script(self, value)
    }

    /// Evaluate a script for its side effects and hand back the global object.
    pub fn load(&self, source: &str) -> BridgeResult<Rc<ScriptObject<H>>> {
        self.lift(self.engine.evaluate(source))?;
        self.global_object()
    }

    /// Expose a host closure as a script function.
    pub fn function(
        &self,
        name: &str,
        function: impl Fn(&Scope<'_, H>, Arguments<H>) -> BridgeResult<ScriptValue<H>> + 'static,
    ) -> BridgeResult<Rc<ScriptFunction<H>>> {
        let handle = self.native(name, Rc::new(function))?;
        self.to_host_as(ScriptValue::Object(handle))
    }

    // ========================================================================
    // Mirrors
    // ========================================================================

    pub fn build_mirror(&self, builder: MirrorBuilder<H>) -> BridgeResult<H> {
        let MirrorBuilder { methods, prototype } = builder;
        let methods = methods
            .into_iter()
            .map(|(name, method)| {
                let function = self.native(&name, method)?;
                Ok((name, function))
            })
            .collect::<BridgeResult<Vec<_>>>()?;
        let count = methods.len();
        let mirror = self.lift(self.engine.new_mirror(methods, prototype.as_ref()))?;
        tracing::debug!(methods = count, inherits = prototype.is_some(), "built mirror");
        Ok(mirror)
    }

    /// The host object a mirror was built for, while it is alive.
    pub fn unwrap_mirror<T: ?Sized + 'static>(
        &self,
        value: &ScriptValue<H>,
    ) -> BridgeResult<Option<Rc<T>>> {
        let Some(handle) = value.as_object() else {
            return Ok(None);
        };
        let id = self.lift(self.engine.identity(handle))?;
        let origins = self.bridge.mirror_origins.borrow();
        let origin = origins
            .get(&id)
            .and_then(|entry| entry.origin.downcast_ref::<Weak<T>>())
            .and_then(Weak::upgrade);
        Ok(origin)
    }

    fn adopt_mirror<T: ?Sized + 'static>(&self, object: &Rc<T>, mirror: H) -> BridgeResult<H> {
        let mirror = self.bridge.identity.borrow_mut().bind_inverse(object, mirror);
        let id = self.lift(self.engine.identity(&mirror))?;
        let origin = Rc::downgrade(object);
        let probe = origin.clone();
        self.bridge.mirror_origins.borrow_mut().insert(
            id,
            MirrorOrigin {
                origin: Box::new(origin),
                alive: Box::new(move || probe.strong_count() > 0),
            },
        );
        tracing::debug!(%id, host_type = type_name::<T>(), "mirror bound to host object");
        Ok(mirror)
    }

    /// Wrap a host function; it holds the bridge weakly and builds a fresh
    /// scope from the calling engine on every invocation.
    fn native(&self, name: &str, method: HostFn<H>) -> BridgeResult<H> {
        let bridge = Rc::downgrade(&self.bridge);
        let function: NativeFn<H> = Rc::new(
            move |engine: &dyn ScriptEngine<Handle = H>,
                  this: ScriptValue<H>,
                  values: Vec<ScriptValue<H>>| {
                let Some(bridge) = bridge.upgrade() else {
                    return Err(BridgeError::BridgeDropped.into_engine::<H>());
                };
                let scope = Scope { bridge, engine };
                method(&scope, Arguments { this, values }).map_err(BridgeError::into_engine::<H>)
            },
        );
        self.lift(self.engine.new_function(name, function))
    }
}

fn facade_descriptor<H: ScriptHandle, T: Facade<H>>() -> TypeDescriptor<H> {
    let descriptor = if T::STRUCTURAL {
        TypeDescriptor::structural::<T>(T::SCRIPT_NAME, T::wrap)
    } else {
        TypeDescriptor::new::<T>(T::SCRIPT_NAME, T::wrap)
    };
    descriptor.with_to_script::<T>(|_, facade| Ok(ScriptValue::Object(facade.handle().clone())))
}

fn nested_failure<H>(error: EngineError<H>) -> BridgeError {
    match error {
        EngineError::Internal(message) => BridgeError::Engine(message),
        EngineError::Thrown(value) => BridgeError::Engine(format!(
            "script threw {} while classifying an exception",
            value.kind()
        )),
    }
}
