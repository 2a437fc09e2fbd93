//! Type registry: script constructors <-> host facade types
//!
//! Descriptors are indexed by the live constructor object captured at
//! registration time (not by name) and by host `TypeId`. Resolution walks a
//! value's prototype chain and returns the nearest registered constructor.

use crate::bridge::Scope;
use crate::engine::{EngineResult, HandleId, ScriptEngine, ScriptHandle, ScriptValue};
use crate::error::{BridgeError, BridgeResult};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Upper bound on prototype hops; guards against engines exposing cyclic chains.
const MAX_PROTOTYPE_DEPTH: usize = 256;

pub type FromScriptFn<H> = Rc<dyn Fn(H) -> Rc<dyn Any>>;
pub type ToScriptFn<H> = Rc<dyn Fn(&Scope<'_, H>, &dyn Any) -> BridgeResult<ScriptValue<H>>>;

/// How a script entity and a host type convert into one another.
pub struct TypeDescriptor<H: ScriptHandle> {
    name: String,
    host_type: TypeId,
    host_type_name: &'static str,
    constructor: Option<H>,
    constructor_name: Option<String>,
    throwable: bool,
    from_script: Option<FromScriptFn<H>>,
    to_script: Option<ToScriptFn<H>>,
}

impl<H: ScriptHandle> TypeDescriptor<H> {
    /// Descriptor for host type `T` bound to the script constructor `name`.
    pub fn new<T: Any>(name: impl Into<String>, from_script: impl Fn(H) -> T + 'static) -> Self {
        let name = name.into();
        Self {
            constructor_name: Some(name.clone()),
            name,
            host_type: TypeId::of::<T>(),
            host_type_name: type_name::<T>(),
            constructor: None,
            throwable: false,
            from_script: Some(Rc::new(move |handle| Rc::new(from_script(handle)) as Rc<dyn Any>)),
            to_script: None,
        }
    }

    /// Descriptor for a facade that accepts any script object (no constructor).
    pub fn structural<T: Any>(
        name: impl Into<String>,
        from_script: impl Fn(H) -> T + 'static,
    ) -> Self {
        Self {
            constructor_name: None,
            ..Self::new(name, from_script)
        }
    }

    /// Descriptor for a host-implemented type that only crosses into script.
    pub fn host_only<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_type: TypeId::of::<T>(),
            host_type_name: type_name::<T>(),
            constructor: None,
            constructor_name: None,
            throwable: false,
            from_script: None,
            to_script: None,
        }
    }

    /// Outbound conversion for `Rc<T>` values of the descriptor's host type.
    pub fn with_to_script<T: ?Sized + 'static>(
        mut self,
        to_script: impl Fn(&Scope<'_, H>, &Rc<T>) -> BridgeResult<ScriptValue<H>> + 'static,
    ) -> Self {
        debug_assert_eq!(self.host_type, TypeId::of::<T>());
        self.to_script = Some(Rc::new(move |scope: &Scope<'_, H>, object: &dyn Any| {
            let object = object.downcast_ref::<Rc<T>>().ok_or_else(|| {
                BridgeError::mismatch(type_name::<Rc<T>>(), "a different host type")
            })?;
            to_script(scope, object)
        }));
        self
    }

    /// Mark as a host exception type for thrown script values.
    pub fn throwable(mut self) -> Self {
        self.throwable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host_type(&self) -> TypeId {
        self.host_type
    }

    pub fn host_type_name(&self) -> &'static str {
        self.host_type_name
    }

    /// Script constructor captured when the descriptor was registered.
    pub fn constructor(&self) -> Option<&H> {
        self.constructor.as_ref()
    }

    /// Accepts any script object regardless of its prototype chain.
    pub fn is_structural(&self) -> bool {
        self.constructor_name.is_none() && self.from_script.is_some()
    }

    pub fn is_throwable(&self) -> bool {
        self.throwable
    }

    pub(crate) fn constructor_name(&self) -> Option<&str> {
        self.constructor_name.as_deref()
    }

    pub(crate) fn from_script_fn(&self) -> Option<&FromScriptFn<H>> {
        self.from_script.as_ref()
    }

    pub(crate) fn to_script_fn(&self) -> Option<&ToScriptFn<H>> {
        self.to_script.as_ref()
    }

    pub(crate) fn bind_constructor(&mut self, constructor: H) {
        self.constructor = Some(constructor);
    }
}

pub(crate) struct TypeRegistry<H: ScriptHandle> {
    descriptors: Vec<Rc<TypeDescriptor<H>>>,
    by_constructor: HashMap<HandleId, usize>,
    by_host: HashMap<TypeId, usize>,
    by_name: HashMap<String, usize>,
}

impl<H: ScriptHandle> TypeRegistry<H> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            by_constructor: HashMap::new(),
            by_host: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Store a descriptor whose constructor (if any) is already resolved.
    pub fn insert(
        &mut self,
        descriptor: TypeDescriptor<H>,
        constructor_id: Option<HandleId>,
    ) -> BridgeResult<Rc<TypeDescriptor<H>>> {
        let duplicate = self.by_name.contains_key(descriptor.name())
            || self.by_host.contains_key(&descriptor.host_type())
            || constructor_id.is_some_and(|id| self.by_constructor.contains_key(&id));
        if duplicate {
            return Err(BridgeError::DuplicateRegistration {
                name: descriptor.name().to_string(),
            });
        }

        let index = self.descriptors.len();
        if let Some(id) = constructor_id {
            self.by_constructor.insert(id, index);
        }
        self.by_host.insert(descriptor.host_type(), index);
        self.by_name.insert(descriptor.name().to_string(), index);

        let descriptor = Rc::new(descriptor);
        self.descriptors.push(descriptor.clone());
        Ok(descriptor)
    }

    pub fn by_constructor(&self, id: HandleId) -> Option<Rc<TypeDescriptor<H>>> {
        self.by_constructor
            .get(&id)
            .map(|&index| self.descriptors[index].clone())
    }

    pub fn by_host(&self, host_type: TypeId) -> Option<Rc<TypeDescriptor<H>>> {
        self.by_host
            .get(&host_type)
            .map(|&index| self.descriptors[index].clone())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }
}

impl<H: ScriptHandle> Default for TypeRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk `handle`'s prototype chain and return the nearest descriptor that
/// `lookup` knows and `accept` admits.
///
/// `lookup` is called once per hop with the id of that prototype's
/// `constructor`; engine calls happen between lookups, never during one.
pub fn resolve<H: ScriptHandle>(
    engine: &dyn ScriptEngine<Handle = H>,
    handle: &H,
    lookup: impl Fn(HandleId) -> Option<Rc<TypeDescriptor<H>>>,
    accept: impl Fn(&TypeDescriptor<H>) -> bool,
) -> EngineResult<Option<Rc<TypeDescriptor<H>>>, H> {
    let mut current = engine.prototype_of(handle)?;
    let mut depth = 0;
    while let Some(prototype) = current {
        if depth == MAX_PROTOTYPE_DEPTH {
            tracing::warn!(?handle, "prototype chain exceeds depth limit");
            break;
        }
        if let ScriptValue::Object(constructor) = engine.get_member(&prototype, "constructor")? {
            let id = engine.identity(&constructor)?;
            if let Some(descriptor) = lookup(id).filter(|descriptor| accept(descriptor)) {
                return Ok(Some(descriptor));
            }
        }
        current = engine.prototype_of(&prototype)?;
        depth += 1;
    }
    Ok(None)
}
