//! Bridge behavior against a live QuickJS context

use ferry_core::{
    define_facade, Bridge, BridgeError, BridgeResult, BridgeSettings, Facade, HostValue,
    MirrorBuilder, Scope, ScriptArray, ScriptFailure, ScriptFunction, ScriptObject, ScriptValue,
    ThrownValue, ToScript, TypeDescriptor,
};
use ferry_script::{QuickHandle, ScriptRuntime};
use std::cell::Cell;
use std::rc::Rc;

type H = QuickHandle;

const FIXTURE: &str = include_str!("fixtures/src.js");

struct SimpleObject<H> {
    handle: H,
}
define_facade!(SimpleObject, "SimpleObject");

struct DerivedObject<H> {
    handle: H,
}
define_facade!(DerivedObject, "DerivedObject");

struct SpecialError<H> {
    handle: H,
}
define_facade!(SpecialError, "SpecialError");

struct SimpleInterface<H> {
    handle: H,
}
define_facade!(SimpleInterface, "SimpleInterface", structural);

/// Registered by hand rather than through `define_facade!`.
struct Boxed<H> {
    handle: H,
}

trait Listener {
    fn void_no_arg_method(&self);
}

#[derive(Default)]
struct Recorder {
    calls: Cell<u32>,
}

impl Listener for Recorder {
    fn void_no_arg_method(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

struct Unregistered;

fn fixture() -> ScriptRuntime {
    let runtime = ScriptRuntime::new().unwrap();
    runtime.execute(FIXTURE).unwrap();
    runtime
        .scope(|scope| -> BridgeResult<()> {
            scope.register::<SimpleObject<H>>()?;
            scope.register::<DerivedObject<H>>()?;
            scope.register::<SimpleInterface<H>>()?;
            scope.register_exception::<SpecialError<H>>()?;
            scope.register_descriptor(
                TypeDescriptor::new::<Boxed<H>>("Box", |handle| Boxed { handle })
                    .with_to_script::<Boxed<H>>(|_, boxed| {
                        Ok(ScriptValue::Object(boxed.handle.clone()))
                    }),
            )?;
            scope.register_interface::<dyn Listener>("Listener", |_, _| {
                Ok(MirrorBuilder::new().method("voidNoArgMethod", |scope, args| {
                    if let Some(listener) = scope.unwrap_mirror::<dyn Listener>(&args.this)? {
                        listener.void_no_arg_method();
                    }
                    Ok(ScriptValue::Undefined)
                }))
            })?;
            Ok(())
        })
        .unwrap()
        .unwrap();
    runtime
}

fn with_fixture(test: impl FnOnce(&Scope<'_, H>) -> BridgeResult<()>) {
    let runtime = fixture();
    runtime.scope(test).unwrap().unwrap();
}

fn receiver(value: &ScriptValue<H>) -> H {
    value.as_object().cloned().expect("method called without an object receiver")
}

#[test]
fn const_types() {
    with_fixture(|scope| {
        assert!(!scope.get::<bool>("booleanConst")?);
        assert!(scope.get::<f64>("numberConst")?.is_nan());
        assert_eq!(scope.get::<String>("stringConst")?, "stringConstLiteral");

        let numbers: Rc<ScriptArray<H>> = scope.get("numberArrayConst")?;
        assert_eq!(numbers.to_vec::<i32>(scope)?, vec![1, 2, 3]);

        let nested: Rc<ScriptArray<H>> = scope.get("stringArrayArrayConst")?;
        let rows = nested
            .to_vec::<Rc<ScriptArray<H>>>(scope)?
            .iter()
            .map(|row| row.to_vec::<String>(scope))
            .collect::<BridgeResult<Vec<_>>>()?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["4", "5", "6"]);

        assert_eq!(
            scope.get::<HostValue>("anyConst")?,
            HostValue::String("anyConstLiteral".into())
        );

        let with_null: Rc<ScriptArray<H>> = scope.get("numberOrNullArrayConst")?;
        assert_eq!(
            with_null.to_vec::<Option<i32>>(scope)?,
            vec![Some(1), None, Some(3)]
        );
        Ok(())
    });
}

#[test]
fn optional_const_types() {
    with_fixture(|scope| {
        assert_eq!(scope.get::<Option<bool>>("optionalBooleanConst")?, None);
        assert_eq!(scope.get::<Option<f64>>("optionalNumberConst")?, None);
        assert_eq!(scope.get::<Option<String>>("optionalStringConst")?, None);
        assert!(scope
            .get::<Option<Rc<ScriptArray<H>>>>("optionalNumberArrayConst")?
            .is_none());
        assert_eq!(scope.get::<Option<HostValue>>("optionalNullAnyConst")?, None);
        assert_eq!(
            scope.get::<Option<HostValue>>("optionalNonNullAnyConst")?,
            Some(HostValue::String(scope.get("stringConst")?))
        );
        Ok(())
    });
}

#[test]
fn var_types() {
    with_fixture(|scope| {
        assert!(scope.get::<bool>("booleanVar")?);
        scope.set("booleanVar", scope.get::<bool>("booleanConst")?)?;
        assert!(!scope.get::<bool>("booleanVar")?);

        assert_eq!(scope.get::<i32>("numberVar")?, 0);
        scope.set("numberVar", scope.get::<f64>("numberConst")?)?;
        assert!(scope.get::<f64>("numberVar")?.is_nan());

        assert_eq!(scope.get::<String>("stringVar")?, "stringVarLiteral");
        scope.set("stringVar", "stringConstLiteral")?;
        assert_eq!(scope.get::<String>("stringVar")?, "stringConstLiteral");

        let empty: Rc<ScriptArray<H>> = scope.get("numberArrayVar")?;
        assert!(empty.is_empty(scope)?);

        let numbers: Rc<ScriptArray<H>> = scope.get("numberArrayConst")?;
        scope.set("numberArrayVar", numbers.clone())?;
        let shared: Rc<ScriptArray<H>> = scope.get("numberArrayVar")?;
        assert!(Rc::ptr_eq(&numbers, &shared));

        scope.set("numberArrayVar", vec![5])?;
        let replaced: Rc<ScriptArray<H>> = scope.get("numberArrayVar")?;
        assert_eq!(replaced.to_vec::<i32>(scope)?, vec![5]);

        scope.set("stringArrayArrayVar", vec![vec!["yo"]])?;
        assert!(scope.evaluate::<bool>(
            "stringArrayArrayVar.length === 1 && stringArrayArrayVar[0][0] === 'yo'"
        )?);
        Ok(())
    });
}

#[test]
fn optional_var_types() {
    with_fixture(|scope| {
        assert_eq!(scope.get::<Option<bool>>("optionalBooleanVar")?, None);
        scope.set("optionalBooleanVar", Some(false))?;
        assert_eq!(scope.get::<Option<bool>>("optionalBooleanVar")?, Some(false));
        scope.set("optionalBooleanVar", None::<bool>)?;
        assert_eq!(scope.get::<Option<bool>>("optionalBooleanVar")?, None);

        scope.set("optionalNumberVar", Some(4000))?;
        assert_eq!(scope.get::<Option<i64>>("optionalNumberVar")?, Some(4000));
        scope.set("optionalNumberVar", None::<i64>)?;
        assert_eq!(scope.get::<Option<i64>>("optionalNumberVar")?, None);

        scope.set("optionalStringVar", Some("stringConstLiteral"))?;
        assert_eq!(
            scope.get::<Option<String>>("optionalStringVar")?.as_deref(),
            Some("stringConstLiteral")
        );

        scope.set("optionalAnyVar", Some("anyConstLiteral"))?;
        assert_eq!(
            scope.get::<Option<HostValue>>("optionalAnyVar")?,
            Some(HostValue::String("anyConstLiteral".into()))
        );
        scope.set("optionalAnyVar", None::<String>)?;
        assert_eq!(scope.get::<Option<HostValue>>("optionalAnyVar")?, None);
        Ok(())
    });
}

#[test]
fn primitives_never_enter_the_identity_map() {
    with_fixture(|scope| {
        let before = scope.bridge().identity_len();
        scope.set("anyVar", false)?;
        assert_eq!(scope.get::<HostValue>("anyVar")?, HostValue::Bool(false));
        assert_eq!(scope.get::<HostValue>("anyVar")?, scope.get::<HostValue>("anyVar")?);
        scope.get::<HostValue>("numberArrayConst")?;
        let after_object = scope.bridge().identity_len();
        assert!(after_object > before);

        scope.set("anyVar", 5)?;
        scope.get::<HostValue>("anyVar")?;
        scope.get::<String>("stringConst")?;
        assert_eq!(scope.bridge().identity_len(), after_object);
        Ok(())
    });
}

#[test]
fn objects_keep_their_facade_through_untyped_slots() {
    with_fixture(|scope| {
        let instance: Rc<SimpleObject<H>> = scope.get("anyObjectInstance")?;
        scope.set("anyVar", instance.clone())?;
        let any = scope.get::<HostValue>("anyVar")?;
        let back = any.downcast::<SimpleObject<H>>().expect("SimpleObject facade");
        assert!(Rc::ptr_eq(&instance, &back));
        Ok(())
    });
}

#[test]
fn functions() {
    with_fixture(|scope| {
        scope.call::<()>("voidNoArgFunction", ())?;
        assert!(scope.get::<bool>("voidNoArgFunctionCalled")?);

        assert_eq!(
            scope.call::<String>("stringNoArgFunction", ())?,
            "stringNoArgFunctionReturnValue"
        );
        assert_eq!(scope.call::<f64>("numberMultipleArgFunction", (5, 5))?, 25.0);
        assert_eq!(scope.call::<f64>("numberMultipleArgFunction", (-2, 1.5))?, -3.0);
        Ok(())
    });
}

#[test]
fn lambdas() {
    with_fixture(|scope| {
        let lambda: Rc<ScriptFunction<H>> = scope.get("stringNoArgLambda")?;
        assert_eq!(lambda.call::<String>(scope, ())?, "stringNoArgLambdaReturnValue");
        let again: Rc<ScriptFunction<H>> = scope.get("stringNoArgLambda")?;
        assert!(Rc::ptr_eq(&lambda, &again));

        let replacement = scope.function("stringNoArgLambda", |_, _| {
            Ok(ScriptValue::String("expectedReturnValue".into()))
        })?;
        scope.set("stringNoArgLambda", replacement.clone())?;
        let installed: Rc<ScriptFunction<H>> = scope.get("stringNoArgLambda")?;
        assert!(Rc::ptr_eq(&replacement, &installed));
        assert_eq!(installed.call::<String>(scope, ())?, "expectedReturnValue");
        assert_eq!(
            scope.evaluate::<String>("stringNoArgLambda()")?,
            "expectedReturnValue"
        );
        Ok(())
    });
}

#[test]
fn host_functions_can_reenter_the_bridge() {
    with_fixture(|scope| {
        let doubled = scope.function("doubledValue", |scope, args| {
            let object: Rc<SimpleObject<H>> = args.get(scope, 0)?;
            let same: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
            assert!(Rc::ptr_eq(&object, &same));
            let value: f64 = object.get(scope, "value")?;
            (value * 2.0).to_script(scope)
        })?;
        scope.set("doubledValue", doubled)?;
        assert_eq!(scope.evaluate::<f64>("doubledValue(simpleObjectInstance)")?, 14.0);
        Ok(())
    });
}

#[test]
fn simple_exception() {
    with_fixture(|scope| {
        match scope.call::<()>("throwSimpleError", ()) {
            Err(BridgeError::Script(failure)) => {
                assert_eq!(failure.message, "Error: Simple error message");
                assert!(failure.thrown.get::<H>().is_some());
            }
            other => panic!("expected a script failure, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn special_exception() {
    with_fixture(|scope| {
        match scope.call::<()>("throwSpecialError", ()) {
            Err(BridgeError::Typed(exception)) => {
                assert_eq!(exception.type_name, "SpecialError");
                assert_eq!(exception.message, "Special error message");
                assert!(exception.is::<SpecialError<H>>());
                let facade = exception.facade::<SpecialError<H>>().expect("facade");
                assert_eq!(facade.get::<String>(scope, "message")?, "Special error message");
            }
            other => panic!("expected a typed exception, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn host_function_errors_rethrow_the_original_value() {
    with_fixture(|scope| {
        let relay = scope.function("relay", |scope, _| {
            scope.call::<()>("throwSpecialError", ())?;
            Ok(ScriptValue::Undefined)
        })?;
        scope.set("relay", relay)?;
        assert!(scope.evaluate::<bool>(
            "(() => { try { relay(); return false; } catch (e) { return e instanceof SpecialError; } })()"
        )?);

        let strict = scope.function("strict", |scope, args| {
            let flag: bool = args.get(scope, 0)?;
            flag.to_script(scope)
        })?;
        scope.set("strict", strict)?;
        let message = scope.evaluate::<String>(
            "(() => { try { strict('yes'); return ''; } catch (e) { return e.message; } })()",
        )?;
        assert!(message.contains("type mismatch"), "{message}");
        Ok(())
    });
}

#[test]
fn objects() {
    with_fixture(|scope| {
        let constructor: Rc<ScriptFunction<H>> = scope.get("SimpleObject")?;
        constructor.invoke::<()>(scope, "staticVoidNoArgMethod", ())?;
        assert!(constructor.get::<bool>(scope, "staticVoidNoArgMethodCalled")?);

        let instance: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
        assert_eq!(
            instance.invoke::<f64>(scope, "numberSingleObjectArgMethod", (instance.clone(),))?,
            49.0
        );

        let two: Rc<SimpleObject<H>> = scope.construct((2,))?;
        assert_eq!(
            instance.invoke::<f64>(scope, "numberSingleObjectArgMethod", (two,))?,
            14.0
        );

        let again: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
        assert!(Rc::ptr_eq(&instance, &again));
        let upcast: HostValue = instance.invoke(scope, "upcastThisToObject", ())?;
        assert_eq!(upcast, HostValue::Object(instance.clone()));
        Ok(())
    });
}

#[test]
fn round_trip_returns_the_same_facade() {
    with_fixture(|scope| {
        let facade: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
        let handle = facade.clone().to_script(scope)?;
        let back: Rc<SimpleObject<H>> = scope.to_host_as(handle)?;
        assert!(Rc::ptr_eq(&facade, &back));
        Ok(())
    });
}

#[test]
fn inheritance() {
    with_fixture(|scope| {
        let plain: Rc<SimpleObject<H>> = scope.construct((5,))?;
        plain.invoke::<()>(scope, "callOverriddenMethod", ())?;
        assert!(plain.get::<bool>(scope, "methodToOverrideCalled")?);

        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let overridden: Rc<SimpleObject<H>> = scope.construct_with_overrides(
            (5,),
            MirrorBuilder::new().method("methodToOverride", move |_, _| {
                flag.set(true);
                Ok(ScriptValue::Undefined)
            }),
        )?;
        overridden.invoke::<()>(scope, "callOverriddenMethod", ())?;
        assert!(called.get());
        assert!(!overridden.get::<bool>(scope, "methodToOverrideCalled")?);
        assert_eq!(overridden.get::<i32>(scope, "value")?, 5);

        let delegating: Rc<SimpleObject<H>> = scope.construct_with_overrides(
            (5,),
            MirrorBuilder::new().method("methodToOverride", |scope, args| {
                scope.invoke_super::<()>(&receiver(&args.this), "methodToOverride", ())?;
                Ok(ScriptValue::Undefined)
            }),
        )?;
        delegating.invoke::<()>(scope, "methodToOverride", ())?;
        assert!(delegating.get::<bool>(scope, "methodToOverrideCalled")?);
        Ok(())
    });
}

#[test]
fn interface() {
    with_fixture(|scope| {
        let script_side: Rc<SimpleInterface<H>> = scope.get("simpleInterfaceInstance")?;
        script_side.invoke::<()>(scope, "voidNoArgMethod", ())?;
        assert!(scope.get::<bool>("simpleInterfaceInstanceCalled")?);

        let recorder = Rc::new(Recorder::default());
        let listener: Rc<dyn Listener> = recorder.clone();
        scope.call::<()>("acceptSimpleInterface", (listener.clone(),))?;
        assert_eq!(recorder.calls.get(), 1);

        let stored: Rc<SimpleInterface<H>> = scope.get("simpleInterfaceInstance")?;
        stored.invoke::<()>(scope, "voidNoArgMethod", ())?;
        assert_eq!(recorder.calls.get(), 2);

        scope.set("optionalAnyVar", listener.clone())?;
        assert!(scope.evaluate::<bool>("optionalAnyVar === simpleInterfaceInstance")?);

        let mirror = scope.get::<ScriptValue<H>>("simpleInterfaceInstance")?;
        let unwrapped = scope
            .unwrap_mirror::<dyn Listener>(&mirror)?
            .expect("mirror origin");
        assert!(Rc::ptr_eq(&unwrapped, &listener));
        Ok(())
    });
}

#[test]
fn mirror_outlived_by_script_stops_dispatching() {
    let runtime = fixture();
    let recorder = Rc::new(Recorder::default());
    runtime
        .scope(|scope| -> BridgeResult<()> {
            let listener: Rc<dyn Listener> = recorder.clone();
            scope.set("optionalAnyVar", listener)?;
            scope.evaluate::<()>("optionalAnyVar.voidNoArgMethod()")
        })
        .unwrap()
        .unwrap();
    assert_eq!(recorder.calls.get(), 1);

    let weak = Rc::downgrade(&recorder);
    drop(recorder);
    assert!(weak.upgrade().is_none());
    assert!(runtime.collect_garbage() >= 2);

    runtime
        .scope(|scope| -> BridgeResult<()> {
            scope.evaluate::<()>("optionalAnyVar.voidNoArgMethod()")?;
            let mirror = scope.get::<ScriptValue<H>>("optionalAnyVar")?;
            assert!(scope.unwrap_mirror::<dyn Listener>(&mirror)?.is_none());
            Ok(())
        })
        .unwrap()
        .unwrap();
}

#[test]
fn weak_collection() {
    let runtime = fixture();
    let (dropped, kept) = runtime
        .scope(|scope| -> BridgeResult<_> {
            let dropped: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
            let kept: Rc<SimpleObject<H>> = scope.get("optionalAnyObjectInstance")?;
            Ok((Rc::downgrade(&dropped), kept))
        })
        .unwrap()
        .unwrap();
    assert!(dropped.upgrade().is_none());

    assert_eq!(runtime.collect_garbage(), 1);
    assert_eq!(runtime.bridge().live_facades(), 1);

    runtime
        .scope(|scope| -> BridgeResult<()> {
            let fresh: Rc<SimpleObject<H>> = scope.get("simpleObjectInstance")?;
            assert_eq!(fresh.get::<i32>(scope, "value")?, 7);
            let same: Rc<SimpleObject<H>> = scope.get("optionalAnyObjectInstance")?;
            assert!(Rc::ptr_eq(&kept, &same));
            Ok(())
        })
        .unwrap()
        .unwrap();
    drop(kept);
}

#[test]
fn script_object_released_with_its_last_facade() {
    let runtime = fixture();
    runtime
        .scope(|scope| -> BridgeResult<()> {
            let temporary: Rc<SimpleObject<H>> = scope.construct((1,))?;
            scope.set("optionalAnyVar", temporary.clone())?;
            drop(temporary);
            scope.set("optionalAnyVar", None::<f64>)?;
            Ok(())
        })
        .unwrap()
        .unwrap();
    runtime.collect_garbage();
    assert_eq!(runtime.bridge().identity_len(), 0);
}

#[test]
fn cyclic_script_objects_freed_by_one_collection() {
    let runtime = fixture();
    runtime.collect_garbage();
    let baseline = runtime.object_count();

    let cycles = runtime
        .scope(|scope| -> BridgeResult<Vec<Rc<ScriptObject<H>>>> {
            let array: Rc<ScriptArray<H>> = scope.evaluate(
                "Array.from({ length: 200 }, () => { const node = {}; node.self = node; return node; })",
            )?;
            array.to_vec(scope)
        })
        .unwrap()
        .unwrap();
    assert!(runtime.object_count() >= baseline + 200);
    assert_eq!(runtime.bridge().live_facades(), 200);

    drop(cycles);
    assert!(runtime.collect_garbage() >= 200);
    assert!(
        runtime.object_count() < baseline + 20,
        "{} objects left, {baseline} before",
        runtime.object_count()
    );
}

#[test]
fn host_error_that_cannot_be_rethrown_becomes_a_script_error() {
    let foreign = ScriptRuntime::new().unwrap();
    let runtime = fixture();
    let stray = foreign
        .scope(|scope| scope.evaluate::<ScriptValue<H>>("new Error('elsewhere')"))
        .unwrap()
        .unwrap();

    runtime
        .scope(|scope| -> BridgeResult<()> {
            let fail = scope.function("fail", move |_, _| {
                Err(BridgeError::Script(ScriptFailure {
                    message: "elsewhere".into(),
                    thrown: ThrownValue::new(stray.clone()),
                }))
            })?;
            scope.set("fail", fail)?;
            let message = scope.evaluate::<String>(
                "(() => { try { fail(); return ''; } catch (e) { return e.message; } })()",
            )?;
            assert!(message.contains("failed to rethrow host error"), "{message}");
            Ok(())
        })
        .unwrap()
        .unwrap();
}

#[test]
fn bridge_clear_releases_every_handle() {
    let runtime = fixture();
    assert!(runtime.live_handles() > 0);
    assert!(runtime.bridge().registered_types() > 0);

    runtime.bridge().clear();
    assert_eq!(runtime.live_handles(), 0);
    assert_eq!(runtime.bridge().registered_types(), 0);
    assert_eq!(runtime.bridge().identity_len(), 0);
}

#[test]
fn facade_outliving_its_runtime_is_tolerated() {
    let runtime = fixture();
    let baseline = runtime.live_handles();
    let escaped: Rc<SimpleObject<H>> = runtime
        .scope(|scope| scope.get("simpleObjectInstance"))
        .unwrap()
        .unwrap();
    assert_eq!(runtime.live_handles(), baseline + 1);

    drop(runtime);
    drop(escaped);
}

#[test]
fn box_scenario() {
    with_fixture(|scope| {
        let value = scope.get::<HostValue>("boxInstance")?;
        let boxed = value.downcast::<Boxed<H>>().expect("Box facade");
        assert_eq!(scope.member::<i32>(&boxed.handle, "value")?, 5);

        scope.set("roundTrip", boxed.clone())?;
        assert!(scope.evaluate::<bool>("roundTrip === boxInstance")?);

        let fresh = scope.evaluate::<HostValue>("new Box(6)")?;
        assert!(fresh.is::<Boxed<H>>());
        assert_ne!(fresh, value);
        Ok(())
    });
}

#[test]
fn nearest_registered_constructor_wins() {
    with_fixture(|scope| {
        let derived = scope.get::<HostValue>("derivedObjectInstance")?;
        assert!(derived.is::<DerivedObject<H>>());

        let as_derived: Rc<DerivedObject<H>> = scope.get("derivedObjectInstance")?;
        let as_base: Rc<SimpleObject<H>> = scope.get("derivedObjectInstance")?;
        assert!(scope.same_entity(&*as_derived, &*as_base)?);
        assert_eq!(as_base.get::<i32>(scope, "value")?, 3);

        assert!(scope.evaluate::<HostValue>("({})")?.is::<ScriptObject<H>>());
        assert!(scope
            .evaluate::<HostValue>("Object.create(null)")?
            .is::<ScriptObject<H>>());
        assert!(scope.evaluate::<HostValue>("[1, 2]")?.is::<ScriptArray<H>>());
        assert!(scope
            .evaluate::<HostValue>("(() => 1)")?
            .is::<ScriptFunction<H>>());
        Ok(())
    });
}

#[test]
fn conversion_errors() {
    with_fixture(|scope| {
        assert!(matches!(
            scope.get::<bool>("stringConst"),
            Err(BridgeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scope.evaluate::<i32>("1.5"),
            Err(BridgeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scope.get::<Rc<DerivedObject<H>>>("simpleObjectInstance"),
            Err(BridgeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            scope.set("anyVar", Rc::new(Unregistered)),
            Err(BridgeError::UnsupportedType { .. })
        ));
        assert!(matches!(
            scope.register::<SimpleObject<H>>(),
            Err(BridgeError::DuplicateRegistration { .. })
        ));

        struct Missing<H> {
            handle: H,
        }
        define_facade!(Missing, "NoSuchConstructor");
        assert!(matches!(
            scope.register::<Missing<H>>(),
            Err(BridgeError::UnknownConstructor { .. })
        ));
        Ok(())
    });
}

#[test]
fn generic_facades() {
    with_fixture(|scope| {
        let object: Rc<ScriptObject<H>> = scope.evaluate("({ a: 1, b: 'x' })")?;
        assert_eq!(object.keys(scope)?, vec!["a", "b"]);
        let entries = object.entries(scope)?;
        assert_eq!(entries[0], ("a".to_string(), HostValue::Number(1.0)));
        assert_eq!(entries[1], ("b".to_string(), HostValue::String("x".into())));

        let array: Rc<ScriptArray<H>> = scope.get("numberArrayVar")?;
        array.push(scope, 4)?;
        array.set_item(scope, 0, 8)?;
        assert_eq!(array.len(scope)?, 1);
        assert_eq!(array.item::<i32>(scope, 0)?, 8);

        let global = scope.load("var loadedLater = 3;")?;
        assert_eq!(global.get::<i32>(scope, "loadedLater")?, 3);
        Ok(())
    });
}

#[test]
fn host_function_after_bridge_drop() {
    with_fixture(|scope| {
        let orphan = {
            let other = Bridge::new(scope.engine(), BridgeSettings::default())?;
            let orphan = other
                .scope(scope.engine())
                .function("orphan", |_, _| Ok(ScriptValue::Undefined))?;
            scope.set("orphan", orphan.clone())?;
            orphan
        };
        match scope.call::<()>("orphan", ()) {
            Err(BridgeError::Script(failure)) => {
                assert!(failure.message.contains("bridge was dropped"), "{}", failure.message)
            }
            other => panic!("expected a script failure, got {other:?}"),
        }
        drop(orphan);
        Ok(())
    });
}
