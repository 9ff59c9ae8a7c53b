//! Integration tests for the interception registry and the table provider.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};

use modhub_bridge::locator::{self, ResolveStrategy};
use modhub_bridge::module::{BridgeModule, ModuleRef};
use modhub_bridge::registry::ModuleRegistry;
use modhub_core::error::HubError;
use modhub_patch::descriptor::PatchDescriptor;
use modhub_patch::registry::InterceptRegistry;
use modhub_patch::table::TablePatchProvider;

fn intercept() -> InterceptRegistry {
    InterceptRegistry::new(Arc::new(TablePatchProvider::new()))
}

fn audio_module() -> ModuleRef {
    Arc::new(
        BridgeModule::builder("RTNAudioManager")
            .method("requestAudioFocus", |_, _| Ok(json!(1)))
            .method("setMode", |_, args| {
                Ok(args.first().cloned().unwrap_or(Value::Null))
            })
            .build(),
    )
}

#[test]
fn test_handles_restore_in_arbitrary_order() {
    let registry = intercept();
    let module = audio_module();
    let focus_before = module.member("requestAudioFocus").unwrap();
    let set_mode_before = module.member("setMode").unwrap();

    let set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(10))),
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(20))),
            PatchDescriptor::replace("setMode", |_, _| Ok(json!("patched"))),
        ],
    );
    assert_eq!(set.len(), 3);

    // Restore out of application order: last, first, middle.
    set.handles()[2].restore();
    assert_eq!(module.call("setMode", &[json!(1)]).unwrap(), json!(1));
    assert_eq!(module.call("requestAudioFocus", &[]).unwrap(), json!(20));

    set.handles()[0].restore();
    assert_eq!(module.call("requestAudioFocus", &[]).unwrap(), json!(20));

    set.handles()[1].restore();
    assert_eq!(module.call("requestAudioFocus", &[]).unwrap(), json!(1));

    assert!(Arc::ptr_eq(
        &module.member("requestAudioFocus").unwrap(),
        &focus_before
    ));
    assert!(Arc::ptr_eq(&module.member("setMode").unwrap(), &set_mode_before));
}

#[test]
fn test_double_restore_does_not_clobber_other_patches() {
    let registry = intercept();
    let module = audio_module();

    let set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(10))),
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(20))),
        ],
    );

    set.handles()[0].restore();
    set.handles()[0].restore();

    // The second patch is still the one in effect.
    assert_eq!(module.call("requestAudioFocus", &[]).unwrap(), json!(20));
    assert_eq!(set.live_count(), 1);
}

#[test]
fn test_aggregate_restore_returns_every_slot() {
    let registry = intercept();
    let module = audio_module();
    let focus_before = module.member("requestAudioFocus").unwrap();
    let set_mode_before = module.member("setMode").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![
            PatchDescriptor::replace("requestAudioFocus", |_, _| Ok(json!(0))),
            PatchDescriptor::after("setMode", move |_, _, result| {
                seen_clone.lock().unwrap().push(result.clone());
                Ok(())
            }),
        ],
    );

    module.call("setMode", &[json!(7)]).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![json!(7)]);

    registry.deactivate(&set);
    registry.deactivate(&set);

    assert!(Arc::ptr_eq(
        &module.member("requestAudioFocus").unwrap(),
        &focus_before
    ));
    assert!(Arc::ptr_eq(&module.member("setMode").unwrap(), &set_mode_before));

    // The after handler is detached along with everything else.
    module.call("setMode", &[json!(9)]).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_original_runs_before_after_handler_observes() {
    let registry = intercept();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let original_order = Arc::clone(&order);
    let module: ModuleRef = Arc::new(
        BridgeModule::builder("Ordered")
            .method("work", move |_, _| {
                original_order.lock().unwrap().push("original");
                Ok(json!(42))
            })
            .build(),
    );

    let handler_order = Arc::clone(&order);
    let _set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![PatchDescriptor::after("work", move |_, args, result| {
            assert!(args.is_empty());
            assert_eq!(*result, json!(42));
            handler_order.lock().unwrap().push("after");
            Ok(())
        })],
    );

    module.call("work", &[]).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["original", "after"]);
}

#[test]
fn test_failing_original_propagates_and_skips_handler() {
    let registry = intercept();
    let handler_ran = Arc::new(AtomicBool::new(false));

    let module: ModuleRef = Arc::new(
        BridgeModule::builder("Flaky")
            .method("work", |_, _| Err(HubError::bridge("native call failed")))
            .build(),
    );

    let flag = Arc::clone(&handler_ran);
    let _set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![PatchDescriptor::after("work", move |_, _, _| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })],
    );

    let err = module.call("work", &[]).unwrap_err();
    assert_eq!(err.kind, modhub_core::error::ErrorKind::Bridge);
    assert!(!handler_ran.load(Ordering::SeqCst));
}

#[test]
fn test_locator_strategies_short_circuit() {
    let modules = Arc::new(ModuleRegistry::new());
    modules
        .register(audio_module())
        .expect("audio module registers");

    let third_evaluated = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&third_evaluated);
    let strategies: Vec<ResolveStrategy> = vec![
        locator::by_name(&modules, "NativeAudioManagerModule"),
        locator::by_members(&modules, &["setMode", "requestAudioFocus"]),
        Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            None
        }),
    ];

    let resolved = intercept().resolve_target(&strategies);
    assert_eq!(resolved.expect("second strategy hits").name(), "RTNAudioManager");
    assert!(!third_evaluated.load(Ordering::SeqCst));
}

#[test]
fn test_erroring_after_handler_never_breaks_callers() {
    let registry = intercept();
    let module = audio_module();

    let set = registry.activate_all(
        Some(Arc::clone(&module)),
        vec![PatchDescriptor::after("setMode", |_, _, _| {
            Err(HubError::tweak("observer always fails"))
        })],
    );

    for value in [1, 2, 3] {
        assert_eq!(
            module.call("setMode", &[json!(value)]).unwrap(),
            json!(value)
        );
    }

    registry.deactivate(&set);
    assert_eq!(module.call("setMode", &[json!(4)]).unwrap(), json!(4));
}
