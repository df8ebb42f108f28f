//! Controller Cache Integration Tests
//!
//! Tests for:
//! - Controller identity across repeated and concurrent resolution
//! - Eviction on model-instance closure reported by the registry
//! - Fresh default state after a close/reopen cycle
//! - Encoded bone keys resolving to the same controller
//! - Unknown names never outliving the call that passed them

use std::sync::Arc;

use boneweave::{
    AnimationModifier, BoneFilter, BoneKey, EntityId, ErrorKind, Immediate, LoopMode, ModelService,
    ServiceConfig,
};
use boneweave_dev_utils::{MockRegistry, MockTracker, init_logger, robot, robot_registry};

fn setup() -> (ModelService, Arc<MockRegistry>, EntityId, Arc<MockTracker>) {
    init_logger();
    let (registry, entity, tracker) = robot_registry();
    let service = ModelService::new(
        Arc::clone(&registry) as _,
        Arc::new(Immediate),
        ServiceConfig::default(),
    )
    .unwrap();
    (service, registry, entity, tracker)
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn resolve_returns_identical_controller() {
    let (service, _, entity, _) = setup();
    let a = service.resolve_controller(entity, "robot", "head").unwrap();
    let b = service.resolve_controller(entity, "robot", "head").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn concurrent_resolution_shares_one_controller() {
    let (service, _, entity, tracker) = setup();

    let controllers: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| scope.spawn(|| service.resolve_controller(entity, "robot", "body").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &controllers[0];
    assert!(controllers.iter().all(|c| Arc::ptr_eq(c, first)));
    assert_eq!(service.cache().len(), 1);
    assert_eq!(tracker.mock_bone("body").unwrap().modifier_count(), 1);
}

#[test]
fn encoded_key_resolves_to_same_controller() {
    let (service, _, entity, _) = setup();
    let direct = service.resolve_controller(entity, "robot", "right_arm").unwrap();

    let key: BoneKey = format!("bone@{entity},robot,right_arm").parse().unwrap();
    let parsed = service.controller(&key).unwrap();
    assert!(Arc::ptr_eq(&direct, &parsed));
}

#[test]
fn unresolvable_bone_is_not_applicable() {
    let (service, _, entity, _) = setup();
    let err = service.resolve_controller(entity, "robot", "tail").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotApplicable);

    let err = service.resolve_controller(entity, "ro,bot", "head").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert!(service.cache().is_empty());
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn registry_close_evicts_only_that_instance() {
    let (service, registry, entity, _) = setup();
    let (other_entity, other_tracker) = robot();
    registry.attach(other_tracker);

    for bone in ["head", "body", "p_seat"] {
        service.resolve_controller(entity, "robot", bone).unwrap();
    }
    let survivor = service.resolve_controller(other_entity, "robot", "head").unwrap();

    assert!(registry.close(entity, "robot"));
    assert_eq!(service.cache().keys(), vec![survivor.key().clone()]);
}

#[test]
fn close_and_reopen_starts_from_defaults() {
    let (service, registry, entity, tracker) = setup();
    let head = service.resolve_controller(entity, "robot", "head").unwrap();
    head.set_glow(true);
    assert_eq!(head.state().glow, Some(true));

    registry.close(entity, "robot");
    assert!(service.resolve_controller(entity, "robot", "head").is_err());

    registry.attach(tracker);
    let reopened = service.resolve_controller(entity, "robot", "head").unwrap();
    assert!(!Arc::ptr_eq(&head, &reopened));
    assert_eq!(reopened.state().glow, None);
}

#[test]
fn manual_close_hook_and_shutdown() {
    let (service, _, entity, _) = setup();
    service.resolve_controller(entity, "robot", "head").unwrap();
    service.resolve_controller(entity, "robot", "body").unwrap();

    assert_eq!(service.on_instance_closed(entity, "robot"), 2);
    service.resolve_controller(entity, "robot", "head").unwrap();
    service.shutdown();
    assert!(service.cache().is_empty());
}

#[test]
fn dropped_service_unsubscribes_from_closure() {
    let (service, registry, entity, _) = setup();
    let second = ModelService::new(
        Arc::clone(&registry) as _,
        Arc::new(Immediate),
        ServiceConfig::default(),
    )
    .unwrap();
    service.resolve_controller(entity, "robot", "head").unwrap();
    assert_eq!(registry.listener_count(), 2);

    drop(service);
    assert_eq!(registry.listener_count(), 1);
    assert!(registry.close(entity, "robot"));

    drop(second);
    assert_eq!(registry.listener_count(), 0);
}

// ============================================================================
// Unknown Names
// ============================================================================

#[test]
fn unknown_names_leave_nothing_behind() {
    let (service, _, entity, tracker) = setup();
    let all = BoneFilter::all();
    let once = AnimationModifier::builder().build().unwrap();

    for i in 0..1000 {
        let ghost = format!("ghost_{i}");
        assert!(!service.is_bone_visible(entity, "robot", &ghost));
        assert!(service.resolve_controller(entity, &ghost, "head").is_err());
        assert!(!service.start_animation(entity, "robot", &ghost, &all, &once).unwrap());
        assert!(!service.stop_animation(entity, "robot", &ghost, &all).unwrap());
    }

    assert!(service.cache().is_empty());
    tracker.with_layers(|layers| {
        assert!(layers.is_empty());
        assert_eq!(layers.interned_names(), 0);
    });
}

#[test]
fn stopped_layers_release_their_names() {
    let (service, _, entity, tracker) = setup();
    let walk = AnimationModifier::builder().loop_mode(LoopMode::Loop).build().unwrap();
    service
        .start_animation(entity, "robot", "walk", &BoneFilter::names(["left_leg"]), &walk)
        .unwrap();
    tracker.with_layers(|layers| assert_eq!(layers.interned_names(), 2));

    service
        .stop_animation(entity, "robot", "walk", &BoneFilter::all())
        .unwrap();
    tracker.with_layers(|layers| assert_eq!(layers.interned_names(), 0));
}
