//! Model Service Integration Tests
//!
//! Tests for:
//! - Seat mounting through bone hit-boxes
//! - Skin part application across the async / main-context boundary
//! - World-space getters
//! - Service configuration

use std::sync::Arc;

use futures::executor::block_on;
use futures::future::poll_immediate;
use glam::Vec3;

use boneweave::{
    BoneKey, EntityId, ErrorKind, Immediate, LoopMode, MainContext, ModelService, PlayerLimb,
    ServiceConfig,
};
use boneweave_dev_utils::{
    DiscardingExecutor, MockRegistry, MockTracker, QueuedExecutor, StaticSkinResolver, init_logger,
    robot_registry,
};

fn setup_with(main: Arc<dyn MainContext>) -> (ModelService, Arc<MockRegistry>, EntityId, Arc<MockTracker>) {
    init_logger();
    let (registry, entity, tracker) = robot_registry();
    let service = ModelService::new(Arc::clone(&registry) as _, main, ServiceConfig::default())
        .unwrap();
    (service, registry, entity, tracker)
}

fn setup() -> (ModelService, Arc<MockRegistry>, EntityId, Arc<MockTracker>) {
    setup_with(Arc::new(Immediate))
}

// ============================================================================
// Seats
// ============================================================================

#[test]
fn mount_requires_a_hit_box() {
    let (service, _, entity, _) = setup();
    let head = service.resolve_controller(entity, "robot", "head").unwrap();
    let err = service.mount(&head, EntityId::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityAbsent);
}

#[test]
fn mount_then_dismount_all_clears_seat() {
    let (service, _, entity, _) = setup();
    let seat = service.resolve_controller(entity, "robot", "p_seat").unwrap();
    let rider = EntityId::new_v4();

    service.mount(&seat, rider).unwrap();
    assert_eq!(seat.passengers().unwrap(), vec![rider]);

    service.dismount_all(&seat).unwrap();
    assert!(seat.passengers().unwrap().is_empty());
}

#[test]
fn dismount_removes_one_rider() {
    let (service, _, entity, _) = setup();
    let seat = service.resolve_controller(entity, "robot", "p_seat").unwrap();
    let rider = EntityId::new_v4();

    service.mount(&seat, rider).unwrap();
    service.dismount(&seat, rider).unwrap();
    assert!(seat.passengers().unwrap().is_empty());
}

// ============================================================================
// Skin Parts
// ============================================================================

#[test]
fn skin_part_is_applied_and_refreshed() {
    let (service, _, entity, tracker) = setup();
    let resolver = Arc::new(StaticSkinResolver::texture("notch.png"));
    let service = service.with_skin_resolver(resolver.clone());
    let source = EntityId::new_v4();
    let key = BoneKey::new(entity, "robot", "head").unwrap();

    let changed = block_on(service.apply_skin_part(key, PlayerLimb::Head, source)).unwrap();
    assert!(changed);
    assert_eq!(resolver.calls(), 1);
    assert_eq!(tracker.refresh_count(), 1);

    let (limb, skin) = tracker.mock_bone("head").unwrap().applied().skin.unwrap();
    assert_eq!(limb, PlayerLimb::Head);
    assert_eq!(skin.owner, source);
    assert_eq!(skin.texture, "notch.png");
}

#[test]
fn skin_continuation_waits_for_main_context() {
    let main = Arc::new(QueuedExecutor::new());
    let (service, _, entity, tracker) = setup_with(main.clone());
    let service = service.with_skin_resolver(Arc::new(StaticSkinResolver::texture("alex.png").threaded()));
    let key = BoneKey::new(entity, "robot", "right_arm").unwrap();

    let mut pending = Box::pin(service.apply_skin_part(key, PlayerLimb::RightArm, EntityId::new_v4()));

    // Poll until the resolved skin has been handed to the main context.
    while main.pending() == 0 {
        assert!(block_on(poll_immediate(&mut pending)).is_none());
        std::thread::yield_now();
    }
    assert!(tracker.mock_bone("right_arm").unwrap().applied().skin.is_none());

    assert_eq!(main.run_pending(), 1);
    assert!(block_on(pending).unwrap());
    assert!(tracker.mock_bone("right_arm").unwrap().applied().skin.is_some());
}

#[test]
fn skin_continuation_after_close_is_not_applicable() {
    let main = Arc::new(QueuedExecutor::new());
    let (service, registry, entity, _) = setup_with(main.clone());
    let service = service.with_skin_resolver(Arc::new(StaticSkinResolver::texture("steve.png")));
    let key = BoneKey::new(entity, "robot", "head").unwrap();

    let mut pending = Box::pin(service.apply_skin_part(key, PlayerLimb::Head, EntityId::new_v4()));
    assert!(block_on(poll_immediate(&mut pending)).is_none());

    registry.close(entity, "robot");
    main.run_pending();

    let err = block_on(pending).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotApplicable);
}

#[test]
fn failed_skin_resolution_is_transient() {
    let (service, _, entity, tracker) = setup();
    let resolver = Arc::new(StaticSkinResolver::failing("profile service timed out"));
    let service = service.with_skin_resolver(resolver.clone());
    let key = BoneKey::new(entity, "robot", "head").unwrap();

    let err = block_on(service.apply_skin_part(key, PlayerLimb::Head, EntityId::new_v4())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientResolutionFailure);
    assert!(err.to_string().contains("profile service timed out"));
    // Reported once, never retried.
    assert_eq!(resolver.calls(), 1);
    assert_eq!(tracker.refresh_count(), 0);
}

#[test]
fn dropped_continuation_is_transient() {
    let (service, _, entity, _) = setup_with(Arc::new(DiscardingExecutor));
    let service = service.with_skin_resolver(Arc::new(StaticSkinResolver::texture("steve.png")));
    let key = BoneKey::new(entity, "robot", "head").unwrap();

    let err = block_on(service.apply_skin_part(key, PlayerLimb::Head, EntityId::new_v4())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientResolutionFailure);
}

#[test]
fn skin_part_needs_a_display() {
    let (service, _, entity, _) = setup();
    let service = service.with_skin_resolver(Arc::new(StaticSkinResolver::texture("steve.png")));
    let key = BoneKey::new(entity, "robot", "body").unwrap();

    let err = block_on(service.apply_skin_part(key, PlayerLimb::Body, EntityId::new_v4())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityAbsent);
}

// ============================================================================
// Getters
// ============================================================================

#[test]
fn world_getters_follow_the_bone() {
    let (service, _, entity, tracker) = setup();
    assert_eq!(
        service.bone_world_position(entity, "robot", "head"),
        Some(Vec3::new(0.0, 1.8, 0.0))
    );
    assert_eq!(service.bone_world_rotation(entity, "robot", "head"), Some(Vec3::ZERO));
    assert_eq!(service.bone_world_position(entity, "robot", "tail"), None);

    assert!(service.is_bone_visible(entity, "robot", "head"));
    // No display backing the bone.
    assert!(!service.is_bone_visible(entity, "robot", "body"));

    let display = tracker.mock_bone("head").unwrap().mock_display().unwrap();
    display.set_invisible(true);
    assert!(!service.is_bone_visible(entity, "robot", "head"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn invalid_config_is_rejected() {
    let (registry, _, _) = robot_registry();
    let config = ServiceConfig {
        default_speed: -1.0,
        ..ServiceConfig::default()
    };
    let err = ModelService::new(registry as _, Arc::new(Immediate), config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
}

#[test]
fn config_defaults_feed_modifiers() {
    let (registry, _, _) = robot_registry();
    let config = ServiceConfig::from_json_str(r#"{ "default_loop_mode": "hold_on_last" }"#).unwrap();
    let service = ModelService::new(registry as _, Arc::new(Immediate), config).unwrap();

    let modifier = service.default_modifier().unwrap();
    assert_eq!(modifier.loop_mode(), LoopMode::HoldOnLast);
    assert_eq!(modifier.blend_in_ticks(), 1);
}
