use std::sync::Arc;

use futures::executor::block_on;
use glam::Quat;

use boneweave::animation::PlayheadEvent;
use boneweave::{
    AnimationModifier, BoneFilter, EntityId, LoopMode, ModelService, ObserverId, Payload,
    PlayerLimb, ServiceConfig,
};
use boneweave_dev_utils::{QueuedExecutor, StaticSkinResolver, robot_registry};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let (registry, robot, tracker) = robot_registry();
    let main_context = Arc::new(QueuedExecutor::new());
    let service = ModelService::new(
        Arc::clone(&registry) as _,
        Arc::clone(&main_context) as _,
        ServiceConfig::default(),
    )?
    .with_skin_resolver(Arc::new(StaticSkinResolver::texture("steve.png").threaded()));

    // === 1. Overlays ===
    let head = service.resolve_controller(robot, "robot", "head")?;
    service.dispatch_mechanism(&head, "tint", &Payload::Int(0x00FF_5500))?;
    service.dispatch_mechanism(&head, "tint", &Payload::Int(0x00FF_5500))?;
    service.dispatch_mechanism(&head, "rotate", &Payload::Quaternion(Quat::from_rotation_y(0.5)))?;
    service.dispatch_mechanism(&head, "brightness", &Payload::from(vec![15_i64, 15]))?;
    log::info!("Head state: {:?}", head.state());
    log::info!("Refreshes so far: {}", tracker.refresh_count());

    if let Err(e) = service.dispatch_mechanism(&head, "explode", &Payload::Bool(true)) {
        log::info!("Rejected as expected: {e}");
    }

    // === 2. Per-observer visibility ===
    let alice = ObserverId::new_v4();
    let bob = ObserverId::new_v4();
    tracker.add_viewer(alice);
    tracker.add_viewer(bob);
    service.dispatch_mechanism(
        &head,
        "visible",
        &Payload::List(vec![Payload::Bool(false), Payload::Observer(alice)]),
    )?;
    log::info!("Packets for alice: {:?}", tracker.packets().for_observer(alice));
    log::info!("Packets for bob: {:?}", tracker.packets().for_observer(bob));

    // === 3. Layered animations ===
    let legs = BoneFilter::names(["left_leg", "right_leg"]);
    let arm = BoneFilter::names(["right_arm"]);
    let walk = AnimationModifier::builder().loop_mode(LoopMode::Loop).build()?;
    let wave = service.default_modifier()?;

    service.start_animation(robot, "robot", "walk", &legs, &walk)?;
    service.start_animation(robot, "robot", "wave", &arm, &wave)?;
    for _ in 0..2 {
        for event in tracker.tick(12.0) {
            log::info!("Layer event: {event:?}");
            if event.event == PlayheadEvent::Wrapped {
                let reapplied = service.reapply_overlays(robot, "robot")?;
                log::info!("Reapplied {reapplied} overlays after '{}' looped", event.animation);
            }
        }
    }
    service.stop_animation(robot, "robot", "walk", &legs)?;
    log::info!(
        "Running after stopping walk: {:?}",
        service.running_animation(robot, "robot")?
    );

    // === 4. Seats ===
    let seat = service.resolve_controller(robot, "robot", "p_seat")?;
    let rider = EntityId::new_v4();
    service.mount(&seat, rider)?;
    log::info!("Seat passengers: {:?}", seat.passengers()?);
    service.dismount_all(&seat)?;
    if let Err(e) = service.mount(&head, rider) {
        log::info!("Rejected as expected: {e}");
    }

    // === 5. Skin parts ===
    let arm_key = service.resolve_controller(robot, "robot", "right_arm")?.key().clone();
    let mut pending = Box::pin(service.apply_skin_part(arm_key, PlayerLimb::RightArm, alice));
    // Drive the request and the main context in turn, like a server tick loop.
    let changed = loop {
        if let Some(outcome) = block_on(futures::future::poll_immediate(&mut pending)) {
            break outcome?;
        }
        main_context.run_pending();
        std::thread::yield_now();
    };
    log::info!("Skin applied: {changed}");

    // === 6. Shutdown ===
    registry.close(robot, "robot");
    log::info!("Controllers after close: {}", service.cache().len());
    service.shutdown();
    Ok(())
}
