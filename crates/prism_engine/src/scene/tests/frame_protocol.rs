//! End-to-end tests of the frame protocol: tree lifecycle notifications,
//! physics result sync, and cascade publishing, all driven through
//! [`Scene::turn`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::foundation::math::Vec3;
use crate::lighting::DirectionalLight;
use crate::physics::{BodyDesc, Pose, RigidBody};
use crate::scene::{NodeBehavior, NodeContext, PerspectiveCamera, Scene, Transform};

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl NodeBehavior for Recorder {
    fn on_update(&mut self, _ctx: &mut NodeContext<'_>) {
        self.log.borrow_mut().push(format!("{}:update", self.name));
    }
    fn on_added_to_scene(&mut self, _ctx: &mut NodeContext<'_>) {
        self.log.borrow_mut().push(format!("{}:entered", self.name));
    }
    fn on_removed_from_scene(&mut self, _ctx: &mut NodeContext<'_>) {
        self.log.borrow_mut().push(format!("{}:leaving", self.name));
    }
    fn on_screen_resized(&mut self, _ctx: &mut NodeContext<'_>, w: u32, h: u32) {
        self.log
            .borrow_mut()
            .push(format!("{}:resized {w}x{h}", self.name));
    }
}

fn recorder(name: &'static str, log: &Log) -> Option<Box<dyn NodeBehavior>> {
    Some(Box::new(Recorder {
        name,
        log: Rc::clone(log),
    }))
}

#[test]
fn test_lifecycle_notifications_pair_exactly_once() {
    let mut scene = Scene::new(&EngineConfig::default());
    let log: Log = Default::default();
    let root = scene.root();

    let a = scene.attach(root, Transform::default(), recorder("a", &log)).unwrap();
    let _b = scene.attach(a, Transform::default(), recorder("b", &log)).unwrap();
    scene.turn();

    scene.request_detach(a);
    scene.turn();
    scene.turn();

    let entries = log.borrow();
    let count = |needle: &str| entries.iter().filter(|e| e.as_str() == needle).count();
    assert_eq!(count("a:entered"), 1);
    assert_eq!(count("b:entered"), 1);
    assert_eq!(count("a:leaving"), 1);
    assert_eq!(count("b:leaving"), 1);
}

#[test]
fn test_disabled_subtree_gets_no_dispatch() {
    let mut scene = Scene::new(&EngineConfig::default());
    let log: Log = Default::default();
    let root = scene.root();

    let a = scene.attach(root, Transform::default(), recorder("a", &log)).unwrap();
    let _b = scene.attach(a, Transform::default(), recorder("b", &log)).unwrap();
    scene.turn();
    log.borrow_mut().clear();

    scene.graph_mut().set_enabled(a, false);
    scene.turn();
    scene.screen_resized(800, 600);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_staged_physics_results_reach_the_transform() {
    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();
    let start = Vec3::new(0.0, 20.0, 0.0);
    let node = scene
        .attach(
            root,
            Transform::from_position(start),
            Some(Box::new(RigidBody::new(BodyDesc::default()))),
        )
        .unwrap();

    // The body was created at attach time, seeded from the node pose.
    let body_y = {
        let world = scene.physics().lock();
        let pose = world
            .body_pose(world_first_body(&world))
            .expect("body should exist");
        pose.position.y
    };
    assert!((body_y - 20.0).abs() < 1e-5);

    // First turn splices the node into the live tree; until then it sits
    // on the root's pending list and receives no physics-sync dispatch.
    scene.turn();

    // The world mutex serializes this step against the simulation thread.
    scene.physics().lock().step(0.25);

    scene.turn();
    let y_after = scene.graph().world_position(node).y;
    assert!(
        y_after < 20.0,
        "simulated fall should have been copied into the node, got y = {y_after}"
    );
}

// Single-body worlds only.
fn world_first_body(world: &crate::physics::PhysicsWorld) -> crate::physics::BodyId {
    world.body_ids().next().expect("world should have a body")
}

#[test]
fn test_detached_body_leaves_the_world() {
    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();
    let node = scene
        .attach(
            root,
            Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
            Some(Box::new(RigidBody::new(BodyDesc::default()))),
        )
        .unwrap();
    scene.turn();
    assert_eq!(scene.physics().lock().body_count(), 1);

    scene.request_detach(node);
    scene.turn();
    assert_eq!(scene.physics().lock().body_count(), 0);
}

#[test]
fn test_restrained_rotation_keeps_node_orientation() {
    use crate::foundation::math::Quat;

    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();
    let spin = Quat::from_axis_angle(&Vec3::x_axis(), 0.7);
    let node = scene
        .attach(
            root,
            Transform::from_position_rotation(Vec3::new(0.0, 30.0, 0.0), spin),
            Some(Box::new(
                RigidBody::new(BodyDesc::default()).restrain_rotation(),
            )),
        )
        .unwrap();
    scene.turn(); // splice into the live tree first

    {
        let mut world = scene.physics().lock();
        let body = world.body_ids().next().unwrap();
        world.set_angular_velocity(body, Vec3::new(3.0, 0.0, 0.0));
        world.step(0.25);
    }
    scene.turn();

    let rotation = scene.graph().world_rotation(node);
    assert!(
        rotation.angle_to(&spin) < 1e-4,
        "rotation should stay under manual control"
    );
    assert!(scene.graph().world_position(node).y < 30.0);
}

#[test]
fn test_cascades_published_for_active_camera() {
    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();

    let camera = scene
        .attach(
            root,
            Transform::from_position(Vec3::new(0.0, 2.0, 8.0)),
            Some(Box::new(PerspectiveCamera::new(1.1, 0.1, 1000.0))),
        )
        .unwrap();
    scene.set_active_camera(Some(camera));

    let _sun = scene
        .attach(
            root,
            Transform::from_position(Vec3::new(0.3, 1.0, 0.2)),
            Some(Box::new(DirectionalLight::with_cascades(
                Vec3::new(1.0, 0.95, 0.8),
                4,
            ))),
        )
        .unwrap();

    scene.turn(); // camera refreshes its matrices
    scene.turn(); // cascades fit against the snapshot and publish

    let lights: Vec<_> = scene.lights().iter_directional().collect();
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].1.cascades.len(), 4);
}

#[test]
fn test_light_unregisters_on_detach() {
    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();
    let sun = scene
        .attach(
            root,
            Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            Some(Box::new(DirectionalLight::new(Vec3::new(1.0, 1.0, 1.0)))),
        )
        .unwrap();
    assert_eq!(scene.lights().directional_count(), 1);

    scene.request_detach(sun);
    scene.turn();
    assert_eq!(scene.lights().directional_count(), 0);
}

#[test]
fn test_set_body_pose_discards_staged_result() {
    let mut scene = Scene::new(&EngineConfig::default());
    let root = scene.root();
    let node = scene
        .attach(
            root,
            Transform::from_position(Vec3::new(0.0, 50.0, 0.0)),
            Some(Box::new(RigidBody::new(BodyDesc::default()))),
        )
        .unwrap();

    {
        let mut world = scene.physics().lock();
        let body = world.body_ids().next().unwrap();
        world.step(0.25); // stages a fallen pose
        world.set_body_pose(
            body,
            Pose {
                position: Vec3::new(0.0, 100.0, 0.0),
                ..Default::default()
            },
        );
    }
    scene.turn();

    // The teleport cleared the staged flag, so the sync had nothing to copy
    // and the node kept its own transform.
    let y = scene.graph().world_position(node).y;
    assert!((y - 50.0).abs() < 1e-4);

    let world = scene.physics().lock();
    let body = world.body_ids().next().unwrap();
    assert!((world.body_pose(body).unwrap().position.y - 100.0).abs() < 1e-4);
}
