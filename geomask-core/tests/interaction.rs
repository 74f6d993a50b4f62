//! End-to-end interaction scenarios driven through the renderer
use geomask_core::{InputEvent, InteractionState, Settings, SilhouetteRenderer};
use nalgebra::{Point2, Vector2};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn renderer(width: f32, height: f32) -> SilhouetteRenderer {
    let mut renderer = SilhouetteRenderer::with_seed(Settings::default(), 0.0, 5).unwrap();
    renderer.resize(width, height);
    renderer
}

#[test]
fn pointer_enter_blends_into_hover() {
    let mut renderer = renderer(400.0, 200.0);
    let mut now = 0.0;
    for _ in 0..5 {
        now += FRAME_MS;
        renderer.update(now);
    }
    assert!(renderer.animator().blend().idle > 0.99);

    // (300, 70) on a 400x200 surface is (0.5, -0.3) normalized
    now += 1.0;
    renderer.handle_event(
        InputEvent::PointerMove {
            position: Point2::new(300.0, 70.0),
        },
        now,
    );
    let range = renderer.settings().eye_track_range;
    assert_eq!(renderer.input().requested_state(), InteractionState::Hover);
    assert!((renderer.input().eye_target() - Vector2::new(0.5 * range, -0.3 * range)).norm() < 1e-5);
    assert_eq!(renderer.input().last_activity(), now);

    let mut previous = *renderer.animator().blend();
    for _ in 0..60 {
        now += FRAME_MS;
        renderer.update(now);
        let blend = *renderer.animator().blend();
        assert!(blend.hover > previous.hover);
        assert!(blend.idle < previous.idle);
        previous = blend;
    }
    assert!(previous.hover > 0.99);
    assert!((previous.sum() - 1.0).abs() < 1e-3);
}

#[test]
fn drag_follows_at_the_same_speed_at_any_frame_rate() {
    let settings = Settings::default();
    let mut slow = renderer(800.0, 600.0);
    let mut fast = renderer(800.0, 600.0);

    for r in [&mut slow, &mut fast] {
        r.update(0.0);
        r.handle_event(InputEvent::PointerDown { position: Point2::new(400.0, 300.0) }, 0.0);
        r.handle_event(InputEvent::PointerMove { position: Point2::new(460.0, 280.0) }, 0.0);
        let target = r.input().rotation_target();
        assert!((target.y - 60.0 * settings.rot_sensitivity).abs() < 1e-6);
        assert!((target.x - 20.0 * settings.rot_sensitivity).abs() < 1e-6);
    }

    // Half a second at 30 fps against half a second at 144 fps
    for i in 1..=15 {
        slow.update(f64::from(i) * 1000.0 / 30.0);
    }
    for i in 1..=72 {
        fast.update(f64::from(i) * 1000.0 / 144.0);
    }

    let a = slow.animator().drag_rotation();
    let b = fast.animator().drag_rotation();
    assert!(a.y > 0.0);
    assert!((a.x - b.x).abs() < 1e-4);
    assert!((a.y - b.y).abs() < 1e-4);
    assert_eq!(slow.input().rotation_target(), fast.input().rotation_target());
}

#[test]
fn release_kick_then_geometric_spin_down() {
    let settings = Settings::default();
    let mut renderer = renderer(800.0, 600.0);
    renderer.update(0.0);

    renderer.handle_event(InputEvent::PointerDown { position: Point2::new(100.0, 100.0) }, 1.0);
    renderer.handle_event(InputEvent::PointerMove { position: Point2::new(120.0, 90.0) }, 2.0);
    renderer.handle_event(InputEvent::PointerMove { position: Point2::new(150.0, 85.0) }, 3.0);
    let held = renderer.input().rotation_target();
    let momentum = renderer.input().momentum();
    assert_eq!(momentum, Vector2::new(30.0, -5.0));

    renderer.handle_event(InputEvent::PointerUp, 4.0);
    let released = renderer.input().rotation_target();
    let kick = settings.rot_sensitivity * 2.0;
    assert!((released.y - (held.y + momentum.x * kick)).abs() < 1e-6);
    assert!((released.x - (held.x - momentum.y * kick)).abs() < 1e-6);

    let mut previous = released;
    let mut now = 0.0;
    for _ in 0..120 {
        now += FRAME_MS;
        renderer.update(now);
        let target = renderer.input().rotation_target();
        assert!((target.y - previous.y * settings.drag_decay).abs() < 1e-5);
        assert!(target.magnitude() < previous.magnitude());
        previous = target;
    }
    assert!(previous.magnitude() < released.magnitude() * 0.1);
}

#[test]
fn inactivity_rests_the_silhouette() {
    let settings = Settings::default();
    let mut renderer = renderer(800.0, 600.0);
    let mut now = 0.0;
    let mut previous = 1.0;
    while now < settings.inactive_delay + 10_000.0 {
        now += FRAME_MS;
        let frame = renderer.update(now);
        assert!(frame.activity <= previous + 1e-6);
        assert!(frame.activity >= settings.inactive_level);
        previous = frame.activity;
    }
    assert!((previous - settings.inactive_level).abs() < 1e-2);
}

#[test]
fn scroll_fades_every_intensity() {
    let mut renderer = renderer(800.0, 600.0);
    renderer.handle_event(InputEvent::Scroll { offset: 1200.0 }, 0.0);
    let frame = renderer.update(FRAME_MS);
    assert!((frame.fade - 0.15).abs() < 1e-6);
    assert!(frame.intensity <= 0.15 + 1e-6);
}

#[test]
fn resize_regenerates_particles_inside_bounds() {
    let mut renderer = renderer(1400.0, 900.0);
    assert!((renderer.scale() - 900.0 / 700.0).abs() < 1e-6);

    renderer.resize(300.0, 500.0);
    let count = renderer.settings().particle_count;
    assert_eq!(renderer.particles().len(), count);
    assert!((renderer.scale() - 300.0 / 700.0).abs() < 1e-6);
    for p in renderer.particles().particles() {
        assert!(p.position.x >= 0.0 && p.position.x <= 300.0);
        assert!(p.position.y >= 0.0 && p.position.y <= 500.0);
    }
}
