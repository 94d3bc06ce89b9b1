// First-person camera math.

use app_core::Camera;
use glam::Vec3;

fn make_camera() -> Camera {
    Camera::new(Vec3::new(0.0, 5.0, 10.0), 70.0_f32.to_radians(), 4.0 / 3.0, 0.01, 1000.0)
}

#[test]
fn starts_level_facing_negative_z() {
    let camera = make_camera();
    let f = camera.forward();
    assert!((f - Vec3::NEG_Z).length() < 1e-5);
}

#[test]
fn forward_stays_unit_length_while_turning() {
    let mut camera = make_camera();
    for i in 0..50 {
        camera.turn(13.0 * i as f32, -7.0 * i as f32);
        assert!((camera.forward().length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn pitch_never_reaches_straight_up_or_down() {
    let mut camera = make_camera();
    camera.turn(0.0, -1.0e7);
    assert!(camera.forward().y < 1.0);
    assert!(camera.forward().y > 0.99);

    camera.turn(0.0, 1.0e7);
    assert!(camera.forward().y > -1.0);
    assert!(camera.forward().y < -0.99);
}

#[test]
fn walking_never_changes_the_eye_height() {
    let mut camera = make_camera();
    camera.turn(200.0, -300.0); // look somewhere oblique
    for _ in 0..20 {
        camera.move_forward();
        camera.move_left();
        camera.move_backward();
        camera.move_right();
    }
    assert_eq!(camera.position().y, 5.0);
}

#[test]
fn movement_follows_the_view_direction() {
    let mut camera = make_camera();
    let start = camera.position();

    camera.move_forward();
    assert!(camera.position().z < start.z, "forward is -z at rest");

    camera.move_right();
    assert!(camera.position().x > start.x, "right is +x at rest");
}

#[test]
fn view_matrix_centers_the_camera() {
    let mut camera = make_camera();
    camera.turn(500.0, -120.0);
    let origin = camera.view_matrix().transform_point3(camera.position());
    assert!(origin.length() < 1e-4);

    let vp = camera.view_projection();
    assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
}
