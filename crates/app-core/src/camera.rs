//! First-person camera description.
//!
//! Pure math shared with the frontends. Key selection consumes only the x
//! component of [`Camera::position`].

use glam::{Mat4, Vec3};

/// Radians of yaw/pitch per unit of mouse motion.
pub const ROT_SPEED: f32 = 0.005;
/// World units per movement step.
pub const MOVE_SPEED: f32 = 0.3;

/// Right-handed perspective camera with yaw/pitch orientation. Movement is
/// planar: walking never changes the eye height.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Starts level, looking down the negative z axis.
    pub fn new(position: Vec3, fovy_radians: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            aspect,
            fovy_radians,
            znear,
            zfar,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction derived from yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Applies relative mouse motion. Pitch stays strictly inside +/- pi/2
    /// so the view never locks looking straight up or down.
    pub fn turn(&mut self, dx: f32, dy: f32) {
        self.yaw += ROT_SPEED * dx;
        self.pitch -= ROT_SPEED * dy;
        let limit = std::f32::consts::FRAC_PI_2 - ROT_SPEED;
        self.pitch = self.pitch.clamp(-limit, limit);
    }

    pub fn move_forward(&mut self) {
        self.step(1.0, 0.0);
    }

    pub fn move_backward(&mut self) {
        self.step(-1.0, 0.0);
    }

    pub fn move_right(&mut self) {
        self.step(0.0, 1.0);
    }

    pub fn move_left(&mut self) {
        self.step(0.0, -1.0);
    }

    fn step(&mut self, ahead: f32, side: f32) {
        let f = self.forward();
        self.position.x += (f.x * ahead - f.z * side) * MOVE_SPEED;
        self.position.z += (f.z * ahead + f.x * side) * MOVE_SPEED;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
