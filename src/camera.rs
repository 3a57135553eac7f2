use glam::{Mat4, Vec3};

pub const DEFAULT_FOV_Y_DEG: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Perspective camera owned by the demo program. Aspect is derived from the
/// viewport and must be updated before the projection is recomputed on
/// resize.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            fov_y: DEFAULT_FOV_Y_DEG.to_radians(),
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            aspect,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Step one of the resize contract: record the new aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Step two: recompute the cached projection from current parameters.
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

/// Damped orbital camera controls. Pointer drags and scroll set target
/// angles/distance; [`OrbitControls::update`] eases the camera toward them
/// once per animation frame, so input events never move the camera
/// directly.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    target_yaw: f32,
    target_pitch: f32,
    target_distance: f32,
    damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControls {
    /// Controls positioned to look at the origin from `position`.
    pub fn from_position(position: Vec3) -> Self {
        let distance = position.length().max(0.01);
        let yaw = position.x.atan2(position.z);
        let pitch = (position.y / distance).clamp(-1.0, 1.0).asin();
        Self {
            yaw,
            pitch,
            distance,
            target_yaw: yaw,
            target_pitch: pitch,
            target_distance: distance,
            damping: 0.1,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }

    /// Accumulate a pointer drag, in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.target_yaw -= dx * self.rotate_speed;
        self.target_pitch = (self.target_pitch - dy * self.rotate_speed).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
    }

    /// Accumulate scroll input; positive zooms in.
    pub fn zoom(&mut self, delta: f32) {
        self.target_distance = (self.target_distance * (1.0 - delta * self.zoom_speed))
            .clamp(self.min_distance, self.max_distance);
    }

    /// Advance the damping state one frame and reposition the camera.
    pub fn update(&mut self, camera: &mut Camera) {
        self.yaw += (self.target_yaw - self.yaw) * self.damping;
        self.pitch += (self.target_pitch - self.pitch) * self.damping;
        self.distance += (self.target_distance - self.distance) * self.damping;

        camera.position = camera.target
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            );
    }
}
