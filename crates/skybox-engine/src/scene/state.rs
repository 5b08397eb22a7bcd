use glam::{Mat4, Vec3, Vec4};

use super::config::{CameraConfig, MotionConfig, SceneConfig};

/// The three matrices pushed to the GPU each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneMatrices {
    pub model: Mat4,
    pub view_projection: Mat4,
    pub background_view_projection: Mat4,
}

/// Evolving scene parameters.
///
/// Angles only ever feed trigonometric functions, so they accumulate without
/// wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    spin: f32,
    orbit: f32,
    aspect: f32,
}

impl SceneState {
    /// Creates a state with both angles at 0 and the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        let mut state = Self {
            spin: 0.0,
            orbit: 0.0,
            aspect: 1.0,
        };
        state.set_surface_size(width, height);
        state
    }

    /// Foreground spin (yaw) angle in radians.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Camera azimuth in radians.
    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    /// Current projection aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Increments the spin angle and the orbit angle.
    pub fn advance(&mut self, d_spin: f32, d_orbit: f32) {
        self.spin += d_spin;
        self.orbit += d_orbit;
    }

    /// Updates the aspect ratio. Degenerate sizes keep the previous ratio.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Yaw at full rate, then pitch at `pitch_ratio` of it.
    pub fn model_matrix(&self, motion: &MotionConfig) -> Mat4 {
        let yaw = Mat4::from_rotation_y(self.spin);
        let pitch = Mat4::from_rotation_x(self.spin * motion.pitch_ratio);
        pitch * yaw
    }

    /// Eye position on the orbit circle at the configured height.
    pub fn eye(&self, camera: &CameraConfig) -> Vec3 {
        let (sin, cos) = self.orbit.sin_cos();
        camera.target
            + Vec3::new(
                camera.orbit_radius * sin,
                camera.eye_height,
                camera.orbit_radius * cos,
            )
    }

    pub fn view(&self, camera: &CameraConfig) -> Mat4 {
        Mat4::look_at_lh(self.eye(camera), camera.target, camera.up)
    }

    /// The view matrix with its translation removed: orientation only.
    pub fn background_view(&self, camera: &CameraConfig) -> Mat4 {
        let mut view = self.view(camera);
        view.w_axis = Vec4::W;
        view
    }

    pub fn projection(&self, camera: &CameraConfig) -> Mat4 {
        Mat4::perspective_lh(camera.fov_y, self.aspect, camera.near, camera.far)
    }

    pub fn view_projection(&self, camera: &CameraConfig) -> Mat4 {
        self.projection(camera) * self.view(camera)
    }

    pub fn background_view_projection(&self, camera: &CameraConfig) -> Mat4 {
        self.projection(camera) * self.background_view(camera)
    }

    /// Derives everything the frame needs in one go.
    pub fn matrices(&self, config: &SceneConfig) -> SceneMatrices {
        SceneMatrices {
            model: self.model_matrix(&config.motion),
            view_projection: self.view_projection(&config.camera),
            background_view_projection: self.background_view_projection(&config.camera),
        }
    }
}
