use glam::Vec3;

/// Camera placement and projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Radius of the horizontal orbit circle around `target`, in world units.
    pub orbit_radius: f32,

    /// Eye height above the orbit plane.
    pub eye_height: f32,

    /// Point the camera looks at.
    pub target: Vec3,

    /// World up vector for the look-at basis.
    pub up: Vec3,

    /// Vertical field of view, in radians.
    pub fov_y: f32,

    /// Near clip plane distance.
    pub near: f32,

    /// Far clip plane distance.
    ///
    /// The sky sphere radius must stay below this.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 6.0,
            eye_height: 2.0,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// How the foreground spin angle advances.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SpinRate {
    /// Fixed step per rendered frame (frame-rate dependent).
    PerFrame(f32),
    /// Radians per second, scaled by the frame delta.
    PerSecond(f32),
}

impl SpinRate {
    /// Returns the spin increment for a frame that took `dt` seconds.
    pub fn step(self, dt: f32) -> f32 {
        match self {
            SpinRate::PerFrame(step) => step,
            SpinRate::PerSecond(rate) => rate * dt,
        }
    }
}

/// Motion parameters for the spin and the orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Foreground spin (yaw) increment.
    pub spin: SpinRate,

    /// Pitch rate as a fraction of the yaw angle.
    pub pitch_ratio: f32,

    /// Orbit angle change per orbit key press, in radians.
    pub orbit_step: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spin: SpinRate::PerFrame(0.01),
            pitch_ratio: 0.5,
            orbit_step: 0.05,
        }
    }
}

/// Latitude/longitude sphere tessellation for the background.
///
/// Both counts are clamped to at most `MAX_SKY_SEGMENTS` (1024) when the
/// mesh is built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SkySphere {
    /// Longitude subdivisions, at least 3.
    pub slices: u32,
    /// Latitude subdivisions, pole to pole, at least 2.
    pub stacks: u32,
    /// Sphere radius in world units.
    pub radius: f32,
}

impl Default for SkySphere {
    fn default() -> Self {
        Self {
            slices: 48,
            stacks: 24,
            radius: 50.0,
        }
    }
}

/// Everything the scene needs to derive per-frame transforms and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub sky: SkySphere,

    /// Half the cube edge length.
    pub cube_half_extent: f32,

    /// Linear RGBA clear color.
    pub clear_color: [f64; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            motion: MotionConfig::default(),
            sky: SkySphere::default(),
            cube_half_extent: 0.5,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_frame_spin_ignores_dt() {
        assert_eq!(SpinRate::PerFrame(0.01).step(0.5), 0.01);
    }

    #[test]
    fn per_second_spin_scales_with_dt() {
        assert!((SpinRate::PerSecond(2.0).step(0.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sky_fits_inside_far_plane() {
        let config = SceneConfig::default();
        assert!(config.sky.radius < config.camera.far);
        assert!(config.camera.orbit_radius < config.sky.radius);
    }
}
