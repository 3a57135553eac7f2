use glam::Vec3;

/// The four-light rig of the light demo. Positional variants carry a world
/// position; the spot additionally aims at a target.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
    },
    Point {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        range: f32,
        decay: f32,
    },
    Spot {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        target: Vec3,
        /// Half-angle of the cone, radians.
        angle: f32,
        /// Fraction of the cone that fades out at the edge, [0, 1].
        penumbra: f32,
    },
}

impl Light {
    pub fn color(&self) -> [f32; 3] {
        match self {
            Light::Ambient { color, .. }
            | Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. } => *color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => *intensity,
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { position, .. }
            | Light::Point { position, .. }
            | Light::Spot { position, .. } => Some(*position),
        }
    }

    pub fn set_color(&mut self, new: [f32; 3]) {
        match self {
            Light::Ambient { color, .. }
            | Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. } => *color = new,
        }
    }

    pub fn set_intensity(&mut self, new: f32) {
        match self {
            Light::Ambient { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Point { intensity, .. }
            | Light::Spot { intensity, .. } => *intensity = new,
        }
    }

    /// Set one axis of the position. No-op for ambient lights, which have
    /// no transform.
    pub fn set_position_axis(&mut self, axis: usize, value: f32) {
        if let Light::Directional { position, .. }
        | Light::Point { position, .. }
        | Light::Spot { position, .. } = self
        {
            position[axis] = value;
        }
    }

    /// True for variants whose transform feeds a visualization helper.
    pub fn has_helper(&self) -> bool {
        !matches!(self, Light::Ambient { .. })
    }
}

/// Debug visualization mirroring one light's transform as line segments.
/// The helper does NOT track the light automatically: after any position or
/// target mutation the owner must call [`LightHelper::refresh`], otherwise
/// the visualization desyncs from the light.
#[derive(Debug, Clone, Default)]
pub struct LightHelper {
    pub segments: Vec<[Vec3; 2]>,
    pub color: [f32; 3],
    refresh_count: u64,
}

impl LightHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the line-segment representation from the light's current
    /// transform.
    pub fn refresh(&mut self, light: &Light) {
        self.segments.clear();
        self.color = light.color();
        self.refresh_count += 1;

        match *light {
            Light::Ambient { .. } => {}
            Light::Directional { position, .. } => {
                // Small cross at the source plus a ray toward the origin.
                let size = 0.2;
                self.segments.push([
                    position + Vec3::new(-size, 0.0, 0.0),
                    position + Vec3::new(size, 0.0, 0.0),
                ]);
                self.segments.push([
                    position + Vec3::new(0.0, -size, 0.0),
                    position + Vec3::new(0.0, size, 0.0),
                ]);
                self.segments.push([position, Vec3::ZERO]);
            }
            Light::Point { position, .. } => {
                // Octahedron star around the source.
                let size = 0.2;
                for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                    self.segments
                        .push([position - axis * size, position + axis * size]);
                }
            }
            Light::Spot {
                position,
                target,
                angle,
                ..
            } => {
                // Cone outline: four edge rays plus the axis.
                let axis = (target - position).normalize_or_zero();
                let length = (target - position).length();
                let radius = angle.tan() * length;
                let side = axis.cross(Vec3::Y).normalize_or_zero();
                let side = if side.length_squared() < 1e-6 {
                    Vec3::X
                } else {
                    side
                };
                let up = axis.cross(side).normalize_or_zero();
                self.segments.push([position, target]);
                for rim in [side, -side, up, -up] {
                    self.segments.push([position, target + rim * radius]);
                }
            }
        }
    }

    /// Centroid of the source-side endpoints; used to verify the helper
    /// tracks its light.
    pub fn anchor(&self) -> Option<Vec3> {
        match self.segments.first() {
            Some(seg) => Some(seg[0]),
            None => None,
        }
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_cover_all_variants() {
        let lights = [
            Light::Ambient {
                color: [1.0, 1.0, 1.0],
                intensity: 0.5,
            },
            Light::Directional {
                color: [1.0, 0.0, 0.0],
                intensity: 0.3,
                position: Vec3::ONE,
            },
            Light::Point {
                color: [0.16, 0.03, 0.81],
                intensity: 0.5,
                position: Vec3::new(2.3, 0.0, 0.0),
                range: 10.0,
                decay: 2.0,
            },
            Light::Spot {
                color: [0.47, 1.0, 0.0],
                intensity: 0.5,
                position: Vec3::new(0.0, 2.0, 3.0),
                target: Vec3::new(-0.75, 0.0, 0.0),
                angle: std::f32::consts::PI * 0.1,
                penumbra: 0.25,
            },
        ];

        assert_eq!(lights[0].position(), None);
        for light in &lights[1..] {
            assert!(light.position().is_some());
            assert!(light.has_helper());
        }
        assert!(!lights[0].has_helper());
    }

    #[test]
    fn set_position_axis_moves_light() {
        let mut light = Light::Point {
            color: [1.0; 3],
            intensity: 0.5,
            position: Vec3::ZERO,
            range: 10.0,
            decay: 2.0,
        };
        light.set_position_axis(0, 2.3);
        light.set_position_axis(2, -1.0);
        assert_eq!(light.position().unwrap(), Vec3::new(2.3, 0.0, -1.0));
    }

    #[test]
    fn set_position_axis_noop_for_ambient() {
        let mut light = Light::Ambient {
            color: [1.0; 3],
            intensity: 0.5,
        };
        light.set_position_axis(1, 5.0);
        assert_eq!(light.position(), None);
    }

    #[test]
    fn helper_refresh_round_trips_position() {
        let mut light = Light::Point {
            color: [0.0, 0.0, 1.0],
            intensity: 0.5,
            position: Vec3::new(2.3, 0.0, 0.0),
            range: 10.0,
            decay: 2.0,
        };
        let mut helper = LightHelper::new();
        helper.refresh(&light);

        light.set_position_axis(1, 4.0);
        helper.refresh(&light);

        // Every point-light segment is centered on the light position.
        let position = light.position().unwrap();
        for seg in &helper.segments {
            let mid = (seg[0] + seg[1]) * 0.5;
            assert!((mid - position).length() < 1e-5);
        }
        assert_eq!(helper.refresh_count(), 2);
    }

    #[test]
    fn stale_helper_desyncs_until_refreshed() {
        let mut light = Light::Directional {
            color: [1.0, 0.0, 0.0],
            intensity: 0.3,
            position: Vec3::ONE,
        };
        let mut helper = LightHelper::new();
        helper.refresh(&light);
        let before = helper.anchor().unwrap();

        light.set_position_axis(0, 10.0);
        // Not refreshed yet: helper still shows the old transform.
        assert_eq!(helper.anchor().unwrap(), before);

        helper.refresh(&light);
        assert_ne!(helper.anchor().unwrap(), before);
    }

    #[test]
    fn spot_helper_aims_at_target() {
        let light = Light::Spot {
            color: [1.0, 0.0, 1.0],
            intensity: 0.7,
            position: Vec3::new(1.0, 3.0, 1.0),
            target: Vec3::new(-0.75, 0.0, 0.0),
            angle: std::f32::consts::PI * 0.1,
            penumbra: 0.25,
        };
        let mut helper = LightHelper::new();
        helper.refresh(&light);

        // First segment is the axis: position -> target.
        assert_eq!(helper.segments[0][0], Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(helper.segments[0][1], Vec3::new(-0.75, 0.0, 0.0));
        assert_eq!(helper.segments.len(), 5);
    }

    #[test]
    fn helper_color_follows_light() {
        let mut light = Light::Point {
            color: [0.0, 0.0, 1.0],
            intensity: 0.5,
            position: Vec3::ZERO,
            range: 10.0,
            decay: 2.0,
        };
        let mut helper = LightHelper::new();
        helper.refresh(&light);
        assert_eq!(helper.color, [0.0, 0.0, 1.0]);

        light.set_color([1.0, 1.0, 0.0]);
        helper.refresh(&light);
        assert_eq!(helper.color, [1.0, 1.0, 0.0]);
    }
}
