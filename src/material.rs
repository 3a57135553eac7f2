use serde::Serialize;

use crate::assets::EnvMapVariant;

/// Shading model applied to every object of a demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MaterialKind {
    /// Unlit flat color.
    Basic,
    /// Lit, metalness/roughness model with optional environment map.
    Standard,
}

/// Which faces the rasterizer keeps; maps to the pipeline's cull mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MaterialSide {
    Front,
    Back,
    Double,
}

impl MaterialSide {
    pub const LABELS: [&'static str; 3] = ["Front Side", "Back Side", "Double Side"];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Front Side" => Some(MaterialSide::Front),
            "Back Side" => Some(MaterialSide::Back),
            "Double Side" => Some(MaterialSide::Double),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaterialSide::Front => "Front Side",
            MaterialSide::Back => "Back Side",
            MaterialSide::Double => "Double Side",
        }
    }
}

/// Material state shared by all scene objects of one demo.
///
/// Continuous fields (color, opacity, metalness, roughness) mutate in place
/// and take effect on the next frame through the uniform upload. Structural
/// fields (wireframe pipeline selection, env-map binding) set the dirty
/// flag so the renderer re-realizes the material before drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialParams {
    pub kind: MaterialKind,
    pub color: [f32; 3],
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub side: MaterialSide,
    pub env_map: Option<EnvMapVariant>,
    #[serde(skip)]
    dirty: bool,
}

impl MaterialParams {
    pub fn basic(color: [f32; 3]) -> Self {
        Self {
            kind: MaterialKind::Basic,
            color,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            wireframe: false,
            transparent: false,
            side: MaterialSide::Front,
            env_map: None,
            dirty: false,
        }
    }

    pub fn standard() -> Self {
        Self {
            kind: MaterialKind::Standard,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            metalness: 0.0,
            roughness: 0.4,
            wireframe: false,
            transparent: false,
            side: MaterialSide::Front,
            env_map: None,
            dirty: false,
        }
    }

    pub fn with_env_map(mut self, variant: EnvMapVariant) -> Self {
        self.env_map = Some(variant);
        self
    }

    pub fn with_metalness_roughness(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }

    // In-place mutations for continuous parameters.

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_metalness(&mut self, metalness: f32) {
        self.metalness = metalness.clamp(0.0, 1.0);
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness.clamp(0.0, 1.0);
    }

    // Structural mutations: the backing pipeline or texture binding changes,
    // so the previous realization is replaced rather than patched.

    pub fn set_wireframe(&mut self, wireframe: bool) {
        if self.wireframe != wireframe {
            self.wireframe = wireframe;
            self.dirty = true;
        }
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        if self.transparent != transparent {
            self.transparent = transparent;
            self.dirty = true;
        }
    }

    pub fn set_side(&mut self, side: MaterialSide) {
        if self.side != side {
            self.side = side;
            self.dirty = true;
        }
    }

    pub fn set_env_map(&mut self, variant: Option<EnvMapVariant>) {
        if self.env_map != variant {
            self.env_map = variant;
            self.dirty = true;
        }
    }

    /// True when the renderer must rebuild the material's realization.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer once the new realization is installed.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_mutation_does_not_dirty() {
        let mut mat = MaterialParams::standard();
        mat.set_color([0.2, 0.3, 0.4]);
        mat.set_metalness(0.9);
        mat.set_roughness(0.1);
        mat.set_opacity(0.5);
        assert!(!mat.is_dirty());
        assert_eq!(mat.color, [0.2, 0.3, 0.4]);
    }

    #[test]
    fn wireframe_toggle_dirties() {
        let mut mat = MaterialParams::basic([1.0, 1.0, 1.0]);
        mat.set_wireframe(true);
        assert!(mat.is_dirty());
        mat.clear_dirty();
        // Setting the same value again is a no-op.
        mat.set_wireframe(true);
        assert!(!mat.is_dirty());
    }

    #[test]
    fn wireframe_double_toggle_restores_state() {
        let mut mat = MaterialParams::standard();
        let original = mat.clone();
        mat.set_wireframe(!mat.wireframe);
        mat.set_wireframe(!mat.wireframe);
        mat.clear_dirty();
        assert_eq!(mat, original);
    }

    #[test]
    fn env_map_change_dirties() {
        let mut mat = MaterialParams::standard().with_env_map(EnvMapVariant::Zero);
        mat.clear_dirty();
        mat.set_env_map(Some(EnvMapVariant::Two));
        assert!(mat.is_dirty());
        assert_eq!(mat.env_map, Some(EnvMapVariant::Two));
    }

    #[test]
    fn side_and_transparent_are_structural() {
        let mut mat = MaterialParams::basic([0.45, 0.49, 1.0]);
        mat.set_transparent(true);
        assert!(mat.is_dirty());
        mat.clear_dirty();

        mat.set_side(MaterialSide::Double);
        assert!(mat.is_dirty());
        assert_eq!(mat.side, MaterialSide::Double);
    }

    #[test]
    fn side_labels_round_trip() {
        for label in MaterialSide::LABELS {
            assert_eq!(MaterialSide::from_label(label).unwrap().label(), label);
        }
        assert_eq!(MaterialSide::from_label("Sideways"), None);
    }

    #[test]
    fn continuous_values_clamped() {
        let mut mat = MaterialParams::standard();
        mat.set_metalness(7.0);
        mat.set_roughness(-2.0);
        mat.set_opacity(3.0);
        assert_eq!(mat.metalness, 1.0);
        assert_eq!(mat.roughness, 0.0);
        assert_eq!(mat.opacity, 1.0);
    }
}
