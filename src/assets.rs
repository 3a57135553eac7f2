use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SceneError;

/// Edge length of a placeholder cube-map face.
pub const PLACEHOLDER_FACE_SIZE: u32 = 64;

const FACE_NAMES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// The three environment-map sets shipped with the mesh-standard demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnvMapVariant {
    Zero,
    One,
    Two,
}

impl EnvMapVariant {
    pub const ALL: [EnvMapVariant; 3] = [EnvMapVariant::Zero, EnvMapVariant::One, EnvMapVariant::Two];

    pub fn index(self) -> usize {
        match self {
            EnvMapVariant::Zero => 0,
            EnvMapVariant::One => 1,
            EnvMapVariant::Two => 2,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "0" => Some(EnvMapVariant::Zero),
            "1" => Some(EnvMapVariant::One),
            "2" => Some(EnvMapVariant::Two),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnvMapVariant::Zero => "0",
            EnvMapVariant::One => "1",
            EnvMapVariant::Two => "2",
        }
    }

    /// The six fixed relative face paths, +x -x +y -y +z -z order.
    pub fn face_paths(self) -> [PathBuf; 6] {
        FACE_NAMES.map(|face| {
            PathBuf::from(format!(
                "textures/environmentMaps/{}/{}.jpg",
                self.index(),
                face
            ))
        })
    }
}

/// Six decoded RGBA faces of equal square size, +x -x +y -y +z -z order.
#[derive(Debug, Clone)]
pub struct CubeFaces {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubeFaces {
    /// Procedural fallback: a vertical sky-to-ground gradient tinted per
    /// variant, used whenever the real asset cannot be loaded.
    pub fn placeholder(variant: EnvMapVariant) -> Self {
        let tint: [f32; 3] = match variant {
            EnvMapVariant::Zero => [0.55, 0.65, 0.85],
            EnvMapVariant::One => [0.85, 0.7, 0.5],
            EnvMapVariant::Two => [0.5, 0.8, 0.65],
        };
        let size = PLACEHOLDER_FACE_SIZE;
        let faces = std::array::from_fn(|face| {
            let mut pixels = Vec::with_capacity((size * size * 4) as usize);
            for y in 0..size {
                // +y face stays bright, -y dark, side faces fade with row.
                let vertical = match face {
                    2 => 1.0,
                    3 => 0.15,
                    _ => 1.0 - y as f32 / size as f32 * 0.7,
                };
                for _x in 0..size {
                    for channel in tint {
                        pixels.push((channel * vertical * 255.0) as u8);
                    }
                    pixels.push(255);
                }
            }
            pixels
        });
        Self { size, faces }
    }
}

/// Load a cube map from decoded sidecar files.
///
/// Image decoding is external to this crate, so each `<face>.jpg` path must
/// have a `<face>.rgba` sidecar holding raw, tightly packed RGBA bytes of a
/// square face. Any missing or malformed face fails the whole set; callers
/// substitute [`CubeFaces::placeholder`].
pub fn load_cube_rgba(root: &Path, variant: EnvMapVariant) -> Result<CubeFaces, SceneError> {
    let mut faces: [Vec<u8>; 6] = Default::default();
    let mut size = 0u32;

    for (i, rel) in variant.face_paths().iter().enumerate() {
        let path = root.join(rel).with_extension("rgba");
        let bytes = std::fs::read(&path).map_err(|e| SceneError::AssetLoadFailure {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let pixels = (bytes.len() / 4) as u32;
        let side = (pixels as f64).sqrt() as u32;
        if side == 0 || side * side * 4 != bytes.len() as u32 {
            return Err(SceneError::AssetLoadFailure {
                path: path.display().to_string(),
                reason: format!("{} bytes is not a square RGBA face", bytes.len()),
            });
        }
        if size == 0 {
            size = side;
        } else if side != size {
            return Err(SceneError::AssetLoadFailure {
                path: path.display().to_string(),
                reason: format!("face size {side} != {size}"),
            });
        }
        faces[i] = bytes;
    }

    Ok(CubeFaces { size, faces })
}

/// Load with placeholder fallback, logging the failure. Non-fatal per the
/// error-handling contract.
pub fn load_cube_or_placeholder(root: &Path, variant: EnvMapVariant) -> CubeFaces {
    match load_cube_rgba(root, variant) {
        Ok(faces) => faces,
        Err(e) => {
            log::warn!("env map {}: {e}; using placeholder", variant.label());
            CubeFaces::placeholder(variant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_paths_match_fixed_layout() {
        let paths = EnvMapVariant::One.face_paths();
        assert_eq!(
            paths[0],
            PathBuf::from("textures/environmentMaps/1/px.jpg")
        );
        assert_eq!(
            paths[5],
            PathBuf::from("textures/environmentMaps/1/nz.jpg")
        );
    }

    #[test]
    fn labels_round_trip() {
        for variant in EnvMapVariant::ALL {
            assert_eq!(EnvMapVariant::from_label(variant.label()), Some(variant));
        }
        assert_eq!(EnvMapVariant::from_label("7"), None);
    }

    #[test]
    fn placeholder_faces_are_square_rgba() {
        let cube = CubeFaces::placeholder(EnvMapVariant::Zero);
        assert_eq!(cube.size, PLACEHOLDER_FACE_SIZE);
        for face in &cube.faces {
            assert_eq!(face.len() as u32, cube.size * cube.size * 4);
        }
    }

    #[test]
    fn placeholder_tint_differs_per_variant() {
        let a = CubeFaces::placeholder(EnvMapVariant::Zero);
        let b = CubeFaces::placeholder(EnvMapVariant::One);
        assert_ne!(a.faces[0][0], b.faces[0][0]);
    }

    #[test]
    fn missing_assets_fall_back_to_placeholder() {
        let cube =
            load_cube_or_placeholder(Path::new("/definitely/not/here"), EnvMapVariant::Two);
        assert_eq!(cube.size, PLACEHOLDER_FACE_SIZE);
    }

    #[test]
    fn missing_assets_report_load_failure() {
        let err = load_cube_rgba(Path::new("/definitely/not/here"), EnvMapVariant::Zero);
        assert!(matches!(err, Err(SceneError::AssetLoadFailure { .. })));
    }
}
