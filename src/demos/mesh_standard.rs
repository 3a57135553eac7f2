//! The PBR variant of the mesh demo: metalness/roughness controls and a
//! switchable environment map.

use glam::Vec3;

use crate::assets::EnvMapVariant;
use crate::error::Result;
use crate::geometry::GeometryParams;
use crate::lights::Light;
use crate::material::MaterialParams;
use crate::params::{ParamClass, ParamStore};
use crate::scene::{DemoDescriptor, LightSpec, ObjectSpec, SpinRates};

use super::{choice, color, number};

pub fn create() -> Result<(DemoDescriptor, ParamStore)> {
    let descriptor = DemoDescriptor {
        name: "mesh-standard",
        objects: vec![
            ObjectSpec::new(
                "sphere",
                GeometryParams::Sphere {
                    radius: 0.5,
                    width_segments: 16,
                    height_segments: 16,
                },
            )
            .at(Vec3::new(-1.5, 0.0, 0.0))
            .spinning(SpinRates::TUMBLE),
            ObjectSpec::new(
                "plane",
                GeometryParams::Plane {
                    width: 1.0,
                    height: 1.0,
                    width_segments: 100,
                    height_segments: 100,
                },
            )
            .spinning(SpinRates::TUMBLE),
            ObjectSpec::new(
                "torus",
                GeometryParams::Torus {
                    radius: 0.45,
                    tube: 0.24,
                    radial_segments: 16,
                    tubular_segments: 32,
                    arc: 6.9,
                },
            )
            .at(Vec3::new(1.5, 0.0, 0.0))
            .spinning(SpinRates::TUMBLE),
        ],
        lights: vec![
            LightSpec::new(
                "ambient",
                Light::Ambient {
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.5,
                },
            ),
            LightSpec::new(
                "point",
                Light::Point {
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.5,
                    position: Vec3::new(2.0, 3.0, 4.0),
                    range: 0.0,
                    decay: 2.0,
                },
            ),
        ],
        material: MaterialParams::standard()
            .with_metalness_roughness(1.0, 0.0)
            .with_env_map(EnvMapVariant::Zero),
        camera_position: Vec3::new(1.0, 1.0, 3.0),
        background: [0.0, 0.0, 0.0],
    };

    let mut store = ParamStore::new();
    let s = ParamClass::Structural;
    let c = ParamClass::Continuous;

    number(&mut store, "sphere.radius", 0.5, 0.0, 5.0, 0.01, s)?;
    number(&mut store, "sphere.width_segments", 16.0, 3.0, 50.0, 0.1, s)?;
    number(&mut store, "sphere.height_segments", 16.0, 2.0, 50.0, 0.1, s)?;

    number(&mut store, "plane.width_segments", 30.0, 1.0, 30.0, 0.01, s)?;
    number(&mut store, "plane.height_segments", 30.0, 1.0, 30.0, 0.01, s)?;

    number(&mut store, "torus.radius", 0.45, 0.0, 1.0, 0.01, s)?;
    number(&mut store, "torus.tube", 0.24, 0.0, 1.0, 0.01, s)?;
    number(&mut store, "torus.radial_segments", 16.0, 1.0, 30.0, 0.01, s)?;
    number(&mut store, "torus.tubular_segments", 32.0, 3.0, 100.0, 0.01, s)?;

    number(&mut store, "material.metalness", 1.0, 0.0, 1.0, 0.01, c)?;
    number(&mut store, "material.roughness", 0.0, 0.0, 1.0, 0.01, c)?;
    color(&mut store, "material.color", [1.0, 1.0, 1.0])?;
    choice(&mut store, "material.env_map", "0", &["0", "1", "2"])?;

    Ok((descriptor, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn material_starts_fully_metallic_and_smooth() {
        let (descriptor, store) = create().unwrap();
        assert_eq!(descriptor.material.metalness, 1.0);
        assert_eq!(descriptor.material.roughness, 0.0);
        assert_eq!(descriptor.material.env_map, Some(EnvMapVariant::Zero));
        assert_eq!(store.number("material.metalness").unwrap(), 1.0);
    }

    #[test]
    fn env_map_choice_is_structural_with_three_variants() {
        let (_, mut store) = create().unwrap();
        let change = store
            .set("material.env_map", ParamValue::Choice("2".into()))
            .unwrap();
        assert_eq!(change.class, ParamClass::Structural);
        assert!(store
            .set("material.env_map", ParamValue::Choice("3".into()))
            .is_err());
    }

    #[test]
    fn has_ambient_and_point_fill_lights() {
        let (descriptor, _) = create().unwrap();
        assert_eq!(descriptor.lights.len(), 2);
        assert!(matches!(descriptor.lights[0].light, Light::Ambient { .. }));
        assert!(matches!(
            descriptor.lights[1].light,
            Light::Point {
                position: p,
                ..
            } if p == Vec3::new(2.0, 3.0, 4.0)
        ));
    }
}
