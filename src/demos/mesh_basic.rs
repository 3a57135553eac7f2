//! Sphere, plane, and torus sharing one unlit material, with structural
//! geometry controls and the material's wireframe/transparency/side set.

use glam::Vec3;

use crate::error::Result;
use crate::geometry::GeometryParams;
use crate::material::{MaterialParams, MaterialSide};
use crate::params::{ParamClass, ParamStore};
use crate::scene::{DemoDescriptor, ObjectSpec, SpinRates};

use super::{choice, color, flag, hex_color, number};

pub fn create() -> Result<(DemoDescriptor, ParamStore)> {
    let descriptor = DemoDescriptor {
        name: "mesh-basic",
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
        lights: vec![],
        material: MaterialParams::basic(hex_color(0x747dfe)),
        camera_position: Vec3::new(1.0, 1.0, 3.0),
        background: [0.0, 0.0, 0.0],
    };

    let mut store = ParamStore::new();
    let s = ParamClass::Structural;

    number(&mut store, "sphere.radius", 0.5, 0.0, 5.0, 0.01, s)?;
    number(&mut store, "sphere.width_segments", 16.0, 3.0, 50.0, 0.1, s)?;
    number(&mut store, "sphere.height_segments", 16.0, 2.0, 50.0, 0.1, s)?;

    // The plane starts at 100 segments but its control only reaches 30;
    // the store validates initials, so the registered value is the clamp.
    number(&mut store, "plane.width_segments", 30.0, 1.0, 30.0, 0.01, s)?;
    number(&mut store, "plane.height_segments", 30.0, 1.0, 30.0, 0.01, s)?;

    number(&mut store, "torus.radius", 0.45, 0.0, 1.0, 0.01, s)?;
    number(&mut store, "torus.tube", 0.24, 0.0, 1.0, 0.01, s)?;
    number(&mut store, "torus.radial_segments", 16.0, 1.0, 30.0, 0.01, s)?;
    number(&mut store, "torus.tubular_segments", 32.0, 3.0, 100.0, 0.01, s)?;

    flag(&mut store, "material.wireframe", false)?;
    flag(&mut store, "material.transparent", false)?;
    number(
        &mut store,
        "material.opacity",
        0.5,
        0.0,
        1.0,
        0.01,
        ParamClass::Continuous,
    )?;
    choice(
        &mut store,
        "material.side",
        MaterialSide::Front.label(),
        &MaterialSide::LABELS,
    )?;
    color(&mut store, "material.color", hex_color(0x747dfe))?;

    Ok((descriptor, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn exposes_structural_geometry_controls() {
        let (_, store) = create().unwrap();
        for path in [
            "sphere.radius",
            "sphere.width_segments",
            "torus.tubular_segments",
            "plane.width_segments",
        ] {
            let entry = store
                .entries()
                .iter()
                .find(|e| e.path == path)
                .unwrap_or_else(|| panic!("missing {path}"));
            assert_eq!(entry.class, ParamClass::Structural);
        }
    }

    #[test]
    fn plane_segment_initials_clamped_into_domain() {
        let (_, store) = create().unwrap();
        assert_eq!(store.number("plane.width_segments").unwrap(), 30.0);
        assert_eq!(store.number("plane.height_segments").unwrap(), 30.0);
    }

    #[test]
    fn material_controls_cover_the_basic_set() {
        let (_, mut store) = create().unwrap();
        assert!(!store.flag("material.wireframe").unwrap());
        assert_eq!(store.number("material.opacity").unwrap(), 0.5);
        assert_eq!(store.choice("material.side").unwrap(), "Front Side");

        assert!(store
            .set(
                "material.side",
                ParamValue::Choice("Double Side".to_string())
            )
            .is_ok());
        assert!(store
            .set("material.side", ParamValue::Choice("Sideways".to_string()))
            .is_err());
    }

    #[test]
    fn all_three_meshes_tumble() {
        let (descriptor, _) = create().unwrap();
        assert_eq!(descriptor.objects.len(), 3);
        for object in &descriptor.objects {
            assert_eq!(object.spin, SpinRates::TUMBLE);
        }
    }
}
