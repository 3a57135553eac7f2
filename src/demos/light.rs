//! The four-light rig over a sphere, cube, torus, and ground plane. Every
//! positional light carries a helper that follows its controls.

use glam::Vec3;

use crate::error::Result;
use crate::geometry::GeometryParams;
use crate::lights::Light;
use crate::material::MaterialParams;
use crate::params::{ParamClass, ParamStore};
use crate::scene::{DemoDescriptor, LightSpec, ObjectSpec, SpinRates};

use super::{color, hex_color, number};

pub fn create() -> Result<(DemoDescriptor, ParamStore)> {
    let descriptor = DemoDescriptor {
        name: "light",
        objects: vec![
            ObjectSpec::new(
                "sphere",
                GeometryParams::Sphere {
                    radius: 0.5,
                    width_segments: 32,
                    height_segments: 32,
                },
            )
            .at(Vec3::new(-1.5, 0.0, 0.0))
            .spinning(SpinRates::TUMBLE),
            ObjectSpec::new(
                "cube",
                GeometryParams::Box {
                    width: 0.75,
                    height: 0.75,
                    depth: 0.75,
                },
            )
            .spinning(SpinRates::TUMBLE),
            ObjectSpec::new(
                "torus",
                GeometryParams::Torus {
                    radius: 0.3,
                    tube: 0.2,
                    radial_segments: 32,
                    tubular_segments: 64,
                    arc: std::f32::consts::TAU,
                },
            )
            .at(Vec3::new(1.5, 0.0, 0.0))
            .spinning(SpinRates::TUMBLE),
            // Ground plane: lies flat, does not tumble.
            ObjectSpec::new(
                "ground",
                GeometryParams::Plane {
                    width: 5.0,
                    height: 5.0,
                    width_segments: 1,
                    height_segments: 1,
                },
            )
            .at(Vec3::new(0.0, -0.65, 0.0))
            .rotated(Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0)),
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
                "directional",
                Light::Directional {
                    color: hex_color(0xff0000),
                    intensity: 0.3,
                    position: Vec3::new(1.0, 1.0, 1.0),
                },
            ),
            LightSpec::new(
                "point",
                Light::Point {
                    color: hex_color(0x2a07cf),
                    intensity: 0.5,
                    position: Vec3::new(2.3, 0.0, 0.0),
                    range: 10.0,
                    decay: 2.0,
                },
            ),
            LightSpec::new(
                "spot",
                Light::Spot {
                    color: hex_color(0x78ff00),
                    intensity: 0.5,
                    position: Vec3::new(0.0, 2.0, 3.0),
                    target: Vec3::new(-0.75, 0.0, 0.0),
                    angle: std::f32::consts::PI * 0.1,
                    penumbra: 0.25,
                },
            ),
        ],
        material: MaterialParams::standard(),
        camera_position: Vec3::new(1.0, 1.0, 2.0),
        background: [0.0, 0.0, 0.0],
    };

    let mut store = ParamStore::new();
    let c = ParamClass::Continuous;

    color(&mut store, "ambient.color", [1.0, 1.0, 1.0])?;
    number(&mut store, "ambient.intensity", 0.5, 0.0, 1.0, 0.01, c)?;

    for (group, light) in [
        ("point", &descriptor.lights[2].light),
        ("directional", &descriptor.lights[1].light),
        ("spot", &descriptor.lights[3].light),
    ] {
        let position = light.position().expect("positional light");
        color(&mut store, &format!("{group}.color"), light.color())?;
        number(
            &mut store,
            &format!("{group}.intensity"),
            light.intensity() as f64,
            0.0,
            1.0,
            0.01,
            c,
        )?;
        for (axis, name) in ["position_x", "position_y", "position_z"].iter().enumerate() {
            number(
                &mut store,
                &format!("{group}.{name}"),
                position[axis] as f64,
                -50.0,
                50.0,
                0.1,
                c,
            )?;
        }
    }

    Ok((descriptor, store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rig_of_four_lights() {
        let (descriptor, _) = create().unwrap();
        assert_eq!(descriptor.lights.len(), 4);
        assert!(matches!(descriptor.lights[0].light, Light::Ambient { .. }));
        assert!(matches!(
            descriptor.lights[1].light,
            Light::Directional { .. }
        ));
        assert!(matches!(descriptor.lights[2].light, Light::Point { .. }));
        assert!(matches!(descriptor.lights[3].light, Light::Spot { .. }));
    }

    #[test]
    fn each_positional_light_has_its_own_controls() {
        let (_, store) = create().unwrap();
        // 2 ambient + 3 * (color + intensity + 3 axes) = 17 controls.
        assert_eq!(store.entries().len(), 17);
        assert_eq!(store.number("point.position_x").unwrap(), 2.3);
        assert_eq!(store.number("spot.position_z").unwrap(), 3.0);
        // The spot binds its own color, not the directional's.
        assert_eq!(store.color("spot.color").unwrap(), hex_color(0x78ff00));
    }

    #[test]
    fn ground_plane_is_static() {
        let (descriptor, _) = create().unwrap();
        let ground = descriptor
            .objects
            .iter()
            .find(|o| o.group == "ground")
            .unwrap();
        assert_eq!(ground.spin, SpinRates::default());
        assert!(ground.base_rotation.x < 0.0);
    }
}
