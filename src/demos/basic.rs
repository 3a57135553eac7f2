//! The minimal demo: one static unlit box, no panel controls.

use glam::Vec3;

use crate::error::Result;
use crate::geometry::GeometryParams;
use crate::material::MaterialParams;
use crate::params::ParamStore;
use crate::scene::{DemoDescriptor, ObjectSpec};

use super::hex_color;

pub fn create() -> Result<(DemoDescriptor, ParamStore)> {
    let descriptor = DemoDescriptor {
        name: "basic",
        objects: vec![ObjectSpec::new(
            "box",
            GeometryParams::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
        )],
        lights: vec![],
        material: MaterialParams::basic(hex_color(0x715ee6)),
        camera_position: Vec3::new(0.0, 0.0, 3.0),
        background: [0.0, 0.0, 0.0],
    };

    Ok((descriptor, ParamStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_does_not_spin() {
        let (descriptor, store) = create().unwrap();
        assert_eq!(descriptor.objects.len(), 1);
        assert_eq!(descriptor.objects[0].spin, crate::scene::SpinRates::default());
        assert!(store.entries().is_empty());
        assert!(descriptor.lights.is_empty());
    }
}
