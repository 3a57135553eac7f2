//! One declarative descriptor per demo. The four programs of the original
//! playground share a single generic scene abstraction; all that differs
//! here is geometry, parameter domains, material kind, lights, and camera.

pub mod basic;
pub mod light;
pub mod mesh_basic;
pub mod mesh_standard;

use crate::error::Result;
use crate::params::{Domain, ParamClass, ParamStore, ParamValue};
use crate::scene::DemoDescriptor;

/// Demo selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    Basic,
    MeshBasic,
    MeshStandard,
    Light,
}

impl DemoKind {
    pub const ALL: [DemoKind; 4] = [
        DemoKind::Basic,
        DemoKind::MeshBasic,
        DemoKind::MeshStandard,
        DemoKind::Light,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        DemoKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            DemoKind::Basic => "basic",
            DemoKind::MeshBasic => "mesh-basic",
            DemoKind::MeshStandard => "mesh-standard",
            DemoKind::Light => "light",
        }
    }

    /// Descriptor plus the fully registered parameter store for this demo.
    pub fn create(self) -> Result<(DemoDescriptor, ParamStore)> {
        match self {
            DemoKind::Basic => basic::create(),
            DemoKind::MeshBasic => mesh_basic::create(),
            DemoKind::MeshStandard => mesh_standard::create(),
            DemoKind::Light => light::create(),
        }
    }
}

// Registration shorthands shared by the demo modules.

pub(crate) fn number(
    store: &mut ParamStore,
    path: &str,
    initial: f64,
    min: f64,
    max: f64,
    step: f64,
    class: ParamClass,
) -> Result<()> {
    store.register(
        path,
        ParamValue::Number(initial),
        Domain::Range { min, max, step },
        class,
    )
}

pub(crate) fn color(store: &mut ParamStore, path: &str, initial: [f32; 3]) -> Result<()> {
    store.register(
        path,
        ParamValue::Color(initial),
        Domain::Color,
        ParamClass::Continuous,
    )
}

pub(crate) fn flag(store: &mut ParamStore, path: &str, initial: bool) -> Result<()> {
    store.register(
        path,
        ParamValue::Flag(initial),
        Domain::Flag,
        ParamClass::Structural,
    )
}

pub(crate) fn choice(
    store: &mut ParamStore,
    path: &str,
    initial: &str,
    options: &[&str],
) -> Result<()> {
    store.register(
        path,
        ParamValue::Choice(initial.to_string()),
        Domain::Choices(options.iter().map(|s| s.to_string()).collect()),
        ParamClass::Structural,
    )
}

/// sRGB hex color ("#715ee6") to linear-ish [0,1] RGB. The panel edits the
/// same representation, so no gamma handling happens here.
pub(crate) fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_creates() {
        for kind in DemoKind::ALL {
            let (descriptor, store) = kind.create().unwrap();
            assert_eq!(descriptor.name, kind.name());
            // Registered paths all belong to a declared group or material.
            for entry in store.entries() {
                let group = entry.path.split('.').next().unwrap();
                let known = group == "material"
                    || descriptor.objects.iter().any(|o| o.group == group)
                    || descriptor.lights.iter().any(|l| l.group == group);
                assert!(known, "{}: orphan parameter {}", kind.name(), entry.path);
            }
        }
    }

    #[test]
    fn hex_color_decodes() {
        assert_eq!(hex_color(0xff0000), [1.0, 0.0, 0.0]);
        let c = hex_color(0x715ee6);
        assert!((c[0] - 0x71 as f32 / 255.0).abs() < 1e-6);
        assert!((c[2] - 0xe6 as f32 / 255.0).abs() < 1e-6);
    }
}
