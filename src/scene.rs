use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, SceneError};
use crate::geometry::{GeometryParams, MeshData};
use crate::lights::{Light, LightHelper};
use crate::material::MaterialParams;
use crate::params::{ParamChange, ParamClass, ParamStore, ParamValue};

/// Opaque reference to an installed geometry resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Backing store for geometry resources. The renderer implements this over
/// GPU vertex/index buffers; tests implement it with counters.
///
/// Handles are exclusively owned: the rebuild path disposes a handle before
/// installing its replacement reference, never sharing one between objects.
pub trait GeometryHeap {
    /// Upload a mesh and return its handle.
    fn install(&mut self, mesh: &MeshData) -> GeometryHandle;

    /// Release the backing resources of a handle. Failure is non-fatal;
    /// callers log and continue.
    fn dispose(&mut self, handle: GeometryHandle) -> Result<()>;
}

/// Constant angular rates, radians per second. Orientation is always
/// `rate * elapsed`, never accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpinRates {
    pub x: f32,
    pub y: f32,
}

impl SpinRates {
    /// The rates every original demo uses for its tumbling meshes.
    pub const TUMBLE: SpinRates = SpinRates { x: 0.15, y: 0.1 };
}

/// One renderable node: a geometry reference plus transform state. The
/// object's identity (id) survives geometry rebuilds; only the handle
/// changes.
#[derive(Debug)]
pub struct SceneObject {
    pub id: u64,
    /// Parameter-path prefix this object listens to ("sphere", "torus").
    pub group: String,
    pub geometry: GeometryParams,
    pub handle: GeometryHandle,
    pub translation: Vec3,
    /// Static orientation applied before the animated spin (e.g. the
    /// ground plane lying flat).
    pub base_rotation: Vec3,
    pub spin: SpinRates,
    /// Animated euler angles, set by the driver each frame.
    pub orientation: Vec3,
}

impl SceneObject {
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.base_rotation.x + self.orientation.x,
            self.base_rotation.y + self.orientation.y,
            self.base_rotation.z + self.orientation.z,
        );
        Mat4::from_rotation_translation(rotation, self.translation)
    }
}

/// Declarative description of one renderable object in a demo.
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub group: String,
    pub geometry: GeometryParams,
    pub translation: Vec3,
    pub base_rotation: Vec3,
    pub spin: SpinRates,
}

impl ObjectSpec {
    pub fn new(group: &str, geometry: GeometryParams) -> Self {
        Self {
            group: group.to_string(),
            geometry,
            translation: Vec3::ZERO,
            base_rotation: Vec3::ZERO,
            spin: SpinRates::default(),
        }
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotated(mut self, base_rotation: Vec3) -> Self {
        self.base_rotation = base_rotation;
        self
    }

    pub fn spinning(mut self, spin: SpinRates) -> Self {
        self.spin = spin;
        self
    }
}

/// Declarative description of one light in a demo.
#[derive(Debug, Clone)]
pub struct LightSpec {
    pub group: String,
    pub light: Light,
}

impl LightSpec {
    pub fn new(group: &str, light: Light) -> Self {
        Self {
            group: group.to_string(),
            light,
        }
    }
}

/// The whole of one demo, declaratively: what to build and where the
/// camera starts. Parameter registration happens separately against the
/// store so domains live next to their initial values.
#[derive(Debug, Clone)]
pub struct DemoDescriptor {
    pub name: &'static str,
    pub objects: Vec<ObjectSpec>,
    pub lights: Vec<LightSpec>,
    pub material: MaterialParams,
    pub camera_position: Vec3,
    pub background: [f32; 3],
}

/// A light installed in the scene, paired with its optional helper.
#[derive(Debug)]
pub struct SceneLight {
    pub group: String,
    pub light: Light,
    pub helper: Option<LightHelper>,
}

/// Root container: objects, lights, one shared material. Built once at
/// startup from current store values; mutated afterwards only through
/// [`Scene::apply_change`] and the driver.
#[derive(Debug)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<SceneLight>,
    pub material: MaterialParams,
    pub background: [f32; 3],
    next_id: u64,
}

impl Scene {
    /// Pure construction step: instantiate every object and light from the
    /// descriptor overlaid with current store values, install geometries,
    /// and refresh every helper once.
    pub fn build(
        descriptor: &DemoDescriptor,
        store: &ParamStore,
        heap: &mut dyn GeometryHeap,
    ) -> Self {
        let mut scene = Scene {
            objects: Vec::new(),
            lights: Vec::new(),
            material: material_from_store(descriptor.material.clone(), store),
            background: descriptor.background,
            next_id: 0,
        };

        for spec in &descriptor.objects {
            let geometry = geometry_from_store(spec.geometry, &spec.group, store);
            let handle = heap.install(&geometry.generate());
            let id = scene.next_id;
            scene.next_id += 1;
            scene.objects.push(SceneObject {
                id,
                group: spec.group.clone(),
                geometry,
                handle,
                translation: spec.translation,
                base_rotation: spec.base_rotation,
                spin: spec.spin,
                orientation: Vec3::ZERO,
            });
        }

        for spec in &descriptor.lights {
            let light = light_from_store(spec.light.clone(), &spec.group, store);
            let helper = if light.has_helper() {
                let mut helper = LightHelper::new();
                helper.refresh(&light);
                Some(helper)
            } else {
                None
            };
            scene.lights.push(SceneLight {
                group: spec.group.clone(),
                light,
                helper,
            });
        }

        scene
    }

    pub fn object(&self, id: u64) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_by_group(&self, group: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.group == group)
    }

    /// Regenerate exactly the geometry owned by `id` from its current
    /// parameters: construct the new mesh, dispose the previous handle,
    /// then swap the reference. Disposal failure is logged and the swap
    /// proceeds; leaking is worse than a failed destroy.
    pub fn rebuild_geometry(&mut self, id: u64, heap: &mut dyn GeometryHeap) -> Result<()> {
        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SceneError::UnknownObject(id))?;

        let mesh = object.geometry.generate();
        let new_handle = heap.install(&mesh);
        if let Err(e) = heap.dispose(object.handle) {
            log::warn!("{} geometry: {e}", object.group);
        }
        object.handle = new_handle;
        Ok(())
    }

    /// Route one validated parameter change to the part of the scene it
    /// affects. Effects become visible on the next animation frame.
    pub fn apply_change(
        &mut self,
        change: &ParamChange,
        store: &ParamStore,
        heap: &mut dyn GeometryHeap,
    ) -> Result<()> {
        let (group, field) = split_path(&change.path)?;

        if group == "material" {
            return self.apply_material_change(field, &change.value);
        }

        if let Some(object) = self.objects.iter_mut().find(|o| o.group == group) {
            debug_assert_eq!(change.class, ParamClass::Structural);
            let id = object.id;
            object.geometry = geometry_from_store(object.geometry, group, store);
            return self.rebuild_geometry(id, heap);
        }

        if let Some(entry) = self.lights.iter_mut().find(|l| l.group == group) {
            apply_light_change(entry, field, &change.value)?;
            return Ok(());
        }

        Err(SceneError::UnknownParameter(change.path.clone()))
    }

    fn apply_material_change(&mut self, field: &str, value: &ParamValue) -> Result<()> {
        match (field, value) {
            ("color", ParamValue::Color(c)) => self.material.set_color(*c),
            ("opacity", ParamValue::Number(n)) => self.material.set_opacity(*n as f32),
            ("metalness", ParamValue::Number(n)) => self.material.set_metalness(*n as f32),
            ("roughness", ParamValue::Number(n)) => self.material.set_roughness(*n as f32),
            ("wireframe", ParamValue::Flag(b)) => self.material.set_wireframe(*b),
            ("transparent", ParamValue::Flag(b)) => self.material.set_transparent(*b),
            ("side", ParamValue::Choice(label)) => {
                match crate::material::MaterialSide::from_label(label) {
                    Some(side) => self.material.set_side(side),
                    None => {
                        return Err(SceneError::InvalidParameterDomain {
                            path: "material.side".into(),
                            reason: format!("unknown side '{label}'"),
                        });
                    }
                }
            }
            ("env_map", ParamValue::Choice(label)) => {
                self.material
                    .set_env_map(crate::assets::EnvMapVariant::from_label(label));
            }
            _ => {
                return Err(SceneError::UnknownParameter(format!("material.{field}")));
            }
        }
        Ok(())
    }
}

/// Apply one light-group field. Any transform or color mutation refreshes
/// the attached helper in the same call; a stale helper is a bug, not an
/// optimization.
fn apply_light_change(entry: &mut SceneLight, field: &str, value: &ParamValue) -> Result<()> {
    let mut needs_refresh = false;
    match (field, value) {
        ("color", ParamValue::Color(c)) => {
            entry.light.set_color(*c);
            needs_refresh = true;
        }
        ("intensity", ParamValue::Number(n)) => entry.light.set_intensity(*n as f32),
        ("position_x", ParamValue::Number(n)) => {
            entry.light.set_position_axis(0, *n as f32);
            needs_refresh = true;
        }
        ("position_y", ParamValue::Number(n)) => {
            entry.light.set_position_axis(1, *n as f32);
            needs_refresh = true;
        }
        ("position_z", ParamValue::Number(n)) => {
            entry.light.set_position_axis(2, *n as f32);
            needs_refresh = true;
        }
        _ => {
            return Err(SceneError::UnknownParameter(format!(
                "{}.{field}",
                entry.group
            )));
        }
    }
    if needs_refresh {
        if let Some(helper) = &mut entry.helper {
            helper.refresh(&entry.light);
        }
    }
    Ok(())
}

fn split_path(path: &str) -> Result<(&str, &str)> {
    path.split_once('.')
        .ok_or_else(|| SceneError::UnknownParameter(path.to_string()))
}

fn read_f32(store: &ParamStore, path: &str, fallback: f32) -> f32 {
    store.number_f32(path).unwrap_or(fallback)
}

fn read_u32(store: &ParamStore, path: &str, fallback: u32) -> u32 {
    store
        .number(path)
        .map(|n| n.round() as u32)
        .unwrap_or(fallback)
}

/// Overlay registered store values onto a geometry template. Fields a demo
/// chose not to expose keep their descriptor defaults.
pub fn geometry_from_store(
    template: GeometryParams,
    group: &str,
    store: &ParamStore,
) -> GeometryParams {
    let p = |field: &str| format!("{group}.{field}");
    match template {
        GeometryParams::Box {
            width,
            height,
            depth,
        } => GeometryParams::Box {
            width: read_f32(store, &p("width"), width),
            height: read_f32(store, &p("height"), height),
            depth: read_f32(store, &p("depth"), depth),
        },
        GeometryParams::Sphere {
            radius,
            width_segments,
            height_segments,
        } => GeometryParams::Sphere {
            radius: read_f32(store, &p("radius"), radius),
            width_segments: read_u32(store, &p("width_segments"), width_segments),
            height_segments: read_u32(store, &p("height_segments"), height_segments),
        },
        GeometryParams::Plane {
            width,
            height,
            width_segments,
            height_segments,
        } => GeometryParams::Plane {
            width: read_f32(store, &p("width"), width),
            height: read_f32(store, &p("height"), height),
            width_segments: read_u32(store, &p("width_segments"), width_segments),
            height_segments: read_u32(store, &p("height_segments"), height_segments),
        },
        GeometryParams::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
            arc,
        } => GeometryParams::Torus {
            radius: read_f32(store, &p("radius"), radius),
            tube: read_f32(store, &p("tube"), tube),
            radial_segments: read_u32(store, &p("radial_segments"), radial_segments),
            tubular_segments: read_u32(store, &p("tubular_segments"), tubular_segments),
            arc: read_f32(store, &p("arc"), arc),
        },
    }
}

fn material_from_store(mut material: MaterialParams, store: &ParamStore) -> MaterialParams {
    if let Ok(c) = store.color("material.color") {
        material.set_color(c);
    }
    if let Ok(n) = store.number_f32("material.opacity") {
        material.set_opacity(n);
    }
    if let Ok(n) = store.number_f32("material.metalness") {
        material.set_metalness(n);
    }
    if let Ok(n) = store.number_f32("material.roughness") {
        material.set_roughness(n);
    }
    if let Ok(b) = store.flag("material.wireframe") {
        material.set_wireframe(b);
    }
    if let Ok(b) = store.flag("material.transparent") {
        material.set_transparent(b);
    }
    if let Ok(label) = store.choice("material.side") {
        if let Some(side) = crate::material::MaterialSide::from_label(label) {
            material.set_side(side);
        }
    }
    if let Ok(label) = store.choice("material.env_map") {
        material.set_env_map(crate::assets::EnvMapVariant::from_label(label));
    }
    material.clear_dirty();
    material
}

fn light_from_store(mut light: Light, group: &str, store: &ParamStore) -> Light {
    if let Ok(c) = store.color(&format!("{group}.color")) {
        light.set_color(c);
    }
    if let Ok(n) = store.number_f32(&format!("{group}.intensity")) {
        light.set_intensity(n);
    }
    for (axis, name) in ["position_x", "position_y", "position_z"].iter().enumerate() {
        if let Ok(n) = store.number_f32(&format!("{group}.{name}")) {
            light.set_position_axis(axis, n);
        }
    }
    light
}
