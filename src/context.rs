use crate::camera::{Camera, OrbitControls};
use crate::core::clock::{Clock, TimeSource};
use crate::driver::AnimationDriver;
use crate::params::ParamStore;
use crate::scene::{DemoDescriptor, GeometryHeap, Scene};

/// Device pixel ratios above this are clamped; matching the renderer cap
/// of the original demos.
pub const PIXEL_RATIO_CAP: f32 = 2.0;

/// Viewport-dependent derived state, recomputed on every resize.
///
/// `width`/`height` are the render surface dimensions: when the display's
/// ratio exceeds [`PIXEL_RATIO_CAP`] the raw physical size is scaled back
/// down so the backbuffer never renders above the cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        let capped = pixel_ratio.min(PIXEL_RATIO_CAP);
        let scale = if pixel_ratio > PIXEL_RATIO_CAP {
            capped / pixel_ratio
        } else {
            1.0
        };
        Self {
            width: ((width as f32 * scale).round() as u32).max(1),
            height: ((height as f32 * scale).round() as u32).max(1),
            pixel_ratio: capped,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Everything one demo owns, with an explicit initialization and teardown
/// lifecycle. Replaces the module-level globals of the original programs:
/// the scene builder, rebuild path, and animation driver all receive this
/// context instead of reaching into shared state.
pub struct SceneContext {
    pub descriptor: DemoDescriptor,
    pub store: ParamStore,
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub driver: AnimationDriver,
    pub clock: Clock,
    pub viewport: Viewport,
}

impl SceneContext {
    /// Build the scene from the descriptor and current store values and
    /// place the camera. The driver starts in `NotStarted`.
    pub fn new(
        descriptor: DemoDescriptor,
        store: ParamStore,
        viewport: Viewport,
        heap: &mut dyn GeometryHeap,
    ) -> Self {
        let scene = Scene::build(&descriptor, &store, heap);
        let camera_position = descriptor.camera_position;
        let camera = Camera::new(camera_position, viewport.aspect());
        let controls = OrbitControls::from_position(camera_position);

        Self {
            descriptor,
            store,
            scene,
            camera,
            controls,
            driver: AnimationDriver::new(),
            clock: Clock::new(),
            viewport,
        }
    }

    /// The resize contract, in order: record viewport, update camera
    /// aspect, recompute the projection. The caller resizes the render
    /// surface afterwards, before the next frame renders.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.viewport = Viewport::new(width, height, pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        self.camera.update_projection();
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        self.driver.tick(
            &self.clock as &dyn TimeSource,
            &mut self.scene,
            &mut self.controls,
            &mut self.camera,
        );
    }

    /// Dispose every installed geometry. Called once when the hosting
    /// window goes away; disposal failures are logged by the scene.
    pub fn teardown(&mut self, heap: &mut dyn GeometryHeap) {
        for object in self.scene.objects.drain(..) {
            if let Err(e) = heap.dispose(object.handle) {
                log::warn!("teardown: {e}");
            }
        }
        self.scene.lights.clear();
    }
}

impl std::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("demo", &self.descriptor.name)
            .field("objects", &self.scene.objects.len())
            .field("viewport", &self.viewport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SceneError};
    use crate::geometry::{GeometryParams, MeshData};
    use crate::material::MaterialParams;
    use crate::scene::{GeometryHandle, ObjectSpec, SpinRates};
    use glam::Vec3;

    #[derive(Default)]
    struct CountingHeap {
        next: u64,
        live: Vec<u64>,
    }

    impl GeometryHeap for CountingHeap {
        fn install(&mut self, _mesh: &MeshData) -> GeometryHandle {
            let h = self.next;
            self.next += 1;
            self.live.push(h);
            GeometryHandle(h)
        }
        fn dispose(&mut self, handle: GeometryHandle) -> Result<()> {
            match self.live.iter().position(|&h| h == handle.0) {
                Some(i) => {
                    self.live.remove(i);
                    Ok(())
                }
                None => Err(SceneError::ResourceDisposalFailure {
                    handle: handle.0,
                    reason: "not live".into(),
                }),
            }
        }
    }

    fn descriptor() -> DemoDescriptor {
        DemoDescriptor {
            name: "test",
            objects: vec![
                ObjectSpec::new(
                    "box",
                    GeometryParams::Box {
                        width: 1.0,
                        height: 1.0,
                        depth: 1.0,
                    },
                )
                .spinning(SpinRates::TUMBLE),
            ],
            lights: vec![],
            material: MaterialParams::basic([0.44, 0.37, 0.9]),
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            background: [0.0; 3],
        }
    }

    #[test]
    fn viewport_caps_pixel_ratio() {
        let viewport = Viewport::new(800, 600, 3.0);
        assert_eq!(viewport.pixel_ratio, PIXEL_RATIO_CAP);
        let viewport = Viewport::new(800, 600, 1.5);
        assert_eq!(viewport.pixel_ratio, 1.5);
    }

    #[test]
    fn oversized_pixel_ratio_shrinks_surface() {
        // A 3x display renders at the 2x cap: the surface drops to 2/3 of
        // the raw physical size, keeping the aspect.
        let viewport = Viewport::new(2400, 1800, 3.0);
        assert_eq!((viewport.width, viewport.height), (1600, 1200));
        assert!((viewport.aspect() - 2400.0 / 1800.0).abs() < 1e-6);
    }

    #[test]
    fn capped_pixel_ratio_passes_size_through() {
        let viewport = Viewport::new(1600, 1200, 2.0);
        assert_eq!((viewport.width, viewport.height), (1600, 1200));
        let viewport = Viewport::new(800, 600, 1.0);
        assert_eq!((viewport.width, viewport.height), (800, 600));
    }

    #[test]
    fn viewport_never_zero_sized() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert_eq!((viewport.width, viewport.height), (1, 1));
    }

    #[test]
    fn resize_applies_aspect_before_projection() {
        let mut heap = CountingHeap::default();
        let mut ctx = SceneContext::new(
            descriptor(),
            ParamStore::new(),
            Viewport::new(800, 600, 1.0),
            &mut heap,
        );
        assert!((ctx.camera.aspect() - 800.0 / 600.0).abs() < 1e-6);

        ctx.resize(1920, 1080, 1.0);
        assert!((ctx.camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        // Projection already reflects the new aspect.
        let expected = glam::Mat4::perspective_rh(
            ctx.camera.fov_y,
            1920.0 / 1080.0,
            ctx.camera.near,
            ctx.camera.far,
        );
        assert_eq!(ctx.camera.projection(), expected);
    }

    #[test]
    fn teardown_disposes_every_geometry() {
        let mut heap = CountingHeap::default();
        let mut ctx = SceneContext::new(
            descriptor(),
            ParamStore::new(),
            Viewport::new(800, 600, 1.0),
            &mut heap,
        );
        assert_eq!(heap.live.len(), 1);

        ctx.teardown(&mut heap);
        assert!(heap.live.is_empty());
        assert!(ctx.scene.objects.is_empty());
    }

    #[test]
    fn tick_requires_started_driver() {
        let mut heap = CountingHeap::default();
        let mut ctx = SceneContext::new(
            descriptor(),
            ParamStore::new(),
            Viewport::new(800, 600, 1.0),
            &mut heap,
        );
        ctx.tick();
        assert_eq!(ctx.driver.frames(), 0);

        ctx.driver.start();
        ctx.tick();
        assert_eq!(ctx.driver.frames(), 1);
    }
}
