//! Forward renderer over wgpu. Owns the surface, the geometry heap backing
//! every scene object, and the egui overlay that hosts the control panel.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::assets::{self, CubeFaces, EnvMapVariant};
use crate::camera::Camera;
use crate::context::PIXEL_RATIO_CAP;
use crate::error::{Result as SceneResult, SceneError};
use crate::geometry::{MeshData, Vertex};
use crate::lights::Light;
use crate::material::{MaterialKind, MaterialParams, MaterialSide};
use crate::panel::ControlPanel;
use crate::params::{ParamChange, ParamStore};
use crate::scene::{GeometryHandle, GeometryHeap, Scene};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const MAX_LIGHTS: usize = 8;
const MAX_OBJECTS: usize = 16;
/// Dynamic-offset stride for per-object uniforms; 256 is the guaranteed
/// minimum uniform alignment.
const MODEL_STRIDE: wgpu::BufferAddress = 256;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// === GPU Data Structures ===

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    position: [f32; 3],
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    /// rgb + opacity.
    color: [f32; 4],
    /// metalness, roughness, use_env, unused.
    params: [f32; 4],
}

impl MaterialUniform {
    fn from_material(material: &MaterialParams) -> Self {
        let alpha = if material.transparent {
            material.opacity
        } else {
            1.0
        };
        Self {
            color: [
                material.color[0],
                material.color[1],
                material.color[2],
                alpha,
            ],
            params: [
                material.metalness,
                material.roughness,
                if material.env_map.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// One light slot, vec4-packed to match the WGSL layout. `position.w`
/// carries the kind tag.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuLight {
    position: [f32; 4],
    color: [f32; 4],
    direction: [f32; 4],
    cone: [f32; 4],
}

impl GpuLight {
    fn encode(light: &Light) -> Self {
        let color = light.color();
        let mut slot = GpuLight {
            color: [color[0], color[1], color[2], light.intensity()],
            ..Default::default()
        };
        match *light {
            Light::Ambient { .. } => {
                slot.position[3] = 0.0;
            }
            Light::Directional { position, .. } => {
                slot.position = [position.x, position.y, position.z, 1.0];
                let dir = position.normalize_or_zero();
                slot.direction = [dir.x, dir.y, dir.z, 0.0];
            }
            Light::Point {
                position,
                range,
                decay,
                ..
            } => {
                slot.position = [position.x, position.y, position.z, 2.0];
                slot.direction[3] = range;
                slot.cone[0] = decay;
            }
            Light::Spot {
                position,
                target,
                angle,
                penumbra,
                ..
            } => {
                slot.position = [position.x, position.y, position.z, 3.0];
                let axis = (target - position).normalize_or_zero();
                slot.direction = [axis.x, axis.y, axis.z, 0.0];
                slot.cone = [1.0, angle.cos(), (angle * (1.0 - penumbra)).cos(), 0.0];
            }
        }
        slot
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LightsUniform {
    count: [u32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

impl LightsUniform {
    fn from_scene(scene: &Scene) -> Self {
        let mut uniform = LightsUniform {
            count: [0; 4],
            lights: [GpuLight::default(); MAX_LIGHTS],
        };
        for entry in scene.lights.iter().take(MAX_LIGHTS) {
            uniform.lights[uniform.count[0] as usize] = GpuLight::encode(&entry.light);
            uniform.count[0] += 1;
        }
        uniform
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct HelperVertex {
    position: [f32; 3],
    color: [f32; 3],
}

// === Pipeline Selection ===

/// Everything that forces a distinct render pipeline. Continuous material
/// changes reuse the cached pipeline; structural ones select (and lazily
/// build) another entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    kind: MaterialKind,
    wireframe: bool,
    transparent: bool,
    side: MaterialSide,
}

impl PipelineKey {
    fn from_material(material: &MaterialParams) -> Self {
        Self {
            kind: material.kind,
            wireframe: material.wireframe,
            transparent: material.transparent,
            side: material.side,
        }
    }
}

/// Geometry resource installed on the GPU.
struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

// === Renderer ===

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    shader: wgpu::ShaderModule,

    scene_bind_group_layout: wgpu::BindGroupLayout,
    material_bind_group_layout: wgpu::BindGroupLayout,
    model_bind_group_layout: wgpu::BindGroupLayout,

    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    material_bind_group: wgpu::BindGroup,
    model_bind_group: wgpu::BindGroup,
    env_sampler: wgpu::Sampler,
    /// Which variant the bound cube texture was built from; `None` means
    /// the neutral placeholder from startup.
    bound_env: Option<EnvMapVariant>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    helper_pipeline: wgpu::RenderPipeline,
    helper_buffer: wgpu::Buffer,
    helper_capacity: u64,

    geometries: HashMap<u64, GpuGeometry>,
    next_handle: u64,
    supports_line_polygons: bool,
    assets_root: PathBuf,

    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, assets_root: PathBuf) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| "Failed to find appropriate adapter")?;

        // Wireframe needs line polygon fill; fall back to solid fill when
        // the adapter cannot do it.
        let supports_line_polygons = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if supports_line_polygons {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::warn!("adapter lacks line polygon mode; wireframe renders solid");
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &config);
        let depth_view = Self::create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false),
                    uniform_layout_entry(1, wgpu::ShaderStages::FRAGMENT, false),
                ],
                label: Some("scene_bind_group_layout"),
            });

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT, false),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("material_bind_group_layout"),
            });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX, true)],
                label: Some("model_bind_group_layout"),
            });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lights Buffer"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let material_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Material Buffer"),
            size: std::mem::size_of::<MaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: MODEL_STRIDE * MAX_OBJECTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
            label: Some("scene_bind_group"),
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
            label: Some("model_bind_group"),
        });

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Start with the neutral placeholder; the first material with an
        // env map swaps the real texture in.
        let placeholder = CubeFaces::placeholder(EnvMapVariant::Zero);
        let env_view = create_cube_texture(&device, &queue, &placeholder);
        let material_bind_group = create_material_bind_group(
            &device,
            &material_bind_group_layout,
            &material_buffer,
            &env_view,
            &env_sampler,
        );

        let helper_capacity = 1024;
        let helper_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Helper Vertex Buffer"),
            size: helper_capacity * std::mem::size_of::<HelperVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let helper_pipeline = Self::create_helper_pipeline(
            &device,
            &shader,
            &scene_bind_group_layout,
            config.format,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some((window.scale_factor() as f32).min(PIXEL_RATIO_CAP)),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            config.format,
            egui_wgpu::RendererOptions::default(),
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            shader,
            scene_bind_group_layout,
            material_bind_group_layout,
            model_bind_group_layout,
            camera_buffer,
            lights_buffer,
            material_buffer,
            model_buffer,
            scene_bind_group,
            material_bind_group,
            model_bind_group,
            env_sampler,
            bound_env: None,
            pipelines: HashMap::new(),
            helper_pipeline,
            helper_buffer,
            helper_capacity,
            geometries: HashMap::new(),
            next_handle: 0,
            supports_line_polygons,
            assets_root,
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Reconfigure the surface and depth buffer. The caller updates the
    /// camera aspect separately, before redrawing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config);
    }

    /// Let egui see the event first; returns true when it consumed it.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Swap in the material's pipeline and env-map binding after a
    /// structural change. Continuous fields only flow through the uniform.
    fn realize_material(&mut self, material: &MaterialParams) {
        if material.env_map.is_some() && material.env_map != self.bound_env {
            let variant = material.env_map.unwrap();
            let cube = assets::load_cube_or_placeholder(&self.assets_root, variant);
            let env_view = create_cube_texture(&self.device, &self.queue, &cube);
            self.material_bind_group = create_material_bind_group(
                &self.device,
                &self.material_bind_group_layout,
                &self.material_buffer,
                &env_view,
                &self.env_sampler,
            );
            self.bound_env = material.env_map;
        }
        self.ensure_pipeline(PipelineKey::from_material(material));
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let pipeline = create_mesh_pipeline(
            &self.device,
            &self.shader,
            &[
                &self.scene_bind_group_layout,
                &self.material_bind_group_layout,
                &self.model_bind_group_layout,
            ],
            self.config.format,
            key,
            self.supports_line_polygons,
        );
        self.pipelines.insert(key, pipeline);
    }

    fn upload_frame_uniforms(&mut self, scene: &Scene, camera: &Camera) {
        let camera_uniform = CameraUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: camera.position.to_array(),
            _pad: 0.0,
        };
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let lights = LightsUniform::from_scene(scene);
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[lights]));

        let material = MaterialUniform::from_material(&scene.material);
        self.queue
            .write_buffer(&self.material_buffer, 0, bytemuck::cast_slice(&[material]));

        for (i, object) in scene.objects.iter().take(MAX_OBJECTS).enumerate() {
            let model = ModelUniform {
                model: object.model_matrix().to_cols_array_2d(),
            };
            self.queue.write_buffer(
                &self.model_buffer,
                i as u64 * MODEL_STRIDE,
                bytemuck::cast_slice(&[model]),
            );
        }
    }

    fn upload_helper_vertices(&mut self, scene: &Scene) -> u32 {
        let mut vertices: Vec<HelperVertex> = Vec::new();
        for entry in &scene.lights {
            let Some(helper) = &entry.helper else { continue };
            for segment in &helper.segments {
                for end in segment {
                    vertices.push(HelperVertex {
                        position: end.to_array(),
                        color: helper.color,
                    });
                }
            }
        }

        if vertices.is_empty() {
            return 0;
        }
        if vertices.len() as u64 > self.helper_capacity {
            self.helper_capacity = (vertices.len() as u64).next_power_of_two();
            self.helper_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Helper Vertex Buffer"),
                size: self.helper_capacity * std::mem::size_of::<HelperVertex>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        self.queue
            .write_buffer(&self.helper_buffer, 0, bytemuck::cast_slice(&vertices));
        vertices.len() as u32
    }

    /// Draw one frame and run the egui overlay. Panel edits are returned to
    /// the caller, which routes them through the scene before the next
    /// frame.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        window: &Window,
        panel: &mut ControlPanel,
        store: &mut ParamStore,
    ) -> std::result::Result<Vec<ParamChange>, wgpu::SurfaceError> {
        if scene.material.is_dirty() || self.pipelines.is_empty() {
            let material = scene.material.clone();
            self.realize_material(&material);
            scene.material.clear_dirty();
        }

        self.upload_frame_uniforms(scene, camera);
        let helper_vertex_count = self.upload_helper_vertices(scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let [r, g, b] = scene.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let key = PipelineKey::from_material(&scene.material);
            if let Some(pipeline) = self.pipelines.get(&key) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_bind_group(1, &self.material_bind_group, &[]);

                for (i, object) in scene.objects.iter().take(MAX_OBJECTS).enumerate() {
                    let Some(geometry) = self.geometries.get(&object.handle.0) else {
                        log::warn!("{}: geometry handle not installed", object.group);
                        continue;
                    };
                    let offset = (i as u64 * MODEL_STRIDE) as u32;
                    render_pass.set_bind_group(2, &self.model_bind_group, &[offset]);
                    render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(
                        geometry.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
                }
            }

            if helper_vertex_count > 0 {
                render_pass.set_pipeline(&self.helper_pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.helper_buffer.slice(..));
                render_pass.draw(0..helper_vertex_count, 0..1);
            }
        }

        // egui pass - control panel overlay
        let mut changes = Vec::new();
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            changes = panel.show(ctx, store);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        // The surface is sized for the capped ratio, so egui scales by the
        // same cap to keep its logical layout aligned with the window.
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: (window.scale_factor() as f32).min(PIXEL_RATIO_CAP),
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the encoder,
            // but egui-wgpu requires 'static. This is safe because we drop the
            // render pass before using the encoder again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(changes)
    }

    fn create_helper_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        scene_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Helper Pipeline Layout"),
            bind_group_layouts: &[scene_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Helper Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_helper"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<HelperVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_helper"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}

// === Geometry Heap ===

impl GeometryHeap for Renderer {
    fn install(&mut self, mesh: &MeshData) -> GeometryHandle {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Vertices"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let handle = self.next_handle;
        self.next_handle += 1;
        self.geometries.insert(
            handle,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
            },
        );
        GeometryHandle(handle)
    }

    fn dispose(&mut self, handle: GeometryHandle) -> SceneResult<()> {
        match self.geometries.remove(&handle.0) {
            Some(geometry) => {
                geometry.vertex_buffer.destroy();
                geometry.index_buffer.destroy();
                Ok(())
            }
            None => Err(SceneError::ResourceDisposalFailure {
                handle: handle.0,
                reason: "handle not installed".into(),
            }),
        }
    }
}

// === Helpers ===

fn uniform_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    dynamic: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_cube_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    cube: &CubeFaces,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Environment Cube"),
        size: wgpu::Extent3d {
            width: cube.size,
            height: cube.size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (i, face) in cube.faces.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: i as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            face,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(cube.size * 4),
                rows_per_image: Some(cube.size),
            },
            wgpu::Extent3d {
                width: cube.size,
                height: cube.size,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

fn create_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    material_buffer: &wgpu::Buffer,
    env_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("material_bind_group"),
    })
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
    supports_line_polygons: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let fragment_entry = match key.kind {
        MaterialKind::Basic => "fs_basic",
        MaterialKind::Standard => "fs_standard",
    };
    let cull_mode = match key.side {
        MaterialSide::Front => Some(wgpu::Face::Back),
        MaterialSide::Back => Some(wgpu::Face::Front),
        MaterialSide::Double => None,
    };
    let polygon_mode = if key.wireframe && supports_line_polygons {
        wgpu::PolygonMode::Line
    } else {
        wgpu::PolygonMode::Fill
    };
    let blend = if key.transparent {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_mesh"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: !key.transparent,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
