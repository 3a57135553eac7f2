use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use parascene::cli::Cli;
use parascene::context::{SceneContext, Viewport};
use parascene::panel::ControlPanel;
use parascene::renderer::Renderer;

const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    context: Option<SceneContext>,
    panel: ControlPanel,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl App {
    fn new(cli: Cli) -> Self {
        let panel = ControlPanel::new(!cli.no_ui);
        Self {
            cli,
            window: None,
            renderer: None,
            context: None,
            panel,
            dragging: false,
            last_cursor: None,
        }
    }

    fn redraw(&mut self) {
        let (Some(renderer), Some(context), Some(window)) =
            (&mut self.renderer, &mut self.context, &self.window)
        else {
            return;
        };

        context.tick();

        match renderer.render(
            &mut context.scene,
            &context.camera,
            window,
            &mut self.panel,
            &mut context.store,
        ) {
            Ok(changes) => {
                // Panel edits land on the next frame: continuous ones patch
                // in place, structural ones rebuild their resource.
                for change in changes {
                    if let Err(e) = context.scene.apply_change(&change, &context.store, renderer) {
                        log::warn!("{}: {e}", change.path);
                    }
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let viewport = context.viewport;
                renderer.resize(viewport.width, viewport.height);
            }
            Err(e) => log::error!("render: {e}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let title = format!("parascene - {}", self.cli.demo.name());
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match pollster::block_on(Renderer::new(
            window.clone(),
            self.cli.assets_root.clone(),
        )) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        let (descriptor, store) = match self.cli.demo.create() {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Failed to create demo: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height, window.scale_factor() as f32);
        renderer.resize(viewport.width, viewport.height);
        let mut context = SceneContext::new(descriptor, store, viewport, &mut renderer);
        context.driver.start();

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.context = Some(context);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let (Some(context), Some(renderer)) = (&mut self.context, &mut self.renderer) {
                    context.teardown(renderer);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Camera aspect and projection update before the surface
                // reconfigures; the surface gets the capped-ratio size.
                let ratio = self
                    .window
                    .as_ref()
                    .map(|w| w.scale_factor() as f32)
                    .unwrap_or(1.0);
                let viewport = Viewport::new(size.width, size.height, ratio);
                if let Some(context) = &mut self.context {
                    context.resize(size.width, size.height, ratio);
                }
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(viewport.width, viewport.height);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state.is_pressed();
                if !self.dragging {
                    self.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let (Some(context), Some((lx, ly))) = (&mut self.context, self.last_cursor)
                    {
                        context.controls.rotate(
                            (position.x - lx) as f32,
                            (position.y - ly) as f32,
                        );
                    }
                    self.last_cursor = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(context) = &mut self.context {
                    let amount = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                    };
                    context.controls.zoom(amount);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn dump_params(cli: &Cli) -> Result<()> {
    let (_, store) = cli.demo.create()?;
    let mut map = serde_json::Map::new();
    for entry in store.entries() {
        map.insert(entry.path.clone(), serde_json::to_value(&entry.value)?);
    }
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.dump_params {
        return dump_params(&cli);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
