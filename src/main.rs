use std::collections::HashSet;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use glutin::config::ConfigTemplate;
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use log::{info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

mod camera;
mod framebuffer;
mod hud;
mod logger;
mod mesh;
mod model;
mod renderer;
mod scene;
mod shader;
mod skybox;
mod texture;

use camera::{Camera, CameraMovement};
use renderer::Renderer;

const SCR_WIDTH: u32 = 1280;
const SCR_HEIGHT: u32 = 768;
const TITLE: &str = "Aiming Simulator";

struct Timer {
    last_frame: Instant,
    delta_time: f64,
}

impl Timer {
    fn new() -> Timer {
        Timer {
            last_frame: Instant::now(),
            delta_time: 0.0,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
    }
}

#[derive(Default)]
struct App {
    timer: Option<Timer>,

    window: Option<Window>,
    current_context: Option<PossiblyCurrentContext>,
    surface: Option<Surface<WindowSurface>>,

    gl: Option<Arc<glow::Context>>,

    renderer: Option<Renderer>,
    camera: Option<Camera>,

    pressed: HashSet<KeyCode>,
    last_mouse: Option<(f32, f32)>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(SCR_WIDTH, SCR_HEIGHT))
            .with_resizable(false);
        self.window = Some(
            event_loop
                .create_window(attributes)
                .expect("Failed to create window"),
        );
        let window = self.window.as_ref().unwrap();

        let display_handle = window.display_handle().unwrap();
        let window_handle = window.window_handle().unwrap();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(window_handle.into()));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        let display = unsafe {
            Display::new(display_handle.into(), preference).expect("Failed to create GL display")
        };

        let config_template = ConfigTemplate::default();
        let config = unsafe {
            display
                .find_configs(config_template)
                .unwrap()
                .next()
                .unwrap()
        };

        let physical_size = window.inner_size();
        let width = NonZeroU32::new(physical_size.width).unwrap();
        let height = NonZeroU32::new(physical_size.height).unwrap();

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::build(
            SurfaceAttributesBuilder::new(),
            window_handle.into(),
            width,
            height,
        );

        let context_attributes = ContextAttributesBuilder::new().build(Some(window_handle.into()));

        let surface = unsafe {
            display
                .create_window_surface(&config, &surface_attributes)
                .unwrap()
        };
        let non_current_context = unsafe {
            display
                .create_context(&config, &context_attributes)
                .unwrap()
        };
        let current_context = non_current_context.make_current(&surface).unwrap();

        if let Err(e) =
            surface.set_swap_interval(&current_context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            warn!("Failed to enable vsync: {}", e);
        }

        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function(|s| {
                let c_str = CString::new(s).unwrap();
                display.get_proc_address(&c_str) as *const _
            }))
        };

        self.renderer = Some(Renderer::new(&gl, physical_size.width, physical_size.height));
        self.camera = Some(Camera::new(cgmath::Point3::new(0.0, 0.0, 3.0)));

        self.surface = Some(surface);
        self.current_context = Some(current_context);
        self.gl = Some(gl);
        self.timer = Some(Timer::new());

        info!("Engine successfully initialized");
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape {
                        info!("Escape pressed, shutting down");
                        event_loop.exit();
                        return;
                    }
                    match event.state {
                        ElementState::Pressed => {
                            self.pressed.insert(code);
                        }
                        ElementState::Released => {
                            self.pressed.remove(&code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                if let Some(camera) = self.camera.as_mut() {
                    if let Some((last_x, last_y)) = self.last_mouse {
                        // y grows downwards in window coordinates
                        camera.process_mouse(x - last_x, last_y - y);
                    }
                }
                self.last_mouse = Some((x, y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(camera) = self.camera.as_mut() {
                    if let MouseScrollDelta::LineDelta(_, y) = delta {
                        camera.process_scroll(y);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(timer), Some(camera), Some(renderer), Some(gl)) = (
                    self.timer.as_mut(),
                    self.camera.as_mut(),
                    self.renderer.as_ref(),
                    self.gl.as_ref(),
                ) else {
                    return;
                };

                timer.update();
                let delta_time = timer.delta_time as f32;

                if self.pressed.contains(&KeyCode::KeyW) {
                    camera.process_keyboard(CameraMovement::Forward, delta_time);
                }
                if self.pressed.contains(&KeyCode::KeyS) {
                    camera.process_keyboard(CameraMovement::Backward, delta_time);
                }
                if self.pressed.contains(&KeyCode::KeyA) {
                    camera.process_keyboard(CameraMovement::Left, delta_time);
                }
                if self.pressed.contains(&KeyCode::KeyD) {
                    camera.process_keyboard(CameraMovement::Right, delta_time);
                }

                let fps = 1.0 / (delta_time.max(1e-6));
                renderer.render_frame(gl, camera, fps);

                self.surface
                    .as_ref()
                    .unwrap()
                    .swap_buffers(self.current_context.as_ref().unwrap())
                    .unwrap();

                self.window.as_ref().unwrap().request_redraw();
            }
            _ => (),
        }
    }
}

fn main() {
    logger::init();
    info!("Starting {}", TITLE);

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }

    logger::shutdown();
}
