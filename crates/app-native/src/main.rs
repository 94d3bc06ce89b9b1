//! Native desktop front-end: walk a first-person camera over a 3D piano.
//!
//! W/S/A/D move, the mouse looks around, K switches the organ/piano voice,
//! F toggles fullscreen, Escape leaves fullscreen or exits. Standing over a
//! key presses it.

mod audio;

use instant::Instant;
use wgpu::util::DeviceExt;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Fullscreen, WindowBuilder},
};

use app_core::{
    select_key, AudioSink, Camera, Key, KeyKind, KeyRegistry, KeyRenderer, KeyboardController,
    NullSink, NUM_BLACK_KEYS, NUM_WHITE_KEYS,
};
use glam::Vec3;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FIELD_OF_VIEW_DEG: f32 = 70.0;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 1000.0;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.15,
    b: 0.3,
    a: 1.0,
};
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    offset: [f32; 3],
    scale: [f32; 3],
    color: [f32; 4],
}

/// Collects one cuboid instance per key. The cuboids use the original key
/// envelopes; the notch classification is left to a fancier mesh pass.
#[derive(Default)]
struct KeyInstances {
    instances: Vec<InstanceData>,
}

impl KeyRenderer for KeyInstances {
    fn draw_key(&mut self, key: &Key) {
        let x = key.note_position();
        let y = key.state.y_offset();
        let instance = match key.kind() {
            KeyKind::White => InstanceData {
                offset: [x, y, -15.0],
                scale: [2.2, 1.7, 15.2],
                color: [0.96, 0.96, 0.93, 1.0],
            },
            // Black keys sit between the notches of their white neighbours,
            // offset within the same white-key span.
            KeyKind::Black => InstanceData {
                offset: [x + 1.7, y, -15.0],
                scale: [1.2, 3.0, 9.8],
                color: [0.05, 0.05, 0.05, 1.0],
            },
        };
        self.instances.push(instance);
    }
}

/// Unit cube spanning [0,1]^3 with per-face normals. Each face lists its
/// (u, v) axes so that u cross v points along the outward normal, keeping
/// the winding counter-clockwise everywhere.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let faces: [([f32; 3], [usize; 2]); 6] = [
        ([0.0, 0.0, 1.0], [0, 1]),  // +z
        ([0.0, 0.0, -1.0], [1, 0]), // -z
        ([1.0, 0.0, 0.0], [1, 2]),  // +x
        ([-1.0, 0.0, 0.0], [2, 1]), // -x
        ([0.0, 1.0, 0.0], [2, 0]),  // +y
        ([0.0, -1.0, 0.0], [0, 2]), // -y
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, [u_axis, v_axis]) in faces {
        let base = vertices.len() as u16;
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let mut position = [0.0_f32; 3];
            for axis in 0..3 {
                if normal[axis] > 0.0 {
                    position[axis] = 1.0;
                }
            }
            position[u_axis] = u;
            position[v_axis] = v;
            vertices.push(Vertex { position, normal });
        }
        indices.extend([0, 1, 2, 0, 2, 3].iter().map(|i| base + i));
    }
    (vertices, indices)
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    cube_vb: wgpu::Buffer,
    cube_ib: wgpu::Buffer,
    index_count: u32,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene"),
            source: wgpu::ShaderSource::Wgsl(app_core::SCENE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (vertices, indices) = cube_mesh();
        let cube_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vb"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_ib"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = NUM_WHITE_KEYS + NUM_BLACK_KEYS;
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<InstanceData>() * instance_capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            // slot 0: cube vertices
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 12,
                        shader_location: 1,
                    },
                ],
            },
            // slot 1: per-key instance data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 12,
                        shader_location: 3,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 24,
                        shader_location: 4,
                    },
                ],
            },
        ];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            cube_vb,
            cube_ib,
            index_count: indices.len() as u32,
            instance_vb,
            bind_group,
            depth_view,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    fn render(
        &mut self,
        camera: &Camera,
        controller: &KeyboardController,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
            }),
        );

        let mut keys = KeyInstances::default();
        controller.draw_all(&mut keys);
        self.queue
            .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&keys.instances));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.cube_vb.slice(..));
            rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
            rpass.set_index_buffer(self.cube_ib.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..self.index_count, 0, 0..keys.instances.len() as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
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

#[derive(Default)]
struct MoveKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl MoveKeys {
    fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let registry = KeyRegistry::default();
    let (sink, _stream): (Box<dyn AudioSink>, Option<cpal::Stream>) = match audio::start() {
        Some((sink, stream)) => (Box::new(sink), Some(stream)),
        None => {
            log::warn!("no audio output device; keys will play silently");
            (Box::new(NullSink), None)
        }
    };
    let mut controller = KeyboardController::new(registry, sink);

    let mut camera = Camera::new(
        Vec3::new(0.0, 5.0, 10.0),
        FIELD_OF_VIEW_DEG.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
        Z_NEAR,
        Z_FAR,
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Virtual Keyboard")
        .with_inner_size(LogicalSize::new(WIDTH, HEIGHT))
        .build(&event_loop)?;
    window.set_cursor_visible(false);
    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    {
        log::warn!("could not grab cursor: {err}");
    }

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let mut held = MoveKeys::default();
    let mut needs_redraw = true;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                camera.set_aspect(size.width.max(1) as f32 / size.height.max(1) as f32);
                needs_redraw = true;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                match code {
                    KeyCode::KeyW => held.forward = pressed,
                    KeyCode::KeyS => held.backward = pressed,
                    KeyCode::KeyA => held.left = pressed,
                    KeyCode::KeyD => held.right = pressed,
                    KeyCode::KeyK if pressed && !repeat => controller.next_voice(),
                    KeyCode::KeyF if pressed && !repeat => {
                        if gpu.window.fullscreen().is_some() {
                            gpu.window.set_fullscreen(None);
                        } else {
                            gpu.window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                        }
                    }
                    KeyCode::Escape if pressed => {
                        if gpu.window.fullscreen().is_some() {
                            gpu.window.set_fullscreen(None);
                        } else {
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => match gpu.render(&camera, &controller) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = gpu.window.inner_size();
                    gpu.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of GPU memory, exiting");
                    elwt.exit();
                }
                Err(err) => log::warn!("dropped frame: {err:?}"),
            },
            _ => {}
        },
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => {
            camera.turn(delta.0 as f32, delta.1 as f32);
            needs_redraw = true;
        }
        Event::AboutToWait => {
            if held.forward {
                camera.move_forward();
            }
            if held.backward {
                camera.move_backward();
            }
            if held.left {
                camera.move_left();
            }
            if held.right {
                camera.move_right();
            }

            let now = Instant::now();
            // Standing over a key presses it. Stepping off does not release
            // it; only pressing a different key does.
            if let Some(id) = select_key(camera.position().x) {
                if let Err(err) = controller.key_down(id, now) {
                    log::error!("key press failed: {err}");
                }
            }
            let animated = controller.update(now);

            if animated || controller.any_key_moving() || held.any() || needs_redraw {
                needs_redraw = false;
                gpu.window.request_redraw();
            }
        }
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_is_well_formed() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        for v in &vertices {
            let len: f32 = v.normal.iter().map(|n| n * n).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn every_triangle_faces_outward() {
        let (vertices, indices) = cube_mesh();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| {
                let p = vertices[i as usize].position;
                glam::Vec3::from_array(p)
            });
            let normal = glam::Vec3::from_array(vertices[tri[0] as usize].normal);
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(normal) > 0.0, "clockwise triangle {tri:?}");
        }
    }

    #[test]
    fn one_instance_per_key() {
        let controller = KeyboardController::new(KeyRegistry::default(), Box::new(NullSink));
        let mut keys = KeyInstances::default();
        controller.draw_all(&mut keys);
        assert_eq!(keys.instances.len(), NUM_WHITE_KEYS + NUM_BLACK_KEYS);
    }

    #[test]
    fn pressed_keys_render_lower() {
        let mut controller = KeyboardController::new(KeyRegistry::default(), Box::new(NullSink));
        let now = Instant::now();
        controller.key_down(app_core::KeyId::White(0), now).unwrap();
        controller.update(now + std::time::Duration::from_millis(80));

        let mut keys = KeyInstances::default();
        controller.draw_all(&mut keys);
        assert!(keys.instances[0].offset[1] < 0.0);
        assert_eq!(keys.instances[1].offset[1], 0.0);
    }
}
