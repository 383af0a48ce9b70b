use crate::camera::FpsCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use gallery_session::weapon::GUN_BASE_YAW;
use gallery_session::GameSession;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

const TARGET_COLOR: [f32; 4] = [0.25, 0.75, 0.85, 1.0];
const GUN_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
const FLASH_COLOR: [f32; 4] = [1.0, 0.67, 0.2, 1.0];

/// Generate a unit box centered at the origin, one quad per face.
fn box_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    let face_normals = [Vec3::Z, Vec3::NEG_Z, Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y];
    for normal in face_normals {
        let tangent = if normal.y.abs() > 0.5 { Vec3::X } else { Vec3::Y.cross(normal) };
        let bitangent = normal.cross(tangent);
        let base = vertices.len() as u16;
        for (s, t) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = normal * 0.5 + tangent * s + bitangent * t;
            vertices.push(Vertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Generate the floor grid line vertices.
fn grid_mesh(half_extent: i32, spacing: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let color = [0.28, 0.32, 0.38, 1.0];
    let extent = half_extent as f32 * spacing;

    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        verts.push(GridVertex { position: [-extent, 0.0, offset], color });
        verts.push(GridVertex { position: [extent, 0.0, offset], color });
        verts.push(GridVertex { position: [offset, 0.0, -extent], color });
        verts.push(GridVertex { position: [offset, 0.0, extent], color });
    }
    verts
}

/// Build this frame's box instances: one per target, plus the view-model
/// gun (barrel, handle, and the muzzle flash while it is lit).
fn scene_instances(camera: &FpsCamera, session: &GameSession, muzzle_flash: bool) -> Vec<InstanceData> {
    let mut instances = Vec::new();

    // Targets: the shared model's scaled bounds, placed per target.
    if let Some(bounds) = session.pool().model_bounds() {
        let center = bounds.center();
        let size = bounds.size();
        for target in session.pool().targets() {
            let model = Mat4::from_translation(target.position)
                * Mat4::from_rotation_y(target.yaw)
                * Mat4::from_translation(center)
                * Mat4::from_scale(size);
            instances.push(InstanceData::new(model, TARGET_COLOR));
        }
    }

    // View-model gun, attached to the camera with the recoil offset.
    let gun_base = camera.world_transform()
        * Mat4::from_translation(session.weapon().gun_offset())
        * Mat4::from_rotation_y(GUN_BASE_YAW);
    let barrel = gun_base
        * Mat4::from_translation(Vec3::new(0.0, 0.0, -0.2))
        * Mat4::from_scale(Vec3::new(0.1, 0.12, 0.6));
    let handle = gun_base
        * Mat4::from_translation(Vec3::new(0.0, -0.15, 0.2))
        * Mat4::from_rotation_x(-0.2)
        * Mat4::from_scale(Vec3::new(0.12, 0.4, 0.15));
    instances.push(InstanceData::new(barrel, GUN_COLOR));
    instances.push(InstanceData::new(handle, GUN_COLOR));

    if muzzle_flash {
        let flash = gun_base
            * Mat4::from_translation(Vec3::new(0.0, 0.05, -0.5))
            * Mat4::from_scale(Vec3::splat(0.09));
        instances.push(InstanceData::new(flash, FLASH_COLOR));
    }

    instances
}

/// wgpu renderer for the gallery scene.
pub struct GalleryRenderer {
    box_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    box_vertex_buffer: wgpu::Buffer,
    box_index_buffer: wgpu::Buffer,
    box_index_count: u32,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl GalleryRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let box_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("box_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BOX_SHADER.into()),
        });

        let box_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("box_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &box_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &box_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // The gun is viewed from inside its own boxes at times;
                // no culling keeps every face visible.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::GRID_SHADER.into()),
        });

        let grid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &grid_shader,
                entry_point: Some("vs_grid"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GridVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &grid_shader,
                entry_point: Some("fs_grid"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (box_verts, box_indices) = box_mesh();
        let box_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_vertex_buffer"),
            contents: bytemuck::cast_slice(&box_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let box_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_index_buffer"),
            contents: bytemuck::cast_slice(&box_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let box_index_count = box_indices.len() as u32;

        // 100-unit half extent matches the original floor plane.
        let grid_verts = grid_mesh(50, 2.0);
        let grid_vertex_count = grid_verts.len() as u32;
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Pool targets + gun parts + flash; 64 leaves headroom.
        let max_instances = 64u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(width, height, "renderer created");

        Self {
            box_pipeline,
            grid_pipeline,
            uniform_buffer,
            uniform_bind_group,
            box_vertex_buffer,
            box_index_buffer,
            box_index_count,
            grid_vertex_buffer,
            grid_vertex_count,
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: grid floor, targets, view-model gun.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FpsCamera,
        session: &GameSession,
        muzzle_flash: bool,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                camera_pos: camera.position.extend(1.0).to_array(),
            }),
        );

        let mut instances = scene_instances(camera, session, muzzle_flash);
        instances.truncate(self.max_instances as usize);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Matches the fog color in the shaders.
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.066,
                            g: 0.094,
                            b: 0.153,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.grid_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            pass.draw(0..self.grid_vertex_count, 0..1);

            if !instances.is_empty() {
                pass.set_pipeline(&self.box_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.box_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.box_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.box_index_count, 0, 0..instances.len() as u32);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_common::Aabb;

    #[test]
    fn box_mesh_is_a_closed_cube() {
        let (verts, indices) = box_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        let max_index = *indices.iter().max().unwrap() as usize;
        assert!(max_index < verts.len());
    }

    #[test]
    fn grid_mesh_line_count() {
        let verts = grid_mesh(50, 2.0);
        // (2 * 50 + 1) lines per axis, two vertices each, two axes.
        assert_eq!(verts.len(), 101 * 4);
    }

    #[test]
    fn gun_only_scene_without_model() {
        let session = GameSession::new(1);
        let camera = FpsCamera::default();
        let instances = scene_instances(&camera, &session, false);
        // Barrel + handle, no targets, no flash.
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn scene_has_one_instance_per_target_plus_gun() {
        let mut session = GameSession::new(1);
        session.install_model(&[Aabb::new(
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(0.5, 1.7, 0.5),
        )]);
        let camera = FpsCamera::default();
        let without_flash = scene_instances(&camera, &session, false);
        assert_eq!(without_flash.len(), session.pool().len() + 2);
        let with_flash = scene_instances(&camera, &session, true);
        assert_eq!(with_flash.len(), session.pool().len() + 3);
    }
}
