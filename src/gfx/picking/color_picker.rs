//! GPU color-id picking.
//!
//! Every registered node is drawn with a flat color encoding its id into an
//! off-screen target; the pixel under the cursor is copied back and decoded.
//! Depth testing keeps the nearest surface, so occlusion is exact and
//! thin handles pick as precisely as they render.

use cgmath::Matrix4;

use super::registry::{color_id_to_rgb, decode_color_id, PickRegistry, PickRole, BACKGROUND_ID};
use crate::{
    error::{EditorError, Result},
    gfx::{
        camera::{convert_matrix4_to_array, CameraView},
        gpu::GpuContext,
        resources::TextureResource,
        scene::{DrawMesh, MeshId, NodeId, Scene, Vertex3D},
        viewport::Viewport,
    },
    wgpu_utils::{dynamic_uniform, DynamicUniformBuffer},
};

/// `copy_texture_to_buffer` needs rows padded to this many bytes, even for one texel.
const READBACK_ROW_BYTES: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl PickUniform {
    pub fn new(mvp: Matrix4<f32>, color_id: u32) -> Self {
        let [r, g, b] = color_id_to_rgb(color_id);
        Self {
            mvp: convert_matrix4_to_array(mvp),
            color: [r, g, b, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickHit {
    pub node: NodeId,
    pub role: PickRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Hit(PickHit),
    /// Nothing pickable under the cursor. Clears the selection.
    Background,
    /// A miss that leaves the selection as it is.
    Nothing,
}

/// One mesh draw of the pick pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickDraw {
    pub node: NodeId,
    pub mesh: MeshId,
    pub uniform: PickUniform,
}

struct PickPass {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniforms: DynamicUniformBuffer<PickUniform>,
    bind_group: wgpu::BindGroup,
    color: TextureResource,
    depth: TextureResource,
    readback: wgpu::Buffer,
}

pub struct ColorPicker {
    registry: PickRegistry,
    pass: Option<PickPass>,
}

impl ColorPicker {
    /// A picker without GPU resources. Registration works, [`pick`](Self::pick) does not.
    pub fn new() -> Self {
        Self {
            registry: PickRegistry::new(),
            pass: None,
        }
    }

    /// Creates the pick pipeline and a `width` x `height` target.
    pub fn with_gpu(gpu: GpuContext, width: u32, height: u32) -> Result<Self> {
        check_size(width, height)?;
        Ok(Self {
            registry: PickRegistry::new(),
            pass: Some(PickPass::new(gpu, width, height)),
        })
    }

    pub fn registry(&self) -> &PickRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PickRegistry {
        &mut self.registry
    }

    /// Gives `node` a color id. See [`PickRegistry::register`].
    pub fn register_node(&mut self, scene: &Scene, node: NodeId, role: PickRole) -> Option<u32> {
        self.registry.register(&scene.graph, node, role)
    }

    pub fn has_gpu(&self) -> bool {
        self.pass.is_some()
    }

    /// Recreates the targets for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        if let Some(pass) = &mut self.pass {
            pass.resize(width, height);
        }
        Ok(())
    }

    /// Maps a read-back RGBA pixel to what it shows. Ids nobody owns
    /// (anymore) count as background.
    pub fn resolve_pixel(&self, rgba: [u8; 4]) -> PickOutcome {
        let id = decode_color_id([rgba[0], rgba[1], rgba[2]]);
        match self.registry.resolve(id) {
            Some((node, role)) => PickOutcome::Hit(PickHit { node, role }),
            None => {
                if id != BACKGROUND_ID {
                    log::debug!("Color id {} is not registered", id);
                }
                PickOutcome::Background
            }
        }
    }

    /// Lists the draws of the pick pass: one per mesh of every registered node
    /// below `roots`, each node once.
    pub fn collect_draws(&self, scene: &Scene, roots: &[NodeId], view_proj: Matrix4<f32>) -> Vec<PickDraw> {
        let mut visited = std::collections::HashSet::new();
        let mut draws = Vec::new();
        for &root in roots {
            for id in scene.graph.descendants(root) {
                if !visited.insert(id) {
                    continue;
                }
                let (Some(color_id), Some(node)) = (self.registry.color_id(id), scene.graph.node(id)) else {
                    continue;
                };
                let uniform = PickUniform::new(view_proj * node.world_matrix(), color_id);
                draws.extend(node.meshes().iter().map(|&mesh| PickDraw { node: id, mesh, uniform }));
            }
        }
        draws
    }

    /// Renders the registered nodes below `roots` and reads the pixel at `(x, y)`.
    ///
    /// World matrices come from the scene's cache; update transforms first.
    /// Positions outside the viewport report [`PickOutcome::Background`].
    pub fn pick(
        &mut self,
        scene: &mut Scene,
        roots: &[NodeId],
        camera: &dyn CameraView,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) -> Result<PickOutcome> {
        if self.pass.is_none() {
            return Err(EditorError::GpuPickingUnavailable);
        }
        if !viewport.contains(x, y) {
            return Ok(PickOutcome::Background);
        }

        let view_proj = viewport.gpu_projection_matrix() * camera.view_matrix();
        let draws = self.collect_draws(scene, roots, view_proj);

        let Some(pass) = &mut self.pass else {
            return Err(EditorError::GpuPickingUnavailable);
        };
        if (pass.color.width(), pass.color.height()) != (viewport.width, viewport.height) {
            check_size(viewport.width, viewport.height)?;
            pass.resize(viewport.width, viewport.height);
        }
        scene.upload_meshes(&pass.gpu.device);

        let rgba = pass.render_and_read(scene, &draws, x as u32, y as u32)?;
        Ok(self.resolve_pixel(rgba))
    }
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ColorPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorPicker")
            .field("registry", &self.registry)
            .field("gpu", &self.has_gpu())
            .finish()
    }
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EditorError::InvalidTargetSize { width, height });
    }
    Ok(())
}

impl PickPass {
    fn new(gpu: GpuContext, width: u32, height: u32) -> Self {
        let device = &gpu.device;
        let shader = device.create_shader_module(wgpu::include_wgsl!("picking.wgsl"));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pick Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: dynamic_uniform::<PickUniform>(),
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pick Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Pick Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TextureResource::PICK_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniforms = DynamicUniformBuffer::new(device, 64);
        let bind_group = Self::create_bind_group(device, &layout, &uniforms);

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Readback Buffer"),
            size: READBACK_ROW_BYTES as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let color = TextureResource::create_pick_texture(device, width, height, "Pick Color Target");
        let depth = TextureResource::create_depth_texture(device, width, height, "Pick Depth Target");
        log::debug!("Created pick targets {}x{}", width, height);

        Self {
            gpu,
            pipeline,
            layout,
            uniforms,
            bind_group,
            color,
            depth,
            readback,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<PickUniform>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pick Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        let device = &self.gpu.device;
        self.color = TextureResource::create_pick_texture(device, width, height, "Pick Color Target");
        self.depth = TextureResource::create_depth_texture(device, width, height, "Pick Depth Target");
        log::debug!("Resized pick targets to {}x{}", width, height);
    }

    fn render_and_read(&mut self, scene: &Scene, draws: &[PickDraw], x: u32, y: u32) -> Result<[u8; 4]> {
        if self.uniforms.reserve(&self.gpu.device, draws.len()) {
            self.bind_group = Self::create_bind_group(&self.gpu.device, &self.layout, &self.uniforms);
        }
        let contents: Vec<PickUniform> = draws.iter().map(|draw| draw.uniform).collect();
        self.uniforms.write_all(&self.gpu.queue, &contents);

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pick Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pick Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = scene.meshes.get(draw.mesh) else {
                    continue;
                };
                render_pass.set_bind_group(0, &self.bind_group, &[self.uniforms.offset(i)]);
                render_pass.draw_mesh(mesh);
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(READBACK_ROW_BYTES),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.gpu.device.poll(wgpu::PollType::Wait)?;

        match futures::executor::block_on(rx) {
            Ok(result) => result?,
            Err(_) => return Err(EditorError::ReadbackCancelled),
        }
        let pixel = {
            let mapped = slice.get_mapped_range();
            [mapped[0], mapped[1], mapped[2], mapped[3]]
        };
        self.readback.unmap();
        Ok(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::OrbitCamera, geometry::generate_cube, gizmos::TransformMode, picking::registry::encode_color_id,
    };
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn test_resolve_pixel() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        let mut picker = ColorPicker::new();
        let id = picker.register_node(&scene, cube, PickRole::SceneObject).unwrap();

        let [r, g, b] = encode_color_id(id);
        assert_eq!(
            picker.resolve_pixel([r, g, b, 255]),
            PickOutcome::Hit(PickHit {
                node: cube,
                role: PickRole::SceneObject
            })
        );
        assert_eq!(picker.resolve_pixel([0, 0, 0, 0]), PickOutcome::Background);
        assert_eq!(picker.resolve_pixel([9, 9, 9, 255]), PickOutcome::Background);
    }

    #[test]
    fn test_collect_draws_skips_unregistered_and_duplicates() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let group = scene.add_node(root, "group");
        let a = scene.add_geometry(group, "a", &generate_cube());
        let b = scene.add_geometry(root, "b", &generate_cube());
        scene.graph.node_mut(a).unwrap().set_position(Vector3::new(1.0, 0.0, 0.0));
        scene.update_transforms();

        let mut picker = ColorPicker::new();
        let id_a = picker
            .registry_mut()
            .register(&scene.graph, a, PickRole::Gizmo(TransformMode::Rotate))
            .unwrap();

        // `group` is reachable twice; `b` is not registered
        let draws = picker.collect_draws(&scene, &[root, group], Matrix4::identity());
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].node, a);
        assert!(draws.iter().all(|d| d.node != b));

        let [r, g, bl] = color_id_to_rgb(id_a);
        assert_eq!(draws[0].uniform.color, [r, g, bl, 1.0]);
        assert_eq!(draws[0].uniform.mvp[3], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pick_without_gpu_is_an_error() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));
        let mut picker = ColorPicker::new();
        let result = picker.pick(&mut scene, &[root], &camera, &Viewport::new(64, 64), 32.0, 32.0);
        assert!(matches!(result, Err(EditorError::GpuPickingUnavailable)));
    }

    #[test]
    fn test_gpu_pick_reads_back_cube_and_background() {
        let Ok(gpu) = GpuContext::headless_blocking() else {
            eprintln!("No adapter available, skipping GPU pick test");
            return;
        };
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        scene.update_transforms();
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));

        let mut picker = ColorPicker::with_gpu(gpu, 64, 64).unwrap();
        picker.register_node(&scene, cube, PickRole::SceneObject).unwrap();
        let hit = PickOutcome::Hit(PickHit {
            node: cube,
            role: PickRole::SceneObject,
        });

        let viewport = Viewport::new(64, 64);
        assert_eq!(picker.pick(&mut scene, &[root], &camera, &viewport, 32.0, 32.0).unwrap(), hit);
        assert_eq!(
            picker.pick(&mut scene, &[root], &camera, &viewport, 1.0, 1.0).unwrap(),
            PickOutcome::Background
        );

        picker.resize(128, 96).unwrap();
        let viewport = Viewport::new(128, 96);
        assert_eq!(picker.pick(&mut scene, &[root], &camera, &viewport, 64.0, 48.0).unwrap(), hit);

        // Viewport changes the picker has not been told about are followed too
        let viewport = Viewport::new(200, 100);
        assert_eq!(picker.pick(&mut scene, &[root], &camera, &viewport, 100.0, 50.0).unwrap(), hit);
        assert_eq!(
            picker.pick(&mut scene, &[root], &camera, &viewport, 199.0, 99.0).unwrap(),
            PickOutcome::Background
        );
    }

    #[test]
    fn test_zero_sized_target_is_rejected() {
        let mut picker = ColorPicker::new();
        assert!(matches!(
            picker.resize(0, 10),
            Err(EditorError::InvalidTargetSize { width: 0, height: 10 })
        ));
        assert!(picker.resize(10, 10).is_ok());
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<PickUniform>(), 80);
        let uniform = PickUniform::new(Matrix4::identity(), 255);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
