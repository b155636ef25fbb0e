//! WGPU binding type utilities


/// Uniform buffer bound once and indexed per draw through a dynamic offset.
pub fn dynamic_uniform<Content>() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
    }
}
