//! Uniform buffer holding one aligned slot per draw call.
use std::marker::PhantomData;

/// Array of `Content` values, each at an offset satisfying the device's
/// `min_uniform_buffer_offset_alignment`, bound with a dynamic offset.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        match type_name.rfind(':') {
            Some(pos) => &type_name[(pos + 1)..],
            None => type_name,
        }
    }

    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<Content>() as u64;
        let stride = size.div_ceil(alignment) * alignment;
        let capacity = capacity.max(1);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer<{}>", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            content_type: PhantomData,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    /// Grows the buffer (doubling) so it holds at least `count` slots.
    ///
    /// # Returns
    /// `true` if the buffer was reallocated and bind groups must be rebuilt
    pub fn reserve(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        let capacity = count.next_power_of_two();
        *self = Self::new(device, capacity);
        true
    }

    /// Writes all slots in one upload, `contents[i]` at `offset(i)`.
    pub fn write_all(&mut self, queue: &wgpu::Queue, contents: &[Content]) {
        if contents.is_empty() {
            return;
        }
        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * contents.len(), 0);
        for (i, content) in contents.iter().enumerate() {
            let bytes = bytemuck::bytes_of(content);
            self.staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    /// Dynamic offset of slot `index`.
    pub fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }

    /// Binding covering a single slot, as the shader sees it.
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
