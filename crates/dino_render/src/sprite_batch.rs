//! Fixed-capacity sprite batch.
//!
//! Every logical sprite owns one slot for the whole session. Slot `id` owns
//! vertices `[4*id .. 4*id+3]` and indices `[6*id .. 6*id+5]`. The index array
//! is built once at construction and never touched again: the topology (each
//! quad is two triangles, `0,1,2` and `0,3,1`) never changes, only positions,
//! colors and UVs do.
//!
//! The CPU side ([`SpriteBatch`]) has no GPU dependency so it can be tested
//! directly. [`GpuSpriteBatch`] owns the buffers and uploads the whole staging
//! array in one write per frame.

use dino_core::{Color, Rect};
use glam::Vec2;
use wgpu::util::DeviceExt;

use crate::vertex::SpriteVertex;

/// Hard ceiling on sprites per batch.
pub const MAX_SPRITES: usize = 50;

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 3, 1];

/// Stable handle to one quad in a [`SpriteBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u16);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Logical description of one quad in work-resolution units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteQuad {
    pub position: Vec2,
    pub size: Vec2,
    pub scale: Vec2,
    pub source: Rect,
    pub color: Color,
}

/// How work-resolution units and atlas pixels map to the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    /// Atlas texture size in pixels.
    pub atlas_size: Vec2,
    /// `display_resolution / work_resolution`, per axis.
    pub screen_scale: Vec2,
}

impl ScreenMapping {
    pub fn new(atlas_size: Vec2, screen_scale: Vec2) -> Self {
        Self {
            atlas_size,
            screen_scale,
        }
    }
}

pub struct SpriteBatch {
    capacity: usize,
    allocated: usize,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u16>,
}

impl SpriteBatch {
    pub fn new(capacity: usize) -> Self {
        // u16 indices address at most 65536 vertices.
        let capacity = capacity.min(u16::MAX as usize / 4);
        let mut batch = Self {
            capacity,
            allocated: 0,
            vertices: vec![SpriteVertex::default(); capacity * 4],
            indices: vec![0; capacity * 6],
        };
        batch.build_indices();
        batch
    }

    fn build_indices(&mut self) {
        for slot in 0..self.capacity {
            let base = (slot * 4) as u16;
            for (k, offset) in QUAD_INDICES.iter().enumerate() {
                self.indices[slot * 6 + k] = base + offset;
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn allocate_slot(&mut self) -> Result<SlotId, String> {
        if self.allocated >= self.capacity {
            return Err(format!(
                "Sprite batch is full: all {} slots are allocated",
                self.capacity
            ));
        }
        let id = SlotId(self.allocated as u16);
        self.allocated += 1;
        Ok(id)
    }

    /// Overwrite the four vertices of `id`.
    ///
    /// Corner order: `(x, y)`, `(x+w, y+h)`, `(x, y+h)`, `(x+w, y)`, matching
    /// the fixed index pattern.
    pub fn write_vertices(&mut self, id: SlotId, quad: &SpriteQuad, mapping: &ScreenMapping) {
        if id.index() >= self.allocated {
            log::warn!("Ignoring vertex write to unallocated slot {}", id.index());
            return;
        }

        let extent = quad.size * quad.scale;
        let min = quad.position * mapping.screen_scale;
        let max = (quad.position + extent) * mapping.screen_scale;

        let atlas = mapping.atlas_size.max(Vec2::ONE);
        let uv_min = quad.source.origin() / atlas;
        let uv_max = (quad.source.origin() + quad.source.size()) / atlas;

        let color = quad.color.to_normalized();
        let base = id.index() * 4;
        self.vertices[base] = SpriteVertex {
            position: [min.x, min.y],
            color,
            tex_coords: [uv_min.x, uv_min.y],
        };
        self.vertices[base + 1] = SpriteVertex {
            position: [max.x, max.y],
            color,
            tex_coords: [uv_max.x, uv_max.y],
        };
        self.vertices[base + 2] = SpriteVertex {
            position: [min.x, max.y],
            color,
            tex_coords: [uv_min.x, uv_max.y],
        };
        self.vertices[base + 3] = SpriteVertex {
            position: [max.x, min.y],
            color,
            tex_coords: [uv_max.x, uv_min.y],
        };
    }

    pub fn quad_vertices(&self, id: SlotId) -> &[SpriteVertex] {
        let base = id.index() * 4;
        &self.vertices[base..base + 4]
    }

    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Indices covering every allocated slot.
    pub fn draw_index_count(&self) -> u32 {
        (self.allocated * 6) as u32
    }
}

impl Default for SpriteBatch {
    fn default() -> Self {
        Self::new(MAX_SPRITES)
    }
}

/// GPU-resident copy of a [`SpriteBatch`].
pub struct GpuSpriteBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuSpriteBatch {
    pub fn new(device: &wgpu::Device, batch: &SpriteBatch) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Batch Vertex Buffer"),
            contents: bytemuck::cast_slice(batch.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Batch Index Buffer"),
            contents: bytemuck::cast_slice(batch.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: batch.draw_index_count(),
        }
    }

    /// Upload the full staging array. No sparse updates.
    pub fn flush(&mut self, queue: &wgpu::Queue, batch: &SpriteBatch) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(batch.vertices()));
        self.index_count = batch.draw_index_count();
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
