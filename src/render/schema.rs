use crate::Rect;
use glam::Vec2;

/// Per-vertex stream element shared by the CPU quad builder and `shader.wgsl`.
///
/// `position` is already in clip space; nothing downstream applies a
/// transform to it. Field order and packing are part of the cross-stage
/// contract: 16 bytes, `position` at offset 0, `tex_coord` at offset 8.
/// The WGSL `VertexIn` struct must mirror this exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coord: [u, v],
        }
    }
}

/// Full-target quad. Base UVs cover the whole unit square; V runs top-down
/// so v=0 samples the top row of the source image.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-1.0, -1.0],
        tex_coord: [0.0, 1.0],
    },
    Vertex {
        position: [1.0, -1.0],
        tex_coord: [1.0, 1.0],
    },
    Vertex {
        position: [-1.0, 1.0],
        tex_coord: [0.0, 0.0],
    },
    Vertex {
        position: [1.0, 1.0],
        tex_coord: [1.0, 0.0],
    },
];

/// CCW winding, front faces toward the camera with `wgpu::FrontFace::Ccw`.
pub const QUAD_INDICES: [u32; 6] = [2, 0, 1, 1, 3, 2];

/// Stage output mirrored from the WGSL `VertexOut` struct, 24 bytes.
///
/// `position` is the homogeneous clip coordinate the rasterizer consumes to
/// place the primitive; it is never forwarded as data. `tex_coord` is
/// interpolated linearly in screen space across the primitive.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexOut {
    pub position: [f32; 4],
    pub tex_coord: [f32; 2],
}

impl VertexOut {
    /// Lifts a clip-space XY vertex to (x, y, 0, 1) and forwards its UV,
    /// exactly what `vs_main` does on the GPU.
    pub fn from_vertex(v: Vertex) -> Self {
        Self {
            position: [v.position[0], v.position[1], 0.0, 1.0],
            tex_coord: v.tex_coord,
        }
    }

    /// Barycentric blend over a triangle, the fixed-function rasterizer's
    /// job. This CPU-side reference exists to pin down the linearity the
    /// crop remap relies on; it sits on no rendering path.
    pub fn interpolate(a: Self, b: Self, c: Self, weights: [f32; 3]) -> Self {
        let [wa, wb, wc] = weights;
        let mut position = [0.0; 4];
        for (i, out) in position.iter_mut().enumerate() {
            *out = a.position[i] * wa + b.position[i] * wb + c.position[i] * wc;
        }
        Self {
            position,
            tex_coord: [
                a.tex_coord[0] * wa + b.tex_coord[0] * wb + c.tex_coord[0] * wc,
                a.tex_coord[1] * wa + b.tex_coord[1] * wb + c.tex_coord[1] * wc,
            ],
        }
    }
}

/// Crop rectangle in UV space, bound once per draw and shared by every
/// fragment invocation of that draw. 16 bytes, `origin` then `size`.
///
/// The producing side keeps `origin + size` inside [0,1] per axis and `size`
/// positive; nothing here validates either. A crop reaching outside the
/// source resolves through the sampler's address mode, and a zero-size axis
/// collapses every sampled UV onto `origin` along that axis.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CropUniform {
    pub origin: Vec2,
    pub size: Vec2,
}

impl CropUniform {
    /// No crop: `remap` is the exact identity on UVs.
    pub const IDENTITY: Self = Self {
        origin: Vec2::ZERO,
        size: Vec2::ONE,
    };

    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// UV crop from a pixel-space rect against the source texture size.
    pub fn from_rect(rect: Rect, texture_size: Vec2) -> Self {
        Self {
            origin: rect.min / texture_size,
            size: rect.size() / texture_size,
        }
    }

    /// `origin + base * size`, component-wise: (0,0) maps to `origin`,
    /// (1,1) to `origin + size`. Matches `fs_main` in `shader.wgsl`. The map
    /// is linear in `base`, so it commutes with attribute interpolation and
    /// could equally run per vertex.
    pub fn remap(&self, base: Vec2) -> Vec2 {
        self.origin + base * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_pipeline_contract() {
        assert_eq!(size_of::<Vertex>(), 16);
        assert_eq!(size_of::<CropUniform>(), 16);
        assert_eq!(size_of::<VertexOut>(), 24);

        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 16);
        assert_eq!(desc.attributes[0].offset, 0);
        assert_eq!(desc.attributes[1].offset, 8);
        assert_eq!(desc.attributes[0].shader_location, 0);
        assert_eq!(desc.attributes[1].shader_location, 1);
    }

    #[test]
    fn identity_remap_is_exact() {
        for base in [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.5, 0.25),
            Vec2::new(0.1, 0.9),
        ] {
            assert_eq!(CropUniform::IDENTITY.remap(base), base);
        }
    }

    #[test]
    fn remap_is_origin_plus_base_times_size() {
        let crop = CropUniform::new(Vec2::new(0.2, 0.3), Vec2::new(0.4, 0.5));
        let base = Vec2::new(0.5, 0.5);
        assert_eq!(crop.remap(base), Vec2::new(0.2 + 0.5 * 0.4, 0.3 + 0.5 * 0.5));
    }

    #[test]
    fn remap_hits_crop_corners() {
        let crop = CropUniform::new(Vec2::new(0.25, 0.0), Vec2::new(0.5, 1.0));
        assert_eq!(crop.remap(Vec2::new(0.0, 0.0)), Vec2::new(0.25, 0.0));
        assert_eq!(crop.remap(Vec2::new(1.0, 1.0)), Vec2::new(0.75, 1.0));
    }

    #[test]
    fn degenerate_axis_collapses_onto_origin() {
        let crop = CropUniform::new(Vec2::new(0.6, 0.1), Vec2::new(0.0, 0.5));
        for u in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(crop.remap(Vec2::new(u, 0.5)).x, 0.6);
        }
    }

    #[test]
    fn remap_commutes_with_lerp() {
        let crop = CropUniform::new(Vec2::new(0.1, 0.2), Vec2::new(0.6, 0.7));
        let p = Vec2::new(0.0, 0.9);
        let q = Vec2::new(0.8, 0.1);
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let remapped_lerp = crop.remap(p.lerp(q, t));
            let lerped_remap = crop.remap(p).lerp(crop.remap(q), t);
            assert!((remapped_lerp - lerped_remap).length() < 1e-6);
        }
    }

    #[test]
    fn from_rect_normalizes_against_texture_size() {
        let crop = CropUniform::from_rect(
            Rect::new(64.0, 0.0, 192.0, 256.0),
            Vec2::new(256.0, 256.0),
        );
        assert_eq!(crop.origin, Vec2::new(0.25, 0.0));
        assert_eq!(crop.size, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn quad_base_uvs_cover_unit_square() {
        for v in QUAD_VERTICES {
            assert!(v.tex_coord[0] == 0.0 || v.tex_coord[0] == 1.0);
            assert!(v.tex_coord[1] == 0.0 || v.tex_coord[1] == 1.0);
        }
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
    }

    #[test]
    fn stage_lift_keeps_xy_and_uv() {
        let out = VertexOut::from_vertex(Vertex::new(-1.0, 1.0, 0.0, 0.25));
        assert_eq!(out.position, [-1.0, 1.0, 0.0, 1.0]);
        assert_eq!(out.tex_coord, [0.0, 0.25]);
    }

    #[test]
    fn interpolation_reproduces_corners() {
        let a = VertexOut::from_vertex(QUAD_VERTICES[0]);
        let b = VertexOut::from_vertex(QUAD_VERTICES[1]);
        let c = VertexOut::from_vertex(QUAD_VERTICES[2]);
        assert_eq!(VertexOut::interpolate(a, b, c, [1.0, 0.0, 0.0]), a);
        assert_eq!(VertexOut::interpolate(a, b, c, [0.0, 1.0, 0.0]), b);
        assert_eq!(VertexOut::interpolate(a, b, c, [0.0, 0.0, 1.0]), c);
    }

    #[test]
    fn interpolated_uv_remaps_like_its_corners() {
        // Remapping after the barycentric blend must equal blending the
        // remapped corner UVs, which is what lets the remap live in the
        // fragment stage.
        let crop = CropUniform::new(Vec2::new(0.25, 0.1), Vec2::new(0.5, 0.8));
        let a = VertexOut::from_vertex(QUAD_VERTICES[0]);
        let b = VertexOut::from_vertex(QUAD_VERTICES[1]);
        let c = VertexOut::from_vertex(QUAD_VERTICES[2]);
        let weights = [0.2, 0.3, 0.5];

        let mid = VertexOut::interpolate(a, b, c, weights);
        let after = crop.remap(Vec2::from(mid.tex_coord));

        let ra = crop.remap(Vec2::from(a.tex_coord));
        let rb = crop.remap(Vec2::from(b.tex_coord));
        let rc = crop.remap(Vec2::from(c.tex_coord));
        let before = ra * weights[0] + rb * weights[1] + rc * weights[2];

        assert!((after - before).length() < 1e-6);
    }
}
