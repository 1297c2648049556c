use std::path::PathBuf;

use glow::HasContext;

use crate::shader::ShaderProgram;

/// Fixed vertex layout shared by every mesh: position, normal, texcoord,
/// tangent, bitangent on attributes 0-4. Tightly packed, uploaded as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    /// Base of the sampler uniform name this texture binds to; a 1-based
    /// per-kind counter is appended per mesh (`material.texture_diffuse1`).
    pub fn uniform_base(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "material.texture_diffuse",
            TextureKind::Specular => "material.texture_specular",
            TextureKind::Normal => "material.texture_normal",
            TextureKind::Height => "material.texture_height",
        }
    }
}

/// A GPU texture reference held by a mesh. The path is kept so the model
/// can share one upload between meshes that use the same file.
#[derive(Debug, Clone)]
pub struct MeshTexture {
    pub id: glow::Texture,
    pub kind: TextureKind,
    pub path: PathBuf,
}

/// GPU-resident geometry plus its texture bindings. Built once from
/// already-extracted vertex and index data (no file I/O here), immutable
/// afterwards.
pub struct Mesh {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    _ebo: glow::Buffer,
    index_count: i32,
    pub textures: Vec<MeshTexture>,
}

impl Mesh {
    pub fn new(
        gl: &glow::Context,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<MeshTexture>,
    ) -> Self {
        unsafe {
            let vao = gl.create_vertex_array().expect("Failed to create VAO");
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().expect("Failed to create VBO");
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&vertices),
                glow::STATIC_DRAW,
            );

            let ebo = gl.create_buffer().expect("Failed to create EBO");
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&indices),
                glow::STATIC_DRAW,
            );

            let stride = std::mem::size_of::<Vertex>() as i32;
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 24);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(3, 3, glow::FLOAT, false, stride, 32);
            gl.enable_vertex_attrib_array(3);
            gl.vertex_attrib_pointer_f32(4, 3, glow::FLOAT, false, stride, 44);
            gl.enable_vertex_attrib_array(4);

            gl.bind_vertex_array(None);

            Mesh {
                vao,
                _vbo: vbo,
                _ebo: ebo,
                index_count: indices.len() as i32,
                textures,
            }
        }
    }

    /// Binds each texture to the next texture unit, points the matching
    /// `material.texture_*N` sampler at that unit, then issues the indexed
    /// draw. Leaves texture unit 0 active on exit; later passes rely on that
    /// when binding their own textures.
    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram) {
        let kinds: Vec<TextureKind> = self.textures.iter().map(|t| t.kind).collect();
        let names = texture_uniform_names(&kinds);
        unsafe {
            for (i, texture) in self.textures.iter().enumerate() {
                gl.active_texture(glow::TEXTURE0 + i as u32);
                shader.set_int(gl, &names[i], i as i32);
                gl.bind_texture(glow::TEXTURE_2D, Some(texture.id));
            }
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
            gl.active_texture(glow::TEXTURE0);
        }
    }
}

/// Derives the sampler uniform name for each texture in insertion order,
/// numbering every kind separately starting at 1.
pub fn texture_uniform_names(kinds: &[TextureKind]) -> Vec<String> {
    let mut diffuse = 0u32;
    let mut specular = 0u32;
    let mut normal = 0u32;
    let mut height = 0u32;
    kinds
        .iter()
        .map(|kind| {
            let counter = match kind {
                TextureKind::Diffuse => {
                    diffuse += 1;
                    diffuse
                }
                TextureKind::Specular => {
                    specular += 1;
                    specular
                }
                TextureKind::Normal => {
                    normal += 1;
                    normal
                }
                TextureKind::Height => {
                    height += 1;
                    height
                }
            };
            format!("{}{}", kind.uniform_base(), counter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_fourteen_packed_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 14 * 4);
    }

    #[test]
    fn uniform_names_count_per_kind_in_insertion_order() {
        let kinds = [
            TextureKind::Diffuse,
            TextureKind::Diffuse,
            TextureKind::Specular,
        ];
        let names = texture_uniform_names(&kinds);
        assert_eq!(
            names,
            vec![
                "material.texture_diffuse1",
                "material.texture_diffuse2",
                "material.texture_specular1",
            ]
        );
    }

    #[test]
    fn uniform_name_counters_are_independent() {
        let kinds = [
            TextureKind::Normal,
            TextureKind::Diffuse,
            TextureKind::Height,
            TextureKind::Normal,
        ];
        let names = texture_uniform_names(&kinds);
        assert_eq!(
            names,
            vec![
                "material.texture_normal1",
                "material.texture_diffuse1",
                "material.texture_height1",
                "material.texture_normal2",
            ]
        );
    }

    #[test]
    fn no_textures_means_no_uniform_names() {
        assert!(texture_uniform_names(&[]).is_empty());
    }
}
