use std::path::{Path, PathBuf};

use gltf::{buffer::Source, Gltf};
use log::{error, info};

use crate::mesh::{Mesh, MeshTexture, TextureKind, Vertex};
use crate::shader::ShaderProgram;
use crate::texture::load_texture;

/// Path-keyed texture de-duplication. Every distinct path is loaded once;
/// repeats get the cached handle. Keyed on path equality, not file content.
pub struct TextureCache<T: Copy> {
    entries: Vec<(PathBuf, T)>,
}

impl<T: Copy> TextureCache<T> {
    pub fn new() -> Self {
        TextureCache {
            entries: Vec::new(),
        }
    }

    /// Looks the path up; on a miss, runs `load` and caches the result.
    /// A `load` that fails (returns `None`) is not cached, so a later
    /// request may retry it.
    pub fn get_or_insert_with<F>(&mut self, path: &Path, load: F) -> Option<T>
    where
        F: FnOnce() -> Option<T>,
    {
        if let Some((_, id)) = self.entries.iter().find(|(p, _)| p == path) {
            return Some(*id);
        }
        let id = load()?;
        self.entries.push((path.to_path_buf(), id));
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A glTF model uploaded to the GPU: one `Mesh` per primitive, with the
/// model's textures shared between meshes through a path-keyed cache.
///
/// Loading is fail-soft: any import or buffer error is logged and leaves
/// the model with zero meshes, which then draws as nothing.
pub struct Model {
    pub meshes: Vec<Mesh>,
    directory: PathBuf,
    textures_loaded: TextureCache<glow::Texture>,
}

impl Model {
    pub fn new(gl: &glow::Context, path: &Path) -> Self {
        let mut model = Model {
            meshes: Vec::new(),
            directory: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            textures_loaded: TextureCache::new(),
        };
        if let Err(e) = model.load(gl, path) {
            error!("Failed to load model {}: {}", path.display(), e);
        } else {
            info!(
                "Model {} loaded: {} meshes, {} textures",
                path.display(),
                model.meshes.len(),
                model.textures_loaded.len()
            );
        }
        model
    }

    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram) {
        for mesh in &self.meshes {
            mesh.draw(gl, shader);
        }
    }

    fn load(&mut self, gl: &glow::Context, path: &Path) -> Result<(), String> {
        let gltf = Gltf::open(path).map_err(|e| format!("GLTF open error: {:?}", e))?;

        let mut raw_buffers = Vec::new();
        let blob = gltf.blob.as_ref().cloned();

        // Load all buffers referenced by the GLTF:
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                Source::Uri(uri) => {
                    let buf_path = self.directory.join(uri);
                    std::fs::read(&buf_path).map_err(|e| format!("Buffer read error: {:?}", e))?
                }
                Source::Bin => blob
                    .clone()
                    .ok_or_else(|| "GLB binary chunk missing".to_string())?,
            };
            raw_buffers.push(data);
        }

        for node in node_draw_order(&gltf) {
            if let Some(mesh) = node.mesh() {
                for primitive in mesh.primitives() {
                    self.process_primitive(gl, &primitive, &raw_buffers);
                }
            }
        }
        Ok(())
    }

    fn process_primitive(
        &mut self,
        gl: &glow::Context,
        primitive: &gltf::Primitive,
        raw_buffers: &[Vec<u8>],
    ) {
        let reader = primitive.reader(|buffer| {
            raw_buffers.get(buffer.index()).map(|v| v.as_slice())
        });

        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(iter) => iter.collect(),
            None => {
                error!("GLTF primitive is missing positions, skipped");
                return;
            }
        };
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let tex_coords: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();
        let tangents: Vec<[f32; 4]> = reader
            .read_tangents()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let mut vertices = Vec::with_capacity(positions.len());
        for (i, position) in positions.iter().enumerate() {
            let normal = normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]);
            let uv = tex_coords.get(i).copied().unwrap_or([0.0, 0.0]);
            let tangent = tangents.get(i).copied().unwrap_or([1.0, 0.0, 0.0, 1.0]);
            vertices.push(build_vertex(*position, normal, uv, tangent));
        }

        let indices: Vec<u32> = reader
            .read_indices()
            .map(|idx| idx.into_u32().collect())
            .unwrap_or_else(|| (0..vertices.len() as u32).collect());

        let textures = self.load_material_textures(gl, &primitive.material());

        self.meshes.push(Mesh::new(gl, vertices, indices, textures));
    }

    /// Collects each of the material's texture kinds once, in the fixed
    /// diffuse/specular/normal/height order. Only URI-sourced images are
    /// supported; embedded buffer views are skipped.
    fn load_material_textures(
        &mut self,
        gl: &glow::Context,
        material: &gltf::Material,
    ) -> Vec<MeshTexture> {
        let pbr = material.pbr_metallic_roughness();
        let sources = [
            (
                pbr.base_color_texture().map(|info| info.texture()),
                TextureKind::Diffuse,
            ),
            (
                pbr.metallic_roughness_texture().map(|info| info.texture()),
                TextureKind::Specular,
            ),
            (
                material.normal_texture().map(|info| info.texture()),
                TextureKind::Normal,
            ),
            (
                material.occlusion_texture().map(|info| info.texture()),
                TextureKind::Height,
            ),
        ];

        let mut textures = Vec::new();
        for (texture, kind) in sources {
            let Some(texture) = texture else { continue };
            let uri = match texture.source().source() {
                gltf::image::Source::Uri { uri, .. } => uri.to_string(),
                gltf::image::Source::View { .. } => continue, // Embedded images not supported here
            };
            let path = self.directory.join(&uri);
            let id = self
                .textures_loaded
                .get_or_insert_with(&path, || load_texture(gl, &path));
            if let Some(id) = id {
                textures.push(MeshTexture { id, kind, path });
            }
        }
        textures
    }
}

/// Flattens the node graph into draw order with an explicit stack instead
/// of recursion: pre-order, a node is visited before its children, siblings
/// in document order. A node's meshes are processed at its visit.
pub fn node_draw_order(document: &gltf::Document) -> Vec<gltf::Node<'_>> {
    let mut ordered = Vec::new();
    for scene in document.scenes() {
        let mut stack: Vec<gltf::Node> = scene.nodes().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            let children: Vec<gltf::Node> = node.children().collect();
            ordered.push(node);
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
    }
    ordered
}

/// Expands a glTF vec4 tangent into the fixed vertex layout. The w sign
/// carries the handedness: bitangent = cross(normal, tangent.xyz) * w.
pub fn build_vertex(
    position: [f32; 3],
    normal: [f32; 3],
    tex_coords: [f32; 2],
    tangent: [f32; 4],
) -> Vertex {
    let [nx, ny, nz] = normal;
    let [tx, ty, tz, tw] = tangent;
    let bitangent = [
        (ny * tz - nz * ty) * tw,
        (nz * tx - nx * tz) * tw,
        (nx * ty - ny * tx) * tw,
    ];
    Vertex {
        position,
        normal,
        tex_coords,
        tangent: [tx, ty, tz],
        bitangent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_loads_each_path_once() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let mut loads = 0;
        let a = Path::new("assets/wood.png");
        let b = Path::new("assets/metal.png");

        let first = cache.get_or_insert_with(a, || {
            loads += 1;
            Some(7)
        });
        let second = cache.get_or_insert_with(a, || {
            loads += 1;
            Some(99)
        });
        let third = cache.get_or_insert_with(b, || {
            loads += 1;
            Some(8)
        });

        assert_eq!(first, Some(7));
        assert_eq!(second, Some(7));
        assert_eq!(third, Some(8));
        assert_eq!(loads, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_does_not_keep_failed_loads() {
        let mut cache: TextureCache<u32> = TextureCache::new();
        let path = Path::new("assets/missing.png");

        assert_eq!(cache.get_or_insert_with(path, || None), None);
        assert_eq!(cache.len(), 0);
        // A later successful load still goes through.
        assert_eq!(cache.get_or_insert_with(path, || Some(3)), Some(3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn nodes_come_out_pre_order_children_before_next_sibling() {
        // scene roots 0 and 3; 0 -> [1, 2], 1 -> [4]
        let json = br#"{
            "asset": { "version": "2.0" },
            "scenes": [ { "nodes": [0, 3] } ],
            "nodes": [
                { "children": [1, 2] },
                { "children": [4] },
                {},
                {},
                {}
            ]
        }"#;
        let gltf = Gltf::from_slice(json).expect("document should parse");
        let order: Vec<usize> = node_draw_order(&gltf)
            .iter()
            .map(|node| node.index())
            .collect();
        assert_eq!(order, vec![0, 1, 4, 2, 3]);
    }

    #[test]
    fn empty_document_yields_no_nodes() {
        let json = br#"{ "asset": { "version": "2.0" } }"#;
        let gltf = Gltf::from_slice(json).expect("document should parse");
        assert!(node_draw_order(&gltf).is_empty());
    }

    #[test]
    fn bitangent_follows_tangent_handedness() {
        // normal +Z, tangent +X, w = 1 -> bitangent +Y
        let v = build_vertex(
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.5, 0.5],
            [1.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(v.bitangent, [0.0, 1.0, 0.0]);

        // flipped handedness -> bitangent -Y
        let v = build_vertex(
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.5, 0.5],
            [1.0, 0.0, 0.0, -1.0],
        );
        assert_eq!(v.bitangent, [0.0, -1.0, 0.0]);
    }
}
