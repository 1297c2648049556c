use std::path::{Path, PathBuf};

use cgmath::{perspective, Deg, Matrix4};
use glow::HasContext;

use crate::camera::Camera;
use crate::shader::ShaderProgram;
use crate::texture::load_cubemap;

#[rustfmt::skip]
const SKYBOX_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,
    -1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,
    -1.0, -1.0, -1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
    -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
     1.0, -1.0,  1.0,
    -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,
     1.0,  1.0, -1.0,
     1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
    -1.0,  1.0,  1.0,
    -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
];

const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Face file paths in GL cubemap order (+X, -X, +Y, -Y, +Z, -Z), derived
/// from a directory by the fixed name-plus-`.jpg` convention.
pub fn face_paths(dir: &Path) -> [PathBuf; 6] {
    FACE_NAMES.map(|name| dir.join(format!("{}.jpg", name)))
}

/// Removes the translation column of a view matrix, keeping the rotation
/// so the skybox follows the camera's orientation but never its position.
pub fn strip_translation(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut stripped = view;
    stripped.w.x = 0.0;
    stripped.w.y = 0.0;
    stripped.w.z = 0.0;
    stripped
}

/// A 36-vertex cube drawn around the camera with a cubemap sampler.
///
/// Depth contract: the caller relaxes the depth func to LEQUAL around
/// `draw` and restores LESS after, so the cube passes at depth 1.0.
pub struct Skybox {
    shader: ShaderProgram,
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    cubemap: Option<glow::Texture>,
}

impl Skybox {
    pub fn new(gl: &glow::Context, dir: &Path) -> Self {
        let shader = ShaderProgram::new(
            gl,
            Path::new("shaders/skybox.vert"),
            Path::new("shaders/skybox.frag"),
            None,
        );
        shader.use_program(gl);
        shader.set_int(gl, "skybox", 0);

        unsafe {
            let vao = gl.create_vertex_array().expect("Failed to create VAO");
            gl.bind_vertex_array(Some(vao));
            let vbo = gl.create_buffer().expect("Failed to create VBO");
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&SKYBOX_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 12, 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_vertex_array(None);

            let cubemap = load_cubemap(gl, &face_paths(dir));

            Skybox {
                shader,
                vao,
                _vbo: vbo,
                cubemap,
            }
        }
    }

    pub fn set_uniforms(&self, gl: &glow::Context, camera: &Camera, width: u32, height: u32) {
        self.shader.use_program(gl);
        let view = strip_translation(camera.view_matrix());
        let projection = perspective(
            Deg(camera.zoom),
            width as f32 / height as f32,
            0.1,
            100.0,
        );
        self.shader.set_mat4(gl, "view", &view);
        self.shader.set_mat4(gl, "projection", &projection);
    }

    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, self.cubemap);
            gl.draw_arrays(glow::TRIANGLES, 0, 36);
            gl.bind_vertex_array(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Vector3};

    #[test]
    fn face_paths_follow_the_fixed_order() {
        let paths = face_paths(Path::new("assets/skybox"));
        assert_eq!(paths[0], Path::new("assets/skybox/right.jpg"));
        assert_eq!(paths[1], Path::new("assets/skybox/left.jpg"));
        assert_eq!(paths[2], Path::new("assets/skybox/top.jpg"));
        assert_eq!(paths[3], Path::new("assets/skybox/bottom.jpg"));
        assert_eq!(paths[4], Path::new("assets/skybox/front.jpg"));
        assert_eq!(paths[5], Path::new("assets/skybox/back.jpg"));
    }

    #[test]
    fn strip_translation_keeps_rotation_only() {
        let view = Matrix4::look_at_rh(
            Point3::new(3.0, 2.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let stripped = strip_translation(view);

        assert_eq!(stripped.w.x, 0.0);
        assert_eq!(stripped.w.y, 0.0);
        assert_eq!(stripped.w.z, 0.0);
        assert_eq!(stripped.w.w, view.w.w);
        // Rotation columns untouched.
        assert_eq!(stripped.x, view.x);
        assert_eq!(stripped.y, view.y);
        assert_eq!(stripped.z, view.z);
    }
}
