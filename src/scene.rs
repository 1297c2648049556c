use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};
use glow::HasContext;

use crate::shader::ShaderProgram;

// Ground plane: position, normal, tiled texcoords.
#[rustfmt::skip]
const PLANE_VERTICES: [f32; 48] = [
     25.0, -0.5,  25.0,  0.0, 1.0, 0.0,  25.0,  0.0,
    -25.0, -0.5,  25.0,  0.0, 1.0, 0.0,   0.0,  0.0,
    -25.0, -0.5, -25.0,  0.0, 1.0, 0.0,   0.0, 25.0,

     25.0, -0.5,  25.0,  0.0, 1.0, 0.0,  25.0,  0.0,
    -25.0, -0.5, -25.0,  0.0, 1.0, 0.0,   0.0, 25.0,
     25.0, -0.5, -25.0,  0.0, 1.0, 0.0,  25.0, 25.0,
];

// Unit cube: position, normal, texcoords, 36 vertices.
#[rustfmt::skip]
const CUBE_VERTICES: [f32; 288] = [
    // back face
    -1.0, -1.0, -1.0,  0.0,  0.0, -1.0,  0.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  0.0, -1.0,  1.0, 1.0,
     1.0, -1.0, -1.0,  0.0,  0.0, -1.0,  1.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  0.0, -1.0,  1.0, 1.0,
    -1.0, -1.0, -1.0,  0.0,  0.0, -1.0,  0.0, 0.0,
    -1.0,  1.0, -1.0,  0.0,  0.0, -1.0,  0.0, 1.0,
    // front face
    -1.0, -1.0,  1.0,  0.0,  0.0,  1.0,  0.0, 0.0,
     1.0, -1.0,  1.0,  0.0,  0.0,  1.0,  1.0, 0.0,
     1.0,  1.0,  1.0,  0.0,  0.0,  1.0,  1.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  0.0,  1.0,  1.0, 1.0,
    -1.0,  1.0,  1.0,  0.0,  0.0,  1.0,  0.0, 1.0,
    -1.0, -1.0,  1.0,  0.0,  0.0,  1.0,  0.0, 0.0,
    // left face
    -1.0,  1.0,  1.0, -1.0,  0.0,  0.0,  1.0, 0.0,
    -1.0,  1.0, -1.0, -1.0,  0.0,  0.0,  1.0, 1.0,
    -1.0, -1.0, -1.0, -1.0,  0.0,  0.0,  0.0, 1.0,
    -1.0, -1.0, -1.0, -1.0,  0.0,  0.0,  0.0, 1.0,
    -1.0, -1.0,  1.0, -1.0,  0.0,  0.0,  0.0, 0.0,
    -1.0,  1.0,  1.0, -1.0,  0.0,  0.0,  1.0, 0.0,
    // right face
     1.0,  1.0,  1.0,  1.0,  0.0,  0.0,  1.0, 0.0,
     1.0, -1.0, -1.0,  1.0,  0.0,  0.0,  0.0, 1.0,
     1.0,  1.0, -1.0,  1.0,  0.0,  0.0,  1.0, 1.0,
     1.0, -1.0, -1.0,  1.0,  0.0,  0.0,  0.0, 1.0,
     1.0,  1.0,  1.0,  1.0,  0.0,  0.0,  1.0, 0.0,
     1.0, -1.0,  1.0,  1.0,  0.0,  0.0,  0.0, 0.0,
    // bottom face
    -1.0, -1.0, -1.0,  0.0, -1.0,  0.0,  0.0, 1.0,
     1.0, -1.0, -1.0,  0.0, -1.0,  0.0,  1.0, 1.0,
     1.0, -1.0,  1.0,  0.0, -1.0,  0.0,  1.0, 0.0,
     1.0, -1.0,  1.0,  0.0, -1.0,  0.0,  1.0, 0.0,
    -1.0, -1.0,  1.0,  0.0, -1.0,  0.0,  0.0, 0.0,
    -1.0, -1.0, -1.0,  0.0, -1.0,  0.0,  0.0, 1.0,
    // top face
    -1.0,  1.0, -1.0,  0.0,  1.0,  0.0,  0.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  1.0,  0.0,  1.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  1.0,  0.0,  1.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  1.0,  0.0,  1.0, 0.0,
    -1.0,  1.0, -1.0,  0.0,  1.0,  0.0,  0.0, 1.0,
    -1.0,  1.0,  1.0,  0.0,  1.0,  0.0,  0.0, 0.0,
];

/// Static demo geometry: a ground plane and three transformed cubes,
/// uploaded once. The shadow pass and the color pass draw the identical
/// geometry with different shaders.
pub struct Scene {
    plane_vao: glow::VertexArray,
    _plane_vbo: glow::Buffer,
    cube_vao: glow::VertexArray,
    _cube_vbo: glow::Buffer,
}

impl Scene {
    pub fn new(gl: &glow::Context) -> Self {
        unsafe {
            let (plane_vao, plane_vbo) = upload(gl, &PLANE_VERTICES);
            let (cube_vao, cube_vbo) = upload(gl, &CUBE_VERTICES);
            Scene {
                plane_vao,
                _plane_vbo: plane_vbo,
                cube_vao,
                _cube_vbo: cube_vbo,
            }
        }
    }

    /// Draws the plane and the cubes, setting the `model` uniform per
    /// object. The shader must already be bound with view/projection set.
    pub fn render(&self, gl: &glow::Context, shader: &ShaderProgram) {
        shader.set_mat4(gl, "model", &Matrix4::identity());
        unsafe {
            gl.bind_vertex_array(Some(self.plane_vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 6);
        }

        let cubes = [
            Matrix4::from_translation(Vector3::new(0.0, 1.5, 0.0)) * Matrix4::from_scale(0.5),
            Matrix4::from_translation(Vector3::new(2.0, 0.0, 1.0)) * Matrix4::from_scale(0.5),
            Matrix4::from_translation(Vector3::new(-1.0, 0.0, 2.0))
                * Matrix4::from_axis_angle(Vector3::new(1.0, 0.0, 1.0).normalize(), Deg(60.0))
                * Matrix4::from_scale(0.25),
        ];
        unsafe {
            gl.bind_vertex_array(Some(self.cube_vao));
            for model in &cubes {
                shader.set_mat4(gl, "model", model);
                gl.draw_arrays(glow::TRIANGLES, 0, 36);
            }
            gl.bind_vertex_array(None);
        }
    }
}

/// Uploads interleaved pos3/normal3/uv2 vertices and wires attributes 0-2.
unsafe fn upload(gl: &glow::Context, vertices: &[f32]) -> (glow::VertexArray, glow::Buffer) {
    let vao = gl.create_vertex_array().expect("Failed to create VAO");
    gl.bind_vertex_array(Some(vao));
    let vbo = gl.create_buffer().expect("Failed to create VBO");
    gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
    gl.buffer_data_u8_slice(
        glow::ARRAY_BUFFER,
        bytemuck::cast_slice(vertices),
        glow::STATIC_DRAW,
    );
    gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 32, 0);
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, 32, 12);
    gl.enable_vertex_attrib_array(1);
    gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, 32, 24);
    gl.enable_vertex_attrib_array(2);
    gl.bind_vertex_array(None);
    (vao, vbo)
}
