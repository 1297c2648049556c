use std::path::Path;

use glow::HasContext;
use log::error;

use crate::shader::ShaderProgram;

const MSAA_SAMPLES: i32 = 4;

// Full-screen quad: 2D position + UV, two triangles.
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 24] = [
    -1.0,  1.0,  0.0, 1.0,
    -1.0, -1.0,  0.0, 0.0,
     1.0, -1.0,  1.0, 0.0,

    -1.0,  1.0,  0.0, 1.0,
     1.0, -1.0,  1.0, 0.0,
     1.0,  1.0,  1.0, 1.0,
];

/// Dual render target: a 4x multisampled framebuffer the scene renders
/// into, and a single-sample framebuffer it resolves to, whose color
/// texture the post-process shader draws onto a full-screen quad.
///
/// Attachment order matters: completeness is checked only after every
/// attachment of a target is in place, and attachments are never added or
/// resized afterwards. An incomplete target is logged and left broken;
/// rendering through it produces black frames, never a crash.
pub struct Framebuffer {
    fbo_msaa: glow::Framebuffer,
    _tex_msaa: glow::Texture,
    _rbo_msaa: glow::Renderbuffer,
    fbo: glow::Framebuffer,
    texture: glow::Texture,
    quad_vao: glow::VertexArray,
    _quad_vbo: glow::Buffer,
    screen_shader: ShaderProgram,
    pub complete: bool,
}

impl Framebuffer {
    pub fn new(
        gl: &glow::Context,
        width: u32,
        height: u32,
        vert: &Path,
        frag: &Path,
        geom: Option<&Path>,
    ) -> Self {
        unsafe {
            // Multisampled target.
            let fbo_msaa = gl.create_framebuffer().expect("Failed to create FBO");
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo_msaa));

            let tex_msaa = gl.create_texture().expect("Failed to create texture");
            gl.bind_texture(glow::TEXTURE_2D_MULTISAMPLE, Some(tex_msaa));
            gl.tex_image_2d_multisample(
                glow::TEXTURE_2D_MULTISAMPLE,
                MSAA_SAMPLES,
                glow::RGB as i32,
                width as i32,
                height as i32,
                true,
            );
            gl.bind_texture(glow::TEXTURE_2D_MULTISAMPLE, None);
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D_MULTISAMPLE,
                Some(tex_msaa),
                0,
            );

            let rbo_msaa = gl.create_renderbuffer().expect("Failed to create RBO");
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rbo_msaa));
            gl.renderbuffer_storage_multisample(
                glow::RENDERBUFFER,
                MSAA_SAMPLES,
                glow::DEPTH24_STENCIL8,
                width as i32,
                height as i32,
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(rbo_msaa),
            );

            let msaa_complete = check_status(gl);

            // Resolve target: single-sample color only.
            let fbo = gl.create_framebuffer().expect("Failed to create FBO");
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));

            let texture = gl.create_texture().expect("Failed to create texture");
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB as i32,
                width as i32,
                height as i32,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );

            let resolve_complete = check_status(gl);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            // Screen quad.
            let quad_vao = gl.create_vertex_array().expect("Failed to create VAO");
            gl.bind_vertex_array(Some(quad_vao));
            let quad_vbo = gl.create_buffer().expect("Failed to create VBO");
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(quad_vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 16, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 16, 8);
            gl.enable_vertex_attrib_array(1);
            gl.bind_vertex_array(None);

            let screen_shader = ShaderProgram::new(gl, vert, frag, geom);
            screen_shader.use_program(gl);
            screen_shader.set_int(gl, "screenTexture", 0);

            Framebuffer {
                fbo_msaa,
                _tex_msaa: tex_msaa,
                _rbo_msaa: rbo_msaa,
                fbo,
                texture,
                quad_vao,
                _quad_vbo: quad_vbo,
                screen_shader,
                complete: msaa_complete && resolve_complete,
            }
        }
    }

    /// Binds the multisampled target for the scene pass.
    pub fn bind_msaa(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo_msaa));
        }
    }

    /// Resolves the multisampled color buffer into the single-sample
    /// texture. Color bit only; destination depth is untouched.
    pub fn blit(&self, gl: &glow::Context, width: u32, height: u32) {
        unsafe {
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(self.fbo_msaa));
            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, Some(self.fbo));
            gl.blit_framebuffer(
                0,
                0,
                width as i32,
                height as i32,
                0,
                0,
                width as i32,
                height as i32,
                glow::COLOR_BUFFER_BIT,
                glow::NEAREST,
            );
        }
    }

    /// Draws the resolved texture onto the default framebuffer through the
    /// post-process shader. Depth testing stays off until the caller turns
    /// it back on for the next frame.
    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.disable(glow::DEPTH_TEST);
            gl.clear_color(1.0, 1.0, 1.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            self.screen_shader.use_program(gl);
            gl.bind_vertex_array(Some(self.quad_vao));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.draw_arrays(glow::TRIANGLES, 0, 6);
            gl.bind_vertex_array(None);
        }
    }
}

/// Depth-only framebuffer for the shadow pass. No color output: draw and
/// read buffers are set to NONE before the completeness check.
pub struct ShadowMap {
    fbo: glow::Framebuffer,
    pub depth_texture: glow::Texture,
    width: u32,
    height: u32,
}

impl ShadowMap {
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Self {
        unsafe {
            let fbo = gl.create_framebuffer().expect("Failed to create FBO");

            let depth_texture = gl.create_texture().expect("Failed to create texture");
            gl.bind_texture(glow::TEXTURE_2D, Some(depth_texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT as i32,
                width as i32,
                height as i32,
                0,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(depth_texture),
                0,
            );
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);
            check_status(gl);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            ShadowMap {
                fbo,
                depth_texture,
                width,
                height,
            }
        }
    }

    /// Binds the depth target and sets the shadow-resolution viewport.
    /// The caller restores the screen viewport after the pass.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }
}

/// Checks the currently bound framebuffer. On incompleteness, logs and
/// rebinds the default framebuffer so later draws still have a target.
fn check_status(gl: &glow::Context) -> bool {
    unsafe {
        if gl.check_framebuffer_status(glow::FRAMEBUFFER) == glow::FRAMEBUFFER_COMPLETE {
            true
        } else {
            error!("ERROR::FRAMEBUFFER:: Framebuffer is not complete");
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            false
        }
    }
}
