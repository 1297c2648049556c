use std::path::Path;

use cgmath::{ortho, perspective, Deg, EuclideanSpace, Matrix4, Point3, Vector3};
use glow::HasContext;
use log::{info, warn};

use crate::camera::Camera;
use crate::framebuffer::{Framebuffer, ShadowMap};
use crate::hud::{GlyphCache, TextRenderer};
use crate::model::Model;
use crate::scene::Scene;
use crate::shader::ShaderProgram;
use crate::skybox::Skybox;
use crate::texture::load_texture;

const SHADOW_WIDTH: u32 = 1024;
const SHADOW_HEIGHT: u32 = 1024;
const GLYPH_PIXEL_SIZE: f32 = 48.0;
const LIGHT_POS: Vector3<f32> = Vector3::new(-2.0, 4.0, -1.0);

/// Owns every GPU resource of the frame and runs the fixed pass sequence:
/// shadow depth, multisampled color, skybox, resolve blit, post-process
/// quad, text overlay. The sequence never branches on earlier failures;
/// broken resources simply contribute nothing to the frame.
pub struct Renderer {
    framebuffer: Framebuffer,
    shadow_map: ShadowMap,
    object_shader: ShaderProgram,
    depth_shader: ShaderProgram,
    model: Model,
    skybox: Skybox,
    scene: Scene,
    glyphs: GlyphCache,
    text: TextRenderer,
    wood_texture: Option<glow::Texture>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Self {
        let framebuffer = Framebuffer::new(
            gl,
            width,
            height,
            Path::new("shaders/screen.vert"),
            Path::new("shaders/screen.frag"),
            None,
        );
        if !framebuffer.complete {
            warn!("Render targets incomplete, frames will come out black");
        }
        let shadow_map = ShadowMap::new(gl, SHADOW_WIDTH, SHADOW_HEIGHT);

        let object_shader = ShaderProgram::new(
            gl,
            Path::new("shaders/object.vert"),
            Path::new("shaders/object.frag"),
            None,
        );
        object_shader.use_program(gl);
        object_shader.set_int(gl, "diffuseTexture", 0);
        object_shader.set_int(gl, "shadowMap", 1);

        let depth_shader = ShaderProgram::new(
            gl,
            Path::new("shaders/depth.vert"),
            Path::new("shaders/depth.frag"),
            None,
        );

        let model = Model::new(gl, Path::new("assets/models/target/target.gltf"));
        let skybox = Skybox::new(gl, Path::new("assets/skybox"));
        let scene = Scene::new(gl);
        let glyphs = GlyphCache::new(gl, Path::new("assets/fonts/arial.ttf"), GLYPH_PIXEL_SIZE);
        let text = TextRenderer::new(
            gl,
            Path::new("shaders/glyph.vert"),
            Path::new("shaders/glyph.frag"),
        );
        let wood_texture = load_texture(gl, Path::new("assets/textures/wood.png"));

        info!("Renderer resources created ({}x{})", width, height);

        Renderer {
            framebuffer,
            shadow_map,
            object_shader,
            depth_shader,
            model,
            skybox,
            scene,
            glyphs,
            text,
            wood_texture,
            width,
            height,
        }
    }

    /// Placement of the loaded target model: standing on the floor plane,
    /// scaled down to scene proportions. Set explicitly before every model
    /// draw so the target never inherits the last cube's transform.
    fn target_transform() -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(0.0, -0.5, -2.0)) * Matrix4::from_scale(0.2)
    }

    fn light_space_matrix(&self) -> Matrix4<f32> {
        let projection = ortho(-10.0, 10.0, -10.0, 10.0, 1.0, 7.5);
        let view = Matrix4::look_at_rh(
            Point3::from_vec(LIGHT_POS),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        projection * view
    }

    pub fn render_frame(&self, gl: &glow::Context, camera: &Camera, fps: f32) {
        let light_space_matrix = self.light_space_matrix();

        // 1. Shadow pass: scene depth from the light's point of view.
        self.depth_shader.use_program(gl);
        self.depth_shader
            .set_mat4(gl, "lightSpaceMatrix", &light_space_matrix);
        self.shadow_map.bind(gl);
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.clear(glow::DEPTH_BUFFER_BIT);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.wood_texture);
        }
        self.scene.render(gl, &self.depth_shader);
        self.depth_shader
            .set_mat4(gl, "model", &Self::target_transform());
        self.model.draw(gl, &self.depth_shader);

        // 2. Color pass into the multisampled target.
        self.framebuffer.bind_msaa(gl);
        unsafe {
            gl.viewport(0, 0, self.width as i32, self.height as i32);
            gl.enable(glow::DEPTH_TEST);
            gl.clear_color(0.2, 0.3, 0.3, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let projection = perspective(
            Deg(camera.zoom),
            self.width as f32 / self.height as f32,
            0.1,
            100.0,
        );
        self.object_shader.use_program(gl);
        self.object_shader.set_mat4(gl, "projection", &projection);
        self.object_shader.set_mat4(gl, "view", &camera.view_matrix());
        self.object_shader
            .set_vec3(gl, "viewPos", camera.position.to_vec());
        self.object_shader.set_vec3(gl, "lightPos", LIGHT_POS);
        self.object_shader
            .set_mat4(gl, "lightSpaceMatrix", &light_space_matrix);
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.wood_texture);
            gl.active_texture(glow::TEXTURE1);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.shadow_map.depth_texture));
            gl.active_texture(glow::TEXTURE0);
        }
        self.scene.render(gl, &self.object_shader);
        self.object_shader
            .set_mat4(gl, "model", &Self::target_transform());
        self.model.draw(gl, &self.object_shader);

        // 3. Skybox last in the scene, behind everything at depth 1.0.
        unsafe {
            gl.depth_func(glow::LEQUAL);
        }
        self.skybox.set_uniforms(gl, camera, self.width, self.height);
        self.skybox.draw(gl);
        unsafe {
            gl.depth_func(glow::LESS);
        }

        // 4. Resolve the samples, 5. present through the screen quad.
        self.framebuffer.blit(gl, self.width, self.height);
        self.framebuffer.draw(gl);

        // 6. FPS overlay on top of the presented frame.
        let text_projection = ortho(0.0, self.width as f32, 0.0, self.height as f32, -1.0, 1.0);
        unsafe {
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        self.text.render_text(
            gl,
            &self.glyphs,
            &format!("FPS: {:.0}", fps),
            10.0,
            self.height as f32 - 40.0,
            0.5,
            Vector3::new(1.0, 1.0, 0.0),
            &text_projection,
        );
        unsafe {
            gl.disable(glow::BLEND);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn target_gets_its_own_placement() {
        let transform = Renderer::target_transform();
        // on the floor, in front of the camera
        assert_eq!(transform.w.x, 0.0);
        assert_eq!(transform.w.y, -0.5);
        assert_eq!(transform.w.z, -2.0);
        // uniformly scaled, not identity and not a cube transform
        assert_eq!(transform.x.x, 0.2);
        assert_eq!(transform.y.y, 0.2);
        assert_eq!(transform.z.z, 0.2);
        assert_ne!(transform, Matrix4::identity());
    }
}
