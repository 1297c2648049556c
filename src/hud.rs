use std::collections::HashMap;
use std::path::Path;

use cgmath::Matrix4;
use glow::HasContext;
use log::{error, info};

use crate::shader::ShaderProgram;

/// One rasterized glyph: its GPU texture and the metrics needed to place
/// it on the baseline. `bearing_y` is the distance from the baseline to
/// the top of the bitmap.
pub struct Glyph {
    pub texture: Option<glow::Texture>,
    pub width: i32,
    pub height: i32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance: f32,
}

/// ASCII glyphs rasterized once at a fixed pixel size, one single-channel
/// GL texture per glyph. Immutable after construction. A font that fails
/// to load leaves the cache empty; text drawing then does nothing.
pub struct GlyphCache {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphCache {
    pub fn new(gl: &glow::Context, font_path: &Path, pixel_size: f32) -> Self {
        let data = match std::fs::read(font_path) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to read font {}: {}", font_path.display(), e);
                return GlyphCache {
                    glyphs: HashMap::new(),
                };
            }
        };
        let font = match fontdue::Font::from_bytes(data, fontdue::FontSettings::default()) {
            Ok(font) => font,
            Err(e) => {
                error!("Failed to parse font {}: {}", font_path.display(), e);
                return GlyphCache {
                    glyphs: HashMap::new(),
                };
            }
        };

        let mut glyphs = HashMap::new();
        unsafe {
            // Glyph bitmaps are single-channel with arbitrary row widths.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            for code in 0u32..128 {
                let Some(ch) = char::from_u32(code) else { continue };
                let (metrics, bitmap) = font.rasterize(ch, pixel_size);

                let texture = match gl.create_texture() {
                    Ok(texture) => {
                        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
                        gl.tex_image_2d(
                            glow::TEXTURE_2D,
                            0,
                            glow::R8 as i32,
                            metrics.width as i32,
                            metrics.height as i32,
                            0,
                            glow::RED,
                            glow::UNSIGNED_BYTE,
                            glow::PixelUnpackData::Slice(Some(&bitmap)),
                        );
                        gl.tex_parameter_i32(
                            glow::TEXTURE_2D,
                            glow::TEXTURE_WRAP_S,
                            glow::CLAMP_TO_EDGE as i32,
                        );
                        gl.tex_parameter_i32(
                            glow::TEXTURE_2D,
                            glow::TEXTURE_WRAP_T,
                            glow::CLAMP_TO_EDGE as i32,
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
                        Some(texture)
                    }
                    Err(e) => {
                        error!("Failed to create glyph texture for {:?}: {}", ch, e);
                        None
                    }
                };

                glyphs.insert(
                    ch,
                    Glyph {
                        texture,
                        width: metrics.width as i32,
                        height: metrics.height as i32,
                        bearing_x: metrics.xmin,
                        bearing_y: metrics.ymin + metrics.height as i32,
                        advance: metrics.advance_width,
                    },
                );
            }
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
        info!("Glyph cache built: {} glyphs at {}px", glyphs.len(), pixel_size);
        GlyphCache { glyphs }
    }

    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }
}

/// Six vertices (x, y, u, v) for one glyph quad, positioned relative to
/// the baseline pen. v = 0 is the top bitmap row.
pub fn glyph_quad(x: f32, y: f32, scale: f32, glyph: &Glyph) -> [[f32; 4]; 6] {
    let xpos = x + glyph.bearing_x as f32 * scale;
    let ypos = y - (glyph.height - glyph.bearing_y) as f32 * scale;
    let w = glyph.width as f32 * scale;
    let h = glyph.height as f32 * scale;
    [
        [xpos, ypos + h, 0.0, 0.0],
        [xpos, ypos, 0.0, 1.0],
        [xpos + w, ypos, 1.0, 1.0],
        [xpos, ypos + h, 0.0, 0.0],
        [xpos + w, ypos, 1.0, 1.0],
        [xpos + w, ypos + h, 1.0, 0.0],
    ]
}

/// Draws cached glyphs one quad at a time through a dynamic VBO. ASCII
/// only: code points the cache does not hold are skipped.
pub struct TextRenderer {
    shader: ShaderProgram,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

impl TextRenderer {
    pub fn new(gl: &glow::Context, vert: &Path, frag: &Path) -> Self {
        let shader = ShaderProgram::new(gl, vert, frag, None);
        unsafe {
            let vao = gl.create_vertex_array().expect("Failed to create VAO");
            gl.bind_vertex_array(Some(vao));
            let vbo = gl.create_buffer().expect("Failed to create VBO");
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_size(glow::ARRAY_BUFFER, 6 * 4 * 4, glow::DYNAMIC_DRAW);
            gl.vertex_attrib_pointer_f32(0, 4, glow::FLOAT, false, 16, 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            TextRenderer { shader, vao, vbo }
        }
    }

    /// Renders `text` with its baseline at (x, y) in the projection's
    /// coordinate space. The caller enables blending around this call.
    #[allow(clippy::too_many_arguments)]
    pub fn render_text(
        &self,
        gl: &glow::Context,
        cache: &GlyphCache,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: cgmath::Vector3<f32>,
        projection: &Matrix4<f32>,
    ) {
        self.shader.use_program(gl);
        self.shader.set_vec3(gl, "textColor", color);
        self.shader.set_mat4(gl, "projection", projection);

        let mut pen_x = x;
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_vertex_array(Some(self.vao));
            for ch in text.chars() {
                let Some(glyph) = cache.get(ch) else { continue };
                if let Some(texture) = glyph.texture {
                    let vertices = glyph_quad(pen_x, y, scale, glyph);
                    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
                    gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
                    gl.buffer_sub_data_u8_slice(
                        glow::ARRAY_BUFFER,
                        0,
                        bytemuck::cast_slice(&vertices),
                    );
                    gl.bind_buffer(glow::ARRAY_BUFFER, None);
                    gl.draw_arrays(glow::TRIANGLES, 0, 6);
                }
                pen_x += glyph.advance * scale;
            }
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: i32, height: i32, bearing_x: i32, bearing_y: i32) -> Glyph {
        Glyph {
            texture: None,
            width,
            height,
            bearing_x,
            bearing_y,
            advance: 12.0,
        }
    }

    #[test]
    fn quad_sits_on_the_baseline() {
        // 10x20 bitmap, 18 px of it above the baseline.
        let g = glyph(10, 20, 2, 18);
        let quad = glyph_quad(100.0, 50.0, 1.0, &g);

        let xpos = 102.0;
        let ypos = 48.0; // 2 px descend below the baseline
        assert_eq!(quad[1], [xpos, ypos, 0.0, 1.0]);
        assert_eq!(quad[0], [xpos, ypos + 20.0, 0.0, 0.0]);
        assert_eq!(quad[5], [xpos + 10.0, ypos + 20.0, 1.0, 0.0]);
    }

    #[test]
    fn quad_scales_around_the_pen() {
        let g = glyph(10, 20, 2, 18);
        let quad = glyph_quad(0.0, 0.0, 0.5, &g);
        assert_eq!(quad[1][0], 1.0); // bearing_x * 0.5
        assert_eq!(quad[1][1], -1.0); // (height - bearing_y) * 0.5 below baseline
        assert_eq!(quad[2][0], 1.0 + 5.0);
    }

    #[test]
    fn top_of_the_bitmap_maps_to_v_zero() {
        let g = glyph(4, 4, 0, 4);
        let quad = glyph_quad(0.0, 0.0, 1.0, &g);
        for v in quad {
            if v[1] == 4.0 {
                assert_eq!(v[3], 0.0);
            }
            if v[1] == 0.0 {
                assert_eq!(v[3], 1.0);
            }
        }
    }
}
