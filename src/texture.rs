use std::path::{Path, PathBuf};

use glow::HasContext;
use log::error;

/// Decodes an image file and uploads it as a mipmapped, repeating 2D
/// texture. Returns `None` after logging if the file cannot be decoded;
/// the caller renders without the texture.
pub fn load_texture(gl: &glow::Context, path: &Path) -> Option<glow::Texture> {
    let img = match image::open(path) {
        Ok(img) => img.flipv().to_rgba8(),
        Err(e) => {
            error!("Texture failed to load at path: {} ({})", path.display(), e);
            return None;
        }
    };
    let (width, height) = img.dimensions();
    let data = img.into_raw();

    unsafe {
        let texture = match gl.create_texture() {
            Ok(texture) => texture,
            Err(e) => {
                error!("Failed to create texture object: {}", e);
                return None;
            }
        };
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&data)),
        );
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.bind_texture(glow::TEXTURE_2D, None);

        Some(texture)
    }
}

/// Uploads six face images as one cubemap texture, in the GL face order
/// +X, -X, +Y, -Y, +Z, -Z. Faces that fail to decode are logged and left
/// unfilled. The faces are expected to be same-size squares; that is not
/// validated here.
pub fn load_cubemap(gl: &glow::Context, faces: &[PathBuf; 6]) -> Option<glow::Texture> {
    unsafe {
        let texture = match gl.create_texture() {
            Ok(texture) => texture,
            Err(e) => {
                error!("Failed to create cubemap texture object: {}", e);
                return None;
            }
        };
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));

        // RGB rows are tightly packed; widths not divisible by 4 would
        // shear under the default alignment.
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        for (i, face) in faces.iter().enumerate() {
            match image::open(face) {
                Ok(img) => {
                    let img = img.to_rgb8();
                    let (width, height) = img.dimensions();
                    let data = img.into_raw();
                    gl.tex_image_2d(
                        glow::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                        0,
                        glow::RGB as i32,
                        width as i32,
                        height as i32,
                        0,
                        glow::RGB,
                        glow::UNSIGNED_BYTE,
                        glow::PixelUnpackData::Slice(Some(&data)),
                    );
                }
                Err(e) => {
                    error!(
                        "Cubemap texture failed to load at path: {} ({})",
                        face.display(),
                        e
                    );
                }
            }
        }
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);

        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_WRAP_R,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);

        Some(texture)
    }
}
