use std::fs;
use std::path::Path;

use glow::HasContext;
use log::{error, info};

/// A compiled and linked GPU program.
///
/// Construction is fail-soft: compile and link errors are logged with the
/// driver's info log and the program is kept in whatever state the driver
/// left it in. A broken program renders nothing but never aborts the
/// process. Uniform setters look the location up by name on every call and
/// silently do nothing for names the program does not expose.
pub struct ShaderProgram {
    pub program: Option<glow::Program>,
}

impl ShaderProgram {
    /// Reads, compiles and links a vertex + fragment (+ optional geometry)
    /// shader. The caller must `use_program` before setting uniforms.
    pub fn new(
        gl: &glow::Context,
        vertex_path: &Path,
        fragment_path: &Path,
        geometry_path: Option<&Path>,
    ) -> Self {
        let vertex = compile_stage(gl, glow::VERTEX_SHADER, "VERTEX", &read_source(vertex_path));
        let fragment = compile_stage(
            gl,
            glow::FRAGMENT_SHADER,
            "FRAGMENT",
            &read_source(fragment_path),
        );
        let geometry = geometry_path
            .map(|path| compile_stage(gl, glow::GEOMETRY_SHADER, "GEOMETRY", &read_source(path)));

        let stages: Vec<glow::Shader> = [vertex, fragment]
            .into_iter()
            .chain(geometry)
            .flatten()
            .collect();

        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    error!("ERROR::SHADER::PROGRAM_CREATION_FAILED: {}", e);
                    for stage in stages {
                        gl.delete_shader(stage);
                    }
                    return ShaderProgram { program: None };
                }
            };
            for stage in &stages {
                gl.attach_shader(program, *stage);
            }
            gl.link_program(program);
            if gl.get_program_link_status(program) {
                info!("Shader-Program linked successfully");
            } else {
                error!(
                    "ERROR::PROGRAM_LINKING_ERROR of type: PROGRAM\n{}",
                    gl.get_program_info_log(program)
                );
            }
            for stage in stages {
                gl.delete_shader(stage);
            }
            ShaderProgram {
                program: Some(program),
            }
        }
    }

    /// Binds this program as the current one (or unbinds, if broken).
    pub fn use_program(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(self.program);
        }
    }

    pub fn set_bool(&self, gl: &glow::Context, name: &str, value: bool) {
        self.set_int(gl, name, value as i32);
    }

    pub fn set_int(&self, gl: &glow::Context, name: &str, value: i32) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                gl.uniform_1_i32(location.as_ref(), value);
            }
        }
    }

    pub fn set_float(&self, gl: &glow::Context, name: &str, value: f32) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                gl.uniform_1_f32(location.as_ref(), value);
            }
        }
    }

    pub fn set_vec2(&self, gl: &glow::Context, name: &str, value: cgmath::Vector2<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                gl.uniform_2_f32(location.as_ref(), value.x, value.y);
            }
        }
    }

    pub fn set_vec3(&self, gl: &glow::Context, name: &str, value: cgmath::Vector3<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                gl.uniform_3_f32(location.as_ref(), value.x, value.y, value.z);
            }
        }
    }

    pub fn set_vec4(&self, gl: &glow::Context, name: &str, value: cgmath::Vector4<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                gl.uniform_4_f32(location.as_ref(), value.x, value.y, value.z, value.w);
            }
        }
    }

    pub fn set_mat2(&self, gl: &glow::Context, name: &str, value: &cgmath::Matrix2<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                let slice: &[f32; 4] = value.as_ref();
                gl.uniform_matrix_2_f32_slice(location.as_ref(), false, slice);
            }
        }
    }

    pub fn set_mat3(&self, gl: &glow::Context, name: &str, value: &cgmath::Matrix3<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                let slice: &[f32; 9] = value.as_ref();
                gl.uniform_matrix_3_f32_slice(location.as_ref(), false, slice);
            }
        }
    }

    pub fn set_mat4(&self, gl: &glow::Context, name: &str, value: &cgmath::Matrix4<f32>) {
        if let Some(program) = self.program {
            unsafe {
                let location = gl.get_uniform_location(program, name);
                let slice: &[f32; 16] = value.as_ref();
                gl.uniform_matrix_4_f32_slice(location.as_ref(), false, slice);
            }
        }
    }
}

/// Reads a shader source file. Missing or unreadable files are logged and
/// yield an empty source, which then fails compilation loudly but non-fatally.
fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            error!(
                "ERROR::SHADER::FILE_NOT_SUCCESFULLY_READ: {} ({})",
                path.display(),
                e
            );
            String::new()
        }
    }
}

fn compile_stage(gl: &glow::Context, stage: u32, tag: &str, source: &str) -> Option<glow::Shader> {
    unsafe {
        let shader = match gl.create_shader(stage) {
            Ok(shader) => shader,
            Err(e) => {
                error!("ERROR::SHADER::STAGE_CREATION_FAILED of type: {}: {}", tag, e);
                return None;
            }
        };
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            info!("{} shader successfully compiled", tag);
        } else {
            error!(
                "ERROR::SHADER_COMPILATION_ERROR of type: {}\n{}",
                tag,
                gl.get_shader_info_log(shader)
            );
        }
        Some(shader)
    }
}
