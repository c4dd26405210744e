//! OpenGL render surface built on glow.
//!
//! Uploads happen on the UI thread through eframe's shared glow context;
//! drawing happens inside an egui paint callback that replays the last frame
//! description handed to [`RenderSurface::draw`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glow::HasContext;

use anatomar_gui_lib::asset::model::MaterialData;
use anatomar_gui_lib::viewport::mesh::{MeshData, VERTEX_STRIDE};
use anatomar_gui_lib::viewport::scene::Light;
use anatomar_gui_lib::viewport::surface::{
    FrameDescription, GeometryHandle, MaterialHandle, MountRegion, RenderSurface, SurfaceError,
};

const MAX_DIRECTIONAL: usize = 4;

// ── GPU resource handles ─────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuMaterial {
    base_color: [f32; 4],
    texture: Option<glow::Texture>,
    double_sided: bool,
}

/// State shared between the surface (UI thread) and its paint callbacks
#[derive(Default)]
struct GpuStore {
    program: Option<glow::Program>,
    meshes: HashMap<GeometryHandle, GpuMesh>,
    materials: HashMap<MaterialHandle, GpuMaterial>,
    frame: Option<FrameDescription>,
}

pub struct GlSurface {
    gl: Arc<glow::Context>,
    store: Arc<Mutex<GpuStore>>,
    attached: bool,
    size: (u32, u32),
    next_handle: u64,
}

impl GlSurface {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self {
            gl,
            store: Arc::new(Mutex::new(GpuStore::default())),
            attached: false,
            size: (0, 0),
            next_handle: 0,
        }
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Callback that draws the most recent frame into `rect`
    pub fn paint_callback(&self, rect: egui::Rect) -> Option<egui::PaintCallback> {
        if !self.attached {
            return None;
        }
        let store = self.store.clone();
        Some(egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px,
                    clip.from_bottom_px,
                    clip.width_px,
                    clip.height_px,
                ];
                if let Ok(store) = store.lock() {
                    store.paint(painter.gl(), viewport);
                }
            })),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, GpuStore>, SurfaceError> {
        self.store
            .lock()
            .map_err(|_| SurfaceError::Upload("GPU store poisoned".into()))
    }
}

impl RenderSurface for GlSurface {
    fn attach(&mut self, region: MountRegion) -> Result<(), SurfaceError> {
        let program = compile_program(&self.gl, MESH_VERT, MESH_FRAG).map_err(SurfaceError::Upload)?;
        self.lock()?.program = Some(program);
        self.attached = true;
        self.size = (region.width, region.height);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn detach(&mut self) {
        self.attached = false;
        if let Ok(mut store) = self.store.lock() {
            store.frame = None;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryHandle, SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::Detached);
        }
        let gpu = upload_mesh(&self.gl, mesh).map_err(SurfaceError::Upload)?;
        let handle = GeometryHandle(self.next_handle());
        self.lock()?.meshes.insert(handle, gpu);
        Ok(handle)
    }

    fn upload_material(&mut self, material: &MaterialData) -> Result<MaterialHandle, SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::Detached);
        }
        let texture = match &material.base_color_texture {
            Some(tex) => Some(upload_texture(&self.gl, tex.width, tex.height, &tex.rgba).map_err(SurfaceError::Upload)?),
            None => None,
        };
        let handle = MaterialHandle(self.next_handle());
        self.lock()?.materials.insert(
            handle,
            GpuMaterial {
                base_color: material.base_color,
                texture,
                double_sided: material.double_sided,
            },
        );
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        let Ok(mut store) = self.store.lock() else {
            return;
        };
        if let Some(mesh) = store.meshes.remove(&handle) {
            unsafe {
                self.gl.delete_vertex_array(mesh.vao);
                self.gl.delete_buffer(mesh.vbo);
                self.gl.delete_buffer(mesh.ibo);
            }
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        let Ok(mut store) = self.store.lock() else {
            return;
        };
        if let Some(texture) = store.materials.remove(&handle).and_then(|m| m.texture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn draw(&mut self, frame: &FrameDescription) {
        if let Ok(mut store) = self.store.lock() {
            store.frame = Some(frame.clone());
        }
    }

    fn dispose(&mut self) {
        let Ok(mut store) = self.store.lock() else {
            return;
        };
        store.frame = None;
        if let Some(program) = store.program.take() {
            unsafe { self.gl.delete_program(program) };
        }
    }
}

// ── Painting ─────────────────────────────────────────────────

impl GpuStore {
    fn paint(&self, gl: &glow::Context, viewport: [i32; 4]) {
        let (Some(program), Some(frame)) = (self.program, self.frame.as_ref()) else {
            return;
        };
        let [x, y, w, h] = viewport;

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            match frame.background {
                Some([r, g, b]) => {
                    gl.clear_color(r, g, b, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                }
                None => gl.clear(glow::DEPTH_BUFFER_BIT),
            }

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            gl.use_program(Some(program));
            let view_proj = frame.projection * frame.view;
            set_uniform_mat4(gl, program, "u_view_proj", &view_proj);
            set_lights(gl, program, &frame.lights);
            set_uniform_i32(gl, program, "u_texture", 0);

            for item in &frame.items {
                let (Some(mesh), Some(material)) =
                    (self.meshes.get(&item.geometry), self.materials.get(&item.material))
                else {
                    continue;
                };

                set_uniform_mat4(gl, program, "u_model", &item.world);
                let normal = glam::Mat3::from_mat4(item.world).inverse().transpose();
                let loc = gl.get_uniform_location(program, "u_normal_matrix");
                gl.uniform_matrix_3_f32_slice(loc.as_ref(), false, &normal.to_cols_array());

                let c = material.base_color;
                let loc = gl.get_uniform_location(program, "u_base_color");
                gl.uniform_4_f32(loc.as_ref(), c[0], c[1], c[2], c[3]);

                if material.double_sided {
                    gl.disable(glow::CULL_FACE);
                } else {
                    gl.enable(glow::CULL_FACE);
                    gl.cull_face(glow::BACK);
                }

                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, material.texture);
                set_uniform_i32(gl, program, "u_has_texture", material.texture.is_some() as i32);

                gl.bind_vertex_array(Some(mesh.vao));
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
                gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
                gl.bind_vertex_array(None);
            }

            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.disable(glow::CULL_FACE);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }
}

fn set_lights(gl: &glow::Context, program: glow::Program, lights: &[Light]) {
    let mut ambient = glam::Vec3::ZERO;
    let mut directional = Vec::new();
    for light in lights {
        match *light {
            Light::Ambient { color, intensity } => ambient += glam::Vec3::from(color) * intensity,
            Light::Directional {
                color,
                intensity,
                position,
            } => {
                if directional.len() < MAX_DIRECTIONAL {
                    directional.push((
                        glam::Vec3::from(position).normalize_or_zero(),
                        glam::Vec3::from(color) * intensity,
                    ));
                }
            }
        }
    }

    set_uniform_vec3(gl, program, "u_ambient", &ambient);
    set_uniform_i32(gl, program, "u_light_count", directional.len() as i32);
    for (i, (dir, color)) in directional.iter().enumerate() {
        set_uniform_vec3(gl, program, &format!("u_light_dir[{i}]"), dir);
        set_uniform_vec3(gl, program, &format!("u_light_color[{i}]"), color);
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // uv: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

/// Byte length of a tightly packed RGBA8 image, `None` if it cannot be addressed
fn expected_rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

fn upload_texture(gl: &glow::Context, width: u32, height: u32, rgba: &[u8]) -> Result<glow::Texture, String> {
    if expected_rgba_len(width, height) != Some(rgba.len()) {
        return Err(format!("texture data does not match {width}x{height}"));
    }
    unsafe {
        let texture = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::SRGB8_ALPHA8 as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(rgba)),
        );
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;
        let mut shaders = Vec::with_capacity(2);

        for (kind, src) in [(glow::VERTEX_SHADER, vert_src), (glow::FRAGMENT_SHADER, frag_src)] {
            let shader = gl.create_shader(kind)?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                tracing::error!("Shader compile error: {log}");
                gl.delete_shader(shader);
                gl.delete_program(program);
                return Err(log);
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if !linked {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
            gl.delete_program(program);
            return Err(log);
        }

        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_i32(gl: &glow::Context, program: glow::Program, name: &str, v: i32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_i32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_view_proj;
uniform mat4 u_model;
uniform mat3 u_normal_matrix;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;

out vec3 v_normal;
out vec2 v_uv;

void main() {
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
    v_normal = u_normal_matrix * a_normal;
    v_uv = a_uv;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
#define MAX_LIGHTS 4
uniform vec3 u_ambient;
uniform int u_light_count;
uniform vec3 u_light_dir[MAX_LIGHTS];
uniform vec3 u_light_color[MAX_LIGHTS];
uniform vec4 u_base_color;
uniform int u_has_texture;
uniform sampler2D u_texture;

in vec3 v_normal;
in vec2 v_uv;

out vec4 frag_color;

void main() {
    vec4 albedo = u_base_color;
    if (u_has_texture != 0) {
        albedo *= texture(u_texture, v_uv);
    }
    vec3 n = normalize(v_normal);
    vec3 light = u_ambient;
    for (int i = 0; i < u_light_count; ++i) {
        light += u_light_color[i] * max(dot(n, u_light_dir[i]), 0.0);
    }
    frag_color = vec4(albedo.rgb * light, albedo.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_len_for_small_image() {
        assert_eq!(expected_rgba_len(2, 3), Some(24));
        assert_eq!(expected_rgba_len(0, 512), Some(0));
    }

    #[test]
    fn test_rgba_len_does_not_wrap_for_huge_dimensions() {
        // 32768 * 32768 * 4 wraps to zero in u32
        let len = expected_rgba_len(32_768, 32_768);
        if usize::BITS >= 64 {
            assert_eq!(len.map(|n| n as u64), Some(4 * 32_768 * 32_768_u64));
        } else {
            assert_eq!(len, None);
        }
        assert_ne!(len, Some(0));
    }
}
