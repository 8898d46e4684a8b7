//! 基于 glow 的 OpenGL 实现
//!
//! 为 `glow::Context` 实现 `GlApi`。glow 用 `NonZeroU32` 包装对象名称，
//! 这里在两种表示之间转换：原始名称 `0` 对应 `None`。
//!
//! # Safety
//!
//! glow 的所有调用都是 `unsafe`，前提是对应的 OpenGL 上下文在当前线程上是 current 的。
//! `GraphicsContext::new` 的调用方负责保证这一点（见 `platform::window`），
//! 而 `GraphicsContext` 是 `!Send`，因此之后的调用都发生在同一线程上。

use std::num::NonZeroU32;

use glow::HasContext;
use tracing::error;

use crate::core::error::ShaderStage;
use crate::renderer::context::{GlApi, NULL_HANDLE};
use crate::renderer::layout::{BufferUsage, ComponentType};

fn native<T>(name: u32, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(name).map(wrap)
}

/// 对象创建失败时记录错误并返回空句柄
fn created(result: Result<NonZeroU32, String>, what: &str) -> u32 {
    match result {
        Ok(name) => name.get(),
        Err(err) => {
            error!(object = what, "Failed to create OpenGL object: {}", err);
            NULL_HANDLE
        }
    }
}

impl ShaderStage {
    /// 对应的 OpenGL 着色器类型
    pub const fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl GlApi for glow::Context {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        // SAFETY: 上下文在当前线程上是 current 的
        let result = unsafe { HasContext::create_shader(self, stage.gl_enum()) };
        created(result.map(|s| s.0), "shader")
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { HasContext::shader_source(self, shader, source) }
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { HasContext::compile_shader(self, shader) }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        native(shader, glow::NativeShader)
            .is_some_and(|shader| unsafe { self.get_shader_compile_status(shader) })
    }

    fn shader_info_log(&self, shader: u32) -> String {
        native(shader, glow::NativeShader)
            .map(|shader| unsafe { self.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { HasContext::delete_shader(self, shader) }
        }
    }

    fn create_program(&self) -> u32 {
        let result = unsafe { HasContext::create_program(self) };
        created(result.map(|p| p.0), "program")
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            native(program, glow::NativeProgram),
            native(shader, glow::NativeShader),
        ) {
            unsafe { HasContext::attach_shader(self, program, shader) }
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            native(program, glow::NativeProgram),
            native(shader, glow::NativeShader),
        ) {
            unsafe { HasContext::detach_shader(self, program, shader) }
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { HasContext::link_program(self, program) }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        native(program, glow::NativeProgram)
            .is_some_and(|program| unsafe { self.get_program_link_status(program) })
    }

    fn program_info_log(&self, program: u32) -> String {
        native(program, glow::NativeProgram)
            .map(|program| unsafe { self.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        unsafe { HasContext::use_program(self, native(program, glow::NativeProgram)) }
    }

    fn delete_program(&self, program: u32) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { HasContext::delete_program(self, program) }
        }
    }

    fn create_buffer(&self) -> u32 {
        let result = unsafe { HasContext::create_buffer(self) };
        created(result.map(|b| b.0), "buffer")
    }

    fn bind_array_buffer(&self, buffer: u32) {
        unsafe { self.bind_buffer(glow::ARRAY_BUFFER, native(buffer, glow::NativeBuffer)) }
    }

    fn array_buffer_data(&self, data: &[u8], usage: BufferUsage) {
        unsafe { self.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, usage.gl_enum()) }
    }

    fn delete_buffer(&self, buffer: u32) {
        if let Some(buffer) = native(buffer, glow::NativeBuffer) {
            unsafe { HasContext::delete_buffer(self, buffer) }
        }
    }

    fn create_vertex_array(&self) -> u32 {
        let result = unsafe { HasContext::create_vertex_array(self) };
        created(result.map(|v| v.0), "vertex array")
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe {
            HasContext::bind_vertex_array(self, native(vertex_array, glow::NativeVertexArray))
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        component_count: u32,
        component_type: ComponentType,
        normalized: bool,
        stride: u32,
        offset: u32,
    ) {
        // 整数分量也走 glVertexAttribPointer，
        // 着色器读到的是转换后的浮点值
        unsafe {
            self.vertex_attrib_pointer_f32(
                index,
                component_count as i32,
                component_type.gl_enum(),
                normalized,
                stride as i32,
                offset as i32,
            )
        }
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        if let Some(vertex_array) = native(vertex_array, glow::NativeVertexArray) {
            unsafe { HasContext::delete_vertex_array(self, vertex_array) }
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { HasContext::viewport(self, 0, 0, width as i32, height as i32) }
    }

    fn clear(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            self.clear_color(r, g, b, a);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw_triangles(&self, first: u32, count: u32) {
        unsafe { self.draw_arrays(glow::TRIANGLES, first as i32, count as i32) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_name_has_no_native_object() {
        assert!(native(NULL_HANDLE, glow::NativeBuffer).is_none());
        assert_eq!(native(7, glow::NativeBuffer).map(|b| b.0.get()), Some(7));
    }

    #[test]
    fn test_failed_creation_yields_null_handle() {
        assert_eq!(created(Err("out of memory".to_string()), "buffer"), NULL_HANDLE);
        assert_eq!(created(Ok(NonZeroU32::MIN), "buffer"), 1);
    }

    #[test]
    fn test_stage_enums() {
        assert_eq!(ShaderStage::Vertex.gl_enum(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_enum(), glow::FRAGMENT_SHADER);
    }
}
