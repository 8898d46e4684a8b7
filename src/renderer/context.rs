//! 图形上下文
//!
//! 所有 GPU 资源封装都通过 `GraphicsContext` 与底层 OpenGL 交互，
//! 而不是调用全局函数指针。这样：
//!
//! - "图形子系统是否已初始化"由上下文句柄是否存在来表达，没有隐藏的全局开关；
//! - 测试可以构造互相独立的上下文（见 `renderer::headless`）；
//! - 上下文内部是 `Rc`，因此 `GraphicsContext` 以及持有它的资源都是 `!Send`，
//!   编译器保证它们不会离开创建上下文的线程。
//!
//! # 句柄约定
//!
//! 对象句柄是 OpenGL 的原始名称（`u32`），`0` 表示空句柄。
//! 删除 `0` 句柄按 OpenGL 约定是无操作。

use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::core::error::ShaderStage;
use crate::renderer::layout::{BufferUsage, ComponentType};

/// 空句柄
pub const NULL_HANDLE: u32 = 0;

/// 渲染器使用到的 OpenGL 功能子集
///
/// 方法与 OpenGL 调用一一对应。对象创建失败时返回 `NULL_HANDLE`；
/// 所有删除方法对 `NULL_HANDLE` 必须是无操作。
pub trait GlApi {
    // 着色器
    fn create_shader(&self, stage: ShaderStage) -> u32;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    // 着色器程序
    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);

    // 顶点缓冲区（GL_ARRAY_BUFFER 绑定点）
    fn create_buffer(&self) -> u32;
    fn bind_array_buffer(&self, buffer: u32);
    fn array_buffer_data(&self, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: u32);

    // 顶点数组对象
    fn create_vertex_array(&self) -> u32;
    fn bind_vertex_array(&self, vertex_array: u32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        component_count: u32,
        component_type: ComponentType,
        normalized: bool,
        stride: u32,
        offset: u32,
    );
    fn delete_vertex_array(&self, vertex_array: u32);

    // 帧操作，供外部的渲染步骤使用
    fn viewport(&self, width: u32, height: u32);
    fn clear(&self, color: [f32; 4]);
    fn draw_triangles(&self, first: u32, count: u32);
}

/// 图形上下文句柄
///
/// 可以廉价克隆；每个 GPU 资源持有一份，以便在 `Drop` 时释放自身。
#[derive(Clone)]
pub struct GraphicsContext {
    api: Rc<dyn GlApi>,
}

impl GraphicsContext {
    /// 用一个已就绪的 OpenGL 实现创建上下文
    ///
    /// 调用方保证该实现对应的 OpenGL 上下文在当前线程上是 current 的。
    pub fn new<A: GlApi + 'static>(api: Rc<A>) -> Self {
        info!("Graphics context initialized");
        Self { api }
    }

    /// 访问底层 OpenGL 接口
    pub fn gl(&self) -> &dyn GlApi {
        self.api.as_ref()
    }

    /// 设置视口
    pub fn set_viewport(&self, width: u32, height: u32) {
        self.api.viewport(width, height);
    }

    /// 用指定颜色清空颜色缓冲
    pub fn clear(&self, color: [f32; 4]) {
        self.api.clear(color);
    }

    /// 以三角形列表方式绘制当前绑定的顶点数组
    pub fn draw_triangles(&self, first: u32, count: u32) {
        self.api.draw_triangles(first, count);
    }
}

impl fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsContext").finish_non_exhaustive()
    }
}
