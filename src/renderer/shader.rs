//! 着色器程序
//!
//! `ShaderProgram` 独占一个已编译并链接的 OpenGL 程序对象。
//!
//! # 构造流程
//!
//! ```text
//! 顶点阶段编译 ──失败──> 记录日志，删除顶点阶段，返回未编译实例
//!      │
//! 片段阶段编译 ──失败──> 记录日志，删除两个阶段，返回未编译实例
//!      │
//! 创建程序、附加、链接 ──失败──> 记录日志，删除程序和两个阶段，返回未编译实例
//!      │
//! 分离并删除两个阶段，只保留程序句柄
//! ```
//!
//! 任何失败都不会泄漏中间对象，也不会向调用方传播错误（`new`）。
//! 调用方在使用前应检查 `is_compiled()`。希望用 `?` 处理失败的调用方可以使用 `try_new`。

use std::fmt;

use tracing::{debug, error};

use crate::core::error::{GraphicsError, ShaderStage};
use crate::renderer::context::{GlApi, GraphicsContext, NULL_HANDLE};

pub struct ShaderProgram {
    ctx: GraphicsContext,
    id: u32,
    compiled: bool,
}

/// 编译单个阶段，失败时删除该阶段对象并返回诊断日志
fn compile_stage(gl: &dyn GlApi, stage: ShaderStage, source: &str) -> Result<u32, GraphicsError> {
    let shader = gl.create_shader(stage);
    if shader == NULL_HANDLE {
        return Err(GraphicsError::ResourceCreation(format!(
            "glCreateShader returned 0 for the {} stage",
            stage.name()
        )));
    }

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.shader_compile_status(shader) {
        Ok(shader)
    } else {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        Err(GraphicsError::ShaderCompilation { stage, log })
    }
}

/// 链接程序；成功时阶段对象已被分离，失败时程序对象已被删除
fn link_program(gl: &dyn GlApi, vertex: u32, fragment: u32) -> Result<u32, GraphicsError> {
    let program = gl.create_program();
    if program == NULL_HANDLE {
        return Err(GraphicsError::ResourceCreation(
            "glCreateProgram returned 0".to_string(),
        ));
    }

    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    if !gl.program_link_status(program) {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        return Err(GraphicsError::ProgramLink(log));
    }

    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);
    Ok(program)
}

impl ShaderProgram {
    /// 编译并链接着色器程序
    ///
    /// 失败时记录诊断日志并返回未编译的实例（句柄 0）。
    pub fn new(ctx: &GraphicsContext, vertex_source: &str, fragment_source: &str) -> Self {
        Self::try_new(ctx, vertex_source, fragment_source).unwrap_or_else(|err| {
            error!("{}", err);
            Self::empty(ctx)
        })
    }

    /// 编译并链接着色器程序，失败时返回错误
    ///
    /// # 示例
    ///
    /// ```
    /// use std::rc::Rc;
    /// use engine_core::renderer::{GraphicsContext, HeadlessGl, ShaderProgram, shaders};
    ///
    /// let ctx = GraphicsContext::new(Rc::new(HeadlessGl::new()));
    /// let program =
    ///     ShaderProgram::try_new(&ctx, shaders::VERTEX_SHADER, shaders::FRAGMENT_SHADER)?;
    /// assert!(program.is_compiled());
    /// # Ok::<(), engine_core::core::error::GraphicsError>(())
    /// ```
    pub fn try_new(
        ctx: &GraphicsContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, GraphicsError> {
        let gl = ctx.gl();

        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_source)?;

        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let linked = link_program(gl, vertex, fragment);

        // 无论链接成功与否，阶段对象都不再需要
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        let id = linked?;
        debug!(id, "Shader program linked");

        Ok(Self {
            ctx: ctx.clone(),
            id,
            compiled: true,
        })
    }

    fn empty(ctx: &GraphicsContext) -> Self {
        Self {
            ctx: ctx.clone(),
            id: NULL_HANDLE,
            compiled: false,
        }
    }

    /// 设为当前使用的程序
    pub fn bind(&self) {
        self.ctx.gl().use_program(self.id);
    }

    /// 取消当前程序
    pub fn unbind(ctx: &GraphicsContext) {
        ctx.gl().use_program(NULL_HANDLE);
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// 转移所有权，原实例变为空（句柄 0，未编译）
    pub fn take(&mut self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            id: std::mem::replace(&mut self.id, NULL_HANDLE),
            compiled: std::mem::replace(&mut self.compiled, false),
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.ctx.gl().delete_program(self.id);
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("compiled", &self.compiled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{GlCall, HeadlessGl};
    use crate::renderer::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};
    use std::rc::Rc;

    const BROKEN_SOURCE: &str = "#version 330 core\nvoid mian() {}\n";

    fn context() -> (Rc<HeadlessGl>, GraphicsContext) {
        let gl = Rc::new(HeadlessGl::new());
        let ctx = GraphicsContext::new(gl.clone());
        (gl, ctx)
    }

    #[test]
    fn test_successful_build_keeps_only_program() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);

        assert!(program.is_compiled());
        assert_ne!(program.id(), NULL_HANDLE);
        assert_eq!(gl.live_programs(), 1);
        assert_eq!(gl.live_shaders(), 0);
        assert!(gl.attached_shaders(program.id()).is_empty());
    }

    #[test]
    fn test_stages_attached_before_link_and_detached_after() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);
        let id = program.id();

        let calls = gl.calls();
        let position = |call: &GlCall| calls.iter().position(|c| c == call).unwrap();

        let link = position(&GlCall::LinkProgram(id));
        let attaches: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GlCall::AttachShader { program, .. } if *program == id))
            .map(|(i, _)| i)
            .collect();
        let detaches: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GlCall::DetachShader { program, .. } if *program == id))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(attaches.len(), 2);
        assert_eq!(detaches.len(), 2);
        assert!(attaches.iter().all(|i| *i < link));
        assert!(detaches.iter().all(|i| *i > link));
    }

    #[test]
    fn test_invalid_vertex_stage_leaves_uncompiled() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, BROKEN_SOURCE, FRAGMENT_SHADER);

        assert!(!program.is_compiled());
        assert_eq!(program.id(), NULL_HANDLE);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
        // 顶点阶段失败后不再编译片段阶段
        assert!(!gl.calls().iter().any(|c| matches!(
            c,
            GlCall::CreateShader { stage: ShaderStage::Fragment, .. }
        )));
    }

    #[test]
    fn test_invalid_fragment_stage_releases_vertex_stage() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, VERTEX_SHADER, BROKEN_SOURCE);

        assert!(!program.is_compiled());
        assert_eq!(program.id(), NULL_HANDLE);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn test_link_failure_releases_everything() {
        let (gl, ctx) = context();
        gl.set_fail_link(true);

        let program = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);

        assert!(!program.is_compiled());
        assert_eq!(program.id(), NULL_HANDLE);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn test_try_new_reports_stage_and_log() {
        let (_gl, ctx) = context();
        let err = ShaderProgram::try_new(&ctx, VERTEX_SHADER, BROKEN_SOURCE).unwrap_err();
        match err {
            GraphicsError::ShaderCompilation { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_try_new_reports_link_failure() {
        let (gl, ctx) = context();
        gl.set_fail_link(true);
        let err = ShaderProgram::try_new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER).unwrap_err();
        assert!(matches!(err, GraphicsError::ProgramLink(_)));
    }

    #[test]
    fn test_bind_and_unbind() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);

        program.bind();
        assert_eq!(gl.current_program(), program.id());

        ShaderProgram::unbind(&ctx);
        assert_eq!(gl.current_program(), NULL_HANDLE);
    }

    #[test]
    fn test_take_empties_source() {
        let (gl, ctx) = context();
        let mut source = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);
        let id = source.id();

        let moved = source.take();
        assert_eq!(source.id(), NULL_HANDLE);
        assert!(!source.is_compiled());
        assert_eq!(moved.id(), id);
        assert!(moved.is_compiled());

        drop(source);
        assert!(gl.is_program_live(id));

        moved.bind();
        assert_eq!(gl.current_program(), id);

        drop(moved);
        assert!(!gl.is_program_live(id));
    }

    #[test]
    fn test_assignment_releases_previous_program() {
        let (gl, ctx) = context();
        let mut target = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);
        let old_id = target.id();
        let mut source = ShaderProgram::new(&ctx, VERTEX_SHADER, FRAGMENT_SHADER);
        let new_id = source.id();

        target = source.take();

        assert!(!gl.is_program_live(old_id));
        assert_eq!(target.id(), new_id);
        assert_eq!(source.id(), NULL_HANDLE);
        assert_eq!(gl.live_programs(), 1);
    }

    #[test]
    fn test_dropping_uncompiled_program_is_noop() {
        let (gl, ctx) = context();
        let program = ShaderProgram::new(&ctx, BROKEN_SOURCE, BROKEN_SOURCE);
        gl.clear_calls();

        drop(program);
        assert!(gl.calls().is_empty());
    }
}
