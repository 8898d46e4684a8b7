//! 无窗口的 OpenGL 实现
//!
//! `HeadlessGl` 不访问任何 GPU，而是在内存中模拟 OpenGL 的对象表和绑定状态，
//! 并记录每一次调用。用于单元测试以及在没有显示设备的环境中验证资源的生命周期。
//!
//! # 模拟规则
//!
//! - 对象名称从 1 开始递增分配，永不复用；
//! - 源码中不含 `main` 的着色器编译失败，并给出诊断日志；
//! - `set_fail_link(true)` 之后所有链接都失败；
//! - `enable_vertex_attrib_array` / `vertex_attrib_pointer` 作用于当前绑定的顶点数组，
//!   指针会记住调用时绑定的顶点缓冲区。
//!
//! # 示例
//!
//! ```
//! use std::rc::Rc;
//! use engine_core::renderer::{GraphicsContext, HeadlessGl, VertexArray};
//!
//! let gl = Rc::new(HeadlessGl::new());
//! let ctx = GraphicsContext::new(gl.clone());
//!
//! let vao = VertexArray::new(&ctx);
//! assert_eq!(gl.live_vertex_arrays(), 1);
//! drop(vao);
//! assert_eq!(gl.live_vertex_arrays(), 0);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::core::error::ShaderStage;
use crate::renderer::context::{GlApi, NULL_HANDLE};
use crate::renderer::layout::{BufferUsage, ComponentType};

/// 一条被记录的 OpenGL 调用
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader { shader: u32, stage: ShaderStage },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    CreateBuffer(u32),
    BindArrayBuffer(u32),
    BufferData { buffer: u32, size: usize, usage: BufferUsage },
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(u32),
    EnableVertexAttribArray { vertex_array: u32, index: u32 },
    VertexAttribPointer { vertex_array: u32, pointer: AttribPointer },
    DeleteVertexArray(u32),
    Viewport { width: u32, height: u32 },
    Clear,
    DrawTriangles { first: u32, count: u32 },
}

/// 顶点数组中记录的一个属性指针
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    pub index: u32,
    pub component_count: u32,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
    /// 设置指针时绑定在 GL_ARRAY_BUFFER 上的缓冲区
    pub buffer: u32,
}

#[derive(Debug)]
struct ShaderObject {
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct VertexArrayObject {
    enabled: Vec<u32>,
    pointers: BTreeMap<u32, AttribPointer>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    buffers: HashMap<u32, Option<(usize, BufferUsage)>>,
    vertex_arrays: HashMap<u32, VertexArrayObject>,
    current_program: u32,
    array_buffer: u32,
    vertex_array: u32,
    fail_link: bool,
    calls: Vec<GlCall>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

/// 记录式的 OpenGL 实现
#[derive(Debug, Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让之后的所有链接失败
    pub fn set_fail_link(&self, fail: bool) {
        self.state.borrow_mut().fail_link = fail;
    }

    /// 到目前为止记录的全部调用
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn is_program_live(&self, program: u32) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn is_buffer_live(&self, buffer: u32) -> bool {
        self.state.borrow().buffers.contains_key(&buffer)
    }

    pub fn is_vertex_array_live(&self, vertex_array: u32) -> bool {
        self.state.borrow().vertex_arrays.contains_key(&vertex_array)
    }

    /// 当前使用中的着色器程序
    pub fn current_program(&self) -> u32 {
        self.state.borrow().current_program
    }

    pub fn bound_array_buffer(&self) -> u32 {
        self.state.borrow().array_buffer
    }

    pub fn bound_vertex_array(&self) -> u32 {
        self.state.borrow().vertex_array
    }

    /// 程序上仍附加着的着色器
    pub fn attached_shaders(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// 缓冲区上传的数据大小和使用提示
    pub fn buffer_data(&self, buffer: u32) -> Option<(usize, BufferUsage)> {
        self.state.borrow().buffers.get(&buffer).copied().flatten()
    }

    /// 某个顶点数组已启用的属性槽位
    pub fn enabled_attributes(&self, vertex_array: u32) -> Vec<u32> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .map(|v| v.enabled.clone())
            .unwrap_or_default()
    }

    pub fn attrib_pointer(&self, vertex_array: u32, index: u32) -> Option<AttribPointer> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|v| v.pointers.get(&index).copied())
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GlApi for HeadlessGl {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        let mut state = self.state.borrow_mut();
        let shader = state.allocate();
        state.shaders.insert(
            shader,
            ShaderObject { source: String::new(), compiled: false, info_log: String::new() },
        );
        state.calls.push(GlCall::CreateShader { shader, stage });
        shader
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader) {
            object.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.compiled = object.source.contains("main");
            object.info_log = if object.compiled {
                String::new()
            } else {
                "0:1(1): error: no function with name 'main'".to_string()
            };
        }
        state.calls.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if shader == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let program = state.allocate();
        state.programs.insert(program, ProgramObject::default());
        state.calls.push(GlCall::CreateProgram(program));
        program
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.push(shader);
        }
        state.calls.push(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.retain(|s| *s != shader);
        }
        state.calls.push(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let fail_link = state.fail_link;
        let all_compiled = state
            .programs
            .get(&program)
            .map(|p| p.attached.iter().all(|s| state.shaders.get(s).is_some_and(|s| s.compiled)))
            .unwrap_or(false);

        if let Some(object) = state.programs.get_mut(&program) {
            object.linked = all_compiled && !fail_link;
            object.info_log = if object.linked {
                String::new()
            } else {
                "error: linking with uncompiled/unmatched shader stages".to_string()
            };
        }
        state.calls.push(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.current_program = program;
        state.calls.push(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        if program == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = NULL_HANDLE;
        }
        state.calls.push(GlCall::DeleteProgram(program));
    }

    fn create_buffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let buffer = state.allocate();
        state.buffers.insert(buffer, None);
        state.calls.push(GlCall::CreateBuffer(buffer));
        buffer
    }

    fn bind_array_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.array_buffer = buffer;
        state.calls.push(GlCall::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[u8], usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        let buffer = state.array_buffer;
        if let Some(slot) = state.buffers.get_mut(&buffer) {
            *slot = Some((data.len(), usage));
        }
        state.calls.push(GlCall::BufferData { buffer, size: data.len(), usage });
    }

    fn delete_buffer(&self, buffer: u32) {
        if buffer == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.array_buffer == buffer {
            state.array_buffer = NULL_HANDLE;
        }
        state.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let vertex_array = state.allocate();
        state.vertex_arrays.insert(vertex_array, VertexArrayObject::default());
        state.calls.push(GlCall::CreateVertexArray(vertex_array));
        vertex_array
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_array = vertex_array;
        state.calls.push(GlCall::BindVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        let vertex_array = state.vertex_array;
        if let Some(object) = state.vertex_arrays.get_mut(&vertex_array) {
            if !object.enabled.contains(&index) {
                object.enabled.push(index);
            }
        }
        state.calls.push(GlCall::EnableVertexAttribArray { vertex_array, index });
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
        let mut state = self.state.borrow_mut();
        let vertex_array = state.vertex_array;
        let pointer = AttribPointer {
            index,
            component_count,
            component_type,
            normalized,
            stride,
            offset,
            buffer: state.array_buffer,
        };
        if let Some(object) = state.vertex_arrays.get_mut(&vertex_array) {
            object.pointers.insert(index, pointer);
        }
        state.calls.push(GlCall::VertexAttribPointer { vertex_array, pointer });
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        if vertex_array == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        if state.vertex_array == vertex_array {
            state.vertex_array = NULL_HANDLE;
        }
        state.calls.push(GlCall::DeleteVertexArray(vertex_array));
    }

    fn viewport(&self, width: u32, height: u32) {
        self.record(GlCall::Viewport { width, height });
    }

    fn clear(&self, _color: [f32; 4]) {
        self.record(GlCall::Clear);
    }

    fn draw_triangles(&self, first: u32, count: u32) {
        self.record(GlCall::DrawTriangles { first, count });
    }
}
