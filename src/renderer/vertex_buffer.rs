//! 顶点缓冲区
//!
//! `VertexBuffer` 独占一个 OpenGL 缓冲区对象，并按值持有描述其内容的 `BufferLayout`。
//!
//! # 所有权
//!
//! - 不实现 `Clone`：同一时刻只有一个实例拥有某个缓冲区句柄；
//! - `take()` 把句柄和布局转移到新实例，原实例变为空（句柄 0）；
//! - `Drop` 时无条件删除句柄（删除 0 是无操作）。

use std::fmt;

use bytemuck::Pod;
use tracing::debug;

use crate::renderer::context::{GraphicsContext, NULL_HANDLE};
use crate::renderer::layout::{BufferLayout, BufferUsage};

pub struct VertexBuffer {
    ctx: GraphicsContext,
    id: u32,
    layout: BufferLayout,
    usage: BufferUsage,
    size: usize,
}

impl VertexBuffer {
    /// 创建缓冲区并上传原始字节
    ///
    /// 缓冲区会保持绑定在 GL_ARRAY_BUFFER 上。
    ///
    /// # 参数
    ///
    /// * `ctx` - 图形上下文
    /// * `data` - 顶点数据，长度即上传的字节数
    /// * `layout` - 单个顶点的属性布局
    /// * `usage` - 使用提示，只影响 OpenGL 的存储策略
    pub fn new(
        ctx: &GraphicsContext,
        data: &[u8],
        layout: BufferLayout,
        usage: BufferUsage,
    ) -> Self {
        let gl = ctx.gl();
        let id = gl.create_buffer();
        gl.bind_array_buffer(id);
        gl.array_buffer_data(data, usage);

        debug!(id, size = data.len(), stride = layout.stride(), ?usage, "Vertex buffer created");

        Self {
            ctx: ctx.clone(),
            id,
            layout,
            usage,
            size: data.len(),
        }
    }

    /// 从 POD 顶点切片创建
    ///
    /// # 示例
    ///
    /// ```
    /// use std::rc::Rc;
    /// use engine_core::renderer::{
    ///     BufferUsage, ColorVertex, GraphicsContext, HeadlessGl, VertexBuffer,
    /// };
    ///
    /// let ctx = GraphicsContext::new(Rc::new(HeadlessGl::new()));
    /// let vertices = [ColorVertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0])];
    /// let layout = ColorVertex::layout();
    /// let buffer = VertexBuffer::from_vertices(&ctx, &vertices, layout, BufferUsage::Static);
    /// assert_eq!(buffer.size(), 24);
    /// ```
    pub fn from_vertices<T: Pod>(
        ctx: &GraphicsContext,
        vertices: &[T],
        layout: BufferLayout,
        usage: BufferUsage,
    ) -> Self {
        Self::new(ctx, bytemuck::cast_slice(vertices), layout, usage)
    }

    /// 绑定到 GL_ARRAY_BUFFER
    pub fn bind(&self) {
        self.ctx.gl().bind_array_buffer(self.id);
    }

    /// 解除 GL_ARRAY_BUFFER 上的绑定
    pub fn unbind(ctx: &GraphicsContext) {
        ctx.gl().bind_array_buffer(NULL_HANDLE);
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// 上传的字节数
    pub fn size(&self) -> usize {
        self.size
    }

    /// 缓冲区中完整顶点的个数
    pub fn vertex_count(&self) -> usize {
        match self.layout.stride() {
            0 => 0,
            stride => self.size / stride,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// 是否已处于空（已转移）状态
    pub fn is_empty(&self) -> bool {
        self.id == NULL_HANDLE
    }

    /// 转移所有权，原实例留下空句柄
    pub fn take(&mut self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            id: std::mem::replace(&mut self.id, NULL_HANDLE),
            layout: std::mem::take(&mut self.layout),
            usage: self.usage,
            size: std::mem::take(&mut self.size),
        }
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.ctx.gl().delete_buffer(self.id);
    }
}

impl fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("usage", &self.usage)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{GlCall, HeadlessGl};
    use crate::renderer::layout::ShaderDataType;
    use std::rc::Rc;

    fn context() -> (Rc<HeadlessGl>, GraphicsContext) {
        let gl = Rc::new(HeadlessGl::new());
        let ctx = GraphicsContext::new(gl.clone());
        (gl, ctx)
    }

    /// 无布局的静态缓冲区，内容全为 0
    fn zeroed(ctx: &GraphicsContext, size: usize) -> VertexBuffer {
        VertexBuffer::new(ctx, &vec![0u8; size], BufferLayout::default(), BufferUsage::Static)
    }

    #[test]
    fn test_upload_records_size_and_usage() {
        let (gl, ctx) = context();
        let data = [0u8; 36];
        let layout = BufferLayout::new([ShaderDataType::Float3]);

        let buffer = VertexBuffer::new(&ctx, &data, layout, BufferUsage::Dynamic);

        assert_ne!(buffer.id(), NULL_HANDLE);
        assert_eq!(gl.buffer_data(buffer.id()), Some((36, BufferUsage::Dynamic)));
        assert_eq!(gl.bound_array_buffer(), buffer.id());
        assert_eq!(buffer.vertex_count(), 3);
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::CreateBuffer(buffer.id()),
                GlCall::BindArrayBuffer(buffer.id()),
                GlCall::BufferData { buffer: buffer.id(), size: 36, usage: BufferUsage::Dynamic },
            ]
        );
    }

    #[test]
    fn test_from_vertices_casts_pod_slice() {
        let (gl, ctx) = context();
        let data: [f32; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let layout = BufferLayout::new([ShaderDataType::Float2]);

        let buffer = VertexBuffer::from_vertices(&ctx, &data, layout, BufferUsage::Static);
        assert_eq!(buffer.size(), 24);
        assert_eq!(buffer.vertex_count(), 3);
        assert_eq!(gl.buffer_data(buffer.id()), Some((24, BufferUsage::Static)));
    }

    #[test]
    fn test_drop_releases_buffer() {
        let (gl, ctx) = context();
        let buffer = zeroed(&ctx, 4);
        let id = buffer.id();
        assert!(gl.is_buffer_live(id));

        drop(buffer);
        assert!(!gl.is_buffer_live(id));
        assert_eq!(gl.live_buffers(), 0);
    }

    #[test]
    fn test_take_empties_source() {
        let (gl, ctx) = context();
        let layout = BufferLayout::new([ShaderDataType::Float3, ShaderDataType::Float4]);
        let mut source = VertexBuffer::new(&ctx, &[0u8; 56], layout.clone(), BufferUsage::Stream);
        let id = source.id();

        let moved = source.take();
        assert!(source.is_empty());
        assert_eq!(source.id(), NULL_HANDLE);
        assert!(source.layout().is_empty());

        assert_eq!(moved.id(), id);
        assert_eq!(moved.layout(), &layout);
        assert_eq!(moved.usage(), BufferUsage::Stream);
        assert_eq!(moved.size(), 56);

        // 空实例析构不会删除任何东西
        drop(source);
        assert!(gl.is_buffer_live(id));

        moved.bind();
        assert_eq!(gl.bound_array_buffer(), id);

        drop(moved);
        assert!(!gl.is_buffer_live(id));
    }

    #[test]
    fn test_assignment_releases_previous_buffer() {
        let (gl, ctx) = context();
        let mut target = zeroed(&ctx, 4);
        let old_id = target.id();

        target = zeroed(&ctx, 8);
        assert!(!gl.is_buffer_live(old_id));
        assert!(gl.is_buffer_live(target.id()));
        assert_eq!(gl.live_buffers(), 1);
    }

    #[test]
    fn test_unbind() {
        let (gl, ctx) = context();
        let _buffer = zeroed(&ctx, 4);
        VertexBuffer::unbind(&ctx);
        assert_eq!(gl.bound_array_buffer(), NULL_HANDLE);
    }
}
