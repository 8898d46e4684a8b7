//! 顶点数组对象
//!
//! `VertexArray` 独占一个 OpenGL VAO，并记录已经配置过的属性槽位数。
//! 槽位编号对整个 VAO 全局有效：多次调用 `add_buffer` 会在已有槽位之后继续追加，
//! 每个缓冲区的属性使用各自的跨度和偏移。

use std::fmt;

use tracing::{debug, warn};

use crate::renderer::context::{GraphicsContext, NULL_HANDLE};
use crate::renderer::layout::ComponentType;
use crate::renderer::vertex_buffer::VertexBuffer;

/// 已配置到某个槽位上的顶点属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// 属性槽位
    pub index: u32,
    pub component_count: u32,
    pub component_type: ComponentType,
    /// 所属缓冲区的顶点跨度
    pub stride: u32,
    /// 在顶点中的字节偏移
    pub offset: u32,
    /// 数据来源的缓冲区句柄
    pub buffer: u32,
}

pub struct VertexArray {
    ctx: GraphicsContext,
    id: u32,
    attributes: Vec<VertexAttribute>,
}

impl VertexArray {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let id = ctx.gl().create_vertex_array();
        debug!(id, "Vertex array created");

        Self {
            ctx: ctx.clone(),
            id,
            attributes: Vec::new(),
        }
    }

    /// 添加顶点缓冲区并按其布局配置属性
    ///
    /// 绑定本 VAO 和给定缓冲区，然后按声明顺序为布局中的每个元素
    /// 启用下一个空闲槽位，并用元素的分量数、分量类型、缓冲区跨度和元素偏移描述它。
    /// 只能追加，不能移除或重新绑定。
    ///
    /// 零宽度（未知类型）元素同样占用一个槽位，但不会设置属性指针。
    pub fn add_buffer(&mut self, vertex_buffer: &VertexBuffer) {
        self.bind();
        vertex_buffer.bind();

        let gl = self.ctx.gl();
        let layout = vertex_buffer.layout();
        let stride = layout.stride() as u32;

        for element in layout {
            let index = self.attributes.len() as u32;
            gl.enable_vertex_attrib_array(index);

            if element.is_zero_width() {
                warn!(index, "Skipping attribute pointer for zero-width element");
            } else {
                gl.vertex_attrib_pointer(
                    index,
                    element.component_count as u32,
                    element.component_type,
                    false,
                    stride,
                    element.offset as u32,
                );
            }

            self.attributes.push(VertexAttribute {
                index,
                component_count: element.component_count as u32,
                component_type: element.component_type,
                stride,
                offset: element.offset as u32,
                buffer: vertex_buffer.id(),
            });
        }

        debug!(
            id = self.id,
            buffer = vertex_buffer.id(),
            attributes = self.attributes.len(),
            "Vertex buffer added to vertex array"
        );
    }

    pub fn bind(&self) {
        self.ctx.gl().bind_vertex_array(self.id);
    }

    pub fn unbind(ctx: &GraphicsContext) {
        ctx.gl().bind_vertex_array(NULL_HANDLE);
    }

    /// 已配置的属性槽位数
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// 按槽位顺序排列的属性描述
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.id == NULL_HANDLE
    }

    /// 转移所有权，原实例留下空句柄和零个属性
    pub fn take(&mut self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            id: std::mem::replace(&mut self.id, NULL_HANDLE),
            attributes: std::mem::take(&mut self.attributes),
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.ctx.gl().delete_vertex_array(self.id);
    }
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexArray")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessGl;
    use crate::renderer::layout::{BufferLayout, BufferUsage, ShaderDataType};
    use std::rc::Rc;

    fn context() -> (Rc<HeadlessGl>, GraphicsContext) {
        let gl = Rc::new(HeadlessGl::new());
        let ctx = GraphicsContext::new(gl.clone());
        (gl, ctx)
    }

    fn buffer(ctx: &GraphicsContext, types: &[ShaderDataType], vertices: usize) -> VertexBuffer {
        let layout = BufferLayout::new(types.iter().copied());
        let data = vec![0u8; layout.stride() * vertices];
        VertexBuffer::new(ctx, &data, layout, BufferUsage::Static)
    }

    #[test]
    fn test_add_buffer_configures_each_element() {
        let (gl, ctx) = context();
        let vbo = buffer(&ctx, &[ShaderDataType::Float3, ShaderDataType::Float3], 3);
        let mut vao = VertexArray::new(&ctx);

        vao.add_buffer(&vbo);

        assert_eq!(vao.attribute_count(), 2);
        assert_eq!(gl.bound_vertex_array(), vao.id());
        assert_eq!(gl.enabled_attributes(vao.id()), vec![0, 1]);

        let color = gl.attrib_pointer(vao.id(), 1).unwrap();
        assert_eq!(color.component_count, 3);
        assert_eq!(color.component_type, ComponentType::Float);
        assert!(!color.normalized);
        assert_eq!(color.stride, 24);
        assert_eq!(color.offset, 12);
        assert_eq!(color.buffer, vbo.id());
    }

    #[test]
    fn test_slots_accumulate_across_buffers() {
        let (gl, ctx) = context();
        let positions = buffer(&ctx, &[ShaderDataType::Float3], 4);
        let uvs = buffer(&ctx, &[ShaderDataType::Float2], 4);
        let mut vao = VertexArray::new(&ctx);

        vao.add_buffer(&positions);
        vao.add_buffer(&uvs);

        assert_eq!(vao.attribute_count(), 2);
        assert_eq!(gl.enabled_attributes(vao.id()), vec![0, 1]);

        let first = gl.attrib_pointer(vao.id(), 0).unwrap();
        assert_eq!((first.component_count, first.stride, first.offset), (3, 12, 0));
        assert_eq!(first.buffer, positions.id());

        let second = gl.attrib_pointer(vao.id(), 1).unwrap();
        assert_eq!((second.component_count, second.stride, second.offset), (2, 8, 0));
        assert_eq!(second.buffer, uvs.id());
    }

    #[test]
    fn test_three_slots_from_two_buffers() {
        let (gl, ctx) = context();
        let first = buffer(&ctx, &[ShaderDataType::Float3, ShaderDataType::Float4], 2);
        let second = buffer(&ctx, &[ShaderDataType::Float2], 2);
        let mut vao = VertexArray::new(&ctx);

        vao.add_buffer(&first);
        vao.add_buffer(&second);

        let indices: Vec<u32> = vao.attributes().iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let slot2 = gl.attrib_pointer(vao.id(), 2).unwrap();
        assert_eq!(slot2.component_count, 2);
        assert_eq!(slot2.stride, 8);
        assert_eq!(slot2.offset, 0);
        assert_eq!(slot2.buffer, second.id());

        // 第一个缓冲区的属性保持原样
        let slot1 = gl.attrib_pointer(vao.id(), 1).unwrap();
        assert_eq!((slot1.stride, slot1.offset), (28, 12));
    }

    #[test]
    fn test_zero_width_element_consumes_slot_without_pointer() {
        let (gl, ctx) = context();
        let layout = BufferLayout::from_names(["float3", "bogus", "float2"]);
        let vbo = VertexBuffer::new(&ctx, &[0u8; 40], layout, BufferUsage::Static);
        let mut vao = VertexArray::new(&ctx);

        vao.add_buffer(&vbo);

        assert_eq!(vao.attribute_count(), 3);
        assert!(gl.attrib_pointer(vao.id(), 1).is_none());
        let last = gl.attrib_pointer(vao.id(), 2).unwrap();
        assert_eq!((last.component_count, last.offset, last.stride), (2, 12, 20));
    }

    #[test]
    fn test_take_empties_source() {
        let (gl, ctx) = context();
        let vbo = buffer(&ctx, &[ShaderDataType::Float3], 1);
        let mut source = VertexArray::new(&ctx);
        source.add_buffer(&vbo);
        let id = source.id();

        let moved = source.take();
        assert!(source.is_empty());
        assert_eq!(source.attribute_count(), 0);
        assert_eq!(moved.id(), id);
        assert_eq!(moved.attribute_count(), 1);

        drop(source);
        assert!(gl.is_vertex_array_live(id));

        moved.bind();
        assert_eq!(gl.bound_vertex_array(), id);
        VertexArray::unbind(&ctx);
        assert_eq!(gl.bound_vertex_array(), NULL_HANDLE);

        drop(moved);
        assert!(!gl.is_vertex_array_live(id));
    }

    #[test]
    fn test_drop_releases_vertex_array() {
        let (gl, ctx) = context();
        {
            let _a = VertexArray::new(&ctx);
            let _b = VertexArray::new(&ctx);
            assert_eq!(gl.live_vertex_arrays(), 2);
        }
        assert_eq!(gl.live_vertex_arrays(), 0);
    }
}
