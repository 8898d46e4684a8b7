//! 顶点布局
//!
//! 描述一个顶点在内存中的属性排布。纯数据与偏移量计算，不涉及 GPU 资源。
//!
//! # 示例
//!
//! ```
//! use engine_core::renderer::layout::{BufferLayout, ShaderDataType};
//!
//! // 位置 + 颜色
//! let layout = BufferLayout::new([ShaderDataType::Float3, ShaderDataType::Float3]);
//! assert_eq!(layout.stride(), 24);
//! assert_eq!(layout.elements()[1].offset, 12);
//! ```

use tracing::error;

/// 顶点属性的数据类型
///
/// 不是 OpenGL 类型本身，而是计算分量数、分量类型和字节大小的依据。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    /// float
    Float,
    /// vec2
    Float2,
    /// vec3
    Float3,
    /// vec4
    Float4,
    /// int
    Int,
    /// ivec2
    Int2,
    /// ivec3
    Int3,
    /// ivec4
    Int4,
}

/// 分量的标量类型，两种都是 4 字节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float,
    Int,
}

impl ComponentType {
    /// 单个分量的字节大小
    pub const fn size(self) -> usize {
        4
    }

    /// 对应的 OpenGL 类型枚举（GL_FLOAT / GL_INT）
    pub const fn gl_enum(self) -> u32 {
        match self {
            ComponentType::Float => glow::FLOAT,
            ComponentType::Int => glow::INT,
        }
    }
}

impl ShaderDataType {
    /// 分量个数（1/2/3/4）
    pub const fn component_count(self) -> usize {
        match self {
            ShaderDataType::Float | ShaderDataType::Int => 1,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 3,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 4,
        }
    }

    pub const fn component_type(self) -> ComponentType {
        match self {
            ShaderDataType::Float
            | ShaderDataType::Float2
            | ShaderDataType::Float3
            | ShaderDataType::Float4 => ComponentType::Float,
            ShaderDataType::Int
            | ShaderDataType::Int2
            | ShaderDataType::Int3
            | ShaderDataType::Int4 => ComponentType::Int,
        }
    }

    /// 整个属性的字节大小
    pub const fn size(self) -> usize {
        self.component_count() * self.component_type().size()
    }

    /// 按名称解析，接受 `float3` 和 GLSL 风格的 `vec3` / `ivec3`，不区分大小写
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "float" => Some(ShaderDataType::Float),
            "float2" | "vec2" => Some(ShaderDataType::Float2),
            "float3" | "vec3" => Some(ShaderDataType::Float3),
            "float4" | "vec4" => Some(ShaderDataType::Float4),
            "int" => Some(ShaderDataType::Int),
            "int2" | "ivec2" => Some(ShaderDataType::Int2),
            "int3" | "ivec3" => Some(ShaderDataType::Int3),
            "int4" | "ivec4" => Some(ShaderDataType::Int4),
            _ => None,
        }
    }
}

/// 布局中的一个顶点属性
///
/// 除 `offset` 外的字段完全由数据类型推导；`offset` 由所属布局在构造时写入。
/// 放入布局后不可修改（布局只对外提供只读访问）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferElement {
    /// `None` 表示未知类型，此时分量数与大小均为 0
    pub data_type: Option<ShaderDataType>,
    pub component_type: ComponentType,
    pub component_count: usize,
    /// 字节大小
    pub size: usize,
    /// 在顶点结构中的字节偏移
    pub offset: usize,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType) -> Self {
        Self {
            data_type: Some(data_type),
            component_type: data_type.component_type(),
            component_count: data_type.component_count(),
            size: data_type.size(),
            offset: 0,
        }
    }

    /// 按名称创建
    ///
    /// 未知名称不会导致失败：记录错误日志并返回零宽度元素。
    pub fn from_name(name: &str) -> Self {
        match ShaderDataType::from_name(name) {
            Some(data_type) => Self::new(data_type),
            None => {
                error!(name, "Unknown shader data type");
                Self {
                    data_type: None,
                    component_type: ComponentType::Float,
                    component_count: 0,
                    size: 0,
                    offset: 0,
                }
            }
        }
    }

    /// 是否为零宽度（未知类型）元素
    pub fn is_zero_width(&self) -> bool {
        self.size == 0
    }
}

impl From<ShaderDataType> for BufferElement {
    fn from(data_type: ShaderDataType) -> Self {
        Self::new(data_type)
    }
}

/// 顶点布局
///
/// 有序的属性序列，偏移量和跨度在构造时一次计算完成：
/// `offset(i) + size(i) == offset(i + 1)`，`stride == Σ size(i)`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: usize,
}

impl BufferLayout {
    pub fn new<I>(elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BufferElement>,
    {
        let mut elements: Vec<BufferElement> = elements.into_iter().map(Into::into).collect();

        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }

        Self { elements, stride: offset }
    }

    /// 按类型名称构建，例如来自配置文件的 `["float3", "float3"]`
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(names.into_iter().map(|name| BufferElement::from_name(name.as_ref())))
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BufferElement> {
        self.elements.iter()
    }

    /// 一个完整顶点的字节大小
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a BufferElement;
    type IntoIter = std::slice::Iter<'a, BufferElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// 缓冲区数据的预期更新频率
///
/// 只作为提示传给 OpenGL 选择存储策略，不影响程序行为。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// 数据几乎不变（默认）
    #[default]
    Static,
    /// 数据经常变化
    Dynamic,
    /// 数据每帧更新
    Stream,
}

impl BufferUsage {
    /// 对应的 OpenGL 使用提示（GL_STATIC_DRAW 等）
    pub const fn gl_enum(self) -> u32 {
        match self {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
            BufferUsage::Stream => glow::STREAM_DRAW,
        }
    }

    /// 按名称解析，未知名称记录错误并回退到 `Static`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "static" => BufferUsage::Static,
            "dynamic" => BufferUsage::Dynamic,
            "stream" => BufferUsage::Stream,
            _ => {
                error!(name, "Unknown vertex buffer usage, falling back to static");
                BufferUsage::Static
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(layout: &BufferLayout) -> Vec<usize> {
        layout.iter().map(|e| e.offset).collect()
    }

    #[test]
    fn test_position_color_layout() {
        let layout = BufferLayout::new([ShaderDataType::Float3, ShaderDataType::Float3]);

        let elements = layout.elements();
        assert_eq!(elements[0].offset, 0);
        assert_eq!(elements[0].size, 12);
        assert_eq!(elements[1].offset, 12);
        assert_eq!(elements[1].size, 12);
        assert_eq!(layout.stride(), 24);
    }

    #[test]
    fn test_mixed_layout() {
        let layout = BufferLayout::new([
            ShaderDataType::Float,
            ShaderDataType::Float4,
            ShaderDataType::Int2,
        ]);

        assert_eq!(offsets(&layout), vec![0, 4, 20]);
        assert_eq!(layout.stride(), 28);
        assert_eq!(layout.elements()[2].component_type, ComponentType::Int);
        assert_eq!(layout.elements()[2].component_count, 2);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let layout = BufferLayout::new([
            ShaderDataType::Int4,
            ShaderDataType::Float2,
            ShaderDataType::Int,
            ShaderDataType::Float3,
        ]);

        for pair in layout.elements().windows(2) {
            assert_eq!(pair[0].offset + pair[0].size, pair[1].offset);
        }
        let total: usize = layout.iter().map(|e| e.size).sum();
        assert_eq!(layout.stride(), total);
    }

    #[test]
    fn test_component_counts_and_sizes() {
        let cases = [
            (ShaderDataType::Float, 1, 4),
            (ShaderDataType::Float2, 2, 8),
            (ShaderDataType::Float3, 3, 12),
            (ShaderDataType::Float4, 4, 16),
            (ShaderDataType::Int, 1, 4),
            (ShaderDataType::Int2, 2, 8),
            (ShaderDataType::Int3, 3, 12),
            (ShaderDataType::Int4, 4, 16),
        ];
        for (data_type, count, size) in cases {
            assert_eq!(data_type.component_count(), count, "{:?}", data_type);
            assert_eq!(data_type.size(), size, "{:?}", data_type);
        }
    }

    #[test]
    fn test_unknown_type_yields_zero_width_element() {
        let layout = BufferLayout::from_names(["vec3", "matrix4", "float2"]);

        let unknown = layout.elements()[1];
        assert_eq!(unknown.data_type, None);
        assert!(unknown.is_zero_width());
        assert_eq!(unknown.component_count, 0);

        assert_eq!(offsets(&layout), vec![0, 12, 12]);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn test_empty_layout() {
        let layout = BufferLayout::new(Vec::<ShaderDataType>::new());
        assert!(layout.is_empty());
        assert_eq!(layout.stride(), 0);
    }

    #[test]
    fn test_usage_names() {
        assert_eq!(BufferUsage::from_name("Stream"), BufferUsage::Stream);
        assert_eq!(BufferUsage::from_name("dynamic"), BufferUsage::Dynamic);
        assert_eq!(BufferUsage::from_name("rarely"), BufferUsage::Static);
        assert_eq!(BufferUsage::Static.gl_enum(), glow::STATIC_DRAW);
    }
}
