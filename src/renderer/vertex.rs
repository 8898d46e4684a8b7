//! 顶点数据定义
//!
//! 本模块定义了内置的顶点结构体及其对应的 `BufferLayout`。
//!
//! # 设计说明
//!
//! - 使用 `#[repr(C)]` 保证字段按声明顺序紧密排列，与布局计算出的偏移一致
//! - 实现 `Pod` 和 `Zeroable`，可以直接用 `bytemuck::cast_slice` 上传到顶点缓冲区

use bytemuck::{Pod, Zeroable};

use crate::renderer::layout::{BufferLayout, ShaderDataType};

/// 带颜色的顶点
///
/// # 内存布局
///
/// - `position`：前 12 字节（3 个 f32），着色器 location 0
/// - `color`：后 12 字节（3 个 f32），着色器 location 1
///
/// 总大小：24 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    /// 顶点位置（标准化设备坐标）
    pub position: [f32; 3],
    /// 顶点颜色（RGB，范围 0.0-1.0）
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// 与结构体字段一一对应的布局：`[Float3, Float3]`
    pub fn layout() -> BufferLayout {
        BufferLayout::new([ShaderDataType::Float3, ShaderDataType::Float3])
    }
}

/// 演示用的彩色三角形
///
/// - 顶点 1：顶部中心 (0.0, 0.5)，红色
/// - 顶点 2：右下角 (0.5, -0.5)，绿色
/// - 顶点 3：左下角 (-0.5, -0.5)，蓝色
pub const TRIANGLE: [ColorVertex; 3] = [
    ColorVertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0]),
    ColorVertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
    ColorVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
];
