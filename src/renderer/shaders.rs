//! 内置着色器源码
//!
//! GLSL 源码在编译期通过 `include_str!` 嵌入，运行时交给 `ShaderProgram` 编译。
//!
//! ```text
//! 顶点数据 -> 顶点着色器 -> 图元装配 -> 光栅化 -> 片段着色器 -> 帧缓冲
//! ```

/// 顶点着色器
///
/// # 输入
///
/// - `position`：顶点位置（location = 0）
/// - `color`：顶点颜色（location = 1）
///
/// # 输出
///
/// - `gl_Position`：裁剪空间坐标 (x, y, z, 1.0)
/// - `fragColor`：传递给片段着色器的颜色
pub const VERTEX_SHADER: &str = include_str!("shaders/vertex.glsl");

/// 片段着色器
///
/// 直接输出插值后的顶点颜色，alpha 固定为 1.0。
pub const FRAGMENT_SHADER: &str = include_str!("shaders/fragment.glsl");
