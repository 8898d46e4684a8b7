//! 渲染器模块
//!
//! OpenGL 资源封装与它们依赖的上下文抽象。
//!
//! # 模块组织
//!
//! - `context`：`GlApi` 接口与显式的 `GraphicsContext` 句柄
//! - `gl`：基于 glow 的 `GlApi` 实现
//! - `headless`：记录调用的 `GlApi` 实现，不需要 GPU
//! - `layout`：顶点布局（纯数据）
//! - `vertex_buffer` / `vertex_array` / `shader`：独占 GPU 句柄的资源封装
//! - `vertex` / `shaders`：内置的顶点类型和 GLSL 源码
//!
//! # 资源生命周期
//!
//! ```text
//! 未初始化 ──new──> 就绪 ──take / drop──> 已释放
//! ```
//!
//! 封装类型都不实现 `Clone`；转移所有权用 `take()`，释放发生在 `Drop` 中。

pub mod context;
pub mod gl;
pub mod headless;
pub mod layout;
pub mod shader;
pub mod shaders;
pub mod vertex;
pub mod vertex_array;
pub mod vertex_buffer;

pub use context::{GlApi, GraphicsContext, NULL_HANDLE};
pub use headless::{GlCall, HeadlessGl};
pub use layout::{BufferElement, BufferLayout, BufferUsage, ComponentType, ShaderDataType};
pub use shader::ShaderProgram;
pub use vertex::ColorVertex;
pub use vertex_array::{VertexArray, VertexAttribute};
pub use vertex_buffer::VertexBuffer;
