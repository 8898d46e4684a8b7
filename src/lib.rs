//! engine_core - 最小化的 OpenGL 渲染框架
//!
//! 提供按类型分发的事件系统，以及独占 GPU 句柄的 OpenGL 资源封装。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（事件、输入翻译、配置、日志、错误处理）
//! - `renderer`: 渲染器模块（图形上下文、顶点布局、缓冲区、顶点数组、着色器程序）
//! - `platform`: 窗口与主循环（需要 `window` feature）
//!
//! # 使用示例
//!
//! ```
//! use engine_core::core::event::*;
//!
//! let mut dispatcher = EventDispatcher::new();
//!
//! dispatcher.add_listener(|e: &WindowResizeEvent| {
//!     println!("窗口调整为: {}x{}", e.width, e.height);
//! });
//!
//! // 分发事件，只有 WindowResize 的监听器会被调用
//! dispatcher.dispatch(&Event::from(WindowResizeEvent::new(1920, 1080)));
//! // 没有监听器的类型直接忽略
//! dispatcher.dispatch(&Event::from(WindowCloseEvent::new()));
//! ```

pub mod core;
pub mod renderer;

#[cfg(feature = "window")]
pub mod platform;
