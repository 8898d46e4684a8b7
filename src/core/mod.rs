//! 核心功能模块
//!
//! 与具体图形 API 无关的基础设施。
//!
//! # 模块组织
//!
//! - `event`：事件类型与按类型分发的监听表
//! - `input`：把 winit 窗口事件翻译为 `Event`
//! - `config`：配置管理，从 `engine.toml` 加载引擎设置
//! - `error`：错误处理，定义统一的错误类型
//! - `log`：日志系统，基于 tracing

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod log;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use error::{EngineError, Result};
pub use event::{
    Event, EventDispatcher, EventType, TypedEvent,
    WindowResizeEvent, WindowCloseEvent,
    MouseMoveEvent, MouseButtonEvent, MouseButton,
    KeyPressEvent, KeyAction, KeyCode,
};
