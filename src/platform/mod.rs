//! 平台层
//!
//! 窗口、OpenGL 上下文创建与主循环。需要 `window` feature。

pub mod application;
pub mod window;

pub use application::{App, Application, LoopControl};
pub use window::Window;
