//! 应用程序主循环
//!
//! `Application::run` 创建窗口，把窗口事件接到 `EventDispatcher` 上，然后驱动每一帧：
//!
//! ```text
//! 轮询平台事件 -> 分发给监听器 -> 清屏 -> App::on_update -> 交换缓冲区
//! ```
//!
//! 关闭请求通过 `LoopControl` 传递，默认的 `WindowClose` 监听器会设置它。

use std::cell::Cell;
use std::rc::Rc;

use tracing::info;
use winit::event::{Event as WinitEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::event::{EventDispatcher, WindowCloseEvent};
use crate::platform::window::Window;
use crate::renderer::GraphicsContext;
use crate::{engine_error, engine_info};

/// 主循环的退出开关，可以廉价克隆后放进监听器
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    close_requested: Rc<Cell<bool>>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求在当前事件处理完后退出主循环
    pub fn request_close(&self) {
        self.close_requested.set(true);
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested.get()
    }
}

/// 应用逻辑
///
/// 所有方法都有默认实现，按需覆盖即可。
pub trait App {
    /// 注册事件监听器
    ///
    /// 调用前分发器里已经有一个 `WindowClose` 监听器负责请求退出。
    /// 覆盖它的应用需要自己调用 `control.request_close()`。
    fn on_attach(&mut self, _dispatcher: &mut EventDispatcher, _control: &LoopControl) {}

    /// 上下文就绪后创建 GPU 资源
    fn on_setup(&mut self, _ctx: &GraphicsContext) -> Result<()> {
        Ok(())
    }

    /// 每帧在清屏之后、交换缓冲区之前调用
    fn on_update(&mut self, _ctx: &GraphicsContext) {}
}

/// 运行期间的应用与窗口
///
/// 字段按声明顺序析构：应用持有的 GPU 资源总是在窗口销毁上下文之前释放，
/// 无论 `run` 是正常结束还是提前返回。
struct Session<A, W> {
    app: A,
    window: W,
}

pub struct Application;

impl Application {
    /// 创建窗口并运行主循环，直到收到关闭请求
    pub fn run<A: App>(config: &Config, app: A) -> Result<()> {
        engine_info!("Starting application");

        let event_loop = EventLoop::new().map_err(|e| EngineError::Window(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let window = Window::new(&event_loop, &config.window, &config.graphics)?;
        let mut session = Session { app, window };

        let control = LoopControl::new();
        let mut dispatcher = EventDispatcher::new();
        {
            let control = control.clone();
            dispatcher.add_listener(move |_: &WindowCloseEvent| control.request_close());
        }
        session.app.on_attach(&mut dispatcher, &control);

        session.window.set_event_callback(move |event| dispatcher.dispatch(event));

        session.app.on_setup(session.window.graphics())?;

        let clear_color = config.graphics.clear_color;
        let mut failure = None;

        info!("Entering main loop...");
        event_loop
            .run(|event, elwt| {
                match event {
                    WinitEvent::WindowEvent { window_id, event }
                        if window_id == session.window.id() =>
                    {
                        match event {
                            WindowEvent::RedrawRequested => {
                                let ctx = session.window.graphics();
                                ctx.clear(clear_color);
                                session.app.on_update(ctx);
                                if let Err(e) = session.window.swap_buffers() {
                                    engine_error!("Present failed: {}", e);
                                    failure = Some(e);
                                    control.request_close();
                                }
                            }
                            other => session.window.handle_window_event(&other),
                        }
                    }
                    WinitEvent::AboutToWait => session.window.request_redraw(),
                    _ => {}
                }

                if control.is_close_requested() {
                    elwt.exit();
                }
            })
            .map_err(|e| EngineError::Window(e.to_string()))?;

        drop(session);
        engine_info!("Closing application");

        failure.map_or(Ok(()), Err)
    }
}
