//! 平台窗口
//!
//! `Window` 持有 winit 窗口、glutin 创建的 OpenGL 上下文和绘制表面，
//! 以及基于它们构造的 `GraphicsContext`。
//!
//! 窗口只负责把平台事件翻译成 `Event` 并交给事件回调，
//! 不关心谁在监听（通常是应用持有的 `EventDispatcher`）。

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use tracing::{info, warn};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::{WindowBuilder, WindowId};

use crate::core::config::{GraphicsConfig, WindowConfig};
use crate::core::error::{EngineError, GraphicsError, Result};
use crate::core::event::{Event, EventCallback};
use crate::core::input;
use crate::renderer::GraphicsContext;

/// 窗口当前的尺寸与标题
#[derive(Debug, Clone, PartialEq, Eq)]
struct WindowData {
    width: u16,
    height: u16,
    title: String,
}

fn context_error(what: &str, err: impl fmt::Display) -> EngineError {
    GraphicsError::ContextCreation(format!("{what}: {err}")).into()
}

pub struct Window {
    // 字段按声明顺序析构：先释放绘制表面和上下文，再销毁窗口
    graphics: GraphicsContext,
    surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: winit::window::Window,
    data: WindowData,
    event_callback: Option<EventCallback>,
}

impl Window {
    /// 创建窗口并在其上建立 current 的 OpenGL 上下文
    pub fn new(
        event_loop: &EventLoop<()>,
        config: &WindowConfig,
        graphics_config: &GraphicsConfig,
    ) -> Result<Self> {
        info!(
            title = %config.title,
            width = config.width,
            height = config.height,
            "Creating window"
        );

        let window_builder = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(
                u32::from(config.width),
                u32::from(config.height),
            ));

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                // 显示端没有匹配模板的配置时 build 直接返回 Err，不会调用该闭包，
                // 所以这里的迭代器至少有一个元素
                configs
                    .reduce(|best, config| {
                        if config.num_samples() > best.num_samples() {
                            config
                        } else {
                            best
                        }
                    })
                    .expect("glutin offers at least one config")
            })
            .map_err(|e| context_error("failed to build display", e))?;

        let window =
            window.ok_or_else(|| EngineError::Window("window was not created".to_string()))?;

        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                graphics_config.gl_major,
                graphics_config.gl_minor,
            ))))
            .build(Some(window.raw_window_handle()));

        // SAFETY: 原始窗口句柄来自仍然存活的 winit 窗口
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| context_error("failed to create OpenGL context", e))?;

        let surface_attributes = window.build_surface_attributes(Default::default());
        // SAFETY: 同上，窗口比表面活得更久（见字段顺序）
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| context_error("failed to create window surface", e))?;

        let gl_context = not_current
            .make_current(&surface)
            .map_err(|e| context_error("failed to make context current", e))?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&gl_context, interval) {
            warn!("Failed to set swap interval: {}", e);
        }

        // SAFETY: 上下文刚刚在当前线程上设为 current
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        let graphics = GraphicsContext::new(Rc::new(gl));
        graphics.set_viewport(u32::from(config.width), u32::from(config.height));

        info!(title = %config.title, "Window was successfully created");

        Ok(Self {
            graphics,
            surface,
            gl_context,
            window,
            data: WindowData {
                width: config.width,
                height: config.height,
                title: config.title.clone(),
            },
            event_callback: None,
        })
    }

    /// 设置事件回调，替换已有的回调
    pub fn set_event_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.event_callback = Some(Box::new(callback));
    }

    /// 处理一个 winit 窗口事件
    ///
    /// 尺寸变化时同步调整绘制表面和视口；能翻译的事件交给事件回调。
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            self.resize(*size);
        }

        let Some(event) = input::translate_window_event(event) else {
            return;
        };
        if let Some(callback) = self.event_callback.as_mut() {
            callback(&event);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.data.width = u16::try_from(size.width).unwrap_or(u16::MAX);
        self.data.height = u16::try_from(size.height).unwrap_or(u16::MAX);

        // 最小化时尺寸为 0，此时不调整表面
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.surface.resize(&self.gl_context, width, height);
            self.graphics.set_viewport(size.width, size.height);
        }
    }

    /// 呈现当前帧
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.gl_context)
            .map_err(|e| EngineError::Window(format!("failed to swap buffers: {e}")))
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn graphics(&self) -> &GraphicsContext {
        &self.graphics
    }

    pub fn width(&self) -> u16 {
        self.data.width
    }

    pub fn height(&self) -> u16 {
        self.data.height
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("data", &self.data)
            .field("has_event_callback", &self.event_callback.is_some())
            .finish_non_exhaustive()
    }
}
