//! engine_core 演示程序
//!
//! 打开一个窗口，用 `ShaderProgram`、`VertexBuffer` 和 `VertexArray` 绘制一个彩色三角形。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件 engine.toml（不存在时使用默认配置）
//! cargo run --features window
//!
//! # 命令行覆盖窗口参数
//! cargo run --features window -- --width 1280 --height 720 --title Demo
//! ```
//!
//! 鼠标移动和窗口尺寸变化会写入日志；关闭窗口或按 Escape 退出。

use anyhow::Context;
use tracing::info;

use engine_core::app_info;
use engine_core::core::event::{
    EventDispatcher, KeyCode, KeyPressEvent, MouseMoveEvent, WindowResizeEvent,
};
use engine_core::core::{log, Config, Result};
use engine_core::platform::{App, Application, LoopControl};
use engine_core::renderer::vertex::TRIANGLE;
use engine_core::renderer::{
    shaders, BufferUsage, ColorVertex, GraphicsContext, ShaderProgram, VertexArray, VertexBuffer,
};

/// 三角形所需的 GPU 资源，上下文就绪后才创建
struct TriangleResources {
    program: ShaderProgram,
    // 顶点数组引用该缓冲区，二者一同释放
    vertex_buffer: VertexBuffer,
    vertex_array: VertexArray,
}

struct TriangleApp {
    usage: BufferUsage,
    resources: Option<TriangleResources>,
}

impl App for TriangleApp {
    fn on_attach(&mut self, dispatcher: &mut EventDispatcher, control: &LoopControl) {
        dispatcher.add_listener(|e: &MouseMoveEvent| {
            app_info!("[Event] mouse moved to {}x{}", e.x, e.y);
        });

        dispatcher.add_listener(|e: &WindowResizeEvent| {
            app_info!("[Event] Changed window size to {}x{}", e.width, e.height);
        });

        let control = control.clone();
        dispatcher.add_listener(move |e: &KeyPressEvent| {
            if e.key == KeyCode::Escape && e.is_pressed() {
                control.request_close();
            }
        });
    }

    fn on_setup(&mut self, ctx: &GraphicsContext) -> Result<()> {
        let program = ShaderProgram::new(ctx, shaders::VERTEX_SHADER, shaders::FRAGMENT_SHADER);
        let vertex_buffer =
            VertexBuffer::from_vertices(ctx, &TRIANGLE, ColorVertex::layout(), self.usage);
        let mut vertex_array = VertexArray::new(ctx);
        vertex_array.add_buffer(&vertex_buffer);

        info!(
            compiled = program.is_compiled(),
            attributes = vertex_array.attribute_count(),
            vertices = vertex_buffer.vertex_count(),
            "Triangle resources created"
        );

        self.resources = Some(TriangleResources {
            program,
            vertex_buffer,
            vertex_array,
        });
        Ok(())
    }

    fn on_update(&mut self, ctx: &GraphicsContext) {
        let Some(resources) = &self.resources else {
            return;
        };
        if !resources.program.is_compiled() {
            return;
        }

        resources.program.bind();
        resources.vertex_array.bind();
        ctx.draw_triangles(0, resources.vertex_buffer.vertex_count() as u32);
    }
}

fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("engine.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());

    // 3. 验证配置
    config.validate().context("invalid configuration")?;

    // 4. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "engine_core starting...");

    let app = TriangleApp {
        usage: config.graphics.vertex_usage(),
        resources: None,
    };

    Application::run(&config, app).context("application failed")?;
    Ok(())
}
