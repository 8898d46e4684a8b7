//! 配置管理模块
//!
//! 提供引擎配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (engine.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "Engine"
//! vsync = true
//!
//! [graphics]
//! gl_major = 3
//! gl_minor = 3
//! clear_color = [0.5, 0.5, 0.5, 1.0]
//! vertex_usage = "static"   # static, dynamic, stream
//!
//! [logging]
//! level = "info"            # trace, debug, info, warn, error
//! file_output = false
//! log_file = "engine.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::renderer::layout::BufferUsage;

/// 引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
///
/// 尺寸使用 `u16`，与窗口事件中携带的宽高类型一致。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u16,

    #[serde(default = "default_height")]
    pub height: u16,

    #[serde(default = "default_title")]
    pub title: String,

    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 请求的 OpenGL 主版本号
    #[serde(default = "default_gl_major")]
    pub gl_major: u8,

    /// 请求的 OpenGL 次版本号
    #[serde(default = "default_gl_minor")]
    pub gl_minor: u8,

    /// 每帧清屏颜色（RGBA）
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],

    /// 顶点缓冲区的使用提示，按名称解析，未知名称回退到 static
    #[serde(default = "default_vertex_usage")]
    pub vertex_usage: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_file_output")]
    pub file_output: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u16 { 800 }
fn default_height() -> u16 { 600 }
fn default_title() -> String { "Engine".to_string() }
fn default_vsync() -> bool { true }
fn default_gl_major() -> u8 { 3 }
fn default_gl_minor() -> u8 { 3 }
fn default_clear_color() -> [f32; 4] { [0.5, 0.5, 0.5, 1.0] }
fn default_vertex_usage() -> String { "static".to_string() }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "engine.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            vsync: default_vsync(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            gl_major: default_gl_major(),
            gl_minor: default_gl_minor(),
            clear_color: default_clear_color(),
            vertex_usage: default_vertex_usage(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl GraphicsConfig {
    /// 解析配置中的顶点缓冲区使用提示
    pub fn vertex_usage(&self) -> BufferUsage {
        BufferUsage::from_name(&self.vertex_usage)
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use engine_core::core::Config;
    ///
    /// let config = Config::from_file("engine.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--width <value>`: 设置窗口宽度
    /// - `--height <value>`: 设置窗口高度
    /// - `--title <value>`: 设置窗口标题
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
            args.iter()
                .position(|a| a == flag)
                .and_then(|idx| args.get(idx + 1))
        }

        if let Some(width) = value_of(&args, "--width").and_then(|s| s.parse().ok()) {
            self.window.width = width;
        }

        if let Some(height) = value_of(&args, "--height").and_then(|s| s.parse().ok()) {
            self.window.height = height;
        }

        if let Some(title) = value_of(&args, "--title") {
            self.window.title = title.clone();
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        // 顶点数组对象要求 OpenGL 3.0 及以上
        if self.graphics.gl_major < 3 {
            return Err(ConfigError::InvalidValue {
                field: "graphics.gl_major".to_string(),
                reason: "OpenGL 3.0 or newer is required for vertex array objects".to_string(),
            }.into());
        }

        if self.graphics.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.clear_color".to_string(),
                reason: "Color components must be within [0.0, 1.0]".to_string(),
            }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.graphics.gl_major, 3);
        assert_eq!(config.graphics.vertex_usage(), BufferUsage::Static);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.gl_major = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            title = "Editor"

            [graphics]
            vertex_usage = "dynamic"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Editor");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.graphics.vertex_usage(), BufferUsage::Dynamic);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_unknown_usage_falls_back_to_static() {
        let mut config = Config::default();
        config.graphics.vertex_usage = "sometimes".to_string();
        assert_eq!(config.graphics.vertex_usage(), BufferUsage::Static);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["engine", "--width", "1024", "--height", "abc", "--title", "Sandbox"]);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "Sandbox");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("engine_core_config_{}.toml", std::process::id()));

        let mut config = Config::default();
        config.window.width = 1280;
        config.window.title = "Round Trip".to_string();
        config.window.vsync = false;
        config.graphics.gl_minor = 1;
        config.graphics.clear_color = [0.25, 0.5, 0.75, 1.0];
        config.graphics.vertex_usage = "stream".to_string();
        config.logging.level = LogLevel::Debug;
        config.logging.file_output = true;
        config.logging.log_file = "logs/run.log".to_string();

        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        let loaded = loaded.unwrap();

        assert_eq!(loaded.window.width, 1280);
        assert_eq!(loaded.window.height, config.window.height);
        assert_eq!(loaded.window.title, "Round Trip");
        assert!(!loaded.window.vsync);
        assert_eq!(loaded.graphics.gl_major, config.graphics.gl_major);
        assert_eq!(loaded.graphics.gl_minor, 1);
        assert_eq!(loaded.graphics.clear_color, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(loaded.graphics.vertex_usage(), BufferUsage::Stream);
        assert_eq!(loaded.logging.level, LogLevel::Debug);
        assert!(loaded.logging.file_output);
        assert_eq!(loaded.logging.log_file, "logs/run.log");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml_str("[window\nwidth = 1").unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::EngineError::Config(ConfigError::ParseError(_))
        ));
    }
}
