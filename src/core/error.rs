//! 错误处理模块
//!
//! 定义了引擎外壳（配置、窗口、上下文创建）使用的统一错误类型。
//!
//! GPU 资源封装本身不通过这里传播错误：编译/链接失败只记录日志并让对象
//! 停留在"未编译"状态，未知枚举值则替换为安全的默认值。`GraphicsError`
//! 仅供 `ShaderProgram::try_new` 这类希望用 `?` 传播的调用方使用。

use std::fmt;

/// 引擎统一的 Result 类型
pub type Result<T> = std::result::Result<T, EngineError>;

/// 引擎的错误类型
#[derive(Debug)]
pub enum EngineError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 窗口或 OpenGL 上下文创建失败
    Window(String),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 着色器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// 图形 API 相关的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// 上下文创建失败
    ContextCreation(String),

    /// 着色器阶段编译失败，附带驱动返回的诊断日志
    ShaderCompilation { stage: ShaderStage, log: String },

    /// 着色器程序链接失败
    ProgramLink(String),

    /// 资源创建失败
    ResourceCreation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "Configuration error: {}", e),
            EngineError::Graphics(e) => write!(f, "Graphics error: {}", e),
            EngineError::Window(msg) => write!(f, "Window error: {}", msg),
            EngineError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::ContextCreation(msg) => write!(f, "Context creation failed: {}", msg),
            GraphicsError::ShaderCompilation { stage, log } => {
                write!(f, "{} shader compilation failed:\n{}", stage.name(), log)
            }
            GraphicsError::ProgramLink(log) => write!(f, "Shader program link failed:\n{}", log),
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Graphics(e) => Some(e),
            EngineError::Io(e) => Some(e),
            EngineError::Window(_) => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err)
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<GraphicsError> for EngineError {
    fn from(err: GraphicsError) -> Self {
        EngineError::Graphics(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_error_display_includes_stage_and_log() {
        let err = GraphicsError::ShaderCompilation {
            stage: ShaderStage::Fragment,
            log: "0:1: syntax error".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("fragment shader compilation failed"));
        assert!(text.contains("0:1: syntax error"));
    }

    #[test]
    fn test_error_conversion() {
        let err: EngineError = ConfigError::ParseError("bad".to_string()).into();
        assert!(matches!(err, EngineError::Config(ConfigError::ParseError(_))));
        assert_eq!(err.to_string(), "Configuration error: Failed to parse config: bad");
    }
}
