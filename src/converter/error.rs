//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 转换链路中所有可见错误集中为单一枚举，`Display` 即为展示给用户的固定文案。
//! 底层细节（I/O 错误、剪贴板错误）保存在变体字段中，只进日志，不进错误横幅。

/// 转换器统一错误类型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConverterError {
    /// 声明的媒体类型不在支持列表内。
    #[error("Unsupported file type. Please upload a {accepted} image.")]
    UnsupportedType { media_type: String, accepted: String },

    /// 文件体积超过上限。
    #[error("File is too large. Maximum size is {limit_mb}MB.")]
    TooLarge { byte_size: u64, limit_mb: u64 },

    /// 读取字节失败（细节只写日志）。
    #[error("An error occurred while reading the file.")]
    ReadFailure(String),

    /// 写入系统剪贴板失败（细节只写日志）。
    #[error("Failed to copy to clipboard. Please try again.")]
    ClipboardFailure(String),

    /// 配置不合法，仅在启动阶段出现。
    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl ConverterError {
    /// 稳定错误码，用于日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "E_UNSUPPORTED_TYPE",
            Self::TooLarge { .. } => "E_TOO_LARGE",
            Self::ReadFailure(_) => "E_READ",
            Self::ClipboardFailure(_) => "E_CLIPBOARD",
            Self::InvalidConfig(_) => "E_CONFIG",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } | Self::TooLarge { .. } => "validate",
            Self::ReadFailure(_) => "read",
            Self::ClipboardFailure(_) => "clipboard",
            Self::InvalidConfig(_) => "config",
        }
    }

    /// 底层细节，用于日志与诊断。
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ReadFailure(detail) | Self::ClipboardFailure(detail) => Some(detail),
            Self::InvalidConfig(detail) => Some(detail),
            Self::UnsupportedType { media_type, .. } => Some(media_type),
            Self::TooLarge { .. } => None,
        }
    }
}
