//! # 校验模块
//!
//! 纯函数：只看 `(media_type, byte_size)`，不做 I/O，不探测文件内容。
//! 先判类型、再判体积；媒体类型按字符串精确匹配，不做大小写或参数归一化。

use super::{ConverterConfig, ConverterError, SourceFile};

/// 拒绝原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge,
}

/// 校验结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected(RejectReason),
}

impl ValidationResult {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// 校验声明的媒体类型与体积。
pub fn validate(media_type: &str, byte_size: u64, config: &ConverterConfig) -> ValidationResult {
    if !config.is_supported(media_type) {
        return ValidationResult::Rejected(RejectReason::UnsupportedType);
    }

    if byte_size > config.max_file_size {
        return ValidationResult::Rejected(RejectReason::TooLarge);
    }

    ValidationResult::Accepted
}

/// 校验整个文件。
pub fn validate_file(file: &SourceFile, config: &ConverterConfig) -> ValidationResult {
    validate(&file.media_type, file.byte_size, config)
}

impl RejectReason {
    /// 转换为带文案的错误。
    pub fn to_error(self, file: &SourceFile, config: &ConverterConfig) -> ConverterError {
        match self {
            Self::UnsupportedType => ConverterError::UnsupportedType {
                media_type: file.media_type.clone(),
                accepted: config.accepted_formats_label(),
            },
            Self::TooLarge => ConverterError::TooLarge {
                byte_size: file.byte_size,
                limit_mb: config.max_file_size_mb(),
            },
        }
    }
}
