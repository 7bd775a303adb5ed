//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 转换器内部的错误都会在源头被转成 `error_message`，不会向外传播；
//! `AppError` 只承载应用边界（CLI）上的失败：配置、文件系统、序列化。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ConverterError` / `io::Error` / `serde_json::Error` 提供 `From` 转换，无需手动 map。
//! - `exit_code` 把错误映射为进程退出码，配置错误使用 78（EX_CONFIG）。

use crate::converter::ConverterError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 转换器错误（配置非法、读取失败等）
    #[error("{0}")]
    Converter(#[from] ConverterError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化失败
    #[error("序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// 进程退出码。
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Converter(ConverterError::InvalidConfig(_)) => 78,
            _ => 1,
        }
    }
}
