//! # 配置模块
//!
//! ## 设计思路
//!
//! 将支持格式、体积上限、读取分块与“已复制”提示时长集中到 `ConverterConfig`。
//! `Default` 即生产值；CLI 可通过 JSON 文件覆盖部分字段。
//!
//! ## 实现思路
//!
//! - `#[serde(default)]` 允许 JSON 只写需要覆盖的字段。
//! - `validate` 在构造 `Converter` 前执行范围检查，非法配置直接拒绝启动。

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConverterError;

/// 支持的图片媒体类型（精确字符串匹配）。
pub const SUPPORTED_FORMATS: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// 单个文件体积上限：5MB。
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// “已复制”状态自动恢复的延迟。
pub const COPIED_RESET_DELAY: Duration = Duration::from_millis(2_000);

/// 默认读取分块大小。
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

const MIN_READ_CHUNK_SIZE: usize = 1024;
const MAX_READ_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// 转换器配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 允许的媒体类型。
    pub supported_formats: Vec<String>,
    /// 文件体积上限（字节）。
    pub max_file_size: u64,
    /// 每次读取的字节数，同时决定进度通知的粒度。
    pub read_chunk_size: usize,
    /// “已复制”提示保留时长（毫秒）。
    pub copied_reset_delay_ms: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            supported_formats: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
            max_file_size: MAX_FILE_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            copied_reset_delay_ms: COPIED_RESET_DELAY.as_millis() as u64,
        }
    }
}

impl ConverterConfig {
    /// 从 JSON 文件加载配置，缺省字段取默认值。
    pub fn load_from_path(path: &Path) -> Result<Self, ConverterError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConverterError::InvalidConfig(format!("无法读取配置文件 {}：{}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConverterError::InvalidConfig(format!("解析配置文件失败：{}", e)))?;
        config.validate()?;

        log::info!("⚙️ 已加载配置文件 - 路径: {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConverterError> {
        if self.supported_formats.is_empty() {
            return Err(ConverterError::InvalidConfig("supported_formats 不能为空".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(ConverterError::InvalidConfig("max_file_size 必须大于 0".to_string()));
        }
        if !(MIN_READ_CHUNK_SIZE..=MAX_READ_CHUNK_SIZE).contains(&self.read_chunk_size) {
            return Err(ConverterError::InvalidConfig(format!(
                "read_chunk_size 必须在 {}~{} 字节之间",
                MIN_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE
            )));
        }
        if !(100..=60_000).contains(&self.copied_reset_delay_ms) {
            return Err(ConverterError::InvalidConfig(
                "copied_reset_delay_ms 必须在 100~60000 毫秒之间".to_string(),
            ));
        }
        Ok(())
    }

    pub fn copied_reset_delay(&self) -> Duration {
        Duration::from_millis(self.copied_reset_delay_ms)
    }

    pub fn is_supported(&self, media_type: &str) -> bool {
        self.supported_formats.iter().any(|f| f == media_type)
    }

    /// 体积上限（MB，向下取整），用于错误文案。
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }

    /// 文件选择框的 `accept` 提示串。
    pub fn accept_hint(&self) -> String {
        self.supported_formats.join(",")
    }

    /// 面向用户的格式列表，例如 `JPG, PNG, GIF, or WebP`。
    pub fn accepted_formats_label(&self) -> String {
        let labels: Vec<String> = self
            .supported_formats
            .iter()
            .map(|f| format_label(f))
            .collect();

        match labels.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, second] => format!("{} or {}", first, second),
            [init @ .., last] => format!("{}, or {}", init.join(", "), last),
        }
    }
}

fn format_label(media_type: &str) -> String {
    match media_type {
        "image/jpeg" => "JPG".to_string(),
        "image/png" => "PNG".to_string(),
        "image/gif" => "GIF".to_string(),
        "image/webp" => "WebP".to_string(),
        other => other
            .rsplit('/')
            .next()
            .unwrap_or(other)
            .to_uppercase(),
    }
}
