//! # 预览句柄模块
//!
//! ## 设计思路
//!
//! 预览句柄是从当前文件派生的只读展示引用，相当于浏览器里的 object URL。
//! 它是一种需要释放的资源：被新预览替换、清空状态或转换器销毁时都必须释放。
//!
//! ## 实现思路
//!
//! - `PreviewRegistry` 记录存活句柄数量，供诊断与测试断言泄漏。
//! - `PreviewHandle` 采用 RAII：创建即登记，`Drop` 时自动注销，
//!   任何退出路径都不会遗漏释放。
//! - 像素尺寸只读取图片头信息，不做完整解码。

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

use super::{FileBytes, SourceFile};

/// 预览句柄登记表。
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: AtomicUsize,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为文件创建预览句柄。
    pub fn create(&self, file: &SourceFile) -> PreviewHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.live.fetch_add(1, Ordering::SeqCst);
        log::debug!("🖼️ 创建预览句柄 #{} - {}", id, file.name);

        PreviewHandle {
            id,
            source: file.bytes.clone(),
            registry: Arc::clone(&self.inner),
        }
    }

    /// 当前未释放的句柄数量。
    pub fn live_count(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }
}

/// 预览句柄，`Drop` 时释放。
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    source: FileBytes,
    registry: Arc<RegistryInner>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 读取图片头获得宽高；格式无法识别时返回 `None`。
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let result = match &self.source {
            FileBytes::Memory(bytes) => image::ImageReader::new(Cursor::new(bytes.as_ref()))
                .with_guessed_format()
                .map_err(image::ImageError::IoError)
                .and_then(|reader| reader.into_dimensions()),
            FileBytes::Path(path) => image::ImageReader::open(path)
                .and_then(|reader| reader.with_guessed_format())
                .map_err(image::ImageError::IoError)
                .and_then(|reader| reader.into_dimensions()),
        };

        match result {
            Ok(dimensions) => Some(dimensions),
            Err(e) => {
                log::debug!("预览 #{} 无法读取尺寸：{}", self.id, e);
                None
            }
        }
    }
}

impl PartialEq for PreviewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.registry, &other.registry)
    }
}

impl Eq for PreviewHandle {}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::SeqCst);
        log::debug!("🧹 释放预览句柄 #{}", self.id);
    }
}

/// 预览卡片展示的文件信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewInfo {
    pub name: String,
    pub media_type: String,
    pub byte_size: u64,
    /// 例如 `"12.34 KB"`。
    pub size_label: String,
    pub dimensions: Option<(u32, u32)>,
}

impl PreviewInfo {
    pub fn new(file: &SourceFile, handle: &PreviewHandle) -> Self {
        Self {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            byte_size: file.byte_size,
            size_label: format_kilobytes(file.byte_size),
            dimensions: handle.dimensions(),
        }
    }
}

/// 以 KB 为单位保留两位小数。
pub fn format_kilobytes(byte_size: u64) -> String {
    format!("{:.2} KB", byte_size as f64 / 1024.0)
}
