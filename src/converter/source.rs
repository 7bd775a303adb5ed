//! # 数据源模型
//!
//! ## 设计思路
//!
//! `SourceFile` 对应一次选择/拖入的文件：名称、声明的媒体类型、字节数与负载。
//! 负载只持有引用（`Bytes` 或路径），在编码阶段才真正读取。
//!
//! 媒体类型按扩展名声明；扩展名缺失或未知时才用 `infer` 探测内容。
//! 这一步只是“声明”，校验阶段不做任何探测。

use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::ConverterError;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// 文件负载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBytes {
    /// 内存中的字节（引用计数，克隆不复制数据）。
    Memory(Bytes),
    /// 本地文件，编码时按块读取。
    Path(PathBuf),
}

/// 用户提交的原始文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub byte_size: u64,
    pub media_type: String,
    pub bytes: FileBytes,
}

impl SourceFile {
    /// 由内存字节构造，`byte_size` 取实际长度。
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            byte_size: bytes.len() as u64,
            media_type: media_type.into(),
            bytes: FileBytes::Memory(bytes),
        }
    }

    /// 由本地路径构造：读取 metadata 并声明媒体类型，不读取内容。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConverterError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| ConverterError::ReadFailure(format!("无法读取文件信息 {}：{}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(ConverterError::ReadFailure(format!("不是普通文件：{}", path.display())));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let media_type = declared_media_type(path);
        log::debug!(
            "📁 已接收本地文件 - 名称: {} 类型: {} 大小: {} 字节",
            name,
            media_type,
            metadata.len()
        );

        Ok(Self {
            name,
            byte_size: metadata.len(),
            media_type,
            bytes: FileBytes::Path(path.to_path_buf()),
        })
    }

    /// `data:<type>;base64,` 前缀。
    pub fn data_uri_prefix(&self) -> String {
        format!("data:{};base64,", self.media_type)
    }
}

/// 为本地文件声明媒体类型。
pub fn declared_media_type(path: &Path) -> String {
    if let Some(media_type) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(media_type_for_extension)
    {
        return media_type.to_string();
    }

    match infer::get_from_path(path) {
        Ok(Some(kind)) => kind.mime_type().to_string(),
        Ok(None) => FALLBACK_MEDIA_TYPE.to_string(),
        Err(e) => {
            log::debug!("内容探测失败，使用默认类型：{}", e);
            FALLBACK_MEDIA_TYPE.to_string()
        }
    }
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    let media_type = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        _ => return None,
    };
    Some(media_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn from_bytes_uses_payload_length() {
        let file = SourceFile::from_bytes("a.png", "image/png", vec![1u8, 2, 3]);
        assert_eq!(file.byte_size, 3);
        assert_eq!(file.data_uri_prefix(), "data:image/png;base64,");
    }

    #[test]
    fn extension_wins_over_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, PNG_SIGNATURE).expect("write file");

        let file = SourceFile::from_path(&path).expect("source should load");
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.name, "photo.JPG");
        assert_eq!(file.byte_size, 8);
    }

    #[test]
    fn missing_extension_falls_back_to_content_detection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("clip");
        let mut f = std::fs::File::create(&path).expect("create file");
        f.write_all(&PNG_SIGNATURE).expect("write signature");
        f.write_all(&[0u8; 32]).expect("write body");

        let file = SourceFile::from_path(&path).expect("source should load");
        assert_eq!(file.media_type, "image/png");
    }

    #[test]
    fn unknown_content_is_octet_stream() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("blob.xyz");
        std::fs::write(&path, b"hello").expect("write file");

        let file = SourceFile::from_path(&path).expect("source should load");
        assert_eq!(file.media_type, FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn directory_is_not_a_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = SourceFile::from_path(dir.path());
        assert!(matches!(result, Err(ConverterError::ReadFailure(_))));
    }
}
