//! # 编码模块
//!
//! ## 设计思路
//!
//! 按块读取原始字节，边读边写入 base64 流式编码器，输出完整 Data URI
//! （`data:<type>;base64,<payload>`）。每读完一块上报一次进度。
//!
//! ## 实现思路
//!
//! - `encode`：异步函数 + 进度回调，读失败直接返回 `ReadFailure`，不产出部分结果。
//! - `spawn_encode`：在 tokio 任务中执行 `encode`，通过通道依次发送
//!   若干 `Progress` 和恰好一个 `Finished`。
//! - `ProgressTracker` 保证同一任务内百分比单调不减；总长未知或为 0 时不上报。

use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use super::{ConverterError, FileBytes, SourceFile};

/// 编码过程中的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeEvent {
    Progress { loaded: u64, total: u64, percent: u8 },
    Finished(Result<String, ConverterError>),
}

/// 计算 `round(loaded / total * 100)`；总长未知或为 0 时返回 `None`。
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u8> {
    let total = match total {
        Some(0) | None => return None,
        Some(total) => total,
    };
    let loaded = loaded.min(total);
    let percent = (loaded as f64 / total as f64 * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// 单个任务内的进度记录器。
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: u8,
}

impl ProgressTracker {
    /// 返回需要上报的新百分比；回退或无法计算时返回 `None`。
    pub fn advance(&mut self, loaded: u64, total: Option<u64>) -> Option<u8> {
        let percent = progress_percent(loaded, total)?;
        if percent < self.last {
            return None;
        }
        self.last = percent;
        Some(percent)
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

/// 读取文件并生成 Data URI。
///
/// `on_progress(loaded, total)` 在每块读取后调用，`total` 取 `file.byte_size`。
///
/// # 示例
/// ```rust,no_run
/// use image_base64::converter::{encode, SourceFile};
///
/// # async fn demo() -> Result<(), image_base64::converter::ConverterError> {
/// let file = SourceFile::from_bytes("dot.png", "image/png", vec![1u8, 2, 3]);
/// let uri = encode(&file, 64 * 1024, |_, _| {}).await?;
/// assert_eq!(uri, "data:image/png;base64,AQID");
/// # Ok(())
/// # }
/// ```
pub async fn encode<P>(file: &SourceFile, chunk_size: usize, on_progress: P) -> Result<String, ConverterError>
where
    P: Fn(u64, u64),
{
    let started = Instant::now();
    let chunk_size = chunk_size.max(1);
    let total = file.byte_size;
    let prefix = file.data_uri_prefix();

    let mut output = String::with_capacity(prefix.len() + (total as usize).div_ceil(3) * 4);
    output.push_str(&prefix);
    let mut writer = EncoderStringWriter::from_consumer(output, &STANDARD);

    let mut loaded: u64 = 0;
    match &file.bytes {
        FileBytes::Memory(bytes) => {
            for chunk in bytes.chunks(chunk_size) {
                writer
                    .write_all(chunk)
                    .map_err(|e| ConverterError::ReadFailure(format!("编码写入失败：{}", e)))?;
                loaded += chunk.len() as u64;
                on_progress(loaded.min(total), total);
                tokio::task::yield_now().await;
            }
        }
        FileBytes::Path(path) => {
            let mut reader = tokio::fs::File::open(path).await.map_err(|e| {
                ConverterError::ReadFailure(format!("无法打开文件 {}：{}", path.display(), e))
            })?;
            let mut buffer = vec![0u8; chunk_size];
            loop {
                let read = reader.read(&mut buffer).await.map_err(|e| {
                    ConverterError::ReadFailure(format!("读取文件失败 {}：{}", path.display(), e))
                })?;
                if read == 0 {
                    break;
                }
                writer
                    .write_all(&buffer[..read])
                    .map_err(|e| ConverterError::ReadFailure(format!("编码写入失败：{}", e)))?;
                loaded += read as u64;
                on_progress(loaded.min(total), total);
            }
        }
    }

    let uri = writer.into_inner();
    log::info!(
        "✅ 编码完成 - 文件: {} 类型: {} 读取: {} 字节 输出: {} 字符 read={}ms",
        file.name,
        file.media_type,
        loaded,
        uri.len(),
        started.elapsed().as_millis()
    );

    Ok(uri)
}

/// 在后台任务中编码，事件按顺序写入返回的通道。
pub fn spawn_encode(file: SourceFile, chunk_size: usize) -> mpsc::UnboundedReceiver<EncodeEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_encode_with(file, chunk_size, move |event| {
        let _ = tx.send(event);
    });
    rx
}

/// 在后台任务中编码，每个事件交给 `emit`。
pub(crate) fn spawn_encode_with<E>(file: SourceFile, chunk_size: usize, emit: E)
where
    E: Fn(EncodeEvent) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let tracker = Mutex::new(ProgressTracker::default());
        let result = encode(&file, chunk_size, |loaded, total| {
            let percent = tracker
                .lock()
                .ok()
                .and_then(|mut tracker| tracker.advance(loaded, Some(total)));
            if let Some(percent) = percent {
                emit(EncodeEvent::Progress {
                    loaded,
                    total,
                    percent,
                });
            }
        })
        .await;

        if let Err(err) = &result {
            log::error!(
                "❌ 编码失败 - 文件: {} 阶段: {} 原因: {}",
                file.name,
                err.stage(),
                err.detail().unwrap_or("unknown")
            );
        }
        emit(EncodeEvent::Finished(result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(progress_percent(0, Some(200)), Some(0));
        assert_eq!(progress_percent(1, Some(200)), Some(1));
        assert_eq!(progress_percent(1, Some(3)), Some(33));
        assert_eq!(progress_percent(2, Some(3)), Some(67));
        assert_eq!(progress_percent(500, Some(200)), Some(100));
        assert_eq!(progress_percent(10, Some(0)), None);
        assert_eq!(progress_percent(10, None), None);
    }

    #[test]
    fn tracker_never_regresses() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.advance(50, Some(100)), Some(50));
        assert_eq!(tracker.advance(40, Some(100)), None);
        assert_eq!(tracker.advance(10, None), None);
        assert_eq!(tracker.last(), 50);
        assert_eq!(tracker.advance(100, Some(100)), Some(100));
    }

    #[tokio::test]
    async fn ten_byte_png_becomes_data_uri() {
        let bytes: Vec<u8> = (0u8..10).collect();
        let file = SourceFile::from_bytes("ten.png", "image/png", bytes.clone());

        let uri = encode(&file, 4, |_, _| {}).await.expect("encode should succeed");
        let expected = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        assert_eq!(uri, expected);
        assert_eq!(uri, "data:image/png;base64,AAECAwQFBgcICQ==");
    }

    #[tokio::test]
    async fn empty_file_yields_bare_prefix() {
        let file = SourceFile::from_bytes("empty.gif", "image/gif", Vec::<u8>::new());
        let calls = Mutex::new(0u32);

        let uri = encode(&file, 1024, |_, _| *calls.lock().expect("lock") += 1)
            .await
            .expect("encode should succeed");

        assert_eq!(uri, "data:image/gif;base64,");
        assert_eq!(*calls.lock().expect("lock"), 0);
    }

    #[tokio::test]
    async fn chunk_boundaries_do_not_change_output() {
        let bytes: Vec<u8> = (0..10_007u32).map(|i| (i * 31 % 251) as u8).collect();
        let file = SourceFile::from_bytes("odd.webp", "image/webp", bytes);

        let a = encode(&file, 1, |_, _| {}).await.expect("encode");
        let b = encode(&file, 1000, |_, _| {}).await.expect("encode");
        let c = encode(&file, 1 << 20, |_, _| {}).await.expect("encode");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn progress_events_precede_finished_and_are_monotonic() {
        let bytes = vec![7u8; 300 * 1024];
        let file = SourceFile::from_bytes("big.jpg", "image/jpeg", bytes);

        let mut rx = spawn_encode(file, 64 * 1024);
        let mut percents = Vec::new();
        let mut finished = None;
        while let Some(event) = rx.recv().await {
            match event {
                EncodeEvent::Progress { loaded, total, percent } => {
                    assert!(finished.is_none(), "progress after finish");
                    assert!(loaded <= total);
                    percents.push(percent);
                }
                EncodeEvent::Finished(result) => finished = Some(result),
            }
        }

        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.iter().all(|p| *p <= 100));
        assert_eq!(percents.last(), Some(&100));
        assert!(matches!(finished, Some(Ok(_))));
    }

    #[tokio::test]
    async fn path_source_reads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [1u8, 2, 3, 4, 5]).expect("write file");

        let file = SourceFile::from_path(&path).expect("source");
        let uri = encode(&file, 2, |_, _| {}).await.expect("encode");
        assert_eq!(uri, "data:image/png;base64,AQIDBAU=");
    }

    #[tokio::test]
    async fn missing_file_is_read_failure_without_partial_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("gone.png");
        std::fs::write(&path, [1u8; 16]).expect("write file");
        let file = SourceFile::from_path(&path).expect("source");
        std::fs::remove_file(&path).expect("remove file");

        let mut rx = spawn_encode(file, 4);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            EncodeEvent::Finished(Err(ConverterError::ReadFailure(_)))
        ));
    }
}
