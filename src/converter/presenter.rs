//! # 状态机与编排模块
//!
//! ## 设计思路
//!
//! `Converter` 独占 `ConverterState`，所有状态变更都发生在持有 `&mut self` 的调用方线程上。
//! 后台任务（编码、“已复制”计时器）从不直接改状态，只向内部通道投递事件，
//! 由 `process_next_event` / `pump_pending` / `settle` 按顺序应用。
//!
//! ## 实现思路
//!
//! - 每次提交文件（包括被拒绝的提交）或清空都会递增代际计数器；编码事件携带启动时的代际，
//!   不匹配即丢弃，旧任务的结果不会覆盖新文件的状态。
//! - 计时器事件携带令牌，重新计时或清空后旧令牌失效，同时中止旧计时任务。
//! - 剪贴板写入放在 `spawn_blocking` 中执行。
//!
//! ```text
//! submit_file ──validate──┬─ Rejected ─→ error_message
//!                         └─ Accepted ─→ preview + spawn_encode(generation)
//!                                              │ ConverterEvent::Encode
//!                                              ↓
//!                              process_next_event（代际检查）→ Ready / Failed
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::encoder::spawn_encode_with;
use super::validator::validate_file;
use super::{
    ClipboardWriter, ConverterConfig, ConverterError, ConverterSnapshot, ConverterState, EncodeEvent,
    EncodingJob, FilePicker, Intake, PreviewRegistry, RejectReason, SourceFile, ValidationResult,
};

/// 后台任务投递给转换器的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterEvent {
    Encode { generation: u64, event: EncodeEvent },
    CopiedExpired { token: u64 },
}

/// 提交文件的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(RejectReason),
}

/// 复制操作的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// “已复制”提示期间按钮禁用。
    Disabled,
    NothingToCopy,
    Failed,
}

/// 图片转 Data URI 转换器。
pub struct Converter {
    config: ConverterConfig,
    state: ConverterState,
    generation: u64,
    copied_token: u64,
    copied_timer: Option<JoinHandle<()>>,
    previews: PreviewRegistry,
    picker: FilePicker,
    clipboard: Arc<dyn ClipboardWriter>,
    events_tx: mpsc::UnboundedSender<ConverterEvent>,
    events_rx: mpsc::UnboundedReceiver<ConverterEvent>,
}

impl Converter {
    /// 使用指定剪贴板实现创建转换器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use image_base64::converter::{Converter, ConverterConfig, SourceFile, SystemClipboard};
    ///
    /// # async fn demo() -> Result<(), image_base64::converter::ConverterError> {
    /// let mut converter = Converter::new(ConverterConfig::default(), Arc::new(SystemClipboard::new()))?;
    /// converter.submit_file(SourceFile::from_bytes("a.png", "image/png", vec![1u8, 2, 3]));
    /// converter.settle().await;
    /// assert_eq!(converter.state().result(), Some("data:image/png;base64,AQID"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ConverterConfig, clipboard: Arc<dyn ClipboardWriter>) -> Result<Self, ConverterError> {
        config.validate()?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let picker = FilePicker::new(config.accept_hint());

        Ok(Self {
            config,
            state: ConverterState::default(),
            generation: 0,
            copied_token: 0,
            copied_timer: None,
            previews: PreviewRegistry::new(),
            picker,
            clipboard,
            events_tx,
            events_rx,
        })
    }

    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    pub fn snapshot(&self) -> ConverterSnapshot {
        self.state.snapshot()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn picker(&self) -> &FilePicker {
        &self.picker
    }

    /// 当前代际。
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 拖放或选择框入口：只处理第一个文件。
    pub fn submit(&mut self, intake: Intake) -> Option<SubmitOutcome> {
        let file = intake.into_first()?;
        Some(self.submit_file(file))
    }

    /// 通过文件选择框选择；选择未变化时不触发。
    pub fn pick(&mut self, files: Vec<SourceFile>) -> Option<SubmitOutcome> {
        let intake = self.picker.select(files)?;
        self.submit(intake)
    }

    /// 提交文件：重置错误/结果/复制提示，校验通过后创建预览并启动编码。
    ///
    /// 需要在 tokio 运行时内调用。
    pub fn submit_file(&mut self, file: SourceFile) -> SubmitOutcome {
        self.state.error_message = None;
        if let Some(job) = self.state.job.as_mut() {
            job.result = None;
        }
        self.reset_copied();

        if let ValidationResult::Rejected(reason) = validate_file(&file, &self.config) {
            let err = reason.to_error(&file, &self.config);
            log::warn!(
                "🚫 文件被拒绝 - 名称: {} 类型: {} 大小: {} 字节 原因: {}",
                file.name,
                file.media_type,
                file.byte_size,
                err.code()
            );
            // 新的提交即放弃旧任务：旧文件与预览保留，但其结果不再写回
            self.generation += 1;
            if let Some(job) = self.state.job.as_mut() {
                job.finished = true;
                job.failed = false;
            }
            self.state.error_message = Some(err.to_string());
            return SubmitOutcome::Rejected(reason);
        }

        self.generation += 1;
        let generation = self.generation;
        log::info!(
            "📥 开始转换 - 名称: {} 类型: {} 大小: {} 字节 generation={}",
            file.name,
            file.media_type,
            file.byte_size,
            generation
        );

        // 旧预览在此处被替换并释放
        self.state.preview = Some(self.previews.create(&file));
        self.state.current_file = Some(file.clone());
        self.state.job = Some(EncodingJob::default());

        let tx = self.events_tx.clone();
        spawn_encode_with(file, self.config.read_chunk_size, move |event| {
            let _ = tx.send(ConverterEvent::Encode { generation, event });
        });

        SubmitOutcome::Accepted
    }

    /// 应用一个事件；过期事件返回 `false`。
    pub fn apply(&mut self, event: ConverterEvent) -> bool {
        match event {
            ConverterEvent::Encode { generation, event } => self.apply_encode_event(generation, event),
            ConverterEvent::CopiedExpired { token } => {
                if token != self.copied_token {
                    log::debug!("丢弃过期的复制提示计时事件 token={}", token);
                    return false;
                }
                self.state.copied = false;
                self.copied_timer = None;
                true
            }
        }
    }

    fn apply_encode_event(&mut self, generation: u64, event: EncodeEvent) -> bool {
        if generation != self.generation {
            log::debug!(
                "⏭️ 丢弃过期编码事件 generation={} current={}",
                generation,
                self.generation
            );
            return false;
        }

        let Some(job) = self.state.job.as_mut() else {
            return false;
        };

        match event {
            EncodeEvent::Progress { percent, .. } => {
                job.progress_percent = job.progress_percent.max(percent);
            }
            EncodeEvent::Finished(Ok(uri)) => {
                job.result = Some(uri);
                job.progress_percent = 100;
                job.finished = true;
            }
            EncodeEvent::Finished(Err(err)) => {
                job.failed = true;
                job.finished = true;
                self.state.error_message = Some(err.to_string());
            }
        }

        true
    }

    /// 等待并应用下一个事件。
    pub async fn process_next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    /// 应用所有已到达的事件，不等待；返回处理的事件数。
    pub fn pump_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            processed += 1;
        }
        processed
    }

    /// 等待当前编码任务结束。
    pub async fn settle(&mut self) {
        while self.state.job.as_ref().is_some_and(EncodingJob::is_loading) {
            self.process_next_event().await;
        }
    }

    /// 等待“已复制”提示自动恢复。
    pub async fn wait_copied_reset(&mut self) {
        while self.state.copied {
            self.process_next_event().await;
        }
    }

    /// 复制 Data URI 到剪贴板。
    pub async fn copy_to_clipboard(&mut self) -> CopyOutcome {
        let Some(uri) = self.state.result().map(str::to_owned) else {
            return CopyOutcome::NothingToCopy;
        };
        if self.state.copied {
            return CopyOutcome::Disabled;
        }

        let clipboard = Arc::clone(&self.clipboard);
        let length = uri.len();
        let written = tokio::task::spawn_blocking(move || clipboard.write_text(&uri))
            .await
            .map_err(|e| format!("线程执行失败：{}", e))
            .and_then(|result| result);

        match written {
            Ok(()) => {
                log::info!("📋 已复制到剪贴板 - {} 字符", length);
                self.state.copied = true;
                self.schedule_copied_reset();
                CopyOutcome::Copied
            }
            Err(detail) => {
                let err = ConverterError::ClipboardFailure(detail);
                log::error!("❌ {} 失败：{}", err.stage(), err.detail().unwrap_or("unknown"));
                self.state.error_message = Some(err.to_string());
                self.state.copied = false;
                CopyOutcome::Failed
            }
        }
    }

    /// 清空全部状态并释放预览；进行中的编码结果将被忽略。
    pub fn clear(&mut self) {
        self.generation += 1;
        self.reset_copied();
        self.state = ConverterState::default();
        self.picker.reset();
        log::info!("🧹 已清空转换器状态 generation={}", self.generation);
    }

    /// 组件卸载：与清空相同，并丢弃尚未处理的事件。
    pub fn shutdown(&mut self) {
        self.clear();
        let dropped = self.pump_pending();
        log::debug!("转换器关闭，丢弃 {} 个待处理事件", dropped);
    }

    fn schedule_copied_reset(&mut self) {
        self.cancel_copied_timer();
        self.copied_token += 1;
        let token = self.copied_token;
        let delay = self.config.copied_reset_delay();
        let tx = self.events_tx.clone();

        self.copied_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ConverterEvent::CopiedExpired { token });
        }));
    }

    fn reset_copied(&mut self) {
        self.state.copied = false;
        self.copied_token += 1;
        self.cancel_copied_timer();
    }

    fn cancel_copied_timer(&mut self) {
        if let Some(timer) = self.copied_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Converter {
    fn drop(&mut self) {
        self.cancel_copied_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
    }

    impl ClipboardWriter for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), String> {
            self.writes.lock().expect("lock").push(text.to_owned());
            Ok(())
        }
    }

    fn converter() -> Converter {
        Converter::new(ConverterConfig::default(), Arc::new(RecordingClipboard::default()))
            .expect("converter init failed")
    }

    #[tokio::test]
    async fn stale_encode_event_is_ignored() {
        let mut converter = converter();
        converter.submit_file(SourceFile::from_bytes("a.png", "image/png", vec![1u8; 8]));
        let stale_generation = converter.generation();
        converter.submit_file(SourceFile::from_bytes("b.png", "image/png", vec![2u8; 8]));

        let applied = converter.apply(ConverterEvent::Encode {
            generation: stale_generation,
            event: EncodeEvent::Finished(Ok("data:image/png;base64,stale".into())),
        });
        assert!(!applied);
        assert_eq!(converter.state().result(), None);
    }

    #[tokio::test]
    async fn progress_never_moves_backwards() {
        let mut converter = converter();
        converter.submit_file(SourceFile::from_bytes("a.png", "image/png", vec![1u8; 8]));
        let generation = converter.generation();

        for percent in [10u8, 60, 40] {
            converter.apply(ConverterEvent::Encode {
                generation,
                event: EncodeEvent::Progress {
                    loaded: 0,
                    total: 8,
                    percent,
                },
            });
        }
        assert_eq!(converter.state().progress_percent(), 60);
    }

    #[tokio::test]
    async fn stale_timer_token_is_ignored() {
        let mut converter = converter();
        converter.state.copied = true;
        converter.copied_token = 5;

        assert!(!converter.apply(ConverterEvent::CopiedExpired { token: 4 }));
        assert!(converter.state().copied);
        assert!(converter.apply(ConverterEvent::CopiedExpired { token: 5 }));
        assert!(!converter.state().copied);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ConverterConfig {
            max_file_size: 0,
            ..ConverterConfig::default()
        };
        let result = Converter::new(config, Arc::new(RecordingClipboard::default()));
        assert!(matches!(result, Err(ConverterError::InvalidConfig(_))));
    }
}
