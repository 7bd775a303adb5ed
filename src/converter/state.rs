//! # 状态模型
//!
//! `ConverterState` 是对外可观察的聚合状态；`Phase` 由状态推导而来，不单独存储。
//! 代际计数器不属于可观察状态，由 `Converter` 持有。

use serde::Serialize;

use super::{PreviewHandle, PreviewInfo, SourceFile};

/// 一次编码任务。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingJob {
    /// 0~100，同一任务内单调不减。
    pub progress_percent: u8,
    /// 成功时的完整 Data URI。
    pub result: Option<String>,
    pub failed: bool,
    pub finished: bool,
}

impl EncodingJob {
    pub fn is_loading(&self) -> bool {
        !self.finished
    }
}

/// 状态机阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Empty,
    Encoding,
    Ready,
    Failed,
    Rejected,
}

/// 转换器状态。
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConverterState {
    pub current_file: Option<SourceFile>,
    pub preview: Option<PreviewHandle>,
    pub job: Option<EncodingJob>,
    pub error_message: Option<String>,
    pub copied: bool,
}

impl ConverterState {
    pub fn phase(&self) -> Phase {
        if let Some(job) = &self.job {
            if job.result.is_some() {
                return Phase::Ready;
            }
            if job.failed {
                return Phase::Failed;
            }
            if job.is_loading() {
                return Phase::Encoding;
            }
        }

        if self.error_message.is_some() {
            Phase::Rejected
        } else {
            Phase::Empty
        }
    }

    pub fn result(&self) -> Option<&str> {
        self.job.as_ref().and_then(|job| job.result.as_deref())
    }

    pub fn progress_percent(&self) -> u8 {
        self.job.as_ref().map(|job| job.progress_percent).unwrap_or(0)
    }

    /// 复制按钮是否可用。
    pub fn can_copy(&self) -> bool {
        self.result().is_some() && !self.copied
    }

    pub fn snapshot(&self) -> ConverterSnapshot {
        let preview = match (&self.current_file, &self.preview) {
            (Some(file), Some(handle)) => Some(PreviewInfo::new(file, handle)),
            _ => None,
        };

        ConverterSnapshot {
            phase: self.phase(),
            preview,
            loading: self.job.as_ref().is_some_and(EncodingJob::is_loading),
            progress_percent: self.progress_percent(),
            data_uri: self.result().map(str::to_owned),
            error_message: self.error_message.clone(),
            copied: self.copied,
        }
    }
}

/// 可序列化的状态快照，供 CLI 渲染。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterSnapshot {
    pub phase: Phase,
    pub preview: Option<PreviewInfo>,
    pub loading: bool,
    pub progress_percent: u8,
    pub data_uri: Option<String>,
    pub error_message: Option<String>,
    pub copied: bool,
}
