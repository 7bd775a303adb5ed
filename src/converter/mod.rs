//! # 图片转换模块（converter）
//!
//! ## 设计思路
//!
//! 将“接收文件 → 校验 → 编码 → 展示/复制”按职责拆分为多个子模块，
//! 由 `presenter` 中的 `Converter` 统一编排并独占状态。
//!
//! - `intake`：拖放 / 文件选择入口，只取第一个文件
//! - `validator`：媒体类型与体积校验（纯函数）
//! - `encoder`：分块读取 + 流式 base64 编码 + 进度上报
//! - `preview`：预览句柄（RAII 释放）与预览信息
//! - `clipboard`：剪贴板写入抽象与 arboard 实现
//! - `state`：可观察状态、阶段推导与快照
//! - `presenter`：状态机、代际计数器、“已复制”计时器
//! - `config/error/source`：配置、错误、数据源模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! CLI / 调用方
//!    ↓
//! presenter.rs（submit_file / copy_to_clipboard / clear）
//!    ├─ intake.rs（第一个文件）
//!    ├─ validator.rs（类型 → 体积）
//!    ├─ preview.rs（创建预览句柄）
//!    └─ encoder.rs（后台任务，事件带代际回传）
//!    ↓
//! state.rs（ConverterState → ConverterSnapshot）
//! ```

mod clipboard;
mod config;
mod encoder;
mod error;
mod intake;
mod preview;
mod presenter;
mod source;
mod state;
mod validator;

pub use clipboard::{ClipboardWriter, SystemClipboard};
pub use config::{
    ConverterConfig, COPIED_RESET_DELAY, DEFAULT_READ_CHUNK_SIZE, MAX_FILE_SIZE, SUPPORTED_FORMATS,
};
pub use encoder::{encode, progress_percent, spawn_encode, EncodeEvent, ProgressTracker};
pub use error::ConverterError;
pub use intake::{FilePicker, Intake};
pub use preview::{format_kilobytes, PreviewHandle, PreviewInfo, PreviewRegistry};
pub use presenter::{Converter, ConverterEvent, CopyOutcome, SubmitOutcome};
pub use source::{declared_media_type, FileBytes, SourceFile};
pub use state::{ConverterSnapshot, ConverterState, EncodingJob, Phase};
pub use validator::{validate, validate_file, RejectReason, ValidationResult};
