//! # 命令行层
//!
//! 命令行只做参数接收与结果渲染，不承载业务逻辑：
//! 文件交给 `Converter`，状态通过 `ConverterSnapshot` 输出。
//!
//! - 数据 URI 写到 stdout，便于管道使用
//! - 进度、预览信息与错误写到 stderr

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::converter::{
    Converter, ConverterConfig, ConverterSnapshot, CopyOutcome, Intake, Phase, SourceFile, SubmitOutcome,
    SystemClipboard,
};
use crate::error::AppError;

/// `--copy` 之后在 Linux 上保持剪贴板所有权的默认秒数。
pub const DEFAULT_HOLD_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "image-base64")]
#[command(author, version, about = "Convert an image into a base64 data URI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an image file into a data URI (only the first file is used)
    Convert(ConvertArgs),

    /// List supported media types and the size limit
    Formats {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// JSON config file overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Image files; extra files are ignored like a multi-file drop
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Copy the data URI to the system clipboard.
    /// On Linux (X11/Wayland) the process keeps the clipboard until another
    /// program takes it over or `--hold-secs` elapses, since the contents
    /// are lost when the owning process exits
    #[arg(long)]
    pub copy: bool,

    /// Seconds to keep clipboard ownership after `--copy` on Linux; 0 disables waiting
    #[arg(long, default_value_t = DEFAULT_HOLD_SECS)]
    pub hold_secs: u64,

    /// Print the full state snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not print progress or file details
    #[arg(long, short)]
    pub quiet: bool,

    /// JSON config file overriding the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// 执行命令，返回进程退出码。
pub async fn run(cli: Cli) -> Result<i32, AppError> {
    match cli.command {
        Commands::Convert(args) => convert(args).await,
        Commands::Formats { json, config } => {
            let config = load_config(config.as_ref())?;
            let mut stdout = std::io::stdout().lock();
            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&FormatsReport::new(&config))?)?;
            } else {
                write!(stdout, "{}", render_formats(&config))?;
            }
            Ok(0)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ConverterConfig, AppError> {
    match path {
        Some(path) => Ok(ConverterConfig::load_from_path(path)?),
        None => Ok(ConverterConfig::default()),
    }
}

async fn convert(args: ConvertArgs) -> Result<i32, AppError> {
    let config = load_config(args.config.as_ref())?;
    let hold = Duration::from_secs(args.hold_secs);
    let mut converter = Converter::new(config, Arc::new(SystemClipboard::holding(hold)))?;

    let mut sources = Vec::with_capacity(args.files.len());
    for (idx, path) in args.files.iter().enumerate() {
        match SourceFile::from_path(path) {
            Ok(source) => sources.push(source),
            Err(err) if idx == 0 => return Err(err.into()),
            Err(err) => log::warn!("忽略无法读取的文件 {}：{}", path.display(), err.detail().unwrap_or("")),
        }
    }

    let show_progress = !args.quiet && !args.json;
    let mut stderr = std::io::stderr();

    if let Some(SubmitOutcome::Accepted) = converter.submit(Intake::Drop(sources)) {
        let mut last_percent = None;
        while converter.state().job.as_ref().is_some_and(|job| job.is_loading()) {
            converter.process_next_event().await;
            let percent = converter.state().progress_percent();
            if show_progress && last_percent != Some(percent) {
                write!(stderr, "\r{}", render_progress(percent))?;
                last_percent = Some(percent);
            }
        }
        if show_progress && last_percent.is_some() {
            writeln!(stderr)?;
        }
    }

    // 先输出结果，复制在 Linux 上可能阻塞到剪贴板被接管
    if !args.json {
        let snapshot = converter.snapshot();
        if !args.quiet {
            write!(stderr, "{}", render_summary(&snapshot))?;
        }
        if let Some(error) = &snapshot.error_message {
            writeln!(stderr, "Error: {}", error)?;
        }
        if let Some(uri) = &snapshot.data_uri {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", uri)?;
            stdout.flush()?;
        }
    }

    if args.copy && converter.state().phase() == Phase::Ready {
        if show_progress && cfg!(target_os = "linux") && args.hold_secs > 0 {
            writeln!(stderr, "{}", render_copy_hint(args.hold_secs))?;
        }
        match converter.copy_to_clipboard().await {
            CopyOutcome::Copied if show_progress => writeln!(stderr, "Copied to Clipboard")?,
            CopyOutcome::Copied => {}
            CopyOutcome::Failed if !args.json => {
                if let Some(error) = &converter.state().error_message {
                    writeln!(stderr, "Error: {}", error)?;
                }
            }
            other => log::debug!("复制未执行：{:?}", other),
        }
    }

    let snapshot = converter.snapshot();
    if args.json {
        writeln!(std::io::stdout().lock(), "{}", serde_json::to_string_pretty(&snapshot)?)?;
    }

    converter.shutdown();
    Ok(exit_code_for(&snapshot))
}

/// 复制时的提示：剪贴板保持到被其他程序接管或超时。
pub fn render_copy_hint(hold_secs: u64) -> String {
    format!(
        "Holding clipboard for up to {}s or until another program takes it over; paste it now",
        hold_secs
    )
}

/// 进度行，例如 `Converting... 42%`。
pub fn render_progress(percent: u8) -> String {
    format!("Converting... {}%", percent)
}

/// 预览卡片信息。
pub fn render_summary(snapshot: &ConverterSnapshot) -> String {
    let Some(preview) = &snapshot.preview else {
        return String::new();
    };

    let mut out = String::new();
    out.push_str(&format!("File name: {}\n", preview.name));
    out.push_str(&format!("File size: {}\n", preview.size_label));
    out.push_str(&format!("File type: {}\n", preview.media_type));
    if let Some((width, height)) = preview.dimensions {
        out.push_str(&format!("Dimensions: {}x{}\n", width, height));
    }
    if snapshot.data_uri.is_none() && snapshot.loading {
        out.push_str("Waiting for conversion to complete...\n");
    }
    out
}

/// 成功为 0，其余为 1。
pub fn exit_code_for(snapshot: &ConverterSnapshot) -> i32 {
    match snapshot.phase {
        Phase::Ready if snapshot.error_message.is_none() => 0,
        _ => 1,
    }
}

#[derive(Debug, Serialize)]
pub struct FormatsReport {
    pub supported_formats: Vec<String>,
    pub max_file_size: u64,
    pub accept: String,
}

impl FormatsReport {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            supported_formats: config.supported_formats.clone(),
            max_file_size: config.max_file_size,
            accept: config.accept_hint(),
        }
    }
}

pub fn render_formats(config: &ConverterConfig) -> String {
    let mut out = String::new();
    for format in &config.supported_formats {
        out.push_str(format);
        out.push('\n');
    }
    out.push_str(&format!(
        "Supports {} (max {}MB)\n",
        config.accepted_formats_label(),
        config.max_file_size_mb()
    ));
    out
}
