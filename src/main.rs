//! # 图片转 Data URI 工具：命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与运行时启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use clap::Parser;
use image_base64::cli::{self, Cli};

// 单线程运行时：状态只在主任务上变更，后台任务通过通道回传事件
#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let code = match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            log::error!("命令执行失败: {err}");
            eprintln!("Error: {err}");
            err.exit_code()
        }
    };

    std::process::exit(code);
}
