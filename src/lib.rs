//! # 图片转 Data URI 工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  命令行 (clap)                            │
//! │   convert <FILES>... [--copy] [--json]   formats          │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<i32, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            转换核心                               │
//! │                                                          │
//! │  ┌─ error ────── AppError (应用边界错误)                  │
//! │  │                                                       │
//! │  └─ converter ── Converter (状态机 + 代际计数器)          │
//! │      ├─ intake / validator   接收与校验                   │
//! │      ├─ encoder              分块读取 + 流式 base64       │
//! │      ├─ preview              预览句柄 (RAII)              │
//! │      └─ clipboard            arboard 剪贴板写入           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，命令行层的返回类型 |
//! | [`converter`] | 文件接收、校验、编码、预览、复制与状态管理 |
//! | [`cli`] | 参数定义、进度与结果渲染 |

pub mod cli;
pub mod converter;
pub mod error;
