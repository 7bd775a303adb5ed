//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 通过 `ClipboardWriter` trait 隔离系统剪贴板，测试可注入模拟实现。
//! 写入是阻塞调用，由调用方放到 `spawn_blocking` 中执行，避免阻塞 async 运行时。
//!
//! ## 实现思路
//!
//! `SystemClipboard` 基于 `arboard`，首次写入时才创建剪贴板实例并缓存。
//! X11 / Wayland 下剪贴板内容由写入进程持有，进程退出即丢失；
//! 短生命周期的调用方（如命令行）使用 `SystemClipboard::holding`，
//! 写入后阻塞到其他程序接管剪贴板或超时为止。

use std::sync::Mutex;
use std::time::Duration;

/// 剪贴板文本写入能力。
pub trait ClipboardWriter: Send + Sync {
    /// 写入纯文本；失败时返回底层原因。
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// 系统剪贴板。
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Mutex<Option<arboard::Clipboard>>,
    hold: Option<Duration>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入后最多保持剪贴板所有权 `hold`，期间其他程序可粘贴；`Duration::ZERO` 表示不等待。
    ///
    /// 仅在 Linux 上生效，其他平台的剪贴板内容本就独立于进程存活。
    pub fn holding(hold: Duration) -> Self {
        Self {
            clipboard: Mutex::new(None),
            hold: (!hold.is_zero()).then_some(hold),
        }
    }

    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }
}

fn set_text(clipboard: &mut arboard::Clipboard, text: &str, hold: Option<Duration>) -> Result<(), arboard::Error> {
    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;

        if let Some(hold) = hold {
            log::info!("⏳ 保持剪贴板所有权，最长 {} 秒", hold.as_secs());
            return clipboard
                .set()
                .wait_until(std::time::Instant::now() + hold)
                .text(text.to_owned());
        }
    }

    #[cfg(not(target_os = "linux"))]
    let _ = hold;

    clipboard.set_text(text.to_owned())
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut guard = self
            .clipboard
            .lock()
            .map_err(|_| "剪贴板锁已中毒".to_string())?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| format!("无法访问剪贴板：{}", e))?;
            *guard = Some(clipboard);
        }

        let clipboard = guard
            .as_mut()
            .ok_or_else(|| "剪贴板未初始化".to_string())?;

        if let Err(e) = set_text(clipboard, text, self.hold) {
            // 失败后丢弃实例，下次重新创建
            *guard = None;
            return Err(format!("复制失败：{}", e));
        }

        Ok(())
    }
}
