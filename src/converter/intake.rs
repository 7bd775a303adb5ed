//! # 文件接收模块
//!
//! 拖放与文件选择两种入口都只取第一个文件，其余文件直接忽略（不排队）。
//! `FilePicker` 模拟隐藏的 `<input type=file>`：同一文件重复选择不会再次触发，
//! 直到 `reset` 清空选择。

use super::SourceFile;

/// 文件来源。
#[derive(Debug, Clone)]
pub enum Intake {
    /// 拖放事件携带的文件集合。
    Drop(Vec<SourceFile>),
    /// 文件选择框的选择结果。
    Picker(Vec<SourceFile>),
}

impl Intake {
    /// 取出第一个文件。
    pub fn into_first(self) -> Option<SourceFile> {
        let (origin, files) = match self {
            Self::Drop(files) => ("drop", files),
            Self::Picker(files) => ("picker", files),
        };

        if files.len() > 1 {
            log::warn!(
                "⚠️ {} 收到 {} 个文件，仅处理第一个：{}",
                origin,
                files.len(),
                files[0].name
            );
        }

        files.into_iter().next()
    }
}

/// 文件选择框状态。
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    accept: String,
    selected: Option<SourceFile>,
}

impl FilePicker {
    pub fn new(accept: impl Into<String>) -> Self {
        Self {
            accept: accept.into(),
            selected: None,
        }
    }

    /// `accept` 提示，仅作界面层过滤，不构成校验。
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// 选择文件；与上次选择相同则视为未变化，返回 `None`。
    pub fn select(&mut self, files: Vec<SourceFile>) -> Option<Intake> {
        let first = files.first()?;
        if self.selected.as_ref() == Some(first) {
            log::debug!("选择未变化，忽略：{}", first.name);
            return None;
        }

        self.selected = Some(first.clone());
        Some(Intake::Picker(files))
    }

    /// 清空选择，使同一文件可立即再次选择。
    pub fn reset(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&SourceFile> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> SourceFile {
        SourceFile::from_bytes(name, "image/png", vec![0u8; 4])
    }

    #[test]
    fn drop_takes_first_file_only() {
        let intake = Intake::Drop(vec![png("a.png"), png("b.png"), png("c.png")]);
        let first = intake.into_first().expect("first file");
        assert_eq!(first.name, "a.png");
    }

    #[test]
    fn empty_selection_yields_nothing() {
        assert!(Intake::Picker(Vec::new()).into_first().is_none());
        let mut picker = FilePicker::new("image/png");
        assert!(picker.select(Vec::new()).is_none());
    }

    #[test]
    fn same_file_requires_reset_before_reselect() {
        let mut picker = FilePicker::new("image/png");
        assert!(picker.select(vec![png("a.png")]).is_some());
        assert!(picker.select(vec![png("a.png")]).is_none());

        picker.reset();
        assert!(picker.selected().is_none());
        assert!(picker.select(vec![png("a.png")]).is_some());
    }
}
