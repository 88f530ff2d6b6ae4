//! Document Context - Entities

use serde::{Deserialize, Serialize};

use crate::domain::settings::MarginFraction;

/// 页面上的一段文本（带位置信息）
///
/// 坐标以页面左上角为原点，单位与页面宽高一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// 单页内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub width: f64,
    pub height: f64,
    /// 按阅读顺序排列的文本段
    pub runs: Vec<TextRun>,
}

impl PageContent {
    pub fn new(width: f64, height: f64, runs: Vec<TextRun>) -> Self {
        Self {
            width,
            height,
            runs,
        }
    }

    /// 判断文本段是否位于边距之内（边界包含在内）
    pub fn is_within_margins(&self, run: &TextRun, margin: MarginFraction) -> bool {
        let m = margin.value();
        let (min_x, max_x) = (self.width * m, self.width * (1.0 - m));
        let (min_y, max_y) = (self.height * m, self.height * (1.0 - m));
        run.x >= min_x && run.x <= max_x && run.y >= min_y && run.y <= max_y
    }

    /// 去除边距区域后的页面文本
    ///
    /// 保留的文本段以单个空格连接，并压缩连续空白
    pub fn retained_text(&self, margin: MarginFraction) -> String {
        let joined = self
            .runs
            .iter()
            .filter(|run| self.is_within_margins(run, margin))
            .map(|run| run.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// 待合成的文本块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 本次导出内连续编号（从 0 开始）
    pub sequence_index: usize,
    /// 来源页码（从 0 开始）
    pub page_index: usize,
    /// 非空文本
    pub text: String,
}
