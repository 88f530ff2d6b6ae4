//! 文本分割器
//!
//! 将页面文本切分为适合单次合成的句子块：
//! 短句合并到最小字符数，超长句按词边界拆分到最大字符数

/// 默认最小字符数
/// 片段未达到此长度时，弱分隔符不触发分割，短句会与后续内容合并
pub const DEFAULT_MIN_CHARS: usize = 20;

/// 默认最大字符数（单次合成请求的文本上限）
pub const DEFAULT_MAX_CHARS: usize = 480;

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 最小字符数限制（用于合并短句）
    pub min_chars: usize,
    /// 最大字符数限制（超过则按词拆分）
    pub max_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// 强分隔符（句末标点）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!')
}

/// 弱分隔符（达到最小字符数时才分割）
#[inline]
fn is_weak_delimiter(ch: char) -> bool {
    matches!(ch, '，' | '；' | '：' | ',' | ';' | ':')
}

/// 句末可以跟随的收尾字符（引号、括号）
#[inline]
fn is_closing_mark(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | '」' | '』' | '）')
}

/// 片段是否只包含引号或空白
#[inline]
fn is_trivial_segment(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(c, '"' | '\u{201C}' | '\u{201D}' | '\'' | '\u{2018}' | '\u{2019}') || c.is_whitespace()
    })
}

fn push_trimmed(segments: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
    current.clear();
}

/// 按分隔符分割（不做合并）
///
/// ASCII 句点只有在后面是空白或文本末尾时才视为句末，避免拆开 "3.14" 之类的内容
fn split_by_delimiters(text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut char_count = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        char_count += 1;

        let should_split = if is_strong_delimiter(ch) {
            // 吸收紧随其后的引号/括号
            while let Some(&next) = chars.peek() {
                if !is_closing_mark(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            ch != '.' || chars.peek().map_or(true, |c| c.is_whitespace())
        } else {
            is_weak_delimiter(ch) && char_count >= config.min_chars
        };

        if should_split {
            push_trimmed(&mut segments, &mut current);
            char_count = 0;
        }
    }

    push_trimmed(&mut segments, &mut current);
    segments
}

/// 合并短片段直到满足 min_chars
fn merge_until_min_chars(segments: Vec<String>, min_chars: usize) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for seg in segments {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&seg);

        if buffer.chars().count() >= min_chars {
            result.push(std::mem::take(&mut buffer));
        }
    }

    // 剩余内容合并到前一个片段
    if !buffer.is_empty() {
        match result.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(&buffer);
            }
            None => result.push(buffer),
        }
    }

    result
}

/// 超长片段按词边界拆分；没有空白可用时按字符硬切
fn split_overlong(segment: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || segment.chars().count() <= max_chars {
        return vec![segment.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in segment.split_whitespace() {
        let word_chars = word.chars().count();

        if word_chars > max_chars {
            push_trimmed(&mut out, &mut current);
            current_chars = 0;
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                out.push(piece.iter().collect());
            }
            continue;
        }

        let sep = usize::from(!current.is_empty());
        if current_chars + sep + word_chars > max_chars {
            push_trimmed(&mut out, &mut current);
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }

    push_trimmed(&mut out, &mut current);
    out
}

/// 对文本进行分段
///
/// 分段策略：
/// 1. 按行分割，跨行不合并
/// 2. 每行按标点分割，行内合并短句
/// 3. 只有引号的片段并入前一个片段
/// 4. 超长片段拆分到 max_chars 以内
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|s| !s.is_empty()) {
        let sentences = merge_until_min_chars(split_by_delimiters(line, config), config.min_chars);
        for sentence in sentences {
            let trimmed = sentence.trim();
            if trimmed.is_empty() {
                continue;
            }

            if is_trivial_segment(trimmed) {
                if let Some(last) = segments.last_mut() {
                    last.push_str(trimmed);
                }
                continue;
            }

            segments.extend(split_overlong(trimmed, config.max_chars));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_chars: usize, max_chars: usize) -> SegmentConfig {
        SegmentConfig {
            min_chars,
            max_chars,
        }
    }

    #[test]
    fn test_splits_on_sentence_end() {
        let segments = segment_text(
            "The night was cold and still. Nobody walked the streets that evening.",
            &config(10, 480),
        );
        assert_eq!(
            segments,
            vec![
                "The night was cold and still.",
                "Nobody walked the streets that evening."
            ]
        );
    }

    #[test]
    fn test_decimal_point_does_not_split() {
        let segments = segment_text("Pi is roughly 3.14 in most cases.", &config(5, 480));
        assert_eq!(segments, vec!["Pi is roughly 3.14 in most cases."]);
    }

    #[test]
    fn test_short_sentences_merged() {
        let segments = segment_text("Yes. No. Maybe so, who knows.", &config(20, 480));
        assert_eq!(segments, vec!["Yes. No. Maybe so, who knows."]);
    }

    #[test]
    fn test_weak_delimiter_respects_min_chars() {
        let segments = segment_text("所以，如今想要讨还回去吧，苦涩的一笑。", &config(20, 480));
        assert_eq!(segments, vec!["所以，如今想要讨还回去吧，苦涩的一笑。"]);
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let segments = segment_text(
            "\"Run while you still can!\" she shouted across the field.",
            &config(10, 480),
        );
        assert_eq!(segments[0], "\"Run while you still can!\"");
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_lines_not_merged() {
        let segments = segment_text("First line.\nSecond line.", &config(50, 480));
        assert_eq!(segments, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_overlong_sentence_split_at_words() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let segments = segment_text(text, &config(1, 16));
        assert!(segments.iter().all(|s| s.chars().count() <= 16));
        assert_eq!(segments.join(" "), text);
    }

    #[test]
    fn test_overlong_word_is_hard_split() {
        let segments = split_overlong("abcdefghij", 4);
        assert_eq!(segments, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(segment_text("   \n\t ", &SegmentConfig::default()).is_empty());
    }

    #[test]
    fn test_trivial_segment_detection() {
        assert!(is_trivial_segment("\""));
        assert!(is_trivial_segment("\u{201D} "));
        assert!(!is_trivial_segment("text"));
    }
}
