//! Audiobook Context - Entities

/// 单个文本块合成后的音频片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    pub sequence_index: usize,
    pub bytes: Vec<u8>,
}

impl AudioFragment {
    pub fn new(sequence_index: usize, bytes: Vec<u8>) -> Self {
        Self {
            sequence_index,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 一次导出任务的进度计数
///
/// 只在导出循环内部修改，调用结束即丢弃
#[derive(Debug, Clone, Default)]
pub struct ExportJob {
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub cancelled: bool,
}

impl ExportJob {
    pub fn new(total_chunks: usize) -> Self {
        Self {
            total_chunks,
            completed_chunks: 0,
            cancelled: false,
        }
    }

    /// 记录一个完成的片段，返回当前百分比
    pub fn complete_one(&mut self) -> f64 {
        self.completed_chunks = (self.completed_chunks + 1).min(self.total_chunks);
        self.percent()
    }

    /// 完成百分比（0..=100），空任务视为 100
    pub fn percent(&self) -> f64 {
        if self.total_chunks == 0 {
            return 100.0;
        }
        self.completed_chunks as f64 / self.total_chunks as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed_chunks == self.total_chunks
    }
}

/// 按 sequence_index 顺序拼接片段
///
/// 片段可以任意顺序到达，这里按槽位重排
#[derive(Debug)]
pub struct FragmentAssembler {
    slots: Vec<Option<Vec<u8>>>,
}

impl FragmentAssembler {
    pub fn new(total: usize) -> Self {
        Self {
            slots: vec![None; total],
        }
    }

    /// 放入一个片段；索引越界或重复时返回 false
    pub fn insert(&mut self, fragment: AudioFragment) -> bool {
        match self.slots.get_mut(fragment.sequence_index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(fragment.bytes);
                true
            }
            _ => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// 拼接为单个缓冲区；存在空槽时返回 None
    pub fn assemble(self) -> Option<Vec<u8>> {
        let total_len = self
            .slots
            .iter()
            .map(|s| s.as_ref().map(Vec::len))
            .sum::<Option<usize>>()?;

        let mut buffer = Vec::with_capacity(total_len);
        for slot in self.slots {
            buffer.extend(slot?);
        }
        Some(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let mut job = ExportJob::new(3);
        assert_eq!(job.percent(), 0.0);
        job.complete_one();
        job.complete_one();
        assert!(!job.is_complete());
        assert_eq!(job.complete_one(), 100.0);
        assert!(job.is_complete());
    }

    #[test]
    fn test_empty_job_is_complete() {
        let job = ExportJob::new(0);
        assert!(job.is_complete());
        assert_eq!(job.percent(), 100.0);
    }

    #[test]
    fn test_assembler_reorders() {
        let mut assembler = FragmentAssembler::new(3);
        assert!(assembler.insert(AudioFragment::new(2, vec![3])));
        assert!(assembler.insert(AudioFragment::new(0, vec![1])));
        assert!(!assembler.is_complete());
        assert!(assembler.insert(AudioFragment::new(1, vec![2, 2])));
        assert_eq!(assembler.assemble(), Some(vec![1, 2, 2, 3]));
    }

    #[test]
    fn test_assembler_rejects_duplicates_and_out_of_range() {
        let mut assembler = FragmentAssembler::new(1);
        assert!(assembler.insert(AudioFragment::new(0, vec![1])));
        assert!(!assembler.insert(AudioFragment::new(0, vec![9])));
        assert!(!assembler.insert(AudioFragment::new(5, vec![9])));
    }

    #[test]
    fn test_assembler_with_gap_yields_none() {
        let mut assembler = FragmentAssembler::new(2);
        assembler.insert(AudioFragment::new(1, vec![1]));
        assert_eq!(assembler.assemble(), None);
    }
}
