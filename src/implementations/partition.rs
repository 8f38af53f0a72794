use std::mem;
use std::ops::Range;

/// ワーカー1つが担当する連続した行範囲 `[start, end)`。
/// スレッド起動前に一度だけ作り、各ワーカーに値渡しする。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// `n` 行を `workers` 個の連続区間にできるだけ均等に分割する。
/// 先頭の `n % workers` 個のワーカーが1行多く受け持つ。
/// `workers` は呼び出し側で `1..=n` に収めておくこと。
pub fn partition_rows(n: usize, workers: usize) -> Vec<RowRange> {
    let workers = workers.clamp(1, n.max(1));
    let base = n / workers;
    let remainder = n % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for k in 0..workers {
        let len = base + usize::from(k < remainder);
        ranges.push(RowRange {
            start,
            end: start + len,
        });
        start += len;
    }
    ranges
}

/// `partition_rows` の区間どおりにバッファを重ならない可変スライスへ分ける。
pub fn split_rows_mut<'a, T>(buffer: &'a mut [T], partitions: &[RowRange]) -> Vec<&'a mut [T]> {
    let mut rest = buffer;
    let mut blocks = Vec::with_capacity(partitions.len());
    for range in partitions {
        let (head, tail) = mem::take(&mut rest).split_at_mut(range.len());
        blocks.push(head);
        rest = tail;
    }
    blocks
}
