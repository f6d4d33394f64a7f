use crate::block::CaptionType;
use serde::Serialize;

/// Per-document caption numbering, one sequence per caption type.
///
/// Numbers are handed out once and never returned: a block removed by a
/// mutation keeps its number retired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FigureCounter {
    figure: u32,
    table: u32,
    plot: u32,
}

impl FigureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number in the sequence for `caption_type`, starting at 1
    pub fn next(&mut self, caption_type: CaptionType) -> u32 {
        let slot = self.slot(caption_type);
        *slot += 1;
        *slot
    }

    /// Last number handed out, 0 if none
    pub fn current(&self, caption_type: CaptionType) -> u32 {
        match caption_type {
            CaptionType::Figure => self.figure,
            CaptionType::Table => self.table,
            CaptionType::Plot => self.plot,
        }
    }

    /// Only a fresh document load resets the sequences
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn slot(&mut self, caption_type: CaptionType) -> &mut u32 {
        match caption_type {
            CaptionType::Figure => &mut self.figure,
            CaptionType::Table => &mut self.table,
            CaptionType::Plot => &mut self.plot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_independent() {
        let mut counter = FigureCounter::new();
        assert_eq!(counter.next(CaptionType::Figure), 1);
        assert_eq!(counter.next(CaptionType::Figure), 2);
        assert_eq!(counter.next(CaptionType::Table), 1);
        assert_eq!(counter.current(CaptionType::Plot), 0);
        assert_eq!(counter.current(CaptionType::Figure), 2);

        counter.reset();
        assert_eq!(counter.next(CaptionType::Figure), 1);
    }
}
