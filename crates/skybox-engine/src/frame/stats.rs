/// Running counters, logged at teardown.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub frames_presented: u64,
    pub frames_skipped: u64,
    pub constant_writes: u64,
}

impl FrameStats {
    pub fn frames_attempted(&self) -> u64 {
        self.frames_presented + self.frames_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempted_counts_skipped_frames_too() {
        let stats = FrameStats {
            frames_presented: 10,
            frames_skipped: 3,
            constant_writes: 30,
        };
        assert_eq!(stats.frames_attempted(), 13);
        assert_eq!(FrameStats::default().frames_attempted(), 0);
    }
}
