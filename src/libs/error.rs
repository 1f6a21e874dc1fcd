/// Errors raised by the CHS library.
#[derive(Debug, thiserror::Error)]
pub enum ChsError {
    #[error("not mergeable: {0}")]
    NotMergeable(String),

    #[error("no gene data for {0}")]
    MissingGenes(String),

    #[error("rank {rank} out of range [{min}, {max}]")]
    RankOutOfRange { rank: usize, min: usize, max: usize },

    #[error("reversed rank window {start}-{end}")]
    ReversedRanks { start: usize, end: usize },

    #[error("line {line}: {msg}")]
    Format { line: usize, msg: String },
}

impl ChsError {
    /// Convenience for a format error at a 1-based line number.
    pub fn format(line: usize, msg: impl Into<String>) -> Self {
        Self::Format {
            line,
            msg: msg.into(),
        }
    }
}
