use thiserror::Error;

#[derive(Error, Debug)]
pub enum DelayError {
    #[error("Invalid filter specification: {0}")]
    InvalidFilterSpec(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "No shift could be scored: reference {reference_len} samples, candidate {candidate_len} samples, max shift {max_shift}"
    )]
    SearchRangeExhausted {
        reference_len: usize,
        candidate_len: usize,
        max_shift: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DelayError>;
