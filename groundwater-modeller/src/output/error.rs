use thiserror::Error;

pub type OutputResult<T> = Result<T, OutputError>;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File ended while reading {what} at byte {offset}")]
    Truncated { what: String, offset: u64 },

    #[error("No '{text}' record for time step {kstp}, period {kper}")]
    RecordNotFound {
        text: String,
        kstp: usize,
        kper: usize,
    },

    #[error("Budget record '{text}' uses unsupported method {imeth}")]
    UnsupportedMethod { text: String, imeth: i32 },

    #[error("Malformed file: {0}")]
    Malformed(String),
}
