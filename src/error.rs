use thiserror::Error;

#[derive(Error, Debug)]
pub enum GiftexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open GIF container: {0}")]
    Open(#[source] gif::DecodingError),

    #[error("Failed to read GIF frame data: {0}")]
    Slurp(#[source] gif::DecodingError),

    #[error("Frame index {0} out of range")]
    FrameIndex(usize),
}

pub type GiftexResult<T> = Result<T, GiftexError>;
