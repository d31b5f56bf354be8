use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported Bayer pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Unsupported color space: {0}")]
    UnknownColorSpace(String),

    #[error("Missing matrix: {0}")]
    MissingMatrix(String),

    #[error("Invalid polynomial order: {0} (expected one of 3, 5, 9, 11, 18, 20)")]
    InvalidOrder(usize),

    #[error("Grey-world balance divides by zero: mean of the {channel} channel is 0")]
    DivisionByZero { channel: &'static str },

    #[error("Unknown step: {0}")]
    UnknownStage(String),

    #[error("Stage '{stage}' requires the output of '{requires}', which has not run")]
    MissingStageInput {
        stage: &'static str,
        requires: &'static str,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid {name} matrix shape: expected {expected} columns, got {got}")]
    MatrixShape {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode RAW image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
