use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoxDataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid UTF-8 in {context} name: {source}")]
    InvalidString {
        context: &'static str,
        source: FromUtf8Error,
    },

    #[error("Payload too short: expected {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },

    #[error("Name of {0} bytes does not fit a u32 length prefix")]
    NameTooLong(usize),
}

pub type Result<T> = std::result::Result<T, RoxDataError>;
