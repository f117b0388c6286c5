use std::path::PathBuf;
use std::process::ExitCode;

/// Every failure that stops a conversion.
///
/// A missing executable segment is not in here: it is a warning and the image
/// is still written.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    Usage(String),

    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid ELF file (bad magic)")]
    InvalidFormat,

    #[error("only 64-bit little-endian ELF is supported (class={class}, data={data})")]
    UnsupportedFormat { class: u8, data: u8 },

    #[error("corrupt input: {what} at 0x{offset:x} (+{len} bytes) exceeds the {available} bytes available")]
    CorruptInput {
        what: &'static str,
        offset: u64,
        len: u64,
        available: usize,
    },

    #[error("{field} = {value} does not fit in a 32-bit SBF header field")]
    FieldOverflow { field: &'static str, value: u64 },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Every error is fatal for the one-shot conversion.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_)
            | Self::NotFound { .. }
            | Self::Io { .. }
            | Self::InvalidFormat
            | Self::UnsupportedFormat { .. }
            | Self::CorruptInput { .. }
            | Self::FieldOverflow { .. } => ExitCode::from(1),
        }
    }
}
