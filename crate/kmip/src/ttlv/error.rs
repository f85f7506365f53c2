use thiserror::Error;

/// Failure modes of the TTLV byte codec.
///
/// Any of these surfacing while a connection is being read means the byte
/// stream can no longer be trusted to be in sync; the transport layer
/// poisons the connection on sight of them.
#[derive(Error, Debug)]
pub enum TtlvError {
    #[error("truncated TTLV input")]
    Truncated,

    #[error("type mismatch for tag `{tag}`: expected {expected}, found {found}")]
    TypeMismatch {
        tag: String,
        expected: String,
        found: String,
    },

    #[error("invalid UTF-8 in TextString: {0}")]
    InvalidUtf8(String),

    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("invalid item type byte: 0x{0:02X}")]
    InvalidType(u8),

    #[error("missing `{0}` in `{1}`")]
    MissingChild(String, String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(std::io::Error),
}

impl From<String> for TtlvError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for TtlvError {
    fn from(value: &str) -> Self {
        Self::Message(value.to_owned())
    }
}

impl From<std::io::Error> for TtlvError {
    fn from(e: std::io::Error) -> Self {
        // read_exact signals a short read this way
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(e)
        }
    }
}

impl From<std::string::FromUtf8Error> for TtlvError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8(e.to_string())
    }
}
