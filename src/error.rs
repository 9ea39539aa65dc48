//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by arbor's fallible operations.
///
/// Building a resource tree and compiling its document never fail. This type
/// surfaces what can go wrong around them: binding the server, accepting a
/// connection, or the router refusing a path when the tree is mounted.
#[derive(Debug)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    Io(std::io::Error),
    /// The bind address is not a valid `host:port`.
    Addr(AddrParseError),
    /// The router rejected a resource path, e.g. two sibling resources using
    /// different parameter names for the same segment.
    Route {
        path: String,
        source: matchit::InsertError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Addr(e) => write!(f, "invalid address: {e}"),
            Self::Route { path, source } => write!(f, "invalid route `{path}`: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Addr(e) => Some(e),
            Self::Route { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}
