//! Terminal failures of a fetch.
//!
//! Every variant ends the run. Variants wrapping an `io::Error` expose it
//! through `source()` so the runner can append the OS error code to the
//! diagnostic line.

use std::{fmt, io, net::SocketAddrV4};

#[derive(Debug)]
pub enum Error {
    /// Wrong number of command-line arguments.
    Usage { program: String },

    /// The argument is not a dotted-quad IPv4 address.
    AddressParse { input: String },

    /// The TCP connection could not be established.
    Connect { addr: SocketAddrV4, source: io::Error },

    /// The constructed request does not fit the request buffer.
    RequestTooLarge { len: usize, max: usize },

    /// The request was not transmitted in full.
    Write(io::Error),

    /// Receiving the response failed, possibly after some chunks were forwarded.
    Read(io::Error),

    /// Forwarding a received chunk to the output failed.
    Output(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage { program } => write!(f, "usage: {program} <server IPv4 address>"),
            Error::AddressParse { input } => write!(f, "invalid IPv4 address: {input}"),
            Error::Connect { addr, .. } => write!(f, "connect to {addr}"),
            Error::RequestTooLarge { len, max } => {
                write!(f, "request too large ({len} bytes, limit {max})")
            }
            Error::Write(_) => write!(f, "write"),
            Error::Read(_) => write!(f, "read"),
            Error::Output(_) => write!(f, "write to stdout"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect { source, .. } => Some(source),
            Error::Write(err) | Error::Read(err) | Error::Output(err) => Some(err),
            Error::Usage { .. } | Error::AddressParse { .. } | Error::RequestTooLarge { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error as _, net::Ipv4Addr};

    use super::*;

    #[test]
    fn usage_names_program() {
        let err = Error::Usage {
            program: "tiny-client".to_string(),
        };
        assert_eq!(err.to_string(), "usage: tiny-client <server IPv4 address>");
        assert!(err.source().is_none());
    }

    #[test]
    fn connect_exposes_source() {
        let err = Error::Connect {
            addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 80),
            source: io::Error::from_raw_os_error(111),
        };
        assert_eq!(err.to_string(), "connect to 127.0.0.1:80");
        let source = err.source().and_then(|e| e.downcast_ref::<io::Error>());
        assert_eq!(source.and_then(io::Error::raw_os_error), Some(111));
    }
}
