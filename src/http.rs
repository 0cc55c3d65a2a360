use std::{
    io::{self, ErrorKind, Read, Write},
    net::{Ipv4Addr, SocketAddrV4, TcpStream},
};

use log::{debug, trace};

use crate::error::Error;

pub const HTTP_PORT: u16 = 80;

/// Upper bound on the request, exclusive.
pub const MAX_LINE: usize = 4096;

pub const RECV_CHUNK: usize = MAX_LINE - 1;

/// Parses a strict dotted-quad IPv4 address.
pub fn parse_address(input: &str) -> Result<Ipv4Addr, Error> {
    input.parse().map_err(|_| Error::AddressParse {
        input: input.to_string(),
    })
}

/// Fetches `/` from a single IPv4 host and forwards the raw response.
pub struct Client {
    addr: SocketAddrV4,
    host: String,
}

impl Client {
    /// `host` is used verbatim for the `Host` header.
    pub fn new(host: &str) -> Result<Self, Error> {
        let ip = parse_address(host)?;
        Ok(Self {
            addr: SocketAddrV4::new(ip, HTTP_PORT),
            host: host.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Connects, sends the request and streams the response into `out` until
    /// the peer closes. Returns the number of bytes forwarded.
    pub fn get(&self, out: impl Write) -> Result<u64, Error> {
        let mut conn = Connection::open(self.addr)?;
        let request = Request::get_root(&self.host)?;
        exchange(&mut conn, &request, out)
    }
}

/// A TCP stream that lives for exactly one exchange.
///
/// The socket is closed when this is dropped, on success and failure alike.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddrV4,
}

impl Connection {
    pub fn open(addr: SocketAddrV4) -> Result<Self, Error> {
        debug!("connecting to {addr}");
        let stream =
            TcpStream::connect(addr).map_err(|source| Error::Connect { addr, source })?;
        Ok(Self { stream, peer: addr })
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("closing connection to {}", self.peer);
    }
}

#[derive(Debug)]
pub struct Request {
    bytes: Vec<u8>,
}

impl Request {
    /// Builds `GET /` for `host`, rejecting anything that does not fit in
    /// `MAX_LINE` bytes.
    pub fn get_root(host: &str) -> Result<Self, Error> {
        let bytes = format!("GET / HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n")
            .into_bytes();
        if bytes.len() >= MAX_LINE {
            return Err(Error::RequestTooLarge {
                len: bytes.len(),
                max: MAX_LINE,
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Sends `request` over `stream`, then copies everything the peer sends into
/// `out` chunk by chunk until end of stream.
pub fn exchange<S, W>(mut stream: S, request: &Request, mut out: W) -> Result<u64, Error>
where
    S: Read + Write,
    W: Write,
{
    send(&mut stream, request)?;
    receive(&mut stream, &mut out)
}

fn send(stream: &mut impl Write, request: &Request) -> Result<(), Error> {
    let bytes = request.as_bytes();
    debug!(">>> {} bytes", bytes.len());
    debug!("{}", prefix_lines(&String::from_utf8_lossy(bytes), ">>> "));

    let written = loop {
        match stream.write(bytes) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => break result.map_err(Error::Write)?,
        }
    };
    if written != bytes.len() {
        return Err(Error::Write(io::Error::new(
            ErrorKind::WriteZero,
            format!("short write: {written} of {} bytes", bytes.len()),
        )));
    }
    stream.flush().map_err(Error::Write)
}

fn receive(stream: &mut impl Read, out: &mut impl Write) -> Result<u64, Error> {
    let mut buf = [0u8; RECV_CHUNK];
    let mut total = 0u64;

    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::Read(err)),
        };
        trace!("<<< {n} bytes");

        out.write_all(&buf[..n])
            .and_then(|()| out.flush())
            .map_err(Error::Output)?;
        total += n as u64;
    }

    debug!("<<< {total} bytes, peer closed");
    Ok(total)
}

fn prefix_lines(str: &str, prefix: &str) -> String {
    str.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<String>>()
        .join("\n")
}
