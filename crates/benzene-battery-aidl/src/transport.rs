//! Transports carrying transactions between a proxy and a stub
//!
//! Over a stream socket each request is framed as
//! `[len: u32][code: u32][payload]` and each reply as `[len: u32][payload]`,
//! all little-endian, where `len` counts the bytes that follow it.

use crate::status::{Result, Status};
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::Mutex;

/// Largest frame accepted in either direction
pub const MAX_FRAME: usize = 64 * 1024;

/// Something that can deliver a request and return the raw reply
pub trait Transport: Send + Sync {
    fn transact(&self, code: u32, data: &[u8]) -> Result<Vec<u8>>;
}

/// Write a request frame
pub fn write_request<W: Write>(w: &mut W, code: u32, data: &[u8]) -> io::Result<()> {
    let len = frame_len(data.len() + 4)?;
    let mut frame = Vec::with_capacity(8 + data.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&code.to_le_bytes());
    frame.extend_from_slice(data);
    w.write_all(&frame)?;
    w.flush()
}

/// Read a request frame, returning `None` on a clean end of stream
pub fn read_request<R: Read>(r: &mut R) -> io::Result<Option<(u32, Vec<u8>)>> {
    let Some(mut body) = read_frame(r)? else {
        return Ok(None);
    };
    if body.len() < 4 {
        return Err(io::Error::new(ErrorKind::InvalidData, "request frame too short"));
    }
    let payload = body.split_off(4);
    let code = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
    Ok(Some((code, payload)))
}

/// Write a reply frame
pub fn write_reply<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    let len = frame_len(data.len())?;
    let mut frame = Vec::with_capacity(4 + data.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(data);
    w.write_all(&frame)?;
    w.flush()
}

/// Read a reply frame
pub fn read_reply<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    read_frame(r)?.ok_or_else(|| io::Error::new(ErrorKind::UnexpectedEof, "connection closed"))
}

fn frame_len(len: usize) -> io::Result<u32> {
    if len > MAX_FRAME {
        return Err(io::Error::new(ErrorKind::InvalidInput, "frame too large"));
    }
    Ok(len as u32)
}

fn read_frame<R: Read>(r: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    match r.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME {
        return Err(io::Error::new(ErrorKind::InvalidData, "frame too large"));
    }
    let mut body = vec![0u8; len];
    r.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Client side of a Unix stream socket connection
///
/// Calls on one transport are serialized; open several to issue calls in
/// parallel.
pub struct SocketTransport {
    stream: Mutex<UnixStream>,
}

impl SocketTransport {
    /// Connect to a service socket
    pub fn connect(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path).map_err(|e| {
            Status::transaction_failed(&format!("connect {}: {}", path.display(), e))
        })?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }
}

impl Transport for SocketTransport {
    fn transact(&self, code: u32, data: &[u8]) -> Result<Vec<u8>> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| Status::transaction_failed("transport lock poisoned"))?;
        write_request(&mut *stream, code, data)
            .and_then(|()| read_reply(&mut *stream))
            .map_err(|e| Status::transaction_failed(&e.to_string()))
    }
}
