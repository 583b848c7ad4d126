//! Framing for the match protocol
//!
//! Each message is a big-endian `u32` byte count followed by that many bytes
//! of JSON. Running out of bytes anywhere in a frame is reported as
//! `Error::ConnectionClosed`.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::Message;

/// Upper bound on a single frame. A full match snapshot is a few KB.
const MAX_FRAME_SIZE: u32 = 256 * 1024;

async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::ConnectionClosed),
        Err(e) => Err(Error::Io(e)),
    }
}

pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message> {
    let mut header = [0u8; 4];
    fill(reader, &mut header).await?;

    let len = match u32::from_be_bytes(header) {
        0 => return Err(Error::Protocol("Empty frame".into())),
        len if len > MAX_FRAME_SIZE => {
            return Err(Error::Protocol(format!(
                "Frame of {} bytes exceeds the {} byte limit",
                len, MAX_FRAME_SIZE
            )))
        }
        len => len as usize,
    };

    let mut payload = vec![0u8; len];
    fill(reader, &mut payload).await?;

    Message::from_bytes(&payload).map_err(|e| Error::Protocol(format!("Invalid JSON: {}", e)))
}

/// Encode `msg` and write it as one buffer, then flush
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, msg: &Message) -> Result<()> {
    let payload = msg
        .to_bytes()
        .map_err(|e| Error::Protocol(format!("Serialization failed: {}", e)))?;

    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or_else(|| {
            Error::Protocol(format!(
                "Message of {} bytes exceeds the {} byte limit",
                payload.len(),
                MAX_FRAME_SIZE
            ))
        })?;

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
