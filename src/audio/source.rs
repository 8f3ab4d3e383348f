use anyhow::{Context, Result};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use super::block::{PacketSizeError, SampleBlock, BYTES_PER_SAMPLE};

/// Outcome of a single receive attempt that is not an error.
#[derive(Debug, PartialEq)]
pub enum Received {
    Block(SampleBlock),
    /// Nothing arrived within the receive timeout.
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    #[error(transparent)]
    Malformed(#[from] PacketSizeError),
    #[error("receive failed: {0}")]
    Io(#[from] io::Error),
}

/// Anything that can hand the pipeline one block per call.
pub trait SampleSource {
    fn receive(&mut self) -> Result<Received, ReceiveError>;
}

/// Datagram receiver bound to a local endpoint. One datagram is one block.
pub struct UdpSampleSource {
    socket: UdpSocket,
    block_size: usize,
    // One byte past the expected payload so oversized datagrams show up as
    // a length mismatch instead of being silently truncated.
    buf: Vec<u8>,
}

impl UdpSampleSource {
    pub fn bind(
        addr: SocketAddr,
        block_size: usize,
        timeout: Duration,
        recv_buffer: usize,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .with_context(|| format!("Failed to bind UDP socket on {}", addr))?;
        socket
            .set_read_timeout(Some(timeout))
            .context("Failed to set receive timeout")?;

        request_recv_buffer(&socket, recv_buffer);

        Ok(Self {
            socket,
            block_size,
            buf: vec![0u8; block_size * BYTES_PER_SAMPLE + 1],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl SampleSource for UdpSampleSource {
    fn receive(&mut self) -> Result<Received, ReceiveError> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, peer)) => {
                log::trace!("{} bytes from {}", len, peer);
                let block = SampleBlock::from_le_bytes(&self.buf[..len], self.block_size)?;
                Ok(Received::Block(block))
            }
            // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut.
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(Received::Timeout)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Best effort: packet loss upstream of the socket is expected either way.
#[cfg(unix)]
fn request_recv_buffer(socket: &UdpSocket, bytes: usize) {
    use nix::sys::socket::{getsockopt, setsockopt, sockopt::RcvBuf};

    match setsockopt(socket, RcvBuf, &bytes) {
        Ok(()) => match getsockopt(socket, RcvBuf) {
            Ok(granted) => log::debug!("Receive buffer: requested {} bytes, got {}", bytes, granted),
            Err(err) => log::debug!("Receive buffer set, size unreadable: {}", err),
        },
        Err(err) => log::warn!("Failed to enlarge receive buffer to {} bytes: {}", bytes, err),
    }
}

#[cfg(not(unix))]
fn request_recv_buffer(_socket: &UdpSocket, bytes: usize) {
    log::debug!("Receive buffer sizing not supported here, ignoring request for {} bytes", bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback(block_size: usize) -> (UdpSampleSource, UdpSocket) {
        let source = UdpSampleSource::bind(
            "127.0.0.1:0".parse().unwrap(),
            block_size,
            Duration::from_millis(200),
            8192,
        )
        .unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.connect(source.local_addr().unwrap()).unwrap();
        (source, sender)
    }

    #[test]
    fn receives_block() {
        let (mut source, sender) = loopback(4);
        let payload: Vec<u8> = [10i16, -20, 300, -4000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        sender.send(&payload).unwrap();

        match source.receive().unwrap() {
            Received::Block(block) => assert_eq!(block.samples(), &[10, -20, 300, -4000]),
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn times_out_without_data() {
        let (mut source, _sender) = loopback(4);
        assert_eq!(source.receive().unwrap(), Received::Timeout);
    }

    #[test]
    fn rejects_wrong_length_then_recovers() {
        let (mut source, sender) = loopback(4);
        sender.send(&[0u8; 6]).unwrap();
        sender.send(&[0u8; 12]).unwrap();
        sender.send(&[0u8; 8]).unwrap();

        match source.receive() {
            Err(ReceiveError::Malformed(e)) => assert_eq!(e.actual, 6),
            other => panic!("expected malformed, got {:?}", other),
        }
        // Oversized: truncated to expected + 1 on unix, EMSGSIZE on windows.
        assert!(source.receive().is_err());
        assert!(matches!(source.receive(), Ok(Received::Block(_))));
    }

    #[test]
    fn bind_conflict_is_an_error() {
        let (source, _sender) = loopback(4);
        let taken = source.local_addr().unwrap();
        let second = UdpSampleSource::bind(taken, 4, Duration::from_millis(10), 0);
        assert!(second.is_err());
    }
}
