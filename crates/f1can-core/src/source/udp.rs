use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{DatagramSource, SourceError};
use crate::protocols::f1::layout::MAX_DATAGRAM_SIZE;

/// Port the game sends telemetry to by default.
pub const DEFAULT_PORT: u16 = 22222;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Blocking UDP listener for game telemetry.
pub struct UdpDatagramSource {
    socket: UdpSocket,
    buf: [u8; MAX_DATAGRAM_SIZE],
    shutdown: Option<Arc<AtomicBool>>,
}

impl UdpDatagramSource {
    pub fn bind(addr: SocketAddr) -> Result<Self, SourceError> {
        let socket = UdpSocket::bind(addr)?;
        debug!(addr = %socket.local_addr()?, "udp source bound");
        Ok(Self {
            socket,
            buf: [0u8; MAX_DATAGRAM_SIZE],
            shutdown: None,
        })
    }

    /// End the stream once `flag` is set. The socket is polled with a short
    /// read timeout so the flag is seen between datagrams.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Result<Self, SourceError> {
        self.socket.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL))?;
        self.shutdown = Some(flag);
        Ok(self)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SourceError> {
        Ok(self.socket.local_addr()?)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl DatagramSource for UdpDatagramSource {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, SourceError> {
        loop {
            if self.shutdown_requested() {
                return Ok(None);
            }
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, peer)) => {
                    trace!(%peer, len, "datagram received");
                    return Ok(Some(&self.buf[..len]));
                }
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) => {}
                Err(err) if err.kind() == ErrorKind::ConnectionReset => {
                    warn!(%err, "udp read failed, continuing");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::UdpDatagramSource;
    use crate::source::DatagramSource;

    fn loopback() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    #[test]
    fn receives_whole_datagrams() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut source = UdpDatagramSource::bind(loopback())
            .unwrap()
            .with_shutdown(shutdown)
            .unwrap();
        let target = source.local_addr().unwrap();

        let sender = UdpSocket::bind(loopback()).unwrap();
        sender.send_to(&[1, 2, 3], target).unwrap();

        let datagram = source.next_datagram().unwrap().expect("datagram");
        assert_eq!(datagram, &[1, 2, 3]);
    }

    #[test]
    fn ends_stream_when_shutdown_is_set() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut source = UdpDatagramSource::bind(loopback())
            .unwrap()
            .with_shutdown(Arc::clone(&shutdown))
            .unwrap();
        shutdown.store(true, Ordering::SeqCst);
        assert!(source.next_datagram().unwrap().is_none());
    }
}
