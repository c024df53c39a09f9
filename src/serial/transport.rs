//=========================================================================
// Serial Transport
//=========================================================================
//
// Raw device seam under `Serial`, plus an in-process loopback.
//
// Architecture:
//   Serial ──→ Box<dyn Transport> ──→ UART driver / USB CDC / LoopbackTransport
//
// A transport only moves bytes and applies line settings. Framing,
// decoding and timeouts live in `Serial`.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{trace, warn};

//=== Routing =============================================================

/// Hardware pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(pub u32);

/// Where serial traffic goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialRoute {
    #[default]
    Usb,
    Pins {
        tx: Pin,
        rx: Pin,
    },
}

//=== SerialConfig ========================================================

/// Line settings applied to a device when it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub rx_buffer_size: usize,
    pub tx_buffer_size: usize,
    pub route: SerialRoute,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            rx_buffer_size: 64,
            tx_buffer_size: 64,
            route: SerialRoute::Usb,
        }
    }
}

//=== Transport ===========================================================

/// Byte-level serial device.
///
/// Reads never block. Errors are the transport's to log; callers see an
/// empty read or a dropped write.
pub trait Transport {
    /// Bytes received since the last call, possibly empty.
    fn read_available(&mut self) -> Vec<u8>;

    fn write(&mut self, bytes: &[u8]);

    fn set_baud_rate(&mut self, _rate: u32) {}

    fn set_rx_buffer_size(&mut self, _size: usize) {}

    fn set_tx_buffer_size(&mut self, _size: usize) {}

    fn redirect(&mut self, _route: SerialRoute, _rate: u32) {}
}

//=== LoopbackTransport ===================================================

/// One end of an in-process serial link. Bytes written on one end are
/// read on the other.
#[derive(Debug)]
pub struct LoopbackTransport {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    settings: SerialConfig,
    connected: bool,
}

impl LoopbackTransport {
    /// Creates both ends of a link.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (Self::end(a_tx, a_rx), Self::end(b_tx, b_rx))
    }

    fn end(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>) -> Self {
        Self {
            tx,
            rx,
            settings: SerialConfig::default(),
            connected: true,
        }
    }

    /// Settings last applied to this end.
    pub fn settings(&self) -> &SerialConfig {
        &self.settings
    }

    /// Reads everything pending as text, lossily. Handy on the host end.
    pub fn read_text(&mut self) -> String {
        String::from_utf8_lossy(&self.read_available()).into_owned()
    }
}

impl Transport for LoopbackTransport {
    fn read_available(&mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => bytes.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!(target: "serial", "Loopback peer disconnected");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
        bytes
    }

    fn write(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.tx.send(bytes.to_vec()).is_err() && self.connected {
            warn!(target: "serial", "Loopback peer disconnected, dropping {} byte(s)", bytes.len());
            self.connected = false;
        }
    }

    fn set_baud_rate(&mut self, rate: u32) {
        trace!(target: "serial", "Loopback baud rate {}", rate);
        self.settings.baud_rate = rate;
    }

    fn set_rx_buffer_size(&mut self, size: usize) {
        self.settings.rx_buffer_size = size;
    }

    fn set_tx_buffer_size(&mut self, size: usize) {
        self.settings.tx_buffer_size = size;
    }

    fn redirect(&mut self, route: SerialRoute, rate: u32) {
        self.settings.route = route;
        self.settings.baud_rate = rate;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
