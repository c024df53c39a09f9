//=========================================================================
// Serial
//=========================================================================
//
// Polling text/byte wrapper over an optional serial device.
//
// Architecture:
//   Serial
//     ├─ device: Option<Box<dyn Transport>>   (None = no hardware)
//     ├─ decoder: Utf8Decoder                 (partial sequences)
//     ├─ buffered: Vec<u8>                    (received, not yet consumed)
//     └─ handlers: (SerialEvent, callback)    (fired on each poll)
//
// Every operation degrades silently without a device: reads return empty
// values, writes and settings are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

//=== Module Declarations =================================================

mod decoder;
mod transport;

//=== Public API ==========================================================

pub use decoder::Utf8Decoder;
pub use transport::{LoopbackTransport, Pin, SerialConfig, SerialRoute, Transport};

//=== Delimiter ===========================================================

/// Single-character message delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    CarriageReturn,
    Dollar,
    Colon,
    Fullstop,
    Hash,
    NewLine,
    Space,
    Tab,
    Pipe,
    SemiColon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::CarriageReturn => '\r',
            Self::Dollar => '$',
            Self::Colon => ':',
            Self::Fullstop => '.',
            Self::Hash => '#',
            Self::NewLine => '\n',
            Self::Space => ' ',
            Self::Tab => '\t',
            Self::Pipe => '|',
            Self::SemiColon => ';',
        }
    }

    fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

//=== SerialEvent =========================================================

/// Conditions checked whenever new bytes are polled from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialEvent {
    /// Any bytes arrived.
    DataReceived,

    /// The arriving bytes contain the delimiter.
    DelimiterReceived(Delimiter),
}

/// Serial event callback.
pub type SerialHandler = Box<dyn FnMut()>;

//=== Serial ==============================================================

pub struct Serial {
    device: Option<Box<dyn Transport>>,
    config: SerialConfig,
    decoder: Utf8Decoder,
    buffered: Vec<u8>,
    handlers: Vec<(SerialEvent, SerialHandler)>,
}

impl Serial {
    /// Interval between device polls in [`read_until`](Self::read_until).
    pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

    //--- Construction -----------------------------------------------------

    /// Wraps `device`, applying `config` to it.
    pub fn new(device: Option<Box<dyn Transport>>, config: SerialConfig) -> Self {
        let mut serial = Self {
            device: None,
            config,
            decoder: Utf8Decoder::new(),
            buffered: Vec::new(),
            handlers: Vec::new(),
        };
        if let Some(device) = device {
            serial.attach(device);
        }
        serial
    }

    /// Serial with no device; every operation is a no-op.
    pub fn detached() -> Self {
        Self::new(None, SerialConfig::default())
    }

    /// Attaches a device and applies the current settings to it.
    pub fn attach(&mut self, mut device: Box<dyn Transport>) {
        device.set_rx_buffer_size(self.config.rx_buffer_size);
        device.set_tx_buffer_size(self.config.tx_buffer_size);
        device.redirect(self.config.route, self.config.baud_rate);
        debug!(target: "serial", "Device attached ({:?} @ {} baud)", self.config.route, self.config.baud_rate);
        self.device = Some(device);
    }

    pub fn detach(&mut self) -> Option<Box<dyn Transport>> {
        self.device.take()
    }

    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    //--- Reading ----------------------------------------------------------

    /// Buffered and newly received bytes, exactly as they arrived.
    pub fn read_buffer(&mut self) -> Vec<u8> {
        self.pull();
        std::mem::take(&mut self.buffered)
    }

    /// Buffered and newly received text. Incomplete UTF-8 sequences stay
    /// buffered for the next read.
    pub fn read_string(&mut self) -> String {
        self.pull();
        let text = self.decoder.decode(&std::mem::take(&mut self.buffered));
        self.buffered = self.decoder.take_pending();
        text
    }

    /// Polls until `delimiter` arrives and returns the text before it. The
    /// delimiter is consumed; text after it stays buffered.
    ///
    /// Returns `""` when `timeout` elapses first (buffered text is kept),
    /// or immediately when no device is attached. Without a timeout this
    /// blocks until the delimiter arrives.
    pub fn read_until(&mut self, delimiter: Delimiter, timeout: Option<Duration>) -> String {
        let started = Instant::now();
        let marker = delimiter.as_byte();

        loop {
            self.pull();

            // Delimiters are ASCII and never part of a multi-byte sequence
            if let Some(at) = self.buffered.iter().position(|&b| b == marker) {
                let rest = self.buffered.split_off(at + 1);
                let mut line = std::mem::replace(&mut self.buffered, rest);
                line.pop();
                return String::from_utf8_lossy(&line).into_owned();
            }

            if self.device.is_none() {
                return String::new();
            }
            if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                trace!(target: "serial", "read_until({:?}) timed out", delimiter);
                return String::new();
            }

            thread::sleep(Self::POLL_INTERVAL);
        }
    }

    //--- Writing ----------------------------------------------------------

    pub fn write_buffer(&mut self, bytes: &[u8]) {
        if let Some(device) = self.device.as_mut() {
            device.write(bytes);
        }
    }

    pub fn write_string(&mut self, text: &str) {
        self.write_buffer(text.as_bytes());
    }

    /// Writes `text` followed by `"\r\n"`.
    pub fn write_line(&mut self, text: &str) {
        let mut line = String::with_capacity(text.len() + 2);
        line.push_str(text);
        line.push_str("\r\n");
        self.write_string(&line);
    }

    /// Writes the number as text, without a trailing `.0` for integers.
    pub fn write_number(&mut self, value: f64) {
        self.write_string(&format_number(value));
    }

    /// Writes `name:value\r\n`, or `value\r\n` when `name` is empty.
    pub fn write_value(&mut self, name: &str, value: f64) {
        let number = format_number(value);
        if name.is_empty() {
            self.write_line(&number);
        } else {
            self.write_line(&format!("{}:{}", name, number));
        }
    }

    //--- Settings ---------------------------------------------------------

    pub fn set_baud_rate(&mut self, rate: u32) {
        self.config.baud_rate = rate;
        if let Some(device) = self.device.as_mut() {
            device.set_baud_rate(rate);
        }
    }

    pub fn set_rx_buffer_size(&mut self, size: usize) {
        self.config.rx_buffer_size = size;
        if let Some(device) = self.device.as_mut() {
            device.set_rx_buffer_size(size);
        }
    }

    pub fn set_tx_buffer_size(&mut self, size: usize) {
        self.config.tx_buffer_size = size;
        if let Some(device) = self.device.as_mut() {
            device.set_tx_buffer_size(size);
        }
    }

    /// Routes traffic through the given pins at `rate`.
    pub fn redirect(&mut self, tx: Pin, rx: Pin, rate: u32) {
        self.apply_route(SerialRoute::Pins { tx, rx }, rate);
    }

    /// Routes traffic back to USB at the current baud rate.
    pub fn redirect_to_usb(&mut self) {
        self.apply_route(SerialRoute::Usb, self.config.baud_rate);
    }

    //--- Events -----------------------------------------------------------

    /// Registers `handler` for `event`. Checked on every device poll.
    pub fn on_event<F>(&mut self, event: SerialEvent, handler: F)
    where
        F: FnMut() + 'static,
    {
        self.handlers.push((event, Box::new(handler)));
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply_route(&mut self, route: SerialRoute, rate: u32) {
        self.config.route = route;
        self.config.baud_rate = rate;
        if let Some(device) = self.device.as_mut() {
            debug!(target: "serial", "Redirecting to {:?} @ {} baud", route, rate);
            device.redirect(route, rate);
        }
    }

    /// Reads fresh bytes from the device and fires matching handlers.
    fn poll(&mut self) -> Vec<u8> {
        let Some(device) = self.device.as_mut() else {
            return Vec::new();
        };
        let fresh = device.read_available();
        if fresh.is_empty() {
            return fresh;
        }

        trace!(target: "serial", "Received {} byte(s)", fresh.len());
        for (event, handler) in self.handlers.iter_mut() {
            let fire = match *event {
                SerialEvent::DataReceived => true,
                SerialEvent::DelimiterReceived(delimiter) => fresh.contains(&delimiter.as_byte()),
            };
            if fire {
                handler();
            }
        }
        fresh
    }

    fn pull(&mut self) {
        let fresh = self.poll();
        self.buffered.extend(fresh);
    }
}

impl Default for Serial {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serial")
            .field("attached", &self.device.is_some())
            .field("config", &self.config)
            .field("buffered", &self.buffered.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Integers print without a fractional part.
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn linked() -> (Serial, LoopbackTransport) {
        let (device, host) = LoopbackTransport::pair();
        (Serial::new(Some(Box::new(device)), SerialConfig::default()), host)
    }

    //--- Writing ----------------------------------------------------------

    #[test]
    fn write_line_appends_crlf() {
        let (mut serial, mut host) = linked();
        serial.write_line("x");
        assert_eq!(host.read_available(), b"x\r\n".to_vec());
    }

    #[test]
    fn write_value_formats_name_and_number() {
        let (mut serial, mut host) = linked();
        serial.write_value("temp", 21.0);
        serial.write_value("", 5.0);
        serial.write_value("t", 1.5);
        assert_eq!(host.read_text(), "temp:21\r\n5\r\nt:1.5\r\n");
    }

    #[test]
    fn write_number_and_buffer() {
        let (mut serial, mut host) = linked();
        serial.write_number(-3.0);
        serial.write_buffer(&[b'|', 0x01]);
        assert_eq!(host.read_available(), vec![b'-', b'3', b'|', 0x01]);
    }

    //--- Reading ----------------------------------------------------------

    #[test]
    fn read_string_returns_everything_received() {
        let (mut serial, mut host) = linked();
        host.write(b"abc");
        assert_eq!(serial.read_string(), "abc");
        assert_eq!(serial.read_string(), "");
    }

    #[test]
    fn read_string_keeps_split_utf8_for_next_read() {
        let (mut serial, mut host) = linked();
        let bytes = "ü".as_bytes();
        host.write(&bytes[..1]);
        assert_eq!(serial.read_string(), "");
        host.write(&bytes[1..]);
        assert_eq!(serial.read_string(), "ü");
    }

    #[test]
    fn read_until_returns_text_before_delimiter() {
        let (mut serial, mut host) = linked();
        host.write(b"12,34,");

        let started = Instant::now();
        assert_eq!(serial.read_until(Delimiter::Comma, Some(Duration::from_secs(5))), "12");
        assert_eq!(serial.read_until(Delimiter::Comma, None), "34");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn read_until_times_out_with_empty_string() {
        let (mut serial, mut host) = linked();
        host.write(b"partial");

        let started = Instant::now();
        let line = serial.read_until(Delimiter::NewLine, Some(Duration::from_millis(20)));

        assert_eq!(line, "");
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(serial.read_string(), "partial");
    }

    #[test]
    fn read_buffer_includes_unconsumed_text() {
        let (mut serial, mut host) = linked();
        host.write(b"a\nb");
        assert_eq!(serial.read_until(Delimiter::NewLine, None), "a");
        host.write(b"c");
        assert_eq!(serial.read_buffer(), b"bc".to_vec());
    }

    #[test]
    fn read_buffer_returns_invalid_utf8_untouched() {
        let (mut serial, mut host) = linked();
        host.write(&[0xFF, b'x', 0xFE]);

        let line = serial.read_until(Delimiter::NewLine, Some(Duration::from_millis(5)));

        assert_eq!(line, "");
        assert_eq!(serial.read_buffer(), vec![0xFF, b'x', 0xFE]);
    }

    #[test]
    fn read_until_decodes_invalid_bytes_lossily() {
        let (mut serial, mut host) = linked();
        host.write(&[b'a', 0xFF, b',', 0xC3]);

        assert_eq!(serial.read_until(Delimiter::Comma, None), "a\u{FFFD}");
        assert_eq!(serial.read_buffer(), vec![0xC3]);
    }

    //--- No Device --------------------------------------------------------

    #[test]
    fn detached_serial_degrades_silently() {
        let mut serial = Serial::detached();
        serial.write_line("nobody");
        serial.set_baud_rate(9_600);

        assert_eq!(serial.read_string(), "");
        assert!(serial.read_buffer().is_empty());
        assert_eq!(serial.read_until(Delimiter::NewLine, None), "");
        assert_eq!(serial.config().baud_rate, 9_600);
    }

    //--- Settings ---------------------------------------------------------

    #[test]
    fn redirect_and_back_to_usb() {
        let mut serial = Serial::detached();
        serial.redirect(Pin(4), Pin(5), 57_600);
        assert_eq!(serial.config().route, SerialRoute::Pins { tx: Pin(4), rx: Pin(5) });

        serial.redirect_to_usb();
        assert_eq!(serial.config().route, SerialRoute::Usb);
        assert_eq!(serial.config().baud_rate, 57_600);
    }

    //--- Events -----------------------------------------------------------

    #[test]
    fn events_fire_on_poll() {
        let data = Rc::new(Cell::new(0));
        let lines = Rc::new(Cell::new(0));
        let (mut serial, mut host) = linked();

        let counter = Rc::clone(&data);
        serial.on_event(SerialEvent::DataReceived, move || counter.set(counter.get() + 1));
        let counter = Rc::clone(&lines);
        serial.on_event(SerialEvent::DelimiterReceived(Delimiter::NewLine), move || {
            counter.set(counter.get() + 1)
        });

        host.write(b"no newline");
        serial.read_string();
        host.write(b"done\n");
        serial.read_string();
        serial.read_string();

        assert_eq!(data.get(), 2);
        assert_eq!(lines.get(), 1);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(21.0), "21");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
