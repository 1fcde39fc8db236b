//! Output Tokens
//!
//! Tokens are written back to back. `"o\r\n"` is the only record boundary;
//! everything between two boundaries belongs to one bus transaction.

use crate::event::{Event, RawFields};
use std::fmt;

/// Marker written after a START condition
pub const START_MARKER: char = 's';
/// Record terminator written for a STOP condition
pub const STOP_RECORD: &str = "o\r\n";
/// Marker for an acknowledged byte
pub const ACK_MARKER: char = 'a';
/// Marker for a byte that was not acknowledged
pub const NACK_MARKER: char = 'n';
/// Marker for a reserved event code
pub const UNKNOWN_MARKER: char = 'u';

/// One rendered unit of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// START, optionally prefixed by a 10-digit microsecond timestamp
    Start { timestamp_us: Option<u32> },
    /// STOP, terminates the record
    Stop,
    /// Data byte as two uppercase hex digits plus ack marker
    Data { value: u8, ack: bool },
    /// Reserved event code
    Unknown,
    /// Diagnostic dump of every field of a sample
    Raw(RawFields),
}

impl Token {
    /// Build the token for a decoded event
    pub fn from_event(event: Event, timestamp_us: Option<u32>) -> Self {
        match event {
            Event::Start => Token::Start { timestamp_us },
            Event::Stop => Token::Stop,
            Event::Data { value, ack } => Token::Data { value, ack },
            Event::Unknown => Token::Unknown,
        }
    }

    /// Whether this token closes a record
    pub fn is_record_boundary(&self) -> bool {
        matches!(self, Token::Stop)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Start { timestamp_us: Some(ts) } => write!(f, "{:010}{}", ts, START_MARKER),
            Token::Start { timestamp_us: None } => write!(f, "{}", START_MARKER),
            Token::Stop => f.write_str(STOP_RECORD),
            Token::Data { value, ack } => {
                let marker = if *ack { ACK_MARKER } else { NACK_MARKER };
                write!(f, "{:02X}{}", value, marker)
            }
            Token::Unknown => write!(f, "{}", UNKNOWN_MARKER),
            Token::Raw(fields) => write!(
                f,
                "val: {:x}, ev_code: {:x}, data:{:x}, ack: {} \r\n",
                fields.sample,
                fields.code,
                fields.payload,
                fields.ack as u8
            ),
        }
    }
}
