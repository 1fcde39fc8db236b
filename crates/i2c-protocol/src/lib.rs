//! I2C Sniffer Protocol
//!
//! Defines the 32-bit sample word produced by the bus capture hardware,
//! how it decodes into bus events, and the text tokens those events
//! render to.

mod event;
mod token;

pub use event::{Event, EventCode, RawFields};
pub use token::Token;

/// Raw 32-bit word captured from the bus, before decoding
pub type Sample = u32;

/// Bit layout of a captured sample
pub mod layout {
    /// Shift of the 2-bit event code
    pub const EVENT_SHIFT: u32 = 10;
    /// Mask applied to the event code after shifting
    pub const EVENT_MASK: u32 = 0b11;
    /// Shift of the 8-bit data payload
    pub const PAYLOAD_SHIFT: u32 = 1;
    /// Mask applied to the payload after shifting
    pub const PAYLOAD_MASK: u32 = 0xFF;
    /// Acknowledge bit. The bus drives SDA low to ACK, so a 0 here means acknowledged.
    pub const ACK_BIT: u32 = 0x1;
}
