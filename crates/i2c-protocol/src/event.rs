//! Event Codes and Sample Decoding
//!
//! A sample carries two event-code bits (bit 11 and bit 10). Data samples
//! additionally carry the byte value in bits 8..=1 (B0 = bit 1) and the
//! acknowledge bit in bit 0.

use crate::layout::{ACK_BIT, EVENT_MASK, EVENT_SHIFT, PAYLOAD_MASK, PAYLOAD_SHIFT};
use crate::Sample;

/// 2-bit event code emitted by the capture state machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventCode {
    /// START condition (0b00)
    Start = 0b00,
    /// STOP condition (0b01)
    Stop = 0b01,
    /// Data byte plus acknowledge (0b10)
    Data = 0b10,
    /// Reserved code, never produced by a healthy capture (0b11)
    Unknown = 0b11,
}

impl EventCode {
    /// Extract the event code from a sample
    pub fn from_sample(sample: Sample) -> Self {
        match (sample >> EVENT_SHIFT) & EVENT_MASK {
            0b00 => EventCode::Start,
            0b01 => EventCode::Stop,
            0b10 => EventCode::Data,
            _ => EventCode::Unknown,
        }
    }

    /// Get the 2-bit value of this code
    pub fn bits(&self) -> u8 {
        *self as u8
    }
}

/// Every field of a sample, extracted without regard to the event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields {
    /// The sample the fields were extracted from
    pub sample: Sample,
    /// Event code bits
    pub code: u8,
    /// Payload byte (only meaningful for data events)
    pub payload: u8,
    /// Acknowledge state (bit 0 cleared)
    pub ack: bool,
}

impl RawFields {
    /// Split a sample into its fields
    pub fn from_sample(sample: Sample) -> Self {
        Self {
            sample,
            code: ((sample >> EVENT_SHIFT) & EVENT_MASK) as u8,
            payload: ((sample >> PAYLOAD_SHIFT) & PAYLOAD_MASK) as u8,
            ack: sample & ACK_BIT == 0,
        }
    }
}

/// Decoded bus event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// START condition
    Start,
    /// STOP condition
    Stop,
    /// A byte on the bus and whether the receiver acknowledged it
    Data { value: u8, ack: bool },
    /// Reserved event code
    Unknown,
}

impl Event {
    /// Decode a captured sample. Bits outside the layout are ignored.
    pub fn decode(sample: Sample) -> Self {
        let fields = RawFields::from_sample(sample);
        match EventCode::from_sample(sample) {
            EventCode::Start => Event::Start,
            EventCode::Stop => Event::Stop,
            EventCode::Data => Event::Data {
                value: fields.payload,
                ack: fields.ack,
            },
            EventCode::Unknown => Event::Unknown,
        }
    }

    /// Encode this event the way the capture hardware would
    pub fn encode(&self) -> Sample {
        let code = (self.code().bits() as Sample) << EVENT_SHIFT;
        match self {
            Event::Data { value, ack } => {
                let nack = if *ack { 0 } else { ACK_BIT };
                code | ((*value as Sample) << PAYLOAD_SHIFT) | nack
            }
            _ => code,
        }
    }

    /// Get the event code for this event
    pub fn code(&self) -> EventCode {
        match self {
            Event::Start => EventCode::Start,
            Event::Stop => EventCode::Stop,
            Event::Data { .. } => EventCode::Data,
            Event::Unknown => EventCode::Unknown,
        }
    }
}

impl From<Sample> for Event {
    fn from(sample: Sample) -> Self {
        Event::decode(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn word(code: u32, payload: u32, ack_raw: u32) -> Sample {
        (code << 10) | (payload << 1) | ack_raw
    }

    #[test]
    fn test_control_events_decode() {
        assert_eq!(Event::decode(word(0b00, 0, 0)), Event::Start);
        assert_eq!(Event::decode(word(0b01, 0, 0)), Event::Stop);
        assert_eq!(Event::decode(word(0b11, 0, 0)), Event::Unknown);
    }

    #[test]
    fn test_data_decode() {
        // 0x3F with SDA low on the ninth clock => acknowledged
        let event = Event::decode(word(0b10, 0x3F, 0));
        assert_eq!(event, Event::Data { value: 0x3F, ack: true });

        let event = Event::decode(word(0b10, 0x3F, 1));
        assert_eq!(event, Event::Data { value: 0x3F, ack: false });
    }

    #[test]
    fn test_high_bits_ignored() {
        let sample = 0xFFFF_F000 | word(0b10, 0xA5, 0);
        assert_eq!(Event::decode(sample), Event::Data { value: 0xA5, ack: true });
    }

    #[test]
    fn test_raw_fields_keep_payload_for_control_codes() {
        let fields = RawFields::from_sample(word(0b01, 0x42, 1));
        assert_eq!(fields.code, 0b01);
        assert_eq!(fields.payload, 0x42);
        assert!(!fields.ack);
    }

    #[test]
    fn test_event_code_from_sample() {
        assert_eq!(EventCode::from_sample(0x800), EventCode::Data);
        assert_eq!(EventCode::from_sample(0xC00).bits(), 0b11);
    }

    proptest! {
        #[test]
        fn prop_decode_recovers_fields(code in 0u32..4, payload in 0u32..256, ack_raw in 0u32..2) {
            let sample = word(code, payload, ack_raw);
            let fields = RawFields::from_sample(sample);
            prop_assert_eq!(fields.code as u32, code);
            prop_assert_eq!(fields.payload as u32, payload);
            prop_assert_eq!(fields.ack, ack_raw == 0);

            let event = Event::decode(sample);
            prop_assert_eq!(event.code().bits() as u32, code);
            if let Event::Data { value, ack } = event {
                prop_assert_eq!(value as u32, payload);
                prop_assert_eq!(ack, ack_raw == 0);
            }
        }

        #[test]
        fn prop_encode_is_canonical(value in any::<u8>(), ack in any::<bool>()) {
            let event = Event::Data { value, ack };
            prop_assert_eq!(Event::decode(event.encode()), event);
        }
    }
}
