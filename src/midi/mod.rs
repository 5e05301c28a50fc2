//! Wire-level MIDI message types.
//!
//! Every message validates its fields at construction, so a value that made
//! it into a message is guaranteed encodable. Channels are 1-16 as printed
//! on the hardware; the status byte carries them as 0-15.

use thiserror::Error;

pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

/// Highest value a 7-bit MIDI data byte can carry.
pub const DATA_MAX: u8 = 0x7F;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MidiError {
    #[error("MIDI channel {0} out of range (1-16)")]
    InvalidChannel(u8),
    #[error("controller number {0} out of range (0-127)")]
    InvalidController(u8),
    #[error("controller value {0} out of range (0-127)")]
    InvalidValue(u8),
    #[error("program number {0} out of range (0-127)")]
    InvalidProgram(u8),
    #[error("sysex payload is empty")]
    EmptySysex,
    #[error("sysex payload must start with F0, got {0:02X}")]
    BadSysexStart(u8),
    #[error("sysex payload must end with F7, got {0:02X}")]
    BadSysexEnd(u8),
}

fn check_channel(channel: u8) -> Result<(), MidiError> {
    if (1..=16).contains(&channel) {
        Ok(())
    } else {
        Err(MidiError::InvalidChannel(channel))
    }
}

/// A three-byte Control Change message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChangeMessage {
    channel: u8,
    control: u8,
    value: u8,
}

impl ControlChangeMessage {
    pub fn new(channel: u8, control: u8, value: u8) -> Result<Self, MidiError> {
        check_channel(channel)?;
        if control > DATA_MAX {
            return Err(MidiError::InvalidController(control));
        }
        if value > DATA_MAX {
            return Err(MidiError::InvalidValue(value));
        }
        Ok(Self { channel, control, value })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [CONTROL_CHANGE | (self.channel - 1), self.control, self.value]
    }
}

/// A two-byte Program Change message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramChangeMessage {
    channel: u8,
    program: u8,
}

impl ProgramChangeMessage {
    pub fn new(channel: u8, program: u8) -> Result<Self, MidiError> {
        check_channel(channel)?;
        if program > DATA_MAX {
            return Err(MidiError::InvalidProgram(program));
        }
        Ok(Self { channel, program })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn program(&self) -> u8 {
        self.program
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        [PROGRAM_CHANGE | (self.channel - 1), self.program]
    }
}

/// A System Exclusive frame, bracketed by F0/F7 for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexMessage {
    payload: Vec<u8>,
}

impl SysexMessage {
    pub fn new(payload: Vec<u8>) -> Result<Self, MidiError> {
        let first = *payload.first().ok_or(MidiError::EmptySysex)?;
        if first != SYSEX_START {
            return Err(MidiError::BadSysexStart(first));
        }
        let last = payload[payload.len() - 1];
        if last != SYSEX_END {
            return Err(MidiError::BadSysexEnd(last));
        }
        Ok(Self { payload })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }
}

/// Any message the transport layer can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    ControlChange(ControlChangeMessage),
    ProgramChange(ProgramChangeMessage),
    Sysex(SysexMessage),
}

impl MidiMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::ControlChange(m) => m.to_bytes().to_vec(),
            MidiMessage::ProgramChange(m) => m.to_bytes().to_vec(),
            MidiMessage::Sysex(m) => m.as_bytes().to_vec(),
        }
    }

    pub fn hex_string(&self) -> String {
        hex_string(&self.to_bytes())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MidiMessage::ControlChange(_) => "control_change",
            MidiMessage::ProgramChange(_) => "program_change",
            MidiMessage::Sysex(_) => "sysex",
        }
    }
}

impl From<ControlChangeMessage> for MidiMessage {
    fn from(m: ControlChangeMessage) -> Self {
        MidiMessage::ControlChange(m)
    }
}

impl From<ProgramChangeMessage> for MidiMessage {
    fn from(m: ProgramChangeMessage) -> Self {
        MidiMessage::ProgramChange(m)
    }
}

impl From<SysexMessage> for MidiMessage {
    fn from(m: SysexMessage) -> Self {
        MidiMessage::Sysex(m)
    }
}

/// Uppercase hex rendering, space separated: `B0 07 7F`.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change_bytes() {
        // Volume full up on channel 1
        let msg = ControlChangeMessage::new(1, 7, 127).unwrap();
        assert_eq!(msg.to_bytes(), [0xB0, 0x07, 0x7F]);
        assert_eq!(MidiMessage::from(msg).hex_string(), "B0 07 7F");
    }

    #[test]
    fn test_control_change_status_carries_channel() {
        for channel in 1..=16u8 {
            let msg = ControlChangeMessage::new(channel, 0, 0).unwrap();
            let bytes = msg.to_bytes();
            assert_eq!(bytes.len(), 3);
            assert_eq!(bytes[0], 0xB0 + channel - 1);
        }
    }

    #[test]
    fn test_control_change_rejects_out_of_range() {
        assert_eq!(
            ControlChangeMessage::new(0, 7, 127),
            Err(MidiError::InvalidChannel(0))
        );
        assert_eq!(
            ControlChangeMessage::new(17, 7, 127),
            Err(MidiError::InvalidChannel(17))
        );
        assert_eq!(
            ControlChangeMessage::new(1, 128, 0),
            Err(MidiError::InvalidController(128))
        );
        assert_eq!(
            ControlChangeMessage::new(1, 7, 200),
            Err(MidiError::InvalidValue(200))
        );
    }

    #[test]
    fn test_program_change_bytes() {
        // Program 0 on channel 16
        let msg = ProgramChangeMessage::new(16, 0).unwrap();
        assert_eq!(msg.to_bytes(), [0xCF, 0x00]);
        assert_eq!(MidiMessage::from(msg).hex_string(), "CF 00");
    }

    #[test]
    fn test_program_change_rejects_out_of_range() {
        assert_eq!(
            ProgramChangeMessage::new(0, 0),
            Err(MidiError::InvalidChannel(0))
        );
        assert_eq!(
            ProgramChangeMessage::new(1, 128),
            Err(MidiError::InvalidProgram(128))
        );
    }

    #[test]
    fn test_sysex_requires_brackets() {
        assert!(SysexMessage::new(vec![0xF0, 0x00, 0xF7]).is_ok());
        assert_eq!(SysexMessage::new(vec![]), Err(MidiError::EmptySysex));
        assert_eq!(
            SysexMessage::new(vec![0x00, 0xF7]),
            Err(MidiError::BadSysexStart(0x00))
        );
        // Truncated frame: terminator missing
        assert_eq!(
            SysexMessage::new(vec![0xF0, 0x01, 0x02]),
            Err(MidiError::BadSysexEnd(0x02))
        );
    }

    #[test]
    fn test_sysex_equality_is_payload_wise() {
        let a = SysexMessage::new(vec![0xF0, 0x01, 0xF7]).unwrap();
        let b = SysexMessage::new(vec![0xF0, 0x01, 0xF7]).unwrap();
        let c = SysexMessage::new(vec![0xF0, 0x02, 0xF7]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hex_string_format() {
        assert_eq!(hex_string(&[0xF0, 0x00, 0x0A, 0xF7]), "F0 00 0A F7");
        assert_eq!(hex_string(&[]), "");
    }
}
