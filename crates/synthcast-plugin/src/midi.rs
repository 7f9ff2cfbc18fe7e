//! MIDI events delivered to an engine with each processed block.

use smallvec::SmallVec;

const MIDI_STACK_CAPACITY: usize = 16;

/// Controller number for "All Notes Off".
pub const CC_ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    ControlChange { control: u8, value: u8 },
    AllNotesOff,
}

/// A channel voice message positioned inside the current block.
///
/// `channel` is 0-based (0..=15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub frame_offset: usize,
    pub channel: u8,
    pub msg: MidiMessage,
}

pub type MidiEventVec = SmallVec<[MidiEvent; MIDI_STACK_CAPACITY]>;

impl MidiEvent {
    pub fn note_on(frame_offset: usize, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            frame_offset,
            channel: channel & 0x0F,
            msg: MidiMessage::NoteOn {
                note: note & 0x7F,
                velocity: velocity & 0x7F,
            },
        }
    }

    pub fn note_off(frame_offset: usize, channel: u8, note: u8) -> Self {
        Self {
            frame_offset,
            channel: channel & 0x0F,
            msg: MidiMessage::NoteOff {
                note: note & 0x7F,
                velocity: 0,
            },
        }
    }

    pub fn all_notes_off(frame_offset: usize, channel: u8) -> Self {
        Self {
            frame_offset,
            channel: channel & 0x0F,
            msg: MidiMessage::AllNotesOff,
        }
    }

    pub fn with_offset(mut self, frame_offset: usize) -> Self {
        self.frame_offset = frame_offset;
        self
    }

    /// Raw status/data bytes.
    pub fn to_bytes(&self) -> [u8; 3] {
        let ch = self.channel & 0x0F;
        match self.msg {
            MidiMessage::NoteOn { note, velocity } => [0x90 | ch, note, velocity],
            MidiMessage::NoteOff { note, velocity } => [0x80 | ch, note, velocity],
            MidiMessage::ControlChange { control, value } => [0xB0 | ch, control, value],
            MidiMessage::AllNotesOff => [0xB0 | ch, CC_ALL_NOTES_OFF, 0],
        }
    }

    /// Parse a three-byte channel voice message. Unsupported statuses yield `None`.
    pub fn from_bytes(frame_offset: usize, bytes: [u8; 3]) -> Option<Self> {
        let channel = bytes[0] & 0x0F;
        let msg = match bytes[0] & 0xF0 {
            0x90 if bytes[2] == 0 => MidiMessage::NoteOff {
                note: bytes[1],
                velocity: 0,
            },
            0x90 => MidiMessage::NoteOn {
                note: bytes[1],
                velocity: bytes[2],
            },
            0x80 => MidiMessage::NoteOff {
                note: bytes[1],
                velocity: bytes[2],
            },
            0xB0 if bytes[1] == CC_ALL_NOTES_OFF => MidiMessage::AllNotesOff,
            0xB0 => MidiMessage::ControlChange {
                control: bytes[1],
                value: bytes[2],
            },
            _ => return None,
        };
        Some(Self {
            frame_offset,
            channel,
            msg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_bytes() {
        let ev = MidiEvent::note_on(0, 0, 60, 120);
        assert_eq!(ev.to_bytes(), [0x90, 60, 120]);
    }

    #[test]
    fn test_all_notes_off_is_cc123() {
        let ev = MidiEvent::all_notes_off(33075, 2);
        assert_eq!(ev.to_bytes(), [0xB2, 123, 0]);
        assert_eq!(ev.frame_offset, 33075);
    }

    #[test]
    fn test_channel_and_data_are_masked() {
        let ev = MidiEvent::note_on(0, 17, 200, 255);
        assert_eq!(ev.channel, 1);
        assert_eq!(ev.to_bytes(), [0x91, 200 & 0x7F, 0x7F]);
    }

    #[test]
    fn test_zero_velocity_note_on_parses_as_note_off() {
        let ev = MidiEvent::from_bytes(4, [0x93, 64, 0]).unwrap();
        assert_eq!(ev.channel, 3);
        assert!(matches!(ev.msg, MidiMessage::NoteOff { note: 64, .. }));
    }

    #[test]
    fn test_unsupported_status() {
        assert!(MidiEvent::from_bytes(0, [0xE0, 0, 64]).is_none());
    }
}
