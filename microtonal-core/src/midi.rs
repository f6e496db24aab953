//! # Microtonal MIDI Module
//!
//! Plays arbitrary frequencies on ordinary MIDI gear by splitting each one
//! into a whole note number plus a pitch-bend offset. Every channel carries
//! one voice, so each voice can be bent independently.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::pitch::freq_to_midi;

/// Pitch-bend range assumed when none is configured, in semitones.
pub const DEFAULT_BEND_RANGE: f64 = 2.0;

/// Number of MIDI channels.
pub const CHANNEL_COUNT: u8 = 16;

/// A whole MIDI note and the pitch bend that tunes it.
///
/// `pitch_bend` is a fraction of the bend range in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicrotonalNote {
    pub midi_note: u8,
    pub pitch_bend: f64,
}

impl MicrotonalNote {
    /// # Returns
    /// * `None` - The frequency falls outside MIDI notes 0-127, or the bend range is not positive
    pub fn from_freq(freq: f64, bend_range: f64) -> Option<Self> {
        if !(freq.is_finite() && freq > 0.0) || !(bend_range > 0.0) {
            return None;
        }
        let midi_float = freq_to_midi(freq);
        let midi_note = midi_float.floor();
        if !(0.0..=127.0).contains(&midi_note) {
            return None;
        }
        Some(Self {
            midi_note: midi_note as u8,
            pitch_bend: (midi_float - midi_note) / bend_range,
        })
    }
}

/// Per-channel MIDI output. Channels are numbered 1 to 16.
pub trait MidiOutput {
    fn note_on(&mut self, channel: u8, midi_note: u8, pitch_bend: f64);
    fn note_off(&mut self, channel: u8, midi_note: u8);
}

/// One independently tuned voice on a MIDI channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiChannelVoice {
    channel: u8,
    bend_range: f64,
    freq: Option<f64>,
    sounding: Option<u8>,
}

impl MidiChannelVoice {
    pub fn new(channel: u8, bend_range: f64) -> Self {
        Self {
            channel: channel.clamp(1, CHANNEL_COUNT),
            bend_range,
            freq: None,
            sounding: None,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn freq(&self) -> Option<f64> {
        self.freq
    }

    pub fn is_on(&self) -> bool {
        self.sounding.is_some()
    }

    /// Retunes the voice. A sounding voice is re-struck at the new pitch,
    /// releasing the note it was playing first.
    pub fn set_freq(&mut self, freq: f64, output: &mut dyn MidiOutput) -> bool {
        if MicrotonalNote::from_freq(freq, self.bend_range).is_none() {
            log::debug!("channel {}: {freq} Hz is outside the MIDI range", self.channel);
            return false;
        }
        self.freq = Some(freq);
        if self.is_on() {
            self.note_on(output);
        }
        true
    }

    /// Starts the voice at its current frequency.
    pub fn note_on(&mut self, output: &mut dyn MidiOutput) -> bool {
        let Some(note) = self
            .freq
            .and_then(|freq| MicrotonalNote::from_freq(freq, self.bend_range))
        else {
            return false;
        };
        if let Some(previous) = self.sounding.take() {
            output.note_off(self.channel, previous);
        }
        output.note_on(self.channel, note.midi_note, note.pitch_bend);
        self.sounding = Some(note.midi_note);
        true
    }

    pub fn note_off(&mut self, output: &mut dyn MidiOutput) {
        if let Some(previous) = self.sounding.take() {
            output.note_off(self.channel, previous);
        }
    }
}

/// Silences every voice.
pub fn all_notes_off(voices: &mut [MidiChannelVoice], output: &mut dyn MidiOutput) {
    for voice in voices.iter_mut() {
        voice.note_off(output);
    }
}

/// A MIDI message bound for the thread that owns the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        midi_note: u8,
        pitch_bend: f64,
    },
    NoteOff {
        channel: u8,
        midi_note: u8,
    },
}

/// A MIDI output that forwards messages over a channel.
#[derive(Debug)]
pub struct ChannelMidiOutput {
    sender: Sender<MidiMessage>,
}

pub fn midi_channel(capacity: usize) -> (ChannelMidiOutput, Receiver<MidiMessage>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
    (ChannelMidiOutput { sender }, receiver)
}

impl ChannelMidiOutput {
    fn send(&self, message: MidiMessage) {
        if let Err(TrySendError::Full(message) | TrySendError::Disconnected(message)) =
            self.sender.try_send(message)
        {
            log::warn!("MIDI message dropped: {message:?}");
        }
    }
}

impl MidiOutput for ChannelMidiOutput {
    fn note_on(&mut self, channel: u8, midi_note: u8, pitch_bend: f64) {
        self.send(MidiMessage::NoteOn {
            channel,
            midi_note,
            pitch_bend,
        });
    }

    fn note_off(&mut self, channel: u8, midi_note: u8) {
        self.send(MidiMessage::NoteOff { channel, midi_note });
    }
}
