//! # Playback and Notation Collaborators
//!
//! The engine never produces sound or graphics itself. It issues requests to
//! capabilities owned by the caller:
//! - [`ToneGenerator`] plays a set of frequencies
//! - [`NotationRenderer`] engraves a list of pitches
//!
//! [`ChannelToneGenerator`] implements the tone capability by forwarding
//! requests over a crossbeam channel to whichever thread owns the audio
//! device. Its lifecycle is explicit: create it with [`tone_channel`], end it
//! with [`ChannelToneGenerator::dispose`].

use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::pitch::Pitch;

/// How the two notes of an interval are sounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// One note after the other, in the given order.
    Arpeggio,
    /// All notes at once.
    Simultaneous,
}

pub trait ToneGenerator {
    fn play_notes(&mut self, freqs: &[f64], mode: PlaybackMode);
}

/// Layout hints handed to a notation renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationHints {
    /// Note length in quarter notes.
    pub duration_quarters: f64,
    /// Draw a grand staff instead of a single staff.
    pub grand_staff: bool,
}

impl Default for NotationHints {
    fn default() -> Self {
        Self {
            duration_quarters: 4.0,
            grand_staff: true,
        }
    }
}

pub trait NotationRenderer {
    fn render(&mut self, pitches: &[Pitch], hints: &NotationHints);
}

/// A request sent to the thread that owns the audio device.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneRequest {
    Play {
        freqs: Vec<f64>,
        mode: PlaybackMode,
    },
    /// The sender is gone; release the synth.
    Dispose,
}

/// A tone generator that forwards requests over a channel.
#[derive(Debug)]
pub struct ChannelToneGenerator {
    sender: Sender<ToneRequest>,
}

/// Creates a bounded request channel and the generator feeding it.
///
/// The receiving end belongs to the audio thread.
pub fn tone_channel(capacity: usize) -> (ChannelToneGenerator, Receiver<ToneRequest>) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
    (ChannelToneGenerator { sender }, receiver)
}

impl ChannelToneGenerator {
    /// Tells the audio thread to release its synth and closes the channel.
    ///
    /// Never blocks. If the channel is full the explicit request is skipped;
    /// dropping the sender still disconnects the receiver, which the audio
    /// thread treats the same way.
    pub fn dispose(self) {
        match self.sender.try_send(ToneRequest::Dispose) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::debug!("Dispose request skipped: channel full, closing instead")
            }
            Err(TrySendError::Disconnected(_)) => log::debug!("Audio thread already gone"),
        }
    }
}

impl ToneGenerator for ChannelToneGenerator {
    fn play_notes(&mut self, freqs: &[f64], mode: PlaybackMode) {
        let request = ToneRequest::Play {
            freqs: freqs.to_vec(),
            mode,
        };
        // Send the request, dropping it if the audio thread is behind.
        match self.sender.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::debug!("Tone request dropped: channel full"),
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Tone request dropped: audio thread has gone away")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_requests_in_order() {
        let (mut generator, receiver) = tone_channel(4);
        generator.play_notes(&[220.0, 330.0], PlaybackMode::Arpeggio);
        generator.play_notes(&[440.0], PlaybackMode::Simultaneous);
        generator.dispose();

        let requests: Vec<ToneRequest> = receiver.try_iter().collect();
        assert_eq!(
            requests,
            vec![
                ToneRequest::Play {
                    freqs: vec![220.0, 330.0],
                    mode: PlaybackMode::Arpeggio
                },
                ToneRequest::Play {
                    freqs: vec![440.0],
                    mode: PlaybackMode::Simultaneous
                },
                ToneRequest::Dispose,
            ]
        );
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn full_channel_drops_requests() {
        let (mut generator, receiver) = tone_channel(1);
        generator.play_notes(&[220.0], PlaybackMode::Arpeggio);
        generator.play_notes(&[330.0], PlaybackMode::Arpeggio);
        assert_eq!(receiver.len(), 1);
    }

    #[test]
    fn disconnected_receiver_is_tolerated() {
        let (mut generator, receiver) = tone_channel(1);
        drop(receiver);
        generator.play_notes(&[220.0], PlaybackMode::Arpeggio);
        generator.dispose();
    }

    #[test]
    fn dispose_on_a_full_channel_returns_and_closes() {
        let (mut generator, receiver) = tone_channel(1);
        generator.play_notes(&[220.0], PlaybackMode::Arpeggio);

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            generator.dispose();
            let _ = done_tx.send(());
        });
        assert!(done_rx.recv_timeout(std::time::Duration::from_secs(3)).is_ok());

        assert_eq!(
            receiver.try_recv(),
            Ok(ToneRequest::Play {
                freqs: vec![220.0],
                mode: PlaybackMode::Arpeggio
            })
        );
        assert!(receiver.recv().is_err());
    }
}
