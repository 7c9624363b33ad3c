//! Sound-start events raised by the play simulation, drained by whatever
//! owns the mixer thread. A `std::sync::mpsc` channel gives us the
//! single-producer/single-consumer shape without pulling in a crate the
//! rest of the stack doesn't already use.

use glam::Vec2;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::defs::sound::Sound;

#[derive(Debug, Clone, Copy)]
pub struct SoundEvent {
    pub sound: Sound,
    pub origin: Vec2,
    pub volume: f32,
}

pub struct SoundQueue {
    tx: Sender<SoundEvent>,
}

pub struct SoundSink {
    rx: Receiver<SoundEvent>,
}

impl SoundQueue {
    pub fn new() -> (Self, SoundSink) {
        let (tx, rx) = channel();
        (Self { tx }, SoundSink { rx })
    }

    pub fn start(&self, sound: Sound, origin: Vec2, volume: f32) {
        if matches!(sound, Sound::None) {
            return;
        }
        // A closed receiver just means nobody is listening (e.g. headless
        // replay tests); dropping the event is correct there.
        let _ = self.tx.send(SoundEvent {
            sound,
            origin,
            volume,
        });
    }
}

impl SoundSink {
    pub fn try_recv(&self) -> Option<SoundEvent> {
        self.rx.try_recv().ok()
    }

    pub fn drain(&self) -> Vec<SoundEvent> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_flow_through_queue() {
        let (queue, sink) = SoundQueue::new();
        queue.start(Sound::Pistol, Vec2::new(1.0, 2.0), 1.0);
        queue.start(Sound::None, Vec2::ZERO, 1.0);
        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0].sound, Sound::Pistol));
    }
}
