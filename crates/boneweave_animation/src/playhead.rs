//! Per-layer playback position.
//!
//! A [`Playhead`] is built from a validated [`AnimationModifier`], so its speed
//! is always positive. Time only moves through [`Playhead::update`], which
//! keeps it inside `0..=length` for every loop mode.

use crate::modifier::{AnimationModifier, LoopMode};

/// Outcome of advancing a [`Playhead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayheadEvent {
    /// Still inside the clip.
    Playing,
    /// A looping clip wrapped back to its first frame. Overlays that the
    /// renderer derives from the base transform need to be re-sent.
    Wrapped,
    /// A play-once clip reached its end and releases its bones.
    Finished,
    /// A hold-on-last clip is frozen on its final frame.
    Holding,
}

/// Playback position of one layer, in ticks.
#[derive(Debug, Clone)]
pub struct Playhead {
    time: f32,
    length: f32,
    speed: f32,
    loop_mode: LoopMode,
    blend_in: u32,
    elapsed: f32,
    finished: bool,
}

impl Playhead {
    #[must_use]
    pub fn new(length_ticks: u32, modifier: &AnimationModifier) -> Self {
        Self {
            time: 0.0,
            length: length_ticks as f32,
            speed: modifier.speed(),
            loop_mode: modifier.loop_mode(),
            blend_in: modifier.blend_in_ticks(),
            elapsed: 0.0,
            finished: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Position inside the clip, in ticks.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    #[must_use]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Weight of this layer against the bone's prior pose, rising linearly
    /// from 0 to 1 over the blend-in window.
    #[must_use]
    pub fn blend_weight(&self) -> f32 {
        if self.blend_in == 0 {
            return 1.0;
        }
        (self.elapsed / self.blend_in as f32).clamp(0.0, 1.0)
    }

    /// Advances the playhead by `dt` ticks of wall time.
    pub fn update(&mut self, dt: f32) -> PlayheadEvent {
        if self.finished {
            return PlayheadEvent::Finished;
        }

        self.elapsed += dt;
        self.time += dt * self.speed;

        match self.loop_mode {
            LoopMode::PlayOnce => {
                if self.time >= self.length {
                    self.time = self.length;
                    self.finished = true;
                    PlayheadEvent::Finished
                } else {
                    PlayheadEvent::Playing
                }
            }
            LoopMode::Loop => {
                if self.length <= 0.0 {
                    self.time = 0.0;
                    return PlayheadEvent::Playing;
                }
                if self.time >= self.length {
                    self.time %= self.length;
                    PlayheadEvent::Wrapped
                } else {
                    PlayheadEvent::Playing
                }
            }
            LoopMode::HoldOnLast => {
                if self.time >= self.length {
                    self.time = self.length;
                    PlayheadEvent::Holding
                } else {
                    PlayheadEvent::Playing
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(loop_mode: LoopMode, speed: f32, blend_in: u32) -> AnimationModifier {
        AnimationModifier::builder()
            .loop_mode(loop_mode)
            .speed(speed)
            .blend_in_ticks(blend_in)
            .build()
            .unwrap()
    }

    #[test]
    fn play_once_finishes_at_end() {
        let mut head = Playhead::new(10, &modifier(LoopMode::PlayOnce, 1.0, 0));
        assert_eq!(head.update(5.0), PlayheadEvent::Playing);
        assert_eq!(head.update(6.0), PlayheadEvent::Finished);
        assert!(head.is_finished());
        assert!((head.time() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn loop_wraps_with_modulo() {
        let mut head = Playhead::new(10, &modifier(LoopMode::Loop, 2.0, 0));
        assert_eq!(head.update(4.0), PlayheadEvent::Playing);
        assert_eq!(head.update(2.0), PlayheadEvent::Wrapped);
        assert!((head.time() - 2.0).abs() < 1e-5);
        assert!(!head.is_finished());
    }

    #[test]
    fn hold_freezes_on_last_frame() {
        let mut head = Playhead::new(4, &modifier(LoopMode::HoldOnLast, 1.0, 0));
        assert_eq!(head.update(10.0), PlayheadEvent::Holding);
        assert_eq!(head.update(1.0), PlayheadEvent::Holding);
        assert!((head.time() - 4.0).abs() < f32::EPSILON);
        assert!(!head.is_finished());
    }

    #[test]
    fn time_stays_inside_the_clip() {
        for loop_mode in [LoopMode::PlayOnce, LoopMode::Loop, LoopMode::HoldOnLast] {
            let mut head = Playhead::new(7, &modifier(loop_mode, 3.0, 0));
            assert!(head.speed() > 0.0);
            assert_eq!(head.loop_mode(), loop_mode);
            for _ in 0..20 {
                head.update(1.3);
                assert!((0.0..=head.length()).contains(&head.time()), "{loop_mode:?}");
            }
        }
    }

    #[test]
    fn blend_weight_is_linear() {
        let mut head = Playhead::new(20, &modifier(LoopMode::Loop, 1.0, 4));
        assert!(head.blend_weight().abs() < f32::EPSILON);
        head.update(1.0);
        assert!((head.blend_weight() - 0.25).abs() < 1e-5);
        head.update(10.0);
        assert!((head.blend_weight() - 1.0).abs() < f32::EPSILON);
    }
}
