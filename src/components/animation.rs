//! Frame playback state for animated sprites.
//!
//! [`AnimatedSprite`] owns an ordered, non-empty list of frames and advances
//! through them at a fractional rate expressed in frames per tick. The
//! [`animation`](crate::systems::animation::animation) system drives it once
//! per tick and copies the current frame into the entity's
//! [`Sprite`](crate::components::sprite::Sprite).

use bevy_ecs::prelude::Component;

use crate::resources::texturestore::Texture;

#[derive(Debug, Clone, Component)]
pub struct AnimatedSprite {
    frames: Vec<Texture>,
    current_frame: usize,
    accumulator: f32,
    speed: f32,
    pub looped: bool,
    playing: bool,
    completed: bool,
}

impl AnimatedSprite {
    /// Build a stopped sprite at frame 0. An empty list gets the placeholder
    /// frame so the sequence is never empty.
    pub fn new(mut frames: Vec<Texture>) -> Self {
        if frames.is_empty() {
            frames.push(Texture::empty());
        }
        Self {
            frames,
            current_frame: 0,
            accumulator: 0.0,
            speed: 1.0,
            looped: false,
            playing: false,
            completed: false,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn with_loop(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    /// Frames advanced per tick. Negative or NaN speeds stall playback.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Start playing from `from_frame` (clamped to the last frame).
    pub fn play(&mut self, from_frame: usize) {
        self.current_frame = from_frame.min(self.last_frame());
        self.accumulator = 0.0;
        self.playing = true;
        self.completed = false;
    }

    /// Pause on the current frame.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Advance by `delta_ticks`. Returns true on the call that completes a
    /// non-looping sequence; later calls are no-ops until the next `play`.
    pub fn advance(&mut self, delta_ticks: f32) -> bool {
        if !self.playing {
            return false;
        }
        let last = self.last_frame();
        if !self.looped && self.current_frame >= last {
            return self.finish();
        }

        self.accumulator += self.speed * delta_ticks.max(0.0);
        if self.accumulator < 1.0 {
            return false;
        }
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        let next = self.current_frame.saturating_add(whole as usize);

        if self.looped {
            self.current_frame = next % self.frames.len();
            false
        } else if next >= last {
            self.current_frame = last;
            self.finish()
        } else {
            self.current_frame = next;
            false
        }
    }

    /// Stop immediately, keeping the current frame. Returns true if this
    /// call is what completed the sequence.
    pub fn force_complete(&mut self) -> bool {
        self.finish()
    }

    fn finish(&mut self) -> bool {
        self.playing = false;
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }

    fn last_frame(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn texture(&self) -> &Texture {
        &self.frames[self.current_frame]
    }

    pub fn frames(&self) -> &[Texture] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn frames(n: usize) -> Vec<Texture> {
        (0..n)
            .map(|i| Texture::from_image(format!("/f{i}.png"), RgbaImage::new(2, 2)))
            .collect()
    }

    #[test]
    fn test_fractional_speed_accumulates() {
        let mut sprite = AnimatedSprite::new(frames(4)).with_speed(0.25);
        sprite.play(0);
        for _ in 0..3 {
            sprite.advance(1.0);
        }
        assert_eq!(sprite.current_frame(), 0);
        sprite.advance(1.0);
        assert_eq!(sprite.current_frame(), 1);
    }

    #[test]
    fn test_non_looping_completes_once_on_last_frame() {
        let mut sprite = AnimatedSprite::new(frames(3));
        sprite.play(0);
        assert!(!sprite.advance(1.0));
        assert!(sprite.advance(1.0));
        assert_eq!(sprite.current_frame(), 2);
        assert!(!sprite.is_playing());
        assert!(!sprite.advance(1.0));
        assert!(sprite.is_completed());
    }

    #[test]
    fn test_large_delta_clamps_to_last_frame() {
        let mut sprite = AnimatedSprite::new(frames(5));
        sprite.play(0);
        assert!(sprite.advance(40.0));
        assert_eq!(sprite.current_frame(), 4);
    }

    #[test]
    fn test_single_frame_completes_on_first_advance() {
        let mut sprite = AnimatedSprite::new(frames(1));
        sprite.play(0);
        assert!(sprite.advance(0.0));
        assert!(!sprite.is_playing());
    }

    #[test]
    fn test_looping_wraps_and_keeps_playing() {
        let mut sprite = AnimatedSprite::new(frames(3)).with_loop(true);
        sprite.play(2);
        assert!(!sprite.advance(2.0));
        assert_eq!(sprite.current_frame(), 1);
        assert!(sprite.is_playing());
    }

    #[test]
    fn test_stop_freezes_frame() {
        let mut sprite = AnimatedSprite::new(frames(4));
        sprite.play(1);
        sprite.stop();
        sprite.advance(2.0);
        assert_eq!(sprite.current_frame(), 1);
    }

    #[test]
    fn test_force_complete_fires_only_once() {
        let mut sprite = AnimatedSprite::new(frames(4));
        sprite.play(0);
        assert!(sprite.force_complete());
        assert!(!sprite.force_complete());
        sprite.play(0);
        assert!(sprite.force_complete());
    }

    #[test]
    fn test_play_clamps_start_and_empty_gets_placeholder() {
        let mut sprite = AnimatedSprite::new(Vec::new());
        assert_eq!(sprite.frame_count(), 1);
        assert!(sprite.texture().is_placeholder());
        sprite.play(10);
        assert_eq!(sprite.current_frame(), 0);
    }

    #[test]
    fn test_negative_speed_stalls() {
        let mut sprite = AnimatedSprite::new(frames(3)).with_speed(-2.0);
        sprite.play(0);
        sprite.advance(10.0);
        assert_eq!(sprite.current_frame(), 0);
        assert!(sprite.is_playing());
    }
}
