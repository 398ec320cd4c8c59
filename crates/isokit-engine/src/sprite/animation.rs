use std::rc::Rc;

use crate::texture::TextureRegion;

use super::SpriteSheet;

/// Plays one animation of a shared [`SpriteSheet`] at a time.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    sheet: Option<Rc<SpriteSheet>>,
    current: String,
    elapsed: f32,
    speed: f32,
    playing: bool,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self {
            sheet: None,
            current: String::new(),
            elapsed: 0.0,
            speed: 1.0,
            playing: false,
        }
    }
}

impl AnimationPlayer {
    pub fn new(sheet: Rc<SpriteSheet>) -> Self {
        Self {
            sheet: Some(sheet),
            ..Self::default()
        }
    }

    /// Switches sheets and stops playback.
    pub fn set_sprite_sheet(&mut self, sheet: Option<Rc<SpriteSheet>>) {
        self.sheet = sheet;
        self.stop();
    }

    /// Starts `name` from the beginning. Replaying the running animation is a no-op
    /// unless `force` is set.
    pub fn play(&mut self, name: &str, force: bool) {
        if !force && self.playing && self.current == name {
            return;
        }
        self.current.clear();
        self.current.push_str(name);
        self.elapsed = 0.0;
        self.playing = true;
    }

    /// Advances by `dt * speed` seconds. One-shot animations stop at their end.
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let Some(sheet) = self.sheet.as_ref() else { return };

        self.elapsed += dt * self.speed;
        if let Some(anim) = sheet.animation(&self.current) {
            if !anim.looping && self.elapsed >= anim.total_duration() {
                self.playing = false;
            }
        }
    }

    pub fn current_region(&self) -> TextureRegion {
        match self.sheet.as_ref() {
            Some(sheet) => sheet.animation_frame(&self.current, self.elapsed),
            None => TextureRegion::default(),
        }
    }

    pub fn current_frame_index(&self) -> usize {
        self.sheet
            .as_ref()
            .map(|s| s.animation_frame_index(&self.current, self.elapsed))
            .unwrap_or(0)
    }

    /// True for a completed one-shot, and when there is nothing to play.
    pub fn is_finished(&self) -> bool {
        let Some(anim) = self.sheet.as_ref().and_then(|s| s.animation(&self.current)) else {
            return true;
        };
        !anim.looping && self.elapsed >= anim.total_duration()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn current_animation(&self) -> &str {
        &self.current
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.current.clear();
        self.elapsed = 0.0;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureHandle;

    fn sheet() -> Rc<SpriteSheet> {
        let mut s = SpriteSheet::new();
        s.set_texture(TextureHandle::from_raw(1), 64, 16);
        s.define_grid(16, 16, None, None, 0, 0);
        s.define_animation("loop", 0, 3, 0.1, true);
        s.define_animation("once", 0, 1, 0.1, false);
        Rc::new(s)
    }

    #[test]
    fn plays_and_advances() {
        let mut p = AnimationPlayer::new(sheet());
        p.play("loop", false);
        p.update(0.15);
        assert_eq!(p.current_frame_index(), 1);
        assert!(!p.is_finished());
    }

    #[test]
    fn replay_without_force_keeps_time() {
        let mut p = AnimationPlayer::new(sheet());
        p.play("loop", false);
        p.update(0.25);
        p.play("loop", false);
        assert_eq!(p.elapsed(), 0.25);
        p.play("loop", true);
        assert_eq!(p.elapsed(), 0.0);
    }

    #[test]
    fn one_shot_finishes_and_stops() {
        let mut p = AnimationPlayer::new(sheet());
        p.play("once", false);
        p.update(0.5);
        assert!(p.is_finished());
        assert!(!p.is_playing());
        assert_eq!(p.current_frame_index(), 1);
    }

    #[test]
    fn pause_freezes_time_and_speed_scales_it() {
        let mut p = AnimationPlayer::new(sheet());
        p.play("loop", false);
        p.pause();
        p.update(1.0);
        assert_eq!(p.elapsed(), 0.0);
        p.resume();
        p.set_speed(2.0);
        p.update(0.1);
        assert!((p.elapsed() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn without_sheet_nothing_plays() {
        let mut p = AnimationPlayer::default();
        p.play("loop", false);
        p.update(1.0);
        assert!(p.is_finished());
        assert_eq!(p.current_region(), TextureRegion::default());
        p.stop();
        assert_eq!(p.current_animation(), "");
    }
}
