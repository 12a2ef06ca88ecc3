//! The ball.
//!
//! One bar of one, two, four or eight pixels (CTRLPF bits 4-5). ENABL
//! is double-buffered for vertical delay like the player graphics; the
//! delayed value swaps in when GRP1 is written.

use super::sprite::Sprite;

#[derive(Debug, Clone)]
pub struct Ball {
    pub sprite: Sprite,

    /// ENABL as most recently written.
    pub enabled: bool,
    /// The delayed buffer, used under VDELBL.
    pub enabled_delayed: bool,
    /// Vertical-delay flag (VDELBL).
    pub vertical_delay: bool,

    /// CTRLPF ball-size bits 4-5.
    pub size: u8,

    scan_counter: i32,
}

impl Ball {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            sprite: Sprite::new(label),
            enabled: false,
            enabled_delayed: false,
            vertical_delay: false,
            size: 0,
            scan_counter: i32::MAX,
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        1 << (self.size & 0x03)
    }

    fn active_enable(&self) -> bool {
        if self.vertical_delay {
            self.enabled_delayed
        } else {
            self.enabled
        }
    }

    pub fn start_drawing(&mut self) {
        self.scan_counter = 0;
    }

    /// One motion-clock tick. The ball has no NUSIZ copies.
    pub fn tick(&mut self) {
        if self.sprite.check_start(&[]).is_some() {
            self.start_drawing();
            return;
        }
        if self.scan_counter < self.width() {
            self.scan_counter += 1;
        }
    }

    /// Whether the ball drives the current pixel.
    #[must_use]
    pub fn pixel(&self) -> bool {
        self.active_enable() && self.scan_counter < self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_delay_uses_buffered_enable() {
        let mut ball = Ball::new("ball");
        ball.enabled = true;
        ball.enabled_delayed = false;
        ball.start_drawing();

        assert!(ball.pixel());
        ball.vertical_delay = true;
        assert!(!ball.pixel());
    }

    #[test]
    fn size_from_ctrlpf_bits() {
        let mut ball = Ball::new("ball");
        ball.size = 0x03;
        assert_eq!(ball.width(), 8);
    }
}
