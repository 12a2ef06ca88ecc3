//! Player sprites.
//!
//! Eight bits of graphics, optionally reflected, in one, two or three
//! copies or stretched to double or quadruple width, all per NUSIZ.
//! GRP writes are double-buffered for vertical delay: writing one
//! player's graphics latches the other's, which is how games smooth
//! two-line kernels.

use super::sprite::Sprite;

/// Scan positions per player (one per graphics bit).
const GRAPHICS_BITS: i32 = 8;

/// Drawing state is off when the scan counter passes the last bit.
const SCAN_OFF: i32 = GRAPHICS_BITS;

#[derive(Debug, Clone)]
pub struct Player {
    pub sprite: Sprite,

    /// Graphics register as most recently written.
    pub grp: u8,
    /// The delayed buffer, swapped in under VDELP.
    pub grp_delayed: u8,
    /// Vertical-delay flag (VDELP).
    pub vertical_delay: bool,

    /// Reflection flag (REFP).
    pub reflected: bool,

    /// NUSIZ copy/size bits (low three).
    pub nusiz: u8,

    scan_counter: i32,
    /// Sub-counter for stretched players.
    scan_step: i32,
}

impl Player {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            sprite: Sprite::new(label),
            grp: 0,
            grp_delayed: 0,
            vertical_delay: false,
            reflected: false,
            nusiz: 0,
            scan_counter: SCAN_OFF,
            scan_step: 0,
        }
    }

    /// Position-counter trigger list for the NUSIZ copy modes.
    #[must_use]
    pub fn triggers(&self) -> &'static [usize] {
        match self.nusiz & 0x07 {
            0x01 => &[4],     // two copies, close
            0x02 => &[8],     // two copies, medium
            0x03 => &[4, 8],  // three copies, close
            0x04 => &[16],    // two copies, wide
            0x06 => &[8, 16], // three copies, medium
            _ => &[],
        }
    }

    /// Pixel width of each graphics bit.
    fn width(&self) -> i32 {
        match self.nusiz & 0x07 {
            0x05 => 2,
            0x07 => 4,
            _ => 1,
        }
    }

    /// The graphics byte currently displayed.
    fn active_graphics(&self) -> u8 {
        if self.vertical_delay {
            self.grp_delayed
        } else {
            self.grp
        }
    }

    pub fn start_drawing(&mut self) {
        self.scan_counter = 0;
        self.scan_step = 0;
    }

    /// One motion-clock tick: advance the position counter (starting
    /// drawing when it triggers) and the graphics scan.
    pub fn tick(&mut self) {
        if self.sprite.check_start(self.triggers()).is_some() {
            self.start_drawing();
            return;
        }

        if self.scan_counter < SCAN_OFF {
            self.scan_step += 1;
            if self.scan_step >= self.width() {
                self.scan_step = 0;
                self.scan_counter += 1;
            }
        }
    }

    /// Whether the player drives the current pixel.
    #[must_use]
    pub fn pixel(&self) -> bool {
        if self.scan_counter >= SCAN_OFF {
            return false;
        }
        let bit = if self.reflected {
            self.scan_counter
        } else {
            GRAPHICS_BITS - 1 - self.scan_counter
        };
        self.active_graphics() & (1 << bit) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tick until the position counter cycles, then collect the next
    /// pixels.
    fn drawn_pattern(player: &mut Player, width: usize) -> Vec<bool> {
        for _ in 0..1600 {
            player.tick();
            if player.scan_counter == 0 && player.scan_step == 0 {
                break;
            }
        }
        let mut pattern = vec![player.pixel()];
        for _ in 1..width {
            player.tick();
            pattern.push(player.pixel());
        }
        pattern
    }

    #[test]
    fn draws_graphics_msb_first() {
        let mut player = Player::new("player0");
        player.grp = 0b1010_0000;
        let pattern = drawn_pattern(&mut player, 8);
        assert_eq!(
            pattern,
            vec![true, false, true, false, false, false, false, false]
        );
    }

    #[test]
    fn reflection_reverses_bit_order() {
        let mut player = Player::new("player0");
        player.grp = 0b1010_0000;
        player.reflected = true;
        let pattern = drawn_pattern(&mut player, 8);
        assert_eq!(
            pattern,
            vec![false, false, false, false, false, true, false, true]
        );
    }

    #[test]
    fn double_width_stretches_bits() {
        let mut player = Player::new("player0");
        player.grp = 0b1000_0000;
        player.nusiz = 0x05;
        let pattern = drawn_pattern(&mut player, 4);
        assert_eq!(pattern, vec![true, true, false, false]);
    }

    #[test]
    fn vertical_delay_selects_old_graphics() {
        let mut player = Player::new("player0");
        player.grp = 0xff;
        player.grp_delayed = 0x00;
        player.vertical_delay = true;
        player.start_drawing();
        assert!(!player.pixel());

        player.vertical_delay = false;
        assert!(player.pixel());
    }
}
