//! Mechanics common to the movable video objects.
//!
//! The VCS doesn't really have anything called a sprite but we all know
//! what it means. A sprite begins drawing when its position polycounter
//! cycles to its reset point; additional copies begin at the trigger
//! counts selected by NUSIZ. HMOVE nudges the position with extra ticks
//! gated by a 4-bit comparison against the sprite's movement nibble.

use emu_core::Polycounter;

/// Visible pixels per scanline; sprite positions wrap at this.
pub const VISIBLE_PIXELS: i32 = 160;

/// Wait states for the forced-reset construct below. The value is
/// empirical - tuned against Keystone Kapers' late ball reset.
const FORCE_RESET_WAIT: i32 = 2;

/// What the movement resolution decided for one comb count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmoveStep {
    /// The sprite takes one extra tick.
    Tick,
    /// The sprite takes one extra tick and its pending reset must be
    /// forced to completion first.
    TickWithForcedReset,
    /// Movement is finished for this sprite.
    Done,
}

/// State shared by players, missiles and the ball.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub label: &'static str,

    /// Position counter; drawing starts when it cycles.
    pub position: Polycounter,

    /// Horizontal position at the last reset, in visible pixels.
    pub reset_pixel: i32,

    /// Horizontal position after HMOVE adjustment.
    pub current_pixel: i32,

    /// Movement nibble, normalised to 0..=15.
    pub horiz_movement: u8,
    pub more_movement_required: bool,

    /// Whether a position reset is pending in the owner's scheduler.
    pub reset_pending: bool,

    /// 0 = off, 1 = trigger, n = wait for trigger.
    force_reset: i32,
}

impl Sprite {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            position: Polycounter::new(6, 39),
            reset_pixel: 0,
            current_pixel: 0,
            horiz_movement: 8, // the no-movement value
            more_movement_required: false,
            reset_pending: false,
            force_reset: 0,
        }
    }

    /// Complete a position reset at the given visible pixel.
    pub fn reset_position(&mut self, pixel: i32) {
        self.position.reset();
        self.reset_pixel = pixel;
        self.current_pixel = pixel;
        self.reset_pending = false;
    }

    /// Advance the position counter. Returns whether drawing should
    /// start: the counter cycling starts the primary copy, a NUSIZ
    /// trigger count starts a secondary copy.
    pub fn check_start(&mut self, triggers: &[usize]) -> Option<bool> {
        if self.position.tick() {
            return Some(false);
        }
        if self.position.phase == 0 && triggers.contains(&self.position.count) {
            return Some(true);
        }
        None
    }

    /// Load the movement register. The hardware encoding maps
    /// 0x70..=0x80 to +7..-8; normalised here so the comb comparison
    /// works bit-by-bit.
    pub fn set_movement(&mut self, value: u8) {
        self.horiz_movement = (value ^ 0x80) >> 4;
    }

    /// Start horizontal movement: without knowing anything else, the
    /// final position is 8 pixels right of the current one. The comb
    /// ticks below pull it back left.
    pub fn prepare_for_hmove(&mut self) {
        self.more_movement_required = true;
        self.current_pixel += 8;
        if self.current_pixel >= VISIBLE_PIXELS {
            self.current_pixel -= VISIBLE_PIXELS;
        }
    }

    /// Resolve one comb count (15 down to 1). The owner performs the
    /// sprite-type tick when told to.
    pub fn resolve_hmove(&mut self, count: u8) -> HmoveStep {
        self.more_movement_required =
            self.more_movement_required && compare_bits(count, self.horiz_movement);

        if !self.more_movement_required {
            return HmoveStep::Done;
        }

        self.current_pixel -= 1;
        if self.current_pixel < 0 {
            self.current_pixel = VISIBLE_PIXELS - 1;
        }

        // a reset that is still pending while HMOVE is moving the
        // sprite has to land before the movement completes, or the
        // sprite reappears at the wrong end of the line (Keystone
        // Kapers relies on this)
        if self.reset_pending {
            if self.force_reset == 1 {
                self.force_reset = 0;
                return HmoveStep::TickWithForcedReset;
            }
            if self.force_reset == 0 {
                self.force_reset = FORCE_RESET_WAIT;
            } else {
                self.force_reset -= 1;
            }
        }

        HmoveStep::Tick
    }
}

/// True when any corresponding bits in the low nibbles are equal.
fn compare_bits(a: u8, b: u8) -> bool {
    a & 0x08 == b & 0x08 || a & 0x04 == b & 0x04 || a & 0x02 == b & 0x02 || a & 0x01 == b & 0x01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_normalisation() {
        let mut sp = Sprite::new("test");
        sp.set_movement(0x70); // +7: maximum leftward movement
        assert_eq!(sp.horiz_movement, 15);
        sp.set_movement(0x00); // no movement
        assert_eq!(sp.horiz_movement, 8);
        sp.set_movement(0x80); // -8: maximum rightward movement
        assert_eq!(sp.horiz_movement, 0);
    }

    /// Run the full comb and count the extra ticks a movement value
    /// receives.
    fn comb_ticks(hm_register: u8) -> i32 {
        let mut sp = Sprite::new("test");
        sp.current_pixel = 80;
        sp.reset_pixel = 80;
        sp.set_movement(hm_register);
        sp.prepare_for_hmove();

        let mut ticks = 0;
        for count in (1..=15u8).rev() {
            if sp.resolve_hmove(count) != HmoveStep::Done {
                ticks += 1;
            }
        }
        ticks
    }

    #[test]
    fn comb_tick_counts() {
        assert_eq!(comb_ticks(0x70), 15); // +7 -> -15 ticks, net -7
        assert_eq!(comb_ticks(0x00), 8); // 0 -> net 0
        assert_eq!(comb_ticks(0x80), 0); // -8 -> net +8
        assert_eq!(comb_ticks(0x10), 9); // +1 -> net -1
    }

    #[test]
    fn net_movement() {
        for (register, net) in [(0x70u8, -7i32), (0x00, 0), (0x80, 8), (0x30, -3)] {
            let mut sp = Sprite::new("test");
            sp.current_pixel = 80;
            sp.set_movement(register);
            sp.prepare_for_hmove();
            for count in (1..=15u8).rev() {
                sp.resolve_hmove(count);
            }
            assert_eq!(sp.current_pixel, 80 + net, "register {register:#04x}");
        }
    }

    #[test]
    fn position_cycle_is_160_ticks() {
        let mut sp = Sprite::new("test");
        let mut ticks = 0;
        loop {
            ticks += 1;
            if sp.check_start(&[]) == Some(false) {
                break;
            }
        }
        assert_eq!(ticks, 160);
    }
}
