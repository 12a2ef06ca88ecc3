//! The TIA video sub-system: playfield, sprites, collisions, priority.

mod ball;
mod collisions;
mod missile;
mod player;
mod playfield;
mod sprite;

use emu_core::{Handle, Scheduler};

use crate::memory::addresses;
use crate::memory::ChipMemory;
use crate::television::colors::alt;
use crate::television::ColorSignal;

pub use ball::Ball;
pub use collisions::{ActiveElements, Collisions};
pub use missile::Missile;
pub use player::Player;
pub use playfield::Playfield;
pub use sprite::{HmoveStep, Sprite, VISIBLE_PIXELS};

/// Color-clocks between a RESxx strobe and the position reset landing.
const RESET_DELAY: u32 = 4;

/// Color-clocks between a graphics/enable write and the latch update.
const WRITE_DELAY: u32 = 1;

/// Delayed register effects.
#[derive(Debug, Clone, Copy)]
enum VideoEvent {
    ResetPlayer0,
    ResetPlayer1,
    ResetMissile0,
    ResetMissile1,
    ResetBall,
    Grp0(u8),
    Grp1(u8),
    Enam0(bool),
    Enam1(bool),
    Enabl(bool),
}

/// Pending reset futures, one slot per sprite.
#[derive(Debug, Clone, Copy, Default)]
struct ResetHandles {
    player0: Option<Handle>,
    player1: Option<Handle>,
    missile0: Option<Handle>,
    missile1: Option<Handle>,
    ball: Option<Handle>,
}

/// The output of one visible color-clock.
#[derive(Debug, Clone, Copy)]
pub struct PixelColors {
    pub pixel: ColorSignal,
    pub alt_pixel: ColorSignal,
}

pub struct Video {
    pub player0: Player,
    pub player1: Player,
    pub missile0: Missile,
    pub missile1: Missile,
    pub ball: Ball,
    pub playfield: Playfield,

    pub colup0: u8,
    pub colup1: u8,
    pub colupf: u8,
    pub colubk: u8,

    /// CTRLPF priority bit: playfield and ball draw over the players.
    pub priority: bool,
    /// CTRLPF score bit: the playfield takes the player colors per
    /// half.
    pub score_mode: bool,

    collisions: Collisions,
    futures: Scheduler<VideoEvent>,
    reset_handles: ResetHandles,

    /// Scratch for events due this tick.
    fired: Vec<VideoEvent>,
}

impl Video {
    #[must_use]
    pub fn new() -> Self {
        Self {
            player0: Player::new("player0"),
            player1: Player::new("player1"),
            missile0: Missile::new("missile0"),
            missile1: Missile::new("missile1"),
            ball: Ball::new("ball"),
            playfield: Playfield::new(),
            colup0: 0,
            colup1: 0,
            colupf: 0,
            colubk: 0,
            priority: false,
            score_mode: false,
            collisions: Collisions::new(),
            reset_handles: ResetHandles::default(),
            futures: Scheduler::new(),
            fired: Vec::new(),
        }
    }

    /// Service a TIA register write that belongs to the video
    /// sub-system. Returns false when the register isn't ours.
    pub fn service_write(&mut self, register: u16, value: u8, mem: &mut ChipMemory) -> bool {
        match register {
            addresses::NUSIZ0 => {
                self.player0.nusiz = value;
                self.missile0.nusiz = value;
            }
            addresses::NUSIZ1 => {
                self.player1.nusiz = value;
                self.missile1.nusiz = value;
            }
            addresses::COLUP0 => self.colup0 = value,
            addresses::COLUP1 => self.colup1 = value,
            addresses::COLUPF => self.colupf = value,
            addresses::COLUBK => self.colubk = value,
            addresses::CTRLPF => {
                self.playfield.reflected = value & 0x01 != 0;
                self.score_mode = value & 0x02 != 0;
                self.priority = value & 0x04 != 0;
                self.ball.size = (value >> 4) & 0x03;
            }
            addresses::REFP0 => self.player0.reflected = value & 0x08 != 0,
            addresses::REFP1 => self.player1.reflected = value & 0x08 != 0,
            addresses::PF0 => self.playfield.pf0 = value,
            addresses::PF1 => self.playfield.pf1 = value,
            addresses::PF2 => self.playfield.pf2 = value,
            addresses::RESP0 => {
                self.player0.sprite.reset_pending = true;
                self.reset_handles.player0 =
                    Some(self.futures
                        .schedule(RESET_DELAY, VideoEvent::ResetPlayer0, "RESP0"));
            }
            addresses::RESP1 => {
                self.player1.sprite.reset_pending = true;
                self.reset_handles.player1 =
                    Some(self.futures
                        .schedule(RESET_DELAY, VideoEvent::ResetPlayer1, "RESP1"));
            }
            addresses::RESM0 => {
                self.missile0.sprite.reset_pending = true;
                self.reset_handles.missile0 =
                    Some(self.futures
                        .schedule(RESET_DELAY, VideoEvent::ResetMissile0, "RESM0"));
            }
            addresses::RESM1 => {
                self.missile1.sprite.reset_pending = true;
                self.reset_handles.missile1 =
                    Some(self.futures
                        .schedule(RESET_DELAY, VideoEvent::ResetMissile1, "RESM1"));
            }
            addresses::RESBL => {
                self.ball.sprite.reset_pending = true;
                self.reset_handles.ball =
                    Some(self.futures.schedule(RESET_DELAY, VideoEvent::ResetBall, "RESBL"));
            }
            addresses::GRP0 => {
                self.futures
                    .schedule(WRITE_DELAY, VideoEvent::Grp0(value), "GRP0");
            }
            addresses::GRP1 => {
                self.futures
                    .schedule(WRITE_DELAY, VideoEvent::Grp1(value), "GRP1");
            }
            addresses::ENAM0 => {
                self.futures
                    .schedule(WRITE_DELAY, VideoEvent::Enam0(value & 0x02 != 0), "ENAM0");
            }
            addresses::ENAM1 => {
                self.futures
                    .schedule(WRITE_DELAY, VideoEvent::Enam1(value & 0x02 != 0), "ENAM1");
            }
            addresses::ENABL => {
                self.futures
                    .schedule(WRITE_DELAY, VideoEvent::Enabl(value & 0x02 != 0), "ENABL");
            }
            addresses::HMP0 => self.player0.sprite.set_movement(value),
            addresses::HMP1 => self.player1.sprite.set_movement(value),
            addresses::HMM0 => self.missile0.sprite.set_movement(value),
            addresses::HMM1 => self.missile1.sprite.set_movement(value),
            addresses::HMBL => self.ball.sprite.set_movement(value),
            addresses::VDELP0 => self.player0.vertical_delay = value & 0x01 != 0,
            addresses::VDELP1 => self.player1.vertical_delay = value & 0x01 != 0,
            addresses::VDELBL => self.ball.vertical_delay = value & 0x01 != 0,
            addresses::RESMP0 => {
                let locked = value & 0x02 != 0;
                if self.missile0.reset_to_player && !locked {
                    self.missile0.sprite.position = self.player0.sprite.position.clone();
                    self.missile0.sprite.current_pixel = self.player0.sprite.current_pixel;
                    self.missile0.sprite.reset_pixel = self.player0.sprite.reset_pixel;
                }
                self.missile0.reset_to_player = locked;
            }
            addresses::RESMP1 => {
                let locked = value & 0x02 != 0;
                if self.missile1.reset_to_player && !locked {
                    self.missile1.sprite.position = self.player1.sprite.position.clone();
                    self.missile1.sprite.current_pixel = self.player1.sprite.current_pixel;
                    self.missile1.sprite.reset_pixel = self.player1.sprite.reset_pixel;
                }
                self.missile1.reset_to_player = locked;
            }
            addresses::HMCLR => {
                self.player0.sprite.set_movement(0);
                self.player1.sprite.set_movement(0);
                self.missile0.sprite.set_movement(0);
                self.missile1.sprite.set_movement(0);
                self.ball.sprite.set_movement(0);
            }
            addresses::CXCLR => self.collisions.clear(mem),
            _ => return false,
        }
        true
    }

    /// Run the delayed-write scheduler for one color-clock. `pixel` is
    /// where the beam is, for resets landing now.
    pub fn tick_futures(&mut self, pixel: i32) {
        let mut fired = std::mem::take(&mut self.fired);
        self.futures.tick(|event| fired.push(event));
        for event in fired.drain(..) {
            self.service_event(event, pixel);
        }
        self.fired = fired;
    }

    fn service_event(&mut self, event: VideoEvent, pixel: i32) {
        match event {
            VideoEvent::ResetPlayer0 => {
                self.player0.sprite.reset_position(pixel);
                self.reset_handles.player0 = None;
            }
            VideoEvent::ResetPlayer1 => {
                self.player1.sprite.reset_position(pixel);
                self.reset_handles.player1 = None;
            }
            VideoEvent::ResetMissile0 => {
                self.missile0.sprite.reset_position(pixel);
                self.reset_handles.missile0 = None;
            }
            VideoEvent::ResetMissile1 => {
                self.missile1.sprite.reset_position(pixel);
                self.reset_handles.missile1 = None;
            }
            VideoEvent::ResetBall => {
                self.ball.sprite.reset_position(pixel);
                self.reset_handles.ball = None;
            }
            VideoEvent::Grp0(value) => {
                self.player0.grp = value;
                // vertical delay: writing one player's graphics latches
                // the other's delayed buffer
                self.player1.grp_delayed = self.player1.grp;
            }
            VideoEvent::Grp1(value) => {
                self.player1.grp = value;
                self.player0.grp_delayed = self.player0.grp;
                self.ball.enabled_delayed = self.ball.enabled;
            }
            VideoEvent::Enam0(enabled) => self.missile0.enabled = enabled,
            VideoEvent::Enam1(enabled) => self.missile1.enabled = enabled,
            VideoEvent::Enabl(enabled) => self.ball.enabled = enabled,
        }
    }

    /// Advance every sprite one motion-clock.
    pub fn tick_sprites(&mut self) {
        self.player0.tick();
        self.player1.tick();
        self.missile0.tick();
        self.missile1.tick();
        self.ball.tick();
    }

    /// HMOVE: all sprites step 8 pixels right before the comb pulls
    /// them back.
    pub fn prepare_hmove(&mut self) {
        self.player0.sprite.prepare_for_hmove();
        self.player1.sprite.prepare_for_hmove();
        self.missile0.sprite.prepare_for_hmove();
        self.missile1.sprite.prepare_for_hmove();
        self.ball.sprite.prepare_for_hmove();
    }

    /// Resolve one comb count for every sprite.
    pub fn resolve_hmove(&mut self, count: u8, pixel: i32) {
        macro_rules! resolve {
            ($object:ident) => {
                match self.$object.sprite.resolve_hmove(count) {
                    HmoveStep::Tick => self.$object.tick(),
                    HmoveStep::TickWithForcedReset => {
                        if let Some(handle) = self.reset_handles.$object.take() {
                            if self.futures.force(handle).is_some() {
                                self.$object.sprite.reset_position(pixel);
                            }
                        }
                        self.$object.tick();
                    }
                    HmoveStep::Done => {}
                }
            };
        }

        resolve!(player0);
        resolve!(player1);
        resolve!(missile0);
        resolve!(missile1);
        resolve!(ball);
    }

    /// Evaluate the color of the visible pixel at `x`, latch
    /// collisions, and return both the broadcast and the debugging
    /// color signal.
    pub fn pixel(&mut self, x: i32, mem: &mut ChipMemory) -> PixelColors {
        let active = ActiveElements {
            player0: self.player0.pixel(),
            player1: self.player1.pixel(),
            missile0: self.missile0.pixel(),
            missile1: self.missile1.pixel(),
            ball: self.ball.pixel(),
            playfield: self.playfield.bit_at(x),
        };

        self.collisions.latch(active, mem);

        // score mode recolors the playfield per half-screen
        let playfield_color = if self.score_mode {
            if x < VISIBLE_PIXELS / 2 {
                self.colup0
            } else {
                self.colup1
            }
        } else {
            self.colupf
        };

        let (color, element) = if self.priority {
            if active.playfield {
                (playfield_color, alt::PLAYFIELD)
            } else if active.ball {
                (self.colupf, alt::BALL)
            } else if active.player0 {
                (self.colup0, alt::PLAYER0)
            } else if active.missile0 {
                (self.colup0, alt::MISSILE0)
            } else if active.player1 {
                (self.colup1, alt::PLAYER1)
            } else if active.missile1 {
                (self.colup1, alt::MISSILE1)
            } else {
                (self.colubk, alt::BACKGROUND)
            }
        } else if active.player0 {
            (self.colup0, alt::PLAYER0)
        } else if active.missile0 {
            (self.colup0, alt::MISSILE0)
        } else if active.player1 {
            (self.colup1, alt::PLAYER1)
        } else if active.missile1 {
            (self.colup1, alt::MISSILE1)
        } else if active.ball {
            (self.colupf, alt::BALL)
        } else if active.playfield {
            (playfield_color, alt::PLAYFIELD)
        } else {
            (self.colubk, alt::BACKGROUND)
        };

        PixelColors {
            pixel: Some(color),
            alt_pixel: Some(element),
        }
    }
}

impl Default for Video {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::map::extent;

    fn tia_mem() -> ChipMemory {
        ChipMemory::new(
            extent::TIA_ORIGIN,
            extent::TIA_MEMTOP,
            addresses::TIA_READ,
            addresses::TIA_WRITE,
        )
    }

    #[test]
    fn priority_orders_players_over_playfield() {
        let mut mem = tia_mem();
        let mut video = Video::new();
        video.colup0 = 0x42;
        video.colupf = 0x0e;
        video.playfield.pf0 = 0xf0;
        video.player0.grp = 0xff;
        video.player0.start_drawing();

        let colors = video.pixel(0, &mut mem);
        assert_eq!(colors.pixel, Some(0x42));
        assert_eq!(colors.alt_pixel, Some(alt::PLAYER0));

        video.priority = true;
        let colors = video.pixel(0, &mut mem);
        assert_eq!(colors.pixel, Some(0x0e));
        assert_eq!(colors.alt_pixel, Some(alt::PLAYFIELD));
    }

    #[test]
    fn score_mode_recolors_playfield_halves() {
        let mut mem = tia_mem();
        let mut video = Video::new();
        video.colup0 = 0x10;
        video.colup1 = 0x20;
        video.colupf = 0x0e;
        video.score_mode = true;
        video.playfield.pf0 = 0xf0;
        video.playfield.pf1 = 0xff;
        video.playfield.pf2 = 0xff;

        assert_eq!(video.pixel(0, &mut mem).pixel, Some(0x10));
        assert_eq!(video.pixel(100, &mut mem).pixel, Some(0x20));
    }

    #[test]
    fn grp_writes_cross_latch_for_vertical_delay() {
        let mut mem = tia_mem();
        let mut video = Video::new();

        video.service_write(addresses::GRP0, 0xaa, &mut mem);
        video.tick_futures(0);
        video.tick_futures(0);
        assert_eq!(video.player0.grp, 0xaa);

        // writing GRP1 latches player0's delayed buffer
        video.service_write(addresses::GRP1, 0x55, &mut mem);
        video.tick_futures(0);
        video.tick_futures(0);
        assert_eq!(video.player1.grp, 0x55);
        assert_eq!(video.player0.grp_delayed, 0xaa);
    }

    #[test]
    fn reset_lands_after_the_scheduled_delay() {
        let mut mem = tia_mem();
        let mut video = Video::new();

        video.service_write(addresses::RESP0, 0, &mut mem);
        assert!(video.player0.sprite.reset_pending);

        for clock in 0..=4 {
            video.tick_futures(60 + clock);
        }
        assert!(!video.player0.sprite.reset_pending);
        assert_eq!(video.player0.sprite.reset_pixel, 64);
        assert_eq!(video.player0.sprite.current_pixel, 64);
    }
}
