//! Television specifications.
//!
//! From the Stella Programmer's Guide: "Each scan line starts with 68
//! clock counts of horizontal blank (not seen on the TV screen)
//! followed by 160 clock counts to fully scan one line of TV picture."
//! Horizontal timing is common to both specifications; vertical timing
//! and the palette differ between NTSC and PAL.

use super::colors;

/// Color-clocks of horizontal blank at the start of every scanline.
pub const CLOCKS_PER_HBLANK: i32 = 68;

/// Color-clocks of visible picture per scanline.
pub const CLOCKS_PER_VISIBLE: i32 = 160;

/// Total color-clocks per scanline.
pub const CLOCKS_PER_SCANLINE: i32 = 228;

/// The absolute maximum number of scanlines an NTSC television can
/// show. Beyond this the signal must be PAL.
pub const MAX_NTSC_SCANLINES: i32 = 276;

/// One of the two broadcast specifications.
pub struct Specification {
    pub id: &'static str,
    pub palette: &'static [u32; 128],

    /// Scanline counts the programmer's guide recommends for each
    /// portion of the frame.
    pub scanlines_vsync: i32,
    pub scanlines_vblank: i32,
    pub scanlines_visible: i32,
    pub scanlines_overscan: i32,
    pub scanlines_total: i32,

    /// Color-clocks VSYNC must be held for a frame change.
    pub vsync_clocks: i32,

    /// The scanlines where the visible portion of the screen is safe to
    /// begin and end.
    pub ideal_top: i32,
    pub ideal_bottom: i32,

    pub frames_per_second: f32,
}

impl Specification {
    /// Translate a color signal to RGB. `None` is video black.
    #[must_use]
    pub fn color(&self, signal: Option<u8>) -> colors::Rgb {
        match signal {
            Some(col) => colors::lookup(self.palette, col),
            None => colors::VIDEO_BLACK,
        }
    }
}

pub static SPEC_NTSC: Specification = Specification {
    id: "NTSC",
    palette: &colors::PALETTE_NTSC,
    scanlines_vsync: 3,
    scanlines_vblank: 37,
    scanlines_visible: 192,
    scanlines_overscan: 30,
    scanlines_total: 262,
    vsync_clocks: 3,
    ideal_top: 40,
    ideal_bottom: 232,
    frames_per_second: 60.0,
};

pub static SPEC_PAL: Specification = Specification {
    id: "PAL",
    palette: &colors::PALETTE_PAL,
    scanlines_vsync: 3,
    scanlines_vblank: 45,
    scanlines_visible: 228,
    scanlines_overscan: 36,
    scanlines_total: 312,
    vsync_clocks: 3,
    ideal_top: 48,
    ideal_bottom: 276,
    frames_per_second: 50.0,
};
