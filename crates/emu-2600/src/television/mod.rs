//! The television receiver.
//!
//! The TIA knows nothing about frames or scanlines; it emits a stream
//! of per-color-clock signal attributes. The television derives frame,
//! scanline and horizontal position from the sync signals, learns the
//! visible extent of the screen, classifies the signal as NTSC or PAL,
//! and forwards pixels to its renderers.

pub mod colors;
mod specification;

use emu_core::Error;

pub use specification::{
    Specification, CLOCKS_PER_HBLANK, CLOCKS_PER_SCANLINE, CLOCKS_PER_VISIBLE,
    MAX_NTSC_SCANLINES, SPEC_NTSC, SPEC_PAL,
};

/// A color signal: a 7-bit palette entry, or video black.
pub type ColorSignal = Option<u8>;

/// Everything the TIA drives onto the video output in one color-clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalAttributes {
    pub vsync: bool,
    pub vblank: bool,
    /// Start-of-scanline marker.
    pub frontporch: bool,
    pub hsync: bool,
    pub cburst: bool,
    pub pixel: ColorSignal,
    /// The element-identity color for debugging renderers.
    pub alt_pixel: ColorSignal,
    /// An audio sample, present every 114 color-clocks.
    pub audio: Option<i16>,
}

/// Requests for `Television::get_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateReq {
    Framenum,
    Scanline,
    HorizPos,
    VisibleTop,
    VisibleBottom,
}

/// The pixel/audio sink contract. Renderers may fail; the television
/// propagates their errors.
pub trait Renderer {
    /// A new frame has started.
    ///
    /// # Errors
    ///
    /// Renderer-defined.
    fn new_frame(&mut self, frame: i32) -> Result<(), Error>;

    /// A new scanline has started.
    ///
    /// # Errors
    ///
    /// Renderer-defined.
    fn new_scanline(&mut self, scanline: i32) -> Result<(), Error>;

    /// A pixel, in screen coordinates (x 0..227 including hblank).
    ///
    /// # Errors
    ///
    /// Renderer-defined.
    fn set_pixel(&mut self, x: i32, y: i32, rgb: colors::Rgb, vblank: bool) -> Result<(), Error>;

    /// The same pixel through the alternative (debugging) palette.
    ///
    /// # Errors
    ///
    /// Renderer-defined.
    fn set_alt_pixel(&mut self, x: i32, y: i32, rgb: colors::Rgb, vblank: bool)
        -> Result<(), Error>;
}

/// The television interface the console drives.
pub trait Television {
    /// Receive one color-clock of signal.
    ///
    /// # Errors
    ///
    /// Renderer failures propagate; timing violations do not - they set
    /// the out-of-spec flag instead.
    fn signal(&mut self, sig: SignalAttributes) -> Result<(), Error>;

    /// Query derived state.
    ///
    /// # Errors
    ///
    /// `Error::UnknownTvRequest` for requests this television cannot
    /// answer.
    fn get_state(&self, request: StateReq) -> Result<i32, Error>;

    /// The specification currently in force.
    fn spec(&self) -> &'static Specification;

    /// Whether the signal has strayed from the specification.
    fn out_of_spec(&self) -> bool;

    /// Return to the power-on state.
    fn reset(&mut self);
}

/// Which specification to assume at power-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TvType {
    #[default]
    Auto,
    Ntsc,
    Pal,
}

/// The reference television implementation: a television without a
/// screen. Fuller implementations can wrap it.
pub struct Basic {
    spec: &'static Specification,
    /// Auto-detection reclassifies NTSC as PAL when the frame runs long.
    auto_spec: bool,

    out_of_spec: bool,

    /// Set once the scanline count passes the specification total
    /// without a VSYNC; pixels are suppressed until the next frame.
    end_of_screen: bool,

    horiz_pos: i32,
    frame_num: i32,
    scanline: i32,

    prev_signal: SignalAttributes,

    /// Consecutive color-clocks VSYNC has been held.
    vsync_count: i32,

    visible_top: i32,
    visible_bottom: i32,
    pending_visible_top: i32,
    pending_visible_bottom: i32,

    renderers: Vec<Box<dyn Renderer>>,
}

impl Basic {
    #[must_use]
    pub fn new(tv_type: TvType) -> Self {
        let (spec, auto_spec): (&'static Specification, bool) = match tv_type {
            TvType::Auto => (&SPEC_NTSC, true),
            TvType::Ntsc => (&SPEC_NTSC, false),
            TvType::Pal => (&SPEC_PAL, false),
        };

        let mut tv = Self {
            spec,
            auto_spec,
            out_of_spec: false,
            end_of_screen: false,
            horiz_pos: 0,
            frame_num: 0,
            scanline: 0,
            prev_signal: SignalAttributes::default(),
            vsync_count: 0,
            visible_top: 0,
            visible_bottom: 0,
            pending_visible_top: 0,
            pending_visible_bottom: 0,
            renderers: Vec::new(),
        };
        tv.reset();
        tv
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.push(renderer);
    }

    fn flag_out_of_spec(&mut self, what: &str) {
        if !self.out_of_spec {
            log::warn!("out of spec: {what}");
        }
        self.out_of_spec = true;
    }

    /// Check an on/off edge lands within its documented window.
    fn check_edge(&mut self, now: bool, prev: bool, on: (i32, i32), off: (i32, i32), what: &str) {
        if now && !prev {
            if self.horiz_pos < on.0 || self.horiz_pos > on.1 {
                self.flag_out_of_spec(&format!("bad {what} (on at {})", self.horiz_pos));
            }
        } else if !now && prev {
            if self.horiz_pos < off.0 || self.horiz_pos > off.1 {
                self.flag_out_of_spec(&format!("bad {what} (off at {})", self.horiz_pos));
            }
        }
    }
}

impl Television for Basic {
    fn signal(&mut self, sig: SignalAttributes) -> Result<(), Error> {
        self.check_edge(
            sig.hsync,
            self.prev_signal.hsync,
            (-52, -49),
            (-36, -33),
            "HSYNC",
        );
        self.check_edge(
            sig.cburst,
            self.prev_signal.cburst,
            (-28, -17),
            (-19, -16),
            "CBURST",
        );

        // frame change on the release of a sustained VSYNC
        if sig.vsync {
            self.vsync_count += 1;
        } else {
            if self.vsync_count >= self.spec.vsync_clocks {
                self.end_of_screen = false;
                self.frame_num += 1;
                self.scanline = 0;

                self.visible_top = self.pending_visible_top;
                self.visible_bottom = self.pending_visible_bottom;

                for renderer in &mut self.renderers {
                    renderer.new_frame(self.frame_num)?;
                }

                self.pending_visible_top = self.spec.ideal_top;
                self.pending_visible_bottom = self.spec.ideal_bottom;
            }
            self.vsync_count = 0;
        }

        if sig.frontporch {
            self.horiz_pos = -CLOCKS_PER_HBLANK;
            self.scanline += 1;

            for renderer in &mut self.renderers {
                renderer.new_scanline(self.scanline)?;
            }

            // reclassify a long frame as PAL before giving up on it
            if self.auto_spec
                && std::ptr::eq(self.spec, &SPEC_NTSC)
                && self.scanline > MAX_NTSC_SCANLINES
            {
                self.spec = &SPEC_PAL;
                log::debug!("auto-detected PAL signal at scanline {}", self.scanline);
            }

            if self.scanline > self.spec.scanlines_total {
                // no VSYNC arrived; continue with an implied one
                self.flag_out_of_spec("frame too long (no VSYNC)");
                self.end_of_screen = true;
            }
        } else {
            self.horiz_pos += 1;
            if self.horiz_pos > CLOCKS_PER_VISIBLE {
                self.flag_out_of_spec("no FRONTPORCH");
            }
        }

        // push the learned screen limits outwards
        if !sig.vblank {
            if self.end_of_screen && self.scanline > self.pending_visible_bottom {
                self.pending_visible_bottom =
                    (self.scanline + 2).min(self.spec.scanlines_total);
            }
            if self.scanline < self.pending_visible_top {
                self.pending_visible_top = (self.scanline - 2).max(0);
            }
        }

        self.prev_signal = sig;

        if !self.end_of_screen {
            let x = self.horiz_pos + CLOCKS_PER_HBLANK;
            let y = self.scanline;

            let rgb = self.spec.color(sig.pixel);
            for renderer in &mut self.renderers {
                renderer.set_pixel(x, y, rgb, sig.vblank)?;
            }

            let alt = match sig.alt_pixel {
                Some(element) => colors::lookup_alt(element),
                None => colors::VIDEO_BLACK,
            };
            for renderer in &mut self.renderers {
                renderer.set_alt_pixel(x, y, alt, sig.vblank)?;
            }
        }

        Ok(())
    }

    fn get_state(&self, request: StateReq) -> Result<i32, Error> {
        Ok(match request {
            StateReq::Framenum => self.frame_num,
            StateReq::Scanline => self.scanline,
            StateReq::HorizPos => self.horiz_pos,
            StateReq::VisibleTop => self.visible_top,
            StateReq::VisibleBottom => self.visible_bottom,
        })
    }

    fn spec(&self) -> &'static Specification {
        self.spec
    }

    fn out_of_spec(&self) -> bool {
        self.out_of_spec
    }

    fn reset(&mut self) {
        self.horiz_pos = -CLOCKS_PER_HBLANK;
        self.frame_num = 0;
        self.scanline = 0;
        self.vsync_count = 0;
        self.out_of_spec = false;
        self.end_of_screen = false;
        self.prev_signal = SignalAttributes::default();
        self.pending_visible_top = self.spec.ideal_top;
        self.pending_visible_bottom = self.spec.ideal_bottom;
        self.visible_top = self.spec.ideal_top;
        self.visible_bottom = self.spec.ideal_bottom;
    }
}
