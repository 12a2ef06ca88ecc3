//! Headless capture: an accumulating screen renderer and PNG
//! screenshots.
//!
//! `Screen` is the reference implementation of the renderer sink
//! contract. It shares its framebuffer through a handle so the caller
//! can read pixels back after the television has taken ownership of
//! the renderer.

use std::cell::RefCell;
use std::error::Error as StdError;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use emu_core::Error;

use crate::television::colors::Rgb;
use crate::television::{Renderer, CLOCKS_PER_SCANLINE};

/// Framebuffer width: one cell per color-clock, hblank included.
pub const FB_WIDTH: usize = CLOCKS_PER_SCANLINE as usize;

/// Framebuffer height: enough for a full PAL frame.
pub const FB_HEIGHT: usize = 312;

/// The accumulated state of the current frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// ARGB32 pixels, row-major.
    pub pixels: Vec<u32>,
    pub frame_num: i32,
    pub scanlines: i32,
}

impl Frame {
    fn new() -> Self {
        Self {
            pixels: vec![0xff00_0000; FB_WIDTH * FB_HEIGHT],
            frame_num: 0,
            scanlines: 0,
        }
    }
}

/// Shared view of the capture buffer.
pub type FrameHandle = Rc<RefCell<Frame>>;

/// A renderer that accumulates pixels into a shared framebuffer.
pub struct Screen {
    frame: FrameHandle,
    show_vblank: bool,
}

impl Screen {
    /// Create the renderer and the read-back handle.
    #[must_use]
    pub fn new() -> (Self, FrameHandle) {
        let frame = Rc::new(RefCell::new(Frame::new()));
        (
            Self {
                frame: Rc::clone(&frame),
                show_vblank: false,
            },
            frame,
        )
    }

    /// Also record pixels sent during vertical blank (debugging).
    pub fn set_show_vblank(&mut self, show: bool) {
        self.show_vblank = show;
    }
}

impl Renderer for Screen {
    fn new_frame(&mut self, frame: i32) -> Result<(), Error> {
        let mut fb = self.frame.borrow_mut();
        fb.frame_num = frame;
        fb.scanlines = 0;
        fb.pixels.fill(0xff00_0000);
        Ok(())
    }

    fn new_scanline(&mut self, scanline: i32) -> Result<(), Error> {
        let mut fb = self.frame.borrow_mut();
        fb.scanlines = fb.scanlines.max(scanline);
        Ok(())
    }

    fn set_pixel(&mut self, x: i32, y: i32, rgb: Rgb, vblank: bool) -> Result<(), Error> {
        if vblank && !self.show_vblank {
            return Ok(());
        }
        if x < 0 || y < 0 || x >= FB_WIDTH as i32 || y >= FB_HEIGHT as i32 {
            return Ok(());
        }
        let mut fb = self.frame.borrow_mut();
        let index = y as usize * FB_WIDTH + x as usize;
        fb.pixels[index] = rgb.argb();
        Ok(())
    }

    fn set_alt_pixel(&mut self, _x: i32, _y: i32, _rgb: Rgb, _vblank: bool) -> Result<(), Error> {
        // the capture screen records the broadcast picture only
        Ok(())
    }
}

/// Save the current frame as a PNG file.
///
/// The framebuffer is ARGB32; the encoder wants RGBA bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(frame: &Frame, path: &Path) -> Result<(), Box<dyn StdError>> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, FB_WIDTH as u32, FB_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity(FB_WIDTH * FB_HEIGHT * 4);
    for &pixel in &frame.pixels {
        rgba.push(((pixel >> 16) & 0xff) as u8);
        rgba.push(((pixel >> 8) & 0xff) as u8);
        rgba.push((pixel & 0xff) as u8);
        rgba.push(0xff);
    }

    png_writer.write_image_data(&rgba)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::television::colors::Rgb;

    #[test]
    fn pixels_accumulate_through_the_handle() {
        let (mut screen, handle) = Screen::new();
        let red = Rgb {
            red: 0xff,
            green: 0,
            blue: 0,
        };

        screen.set_pixel(10, 5, red, false).unwrap();
        assert_eq!(handle.borrow().pixels[5 * FB_WIDTH + 10], 0xffff0000);

        // vblank pixels are dropped by default
        screen.set_pixel(11, 5, red, true).unwrap();
        assert_eq!(handle.borrow().pixels[5 * FB_WIDTH + 11], 0xff000000);
    }

    #[test]
    fn new_frame_clears_the_buffer() {
        let (mut screen, handle) = Screen::new();
        let white = Rgb {
            red: 0xff,
            green: 0xff,
            blue: 0xff,
        };
        screen.set_pixel(0, 0, white, false).unwrap();
        screen.new_frame(2).unwrap();
        assert_eq!(handle.borrow().frame_num, 2);
        assert_eq!(handle.borrow().pixels[0], 0xff000000);
    }
}
