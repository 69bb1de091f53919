use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// The 64x32 monochrome frame buffer, row-major.
///
/// Only the clear and draw instructions change it. Both raise the redraw
/// flag, which the driving loop takes before handing the frame to a renderer.
#[derive(Clone)]
pub struct Display {
    pixels: [bool; SCREEN_SIZE],
    redraw: bool,
}

impl Display {
    pub fn new() -> Display {
        Display {
            pixels: [false; SCREEN_SIZE],
            redraw: false,
        }
    }

    pub(crate) fn from_pixels(pixels: [bool; SCREEN_SIZE]) -> Display {
        Display {
            pixels,
            redraw: true,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [false; SCREEN_SIZE];
        self.redraw = true;
    }

    /// XOR a lit sprite bit into the pixel at (x, y).
    /// Returns true if the pixel was lit before, i.e. it was switched off.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y * SCREEN_WIDTH + x];
        let collided = *pixel;
        *pixel = !*pixel;
        collided
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool; SCREEN_SIZE] {
        &self.pixels
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(SCREEN_WIDTH)
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Read and reset the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }
}

/// Two displays are equal when they show the same image.
impl PartialEq for Display {
    fn eq(&self, other: &Self) -> bool {
        self.pixels[..] == other.pixels[..]
    }
}

impl Eq for Display {}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for lit in row {
                write!(f, "{}", if *lit { "#" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Display (redraw: {})", self.redraw)?;
        for row in self.rows() {
            for lit in row {
                write!(f, "{}", if *lit { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
