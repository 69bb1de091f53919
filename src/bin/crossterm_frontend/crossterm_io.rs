use chip8_vm::emulator::config::{Palette, Rgb};
use chip8_vm::emulator::display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8_vm::emulator::output::EmulatorOutput;

use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, ErrorKind};
use std::io::{self, stdout, Stdout, Write};

/// Each terminal cell shows two pixel rows: the upper half block in the
/// foreground colour, the lower half in the background colour.
const UPPER_HALF: char = '▀';
const ROWS: usize = SCREEN_HEIGHT / 2;
const BELL: char = '\x07';

pub fn to_io(error: ErrorKind) -> io::Error {
    match error {
        ErrorKind::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::Other, format!("{:?}", other)),
    }
}

pub struct CrosstermOutput {
    out: Stdout,
    palette: Palette,
    tone: bool,
}

impl CrosstermOutput {
    /// Take over the terminal: alternate screen, raw mode and a frame around the screen.
    pub fn new(palette: Palette) -> io::Result<CrosstermOutput> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All)).map_err(to_io)?;
        terminal::enable_raw_mode().map_err(to_io)?;
        let mut output = CrosstermOutput {
            out,
            palette,
            tone: false,
        };
        output.draw_border()?;
        output.draw(&Display::new())?;
        Ok(output)
    }

    fn draw_border(&mut self) -> io::Result<()> {
        let horizontal: String = "━".repeat(SCREEN_WIDTH);
        let bottom = ROWS as u16 + 1;
        let right = SCREEN_WIDTH as u16 + 1;
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            Print(format!("┏{}┓", horizontal)),
            cursor::MoveTo(0, bottom),
            Print(format!("┗{}┛", horizontal))
        )
        .map_err(to_io)?;
        for y in 1..bottom {
            queue!(
                self.out,
                cursor::MoveTo(0, y),
                Print('┃'),
                cursor::MoveTo(right, y),
                Print('┃')
            )
            .map_err(to_io)?;
        }
        self.out.flush()
    }

    fn color(&self, lit: bool) -> Color {
        let Rgb(r, g, b) = if lit {
            self.palette.foreground
        } else {
            self.palette.background
        };
        Color::Rgb { r, g, b }
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen);
    }
}

impl EmulatorOutput for CrosstermOutput {
    fn draw(&mut self, display: &Display) -> io::Result<()> {
        for row in 0..ROWS {
            queue!(self.out, cursor::MoveTo(1, row as u16 + 1)).map_err(to_io)?;
            for x in 0..SCREEN_WIDTH {
                let top = self.color(display.get(x, 2 * row));
                let bottom = self.color(display.get(x, 2 * row + 1));
                queue!(
                    self.out,
                    SetForegroundColor(top),
                    SetBackgroundColor(bottom),
                    Print(UPPER_HALF)
                )
                .map_err(to_io)?;
            }
        }
        queue!(self.out, ResetColor).map_err(to_io)?;
        self.out.flush()
    }

    fn set_tone(&mut self, on: bool) -> io::Result<()> {
        if on && !self.tone {
            queue!(self.out, Print(BELL)).map_err(to_io)?;
            self.out.flush()?;
        }
        self.tone = on;
        Ok(())
    }
}
