use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The machine's monochrome screen: 32 rows of 64 pixels, `true` is lit.
///
/// Only the clear and draw instructions change it. Renderers get a shared
/// reference once per frame, which is always a whole frame because the
/// interpreter and the renderer take turns on the same thread.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    rows: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            rows: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.rows = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// is the pixel at column `x`, row `y` lit? anything off-screen is dark
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// XOR an 8 pixel wide sprite onto the screen, one byte per row, most
    /// significant bit leftmost. The origin wraps onto the screen once; the
    /// sprite itself is clipped at the right and bottom edges. Returns true if
    /// any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x0 = x as usize % DISPLAY_WIDTH;
        let y0 = y as usize % DISPLAY_HEIGHT;
        let mut collided = false;

        for (r, line) in sprite.iter().enumerate() {
            let y = y0 + r;
            if y >= DISPLAY_HEIGHT {
                break;
            }
            for c in 0..8 {
                let x = x0 + c;
                if x >= DISPLAY_WIDTH {
                    break;
                }
                if *line >> (7 - c) & 1 == 1 {
                    let px = &mut self.rows[y][x];
                    collided |= *px;
                    *px = !*px;
                }
            }
        }
        collided
    }

    /// how many sprite rows starting at row `y` are visible before the
    /// bottom edge clips the rest
    pub fn visible_rows(y: u8, height: usize) -> usize {
        height.min(DISPLAY_HEIGHT - y as usize % DISPLAY_HEIGHT)
    }

    /// (x, y) of every pixel that is lit (`state == true`) or dark
    pub fn pixels_in_state(&self, state: bool) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, px)| **px == state)
                .map(move |(x, _)| (x, y))
        })
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows.iter() {
            let line: String = row.iter().map(|px| if *px { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Display is used by the interpreter to show the framebuffer. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw one complete frame
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates have y growing upwards, so rows go negative
    fn points(&self, frame: &Framebuffer, state: bool) -> Vec<(f64, f64)> {
        frame
            .pixels_in_state(state)
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error> {
        let dark = self.resolution.points(frame, false);
        let lit = self.resolution.points(frame, true);
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &dark,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames: 0 }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    #[allow(unused)]
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}
