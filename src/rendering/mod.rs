//! # Rendering Module
//!
//! Terminal-based rendering system using crossterm for display management.
//!
//! The renderer is a [`MoveObserver`]: it clears and redraws the whole
//! board after every move. Terminal modes are handled by an RAII guard so
//! the screen is restored on every exit path.

use crate::game::{Direction, GameSnapshot, MoveObserver};
use crate::Llm2048Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Write};

/// Raw-mode + alternate-screen guard for the duration of a game session.
///
/// Dropping the guard restores the terminal, including on error paths and
/// panics that unwind.
pub struct TerminalSession;

impl TerminalSession {
    /// Switches the terminal into game mode.
    pub fn enter() -> Llm2048Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Draws the board, score line, and status banners to the terminal.
pub struct TerminalRenderer {
    stdout: io::Stdout,
    best_score: u32,
}

impl TerminalRenderer {
    /// Creates a renderer; `best_score` seeds the best-score display.
    pub fn new(best_score: u32) -> Self {
        Self {
            stdout: io::stdout(),
            best_score,
        }
    }

    /// Color per tile value, brightest for the smallest tiles.
    fn tile_color(value: u32) -> Color {
        match value {
            2 => Color::Green,
            4 => Color::Yellow,
            8 => Color::Blue,
            16 => Color::Cyan,
            32 => Color::Magenta,
            64 => Color::Red,
            128 => Color::DarkGreen,
            256 => Color::DarkYellow,
            512 => Color::DarkBlue,
            1024 => Color::DarkCyan,
            2048 => Color::DarkMagenta,
            _ => Color::Grey,
        }
    }

    fn border_line(size: i32) -> String {
        let mut line = String::from("+");
        for _ in 0..size {
            line.push_str("------+");
        }
        line
    }

    /// Clears the screen and redraws the full state.
    pub fn draw(&mut self, snapshot: &GameSnapshot) -> Llm2048Result<()> {
        self.best_score = self.best_score.max(snapshot.score);

        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        queue!(
            self.stdout,
            Print("Score: "),
            SetForegroundColor(Color::Green),
            Print(snapshot.score),
            ResetColor,
            Print(format!("   Best: {}", self.best_score)),
        )?;

        let border = Self::border_line(snapshot.size);
        let mut row = 1u16;
        for y in 0..snapshot.size {
            queue!(self.stdout, MoveTo(0, row), Print(&border))?;
            row += 1;
            queue!(self.stdout, MoveTo(0, row), Print("|"))?;
            for x in 0..snapshot.size {
                match snapshot.value_at(x, y) {
                    Some(value) => queue!(
                        self.stdout,
                        SetForegroundColor(Self::tile_color(value)),
                        Print(format!("{value:^6}")),
                        ResetColor,
                        Print("|"),
                    )?,
                    None => queue!(self.stdout, Print("      |"))?,
                }
            }
            row += 1;
        }
        queue!(self.stdout, MoveTo(0, row), Print(&border))?;
        row += 2;

        if snapshot.won {
            queue!(
                self.stdout,
                MoveTo(0, row),
                SetForegroundColor(Color::Magenta),
                Print("You made 2048! Keep going."),
                ResetColor,
            )?;
            row += 1;
        }
        if snapshot.over {
            queue!(
                self.stdout,
                MoveTo(0, row),
                SetForegroundColor(Color::Red),
                Print("Game over!"),
                ResetColor,
            )?;
            row += 1;
        }
        queue!(
            self.stdout,
            MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print("Arrows/WASD to move, q to quit"),
            ResetColor,
        )?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl MoveObserver for TerminalRenderer {
    fn on_move(
        &mut self,
        snapshot: &GameSnapshot,
        _direction: Option<Direction>,
    ) -> Llm2048Result<()> {
        self.draw(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_colors_follow_magnitude() {
        assert_eq!(TerminalRenderer::tile_color(2), Color::Green);
        assert_eq!(TerminalRenderer::tile_color(4), Color::Yellow);
        assert_eq!(TerminalRenderer::tile_color(64), Color::Red);
        assert_eq!(TerminalRenderer::tile_color(2048), Color::DarkMagenta);
        // Beyond the win tile there is no dedicated color.
        assert_eq!(TerminalRenderer::tile_color(4096), Color::Grey);
    }

    #[test]
    fn test_border_line_width_tracks_size() {
        assert_eq!(TerminalRenderer::border_line(2), "+------+------+");
        assert_eq!(
            TerminalRenderer::border_line(4),
            "+------+------+------+------+"
        );
    }
}
