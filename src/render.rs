use std::{
    io::{self, Stdout, Write},
    thread,
    time::{Duration, Instant},
};

use crossterm::{
    cursor, execute, queue, style,
    terminal::{self, ClearType},
};

use crate::{
    map::{Direction, Map, Tile},
    Error,
};

const LEGEND: &str = "Legend: @ = Robot, O or [] = Box, # = Wall, . = Empty space";

/// Draws the warehouse in the terminal, one frame per move.
pub struct Animator {
    term: Stdout,
    frame_interval: Duration,
    last_frame_time: Option<Instant>,
}

impl Animator {
    pub fn new(fps: u32) -> Self {
        assert!(
            (1..=1000).contains(&fps),
            "FPS out of range 1..=1000 isn't supported"
        );
        Self {
            term: io::stdout(),
            frame_interval: Duration::from_millis((1000 / fps) as u64),
            last_frame_time: None,
        }
    }

    pub fn start<T: Tile>(
        &mut self,
        map: &Map<T>,
        next_move: Option<Direction>,
    ) -> Result<(), Error> {
        execute!(self.term, cursor::Hide).map_err(Error::TerminalError)?;
        self.frame(map, next_move)
    }

    /// Draws `map`, then holds until the frame interval has passed.
    pub fn frame<T: Tile>(
        &mut self,
        map: &Map<T>,
        next_move: Option<Direction>,
    ) -> Result<(), Error> {
        self.render(map, next_move).map_err(Error::TerminalError)?;

        let now = Instant::now();
        if let Some(last_frame_time) = self.last_frame_time {
            let sleep_interval = self
                .frame_interval
                .saturating_sub(now.duration_since(last_frame_time));
            if !sleep_interval.is_zero() {
                thread::sleep(sleep_interval);
            }
        }
        self.last_frame_time = Some(Instant::now());

        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), Error> {
        execute!(self.term, style::ResetColor, cursor::Show).map_err(Error::TerminalError)
    }

    fn render<T: Tile>(&mut self, map: &Map<T>, next_move: Option<Direction>) -> io::Result<()> {
        let (term_col_n, term_row_n) = terminal::size()?;
        // Map, blank line, move line and legend.
        let expect_row_n = map.row_n() + 3;
        if (term_col_n as usize) < map.col_n() || (term_row_n as usize) < expect_row_n {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                Error::NotEnoughTerminalSpace(
                    term_row_n as usize,
                    term_col_n as usize,
                    expect_row_n,
                    map.col_n(),
                ),
            ));
        }

        queue!(
            self.term,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        for line in map.to_string().lines() {
            queue!(self.term, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        let move_line = match next_move {
            Some(dir) => format!("Next move: {}", dir),
            None => "Final state".to_string(),
        };
        queue!(
            self.term,
            cursor::MoveToNextLine(1),
            style::Print(move_line),
            cursor::MoveToNextLine(1),
            style::Print(LEGEND),
            cursor::MoveToNextLine(1)
        )?;
        self.term.flush()
    }
}
