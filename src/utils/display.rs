//! Display and output formatting utilities

use crate::automaton::{CellAlphabet, Dimension, RuleTable};
use crate::simulation::Generation;
use itertools::Itertools;
use std::io::{self, Write};
use std::time::Duration;

/// Text rendering of generations and rule tables
pub struct GridFormatter;

impl GridFormatter {
    /// A 2D generation with a header line
    pub fn format_frame(generation: &Generation, alphabet: &CellAlphabet) -> String {
        let mut output = format!(
            "Generation {} (living: {})\n",
            generation.index,
            generation.grid.living_count()
        );
        output.push_str(&alphabet.render(&generation.grid));
        output
    }

    /// Lookup table in diagram order, or a summary for large neighborhoods
    pub fn format_rule_table(table: &RuleTable, alphabet: &CellAlphabet) -> String {
        let mut output = format!(
            "Rule {} over {}-cell neighborhoods ({} of {} produce a live cell)\n",
            table.rule(),
            table.neighborhood_size(),
            table.live_entries(),
            table.table().len()
        );

        if table.neighborhood_size() == Dimension::One.neighborhood_size() {
            for (index, neighborhood, next) in table.entries() {
                output.push_str(&format!(
                    "{} |{}| -> |{}|\n",
                    index,
                    alphabet.format(&neighborhood),
                    alphabet.symbol(next)
                ));
            }
        } else {
            let bits = table.to_string();
            for line in &bits.chars().chunks(64) {
                output.push_str(&line.collect::<String>());
                output.push('\n');
            }
        }

        output
    }
}

/// Writes frames in place, pausing between them
pub struct Animator<W: Write> {
    out: W,
    delay: Duration,
    clear: bool,
    previous_lines: usize,
}

impl<W: Write> Animator<W> {
    pub fn new(out: W, delay: Duration, clear: bool) -> Self {
        Self {
            out,
            delay,
            clear,
            previous_lines: 0,
        }
    }

    /// Replace the previous frame with `frame`
    pub fn show(&mut self, frame: &str) -> io::Result<()> {
        if self.clear && self.previous_lines > 0 {
            // cursor up over the last frame, then erase to the end of screen
            write!(self.out, "\x1b[{}A\x1b[J", self.previous_lines)?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.previous_lines = frame.lines().count();

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
