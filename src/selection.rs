//! Operator selection of which candidate updates to run
//!
//! Candidates are shown grouped by workspace and numbered; the operator
//! answers with numbers and ranges. The chosen subset keeps candidate order.

use crate::domain::Update;
use crate::output::render_candidates;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Chooses the subset of candidates to execute
pub trait Selector {
    /// Returns the chosen candidates, in candidate order. Empty means abort.
    fn select(&mut self, candidates: &[Update]) -> io::Result<Vec<Update>>;
}

/// Selects every candidate without asking (`--yes`)
#[derive(Debug, Default)]
pub struct SelectAll;

impl Selector for SelectAll {
    fn select(&mut self, candidates: &[Update]) -> io::Result<Vec<Update>> {
        Ok(candidates.to_vec())
    }
}

/// Interactive selection on a line-based terminal
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl PromptSelector<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    /// Prompt using the given reader and writer
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Selector for PromptSelector<R, W> {
    fn select(&mut self, candidates: &[Update]) -> io::Result<Vec<Update>> {
        write!(self.output, "{}", render_candidates(candidates))?;

        loop {
            write!(
                self.output,
                "\n{}",
                "Select updates to apply (e.g. 1 3 5-7, a = all, enter = none): ".bold()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Vec::new());
            }

            match parse_selection(&line, candidates.len()) {
                Ok(indices) => {
                    return Ok(indices.into_iter().map(|i| candidates[i].clone()).collect());
                }
                Err(message) => {
                    writeln!(self.output, "{}", message.red())?;
                }
            }
        }
    }
}

/// Parse an answer into sorted, de-duplicated zero-based indices.
///
/// Accepts 1-based numbers and inclusive ranges separated by spaces or
/// commas, `a`/`all` for everything, and empty/`q`/`none` for nothing.
pub fn parse_selection(answer: &str, count: usize) -> Result<Vec<usize>, String> {
    let answer = answer.trim().to_lowercase();

    match answer.as_str() {
        "" | "q" | "quit" | "none" => return Ok(Vec::new()),
        "a" | "all" => return Ok((0..count).collect()),
        _ => {}
    }

    let mut chosen = Vec::new();
    for token in answer.split([' ', ',']).filter(|t| !t.is_empty()) {
        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (parse_index(start, count)?, parse_index(end, count)?),
            None => {
                let index = parse_index(token, count)?;
                (index, index)
            }
        };

        if start > end {
            return Err(format!("Invalid range: {}", token));
        }
        chosen.extend(start..=end);
    }

    chosen.sort_unstable();
    chosen.dedup();
    Ok(chosen)
}

fn parse_index(raw: &str, count: usize) -> Result<usize, String> {
    let number: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("Not a number: {}", raw))?;

    if number == 0 || number > count {
        return Err(format!("Choose numbers between 1 and {}", count));
    }
    Ok(number - 1)
}
