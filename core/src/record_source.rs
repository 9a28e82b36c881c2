//! Sources of additional mortgage records.
//!
//! The interactive prompt is one implementation; the scoring core only
//! sees the `RecordSource` trait, so tests never block on a terminal.

use crate::{
    error::{RiskError, RiskResult},
    portfolio::NewMortgage,
};
use std::io::{BufRead, Write};

pub trait RecordSource {
    fn name(&self) -> &'static str;

    /// Next mortgage, or `None` when the source is exhausted.
    fn next_mortgage(&mut self) -> RiskResult<Option<NewMortgage>>;
}

/// Parse a monetary amount typed by a user.
pub fn parse_amount(field: &'static str, input: &str) -> RiskResult<f64> {
    let trimmed = input.trim();
    let value: f64 = trimmed.parse().map_err(|_| RiskError::Parse {
        field,
        input: trimmed.to_string(),
    })?;
    if !value.is_finite() {
        return Err(RiskError::Parse {
            field,
            input: trimmed.to_string(),
        });
    }
    Ok(value)
}

/// Blocking prompt that asks for exactly one mortgage.
pub struct ConsolePrompt<R, W> {
    input:    R,
    output:   W,
    finished: bool,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            finished: false,
        }
    }

    fn ask(&mut self, prompt: &str) -> RiskResult<Option<String>> {
        write!(self.output, "{prompt}").map_err(|e| RiskError::io("<stdout>", e))?;
        self.output.flush().map_err(|e| RiskError::io("<stdout>", e))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| RiskError::io("<stdin>", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_amount(&mut self, prompt: &str, field: &'static str) -> RiskResult<f64> {
        match self.ask(prompt)? {
            Some(text) => parse_amount(field, &text),
            None => Err(RiskError::Parse {
                field,
                input: String::new(),
            }),
        }
    }
}

impl<R: BufRead, W: Write> RecordSource for ConsolePrompt<R, W> {
    fn name(&self) -> &'static str { "console" }

    fn next_mortgage(&mut self) -> RiskResult<Option<NewMortgage>> {
        if self.finished {
            return Ok(None);
        }
        self.finished = true;

        let address = match self.ask("Enter the address: ")? {
            Some(a) if !a.trim().is_empty() => a.trim().to_string(),
            _ => return Ok(None),
        };
        let loan_amount = self.ask_amount("Enter the loan amount: ", "loan_amount")?;
        let property_value = self.ask_amount("Enter the property value: ", "property_value")?;

        Ok(Some(NewMortgage::new(address, loan_amount, property_value)))
    }
}
