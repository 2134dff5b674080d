use std::io::{BufRead, Stdout, StdinLock, Write};

use super::{normalize_retailer, ConfigurationProvider, SetupAnswers};
use crate::models::{MessagingCredentials, RetailerTable, Settings, WatchedItem};
use crate::utils::error::{AppError, Result};

/// Prompts for settings on a line-oriented terminal. Existing values are
/// offered as defaults and taken when the answer is left blank.
pub struct TerminalWizard<R, W> {
    input: R,
    output: W,
}

impl TerminalWizard<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalWizard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, description: &str, default: &str) -> Result<String> {
        loop {
            if default.is_empty() {
                write!(self.output, "{}: ", description)?;
            } else {
                write!(self.output, "{} ({}): ", description, default)?;
            }
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AppError::Setup(format!(
                    "input closed while asking for {}",
                    description
                )));
            }

            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            if !default.is_empty() {
                return Ok(default.to_string());
            }
            writeln!(self.output, "A value is required.")?;
        }
    }

    fn ask_retailer(&mut self, retailers: &RetailerTable) -> Result<String> {
        let description = format!("Item retailer name [{}]", retailers.describe_keys());
        loop {
            let answer = self.ask(&description, "")?;
            match normalize_retailer(&answer, retailers) {
                Ok(retailer) => return Ok(retailer),
                Err(AppError::Validation(message)) => writeln!(self.output, "{}", message)?,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: BufRead, W: Write> ConfigurationProvider for TerminalWizard<R, W> {
    fn configure(&mut self, base: Settings, retailers: &RetailerTable) -> Result<Settings> {
        writeln!(self.output, "Settings are incomplete. Answer the prompts below to finish setup.")?;

        let phone = self.ask("Phone number to receive text alerts", &base.phone)?;
        let sid = self.ask("Twilio SID", &base.twilio.sid)?;
        let token = self.ask("Twilio Token", &base.twilio.token)?;
        let number = self.ask("Twilio phone number to send from", &base.twilio.number)?;

        let first_item = if base.items.is_empty() {
            let name = self.ask("Item name for stock watching", "")?;
            let retailer = self.ask_retailer(retailers)?;
            let url = self.ask("Item URL", "")?;
            Some(WatchedItem::new(name, retailer, url))
        } else {
            None
        };

        let answers = SetupAnswers {
            phone,
            credentials: MessagingCredentials { sid, token, number },
            first_item,
        };
        Ok(answers.apply(base))
    }
}
