//! Terminal rendition of the report pages.

use anyhow::{anyhow, Result};
use report_core::page::PageDisplay;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

const STEP_TITLES: [&str; 6] = [
    "Report an issue",
    "What kind of issue?",
    "Details",
    "Location",
    "Contact details",
    "Thank you",
];

pub struct ConsolePage {
    reference_code: Option<String>,
}

impl ConsolePage {
    pub fn new() -> Self {
        Self {
            reference_code: None,
        }
    }
}

impl PageDisplay for ConsolePage {
    fn show_step(&mut self, index: usize) {
        match STEP_TITLES.get(index) {
            Some(title) => println!("\n== {title} =="),
            None => println!("\n== Step {} ==", index + 1),
        }
    }

    fn set_contact_form_visible(&mut self, visible: bool) {
        if visible {
            println!("Please enter your name and email.");
        }
    }

    fn set_reference_visible(&mut self, visible: bool) {
        match (&self.reference_code, visible) {
            (Some(code), true) => println!("Your reference number: {code}"),
            _ => println!("Your report was submitted anonymously."),
        }
    }

    fn set_reference_code(&mut self, code: &str) {
        self.reference_code = Some(code.to_string());
    }

    fn set_address_input(&mut self, text: &str) {
        println!("Address: {text}");
    }

    fn alert(&mut self, message: &str) {
        println!("! {message}");
    }
}

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    pub async fn ask(&mut self, question: &str) -> Result<String> {
        println!("{question}");
        let line = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| anyhow!("input closed before the report was finished"))?;
        Ok(line.trim().to_string())
    }
}
