use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use envconfig::Envconfig;
use netlog_decode::api::OutputRecord;
use netlog_decode::config::Config;
use netlog_decode::event::LogDocument;
use netlog_decode::pipeline;

use crate::save::{save_outputs, InquirePrompt, OutputPaths, OverwritePrompt, SaveOutcome};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a browser network-capture log (JSON with an `events` list)
    input: PathBuf,
}

impl Cli {
    pub fn run() -> Result<()> {
        let command = Cli::parse();
        let config = Config::init_from_env().context("invalid configuration")?;
        command.execute(&config, &InquirePrompt)?;
        Ok(())
    }

    pub fn new(input: PathBuf) -> Self {
        Cli { input }
    }

    /// Returns the decoded records, whether or not they ended up on disk.
    pub fn execute(
        &self,
        config: &Config,
        prompt: &dyn OverwritePrompt,
    ) -> Result<Vec<OutputRecord>> {
        println!("Processing: {}", self.input.display());

        let document = LogDocument::from_path(&self.input)
            .with_context(|| format!("failed to load {}", self.input.display()))?;

        let records = if config.parallel {
            pipeline::scan_parallel(&document)
        } else {
            pipeline::scan(&document)
        };

        if records.is_empty() {
            println!("No decodable base64 payloads found.");
            return Ok(records);
        }

        let paths = OutputPaths::for_input(&config.output_dir, &self.input);
        match save_outputs(&records, &paths, config.assume_yes, prompt)? {
            SaveOutcome::Saved => {
                println!();
                println!("{} Saved TXT: {}", "[*]".green(), paths.report.display());
                println!("{} Saved CSV: {}", "[*]".green(), paths.table.display());
            }
            SaveOutcome::Declined => {
                println!("{}", "Aborting output save.".yellow());
            }
        }

        Ok(records)
    }
}
