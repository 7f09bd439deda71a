// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use synchome::{Error, ExitOutcome, Orchestrator, Settings};

use clap::Parser;
use std::{io::stderr, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sync home directory of console user through Unison.
#[derive(Debug, Clone, Parser)]
#[command(about, override_usage = "synchome [options]", version)]
struct Cli {
    /// Load settings from file instead of using built-in defaults.
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Print effective settings and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    fn run(self) -> Result<(), Error> {
        let settings = match self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if self.print_config {
            print!("{settings}");
            return Ok(());
        }

        let reports = Orchestrator::from_settings(settings).run()?;
        for report in reports {
            info!(
                "synced {} with profile {:?}",
                report.target,
                report.profile.path.display()
            );
        }

        Ok(())
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    let outcome = match Cli::parse().run() {
        Ok(()) => ExitOutcome::success(),
        Err(err) => {
            let outcome = ExitOutcome::from(&err);
            error!("sync failed with exit code {}", outcome.code);
            if let Err(error) = outcome.write_to(stderr()) {
                error!("cannot report failure: {error}");
            }
            outcome
        }
    };

    exit(outcome.code)
}
