//! # btrfsdu
//!
//! Per-subvolume disk usage for btrfs filesystems.
//!
//! ## Overview
//!
//! btrfsdu is built on top of btrfsdulib. It runs `btrfs subvolume list` and
//! `btrfs qgroup show`, joins their output and prints how much space each
//! subvolume references, how much it holds exclusively, and how close it is
//! to its quota limits. Quotas must be enabled on the filesystem
//! (`btrfs quota enable <path>`).
//!
//! ## Usage
//!
//! ```bash
//! # Report on the root filesystem
//! btrfsdu
//!
//! # Report on another mount point, rescanning quota groups first
//! btrfsdu /mnt/pool --rescan
//!
//! # Output as JSON
//! btrfsdu /mnt/pool --output json
//!
//! # Use a specific btrfs binary
//! BTRFSDU_BTRFS=/usr/local/sbin/btrfs btrfsdu
//! ```

mod btrfs;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use btrfsdulib::{build_report, ReportOutcome};
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::btrfs::Btrfs;
use crate::render::{render_no_usage, render_report, OutputMode};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("btrfsdu")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Per-subvolume disk usage for btrfs, based on quota groups")
        .arg(
            Arg::new("path")
                .help("Path of the btrfs filesystem to report on")
                .default_value("/"),
        )
        .arg(
            Arg::new("rescan")
                .short('r')
                .long("rescan")
                .action(ArgAction::SetTrue)
                .help("Rescan quota groups before reporting (waits for the rescan to finish)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["table", "json"])
                .default_value("table")
                .help("Output format"),
        )
        .arg(
            Arg::new("btrfs")
                .long("btrfs")
                .env("BTRFSDU_BTRFS")
                .default_value("btrfs")
                .help("btrfs executable to run"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log debug information to stderr"),
        )
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("btrfsdu=debug,btrfsdulib=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("btrfsdu=info,btrfsdulib=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_ansi(console::colors_enabled_stderr())
                .with_writer(std::io::stderr),
        )
        .init();
}

fn quota_hint(path: &str) -> String {
    format!(
        "could not read quota groups of '{}' (are quotas enabled? try `btrfs quota enable {}`)",
        path, path
    )
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<String>("path")
        .map(|s| s.as_str())
        .unwrap_or("/");
    let program = matches
        .get_one::<String>("btrfs")
        .map(|s| s.as_str())
        .unwrap_or("btrfs");
    let mode = OutputMode::from_name(
        matches
            .get_one::<String>("output")
            .map(|s| s.as_str())
            .unwrap_or("table"),
    );
    let btrfs = Btrfs::new(program);

    let list = btrfs
        .subvolume_list(path)
        .with_context(|| format!("could not list subvolumes of '{}'", path))?;

    if matches.get_flag("rescan") {
        btrfs.quota_rescan(path).with_context(|| quota_hint(path))?;
    }
    let quota = btrfs.qgroup_show(path).with_context(|| quota_hint(path))?;

    let output = match build_report(path, &list, &quota)? {
        ReportOutcome::Ready(report) => render_report(&report, mode)?,
        ReportOutcome::NoUsage { subvolumes } => render_no_usage(path, subvolumes, mode)?,
    };
    print!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    setup_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let prefix = Style::new().red().bold().for_stderr().apply_to("Error:");
            eprintln!("{} {:#}", prefix, e);
            ExitCode::FAILURE
        }
    }
}
