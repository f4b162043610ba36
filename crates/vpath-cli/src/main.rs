// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! vpath - Virtual Namespace and Parameter Resolution CLI

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_get;
mod cmd_init;
mod cmd_resolve;
mod cmd_show;
mod cmd_tree;
mod flags;

use cmd_get::CmdGet;
use cmd_init::CmdInit;
use cmd_resolve::CmdResolve;
use cmd_show::CmdShow;
use cmd_tree::CmdTree;

#[derive(Parser)]
#[clap(
    name = "vpath",
    about = "Virtual Namespace and Parameter Resolution",
    version,
    long_about = "Resolve symbolic paths such as vpath://Data/Etc to physical locations \
                  described by directory-based configuration files"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print formatted parameter values
    Get(CmdGet),

    /// Display discovered files and merged parameters
    Show(CmdShow),

    /// Resolve symbolic paths to physical locations
    Resolve(CmdResolve),

    /// Display the namespace tree
    Tree(CmdTree),

    /// Create a new .vpath.yaml file
    Init(CmdInit),
}

impl Opt {
    fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        // Dispatch to command
        match self.cmd {
            Command::Get(mut cmd) => cmd.run(),
            Command::Show(mut cmd) => cmd.run(),
            Command::Resolve(mut cmd) => cmd.run(),
            Command::Tree(mut cmd) => cmd.run(),
            Command::Init(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
