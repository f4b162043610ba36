// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `vpath resolve` command.

use std::path::Path;

use clap::Args;
use colored::Colorize;
use miette::Result;
use vpath::Probe;

use crate::flags::{ContextFlags, qualify};

/// Resolve symbolic paths to physical locations
#[derive(Debug, Args)]
pub struct CmdResolve {
    #[clap(flatten)]
    context: ContextFlags,

    /// Print every existing location instead of the first one
    #[clap(long, conflicts_with = "candidates")]
    all: bool,

    /// Print every candidate location, marking the ones that exist
    #[clap(long)]
    candidates: bool,

    /// Symbolic paths, with or without the scheme (Data/Etc, vpath://Data/Etc)
    #[clap(required = true)]
    paths: Vec<String>,
}

impl CmdResolve {
    pub fn run(&mut self) -> Result<i32> {
        let mut context = self.context.load()?.context;
        let mut code = 0;

        for path in &self.paths {
            let uri = qualify(&context, path);
            if self.candidates {
                if self.paths.len() > 1 {
                    println!("{}", uri.bold());
                }
                for candidate in context.candidates(&uri)? {
                    if context.probe().exists(Path::new(&candidate)) {
                        println!("  {} {}", "*".green(), candidate.green());
                    } else {
                        println!("    {}", candidate.dimmed());
                    }
                }
            } else if self.all {
                let found = context.resolve_all(&uri)?;
                if found.is_empty() {
                    tracing::warn!(%uri, "no existing location");
                    code = 1;
                }
                for location in found {
                    println!("{location}");
                }
            } else {
                println!("{}", context.resolve(&uri)?);
            }
        }

        Ok(code)
    }
}
