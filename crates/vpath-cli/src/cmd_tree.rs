// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `vpath tree` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

use vpath::{Context, Probe};

use crate::flags::ContextFlags;

#[cfg(test)]
#[path = "./cmd_tree_test.rs"]
mod cmd_tree_test;

/// Display the namespace tree
#[derive(Debug, Args)]
pub struct CmdTree {
    #[clap(flatten)]
    context: ContextFlags,

    /// Also print where each component resolves
    #[clap(long)]
    resolve: bool,
}

impl CmdTree {
    pub fn run(&mut self) -> Result<i32> {
        let mut context = self.context.load()?.context;

        let components: Vec<(String, String, String)> = context
            .namespace()
            .walk()
            .into_iter()
            .map(|(path, component)| {
                (
                    path,
                    component.name().to_string(),
                    component.reach().to_string().replace('\r', "^"),
                )
            })
            .collect();

        println!("{}://", context.settings().scheme.bold());
        for (path, name, reach) in &components {
            let depth = path.matches('/').count();
            let indent = "  ".repeat(depth + 1);
            println!("{indent}{}  {}", name.cyan(), reach.dimmed());

            if self.resolve {
                let uri = format!("{}://{}", context.settings().scheme, path);
                match locate(&mut context, &uri)? {
                    Location::Found(location) => println!("{indent}  -> {}", location.green()),
                    Location::NoReach => println!("{indent}  -> {}", "(no reach)".dimmed()),
                    Location::Missing => println!("{indent}  -> {}", "(not found)".red()),
                }
            }
        }

        println!();
        println!("Total: {} component(s)", components.len());
        Ok(0)
    }
}

/// Where a component lands, as shown by `tree --resolve`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Location {
    Found(String),
    /// Neither the component nor its ancestors carry a reach.
    NoReach,
    /// Strict mode and no candidate exists.
    Missing,
}

pub(crate) fn locate<P: Probe>(context: &mut Context<P>, uri: &str) -> Result<Location> {
    match context.resolve(uri) {
        Ok(location) if location.is_empty() => Ok(Location::NoReach),
        Ok(location) => Ok(Location::Found(location)),
        Err(vpath::Error::NoCandidateFound { candidates, .. })
            if candidates.iter().all(String::is_empty) =>
        {
            Ok(Location::NoReach)
        }
        Err(vpath::Error::NoCandidateFound { .. }) => Ok(Location::Missing),
        Err(err) => Err(err.into()),
    }
}
