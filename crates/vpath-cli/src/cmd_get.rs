// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `vpath get` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

use crate::flags::ContextFlags;

/// Print formatted parameter values
#[derive(Debug, Args)]
pub struct CmdGet {
    #[clap(flatten)]
    context: ContextFlags,

    /// Print values without expanding placeholders
    #[clap(long)]
    raw: bool,

    /// Dotted parameter keys, such as root.data
    #[clap(required = true)]
    keys: Vec<String>,
}

impl CmdGet {
    pub fn run(&mut self) -> Result<i32> {
        let loaded = self.context.load()?;
        let parameters = loaded.context.parameters();

        for key in &self.keys {
            let value = if self.raw {
                parameters.get_parameter(key)?.to_string()
            } else {
                parameters.get_formatted_parameter(key)?
            };

            if self.keys.len() == 1 {
                println!("{value}");
            } else {
                println!("{} = {}", key.cyan(), value.green());
            }
        }

        Ok(0)
    }
}
