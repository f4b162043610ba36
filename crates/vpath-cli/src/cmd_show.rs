// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `vpath show` command.

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use crate::flags::{ContextFlags, Loaded};

/// Display discovered files and merged parameters
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    context: ContextFlags,

    /// Only show parameters under this dotted prefix
    #[clap(long, default_value = "")]
    branch: String,

    /// Show values without expanding placeholders
    #[clap(long)]
    raw: bool,

    /// Output format: table, yaml, json
    #[clap(long, default_value = "table")]
    format: String,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let loaded = self.context.load()?;

        match self.format.as_str() {
            "yaml" => self.show_yaml(&loaded)?,
            "json" => self.show_json(&loaded)?,
            _ => {
                self.show_files_table(&loaded);
                println!();
                self.show_parameters_table(&loaded)?;
            }
        }

        Ok(0)
    }

    fn branch(&self, loaded: &Loaded) -> Result<vpath::Branch> {
        let parameters = loaded.context.parameters();
        if self.raw {
            Ok(parameters.raw_branche(&self.branch))
        } else {
            Ok(parameters.unlinearize_branche(&self.branch)?)
        }
    }

    fn show_files_table(&self, loaded: &Loaded) {
        println!("{}", "Discovered Files:".bold());
        println!();

        if loaded.configs.is_empty() {
            println!("  {}", "(built-in defaults only)".dimmed());
        }
        for (i, config) in loaded.configs.iter().enumerate() {
            let path = config
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());

            let inherit_marker = if config.inherit { " [inherit]" } else { "" };
            let includes_marker = if !config.includes.is_empty() {
                format!(" [includes: {}]", config.includes.len())
            } else {
                String::new()
            };

            println!(
                "  {}. {}{}{}",
                i + 1,
                path.cyan(),
                inherit_marker.yellow(),
                includes_marker.blue()
            );

            if let Some(desc) = &config.description {
                println!("     {}", desc.dimmed());
            }
        }

        println!();
        println!("Total: {} file(s)", loaded.configs.len());
    }

    fn show_parameters_table(&self, loaded: &Loaded) -> Result<()> {
        let context = &loaded.context;
        println!("{}", "Settings:".bold());
        println!();
        println!("  scheme = {}", context.settings().scheme.green());
        println!("  strict = {}", context.settings().strict.to_string().green());

        let constants = context.constants();
        println!();
        println!("{}", "Constants:".bold());
        println!();
        println!("  version = {}", constants.version.to_string().green());
        println!(
            "  directory_separator = {}",
            constants.directory_separator.to_string().green()
        );
        println!(
            "  path_list_separator = {}",
            constants.path_list_separator.to_string().green()
        );
        println!(
            "  pointer_width = {}",
            constants.pointer_width.to_string().green()
        );

        println!();
        println!("{}", "Keywords:".bold());
        println!();
        for (name, value) in context.parameters().keywords() {
            println!("  {} = {}", name.cyan(), value.green());
        }

        println!();
        println!("{}", "Parameters:".bold());
        println!();
        let pairs = self.branch(loaded)?.linearize_under(&self.branch);
        if pairs.is_empty() {
            println!("  {}", "(no parameters)".dimmed());
        }
        for (key, value) in &pairs {
            println!("  {} = {}", key.cyan(), value.green());
        }

        println!();
        println!("Total: {} parameter(s)", pairs.len());
        Ok(())
    }

    fn show_yaml(&self, loaded: &Loaded) -> Result<()> {
        println!("# Discovered Files:");
        for config in &loaded.configs {
            if let Some(path) = &config.source_path {
                println!("# - {}", path.display());
            }
        }
        println!();

        let yaml = serde_yaml::to_string(&self.branch(loaded)?).into_diagnostic()?;
        print!("{yaml}");
        Ok(())
    }

    fn show_json(&self, loaded: &Loaded) -> Result<()> {
        let files: Vec<String> = loaded
            .configs
            .iter()
            .filter_map(|c| c.source_path.as_ref().map(|p| p.display().to_string()))
            .collect();
        let keywords: serde_json::Map<String, serde_json::Value> = loaded
            .context
            .parameters()
            .keywords()
            .map(|(name, value)| (name.to_string(), value.into()))
            .collect();
        let parameters = self.branch(loaded)?;
        let constants = loaded.context.constants();

        let output = serde_json::json!({
            "discovered_files": files,
            "scheme": loaded.context.settings().scheme,
            "strict": loaded.context.settings().strict,
            "constants": {
                "version": constants.version.to_string(),
                "directory_separator": constants.directory_separator.to_string(),
                "path_list_separator": constants.path_list_separator.to_string(),
                "is_windows": constants.is_windows,
                "pointer_width": constants.pointer_width,
            },
            "keywords": keywords,
            "parameters": parameters,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).into_diagnostic()?
        );
        Ok(())
    }
}
