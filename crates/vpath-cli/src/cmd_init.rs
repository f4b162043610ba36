// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `vpath init` command.

use clap::Args;
use miette::Result;
use std::path::PathBuf;

/// Create a new .vpath.yaml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create file in
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Enable in-tree inheritance
    #[clap(long)]
    inherit: bool,

    /// Add an initial parameter (dotted key)
    #[clap(long = "set", value_name = "KEY=VALUE", value_parser = crate::flags::parse_assignment)]
    parameters: Vec<(String, String)>,

    /// Template to use: minimal, standard
    #[clap(long, default_value = "standard")]
    template: String,
}

impl CmdInit {
    pub fn run(&mut self) -> Result<i32> {
        let config_path = self.path.join(vpath::VPATH_FILENAME);

        // Check if file already exists
        if config_path.exists() {
            return Err(miette::miette!(
                ".vpath.yaml already exists at {:?}",
                config_path
            ));
        }

        // Generate template based on option
        let content = match self.template.as_str() {
            "minimal" => self.generate_minimal_template()?,
            _ => self.generate_standard_template()?,
        };

        // Write file
        std::fs::write(&config_path, content)
            .map_err(|e| miette::miette!("Failed to write .vpath.yaml: {}", e))?;

        println!("Created .vpath.yaml at {:?}", config_path);
        println!();
        println!("Next steps:");
        println!("  1. Edit the file to describe your layout");
        println!("  2. Run 'vpath show' to preview the parameters");
        println!("  3. Run 'vpath tree --resolve' to see where components land");

        Ok(0)
    }

    fn initial_config(&self) -> vpath::ConfigFile {
        vpath::ConfigFile {
            inherit: self.inherit,
            parameters: vpath::Branch::unlinearize(
                self.parameters
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            ),
            ..Default::default()
        }
    }

    fn generate_minimal_template(&self) -> Result<String> {
        Ok(self.initial_config().to_yaml()?)
    }

    fn generate_standard_template(&self) -> Result<String> {
        let parameters_section = if self.parameters.is_empty() {
            "# parameters:\n\
            #   root:\n\
            #     data: \"(:site:)/Data\"\n\
            #   protocol:\n\
            #     Data/Library: \"Library/Local/;Library/Vendor/\"\n"
                .to_string()
        } else {
            let yaml = self.initial_config().to_yaml()?;
            yaml.lines()
                .skip_while(|line| !line.starts_with("parameters:"))
                .map(|line| format!("{line}\n"))
                .collect()
        };

        Ok(format!(
            "# vpath configuration\n\
            \n\
            api: vpath/v0\n\
            \n\
            # Optional: Human-readable description\n\
            # description: \"My project layout\"\n\
            \n\
            # In-tree inheritance (default: false)\n\
            # When true, walks up directory tree loading parent .vpath.yaml files\n\
            # When false, only loads this file\n\
            inherit: {}\n\
            \n\
            # Explicit includes, loaded before this file\n\
            # includes:\n\
            #   - ~/.config/vpath/shared.yaml\n\
            #   - ../common/.vpath.yaml\n\
            \n\
            # Scheme of symbolic paths (default: vpath)\n\
            # scheme: vpath\n\
            \n\
            # Fail instead of falling back to the first candidate\n\
            # strict: false\n\
            \n\
            # Keywords, referenced as (:name:)\n\
            # keywords:\n\
            #   site: /srv/site\n\
            \n\
            # Parameters, referenced as (:%dotted.key:)\n\
            # protocol.* entries describe the namespace tree; alternatives are\n\
            # separated by ';' and tried in order\n\
            {}",
            self.inherit, parameters_section,
        ))
    }
}
