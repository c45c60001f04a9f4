//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Settings};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn render_config(format: OutputFormat, cfg: &Config) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(cfg)?,
        OutputFormat::JsonCompact => serde_json::to_string(cfg)?,
        OutputFormat::Yaml => serde_yaml::to_string(cfg)?,
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(cfg)
            .map_err(mpxedit_config::ConfigError::from)?
            .trim_end()
            .to_owned(),
    })
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if !global.yes {
                eprintln!("mpxedit configuration");
                eprintln!("   Config path: {}\n", path.display());

                cfg.xinput.program = Input::new()
                    .with_prompt("xinput program")
                    .default(cfg.xinput.program.clone())
                    .interact_text()
                    .map_err(prompt_err)?;

                cfg.xinput.synthetic_marker = Input::new()
                    .with_prompt("Hide devices whose name contains")
                    .default(cfg.xinput.synthetic_marker.clone())
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
            }

            let written = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Configuration written to {}", written.display());
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let settings = Settings::resolve(global, &cfg)?;
            let out = render_config(settings.output, &cfg)?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
