//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Replace stored plaintext passwords before anything is printed.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display as TOML-like text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout_ms = {}", cfg.defaults.timeout_ms);
    let _ = writeln!(out, "post_timeout_ms = {}", cfg.defaults.post_timeout_ms);
    let _ = writeln!(out, "poll_interval_ms = {}", cfg.defaults.poll_interval_ms);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "address = \"{}\"", p.address);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if let Some(ref pw) = p.password {
            let _ = writeln!(out, "password = \"{pw}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(interval) = p.poll_interval_ms {
            let _ = writeln!(out, "poll_interval_ms = {interval}");
        }
        if let Some(timeout) = p.timeout_ms {
            let _ = writeln!(out, "timeout_ms = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Read the config file, surfacing parse errors instead of falling back
/// to defaults, since the result is written back.
fn load_for_edit() -> Result<Config, CliError> {
    Ok(config::load_config()?)
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config, format_config);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: smclink config add-profile <name> --address <IP>");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── AddProfile ──────────────────────────────────────────────
        ConfigCommand::AddProfile {
            name,
            address,
            username,
            password_env,
            poll_interval,
            default,
        } => {
            if address.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "address".into(),
                    reason: "address cannot be empty".into(),
                });
            }

            let mut cfg = load_for_edit()?;
            let profile = Profile {
                address: address.trim().to_owned(),
                username,
                password: global.password.clone(),
                password_env,
                poll_interval_ms: poll_interval,
                timeout_ms: global.timeout,
            };
            cfg.profiles.insert(name.clone(), profile);
            if default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Profile '{name}' saved to {}", config::config_path().display());
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = load_for_edit()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "studio".into(),
            Profile {
                address: "10.0.0.5".into(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn redacted_config_hides_passwords() {
        let text = format_config(&redact(sample()));
        assert!(text.contains("address = \"10.0.0.5\""));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = profile_not_found("rack".into(), &sample());
        assert!(matches!(
            err,
            CliError::ProfileNotFound { ref available, .. } if available == "studio"
        ));
    }
}
