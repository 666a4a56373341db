//! CLI configuration: thin wrapper around `smclink_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--address, --username, --password, --timeout) and fills display
//! options left at their built-in defaults from `[defaults]`.

use std::time::Duration;

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use secrecy::SecretString;

use smclink_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use smclink_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default,
    profile_to_controller_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `ControllerConfig` for this invocation.
///
/// An explicitly named profile must exist. Without one, flags and
/// `SMCLINK_*` variables alone are enough as long as an address is given.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &cfg.defaults, global);
    }

    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    if global.address.as_deref().is_none_or(|a| a.trim().is_empty()) {
        return Err(CliError::NoAddress {
            path: config_path().display().to_string(),
        });
    }

    resolve_profile(&Profile::default(), &cfg.defaults, global)
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let mut config = profile_to_controller_config(profile, defaults)?;

    if let Some(ref address) = global.address {
        address.trim().clone_into(&mut config.target_address);
    }
    if let Some(ref username) = global.username {
        config.username.clone_from(username);
    }
    if let Some(ref password) = global.password {
        config.password = SecretString::from(password.clone());
    }
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        config.get_timeout = Duration::from_millis(timeout);
    }

    if !config.has_address() {
        return Err(CliError::NoAddress {
            path: config_path().display().to_string(),
        });
    }

    Ok(config)
}

/// Apply `[defaults] output` and `color` where neither a flag nor an
/// environment variable chose a value.
pub fn apply_display_defaults(
    global: &mut GlobalOpts,
    matches: &ArgMatches,
    defaults: &Defaults,
) -> Result<(), CliError> {
    let unset = |id: &str| {
        matches!(
            matches.value_source(id),
            None | Some(ValueSource::DefaultValue)
        )
    };

    if unset("output") {
        global.output = parse_default("defaults.output", &defaults.output)?;
    }
    if unset("color") {
        global.color = parse_default("defaults.color", &defaults.color)?;
    }
    Ok(())
}

fn parse_default<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value.trim(), true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{CommandFactory, FromArgMatches, Parser};
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::{Cli, ColorMode, OutputFormat};

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["smclink"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn profile() -> Profile {
        Profile {
            address: "10.0.0.5".into(),
            username: Some("admin".into()),
            password: Some("from-file".into()),
            poll_interval_ms: Some(250),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile_values() {
        let global = global(&[
            "--address",
            "10.0.0.9:8080",
            "--username",
            "operator",
            "--password",
            "from-flag",
            "--timeout",
            "500",
        ]);
        let config = resolve_profile(&profile(), &Defaults::default(), &global).unwrap();

        assert_eq!(config.target_address, "10.0.0.9:8080");
        assert_eq!(config.username, "operator");
        assert_eq!(config.password.expose_secret(), "from-flag");
        assert_eq!(config.get_timeout, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn profile_values_used_without_flags() {
        let config = resolve_profile(&profile(), &Defaults::default(), &global(&[])).unwrap();
        assert_eq!(config.target_address, "10.0.0.5");
        assert_eq!(config.username, "admin");
        assert_eq!(config.get_timeout, Duration::from_millis(2000));
    }

    #[test]
    fn blank_address_is_rejected() {
        let err = resolve_profile(&Profile::default(), &Defaults::default(), &global(&[]))
            .unwrap_err();
        assert!(matches!(err, CliError::NoAddress { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = resolve_profile(&profile(), &Defaults::default(), &global(&["--timeout", "0"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    fn display_opts(args: &[&str], defaults: &Defaults) -> Result<GlobalOpts, CliError> {
        let mut argv = vec!["smclink"];
        argv.extend_from_slice(args);
        argv.push("variables");
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        let mut global = Cli::from_arg_matches(&matches).unwrap().global;
        apply_display_defaults(&mut global, &matches, defaults)?;
        Ok(global)
    }

    #[test]
    fn config_defaults_fill_unset_display_options() {
        let defaults = Defaults {
            output: "json-compact".into(),
            color: "never".into(),
            ..Defaults::default()
        };
        let global = display_opts(&[], &defaults).unwrap();
        assert!(matches!(global.output, OutputFormat::JsonCompact));
        assert!(matches!(global.color, ColorMode::Never));
    }

    #[test]
    fn flags_win_over_config_display_defaults() {
        let defaults = Defaults {
            output: "yaml".into(),
            color: "never".into(),
            ..Defaults::default()
        };
        let global = display_opts(&["-o", "plain", "--color", "always"], &defaults).unwrap();
        assert!(matches!(global.output, OutputFormat::Plain));
        assert!(matches!(global.color, ColorMode::Always));
    }

    #[test]
    fn unknown_output_default_is_rejected() {
        let defaults = Defaults {
            output: "xml".into(),
            ..Defaults::default()
        };
        let err = display_opts(&[], &defaults).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
    }
}
