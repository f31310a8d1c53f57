// CLI definitions using clap
// Global flags are derived; per-setting options are added at runtime from
// the profile of the detected mouse

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, Parser};
use rivalcfg::handlers::SettingKind;
use rivalcfg::profile::{DeviceProfile, SettingDescriptor};
use rivalcfg::settings::SettingsStore;
use rivalcfg::value::SettingValue;
use tracing::warn;

#[derive(Parser, Debug, Default)]
#[command(name = "rivalcfg")]
#[command(author, version, about = "Configure SteelSeries gaming mice")]
pub struct Cli {
    /// List supported devices and exit
    #[arg(short, long)]
    pub list: bool,

    /// Reset all settings to their factory defaults
    #[arg(short, long)]
    pub reset: bool,

    /// Print the last applied settings of the device
    #[arg(long)]
    pub print_settings: bool,

    /// Print the firmware version of the device
    #[arg(long)]
    pub firmware_version: bool,

    /// Print the battery level of a wireless device
    #[arg(long)]
    pub battery_level: bool,

    /// Load additional JSON device profiles from this directory
    #[arg(long, value_name = "DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Settings cache file (default: ~/.config/rivalcfg/settings.json)
    #[arg(long, value_name = "FILE")]
    pub settings_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Argument id of a setting, kept apart from the ids of the global flags
fn setting_id(name: &str) -> String {
    format!("setting:{name}")
}

/// Help line for one setting
fn setting_help(setting: &SettingDescriptor) -> String {
    let mut help = if setting.description.is_empty() {
        setting.label.clone()
    } else {
        setting.description.clone()
    };
    if let SettingKind::Choice(choices) = &setting.kind {
        help.push_str(&format!(" [possible values: {}]", choices.names().join(", ")));
    }
    if let Some(default) = &setting.default {
        help.push_str(&format!(" (default: {default})"));
    }
    help
}

/// Build the `Arg` for one setting
///
/// Flags already taken by `used_shorts` / `used_longs` are skipped with a
/// warning; a setting with no usable long flag gets one from its name.
fn setting_arg(
    setting: &SettingDescriptor,
    used_shorts: &mut HashSet<char>,
    used_longs: &mut HashSet<String>,
) -> Arg {
    let mut arg = Arg::new(setting_id(&setting.name)).help(setting_help(setting));
    let mut has_long = false;

    for flag in &setting.cli {
        if let Some(long) = flag.strip_prefix("--") {
            if !used_longs.insert(long.to_string()) {
                warn!("{}: flag {flag} is already taken", setting.name);
            } else if has_long {
                arg = arg.visible_alias(long.to_string());
            } else {
                arg = arg.long(long.to_string());
                has_long = true;
            }
        } else if let Some(short) = flag.strip_prefix('-') {
            let mut chars = short.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if used_shorts.insert(c) => arg = arg.short(c),
                _ => warn!("{}: cannot use short flag {flag}", setting.name),
            }
        }
    }
    if !has_long {
        let mut long = setting.name.replace('_', "-");
        if !used_longs.insert(long.clone()) {
            warn!("{}: flag --{long} is already taken", setting.name);
            long = format!("set-{long}");
            used_longs.insert(long.clone());
        }
        arg = arg.long(long);
    }

    if setting.kind.takes_value() {
        arg.value_name(setting.name.to_ascii_uppercase())
            .action(ArgAction::Set)
    } else {
        arg.action(ArgAction::SetTrue)
    }
}

/// The full command: global flags plus one option per setting
pub fn build_command(profile: Option<&DeviceProfile>) -> Command {
    let mut command = Cli::command();
    let Some(profile) = profile else {
        return command;
    };

    let mut used_shorts: HashSet<char> = command
        .get_arguments()
        .filter_map(Arg::get_short)
        .chain(['h', 'V'])
        .collect();
    let mut used_longs: HashSet<String> = command
        .get_arguments()
        .filter_map(|a| a.get_long().map(str::to_string))
        .chain(["help".to_string(), "version".to_string()])
        .collect();

    command = command.next_help_heading(format!("{} options", profile.display_name));
    for setting in &profile.settings {
        command = command.arg(setting_arg(setting, &mut used_shorts, &mut used_longs));
    }
    command
}

/// Settings given on the command line, in declaration order
pub fn requested_settings(
    profile: &DeviceProfile,
    matches: &ArgMatches,
) -> Vec<(String, SettingValue)> {
    profile
        .settings
        .iter()
        .filter_map(|setting| {
            let id = setting_id(&setting.name);
            if setting.kind.takes_value() {
                matches
                    .get_one::<String>(&id)
                    .map(|value| (setting.name.clone(), SettingValue::from(value.as_str())))
            } else if matches.get_flag(&id) {
                Some((setting.name.clone(), SettingValue::from("")))
            } else {
                None
            }
        })
        .collect()
}

/// Human-readable dump of the recorded settings, defaults for the rest
pub fn describe_settings(profile: &DeviceProfile, store: &SettingsStore) -> String {
    let device_id = profile.id_string();
    let mut out = format!("{} ({device_id})\n", profile.display_name);
    for setting in profile.settings.iter().filter(|s| s.kind.takes_value()) {
        let line = match (store.get(&device_id, &setting.name), &setting.default) {
            (Some(value), _) => format!("{value}"),
            (None, Some(default)) => format!("{default} (default)"),
            (None, None) => "-".to_string(),
        };
        out.push_str(&format!("  {:<20} {line}\n", setting.name));
    }
    out
}

/// One line per supported device
pub fn describe_profiles(profiles: &[&DeviceProfile]) -> String {
    profiles
        .iter()
        .map(|p| format!("{:<32} {}  {}\n", p.display_name, p.id_string(), p.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use clap::FromArgMatches;
    use rivalcfg::profile::builtin;

    use super::*;

    #[test]
    fn test_command_without_profile() {
        let matches = build_command(None)
            .try_get_matches_from(["rivalcfg", "--list", "-vv"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert!(cli.list);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_settings_become_options() {
        let profile = builtin::rival110();
        let matches = build_command(Some(&profile))
            .try_get_matches_from(["rivalcfg", "-c", "red", "--sensitivity1", "800", "-S", "1600"])
            .unwrap();

        let requested = requested_settings(&profile, &matches);
        // Declaration order, not command-line order
        assert_eq!(
            requested,
            vec![
                ("sensitivity1".to_string(), SettingValue::from("800")),
                ("sensitivity2".to_string(), SettingValue::from("1600")),
                ("color".to_string(), SettingValue::from("red")),
            ]
        );

        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert!(!cli.reset);
    }

    #[test]
    fn test_setting_named_like_global_flag() {
        let mut profile = builtin::rival110();
        profile
            .settings
            .push(SettingDescriptor::new("list", &[0x20], SettingKind::None));
        profile.settings.push(
            SettingDescriptor::new("verbose", &[0x21], SettingKind::Rgbcolor)
                .cli(&["--glow"])
                .default_value("red"),
        );
        let command = build_command(Some(&profile));
        command.clone().debug_assert();

        let matches = command
            .try_get_matches_from(["rivalcfg", "--list", "--set-list", "--glow", "blue"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert!(cli.list);
        assert_eq!(cli.verbose, 0);
        assert_eq!(
            requested_settings(&profile, &matches),
            vec![
                ("list".to_string(), SettingValue::from("")),
                ("verbose".to_string(), SettingValue::from("blue")),
            ]
        );
    }

    #[test]
    fn test_every_builtin_builds() {
        for profile in builtin::all() {
            build_command(Some(&profile)).debug_assert();
        }
    }

    #[test]
    fn test_setting_help() {
        let profile = builtin::rival110();
        let help = setting_help(profile.setting("polling_rate").unwrap());
        assert!(help.contains("125, 250, 500, 1000"));
        assert!(help.contains("(default: 1000)"));
    }

    #[test]
    fn test_describe_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path().join("settings.json"));
        store.set("1038:1729", "color", "red".into()).unwrap();

        let text = describe_settings(&builtin::rival110(), &store);
        assert!(text.contains("color"));
        assert!(text.contains("red"));
        assert!(text.contains("800 (default)"));
    }
}
