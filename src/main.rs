// rivalcfg - configure SteelSeries gaming mice

mod cli;

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Context;
use clap::FromArgMatches;
use rivalcfg::mouse::find_mice;
use rivalcfg::profile::{profile_registry, ProfileRegistry};
use rivalcfg::settings::SettingsStore;
use rivalcfg::{Error, Mouse};
use rivalcfg_transport::HidDiscovery;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{build_command, describe_profiles, describe_settings, requested_settings, Cli};

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rivalcfg=warn,rivalcfg_transport=warn")),
        1 => EnvFilter::new("rivalcfg=debug,rivalcfg_transport=debug"),
        _ => EnvFilter::new("rivalcfg=trace,rivalcfg_transport=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();

    // Global flags first: verbosity and profile directory decide how the
    // device-specific parser is built
    let early = build_command(None)
        .ignore_errors(true)
        .try_get_matches_from(&args)
        .ok()
        .and_then(|matches| Cli::from_arg_matches(&matches).ok())
        .unwrap_or_default();
    init_logging(early.verbose);

    let local_registry;
    let registry: &ProfileRegistry = match &early.profile_dir {
        Some(dir) => {
            let mut registry = ProfileRegistry::with_builtins();
            let count = registry
                .load_from_directory(dir)
                .with_context(|| format!("loading profiles from {}", dir.display()))?;
            info!("Loaded {count} profiles from {}", dir.display());
            local_registry = registry;
            &local_registry
        }
        None => profile_registry(),
    };

    if early.list {
        let profiles = registry.all_profiles();
        let profiles: Vec<_> = profiles.iter().map(Arc::as_ref).collect();
        print!("{}", describe_profiles(&profiles));
        return Ok(());
    }

    let discovery = HidDiscovery::new(registry.all_devices());
    let found = find_mice(&discovery, registry)?.into_iter().next();

    // Parse for real; this handles --help with the device's options listed
    let matches = build_command(found.as_ref().map(|(_, profile)| profile.as_ref()))
        .get_matches_from(&args);
    let cli = Cli::from_arg_matches(&matches)?;

    let Some((device, profile)) = found else {
        return Err(Error::DeviceNotFound.into());
    };

    let transport = discovery
        .open_device(&device)
        .with_context(|| format!("opening {}", device.info.device_path))?;
    let store = SettingsStore::open(
        cli.settings_file
            .clone()
            .unwrap_or_else(SettingsStore::default_path),
    );
    let mut mouse = Mouse::open(Arc::clone(&profile), transport)?.with_settings_store(store);

    if cli.print_settings {
        if let Some(store) = mouse.settings_store() {
            print!("{}", describe_settings(&profile, store));
        }
    }
    if cli.firmware_version {
        println!("Firmware version: {}", mouse.firmware_version()?);
    }
    if cli.battery_level {
        let battery = mouse.battery_level()?;
        let charging = if battery.charging { " (charging)" } else { "" };
        println!("Battery level: {}%{charging}", battery.level);
    }

    if cli.reset {
        mouse.reset_settings()?;
    }
    let requested = requested_settings(&profile, &matches);
    for (name, value) in &requested {
        if let Some(response) = mouse.set(name, value.clone())? {
            debug!("{name}: device answered {response:02X?}");
        }
    }

    if (cli.reset || !requested.is_empty()) && profile.save_command.is_some() {
        mouse.save()?;
    }
    mouse.close()?;
    Ok(())
}
