use std::error::Error;

use crate::core::config::data::{path_display, ConfigKey};
use crate::core::config::orchestrator::ConfigOrchestrator;

fn parse_key(key: &str) -> Result<ConfigKey, Box<dyn Error>> {
    ConfigKey::parse(key).ok_or_else(|| {
        let known: Vec<&str> = ConfigKey::ALL.iter().map(|key| key.as_str()).collect();
        format!("Unknown config key: {key} (expected one of: {})", known.join(", ")).into()
    })
}

pub fn set(orchestrator: &ConfigOrchestrator, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let key = parse_key(key)?;
    orchestrator.mutate(|config| config.set_value(key, value).map_err(Into::into))?;
    println!("✅ Set {} to: {}", key.as_str(), value.trim());
    Ok(())
}

pub fn unset(orchestrator: &ConfigOrchestrator, key: &str) -> Result<(), Box<dyn Error>> {
    let key = parse_key(key)?;
    orchestrator.mutate(|config| {
        config.unset_value(key);
        Ok(())
    })?;
    println!("✅ Unset {}", key.as_str());
    Ok(())
}

pub fn show(orchestrator: &ConfigOrchestrator) -> Result<(), Box<dyn Error>> {
    let config = orchestrator.load()?;
    println!("Config file: {}\n", path_display(orchestrator.path()));
    config.print_all();
    Ok(())
}
