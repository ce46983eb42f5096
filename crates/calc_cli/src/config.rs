use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

const CONFIG_FILE: &str = "scicalc.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub precision: u32,
    pub numeric_mode: String,
    pub angle: String,
    pub budget_ms: u64,
    pub autocomplete: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            precision: 10,
            numeric_mode: "float".to_string(),
            angle: "rad".to_string(),
            budget_ms: 1000,
            autocomplete: true,
        }
    }
}

impl CliConfig {
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => println!("Error parsing config file: {}. Using defaults.", e),
                },
                Err(e) => println!("Error reading config file: {}. Using defaults.", e),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let mut file = fs::File::create(CONFIG_FILE)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn restore() -> Self {
        let config = Self::default();
        let _ = config.save();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = CliConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.precision, config.precision);
        assert_eq!(back.numeric_mode, config.numeric_mode);
        assert_eq!(back.angle, config.angle);
        assert_eq!(back.budget_ms, config.budget_ms);
        assert_eq!(back.autocomplete, config.autocomplete);
    }
}
