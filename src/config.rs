use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Durable state, written once at the end of a successful login and
/// overwritten by a re-login.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub phone: Option<String>,
    pub access_token: Option<String>,
    pub prospect_id: Option<String>,
    pub pto_date: Option<String>,
}

impl Config {
    /// Read the file, or start empty when it does not exist yet.
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        toml::from_str(&fs::read_to_string(path)?)
            .with_context(|| format!("failed to parse `{}`", path.display()))
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_to(&self, path: &Path) -> Result {
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("failed to write `{}`", path.display()))
    }
}

/// Normalize a US phone number to `+1XXXXXXXXXX`: strip everything but
/// digits, prepend the country code when it is missing.
#[must_use]
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let digits = if digits.len() == 10 { format!("1{digits}") } else { digits };
    format!("+{digits}")
}

#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    let formatted = format_phone(phone);
    formatted.len() == 12 && formatted.starts_with("+1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("(555) 123-4567"), "+15551234567");
        assert_eq!(format_phone("+1 555 123 4567"), "+15551234567");
        assert_eq!(format_phone("5551234567"), "+15551234567");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("555-123-4567"));
        assert!(!validate_phone("123"));
        assert!(!validate_phone("+44 20 7946 0958"));
    }

    #[test]
    fn test_config_round_trip() -> Result {
        let config = Config {
            phone: Some("+15551234567".to_string()),
            access_token: Some("access".to_string()),
            prospect_id: Some("prospect-1".to_string()),
            pto_date: None,
        };
        let parsed: Config = toml::from_str(&toml::to_string_pretty(&config)?)?;
        assert_eq!(parsed.phone, config.phone);
        assert_eq!(parsed.access_token, config.access_token);
        assert_eq!(parsed.prospect_id, config.prospect_id);
        assert_eq!(parsed.pto_date, None);
        Ok(())
    }
}
