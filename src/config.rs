//! Session configuration
//!
//! Tunables for a recording session: the recognition locale handed to the
//! engine, the placeholder greeting shown before any recording, and the
//! capacities of the channels connecting the engine and the subscribers.

/// Locale tag used when none is configured
pub const DEFAULT_LOCALE: &str = "en-UK";

/// Transcript text shown before the first recording
pub const DEFAULT_PLACEHOLDER: &str = "Press record and start speaking";

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Locale tag passed to the engine on start (not validated here; the
    /// engine rejects tags it cannot serve)
    pub locale: String,
    /// Transcript value presented before the first recording
    pub placeholder: String,
    /// Capacity of the engine event intake channel
    pub intake_capacity: usize,
    /// Capacity of each subscriber's notification channel
    pub notify_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            intake_capacity: 64,
            notify_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recognition locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the placeholder greeting
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the engine intake channel capacity
    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    /// Set the subscriber notification channel capacity
    pub fn with_notify_capacity(mut self, capacity: usize) -> Self {
        self.notify_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.locale.trim().is_empty() {
            return Err("locale must not be empty".to_string());
        }
        if self.intake_capacity == 0 {
            return Err("intake capacity must be at least 1".to_string());
        }
        if self.notify_capacity == 0 {
            return Err("notify capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.locale, "en-UK");
        assert_eq!(config.placeholder, "Press record and start speaking");
        assert!(config.intake_capacity > 0);
        assert!(config.notify_capacity > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = SessionConfig::new()
            .with_locale("sv-SE")
            .with_placeholder("Tryck och tala")
            .with_intake_capacity(8)
            .with_notify_capacity(4);

        assert_eq!(config.locale, "sv-SE");
        assert_eq!(config.placeholder, "Tryck och tala");
        assert_eq!(config.intake_capacity, 8);
        assert_eq!(config.notify_capacity, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_locale_rejected() {
        let config = SessionConfig::new().with_locale("   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SessionConfig::new().with_intake_capacity(0);
        assert!(config.validate().is_err());

        let config = SessionConfig::new().with_notify_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_placeholder_allowed() {
        // An empty greeting is a valid presentation choice
        let config = SessionConfig::new().with_placeholder("");
        assert!(config.validate().is_ok());
    }
}
