use crate::limits::*;
use crate::pricing::{DEFAULT_BASE_FEE, DEFAULT_HOURLY_RATE, Tariff};

pub const DEFAULT_ZONE_NAMES: [&str; 5] = [
    "Downtown Core",
    "Tech District",
    "Harbor View",
    "Central Plaza",
    "East Gateway",
];
pub const DEFAULT_AREAS_PER_ZONE: usize = 2;
pub const DEFAULT_SLOTS_PER_AREA: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub zone_names: Vec<String>,
    pub areas_per_zone: usize,
    pub slots_per_area: usize,
    pub tariff: Tariff,
    pub metrics_port: Option<u16>,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    NoZones,
    EmptyZoneName,
    ZoneNameTooLong(String),
    TooManyZones(usize),
    AreasOutOfRange(usize),
    SlotsOutOfRange(usize),
    InvalidTariff(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoZones => write!(f, "at least one zone is required"),
            ConfigError::EmptyZoneName => write!(f, "zone names must not be empty"),
            ConfigError::ZoneNameTooLong(name) => {
                write!(f, "zone name longer than {MAX_NAME_LEN} bytes: {name}")
            }
            ConfigError::TooManyZones(n) => write!(f, "{n} zones configured, max is {MAX_ZONES}"),
            ConfigError::AreasOutOfRange(n) => {
                write!(f, "areas per zone must be 1..={MAX_AREAS_PER_ZONE}, got {n}")
            }
            ConfigError::SlotsOutOfRange(n) => {
                write!(f, "slots per area must be 1..={MAX_SLOTS_PER_AREA}, got {n}")
            }
            ConfigError::InvalidTariff(what) => write!(f, "invalid tariff: {what}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Self {
        Self {
            zone_names: DEFAULT_ZONE_NAMES.iter().map(|s| s.to_string()).collect(),
            areas_per_zone: DEFAULT_AREAS_PER_ZONE,
            slots_per_area: DEFAULT_SLOTS_PER_AREA,
            tariff: Tariff::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Read `ZONEPARK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let zone_names = match get("ZONEPARK_ZONES") {
            Some(raw) => raw.split(',').map(|s| s.trim().to_string()).collect(),
            None => DEFAULT_ZONE_NAMES.iter().map(|s| s.to_string()).collect(),
        };
        let areas_per_zone = get("ZONEPARK_AREAS_PER_ZONE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_AREAS_PER_ZONE);
        let slots_per_area = get("ZONEPARK_SLOTS_PER_AREA")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SLOTS_PER_AREA);
        let hourly_rate = get("ZONEPARK_HOURLY_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HOURLY_RATE);
        let base_fee = get("ZONEPARK_BASE_FEE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BASE_FEE);
        let metrics_port = get("ZONEPARK_METRICS_PORT").and_then(|s| s.parse().ok());

        let config = Self {
            zone_names,
            areas_per_zone,
            slots_per_area,
            tariff: Tariff { hourly_rate, base_fee },
            metrics_port,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone_names.is_empty() {
            return Err(ConfigError::NoZones);
        }
        if self.zone_names.len() > MAX_ZONES {
            return Err(ConfigError::TooManyZones(self.zone_names.len()));
        }
        for name in &self.zone_names {
            if name.is_empty() {
                return Err(ConfigError::EmptyZoneName);
            }
            if name.len() > MAX_NAME_LEN {
                return Err(ConfigError::ZoneNameTooLong(name.clone()));
            }
        }
        if !(1..=MAX_AREAS_PER_ZONE).contains(&self.areas_per_zone) {
            return Err(ConfigError::AreasOutOfRange(self.areas_per_zone));
        }
        if !(1..=MAX_SLOTS_PER_AREA).contains(&self.slots_per_area) {
            return Err(ConfigError::SlotsOutOfRange(self.slots_per_area));
        }
        let Tariff { hourly_rate, base_fee } = self.tariff;
        if !hourly_rate.is_finite() || hourly_rate < 0.0 {
            return Err(ConfigError::InvalidTariff("hourly rate must be finite and non-negative"));
        }
        if !base_fee.is_finite() || base_fee < 0.0 {
            return Err(ConfigError::InvalidTariff("base fee must be finite and non-negative"));
        }
        Ok(())
    }

    pub fn total_slots(&self) -> usize {
        self.zone_names.len() * self.areas_per_zone * self.slots_per_area
    }
}
