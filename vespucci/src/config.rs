//! Configuration for map bootstrapping.
//!
//! Loads the application configuration from a TOML file, resolves the access
//! credential from the environment and produces the validated [`MapInitConfig`]
//! consumed by the bootstrapper.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::{BaseStyle, TileAttribution};

/// Allowed longitude range, degrees.
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);
/// Allowed latitude range, degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
/// Allowed zoom level range.
pub const ZOOM_RANGE: (f64, f64) = (0.0, 22.0);

/// Opaque access token authorizing requests to the tile provider.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential, rejecting empty or whitespace-only strings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::InvalidCredential);
        }
        Ok(Self(token))
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Geographic center as (longitude, latitude) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoCenter {
    /// Longitude, degrees east.
    pub lon: f64,
    /// Latitude, degrees north.
    pub lat: f64,
}

/// Validated parameters for constructing one map instance.
///
/// Constructed once at startup, consumed by
/// [`Bootstrapper::bootstrap`](crate::Bootstrapper::bootstrap) and then
/// discarded.
#[derive(Debug, Clone)]
pub struct MapInitConfig {
    /// Access credential for the tile provider.
    pub credential: Credential,
    /// Identifier of the pre-registered display surface.
    pub container_ref: String,
    /// Base style to render.
    pub base_style: BaseStyle,
    /// Initial view center.
    pub center: GeoCenter,
    /// Initial zoom level.
    pub zoom: f64,
}

impl MapInitConfig {
    /// Creates an init config, validating coordinate and zoom ranges.
    pub fn new(
        credential: Credential,
        container_ref: impl Into<String>,
        base_style: BaseStyle,
        center: GeoCenter,
        zoom: f64,
    ) -> Result<Self> {
        check_range("center.lon", center.lon, LON_RANGE)?;
        check_range("center.lat", center.lat, LAT_RANGE)?;
        check_range("zoom", zoom, ZOOM_RANGE)?;

        Ok(Self {
            credential,
            container_ref: container_ref.into(),
            base_style,
            center,
            zoom,
        })
    }
}

pub(crate) fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::InvalidConfig {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Map view parameters.
    pub map: MapSection,
    /// Credential sourcing.
    pub auth: AuthSection,
    /// Display surface dimensions.
    pub surface: SurfaceSection,
    /// Logging parameters.
    pub logging: LoggingSection,
}

/// Map view parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapSection {
    /// Identifier of the display surface to bind the map to.
    pub container: String,
    /// Base style URI: `osm`, a `mapbox://styles/...` URI, or an XYZ URL
    /// template with `{z}`/`{x}`/`{y}` (and optionally `{token}`) placeholders.
    pub style: String,
    /// Initial view center.
    pub center: GeoCenter,
    /// Initial zoom level.
    pub zoom: f64,
    /// Attribution shown for XYZ template styles.
    pub attribution: Option<TileAttribution>,
}

/// Credential sourcing.
///
/// The token is read from the environment variable named by `token_env`; an
/// inline `token` value takes precedence when present and is meant for
/// development only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSection {
    /// Environment variable holding the access token.
    pub token_env: Option<String>,
    /// Inline token override.
    pub token: Option<String>,
}

/// Display surface dimensions, pixels.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SurfaceSection {
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
}

/// Logging parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log output: `stdout`, or a directory for daily rolling log files.
    pub output: String,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration centered on the state of Georgia.
    ///
    /// Suitable for development against the token-free OSM style; deployments
    /// should use a TOML configuration file and `[auth] token_env`.
    pub fn dev_defaults() -> Self {
        Self {
            map: MapSection {
                container: "main".to_string(),
                style: "osm".to_string(),
                center: GeoCenter {
                    lon: -83.5,
                    lat: 32.9,
                },
                zoom: 6.5,
                attribution: None,
            },
            auth: AuthSection {
                token_env: None,
                // Placeholder satisfying the non-empty precondition for
                // token-free styles. Not a secret.
                token: Some("anonymous".to_string()),
            },
            surface: SurfaceSection {
                width: 1280,
                height: 720,
            },
            logging: LoggingSection {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }

    /// Resolves the credential and style into a validated [`MapInitConfig`].
    pub fn resolve(&self) -> Result<MapInitConfig> {
        let credential = self.resolve_credential()?;
        let mut base_style = BaseStyle::parse(&self.map.style)?;
        if let Some(attribution) = &self.map.attribution {
            base_style = base_style.with_attribution(attribution.clone());
        }

        MapInitConfig::new(
            credential,
            self.map.container.clone(),
            base_style,
            self.map.center,
            self.map.zoom,
        )
    }

    fn resolve_credential(&self) -> Result<Credential> {
        if let Some(token) = &self.auth.token {
            return Credential::new(token.clone());
        }
        let var = self
            .auth
            .token_env
            .as_deref()
            .ok_or(Error::CredentialNotConfigured)?;
        let token = env::var(var).map_err(|_| Error::MissingCredentialVar(var.to_string()))?;
        Credential::new(token)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::dev_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("test-token").expect("valid credential")
    }

    #[test]
    fn empty_credential_is_rejected() {
        assert!(matches!(Credential::new(""), Err(Error::InvalidCredential)));
        assert!(matches!(
            Credential::new("   "),
            Err(Error::InvalidCredential)
        ));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let debug = format!("{:?}", credential());
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn valid_ranges_are_accepted() {
        let config = MapInitConfig::new(
            credential(),
            "main",
            BaseStyle::Osm,
            GeoCenter {
                lon: -83.5,
                lat: 32.9,
            },
            6.5,
        )
        .expect("valid config");
        assert_eq!(config.container_ref, "main");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            (181.0, 32.9, 6.5, "center.lon"),
            (-83.5, -90.5, 6.5, "center.lat"),
            (-83.5, 32.9, 22.5, "zoom"),
            (f64::NAN, 32.9, 6.5, "center.lon"),
        ];
        for (lon, lat, zoom, expected_field) in cases {
            let result = MapInitConfig::new(
                credential(),
                "main",
                BaseStyle::Osm,
                GeoCenter { lon, lat },
                zoom,
            );
            match result {
                Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidConfig, got {other:?}"),
            }
        }
    }

    #[test]
    fn dev_defaults_resolve() {
        let config = AppConfig::dev_defaults();
        let init = config.resolve().expect("defaults resolve");
        assert_eq!(init.container_ref, "main");
        assert_eq!(init.center.lon, -83.5);
        assert_eq!(init.zoom, 6.5);
    }

    #[test]
    fn toml_deserialization() {
        let toml_content = r#"
[map]
container = "atlas"
style = "osm"
center = { lon = -83.5, lat = 32.9 }
zoom = 6.5

[auth]
token_env = "TILE_TOKEN"

[surface]
width = 800
height = 600

[logging]
level = "debug"
output = "stdout"
"#;

        let config: AppConfig = toml::from_str(toml_content).expect("valid toml");
        assert_eq!(config.map.container, "atlas");
        assert_eq!(config.map.center.lat, 32.9);
        assert_eq!(config.auth.token_env.as_deref(), Some("TILE_TOKEN"));
        assert_eq!(config.surface.width, 800);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn credential_from_environment() {
        let var = "VESPUCCI_TEST_TOKEN_FROM_ENV";
        env::set_var(var, "from-env");
        let mut config = AppConfig::dev_defaults();
        config.auth.token = None;
        config.auth.token_env = Some(var.to_string());
        let init = config.resolve().expect("env credential resolves");
        assert_eq!(init.credential.as_str(), "from-env");
        env::remove_var(var);
    }

    #[test]
    fn missing_credential_variable_is_an_error() {
        let mut config = AppConfig::dev_defaults();
        config.auth.token = None;
        config.auth.token_env = Some("VESPUCCI_TEST_TOKEN_UNSET".to_string());
        assert!(matches!(
            config.resolve(),
            Err(Error::MissingCredentialVar(_))
        ));
    }

    #[test]
    fn unconfigured_credential_is_an_error() {
        let mut config = AppConfig::dev_defaults();
        config.auth.token = None;
        config.auth.token_env = None;
        assert!(matches!(
            config.resolve(),
            Err(Error::CredentialNotConfigured)
        ));
    }
}
