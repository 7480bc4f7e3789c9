//! Base style resolution.
//!
//! Maps the configured style URI onto a raster tile source for the map
//! engine. Three forms are recognized:
//!
//! - `osm` — the engine's built-in OpenStreetMap source;
//! - `mapbox://styles/<user>/<style>` — rewritten to the Mapbox raster tile
//!   endpoint, which requires an access token;
//! - an XYZ URL template containing `{z}`, `{x}` and `{y}` placeholders and
//!   optionally `{token}`.

use std::collections::HashMap;
use std::time::Duration;

use galileo::layer::raster_tile_layer::{RasterTileLayer, RasterTileLayerBuilder};
use galileo::tile_schema::TileIndex;
use serde::{Deserialize, Serialize};

use crate::config::Credential;
use crate::error::{Error, Result};

const MAPBOX_STYLE_SCHEME: &str = "mapbox://styles/";
const MAPBOX_TILE_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/{style}/tiles/256/{z}/{x}/{y}?access_token={token}";
const MAPBOX_ATTRIBUTION: &str = "© Mapbox © OpenStreetMap";

/// Attribution for a tile source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TileAttribution {
    /// Attribution text.
    pub text: String,
    /// Link target for the attribution.
    pub url: String,
}

/// A named visual theme resolved to a raster tile source.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseStyle {
    /// The engine's built-in OpenStreetMap source.
    Osm,
    /// An XYZ raster tile URL template.
    Xyz {
        /// URL template with `{z}`/`{x}`/`{y}` and optional `{token}`.
        template: String,
        /// Attribution to display for the source.
        attribution: Option<TileAttribution>,
    },
}

impl BaseStyle {
    /// Parses a style URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.eq_ignore_ascii_case("osm") {
            return Ok(BaseStyle::Osm);
        }

        if let Some(style_id) = uri.strip_prefix(MAPBOX_STYLE_SCHEME) {
            if style_id.is_empty() || !style_id.contains('/') {
                return Err(Error::InvalidStyle(uri.to_string()));
            }
            let template = MAPBOX_TILE_TEMPLATE.replace("{style}", style_id);
            return Ok(BaseStyle::Xyz {
                template,
                attribution: Some(TileAttribution {
                    text: MAPBOX_ATTRIBUTION.to_string(),
                    url: "https://www.mapbox.com/about/maps/".to_string(),
                }),
            });
        }

        if uri.starts_with("http://") || uri.starts_with("https://") {
            for placeholder in ["{z}", "{x}", "{y}"] {
                if !uri.contains(placeholder) {
                    return Err(Error::InvalidStyle(uri.to_string()));
                }
            }
            return Ok(BaseStyle::Xyz {
                template: uri.to_string(),
                attribution: None,
            });
        }

        Err(Error::InvalidStyle(uri.to_string()))
    }

    /// Returns the style with the given attribution attached.
    ///
    /// Has no effect on the built-in OSM source, which carries its own.
    pub fn with_attribution(self, attribution: TileAttribution) -> Self {
        match self {
            BaseStyle::Osm => BaseStyle::Osm,
            BaseStyle::Xyz { template, .. } => BaseStyle::Xyz {
                template,
                attribution: Some(attribution),
            },
        }
    }

    /// Whether the resolved tile URL requires the access credential.
    pub fn requires_credential(&self) -> bool {
        match self {
            BaseStyle::Osm => false,
            BaseStyle::Xyz { template, .. } => template.contains("{token}"),
        }
    }
}

/// Builds the raster tile layer for a style, substituting the credential into
/// `{token}` templates.
pub(crate) fn build_layer(style: &BaseStyle, credential: &Credential) -> Result<RasterTileLayer> {
    let mut layer = match style {
        BaseStyle::Osm => RasterTileLayerBuilder::new_osm().build()?,
        BaseStyle::Xyz {
            template,
            attribution,
        } => {
            // Catch malformed placeholders before the first tile request.
            expand(template, 0, 0, 0, credential.as_str())?;

            let template = template.clone();
            let token = credential.as_str().to_string();
            let mut builder = RasterTileLayerBuilder::new_rest(move |index: &TileIndex| {
                expand(
                    &template,
                    index.z as i64,
                    index.x as i64,
                    index.y as i64,
                    &token,
                )
                .unwrap_or_else(|_| template.clone())
            });
            if let Some(attribution) = attribution {
                builder =
                    builder.with_attribution(attribution.text.clone(), attribution.url.clone());
            }
            builder.build()?
        }
    };

    // A single-shot frame renders before the fade-in completes, leaving all
    // tiles transparent.
    layer.set_fade_in_duration(Duration::default());

    Ok(layer)
}

fn expand(template: &str, z: i64, x: i64, y: i64, token: &str) -> Result<String> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("z".to_string(), z.to_string());
    vars.insert("x".to_string(), x.to_string());
    vars.insert("y".to_string(), y.to_string());
    vars.insert("token".to_string(), token.to_string());

    strfmt::strfmt(template, &vars).map_err(|_| Error::InvalidStyle(template.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osm_uri_parses() {
        assert_eq!(BaseStyle::parse("osm").expect("parses"), BaseStyle::Osm);
        assert_eq!(BaseStyle::parse("OSM").expect("parses"), BaseStyle::Osm);
    }

    #[test]
    fn mapbox_style_uri_rewrites_to_tile_template() {
        let style = BaseStyle::parse("mapbox://styles/mapbox/streets-v11").expect("parses");
        match style {
            BaseStyle::Xyz {
                template,
                attribution,
            } => {
                assert!(template.contains("mapbox/streets-v11"));
                assert!(template.contains("{z}"));
                assert!(template.contains("{token}"));
                assert!(attribution.is_some());
            }
            other => panic!("expected Xyz style, got {other:?}"),
        }
    }

    #[test]
    fn xyz_template_parses() {
        let style =
            BaseStyle::parse("https://tile.example.com/{z}/{x}/{y}.png").expect("parses");
        assert!(!style.requires_credential());
    }

    #[test]
    fn unknown_uris_are_rejected() {
        for uri in [
            "streets-v11",
            "mapbox://styles/",
            "mapbox://styles/no-slash",
            "https://tile.example.com/tiles.png",
            "ftp://tile.example.com/{z}/{x}/{y}.png",
        ] {
            assert!(
                matches!(BaseStyle::parse(uri), Err(Error::InvalidStyle(_))),
                "expected {uri} to be rejected"
            );
        }
    }

    #[test]
    fn expand_substitutes_all_placeholders() {
        let url = expand(
            "https://tile.example.com/{z}/{x}/{y}.png?key={token}",
            6,
            17,
            25,
            "secret",
        )
        .expect("expands");
        assert_eq!(url, "https://tile.example.com/6/17/25.png?key=secret");
    }

    #[test]
    fn expand_rejects_unknown_placeholders() {
        assert!(expand("https://{s}.tile.example.com/{z}/{x}/{y}.png", 0, 0, 0, "t").is_err());
    }
}
