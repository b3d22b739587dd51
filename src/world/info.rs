//! Level header: title, creators, tags and ambience
//!
//! Both schemas share the same top-level header shape with a few differences:
//! schema 1 carries `tags`, schema 2 carries `complexity`, and the fog key is
//! spelled `fogDensity` / `fogDDensity` respectively. Every key this module
//! does not manage is kept in `extra` and written back untouched.

use serde_json::{Map, Value};

use super::color::Color;
use super::json::{
    as_object, color_to_json, or_warn, read_color, read_f64, read_i64, read_string, JsonObject,
};
use super::level::Schema;

/// Sky, sun and fog parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AmbienceSettings {
    pub sky_zenith_color: Color,
    pub sky_horizon_color: Color,
    /// Degrees above the horizon
    pub sun_altitude: f64,
    /// Degrees clockwise from north
    pub sun_azimuth: f64,
    pub sun_size: f64,
    pub fog_density: f64,
    /// Unrecognized ambience keys
    pub extra: JsonObject,
}

/// Managed ambience keys besides the fog key
const AMBIENCE_KEYS: [&str; 5] = [
    "skyZenithColor",
    "skyHorizonColor",
    "sunAltitude",
    "sunAzimuth",
    "sunSize",
];

impl AmbienceSettings {
    pub fn defaults_for(schema: Schema) -> Self {
        match schema {
            Schema::Flat => Self {
                sky_zenith_color: Color::rgba(0.28, 0.476, 0.73, 1.0),
                sky_horizon_color: Color::rgba(0.916, 0.9574, 0.9574, 1.0),
                sun_altitude: 45.0,
                sun_azimuth: 315.0,
                sun_size: 1.0,
                fog_density: 0.0,
                extra: Map::new(),
            },
            Schema::Tree => Self {
                sky_zenith_color: Color::rgba(0.1, 0.1, 0.3, 1.0),
                sky_horizon_color: Color::rgba(0.5, 0.5, 0.8, 1.0),
                sun_altitude: 45.0,
                sun_azimuth: 0.0,
                sun_size: 1.0,
                fog_density: 0.0,
                extra: Map::new(),
            },
        }
    }

    /// Decode `ambienceSettings`. Malformed fields fall back to the schema default.
    pub fn from_json(value: Option<&Value>, schema: Schema) -> Self {
        let defaults = Self::defaults_for(schema);
        let obj = match value.filter(|v| !v.is_null()).map(as_object) {
            None => return defaults,
            Some(Ok(obj)) => obj,
            Some(Err(e)) => {
                log::warn!("ambienceSettings: {}; using defaults", e);
                return defaults;
            }
        };

        // Either spelling is accepted; the schema's own spelling wins when both are
        // present and the other one is kept in `extra`
        let (own, other) = match schema {
            Schema::Flat => ("fogDensity", "fogDDensity"),
            Schema::Tree => ("fogDDensity", "fogDensity"),
        };
        let fog_key = if obj.contains_key(own) { own } else { other };

        Self {
            sky_zenith_color: read_color(obj, "skyZenithColor", defaults.sky_zenith_color),
            sky_horizon_color: read_color(obj, "skyHorizonColor", defaults.sky_horizon_color),
            sun_altitude: or_warn(
                read_f64(obj, "sunAltitude", defaults.sun_altitude),
                defaults.sun_altitude,
                "ambienceSettings",
            ),
            sun_azimuth: or_warn(
                read_f64(obj, "sunAzimuth", defaults.sun_azimuth),
                defaults.sun_azimuth,
                "ambienceSettings",
            ),
            sun_size: or_warn(
                read_f64(obj, "sunSize", defaults.sun_size),
                defaults.sun_size,
                "ambienceSettings",
            ),
            fog_density: or_warn(
                read_f64(obj, fog_key, defaults.fog_density),
                defaults.fog_density,
                "ambienceSettings",
            ),
            extra: obj
                .iter()
                .filter(|(k, _)| k.as_str() != fog_key && !AMBIENCE_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn to_json(&self, schema: Schema) -> Value {
        let mut obj = Map::new();
        obj.insert("skyZenithColor".into(), color_to_json(self.sky_zenith_color));
        obj.insert("skyHorizonColor".into(), color_to_json(self.sky_horizon_color));
        obj.insert("sunAltitude".into(), self.sun_altitude.into());
        obj.insert("sunAzimuth".into(), self.sun_azimuth.into());
        obj.insert("sunSize".into(), self.sun_size.into());
        obj.insert(schema.fog_key().into(), self.fog_density.into());
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

/// Level-wide metadata
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    pub format_version: i64,
    pub title: String,
    pub creators: String,
    pub description: String,
    /// Schema 1 only; `None` means the key is not written
    pub tags: Option<Vec<String>>,
    /// Schema 2 only; `None` means the key is not written
    pub complexity: Option<i64>,
    pub max_checkpoint_count: i64,
    pub ambience: AmbienceSettings,
    /// Unrecognized top-level keys, in file order
    pub extra: JsonObject,
}

const HEADER_KEYS: [&str; 9] = [
    "formatVersion",
    "title",
    "creators",
    "description",
    "tags",
    "complexity",
    "maxCheckpointCount",
    "ambienceSettings",
    "levelNodes",
];

impl LevelInfo {
    pub fn defaults_for(schema: Schema) -> Self {
        match schema {
            Schema::Flat => Self {
                format_version: 12,
                title: "New Level".to_string(),
                creators: ".index-editor".to_string(),
                description: ".index modding - grab-tools.live".to_string(),
                tags: Some(Vec::new()),
                complexity: None,
                max_checkpoint_count: 10,
                ambience: AmbienceSettings::defaults_for(schema),
                extra: Map::new(),
            },
            Schema::Tree => Self {
                format_version: 1,
                title: "New Level".to_string(),
                creators: "Unknown".to_string(),
                description: "A fantastic GRAB level.".to_string(),
                tags: None,
                complexity: Some(1),
                max_checkpoint_count: 10,
                ambience: AmbienceSettings::defaults_for(schema),
                extra: Map::new(),
            },
        }
    }

    /// Decode the header of a level document. `levelNodes` is left to the schema codec.
    pub fn from_json(root: &JsonObject, schema: Schema) -> Self {
        let d = Self::defaults_for(schema);
        let ctx = "level header";

        let tags = match root.get("tags") {
            None | Some(Value::Null) => d.tags.clone(),
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|t| match t {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Some(Value::String(s)) => Some(parse_tags(s)),
            Some(other) => {
                log::warn!("{}: `tags` is {}; using default", ctx, super::json::type_name(other));
                d.tags.clone()
            }
        };

        let complexity = if root.contains_key("complexity") {
            Some(or_warn(
                read_i64(root, "complexity", d.complexity.unwrap_or(1)),
                d.complexity.unwrap_or(1),
                ctx,
            ))
        } else {
            d.complexity
        };

        Self {
            format_version: or_warn(
                read_i64(root, "formatVersion", d.format_version),
                d.format_version,
                ctx,
            ),
            title: or_warn(read_string(root, "title", &d.title), d.title.clone(), ctx),
            creators: or_warn(read_string(root, "creators", &d.creators), d.creators.clone(), ctx),
            description: or_warn(
                read_string(root, "description", &d.description),
                d.description.clone(),
                ctx,
            ),
            tags,
            complexity,
            max_checkpoint_count: or_warn(
                read_i64(root, "maxCheckpointCount", d.max_checkpoint_count),
                d.max_checkpoint_count,
                ctx,
            ),
            ambience: AmbienceSettings::from_json(root.get("ambienceSettings"), schema),
            extra: root
                .iter()
                .filter(|(k, _)| !HEADER_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Encode the header followed by the already-encoded `levelNodes`
    pub fn to_json(&self, schema: Schema, level_nodes: Vec<Value>) -> Value {
        let mut obj = Map::new();
        obj.insert("formatVersion".into(), self.format_version.into());
        obj.insert("title".into(), self.title.clone().into());
        obj.insert("creators".into(), self.creators.clone().into());
        obj.insert("description".into(), self.description.clone().into());
        if let Some(tags) = &self.tags {
            obj.insert("tags".into(), tags.clone().into());
        }
        if let Some(complexity) = self.complexity {
            obj.insert("complexity".into(), complexity.into());
        }
        obj.insert("maxCheckpointCount".into(), self.max_checkpoint_count.into());
        obj.insert("ambienceSettings".into(), self.ambience.to_json(schema));
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        obj.insert("levelNodes".into(), Value::Array(level_nodes));
        Value::Object(obj)
    }

    /// Replace the tag list from a comma-separated string
    pub fn set_tags_from_str(&mut self, text: &str) {
        self.tags = Some(parse_tags(text));
    }

    /// Tags joined for a single-line text field
    pub fn tags_string(&self) -> String {
        self.tags.as_deref().unwrap_or_default().join(", ")
    }
}

/// Split a comma-separated tag string, trimming and dropping empties
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
