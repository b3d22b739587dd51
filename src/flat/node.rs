//! Schema 1 node model
//!
//! A flat node is one entry of `levelNodes`: a type tag, a transform, a
//! top-level overlay color, variant fields and `raw_data`, the nested keys
//! this editor does not model. Variant fields live in [`FlatKind`], so a
//! Sign can never carry a stale material.

use crate::render::{Primitive, RenderNode};
use crate::scene::{
    expect_value, EditError, EditableNode, GraphNode, PropertyKey, PropertyValue,
};
use crate::world::json::JsonObject;
use crate::world::{Color, Shape, Transform, Vec3};

/// Material codes of schema 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlatMaterial {
    #[default]
    Default,
    Grab,
    Ice,
    Lava,
    Wood,
    Grapple,
    LavaGrapple,
    Breakable,
    Colored,
    Bounce,
    Snow,
    /// A code this editor does not know; kept so it survives a save
    Unknown(i64),
}

impl FlatMaterial {
    pub const ALL: [FlatMaterial; 11] = [
        FlatMaterial::Default,
        FlatMaterial::Grab,
        FlatMaterial::Ice,
        FlatMaterial::Lava,
        FlatMaterial::Wood,
        FlatMaterial::Grapple,
        FlatMaterial::LavaGrapple,
        FlatMaterial::Breakable,
        FlatMaterial::Colored,
        FlatMaterial::Bounce,
        FlatMaterial::Snow,
    ];

    pub fn code(self) -> i64 {
        match self {
            FlatMaterial::Default => 0,
            FlatMaterial::Grab => 1,
            FlatMaterial::Ice => 2,
            FlatMaterial::Lava => 3,
            FlatMaterial::Wood => 4,
            FlatMaterial::Grapple => 5,
            FlatMaterial::LavaGrapple => 6,
            FlatMaterial::Breakable => 7,
            FlatMaterial::Colored => 8,
            FlatMaterial::Bounce => 9,
            FlatMaterial::Snow => 10,
            FlatMaterial::Unknown(code) => code,
        }
    }

    pub fn from_code(code: i64) -> FlatMaterial {
        FlatMaterial::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .unwrap_or(FlatMaterial::Unknown(code))
    }

    pub fn name(self) -> &'static str {
        match self {
            FlatMaterial::Default => "default",
            FlatMaterial::Grab => "grab",
            FlatMaterial::Ice => "ice",
            FlatMaterial::Lava => "lava",
            FlatMaterial::Wood => "wood",
            FlatMaterial::Grapple => "grapple",
            FlatMaterial::LavaGrapple => "lava grapple",
            FlatMaterial::Breakable => "breakable",
            FlatMaterial::Colored => "colored",
            FlatMaterial::Bounce => "bounce",
            FlatMaterial::Snow => "snow",
            FlatMaterial::Unknown(_) => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<FlatMaterial> {
        FlatMaterial::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// The node types schema 1 knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatNodeType {
    Static,
    Sign,
    Start,
    Finish,
    Gravity,
    ParticleEmitter,
    Trigger,
    Sound,
}

impl FlatNodeType {
    pub const ALL: [FlatNodeType; 8] = [
        FlatNodeType::Static,
        FlatNodeType::Sign,
        FlatNodeType::Start,
        FlatNodeType::Finish,
        FlatNodeType::Gravity,
        FlatNodeType::ParticleEmitter,
        FlatNodeType::Trigger,
        FlatNodeType::Sound,
    ];

    /// Key used in level files
    pub fn tag(self) -> &'static str {
        match self {
            FlatNodeType::Static => "levelNodeStatic",
            FlatNodeType::Sign => "levelNodeSign",
            FlatNodeType::Start => "levelNodeStart",
            FlatNodeType::Finish => "levelNodeFinish",
            FlatNodeType::Gravity => "levelNodeGravity",
            FlatNodeType::ParticleEmitter => "levelNodeParticleEmitter",
            FlatNodeType::Trigger => "levelNodeTrigger",
            FlatNodeType::Sound => "levelNodeSound",
        }
    }

    pub fn from_tag(tag: &str) -> Option<FlatNodeType> {
        FlatNodeType::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Accepts the full tag or the part after `levelNode`, in any case
    pub fn from_name(name: &str) -> Option<FlatNodeType> {
        FlatNodeType::ALL.into_iter().find(|t| {
            let tag = t.tag();
            tag.eq_ignore_ascii_case(name) || tag["levelNode".len()..].eq_ignore_ascii_case(name)
        })
    }
}

/// Variant fields of a flat node
#[derive(Debug, Clone, PartialEq)]
pub enum FlatKind {
    Static {
        shape: Shape,
        material: FlatMaterial,
        /// Shader color, written as nested `color1`
        color1: Color,
    },
    Sign {
        text: String,
    },
    Start {
        radius: f64,
    },
    Finish {
        radius: f64,
    },
    Gravity {
        mode: i64,
    },
    ParticleEmitter,
    Trigger,
    Sound,
    /// A type tag this editor does not know. Everything but the transform
    /// stays in `raw_data`.
    Unknown {
        tag: String,
    },
}

impl FlatKind {
    /// Defaults for a newly created node
    pub fn new(node_type: FlatNodeType) -> FlatKind {
        match node_type {
            FlatNodeType::Static => FlatKind::Static {
                shape: Shape::Cube,
                material: FlatMaterial::Default,
                color1: Color::WHITE,
            },
            FlatNodeType::Sign => FlatKind::Sign { text: String::new() },
            FlatNodeType::Start => FlatKind::Start { radius: 1.0 },
            FlatNodeType::Finish => FlatKind::Finish { radius: 1.0 },
            FlatNodeType::Gravity => FlatKind::Gravity { mode: 0 },
            FlatNodeType::ParticleEmitter => FlatKind::ParticleEmitter,
            FlatNodeType::Trigger => FlatKind::Trigger,
            FlatNodeType::Sound => FlatKind::Sound,
        }
    }

    pub fn node_type(&self) -> Option<FlatNodeType> {
        match self {
            FlatKind::Static { .. } => Some(FlatNodeType::Static),
            FlatKind::Sign { .. } => Some(FlatNodeType::Sign),
            FlatKind::Start { .. } => Some(FlatNodeType::Start),
            FlatKind::Finish { .. } => Some(FlatNodeType::Finish),
            FlatKind::Gravity { .. } => Some(FlatNodeType::Gravity),
            FlatKind::ParticleEmitter => Some(FlatNodeType::ParticleEmitter),
            FlatKind::Trigger => Some(FlatNodeType::Trigger),
            FlatKind::Sound => Some(FlatNodeType::Sound),
            FlatKind::Unknown { .. } => None,
        }
    }

    /// Type tag as written in the file
    pub fn tag(&self) -> &str {
        match self {
            FlatKind::Unknown { tag } => tag,
            known => known.node_type().map(FlatNodeType::tag).unwrap_or_default(),
        }
    }

    /// Nested keys taken out of `raw_data` on load. Known variants drop
    /// every modeled field, including those of other variants; unknown tags
    /// keep everything but the transform. `scale` and `id` stay in
    /// `raw_data`; a save writes them back only when the loaded entry had them.
    pub fn owned_keys(&self) -> &'static [&'static str] {
        match self {
            FlatKind::Unknown { .. } => &["position", "rotation"],
            _ => &[
                "position", "rotation", "shape", "material", "color1", "radius", "text", "mode",
            ],
        }
    }
}

/// One entry of a schema 1 `levelNodes` list
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    /// Display-only name; not unique
    pub id: String,
    pub kind: FlatKind,
    pub transform: Transform,
    /// Top-level overlay color
    pub color: Color,
    /// Nested keys not modeled by the fields above, in file order
    pub raw_data: JsonObject,
}

impl FlatNode {
    pub fn new(node_type: FlatNodeType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: FlatKind::new(node_type),
            transform: Transform::IDENTITY,
            color: Color::BLACK,
            raw_data: JsonObject::new(),
        }
    }

    pub fn tag(&self) -> &str {
        self.kind.tag()
    }

    /// Text for list widgets
    pub fn label(&self) -> String {
        format!("{} ({})", self.id, self.tag())
    }
}

impl Default for FlatNode {
    fn default() -> Self {
        FlatNode::new(FlatNodeType::Static, "node")
    }
}

impl GraphNode for FlatNode {
    fn accepts_children(&self) -> bool {
        false
    }
}

impl EditableNode for FlatNode {
    fn kind_name(&self) -> &'static str {
        match self.kind {
            FlatKind::Static { .. } => "static",
            FlatKind::Sign { .. } => "sign",
            FlatKind::Start { .. } => "start",
            FlatKind::Finish { .. } => "finish",
            FlatKind::Gravity { .. } => "gravity",
            FlatKind::ParticleEmitter => "particle emitter",
            FlatKind::Trigger => "trigger",
            FlatKind::Sound => "sound",
            FlatKind::Unknown { .. } => "unknown",
        }
    }

    fn properties(&self) -> Vec<PropertyKey> {
        let mut keys = vec![
            PropertyKey::DisplayId,
            PropertyKey::Position,
            PropertyKey::Rotation,
            PropertyKey::Scale,
            PropertyKey::Color,
        ];
        match self.kind {
            FlatKind::Static { .. } => {
                keys.extend([PropertyKey::Shape, PropertyKey::Material, PropertyKey::Color1])
            }
            FlatKind::Start { .. } | FlatKind::Finish { .. } => keys.push(PropertyKey::Radius),
            FlatKind::Sign { .. } => keys.push(PropertyKey::Text),
            FlatKind::Gravity { .. } => keys.push(PropertyKey::Mode),
            _ => {}
        }
        keys
    }

    fn property(&self, key: PropertyKey) -> Option<PropertyValue> {
        let value = match (key, &self.kind) {
            (PropertyKey::DisplayId, _) => PropertyValue::Text(self.id.clone()),
            (PropertyKey::Position, _) => PropertyValue::Vector(self.transform.position),
            (PropertyKey::Rotation, _) => PropertyValue::Vector(self.transform.rotation),
            (PropertyKey::Scale, _) => PropertyValue::Vector(self.transform.scale),
            (PropertyKey::Color, _) => PropertyValue::Color(self.color),
            (PropertyKey::Shape, FlatKind::Static { shape, .. }) => PropertyValue::Shape(*shape),
            (PropertyKey::Material, FlatKind::Static { material, .. }) => {
                PropertyValue::Material(material.code())
            }
            (PropertyKey::Color1, FlatKind::Static { color1, .. }) => PropertyValue::Color(*color1),
            (PropertyKey::Radius, FlatKind::Start { radius } | FlatKind::Finish { radius }) => {
                PropertyValue::Number(*radius)
            }
            (PropertyKey::Text, FlatKind::Sign { text }) => PropertyValue::Text(text.clone()),
            (PropertyKey::Mode, FlatKind::Gravity { mode }) => PropertyValue::Integer(*mode),
            _ => return None,
        };
        Some(value)
    }

    fn set_property(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), EditError> {
        let rejected = self.not_applicable(key);
        match (key, &mut self.kind) {
            (PropertyKey::DisplayId, _) => {
                self.id = expect_value(key, value.as_text(), "text")?.to_string();
            }
            (PropertyKey::Position, _) => {
                self.transform.position = expect_value(key, value.as_vector(), "a vector")?;
            }
            (PropertyKey::Rotation, _) => {
                self.transform.rotation = expect_value(key, value.as_vector(), "a vector")?;
            }
            (PropertyKey::Scale, _) => {
                self.transform.scale = expect_value(key, value.as_vector(), "a vector")?;
            }
            (PropertyKey::Color, _) => {
                self.color = expect_value(key, value.as_color(), "a color")?;
            }
            (PropertyKey::Shape, FlatKind::Static { shape, .. }) => {
                *shape = expect_value(key, value.as_shape(), "a shape")?;
            }
            (PropertyKey::Material, FlatKind::Static { material, .. }) => {
                *material = FlatMaterial::from_code(expect_value(key, value.as_material(), "a material code")?);
            }
            (PropertyKey::Color1, FlatKind::Static { color1, .. }) => {
                *color1 = expect_value(key, value.as_color(), "a color")?;
            }
            (PropertyKey::Radius, FlatKind::Start { radius } | FlatKind::Finish { radius }) => {
                *radius = expect_value(key, value.as_number(), "a number")?;
            }
            (PropertyKey::Text, FlatKind::Sign { text }) => {
                *text = expect_value(key, value.as_text(), "text")?.to_string();
            }
            (PropertyKey::Mode, FlatKind::Gravity { mode }) => {
                *mode = expect_value(key, value.as_integer(), "an integer")?;
            }
            _ => return Err(rejected),
        }
        Ok(())
    }
}

impl RenderNode for FlatNode {
    fn local_transform(&self) -> Transform {
        match self.kind {
            // Markers are sized by radius alone
            FlatKind::Start { .. } | FlatKind::Finish { .. } => Transform {
                scale: Vec3::ONE,
                ..self.transform
            },
            _ => self.transform,
        }
    }

    fn primitive(&self) -> Primitive {
        match &self.kind {
            FlatKind::Static { shape, .. } => Primitive::Solid(*shape),
            FlatKind::Start { radius } | FlatKind::Finish { radius } => {
                Primitive::Sphere { radius: *radius }
            }
            FlatKind::Sign { .. }
            | FlatKind::Gravity { .. }
            | FlatKind::ParticleEmitter
            | FlatKind::Trigger
            | FlatKind::Sound => Primitive::WireCube,
            FlatKind::Unknown { .. } => Primitive::None,
        }
    }

    fn base_color(&self) -> Color {
        match &self.kind {
            FlatKind::Static { material, color1, .. } => match material {
                FlatMaterial::Grapple => Color::rgb(0.0, 0.8, 0.0),
                FlatMaterial::Wood => Color::rgb(0.5, 0.3, 0.1),
                _ => color1.with_alpha(1.0),
            },
            FlatKind::Start { .. } => Color::rgba(0.0, 1.0, 0.0, 0.4),
            FlatKind::Finish { .. } => Color::rgba(1.0, 0.0, 0.0, 0.4),
            FlatKind::Sign { .. } => Color::rgb(1.0, 1.0, 0.0),
            FlatKind::Gravity { .. } => Color::rgb(0.0, 0.0, 1.0),
            FlatKind::ParticleEmitter => Color::rgb(1.0, 0.5, 0.0),
            FlatKind::Trigger => Color::rgb(0.5, 0.0, 0.5),
            FlatKind::Sound => Color::rgb(0.5, 0.5, 0.5),
            FlatKind::Unknown { .. } => self.color,
        }
    }

    fn material_code(&self) -> Option<i64> {
        match &self.kind {
            FlatKind::Static { material, .. } => Some(material.code()),
            _ => None,
        }
    }
}
