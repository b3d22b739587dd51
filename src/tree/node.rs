//! Schema 2 node model

use crate::render::{Primitive, RenderNode};
use crate::scene::{
    expect_value, EditError, EditableNode, GraphNode, PropertyKey, PropertyValue,
};
use crate::world::json::JsonObject;
use crate::world::{Color, Shape, Transform, Vec3};

/// Placeholder text of a new sign
pub const DEFAULT_SIGN_TEXT: &str = "Enter Text Here";

/// Material codes of schema 2 (not interchangeable with schema 1's table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TreeMaterial {
    #[default]
    Default,
    Grabbable,
    Crumbling,
    Death,
    Wood,
    ColoredGrabbable,
    GrappleHook,
    LavaDeath,
    /// A code this editor does not know; kept so it survives a save
    Unknown(i64),
}

impl TreeMaterial {
    pub const ALL: [TreeMaterial; 8] = [
        TreeMaterial::Default,
        TreeMaterial::Grabbable,
        TreeMaterial::Crumbling,
        TreeMaterial::Death,
        TreeMaterial::Wood,
        TreeMaterial::ColoredGrabbable,
        TreeMaterial::GrappleHook,
        TreeMaterial::LavaDeath,
    ];

    pub fn code(self) -> i64 {
        match self {
            TreeMaterial::Default => 0,
            TreeMaterial::Grabbable => 1,
            TreeMaterial::Crumbling => 2,
            TreeMaterial::Death => 3,
            TreeMaterial::Wood => 4,
            TreeMaterial::ColoredGrabbable => 5,
            TreeMaterial::GrappleHook => 6,
            TreeMaterial::LavaDeath => 7,
            TreeMaterial::Unknown(code) => code,
        }
    }

    pub fn from_code(code: i64) -> TreeMaterial {
        TreeMaterial::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .unwrap_or(TreeMaterial::Unknown(code))
    }

    pub fn name(self) -> &'static str {
        match self {
            TreeMaterial::Default => "default",
            TreeMaterial::Grabbable => "grabbable",
            TreeMaterial::Crumbling => "crumbling",
            TreeMaterial::Death => "death",
            TreeMaterial::Wood => "wood",
            TreeMaterial::ColoredGrabbable => "colored grabbable",
            TreeMaterial::GrappleHook => "grapple hook",
            TreeMaterial::LavaDeath => "lava death",
            TreeMaterial::Unknown(_) => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<TreeMaterial> {
        TreeMaterial::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// The node types schema 2 knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeNodeType {
    Static,
    Start,
    Finish,
    Crumbling,
    Sign,
    Group,
}

impl TreeNodeType {
    pub const ALL: [TreeNodeType; 6] = [
        TreeNodeType::Static,
        TreeNodeType::Start,
        TreeNodeType::Finish,
        TreeNodeType::Crumbling,
        TreeNodeType::Sign,
        TreeNodeType::Group,
    ];

    /// Key under `Node` in level files
    pub fn variant_key(self) -> &'static str {
        match self {
            TreeNodeType::Static => "staticResponse",
            TreeNodeType::Start => "startResponse",
            TreeNodeType::Finish => "finishResponse",
            TreeNodeType::Crumbling => "crumblingResponse",
            TreeNodeType::Sign => "signResponse",
            TreeNodeType::Group => "groupResponse",
        }
    }

    pub fn from_variant_key(key: &str) -> Option<TreeNodeType> {
        TreeNodeType::ALL.into_iter().find(|t| t.variant_key() == key)
    }

    /// Name shown in lists
    pub fn name(self) -> &'static str {
        match self {
            TreeNodeType::Static => "Static",
            TreeNodeType::Start => "Start",
            TreeNodeType::Finish => "Finish",
            TreeNodeType::Crumbling => "Crumbling",
            TreeNodeType::Sign => "Sign",
            TreeNodeType::Group => "Group",
        }
    }

    pub fn from_name(name: &str) -> Option<TreeNodeType> {
        TreeNodeType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// Variant fields of a tree node
#[derive(Debug, Clone, PartialEq)]
pub enum TreeKind {
    Static {
        shape: Shape,
        material: TreeMaterial,
        color: Color,
    },
    Start {
        radius: f64,
    },
    Finish {
        radius: f64,
    },
    /// Always written with the crumbling material
    Crumbling {
        shape: Shape,
        stable_time: f64,
        respawn_time: f64,
    },
    Sign {
        shape: Shape,
        text: String,
        color: Color,
    },
    /// Owns its children through the scene graph
    Group,
}

impl TreeKind {
    pub fn new(node_type: TreeNodeType) -> TreeKind {
        match node_type {
            TreeNodeType::Static => TreeKind::Static {
                shape: Shape::Cube,
                material: TreeMaterial::Default,
                color: Color::WHITE,
            },
            TreeNodeType::Start => TreeKind::Start { radius: 0.5 },
            TreeNodeType::Finish => TreeKind::Finish { radius: 0.5 },
            TreeNodeType::Crumbling => TreeKind::Crumbling {
                shape: Shape::Cube,
                stable_time: 1.0,
                respawn_time: 5.0,
            },
            TreeNodeType::Sign => TreeKind::Sign {
                shape: Shape::Cube,
                text: DEFAULT_SIGN_TEXT.to_string(),
                color: Color::WHITE,
            },
            TreeNodeType::Group => TreeKind::Group,
        }
    }

    pub fn node_type(&self) -> TreeNodeType {
        match self {
            TreeKind::Static { .. } => TreeNodeType::Static,
            TreeKind::Start { .. } => TreeNodeType::Start,
            TreeKind::Finish { .. } => TreeNodeType::Finish,
            TreeKind::Crumbling { .. } => TreeNodeType::Crumbling,
            TreeKind::Sign { .. } => TreeNodeType::Sign,
            TreeKind::Group => TreeNodeType::Group,
        }
    }

    pub fn shape(&self) -> Option<Shape> {
        match self {
            TreeKind::Static { shape, .. }
            | TreeKind::Crumbling { shape, .. }
            | TreeKind::Sign { shape, .. } => Some(*shape),
            _ => None,
        }
    }
}

/// One node of a schema 2 level
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Unique across the whole tree
    pub node_id: i64,
    pub kind: TreeKind,
    pub transform: Transform,
    /// Unrecognized keys of the variant content object
    pub extra: JsonObject,
}

impl TreeNode {
    pub fn new(node_type: TreeNodeType, node_id: i64) -> Self {
        Self {
            node_id,
            kind: TreeKind::new(node_type),
            transform: Transform::IDENTITY,
            extra: JsonObject::new(),
        }
    }

    pub fn node_type(&self) -> TreeNodeType {
        self.kind.node_type()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, TreeKind::Group)
    }

    /// `[ID: n] Type (shape, material-or-radius)`
    pub fn label(&self) -> String {
        let detail = match &self.kind {
            TreeKind::Static { shape, material, .. } => {
                format!("{}, {}", shape.name(), material.name())
            }
            TreeKind::Crumbling { shape, .. } => {
                format!("{}, {}", shape.name(), TreeMaterial::Crumbling.name())
            }
            TreeKind::Sign { shape, .. } => format!("{}, {}", shape.name(), TreeMaterial::Default.name()),
            TreeKind::Start { radius } | TreeKind::Finish { radius } => {
                format!("{}, {}", Shape::Sphere.name(), radius)
            }
            TreeKind::Group => "group".to_string(),
        };
        format!("[ID: {}] {} ({})", self.node_id, self.node_type().name(), detail)
    }
}

impl GraphNode for TreeNode {
    fn accepts_children(&self) -> bool {
        self.is_group()
    }
}

impl EditableNode for TreeNode {
    fn kind_name(&self) -> &'static str {
        self.node_type().name()
    }

    fn properties(&self) -> Vec<PropertyKey> {
        let mut keys = vec![PropertyKey::Position, PropertyKey::Rotation];
        match self.kind {
            TreeKind::Start { .. } | TreeKind::Finish { .. } => keys.push(PropertyKey::Radius),
            TreeKind::Static { .. } => keys.extend([
                PropertyKey::Scale,
                PropertyKey::Shape,
                PropertyKey::Material,
                PropertyKey::Color,
            ]),
            TreeKind::Crumbling { .. } => keys.extend([
                PropertyKey::Scale,
                PropertyKey::Shape,
                PropertyKey::StableTime,
                PropertyKey::RespawnTime,
            ]),
            TreeKind::Sign { .. } => keys.extend([
                PropertyKey::Scale,
                PropertyKey::Shape,
                PropertyKey::Text,
                PropertyKey::Color,
            ]),
            TreeKind::Group => keys.push(PropertyKey::Scale),
        }
        keys
    }

    fn property(&self, key: PropertyKey) -> Option<PropertyValue> {
        if !self.has_property(key) {
            return None;
        }
        let value = match (key, &self.kind) {
            (PropertyKey::Position, _) => PropertyValue::Vector(self.transform.position),
            (PropertyKey::Rotation, _) => PropertyValue::Vector(self.transform.rotation),
            (PropertyKey::Scale, _) => PropertyValue::Vector(self.transform.scale),
            (PropertyKey::Shape, kind) => PropertyValue::Shape(kind.shape()?),
            (PropertyKey::Material, TreeKind::Static { material, .. }) => {
                PropertyValue::Material(material.code())
            }
            (
                PropertyKey::Color,
                TreeKind::Static { color, .. } | TreeKind::Sign { color, .. },
            ) => PropertyValue::Color(*color),
            (PropertyKey::Radius, TreeKind::Start { radius } | TreeKind::Finish { radius }) => {
                PropertyValue::Number(*radius)
            }
            (PropertyKey::Text, TreeKind::Sign { text, .. }) => PropertyValue::Text(text.clone()),
            (PropertyKey::StableTime, TreeKind::Crumbling { stable_time, .. }) => {
                PropertyValue::Number(*stable_time)
            }
            (PropertyKey::RespawnTime, TreeKind::Crumbling { respawn_time, .. }) => {
                PropertyValue::Number(*respawn_time)
            }
            _ => return None,
        };
        Some(value)
    }

    fn set_property(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), EditError> {
        if !self.has_property(key) {
            return Err(self.not_applicable(key));
        }
        match (key, &mut self.kind) {
            (PropertyKey::Position, _) => {
                self.transform.position = expect_value(key, value.as_vector(), "a vector")?;
            }
            (PropertyKey::Rotation, _) => {
                self.transform.rotation = expect_value(key, value.as_vector(), "a vector")?;
            }
            (PropertyKey::Scale, _) => {
                self.transform.scale = expect_value(key, value.as_vector(), "a vector")?;
            }
            (
                PropertyKey::Shape,
                TreeKind::Static { shape, .. }
                | TreeKind::Crumbling { shape, .. }
                | TreeKind::Sign { shape, .. },
            ) => {
                *shape = expect_value(key, value.as_shape(), "a shape")?;
            }
            (PropertyKey::Material, TreeKind::Static { material, .. }) => {
                *material = TreeMaterial::from_code(expect_value(key, value.as_material(), "a material code")?);
            }
            (
                PropertyKey::Color,
                TreeKind::Static { color, .. } | TreeKind::Sign { color, .. },
            ) => {
                *color = expect_value(key, value.as_color(), "a color")?;
            }
            (PropertyKey::Radius, TreeKind::Start { radius } | TreeKind::Finish { radius }) => {
                *radius = expect_value(key, value.as_number(), "a number")?;
            }
            (PropertyKey::Text, TreeKind::Sign { text, .. }) => {
                *text = expect_value(key, value.as_text(), "text")?.to_string();
            }
            (PropertyKey::StableTime, TreeKind::Crumbling { stable_time, .. }) => {
                *stable_time = expect_value(key, value.as_number(), "a number")?;
            }
            (PropertyKey::RespawnTime, TreeKind::Crumbling { respawn_time, .. }) => {
                *respawn_time = expect_value(key, value.as_number(), "a number")?;
            }
            // Every key in `properties()` is matched above
            _ => {}
        }
        Ok(())
    }
}

impl RenderNode for TreeNode {
    fn local_transform(&self) -> Transform {
        match self.kind {
            // Markers are sized by radius alone
            TreeKind::Start { .. } | TreeKind::Finish { .. } => Transform {
                scale: Vec3::ONE,
                ..self.transform
            },
            _ => self.transform,
        }
    }

    fn primitive(&self) -> Primitive {
        match &self.kind {
            TreeKind::Group => Primitive::None,
            TreeKind::Start { radius } | TreeKind::Finish { radius } => {
                Primitive::Sphere { radius: *radius }
            }
            TreeKind::Static { shape, .. }
            | TreeKind::Crumbling { shape, .. }
            | TreeKind::Sign { shape, .. } => Primitive::Solid(*shape),
        }
    }

    fn base_color(&self) -> Color {
        match &self.kind {
            TreeKind::Start { .. } => Color::rgba(0.0, 1.0, 0.0, 0.5),
            TreeKind::Finish { .. } => Color::rgba(1.0, 0.0, 1.0, 0.5),
            TreeKind::Crumbling { .. } => Color::rgb(1.0, 0.5, 0.0),
            TreeKind::Static { material, color, .. } => match material {
                TreeMaterial::Death | TreeMaterial::LavaDeath => Color::rgb(1.0, 0.0, 0.0),
                TreeMaterial::GrappleHook => Color::rgb(0.0, 0.8, 0.0),
                _ => *color,
            },
            TreeKind::Sign { color, .. } => *color,
            TreeKind::Group => Color::WHITE,
        }
    }

    fn material_code(&self) -> Option<i64> {
        match &self.kind {
            TreeKind::Static { material, .. } => Some(material.code()),
            TreeKind::Crumbling { .. } => Some(TreeMaterial::Crumbling.code()),
            _ => None,
        }
    }
}
