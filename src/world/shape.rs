//! Primitive shape codes shared by both level schemas

/// Node shape, stored in files as an integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Cube,
    Sphere,
    Cylinder,
    Pyramid,
    Prism,
    Cone,
    SquarePyramid,
    /// A code this editor does not know; kept so it survives a save
    Unknown(i64),
}

impl Shape {
    /// Every known shape, in picker order
    pub const ALL: [Shape; 7] = [
        Shape::Cube,
        Shape::Sphere,
        Shape::Cylinder,
        Shape::Pyramid,
        Shape::Prism,
        Shape::Cone,
        Shape::SquarePyramid,
    ];

    pub fn code(self) -> i64 {
        match self {
            Shape::Cube => 1000,
            Shape::Sphere => 1001,
            Shape::Cylinder => 1002,
            Shape::Pyramid => 1003,
            Shape::Prism => 1004,
            Shape::Cone => 1005,
            Shape::SquarePyramid => 1006,
            Shape::Unknown(code) => code,
        }
    }

    pub fn from_code(code: i64) -> Shape {
        match code {
            1000 => Shape::Cube,
            1001 => Shape::Sphere,
            1002 => Shape::Cylinder,
            1003 => Shape::Pyramid,
            1004 => Shape::Prism,
            1005 => Shape::Cone,
            1006 => Shape::SquarePyramid,
            other => Shape::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Pyramid => "pyramid",
            Shape::Prism => "prism",
            Shape::Cone => "cone",
            Shape::SquarePyramid => "square pyramid",
            Shape::Unknown(_) => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Shape> {
        Shape::ALL.into_iter().find(|s| s.name() == name)
    }
}
