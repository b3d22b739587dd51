//! Viewport contract
//!
//! The editor core never draws. Each frame the viewport borrows a
//! [`RenderView`] (graph, selection, ambience) and turns it into a flat
//! [`DrawList`] of world-space primitives. Nothing here mutates the level.

use crate::scene::{NodeHandle, SceneGraph};
use crate::world::{AmbienceSettings, Color, GlobalTransform, Mat4, Shape, Transform, Vec3};

/// What a node looks like in the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// A solid of the node's shape, unit-sized before scaling
    Solid(Shape),
    /// Marker sphere (start and finish)
    Sphere { radius: f64 },
    /// Outline box for volumes with no solid geometry
    WireCube,
    /// Not drawn (groups, unknown types)
    None,
}

/// Per-node drawing data, implemented by each schema's node type
pub trait RenderNode {
    /// Transform relative to the parent group
    fn local_transform(&self) -> Transform;

    fn primitive(&self) -> Primitive;

    fn base_color(&self) -> Color;

    /// Material code used to pick a texture
    fn material_code(&self) -> Option<i64> {
        None
    }
}

/// Read-only snapshot handed to the viewport each frame
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a, N> {
    pub graph: &'a SceneGraph<N>,
    pub selection: Option<NodeHandle>,
    pub ambience: &'a AmbienceSettings,
}

/// One primitive to draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub handle: NodeHandle,
    pub primitive: Primitive,
    /// Local-to-world matrix including every enclosing group
    pub world: Mat4,
    pub color: Color,
    pub material: Option<i64>,
    pub selected: bool,
}

/// Everything the viewport needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    pub sky_zenith: Color,
    pub sky_horizon: Color,
    /// Unit vector pointing towards the sun
    pub sun_direction: Vec3,
    pub sun_size: f64,
    pub fog_density: f64,
}

impl DrawList {
    pub fn selected(&self) -> Option<&DrawCommand> {
        self.commands.iter().find(|c| c.selected)
    }
}

/// Direction towards the sun from altitude/azimuth in degrees.
/// Azimuth 0 points along +Z, 90 along +X.
pub fn sun_direction(altitude: f64, azimuth: f64) -> Vec3 {
    let (sa, ca) = altitude.to_radians().sin_cos();
    let (sz, cz) = azimuth.to_radians().sin_cos();
    Vec3::new(ca * sz, sa, ca * cz).normalize()
}

/// Walk the graph depth-first and emit a draw command for every visible node
pub fn build_draw_list<N: RenderNode>(view: &RenderView<'_, N>) -> DrawList {
    let graph = view.graph;
    let mut commands = Vec::with_capacity(graph.len());

    // (node, parent's world transform)
    let mut stack: Vec<(NodeHandle, GlobalTransform)> = graph
        .roots()
        .iter()
        .rev()
        .map(|&h| (h, GlobalTransform::identity()))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let Some(node) = graph.get(handle) else {
            continue;
        };
        let global = GlobalTransform::from_parent_and_local(&parent, &node.local_transform());

        let primitive = node.primitive();
        if primitive != Primitive::None {
            commands.push(DrawCommand {
                handle,
                primitive,
                world: *global.matrix(),
                color: node.base_color(),
                material: node.material_code(),
                selected: view.selection == Some(handle),
            });
        }

        stack.extend(graph.children(handle).iter().rev().map(|&c| (c, global)));
    }

    let ambience = view.ambience;
    DrawList {
        commands,
        sky_zenith: ambience.sky_zenith_color,
        sky_horizon: ambience.sky_horizon_color,
        sun_direction: sun_direction(ambience.sun_altitude, ambience.sun_azimuth),
        sun_size: ambience.sun_size,
        fog_density: ambience.fog_density,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::{FlatLevel, FlatNodeType};
    use crate::scene::LevelDocument;
    use crate::tree::{TreeLevel, TreeNodeType};
    use crate::world::{mat4_transform_point, Schema};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.z - b.z).abs() < 1e-9
    }

    #[test]
    fn test_groups_compose_transforms() {
        let mut level = TreeLevel::with_info(crate::world::LevelInfo::defaults_for(Schema::Tree));
        let group = level
            .add_node(
                TreeNodeType::Group,
                Some(Transform::from_position(Vec3::new(10.0, 0.0, 0.0))),
                None,
            )
            .unwrap();
        let child = level
            .add_node(
                TreeNodeType::Static,
                Some(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
                Some(group),
            )
            .unwrap();

        let ambience = level.info().ambience.clone();
        let view = RenderView { graph: level.graph(), selection: Some(child), ambience: &ambience };
        let list = build_draw_list(&view);

        // The group itself is not drawn
        assert_eq!(list.commands.len(), 1);
        let cmd = &list.commands[0];
        assert_eq!(cmd.handle, child);
        assert!(cmd.selected);
        assert_eq!(cmd.primitive, Primitive::Solid(Shape::Cube));
        let origin = mat4_transform_point(&cmd.world, Vec3::ZERO);
        assert!(approx(origin, Vec3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn test_group_rotation_applies_to_children() {
        let mut level = TreeLevel::with_info(crate::world::LevelInfo::defaults_for(Schema::Tree));
        let mut turn = Transform::IDENTITY;
        turn.rotation = Vec3::new(0.0, 90.0, 0.0);
        let group = level.add_node(TreeNodeType::Group, Some(turn), None).unwrap();
        level
            .add_node(
                TreeNodeType::Sign,
                Some(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
                Some(group),
            )
            .unwrap();

        let ambience = level.info().ambience.clone();
        let list = build_draw_list(&RenderView { graph: level.graph(), selection: None, ambience: &ambience });
        let p = mat4_transform_point(&list.commands[0].world, Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_tree_marker_colors() {
        let level = TreeLevel::new_default();
        let ambience = level.info().ambience.clone();
        let list = build_draw_list(&RenderView { graph: level.graph(), selection: None, ambience: &ambience });
        assert_eq!(list.commands.len(), 3);
        assert_eq!(list.commands[0].primitive, Primitive::Sphere { radius: 0.5 });
        assert_eq!(list.commands[0].color, Color::rgba(0.0, 1.0, 0.0, 0.5));
        assert_eq!(list.commands[1].color, Color::rgba(1.0, 0.0, 1.0, 0.5));
        assert_eq!(list.commands[2].color, Color::WHITE);
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_flat_volumes_are_wire_cubes() {
        let mut level = FlatLevel::new_default();
        level.add_node(FlatNodeType::Trigger, None, None).unwrap();
        level.add_node(FlatNodeType::Start, None, None).unwrap();
        let ambience = level.info().ambience.clone();
        let list = build_draw_list(&RenderView { graph: level.graph(), selection: None, ambience: &ambience });
        assert_eq!(list.commands[0].primitive, Primitive::WireCube);
        assert_eq!(list.commands[1].primitive, Primitive::Sphere { radius: 1.0 });
    }

    #[test]
    fn test_sun_direction() {
        assert!(approx(sun_direction(90.0, 0.0), Vec3::new(0.0, 1.0, 0.0)));
        assert!(approx(sun_direction(0.0, 90.0), Vec3::new(1.0, 0.0, 0.0)));
        let d = sun_direction(45.0, 315.0);
        assert!((d.len() - 1.0).abs() < 1e-9);
        assert!(d.y > 0.0 && d.x < 0.0 && d.z > 0.0);
    }
}
