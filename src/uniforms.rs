//! Render-facing output
//!
//! The shading stage reads the scene through named uniforms. The simulation
//! writes them once per frame through a [`UniformSink`]; [`SceneUniforms`] is
//! the same data packed for a single GPU upload.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec2, Vec3, Vec4};
use std::collections::HashMap;

use crate::sim::animation::{JOINT_COUNT, JOINT_UNIFORMS, LIFT_UNIFORM, frames};
use crate::sim::state::World;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Mat3(Mat3),
}

impl UniformValue {
    /// GLSL type name
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Mat3(_) => "mat3",
        }
    }
}

/// Whatever holds the uniforms (a GL program, a recorder in tests)
pub trait UniformSink {
    fn declare_uniform(&mut self, name: &str, initial: UniformValue);
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

/// Records uniform values by name
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    values: HashMap<String, UniformValue>,
    /// Writes to names that were never declared
    pub undeclared_writes: usize,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl UniformSink for UniformTable {
    fn declare_uniform(&mut self, name: &str, initial: UniformValue) {
        self.values.insert(name.to_owned(), initial);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                log::warn!("Uniform {name} written before it was declared");
                self.undeclared_writes += 1;
            }
        }
    }
}

/// Declare every uniform with its initial value
pub fn declare_uniforms<S: UniformSink + ?Sized>(sink: &mut S) {
    use UniformValue as U;

    sink.declare_uniform("t", U::Float(0.0));
    sink.declare_uniform("camPos", U::Vec3(Vec3::new(0.0, 5.0, -10.0)));
    sink.declare_uniform("camAngle", U::Vec2(Vec2::ZERO));
    sink.declare_uniform("playerPos", U::Vec3(Vec3::new(0.0, 2.0, 0.0)));
    sink.declare_uniform("playerAngle", U::Vec2(Vec2::ZERO));
    sink.declare_uniform("boulderPos", U::Vec3(Vec3::new(0.0, 5.0, 3.0)));
    sink.declare_uniform("boulderRotMat", U::Mat3(Mat3::IDENTITY));
    sink.declare_uniform("isPushing", U::Float(0.0));
    for (name, joint) in JOINT_UNIFORMS.iter().zip(frames::IDLE.joints) {
        sink.declare_uniform(name, U::Vec3(joint));
    }
    sink.declare_uniform(LIFT_UNIFORM, U::Float(frames::IDLE.lift));
}

/// Write the current frame's uniforms
pub fn write_uniforms<S: UniformSink + ?Sized>(world: &World, sink: &mut S) {
    use UniformValue as U;

    let scene = world.scene();
    let player = &world.player;

    sink.set_uniform("t", U::Float(scene.time));
    sink.set_uniform("camPos", U::Vec3(player.camera));
    sink.set_uniform("camAngle", U::Vec2(player.look));
    sink.set_uniform("playerPos", U::Vec3(scene.player.position));
    sink.set_uniform("playerAngle", U::Vec2(Vec2::new(scene.player.facing, 0.0)));
    sink.set_uniform("boulderPos", U::Vec3(scene.boulder.position));
    sink.set_uniform("boulderRotMat", U::Mat3(scene.boulder.rotation));
    sink.set_uniform("isPushing", U::Float(if scene.player.pushing { 1.0 } else { 0.0 }));
    for (name, joint) in JOINT_UNIFORMS.iter().zip(scene.player.pose.joints) {
        sink.set_uniform(name, U::Vec3(joint));
    }
    sink.set_uniform(LIFT_UNIFORM, U::Float(scene.player.pose.lift));
}

// ============================================================================
// GPU layout (std140-compatible: every vec3 padded to 16 bytes)
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniforms {
    pub time: f32,               // offset 0
    pub is_pushing: f32,         // offset 4
    pub lift: f32,               // offset 8
    pub _pad0: f32,              // offset 12
    pub cam_pos: Vec4,           // offset 16
    pub cam_angle: Vec2,         // offset 32
    pub player_angle: Vec2,      // offset 40
    pub player_pos: Vec4,        // offset 48
    pub boulder_pos: Vec4,       // offset 64
    pub boulder_rot: [Vec4; 3],  // offset 80, one column per row
    pub joints: [Vec4; JOINT_COUNT], // offset 128
}

impl SceneUniforms {
    pub fn from_world(world: &World) -> Self {
        let scene = world.scene();
        let player = &world.player;
        let rot = scene.boulder.rotation;

        Self {
            time: scene.time,
            is_pushing: if scene.player.pushing { 1.0 } else { 0.0 },
            lift: scene.player.pose.lift,
            _pad0: 0.0,
            cam_pos: player.camera.extend(0.0),
            cam_angle: player.look,
            player_angle: Vec2::new(scene.player.facing, 0.0),
            player_pos: scene.player.position.extend(0.0),
            boulder_pos: scene.boulder.position.extend(0.0),
            boulder_rot: [rot.x_axis.extend(0.0), rot.y_axis.extend(0.0), rot.z_axis.extend(0.0)],
            joints: scene.player.pose.joints.map(|joint| joint.extend(0.0)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::animation::Joint;
    use crate::sim::state::{FrameContext, Keys, TickInput};
    use crate::sim::tick::{start, tick};

    fn played_world() -> World {
        let mut world = World::new(3, Tuning::default());
        start(&mut world);
        let input = TickInput {
            held: Keys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for i in 1..=20 {
            tick(&mut world, &input, FrameContext::new(i as f32 / 60.0, 1.0 / 60.0));
        }
        world
    }

    #[test]
    fn test_declares_every_uniform() {
        let mut table = UniformTable::new();
        declare_uniforms(&mut table);
        assert_eq!(table.len(), 8 + JOINT_COUNT + 1);
        assert_eq!(table.get("boulderRotMat"), Some(UniformValue::Mat3(Mat3::IDENTITY)));
        assert_eq!(table.get("uLift").map(|v| v.type_name()), Some("float"));
        assert_eq!(table.get("uhip1").map(|v| v.type_name()), Some("vec3"));
    }

    #[test]
    fn test_write_matches_world() {
        let world = played_world();
        let mut table = UniformTable::new();
        declare_uniforms(&mut table);
        write_uniforms(&world, &mut table);

        assert_eq!(table.undeclared_writes, 0);
        assert_eq!(table.get("playerPos"), Some(UniformValue::Vec3(world.player.position)));
        assert_eq!(table.get("boulderPos"), Some(UniformValue::Vec3(world.boulder.position)));
        assert_eq!(table.get("camPos"), Some(UniformValue::Vec3(world.player.camera)));
        assert_eq!(table.get("t"), Some(UniformValue::Float(20.0 / 60.0)));

        let lean = world.player.lean();
        assert_eq!(table.get("uBodyAngle"), Some(UniformValue::Vec3(Vec3::new(0.0, lean, 0.0))));
    }

    #[test]
    fn test_undeclared_write_is_counted() {
        let mut table = UniformTable::new();
        table.set_uniform("nope", UniformValue::Float(1.0));
        assert_eq!(table.undeclared_writes, 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_gpu_layout() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 304);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);

        let world = played_world();
        let uniforms = SceneUniforms::from_world(&world);
        assert_eq!(uniforms.as_bytes().len(), 304);
        assert_eq!(uniforms.player_pos.truncate(), world.player.position);
        let body = world.player.pose().pose.joint(Joint::BodyAngle);
        assert_eq!(uniforms.joints[Joint::BodyAngle as usize], body.extend(0.0));

        // Rotation columns start at byte 80
        let floats: &[f32] = bytemuck::cast_slice(uniforms.as_bytes());
        assert_eq!(floats[20..24], world.boulder.rotation.x_axis.extend(0.0).to_array());
    }
}
