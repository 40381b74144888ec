use rapier2d::prelude::*;

/// Collision groups for filtering which colliders world queries can see
///
/// Level geometry lives in the `Wall` and `Platform` groups. Controller probes
/// query as `Probe` so trigger volumes never register as walls or floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// Default group - interacts with everything
    Default = 0b0000_0001,

    /// Player characters
    Character = 0b0000_0010,

    /// Climbable, slidable level geometry
    Wall = 0b0000_0100,

    /// Walkable floors and one-off platforms
    Platform = 0b0000_1000,

    /// Trigger volumes - never block
    Trigger = 0b0001_0000,

    /// Controller world queries (sweeps, line traces)
    Probe = 0b0010_0000,
}

impl CollisionGroups {
    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // Characters stand on platforms and walls, and touch triggers
            CollisionGroups::Character => Group::from_bits_truncate(
                CollisionGroups::Wall as u32
                    | CollisionGroups::Platform as u32
                    | CollisionGroups::Trigger as u32,
            ),

            // Level geometry blocks characters and is visible to probes
            CollisionGroups::Wall | CollisionGroups::Platform => Group::from_bits_truncate(
                CollisionGroups::Character as u32 | CollisionGroups::Probe as u32,
            ),

            // Triggers only react to characters
            CollisionGroups::Trigger => {
                Group::from_bits_truncate(CollisionGroups::Character as u32)
            }

            // Probes see solid level geometry, tagged or not
            CollisionGroups::Probe => Group::from_bits_truncate(
                CollisionGroups::Default as u32
                    | CollisionGroups::Wall as u32
                    | CollisionGroups::Platform as u32,
            ),

            CollisionGroups::Default => Group::ALL,
        };

        InteractionGroups::new(memberships, filter)
    }
}

/// Gameplay tag attached to a collider
///
/// Queries that hit an untagged collider report `None` for the tag; callers
/// treat that the same as "no wall".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceTag {
    /// Surface the character can wall-slide on, hang from, and climb
    Wall,
    /// Plain walkable surface
    Platform,
}

impl SurfaceTag {
    /// Collision group a collider with this tag belongs to
    pub fn collision_group(self) -> CollisionGroups {
        match self {
            SurfaceTag::Wall => CollisionGroups::Wall,
            SurfaceTag::Platform => CollisionGroups::Platform,
        }
    }
}
