//! Outbound change notifications and their quantization.
//!
//! Positions are sent in 1/256 cell fixed point, angles as a full turn
//! mapped onto `u16`. Transport and byte encoding belong to the sink.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::entity::EntityId;

pub const POSITION_SCALE: f32 = 256.0;
/// Angle units per full turn.
pub const ANGLE_UNITS_PER_TURN: f32 = 65536.0;

pub type MessagePosition = [i16; 3];

#[inline]
pub fn coord_to_message(value: f32) -> i16 {
    (value * POSITION_SCALE).round() as i16
}

#[inline]
pub fn position_to_message(pos: Vec3) -> MessagePosition {
    [
        coord_to_message(pos.x),
        coord_to_message(pos.y),
        coord_to_message(pos.z),
    ]
}

#[inline]
pub fn angle_to_message(angle: f32) -> u16 {
    (angle.rem_euclid(TAU) / TAU * ANGLE_UNITS_PER_TURN).round() as u32 as u16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallPosition {
    pub wall_index: u16,
    pub vertices_xy: [[i16; 2]; 2],
    pub z: i16,
    pub texture_id: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticModelState {
    pub static_model_index: u16,
    pub xyz: MessagePosition,
    pub angle: u16,
    pub model_id: u8,
    pub animation_frame: u16,
    pub animation_playing: bool,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemState {
    pub item_index: u16,
    pub z: i16,
    pub picked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteEffectBirth {
    pub effect_id: u8,
    pub xyz: MessagePosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterState {
    pub monster_id: EntityId,
    pub xyz: MessagePosition,
    pub angle: u16,
    pub monster_type: u8,
    pub body_parts_mask: u8,
    pub animation: u16,
    pub animation_frame: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterBirth {
    pub monster_id: EntityId,
    pub initial_state: MonsterState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocketBirth {
    pub rocket_id: EntityId,
    pub rocket_type: u8,
    pub xyz: MessagePosition,
    pub angle: [u16; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocketState {
    pub rocket_id: EntityId,
    pub xyz: MessagePosition,
    pub angle: [u16; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocketDeath {
    pub rocket_id: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicItemBirth {
    pub item_id: EntityId,
    pub item_type_id: u8,
    pub xyz: MessagePosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicItemDeath {
    pub item_id: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleEffectBirth {
    pub effect_id: u8,
    pub xyz: MessagePosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterPartBirth {
    pub monster_type: u8,
    pub part_id: u8,
    pub xyz: MessagePosition,
    pub angle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapEventSound {
    pub xyz: MessagePosition,
    pub sound_id: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterLinkedSound {
    pub monster_id: EntityId,
    pub sound_id: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterSound {
    pub monster_id: EntityId,
    pub monster_sound_id: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextMessage {
    pub text_message_number: u16,
}

/// Every notification the simulation produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Message {
    WallPosition(WallPosition),
    StaticModelState(StaticModelState),
    ItemState(ItemState),
    SpriteEffectBirth(SpriteEffectBirth),
    MonsterBirth(MonsterBirth),
    MonsterState(MonsterState),
    RocketBirth(RocketBirth),
    RocketState(RocketState),
    RocketDeath(RocketDeath),
    DynamicItemBirth(DynamicItemBirth),
    DynamicItemDeath(DynamicItemDeath),
    ParticleEffectBirth(ParticleEffectBirth),
    MonsterPartBirth(MonsterPartBirth),
    MapEventSound(MapEventSound),
    MonsterLinkedSound(MonsterLinkedSound),
    MonsterSound(MonsterSound),
    TextMessage(TextMessage),
}

macro_rules! impl_from_payload {
    ($($payload:ident),* $(,)?) => {
        $(
            impl From<$payload> for Message {
                fn from(payload: $payload) -> Self {
                    Message::$payload(payload)
                }
            }
        )*
    };
}

impl_from_payload!(
    WallPosition,
    StaticModelState,
    ItemState,
    SpriteEffectBirth,
    MonsterBirth,
    MonsterState,
    RocketBirth,
    RocketState,
    RocketDeath,
    DynamicItemBirth,
    DynamicItemDeath,
    ParticleEffectBirth,
    MonsterPartBirth,
    MapEventSound,
    MonsterLinkedSound,
    MonsterSound,
    TextMessage,
);

/// Logical outbound channel for one observer.
pub trait MessageSink {
    fn send_reliable(&mut self, message: Message);
    fn send_unreliable(&mut self, message: Message);
}

/// Sink that keeps everything it receives, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    pub reliable: Vec<Message>,
    pub unreliable: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.reliable.clear();
        self.unreliable.clear();
    }

    /// Unreliable messages of one kind, selected by name.
    pub fn unreliable_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Message> {
        self.unreliable
            .iter()
            .filter(move |message| message.as_ref() == kind)
    }
}

impl MessageSink for MessageLog {
    fn send_reliable(&mut self, message: Message) {
        self.reliable.push(message);
    }

    fn send_unreliable(&mut self, message: Message) {
        self.unreliable.push(message);
    }
}
