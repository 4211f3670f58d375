use super::codes::ActionCode;

/// Static model type description.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelDescription {
    /// Physical radius; zero means shots and bodies pass through.
    pub radius: f32,
    /// Health of a fresh model of this type.
    pub break_limit: i32,
    /// Non-zero makes the model breakable and selects its destruction effect.
    pub blow_effect: u8,
    pub break_sfx: u16,
    /// Height of the destruction effect above the model centre, in 1/128 cell.
    pub bmpz: i32,
    pub action_code: ActionCode,
    pub z_min: f32,
    pub z_max: f32,
    pub frame_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDescription {
    pub action_code: ActionCode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterDescription {
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RocketDescription {
    /// Resolved within the firing tick instead of travelling.
    pub hitscan: bool,
    pub reflect: bool,
    pub fast: bool,
    /// Steers toward the nearest player.
    pub homing: bool,
    pub gravity_force: f32,
    /// 1, 3, 4: sparkles or bullet puff; 2: explosion.
    pub blow_effect: u8,
    pub power: i32,
    /// Sprite effect emitted along the flight path, if any.
    pub smoke_trail_effect: Option<u8>,
}

/// Descriptions shared by every level of a game.
///
/// Model ids in level data index [`GameResources::models`]; ids past the end
/// describe nothing and leave the model inert.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameResources {
    pub models: Vec<ModelDescription>,
    pub items: Vec<ItemDescription>,
    pub monsters: Vec<MonsterDescription>,
    pub rockets: Vec<RocketDescription>,
}

impl GameResources {
    #[inline]
    pub fn model(&self, model_id: u8) -> Option<&ModelDescription> {
        self.models.get(model_id as usize)
    }

    #[inline]
    pub fn item(&self, item_id: u8) -> Option<&ItemDescription> {
        self.items.get(item_id as usize)
    }

    #[inline]
    pub fn monster(&self, monster_id: u8) -> Option<&MonsterDescription> {
        self.monsters.get(monster_id as usize)
    }

    #[inline]
    pub fn rocket(&self, rocket_type: u8) -> Option<&RocketDescription> {
        self.rockets.get(rocket_type as usize)
    }
}
