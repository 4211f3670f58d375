//! Numeric identifiers shared with level data and clients.

/// Behaviour class of a model or item descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCode(pub u8);

impl ActionCode {
    pub const NONE: Self = Self(0);
    pub const SWITCH: Self = Self(10);
    pub const RED_KEY: Self = Self(11);
    pub const GREEN_KEY: Self = Self(12);
    pub const BLUE_KEY: Self = Self(13);
    pub const ITEM_LIFE: Self = Self(20);
    pub const ITEM_BIG_LIFE: Self = Self(21);
    pub const WEAPON_FIRST: Self = Self(101);
    pub const WEAPON_LAST: Self = Self(108);
    pub const AMMO_FIRST: Self = Self(110);
    pub const AMMO_LAST: Self = Self(117);

    pub const fn is_switch(self) -> bool {
        self.0 == Self::SWITCH.0
    }

    pub const fn is_key(self) -> bool {
        self.0 >= Self::RED_KEY.0 && self.0 <= Self::BLUE_KEY.0
    }

    /// Zero-based weapon slot for weapon pickups.
    pub const fn weapon_index(self) -> Option<u8> {
        if self.0 >= Self::WEAPON_FIRST.0 && self.0 <= Self::WEAPON_LAST.0 {
            Some(self.0 - Self::WEAPON_FIRST.0)
        } else {
            None
        }
    }

    pub const fn is_life(self) -> bool {
        self.0 == Self::ITEM_LIFE.0 || self.0 == Self::ITEM_BIG_LIFE.0
    }

    pub const fn is_ammo(self) -> bool {
        self.0 >= Self::AMMO_FIRST.0 && self.0 <= Self::AMMO_LAST.0
    }
}

/// Identifier of a sound known to the client sound engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundId(pub u16);

impl SoundId {
    pub const ITEM_UP: Self = Self(1);
    pub const HEALTH: Self = Self(2);
    pub const GET_KEY: Self = Self(3);
    pub const MINE_ON: Self = Self(4);
    pub const FIRST_WEAPON_PICKUP: Self = Self(10);
    pub const FIRST_ROCKET_HIT: Self = Self(20);
    pub const MINE_EXPLOSION: Self = Self(40);

    pub const fn offset(self, by: u16) -> Self {
        Self(self.0 + by)
    }
}

/// Identifier of a particle effect spawned on clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleEffect(pub u8);

impl ParticleEffect {
    pub const SPARKLES: Self = Self(0);
    pub const BLOOD: Self = Self(1);
    pub const BULLET: Self = Self(2);
    pub const EXPLOSION: Self = Self(3);
    /// Start of the per-model destruction effect range.
    pub const FIRST_BLOW_EFFECT: Self = Self(16);

    pub const fn blow_effect(blow_effect: u8) -> Self {
        Self(Self::FIRST_BLOW_EFFECT.0 + blow_effect % 100)
    }
}

/// Reserved floor and ceiling texture ids.
pub struct FloorTexture;

impl FloorTexture {
    /// No surface; shots pass through.
    pub const EMPTY: u8 = 255;
    /// Open sky; shots pass through.
    pub const SKY: u8 = 254;

    pub const fn is_solid(texture_id: u8) -> bool {
        texture_id != Self::EMPTY && texture_id != Self::SKY
    }
}
