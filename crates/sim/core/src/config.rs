use std::time::Duration;

/// Gameplay constants and tunable parameters for one level simulation.
///
/// Lengths are in map cells (one cell is one unit), heights use the same unit
/// with the floor at `0.0` and the ceiling at [`SimConfig::walls_height`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Collision radius of a player.
    pub player_radius: f32,
    /// Vertical extent of a player used for ceiling clamps and death bands.
    pub player_height: f32,
    /// Reach used for link activation and item pickup.
    pub player_interact_radius: f32,
    /// A model top or bottom closer than this is stepped onto instead of pushing sideways.
    pub z_pull_distance: f32,
    pub walls_height: f32,
    /// Multiplier applied to a procedure's raw speed value.
    pub procedures_speed_scale: f32,
    pub animations_fps: f32,
    pub rockets_speed: f32,
    pub fast_rockets_speed: f32,
    /// Multiplier applied to a rocket type's gravity force.
    pub rockets_gravity_scale: f32,
    /// Rockets older than this are removed without a hit.
    pub max_rocket_lifetime: Duration,
    pub mines_activation_radius: f32,
    pub mines_preparation_time: Duration,
    pub max_mine_lifetime: Duration,
    pub death_ticks_per_second: f32,
    /// Scale applied to the wind vector of a cell when pushing monsters.
    pub wind_speed_factor: f32,
}

impl SimConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PLAYER_RADIUS: f32 = 60.0 / 256.0;
    pub const DEFAULT_PLAYER_HEIGHT: f32 = 0.9;
    pub const DEFAULT_PLAYER_INTERACT_RADIUS: f32 = 100.0 / 256.0;
    pub const DEFAULT_Z_PULL_DISTANCE: f32 = 0.25;
    pub const DEFAULT_WALLS_HEIGHT: f32 = 2.0;
    pub const DEFAULT_PROCEDURES_SPEED_SCALE: f32 = 0.1;
    pub const DEFAULT_ANIMATIONS_FPS: f32 = 20.0;
    pub const DEFAULT_ROCKETS_SPEED: f32 = 20.0;
    pub const DEFAULT_FAST_ROCKETS_SPEED: f32 = 40.0;
    pub const DEFAULT_ROCKETS_GRAVITY_SCALE: f32 = 0.1;
    pub const DEFAULT_MAX_ROCKET_LIFETIME: Duration = Duration::from_secs(16);
    pub const DEFAULT_MINES_ACTIVATION_RADIUS: f32 = 0.8;
    pub const DEFAULT_MINES_PREPARATION_TIME: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_MINE_LIFETIME: Duration = Duration::from_secs(30);
    pub const DEFAULT_DEATH_TICKS_PER_SECOND: f32 = 3.0;
    pub const DEFAULT_WIND_SPEED_FACTOR: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            player_radius: Self::DEFAULT_PLAYER_RADIUS,
            player_height: Self::DEFAULT_PLAYER_HEIGHT,
            player_interact_radius: Self::DEFAULT_PLAYER_INTERACT_RADIUS,
            z_pull_distance: Self::DEFAULT_Z_PULL_DISTANCE,
            walls_height: Self::DEFAULT_WALLS_HEIGHT,
            procedures_speed_scale: Self::DEFAULT_PROCEDURES_SPEED_SCALE,
            animations_fps: Self::DEFAULT_ANIMATIONS_FPS,
            rockets_speed: Self::DEFAULT_ROCKETS_SPEED,
            fast_rockets_speed: Self::DEFAULT_FAST_ROCKETS_SPEED,
            rockets_gravity_scale: Self::DEFAULT_ROCKETS_GRAVITY_SCALE,
            max_rocket_lifetime: Self::DEFAULT_MAX_ROCKET_LIFETIME,
            mines_activation_radius: Self::DEFAULT_MINES_ACTIVATION_RADIUS,
            mines_preparation_time: Self::DEFAULT_MINES_PREPARATION_TIME,
            max_mine_lifetime: Self::DEFAULT_MAX_MINE_LIFETIME,
            death_ticks_per_second: Self::DEFAULT_DEATH_TICKS_PER_SECOND,
            wind_speed_factor: Self::DEFAULT_WIND_SPEED_FACTOR,
        }
    }

    #[must_use]
    pub fn with_player_radius(mut self, player_radius: f32) -> Self {
        self.player_radius = player_radius;
        self
    }

    #[must_use]
    pub fn with_player_height(mut self, player_height: f32) -> Self {
        self.player_height = player_height;
        self
    }

    #[must_use]
    pub fn with_procedures_speed_scale(mut self, scale: f32) -> Self {
        self.procedures_speed_scale = scale;
        self
    }

    #[must_use]
    pub fn with_rockets_gravity_scale(mut self, scale: f32) -> Self {
        self.rockets_gravity_scale = scale;
        self
    }

    #[must_use]
    pub fn with_death_ticks_per_second(mut self, ticks: f32) -> Self {
        self.death_ticks_per_second = ticks;
        self
    }

    /// Speed of a rocket type given its `fast` flag.
    pub fn rocket_speed(&self, fast: bool) -> f32 {
        if fast {
            self.fast_rockets_speed
        } else {
            self.rockets_speed
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
