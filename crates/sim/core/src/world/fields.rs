use glam::{Vec2, Vec3};

use crate::env::{CellRect, MAP_SIZE, cell_index};

/// Death zone state of one cell. Heights are in 1/64 cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeathCell {
    pub damage: u8,
    pub z_bottom: u8,
    pub z_top: u8,
}

impl DeathCell {
    /// Whether a body standing at `z` with the given height touches the band.
    pub fn overlaps(&self, z: f32, height: f32) -> bool {
        !(z > self.z_top as f32 / 64.0 || z + height < self.z_bottom as f32 / 64.0)
    }
}

/// Dense wind and death zone grids, toggled by procedure commands.
#[derive(Clone, Debug)]
pub struct Fields {
    wind: Vec<[i8; 2]>,
    death: Vec<DeathCell>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            wind: vec![[0; 2]; MAP_SIZE * MAP_SIZE],
            death: vec![DeathCell::default(); MAP_SIZE * MAP_SIZE],
        }
    }

    pub fn set_wind(&mut self, area: CellRect, direction: [i8; 2]) {
        for_each_cell(area, |cell| self.wind[cell] = direction);
    }

    pub fn clear_wind(&mut self, area: CellRect) {
        self.set_wind(area, [0, 0]);
    }

    pub fn set_death(&mut self, area: CellRect, damage: u8, z_bottom: i32, z_top: i32) {
        let band = DeathCell {
            damage,
            z_bottom: z_bottom.clamp(0, 255) as u8,
            z_top: z_top.clamp(0, 255) as u8,
        };
        for_each_cell(area, |cell| self.death[cell] = band);
    }

    /// Disarms the area but keeps its band.
    pub fn clear_death(&mut self, area: CellRect) {
        for_each_cell(area, |cell| self.death[cell].damage = 0);
    }

    pub fn wind_cell(&self, x: usize, y: usize) -> Vec2 {
        let [dx, dy] = self.wind[cell_index(x, y)];
        Vec2::new(dx as f32, dy as f32)
    }

    /// Bilinear blend of the four cells around `pos - 0.5`.
    ///
    /// Positions whose blend would read past the grid edge feel no wind.
    pub fn wind_at(&self, pos: Vec3) -> Vec2 {
        let base = pos.truncate() - Vec2::splat(0.5);
        if base.x < 0.0 || base.y < 0.0 {
            return Vec2::ZERO;
        }
        let (x, y) = (base.x as usize, base.y as usize);
        if x >= MAP_SIZE - 1 || y >= MAP_SIZE - 1 {
            return Vec2::ZERO;
        }
        let dx = base.x - x as f32;
        let dy = base.y - y as f32;

        self.wind_cell(x, y) * (1.0 - dx) * (1.0 - dy)
            + self.wind_cell(x, y + 1) * (1.0 - dx) * dy
            + self.wind_cell(x + 1, y) * dx * (1.0 - dy)
            + self.wind_cell(x + 1, y + 1) * dx * dy
    }

    pub fn death_at(&self, pos: Vec3) -> Option<DeathCell> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        (x < MAP_SIZE && y < MAP_SIZE).then(|| self.death[cell_index(x, y)])
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::new()
    }
}

fn for_each_cell(area: CellRect, mut f: impl FnMut(usize)) {
    let x_end = (area.max[0] as usize).min(MAP_SIZE - 1);
    let y_end = (area.max[1] as usize).min(MAP_SIZE - 1);
    for y in area.min[1] as usize..=y_end {
        for x in area.min[0] as usize..=x_end {
            f(cell_index(x, y));
        }
    }
}
