use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::spatial::GridPos;

pub const DAYS_PER_YEAR: u64 = 365;

/// Seasonal modifier at or below which regeneration slows to the harsh rate.
const HARSH_SEASON_MODIFIER: i32 = -10;
const REGEN_RATE: f64 = 0.1;
const HARSH_REGEN_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn of_day(day_of_year: u64) -> Self {
        match day_of_year {
            0..=90 => Season::Winter,
            91..=181 => Season::Spring,
            182..=272 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

/// Temperature offset for a day of the year: coldest at the turn of the
/// year, warmest mid-year, linear in between with a step every six days.
pub fn season_modifier(day_of_year: u64) -> i32 {
    let d = (day_of_year % DAYS_PER_YEAR) as i32;
    if d < 91 {
        -15 + d / 6
    } else if d < 182 {
        (d - 91) / 6
    } else if d < 273 {
        15 - (d - 182) / 6
    } else {
        -((d - 273) / 6)
    }
}

/// Fixed-size grid of cells plus the calendar.
pub struct World {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    day: u64,
}

impl World {
    pub fn generate<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Self {
        Self::from_fn(width, height, |pos| Cell::generate(pos, &mut *rng))
    }

    /// Builds a grid cell by cell in row-major order.
    pub fn from_fn(width: u32, height: u32, mut make: impl FnMut(GridPos) -> Cell) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(make(GridPos::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
            day: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn day_of_year(&self) -> u64 {
        self.day % DAYS_PER_YEAR
    }

    pub fn year(&self) -> u64 {
        self.day / DAYS_PER_YEAR + 1
    }

    pub fn season(&self) -> Season {
        Season::of_day(self.day_of_year())
    }

    pub fn season_modifier(&self) -> i32 {
        season_modifier(self.day_of_year())
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as u32, pos.y as u32);
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cell(GridPos::new(x, y))
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Surrounding cells clipped to the grid, dx outer and dy inner.
    pub fn get_neighbors(&self, x: i32, y: i32) -> Vec<&Cell> {
        GridPos::new(x, y)
            .surrounding()
            .filter_map(|pos| self.cell(pos))
            .collect()
    }

    pub fn get_passable_neighbors(&self, x: i32, y: i32) -> Vec<&Cell> {
        self.get_neighbors(x, y)
            .into_iter()
            .filter(|cell| cell.is_passable())
            .collect()
    }

    pub fn update_climate(&mut self) {
        let modifier = self.season_modifier();
        for cell in &mut self.cells {
            cell.update_climate(modifier);
        }
    }

    pub fn update_resources(&mut self) {
        let rate = if self.season_modifier() > HARSH_SEASON_MODIFIER {
            REGEN_RATE
        } else {
            HARSH_REGEN_RATE
        };
        for cell in &mut self.cells {
            cell.regenerate_food(rate);
        }
    }

    pub fn advance_day(&mut self) {
        self.day += 1;
    }

    pub fn cells_owned_by<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells.iter().filter(move |cell| cell.is_owned_by(name))
    }

    pub fn unowned_passable_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_claimable())
    }
}
