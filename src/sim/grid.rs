//! Level tile grid
//!
//! Static tile classification queried by characters. Only the POW cells ever
//! change, and only through the world when the block runs out of uses.

use serde::{Deserialize, Serialize};

use crate::consts::{FLOOR_ROW, GRID_HEIGHT, GRID_WIDTH, TILE_SIZE};

/// Special tiles with an area effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Special {
    Pow,
}

/// Tile classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    Special(Special),
}

impl Tile {
    pub fn is_empty(&self) -> bool {
        *self == Tile::Empty
    }
}

/// Outcome of hitting the POW block once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowHit {
    pub uses_left: u32,
    pub depleted: bool,
}

/// Fixed-size tile grid (column major, `tiles[x][y]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    tiles: Vec<[Tile; GRID_HEIGHT]>,
    pow_uses_left: u32,
}

impl Grid {
    /// Empty grid (only the implicit floor row is solid)
    pub fn empty(pow_uses: u32) -> Self {
        Self {
            tiles: vec![[Tile::Empty; GRID_HEIGHT]; GRID_WIDTH],
            pow_uses_left: pow_uses,
        }
    }

    /// The arcade layout: three tiers of ledges, a bottom floor and the POW block
    pub fn arcade(pow_uses: u32) -> Self {
        let mut grid = Self::empty(pow_uses);
        let w = GRID_WIDTH as i32;
        // Top ledges
        for i in 0..14 {
            grid.set(i, 8, Tile::Solid);
            grid.set(w - 1 - i, 8, Tile::Solid);
        }
        // Middle: centre island and short side stubs
        for i in 0..16 {
            grid.set(8 + i, 14, Tile::Solid);
        }
        for i in 0..4 {
            grid.set(i, 15, Tile::Solid);
            grid.set(w - 1 - i, 15, Tile::Solid);
        }
        // Lower ledges
        for i in 0..12 {
            grid.set(i, 20, Tile::Solid);
            grid.set(w - 1 - i, 20, Tile::Solid);
        }
        // POW block
        grid.set(15, 22, Tile::Special(Special::Pow));
        grid.set(16, 22, Tile::Special(Special::Pow));
        // Floor
        for i in 0..w {
            grid.set(i, 26, Tile::Solid);
            grid.set(i, 27, Tile::Solid);
        }
        grid
    }

    /// Build a grid from text rows: `#` solid, `P` POW, anything else empty.
    /// Rows past the text stay empty; columns past 32 are ignored.
    pub fn from_rows(rows: &[&str], pow_uses: u32) -> Self {
        let mut grid = Self::empty(pow_uses);
        for (y, row) in rows.iter().enumerate().take(GRID_HEIGHT) {
            for (x, ch) in row.chars().enumerate().take(GRID_WIDTH) {
                let tile = match ch {
                    '#' => Tile::Solid,
                    'P' => Tile::Special(Special::Pow),
                    _ => Tile::Empty,
                };
                grid.set(x as i32, y as i32, tile);
            }
        }
        grid
    }

    /// Set a tile; out-of-range cells are ignored
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if (0..GRID_WIDTH as i32).contains(&x) && (0..GRID_HEIGHT as i32).contains(&y) {
            self.tiles[x as usize][y as usize] = tile;
        }
    }

    /// Tile lookup. Columns wrap around the screen, rows outside the grid are
    /// empty, and the floor row is always solid.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if y == FLOOR_ROW {
            return Tile::Solid;
        }
        if !(0..GRID_HEIGHT as i32).contains(&y) {
            return Tile::Empty;
        }
        let x = x.rem_euclid(GRID_WIDTH as i32) as usize;
        self.tiles[x][y as usize]
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        !self.tile_at(x, y).is_empty()
    }

    pub fn is_pow(&self, x: i32, y: i32) -> bool {
        matches!(self.tile_at(x, y), Tile::Special(Special::Pow))
    }

    /// Whether the feet at this pixel rest on a tile
    pub fn is_on_platform(&self, pixel_x: i32, pixel_y: i32) -> bool {
        self.is_solid(cell(pixel_x), cell(pixel_y))
    }

    /// Whether a tile sits right above a head whose feet are at this pixel
    pub fn is_under_platform(&self, pixel_x: i32, pixel_y: i32, head: i32) -> bool {
        let y = cell(pixel_y - head);
        y > 0 && self.is_solid(cell(pixel_x), y)
    }

    pub fn pow_uses_left(&self) -> u32 {
        self.pow_uses_left
    }

    /// Consume one POW use; clears every POW cell when none are left
    pub fn hit_pow(&mut self) -> PowHit {
        self.pow_uses_left = self.pow_uses_left.saturating_sub(1);
        let depleted = self.pow_uses_left == 0;
        if depleted {
            for column in self.tiles.iter_mut() {
                for tile in column.iter_mut() {
                    if matches!(tile, Tile::Special(Special::Pow)) {
                        *tile = Tile::Empty;
                    }
                }
            }
        }
        PowHit {
            uses_left: self.pow_uses_left,
            depleted,
        }
    }

    /// Refill the POW block (new game)
    pub fn restore_pow(&mut self, pow_uses: u32) {
        self.pow_uses_left = pow_uses;
    }
}

/// Pixel coordinate to grid cell (floor division)
#[inline]
pub fn cell(pixel: i32) -> i32 {
    pixel.div_euclid(TILE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_row_always_solid() {
        let grid = Grid::empty(3);
        assert_eq!(grid.tile_at(5, FLOOR_ROW), Tile::Solid);
        assert_eq!(grid.tile_at(5, FLOOR_ROW - 1), Tile::Empty);
    }

    #[test]
    fn test_out_of_range_columns_wrap() {
        let mut grid = Grid::empty(3);
        grid.set(0, 10, Tile::Solid);
        assert!(grid.is_solid(32, 10));
        assert!(grid.is_solid(-32, 10));
        assert!(!grid.is_solid(-1, 10));
        grid.set(31, 10, Tile::Solid);
        assert!(grid.is_solid(-1, 10));
    }

    #[test]
    fn test_out_of_range_rows_are_empty() {
        let grid = Grid::arcade(3);
        assert!(grid.tile_at(4, -3).is_empty());
        assert!(grid.tile_at(4, 40).is_empty());
    }

    #[test]
    fn test_cell_floors_negative_pixels() {
        assert_eq!(cell(0), 0);
        assert_eq!(cell(7), 0);
        assert_eq!(cell(8), 1);
        assert_eq!(cell(-1), -1);
    }

    #[test]
    fn test_arcade_layout() {
        let grid = Grid::arcade(3);
        assert!(grid.is_on_platform(4, 208));
        assert!(grid.is_pow(15, 22));
        assert!(grid.is_under_platform(124, 200, 20));
        assert!(!grid.is_under_platform(124, 150, 20));
    }

    #[test]
    fn test_pow_depletes() {
        let mut grid = Grid::arcade(2);
        assert_eq!(grid.hit_pow(), PowHit { uses_left: 1, depleted: false });
        assert!(grid.is_pow(16, 22));
        assert_eq!(grid.hit_pow(), PowHit { uses_left: 0, depleted: true });
        assert!(!grid.is_pow(16, 22));
        assert!(grid.tile_at(16, 22).is_empty());
    }

    #[test]
    fn test_from_rows() {
        let grid = Grid::from_rows(&["", "##..P"], 1);
        assert!(grid.is_solid(0, 1));
        assert!(!grid.is_solid(2, 1));
        assert!(grid.is_pow(4, 1));
    }
}
