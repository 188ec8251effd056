use maze_chase_core::{BonusSymbol, ItemKind, Tile, COLUMNS, ROWS};

use crate::maze::{self, BONUS_TILE};

/// Consumable items laid out over the grid plus the transient bonus.
#[derive(Clone, Debug)]
pub(crate) struct Items {
    cells: Vec<Option<ItemKind>>,
    remaining: u32,
    bonus: Option<BonusSymbol>,
}

impl Items {
    /// Every dot and energiser of the layout, no bonus.
    pub(crate) fn full() -> Self {
        let cells: Vec<Option<ItemKind>> = maze::tiles().map(maze::item_at).collect();
        let remaining = cells.iter().flatten().count();
        Self {
            cells,
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            bonus: None,
        }
    }

    fn index(tile: Tile) -> Option<usize> {
        if !(0..COLUMNS).contains(&tile.column()) || !(0..ROWS).contains(&tile.row()) {
            return None;
        }
        usize::try_from(tile.row() * COLUMNS + tile.column()).ok()
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn bonus(&self) -> Option<BonusSymbol> {
        self.bonus
    }

    /// Item on the tile, the bonus included.
    pub(crate) fn at(&self, tile: Tile) -> Option<ItemKind> {
        if tile == BONUS_TILE && self.bonus.is_some() {
            return Some(ItemKind::Bonus);
        }
        Self::index(tile).and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Removes the counted item on the tile, if any.
    pub(crate) fn take(&mut self, tile: Tile) -> Option<ItemKind> {
        let index = Self::index(tile)?;
        let kind = self.cells.get_mut(index)?.take()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(kind)
    }

    pub(crate) fn spawn_bonus(&mut self, symbol: BonusSymbol) {
        self.bonus = Some(symbol);
    }

    /// Removes the bonus if it sits on `tile`.
    pub(crate) fn take_bonus(&mut self, tile: Tile) -> Option<BonusSymbol> {
        if tile != BONUS_TILE {
            return None;
        }
        self.bonus.take()
    }

    pub(crate) fn clear_bonus(&mut self) -> bool {
        self.bonus.take().is_some()
    }

    #[cfg(test)]
    pub(crate) fn leave_only(&mut self, tile: Tile) {
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if Some(index) != Self::index(tile) {
                *cell = None;
            }
        }
        self.remaining = u32::try_from(self.cells.iter().flatten().count()).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taking_an_item_empties_the_tile_once() {
        let mut items = Items::full();
        let tile = Tile::new(1, 6);
        assert_eq!(items.remaining(), 244);
        assert_eq!(items.at(tile), Some(ItemKind::Energiser));

        assert_eq!(items.take(tile), Some(ItemKind::Energiser));
        assert_eq!(items.take(tile), None);
        assert_eq!(items.at(tile), None);
        assert_eq!(items.remaining(), 243);
    }

    #[test]
    fn bonus_only_sits_on_its_tile() {
        let mut items = Items::full();
        items.spawn_bonus(BonusSymbol::Cherry);
        assert_eq!(items.at(BONUS_TILE), Some(ItemKind::Bonus));
        assert_eq!(items.take_bonus(Tile::new(13, 26)), None);
        assert_eq!(items.take_bonus(BONUS_TILE), Some(BonusSymbol::Cherry));
        assert!(!items.clear_bonus());
        assert_eq!(items.remaining(), 244);
    }

    #[test]
    fn off_grid_tiles_hold_nothing() {
        let mut items = Items::full();
        assert_eq!(items.take(Tile::new(-1, 17)), None);
        assert_eq!(items.at(Tile::new(COLUMNS, 17)), None);
    }
}
