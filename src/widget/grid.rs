//! Fixed capacity, row/column addressed storage.
//!
//! Indexes are 0 based, positions are 1 based:
//!
//! ```text
//!            column 1   column 2   column 3
//!   row 1  [    0    ,     1    ,     2    ]
//!   row 2  [    3    ,     4    ,     5    ]
//! ```
use crate::event_bus::EventBus;
use serde::{Deserialize, Serialize};
use std::iter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Position { row, column }
    }
}

/// Either way of addressing a slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Index(usize),
    Position(Position),
}

impl From<usize> for Slot {
    fn from(index: usize) -> Self {
        Slot::Index(index)
    }
}

impl From<Position> for Slot {
    fn from(position: Position) -> Self {
        Slot::Position(position)
    }
}

/// Grid notifications. Items travel with the event while it is dispatched
/// and land in the grid (or go back to the caller) right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent<T> {
    /// `item` takes slot `index`, pushing out `replaced`
    Add {
        index: usize,
        last_index: usize,
        item: T,
        replaced: Option<T>,
    },
    OutOfBounds {
        attempted: Slot,
        last_index: usize,
        item: T,
    },
    /// A resize pushed the last `moved` entries of `overflow` out of the
    /// slots. `overflow` is the whole buffer.
    Overflow { moved: usize, overflow: Vec<T> },
}

impl<T> GridEvent<T> {
    pub fn name(&self) -> &'static str {
        match self {
            GridEvent::Add { .. } => "add",
            GridEvent::OutOfBounds { .. } => "outOfBounds",
            GridEvent::Overflow { .. } => "overflow",
        }
    }

    /// Items displaced by this event.
    pub fn moved_items(&self) -> &[T] {
        match self {
            GridEvent::Overflow { moved, overflow } => &overflow[overflow.len().saturating_sub(*moved)..],
            GridEvent::Add { replaced, .. } => replaced.as_slice(),
            GridEvent::OutOfBounds { .. } => &[],
        }
    }
}

/// What happened to an item handed to `Grid::add`.
#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome<T> {
    Added { index: usize, replaced: Option<T> },
    /// nothing changed, the item comes back to the caller
    OutOfBounds(T),
}

pub struct Grid<T> {
    dimensions: (usize, usize),
    slots: Vec<Option<T>>,
    overflow: Vec<T>,
    events: EventBus<GridEvent<T>>,
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Grid::new(1, 4)
    }
}

impl<T> Grid<T> {
    pub fn new(rows: usize, columns: usize) -> Self {
        let mut grid = Grid {
            dimensions: (0, 0),
            slots: Vec::new(),
            overflow: Vec::new(),
            events: EventBus::new(),
        };
        grid.set_dimensions(rows, columns);
        grid
    }

    pub fn events(&self) -> &EventBus<GridEvent<T>> {
        &self.events
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn last_index(&self) -> usize {
        self.capacity().saturating_sub(1)
    }

    pub fn overflow(&self) -> &[T] {
        &self.overflow
    }

    pub fn take_overflow(&mut self) -> Vec<T> {
        std::mem::take(&mut self.overflow)
    }

    /// Resize the grid. Existing items are packed to the front in their
    /// current order; whatever no longer fits moves to the overflow buffer.
    /// Rows and columns below 1 are raised to 1.
    pub fn set_dimensions(&mut self, rows: usize, columns: usize) -> &mut Self {
        if rows == 0 || columns == 0 {
            log::warn!("grid dimensions {}x{} raised to at least 1x1", rows, columns);
        }
        let (rows, columns) = (rows.max(1), columns.max(1));
        let capacity = rows.saturating_mul(columns);

        let mut kept: Vec<T> = self.slots.drain(..).flatten().collect();
        let moved = if kept.len() > capacity {
            kept.split_off(capacity)
        } else {
            Vec::new()
        };

        self.dimensions = (rows, columns);
        self.slots = kept
            .into_iter()
            .map(Some)
            .chain(iter::repeat_with(|| None))
            .take(capacity)
            .collect();

        if !moved.is_empty() {
            let mut overflow = std::mem::take(&mut self.overflow);
            let count = moved.len();
            overflow.extend(moved);
            match self.announce(GridEvent::Overflow {
                moved: count,
                overflow,
            }) {
                GridEvent::Overflow { overflow, .. } => self.overflow = overflow,
                _ => unreachable!("announce hands back the event it was given"),
            }
        }
        self
    }

    /// Put `item` in `slot`, or in the lowest empty slot when none is given.
    pub fn add(&mut self, item: T, slot: Option<Slot>) -> AddOutcome<T> {
        let last_index = self.last_index();
        let (attempted, index) = match slot {
            Some(slot) => (slot, self.resolve(slot)),
            None => {
                // a full grid resolves one past the end, which is out of bounds
                let free = self
                    .slots
                    .iter()
                    .position(Option::is_none)
                    .unwrap_or(self.capacity());
                (Slot::Index(free), Some(free))
            }
        };

        match index.filter(|&index| index < self.capacity()) {
            Some(index) => {
                let replaced = self.slots[index].take();
                match self.announce(GridEvent::Add {
                    index,
                    last_index,
                    item,
                    replaced,
                }) {
                    GridEvent::Add { item, replaced, .. } => {
                        self.slots[index] = Some(item);
                        AddOutcome::Added { index, replaced }
                    }
                    _ => unreachable!("announce hands back the event it was given"),
                }
            }
            None => match self.announce(GridEvent::OutOfBounds {
                attempted,
                last_index,
                item,
            }) {
                GridEvent::OutOfBounds { item, .. } => AddOutcome::OutOfBounds(item),
                _ => unreachable!("announce hands back the event it was given"),
            },
        }
    }

    fn announce(&self, event: GridEvent<T>) -> GridEvent<T> {
        self.events.emit(event.name(), &event);
        event
    }

    pub fn get(&self, slot: impl Into<Slot>) -> Option<&T> {
        let index = self.resolve(slot.into())?;
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: impl Into<Slot>) -> Option<&mut T> {
        let index = self.resolve(slot.into())?;
        self.slots.get_mut(index)?.as_mut()
    }

    /// Occupied slots with their index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    fn resolve(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::Index(index) => Some(index),
            Slot::Position(position) => self.index_of(position),
        }
    }

    /// 0 based index → 1 based position.
    pub fn position_of(&self, index: usize) -> Position {
        let columns = self.dimensions.1;
        let row = index / columns + 1;
        Position {
            row,
            column: index % columns + 1,
        }
    }

    /// 1 based position → 0 based index. `None` for a zero row or column, a
    /// column past the last one, or a row too large to address.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        let columns = self.dimensions.1;
        if position.row == 0 || position.column == 0 || position.column > columns {
            return None;
        }
        (position.row - 1)
            .checked_mul(columns)?
            .checked_add(position.column - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::listener;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(grid: &Grid<&'static str>) -> Rc<RefCell<Vec<GridEvent<&'static str>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        grid.events().on(
            "all",
            listener(move |_: &str, event: &GridEvent<&'static str>| sink.borrow_mut().push(event.clone())),
        );
        seen
    }

    #[test]
    fn capacity_always_matches_dimensions() {
        let mut grid: Grid<u8> = Grid::default();
        assert_eq!(grid.capacity(), 4);
        for (rows, columns) in [(1, 1), (3, 7), (5, 14), (2, 2), (10, 1)] {
            grid.set_dimensions(rows, columns);
            assert_eq!(grid.capacity(), rows * columns);
            assert_eq!(grid.dimensions(), (rows, columns));
        }
    }

    #[test]
    fn position_mapping_is_a_bijection() {
        let grid: Grid<u8> = Grid::new(5, 14);
        assert_eq!(grid.position_of(63), Position::new(5, 8));
        assert_eq!(grid.index_of(Position::new(5, 3)), Some(58));
        for index in 0..grid.capacity() {
            assert_eq!(grid.index_of(grid.position_of(index)), Some(index));
        }
        assert_eq!(grid.position_of(13), Position::new(1, 14));
        assert_eq!(grid.position_of(14), Position::new(2, 1));
    }

    #[test]
    fn invalid_positions_do_not_resolve() {
        let grid: Grid<u8> = Grid::new(2, 3);
        assert_eq!(grid.index_of(Position::new(0, 1)), None);
        assert_eq!(grid.index_of(Position::new(1, 0)), None);
        assert_eq!(grid.index_of(Position::new(1, 4)), None);
    }

    #[test]
    fn huge_rows_are_out_of_bounds_instead_of_overflowing() {
        let mut grid: Grid<u8> = Grid::new(2, 3);
        assert_eq!(grid.index_of(Position::new(usize::MAX, 2)), None);
        assert_eq!(grid.get(Position::new(usize::MAX, 2)), None);
        assert_eq!(grid.get_mut(Position::new(usize::MAX / 2, 3)), None);

        let outcome = grid.add(7, Some(Position::new(usize::MAX, 1).into()));
        assert_eq!(outcome, AddOutcome::OutOfBounds(7));
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn add_without_index_fills_lowest_empty_slot() {
        let mut grid = Grid::new(1, 4);
        grid.add("x", Some(Slot::Index(0)));
        grid.add("y", Some(Slot::Index(2)));

        assert_eq!(grid.add("z", None), AddOutcome::Added { index: 1, replaced: None });
        assert_eq!(grid.add("w", None), AddOutcome::Added { index: 3, replaced: None });
        assert_eq!(grid.get(1), Some(&"z"));
        assert_eq!(grid.get(Position::new(1, 4)), Some(&"w"));
    }

    #[test]
    fn add_over_an_occupied_slot_returns_the_replaced_item() {
        let mut grid = Grid::new(2, 2);
        let seen = record(&grid);
        grid.add("old", Some(Position::new(2, 1).into()));

        let outcome = grid.add("new", Some(Slot::Index(2)));

        assert_eq!(outcome, AddOutcome::Added { index: 2, replaced: Some("old") });
        assert_eq!(
            seen.borrow().last(),
            Some(&GridEvent::Add {
                index: 2,
                last_index: 3,
                item: "new",
                replaced: Some("old"),
            })
        );
        assert_eq!(seen.borrow().last().unwrap().moved_items(), &["old"]);
        assert_eq!(grid.get(2), Some(&"new"));
    }

    #[test]
    fn add_past_the_last_index_is_rejected() {
        let mut grid = Grid::new(1, 2);
        let seen = record(&grid);

        let outcome = grid.add("far", Some(Slot::Index(5)));

        assert_eq!(outcome, AddOutcome::OutOfBounds("far"));
        assert_eq!(grid.iter().count(), 0);
        assert_eq!(
            *seen.borrow(),
            vec![GridEvent::OutOfBounds {
                attempted: Slot::Index(5),
                last_index: 1,
                item: "far",
            }]
        );
    }

    #[test]
    fn full_grid_rejects_add_without_index() {
        let mut grid = Grid::new(1, 2);
        grid.add("a", None);
        grid.add("b", None);
        let seen = record(&grid);

        assert_eq!(grid.add("c", None), AddOutcome::OutOfBounds("c"));
        assert_eq!(
            *seen.borrow(),
            vec![GridEvent::OutOfBounds {
                attempted: Slot::Index(2),
                last_index: 1,
                item: "c",
            }]
        );
    }

    #[test]
    fn shrinking_keeps_items_in_order() {
        let mut grid = Grid::new(1, 4);
        grid.add("a", Some(Slot::Index(1)));
        grid.add("b", Some(Slot::Index(3)));

        grid.set_dimensions(1, 3);

        assert_eq!(grid.capacity(), 3);
        let items: Vec<_> = grid.iter().map(|(_, item)| *item).collect();
        assert_eq!(items, vec!["a", "b"]);
        assert_eq!(grid.get(0), Some(&"a"));
        assert!(grid.overflow().is_empty());
    }

    #[test]
    fn shrinking_below_item_count_moves_the_rest_to_overflow() {
        let mut grid = Grid::new(2, 2);
        for item in ["a", "b", "c", "d"] {
            grid.add(item, None);
        }
        let seen = record(&grid);

        grid.set_dimensions(1, 1);

        assert_eq!(grid.get(0), Some(&"a"));
        assert_eq!(grid.overflow(), &["b", "c", "d"]);
        assert_eq!(
            *seen.borrow(),
            vec![GridEvent::Overflow {
                moved: 3,
                overflow: vec!["b", "c", "d"],
            }]
        );

        grid.set_dimensions(1, 2);
        grid.add("e", None);
        grid.set_dimensions(1, 1);
        let last = seen.borrow().last().cloned().unwrap();
        assert_eq!(last.moved_items(), &["e"]);
        assert_eq!(last.name(), "overflow");
        assert_eq!(grid.take_overflow(), vec!["b", "c", "d", "e"]);
        assert!(grid.overflow().is_empty());
    }

    #[test]
    fn zero_dimensions_are_raised_to_one() {
        let grid: Grid<u8> = Grid::new(0, 3);
        assert_eq!(grid.dimensions(), (1, 3));
        assert_eq!(grid.capacity(), 3);
    }
}
