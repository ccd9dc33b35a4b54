//! Seat grid for a showtime's room.

use crate::types::{Money, SeatId, SeatKind, SeatSelection, Showtime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default price of a VIP seat when the showtime has none
pub const DEFAULT_VIP_PRICE: Money = Money::from_cents(1200);

/// Default price of a standard seat when the showtime has none
pub const DEFAULT_STANDARD_PRICE: Money = Money::from_cents(650);

/// Physical layout of a room
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    /// Row letters, front to back
    pub rows: &'static [char],
    /// Grid columns, aisles included
    pub columns: u32,
    /// 1-based columns that are aisles
    pub aisles: &'static [u32],
    /// Kind of every seat in the room
    pub kind: SeatKind,
}

/// 4 rows of three 2-seat blocks
pub const VIP_LAYOUT: RoomLayout = RoomLayout {
    rows: &['A', 'B', 'C', 'D'],
    columns: 8,
    aisles: &[3, 6],
    kind: SeatKind::Vip,
};

/// 8 rows of 2 + 8 + 2 seats
pub const STANDARD_LAYOUT: RoomLayout = RoomLayout {
    rows: &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'],
    columns: 14,
    aisles: &[3, 12],
    kind: SeatKind::Normal,
};

impl RoomLayout {
    /// Layout for a showtime's room
    #[must_use]
    pub fn for_showtime(showtime: &Showtime) -> Self {
        if showtime.is_vip() {
            VIP_LAYOUT
        } else {
            STANDARD_LAYOUT
        }
    }

    /// Seats per row, aisles excluded
    #[must_use]
    pub fn seats_per_row(&self) -> u32 {
        self.columns.saturating_sub(u32::try_from(self.aisles.len()).unwrap_or(u32::MAX))
    }
}

/// Price of one seat at a showtime
///
/// A missing or zero showtime price falls back to the room default.
#[must_use]
pub fn seat_price(showtime: &Showtime) -> Money {
    showtime
        .price
        .filter(|price| !price.is_zero())
        .unwrap_or(if showtime.is_vip() {
            DEFAULT_VIP_PRICE
        } else {
            DEFAULT_STANDARD_PRICE
        })
}

/// Whether a seat can be picked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Free
    Available,
    /// Sold to someone else
    Occupied,
    /// In this session's cart
    Selected,
}

/// One grid cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatCell {
    /// Walkway, not a seat
    Aisle,
    /// A seat and its status
    Seat {
        /// The seat as it would be added to the cart
        seat: SeatSelection,
        /// Current status
        status: SeatStatus,
    },
}

/// One row of the grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRow {
    /// Row letter
    pub label: String,
    /// Cells left to right
    pub cells: Vec<SeatCell>,
}

/// The whole grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMap {
    /// Rows front to back
    pub rows: Vec<SeatRow>,
}

impl SeatMap {
    /// Build the grid for `showtime`, marking occupied and selected seats
    ///
    /// Seat numbers skip aisles, so a standard row runs 1..=12.
    #[must_use]
    pub fn build(showtime: &Showtime, occupied: &BTreeSet<String>, selected: &[SeatSelection]) -> Self {
        let layout = RoomLayout::for_showtime(showtime);
        let price = seat_price(showtime);
        let selected: BTreeSet<&SeatId> = selected.iter().map(|s| &s.id).collect();

        let rows = layout
            .rows
            .iter()
            .map(|row| {
                let label = row.to_string();
                let mut number = 0;
                let cells = (1..=layout.columns)
                    .map(|column| {
                        if layout.aisles.contains(&column) {
                            return SeatCell::Aisle;
                        }
                        number += 1;
                        let seat = SeatSelection::new(label.clone(), number, layout.kind, price);
                        let status = if occupied.contains(&seat.label()) {
                            SeatStatus::Occupied
                        } else if selected.contains(&seat.id) {
                            SeatStatus::Selected
                        } else {
                            SeatStatus::Available
                        };
                        SeatCell::Seat { seat, status }
                    })
                    .collect();
                SeatRow { label, cells }
            })
            .collect();

        Self { rows }
    }

    /// Find a seat by label
    #[must_use]
    pub fn seat(&self, label: &str) -> Option<(&SeatSelection, SeatStatus)> {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .find_map(|cell| match cell {
                SeatCell::Seat { seat, status } if seat.label() == label => Some((seat, *status)),
                _ => None,
            })
    }

    /// Number of seats with `status`
    #[must_use]
    pub fn count(&self, status: SeatStatus) -> usize {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| matches!(cell, SeatCell::Seat { status: s, .. } if *s == status))
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn showtime(room_type: &str, price: Option<Money>) -> Showtime {
        Showtime {
            room_type: room_type.into(),
            price,
            ..Showtime::default()
        }
    }

    #[test]
    fn standard_room_grid() {
        let map = SeatMap::build(&showtime("2D", None), &BTreeSet::new(), &[]);
        assert_eq!(map.rows.len(), 8);
        assert_eq!(map.rows[0].cells.len(), 14);
        assert_eq!(map.rows[0].cells[2], SeatCell::Aisle);
        assert_eq!(map.rows[0].cells[11], SeatCell::Aisle);
        assert_eq!(map.count(SeatStatus::Available), 8 * 12);
        let (seat, _) = map.seat("H12").unwrap();
        assert_eq!(seat.price, DEFAULT_STANDARD_PRICE);
        assert!(map.seat("A13").is_none());
    }

    #[test]
    fn vip_room_grid() {
        let map = SeatMap::build(&showtime("VIP", None), &BTreeSet::new(), &[]);
        assert_eq!(map.rows.len(), 4);
        assert_eq!(map.count(SeatStatus::Available), 4 * 6);
        let (seat, _) = map.seat("D6").unwrap();
        assert_eq!(seat.kind, SeatKind::Vip);
        assert_eq!(seat.price, DEFAULT_VIP_PRICE);
        assert_eq!(VIP_LAYOUT.seats_per_row(), 6);
    }

    #[test]
    fn showtime_price_overrides_default() {
        let map = SeatMap::build(
            &showtime("2D", Some(Money::from_cents(900))),
            &BTreeSet::new(),
            &[],
        );
        assert_eq!(map.seat("A1").unwrap().0.price.cents(), 900);
    }

    #[test]
    fn zero_showtime_price_falls_back_to_default() {
        assert_eq!(seat_price(&showtime("2D", Some(Money::ZERO))), DEFAULT_STANDARD_PRICE);
        assert_eq!(seat_price(&showtime("Sala VIP", Some(Money::ZERO))), DEFAULT_VIP_PRICE);
    }

    #[test]
    fn statuses_reflect_occupancy_and_cart() {
        let occupied: BTreeSet<String> = ["A1".to_string()].into();
        let picked = vec![SeatSelection::new("A", 2, SeatKind::Normal, DEFAULT_STANDARD_PRICE)];
        let map = SeatMap::build(&showtime("2D", None), &occupied, &picked);
        assert_eq!(map.seat("A1").unwrap().1, SeatStatus::Occupied);
        assert_eq!(map.seat("A2").unwrap().1, SeatStatus::Selected);
        assert_eq!(map.seat("A3").unwrap().1, SeatStatus::Available);
    }
}
