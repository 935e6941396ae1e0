/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use super::BOARD_SIZE;

/// Represents a single square on an 8x8 chess board, addressed by `(row, col)`.
///
/// Row `0` is rank 8 (Black's back rank) and row `7` is rank 1 (White's back rank).
/// Column `0` is the A-file and column `7` is the H-file.
///
/// Both coordinates are always within `0..8`; a [`Square`] cannot be constructed otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSquare", into = "RawSquare")]
pub struct Square {
    row: u8,
    col: u8,
}

/// Wire form of a [`Square`], validated on the way in.
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawSquare {
    row: i64,
    col: i64,
}

impl TryFrom<RawSquare> for Square {
    type Error = anyhow::Error;
    fn try_from(raw: RawSquare) -> Result<Self> {
        if !(0..BOARD_SIZE as i64).contains(&raw.row) || !(0..BOARD_SIZE as i64).contains(&raw.col)
        {
            bail!("Square ({}, {}) is off the board", raw.row, raw.col);
        }

        Ok(Self::new(raw.row as u8, raw.col as u8))
    }
}

impl From<Square> for RawSquare {
    fn from(square: Square) -> Self {
        Self {
            row: square.row as i64,
            col: square.col as i64,
        }
    }
}

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a new [`Square`] from a row and a column.
    ///
    /// # Panics
    /// If either coordinate is 8 or greater. Use [`Square::try_new`] for untrusted input.
    ///
    /// # Example
    /// ```
    /// # use gambit_types::Square;
    /// let e4 = Square::new(4, 4);
    /// assert_eq!(e4.to_uci(), "e4");
    /// ```
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row < BOARD_SIZE && col < BOARD_SIZE, "square out of bounds");
        Self { row, col }
    }

    /// Creates a new [`Square`] if `(row, col)` lies on the board.
    ///
    /// # Example
    /// ```
    /// # use gambit_types::Square;
    /// assert!(Square::try_new(0, 7).is_some());
    /// assert!(Square::try_new(-1, 3).is_none());
    /// assert!(Square::try_new(3, 8).is_none());
    /// ```
    #[inline(always)]
    pub const fn try_new(row: i8, col: i8) -> Option<Self> {
        if Self::is_valid(row, col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Bounds check: `true` if `0 <= row < 8` and `0 <= col < 8`.
    #[inline(always)]
    pub const fn is_valid(row: i8, col: i8) -> bool {
        row >= 0 && row < BOARD_SIZE as i8 && col >= 0 && col < BOARD_SIZE as i8
    }

    /// Creates a [`Square`] from a row-major index in `0..64`.
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Valid Square indices are 0..64. Got {index}");
        }
        Ok(Self::new(index as u8 / BOARD_SIZE, index as u8 % BOARD_SIZE))
    }

    /// Row-major index of this square in `0..64`, starting at A8.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        (self.row * BOARD_SIZE + self.col) as usize
    }

    /// The row of this square. Row `0` is rank 8.
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// The column of this square. Column `0` is the A-file.
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Returns the square `d_row` rows and `d_col` columns away, if it is on the board.
    ///
    /// # Example
    /// ```
    /// # use gambit_types::Square;
    /// let a1 = Square::new(7, 0);
    /// assert_eq!(a1.offset(-1, 1), Some(Square::new(6, 1)));
    /// assert_eq!(a1.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, d_row: i8, d_col: i8) -> Option<Self> {
        Self::try_new(self.row as i8 + d_row, self.col as i8 + d_col)
    }

    /// Absolute number of columns between `self` and `other`.
    #[inline(always)]
    pub const fn col_distance(&self, other: Self) -> u8 {
        self.col.abs_diff(other.col)
    }

    /// Absolute number of rows between `self` and `other`.
    #[inline(always)]
    pub const fn row_distance(&self, other: Self) -> u8 {
        self.row.abs_diff(other.row)
    }

    /// Iterates over all 64 squares in row-major order, starting at A8.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..Self::COUNT).map(|i| Self::new(i as u8 / BOARD_SIZE, i as u8 % BOARD_SIZE))
    }

    /// File letter of this square, `'a'..='h'`.
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// Rank digit of this square, `'1'..='8'`.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'8' - self.row) as char
    }

    /// Parses a [`Square`] from algebraic notation, such as `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use gambit_types::Square;
    /// assert_eq!(Square::from_uci("a8").unwrap(), Square::new(0, 0));
    /// assert_eq!(Square::from_uci("e2").unwrap(), Square::new(6, 4));
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid square string {square:?}: must be exactly a file and a rank");
        };

        if !('a'..='h').contains(&file) {
            bail!("Invalid file {file:?} in {square:?}");
        }
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or(anyhow!("Invalid rank {rank:?} in {square:?}"))?;

        Ok(Self::new(BOARD_SIZE - rank as u8, file as u8 - b'a'))
    }

    /// Converts this [`Square`] to algebraic notation, such as `"e4"`.
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_round_trips_every_square() {
        for square in Square::iter() {
            assert_eq!(Square::from_uci(&square.to_uci()).unwrap(), square);
        }
    }

    #[test]
    fn test_index_is_row_major() {
        assert_eq!(Square::new(0, 0).index(), 0);
        assert_eq!(Square::new(0, 7).index(), 7);
        assert_eq!(Square::new(7, 7).index(), 63);
        for (i, square) in Square::iter().enumerate() {
            assert_eq!(square.index(), i);
            assert_eq!(Square::from_index(i).unwrap(), square);
        }
        assert!(Square::from_index(64).is_err());
    }

    #[test]
    fn test_offsets_stay_on_board() {
        let corners = [(0, 0), (0, 7), (7, 0), (7, 7)];
        for (row, col) in corners {
            let square = Square::new(row, col);
            let inside = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]
                .into_iter()
                .filter_map(|(dr, dc)| square.offset(dr, dc))
                .count();
            assert_eq!(inside, 3, "corner {square} should have three neighbours");
        }
    }

    #[test]
    fn test_serde_shape_and_validation() {
        let json = serde_json::to_string(&Square::new(6, 4)).unwrap();
        assert_eq!(json, r#"{"row":6,"col":4}"#);

        let parsed: Square = serde_json::from_str(r#"{"row":1,"col":2}"#).unwrap();
        assert_eq!(parsed, Square::new(1, 2));

        assert!(serde_json::from_str::<Square>(r#"{"row":8,"col":0}"#).is_err());
        assert!(serde_json::from_str::<Square>(r#"{"row":-1,"col":0}"#).is_err());
    }

    #[test]
    fn test_distances() {
        let e1 = Square::from_uci("e1").unwrap();
        let g1 = Square::from_uci("g1").unwrap();
        assert_eq!(e1.col_distance(g1), 2);
        assert_eq!(e1.row_distance(g1), 0);
    }
}
