// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut, Not};
use strum_macros::Display;
use strum_macros::EnumIter;

/// A piece of a specific color.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Material {
    color: Color,
    piece: Piece,
}

impl Material {
    pub const WK: Self = Self::white(King);
    pub const WQ: Self = Self::white(Queen);
    pub const WR: Self = Self::white(Rook);
    pub const WB: Self = Self::white(Bishop);
    pub const WN: Self = Self::white(Knight);
    pub const WP: Self = Self::white(Pawn);

    pub const BK: Self = Self::black(King);
    pub const BQ: Self = Self::black(Queen);
    pub const BR: Self = Self::black(Rook);
    pub const BB: Self = Self::black(Bishop);
    pub const BN: Self = Self::black(Knight);
    pub const BP: Self = Self::black(Pawn);

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self { color, piece }
    }

    #[inline]
    pub const fn white(piece: Piece) -> Self {
        Self::new(White, piece)
    }

    #[inline]
    pub const fn black(piece: Piece) -> Self {
        Self::new(Black, piece)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn set_piece(&mut self, piece: Piece) {
        self.piece = piece
    }

    /// FEN letter: upper case for White, lower case for Black.
    pub fn to_char(&self) -> char {
        let c = self.piece.to_char();
        match self.color {
            White => c.to_ascii_uppercase(),
            Black => c,
        }
    }

    pub fn try_from_char(c: char) -> Option<Self> {
        let piece = Piece::try_from_char(c.to_ascii_lowercase())?;
        let color = if c.is_ascii_uppercase() { White } else { Black };
        Some(Self::new(color, piece))
    }
}

use Color::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn to_index(&self) -> usize {
        *self as usize
    }

    /// +1 for White and -1 for Black.
    pub const fn sign(&self) -> i32 {
        match self {
            White => 1,
            Black => -1,
        }
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
}

impl<T> Pair<T> {
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn white_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
    pub fn black_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T: Hash> Hash for Pair<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.white().hash(state);
        self.black().hash(state);
    }
}

impl<T> Index<Color> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

impl<T> IndexMut<Color> for Pair<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        match index {
            White => self.white_mut(),
            Black => self.black_mut(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
use Piece::{Bishop, King, Knight, Pawn, Queen, Rook};

impl Piece {
    pub const fn from_index(index: usize) -> Self {
        debug_assert!(index < 6);
        const PIECE_MAP: [Piece; 6] = [Pawn, Knight, Bishop, Rook, Queen, King];
        PIECE_MAP[index]
    }

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    /// Material value in centipawns. The king has no exchange value.
    pub const fn value(&self) -> i32 {
        match self {
            Pawn => 100,
            Knight => 320,
            Bishop => 330,
            Rook => 500,
            Queen => 900,
            King => 0,
        }
    }

    pub const fn to_char(&self) -> char {
        match self {
            Pawn => 'p',
            Knight => 'n',
            Bishop => 'b',
            Rook => 'r',
            Queen => 'q',
            King => 'k',
        }
    }

    pub const fn try_from_char(c: char) -> Option<Self> {
        match c {
            'p' => Some(Pawn),
            'n' => Some(Knight),
            'b' => Some(Bishop),
            'r' => Some(Rook),
            'q' => Some(Queen),
            'k' => Some(King),
            _ => None,
        }
    }

    pub fn is_pawn(&self) -> bool {
        matches!(*self, Pawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_letters() {
        assert_eq!(Material::WK.to_char(), 'K');
        assert_eq!(Material::BN.to_char(), 'n');
        assert_eq!(Material::try_from_char('Q'), Some(Material::WQ));
        assert_eq!(Material::try_from_char('p'), Some(Material::BP));
        assert_eq!(Material::try_from_char('x'), None);
        assert_eq!(Material::try_from_char('1'), None);
    }
    #[test]
    fn test_color_wire_names() {
        assert_eq!(White.to_string(), "white");
        assert_eq!(serde_json::to_string(&Black).unwrap(), "\"black\"");
        assert_eq!(!White, Black);
    }
    #[test]
    fn test_pair_indexing() {
        let mut pair = Pair::new(1, 2);
        assert_eq!(pair[White], 1);
        pair[Black] += 5;
        assert_eq!(*pair.black(), 7);
    }
}
