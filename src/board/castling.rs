// Copyright 2023 Tobin Edwards
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

use super::material::{Color, Pair};
use super::position::between;
use super::square::{File, Mask, Rank, Square};

use File::*;

/// King-side (`oo`) and queen-side (`ooo`) castling rights for one color.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    color: Color,
    oo: bool,
    ooo: bool,
}

impl CastlingRights {
    pub fn new(color: Color, oo: bool, ooo: bool) -> Self {
        Self { color, oo, ooo }
    }
    pub fn none(color: Color) -> Self {
        Self::new(color, false, false)
    }
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    #[inline]
    pub fn oo(&self) -> bool {
        self.oo
    }
    #[inline]
    pub fn ooo(&self) -> bool {
        self.ooo
    }
    #[inline]
    pub fn rank(&self) -> Rank {
        Rank::back_rank(self.color)
    }
    pub fn clear(&mut self) {
        self.oo = false;
        self.ooo = false;
    }
    pub fn clear_oo(&mut self) {
        self.oo = false;
    }
    pub fn clear_ooo(&mut self) {
        self.ooo = false;
    }

    /// Drops whichever rights depend on a piece standing on `square`. Called
    /// with both the origin and the destination of every move, so a right
    /// is lost when the king or rook moves away or the rook is captured.
    pub fn update(&mut self, square: Square) {
        if square == self.king_src() {
            self.clear();
        }
        if square == self.oo_rook_src() {
            self.clear_oo();
        }
        if square == self.ooo_rook_src() {
            self.clear_ooo();
        }
    }

    #[inline]
    pub fn king_src(&self) -> Square {
        Square::new(FileE, self.rank())
    }
    #[inline]
    pub fn oo_rook_src(&self) -> Square {
        Square::new(FileH, self.rank())
    }
    #[inline]
    pub fn oo_king_dest(&self) -> Square {
        Square::new(FileG, self.rank())
    }
    #[inline]
    pub fn oo_rook_dest(&self) -> Square {
        Square::new(FileF, self.rank())
    }
    #[inline]
    pub fn ooo_rook_src(&self) -> Square {
        Square::new(FileA, self.rank())
    }
    #[inline]
    pub fn ooo_king_dest(&self) -> Square {
        Square::new(FileC, self.rank())
    }
    #[inline]
    pub fn ooo_rook_dest(&self) -> Square {
        Square::new(FileD, self.rank())
    }

    /// Squares that must be empty for a short castle.
    pub fn oo_blocking_lane(&self) -> Mask {
        between(self.king_src(), self.oo_rook_src())
    }
    /// Squares the king crosses or lands on during a short castle.
    pub fn oo_attacking_lane(&self) -> Mask {
        let king_dest = self.oo_king_dest();
        between(self.king_src(), king_dest) | king_dest
    }
    pub fn ooo_blocking_lane(&self) -> Mask {
        between(self.ooo_rook_src(), self.king_src())
    }
    pub fn ooo_attacking_lane(&self) -> Mask {
        let king_dest = self.ooo_king_dest();
        between(king_dest, self.king_src()) | king_dest
    }
}

impl Default for Pair<CastlingRights> {
    fn default() -> Self {
        Pair::new(
            CastlingRights::new(Color::White, true, true),
            CastlingRights::new(Color::Black, true, true),
        )
    }
}

/// Renders the FEN castling field (`KQkq`, `-`, ...).
pub(super) fn castling_to_fen(castling: &Pair<CastlingRights>) -> String {
    let mut result = String::new();
    let (white, black) = (castling.white(), castling.black());
    for (allowed, c) in [
        (white.oo(), 'K'),
        (white.ooo(), 'Q'),
        (black.oo(), 'k'),
        (black.ooo(), 'q'),
    ] {
        if allowed {
            result.push(c);
        }
    }
    if result.is_empty() {
        result.push('-');
    }
    result
}

/// Parses the FEN castling field. Letters must be a subset of `KQkq` in that
/// order, each at most once.
pub(super) fn castling_from_fen(field: &str) -> Option<Pair<CastlingRights>> {
    let mut castling = Pair::new(
        CastlingRights::none(Color::White),
        CastlingRights::none(Color::Black),
    );
    if field == "-" {
        return Some(castling);
    }
    let mut last = None;
    for c in field.chars() {
        let order = "KQkq".find(c)?;
        if last.is_some_and(|prev| prev >= order) {
            return None;
        }
        last = Some(order);
        match c {
            'K' => castling.white_mut().oo = true,
            'Q' => castling.white_mut().ooo = true,
            'k' => castling.black_mut().oo = true,
            _ => castling.black_mut().ooo = true,
        }
    }
    last.map(|_| castling)
}
