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

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;

use super::castling::CastlingRights;
use super::material::{Color, Material, Pair, Piece};
use super::moves::{pawn_attacks, LegalMove};
use super::square::{Direction, File, Mask, Rank, Square};
use super::Turn;

use Color::*;
use Piece::*;
use Rank::*;

/// Half-move (ply) counter. Even values are White's turn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveId(u32);

impl MoveId {
    pub const START: MoveId = MoveId(0);
    /// Largest full-move number. Play continues past it with the number
    /// held in place.
    pub const MAX_MOVE_NUMBER: u32 = u16::MAX as u32;

    #[inline]
    pub fn new(move_count: u32, turn: Color) -> Self {
        let move_count = move_count.min(Self::MAX_MOVE_NUMBER - 1);
        match turn {
            White => Self(move_count * 2),
            Black => Self(move_count * 2 + 1),
        }
    }
    #[inline]
    pub fn turn(&self) -> Color {
        const TURNS: [Color; 2] = [White, Black];
        let index = self.value() % 2;
        TURNS[index]
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0 as usize
    }
    #[inline]
    pub fn move_count(&self) -> usize {
        self.value() / 2
    }
    /// The FEN full-move number, starting at 1.
    #[inline]
    pub fn move_number(&self) -> usize {
        1 + self.move_count()
    }
    #[inline]
    pub fn next(self) -> Self {
        let next = self.0 + 1;
        if next / 2 >= Self::MAX_MOVE_NUMBER {
            // same turn order, one full move back
            Self(next - 2)
        } else {
            Self(next)
        }
    }
}

impl Default for MoveId {
    #[inline]
    fn default() -> Self {
        MoveId::START
    }
}

/// What one side has left to deliver mate with, ignoring the king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatingMaterial {
    Sufficient,
    OneKnight,
    /// A single bishop, `true` when it stands on a light square.
    OneBishop(bool),
    LoneKing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squares([Option<Material>; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Masks {
    pieces: Pair<Mask>,
    kings: Mask,
    queens: Mask,
    rooks: Mask,
    bishops: Mask,
    knights: Mask,
    pawns: Mask,
}

impl From<&Squares> for Masks {
    fn from(value: &Squares) -> Self {
        let mut masks = Masks::empty();
        for square in Square::iter() {
            if let Some(material) = value[square] {
                masks.pieces[material.color()] |= square;
                *masks.piece_mut(material.piece()) |= square;
            }
        }
        masks
    }
}

impl Masks {
    fn empty() -> Self {
        Self {
            pieces: Pair::new(Mask::empty(), Mask::empty()),
            kings: Mask::empty(),
            queens: Mask::empty(),
            rooks: Mask::empty(),
            bishops: Mask::empty(),
            knights: Mask::empty(),
            pawns: Mask::empty(),
        }
    }

    fn piece_mut(&mut self, piece: Piece) -> &mut Mask {
        match piece {
            King => &mut self.kings,
            Queen => &mut self.queens,
            Rook => &mut self.rooks,
            Bishop => &mut self.bishops,
            Knight => &mut self.knights,
            Pawn => &mut self.pawns,
        }
    }
}

/// Signature used to detect repeated positions. Move counters are left out,
/// and the en passant square only counts when it can actually be captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    turn: Color,
    en_passant: Option<Square>,
    castling: Pair<CastlingRights>,
    masks: Masks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    squares: Squares,
    masks: Masks,
    castling: Pair<CastlingRights>,
    en_passant: Option<Square>,
    next_move_id: MoveId,
    halfmove_clock: u16,
}

impl Default for Position {
    /// The standard starting position.
    fn default() -> Self {
        let mut position = Self::empty();
        position.castling = Pair::default();
        const BACK_RANK: [Piece; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, piece) in File::iter().zip(BACK_RANK) {
            position.init_file(file, piece);
        }
        position
    }
}

impl Position {
    /// A board without pieces or castling rights, White to move.
    pub(super) fn empty() -> Self {
        Self {
            squares: Squares::empty(),
            masks: Masks::empty(),
            castling: Pair::new(CastlingRights::none(White), CastlingRights::none(Black)),
            en_passant: None,
            next_move_id: MoveId::START,
            halfmove_clock: 0,
        }
    }

    fn init_file(&mut self, file: File, piece: Piece) {
        const PAWN_RANKS: Pair<Rank> = Pair::new(Rank2, Rank7);
        for color in Color::iter() {
            let square = Square::new(file, PAWN_RANKS[color]);
            let _ = self.place(square, Material::new(color, Pawn));
            let square = Square::new(file, Rank::back_rank(color));
            let _ = self.place(square, Material::new(color, piece));
        }
    }

    pub fn key(&self) -> PositionKey {
        let en_passant = self
            .en_passant
            .filter(|&target| self.can_capture_en_passant(target));
        PositionKey {
            turn: self.turn(),
            en_passant,
            castling: self.castling,
            masks: self.masks,
        }
    }

    /// Whether a pawn of the side to move attacks `target`.
    fn can_capture_en_passant(&self, target: Square) -> bool {
        !(pawn_attacks(!self.turn(), target) & self.our_pawns()).is_empty()
    }

    pub fn move_number(&self) -> usize {
        self.next_move_id.move_number()
    }

    pub fn next_move_id(&self) -> MoveId {
        self.next_move_id
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> usize {
        self.halfmove_clock as usize
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn castling(&self, color: Color) -> &CastlingRights {
        &self.castling[color]
    }

    pub(super) fn castling_pair(&self) -> &Pair<CastlingRights> {
        &self.castling
    }

    pub fn mating_material(&self, side: Color) -> MatingMaterial {
        let pieces = self.masks.pieces[side] & !self.masks.kings;
        let heavy = self.masks.pawns | self.masks.rooks | self.masks.queens;
        if !(pieces & heavy).is_empty() || pieces.len() > 1 {
            return MatingMaterial::Sufficient;
        }
        match pieces.single() {
            Some(square) if self.masks.knights.contains(square) => MatingMaterial::OneKnight,
            Some(square) => MatingMaterial::OneBishop(square.is_light()),
            None => MatingMaterial::LoneKing,
        }
    }

    /// Returns the position reached by playing `mv`. The move must have been
    /// generated for this position.
    pub fn apply(&self, mv: LegalMove) -> Position {
        let mut next = self.clone();
        next.apply_move(mv);
        next
    }

    pub(super) fn apply_move(&mut self, mv: LegalMove) -> MoveId {
        let turn = self.turn();
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        self.en_passant = None;
        let mut skipped = None;
        match mv {
            LegalMove::Standard(from, to) => {
                if let Some(material) = self.remove(from) {
                    let captured = self.place(to, material);
                    if captured.is_some() || material.piece().is_pawn() {
                        self.halfmove_clock = 0;
                    }
                }
            }
            LegalMove::EnPassant(from, to) => {
                if let Some(material) = self.remove(from) {
                    let _ = self.remove(Square::new(to.file(), from.rank()));
                    self.place(to, material);
                }
                self.halfmove_clock = 0;
            }
            LegalMove::DoubleAdvance(from, to) => {
                if let Some(material) = self.remove(from) {
                    self.place(to, material);
                }
                skipped = between(from, to).single();
                self.halfmove_clock = 0;
            }
            LegalMove::Promoting(from, to, promotion) => {
                if let Some(mut material) = self.remove(from) {
                    material.set_piece(promotion.into());
                    self.place(to, material);
                }
                self.halfmove_clock = 0;
            }
            LegalMove::ShortCastle(color) => {
                let rights = self.castling[color];
                self.relocate(rights.king_src(), rights.oo_king_dest());
                self.relocate(rights.oo_rook_src(), rights.oo_rook_dest());
            }
            LegalMove::LongCastle(color) => {
                let rights = self.castling[color];
                self.relocate(rights.king_src(), rights.ooo_king_dest());
                self.relocate(rights.ooo_rook_src(), rights.ooo_rook_dest());
            }
        };
        for square in [mv.from(), mv.to()] {
            self.castling[turn].update(square);
            self.castling[!turn].update(square);
        }
        let move_id = self.next_move_id;
        self.next_move_id = move_id.next();
        // only recorded when the opponent has a pawn to take on it
        self.en_passant = skipped.filter(|&target| self.can_capture_en_passant(target));
        move_id
    }

    fn relocate(&mut self, from: Square, to: Square) {
        if let Some(material) = self.remove(from) {
            self.place(to, material);
        }
    }

    pub(super) fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        let replaced = self.remove(square);
        self.squares[square] = Some(material);
        self.masks.pieces[material.color()] |= square;
        *self.masks.piece_mut(material.piece()) |= square;
        replaced
    }

    fn remove(&mut self, square: Square) -> Option<Material> {
        let material = self.squares[square].take()?;
        let mask = !square.to_mask();
        self.masks.pieces[material.color()] &= mask;
        *self.masks.piece_mut(material.piece()) &= mask;
        Some(material)
    }

    pub(super) fn set_castling(&mut self, castling: Pair<CastlingRights>) {
        self.castling = castling;
    }

    pub(super) fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    pub(super) fn set_counters(&mut self, next_move_id: MoveId, halfmove_clock: u16) {
        self.next_move_id = next_move_id;
        self.halfmove_clock = halfmove_clock;
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        self.next_move_id.turn()
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Pos for Position {}

/// Occupancy queries shared by everything that wraps a position.
pub trait Pos: Turn + AsRef<Position> {
    #[inline]
    fn contents(&self, square: Square) -> &Option<Material> {
        let pos: &Position = self.as_ref();
        &pos.squares[square]
    }
    #[inline]
    fn kings(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.kings
    }
    #[inline]
    fn queens(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.queens
    }
    #[inline]
    fn rooks(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.rooks
    }
    #[inline]
    fn bishops(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.bishops
    }
    #[inline]
    fn knights(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.knights
    }
    #[inline]
    fn pawns(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.pawns
    }
    #[inline]
    fn occupied_by(&self, color: Color) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.pieces[color]
    }
    #[inline]
    fn occupied(&self) -> Mask {
        self.occupied_by(White) | self.occupied_by(Black)
    }
    #[inline]
    fn ours(&self) -> Mask {
        self.occupied_by(self.turn())
    }
    #[inline]
    fn theirs(&self) -> Mask {
        self.occupied_by(!self.turn())
    }
    #[inline]
    fn our_pawns(&self) -> Mask {
        self.ours() & self.pawns()
    }
    #[inline]
    fn horizontals(&self) -> Mask {
        self.rooks() | self.queens()
    }
    #[inline]
    fn diagonals(&self) -> Mask {
        self.bishops() | self.queens()
    }
    /// The king of `color`, if the board has exactly one.
    #[inline]
    fn king(&self, color: Color) -> Option<Square> {
        (self.occupied_by(color) & self.kings()).single()
    }
}

#[inline]
pub(super) fn shielded(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_SHIELDED[index]
}

#[inline]
pub(super) fn between(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_BETWEEN[index]
}

static SQUARES_BETWEEN: Lazy<Vec<Mask>> = Lazy::new(|| {
    // squares strictly between `start` and `end` when they share a line
    fn squares_between(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next.filter(|&square| square != end) {
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            if start != end && ALL_LINES[start].contains(end) {
                array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
            }
        }
    }
    array
});

static SQUARES_SHIELDED: Lazy<Vec<Mask>> = Lazy::new(|| {
    // squares beyond `end` (exclusive) on the ray from `start` through `end`
    fn squares_shielded(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = end + step;
            while let Some(square) = next {
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            if start != end && ALL_LINES[start].contains(end) {
                array[start.to_index() * 64 + end.to_index()] = squares_shielded(start, end);
            }
        }
    }
    array
});

pub(super) static HORIZONTALS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = square.file().to_mask() | square.rank().to_mask();
    }
    array
});

pub(super) static DIAGONALS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        let mut mask = square.to_mask();
        Direction::diagonals().for_each(|dir| {
            let mut next = square + dir;
            while let Some(sq) = next {
                mask |= sq;
                next = sq + dir;
            }
        });
        array[square] = mask;
    }
    array
});

static ALL_LINES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = HORIZONTALS[square] | DIAGONALS[square];
    }
    array
});

#[cfg(test)]
impl Position {
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        self.squares[square] = value;
        self.masks = (&self.squares).into();
        self
    }
    pub fn set_en_passant(mut self, value: Option<Square>) -> Self {
        self.en_passant = value;
        self
    }
    pub fn clear_white_oo(mut self) -> Self {
        self.castling[White].clear_oo();
        self
    }
    pub fn set_next_move_id(mut self, value: MoveId) -> Self {
        self.next_move_id = value;
        self
    }
    pub fn set_halfmove_clock(mut self, value: u16) -> Self {
        self.halfmove_clock = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Promotion;
    use Square::*;

    #[test]
    fn test_diagonals() {
        let mask = DIAGONALS[C5];
        assert!(mask.contains(C5));
        assert!(mask.contains(A3));
        assert!(mask.contains(A7));
        assert!(mask.contains(F8));
        assert!(mask.contains(G1));
        assert!(!mask.contains(C6));
        assert!(!mask.contains(D5));
    }
    #[test]
    fn test_horizontals() {
        let mask = HORIZONTALS[G2];
        assert!(mask.contains(G1));
        assert!(mask.contains(G8));
        assert!(mask.contains(A2));
        assert!(!mask.contains(H1));
        assert!(!mask.contains(F3));
    }
    #[test]
    fn test_between() {
        assert_eq!(between(A3, E3), Mask::from_squares([B3, C3, D3]));
        assert_eq!(between(C8, C2).len(), 5);
        assert_eq!(between(A1, D4), Mask::from_squares([B2, C3]));
        assert_eq!(between(H3, F5), Mask::from_squares([G4]));
        assert!(between(G4, F5).is_empty());
        assert!(between(A1, H5).is_empty());
    }
    #[test]
    fn test_shielded() {
        let mask = shielded(A8, A7);
        assert_eq!(mask.len(), 6);
        assert!(mask.contains(A6));
        assert!(mask.contains(A1));
        assert!(shielded(A7, A8).is_empty());
        assert_eq!(shielded(C3, E5), Mask::from_squares([F6, G7, H8]));
    }
    #[test]
    fn test_start_position() {
        let position = Position::default();
        assert_eq!(position[E1], Some(Material::WK));
        assert_eq!(position[D8], Some(Material::BQ));
        assert_eq!(position[B7], Some(Material::BP));
        assert_eq!(position[E4], None);
        assert_eq!(position.turn(), White);
        assert_eq!(position.move_number(), 1);
        assert_eq!(position.occupied().len(), 32);
        assert_eq!(position.king(Black), Some(E8));
    }
    #[test]
    fn test_apply_leaves_original_untouched() {
        let start = Position::default();
        let next = start.apply(LegalMove::DoubleAdvance(E2, E4));
        assert_eq!(start, Position::default());
        assert_eq!(next[E4], Some(Material::WP));
        assert_eq!(next[E2], None);
        assert_eq!(next.en_passant(), None);
        assert_eq!(next.turn(), Black);
        assert_eq!(next.move_number(), 1);
        let next = next.apply(LegalMove::Standard(G8, F6));
        assert_eq!(next.move_number(), 2);
        assert_eq!(next.en_passant(), None);
        assert_eq!(next.halfmove_clock(), 1);
    }
    #[test]
    fn test_rook_capture_clears_castling_right() {
        let position = Position::default()
            .set_contents(G7, Some(Material::WN))
            .set_contents(H7, None);
        let next = position.apply(LegalMove::Standard(G7, H8));
        assert!(!next.castling(Black).oo());
        assert!(next.castling(Black).ooo());
        assert!(next.castling(White).oo());
        assert_eq!(next.halfmove_clock(), 0);
    }
    #[test]
    fn test_promotion_capture_clears_castling_right() {
        let position = Position::default()
            .set_contents(B7, Some(Material::WP))
            .set_contents(A8, Some(Material::BR));
        let next = position.apply(LegalMove::Promoting(B7, A8, Promotion::Knight));
        assert_eq!(next[A8], Some(Material::WN));
        assert!(!next.castling(Black).ooo());
    }
    #[test]
    fn test_castling_moves_both_pieces() {
        let position = Position::default()
            .set_contents(F1, None)
            .set_contents(G1, None);
        let next = position.apply(LegalMove::ShortCastle(White));
        assert_eq!(next[G1], Some(Material::WK));
        assert_eq!(next[F1], Some(Material::WR));
        assert_eq!(next[H1], None);
        assert!(!next.castling(White).oo());
        assert!(!next.castling(White).ooo());
        assert_eq!(next.halfmove_clock(), 1);
    }
    #[test]
    fn test_double_advance_records_capturable_target() {
        let position = Position::default()
            .set_contents(D4, Some(Material::BP))
            .set_contents(D7, None)
            .set_contents(H4, Some(Material::BP))
            .set_contents(H7, None);
        let next = position.apply(LegalMove::DoubleAdvance(E2, E4));
        assert_eq!(next.en_passant(), Some(E3));
        let next = position.apply(LegalMove::DoubleAdvance(A2, A4));
        assert_eq!(next.en_passant(), None);
    }
    #[test]
    fn test_key_ignores_unusable_en_passant() {
        let after_e4 = Position::default()
            .apply(LegalMove::DoubleAdvance(E2, E4))
            .set_en_passant(Some(E3));
        let without_target = after_e4.clone().set_en_passant(None);
        assert_eq!(after_e4.key(), without_target.key());
        let capturable = Position::default()
            .set_next_move_id(MoveId::new(2, White))
            .set_contents(D5, Some(Material::WP))
            .set_contents(E5, Some(Material::BP))
            .set_contents(E7, None);
        let with_target = capturable.clone().set_en_passant(Some(E6));
        assert_ne!(capturable.key(), with_target.key());
    }
    #[test]
    fn test_key_ignores_counters() {
        let start = Position::default();
        let later = start
            .clone()
            .set_halfmove_clock(8)
            .set_next_move_id(MoveId::new(4, White));
        assert_eq!(start.key(), later.key());
    }
    #[test]
    fn test_mating_material() {
        let position = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(C1, Some(Material::WB))
            .set_contents(B8, Some(Material::BN));
        assert_eq!(position.mating_material(White), MatingMaterial::OneBishop(false));
        assert_eq!(position.mating_material(Black), MatingMaterial::OneKnight);
        let position = position.set_contents(A2, Some(Material::WP));
        assert_eq!(position.mating_material(White), MatingMaterial::Sufficient);
        let position = position.set_contents(B8, None);
        assert_eq!(position.mating_material(Black), MatingMaterial::LoneKing);
    }
}
