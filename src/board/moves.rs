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
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::castling::CastlingRights;
use super::material::{Color, Piece};
use super::position::{shielded, Pos, Position, DIAGONALS, HORIZONTALS};
use super::square::{Direction, Mask, Offset, Rank, Square};
use super::Turn;

use Color::*;
use Piece::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move {0}")]
    IllegalMove(Move),
    #[error("invalid move text {0:?}")]
    InvalidText(String),
}
use MoveError::*;

/// Occupancy and attack queries plus legal move generation for anything
/// that wraps a position.
pub trait LegalMoves: Pos {
    /// Every legal move for the side to move, sorted by origin, destination
    /// and promotion piece.
    fn legal_moves(&self) -> Vec<LegalMove> {
        let pos: &Position = self.as_ref();
        let mut moves = legal_moves_in(pos, pos.ours());
        moves.sort_by_key(|mv| mv.sort_key());
        moves
    }

    fn legal_moves_from(&self, from: Square) -> Vec<LegalMove> {
        let pos: &Position = self.as_ref();
        let mut moves = legal_moves_in(pos, pos.ours() & from.to_mask());
        moves.sort_by_key(|mv| mv.sort_key());
        moves
    }

    /// Destination squares of the legal moves starting on `from`.
    fn move_destinations(&self, from: Square) -> Mask {
        Mask::from_squares(self.legal_moves_from(from).iter().map(|mv| mv.to()))
    }

    fn has_legal_moves(&self) -> bool {
        let pos: &Position = self.as_ref();
        pos.ours()
            .iter()
            .any(|from| !legal_moves_in(pos, from.to_mask()).is_empty())
    }

    fn is_check(&self) -> bool {
        let pos: &Position = self.as_ref();
        let turn = pos.turn();
        pos.king(turn)
            .is_some_and(|king| !attackers(pos, king, !turn).is_empty())
    }

    /// Whether any piece of color `by` attacks `square`.
    fn is_attacked(&self, square: Square, by: Color) -> bool {
        let pos: &Position = self.as_ref();
        !attackers(pos, square, by).is_empty()
    }

    /// Resolves a requested move against the legal moves of the position.
    /// A pawn reaching the last rank without a promotion piece promotes to
    /// a queen, and castling may be given as the king moving onto its rook.
    fn validate_move(&self, mv: Move) -> Result<LegalMove, MoveError> {
        self.legal_moves_from(mv.from)
            .into_iter()
            .find(|legal| legal.matches(&mv))
            .ok_or(IllegalMove(mv))
    }
}

impl LegalMoves for Position {}

impl Position {
    /// Validates `mv` and returns the resulting position.
    pub fn make_move(&self, mv: Move) -> Result<Position, MoveError> {
        let mv = self.validate_move(mv)?;
        Ok(self.apply(mv))
    }
}

/// Counts the leaf nodes of the legal move tree `depth` plies deep.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    let moves = pos.legal_moves();
    match depth {
        0 => 1,
        1 => moves.len() as u64,
        _ => moves
            .into_iter()
            .map(|mv| perft(&pos.apply(mv), depth - 1))
            .sum(),
    }
}

fn legal_moves_in(pos: &Position, from_mask: Mask) -> Vec<LegalMove> {
    let turn = pos.turn();
    let mut moves = Vec::new();
    pseudo_legal_moves(pos, from_mask, &mut moves);
    moves.retain(|&mv| {
        let next = pos.apply(mv);
        match next.king(turn) {
            Some(king) => attackers(&next, king, !turn).is_empty(),
            None => true,
        }
    });
    moves
}

fn pseudo_legal_moves(pos: &Position, from_mask: Mask, moves: &mut Vec<LegalMove>) {
    let occupied = pos.occupied();
    let not_ours = !pos.ours();
    for from in (pos.ours() & from_mask).iter() {
        let Some(material) = pos.contents(from) else {
            continue;
        };
        let destinations = match material.piece() {
            King => {
                castle_moves(pos, from, moves);
                KING_MOVES[from] & not_ours
            }
            Queen => slide(from, QUEEN_MOVES[from], occupied) & not_ours,
            Rook => slide(from, ROOK_MOVES[from], occupied) & not_ours,
            Bishop => slide(from, BISHOP_MOVES[from], occupied) & not_ours,
            Knight => KNIGHT_MOVES[from] & not_ours,
            Pawn => {
                pawn_moves(pos, from, moves);
                continue;
            }
        };
        for to in destinations.iter() {
            moves.push(LegalMove::Standard(from, to));
        }
    }
}

fn pawn_moves(pos: &Position, from: Square, moves: &mut Vec<LegalMove>) {
    let turn = pos.turn();
    let forward = pawn_forward(turn);
    let promotes = |to: Square| to.rank() == Rank::promotion_rank(turn);
    let push = |to: Square, moves: &mut Vec<LegalMove>| {
        if promotes(to) {
            for promotion in Promotion::iter() {
                moves.push(LegalMove::Promoting(from, to, promotion));
            }
        } else {
            moves.push(LegalMove::Standard(from, to));
        }
    };

    if let Some(one) = (from + forward).filter(|&sq| pos.contents(sq).is_none()) {
        push(one, moves);
        let start_rank = Rank::back_rank(turn) + forward.y;
        if Some(from.rank()) == start_rank {
            if let Some(two) = (one + forward).filter(|&sq| pos.contents(sq).is_none()) {
                moves.push(LegalMove::DoubleAdvance(from, two));
            }
        }
    }
    let attacks = pawn_attacks(turn, from);
    for to in (attacks & pos.theirs()).iter() {
        push(to, moves);
    }
    if let Some(target) = pos.en_passant() {
        let victim = Square::new(target.file(), from.rank());
        let capturable = pos
            .contents(victim)
            .is_some_and(|m| m.piece() == Pawn && m.color() != turn);
        if attacks.contains(target) && capturable && pos.contents(target).is_none() {
            moves.push(LegalMove::EnPassant(from, target));
        }
    }
}

fn castle_moves(pos: &Position, from: Square, moves: &mut Vec<LegalMove>) {
    let turn = pos.turn();
    let rights = pos.castling(turn);
    if from != rights.king_src() || attacked(pos, from, !turn) {
        return;
    }
    let occupied = pos.occupied();
    let rook_at = |square: Square| {
        pos.contents(square)
            .is_some_and(|m| m.piece() == Rook && m.color() == turn)
    };
    let safe = |lane: Mask| lane.iter().all(|square| !attacked(pos, square, !turn));
    if rights.oo()
        && rook_at(rights.oo_rook_src())
        && (rights.oo_blocking_lane() & occupied).is_empty()
        && safe(rights.oo_attacking_lane())
    {
        moves.push(LegalMove::ShortCastle(turn));
    }
    if rights.ooo()
        && rook_at(rights.ooo_rook_src())
        && (rights.ooo_blocking_lane() & occupied).is_empty()
        && safe(rights.ooo_attacking_lane())
    {
        moves.push(LegalMove::LongCastle(turn));
    }
}

#[inline]
fn attacked(pos: &Position, square: Square, by: Color) -> bool {
    !attackers(pos, square, by).is_empty()
}

/// Pieces of color `by` that attack `square`.
pub(super) fn attackers(pos: &Position, square: Square, by: Color) -> Mask {
    let occupied = pos.occupied();
    let theirs = pos.occupied_by(by);
    let mut result = KNIGHT_MOVES[square] & pos.knights();
    result |= KING_MOVES[square] & pos.kings();
    // a pawn of `by` attacks `square` from wherever a pawn of the other
    // color standing on `square` would attack
    result |= pawn_attacks(!by, square) & pos.pawns();
    result |= slide(square, ROOK_MOVES[square], occupied) & pos.horizontals();
    result |= slide(square, BISHOP_MOVES[square], occupied) & pos.diagonals();
    result & theirs
}

/// Squares reached along `rays` from `from`, stopping at (and including)
/// the first occupied square in each direction.
#[inline]
fn slide(from: Square, rays: Mask, occupied: Mask) -> Mask {
    let mut mask = rays;
    for blocker in (rays & occupied).iter() {
        mask &= !shielded(from, blocker);
    }
    mask
}

#[inline]
pub(super) const fn pawn_forward(color: Color) -> Offset {
    match color {
        White => Offset::new(0, -1),
        Black => Offset::new(0, 1),
    }
}

/// Squares a pawn of `color` standing on `square` attacks.
#[inline]
pub(crate) fn pawn_attacks(color: Color, square: Square) -> Mask {
    match color {
        White => WHITE_PAWN_ATTACKS[square],
        Black => BLACK_PAWN_ATTACKS[square],
    }
}

/// A move as requested by a player: origin, destination and an optional
/// promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion)?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveError;

    /// Parses long algebraic notation such as `e2e4` or `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidText(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(invalid());
        }
        let from = s[0..2].parse().map_err(|_| invalid())?;
        let to = s[2..4].parse().map_err(|_| invalid())?;
        let promotion = match &s[4..] {
            "" => None,
            text => Some(text.parse().map_err(|_| invalid())?),
        };
        Ok(Self::new(from, to, promotion))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::EnumIter)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl From<Promotion> for Piece {
    fn from(value: Promotion) -> Self {
        match value {
            Promotion::Queen => Piece::Queen,
            Promotion::Rook => Piece::Rook,
            Promotion::Bishop => Piece::Bishop,
            Promotion::Knight => Piece::Knight,
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let piece: Piece = (*self).into();
        write!(f, "{}", piece.to_char())
    }
}

impl FromStr for Promotion {
    type Err = MoveError;

    /// Accepts a piece letter (`q`, `R`, ...) or name (`queen`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "q" | "queen" => Ok(Promotion::Queen),
            "r" | "rook" => Ok(Promotion::Rook),
            "b" | "bishop" => Ok(Promotion::Bishop),
            "n" | "knight" => Ok(Promotion::Knight),
            _ => Err(InvalidText(s.to_string())),
        }
    }
}

/// A move known to be legal in the position that generated it, carrying
/// what the applier needs to know about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalMove {
    Standard(Square, Square),
    DoubleAdvance(Square, Square),
    EnPassant(Square, Square),
    Promoting(Square, Square, Promotion),
    ShortCastle(Color),
    LongCastle(Color),
}

impl LegalMove {
    pub fn from(&self) -> Square {
        match *self {
            LegalMove::Standard(from, _)
            | LegalMove::DoubleAdvance(from, _)
            | LegalMove::EnPassant(from, _)
            | LegalMove::Promoting(from, _, _) => from,
            LegalMove::ShortCastle(color) | LegalMove::LongCastle(color) => {
                CastlingRights::none(color).king_src()
            }
        }
    }

    /// The destination square; the king's landing square for castling.
    pub fn to(&self) -> Square {
        match *self {
            LegalMove::Standard(_, to)
            | LegalMove::DoubleAdvance(_, to)
            | LegalMove::EnPassant(_, to)
            | LegalMove::Promoting(_, to, _) => to,
            LegalMove::ShortCastle(color) => CastlingRights::none(color).oo_king_dest(),
            LegalMove::LongCastle(color) => CastlingRights::none(color).ooo_king_dest(),
        }
    }

    pub fn promotion(&self) -> Option<Promotion> {
        match *self {
            LegalMove::Promoting(_, _, promotion) => Some(promotion),
            _ => None,
        }
    }

    pub fn to_move(&self) -> Move {
        Move::new(self.from(), self.to(), self.promotion())
    }

    pub fn sort_key(&self) -> (Square, Square, Option<Promotion>) {
        (self.from(), self.to(), self.promotion())
    }

    fn matches(&self, mv: &Move) -> bool {
        if self.from() != mv.from {
            return false;
        }
        match *self {
            LegalMove::Promoting(_, to, promotion) => {
                to == mv.to && mv.promotion.unwrap_or(Promotion::Queen) == promotion
            }
            LegalMove::ShortCastle(color) => {
                let rights = CastlingRights::none(color);
                mv.promotion.is_none()
                    && (mv.to == rights.oo_king_dest() || mv.to == rights.oo_rook_src())
            }
            LegalMove::LongCastle(color) => {
                let rights = CastlingRights::none(color);
                mv.promotion.is_none()
                    && (mv.to == rights.ooo_king_dest() || mv.to == rights.ooo_rook_src())
            }
            _ => self.to() == mv.to && mv.promotion.is_none(),
        }
    }
}

impl fmt::Display for LegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_move())
    }
}

static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = Mask::from_squares(Direction::iter().filter_map(|dir| square + dir));
    }
    array
});

static QUEEN_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = ROOK_MOVES[square] | BISHOP_MOVES[square];
    }
    array
});

static ROOK_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = !square.to_mask() & HORIZONTALS[square];
    }
    array
});

static BISHOP_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = !square.to_mask() & DIAGONALS[square];
    }
    array
});

static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

// Defined for every square, including the back ranks, so the tables also
// answer "which pawns attack this square" lookups.
static WHITE_PAWN_ATTACKS: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 2] = [Offset::new(-1, -1), Offset::new(1, -1)];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

static BLACK_PAWN_ATTACKS: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 2] = [Offset::new(-1, 1), Offset::new(1, 1)];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});
