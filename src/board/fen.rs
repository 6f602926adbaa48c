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
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::castling::{castling_from_fen, castling_to_fen};
use super::material::{Color, Material, Piece};
use super::moves::{attackers, pawn_forward};
use super::position::{MoveId, Pos, Position};
use super::square::{File, Offset, Rank, Square};
use super::Turn;

use Color::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {0} does not describe exactly 8 files")]
    RankLength(Rank),
    #[error("invalid piece placement character {0:?}")]
    InvalidPiece(char),
    #[error("{0} must have exactly one king")]
    KingCount(Color),
    #[error("{0} has more than 16 pieces")]
    TooManyPieces(Color),
    #[error("{0} has more than 8 pawns")]
    TooManyPawns(Color),
    #[error("pawn on {0}")]
    PawnOnBackRank(Square),
    #[error("invalid side to move {0:?}")]
    InvalidTurn(String),
    #[error("invalid castling field {0:?}")]
    InvalidCastling(String),
    #[error("{0} castling rights without king and rook on their home squares")]
    CastlingWithoutPieces(Color),
    #[error("invalid en passant field {0:?}")]
    InvalidEnPassant(String),
    #[error("invalid move counter {0:?}")]
    InvalidCounter(String),
    #[error("the side not to move is in check")]
    OpponentInCheck,
}
use FenError::*;

impl Position {
    /// Parses Forsyth-Edwards Notation, rejecting anything that could not
    /// arise in a game.
    pub fn from_fen(text: &str) -> Result<Self, FenError> {
        text.parse()
    }

    pub fn to_fen(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [placement, turn, castling, en_passant, halfmove, fullmove] = fields.as_slice() else {
            return Err(FieldCount(fields.len()));
        };
        let mut position = Position::empty();
        parse_placement(&mut position, placement)?;

        let turn = match *turn {
            "w" => White,
            "b" => Black,
            other => return Err(InvalidTurn(other.to_string())),
        };
        let castling =
            castling_from_fen(castling).ok_or_else(|| InvalidCastling(castling.to_string()))?;
        let en_passant = match *en_passant {
            "-" => None,
            text => Some(
                text.parse::<Square>()
                    .map_err(|_| InvalidEnPassant(text.to_string()))?,
            ),
        };
        let halfmove: u16 = halfmove
            .parse()
            .map_err(|_| InvalidCounter(halfmove.to_string()))?;
        let fullmove: u32 = fullmove
            .parse()
            .ok()
            .filter(|n| (1..=MoveId::MAX_MOVE_NUMBER).contains(n))
            .ok_or_else(|| InvalidCounter(fullmove.to_string()))?;

        position.set_castling(castling);
        position.set_en_passant_target(en_passant);
        position.set_counters(MoveId::new(fullmove - 1, turn), halfmove);
        validate(&position)?;
        Ok(position)
    }
}

fn parse_placement(position: &mut Position, placement: &str) -> Result<(), FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(RankCount(rows.len()));
    }
    for (rank, row) in Rank::iter().zip(rows) {
        let mut file = 0;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as usize;
            } else {
                let material = Material::try_from_char(c).ok_or(InvalidPiece(c))?;
                if file >= 8 {
                    return Err(RankLength(rank));
                }
                position.place(Square::new(File::from_index(file), rank), material);
                file += 1;
            }
            if file > 8 {
                return Err(RankLength(rank));
            }
        }
        if file != 8 {
            return Err(RankLength(rank));
        }
    }
    Ok(())
}

fn validate(position: &Position) -> Result<(), FenError> {
    let turn = position.turn();
    for color in Color::iter() {
        let pieces = position.occupied_by(color);
        if (pieces & position.kings()).len() != 1 {
            return Err(KingCount(color));
        }
        if pieces.len() > 16 {
            return Err(TooManyPieces(color));
        }
        if (pieces & position.pawns()).len() > 8 {
            return Err(TooManyPawns(color));
        }
        let rights = position.castling(color);
        let holds = |square: Square, piece: Piece| {
            position[square] == Some(Material::new(color, piece))
        };
        let king_home = holds(rights.king_src(), Piece::King);
        if (rights.oo() && !(king_home && holds(rights.oo_rook_src(), Piece::Rook)))
            || (rights.ooo() && !(king_home && holds(rights.ooo_rook_src(), Piece::Rook)))
        {
            return Err(CastlingWithoutPieces(color));
        }
    }
    let back_ranks = Rank::back_rank(White).to_mask() | Rank::back_rank(Black).to_mask();
    if let Some(square) = (position.pawns() & back_ranks).iter().next() {
        return Err(PawnOnBackRank(square));
    }
    if let Some(target) = position.en_passant() {
        // the side that just moved must have double-advanced onto the
        // square beyond `target`
        let mover = !turn;
        let forward = pawn_forward(mover);
        let backward = Offset::new(forward.x, -forward.y);
        let pawn = target + forward;
        let origin = target + backward;
        let consistent = target.rank() == Rank::en_passant_rank(mover)
            && position[target].is_none()
            && origin.is_some_and(|sq| position[sq].is_none())
            && pawn.is_some_and(|sq| position[sq] == Some(Material::new(mover, Piece::Pawn)));
        if !consistent {
            return Err(InvalidEnPassant(target.to_string()));
        }
    }
    if let Some(king) = position.king(!turn) {
        if !attackers(position, king, turn).is_empty() {
            return Err(OpponentInCheck);
        }
    }
    Ok(())
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter() {
            let mut empty = 0;
            for file in File::iter() {
                match self[Square::new(file, rank)] {
                    Some(material) => {
                        if empty > 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", material.to_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{}", empty)?;
            }
            if rank != Rank::Rank1 {
                write!(f, "/")?;
            }
        }
        let turn = match self.turn() {
            White => 'w',
            Black => 'b',
        };
        let en_passant = self
            .en_passant()
            .map_or_else(|| "-".to_string(), |square| square.to_string());
        write!(
            f,
            " {} {} {} {} {}",
            turn,
            castling_to_fen(self.castling_pair()),
            en_passant,
            self.halfmove_clock(),
            self.move_number()
        )
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use Square::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_start_position_round_trip() {
        let position = Position::from_fen(START).unwrap();
        assert_eq!(position, Position::default());
        assert_eq!(Position::default().to_fen(), START);
    }
    #[test]
    fn test_round_trip_through_play() {
        let mut position = Position::default();
        for text in ["e2e4", "c7c5", "e4e5", "d7d5", "e5d6", "d8d6", "g1f3", "b8c6", "f1b5"] {
            position = position.make_move(text.parse().unwrap()).unwrap();
            let fen = position.to_fen();
            assert_eq!(Position::from_fen(&fen).unwrap(), position, "{fen}");
        }
        assert_eq!(
            position.to_fen(),
            "r1b1kbnr/pp2pppp/2nq4/1Bp5/8/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 5"
        );
    }
    #[test]
    fn test_en_passant_field() {
        let position = Position::default()
            .make_move("e2e4".parse().unwrap())
            .unwrap();
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        let mut position = position;
        for text in ["d7d5", "e4e5", "f7f5"] {
            position = position.make_move(text.parse().unwrap()).unwrap();
        }
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
        );
        let parsed = Position::from_fen(&position.to_fen()).unwrap();
        assert_eq!(parsed, position);
        assert_eq!(parsed.en_passant(), Some(F6));
    }
    #[test]
    fn test_counters() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 42 17").unwrap();
        assert_eq!(position.turn(), Color::Black);
        assert_eq!(position.halfmove_clock(), 42);
        assert_eq!(position.move_number(), 17);
    }
    #[test]
    fn test_move_number_is_held_at_its_limit() {
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 65535").unwrap();
        for (text, fen) in [
            ("e8d8", "3k4/8/8/8/8/8/8/4K2R w - - 1 65535"),
            ("h1h2", "3k4/8/8/8/8/8/7R/4K3 b - - 2 65535"),
            ("d8e8", "4k3/8/8/8/8/8/7R/4K3 w - - 3 65535"),
        ] {
            position = position.make_move(text.parse().unwrap()).unwrap();
            assert_eq!(position.to_fen(), fen);
            assert_eq!(Position::from_fen(fen).unwrap(), position);
        }
        assert_eq!(position.turn(), Color::White);
        assert!(!position.legal_moves().is_empty());
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 65536"),
            Err(FenError::InvalidCounter("65536".to_string()))
        );
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 2147483647").is_err());
    }
    #[test]
    fn test_malformed_positions() {
        let rejected = [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w kq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/P7/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/P3K3 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "4k2R/8/8/8/8/8/8/4K3 w - - 0 1",
        ];
        for text in rejected {
            assert!(Position::from_fen(text).is_err(), "accepted {text:?}");
        }
    }
    #[test]
    fn test_specific_errors() {
        assert_eq!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"), Err(FenError::KingCount(Color::White)));
        assert_eq!(
            Position::from_fen("4k2R/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::OpponentInCheck)
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0"),
            Err(FenError::InvalidCounter("0".to_string()))
        );
    }
    #[test]
    fn test_serde_uses_fen() {
        let position = Position::default();
        let json = serde_json::to_string(&position).unwrap();
        assert_eq!(json, format!("\"{START}\""));
        let parsed: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, position);
        assert!(serde_json::from_str::<Position>("\"not a position\"").is_err());
    }
}
