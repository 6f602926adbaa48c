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

//! Move selection for the computer player
//!
//! Iterative deepening over a negamax alpha-beta search, with a
//! captures-only quiescence search at the horizon. Each iteration searches
//! the previous iteration's best move first. When the budget runs out in
//! the middle of an iteration, that iteration is discarded and the best
//! move of the last completed one is played.

use std::cmp::Reverse;
use std::time::Duration;
use tracing::debug;

use crate::{is_insufficient, LegalMove, LegalMoves, Piece, Position, SEVENTY_FIVE_MOVE_PLIES};

mod budget;
mod eval;

use budget::Clock;
pub use budget::Budget;
pub use eval::evaluate;

/// Score of being checkmated right now. Mates further away score closer
/// to zero so the shortest mate is preferred.
pub const MATE: i32 = 100_000;
/// Scores beyond this magnitude announce a forced mate.
pub const MATE_THRESHOLD: i32 = MATE - 1_000;
const INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub best: LegalMove,
    /// Centipawns from the mover's point of view.
    pub score: i32,
    /// Deepest fully completed iteration; 0 when none completed.
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Searcher {
    budget: Budget,
}

impl Searcher {
    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }

    /// Picks one of `moves`, which must be legal in `position`. Returns
    /// `None` only when `moves` is empty.
    pub fn select_move(&self, position: &Position, moves: &[LegalMove]) -> Option<SearchReport> {
        let mut clock = Clock::start(self.budget.movetime);
        #[cfg(feature = "random")]
        let root = {
            use rand::seq::SliceRandom;
            let mut root = moves.to_vec();
            root.shuffle(&mut rand::thread_rng());
            root
        };
        #[cfg(not(feature = "random"))]
        let root = moves.to_vec();
        self.deepen(position, root, &mut clock)
    }

    /// Runs the iterations on an already started clock. Only completed
    /// iterations update the report.
    fn deepen(
        &self,
        position: &Position,
        mut root: Vec<LegalMove>,
        clock: &mut Clock,
    ) -> Option<SearchReport> {
        order_moves(position, &mut root);
        let mut report = SearchReport {
            best: *root.first()?,
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
        };

        if root.len() > 1 {
            for depth in 1..=self.budget.max_depth.max(1) {
                let Some((best, score)) = search_root(position, &root, depth, clock) else {
                    break;
                };
                report.best = best;
                report.score = score;
                report.depth = depth;
                debug!(depth, score, nodes = clock.nodes(), best = %best, "iteration complete");
                if let Some(index) = root.iter().position(|&mv| mv == best) {
                    root[..=index].rotate_right(1);
                }
                if score.abs() >= MATE_THRESHOLD || clock.is_limit_reached() {
                    break;
                }
            }
        }
        report.nodes = clock.nodes();
        report.elapsed = clock.elapsed();
        Some(report)
    }
}

/// Searches every root move to `depth`. Returns `None` if time ran out.
fn search_root(
    position: &Position,
    root: &[LegalMove],
    depth: u8,
    clock: &mut Clock,
) -> Option<(LegalMove, i32)> {
    let mut alpha = -INFINITY;
    let mut best = None;
    for &mv in root {
        let child = position.apply(mv);
        let score = -negamax(&child, depth - 1, 1, -INFINITY, -alpha, clock)?;
        if best.is_none() || score > alpha {
            alpha = score;
            best = Some((mv, score));
        }
    }
    best
}

fn negamax(
    position: &Position,
    depth: u8,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    clock: &mut Clock,
) -> Option<i32> {
    clock.tick()?;
    let mut moves = position.legal_moves();
    if let Some(score) = terminal_score(position, &moves, ply) {
        return Some(score);
    }
    if depth == 0 {
        return quiescence(position, moves, ply, alpha, beta, clock);
    }
    order_moves(position, &mut moves);
    for mv in moves {
        let score = -negamax(&position.apply(mv), depth - 1, ply + 1, -beta, -alpha, clock)?;
        if score >= beta {
            return Some(beta);
        }
        alpha = alpha.max(score);
    }
    Some(alpha)
}

/// Resolves captures until the position is quiet, so the static
/// evaluation is never taken in the middle of an exchange.
fn quiescence(
    position: &Position,
    moves: Vec<LegalMove>,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    clock: &mut Clock,
) -> Option<i32> {
    let stand_pat = evaluate(position);
    if stand_pat >= beta {
        return Some(beta);
    }
    alpha = alpha.max(stand_pat);

    let mut captures: Vec<LegalMove> = moves
        .into_iter()
        .filter(|mv| victim(position, mv).is_some())
        .collect();
    order_moves(position, &mut captures);
    for mv in captures {
        clock.tick()?;
        let child = position.apply(mv);
        let replies = child.legal_moves();
        let score = match terminal_score(&child, &replies, ply + 1) {
            Some(score) => -score,
            None => -quiescence(&child, replies, ply + 1, -beta, -alpha, clock)?,
        };
        if score >= beta {
            return Some(beta);
        }
        alpha = alpha.max(score);
    }
    Some(alpha)
}

/// Score of a position where the game is decided, from the mover's side.
fn terminal_score(position: &Position, moves: &[LegalMove], ply: i32) -> Option<i32> {
    if moves.is_empty() {
        return Some(if position.is_check() { ply - MATE } else { 0 });
    }
    if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES || is_insufficient(position) {
        return Some(0);
    }
    None
}

/// The piece a move captures, if any.
fn victim(position: &Position, mv: &LegalMove) -> Option<Piece> {
    match mv {
        LegalMove::EnPassant(..) => Some(Piece::Pawn),
        LegalMove::ShortCastle(_) | LegalMove::LongCastle(_) => None,
        _ => position[mv.to()].map(|material| material.piece()),
    }
}

/// Most valuable victim first, least valuable attacker breaking ties,
/// promotions ahead of quiet moves. The sort is stable so equally ranked
/// moves keep their order.
fn order_moves(position: &Position, moves: &mut [LegalMove]) {
    moves.sort_by_key(|mv| {
        let attacker = position[mv.from()].map_or(0, |material| material.piece().value());
        let capture = victim(position, mv).map_or(0, |piece| 10 * piece.value() - attacker + 1);
        let promotion = mv.promotion().map_or(0, |piece| Piece::from(piece).value());
        Reverse(capture + promotion)
    });
}
