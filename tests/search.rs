/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tadpole::{Color, EngineError, EvaluationWeights, Evaluator, Move, Position, Score, Searcher};

/// Full-width minimax with no pruning, scored the same way as the engine's leaves.
fn minimax(position: &mut Position, weights: &EvaluationWeights, depth: usize, maximizing: bool) -> Score {
    if depth == 0 || position.is_game_over() {
        return Evaluator::new(position, weights).eval();
    }

    let mut best = if maximizing { -Score::INF } else { Score::INF };
    for mv in position.legal_moves() {
        position.push(mv);
        let score = minimax(position, weights, depth - 1, !maximizing);
        position.pop();

        best = if maximizing { best.max(score) } else { best.min(score) };
    }

    best
}

/// Picks a root move by brute force, keeping the first move that strictly improves on the previous best.
fn minimax_root(position: &mut Position, depth: usize) -> Option<(Move, Score)> {
    let weights = EvaluationWeights::default();
    let white = position.side_to_move() == Color::White;

    let mut best: Option<(Move, Score)> = None;
    for mv in position.legal_moves() {
        position.push(mv);
        let maximizing = position.side_to_move() == Color::Black;
        let score = minimax(position, &weights, depth - 1, maximizing);
        position.pop();

        let improves = match best {
            None => true,
            Some((_, best)) if white => score > best,
            Some((_, best)) => score < best,
        };
        if improves {
            best = Some((mv, score));
        }
    }

    best
}

#[test]
fn pruning_never_changes_the_chosen_move() {
    let cases = [
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 2),
        ("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4", 2),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 3),
        ("8/5k2/8/8/8/8/4K3/4R3 b - - 0 1", 3),
        ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", 3),
    ];

    for (fen, depth) in cases {
        let mut position = Position::from_fen(fen).unwrap();
        let (expected_move, expected_score) = minimax_root(&mut position, depth).unwrap();

        let res = Searcher::new(depth).search(&mut position).unwrap();
        assert_eq!(res.bestmove, expected_move, "{fen} at depth {depth}");
        assert_eq!(res.score, expected_score, "{fen} at depth {depth}");
        assert!(!res.fallback);
    }
}

#[test]
fn search_leaves_position_untouched() {
    let mut position = Position::default();
    for uci in ["e2e4", "c7c5", "g1f3", "d7d6"] {
        let mv = position.find_move(uci).unwrap();
        position.push(mv);
    }

    let fen = position.to_fen();
    let history = position.history().to_vec();
    let outcome = position.outcome();
    let side = position.side_to_move();

    let bestmove = Searcher::new(3).find_best_move(&mut position).unwrap();

    assert_eq!(position.to_fen(), fen);
    assert_eq!(position.history(), history.as_slice());
    assert_eq!(position.outcome(), outcome);
    assert_eq!(position.side_to_move(), side);
    assert!(position.legal_moves().contains(&bestmove));
}

#[test]
fn finds_mate_in_one_at_every_depth() {
    // Back-rank mate: Ra8# is the only mating move
    let fen = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";
    for depth in 1..=3 {
        let mut position = Position::from_fen(fen).unwrap();
        let mv = Searcher::new(depth).find_best_move(&mut position).unwrap();
        assert_eq!(mv.to_string(), "a1a8", "depth {depth}");
    }
}

#[test]
fn doubled_pawns_score_lower() {
    let searcher = Searcher::default();
    let doubled = Position::from_fen("4k3/8/8/2P5/2P5/2P5/8/4K3 w - - 0 1").unwrap();
    let spread = Position::from_fen("4k3/8/8/2P5/1P6/5P2/8/4K3 w - - 0 1").unwrap();

    assert!(searcher.evaluate(&doubled) < searcher.evaluate(&spread));
}

#[test]
fn terminal_positions_score_as_documented() {
    let searcher = Searcher::default();

    let white_mated =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    assert_eq!(searcher.evaluate(&white_mated), -Score::INF);

    let stalemate = Position::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(searcher.evaluate(&stalemate), Score::DRAW);
}

#[test]
fn no_legal_moves_is_an_error() {
    let mut stalemate = Position::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
    let err = Searcher::new(2).search(&mut stalemate).unwrap_err();
    assert!(matches!(err, EngineError::NoLegalMoves { .. }));
}
