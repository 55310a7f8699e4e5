// tests/session_tests.rs

// End-to-end checks of the public API: two in-process sessions kept in
// lockstep by exchanging move records, the way two remote processes would
// through the relay.

use qonnect::{
    GameConfig, GameError, GameSession, Gate, MoveAction, Player, SessionPhase, SyncStatus,
    circuits::generator,
};

fn config() -> GameConfig {
    GameConfig::new(4, 42, 1).expect("valid test config")
}

fn session_pair() -> (GameSession, GameSession) {
    let first = GameSession::new(config(), Player::Zero).expect("first session");
    let second = GameSession::new(config(), Player::One).expect("second session");
    (first, second)
}

fn assert_states_match(a: &GameSession, b: &GameSession) {
    for (x, y) in a.state().vector().iter().zip(b.state().vector()) {
        assert!((x - y).norm_sqr() < 1e-18, "state vectors diverged");
    }
    assert_eq!(a.board(), b.board());
}

#[test]
fn generator_is_deterministic_across_invocations() {
    assert_eq!(generator::generate(1234, 8, 3), generator::generate(1234, 8, 3));
}

#[test]
fn norm_stays_unit_through_a_whole_game_opening() {
    for seed in [0, 7, 42, 65_535] {
        let session = GameSession::new(
            GameConfig::new(6, seed, 2).unwrap(),
            Player::Zero,
        )
        .unwrap();
        session.state().check_normalization(1e-6).unwrap();
    }
}

#[test]
fn measurement_renormalizes_the_survivors() {
    let (mut first, _) = session_pair();
    let (_, _) = first.measure(3).unwrap();
    let norm_sq = first.state().norm_sqr_sum();
    assert!((norm_sq - 1.0).abs() < 1e-6, "norm {}", norm_sq);
}

#[test]
fn entangled_measurement_cascades_into_the_record() {
    let (mut first, mut second) = session_pair();

    // Entangle columns 0 and 1 across two turns, then measure column 0.
    let record = first.play_gate(Gate::H { target: 0 }).unwrap();
    second.apply_remote(&record).unwrap();
    let record = second.play_gate(Gate::Cx { control: 0, target: 1 }).unwrap();
    first.apply_remote(&record).unwrap();

    let (record, measurement) = first.measure(0).unwrap();
    assert_eq!(measurement.cascades, vec![(1, measurement.outcome)]);

    let MoveAction::Measure { column, ref outcomes } = record.action else {
        panic!("expected a measurement record");
    };
    assert_eq!(column, 0);
    assert_eq!(outcomes[0], measurement.outcome as i8);
    assert_eq!(outcomes[1], measurement.outcome as i8);
    assert_eq!(outcomes[2], -1);

    // The opponent replays the record and lands on the identical state.
    assert_eq!(second.apply_remote(&record).unwrap(), SyncStatus::Applied);
    assert_states_match(&first, &second);
    assert_eq!(second.board().height(0), 1);
    assert_eq!(second.board().height(1), 1);
}

#[test]
fn turns_alternate_strictly() {
    let (mut first, mut second) = session_pair();
    assert_eq!(first.phase(), SessionPhase::AwaitingLocal);
    assert_eq!(second.phase(), SessionPhase::AwaitingRemote);

    // Second may not open.
    assert!(matches!(
        second.play_gate(Gate::X { target: 0 }),
        Err(GameError::IllegalMove { .. })
    ));

    // First moves, then may not move again until the reply arrives.
    let record = first.play_gate(Gate::X { target: 0 }).unwrap();
    assert!(matches!(
        first.play_gate(Gate::X { target: 1 }),
        Err(GameError::IllegalMove { .. })
    ));

    second.apply_remote(&record).unwrap();
    let reply = second.play_gate(Gate::X { target: 1 }).unwrap();
    first.apply_remote(&reply).unwrap();
    assert_eq!(first.phase(), SessionPhase::AwaitingLocal);
}

#[test]
fn a_long_exchange_keeps_every_invariant() {
    let (mut first, mut second) = session_pair();
    let moves: Vec<Gate> = vec![
        Gate::H { target: 2 },
        Gate::S { target: 2 },
        Gate::Cx { control: 2, target: 0 },
        Gate::Y { target: 3 },
        Gate::Ccx { control1: 0, control2: 2, target: 1 },
        Gate::Z { target: 1 },
    ];

    for (i, gate) in moves.into_iter().enumerate() {
        let (mover, watcher) = if i % 2 == 0 {
            (&mut first, &mut second)
        } else {
            (&mut second, &mut first)
        };
        let record = mover.play_gate(gate).unwrap();
        assert_eq!(watcher.apply_remote(&record).unwrap(), SyncStatus::Applied);

        let norm_sq = mover.state().norm_sqr_sum();
        assert!((norm_sq - 1.0).abs() < 1e-6, "move {}: norm {}", i, norm_sq);
    }
    assert_states_match(&first, &second);
    assert_eq!(first.local_moves(), 3);
    assert_eq!(first.remote_moves(), 3);
}
