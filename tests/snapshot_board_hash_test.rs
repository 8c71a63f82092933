use blast_grid::core::{Board, BoardSnapshot, LevelConfig, SimpleRng};
use blast_grid::engine::{Collaborators, GameController, GameSettings, TapOutcome};
use blast_grid::types::Phase;

fn fnv1a64_bytes(bytes: impl Iterator<Item = u8>) -> u64 {
    // FNV-1a 64-bit.
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}

fn fnv1a64_snapshot(snap: &BoardSnapshot) -> u64 {
    fnv1a64_bytes(snap.colors.iter().map(|c| c.unwrap_or(0xFF)))
}

#[test]
fn board_hash_matches_reference_fnv() {
    let board = Board::generate(&LevelConfig::default(), &mut SimpleRng::new(1));
    let snap = board.snapshot();
    assert_eq!(snap.board_hash(), fnv1a64_snapshot(&snap));

    let mut holed = board.clone();
    holed.clear(blast_grid::types::Pos::new(0, 0)).unwrap();
    let snap = holed.snapshot();
    assert_eq!(snap.board_hash(), fnv1a64_snapshot(&snap));
    assert_ne!(snap.board_hash(), board.snapshot().board_hash());
}

#[test]
fn same_seed_same_deal() {
    let settings = GameSettings::default();
    let mut a = GameController::new(&settings, Collaborators::headless(77)).unwrap();
    let mut b = GameController::new(&settings, Collaborators::headless(77)).unwrap();
    a.start_game();
    b.start_game();

    assert_eq!(
        a.snapshot().board.board_hash(),
        b.snapshot().board.board_hash()
    );
}

#[tokio::test]
async fn snapshot_tracks_a_tap() {
    let settings = GameSettings {
        level: LevelConfig::new(6, 6, 3, 10),
        ..GameSettings::default()
    };
    let mut game = GameController::new(&settings, Collaborators::headless(5)).unwrap();
    game.start_game();
    let before = game.snapshot();
    assert!(before.playable());
    assert_eq!(before.phase, Phase::Idle);

    let pos = game
        .board()
        .positions()
        .find(|&p| {
            blast_grid::core::group_at(game.board(), p).is_some_and(|g| g.is_blastable())
        })
        .unwrap();
    let outcome = game.tap(pos.x as i32, pos.y as i32).await;
    assert!(matches!(outcome, TapOutcome::Blasted(_)));

    let after = game.snapshot();
    assert_eq!(after.moves_left, before.moves_left - 1);
    assert!(after.score > before.score);
    assert_eq!(after.board.board_hash(), fnv1a64_snapshot(&after.board));
}
