//! Tests for the puzzle engine through the public API.

use word_trinity::{
    Direction, Feedback, GameStatus, GuessScope, PuzzleData, PuzzleEngine, PuzzleError, Tier,
};

const LETTERS: &str = "abcdaefgahij";

fn engine() -> PuzzleEngine {
    PuzzleEngine::from_data(PuzzleData::from_letters(LETTERS), 10).unwrap()
}

fn all_confirmed() -> Vec<Tier> {
    vec![Tier::CONFIRMED; 5]
}

/// Fills the whole triangle with the solution.
fn fill_board(engine: &mut PuzzleEngine) {
    for letter in ['a', 'b', 'c', 'd', 'a'] {
        engine.place_letter(letter).unwrap();
    }
    engine.set_active_word(1).unwrap();
    engine.focus_position(1, 1).unwrap();
    for letter in ['e', 'f', 'g', 'a'] {
        engine.place_letter(letter).unwrap();
    }
    engine.set_active_word(2).unwrap();
    engine.focus_position(2, 1).unwrap();
    for letter in ['h', 'i', 'j'] {
        engine.place_letter(letter).unwrap();
    }
}

#[test]
fn test_words_share_corner_positions() {
    let engine = engine();
    let words = engine.words();
    assert_eq!(words[0].positions(), &[0, 1, 2, 3, 4]);
    assert_eq!(words[1].positions(), &[4, 5, 6, 7, 8]);
    assert_eq!(words[2].positions(), &[8, 9, 10, 11, 0]);
    assert_eq!(engine.positions().len(), 12);
}

#[test]
fn test_win_on_final_feedback() {
    let mut engine = engine();
    fill_board(&mut engine);

    let first = Feedback::new([Some(all_confirmed()), Some(all_confirmed()), None]);
    assert_eq!(engine.apply_feedback(&first), Ok(GameStatus::InProgress));

    let last = Feedback::for_word(2, all_confirmed());
    assert_eq!(engine.apply_feedback(&last), Ok(GameStatus::Won));
    assert_eq!(engine.turns_used(), 2);
    assert!(engine.positions().iter().all(|p| p.is_locked()));
    assert!(engine.tiles().iter().all(|t| !t.is_usable()));
}

#[test]
fn test_feedback_rejected_after_game_end() {
    let mut engine = engine();
    fill_board(&mut engine);
    let everything = Feedback::new([Some(all_confirmed()), Some(all_confirmed()), Some(all_confirmed())]);
    assert_eq!(engine.apply_feedback(&everything), Ok(GameStatus::Won));

    let snapshot = engine.clone();
    assert_eq!(engine.apply_feedback(&everything), Err(PuzzleError::GameOver));
    assert_eq!(engine, snapshot);
}

#[test]
fn test_malformed_feedback_changes_nothing() {
    let mut engine = engine();
    engine.place_letter('a').unwrap();
    let snapshot = engine.clone();

    let short = Feedback::for_word(0, vec![Tier::CONFIRMED; 3]);
    assert!(matches!(
        engine.apply_feedback(&short),
        Err(PuzzleError::MalformedFeedback(_))
    ));
    assert_eq!(engine, snapshot);
}

#[test]
fn test_reset_then_load_equals_fresh_engine() {
    let mut engine = engine();
    fill_board(&mut engine);
    engine
        .apply_feedback(&Feedback::for_word(0, all_confirmed()))
        .unwrap();

    engine.reset();
    engine.load(&PuzzleData::from_letters(LETTERS)).unwrap();
    assert_eq!(engine, self::engine());
}

#[test]
fn test_extract_guess_active_word_only() {
    let mut engine = engine();
    engine.place_letter('a').unwrap();
    engine.place_letter('b').unwrap();

    let guess = engine.extract_guess(GuessScope::ActiveWord);
    assert_eq!(guess.to_wire(), ["ab", "None", "None"].map(String::from));

    // An empty active word is still submitted
    engine.shift_active_word(Direction::Forward);
    let guess = engine.extract_guess(GuessScope::ActiveWord);
    assert_eq!(guess.to_wire(), ["None", "", "None"].map(String::from));
}

#[test]
fn test_extract_guess_on_untouched_puzzle() {
    let engine = engine();

    let all = engine.extract_guess(GuessScope::AllWords);
    assert_eq!(all.to_wire(), ["None", "None", "None"].map(String::from));
    assert_eq!(all.word(0), None);

    let active = engine.extract_guess(GuessScope::ActiveWord);
    assert_eq!(active.word(0), Some(""));
    assert_eq!(active.to_wire(), ["", "None", "None"].map(String::from));
}

#[test]
fn test_extract_guess_all_words_skips_empty_words() {
    let mut engine = engine();
    engine.place_letter('a').unwrap();
    engine.place_letter('b').unwrap();

    let guess = engine.extract_guess(GuessScope::AllWords);
    // Word 3 ends on the shared first position
    assert_eq!(guess.to_wire(), ["ab", "None", "a"].map(String::from));
    assert_eq!(
        serde_json::to_string(&guess).unwrap(),
        r#"["ab","None","a"]"#
    );
}

#[test]
fn test_locked_position_is_immune() {
    let mut engine = engine();
    engine.place_letter('c').unwrap();
    engine
        .apply_feedback(&Feedback::for_word(0, vec![
            Tier::CONFIRMED,
            Tier::UNTRIED,
            Tier::UNTRIED,
            Tier::UNTRIED,
            Tier::UNTRIED,
        ]))
        .unwrap();
    let locked = engine.positions()[0].clone();

    assert_eq!(engine.focus_position(0, 0), Ok(false));
    assert_ne!(engine.focused_position(), 0);
    engine.clear_all_letters().unwrap();
    engine.shift_focus(Direction::Backward);
    assert_ne!(engine.focused_position(), 0);
    engine.place_letter('a').unwrap();

    // Word 3 ends on position 0 but cannot focus it
    engine.set_active_word(2).unwrap();
    assert_eq!(engine.focus_position(2, 4), Ok(false));
    assert_eq!(engine.place_letter('b'), Ok(8));

    engine
        .apply_feedback(&Feedback::for_word(2, vec![Tier::new(1).unwrap(); 5]))
        .unwrap();
    assert_eq!(engine.positions()[0], locked);
}

#[test]
fn test_place_tile_moves_a_placed_tile() {
    let mut engine = engine();
    engine.place_tile(11).unwrap();
    assert_eq!(engine.letter_at(0), Some('J'));

    engine.place_tile(11).unwrap();
    assert_eq!(engine.letter_at(0), None);
    assert_eq!(engine.letter_at(1), Some('J'));
    assert_eq!(engine.place_tile(12), Err(PuzzleError::InvalidTile(12)));
}

#[test]
fn test_restored_session_keeps_terminal_status() {
    let data = PuzzleData::from_letters(LETTERS)
        .with_turns_used(10)
        .with_status(GameStatus::Lost);
    let mut engine = PuzzleEngine::from_data(data, 10).unwrap();
    assert_eq!(engine.status(), GameStatus::Lost);
    assert_eq!(engine.remaining_turns(), 0);
    assert_eq!(engine.place_letter('a'), Err(PuzzleError::GameOver));

    // Navigation still works on a finished game
    engine.shift_active_word(Direction::Backward);
    assert_eq!(engine.active_word_index(), 2);
}
