// Integration tests for the wordparty game
// These tests drive full games through game_loop with scripted and line-based front ends

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;
use wordparty::cli::CliInterface;
use wordparty::input::TileEntry;
use wordparty::normalize::letter_count;
use wordparty::*;

const ONE_WORD_CATALOG: &str = "easy|APPLE|A red or green fruit|APPLE|BANANA,APPLE,CHERRY\n";

enum Step {
    Act(UserAction),
    /// Let time pass without input
    Wait(Duration),
}

#[derive(Default)]
struct Log {
    setup_calls: usize,
    /// Debug form of each rejected setup
    setup_errors: Vec<String>,
    /// (team, score) at the start of each turn
    turns: Vec<(String, u32)>,
    outcomes: Vec<(String, TurnOutcome)>,
    hint_visible: Vec<bool>,
    boards: Vec<Leaderboard>,
    exited: bool,
}

/// Front end that replays a fixed script against a manual clock.
struct ScriptedInterface<'a> {
    clock: &'a ManualClock,
    settings: VecDeque<GameSettings>,
    steps: VecDeque<Step>,
    log: Log,
}

impl ScriptedInterface<'_> {
    fn next_step(&mut self) -> Option<UserAction> {
        match self.steps.pop_front() {
            Some(Step::Act(action)) => Some(action),
            Some(Step::Wait(by)) => {
                self.clock.advance(by);
                None
            }
            None => Some(UserAction::Exit),
        }
    }
}

impl GameInterface for ScriptedInterface<'_> {
    fn read_settings(&mut self, _defaults: &GameSettings) -> Option<GameSettings> {
        self.log.setup_calls += 1;
        self.settings.pop_front()
    }

    fn display_setup_error(&mut self, error: &GameError) {
        self.log.setup_errors.push(format!("{error:?}"));
    }

    fn display_turn(&mut self, view: &TurnView) {
        if let Some(team) = view.state.current_team() {
            self.log.turns.push((team.name.clone(), team.score));
        }
    }

    fn display_hint(&mut self, _view: &TurnView) {}

    fn read_action(&mut self, view: &TurnView) -> Option<UserAction> {
        self.log.hint_visible.push(view.state.show_hint);
        self.next_step()
    }

    fn display_outcome(&mut self, view: &TurnView, outcome: TurnOutcome) {
        if let Some(team) = view.state.current_team() {
            self.log.outcomes.push((team.name.clone(), outcome));
        }
    }

    fn display_leaderboard(&mut self, board: &Leaderboard) {
        self.log.boards.push(board.clone());
    }

    fn read_final_action(&mut self, _board: &Leaderboard) -> Option<UserAction> {
        self.next_step()
    }

    fn display_exit_message(&mut self) {
        self.log.exited = true;
    }
}

fn settings(teams: &[&str], words_per_team: usize) -> GameSettings {
    GameSettings {
        team_names: teams.iter().map(|s| s.to_string()).collect(),
        difficulty: Difficulty::Easy,
        words_per_team,
        answer_mode: AnswerMode::Text,
    }
}

fn play(catalog: &[WordEntry], settings: Vec<GameSettings>, steps: Vec<Step>) -> Log {
    let clock = ManualClock::new();
    let config = GameConfig::default();
    let defaults = GameSettings::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut interface = ScriptedInterface {
        clock: &clock,
        settings: settings.into(),
        steps: steps.into(),
        log: Log::default(),
    };
    let mut ctx = GameContext {
        catalog,
        config: &config,
        defaults: &defaults,
        rng: &mut rng,
        clock: &clock,
    };
    game_loop(&mut ctx, &mut interface);
    interface.log
}

fn one_word_catalog() -> Vec<WordEntry> {
    load_catalog_from_str(ONE_WORD_CATALOG).unwrap()
}

#[test]
fn test_two_team_game_correct_then_timeout() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::Submit("apple".to_string())),
            Step::Act(UserAction::NextTurn),
            Step::Wait(Duration::from_secs(21)),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Exit),
        ],
    );

    assert_eq!(
        log.turns,
        vec![("A".to_string(), 0), ("B".to_string(), 0)]
    );
    assert_eq!(
        log.outcomes,
        vec![
            ("A".to_string(), TurnOutcome::Correct),
            ("B".to_string(), TurnOutcome::TimedOut),
        ]
    );
    assert_eq!(log.boards.len(), 1);
    let board = &log.boards[0];
    assert_eq!(board.winner().map(|t| t.name.as_str()), Some("A"));
    assert_eq!(board.standings[0].team.score, 10);
    assert_eq!(board.standings[1].team.name, "B");
    assert_eq!(board.standings[1].team.score, 0);
    assert_eq!(board.stats.total_points, 10);
    assert!(log.exited);
}

#[test]
fn test_timeout_fires_once_and_blocks_late_guess() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Wait(Duration::from_secs(20)),
            Step::Wait(Duration::from_secs(30)),
            Step::Act(UserAction::Submit("apple".to_string())),
            Step::Act(UserAction::Reveal),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.outcomes, vec![("A".to_string(), TurnOutcome::TimedOut)]);
    assert!(log.boards.is_empty());
}

#[test]
fn test_no_timeout_before_deadline() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Wait(Duration::from_secs(19)),
            Step::Act(UserAction::Submit("APPLE".to_string())),
            Step::Wait(Duration::from_secs(60)),
            Step::Act(UserAction::Exit),
        ],
    );
    // Answering stops the countdown
    assert_eq!(log.outcomes, vec![("A".to_string(), TurnOutcome::Correct)]);
}

#[test]
fn test_hint_hides_after_its_countdown() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::ShowHint),
            Step::Wait(Duration::from_secs(6)),
            Step::Act(UserAction::ShowHint),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.hint_visible, vec![false, true, false, true]);
    assert!(log.outcomes.is_empty());
}

#[test]
fn test_next_turn_ignored_while_awaiting_answer() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Reveal),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.turns.len(), 2);
    assert_eq!(log.turns[1].0, "B");
    assert_eq!(log.outcomes, vec![("A".to_string(), TurnOutcome::Revealed)]);
}

#[test]
fn test_play_again_keeps_teams_and_resets_scores() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::Submit("apple".to_string())),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Submit("apple".to_string())),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::PlayAgain),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.boards.len(), 1);
    assert!(log.boards[0].standings.iter().all(|s| s.team.score == 10));
    assert_eq!(
        log.turns,
        vec![
            ("A".to_string(), 0),
            ("B".to_string(), 0),
            ("A".to_string(), 0),
        ]
    );
    // Setup is not shown again
    assert_eq!(log.setup_calls, 1);
}

#[test]
fn test_back_to_start_returns_to_setup() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1), settings(&["C", "D", "E"], 2)],
        vec![
            Step::Act(UserAction::BackToStart),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.setup_calls, 2);
    assert_eq!(
        log.turns,
        vec![("A".to_string(), 0), ("C".to_string(), 0)]
    );
}

#[test]
fn test_leaderboard_back_to_start_then_quit_from_setup() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::Reveal),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Reveal),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::BackToStart),
        ],
    );
    assert_eq!(log.boards.len(), 1);
    assert_eq!(log.boards[0].stats.total_points, 0);
    // Second setup has nothing left to read and quits
    assert_eq!(log.setup_calls, 2);
    assert!(log.exited);
}

#[test]
fn test_setup_errors_are_reported_and_retried() {
    let mut hard = settings(&["A", "B"], 1);
    hard.difficulty = Difficulty::Hard;
    let log = play(
        &one_word_catalog(),
        vec![
            settings(&["Solo"], 1),
            settings(&["A", " "], 1),
            settings(&["A", "B"], 16),
            hard,
            settings(&["A", "B"], 1),
        ],
        vec![Step::Act(UserAction::Exit)],
    );
    assert_eq!(log.setup_calls, 5);
    assert_eq!(log.setup_errors.len(), 4);
    assert!(log.setup_errors[0].starts_with("TooFewTeams"));
    assert_eq!(log.setup_errors[1], "BlankTeamName");
    assert!(log.setup_errors[2].starts_with("WordCountOutOfRange"));
    assert_eq!(log.setup_errors[3], "EmptyCatalog(Hard)");
    assert_eq!(log.turns, vec![("A".to_string(), 0)]);
}

#[test]
fn test_switch_mode_redisplays_turn() {
    let log = play(
        &one_word_catalog(),
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::SwitchMode(AnswerMode::Tiles)),
            Step::Act(UserAction::Submit("apple".to_string())),
            Step::Act(UserAction::Exit),
        ],
    );
    assert_eq!(log.turns.len(), 2);
    assert_eq!(log.outcomes, vec![("A".to_string(), TurnOutcome::Correct)]);
}

#[test]
fn test_embedded_catalog_covers_every_level() {
    let catalog = embedded_catalog().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for level in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let words = sample_for_teams(&catalog, level, 15, 20, &mut rng);
        assert_eq!(words.len(), 300);
        assert!(words.iter().all(|w| w.difficulty == level));
        assert!(words.iter().all(|w| !normalize(&w.correct_answer).is_empty()));
    }
}

/// Forwards to a real front end and keeps a log of what the game showed it.
struct Recorder<I> {
    inner: I,
    log: Log,
    reads: usize,
}

impl<I> Recorder<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            log: Log::default(),
            reads: 0,
        }
    }
}

impl<I: GameInterface> GameInterface for Recorder<I> {
    fn read_settings(&mut self, defaults: &GameSettings) -> Option<GameSettings> {
        self.log.setup_calls += 1;
        self.inner.read_settings(defaults)
    }

    fn display_setup_error(&mut self, error: &GameError) {
        self.log.setup_errors.push(format!("{error:?}"));
        self.inner.display_setup_error(error);
    }

    fn display_turn(&mut self, view: &TurnView) {
        if let Some(team) = view.state.current_team() {
            self.log.turns.push((team.name.clone(), team.score));
        }
        self.inner.display_turn(view);
    }

    fn display_hint(&mut self, view: &TurnView) {
        self.log.hint_visible.push(view.state.show_hint);
        self.inner.display_hint(view);
    }

    fn read_action(&mut self, view: &TurnView) -> Option<UserAction> {
        self.reads += 1;
        self.inner.read_action(view)
    }

    fn display_outcome(&mut self, view: &TurnView, outcome: TurnOutcome) {
        if let Some(team) = view.state.current_team() {
            self.log.outcomes.push((team.name.clone(), outcome));
        }
        self.inner.display_outcome(view, outcome);
    }

    fn display_leaderboard(&mut self, board: &Leaderboard) {
        self.log.boards.push(board.clone());
        self.inner.display_leaderboard(board);
    }

    fn read_final_action(&mut self, board: &Leaderboard) -> Option<UserAction> {
        self.reads += 1;
        self.inner.read_final_action(board)
    }

    fn display_exit_message(&mut self) {
        self.log.exited = true;
        self.inner.display_exit_message();
    }
}

fn play_cli(
    catalog: &[WordEntry],
    preset: Option<GameSettings>,
    input: &str,
) -> Recorder<CliInterface<Cursor<String>>> {
    let config = GameConfig::default();
    let defaults = GameSettings::default();
    let mut rng = StdRng::seed_from_u64(1);
    let clock = SystemClock;
    let mut ctx = GameContext {
        catalog,
        config: &config,
        defaults: &defaults,
        rng: &mut rng,
        clock: &clock,
    };
    let mut recorder = Recorder::new(CliInterface::new(Cursor::new(input.to_string()), preset));
    game_loop(&mut ctx, &mut recorder);
    recorder
}

fn scores(board: &Leaderboard) -> Vec<(String, u32)> {
    board
        .standings
        .iter()
        .map(|s| (s.team.name.clone(), s.team.score))
        .collect()
}

#[test]
fn test_cli_interactive_game_end_to_end() {
    // Setup prompts, a correct guess, a wrong guess, then quit from the leaderboard
    let input = "Red\nBlue\n\neasy\n1\ntext\nApple\n\npear\n\nq\n";
    let recorder = play_cli(&one_word_catalog(), None, input);
    let log = &recorder.log;

    assert_eq!(log.setup_calls, 1);
    assert!(log.setup_errors.is_empty());
    assert_eq!(
        log.turns,
        vec![("Red".to_string(), 0), ("Blue".to_string(), 0)]
    );
    assert_eq!(
        log.outcomes,
        vec![
            ("Red".to_string(), TurnOutcome::Correct),
            ("Blue".to_string(), TurnOutcome::Wrong),
        ]
    );
    assert_eq!(log.boards.len(), 1);
    assert_eq!(
        scores(&log.boards[0]),
        vec![("Red".to_string(), 10), ("Blue".to_string(), 0)]
    );
    assert_eq!(log.boards[0].winner().map(|t| t.name.as_str()), Some("Red"));
    assert!(log.exited);
    // Four turn reads and one leaderboard read
    assert_eq!(recorder.reads, 5);
}

#[test]
fn test_cli_preset_and_commands() {
    let preset = settings(&["Red", "Blue"], 1);
    let input = ":hint\n:mode tiles\nap\napple\n\n:reveal\n\np\n:quit\n";
    let recorder = play_cli(&one_word_catalog(), Some(preset), input);
    let log = &recorder.log;

    // Preset settings skip the prompts entirely
    assert_eq!(log.setup_calls, 1);
    assert_eq!(log.hint_visible, vec![true]);
    // Red's turn is shown again after the mode switch; the replay starts at zero
    assert_eq!(
        log.turns,
        vec![
            ("Red".to_string(), 0),
            ("Red".to_string(), 0),
            ("Blue".to_string(), 0),
            ("Red".to_string(), 0),
        ]
    );
    assert_eq!(
        log.outcomes,
        vec![
            ("Red".to_string(), TurnOutcome::Correct),
            ("Blue".to_string(), TurnOutcome::Revealed),
        ]
    );
    assert_eq!(log.boards.len(), 1);
    assert_eq!(
        scores(&log.boards[0]),
        vec![("Red".to_string(), 10), ("Blue".to_string(), 0)]
    );
    assert!(log.exited);
    assert_eq!(recorder.reads, 9);
}

#[test]
fn test_cli_end_of_input_exits() {
    // Ends in the middle of setup
    let recorder = play_cli(&one_word_catalog(), None, "Red\n");
    assert_eq!(recorder.log.setup_calls, 1);
    assert!(recorder.log.turns.is_empty());
    assert_eq!(recorder.reads, 0);
    assert!(recorder.log.exited);

    // Ends in the middle of a turn
    let recorder = play_cli(&one_word_catalog(), Some(settings(&["A", "B"], 1)), "");
    assert_eq!(recorder.log.turns, vec![("A".to_string(), 0)]);
    assert!(recorder.log.outcomes.is_empty());
    assert!(recorder.log.boards.is_empty());
    assert_eq!(recorder.reads, 1);
    assert!(recorder.log.exited);
}

#[test]
fn test_tiles_multi_word_answer_scores() {
    let catalog =
        load_catalog_from_str("medium|ICE CREAM|Frozen dessert|ICE CREAM|ICE CREAM,CAKE,PIE\n")
            .unwrap();
    let mut settings = settings(&["A", "B"], 1);
    settings.difficulty = Difficulty::Medium;
    settings.answer_mode = AnswerMode::Tiles;
    let state = GameState::start(&settings, &catalog, &mut StdRng::seed_from_u64(5)).unwrap();
    let answer = state.current_word().unwrap().correct_answer.clone();

    let mut tiles = TileEntry::for_answer(&answer);
    assert_eq!(tiles.len(), letter_count(&answer));
    tiles.paste("ICE CREAM");
    let guess = tiles.submit().unwrap();
    let state = state.submit_answer(&guess, &GameConfig::default());
    assert_eq!(state.is_answer_correct, Some(true));
    assert_eq!(state.teams[0].score, 10);

    // Same answer typed into the tiles of the line interface
    let recorder = play_cli(&catalog, Some(settings), "icecream\n\nice cream\n\nq\n");
    assert_eq!(
        recorder.log.outcomes,
        vec![
            ("A".to_string(), TurnOutcome::Correct),
            ("B".to_string(), TurnOutcome::Correct),
        ]
    );
    assert_eq!(
        scores(&recorder.log.boards[0]),
        vec![("A".to_string(), 10), ("B".to_string(), 10)]
    );
}

#[test]
fn test_custom_catalog_file_to_game() {
    // Integration test: Load custom catalog file -> play game
    use std::fs::File;
    use std::io::Write;

    let temp_dir = std::env::temp_dir();
    let catalog_path = temp_dir.join("test_wordparty_custom_catalog.txt");

    {
        let mut file = File::create(&catalog_path).unwrap();
        writeln!(file, "# party words").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "easy|CAFÉ|Where you get coffee|Café|").unwrap();
        writeln!(file, "medium|ICE CREAM|Frozen dessert|ICE CREAM|").unwrap();
        writeln!(file, "hard|SERENDIPITY|Happy accident||").unwrap();
    }

    let catalog = load_catalog_from_file(&catalog_path).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog[2].correct_answer, "SERENDIPITY");

    // Accents and case are ignored when matching
    let log = play(
        &catalog,
        vec![settings(&["A", "B"], 1)],
        vec![
            Step::Act(UserAction::Submit(normalize("cafe"))),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Submit(normalize("CAFÉ"))),
            Step::Act(UserAction::NextTurn),
            Step::Act(UserAction::Exit),
        ],
    );
    assert!(log.boards[0].standings.iter().all(|s| s.team.score == 10));

    std::fs::remove_file(&catalog_path).unwrap();
}

#[test]
fn test_malformed_catalog_file_is_rejected() {
    let result = load_catalog_from_str("easy|APPLE|fruit|APPLE|\nimpossible|X|y|X|\n");
    assert!(matches!(
        result,
        Err(GameError::MalformedCatalogLine { line: 2, .. })
    ));
    assert!(matches!(
        load_catalog_from_file("/nonexistent/wordparty/words.txt"),
        Err(GameError::Io(_))
    ));
}
