use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;
use wordparty::cli::{CliInterface, parse_cli};
use wordparty::logging::{LogTarget, init_logging, log_targets};
use wordparty::tui::TuiInterface;
use wordparty::wordbank::{WordEntry, embedded_catalog, load_catalog_from_file, user_catalog_path};
use wordparty::{GameContext, GameError, SystemClock, game_loop, info_log};

/// `--words-file`, then the per-user catalog if one exists, then the built-in words.
fn load_catalog(path: Option<&str>) -> Result<Vec<WordEntry>, GameError> {
    if let Some(path) = path {
        return load_catalog_from_file(path);
    }
    match user_catalog_path().filter(|p| p.is_file()) {
        Some(user_path) => load_catalog_from_file(user_path),
        None => embedded_catalog(),
    }
}

fn main() -> ExitCode {
    let cli = parse_cli();

    // The full-screen interface owns the terminal, so it never logs to stderr
    let mut last_error = None;
    for target in log_targets(cli.log_file.clone(), cli.plain) {
        let result = match &target {
            LogTarget::File(path) => init_logging(Some(path.as_path())),
            LogTarget::Stderr => init_logging(None),
        };
        match result {
            Ok(()) => {
                if let Some(e) = last_error.take() {
                    eprintln!("Cannot open log file ({e}), logging to stderr");
                }
                break;
            }
            Err(e) => last_error = Some(e),
        }
    }
    if let Some(e) = last_error {
        eprintln!("Logging disabled: {e}");
    }

    let catalog = match load_catalog(cli.catalog_path.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to load word catalog: {e}");
            return ExitCode::FAILURE;
        }
    };
    info_log!("Loaded {} catalog entries", catalog.len());

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let config = cli.game_config();
    let defaults = cli.default_settings();
    let clock = SystemClock;
    let mut ctx = GameContext {
        catalog: &catalog,
        config: &config,
        defaults: &defaults,
        rng: &mut rng,
        clock: &clock,
    };

    if cli.plain {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock(), cli.preset_settings());
        game_loop(&mut ctx, &mut interface);
    } else {
        let mut interface = match TuiInterface::new(config.letter_reveal_interval) {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e} (try --plain)");
                return ExitCode::FAILURE;
            }
        };
        game_loop(&mut ctx, &mut interface);
    }
    ExitCode::SUCCESS
}
