/// Typewriter Terminal - Birthday card
///
/// Types the chosen language's messages one character at a time.
/// Controls:
///   - Q/ESC: Quit
///   - R: Replay once the card is finished
use anyhow::Context;
use clap::Parser;
use std::io::{self, stdin, stdout};
use tracing::Level;
use typewriter_terminal::cli::Args;
use typewriter_terminal::{plan, prompt, TerminalApp};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let book = args.script_book()?;
    let timing = args.timing().context("invalid timing configuration")?;

    let language = match args.language {
        Some(language) => language,
        None => prompt::choose_language(stdin().lock(), stdout(), &book)?,
    };
    let profile = book
        .profile(language)
        .cloned()
        .with_context(|| format!("script book has no [{language}] section"))?;

    if args.plan {
        plan::write_plan(&mut stdout().lock(), &profile, timing)?;
        return Ok(());
    }

    let mut app = TerminalApp::new(profile, timing)?.exit_on_finish(args.exit_on_finish);
    app.run()?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}
