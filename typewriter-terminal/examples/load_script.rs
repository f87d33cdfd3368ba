/// Example: Play a script book file in the terminal
///
/// Usage: cargo run --example load_script -- path/to/card.txt [language]

use std::env;
use std::fs;
use typewriter_core::{parse_script_book, Language, ScriptBook, TimingParams};
use typewriter_terminal::TerminalApp;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let book = match args.get(1) {
        Some(path) => {
            println!("Loading script book: {}", path);
            let text = fs::read_to_string(path)?;
            parse_script_book(&text)?
        }
        None => {
            eprintln!("Usage: {} <script-file> [language]", args[0]);
            eprintln!("\nNo script file provided, using the built-in card...");
            ScriptBook::builtin()
        }
    };

    let language = match args.get(2) {
        Some(name) => name.parse::<Language>()?,
        None => book
            .languages()
            .next()
            .ok_or_else(|| anyhow::anyhow!("script book is empty"))?,
    };
    let profile = book
        .profile(language)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no [{}] section", language))?;

    println!("Playing {} messages (press Q to quit)...", profile.script.len());
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(profile, TimingParams::default())?.exit_on_finish(true);
    app.run()?;

    println!("Happy birthday!");
    Ok(())
}
