/// Line-based language prompt shown before the card starts
use std::io::{self, BufRead, Write};
use typewriter_core::{Language, ScriptBook};

/// Ask which language to play until a valid answer is given.
///
/// Accepts the number shown next to a language or any name
/// [`Language`] parses.
pub fn choose_language<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    book: &ScriptBook,
) -> io::Result<Language> {
    let choices: Vec<Language> = book.languages().collect();
    if choices.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "script book has no languages",
        ));
    }
    if let [only] = choices.as_slice() {
        return Ok(*only);
    }

    loop {
        for (number, language) in choices.iter().enumerate() {
            write!(output, "  [{}] {}  ", number + 1, language.label())?;
        }
        write!(output, "\nChoose a language: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no language chosen",
            ));
        }

        match pick(line.trim(), &choices) {
            Some(language) => return Ok(language),
            None => writeln!(output, "'{}' is not one of the choices.", line.trim())?,
        }
    }
}

fn pick(answer: &str, choices: &[Language]) -> Option<Language> {
    if let Ok(number) = answer.parse::<usize>() {
        return number.checked_sub(1).and_then(|i| choices.get(i)).copied();
    }
    answer
        .parse::<Language>()
        .ok()
        .filter(|language| choices.contains(language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_number_and_name_answers() {
        let book = ScriptBook::builtin();
        let mut out = Vec::new();
        let chosen = choose_language(Cursor::new("2\n"), &mut out, &book).unwrap();
        assert_eq!(chosen, Language::Mandarin);
        assert!(String::from_utf8(out).unwrap().contains("[1] English"));

        let chosen = choose_language(Cursor::new("English\n"), Vec::new(), &book).unwrap();
        assert_eq!(chosen, Language::English);
    }

    #[test]
    fn test_retries_until_valid() {
        let book = ScriptBook::builtin();
        let mut out = Vec::new();
        let chosen = choose_language(Cursor::new("7\nklingon\nzh\n"), &mut out, &book).unwrap();
        assert_eq!(chosen, Language::Mandarin);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("is not one of the choices").count(), 2);
    }

    #[test]
    fn test_end_of_input() {
        let book = ScriptBook::builtin();
        let err = choose_language(Cursor::new(""), Vec::new(), &book).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
