/// Script book parser for the plain-text message format
///
/// ```text
/// # comment
/// [english]
/// font = 'Varela Round', sans-serif
/// >
/// > Hey Z
/// ```
///
/// Each `>` line is one message (one space after the marker is dropped, a
/// bare `>` is a blank message). An optional `font = ...` line may follow a
/// section header directly.
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, eof, map, opt, rest},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use thiserror::Error;

use crate::script::{Language, LanguageProfile, Script, ScriptBook};

/// Errors produced while reading scripts and language names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown language '{0}' (expected 'english' or 'mandarin')")]
    UnknownLanguage(String),

    #[error("line {line}: unknown language section '[{name}]'")]
    UnknownSection { line: usize, name: String },

    #[error("line {line}: cannot parse '{content}'")]
    Syntax { line: usize, content: String },

    #[error("line {line}: message appears before any [language] section")]
    MessageOutsideSection { line: usize },

    #[error("line {line}: font must directly follow the section header")]
    MisplacedFont { line: usize },

    #[error("language '{0}' is defined more than once")]
    DuplicateSection(Language),

    #[error("language '{0}' has no messages")]
    EmptySection(Language),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Comment,
    Section(&'a str),
    Font(&'a str),
    Message(&'a str),
}

/// Parse a whole script book.
pub fn parse_script_book(input: &str) -> Result<ScriptBook, ScriptError> {
    let mut book = ScriptBook::new();
    let mut current: Option<SectionBuilder> = None;

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let parsed = match all_consuming(parse_line)(raw) {
            Ok((_, parsed)) => parsed,
            Err(_) => {
                return Err(ScriptError::Syntax {
                    line,
                    content: raw.to_string(),
                })
            }
        };

        match parsed {
            Line::Blank | Line::Comment => {}
            Line::Section(name) => {
                let language = name
                    .parse::<Language>()
                    .map_err(|_| ScriptError::UnknownSection {
                        line,
                        name: name.to_string(),
                    })?;
                if let Some(section) = current.take() {
                    section.finish(&mut book)?;
                }
                if book.profile(language).is_some() {
                    return Err(ScriptError::DuplicateSection(language));
                }
                current = Some(SectionBuilder::new(language));
            }
            Line::Font(font) => match current.as_mut() {
                Some(section) if section.accepts_font() => {
                    section.font = Some(font.to_string());
                }
                _ => return Err(ScriptError::MisplacedFont { line }),
            },
            Line::Message(text) => match current.as_mut() {
                Some(section) => section.messages.push(text.to_string()),
                None => return Err(ScriptError::MessageOutsideSection { line }),
            },
        }
    }

    if let Some(section) = current.take() {
        section.finish(&mut book)?;
    }

    log::debug!("parsed script book with {} language(s)", book.len());
    Ok(book)
}

struct SectionBuilder {
    language: Language,
    font: Option<String>,
    messages: Vec<String>,
}

impl SectionBuilder {
    fn new(language: Language) -> Self {
        Self {
            language,
            font: None,
            messages: Vec::new(),
        }
    }

    fn accepts_font(&self) -> bool {
        self.font.is_none() && self.messages.is_empty()
    }

    fn finish(self, book: &mut ScriptBook) -> Result<(), ScriptError> {
        if self.messages.is_empty() {
            return Err(ScriptError::EmptySection(self.language));
        }
        book.insert(LanguageProfile {
            language: self.language,
            font: self.font,
            script: Script::new(self.messages),
        });
        Ok(())
    }
}

fn parse_line(input: &str) -> IResult<&str, Line<'_>> {
    alt((parse_section, parse_font, parse_message, parse_comment, parse_blank))(input)
}

fn parse_section(input: &str) -> IResult<&str, Line<'_>> {
    let name = take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-');
    map(
        delimited(
            pair(space0, char('[')),
            delimited(space0, name, space0),
            terminated(char(']'), pair(space0, eof)),
        ),
        Line::Section,
    )(input)
}

fn parse_font(input: &str) -> IResult<&str, Line<'_>> {
    map(
        preceded(tuple((space0, tag("font"), space0, char('='), space0)), rest),
        |value: &str| Line::Font(value.trim_end()),
    )(input)
}

fn parse_message(input: &str) -> IResult<&str, Line<'_>> {
    map(
        preceded(pair(space0, char('>')), preceded(opt(char(' ')), rest)),
        Line::Message,
    )(input)
}

fn parse_comment(input: &str) -> IResult<&str, Line<'_>> {
    map(preceded(pair(space0, char('#')), rest), |_| Line::Comment)(input)
}

fn parse_blank(input: &str) -> IResult<&str, Line<'_>> {
    map(pair(space0, eof), |_| Line::Blank)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# birthday card
[english]
font = 'Varela Round', sans-serif
>
> Hey Z
>   keeps inner spacing

[zh]
> 嘿, Z
";

    #[test]
    fn test_parse_sections_and_messages() {
        let book = parse_script_book(SAMPLE).unwrap();
        assert_eq!(book.len(), 2);

        let english = book.profile(Language::English).unwrap();
        assert_eq!(english.font.as_deref(), Some("'Varela Round', sans-serif"));
        assert_eq!(
            english.script.messages(),
            &["".to_string(), "Hey Z".to_string(), "  keeps inner spacing".to_string()]
        );

        let mandarin = book.profile(Language::Mandarin).unwrap();
        assert_eq!(mandarin.font, None);
        assert_eq!(mandarin.script.get(0), Some("嘿, Z"));
    }

    #[test]
    fn test_message_before_section() {
        let err = parse_script_book("> hello\n[english]\n> hi\n").unwrap_err();
        assert_eq!(err, ScriptError::MessageOutsideSection { line: 1 });
    }

    #[test]
    fn test_font_after_messages_is_rejected() {
        let err = parse_script_book("[english]\n> hi\nfont = serif\n").unwrap_err();
        assert_eq!(err, ScriptError::MisplacedFont { line: 3 });
    }

    #[test]
    fn test_unknown_and_duplicate_sections() {
        let err = parse_script_book("[elvish]\n> mae govannen\n").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownSection {
                line: 1,
                name: "elvish".to_string()
            }
        );

        let err = parse_script_book("[english]\n> a\n[en]\n> b\n").unwrap_err();
        assert_eq!(err, ScriptError::DuplicateSection(Language::English));
    }

    #[test]
    fn test_empty_section_and_garbage() {
        let err = parse_script_book("[english]\n[mandarin]\n> hi\n").unwrap_err();
        assert_eq!(err, ScriptError::EmptySection(Language::English));

        let err = parse_script_book("[english]\nhello there\n").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 2, .. }));
    }
}
