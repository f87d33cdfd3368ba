/// Scripts, languages and the built-in birthday messages
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::book::ScriptError;

/// An ordered list of messages typed out in one sequencer run.
///
/// Blank entries are valid and only contribute their pauses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    messages: Vec<String>,
}

impl Script {
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.messages.get(index).map(String::as_str)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Index of the final message, the one that is never deleted
    pub fn last_index(&self) -> Option<usize> {
        self.messages.len().checked_sub(1)
    }
}

/// Which of the two scripts the viewer picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Primary language
    English,
    /// Secondary language
    Mandarin,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Mandarin];

    pub fn key(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Mandarin => "mandarin",
        }
    }

    /// Label shown on the selection button or prompt
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Mandarin => "中文",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Language {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" | "primary" => Ok(Language::English),
            "mandarin" | "zh" | "chinese" | "secondary" => Ok(Language::Mandarin),
            other => Err(ScriptError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Everything a host needs once a language is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub language: Language,
    /// CSS font-family value used by hosts that can change fonts
    pub font: Option<String>,
    pub script: Script,
}

/// The set of language profiles available to a host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBook {
    profiles: Vec<LanguageProfile>,
}

impl ScriptBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The English and Mandarin birthday scripts
    pub fn builtin() -> Self {
        let mut book = Self::new();
        book.insert(LanguageProfile {
            language: Language::English,
            font: Some(ENGLISH_FONT.to_string()),
            script: Script::new(ENGLISH_MESSAGES.iter().copied()),
        });
        book.insert(LanguageProfile {
            language: Language::Mandarin,
            font: Some(MANDARIN_FONT.to_string()),
            script: Script::new(MANDARIN_MESSAGES.iter().copied()),
        });
        book
    }

    /// Add a profile, replacing any existing one for the same language.
    /// Returns the replaced profile.
    pub fn insert(&mut self, profile: LanguageProfile) -> Option<LanguageProfile> {
        match self
            .profiles
            .iter_mut()
            .find(|existing| existing.language == profile.language)
        {
            Some(existing) => Some(std::mem::replace(existing, profile)),
            None => {
                self.profiles.push(profile);
                None
            }
        }
    }

    pub fn profile(&self, language: Language) -> Option<&LanguageProfile> {
        self.profiles.iter().find(|p| p.language == language)
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.profiles.iter().map(|p| p.language)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

const ENGLISH_FONT: &str = "'Varela Round', 'Amatic SC', 'Annie Use Your Telescope'";
const MANDARIN_FONT: &str = "'Chiron Hei HK', sans-serif";

const ENGLISH_MESSAGES: &[&str] = &[
    "",
    "Hey Z",
    "Forgive my attempt at creating a 3D scene",
    "I did my best",
    "For now I'll leave the 3D modelling to you :)",
    "But besides that",
    "I want to wish you a very happy birthday",
    "I know you don't really celebrate your birthday",
    "But I want to celebrate you",
    "You deserve it",
    "You are so smart, funny, caring, cute",
    "And you deserve all the love in the world",
    "You are so special it is crazy",
    "Genuinely, you have brightened up my world",
    "So thank you",
    "No matter what,I appreciate you",
    "I hope you have a incredible day",
    "And I hope you start celebrating yourself",
    "Because, my god, you deserve to be celebrated",
    "",
    "Happy Birthday, Z <3",
];

const MANDARIN_MESSAGES: &[&str] = &[
    "",
    "嘿, Z",
    "原谅我尝试创建3D场景",
    "我已经尽力了",
    "现在我把3D建模留给你 :)",
    "但除此之外",
    "我想祝你生日快乐",
    "我知道你不太庆祝生日",
    "但我想庆祝你",
    "你值得",
    "你是如此聪明、有趣、关心他人、可爱",
    "你值得世界上所有的爱",
    "你如此特别，这太疯狂了",
    "真的，你照亮了我的世界",
    "所以谢谢你",
    "无论如何，我感激你",
    "我希望你有一个美好的一天",
    "我希望你开始庆祝自己",
    "因为，天哪，你值得被庆祝",
    "",
    "生日快乐, Z <3",
];
