//! Release filename → display title.
//!
//! Removal is driven by an ordered table of vocabularies so new tags can be
//! added without touching the cleaning steps themselves.

use once_cell::sync::Lazy;
use regex::Regex;

/// One vocabulary of release tags to drop from a title
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagVocabulary {
    pub category: &'static str,
    /// Case-insensitive regex; matches are replaced with nothing
    pub pattern: &'static str,
}

/// Applied in order. Season/episode markers (S01E02) are intentionally absent.
pub const RELEASE_TAG_VOCABULARIES: &[TagVocabulary] = &[
    TagVocabulary {
        category: "resolution",
        pattern: r"\b(?:1080p|720p|2160p|4k|uhd|fhd|hd)\b",
    },
    TagVocabulary {
        category: "video_codec",
        pattern: r"\b(?:x264|x265|h264|h265|hevc|avc)\b",
    },
    TagVocabulary {
        category: "source",
        pattern: r"\b(?:bluray|web-dl|webrip|hdtv|bdrip|brrip|dvdrip)\b",
    },
    TagVocabulary {
        category: "audio_codec",
        pattern: r"\b(?:aac|ac3|eac3|dts|truehd|atmos|mp3|flac)\b",
    },
    TagVocabulary {
        category: "dynamic_range",
        pattern: r"\b(?:hdr|hdr10|dv|dolby|vision|10bit|8bit)\b",
    },
    // Dots are already spaces by the time this runs, so accept any run of either
    TagVocabulary {
        category: "channels",
        pattern: r"\b(?:5[\s.]+1|7[\s.]+1|2[\s.]+0)\b",
    },
];

/// Shortest title worth showing instead of the raw filename
pub const MIN_TITLE_CHARS: usize = 3;

static EXTENSION: Lazy<Regex> = Lazy::new(|| compile(r"\.[^/.]+$"));
static EMPTY_PARENS: Lazy<Regex> = Lazy::new(|| compile(r"\(\s*[-.]*\s*\)"));
static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| compile(r"\[\s*[-.]*\s*\]"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));
static GROUP_SUFFIX: Lazy<Regex> = Lazy::new(|| compile(r"(?i)-[a-z0-9]+$"));

static DEFAULT_SANITIZER: Lazy<TitleSanitizer> = Lazy::new(TitleSanitizer::default);

// Every pattern in this module is a literal checked by the tests below
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid title pattern {pattern}: {e}"))
}

/// Compiled, ordered removal table
#[derive(Debug, Clone)]
pub struct TitleSanitizer {
    rules: Vec<(&'static str, Regex)>,
}

impl Default for TitleSanitizer {
    fn default() -> Self {
        Self::from_vocabularies(RELEASE_TAG_VOCABULARIES)
            .expect("built-in release tag vocabularies compile")
    }
}

impl TitleSanitizer {
    /// Build a sanitizer from a custom vocabulary table
    pub fn from_vocabularies(vocabularies: &[TagVocabulary]) -> Result<Self, regex::Error> {
        let rules = vocabularies
            .iter()
            .map(|v| Ok((v.category, Regex::new(&format!("(?i){}", v.pattern))?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { rules })
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(category, _)| *category)
    }

    /// Turn a raw release filename into a presentable title.
    ///
    /// Falls back to `filename` untouched when cleaning would leave fewer than
    /// three characters.
    pub fn clean(&self, filename: &str) -> String {
        let mut name = EXTENSION.replace(filename, "").into_owned();
        name = name.replace(['.', '_'], " ");
        name = WHITESPACE.replace_all(&name, " ").into_owned();

        // Removing one tag can join the neighbours of another, or expose a
        // "-GROUP" tail, so repeat the whole pass until nothing changes
        loop {
            let next = self.strip_pass(&name);
            if next == name {
                break;
            }
            name = next;
        }

        if name.chars().count() < MIN_TITLE_CHARS {
            return filename.to_string();
        }

        name
    }

    fn strip_pass(&self, input: &str) -> String {
        let mut name = input.to_string();
        for (category, rule) in &self.rules {
            let replaced = rule.replace_all(&name, "");
            if replaced != name {
                tracing::trace!("Dropped {} tags from '{}'", category, name);
                name = replaced.into_owned();
            }
        }

        name = EMPTY_BRACKETS.replace_all(&name, "").into_owned();
        name = EMPTY_PARENS.replace_all(&name, "").into_owned();
        name = WHITESPACE.replace_all(&name, " ").into_owned();

        let trimmed = trim_separators(&name);
        let stripped = GROUP_SUFFIX.replace(trimmed, "");
        trim_separators(&stripped).to_string()
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '-' | '_'))
}

/// Clean a filename with the built-in vocabularies
pub fn clean_title(filename: &str) -> String {
    DEFAULT_SANITIZER.clean(filename)
}
