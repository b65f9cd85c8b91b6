/// Image sources the harvester knows how to crawl.
///
/// This enum centralizes source identity (short names, display names,
/// filename prefixes and aliases) so the CLI, the orchestrator and the
/// download engine all agree on how a source is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Wiki-style encyclopedia (article page, then linked file pages).
    Bulbapedia,
    /// HTML image gallery with paged search results.
    Zerochan,
    /// Tag-search JSON API of an image board.
    Danbooru,
}

/// All sources in the order the orchestrator runs them.
const ALL_SOURCES: &[Source] = &[Source::Bulbapedia, Source::Zerochan, Source::Danbooru];

impl Source {
    /// Canonical short name used on the command line and in config files.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Bulbapedia => "bulbapedia",
            Self::Zerochan => "zerochan",
            Self::Danbooru => "danbooru",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bulbapedia => "Bulbapedia",
            Self::Zerochan => "Zerochan",
            Self::Danbooru => "Danbooru",
        }
    }

    /// Prefix for files written by the URL-hash naming scheme.
    pub fn file_prefix(&self) -> &'static str {
        self.short_name()
    }

    /// Alternative names accepted when parsing.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Bulbapedia => &["wiki", "bulba"],
            Self::Zerochan => &["gallery", "zc"],
            Self::Danbooru => &["booru", "api"],
        }
    }

    pub fn all() -> &'static [Source] {
        ALL_SOURCES
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Source`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown source: '{0}'")]
pub struct SourceParseError(pub String);

impl std::str::FromStr for Source {
    type Err = SourceParseError;

    /// Parse a source from its short name or any alias (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_SOURCES
            .iter()
            .copied()
            .find(|source| {
                source.short_name() == lower || source.aliases().iter().any(|a| *a == lower)
            })
            .ok_or_else(|| SourceParseError(s.to_string()))
    }
}

impl serde::Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> serde::Deserialize<'de> for Source {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_round_trip() {
        for &source in Source::all() {
            let parsed: Source = source.short_name().parse().unwrap();
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!("WIKI".parse::<Source>().unwrap(), Source::Bulbapedia);
        assert_eq!("Gallery".parse::<Source>().unwrap(), Source::Zerochan);
        assert_eq!(" booru ".parse::<Source>().unwrap(), Source::Danbooru);
    }

    #[test]
    fn unknown_source_is_an_error() {
        let err = "pixiv".parse::<Source>().unwrap_err();
        assert_eq!(err.to_string(), "unknown source: 'pixiv'");
    }
}
