use serde::{Deserialize, Serialize};

use crate::source::Source;

/// A named subject whose images are being collected.
///
/// `name` is the canonical, hyphenated form (e.g. `rotom-frost`). Sources
/// whose naming scheme cannot be derived from it mechanically get an entry in
/// `overrides`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "SourceOverrides::is_empty")]
    pub overrides: SourceOverrides,
}

/// Per-source replacement search terms for an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOverrides {
    /// Article title stem, before the `_(Pokémon)` suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulbapedia: Option<String>,
    /// Gallery search term, with spaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zerochan: Option<String>,
    /// Tag-search tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danbooru: Option<String>,
}

impl SourceOverrides {
    pub fn is_empty(&self) -> bool {
        self.bulbapedia.is_none() && self.zerochan.is_none() && self.danbooru.is_none()
    }

    pub fn get(&self, source: Source) -> Option<&str> {
        match source {
            Source::Bulbapedia => self.bulbapedia.as_deref(),
            Source::Zerochan => self.zerochan.as_deref(),
            Source::Danbooru => self.danbooru.as_deref(),
        }
    }

    fn slot_mut(&mut self, source: Source) -> &mut Option<String> {
        match source {
            Source::Bulbapedia => &mut self.bulbapedia,
            Source::Zerochan => &mut self.zerochan,
            Source::Danbooru => &mut self.danbooru,
        }
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: SourceOverrides::default(),
        }
    }

    pub fn with_override(mut self, source: Source, term: impl Into<String>) -> Self {
        *self.overrides.slot_mut(source) = Some(term.into());
        self
    }

    /// The configured override for `source`, ignoring blank entries.
    pub fn override_for(&self, source: Source) -> Option<&str> {
        self.overrides
            .get(source)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Case-insensitive name comparison used for `--entity` filters.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Built-in entity list used when no configuration file provides one.
pub fn default_entities() -> Vec<Entity> {
    vec![
        Entity::new("clodsire"),
        Entity::new("rotom-mow")
            .with_override(Source::Bulbapedia, "Rotom")
            .with_override(Source::Zerochan, "Rotom (Mow Form)")
            .with_override(Source::Danbooru, "rotom_(mow)"),
        Entity::new("rotom-frost")
            .with_override(Source::Bulbapedia, "Rotom")
            .with_override(Source::Zerochan, "Rotom (Frost Form)")
            .with_override(Source::Danbooru, "rotom_(frost)"),
        Entity::new("blaziken-mega")
            .with_override(Source::Bulbapedia, "Blaziken")
            .with_override(Source::Zerochan, "Mega Blaziken")
            .with_override(Source::Danbooru, "mega_blaziken"),
        Entity::new("obstagoon"),
        Entity::new("meloetta-aria")
            .with_override(Source::Bulbapedia, "Meloetta")
            .with_override(Source::Zerochan, "Meloetta (Aria Forme)")
            .with_override(Source::Danbooru, "meloetta_(aria)"),
    ]
}
