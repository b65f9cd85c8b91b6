//! Entity name → source-specific search terms and URLs.
//!
//! Every function here is a pure string transformation. Per-entity overrides
//! win; otherwise each source has a generic rule derived from the hyphenated
//! entity name.

use crate::entity::Entity;
use crate::source::Source;

/// Article title suffix used by the encyclopedia for species pages.
pub const BULBAPEDIA_TITLE_SUFFIX: &str = "_(Pokémon)";

/// Characters that are not allowed in file or directory names.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Article title for an entity, e.g. `clodsire` → `Clodsire_(Pokémon)`.
///
/// Alternate forms live on the base species page, so their overrides name
/// the species (`rotom-frost` → `Rotom_(Pokémon)`).
pub fn bulbapedia_search_term(entity: &Entity) -> String {
    let stem = match entity.override_for(Source::Bulbapedia) {
        Some(term) => term.replace(' ', "_"),
        None => capitalize(&entity.name.replace(['-', ' '], "_")),
    };
    format!("{stem}{BULBAPEDIA_TITLE_SUFFIX}")
}

/// Full article URL: `{base}/wiki/{percent-encoded title}`.
pub fn bulbapedia_article_url(base_url: &str, entity: &Entity) -> String {
    let term = bulbapedia_search_term(entity);
    format!(
        "{}/wiki/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&term)
    )
}

/// Gallery search term, e.g. `meloetta-aria` → `Meloetta Aria` unless overridden.
pub fn zerochan_search_term(entity: &Entity) -> String {
    if let Some(term) = entity.override_for(Source::Zerochan) {
        return term.to_string();
    }
    entity
        .name
        .split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gallery listing URL for a 1-based page, form-encoding the search term.
pub fn zerochan_search_url(base_url: &str, entity: &Entity, page: u32) -> String {
    let term = zerochan_search_term(entity);
    format!(
        "{}/{}?p={}",
        base_url.trim_end_matches('/'),
        form_encode(&term),
        page
    )
}

/// Tag-search tag: lower-case with hyphens and spaces as underscores.
pub fn danbooru_tag(entity: &Entity) -> String {
    match entity.override_for(Source::Danbooru) {
        Some(tag) => tag.to_string(),
        None => entity.name.to_lowercase().replace(['-', ' '], "_"),
    }
}

/// Combine a tag with the safety filter clause into the `tags` query value.
pub fn danbooru_search_tags(tag: &str, safety_filter: &str) -> String {
    format!("{} {}", tag, safety_filter).trim().to_string()
}

/// Replace characters that are invalid in filenames with `_`, collapse runs
/// of underscores and trim leading/trailing underscores and spaces.
///
/// Idempotent: sanitizing an already-sanitized name returns it unchanged.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches(|c| c == '_' || c == ' ').to_string()
}

/// Directory name for an entity under the output root.
pub fn entity_dir_name(entity: &Entity) -> String {
    sanitize_filename(&entity.name)
}

/// `application/x-www-form-urlencoded` style: percent-encode, spaces as `+`.
fn form_encode(term: &str) -> String {
    urlencoding::encode(term).replace("%20", "+")
}

#[cfg(test)]
#[path = "tests/naming_tests.rs"]
mod tests;
