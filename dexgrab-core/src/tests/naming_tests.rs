use super::*;
use crate::entity::Entity;

const SAFETY: &str = "-rating:explicit -rating:questionable rating:safe";

#[test]
fn capitalize_lowercases_the_tail() {
    assert_eq!(capitalize("ROTOM_frost"), "Rotom_frost");
    assert_eq!(capitalize(""), "");
}

#[test]
fn bulbapedia_default_rule() {
    let entity = Entity::new("clodsire");
    assert_eq!(bulbapedia_search_term(&entity), "Clodsire_(Pokémon)");
}

#[test]
fn bulbapedia_form_uses_override() {
    let entity = Entity::new("rotom-frost").with_override(Source::Bulbapedia, "Rotom");
    assert_eq!(bulbapedia_search_term(&entity), "Rotom_(Pokémon)");
}

#[test]
fn bulbapedia_form_without_override_falls_back() {
    let entity = Entity::new("rotom-frost");
    assert_eq!(bulbapedia_search_term(&entity), "Rotom_frost_(Pokémon)");
}

#[test]
fn bulbapedia_article_url_is_percent_encoded() {
    let entity = Entity::new("obstagoon");
    assert_eq!(
        bulbapedia_article_url("https://bulbapedia.bulbagarden.net/", &entity),
        "https://bulbapedia.bulbagarden.net/wiki/Obstagoon_%28Pok%C3%A9mon%29"
    );
}

#[test]
fn zerochan_default_rule_capitalizes_words() {
    let entity = Entity::new("meloetta-aria");
    assert_eq!(zerochan_search_term(&entity), "Meloetta Aria");
}

#[test]
fn zerochan_url_uses_plus_for_spaces() {
    let entity = Entity::new("rotom-mow").with_override(Source::Zerochan, "Rotom (Mow Form)");
    assert_eq!(
        zerochan_search_url("https://www.zerochan.net", &entity, 2),
        "https://www.zerochan.net/Rotom+%28Mow+Form%29?p=2"
    );
}

#[test]
fn danbooru_tag_for_plain_name() {
    let entity = Entity::new("Obstagoon");
    let tag = danbooru_tag(&entity);
    assert_eq!(tag, "obstagoon");
    assert_eq!(
        danbooru_search_tags(&tag, SAFETY),
        "obstagoon -rating:explicit -rating:questionable rating:safe"
    );
}

#[test]
fn danbooru_tag_default_rule_uses_underscores() {
    assert_eq!(danbooru_tag(&Entity::new("Mr Mime-Galar")), "mr_mime_galar");
}

#[test]
fn danbooru_tag_override_is_verbatim() {
    let entity = Entity::new("blaziken-mega").with_override(Source::Danbooru, "mega_blaziken");
    assert_eq!(danbooru_tag(&entity), "mega_blaziken");
}

#[test]
fn danbooru_search_tags_without_filter() {
    assert_eq!(danbooru_search_tags("clodsire", ""), "clodsire");
}

#[test]
fn sanitize_replaces_invalid_characters() {
    assert_eq!(sanitize_filename("a<b>c:d"), "a_b_c_d");
    assert_eq!(sanitize_filename("what?*now"), "what_now");
}

#[test]
fn sanitize_trims_edges() {
    assert_eq!(sanitize_filename("  __rotom-frost__ "), "rotom-frost");
    assert_eq!(sanitize_filename("/slashes/"), "slashes");
}

#[test]
fn sanitize_is_idempotent() {
    let inputs = [
        "rotom-frost",
        "a__b",
        "a_ _b",
        "?leading",
        "trailing|",
        "x<>:\"/\\|?*y",
        " _ mixed _ ",
        "",
    ];
    for input in inputs {
        let once = sanitize_filename(input);
        assert_eq!(sanitize_filename(&once), once, "input: {input:?}");
    }
}

#[test]
fn entity_dir_name_is_sanitized() {
    assert_eq!(entity_dir_name(&Entity::new("type: null")), "type_ null");
}
