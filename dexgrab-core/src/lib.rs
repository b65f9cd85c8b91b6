pub mod entity;
pub mod naming;
pub mod source;

pub use entity::{Entity, SourceOverrides, default_entities};
pub use naming::{
    bulbapedia_article_url, bulbapedia_search_term, danbooru_search_tags, danbooru_tag,
    entity_dir_name, sanitize_filename, zerochan_search_term, zerochan_search_url,
};
pub use source::{Source, SourceParseError};
