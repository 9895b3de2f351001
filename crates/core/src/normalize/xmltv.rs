use roxmltree::{Document, Node, ParsingOptions};

use super::{parse_flexible_datetime, retain_well_ordered, FALLBACK_LANGUAGE};
use crate::error::NormalizeError;
use crate::types::Programme;

/// Parses an XMLTV document. A document without `programme` elements yields
/// no records.
pub fn parse(xml: &str, channel: &str, language: &str) -> Result<Vec<Programme>, NormalizeError> {
    // Feeds carry a `<!DOCTYPE tv SYSTEM "xmltv.dtd">` header.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;

    let mut programmes = Vec::new();
    for node in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("programme"))
    {
        let start = parse_flexible_datetime(required_attribute(&node, "start")?)?;
        let stop = parse_flexible_datetime(required_attribute(&node, "stop")?)?;
        let title =
            localized_child_text(&node, "title", language).ok_or(NormalizeError::MissingField("title"))?;
        let description = localized_child_text(&node, "desc", language).unwrap_or_default();

        programmes.push(Programme::new(channel, start, stop, &title, &description));
    }

    Ok(retain_well_ordered(programmes))
}

fn required_attribute<'a>(node: &Node<'a, '_>, name: &'static str) -> Result<&'a str, NormalizeError> {
    node.attribute(name).ok_or(NormalizeError::MissingField(name))
}

/// Text of the child element `name`, choosing among `lang` variants the local
/// one, then English, then the first. `None` when no such child exists.
fn localized_child_text(node: &Node<'_, '_>, name: &str, language: &str) -> Option<String> {
    let candidates: Vec<Node<'_, '_>> = node
        .children()
        .filter(|child| child.is_element() && child.has_tag_name(name))
        .collect();

    let by_lang = |lang: &str| {
        candidates
            .iter()
            .find(|c| c.attribute("lang") == Some(lang) && !text_of(c).trim().is_empty())
    };

    by_lang(language)
        .or_else(|| by_lang(FALLBACK_LANGUAGE))
        .or_else(|| candidates.first())
        .map(text_of)
}

fn text_of(node: &Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
