//! Content Negotiation
//!
//! Parses response bodies into a [`ParsedResponse`] according to the declared
//! content type. JSON is assumed when no type is declared.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::HttpResponse;
use crate::error::{OAuth2Error, OAuth2Result, ParseCause};
use crate::types::{ContentFamily, ParsedResponse, JSON_CONTENT};

/// Content negotiator.
///
/// Stateless; one instance can be shared by any number of flows.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentNegotiator;

impl ContentNegotiator {
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTTP response by its `Content-Type` header.
    pub fn negotiate_response(&self, response: &HttpResponse) -> OAuth2Result<ParsedResponse> {
        self.negotiate(&response.body, response.content_type())
    }

    /// Parse `body` as the first family whose media type `content_type` contains.
    pub fn negotiate(&self, body: &[u8], content_type: Option<&str>) -> OAuth2Result<ParsedResponse> {
        let content_type = content_type.unwrap_or(JSON_CONTENT);
        let family = ContentFamily::detect(content_type).ok_or_else(|| {
            OAuth2Error::UnsupportedContentType {
                content_type: content_type.to_string(),
            }
        })?;

        let text = String::from_utf8_lossy(body);
        match family {
            ContentFamily::Json => self.parse_json(&text),
            ContentFamily::UrlEncoded => Ok(self.parse_url_encoded(&text)),
            ContentFamily::Xml => self.parse_xml(&text),
        }
    }

    /// Parse a single JSON object. Nested values are kept as they are.
    pub fn parse_json(&self, content: &str) -> OAuth2Result<ParsedResponse> {
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(content).map_err(|e| {
                tracing::error!(error = %e, "JSON parse error");
                OAuth2Error::parse(ContentFamily::Json, content, e)
            })?;

        Ok(ParsedResponse::new(
            ContentFamily::Json,
            object.into_iter().collect(),
        ))
    }

    /// Parse a URL-encoded form. The last value of a repeated key wins.
    pub fn parse_url_encoded(&self, content: &str) -> ParsedResponse {
        let values = url::form_urlencoded::parse(content.as_bytes())
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();

        ParsedResponse::new(ContentFamily::UrlEncoded, values)
    }

    /// Parse an XML document.
    ///
    /// Every element with at least one child node maps its tag name to the
    /// text content of its whole subtree. Tag names are not qualified by
    /// path: an element later in document order overwrites an earlier one
    /// with the same name, wherever it sits in the tree.
    pub fn parse_xml(&self, content: &str) -> OAuth2Result<ParsedResponse> {
        let values = collect_xml_elements(content).map_err(|e| {
            tracing::error!(error = %e, "XML parse error");
            OAuth2Error::parse(ContentFamily::Xml, content, e)
        })?;

        Ok(ParsedResponse::new(ContentFamily::Xml, values))
    }
}

struct OpenElement {
    name: String,
    order: usize,
    text: String,
    has_children: bool,
}

fn collect_xml_elements(content: &str) -> Result<HashMap<String, Value>, ParseCause> {
    // Whitespace is significant: it belongs to the text content.
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut collected: Vec<(usize, String, String)> = Vec::new();
    let mut next_order = 0;
    let mut seen_root = false;
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open_child(&mut stack, &mut seen_root)?;
                stack.push(OpenElement {
                    name: std::str::from_utf8(e.name().as_ref())?.to_string(),
                    order: next_order,
                    text: String::new(),
                    has_children: false,
                });
                next_order += 1;
            }
            Event::Empty(_) => {
                open_child(&mut stack, &mut seen_root)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or("unexpected closing tag")?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&element.text);
                }
                if element.has_children {
                    collected.push((element.order, element.name, element.text));
                }
            }
            Event::Text(e) => {
                let text = e.unescape_with(|name| {
                    entities
                        .get(name)
                        .map(String::as_str)
                        .or_else(|| predefined_entity(name))
                })?;
                append_text(&mut stack, &text)?;
            }
            Event::DocType(e) => {
                entities.extend(internal_entities(std::str::from_utf8(&e)?));
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                append_text(&mut stack, std::str::from_utf8(&bytes)?)?;
            }
            Event::Comment(_) | Event::PI(_) => {
                if let Some(open) = stack.last_mut() {
                    open.has_children = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name).into());
    }
    if !seen_root {
        return Err("document has no root element".into());
    }

    // Apply in document order so later duplicates overwrite earlier ones.
    collected.sort_by_key(|(order, _, _)| *order);
    Ok(collected
        .into_iter()
        .map(|(_, name, text)| (name, Value::String(text)))
        .collect())
}

fn predefined_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// General entities declared in a DOCTYPE internal subset.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are skipped;
/// replacement text is taken literally.
fn internal_entities(doctype: &str) -> Vec<(String, String)> {
    let mut entities = Vec::new();
    let mut rest = doctype;

    while let Some(start) = rest.find("<!ENTITY") {
        rest = rest[start + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(value_end) = rest[1..].find(quote) else {
            break;
        };
        if !name.is_empty() {
            entities.push((name.to_string(), rest[1..1 + value_end].to_string()));
        }
        rest = &rest[1 + value_end + 1..];
    }

    entities
}

fn open_child(stack: &mut [OpenElement], seen_root: &mut bool) -> Result<(), ParseCause> {
    match stack.last_mut() {
        Some(parent) => parent.has_children = true,
        None if *seen_root => return Err("more than one root element".into()),
        None => *seen_root = true,
    }
    Ok(())
}

fn append_text(stack: &mut [OpenElement], text: &str) -> Result<(), ParseCause> {
    match stack.last_mut() {
        Some(open) => {
            open.has_children = true;
            open.text.push_str(text);
        }
        None if text.trim().is_empty() => {}
        None => return Err("text outside of the root element".into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn negotiate(body: &str, content_type: Option<&str>) -> OAuth2Result<ParsedResponse> {
        ContentNegotiator::new().negotiate(body.as_bytes(), content_type)
    }

    #[test]
    fn test_same_fields_across_families() {
        let json = negotiate(
            r#"{"access_token":"abc","token_type":"Bearer","refresh_token":"r1"}"#,
            Some("application/json"),
        )
        .unwrap();
        let form = negotiate(
            "access_token=abc&token_type=Bearer&refresh_token=r1",
            Some("application/x-www-form-urlencoded"),
        )
        .unwrap();
        let xml = negotiate(
            "<response><access_token>abc</access_token><token_type>Bearer</token_type>\
             <refresh_token>r1</refresh_token></response>",
            Some("application/xml"),
        )
        .unwrap();

        for key in ["access_token", "token_type", "refresh_token"] {
            assert_eq!(json.get(key), form.get(key), "json vs form for {}", key);
            assert_eq!(json.get(key), xml.get(key), "json vs xml for {}", key);
        }
        assert_eq!(json.family(), ContentFamily::Json);
        assert_eq!(form.family(), ContentFamily::UrlEncoded);
        assert_eq!(xml.family(), ContentFamily::Xml);
    }

    #[test]
    fn test_missing_content_type_defaults_to_json() {
        let parsed = negotiate(r#"{"expires_in":3600}"#, None).unwrap();
        assert_eq!(parsed.family(), ContentFamily::Json);
        assert_eq!(parsed.get_i64("expires_in"), Some(3600));
    }

    #[test]
    fn test_unsupported_content_type() {
        match negotiate("access_token=abc", Some("text/plain")) {
            Err(OAuth2Error::UnsupportedContentType { content_type }) => {
                assert_eq!(content_type, "text/plain");
            }
            other => panic!("expected unsupported content type, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        match negotiate("{not json", Some("application/json;charset=UTF-8")) {
            Err(OAuth2Error::ParseError { family, body, .. }) => {
                assert_eq!(family, ContentFamily::Json);
                assert_eq!(family.as_str(), "json");
                assert_eq!(body, "{not json");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_must_be_an_object() {
        assert!(matches!(
            negotiate("[1, 2, 3]", None),
            Err(OAuth2Error::ParseError {
                family: ContentFamily::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_json_nested_values_pass_through() {
        let parsed = negotiate(r#"{"scope":["a","b"],"meta":{"k":1}}"#, None).unwrap();
        assert_eq!(parsed.get("scope"), Some(&json!(["a", "b"])));
        assert_eq!(parsed.get("meta"), Some(&json!({"k": 1})));
    }

    #[test]
    fn test_url_encoded_decoding_and_last_value_wins() {
        let parsed = negotiate(
            "scope=read+write&name=caf%C3%A9&scope=admin&flag",
            Some("application/x-www-form-urlencoded; charset=utf-8"),
        )
        .unwrap();

        assert_eq!(parsed.get_str("scope"), Some("admin".to_string()));
        assert_eq!(parsed.get_str("name"), Some("café".to_string()));
        assert_eq!(parsed.get_str("flag"), Some(String::new()));
    }

    #[test]
    fn test_xml_text_content_covers_subtree() {
        let parsed = negotiate(
            "<?xml version=\"1.0\"?><token><access_token>abc</access_token>\
             <info><a>1</a><b>2</b></info><empty/><blank></blank></token>",
            Some("application/xml"),
        )
        .unwrap();

        assert_eq!(parsed.get_str("access_token"), Some("abc".to_string()));
        assert_eq!(parsed.get_str("info"), Some("12".to_string()));
        assert_eq!(parsed.get_str("token"), Some("abc12".to_string()));
        assert!(!parsed.contains_key("empty"));
        assert!(!parsed.contains_key("blank"));
    }

    #[test]
    fn test_xml_unescapes_entities_and_cdata() {
        let parsed = negotiate(
            "<r><q>a &amp; b</q><c><![CDATA[x<y]]></c></r>",
            Some("application/xml"),
        )
        .unwrap();

        assert_eq!(parsed.get_str("q"), Some("a & b".to_string()));
        assert_eq!(parsed.get_str("c"), Some("x<y".to_string()));
    }

    // Known limitation: duplicate tag names are not disambiguated by path.
    #[test]
    fn test_xml_duplicate_tags_overwrite_in_document_order() {
        let parsed = negotiate(
            "<r><user><name>alice</name></user><client><name>app</name></client></r>",
            Some("application/xml"),
        )
        .unwrap();
        assert_eq!(parsed.get_str("name"), Some("app".to_string()));

        // A descendant comes after its ancestor, so it wins.
        let nested = negotiate("<a>outer <a>inner</a></a>", Some("application/xml")).unwrap();
        assert_eq!(nested.get_str("a"), Some("inner".to_string()));
    }

    #[test]
    fn test_xml_resolves_internal_entities() {
        let parsed = negotiate(
            "<!DOCTYPE r [<!ENTITY e \"v\"><!ENTITY % p 'skip'>]><r><a>&e; &amp; &e;</a></r>",
            Some("application/xml"),
        )
        .unwrap();

        assert_eq!(parsed.get_str("a"), Some("v & v".to_string()));
        assert!(matches!(
            negotiate("<r><a>&undeclared;</a></r>", Some("application/xml")),
            Err(OAuth2Error::ParseError {
                family: ContentFamily::Xml,
                ..
            })
        ));
    }

    #[test]
    fn test_internal_entities_skip_parameter_and_external() {
        let entities = internal_entities(
            r#"r [<!ENTITY % p "x"><!ENTITY ext SYSTEM "a.dtd"><!ENTITY name 'value'>]"#,
        );
        assert_eq!(entities, vec![("name".to_string(), "value".to_string())]);
    }

    #[test]
    fn test_invalid_xml_is_parse_error() {
        for body in ["<r><a>1</b></r>", "<r><a>1</a>", "", "just text"] {
            match negotiate(body, Some("application/xml")) {
                Err(OAuth2Error::ParseError { family, body: raw, .. }) => {
                    assert_eq!(family, ContentFamily::Xml);
                    assert_eq!(raw, body);
                }
                other => panic!("expected parse error for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_json_checked_before_xml() {
        let parsed = negotiate(r#"{"k":"v"}"#, Some("application/xml+application/json")).unwrap();
        assert_eq!(parsed.family(), ContentFamily::Json);
    }
}
