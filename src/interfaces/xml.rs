use crate::domain::params::{ParamValue, ParameterSet};
use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("document has no root element")]
    NoRoot,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("text found outside the root element")]
    TextOutsideRoot,
    #[error("element `{0}` is never closed")]
    Unclosed(String),
}

/// Encodes parameters as a flat `<xml>` document, one element per key.
///
/// Text goes into CDATA; a literal `]]>` is split across two sections so the
/// value survives intact.
pub fn encode(params: &ParameterSet) -> String {
    let mut xml = String::from("<xml>");
    for (key, value) in params.iter() {
        match value {
            ParamValue::Text(text) => xml.push_str(&format!(
                "<{key}><![CDATA[{}]]></{key}>",
                text.replace("]]>", "]]]]><![CDATA[>")
            )),
            ParamValue::Integer(n) => xml.push_str(&format!("<{key}>{n}</{key}>")),
        }
    }
    xml.push_str("</xml>");
    xml
}

/// Decodes a flat document into a parameter set.
///
/// Each child of the root element becomes one text entry; self-closing
/// children map to empty strings. Anything below the first level is ignored.
/// Element text is kept verbatim, surrounding whitespace included, since the
/// gateway signs the raw value. Whitespace between elements is formatting.
pub fn decode(document: &str) -> Result<ParameterSet, XmlError> {
    let mut reader = Reader::from_str(document);

    let mut params = ParameterSet::new();
    let mut open: Vec<String> = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match open.len() {
                    0 if seen_root => return Err(XmlError::MultipleRoots),
                    0 => seen_root = true,
                    1 => current = Some((name.clone(), String::new())),
                    _ => {}
                }
                open.push(name);
            }
            Event::Empty(e) => match open.len() {
                0 if seen_root => return Err(XmlError::MultipleRoots),
                0 => seen_root = true,
                1 => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    params.insert(name, "");
                }
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape()?;
                match open.len() {
                    0 if !text.trim().is_empty() => return Err(XmlError::TextOutsideRoot),
                    2 => {
                        if let Some((_, value)) = current.as_mut() {
                            value.push_str(&text);
                        }
                    }
                    _ => {}
                }
            }
            Event::CData(c) => {
                if open.is_empty() {
                    return Err(XmlError::TextOutsideRoot);
                }
                if open.len() == 2
                    && let Some((_, value)) = current.as_mut()
                {
                    value.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if open.len() == 2
                    && let Some((key, value)) = current.take()
                {
                    params.insert(key, value);
                }
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.pop() {
        return Err(XmlError::Unclosed(name));
    }
    if !seen_root {
        return Err(XmlError::NoRoot);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wraps_text_in_cdata() {
        let mut params = ParameterSet::new();
        params.insert("body", "<b>book</b>");
        params.insert("total_fee", 100i64);

        assert_eq!(
            encode(&params),
            "<xml><body><![CDATA[<b>book</b>]]></body><total_fee>100</total_fee></xml>"
        );
    }

    #[test]
    fn test_cdata_terminator_survives() {
        let mut params = ParameterSet::new();
        params.insert("attach", "a]]>b");

        let decoded = decode(&encode(&params)).unwrap();
        assert_eq!(decoded.text("attach").as_deref(), Some("a]]>b"));
    }

    #[test]
    fn test_decode_gateway_response() {
        let body = r#"<xml>
            <charset><![CDATA[UTF-8]]></charset>
            <status><![CDATA[0]]></status>
            <token_id><![CDATA[934000685c54b40b23996d4e96fbe0ce]]></token_id>
            <version>2.0</version>
        </xml>"#;
        let params = decode(body).unwrap();

        assert_eq!(params.len(), 4);
        assert_eq!(params.text("status").as_deref(), Some("0"));
        assert_eq!(params.text("version").as_deref(), Some("2.0"));
        assert_eq!(
            params.text("token_id").as_deref(),
            Some("934000685c54b40b23996d4e96fbe0ce")
        );
    }

    #[test]
    fn test_decode_unescapes_entities_and_empty_elements() {
        let params = decode("<xml><message>a &amp; b</message><attach/></xml>").unwrap();

        assert_eq!(params.text("message").as_deref(), Some("a & b"));
        assert_eq!(params.text("attach").as_deref(), Some(""));
    }

    #[test]
    fn test_decode_keeps_whitespace_inside_values() {
        let body = "<?xml version=\"1.0\"?>\n<xml>\n  <attach> paid ok </attach>\n  <body><![CDATA[ book ]]></body>\n  <memo>  </memo>\n</xml>\n";
        let params = decode(body).unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params.text("attach").as_deref(), Some(" paid ok "));
        assert_eq!(params.text("body").as_deref(), Some(" book "));
        assert_eq!(params.text("memo").as_deref(), Some("  "));
    }

    #[test]
    fn test_decode_rejects_form_body() {
        assert!(decode("status=0&result_code=0").is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_document() {
        assert!(decode("<xml><status>0</status>").is_err());
        assert!(matches!(decode(""), Err(XmlError::NoRoot)));
    }
}
