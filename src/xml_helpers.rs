//! quick-xml helpers shared by the OOXML readers (workbooks, documents, decks).

use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, BytesText};

/// UTF-8 attribute value with entities resolved. Works whether or not
/// quick-xml's `encoding` feature is enabled.
fn unescaped_value(attr: &Attribute) -> Option<String> {
    let raw = std::str::from_utf8(&attr.value).ok()?;
    unescape(raw).ok().map(|v| v.into_owned())
}

/// Extract a string attribute value by key, with entities resolved.
///
/// Returns `None` if the attribute is missing or malformed.
pub(crate) fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| unescaped_value(&attr))
}

/// Extract a prefixed attribute by its local name (`r:id` matches `id`, a
/// bare `id` does not).
pub(crate) fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == key)
        .and_then(|attr| unescaped_value(&attr))
}

/// Raw (still escaped) bytes of an attribute, for ASCII values like cell refs.
pub(crate) fn attr_bytes(e: &BytesStart, key: &[u8]) -> Option<Vec<u8>> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr.value.into_owned())
}

/// Text content with XML entities resolved; skips the unescape pass when the
/// text has no `&`.
pub(crate) fn text_of(text: &BytesText) -> String {
    let raw = text.as_ref();
    if raw.contains(&b'&') {
        text.unescape()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(raw).into_owned())
    } else {
        String::from_utf8_lossy(raw).into_owned()
    }
}
