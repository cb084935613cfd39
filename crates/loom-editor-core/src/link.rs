//! Navigation targets of anchors and redirect buttons.
//!
//! Anchors keep their target in `href`, verbatim. Buttons keep it inside an
//! executable `onclick` attribute; reading that back is a best-effort pattern
//! match over a handful of literal redirect forms and is lossy by nature:
//! computed URLs, template literals and anything else yield an empty target.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

use crate::platform::{RenderedSurface, SurfaceError};
use crate::selection::LinkKind;

const HREF: &str = "href";
const ONCLICK: &str = "onclick";

/// Payload handed to the URL prompt while it is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEditRequest {
    /// Current target, empty if none could be read.
    pub url: String,
    pub kind: LinkKind,
}

static REDIRECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:(?:window\.)?location(?:\.href)?\s*=\s*|location\.(?:assign|replace)\(\s*|window\.open\(\s*)(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
    )
    .unwrap()
});

/// Pull the redirect target out of a click handler.
///
/// Recognizes single- or double-quoted literals assigned to `location` /
/// `location.href`, or passed to `location.assign`, `location.replace` or
/// `window.open`. The first match wins.
pub fn extract_redirect_url(onclick: &str) -> Option<String> {
    let captures = REDIRECT_PATTERN.captures(onclick)?;
    let literal = captures.get(1).or_else(|| captures.get(2))?;
    Some(unescape_js(literal.as_str()))
}

/// Canonical click handler for a button that redirects to `url`.
pub fn redirect_expression(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    format!("window.location.href='{escaped}'")
}

fn unescape_js(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Read the element's navigation target. Never fails: a miss is `""`.
pub fn read_target<S: RenderedSurface>(surface: &S, node: &S::Node, kind: LinkKind) -> String {
    match kind {
        LinkKind::Anchor => surface.attribute(node, HREF).unwrap_or_default(),
        LinkKind::ButtonRedirect => {
            let Some(onclick) = surface.attribute(node, ONCLICK) else {
                return String::new();
            };
            extract_redirect_url(&onclick).unwrap_or_else(|| {
                tracing::debug!(%onclick, "no literal redirect target in click handler");
                String::new()
            })
        }
    }
}

/// Write the element's navigation target.
///
/// `url` is not validated; an empty anchor target clears navigation.
pub fn write_target<S: RenderedSurface>(
    surface: &mut S,
    node: &S::Node,
    kind: LinkKind,
    url: &str,
) -> Result<(), SurfaceError> {
    match kind {
        LinkKind::Anchor => surface.set_attribute(node, HREF, url),
        LinkKind::ButtonRedirect => surface.set_attribute(node, ONCLICK, &redirect_expression(url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    #[test]
    fn test_extract_single_quoted() {
        assert_eq!(
            extract_redirect_url("window.location.href='https://example.com'").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            extract_redirect_url("location = '/pricing'; return false;").as_deref(),
            Some("/pricing")
        );
    }

    #[test]
    fn test_extract_double_quoted_and_calls() {
        assert_eq!(
            extract_redirect_url(r#"location.href = "/docs""#).as_deref(),
            Some("/docs")
        );
        assert_eq!(
            extract_redirect_url("window.open('https://x.dev', '_blank')").as_deref(),
            Some("https://x.dev")
        );
        assert_eq!(
            extract_redirect_url("location.assign('/a')").as_deref(),
            Some("/a")
        );
    }

    #[test]
    fn test_extract_misses() {
        assert_eq!(extract_redirect_url("doSomething()"), None);
        assert_eq!(extract_redirect_url("location.href = `/t/${id}`"), None);
        assert_eq!(extract_redirect_url("location.href = base + '/x'"), None);
        assert_eq!(extract_redirect_url(""), None);
    }

    #[test]
    fn test_redirect_expression_escapes() {
        assert_eq!(
            redirect_expression("/it's"),
            r"window.location.href='/it\'s'"
        );
        let expr = redirect_expression(r"C:\path'");
        assert_eq!(extract_redirect_url(&expr).as_deref(), Some(r"C:\path'"));
    }

    #[test]
    fn test_read_anchor_target() {
        let surface = HeadlessSurface::from_document(
            "<body><a href=\"/x\">X</a><a>none</a></body>",
        );
        let anchors = surface.find_all("a");
        assert_eq!(read_target(&surface, &anchors[0], LinkKind::Anchor), "/x");
        assert_eq!(read_target(&surface, &anchors[1], LinkKind::Anchor), "");
    }

    #[test]
    fn test_read_button_target() {
        let surface = HeadlessSurface::from_document(
            "<body><button onclick=\"window.location.href='/buy'\">Buy</button><button onclick=\"track()\">T</button><button>N</button></body>",
        );
        let buttons = surface.find_all("button");
        assert_eq!(
            read_target(&surface, &buttons[0], LinkKind::ButtonRedirect),
            "/buy"
        );
        assert_eq!(read_target(&surface, &buttons[1], LinkKind::ButtonRedirect), "");
        assert_eq!(read_target(&surface, &buttons[2], LinkKind::ButtonRedirect), "");
    }

    #[test]
    fn test_write_targets() {
        let mut surface = HeadlessSurface::from_document(
            "<body><a href=\"/old\">Old</a><button>Go</button></body>",
        );
        let anchor = surface.find_first("a").unwrap();
        let button = surface.find_first("button").unwrap();

        write_target(&mut surface, &anchor, LinkKind::Anchor, "/new").unwrap();
        write_target(&mut surface, &button, LinkKind::ButtonRedirect, "/go").unwrap();

        assert_eq!(
            surface.serialize().unwrap(),
            "<body><a href=\"/new\">Old</a><button onclick=\"window.location.href='/go'\">Go</button></body>"
        );
        assert_eq!(
            read_target(&surface, &button, LinkKind::ButtonRedirect),
            "/go"
        );
    }
}
