//! Lenient HTML tokenizer feeding a `Tree`.
//!
//! Never fails. Unclosed elements are closed at end of input, stray end
//! tags are dropped, and text is stored exactly as written so that an
//! untouched document serializes back byte for byte (modulo attribute
//! quoting). No implied `html`/`head`/`body` elements are inserted.

use smol_str::SmolStr;

use super::tree::{NodeData, NodeId, Tree, decode_entities, is_raw_text, is_void};

/// Tags an open element of the same name implicitly closes.
const SELF_NESTING_CLOSERS: &[&str] = &["p", "li", "option", "dt", "dd", "tr", "td", "th"];

/// Parse `input` and append the resulting nodes under `parent`.
pub(crate) fn parse_into(tree: &mut Tree, parent: NodeId, input: &str) {
    let mut parser = Parser {
        input,
        pos: 0,
        root: parent,
        stack: Vec::new(),
    };
    parser.run(tree);
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    root: NodeId,
    /// Open elements below `root`, innermost last.
    stack: Vec<(NodeId, SmolStr)>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.stack.last().map_or(self.root, |(id, _)| *id)
    }

    fn run(&mut self, tree: &mut Tree) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment(tree);
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration(tree);
            } else if rest.starts_with("</") && starts_name(&rest[2..]) {
                self.end_tag();
            } else if rest.starts_with('<') && starts_name(&rest[1..]) {
                self.start_tag(tree);
            } else {
                self.text(tree);
            }
        }
    }

    fn text(&mut self, tree: &mut Tree) {
        let rest = self.rest();
        // A '<' that does not open markup is literal text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        tree.append(self.current(), NodeData::Text(rest[..end].to_string()));
        self.pos += end;
    }

    fn comment(&mut self, tree: &mut Tree) {
        let body_start = self.pos + 4;
        let (body, next) = match self.input[body_start..].find("-->") {
            Some(end) => (
                &self.input[body_start..body_start + end],
                body_start + end + 3,
            ),
            None => (&self.input[body_start..], self.input.len()),
        };
        tree.append(self.current(), NodeData::Comment(body.to_string()));
        self.pos = next;
    }

    fn declaration(&mut self, tree: &mut Tree) {
        let rest = self.rest();
        let end = rest.find('>').unwrap_or(rest.len());
        let inner = &rest[2..end];
        if let Some(name) = strip_prefix_ignore_case(inner, "doctype") {
            tree.append(self.current(), NodeData::Doctype(name.trim().to_string()));
        }
        self.pos += (end + 1).min(rest.len());
    }

    fn end_tag(&mut self) {
        let rest = self.rest();
        let name_len = name_len(&rest[2..]);
        let name = rest[2..2 + name_len].to_ascii_lowercase();
        let close = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        self.pos += close;

        // Pop to the nearest matching open element; ignore strays.
        if let Some(depth) = self.stack.iter().rposition(|(_, tag)| *tag == name) {
            self.stack.truncate(depth);
        }
    }

    fn start_tag(&mut self, tree: &mut Tree) {
        let after_lt = self.pos + 1;
        let name_len = name_len(&self.input[after_lt..]);
        let tag = SmolStr::new(self.input[after_lt..after_lt + name_len].to_ascii_lowercase());
        self.pos = after_lt + name_len;

        let (attrs, self_closing) = self.attributes();

        if SELF_NESTING_CLOSERS.contains(&tag.as_str())
            && self.stack.last().is_some_and(|(_, open)| *open == tag)
        {
            self.stack.pop();
        }

        let id = tree.append(
            self.current(),
            NodeData::Element {
                tag: tag.clone(),
                attrs,
            },
        );

        if is_void(&tag) || self_closing {
            return;
        }
        if is_raw_text(&tag) {
            self.raw_text(tree, id, &tag);
            return;
        }
        self.stack.push((id, tag));
    }

    fn raw_text(&mut self, tree: &mut Tree, element: NodeId, tag: &str) {
        let rest = self.rest();
        let closing = format!("</{tag}");
        let end = find_ignore_case(rest, &closing).unwrap_or(rest.len());
        if end > 0 {
            tree.append(element, NodeData::Text(rest[..end].to_string()));
        }
        self.pos += end;
        let rest = self.rest();
        if !rest.is_empty() {
            self.pos += rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        }
    }

    /// Parse attributes up to and including the closing `>`.
    fn attributes(&mut self) -> (Vec<(SmolStr, String)>, bool) {
        let mut attrs: Vec<(SmolStr, String)> = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                break;
            };
            match c {
                '>' => {
                    self.pos += 1;
                    break;
                }
                '/' => {
                    self.pos += 1;
                    self_closing = self.rest().starts_with('>');
                }
                _ => {
                    let len = rest
                        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
                        .unwrap_or(rest.len())
                        .max(c.len_utf8());
                    let name = SmolStr::new(rest[..len].to_ascii_lowercase());
                    self.pos += len;
                    self.skip_whitespace();

                    let value = if self.rest().starts_with('=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attribute_value()
                    } else {
                        String::new()
                    };

                    // First occurrence wins, as in browsers.
                    if !attrs.iter().any(|(k, _)| *k == name) {
                        attrs.push((name, value));
                    }
                }
            }
        }
        (attrs, self_closing)
    }

    fn attribute_value(&mut self) -> String {
        let rest = self.rest();
        let raw = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                self.pos += 1 + end + usize::from(end < body.len());
                &body[..end]
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        decode_entities(raw).into_owned()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }
}

fn starts_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn name_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(s.len())
}

fn strip_prefix_ignore_case<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    lower.find(needle)
}
