#![forbid(unsafe_code)]

//! Markup parser.
//!
//! Builds nodes into a [`Document`] from an HTML-like source string. The
//! grammar is a pragmatic subset of HTML:
//!
//! - elements with `name`, `name=value`, `name="value"` and `name='value'`
//!   attributes; attribute names may carry the `v-` and `@` prefixes used by
//!   templates,
//! - void elements (`input`, `br`, `img`, ...) and `<tag/>` self-closing,
//! - raw-text elements (`script`, `style`, `textarea`) whose content is kept
//!   as a single text node,
//! - comments, and `<!DOCTYPE ..>` declarations (skipped),
//! - the common named character references and numeric references.
//!
//! Tag and attribute names are lowercased. Elements left open at end of
//! input are closed implicitly; a closing tag that does not match the
//! innermost open element is an error. End tags of void elements
//! (`</input>`, `</br>`) are ignored.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Truncated tag | `<div class="a"` at end of input | [`MarkupError::UnexpectedEof`] |
//! | Open comment | `<!--` without `-->` | [`MarkupError::UnterminatedComment`] |
//! | Open quote | `a="x` without closing quote | [`MarkupError::UnterminatedAttribute`] |
//! | Crossed tags | `<a><b></a>` | [`MarkupError::MismatchedClosingTag`] |
//! | Stray close | `</p>` with nothing open | [`MarkupError::UnexpectedClosingTag`] |
//!
//! Nodes created before an error stay in the document arena but the target
//! parent is left unchanged.

use crate::node::{Document, NodeId};

/// Errors from [`Document::parse`] and [`Document::set_inner_html`].
///
/// Offsets are byte positions into the source string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unexpected end of input inside a tag starting at byte {offset}")]
    UnexpectedEof { offset: usize },
    #[error("comment starting at byte {offset} is never closed")]
    UnterminatedComment { offset: usize },
    #[error("quoted value of attribute `{name}` starting at byte {offset} is never closed")]
    UnterminatedAttribute { name: String, offset: usize },
    #[error("closing tag `</{found}>` at byte {offset} does not match open `<{expected}>`")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        offset: usize,
    },
    #[error("closing tag `</{found}>` at byte {offset} has no open element")]
    UnexpectedClosingTag { found: String, offset: usize },
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Whether `tag` never has children or a closing tag.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Whether the content of `tag` is kept verbatim.
#[must_use]
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

impl Document {
    /// Parse `markup` into a new document whose root holds the top-level
    /// nodes.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let doc = Self::new();
        doc.append_markup(doc.root(), markup)?;
        Ok(doc)
    }

    /// Replace the children of `node` with the nodes parsed from `markup`.
    pub fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), MarkupError> {
        let fragment = self.parse_fragment(markup)?;
        self.clear_children(node);
        self.append_child(node, fragment);
        Ok(())
    }

    /// Parse `markup` and append the resulting nodes to `parent`.
    pub fn append_markup(&self, parent: NodeId, markup: &str) -> Result<(), MarkupError> {
        let fragment = self.parse_fragment(markup)?;
        self.append_child(parent, fragment);
        Ok(())
    }

    /// Parse `markup` into a detached fragment.
    pub fn parse_fragment(&self, markup: &str) -> Result<NodeId, MarkupError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("markup_parse", bytes = markup.len()).entered();

        let fragment = self.create_document_fragment();
        Parser {
            doc: self,
            src: markup,
            pos: 0,
            fragment,
            open: Vec::new(),
        }
        .run()?;
        Ok(fragment)
    }
}

struct Parser<'a> {
    doc: &'a Document,
    src: &'a str,
    pos: usize,
    fragment: NodeId,
    /// Open elements, innermost last.
    open: Vec<(NodeId, String)>,
}

fn starts_markup(tail: &str) -> bool {
    tail.starts_with("</")
        || tail.starts_with("<!")
        || (tail.starts_with('<') && tail[1..].starts_with(|c: char| c.is_ascii_alphabetic()))
}

impl<'a> Parser<'a> {
    fn run(mut self) -> Result<(), MarkupError> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment()?;
            } else if rest.starts_with("</") {
                self.closing_tag()?;
            } else if rest.starts_with("<!") {
                self.declaration()?;
            } else if starts_markup(rest) {
                self.opening_tag()?;
            } else {
                self.text();
            }
        }
        Ok(())
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.open.last().map_or(self.fragment, |(id, _)| *id)
    }

    fn append(&self, node: NodeId) {
        self.doc.append_child(self.current(), node);
    }

    fn text(&mut self) {
        let start = self.pos;
        let first = self.rest().chars().next().map_or(1, char::len_utf8);
        let mut end = self.src.len();
        let mut search = start + first;
        // A '<' that does not start markup is literal text.
        while let Some(offset) = self.src[search..].find('<') {
            let at = search + offset;
            if starts_markup(&self.src[at..]) {
                end = at;
                break;
            }
            search = at + 1;
        }
        self.pos = end;
        let node = self.doc.create_text_node(decode_entities(&self.src[start..end]));
        self.append(node);
    }

    fn comment(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        let body_start = start + "<!--".len();
        let Some(len) = self.src[body_start..].find("-->") else {
            return Err(MarkupError::UnterminatedComment { offset: start });
        };
        let node = self
            .doc
            .create_comment(&self.src[body_start..body_start + len]);
        self.append(node);
        self.pos = body_start + len + "-->".len();
        Ok(())
    }

    fn declaration(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        let Some(len) = self.rest().find('>') else {
            return Err(MarkupError::UnexpectedEof { offset: start });
        };
        self.pos += len + 1;
        Ok(())
    }

    fn closing_tag(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        let Some(len) = self.rest().find('>') else {
            return Err(MarkupError::UnexpectedEof { offset: start });
        };
        let found = self.src[start + 2..start + len].trim().to_ascii_lowercase();
        self.pos = start + len + 1;

        // Void elements were never pushed; their end tags are ignored.
        if is_void_element(&found) {
            return Ok(());
        }
        let Some((_, expected)) = self.open.last() else {
            return Err(MarkupError::UnexpectedClosingTag {
                found,
                offset: start,
            });
        };
        if *expected != found {
            return Err(MarkupError::MismatchedClosingTag {
                expected: expected.clone(),
                found,
                offset: start,
            });
        }
        self.open.pop();
        Ok(())
    }

    fn opening_tag(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
        let tag = tag.to_ascii_lowercase();
        let element = self.doc.create_element(&tag);

        let self_closing = loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(MarkupError::UnexpectedEof { offset: start });
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            self.attribute(element)?;
        };

        self.append(element);
        if self_closing || is_void_element(&tag) {
            return Ok(());
        }
        if is_raw_text_element(&tag) {
            return self.raw_text(element, &tag, start);
        }
        self.open.push((element, tag));
        Ok(())
    }

    fn attribute(&mut self, element: NodeId) -> Result<(), MarkupError> {
        let name = self
            .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            .to_ascii_lowercase();
        self.skip_whitespace();

        let value = if self.rest().starts_with('=') {
            self.pos += 1;
            self.skip_whitespace();
            let value_start = self.pos;
            match self.rest().chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = value_start + 1;
                    let Some(len) = self.src[body..].find(quote) else {
                        return Err(MarkupError::UnterminatedAttribute {
                            name,
                            offset: value_start,
                        });
                    };
                    self.pos = body + len + 1;
                    decode_entities(&self.src[body..body + len])
                }
                Some(_) => decode_entities(self.take_while(|c| !c.is_whitespace() && c != '>')),
                None => String::new(),
            }
        } else {
            String::new()
        };

        if !name.is_empty() && !self.doc.has_attribute(element, &name) {
            self.doc.set_attribute(element, &name, &value);
        }
        Ok(())
    }

    fn raw_text(&mut self, element: NodeId, tag: &str, start: usize) -> Result<(), MarkupError> {
        let close = format!("</{tag}");
        let body = self.pos;
        let lower = self.src[body..].to_ascii_lowercase();
        let Some(len) = lower.find(&close) else {
            return Err(MarkupError::UnexpectedEof { offset: start });
        };
        if len > 0 {
            let raw = &self.src[body..body + len];
            let text = if tag == "textarea" {
                decode_entities(raw)
            } else {
                raw.to_owned()
            };
            let node = self.doc.create_text_node(text);
            self.doc.append_child(element, node);
        }
        let after = body + len;
        let Some(end) = self.src[after..].find('>') else {
            return Err(MarkupError::UnexpectedEof { offset: after });
        };
        self.pos = after + end + 1;
        Ok(())
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !keep(c))
            .unwrap_or(self.src.len() - start);
        self.pos += len;
        &self.src[start..start + len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }
}

/// Decode character references. Unknown references are kept verbatim.
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    fn children_names(doc: &Document, id: NodeId) -> Vec<String> {
        doc.child_nodes(id)
            .into_iter()
            .map(|c| doc.node_name(c))
            .collect()
    }

    #[test]
    fn parses_nested_elements_and_text() {
        let doc = Document::parse("<div id=\"app\"><p>Hi <b>there</b></p></div>").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.get_attribute(div, "id").as_deref(), Some("app"));
        let p = doc.child_nodes(div)[0];
        assert_eq!(children_names(&doc, p), ["#text", "B"]);
        assert_eq!(doc.text_content(div), "Hi there");
    }

    #[test]
    fn keeps_whitespace_text_and_comments() {
        let doc = Document::parse("<ul>\n  <li>a</li>\n  <!-- c -->\n</ul>").unwrap();
        let ul = doc.child_nodes(doc.root())[0];
        assert_eq!(
            children_names(&doc, ul),
            ["#text", "LI", "#text", "#comment", "#text"]
        );
        let comment = doc.child_nodes(ul)[3];
        assert_eq!(doc.node_value(comment).as_deref(), Some(" c "));
    }

    #[test]
    fn template_attribute_prefixes_survive() {
        let doc =
            Document::parse("<input v-model=\"msg\" @input='onInput' disabled>").unwrap();
        let input = doc.child_nodes(doc.root())[0];
        let names: Vec<_> = doc.attributes(input).into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["v-model", "@input", "disabled"]);
        assert_eq!(doc.get_attribute(input, "disabled").as_deref(), Some(""));
        assert!(!doc.has_child_nodes(input));
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let doc = Document::parse("<p>a<br>b<span/>c</p>").unwrap();
        let p = doc.child_nodes(doc.root())[0];
        assert_eq!(
            children_names(&doc, p),
            ["#text", "BR", "#text", "SPAN", "#text"]
        );
    }

    #[test]
    fn unquoted_attribute_values() {
        let doc = Document::parse("<a href=/home class=nav>x</a>").unwrap();
        let a = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.get_attribute(a, "href").as_deref(), Some("/home"));
        assert_eq!(doc.get_attribute(a, "class").as_deref(), Some("nav"));
    }

    #[test]
    fn names_are_lowercased() {
        let doc = Document::parse("<DIV Class=\"x\"></div>").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.tag_name(div).as_deref(), Some("div"));
        assert!(doc.has_attribute(div, "class"));
    }

    #[test]
    fn first_duplicate_attribute_wins() {
        let doc = Document::parse("<i a=1 a=2></i>").unwrap();
        let i = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.get_attribute(i, "a").as_deref(), Some("1"));
    }

    #[test]
    fn entities_are_decoded() {
        let doc = Document::parse("<p title=\"a&amp;b\">1 &lt; 2 &#65;&#x42; &bogus;</p>").unwrap();
        let p = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.get_attribute(p, "title").as_deref(), Some("a&b"));
        assert_eq!(doc.text_content(p), "1 < 2 AB &bogus;");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let doc = Document::parse("<p>1 < 2 and 3 <= 4</p>").unwrap();
        let p = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.child_nodes(p).len(), 1);
        assert_eq!(doc.text_content(p), "1 < 2 and 3 <= 4");
    }

    #[test]
    fn interpolation_braces_are_plain_text() {
        let doc = Document::parse("<p>Hello {{ name }}</p>").unwrap();
        let p = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.text_content(p), "Hello {{ name }}");
    }

    #[test]
    fn raw_text_elements_keep_content() {
        let doc = Document::parse("<script>if (a < b) { x(); }</script><textarea>&lt;hi&gt;</textarea>")
            .unwrap();
        let nodes = doc.child_nodes(doc.root());
        assert_eq!(doc.text_content(nodes[0]), "if (a < b) { x(); }");
        assert_eq!(doc.text_content(nodes[1]), "<hi>");
    }

    #[test]
    fn doctype_is_skipped() {
        let doc = Document::parse("<!DOCTYPE html><html></html>").unwrap();
        assert_eq!(children_names(&doc, doc.root()), ["HTML"]);
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        let doc = Document::parse("<div><p>open").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        assert_eq!(doc.text_content(div), "open");
    }

    #[test]
    fn void_end_tags_are_ignored() {
        let doc = Document::parse("<div><input name=\"q\"></input><br></br>after</div></br>").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        assert_eq!(children_names(&doc, div), ["INPUT", "BR", "#text"]);
        assert_eq!(doc.text_content(div), "after");
        assert!(doc.child_nodes(doc.child_nodes(div)[0]).is_empty());
    }

    #[test]
    fn error_cases() {
        assert_eq!(
            Document::parse("<div class=\"a\"").unwrap_err(),
            MarkupError::UnexpectedEof { offset: 0 }
        );
        assert_eq!(
            Document::parse("ok<!-- never").unwrap_err(),
            MarkupError::UnterminatedComment { offset: 2 }
        );
        assert!(matches!(
            Document::parse("<a title=\"x>").unwrap_err(),
            MarkupError::UnterminatedAttribute { ref name, offset: 9 } if name == "title"
        ));
        assert_eq!(
            Document::parse("<a><b></a>").unwrap_err(),
            MarkupError::MismatchedClosingTag {
                expected: "b".into(),
                found: "a".into(),
                offset: 6
            }
        );
        assert_eq!(
            Document::parse("</p>").unwrap_err(),
            MarkupError::UnexpectedClosingTag {
                found: "p".into(),
                offset: 0
            }
        );
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let doc = Document::parse("<div id=\"app\"><span>old</span></div>").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        doc.set_inner_html(div, "<em>new</em>").unwrap();
        assert_eq!(children_names(&doc, div), ["EM"]);
        assert_eq!(doc.text_content(div), "new");
    }

    #[test]
    fn failed_inner_html_leaves_children() {
        let doc = Document::parse("<div><span>old</span></div>").unwrap();
        let div = doc.child_nodes(doc.root())[0];
        assert!(doc.set_inner_html(div, "<em>").is_ok());
        assert!(doc.set_inner_html(div, "</em>").is_err());
        assert_eq!(doc.node_type(doc.child_nodes(div)[0]), NodeType::Element);
    }
}
