//! fern markup parsing
//!
//! One construct per line: `# ` headers, `> ` navigation references, `- `
//! lists (two spaces of indent per nesting level), `@ ` media embeds,
//! indented runs as preformatted blocks, everything else a paragraph of
//! styled spans. Parsing never fails: a construct that does not match a
//! line form degrades to a paragraph, an unterminated span marker to plain
//! text.

use crate::model::{LineNode, ListItem, StyledText};

pub fn parse(src: &str) -> Vec<LineNode> {
    let mut nodes = Vec::new();
    let lines: Vec<&str> = src.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            nodes.push(LineNode::Header(rest.trim().to_string()));
            i += 1;
        } else if let Some(rest) = line.strip_prefix("> ") {
            nodes.push(LineNode::NavLink(rest.trim().to_string()));
            i += 1;
        } else if let Some(rest) = line.strip_prefix("@ ") {
            nodes.push(parse_embed(rest));
            i += 1;
        } else if line.starts_with("- ") {
            let mut entries = Vec::new();
            while i < lines.len() && is_list_line(lines[i]) {
                entries.push(list_entry(lines[i]));
                i += 1;
            }
            let mut index = 0;
            nodes.push(LineNode::List(build_list(&entries, &mut index, 0)));
        } else if starts_indented(line) {
            let indent = indent_width(line);
            let mut block_lines = Vec::new();
            while i < lines.len() && starts_indented(lines[i]) {
                block_lines.push(lines[i].to_string());
                i += 1;
            }
            nodes.push(LineNode::Block {
                lines: block_lines,
                indent,
            });
        } else {
            nodes.push(LineNode::Paragraph(parse_spans(line.trim_end())));
            i += 1;
        }
    }
    nodes
}

fn starts_indented(line: &str) -> bool {
    line.starts_with('\t') || line.starts_with("  ")
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|ch| *ch == ' ' || *ch == '\t').count()
}

fn is_list_line(line: &str) -> bool {
    line.trim_start().starts_with("- ")
}

fn list_entry(line: &str) -> (usize, Vec<StyledText>) {
    let spaces = line.chars().take_while(|ch| *ch == ' ').count();
    let text = line.trim_start();
    let text = text.strip_prefix("- ").unwrap_or(text);
    (spaces / 2, parse_spans(text.trim_end()))
}

fn build_list(
    entries: &[(usize, Vec<StyledText>)],
    index: &mut usize,
    depth: usize,
) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = Vec::new();
    while *index < entries.len() {
        let (entry_depth, value) = &entries[*index];
        if *entry_depth < depth {
            break;
        }
        if *entry_depth > depth {
            match items.last_mut() {
                Some(last) => {
                    let sublist = build_list(entries, index, *entry_depth);
                    match last.sublist.as_mut() {
                        Some(existing) => existing.extend(sublist),
                        None => last.sublist = Some(sublist),
                    }
                }
                None => {
                    // over-indented first item: clamp to this depth
                    items.push(ListItem {
                        value: value.clone(),
                        sublist: None,
                    });
                    *index += 1;
                }
            }
            continue;
        }
        items.push(ListItem {
            value: value.clone(),
            sublist: None,
        });
        *index += 1;
    }
    items
}

fn parse_embed(rest: &str) -> LineNode {
    let rest = rest.trim();
    match rest.split_once(char::is_whitespace) {
        Some((path, caption)) => LineNode::Embed {
            path: path.to_string(),
            caption: parse_spans(caption.trim()),
        },
        None => LineNode::Embed {
            path: rest.to_string(),
            caption: Vec::new(),
        },
    }
}

pub fn parse_spans(text: &str) -> Vec<StyledText> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;
    while i < text.len() {
        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        let styled = match ch {
            '*' => delimited(text, i, '*')
                .map(|(inner, next)| (StyledText::Bold(inner.to_string()), next)),
            '_' => delimited(text, i, '_')
                .map(|(inner, next)| (StyledText::Italic(inner.to_string()), next)),
            '`' => delimited(text, i, '`')
                .map(|(inner, next)| (StyledText::Mono(inner.to_string()), next)),
            '{' => delimited(text, i, '}').and_then(|(inner, next)| {
                let (target, label) = link_parts(inner);
                if target.is_empty() {
                    None
                } else {
                    Some((
                        StyledText::InternalLink {
                            text: label,
                            target,
                        },
                        next,
                    ))
                }
            }),
            '[' => delimited(text, i, ']').and_then(|(inner, next)| {
                let (url, label) = link_parts(inner);
                if url.is_empty() {
                    None
                } else {
                    Some((StyledText::ExternalLink { text: label, url }, next))
                }
            }),
            _ => None,
        };
        match styled {
            Some((span, next)) => {
                if !plain.is_empty() {
                    spans.push(StyledText::Plain(std::mem::take(&mut plain)));
                }
                spans.push(span);
                i = next;
            }
            None => {
                plain.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    if !plain.is_empty() {
        spans.push(StyledText::Plain(plain));
    }
    spans
}

/// Finds the text between the marker at `start` and the next `close`.
/// Returns `None` (degrade to plain) when unterminated or empty.
fn delimited(text: &str, start: usize, close: char) -> Option<(&str, usize)> {
    let inner_start = start + 1;
    let rel = text[inner_start..].find(close)?;
    if rel == 0 {
        return None;
    }
    let inner = &text[inner_start..inner_start + rel];
    Some((inner, inner_start + rel + close.len_utf8()))
}

fn link_parts(inner: &str) -> (String, String) {
    match inner.split_once('|') {
        Some((target, label)) => (target.trim().to_string(), label.trim().to_string()),
        None => (inner.trim().to_string(), String::new()),
    }
}
