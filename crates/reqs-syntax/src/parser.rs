//! Line-oriented requirements parser.
//!
//! Builds the arena tree in a single pass. The parser is deliberately
//! lenient: it never returns an error. Unparseable spans become `error`
//! leaves (with `has_error` propagated to their ancestors) and required
//! tokens that are absent become zero-width missing leaves, so downstream
//! analyses always get a complete tree.
//!
//! Grammar summary, per line:
//!
//! ```text
//! requirement : package extras? ('@' url)? version_spec? (';' marker)? req_opt*
//! global_opt  : flag ('=' | ws) (path | url | argument)?
//! comment     : '#' ... (line start or preceded by whitespace)
//! ```

use crate::tree::{Node, NodeData, Point, SyntaxKind, Tree, TreeData};
use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?").unwrap());
static VERSION_CMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(===|==|~=|!=|<=|>=|<|>|=)").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9*+!._-]+").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());
static FLAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^--?[A-Za-z][A-Za-z0-9-]*").unwrap());
static REQ_OPT_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s--").unwrap());

/// What a known option flag expects after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Path,
    Url,
    Argument,
}

/// Supported requirements-file options and their argument shape.
///
/// Mirrors pip's documented per-file option whitelist. Flags not listed here
/// parse to `error` nodes.
const KNOWN_FLAGS: &[(&str, bool, ValueKind)] = &[
    ("-i", true, ValueKind::Url),
    ("--index-url", true, ValueKind::Url),
    ("--extra-index-url", true, ValueKind::Url),
    ("--no-index", false, ValueKind::Argument),
    ("-c", true, ValueKind::Path),
    ("--constraint", true, ValueKind::Path),
    ("-r", true, ValueKind::Path),
    ("--requirement", true, ValueKind::Path),
    ("-e", true, ValueKind::Path),
    ("--editable", true, ValueKind::Path),
    ("-f", true, ValueKind::Path),
    ("--find-links", true, ValueKind::Path),
    ("--no-binary", true, ValueKind::Argument),
    ("--only-binary", true, ValueKind::Argument),
    ("--prefer-binary", false, ValueKind::Argument),
    ("--require-hashes", false, ValueKind::Argument),
    ("--pre", false, ValueKind::Argument),
    ("--trusted-host", true, ValueKind::Argument),
    ("--use-feature", true, ValueKind::Argument),
    ("--global-option", true, ValueKind::Argument),
    ("--config-settings", true, ValueKind::Argument),
    ("--hash", true, ValueKind::Argument),
];

fn flag_spec(flag: &str) -> Option<(bool, ValueKind)> {
    KNOWN_FLAGS
        .iter()
        .find(|(name, _, _)| *name == flag)
        .map(|&(_, takes_value, kind)| (takes_value, kind))
}

struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: SyntaxKind::File,
                start_byte: 0,
                end_byte: 0,
                start: Point::default(),
                end: Point::default(),
                parent: None,
                children: Vec::new(),
                is_missing: false,
                has_error: false,
            }],
        }
    }

    fn push(
        &mut self,
        parent: u32,
        kind: SyntaxKind,
        start_byte: usize,
        end_byte: usize,
        start: Point,
        end: Point,
    ) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(NodeData {
            kind,
            start_byte,
            end_byte,
            start,
            end,
            parent: Some(parent),
            children: Vec::new(),
            is_missing: false,
            has_error: kind == SyntaxKind::Error,
        });
        self.nodes[parent as usize].children.push(id);
        id
    }

    /// Zero-width placeholder for a token the grammar requires but the
    /// source does not contain.
    fn push_missing(&mut self, parent: u32, kind: SyntaxKind, at_byte: usize, at: Point) -> u32 {
        let id = self.push(parent, kind, at_byte, at_byte, at, at);
        self.nodes[id as usize].is_missing = true;
        id
    }

    /// Grow every ancestor span so parents always cover their children.
    fn extend_to_cover(&mut self, id: u32) {
        let (start_byte, end_byte, start, end) = {
            let n = &self.nodes[id as usize];
            (n.start_byte, n.end_byte, n.start, n.end)
        };
        let mut cursor = self.nodes[id as usize].parent;
        while let Some(pid) = cursor {
            let p = &mut self.nodes[pid as usize];
            if start_byte < p.start_byte {
                p.start_byte = start_byte;
                p.start = start;
            }
            if end_byte > p.end_byte {
                p.end_byte = end_byte;
                p.end = end;
            }
            cursor = p.parent;
        }
    }

    fn finish(mut self, source: String) -> Tree {
        // Root spans the whole document.
        let end = end_point_of(&source);
        {
            let root = &mut self.nodes[0];
            root.end_byte = source.len();
            root.end = end;
        }

        // Propagate has_error from error leaves to every ancestor.
        let error_ids: Vec<u32> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.has_error)
            .map(|(i, _)| i as u32)
            .collect();
        for id in error_ids {
            let mut cursor = self.nodes[id as usize].parent;
            while let Some(pid) = cursor {
                let p = &mut self.nodes[pid as usize];
                if p.has_error {
                    break;
                }
                p.has_error = true;
                cursor = p.parent;
            }
        }

        Tree::new(TreeData {
            source,
            nodes: self.nodes,
        })
    }
}

fn end_point_of(source: &str) -> Point {
    let line = source.matches('\n').count() as u32;
    let tail_start = source.rfind('\n').map_or(0, |i| i + 1);
    Point::new(line, utf16_len(&source[tail_start..]))
}

fn utf16_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Byte offsets within a line, converted lazily to UTF-16 columns.
struct LineCtx<'a> {
    line: &'a str,
    index: u32,
    offset: usize,
}

impl LineCtx<'_> {
    fn point(&self, byte_in_line: usize) -> Point {
        Point::new(self.index, utf16_len(&self.line[..byte_in_line]))
    }

    fn abs(&self, byte_in_line: usize) -> usize {
        self.offset + byte_in_line
    }
}

/// Parses requirements source into a [`Tree`].
///
/// Never fails: syntax problems surface as `error`/missing nodes inside the
/// tree rather than as a `Result`.
pub fn parse(source: &str) -> Tree {
    let mut builder = TreeBuilder::new();
    let mut offset = 0usize;
    let mut index = 0u32;

    for raw_line in source.split('\n') {
        // Tolerate CRLF input; the \r never becomes part of a token.
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let ctx = LineCtx {
            line,
            index,
            offset,
        };
        parse_line(&mut builder, &ctx);
        offset += raw_line.len() + 1;
        index += 1;
    }

    let tree = builder.finish(source.to_string());
    tracing::trace!(bytes = source.len(), "parsed requirements source");
    tree
}

fn parse_line(builder: &mut TreeBuilder, ctx: &LineCtx<'_>) {
    let line = ctx.line;

    let comment_start = find_comment_start(line);
    let code = &line[..comment_start.unwrap_or(line.len())];
    let start = code.len() - code.trim_start().len();
    let end = code.trim_end().len();

    if start < end {
        if code[start..].starts_with('-') {
            parse_option_segment(builder, 0, ctx, start, end);
        } else {
            parse_requirement(builder, ctx, start, end);
        }
    }

    // The comment node follows the code it trails, keeping document order.
    if let Some(at) = comment_start {
        builder.push(
            0,
            SyntaxKind::Comment,
            ctx.abs(at),
            ctx.abs(line.len()),
            ctx.point(at),
            ctx.point(line.len()),
        );
    }
}

/// A `#` begins a comment at line start or when preceded by whitespace, so
/// URL fragments like `#egg=name` stay part of their token.
fn find_comment_start(line: &str) -> Option<usize> {
    let mut prev_is_ws = true;
    for (i, c) in line.char_indices() {
        if c == '#' && prev_is_ws {
            return Some(i);
        }
        prev_is_ws = c.is_whitespace();
    }
    None
}

/// Parses one option (`flag [value]`) covering `seg_start..seg_end` of the
/// line, attaching a `global_opt` node to `parent`.
fn parse_option_segment(
    builder: &mut TreeBuilder,
    parent: u32,
    ctx: &LineCtx<'_>,
    seg_start: usize,
    seg_end: usize,
) {
    let seg = &ctx.line[seg_start..seg_end];
    let opt = builder.push(
        parent,
        SyntaxKind::GlobalOpt,
        ctx.abs(seg_start),
        ctx.abs(seg_end),
        ctx.point(seg_start),
        ctx.point(seg_end),
    );

    let Some(m) = FLAG_RE.find(seg) else {
        builder.push(
            opt,
            SyntaxKind::Error,
            ctx.abs(seg_start),
            ctx.abs(seg_end),
            ctx.point(seg_start),
            ctx.point(seg_end),
        );
        return;
    };
    let flag = m.as_str();
    let flag_end = seg_start + m.end();

    let Some((takes_value, value_kind)) = flag_spec(flag) else {
        // Unknown flag: the whole segment is unparseable.
        builder.push(
            opt,
            SyntaxKind::Error,
            ctx.abs(seg_start),
            ctx.abs(seg_end),
            ctx.point(seg_start),
            ctx.point(seg_end),
        );
        return;
    };

    builder.push(
        opt,
        SyntaxKind::OptionFlag,
        ctx.abs(seg_start),
        ctx.abs(flag_end),
        ctx.point(seg_start),
        ctx.point(flag_end),
    );

    // Value separator is either `=` or whitespace.
    let rest = &ctx.line[flag_end..seg_end];
    let sep = rest
        .strip_prefix('=')
        .map_or_else(|| rest.trim_start(), |r| r.trim_start());
    let value_start = seg_end - sep.len();
    let value = sep.trim_end();
    let value_end = value_start + value.len();

    if value.is_empty() {
        if takes_value {
            let missing_kind = match value_kind {
                ValueKind::Path => SyntaxKind::Path,
                ValueKind::Url => SyntaxKind::Url,
                ValueKind::Argument => SyntaxKind::Argument,
            };
            builder.push_missing(opt, missing_kind, ctx.abs(seg_end), ctx.point(seg_end));
        }
        return;
    }

    if !takes_value {
        builder.push(
            opt,
            SyntaxKind::Error,
            ctx.abs(value_start),
            ctx.abs(value_end),
            ctx.point(value_start),
            ctx.point(value_end),
        );
        return;
    }

    let kind = if URL_RE.is_match(value) {
        SyntaxKind::Url
    } else {
        match value_kind {
            ValueKind::Path => SyntaxKind::Path,
            ValueKind::Url => SyntaxKind::Url,
            ValueKind::Argument => SyntaxKind::Argument,
        }
    };
    builder.push(
        opt,
        kind,
        ctx.abs(value_start),
        ctx.abs(value_end),
        ctx.point(value_start),
        ctx.point(value_end),
    );
}

fn parse_requirement(builder: &mut TreeBuilder, ctx: &LineCtx<'_>, seg_start: usize, seg_end: usize) {
    let seg = &ctx.line[seg_start..seg_end];
    let req = builder.push(
        0,
        SyntaxKind::Requirement,
        ctx.abs(seg_start),
        ctx.abs(seg_end),
        ctx.point(seg_start),
        ctx.point(seg_end),
    );

    // Bare URL requirement: the whole entry is the URL.
    if URL_RE.is_match(seg) {
        builder.push(
            req,
            SyntaxKind::Url,
            ctx.abs(seg_start),
            ctx.abs(seg_end),
            ctx.point(seg_start),
            ctx.point(seg_end),
        );
        return;
    }

    let Some(m) = PACKAGE_RE.find(seg) else {
        builder.push(
            req,
            SyntaxKind::Error,
            ctx.abs(seg_start),
            ctx.abs(seg_end),
            ctx.point(seg_start),
            ctx.point(seg_end),
        );
        return;
    };
    builder.push(
        req,
        SyntaxKind::Package,
        ctx.abs(seg_start),
        ctx.abs(seg_start + m.end()),
        ctx.point(seg_start),
        ctx.point(seg_start + m.end()),
    );

    // Cursor into the line, relative to line start.
    let mut pos = seg_start + m.end();
    pos = skip_ws(ctx.line, pos, seg_end);

    // Extras: `[extra1,extra2]`, kept as one token.
    if ctx.line[pos..seg_end].starts_with('[') {
        match ctx.line[pos..seg_end].find(']') {
            Some(close) => {
                let end = pos + close + 1;
                builder.push(
                    req,
                    SyntaxKind::Extras,
                    ctx.abs(pos),
                    ctx.abs(end),
                    ctx.point(pos),
                    ctx.point(end),
                );
                pos = skip_ws(ctx.line, end, seg_end);
            }
            None => {
                builder.push(
                    req,
                    SyntaxKind::Error,
                    ctx.abs(pos),
                    ctx.abs(seg_end),
                    ctx.point(pos),
                    ctx.point(seg_end),
                );
                return;
            }
        }
    }

    // Direct reference: `name @ <url>`.
    if ctx.line[pos..seg_end].starts_with('@') {
        pos = skip_ws(ctx.line, pos + 1, seg_end);
        let url_end = ctx.line[pos..seg_end]
            .find(';')
            .map_or(seg_end, |i| pos + i);
        let trimmed_end = pos + ctx.line[pos..url_end].trim_end().len();
        builder.push(
            req,
            SyntaxKind::Url,
            ctx.abs(pos),
            ctx.abs(trimmed_end),
            ctx.point(pos),
            ctx.point(trimmed_end),
        );
        pos = skip_ws(ctx.line, url_end, seg_end);
    }

    if VERSION_CMP_RE.is_match(&ctx.line[pos..seg_end]) {
        pos = parse_version_spec(builder, req, ctx, pos, seg_end);
    }

    pos = skip_ws(ctx.line, pos, seg_end);

    if ctx.line[pos..seg_end].starts_with(';') {
        let marker_start = skip_ws(ctx.line, pos + 1, seg_end);
        // Per-requirement options may follow the marker expression.
        let marker_end = REQ_OPT_BOUNDARY_RE
            .find(&ctx.line[marker_start..seg_end])
            .map_or(seg_end, |m| marker_start + m.start());
        let trimmed_end = marker_start + ctx.line[marker_start..marker_end].trim_end().len();
        if trimmed_end > marker_start {
            builder.push(
                req,
                SyntaxKind::Marker,
                ctx.abs(marker_start),
                ctx.abs(trimmed_end),
                ctx.point(marker_start),
                ctx.point(trimmed_end),
            );
        } else {
            builder.push_missing(req, SyntaxKind::Marker, ctx.abs(marker_start), ctx.point(marker_start));
        }
        pos = skip_ws(ctx.line, marker_end, seg_end);
    }

    // Per-requirement options (`--hash=...`, `--global-option=...`).
    while pos < seg_end && ctx.line[pos..seg_end].starts_with('-') {
        let opt_end = REQ_OPT_BOUNDARY_RE
            .find(&ctx.line[pos + 1..seg_end])
            .map_or(seg_end, |m| pos + 1 + m.start());
        let trimmed_end = pos + ctx.line[pos..opt_end].trim_end().len();
        parse_option_segment(builder, req, ctx, pos, trimmed_end);
        pos = skip_ws(ctx.line, opt_end, seg_end);
    }

    if pos < seg_end {
        builder.push(
            req,
            SyntaxKind::Error,
            ctx.abs(pos),
            ctx.abs(seg_end),
            ctx.point(pos),
            ctx.point(seg_end),
        );
    }
}

/// Parses `>=1.0,<2.0`-style specifier lists. Returns the line position
/// after the last consumed token.
fn parse_version_spec(
    builder: &mut TreeBuilder,
    req: u32,
    ctx: &LineCtx<'_>,
    spec_start: usize,
    seg_end: usize,
) -> usize {
    let spec = builder.push(
        req,
        SyntaxKind::VersionSpec,
        ctx.abs(spec_start),
        ctx.abs(spec_start),
        ctx.point(spec_start),
        ctx.point(spec_start),
    );
    let mut pos = spec_start;

    loop {
        let Some(cmp) = VERSION_CMP_RE.find(&ctx.line[pos..seg_end]) else {
            // Dangling comma or stray token inside the specifier list.
            let junk_end = ctx.line[pos..seg_end]
                .find([';', ' '])
                .map_or(seg_end, |i| pos + i);
            if junk_end > pos {
                let id = builder.push(
                    spec,
                    SyntaxKind::Error,
                    ctx.abs(pos),
                    ctx.abs(junk_end),
                    ctx.point(pos),
                    ctx.point(junk_end),
                );
                builder.extend_to_cover(id);
                pos = junk_end;
            } else {
                let id = builder.push_missing(spec, SyntaxKind::VersionCmp, ctx.abs(pos), ctx.point(pos));
                builder.extend_to_cover(id);
            }
            break;
        };

        let cmp_end = pos + cmp.end();
        let id = builder.push(
            spec,
            SyntaxKind::VersionCmp,
            ctx.abs(pos),
            ctx.abs(cmp_end),
            ctx.point(pos),
            ctx.point(cmp_end),
        );
        builder.extend_to_cover(id);
        pos = skip_ws(ctx.line, cmp_end, seg_end);

        match VERSION_RE.find(&ctx.line[pos..seg_end]) {
            Some(v) => {
                let v_end = pos + v.end();
                let id = builder.push(
                    spec,
                    SyntaxKind::Version,
                    ctx.abs(pos),
                    ctx.abs(v_end),
                    ctx.point(pos),
                    ctx.point(v_end),
                );
                builder.extend_to_cover(id);
                pos = v_end;
            }
            None => {
                let id = builder.push_missing(spec, SyntaxKind::Version, ctx.abs(pos), ctx.point(pos));
                builder.extend_to_cover(id);
                break;
            }
        }

        let after = skip_ws(ctx.line, pos, seg_end);
        if ctx.line[after..seg_end].starts_with(',') {
            pos = skip_ws(ctx.line, after + 1, seg_end);
        } else {
            break;
        }
    }

    pos
}

fn skip_ws(line: &str, mut pos: usize, end: usize) -> usize {
    while pos < end && line.as_bytes()[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Convenience for tests and tools: all nodes in pre-order.
pub fn preorder(root: &Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        out.push(node.clone());
        for child in node.children().into_iter().rev() {
            stack.push(child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SyntaxKind;

    fn kinds(source: &str) -> Vec<(SyntaxKind, String)> {
        let tree = parse(source);
        preorder(&tree.root())
            .into_iter()
            .map(|n| (n.kind(), n.text().to_string()))
            .collect()
    }

    #[test]
    fn test_parse_plain_package() {
        let tree = parse("requests\n");
        let req = tree.root().child(0).unwrap();
        assert_eq!(req.kind(), SyntaxKind::Requirement);
        let pkg = req.child(0).unwrap();
        assert_eq!(pkg.kind(), SyntaxKind::Package);
        assert_eq!(pkg.text(), "requests");
        assert!(!tree.root().has_error());
    }

    #[test]
    fn test_parse_versioned_requirement() {
        let tree = parse("flask>=2.0,<3.0\n");
        let req = tree.root().child(0).unwrap();
        let spec = req.child(1).unwrap();
        assert_eq!(spec.kind(), SyntaxKind::VersionSpec);
        assert_eq!(spec.text(), ">=2.0,<3.0");
        let parts: Vec<_> = spec.children().iter().map(|n| n.text().to_string()).collect();
        assert_eq!(parts, vec![">=", "2.0", "<", "3.0"]);
    }

    #[test]
    fn test_parse_extras_and_marker() {
        let tree = parse("uvicorn[standard]==0.30.0; python_version >= '3.9'\n");
        let req = tree.root().child(0).unwrap();
        let kinds: Vec<_> = req.children().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Package,
                SyntaxKind::Extras,
                SyntaxKind::VersionSpec,
                SyntaxKind::Marker
            ]
        );
        assert_eq!(req.child(1).unwrap().text(), "[standard]");
        assert_eq!(req.child(3).unwrap().text(), "python_version >= '3.9'");
    }

    #[test]
    fn test_parse_requirement_option_line() {
        let tree = parse("-r base.txt\n");
        let opt = tree.root().child(0).unwrap();
        assert_eq!(opt.kind(), SyntaxKind::GlobalOpt);
        assert_eq!(opt.child(0).unwrap().kind(), SyntaxKind::OptionFlag);
        assert_eq!(opt.child(0).unwrap().text(), "-r");
        let path = opt.child(1).unwrap();
        assert_eq!(path.kind(), SyntaxKind::Path);
        assert_eq!(path.text(), "base.txt");
    }

    #[test]
    fn test_parse_index_url_with_equals() {
        let tree = parse("--index-url=https://example.org/simple\n");
        let opt = tree.root().child(0).unwrap();
        let url = opt.child(1).unwrap();
        assert_eq!(url.kind(), SyntaxKind::Url);
        assert_eq!(url.text(), "https://example.org/simple");
    }

    #[test]
    fn test_editable_path() {
        let tree = parse("-e ./src/mypkg\n");
        let opt = tree.root().child(0).unwrap();
        let path = opt.child(1).unwrap();
        assert_eq!(path.kind(), SyntaxKind::Path);
        assert_eq!(path.text(), "./src/mypkg");
    }

    #[test]
    fn test_find_links_url_value_classified_as_url() {
        let tree = parse("-f https://example.org/wheels\n");
        let opt = tree.root().child(0).unwrap();
        assert_eq!(opt.child(1).unwrap().kind(), SyntaxKind::Url);
    }

    #[test]
    fn test_missing_option_argument() {
        let tree = parse("-r\n");
        let opt = tree.root().child(0).unwrap();
        let missing = opt.child(1).unwrap();
        assert_eq!(missing.kind(), SyntaxKind::Path);
        assert!(missing.is_missing());
        assert_eq!(missing.text(), "");
        assert_eq!(missing.start_point(), missing.end_point());
    }

    #[test]
    fn test_missing_version_after_cmp() {
        let tree = parse("flask==\n");
        let spec = tree.root().child(0).unwrap().child(1).unwrap();
        let version = spec.child(1).unwrap();
        assert_eq!(version.kind(), SyntaxKind::Version);
        assert!(version.is_missing());
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let tree = parse("--bogus-flag value\n");
        assert!(tree.root().has_error());
        let opt = tree.root().child(0).unwrap();
        assert!(opt.has_error());
        let err = opt.child(0).unwrap();
        assert_eq!(err.kind(), SyntaxKind::Error);
        assert!(err.is_leaf());
    }

    #[test]
    fn test_error_propagates_to_ancestors() {
        let tree = parse("good\n%%bad\n");
        assert!(tree.root().has_error());
        let good = tree.root().child(0).unwrap();
        assert!(!good.has_error());
        let bad = tree.root().child(1).unwrap();
        assert!(bad.has_error());
    }

    #[test]
    fn test_comments() {
        let tree = parse("# header\nflask  # inline\n");
        let kinds: Vec<_> = tree.root().children().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Comment,
                SyntaxKind::Requirement,
                SyntaxKind::Comment
            ]
        );
        assert_eq!(tree.root().child(0).unwrap().text(), "# header");
        assert_eq!(tree.root().child(2).unwrap().text(), "# inline");
    }

    #[test]
    fn test_hash_inside_url_is_not_comment() {
        let tree = parse("-e git+https://example.org/repo.git#egg=mypkg\n");
        let opt = tree.root().child(0).unwrap();
        let url = opt.child(1).unwrap();
        assert_eq!(url.kind(), SyntaxKind::Url);
        assert!(url.text().ends_with("#egg=mypkg"));
    }

    #[test]
    fn test_bare_url_requirement() {
        let tree = parse("https://example.org/pkg-1.0.tar.gz\n");
        let req = tree.root().child(0).unwrap();
        assert_eq!(req.kind(), SyntaxKind::Requirement);
        assert_eq!(req.child(0).unwrap().kind(), SyntaxKind::Url);
    }

    #[test]
    fn test_direct_reference() {
        let tree = parse("mypkg @ https://example.org/mypkg-1.0.whl\n");
        let req = tree.root().child(0).unwrap();
        assert_eq!(req.child(0).unwrap().text(), "mypkg");
        assert_eq!(req.child(1).unwrap().kind(), SyntaxKind::Url);
    }

    #[test]
    fn test_requirement_with_hash_option() {
        let tree = parse("flask==2.0 --hash=sha256:abcdef\n");
        let req = tree.root().child(0).unwrap();
        let opt = req.children().into_iter().find(|n| n.kind() == SyntaxKind::GlobalOpt);
        let opt = opt.expect("per-requirement option parsed");
        assert_eq!(opt.child(0).unwrap().text(), "--hash");
        assert_eq!(opt.child(1).unwrap().text(), "sha256:abcdef");
    }

    #[test]
    fn test_crlf_input() {
        let tree = parse("flask\r\ndjango\r\n");
        let names: Vec<_> = tree
            .root()
            .children()
            .iter()
            .map(|n| n.child(0).unwrap().text().to_string())
            .collect();
        assert_eq!(names, vec!["flask", "django"]);
    }

    #[test]
    fn test_points_are_utf16() {
        // The package name follows a comment with a non-BMP char on the
        // previous line; columns on the package line itself stay ASCII.
        let tree = parse("# emoji 😀 comment\nflask\n");
        let req = tree.root().child(1).unwrap();
        assert_eq!(req.start_point().line, 1);
        assert_eq!(req.start_point().character, 0);

        let comment = tree.root().child(0).unwrap();
        // "# emoji 😀 comment": the emoji is 2 UTF-16 units.
        assert_eq!(comment.end_point().character, utf16_len(comment.text()));
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let tree = parse("\n   \nflask\n\n");
        assert_eq!(tree.root().child_count(), 1);
        assert_eq!(tree.root().end_point(), Point::new(4, 0));
    }

    #[test]
    fn test_byte_spans_match_source() {
        let source = "flask>=2.0\nrequests\n";
        let tree = parse(source);
        for node in preorder(&tree.root()) {
            assert_eq!(
                node.text(),
                &source[node.start_byte()..node.end_byte()],
                "span mismatch for {:?}",
                node
            );
        }
    }

    #[test]
    fn test_kinds_snapshot_small() {
        let listing = kinds("-r dev.txt\nflask\n");
        assert_eq!(listing[0].0, SyntaxKind::File);
        assert!(listing.iter().any(|(k, t)| *k == SyntaxKind::Path && t == "dev.txt"));
        assert!(listing.iter().any(|(k, t)| *k == SyntaxKind::Package && t == "flask"));
    }
}
