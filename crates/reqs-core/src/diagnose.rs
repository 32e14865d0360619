//! Diagnostics projection: aggregate finders into a diagnostic list and
//! render CLI linter lines.

use crate::finder::Finder;
use crate::uni::Uni;
use console::Style;
use reqs_syntax::Tree;
use tower_lsp_server::ls_types::{Diagnostic, DiagnosticSeverity, Range, Uri};

/// Runs every finder's full traversal and flattens the results into one
/// list, ordered by finder then traversal position. Cyclic-inclusion
/// findings are appended once per offending reference node even when
/// several finders walk the same includes.
pub fn get_diagnostics(
    finders: &mut [Box<dyn Finder + Send>],
    uri: &Uri,
    tree: &Tree,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut cycle_keys: Vec<(Uri, Range)> = Vec::new();

    for finder in finders.iter_mut() {
        let report = finder.find_report(uri, tree);
        diagnostics.extend(finder.unis_to_diagnostics(&report.matches));
        for cycle in report.cycles {
            let key = (cycle.uri.clone(), cycle.range());
            if cycle_keys.contains(&key) {
                continue;
            }
            cycle_keys.push(key);
            diagnostics.push(cycle_diagnostic(&cycle));
        }
    }

    diagnostics
}

fn cycle_diagnostic(uni: &Uni) -> Diagnostic {
    uni.diagnostic(
        format!("{}: cyclic inclusion", uni.text()),
        DiagnosticSeverity::ERROR,
    )
}

/// Numeric rank of a severity; lower is more severe, matching the protocol
/// values (Error = 1 .. Hint = 4).
fn rank(severity: DiagnosticSeverity) -> u8 {
    if severity == DiagnosticSeverity::ERROR {
        1
    } else if severity == DiagnosticSeverity::WARNING {
        2
    } else if severity == DiagnosticSeverity::INFORMATION {
        3
    } else {
        4
    }
}

/// Lowercase severity name for linter output.
pub fn severity_name(severity: DiagnosticSeverity) -> &'static str {
    match rank(severity) {
        1 => "error",
        2 => "warning",
        3 => "information",
        _ => "hint",
    }
}

/// Counts diagnostics at or above a severity threshold. Used as the exit
/// code of the CLI check mode (`count_level(&diags, WARNING)`), so errors
/// count toward a warning threshold.
pub fn count_level(diagnostics: &[Diagnostic], level: DiagnosticSeverity) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity.is_some_and(|s| rank(s) <= rank(level)))
        .count()
}

/// Renders one diagnostic as a linter line:
/// `path:startLine:startCol-endLine:endCol:severity: message`, positions
/// 1-based. With `colorize` the path, positions, and severity are styled.
pub fn linter_message(path: &str, diagnostic: &Diagnostic, colorize: bool) -> String {
    let severity = diagnostic.severity.unwrap_or(DiagnosticSeverity::ERROR);
    let start = format!(
        "{}:{}",
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1
    );
    let end = format!(
        "{}:{}",
        diagnostic.range.end.line + 1,
        diagnostic.range.end.character + 1
    );
    let name = severity_name(severity);

    if !colorize {
        return format!("{path}:{start}-{end}:{name}: {}", diagnostic.message);
    }

    let severity_style = match rank(severity) {
        1 => Style::new().red(),
        2 => Style::new().yellow(),
        3 => Style::new().blue(),
        _ => Style::new().green(),
    }
    .force_styling(true);
    let path_style = Style::new().magenta().force_styling(true);
    let pos_style = Style::new().cyan().force_styling(true);

    format!(
        "{}:{}-{}:{}: {}",
        path_style.apply_to(path),
        pos_style.apply_to(start),
        pos_style.apply_to(end),
        severity_style.apply_to(name),
        diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finders::{ErrorFinder, RepeatedFinder};
    use reqs_syntax::{SyntaxKind, parse};

    fn test_uri() -> Uri {
        Uri::from_file_path("/tmp/requirements.txt").unwrap()
    }

    fn finder_set() -> Vec<Box<dyn Finder + Send>> {
        vec![
            Box::new(ErrorFinder::new()),
            Box::new(RepeatedFinder::new(SyntaxKind::Package)),
        ]
    }

    #[test]
    fn test_get_diagnostics_orders_by_finder_then_position() {
        let tree = parse("foo\n%%bad\nfoo\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        assert_eq!(diagnostics.len(), 2);
        // ErrorFinder ran first even though its match is later in the file.
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostics[1].severity, Some(DiagnosticSeverity::WARNING));
        assert!(diagnostics[1].message.contains("repeated"));
    }

    #[test]
    fn test_count_level_includes_more_severe() {
        let tree = parse("foo\n%%bad\nfoo\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        // One error + one warning, both at-or-above Warning.
        assert_eq!(count_level(&diagnostics, DiagnosticSeverity::WARNING), 2);
        assert_eq!(count_level(&diagnostics, DiagnosticSeverity::ERROR), 1);
    }

    #[test]
    fn test_clean_file_has_no_diagnostics() {
        let tree = parse("apple\nbanana\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_linter_message_plain_format() {
        let tree = parse("%%bad\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        let line = linter_message("requirements.txt", &diagnostics[0], false);
        assert_eq!(
            line,
            "requirements.txt:1:1-1:6:error: %%bad: syntax error"
        );
    }

    #[test]
    fn test_linter_message_colorized_contains_codes() {
        let tree = parse("%%bad\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        let line = linter_message("requirements.txt", &diagnostics[0], true);
        assert!(line.contains("\u{1b}["));
        assert!(console::strip_ansi_codes(&line).contains(":error:"));
    }

    #[test]
    fn test_severity_names() {
        assert_eq!(severity_name(DiagnosticSeverity::ERROR), "error");
        assert_eq!(severity_name(DiagnosticSeverity::WARNING), "warning");
        assert_eq!(severity_name(DiagnosticSeverity::INFORMATION), "information");
        assert_eq!(severity_name(DiagnosticSeverity::HINT), "hint");
    }

    #[test]
    fn test_position_rendering_is_one_based() {
        let tree = parse("ok\n%%bad\n");
        let diagnostics = get_diagnostics(&mut finder_set(), &test_uri(), &tree);
        let line = linter_message("r.txt", &diagnostics[0], false);
        assert!(line.starts_with("r.txt:2:1-2:6:"));
    }
}
