//! Concept extraction from mermaid mindmap source.
//!
//! Mermaid mindmaps are a hierarchical outline language: each node line
//! is indentation, an identifier token, and a label delimited by one of
//! three bracket conventions:
//!
//! ```text
//! mindmap
//!   root((Physics))
//!     a((Motion))
//!     b[Energy]
//!     c["Kinetic Energy"]
//!     d(Waves)
//! ```
//!
//! Extraction is total: malformed input never errors, it just yields
//! fewer labels (worst case none). Tree structure is discarded; the
//! output is a flat list in document order with duplicates preserved.

/// Extract concept labels from mermaid mindmap source.
///
/// Primary pass: scan line by line, taking labels from lines shaped
/// `identifier((label))`, `identifier["label"]`, `identifier[label]` or
/// `identifier(label)`, in that precedence. If the whole pass yields
/// nothing (the outline used no bracket syntax at all), a lossier
/// fallback pass strips identifier tokens and bracket punctuation from
/// every non-reserved line.
pub fn extract_concepts(diagram: &str) -> Vec<String> {
    let mut labels: Vec<String> = diagram
        .lines()
        .enumerate()
        // An unindented first line is the document header (usually the
        // `mindmap` keyword), never a node. Every later line counts as
        // indented by its preceding newline.
        .filter(|(i, line)| *i > 0 || line.starts_with(char::is_whitespace))
        .filter_map(|(_, line)| extract_line(line))
        .collect();

    if labels.is_empty() {
        labels = extract_fallback(diagram);
    }

    labels
}

/// Extract a label from a single node line, or None for non-node lines
/// and empty labels.
fn extract_line(line: &str) -> Option<String> {
    let trimmed = line.trim();

    // Node lines are an identifier token immediately followed by a
    // bracket opener. Edge lines, directives, and prose are skipped.
    let ident_len = trimmed
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(trimmed.len());
    if ident_len == 0 {
        return None;
    }
    let rest = &trimmed[ident_len..];
    if !(rest.starts_with('(') || rest.starts_with('[')) {
        return None;
    }

    let label = extract_double_paren(trimmed)
        .or_else(|| extract_quoted_bracket(trimmed))
        .or_else(|| extract_bracket(trimmed))
        .or_else(|| extract_paren(trimmed))
        // Last resort: drop the identifier token, keep the remainder
        .unwrap_or_else(|| rest.trim().to_string());

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// `((label))` — label may not contain `)`
fn extract_double_paren(s: &str) -> Option<String> {
    let start = s.find("((")? + 2;
    let len = s[start..].find(')')?;
    if len == 0 || !s[start + len..].starts_with("))") {
        return None;
    }
    Some(s[start..start + len].to_string())
}

/// `["label"]` — quoted variant, label may contain `]`
fn extract_quoted_bracket(s: &str) -> Option<String> {
    let start = s.find("[\"")? + 2;
    let len = s[start..].find("\"]")?;
    if len == 0 {
        return None;
    }
    Some(s[start..start + len].to_string())
}

/// `[label]` — label may not contain `]`
fn extract_bracket(s: &str) -> Option<String> {
    let start = s.find('[')? + 1;
    let len = s[start..].find(']')?;
    if len == 0 {
        return None;
    }
    Some(s[start..start + len].to_string())
}

/// `(label)` — label may not contain `)`
fn extract_paren(s: &str) -> Option<String> {
    let start = s.find('(')? + 1;
    let len = s[start..].find(')')?;
    if len == 0 {
        return None;
    }
    Some(s[start..start + len].to_string())
}

/// Best-effort extraction for outlines with no bracket syntax.
///
/// Every non-empty line except the `mindmap`/`root` declarations is
/// kept after stripping its leading identifier token and all bracket
/// and quote punctuation. If a `root((label))` declaration exists, its
/// label is appended last.
fn extract_fallback(diagram: &str) -> Vec<String> {
    let mut labels = Vec::new();

    for line in diagram.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("mindmap") || trimmed.starts_with("root") {
            continue;
        }

        let cleaned = strip_leading_identifier(trimmed)
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '[' | ']' | '"'))
            .collect::<String>();

        if !cleaned.is_empty() {
            labels.push(cleaned);
        }
    }

    if let Some(root) = diagram
        .find("root((")
        .and_then(|idx| extract_double_paren(&diagram[idx..]))
    {
        labels.push(root);
    }

    labels
}

/// Strip a leading identifier token and surrounding whitespace.
fn strip_leading_identifier(s: &str) -> &str {
    let s = s.trim_start();
    let ident_len = s
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(s.len());
    s[ident_len..].trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_bracket_conventions_in_document_order() {
        let diagram = "  root((Physics))\n  a((Motion))\n  b[Energy]";
        assert_eq!(extract_concepts(diagram), vec!["Physics", "Motion", "Energy"]);
    }

    #[test]
    fn quoted_bracket_preferred_over_bare() {
        let diagram = "  a[\"Kinetic Energy\"]\n  b[Potential]";
        assert_eq!(extract_concepts(diagram), vec!["Kinetic Energy", "Potential"]);
    }

    #[test]
    fn single_paren_labels() {
        let diagram = "mindmap\n  root((Math))\n    a(Algebra)\n    b(Geometry)";
        assert_eq!(extract_concepts(diagram), vec!["Math", "Algebra", "Geometry"]);
    }

    #[test]
    fn double_paren_wins_over_single() {
        // `((` lines must never be parsed as a single-paren label
        let diagram = "  x((Inner))";
        assert_eq!(extract_concepts(diagram), vec!["Inner"]);
    }

    #[test]
    fn non_node_lines_are_ignored() {
        let diagram = "mindmap\n  %% comment\n  a((Kept))\n  --> edge";
        assert_eq!(extract_concepts(diagram), vec!["Kept"]);
    }

    #[test]
    fn duplicates_preserved() {
        let diagram = "  a((Force))\n  b((Force))";
        assert_eq!(extract_concepts(diagram), vec!["Force", "Force"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(extract_concepts("").is_empty());
        assert!(extract_concepts("   \n  \n").is_empty());
    }

    #[test]
    fn primary_pass_suppresses_fallback_when_any_label_matches() {
        // root((Biology)) matches the primary pass, so the loose child
        // lines are not recovered by the fallback.
        let diagram = "mindmap\n  root((Biology))\n  a1 Cells\n  a2 Genetics";
        assert_eq!(extract_concepts(diagram), vec!["Biology"]);
    }

    #[test]
    fn fallback_keeps_loose_lines_and_appends_root() {
        // An unindented first-line root dodges the primary pass, and no
        // other line carries bracket syntax, so the fallback runs: the
        // root line itself is skipped as content (reserved keyword) and
        // its declared label is appended at the end.
        let loose = "root((Biology))\nchild1 Cells\nchild2 Genetics";
        assert_eq!(
            extract_concepts(loose),
            vec!["Cells", "Genetics", "Biology"]
        );
    }

    #[test]
    fn fallback_strips_bracket_punctuation() {
        let diagram = "mindmap\n  n1 \"Water Cycle\n  n2 (draft";
        assert_eq!(extract_concepts(diagram), vec!["Water Cycle", "draft"]);
    }

    #[test]
    fn fallback_without_root_declaration() {
        let diagram = "topic one\ntopic two";
        assert_eq!(extract_concepts(diagram), vec!["one", "two"]);
    }
}
