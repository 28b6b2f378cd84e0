/// Extracts evaluator ids from a raw sponsor field.
///
/// The field holds one or more `id(Display Name)` entries joined by `-`, e.g.
/// `a@x.org(ANA)-b@y.com(BOB)`. Hyphens inside the parenthesised names are
/// not separators. Each part keeps what precedes its first `(`, trimmed;
/// blank parts are dropped.
pub fn parse_sponsors(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (at, ch) in raw.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '-' if depth == 0 => {
                parts.push(&raw[start..at]);
                start = at + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);

    parts
        .into_iter()
        .filter_map(|part| {
            let id = part.split('(').next().unwrap_or_default().trim();
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sponsor() {
        assert_eq!(parse_sponsors("ana@uni.example(ANA ZAMORA)"), vec!["ana@uni.example"]);
    }

    #[test]
    fn two_sponsors() {
        assert_eq!(
            parse_sponsors("bo@uni.example(BO RIOS)-cy@corp.example(CY PEREZ)"),
            vec!["bo@uni.example", "cy@corp.example"]
        );
    }

    #[test]
    fn hyphenated_display_name_is_not_split() {
        assert_eq!(
            parse_sponsors("a@x.org(ANA GARCIA-LOPEZ)-b@y.org(BO)"),
            vec!["a@x.org", "b@y.org"]
        );
    }

    #[test]
    fn blank_and_bare_fields() {
        assert!(parse_sponsors("").is_empty());
        assert!(parse_sponsors("   ").is_empty());
        assert_eq!(parse_sponsors(" c@z.org "), vec!["c@z.org"]);
        assert_eq!(parse_sponsors("c@z.org-"), vec!["c@z.org"]);
    }
}
