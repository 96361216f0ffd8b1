use heck::{ToPascalCase, ToTitleCase};

/// Human label for a property name: `published_at` → `Published At`.
pub fn field_label(name: &str) -> String {
    let label = name.to_title_case();
    if label.is_empty() {
        name.to_string()
    } else {
        label
    }
}

/// Definition names a resource's schema may live under, most specific first.
///
/// For tag `books` with prefix `models.`:
/// `models.books`, `books`, `Books`, `Book`.
pub fn schema_candidates(tag: &str, prefix: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(4);
    let mut push = |name: String| {
        if !name.is_empty() && !candidates.contains(&name) {
            candidates.push(name);
        }
    };

    if !prefix.is_empty() {
        push(format!("{prefix}{tag}"));
    }
    push(tag.to_string());
    push(tag.to_pascal_case());
    push(singularize(tag).to_pascal_case());

    candidates
}

/// Naive singularization: strips a trailing plural suffix.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
