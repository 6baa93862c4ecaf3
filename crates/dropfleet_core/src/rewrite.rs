use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::extract::{Field, FieldType};
use crate::faction::Faction;

static FACTION_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"(local\s+faction\s*=\s*['"]).+?(['"])"#),
        Regex::new(r#"(faction\s*=\s*data\.faction\s+or\s+['"]).+?(['"])"#),
    ]
    .map(|r| r.expect("faction pattern is a valid regex"))
});

fn url_assignment_pattern(field: Field) -> Regex {
    Regex::new(&format!(
        r#"(\b(?:local\s+)?{}\s*=\s*['"])https?://[^'"]+(['"])"#,
        regex::escape(field.script_name())
    ))
    .expect("url assignment pattern is a valid regex")
}

static URL_PATTERNS: LazyLock<Vec<(Field, Regex)>> = LazyLock::new(|| {
    Field::ALL
        .into_iter()
        .filter(|f| f.field_type() == FieldType::Url)
        .map(|f| (f, url_assignment_pattern(f)))
        .collect()
});

fn splice(caps: &Captures<'_>, replacement: &str) -> String {
    format!("{}{replacement}{}", &caps[1], &caps[2])
}

/// Points every `field = "http..."` assignment at `url`, keeping the quotes.
/// Non-URL fields are returned unchanged.
pub fn replace_url(script: &str, field: Field, url: &str) -> String {
    let Some((_, pattern)) = URL_PATTERNS.iter().find(|(f, _)| *f == field) else {
        return script.to_string();
    };
    pattern
        .replace_all(script, |caps: &Captures<'_>| splice(caps, url))
        .into_owned()
}

/// Rewrites the script's faction literal. Only the first recognised form is touched.
pub fn replace_faction(script: &str, faction: Faction) -> String {
    for pattern in FACTION_PATTERNS.iter() {
        if pattern.is_match(script) {
            return pattern
                .replace_all(script, |caps: &Captures<'_>| splice(caps, faction.as_str()))
                .into_owned();
        }
    }
    script.to_string()
}
