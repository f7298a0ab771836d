//! Identifier conventions shared by the binders, translators and emitters.
//!
//! Wire names in AsyncAPI documents come in every casing imaginable (`customerId`,
//! `user_signed_up`, `street-lights`). These helpers split them into words and
//! rebuild them as Rust identifiers.

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "try", "typeof", "unsized", "virtual", "yield",
];

// Keywords that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

/// Splits an identifier into words on separators and case boundaries.
///
/// `"customerId"` gives `["customer", "Id"]`, `"HTTPServer"` gives `["HTTP", "Server"]`.
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Convert any casing to PascalCase
///
/// ```
/// use asyncapi_codegen::naming::to_pascal_case;
/// assert_eq!(to_pascal_case("street-lights"), "StreetLights");
/// assert_eq!(to_pascal_case("orders"), "Orders");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert any casing to snake_case
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert any casing to SCREAMING_SNAKE_CASE
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Turns a wire name into a usable Rust value identifier (field, parameter, method).
pub fn to_rust_ident(s: &str) -> String {
    let mut ident = to_snake_case(s);
    if ident.is_empty() {
        ident = "value".to_string();
    }
    if ident.starts_with(|c: char| c.is_numeric()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// Like [`to_rust_ident`], but keywords get a trailing `_` instead of the raw `r#`
/// prefix.
///
/// Method parameters are named in topic placeholders and format strings, where a raw
/// identifier is not accepted.
pub fn to_param_ident(s: &str) -> String {
    let ident = to_rust_ident(s);
    match ident.strip_prefix("r#") {
        Some(keyword) => format!("{}_", keyword),
        None => ident,
    }
}

/// Turns a wire name into a usable Rust type identifier.
pub fn to_type_name(s: &str) -> String {
    let mut name = to_pascal_case(s);
    if name.is_empty() {
        name = "Unnamed".to_string();
    }
    if name.starts_with(|c: char| c.is_numeric()) {
        name.insert(0, 'T');
    }
    if name == "Self" {
        name.push('_');
    }
    name
}

/// Builds the module path generated code for a spec is mounted at.
///
/// The namespace may use `.` or `::` separators; an empty namespace leaves just
/// `<spec>::api`.
pub fn spec_namespace(namespace: &str, spec_name: &str) -> String {
    namespace
        .split(['.', ':'])
        .filter(|segment| !segment.trim().is_empty())
        .map(to_rust_ident)
        .chain([to_rust_ident(spec_name), "api".to_string()])
        .collect::<Vec<_>>()
        .join("::")
}
