/// Extension of every generated source file.
pub const FILE_EXTENSION: &str = "js";

/// Derive the output file name for a declared class name.
///
/// The substrings `component` and `system` are stripped case-insensitively,
/// then the name is kebab-cased: the first character is lower-cased and a
/// `-` is inserted where a new word starts. A run of capitals is one word,
/// so `EnemyAISystem` becomes `enemy-ai.js` and `HTTPClient` becomes
/// `http-client.js`. A name that strips down to nothing keeps its full text.
pub fn derive_file_name(name: &str, extension: &str) -> String {
    let mut stem = strip_ignore_case(&strip_ignore_case(name, "component"), "system");
    if stem.is_empty() {
        stem = name.to_string();
    }
    format!("{}.{extension}", kebab_case(&stem))
}

fn strip_ignore_case(text: &str, needle: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.to_ascii_lowercase().find(needle) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + needle.len()..];
    }
    out.push_str(rest);
    out
}

fn kebab_case(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let mut out = String::with_capacity(stem.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }
        if i > 0 && starts_word(chars[i - 1], chars.get(i + 1).copied()) {
            out.push('-');
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// An upper-case character starts a word after a lower-case one, or when it
/// is the last capital of a run (or follows a digit) and a lower-case
/// character comes next.
fn starts_word(prev: char, next: Option<char>) -> bool {
    if prev.is_lowercase() {
        return true;
    }
    (prev.is_uppercase() || prev.is_ascii_digit()) && next.is_some_and(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn js(name: &str) -> String {
        derive_file_name(name, FILE_EXTENSION)
    }

    #[test]
    fn strips_component_suffix() {
        assert_eq!(js("PlayerHealthComponent"), "player-health.js");
    }

    #[test]
    fn strips_system_and_keeps_acronyms() {
        assert_eq!(js("EnemyAISystem"), "enemy-ai.js");
    }

    #[test]
    fn strip_is_case_insensitive() {
        assert_eq!(js("SpriteCOMPONENT"), "sprite.js");
        assert_eq!(js("physicssystem"), "physics.js");
    }

    #[test]
    fn plain_names_only_change_case() {
        assert_eq!(js("Position"), "position.js");
        assert_eq!(js("PlayerHealth"), "player-health.js");
        assert_eq!(js("velocity"), "velocity.js");
    }

    #[test]
    fn digits_stay_attached() {
        assert_eq!(js("Sprite2DComponent"), "sprite2d.js");
        assert_eq!(js("Physics3DSystem"), "physics3d.js");
        assert_eq!(js("Player2Health"), "player2-health.js");
    }

    #[test]
    fn acronym_followed_by_word() {
        assert_eq!(js("HTTPClient"), "http-client.js");
    }

    #[test]
    fn name_that_strips_to_nothing_is_kept() {
        assert_eq!(js("System"), "system.js");
        assert_eq!(js("Component"), "component.js");
    }

    #[test]
    fn custom_extension() {
        assert_eq!(derive_file_name("ShipRenderSystem", "ts"), "ship-render.ts");
    }

    proptest! {
        #[test]
        fn never_contains_uppercase(name in "[A-Z][A-Za-z0-9]{0,16}") {
            let file = js(&name);
            prop_assert!(file.ends_with(".js"));
            prop_assert!(!file.chars().any(char::is_uppercase));
        }

        #[test]
        fn deterministic(name in "[A-Za-z][A-Za-z0-9]{0,16}") {
            prop_assert_eq!(js(&name), js(&name));
        }

        #[test]
        fn suffix_does_not_change_stem(stem in "[A-Z][a-z]{1,8}([A-Z][a-z]{1,8}){0,2}") {
            prop_assume!(!stem.to_ascii_lowercase().contains("component"));
            prop_assume!(!stem.to_ascii_lowercase().contains("system"));
            prop_assert_eq!(js(&format!("{stem}Component")), js(&stem));
            prop_assert_eq!(js(&format!("{stem}System")), js(&stem));
        }
    }
}
