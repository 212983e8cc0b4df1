//! Lexical parsing of chat commands.

/// Characters a command keyword may start with.
pub const COMMAND_PREFIXES: [char; 2] = ['!', '?'];

/// Whether a message is addressed to the bot at all.
pub fn is_command(text: &str) -> bool {
    text.starts_with(COMMAND_PREFIXES)
}

/// Split `text` at the first space into the leading word and the rest.
///
/// Without a space the rest is empty.
pub fn split_first_word(text: &str) -> (&str, &str) {
    text.split_once(' ').unwrap_or((text, ""))
}

/// A keyword needs a `!`/`?` prefix and at least one more character.
pub fn is_valid_keyword(keyword: &str) -> bool {
    keyword.starts_with(COMMAND_PREFIXES) && keyword.chars().count() >= 2
}

/// Normalized form used for storage and lookup.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.to_lowercase()
}

/// Argument of `!set <keyword> <template>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetArgument<'a> {
    pub keyword: String,
    pub template: &'a str,
}

/// Parse the remainder of a `!set` message.
///
/// Returns `None` when the keyword is invalid or no template follows it.
pub fn parse_set_argument(remainder: &str) -> Option<SetArgument<'_>> {
    let (keyword, template) = remainder.trim().split_once(' ')?;
    let keyword = normalize_keyword(keyword);

    if template.is_empty() || !is_valid_keyword(&keyword) {
        return None;
    }

    Some(SetArgument { keyword, template })
}
