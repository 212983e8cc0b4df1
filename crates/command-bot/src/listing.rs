//! `!command` listing.

use crate::placeholders::{self, COUNT, MENTION, SENDER, TEXT};
use command_store::CommandDefinition;

/// Answer for non-moderators in a conversation without commands.
pub const NO_COMMANDS: &str = "No commands are configured in this conversation.";

/// Render the command listing of a conversation.
pub fn render_listing(definitions: &[CommandDefinition], is_moderator: bool) -> String {
    if definitions.is_empty() && !is_moderator {
        return NO_COMMANDS.to_string();
    }

    let mut out = String::from("### Available commands\n");
    if definitions.is_empty() {
        out.push_str("No commands configured yet.\n");
    }

    for definition in definitions {
        out.push_str(&listing_entry(definition));
        out.push('\n');
    }

    if is_moderator {
        out.push_str(&moderator_help());
    }

    out.trim_end().to_string()
}

fn listing_entry(definition: &CommandDefinition) -> String {
    let mut entry = format!("- **{}**", definition.command);
    if !definition.message.is_empty() {
        entry.push_str(&format!(": {}", placeholders::highlight(&definition.message)));
    }
    match definition.count {
        0 => {}
        1 => entry.push_str(" (used once)"),
        n => entry.push_str(&format!(" (used {} times)", n)),
    }
    entry
}

fn moderator_help() -> String {
    format!(
        "\n### Managing commands\n\
         - `!set !keyword Response text` adds or replaces a command\n\
         - `!unset !keyword` removes a command\n\
         Keywords start with `!` or `?` and have at least one more character.\n\
         \n\
         ### Placeholders\n\
         - `{}` mentions the author of the command\n\
         - `{}` mentions the first user, group or guest mentioned after the command\n\
         - `{}` repeats the text after the command\n\
         - `{}` counts how often the command was used\n",
        SENDER, MENTION, TEXT, COUNT
    )
}
