//! Placeholder substitution in command templates.
//!
//! A template is scanned for all placeholders first. Every value is
//! resolved before anything is written, so an unresolvable `{mention}`
//! drops the whole answer and the counter stays untouched.

use talk_client::{Parameter, ParameterKind, Parameters};

pub const MENTION: &str = "{mention}";
pub const TEXT: &str = "{text}";
pub const SENDER: &str = "{sender}";
pub const COUNT: &str = "{count}";

/// Every placeholder a template may contain.
pub const ALL: [&str; 4] = [SENDER, MENTION, TEXT, COUNT];

/// Mention markup for a message parameter, if it refers to someone.
pub fn mention_for_parameter(parameter: &Parameter) -> Option<String> {
    match parameter.kind {
        ParameterKind::Call => Some("@all".to_string()),
        ParameterKind::User => Some(match &parameter.server {
            Some(server) => format!("@\"federated_user/{}@{}\"", parameter.id, server),
            None => format!("@\"{}\"", parameter.id),
        }),
        ParameterKind::UserGroup => Some(format!("@\"group/{}\"", parameter.id)),
        ParameterKind::Guest => Some(format!("@\"guest/{}\"", parameter.id)),
        ParameterKind::Other => None,
    }
}

/// Mention of the first parameter that refers to someone.
pub fn first_mention(parameters: &Parameters) -> Option<String> {
    parameters
        .iter()
        .find_map(|(_, parameter)| mention_for_parameter(parameter))
}

/// Replace `{key}` references in `text` with mentions or display names.
pub fn expand_text(text: &str, parameters: &Parameters) -> String {
    let replacements: Vec<(String, String)> = parameters
        .iter()
        .map(|(key, parameter)| {
            let value =
                mention_for_parameter(parameter).unwrap_or_else(|| parameter.name.clone());
            (format!("{{{}}}", key), value)
        })
        .collect();

    replace_tokens(text, &replacements)
}

/// Split an actor id like `users/alice` into its singular type and id.
fn split_actor_id(actor_id: &str) -> Option<(&str, &str)> {
    let (kind, id) = actor_id.split_once('/')?;
    Some((kind.strip_suffix('s').unwrap_or(kind), id))
}

/// Mention markup for an actor id.
pub fn sender_mention(actor_id: &str) -> String {
    match split_actor_id(actor_id) {
        Some(("user", id)) => format!("@\"{}\"", id),
        Some((kind, id)) => format!("@\"{}/{}\"", kind, id),
        None => format!("@\"{}\"", actor_id),
    }
}

/// Whether an actor id belongs to a bot.
pub fn is_bot(actor_id: &str) -> bool {
    matches!(split_actor_id(actor_id), Some(("bot", _)))
}

/// Data a template is expanded against.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Text after the command word.
    pub text: &'a str,
    pub parameters: &'a Parameters,
    /// Id of the actor who invoked the command.
    pub actor_id: &'a str,
}

/// Placeholders present in a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placeholders {
    pub mention: bool,
    pub text: bool,
    pub sender: bool,
    pub count: bool,
}

impl Placeholders {
    pub fn scan(template: &str) -> Self {
        Self {
            mention: template.contains(MENTION),
            text: template.contains(TEXT),
            sender: template.contains(SENDER),
            count: template.contains(COUNT),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.mention || self.text || self.sender || self.count)
    }
}

/// A template with every placeholder except `{count}` resolved.
#[derive(Debug, Clone)]
pub struct Substitution<'a> {
    template: &'a str,
    replacements: Vec<(String, String)>,
    needs_count: bool,
}

impl<'a> Substitution<'a> {
    /// Resolve the placeholders of `template`.
    ///
    /// Returns `None` if the template needs a mention the message lacks.
    pub fn prepare(template: &'a str, context: &TemplateContext<'_>) -> Option<Self> {
        let found = Placeholders::scan(template);
        if found.is_empty() {
            return Some(Self {
                template,
                replacements: Vec::new(),
                needs_count: false,
            });
        }

        let mut replacements = Vec::new();

        if found.mention {
            replacements.push((MENTION.to_string(), first_mention(context.parameters)?));
        }
        if found.text {
            replacements.push((
                TEXT.to_string(),
                expand_text(context.text, context.parameters),
            ));
        }
        if found.sender {
            replacements.push((SENDER.to_string(), sender_mention(context.actor_id)));
        }

        Some(Self {
            template,
            replacements,
            needs_count: found.count,
        })
    }

    /// Whether the caller must increment the counter before rendering.
    pub fn needs_count(&self) -> bool {
        self.needs_count
    }

    /// Produce the answer, given the incremented counter if one was needed.
    pub fn render(mut self, count: Option<u64>) -> String {
        if let Some(count) = count.filter(|_| self.needs_count) {
            self.replacements.push((COUNT.to_string(), count.to_string()));
        }
        replace_tokens(self.template, &self.replacements)
    }
}

/// Wrap every placeholder in inline code markup.
pub fn highlight(template: &str) -> String {
    let replacements: Vec<(String, String)> = ALL
        .iter()
        .map(|token| (token.to_string(), format!("`{}`", token)))
        .collect();
    replace_tokens(template, &replacements)
}

/// Single left-to-right pass; inserted values are never scanned again.
fn replace_tokens(text: &str, replacements: &[(String, String)]) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match replacements
            .iter()
            .find(|(token, _)| tail.starts_with(token.as_str()))
        {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
