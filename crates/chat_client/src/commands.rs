#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New,
    List,
    /// `/select <number>` with the 1-based position from `/list`; `None`
    /// when the argument is missing or not a number.
    Select(Option<usize>),
    Delete,
    Cancel,
    Quit,
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut tokens = trimmed.split_whitespace();
    let command = tokens.next().unwrap_or(trimmed).to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/new" => SlashCommand::New,
        "/list" => SlashCommand::List,
        "/select" => SlashCommand::Select(tokens.next().and_then(|index| index.parse().ok())),
        "/delete" => SlashCommand::Delete,
        "/cancel" => SlashCommand::Cancel,
        "/quit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::{parse_slash_command, SlashCommand};

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("hello /help"), None);
        assert_eq!(parse_slash_command(""), None);
    }

    #[test]
    fn known_commands_parse_with_trailing_arguments_ignored() {
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("  /new  "), Some(SlashCommand::New));
        assert_eq!(parse_slash_command("/delete now"), Some(SlashCommand::Delete));
        assert_eq!(parse_slash_command("/cancel"), Some(SlashCommand::Cancel));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
    }

    #[test]
    fn select_carries_its_numeric_argument() {
        assert_eq!(parse_slash_command("/list"), Some(SlashCommand::List));
        assert_eq!(
            parse_slash_command("/select 3"),
            Some(SlashCommand::Select(Some(3)))
        );
        assert_eq!(
            parse_slash_command("/select"),
            Some(SlashCommand::Select(None))
        );
        assert_eq!(
            parse_slash_command("/select two"),
            Some(SlashCommand::Select(None))
        );
    }

    #[test]
    fn unknown_commands_are_reported_verbatim() {
        assert_eq!(
            parse_slash_command("/frobnicate all"),
            Some(SlashCommand::Unknown("/frobnicate".to_string()))
        );
    }
}
