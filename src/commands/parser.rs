use super::ChatCommand;

/// `None` for anything that is not a known slash command; such input goes to
/// the dialogue unchanged.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split(char::is_whitespace)
        .next()?
        .to_lowercase();

    match cmd.as_str() {
        "/reset" | "/new" | "/reiniciar" => Some(ChatCommand::Reset),
        "/entries" | "/entradas" => Some(ChatCommand::Entries),
        "/help" | "/?" | "/ayuda" => Some(ChatCommand::Help),
        "/quit" | "/exit" | "/salir" => Some(ChatCommand::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_aliases() {
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/reiniciar"), Some(ChatCommand::Reset));
    }

    #[test]
    fn case_insensitive_with_extra_args() {
        assert_eq!(parse_command("  /SALIR ahora"), Some(ChatCommand::Quit));
    }

    #[test]
    fn help_question_mark() {
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn dates_are_not_commands() {
        assert_eq!(parse_command("25/12/2024"), None);
        assert_eq!(parse_command("mañana"), None);
    }

    #[test]
    fn unknown_command_returns_none() {
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
    }
}
