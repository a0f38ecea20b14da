//! # Messages
//!
//! Reply templates posted by features.

pub fn echo(text: &str) -> String {
    format!("echo: {text}")
}

pub fn invalid_command(commands: &[String]) -> String {
    let mut reply = String::from(
        "That doesn't look like a valid command. Commands look like `!name -option value`.",
    );
    if !commands.is_empty() {
        reply.push_str("\n\nAvailable commands:\n");
        for command in commands {
            reply.push_str(&format!("\n* `!{command}`"));
        }
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_command_lists_commands() {
        let reply = invalid_command(&["help".to_string(), "roll".to_string()]);
        assert!(reply.contains("* `!help`"));
        assert!(reply.contains("* `!roll`"));
    }

    #[test]
    fn test_invalid_command_without_commands() {
        assert!(!invalid_command(&[]).contains("Available commands"));
    }
}
