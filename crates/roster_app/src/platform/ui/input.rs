use roster_core::{parse_filter_assignment, Resource, ValidationError};
use thiserror::Error;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Scroll by a signed number of rows.
    Scroll(i64),
    /// Scroll one screen down.
    NextScreen,
    Top,
    Bottom,
    Search(String),
    Filter { name: String, value: String },
    PageSize(u32),
    Switch(Resource),
    Retry,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command '{0}', type ? for help")]
    Unknown(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub const HELP_TEXT: &str = "\
enter/n  next screen      j [n] / k [n]  down / up n rows
g / G    top / bottom     /text          search (empty clears)
f name=value  filter      l n            page size
s students|bills|centers  switch list
r retry   d dismiss error   ? help   q quit";

pub fn parse_command(line: &str) -> Result<UiCommand, InputError> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(UiCommand::Search(text.trim().to_string()));
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "" | "n" => Ok(UiCommand::NextScreen),
        "j" => Ok(UiCommand::Scroll(i64::from(count(rest)?))),
        "k" => Ok(UiCommand::Scroll(-i64::from(count(rest)?))),
        "g" => Ok(UiCommand::Top),
        "G" => Ok(UiCommand::Bottom),
        "f" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("f"));
            }
            let (name, value) = parse_filter_assignment(rest)?;
            Ok(UiCommand::Filter { name, value })
        }
        "l" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("l"));
            }
            rest.parse()
                .map(UiCommand::PageSize)
                .map_err(|_| InputError::NotANumber(rest.to_string()))
        }
        "s" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("s"));
            }
            Ok(UiCommand::Switch(rest.parse()?))
        }
        "r" => Ok(UiCommand::Retry),
        "d" => Ok(UiCommand::Dismiss),
        "?" | "h" => Ok(UiCommand::Help),
        "q" => Ok(UiCommand::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

/// Row count for `j`/`k`; unsigned, the command picks the direction.
fn count(raw: &str) -> Result<u32, InputError> {
    if raw.is_empty() {
        return Ok(1);
    }
    raw.parse()
        .map_err(|_| InputError::NotANumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn navigation_commands() {
        assert_eq!(parse_command(""), Ok(UiCommand::NextScreen));
        assert_eq!(parse_command("j"), Ok(UiCommand::Scroll(1)));
        assert_eq!(parse_command("j 5"), Ok(UiCommand::Scroll(5)));
        assert_eq!(parse_command("k 3"), Ok(UiCommand::Scroll(-3)));
        assert_eq!(parse_command("G"), Ok(UiCommand::Bottom));
        assert_eq!(
            parse_command("j x"),
            Err(InputError::NotANumber("x".to_string()))
        );
        assert_eq!(
            parse_command("k -9223372036854775808"),
            Err(InputError::NotANumber("-9223372036854775808".to_string()))
        );
        assert_eq!(
            parse_command("k 4294967295"),
            Ok(UiCommand::Scroll(-4_294_967_295))
        );
    }

    #[test]
    fn query_commands() {
        assert_eq!(
            parse_command("/ Ana Maria "),
            Ok(UiCommand::Search("Ana Maria".to_string()))
        );
        assert_eq!(parse_command("/"), Ok(UiCommand::Search(String::new())));
        assert_eq!(
            parse_command("f status=approved"),
            Ok(UiCommand::Filter {
                name: "status".to_string(),
                value: "approved".to_string()
            })
        );
        assert_eq!(parse_command("l 25"), Ok(UiCommand::PageSize(25)));
        assert_eq!(parse_command("s Bills"), Ok(UiCommand::Switch(Resource::Bills)));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            parse_command("s courses"),
            Err(InputError::Invalid(ValidationError::UnknownResource(_)))
        ));
        assert!(matches!(
            parse_command("f status"),
            Err(InputError::Invalid(ValidationError::MalformedFilter(_)))
        ));
        assert_eq!(parse_command("f"), Err(InputError::MissingArgument("f")));
        assert_eq!(
            parse_command("zap"),
            Err(InputError::Unknown("zap".to_string()))
        );
    }
}
