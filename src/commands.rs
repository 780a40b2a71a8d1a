//! REPL command parsing.

use crate::error::{OperatorError, Result};
use crate::prompt::ScenarioPreset;
use crate::session::SessionEvent;

pub const HELP_TEXT: &str = "\
Commands:
  <text>                                     send a prompt to the digital operator
  /set telemetry|costs|machine <field> <v>   edit a form value (camelCase field names)
  /scenario lightweighting|waste|efficiency  send a preset analysis prompt
  /historical                                mark the historical data set as loaded
  /show telemetry|costs|machine|chart|history
  /help                                      this text
  /quit                                      leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Telemetry,
    Costs,
    Machine,
}

impl Record {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "telemetry" | "t" => Some(Record::Telemetry),
            "costs" | "cost" | "c" => Some(Record::Costs),
            "machine" | "m" => Some(Record::Machine),
            _ => None,
        }
    }

    pub fn edit_event(&self, field: String, value: String) -> SessionEvent {
        match self {
            Record::Telemetry => SessionEvent::EditTelemetry { field, value },
            Record::Costs => SessionEvent::EditCosts { field, value },
            Record::Machine => SessionEvent::EditMachine { field, value },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Record(Record),
    Chart,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Prompt(String),
    Set {
        record: Record,
        field: String,
        value: String,
    },
    Scenario(ScenarioPreset),
    Historical,
    Show(View),
    Help,
    Quit,
}

/// Parse one input line. Lines not starting with `/` are prompts, passed on verbatim.
pub fn parse_command(line: &str) -> Result<Command> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Prompt(line.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args = parts.next().unwrap_or_default().trim();

    match name.as_str() {
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "help" | "h" => Ok(Command::Help),
        "historical" => Ok(Command::Historical),
        "scenario" => ScenarioPreset::from_name(args)
            .map(Command::Scenario)
            .ok_or_else(|| {
                OperatorError::Validation(format!(
                    "unknown scenario '{args}'. Use lightweighting, waste or efficiency"
                ))
            }),
        "show" => {
            let view = match args.to_lowercase().as_str() {
                "chart" => View::Chart,
                "history" | "" => View::History,
                other => View::Record(Record::parse(other).ok_or_else(|| {
                    OperatorError::Validation(format!("nothing to show for '{other}'"))
                })?),
            };
            Ok(Command::Show(view))
        }
        "set" => {
            let mut words = args.splitn(3, char::is_whitespace);
            let record = words.next().unwrap_or_default();
            let field = words.next().unwrap_or_default();
            let value = words.next().unwrap_or_default().trim();
            if field.is_empty() || value.is_empty() {
                return Err(OperatorError::Validation(
                    "usage: /set telemetry|costs|machine <field> <value>".to_string(),
                ));
            }
            let record = Record::parse(record).ok_or_else(|| {
                OperatorError::Validation(format!("unknown form '{record}'"))
            })?;
            Ok(Command::Set {
                record,
                field: field.to_string(),
                value: value.to_string(),
            })
        }
        other => Err(OperatorError::Validation(format!(
            "unknown command '/{other}'. Type /help"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_prompt() {
        assert_eq!(
            parse_command("atık oranı arttı, ne yapmalı?").unwrap(),
            Command::Prompt("atık oranı arttı, ne yapmalı?".to_string())
        );
    }

    #[test]
    fn test_set_keeps_multiword_values() {
        assert_eq!(
            parse_command("/set telemetry fiberType 80% OCC - 20% Mix").unwrap(),
            Command::Set {
                record: Record::Telemetry,
                field: "fiberType".to_string(),
                value: "80% OCC - 20% Mix".to_string(),
            }
        );
    }

    #[test]
    fn test_set_requires_field_and_value() {
        assert!(parse_command("/set costs occPrice").is_err());
        assert!(parse_command("/set nowhere occPrice 1").is_err());
    }

    #[test]
    fn test_scenario_and_show() {
        assert_eq!(
            parse_command("/scenario waste").unwrap(),
            Command::Scenario(ScenarioPreset::Waste)
        );
        assert_eq!(parse_command("/show chart").unwrap(), Command::Show(View::Chart));
        assert_eq!(
            parse_command("/show machine").unwrap(),
            Command::Show(View::Record(Record::Machine))
        );
        assert!(parse_command("/scenario moon").is_err());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let err = parse_command("/launch").unwrap_err();
        assert!(err.to_string().contains("/launch"));
    }

    #[test]
    fn test_record_builds_matching_edit_event() {
        let event = Record::Costs.edit_event("steamPrice".into(), "27".into());
        assert_eq!(
            event,
            SessionEvent::EditCosts {
                field: "steamPrice".to_string(),
                value: "27".to_string()
            }
        );
    }
}
