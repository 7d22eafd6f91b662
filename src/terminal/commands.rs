//! Parsing of console input lines.
//!
//! Plain lines are gateway commands. Lines starting with `:` are console
//! meta-commands and never leave the process.

use crate::models::RuleAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Raw command for the gateway (sent verbatim)
    Command(String),
    Meta(MetaCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    WhoAmI,
    Rule(RuleCommand),
    Audit,
    Logout,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCommand {
    Show,
    Pattern(String),
    Action(RuleAction),
    Description(String),
    Deploy,
}

pub const HELP: &str = "\
Commands are sent to the gateway as typed. Console commands:
  :whoami                      show identity and credits
  :rule show                   show the rule draft
  :rule pattern <regex>        set the draft pattern
  :rule action <block|allow>   set the draft action
  :rule description <text>     set the draft description
  :rule deploy                 submit the draft
  :audit                       fetch the audit trail
  :logout                      disconnect and forget the API key
  :quit                        leave the console
  :help                        this help";

/// Classify one input line.
pub fn parse_line(line: &str) -> Result<ConsoleInput, String> {
    let Some(meta) = line.trim_start().strip_prefix(':') else {
        return Ok(ConsoleInput::Command(line.to_string()));
    };

    let (verb, rest) = split_word(meta);
    let command = match verb {
        "help" | "h" | "?" => MetaCommand::Help,
        "whoami" => MetaCommand::WhoAmI,
        "audit" => MetaCommand::Audit,
        "logout" => MetaCommand::Logout,
        "quit" | "q" | "exit" => MetaCommand::Quit,
        "rule" => MetaCommand::Rule(parse_rule(rest)?),
        "" => return Err("empty console command; try :help".to_string()),
        other => return Err(format!("unknown console command ':{}'; try :help", other)),
    };
    Ok(ConsoleInput::Meta(command))
}

fn parse_rule(args: &str) -> Result<RuleCommand, String> {
    let (field, value) = split_word(args);
    match field {
        "" | "show" => Ok(RuleCommand::Show),
        "deploy" => Ok(RuleCommand::Deploy),
        // Patterns keep inner and trailing whitespace; only the separator is dropped
        "pattern" => Ok(RuleCommand::Pattern(value.to_string())),
        "action" => value.parse().map(RuleCommand::Action),
        "description" => Ok(RuleCommand::Description(value.trim().to_string())),
        other => Err(format!("unknown rule field '{}'", other)),
    }
}

/// First whitespace-delimited word, and the remainder after one separator.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(pos) => {
            let rest = &input[pos..];
            let sep = rest.chars().next().map(char::len_utf8).unwrap_or(0);
            (&input[..pos], &rest[sep..])
        }
        None => (input, ""),
    }
}
