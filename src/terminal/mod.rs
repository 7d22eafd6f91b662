//! Interactive line console.

pub mod commands;
pub mod render;

pub use commands::{ConsoleInput, MetaCommand, RuleCommand, parse_line};

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::ConsoleApp;
use crate::models::{Credential, Identity};
use crate::session::{ConsoleError, RestoreOutcome, SessionPhase};

/// Run the console until `:quit` or end of input.
///
/// While anonymous every line is taken as an API key. Once authenticated,
/// plain lines go to the gateway and `:` lines are console commands.
pub async fn run_console<R, W>(app: &ConsoleApp, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut shown = 0usize;

    if let Some(identity) = app.session.identity().await {
        writeln!(out, "{}", render::identity(&identity))?;
        shown = print_transcript(app, out, shown).await?;
    }

    loop {
        if app.session.phase().await != SessionPhase::Authenticated {
            write!(out, "API KEY> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let pending = app.session.snapshot().await.has_pending_credential;
            let attempt = if line.trim().is_empty() && pending {
                reconnect(app).await
            } else {
                app.manager.login(Credential::new(line)).await
            };
            match attempt {
                Ok(identity) => {
                    shown = 0;
                    writeln!(out, "{}", render::identity(&identity))?;
                }
                Err(err) => writeln!(out, "{}", err)?,
            }
            shown = print_transcript(app, out, shown).await?;
            continue;
        }

        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            Err(message) => writeln!(out, "{}", message)?,
            Ok(ConsoleInput::Command(command)) => {
                let submitted = match app.console.set_input(command).await {
                    Ok(()) => app.console.submit().await,
                    Err(err) => Err(err),
                };
                match submitted {
                    Ok(outcome) if outcome.credits_remaining().is_some() => {
                        shown = print_transcript(app, out, shown).await?;
                        if let Some(identity) = app.session.identity().await {
                            writeln!(out, "{}", render::identity(&identity))?;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => writeln!(out, "error: {}", err)?,
                }
            }
            Ok(ConsoleInput::Meta(MetaCommand::Quit)) => break,
            Ok(ConsoleInput::Meta(MetaCommand::Logout)) => {
                app.manager.logout().await;
                shown = 0;
                writeln!(out, "Disconnected.")?;
                continue;
            }
            Ok(ConsoleInput::Meta(meta)) => run_meta(app, meta, out).await?,
        }

        shown = print_transcript(app, out, shown).await?;
    }

    debug!("Console input closed");
    Ok(())
}

/// Re-validate the persisted credential instead of reading a new one.
async fn reconnect(app: &ConsoleApp) -> Result<Identity, ConsoleError> {
    match app.manager.restore(true).await? {
        RestoreOutcome::Restored(identity) => Ok(identity),
        RestoreOutcome::Unreachable(err) => Err(ConsoleError::AuthenticationFailed {
            reason: "gateway unreachable".to_string(),
            source: Some(err),
        }),
        _ => Err(ConsoleError::AuthenticationFailed {
            reason: "stored API key rejected".to_string(),
            source: None,
        }),
    }
}

async fn run_meta<W: Write>(app: &ConsoleApp, meta: MetaCommand, out: &mut W) -> Result<()> {
    match meta {
        MetaCommand::Help => writeln!(out, "{}", commands::HELP)?,
        MetaCommand::WhoAmI => match app.session.identity().await {
            Some(identity) => writeln!(out, "{}", render::identity(&identity))?,
            None => writeln!(out, "error: {}", ConsoleError::NotAuthenticated)?,
        },
        MetaCommand::Rule(rule) => run_rule(app, rule, out).await?,
        MetaCommand::Audit => match app.audit.refresh().await {
            Ok(records) => writeln!(out, "{}", render::audit_table(&records))?,
            Err(err) => writeln!(out, "Failed to fetch logs: {}", err)?,
        },
        MetaCommand::Logout | MetaCommand::Quit => {}
    }
    Ok(())
}

async fn run_rule<W: Write>(app: &ConsoleApp, rule: RuleCommand, out: &mut W) -> Result<()> {
    let edited = match rule {
        RuleCommand::Show => {
            writeln!(out, "{}", render::draft(&app.rules.draft().await))?;
            return Ok(());
        }
        RuleCommand::Deploy => {
            match app.rules.submit_rule().await {
                Ok(rule) => writeln!(out, "Rule deployed: {} {:?}", rule.action, rule.pattern)?,
                Err(err) => writeln!(out, "error: {}", err)?,
            }
            return Ok(());
        }
        RuleCommand::Pattern(pattern) => app.rules.set_pattern(pattern).await,
        RuleCommand::Action(action) => app.rules.set_action(action).await,
        RuleCommand::Description(text) => app.rules.set_description(text).await,
    };

    if let Err(err) = edited {
        writeln!(out, "error: {}", err)?;
    }
    Ok(())
}

/// Print transcript entries past `shown`; returns the new count.
pub async fn print_transcript<W: Write>(
    app: &ConsoleApp,
    out: &mut W,
    shown: usize,
) -> Result<usize> {
    let transcript = app.session.transcript().await;
    for entry in transcript.since(shown) {
        writeln!(out, "{}", render::entry(entry))?;
    }
    Ok(transcript.len())
}
