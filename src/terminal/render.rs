//! Plain-text rendering of session state.

use crate::models::{AuditRecord, EntryKind, Identity, RuleDraft, TranscriptEntry};

pub fn entry(entry: &TranscriptEntry) -> String {
    match entry.kind() {
        EntryKind::UserEcho | EntryKind::Info => entry.text().to_string(),
        EntryKind::Success => format!("  ok  {}", entry.text()),
        EntryKind::Error => format!("  !!  {}", entry.text()),
    }
}

pub fn identity(identity: &Identity) -> String {
    let balance = if identity.credits > 0 { "" } else { " (exhausted)" };
    format!(
        "IDENTITY {} [{}]  CREDITS {}{}",
        identity.username, identity.role, identity.credits, balance
    )
}

pub fn draft(draft: &RuleDraft) -> String {
    format!(
        "pattern:     {:?}\naction:      {}\ndescription: {:?}",
        draft.pattern, draft.action, draft.description
    )
}

/// Audit trail as an aligned table: TIME, USER, CMD, STATUS.
pub fn audit_table(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No logs loaded".to_string();
    }

    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                r.local_time(),
                r.username.clone(),
                r.command.clone(),
                r.status.clone(),
            ]
        })
        .collect();

    let headers = ["TIME", "USER", "CMD", "STATUS"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i + 1 == cells.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
            }
        }
        line
    };

    let mut out = vec![format_row(headers)];
    for row in &rows {
        out.push(format_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    out.join("\n")
}
