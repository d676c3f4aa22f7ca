use crate::exec::record::ExecutionRecord;
use crate::exec::types::{normalize_output, ExecutionEvent};
use crate::shared::logging::EngineLog;
use std::sync::mpsc;

/// What happened while draining one event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveReport {
    /// Downgrade messages for payloads that left the closed tag set.
    pub downgrades: Vec<String>,
    /// Events that arrived after the record was already terminal.
    pub late_events: u32,
}

/// Drain the collaborator's event stream into the record.
///
/// Log lines are appended in arrival order with no reordering; the terminal
/// transition happens exactly once; anything arriving afterwards is counted
/// and dropped. A stream that closes without a terminal event fails the
/// record with the logs collected so far intact.
pub fn drive_execution(
    record: &mut ExecutionRecord,
    events: mpsc::Receiver<ExecutionEvent>,
    engine_log: Option<&EngineLog>,
    now: i64,
) -> DriveReport {
    let mut report = DriveReport::default();
    record.mark_running(now);

    for event in events.iter() {
        match event {
            ExecutionEvent::Log(line) => {
                if !record.append_log(line, now) {
                    report.late_events += 1;
                }
            }
            ExecutionEvent::Completed(raw) => {
                let normalized = normalize_output(raw);
                if let Some(reason) = normalized.downgrade {
                    if let Some(engine_log) = engine_log {
                        engine_log.append(
                            now,
                            record.execution_id.as_str(),
                            format!("decision=output_downgrade reason={reason}"),
                        );
                    }
                    report.downgrades.push(reason);
                }
                if !record.complete(normalized.payload, now) {
                    report.late_events += 1;
                }
            }
            ExecutionEvent::Failed(error) => {
                if !record.fail(error, now) {
                    report.late_events += 1;
                }
            }
        }
    }

    if !record.status.is_terminal() {
        record.fail("automation stream ended without a terminal event", now);
    }

    report
}
