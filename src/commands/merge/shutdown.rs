use crate::{error::GtMergeError, io::merge_writer::WriterSummary, utils::util::Result};
use std::{any::Any, thread};

fn panic_payload_message(panic_payload: &(dyn Any + Send + 'static)) -> String {
    if let Some(message) = panic_payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = panic_payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_owned()
}

fn join_thread_result<T>(thread_name: &str, handle: thread::JoinHandle<Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(result) => result.map_err(|e| crate::gtmerge_error!("{thread_name} thread failed: {e}")),
        Err(panic_payload) => Err(crate::gtmerge_error!(
            "{thread_name} thread panicked: {}",
            panic_payload_message(panic_payload.as_ref())
        )),
    }
}

fn aggregate_shutdown_errors(errors: Vec<GtMergeError>) -> Result<()> {
    let mut errors = errors.into_iter();
    let Some(first) = errors.next() else {
        return Ok(());
    };
    let rest: Vec<GtMergeError> = errors.collect();
    if rest.is_empty() {
        return Err(first);
    }
    let summary = std::iter::once(first)
        .chain(rest)
        .enumerate()
        .map(|(index, error)| format!("{}. {}", index + 1, error))
        .collect::<Vec<_>>()
        .join("; ");
    Err(crate::gtmerge_error!("Multiple merge errors: {summary}"))
}

/// Joins the writer after the merge loop has dropped its sender. A writer
/// failure usually surfaces in the merge loop as a closed channel, so both
/// errors are reported together.
pub(crate) fn finalize_writer_thread(
    merge_result: Result<()>,
    writer_thread: thread::JoinHandle<Result<WriterSummary>>,
) -> Result<WriterSummary> {
    let mut errors = Vec::new();
    if let Err(error) = merge_result {
        errors.push(error);
    }

    let summary = match join_thread_result("Writer", writer_thread) {
        Ok(summary) => {
            log::debug!("Writer thread joined successfully.");
            Some(summary)
        }
        Err(error) => {
            errors.push(error);
            None
        }
    };

    aggregate_shutdown_errors(errors)?;
    summary.ok_or_else(|| crate::gtmerge_error!("Writer thread produced no summary"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_summary_is_returned_when_both_sides_succeed() {
        let handle = thread::spawn(|| -> Result<WriterSummary> {
            Ok(WriterSummary {
                records: 2,
                qc_rows: 0,
            })
        });
        let summary = finalize_writer_thread(Ok(()), handle).unwrap();
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn merge_and_writer_errors_are_combined() {
        let handle = thread::spawn(|| -> Result<WriterSummary> {
            Err(crate::gtmerge_error!("disk full"))
        });
        let err = finalize_writer_thread(Err(crate::gtmerge_error!("channel closed")), handle)
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Multiple merge errors"));
        assert!(err.contains("1. channel closed"));
        assert!(err.contains("2. Writer thread failed: disk full"));
    }

    #[test]
    fn writer_panic_is_reported() {
        let handle = thread::spawn(|| -> Result<WriterSummary> { panic!("boom") });
        let err = finalize_writer_thread(Ok(()), handle).unwrap_err();
        assert!(err.to_string().contains("Writer thread panicked: boom"));
    }
}
