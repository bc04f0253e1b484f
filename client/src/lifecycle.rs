//! Pending/success/error reporting around async operations.

use factfund_types::FundError;
use std::future::Future;

/// One step of an operation's lifecycle as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationEvent {
    Pending(String),
    Success(String),
    Error(String),
}

/// Presentation seam for lifecycle events.
pub trait Notifier {
    fn notify(&self, event: &OperationEvent);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, event: &OperationEvent) {
        (**self).notify(event)
    }
}

/// Emits lifecycle events as tracing events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &OperationEvent) {
        match event {
            OperationEvent::Pending(text) => tracing::info!(status = "pending", "{text}"),
            OperationEvent::Success(text) => tracing::info!(status = "success", "{text}"),
            OperationEvent::Error(text) => tracing::error!(status = "error", "{text}"),
        }
    }
}

/// Run `operation`, emitting `Pending(pending)` first and then either
/// `Success(on_success(&value))` or `Error` carrying the error's message.
///
/// The operation's result is returned unchanged.
pub async fn track<T, F>(
    notifier: &impl Notifier,
    pending: impl Into<String>,
    on_success: impl FnOnce(&T) -> String,
    operation: F,
) -> Result<T, FundError>
where
    F: Future<Output = Result<T, FundError>>,
{
    notifier.notify(&OperationEvent::Pending(pending.into()));
    let result = operation.await;
    match &result {
        Ok(value) => notifier.notify(&OperationEvent::Success(on_success(value))),
        Err(e) => notifier.notify(&OperationEvent::Error(e.to_string())),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<OperationEvent>>);

    impl Notifier for Recorder {
        fn notify(&self, event: &OperationEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[tokio::test]
    async fn success_emits_pending_then_success() {
        let recorder = Recorder::default();
        let result = track(&recorder, "Donating...", |v: &u32| format!("done {v}"), async {
            Ok(7)
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(
            recorder.0.into_inner(),
            vec![
                OperationEvent::Pending("Donating...".into()),
                OperationEvent::Success("done 7".into()),
            ]
        );
    }

    #[tokio::test]
    async fn error_message_is_kept_verbatim() {
        let recorder = Recorder::default();
        let result: Result<(), _> = track(&recorder, "Claiming...", |_| String::new(), async {
            Err(FundError::Rejected("Goal not reached yet".into()))
        })
        .await;
        assert!(result.is_err());
        let events = recorder.0.into_inner();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], OperationEvent::Error("Goal not reached yet".into()));
    }
}
