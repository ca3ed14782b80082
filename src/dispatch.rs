//! Background job dispatch
//!
//! Accepted events are handed to a bounded queue drained by a small worker
//! pool, keeping the webhook path free of outbound I/O. Slack enforces a
//! low single-digit-second acknowledgment ceiling, so the handler must never
//! wait on history fetches or completion calls.
//!
//! Each job is spawned onto its own task and awaited from the worker, so a
//! panic is contained at the job boundary and logged instead of taking the
//! worker down.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::channels::SlackChannel;
use crate::completion::CompletionClient;
use crate::context::HistoryAssembler;

/// Queue capacity; overflow drops the event (the webhook is still acked)
const QUEUE_CAPACITY: usize = 64;

/// Worker pool size
const WORKER_COUNT: usize = 4;

/// Reply used when a thread carries no prompt text
pub const PROMPT_MISSING_REPLY: &str = "Please include a prompt after the mention.";

/// Reply used when the completion call fails
pub const FAILURE_REPLY: &str = "Sorry, I encountered an error processing your message.";

/// One unit of background work: answer the thread rooted at `thread_ts`.
#[derive(Debug, Clone)]
pub struct MentionJob {
    pub channel: String,
    pub thread_ts: String,
}

/// The assemble → complete → reply sequence and its collaborators.
#[derive(Clone)]
pub struct Pipeline {
    history: HistoryAssembler,
    completion: CompletionClient,
    slack: Arc<SlackChannel>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        history: HistoryAssembler,
        completion: CompletionClient,
        slack: Arc<SlackChannel>,
    ) -> Self {
        Self {
            history,
            completion,
            slack,
        }
    }

    /// Run one job to completion. Infrastructure failures degrade to either
    /// the prompt-missing or the generic failure reply; they never propagate.
    async fn process(&self, job: MentionJob) {
        let context = self.history.assemble(&job.channel, &job.thread_ts).await;

        let reply = if context.is_empty() {
            PROMPT_MISSING_REPLY.to_string()
        } else {
            match self.completion.complete(&context).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(channel = %job.channel, thread_ts = %job.thread_ts, error = %e, "completion call failed");
                    FAILURE_REPLY.to_string()
                }
            }
        };

        if let Err(e) = self
            .slack
            .post_message(&job.channel, Some(&job.thread_ts), &reply)
            .await
        {
            tracing::error!(channel = %job.channel, thread_ts = %job.thread_ts, error = %e, "failed to post reply");
        }
    }
}

/// Hands accepted events to the worker pool.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<MentionJob>,
}

impl Dispatcher {
    /// Start the default worker pool and return its dispatcher.
    #[must_use]
    pub fn start(pipeline: Pipeline) -> Self {
        Self::with_pool(pipeline, WORKER_COUNT, QUEUE_CAPACITY)
    }

    /// Start a pool with explicit worker count and queue capacity.
    #[must_use]
    pub fn with_pool(pipeline: Pipeline, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<MentionJob>(capacity);
        let rx = Arc::new(Mutex::new(rx));
        let pipeline = Arc::new(pipeline);

        for worker in 0..workers {
            let rx = rx.clone();
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    tracing::debug!(worker, channel = %job.channel, thread_ts = %job.thread_ts, "processing job");

                    let pipeline = pipeline.clone();
                    let handle = tokio::spawn(async move { pipeline.process(job).await });
                    if let Err(e) = handle.await {
                        tracing::error!(worker, error = %e, "background job panicked");
                    }
                }
            });
        }

        Self { tx }
    }

    /// Enqueue a job without blocking. Returns `false` when the queue is
    /// full; the caller still acknowledges the webhook.
    pub fn dispatch(&self, job: MentionJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "job queue full, dropping event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn idle_pipeline() -> Pipeline {
        let slack = Arc::new(SlackChannel::new(
            "http://127.0.0.1:1".to_string(),
            SecretString::from("xoxb-test".to_string()),
        ));
        let history = HistoryAssembler::new(slack.clone(), "UBOT".to_string(), 1000);
        let completion = CompletionClient::new(
            "http://127.0.0.1:1".to_string(),
            SecretString::from("sk-test".to_string()),
            "test-model".to_string(),
        );
        Pipeline::new(history, completion, slack)
    }

    fn job(n: usize) -> MentionJob {
        MentionJob {
            channel: "C1".to_string(),
            thread_ts: format!("{n}.0"),
        }
    }

    #[tokio::test]
    async fn full_queue_rejects_without_blocking() {
        // No workers drain the queue, so capacity is the hard limit.
        let dispatcher = Dispatcher::with_pool(idle_pipeline(), 0, 2);
        assert!(dispatcher.dispatch(job(1)));
        assert!(dispatcher.dispatch(job(2)));
        assert!(!dispatcher.dispatch(job(3)));
    }
}
