use std::{num::NonZeroUsize, sync::Arc};

use log::{debug, error};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{Broker, Payload, Subscription};

type Function = dyn Fn(Payload) -> Payload + Send + Sync;

/// Runs plain functions registered against an input and an output topic.
///
/// Each message published on the input topic is handed to the function on the
/// blocking pool and whatever it returns is published on the output topic.
pub struct Runtime {
    broker: Broker,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Runtime {
    /// Creates a new `Runtime` dispatching over `broker`.
    pub fn new(broker: Broker) -> Self {
        Self {
            broker,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// A token cancelled when the runtime shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Registers `f` to process every message of `input` and publish its result on `output`.
    ///
    /// The subscription is taken before returning, so every message published
    /// afterwards is dispatched. Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `input` - The topic to consume.
    /// * `output` - The topic to publish results on.
    /// * `concurrency` - How many invocations of `f` may be in flight at once,
    ///   with `1` results are published in arrival order.
    /// * `f` - The function to run.
    pub fn register<F>(&self, input: &str, output: &str, concurrency: NonZeroUsize, f: F)
    where
        F: Fn(Payload) -> Payload + Send + Sync + 'static,
    {
        let subscription = self.broker.subscribe(input);
        debug!(
            input = input,
            output = output,
            concurrency = concurrency.get();
            "registering function"
        );

        let dispatch = Dispatch {
            f: Arc::new(f),
            broker: self.broker.clone(),
            output: Arc::from(output),
            permits: Arc::new(Semaphore::new(concurrency.get())),
            tracker: self.tracker.clone(),
        };

        self.tracker.spawn(dispatch.run(subscription, self.cancel.clone()));
    }

    /// Stops every dispatch loop and waits for in-flight invocations to publish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        debug!("runtime stopped");
    }
}

struct Dispatch {
    f: Arc<Function>,
    broker: Broker,
    output: Arc<str>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl Dispatch {
    /// Drains `subscription` into a queue while invocations wait for a permit,
    /// so the topic buffer never fills up behind a slow function.
    async fn run(self, mut subscription: Subscription, cancel: CancellationToken) {
        let (queue, pending) = mpsc::unbounded_channel();
        let tracker = self.tracker.clone();
        tracker.spawn(self.invoke_all(pending));

        loop {
            let payload = tokio::select! {
                _ = cancel.cancelled() => break,
                payload = subscription.recv() => match payload {
                    Some(payload) => payload,
                    None => break,
                },
            };

            if queue.send(payload).is_err() {
                break;
            }
        }

        debug!(topic = subscription.topic(); "dispatch loop stopped");
    }

    /// Invokes the function on every queued payload in arrival order, until the queue closes.
    async fn invoke_all(self, mut pending: mpsc::UnboundedReceiver<Payload>) {
        while let Some(payload) = pending.recv().await {
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                break;
            };

            let f = Arc::clone(&self.f);
            let broker = self.broker.clone();
            let output = Arc::clone(&self.output);

            self.tracker.spawn(async move {
                let _permit = permit;

                match tokio::task::spawn_blocking(move || f(payload)).await {
                    Ok(result) => {
                        let delivered = broker.publish(&output, result);
                        debug!(topic = &*output, delivered = delivered; "published result");
                    }
                    Err(e) => error!("function registered on '{output}' failed: {e}"),
                }
            });
        }
    }
}
