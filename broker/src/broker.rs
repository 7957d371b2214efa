use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{Arc, Weak},
};

use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::Payload;

/// A handle to the set of named topics.
///
/// Cloning is cheap, every clone publishes to and subscribes from the same topics.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

struct Inner {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Payload>>>,
}

impl Broker {
    /// Creates a new `Broker`.
    ///
    /// # Arguments
    /// * `capacity` - How many messages each topic buffers for its slowest subscriber.
    ///
    /// # Returns
    /// A new `Broker` instance without topics.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let inner = Inner {
            capacity: capacity.get(),
            topics: Mutex::new(HashMap::new()),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Delivers `payload` to every current subscriber of `topic`.
    ///
    /// # Returns
    /// The amount of subscribers the payload was delivered to, zero means it was dropped.
    pub fn publish(&self, topic: &str, payload: Payload) -> usize {
        let sender = self.inner.topics.lock().get(topic).cloned();

        let delivered = sender.and_then(|tx| tx.send(payload).ok()).unwrap_or(0);
        if delivered == 0 {
            debug!(topic = topic; "no subscribers, message dropped");
        }

        delivered
    }

    /// Subscribes to `topic`, creating it if needed.
    ///
    /// Only messages published after this call are received. The topic is
    /// removed again once its last subscription is dropped.
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let rx = self.sender(topic).subscribe();

        Subscription {
            topic: topic.to_string(),
            rx,
            broker: Arc::downgrade(&self.inner),
        }
    }

    /// The amount of live subscriptions to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .lock()
            .get(topic)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Payload> {
        let mut topics = self.inner.topics.lock();

        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .clone()
    }
}

/// The receiving end of a topic.
pub struct Subscription {
    topic: String,
    rx: broadcast::Receiver<Payload>,
    broker: Weak<Inner>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next message on the topic.
    ///
    /// Messages this subscriber fell too far behind on are skipped.
    ///
    /// # Returns
    /// The next payload or `None` once every broker handle is gone.
    pub async fn recv(&mut self) -> Option<Payload> {
        loop {
            match self.rx.recv().await {
                Ok(payload) => return Some(payload),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(topic = self.topic.as_str(), skipped = skipped; "subscriber lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.broker.upgrade() else {
            return;
        };

        let mut topics = inner.topics.lock();
        // `self.rx` is still alive here, so one receiver means this was the last one.
        if topics
            .get(&self.topic)
            .is_some_and(|tx| tx.receiver_count() <= 1)
        {
            topics.remove(&self.topic);
            debug!(topic = self.topic.as_str(); "topic removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn broker(capacity: usize) -> Broker {
        Broker::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[tokio::test]
    async fn publish_without_subscribers_drops() {
        let broker = broker(4);
        assert_eq!(broker.publish("nobody", json!(1)), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives() {
        let broker = broker(4);
        let mut one = broker.subscribe("t");
        let mut two = broker.subscribe("t");

        assert_eq!(broker.subscriber_count("t"), 2);
        assert_eq!(broker.publish("t", json!({ "n": 1 })), 2);

        assert_eq!(one.recv().await, Some(json!({ "n": 1 })));
        assert_eq!(two.recv().await, Some(json!({ "n": 1 })));
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let broker = broker(4);
        let mut a = broker.subscribe("a");
        let _b = broker.subscribe("b");

        broker.publish("b", json!("for b"));
        broker.publish("a", json!("for a"));

        assert_eq!(a.recv().await, Some(json!("for a")));
    }

    #[tokio::test]
    async fn lagging_subscribers_skip_ahead() {
        let broker = broker(2);
        let mut sub = broker.subscribe("t");

        for n in 0..5 {
            broker.publish("t", json!(n));
        }

        assert_eq!(sub.recv().await, Some(json!(3)));
        assert_eq!(sub.recv().await, Some(json!(4)));
    }

    #[tokio::test]
    async fn closes_with_the_broker() {
        let broker = broker(2);
        let mut sub = broker.subscribe("t");

        drop(broker);
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn dropped_subscriptions_are_not_counted() {
        let broker = broker(2);
        let sub = broker.subscribe("t");
        drop(sub);

        assert_eq!(broker.subscriber_count("t"), 0);
        assert_eq!(broker.publish("t", json!(1)), 0);
    }

    #[tokio::test]
    async fn topics_are_forgotten_with_their_last_subscription() {
        let broker = broker(2);
        let first = broker.subscribe("t");
        let second = broker.subscribe("t");

        drop(first);
        assert_eq!(broker.inner.topics.lock().len(), 1);
        assert_eq!(broker.subscriber_count("t"), 1);

        drop(second);
        assert!(broker.inner.topics.lock().is_empty());

        let mut again = broker.subscribe("t");
        assert_eq!(broker.publish("t", json!("fresh")), 1);
        assert_eq!(again.recv().await, Some(json!("fresh")));
    }

    #[tokio::test]
    async fn many_short_lived_topics_leave_nothing_behind() {
        let broker = broker(2);

        for n in 0..100 {
            drop(broker.subscribe(&format!("topic-{n}")));
        }

        assert!(broker.inner.topics.lock().is_empty());
    }
}
