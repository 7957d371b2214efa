//! Bridges network clients onto the broker's topics.
//!
//! A client publishes by sending `Msg::Data` envelopes and receives the
//! messages of a topic as `Msg::Data` envelopes after a `Command::Subscribe`.

use std::{
    collections::{HashMap, hash_map::Entry},
    io,
};

use comms::msg::{Command, Envelope, Msg};
use log::{debug, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{Broker, Subscription};

const OUTBOX_SIZE: usize = 256;

/// Accepts clients on `listener` until `cancel` fires, then waits for open connections to close.
///
/// # Arguments
/// * `listener` - The bound listener.
/// * `broker` - The topics clients publish to and subscribe from.
/// * `cancel` - Stops the accept loop and every open connection.
pub async fn serve(listener: TcpListener, broker: Broker, cancel: CancellationToken) {
    let tracker = TaskTracker::new();

    loop {
        let (stream, addr) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("failed to accept a client: {e}");
                    continue;
                }
            },
        };

        info!("client connected from {addr}");
        let broker = broker.clone();
        let cancel = cancel.clone();

        tracker.spawn(async move {
            if let Err(e) = serve_connection(stream, broker, cancel).await {
                warn!("connection with {addr} failed: {e}");
            }
            info!("client {addr} disconnected");
        });
    }

    tracker.close();
    tracker.wait().await;
}

/// Serves a single client over `stream` until it disconnects or `cancel` fires.
///
/// Frames that fail to decode are answered with `Msg::Err` and the connection
/// stays open.
///
/// # Returns
/// `Ok(())` on a clean disconnect or the I/O error that broke the connection.
pub async fn serve_connection<S>(stream: S, broker: Broker, cancel: CancellationToken) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (rx, tx) = tokio::io::split(stream);
    let (mut rx, mut tx) = comms::channel(rx, tx);
    let (outbox, mut pending) = mpsc::channel::<Msg>(OUTBOX_SIZE);

    let writer = tokio::spawn(async move {
        while let Some(msg) = pending.recv().await {
            tx.send(&msg).await?;

            if matches!(msg, Msg::Control(Command::Disconnect)) {
                break;
            }
        }

        io::Result::Ok(())
    });

    let mut forwarders: HashMap<String, JoinHandle<()>> = HashMap::new();

    let result = loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            msg = rx.recv::<Msg>() => msg,
        };

        if let Ok(msg) = &msg {
            debug!(kind = msg.kind(); "received a client message");
        }

        match msg {
            Ok(Msg::Data(Envelope { topic, payload })) => {
                let delivered = broker.publish(&topic, payload);
                debug!(topic = topic.as_str(), delivered = delivered; "client published");
            }
            Ok(Msg::Control(Command::Subscribe { topic })) => {
                if let Entry::Vacant(entry) = forwarders.entry(topic) {
                    let subscription = broker.subscribe(entry.key());
                    entry.insert(tokio::spawn(forward(subscription, outbox.clone())));
                }
            }
            Ok(Msg::Control(Command::Unsubscribe { topic })) => {
                if let Some(forwarder) = forwarders.remove(&topic) {
                    forwarder.abort();
                }
            }
            Ok(Msg::Control(Command::Disconnect)) => {
                let _ = outbox.send(Msg::Control(Command::Disconnect)).await;
                break Ok(());
            }
            Ok(Msg::Err(detail)) => warn!("client reported an error: {detail}"),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("rejected an invalid frame: {e}");
                if outbox.send(Msg::Err(e.to_string())).await.is_err() {
                    break Ok(());
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    for (_, forwarder) in forwarders.drain() {
        forwarder.abort();
    }
    drop(outbox);

    match writer.await {
        Ok(Err(e)) => debug!("writer stopped: {e}"),
        Err(e) => warn!("writer task failed: {e}"),
        Ok(Ok(())) => {}
    }

    result
}

async fn forward(mut subscription: Subscription, outbox: mpsc::Sender<Msg>) {
    while let Some(payload) = subscription.recv().await {
        let msg = Msg::Data(Envelope::new(subscription.topic(), payload));

        if outbox.send(msg).await.is_err() {
            break;
        }
    }
}
