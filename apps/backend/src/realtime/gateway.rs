//! Per-session fan-out of committed changes.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::realtime::events::{ChangeEvent, EventBatch};

/// Subscription health as seen by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Connected,
    /// Events were missed; the client must re-fetch full state.
    Reconnecting,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncSignal {
    Event(ChangeEvent),
    /// The subscriber fell behind the buffer and `missed` events are gone.
    ResyncRequired { missed: u64 },
}

struct ChannelState {
    /// Sequence of the last event sent on this channel.
    last_seq: u64,
    tx: broadcast::Sender<ChangeEvent>,
}

struct Channel {
    state: Mutex<ChannelState>,
}

impl Channel {
    fn new(capacity: usize, last_seq: u64) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            state: Mutex::new(ChannelState { last_seq, tx }),
        }
    }

    fn is_idle(&self) -> bool {
        self.state.lock().tx.receiver_count() == 0
    }
}

type Channels = DashMap<String, Arc<Channel>>;

/// Channels exist only while someone listens. Sequence numbers come from one
/// gateway-wide counter, so they keep increasing for a session across
/// channel lifetimes.
pub struct SyncGateway {
    channels: Arc<Channels>,
    seq: AtomicU64,
    capacity: usize,
}

impl SyncGateway {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            seq: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Assign sequence numbers and fan the batch out. Returns the events as
    /// delivered.
    pub fn publish(&self, batch: EventBatch) -> Vec<ChangeEvent> {
        let mut delivered: Vec<ChangeEvent> = Vec::with_capacity(batch.len());
        let mut idle: Vec<String> = Vec::new();
        for change in batch.into_changes() {
            let channel = self
                .channels
                .get(&change.session_id)
                .map(|c| Arc::clone(c.value()));
            let (event, receivers) = match channel {
                Some(channel) => {
                    let mut state = channel.state.lock();
                    let event = change.sequenced(self.next_seq());
                    state.last_seq = event.seq;
                    (event.clone(), state.tx.send(event).unwrap_or(0))
                }
                // Nobody listens; late subscribers start from a snapshot.
                None => (change.sequenced(self.next_seq()), 0),
            };
            debug!(
                session_id = %event.session_id,
                entity = ?event.entity,
                id = %event.id,
                seq = event.seq,
                receivers,
                "change published"
            );
            if receivers == 0 && !idle.contains(&event.session_id) {
                idle.push(event.session_id.clone());
            }
            delivered.push(event);
        }
        for session_id in idle {
            evict_if_idle(&self.channels, &session_id);
        }
        delivered
    }

    pub fn subscribe(&self, session_id: &str) -> Subscription {
        // Subscribe under the entry guard so an eviction cannot remove the
        // channel between lookup and subscribe.
        let rx = {
            let entry = self
                .channels
                .entry(session_id.to_string())
                .or_insert_with(|| {
                    Arc::new(Channel::new(self.capacity, self.seq.load(Ordering::SeqCst)))
                });
            let rx = entry.state.lock().tx.subscribe();
            rx
        };
        Subscription {
            rx,
            lease: ChannelLease {
                channels: Arc::downgrade(&self.channels),
                session_id: session_id.to_string(),
            },
            status: ConnectivityStatus::Connected,
        }
    }

    /// Highest sequence number a snapshot taken now must cover. Every event
    /// published afterwards for the session carries a larger one.
    pub fn current_seq(&self, session_id: &str) -> u64 {
        self.channels
            .get(session_id)
            .map(|c| c.state.lock().last_seq)
            .unwrap_or_else(|| self.seq.load(Ordering::SeqCst))
    }

    /// Drop the session's channel; subscribers observe a disconnect.
    pub fn close(&self, session_id: &str) {
        if self.channels.remove(session_id).is_some() {
            info!(session_id, "sync channel closed");
        }
    }

    /// Sessions with an open channel.
    pub fn open_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.channels
            .get(session_id)
            .map(|c| c.state.lock().tx.receiver_count())
            .unwrap_or(0)
    }
}

fn evict_if_idle(channels: &Channels, session_id: &str) {
    if channels
        .remove_if(session_id, |_, channel| channel.is_idle())
        .is_some()
    {
        debug!(session_id, "idle sync channel evicted");
    }
}

/// Evicts the session's channel when the last listener goes away.
struct ChannelLease {
    channels: Weak<Channels>,
    session_id: String,
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        if let Some(channels) = self.channels.upgrade() {
            evict_if_idle(&channels, &self.session_id);
        }
    }
}

// Field order matters: the receiver is dropped before the lease checks for
// remaining listeners.
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    lease: ChannelLease,
    status: ConnectivityStatus,
}

impl Subscription {
    pub fn session_id(&self) -> &str {
        &self.lease.session_id
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.status
    }

    /// Next event or resync signal; `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<SyncSignal> {
        if self.status == ConnectivityStatus::Disconnected {
            return None;
        }
        match self.rx.recv().await {
            Ok(event) => Some(SyncSignal::Event(event)),
            Err(RecvError::Lagged(missed)) => {
                self.status = ConnectivityStatus::Reconnecting;
                Some(SyncSignal::ResyncRequired { missed })
            }
            Err(RecvError::Closed) => {
                self.status = ConnectivityStatus::Disconnected;
                None
            }
        }
    }

    /// The client re-fetched full state after a resync signal.
    pub fn resynced(&mut self) {
        if self.status == ConnectivityStatus::Reconnecting {
            self.status = ConnectivityStatus::Connected;
        }
    }

    /// Raw receiver, for callers that poll without connectivity tracking.
    /// The channel is then only evicted by a later idle publish or `close`.
    pub fn into_receiver(self) -> broadcast::Receiver<ChangeEvent> {
        self.rx
    }

    /// The subscription as a stream of signals; dropping the stream
    /// releases the channel.
    pub fn into_stream(self) -> SignalStream {
        let inner = BroadcastStream::new(self.rx).map(|item| match item {
            Ok(event) => SyncSignal::Event(event),
            Err(BroadcastStreamRecvError::Lagged(missed)) => SyncSignal::ResyncRequired { missed },
        });
        SignalStream {
            inner: Box::pin(inner),
            _lease: self.lease,
        }
    }
}

pub struct SignalStream {
    inner: Pin<Box<dyn Stream<Item = SyncSignal> + Send>>,
    _lease: ChannelLease,
}

impl Stream for SignalStream {
    type Item = SyncSignal;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::teams::Team;

    fn team(id: &str) -> Team {
        Team {
            id: id.into(),
            session_id: "s1".into(),
            name: id.into(),
            score: 0.0,
        }
    }

    fn batch_of(ids: &[&str]) -> EventBatch {
        let mut batch = EventBatch::new();
        for id in ids {
            batch.upsert("s1", &team(id));
        }
        batch
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_sequence() {
        let gateway = SyncGateway::new(16);
        let mut sub = gateway.subscribe("s1");
        gateway.publish(batch_of(&["a", "b"]));

        let mut seqs = Vec::new();
        for _ in 0..2 {
            match sub.next().await {
                Some(SyncSignal::Event(e)) => seqs.push(e.seq),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(gateway.current_seq("s1"), 2);
        assert_eq!(sub.status(), ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn lagging_subscriber_must_resync() {
        let gateway = SyncGateway::new(2);
        let mut sub = gateway.subscribe("s1");
        gateway.publish(batch_of(&["a", "b", "c", "d"]));

        assert!(matches!(
            sub.next().await,
            Some(SyncSignal::ResyncRequired { .. })
        ));
        assert_eq!(sub.status(), ConnectivityStatus::Reconnecting);
        sub.resynced();
        assert_eq!(sub.status(), ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn closing_disconnects() {
        let gateway = SyncGateway::new(4);
        let mut sub = gateway.subscribe("s1");
        gateway.close("s1");
        assert!(sub.next().await.is_none());
        assert_eq!(sub.status(), ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn sequences_keep_increasing_per_session() {
        let gateway = SyncGateway::new(4);
        let mut s1 = gateway.subscribe("s1");
        let _s2 = gateway.subscribe("s2");
        gateway.publish(batch_of(&["a"]));
        let mut other = EventBatch::new();
        other.upsert("s2", &team("x"));
        let delivered = gateway.publish(other);
        gateway.publish(batch_of(&["b"]));

        assert_eq!(delivered[0].seq, 2);
        assert_eq!(gateway.current_seq("s2"), 2);
        assert_eq!(gateway.current_seq("s1"), 3);
        let mut seqs = Vec::new();
        for _ in 0..2 {
            if let Some(SyncSignal::Event(e)) = s1.next().await {
                seqs.push(e.seq);
            }
        }
        assert_eq!(seqs, vec![1, 3]);
    }

    #[test]
    fn channels_live_only_while_someone_listens() {
        let gateway = SyncGateway::new(4);
        gateway.publish(batch_of(&["a"]));
        assert_eq!(gateway.open_channels(), 0);

        let first = gateway.subscribe("s1");
        let second = gateway.subscribe("s1");
        assert_eq!(gateway.open_channels(), 1);
        drop(first);
        assert_eq!(gateway.subscriber_count("s1"), 1);
        drop(second);
        assert_eq!(gateway.open_channels(), 0);

        // A receiver detached from its lease is cleaned up by the next
        // publish that reaches nobody.
        let rx = gateway.subscribe("s1").into_receiver();
        assert_eq!(gateway.open_channels(), 1);
        drop(rx);
        gateway.publish(batch_of(&["b"]));
        assert_eq!(gateway.open_channels(), 0);
    }

    #[tokio::test]
    async fn recreated_channel_continues_the_sequence() {
        let gateway = SyncGateway::new(4);
        let sub = gateway.subscribe("s1");
        gateway.publish(batch_of(&["a", "b"]));
        drop(sub);

        let snapshot_seq = gateway.current_seq("s1");
        assert_eq!(snapshot_seq, 2);
        let mut sub = gateway.subscribe("s1");
        assert_eq!(gateway.current_seq("s1"), snapshot_seq);
        gateway.publish(batch_of(&["c"]));
        match sub.next().await {
            Some(SyncSignal::Event(e)) => assert!(e.seq > snapshot_seq),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn signal_stream_reports_lag_and_releases_on_drop() {
        let gateway = SyncGateway::new(2);
        let mut stream = gateway.subscribe("s1").into_stream();
        gateway.publish(batch_of(&["a", "b", "c", "d"]));

        assert!(matches!(
            stream.next().await,
            Some(SyncSignal::ResyncRequired { missed: 2 })
        ));
        assert!(matches!(stream.next().await, Some(SyncSignal::Event(_))));
        drop(stream);
        assert_eq!(gateway.open_channels(), 0);
    }
}
