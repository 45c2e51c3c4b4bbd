//! Live session socket: snapshot first, then change events.

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::TournamentEngine;
use crate::extractors::device::DeviceId;
use crate::realtime::events::ChangeEvent;
use crate::realtime::gateway::{SignalStream, SyncSignal};
use crate::realtime::protocol::{ClientMsg, ErrorCode, ServerMsg, PROTOCOL_VERSION};
use crate::services::aggregates::SessionSnapshot;
use crate::state::app_state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `GET /api/sessions/{id}/live`
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    device: DeviceId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let engine = app_state.engine().clone();
    let participant = engine.resolve_in_session(&session_id, device.as_str()).await?;

    // Subscribe before the snapshot is read so nothing falls in between.
    let signals = engine.subscribe(&session_id).into_stream();
    let socket = LiveSocket::new(session_id, participant.id, engine, signals);
    ws::start(socket, &req, stream)
}

pub struct LiveSocket {
    conn_id: Uuid,
    session_id: String,
    participant_id: String,
    engine: TournamentEngine,
    signals: Option<SignalStream>,

    last_heartbeat: Instant,
    /// Sequence of the snapshot last sent; `None` while one is loading.
    snapshot_seq: Option<u64>,
    /// Events that arrived while a snapshot was loading.
    pending: Vec<ChangeEvent>,
    hello_sent: bool,
}

impl LiveSocket {
    fn new(
        session_id: String,
        participant_id: String,
        engine: TournamentEngine,
        signals: SignalStream,
    ) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            session_id,
            participant_id,
            engine,
            signals: Some(signals),
            last_heartbeat: Instant::now(),
            snapshot_seq: None,
            pending: Vec::new(),
            hello_sent: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[LIVE] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let msg = ServerMsg::Error {
            code,
            message: message.into(),
        };
        Self::send_json(ctx, &msg);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    session_id = %actor.session_id,
                    "[LIVE] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Load a snapshot and send it; buffered events newer than it follow.
    fn load_snapshot(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        self.snapshot_seq = None;
        let engine = self.engine.clone();
        let session_id = self.session_id.clone();

        ctx.spawn(
            async move { engine.session_snapshot(&session_id).await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(snapshot) => actor.deliver_snapshot(ctx, snapshot),
                    Err(err) => {
                        warn!(
                            conn_id = %actor.conn_id,
                            session_id = %actor.session_id,
                            error = %err,
                            "[LIVE] snapshot failed"
                        );
                        actor.send_error_and_close(
                            ctx,
                            ErrorCode::SnapshotFailed,
                            "Could not load session state",
                        );
                    }
                }),
        );
    }

    fn deliver_snapshot(&mut self, ctx: &mut ws::WebsocketContext<Self>, snapshot: SessionSnapshot) {
        let seq = snapshot.seq;
        let msg = if self.hello_sent {
            ServerMsg::Snapshot { snapshot }
        } else {
            self.hello_sent = true;
            ServerMsg::Hello {
                protocol: PROTOCOL_VERSION,
                participant_id: self.participant_id.clone(),
                snapshot,
            }
        };
        Self::send_json(ctx, &msg);
        self.snapshot_seq = Some(seq);

        for event in std::mem::take(&mut self.pending) {
            if event.seq > seq {
                Self::send_json(ctx, &ServerMsg::Change { event });
            }
        }
    }
}

impl Actor for LiveSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            session_id = %self.session_id,
            participant_id = %self.participant_id,
            "[LIVE] started"
        );
        if let Some(signals) = self.signals.take() {
            ctx.add_stream(signals);
        }
        self.start_heartbeat(ctx);
        self.load_snapshot(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            session_id = %self.session_id,
            "[LIVE] stopped"
        );
    }
}

impl StreamHandler<SyncSignal> for LiveSocket {
    fn handle(&mut self, signal: SyncSignal, ctx: &mut Self::Context) {
        match signal {
            SyncSignal::Event(event) => match self.snapshot_seq {
                Some(seq) if event.seq > seq => {
                    Self::send_json(ctx, &ServerMsg::Change { event });
                }
                Some(_) => {}
                None => self.pending.push(event),
            },
            SyncSignal::ResyncRequired { missed } => {
                warn!(
                    conn_id = %self.conn_id,
                    session_id = %self.session_id,
                    missed,
                    "[LIVE] subscriber lagged; resyncing"
                );
                self.pending.clear();
                Self::send_json(ctx, &ServerMsg::Resync { missed });
                self.load_snapshot(ctx);
            }
        }
    }

    /// The session's channel closed (session finished).
    fn finished(&mut self, ctx: &mut Self::Context) {
        debug!(session_id = %self.session_id, "[LIVE] channel closed");
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
        ctx.stop();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for LiveSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::Resync) => {
                        if self.snapshot_seq.is_some() {
                            self.load_snapshot(ctx);
                        }
                    }
                    Err(_) => {
                        self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON")
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    session_id = %self.session_id,
                    error = %err,
                    "[LIVE] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
