// src/api/handlers/ws.rs
use actix::{Actor, Addr, AsyncContext, Handler, Message, StreamHandler};
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::AppState;
use crate::session::SessionEvent;

/// A session event on its way to WebSocket clients.
#[derive(Message, Clone, Serialize)]
#[rtype(result = "()")]
#[serde(transparent)]
pub struct SessionUpdate(pub SessionEvent);

#[derive(Clone, Default)]
pub struct WsBroker {
    clients: Arc<RwLock<Vec<Addr<WsConnection>>>>,
}

impl WsBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, addr: Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        clients.push(addr);
    }

    pub async fn unregister(&self, addr: &Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        clients.retain(|c| c != addr);
    }

    pub async fn broadcast(&self, msg: SessionUpdate) {
        let clients = self.clients.read().await;
        for client in clients.iter() {
            client.do_send(msg.clone());
        }
    }
}

pub struct WsConnection {
    broker: WsBroker,
    /// Only events of this session are sent when set.
    session: Option<String>,
}

impl WsConnection {
    pub fn new(broker: WsBroker, session: Option<String>) -> Self {
        Self { broker, session }
    }

    fn wants(&self, event: &SessionEvent) -> bool {
        self.session.as_deref().is_none_or(|id| id == event.session_id())
    }
}

impl Actor for WsConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.register(addr).await;
        });
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.unregister(&addr).await;
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => (),
        }
    }
}

impl Handler<SessionUpdate> for WsConnection {
    type Result = ();

    fn handle(&mut self, msg: SessionUpdate, ctx: &mut Self::Context) {
        if !self.wants(&msg.0) {
            return;
        }
        if let Ok(json) = serde_json::to_string(&msg) {
            ctx.text(json);
        }
    }
}

#[derive(Deserialize)]
pub struct WsQuery {
    pub session: Option<String>,
}

pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn = WsConnection::new(state.broker.clone(), query.into_inner().session);
    ws::start(conn, &req, stream)
}
