/// Transport bridge: line-delimited JSON over TCP
///
/// One accepted connection is one transport. Inbound lines are parsed as
/// `InboundEvent` and handed to the session; outbound intents are written
/// back as JSON lines. Reconnect, backoff and handshake policy belong to
/// the transport, not here.
use crate::config::{Config, Role};
use crate::console::AgentConsole;
use crate::error::{ChatError, Result};
use crate::events::InboundEvent;
use crate::notify::Notifier;
use crate::outbound::ChannelSink;
use crate::session::UserSession;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

enum Session {
    User(UserSession),
    Console(AgentConsole),
}

impl Session {
    fn register(&mut self, display_name: &str) {
        match self {
            Session::User(s) => s.register(display_name),
            Session::Console(c) => c.register(display_name),
        }
    }

    fn handle_event(&mut self, event: InboundEvent) {
        match self {
            Session::User(s) => s.handle_event(event),
            Session::Console(c) => c.handle_event(event),
        }
    }
}

/// Bind the listening socket. Split out from [`serve`] so callers can
/// bind port 0 and read back the assigned address.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(ChatError::Io)?;
    info!("bridge listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Bind and accept transports forever.
pub async fn run(config: Config) -> Result<()> {
    let listener = bind(&config).await?;
    serve(listener, config).await
}

/// Accept transports forever. Each connection hosts its own session.
pub async fn serve(listener: TcpListener, config: Config) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("transport connected from {}", addr);
                let config = config.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_transport(stream, config).await {
                        error!("transport error: {}", e);
                    }
                });
            }
            Err(e) => error!("accept error: {}", e),
        }
    }
}

async fn handle_transport(stream: TcpStream, config: Config) -> Result<()> {
    let (sink, mut intents) = ChannelSink::new();
    let sink = Arc::new(sink);
    let notifier = Notifier::new(config.notify_capacity);

    // Projection feed: surface state changes in the structured log
    let mut changes = notifier.subscribe();
    let projection = tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            debug!(
                "state change: {}",
                serde_json::to_string(&change).unwrap_or_default()
            );
        }
    });

    let mut session = match config.role {
        Role::User => Session::User(UserSession::new(sink.clone(), notifier.clone())),
        Role::Console => Session::Console(AgentConsole::new(sink.clone(), notifier.clone())),
    };
    session.register(&config.display_name);

    let (reader, mut writer) = stream.into_split();
    let write_task = tokio::spawn(async move {
        while let Some(intent) = intents.recv().await {
            let Ok(json) = serde_json::to_string(&intent) else {
                continue;
            };
            if writer.write_all(json.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("transport disconnected");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundEvent>(trimmed) {
                    Ok(event) => session.handle_event(event),
                    // Boundary validation: malformed lines are logged, never fatal
                    Err(e) => debug!("ignoring malformed event: {}", e),
                }
            }
            Err(e) => {
                error!("transport read error: {}", e);
                break;
            }
        }
    }

    // Dropping the session closes the intent channel, which ends the writer
    drop(session);
    drop(sink);
    let _ = write_task.await;
    projection.abort();
    Ok(())
}
