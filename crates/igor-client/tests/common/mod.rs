//! Test utilities: an in-process double of the Igor service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use igor_client::Speech;

/// WebSocket server that hands each accepted connection to the test
/// body as a [`TestConnection`].
pub struct TestServer {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<TestConnection>,
}

/// One accepted client connection, driven by the test.
pub struct TestConnection {
    push_tx: mpsc::UnboundedSender<String>,
    frames: mpsc::UnboundedReceiver<String>,
    drop_tx: Option<oneshot::Sender<()>>,
}

impl TestConnection {
    /// Push a text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.push_tx.send(frame.into());
    }

    /// Abruptly drop the connection, simulating a transport failure
    /// (no close handshake).
    pub fn abort(&mut self) {
        if let Some(tx) = self.drop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Next frame received from the client.
    pub async fn recv_frame(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.frames.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("connection task stopped")
    }

    /// Assert no frame arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(frame) = tokio::time::timeout(window, self.frames.recv()).await {
            panic!("expected no frame, got {:?}", frame);
        }
    }
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn next_connection(&mut self) -> TestConnection {
        tokio::time::timeout(Duration::from_secs(5), self.connections.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("server task stopped")
    }

    /// True if a client connects within `window`.
    pub async fn connects_within(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.connections.recv())
            .await
            .is_ok()
    }
}

pub async fn spawn_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("binding test listener");
    let addr = listener.local_addr().expect("listener address");
    let (conn_tx, connections) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let Ok(ws) = accept_async(stream).await else {
                continue;
            };

            let (push_tx, mut push_rx) = mpsc::unbounded_channel::<String>();
            let (frame_tx, frames) = mpsc::unbounded_channel::<String>();
            let (drop_tx, mut drop_rx) = oneshot::channel::<()>();

            if conn_tx
                .send(TestConnection {
                    push_tx,
                    frames,
                    drop_tx: Some(drop_tx),
                })
                .is_err()
            {
                break;
            }

            tokio::spawn(async move {
                let (mut write, mut read) = ws.split();
                loop {
                    tokio::select! {
                        _ = &mut drop_rx => break,
                        frame = push_rx.recv() => match frame {
                            Some(frame) => {
                                if write.send(Message::text(frame)).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        },
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                let _ = frame_tx.send(text.as_str().to_owned());
                            }
                            Some(Ok(_)) => {}
                            _ => break,
                        },
                    }
                }
                // Dropping both halves tears down the TCP stream.
            });
        }
    });

    TestServer { addr, connections }
}

/// Records every narrated string, for assertions.
#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Speech for RecordingSpeech {
    async fn narrate(&self, text: &str) -> Result<()> {
        self.spoken.lock().await.push(text.to_string());
        Ok(())
    }
}
