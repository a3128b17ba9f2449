use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lichess_tg_stream::{QueueConsumer, StreamConfig};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::support::eventually_within;
use crate::support::harness::{Harness, ACCOUNT_ID};

const SUBSCRIBE: &str = r#"{"type":"subscribe","accountId":5}"#;

/// Just enough of a redis server for the consumer: `BLMOVE` really blocks
/// for the requested time, recovery finds nothing stranded.
#[derive(Default)]
struct ScriptedRedis {
    payloads: Mutex<VecDeque<String>>,
    hang_up_on_blmove: AtomicBool,
    recoveries: AtomicUsize,
    blmoves: AtomicUsize,
    acked: Mutex<Vec<String>>,
}

impl ScriptedRedis {
    async fn start(self) -> (SocketAddr, Arc<Self>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(self);
        let accepting = server.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(accepting.clone().serve(socket));
            }
        });
        (addr, server)
    }

    fn queued(payload: &str) -> Self {
        let server = Self::default();
        server.payloads.lock().push_back(payload.to_string());
        server
    }

    fn recoveries(&self) -> usize {
        self.recoveries.load(Ordering::SeqCst)
    }

    fn blmoves(&self) -> usize {
        self.blmoves.load(Ordering::SeqCst)
    }

    /// Nothing is handed out on the first `BLMOVE`, so it waits out its block time.
    fn next_payload(&self) -> Option<String> {
        if self.blmoves.fetch_add(1, Ordering::SeqCst) == 0 {
            return None;
        }
        self.payloads.lock().pop_front()
    }

    async fn serve(self: Arc<Self>, socket: TcpStream) {
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);

        while let Some(args) = read_command(&mut reader).await {
            let reply = match args[0].to_ascii_uppercase().as_str() {
                "LMOVE" => {
                    self.recoveries.fetch_add(1, Ordering::SeqCst);
                    "$-1\r\n".to_string()
                }
                "BLMOVE" => {
                    if self.hang_up_on_blmove.load(Ordering::SeqCst) {
                        return;
                    }
                    match self.next_payload() {
                        Some(payload) => format!("${}\r\n{payload}\r\n", payload.len()),
                        None => {
                            let secs: f64 = args[5].parse().unwrap();
                            sleep(Duration::from_secs_f64(secs)).await;
                            "$-1\r\n".to_string()
                        }
                    }
                }
                "LREM" => {
                    self.acked.lock().push(args[3].clone());
                    ":1\r\n".to_string()
                }
                _ => "+OK\r\n".to_string(),
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

async fn read_command(reader: &mut BufReader<OwnedReadHalf>) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

fn config(redis_url: String, block_ms: &str) -> StreamConfig {
    StreamConfig::from_lookup(|name| match name {
        "BOT_TOKEN" => Some("123:abc".to_string()),
        "REDIS_URL" => Some(redis_url.clone()),
        "QUEUE_NAME" => Some("test-queue".to_string()),
        "QUEUE_BLOCK_TIMEOUT_MS" => Some(block_ms.to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn long_blocking_reads_keep_one_connection() {
    let h = Harness::new();
    let (addr, server) = ScriptedRedis::queued(SUBSCRIBE).start().await;
    let shutdown = CancellationToken::new();
    let cfg = config(format!("redis://{addr}/"), "1000");
    let task = tokio::spawn(QueueConsumer::new(&cfg, h.registry.clone()).run(shutdown.clone()));

    eventually_within("subscribe after an empty block", Duration::from_secs(4), || {
        h.registry.is_subscribed(ACCOUNT_ID)
    })
    .await;
    eventually_within("payload acknowledged", Duration::from_secs(2), || {
        server.acked.lock().len() == 1
    })
    .await;
    assert_eq!(server.acked.lock()[0], SUBSCRIBE);

    // A second full-length block returning nil must not trip the client either.
    eventually_within("another empty block", Duration::from_secs(4), || {
        server.blmoves() >= 4
    })
    .await;
    assert_eq!(server.recoveries(), 1, "consumer reconnected during a blocking read");

    shutdown.cancel();
    timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn reconnect_delay_starts_over_after_each_session() {
    let h = Harness::new();
    let server = ScriptedRedis::default();
    server.hang_up_on_blmove.store(true, Ordering::SeqCst);
    let (addr, server) = server.start().await;
    let shutdown = CancellationToken::new();
    let cfg = config(format!("redis://{addr}/"), "400");
    let task = tokio::spawn(QueueConsumer::new(&cfg, h.registry.clone()).run(shutdown.clone()));

    // Each session connects and recovers before the drop, so every retry
    // waits about a second; growing delays would need well over five.
    eventually_within("four sessions", Duration::from_millis(4500), || server.recoveries() >= 4)
        .await;

    shutdown.cancel();
    timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn invalid_redis_url_stops_the_consumer() {
    let h = Harness::new();
    let shutdown = CancellationToken::new();
    let cfg = config("not a url".to_string(), "400");

    let run = QueueConsumer::new(&cfg, h.registry.clone()).run(shutdown);
    timeout(Duration::from_secs(2), run).await.unwrap();
    assert!(!h.registry.is_subscribed(ACCOUNT_ID));
}
