use crate::{finite_non_negative, MetricError, MetricSource};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Queue-depth metric source: reports the current length of a named queue
/// on a broker reachable over TCP. The wire protocol is a minimal
/// line-based reference ("LENGTH <queue>\n" -> "<n>\n") standing in for
/// whatever a real broker's client library speaks; spec.md treats the
/// broker's actual wire format as out of scope.
pub struct QueueDepthSource {
    host: String,
    port: u16,
    queue: String,
    use_tls: bool,
    conn: Mutex<Option<TcpStream>>,
}

impl QueueDepthSource {
    pub fn new(host: String, port: u16, queue: String, use_tls: bool) -> Self {
        Self {
            host,
            port,
            queue,
            use_tls,
            conn: Mutex::new(None),
        }
    }

    async fn ensure_connected(&self, guard: &mut Option<TcpStream>) -> Result<(), MetricError> {
        if guard.is_some() {
            return Ok(());
        }
        let addr = format!("{}:{}", self.host, self.port);
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
            .await
            .map_err(|_| MetricError::Unavailable)?
            .map_err(|_| MetricError::Unavailable)?;
        *guard = Some(stream);
        Ok(())
    }
}

#[async_trait]
impl MetricSource for QueueDepthSource {
    async fn sample(&self) -> Result<f64, MetricError> {
        let mut guard = self.conn.lock().await;
        if self.ensure_connected(&mut guard).await.is_err() {
            *guard = None;
            return Err(MetricError::Unavailable);
        }

        let result: Result<f64, MetricError> = async {
            let stream = guard.as_mut().expect("connection established above");
            let command = format!("LENGTH {}\n", self.queue);
            stream
                .write_all(command.as_bytes())
                .await
                .map_err(|_| MetricError::Unavailable)?;

            let mut buf = [0u8; 64];
            let n = tokio::time::timeout(CONNECT_TIMEOUT, stream.read(&mut buf))
                .await
                .map_err(|_| MetricError::Unavailable)?
                .map_err(|_| MetricError::Unavailable)?;
            if n == 0 {
                return Err(MetricError::Unavailable);
            }
            let text = std::str::from_utf8(&buf[..n]).map_err(|_| MetricError::Unavailable)?;
            let value: f64 = text.trim().parse().map_err(|_| MetricError::Unavailable)?;
            finite_non_negative(value)
        }
        .await;

        if result.is_err() {
            // Drop the stream so the next sample reconnects from scratch.
            *guard = None;
        }
        result
    }

    async fn validate(&self) -> Result<(), MetricError> {
        if self.use_tls {
            return Err(MetricError::Config(
                "TLS is not supported by this queue-depth source".to_string(),
            ));
        }
        if self.host.is_empty() || self.queue.is_empty() {
            return Err(MetricError::Config(
                "queue-depth source requires a non-empty host and queue name".to_string(),
            ));
        }
        Ok(())
    }

    async fn close(&self) {
        let mut guard = self.conn.lock().await;
        if guard.take().is_some() {
            debug!(queue = %self.queue, "queue-depth connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn sample_reads_length_from_broker() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(std::str::from_utf8(&buf[..n]).unwrap().starts_with("LENGTH"));
            socket.write_all(b"42\n").await.unwrap();
        });

        let source = QueueDepthSource::new(addr.ip().to_string(), addr.port(), "jobs".to_string(), false);
        let value = source.sample().await.unwrap();
        assert_eq!(value, 42.0);
        source.close().await;
        source.close().await; // idempotent
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        let source = QueueDepthSource::new("127.0.0.1".to_string(), 1, "jobs".to_string(), false);
        let err = source.sample().await.unwrap_err();
        assert_eq!(err, MetricError::Unavailable);
    }

    #[tokio::test]
    async fn tls_is_unsupported_config_error() {
        let source = QueueDepthSource::new("localhost".to_string(), 5672, "jobs".to_string(), true);
        assert!(matches!(source.validate().await, Err(MetricError::Config(_))));
    }
}
