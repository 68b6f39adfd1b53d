use crate::broker::RequestProcessor;
use crate::config::BrokerConfig;
use crate::metadata::{load_metadata, MetadataLookup};
use crate::metrics::BrokerMetrics;
use crate::protocol::kafka::{KafkaCodec, KafkaFrameCodec};
use crate::storage::{DiskLogStorage, LogStorage};
use crate::{KraftmqError, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

pub struct BrokerServer {
    config: BrokerConfig,
    processor: Arc<RequestProcessor>,
    metrics: Arc<BrokerMetrics>,
    // Graceful shutdown coordination
    shutdown_tx: broadcast::Sender<()>,
}

impl BrokerServer {
    /// Load the metadata log and open the partition log directory named in
    /// `config`. A missing or corrupt metadata log yields an empty index.
    pub fn new(config: BrokerConfig) -> Result<Self> {
        config.validate().map_err(KraftmqError::Config)?;

        let metadata = Arc::new(load_metadata(&config.metadata_log_path));
        let logs = Arc::new(DiskLogStorage::new(&config.log_dir));
        info!(
            "Metadata: {} topics, {} partitions; partition logs under {}",
            metadata.topic_count(),
            metadata.partition_count(),
            config.log_dir.display()
        );
        Ok(Self::with_components(config, metadata, logs))
    }

    /// Build a server over caller-supplied metadata and log storage.
    pub fn with_components(
        config: BrokerConfig,
        metadata: Arc<dyn MetadataLookup>,
        logs: Arc<dyn LogStorage>,
    ) -> Self {
        let metrics = Arc::new(BrokerMetrics::new());
        let processor =
            Arc::new(RequestProcessor::new(metadata, logs).with_metrics(Arc::clone(&metrics)));
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            config,
            processor,
            metrics,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<BrokerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Initiate graceful shutdown of the listener and all open connections
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(());
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr).await?;
        info!("kraftmq broker listening on {}", addr);
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => self.spawn_connection(stream, peer_addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal, stopping server gracefully...");
                    break;
                }
            }
        }

        info!("Server shutdown complete: {:?}", self.metrics.snapshot());
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer_addr: SocketAddr) {
        if let Err(e) = Self::optimize_client_socket(&stream) {
            warn!("Failed to tune client socket {}: {}", peer_addr, e);
        }

        self.metrics.connection_opened();
        info!(
            "New client connected: {} (active: {})",
            peer_addr,
            self.metrics.active_connections()
        );

        let processor = Arc::clone(&self.processor);
        let metrics = Arc::clone(&self.metrics);
        let codec = KafkaFrameCodec::new(self.config.max_frame_bytes);
        let read_buffer_size = self.config.read_buffer_size;
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let framed = Framed::with_capacity(stream, codec, read_buffer_size);
            if let Err(e) =
                Self::handle_client(framed, peer_addr, &processor, &metrics, shutdown_rx).await
            {
                error!("Error handling client {}: {}", peer_addr, e);
            }
            metrics.connection_closed();
            info!(
                "Client {} disconnected (active: {}, requests: {})",
                peer_addr,
                metrics.active_connections(),
                metrics.total_requests()
            );
        });
    }

    fn optimize_client_socket(stream: &TcpStream) -> Result<()> {
        use socket2::SockRef;

        let socket_ref = SockRef::from(stream);
        // Responses are small and latency bound
        socket_ref.set_nodelay(true)?;
        socket_ref.set_keepalive(true)?;
        Ok(())
    }

    /// Sequential request/response loop for one connection.
    ///
    /// An undecodable request is logged and skipped; framing and I/O errors
    /// end the connection.
    async fn handle_client(
        mut framed: Framed<TcpStream, KafkaFrameCodec>,
        peer_addr: SocketAddr,
        processor: &Arc<RequestProcessor>,
        metrics: &BrokerMetrics,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        loop {
            let frame = tokio::select! {
                frame = framed.next() => frame,
                _ = shutdown_rx.recv() => {
                    debug!("Closing connection {} for shutdown", peer_addr);
                    return Ok(());
                }
            };
            let Some(frame) = frame else {
                return Ok(());
            };
            let frame = frame?;
            metrics.request_received();

            let request = match KafkaCodec::decode_request(&frame) {
                Ok(request) => request,
                Err(e) => {
                    metrics.decode_error();
                    warn!("Failed to decode request from {}: {}", peer_addr, e);
                    continue;
                }
            };
            debug!(
                "Request from {}: api_key={} api_version={} correlation_id={}",
                peer_addr, request.api_key, request.api_version, request.correlation_id
            );

            // Log storage does blocking file I/O
            let worker = Arc::clone(processor);
            let response = tokio::task::spawn_blocking(move || worker.process(&request))
                .await
                .map_err(|e| KraftmqError::Network(format!("request task failed: {}", e)))?;

            let response_bytes = KafkaCodec::encode_response(&response)?;
            framed.send(response_bytes).await?;
        }
    }
}
