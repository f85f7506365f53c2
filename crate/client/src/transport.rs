use std::{
    fs,
    io::{self, Read, Write},
    net::TcpStream,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use native_tls::{Certificate, Identity, Protocol, TlsConnector, TlsStream};
use tracing::{debug, info, trace};
use zeroize::Zeroize;

use crate::{
    config::ConfigurationSettings,
    error::{ClientError, ClientResult},
};

/// A caller-held flag that aborts an in-flight operation between its
/// steps. Cancelling after the request was written poisons the
/// connection: the response may still arrive and would desynchronize the
/// stream.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An established transport a connection can run over.
trait Duplex: Read + Write + Send {}

impl<S: Read + Write + Send> Duplex for S {}

/// The byte stream under a connection: the mutually-authenticated TLS
/// stream dialed by [`KmipConnection::open`], or a transport that was
/// established elsewhere and adopted through
/// [`KmipConnection::from_stream`].
enum Channel {
    Tls(TlsStream<TcpStream>),
    Adopted(Box<dyn Duplex>),
}

impl Channel {
    fn shutdown(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.shutdown(),
            Self::Adopted(_) => Ok(()),
        }
    }
}

impl Read for Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.read(buf),
            Self::Adopted(stream) => stream.read(buf),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.write(buf),
            Self::Adopted(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.flush(),
            Self::Adopted(stream) => stream.flush(),
        }
    }
}

/// An exclusively-owned stream to one KMS endpoint.
///
/// All reads and writes are sequential; the type is deliberately not
/// `Clone` and not `Sync`, which keeps concurrent use out of reach of
/// safe code. Lifecycle is Closed → Open → Closed; `close` is
/// idempotent.
pub struct KmipConnection {
    stream: Channel,
    peer: String,
    open: bool,
    poisoned: bool,
    cancel: Option<CancelToken>,
}

impl KmipConnection {
    /// Read the PEM files named by the settings, build a TLS connector
    /// requiring a client certificate, and dial the server.
    pub fn open(settings: &ConfigurationSettings) -> ClientResult<Self> {
        let ca_pem = fs::read(&settings.cert_auth_file).map_err(|e| {
            ClientError::Usage(format!(
                "failed to read CA ({}): {e}",
                settings.cert_auth_file
            ))
        })?;
        let cert_pem = fs::read(&settings.cert_file).map_err(|e| {
            ClientError::Usage(format!(
                "failed to read client certificate ({}): {e}",
                settings.cert_file
            ))
        })?;
        let mut key_pem = fs::read(&settings.key_file).map_err(|e| {
            ClientError::Usage(format!(
                "failed to read client key ({}): {e}",
                settings.key_file
            ))
        })?;

        let identity = Identity::from_pkcs8(&cert_pem, &key_pem).map_err(|e| {
            ClientError::Usage(format!("failed to build client identity from PEM: {e}"))
        });
        key_pem.zeroize();
        let identity = identity?;

        let ca = Certificate::from_pem(&ca_pem)
            .map_err(|e| ClientError::Usage(format!("failed to parse CA bundle: {e}")))?;

        let mut builder = TlsConnector::builder();
        builder
            .identity(identity)
            .add_root_certificate(ca)
            .min_protocol_version(Some(Protocol::Tlsv12));
        if settings.insecure_skip_verify {
            // self-signed KMS test servers
            builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let connector = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build TLS connector: {e}")))?;

        let peer = format!("{}:{}", settings.kms_server_ip, settings.kms_server_port);
        let tcp = TcpStream::connect(&peer)
            .map_err(|e| ClientError::Transport(format!("TCP connect to {peer} failed: {e}")))?;
        if let Some(secs) = settings.timeout_secs {
            let deadline = Some(Duration::from_secs(secs));
            tcp.set_read_timeout(deadline)?;
            tcp.set_write_timeout(deadline)?;
        }

        let stream = connector
            .connect(&settings.kms_server_ip, tcp)
            .map_err(|e| ClientError::Transport(format!("TLS handshake with {peer} failed: {e}")))?;

        info!(peer = %peer, "TLS connection opened");
        Ok(Self {
            stream: Channel::Tls(stream),
            peer,
            open: true,
            poisoned: false,
            cancel: None,
        })
    }

    /// Wrap an already-established byte stream in a connection.
    ///
    /// [`KmipConnection::open`] is the production entry point; this one
    /// adopts transports terminated elsewhere (a TLS tunnel, a Unix
    /// socket, the in-memory streams the test suite drives batches
    /// through). The framing, poisoning and cancellation rules are the
    /// same either way.
    #[must_use]
    pub fn from_stream(
        stream: impl Read + Write + Send + 'static,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            stream: Channel::Adopted(Box::new(stream)),
            peer: peer.into(),
            open: true,
            poisoned: false,
            cancel: None,
        }
    }

    /// Attach a cancellation token, checked between the steps of every
    /// later send.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Mark the stream as out of sync. Every later send is refused.
    pub fn poison(&mut self) {
        self.poisoned = true;
        let _ = self.close();
    }

    /// Shut the stream down. Safe to call any number of times.
    pub fn close(&mut self) -> ClientResult<()> {
        if self.open {
            self.open = false;
            self.stream
                .shutdown()
                .map_err(|e| ClientError::Transport(format!("close failed: {e}")))?;
            info!(peer = %self.peer, "connection closed");
        }
        Ok(())
    }

    /// Write one request message and read back one complete response
    /// frame.
    ///
    /// The response is length-driven: the 8-byte TTLV header names the
    /// value length, and the reader loops until every byte (value plus
    /// padding) has arrived. A single read call is never assumed to be
    /// enough.
    pub fn send(&mut self, request: &[u8]) -> ClientResult<Vec<u8>> {
        if self.poisoned {
            return Err(ClientError::Transport(
                "connection is poisoned, open a new session".to_owned(),
            ));
        }
        if !self.open {
            return Err(ClientError::Transport("connection is closed".to_owned()));
        }
        if self.is_cancelled() {
            return Err(ClientError::Transport("operation cancelled".to_owned()));
        }

        trace!(bytes = request.len(), "writing request");
        self.write_all(request)?;

        // A cancellation observed here arrives after the server saw the
        // request; the response may still be in flight, so the stream
        // cannot be reused.
        if self.is_cancelled() {
            self.poison();
            return Err(ClientError::Transport(
                "operation cancelled after write, connection closed".to_owned(),
            ));
        }

        let mut header = [0_u8; 8];
        self.read_exact(&mut header)?;
        let item_type = header[3];
        let length = usize::try_from(u32::from_be_bytes([
            header[4], header[5], header[6], header[7],
        ]))
        .map_err(|_e| ClientError::Protocol("response length overflows usize".to_owned()))?;
        // structures are born aligned, primitives carry their padding
        let body_len = if item_type == 0x01 {
            length
        } else {
            length + (8 - length % 8) % 8
        };

        let mut frame = Vec::with_capacity(8 + body_len);
        frame.extend_from_slice(&header);
        frame.resize(8 + body_len, 0);
        if let Some(body) = frame.get_mut(8..) {
            self.read_exact(body)?;
        }
        trace!(bytes = frame.len(), "read response frame");
        Ok(frame)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn write_all(&mut self, bytes: &[u8]) -> ClientResult<()> {
        if let Err(e) = self.stream.write_all(bytes).and_then(|()| self.stream.flush()) {
            self.poison();
            return Err(ClientError::Transport(format!("write failed: {e}")));
        }
        Ok(())
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> ClientResult<()> {
        // std's read_exact already loops over short reads
        if let Err(e) = self.stream.read_exact(buffer) {
            debug!(peer = %self.peer, "read failed, poisoning connection");
            self.poison();
            return Err(ClientError::Transport(format!("read failed: {e}")));
        }
        Ok(())
    }
}

impl Drop for KmipConnection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn cancel_token_latches() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
