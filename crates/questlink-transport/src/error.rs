/// Errors that can occur in the transport layer.
///
/// These never escape as panics: the socket task converts them into a
/// [`TransportEventKind::Error`](crate::TransportEventKind::Error) and the
/// session engine decides what the operator sees.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Establishing the connection failed (DNS, refused, bad handshake).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
