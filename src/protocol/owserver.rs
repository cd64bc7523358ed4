// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the owserver network protocol.
//!
//! Every message starts with a header of six big-endian `i32` words:
//!
//! | word | request            | response            |
//! |------|--------------------|---------------------|
//! | 0    | version (0)        | version             |
//! | 1    | payload length     | payload length      |
//! | 2    | message type       | return value        |
//! | 3    | control flags      | control flags       |
//! | 4    | requested size     | data size           |
//! | 5    | offset             | offset              |
//!
//! The server may send keep-alive frames with a payload length of `-1`
//! while a slow bus operation is in progress. Those are skipped.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::FetchError;

/// Header length in bytes.
pub const HEADER_LEN: usize = 24;

/// Read request.
const MSG_READ: i32 = 2;
/// Write request.
const MSG_WRITE: i32 = 3;

/// Use the owserver network flag set; temperature scale bits left at Celsius.
const FLAGS: i32 = 0x0000_0100;

/// Maximum number of bytes requested on a read.
const READ_SIZE: i32 = 8192;

/// Largest payload accepted from the server.
const MAX_PAYLOAD: i32 = 65_536;

/// A decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version.
    pub version: i32,
    /// Payload length; `-1` marks a keep-alive frame.
    pub payload: i32,
    /// Message type on requests, return value on responses.
    pub kind: i32,
    /// Control flags.
    pub flags: i32,
    /// Requested or returned data size.
    pub size: i32,
    /// Data offset.
    pub offset: i32,
}

impl Header {
    fn request(kind: i32, payload: usize, size: i32) -> Result<Self, FetchError> {
        let payload = i32::try_from(payload)
            .map_err(|_| FetchError::TooLarge(format!("request payload of {payload} bytes")))?;
        Ok(Self {
            version: 0,
            payload,
            kind,
            flags: FLAGS,
            size,
            offset: 0,
        })
    }

    /// Encodes the header in network byte order.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        let words = [
            self.version,
            self.payload,
            self.kind,
            self.flags,
            self.size,
            self.offset,
        ];
        for (chunk, word) in buf.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        buf
    }

    /// Decodes a header from network byte order.
    #[must_use]
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Self {
        let word = |i: usize| i32::from_be_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        Self {
            version: word(0),
            payload: word(4),
            kind: word(8),
            flags: word(12),
            size: word(16),
            offset: word(20),
        }
    }

    /// Returns `true` for a keep-alive frame.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.payload < 0
    }
}

/// owserver client.
///
/// Each request opens its own connection, so a client can be shared freely
/// between concurrent tasks.
///
/// # Examples
///
/// ```no_run
/// use owbridge::protocol::OwserverClient;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), owbridge::FetchError> {
/// let client = OwserverClient::new("localhost", 4304, Duration::from_secs(5));
/// let temp = client.read("/28.5D3C1C000000/temperature").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OwserverClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl OwserverClient {
    /// Creates a client for the given server.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reads the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Owserver`] if the server rejects the path,
    /// [`FetchError::Timeout`] if the exchange does not complete in time, and
    /// [`FetchError::Io`] on socket failure.
    pub async fn read(&self, path: &str) -> Result<String, FetchError> {
        let mut payload = path.as_bytes().to_vec();
        payload.push(0);
        let header = Header::request(MSG_READ, payload.len(), READ_SIZE)?;

        let data = self.exchange(path, header, &payload).await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Writes `value` to `path`.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub async fn write(&self, path: &str, value: &str) -> Result<(), FetchError> {
        let mut payload = path.as_bytes().to_vec();
        payload.push(0);
        payload.extend_from_slice(value.as_bytes());
        let size = i32::try_from(value.len())
            .map_err(|_| FetchError::TooLarge(format!("value of {} bytes", value.len())))?;
        let header = Header::request(MSG_WRITE, payload.len(), size)?;

        self.exchange(path, header, &payload).await.map(|_| ())
    }

    async fn exchange(
        &self,
        path: &str,
        header: Header,
        payload: &[u8],
    ) -> Result<Vec<u8>, FetchError> {
        let limit = self.timeout;
        timeout(limit, self.exchange_inner(path, header, payload))
            .await
            .map_err(|_| FetchError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)))?
    }

    async fn exchange_inner(
        &self,
        path: &str,
        header: Header,
        payload: &[u8],
    ) -> Result<Vec<u8>, FetchError> {
        let mut stream = TcpStream::connect(self.address()).await?;
        stream.set_nodelay(true)?;

        let mut request = Vec::with_capacity(HEADER_LEN + payload.len());
        request.extend_from_slice(&header.encode());
        request.extend_from_slice(payload);
        stream.write_all(&request).await?;
        stream.flush().await?;

        loop {
            let mut buf = [0u8; HEADER_LEN];
            stream.read_exact(&mut buf).await?;
            let response = Header::decode(&buf);

            if response.is_ping() {
                tracing::trace!(path, "owserver keep-alive");
                continue;
            }

            if response.kind < 0 {
                return Err(FetchError::Owserver {
                    code: response.kind.saturating_neg(),
                    path: path.to_string(),
                });
            }

            if response.payload > MAX_PAYLOAD {
                return Err(FetchError::TooLarge(format!(
                    "owserver payload of {} bytes for {path}",
                    response.payload
                )));
            }

            // Checked non-negative by is_ping above.
            let len = usize::try_from(response.payload).unwrap_or_default();
            let mut data = vec![0u8; len];
            stream.read_exact(&mut data).await?;

            let size = usize::try_from(response.size).unwrap_or_default();
            data.truncate(size);
            return Ok(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn header_layout() {
        let header = Header::request(MSG_READ, 30, READ_SIZE).unwrap();
        let bytes = header.encode();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 30]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 2]);
        assert_eq!(&bytes[12..16], &[0, 0, 1, 0]);
        assert_eq!(&bytes[16..20], &[0, 0, 0x20, 0]);
        assert_eq!(Header::decode(&bytes), header);
    }

    #[test]
    fn ping_detection() {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[4..8].copy_from_slice(&(-1i32).to_be_bytes());
        assert!(Header::decode(&bytes).is_ping());
    }

    fn response(ret: i32, data: &[u8], padding: usize) -> Vec<u8> {
        let header = Header {
            version: 0,
            payload: i32::try_from(data.len() + padding).unwrap(),
            kind: ret,
            flags: FLAGS,
            size: i32::try_from(data.len()).unwrap(),
            offset: 0,
        };
        let mut out = header.encode().to_vec();
        out.extend_from_slice(data);
        out.extend(std::iter::repeat_n(0u8, padding));
        out
    }

    async fn serve_once(frames: Vec<Vec<u8>>) -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = [0u8; HEADER_LEN];
            socket.read_exact(&mut head).await.unwrap();
            let header = Header::decode(&head);
            let mut payload = vec![0u8; usize::try_from(header.payload).unwrap()];
            socket.read_exact(&mut payload).await.unwrap();
            for frame in frames {
                socket.write_all(&frame).await.unwrap();
            }
            let mut request = head.to_vec();
            request.extend(payload);
            request
        });
        (port, handle)
    }

    #[tokio::test]
    async fn read_skips_keepalive_and_truncates() {
        let mut ping = Header::decode(&[0u8; HEADER_LEN]);
        ping.payload = -1;
        let frames = vec![ping.encode().to_vec(), response(0, b"     21.4375", 4)];
        let (port, server) = serve_once(frames).await;

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        let value = client.read("/28.0001/temperature").await.unwrap();
        assert_eq!(value, "     21.4375");

        let request = server.await.unwrap();
        assert_eq!(&request[HEADER_LEN..], b"/28.0001/temperature\0");
    }

    #[tokio::test]
    async fn negative_return_is_an_error() {
        let (port, _server) = serve_once(vec![response(-2, b"", 0)]).await;

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        let err = client.read("/28.dead/temperature").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Owserver { code: 2, ref path } if path == "/28.dead/temperature"
        ));
    }

    #[tokio::test]
    async fn minimum_return_value_saturates() {
        let (port, _server) = serve_once(vec![response(i32::MIN, b"", 0)]).await;

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        let err = client
            .write("/7E.0001/EDS0065/relay_function", "0")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Owserver { code: i32::MAX, .. }));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let mut header = Header::decode(&[0u8; HEADER_LEN]);
        header.payload = MAX_PAYLOAD + 1;
        header.size = MAX_PAYLOAD + 1;
        let (port, _server) = serve_once(vec![header.encode().to_vec()]).await;

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        let err = client.read("/28.0001/temperature").await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge(_)));
        assert!(err.to_string().starts_with("message too large: owserver payload"));
    }

    #[tokio::test]
    async fn write_sends_path_and_value() {
        let (port, server) = serve_once(vec![response(0, b"", 0)]).await;

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        client
            .write("/7E.0001/EDS0065/relay_function", "3")
            .await
            .unwrap();

        let request = server.await.unwrap();
        let header = Header::decode(request[..HEADER_LEN].try_into().unwrap());
        assert_eq!(header.kind, MSG_WRITE);
        assert_eq!(header.size, 1);
        assert_eq!(&request[HEADER_LEN..], b"/7E.0001/EDS0065/relay_function\x003");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_millis(100));
        let err = client.read("/28.0001/temperature").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(100)));
    }

    #[tokio::test]
    async fn refused_connection_is_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = OwserverClient::new("127.0.0.1", port, Duration::from_secs(2));
        let err = client.read("/28.0001/temperature").await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
