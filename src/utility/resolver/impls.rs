// Standard library
use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

// 3rd party crates
use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::Name;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, warn};

// Project imports
use crate::models::Classification;

// Current module imports
use super::constants::MAX_UDP_MESSAGE_SIZE;
use super::errors::ResolverError;
use super::traits::ResolverClient;
use super::types::{QueryKind, Resolution, UdpResolver};

impl UdpResolver {
    pub fn new(server: &str, port: u16, timeout: Duration) -> Self {
        Self {
            target: format!("{}:{}", server, port),
            timeout,
        }
    }

    /// Builds the wire form of a recursive query for `domain`.
    fn build_query(domain: &str, kind: QueryKind) -> Result<(u16, Vec<u8>), ResolverError> {
        let name = Name::from_ascii(domain).map_err(|error| ResolverError::InvalidName {
            domain: domain.to_string(),
            error,
        })?;

        let id: u16 = rand::random();
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(name, kind.record_type()));

        let bytes = message.to_vec().map_err(ResolverError::Encode)?;
        Ok((id, bytes))
    }

    async fn resolve_target(&self) -> Result<SocketAddr, ResolverError> {
        let mut addrs = lookup_host(&self.target)
            .await
            .map_err(|error| ResolverError::AddressLookup {
                target: self.target.clone(),
                error,
            })?;

        addrs
            .next()
            .ok_or_else(|| ResolverError::NoAddress(self.target.clone()))
    }

    /// Sends one query and returns the server's response code.
    async fn exchange(&self, domain: &str, kind: QueryKind) -> Result<ResponseCode, ResolverError> {
        let (id, request) = Self::build_query(domain, kind)?;
        let server = self.resolve_target().await?;

        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        socket.send(&request).await?;

        let mut buffer = vec![0u8; MAX_UDP_MESSAGE_SIZE];
        let received = socket.recv(&mut buffer).await?;

        let response = Message::from_vec(&buffer[..received]).map_err(ResolverError::Decode)?;
        if response.id() != id {
            return Err(ResolverError::IdMismatch {
                expected: id,
                got: response.id(),
            });
        }

        Ok(response.response_code())
    }

    /// Puts the resolver deadline on a whole exchange, address lookup included.
    async fn bounded<F>(&self, exchange: F) -> Result<ResponseCode, ResolverError>
    where
        F: Future<Output = Result<ResponseCode, ResolverError>>,
    {
        tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or(Err(ResolverError::Timeout(self.timeout.as_millis())))
    }
}

/// Maps a DNS response code onto the canary's classification.
pub fn classify_response(code: ResponseCode) -> Classification {
    match code {
        ResponseCode::NoError => Classification::NoError,
        ResponseCode::NXDomain => Classification::NxDomain,
        ResponseCode::ServFail => Classification::ServFail,
        _ => Classification::Other,
    }
}

/// Maps an exchange failure onto the canary's classification.
pub fn classify_error(error: &ResolverError) -> Classification {
    match error {
        ResolverError::Timeout(_) => Classification::Timeout,
        // Rejected before anything was sent, like dig refusing an illegal name.
        ResolverError::InvalidName { .. } => Classification::Other,
        _ => Classification::Error,
    }
}

#[async_trait]
impl ResolverClient for UdpResolver {
    async fn query(&self, domain: &str, kind: QueryKind) -> Resolution {
        let started = Instant::now();
        let classification = match self.bounded(self.exchange(domain, kind)).await {
            Ok(code) => classify_response(code),
            Err(e) => {
                let classification = classify_error(&e);
                if classification == Classification::Error {
                    warn!(server = %self.target, domain = %domain, "DNS query error: {}", e);
                } else {
                    debug!(server = %self.target, domain = %domain, "DNS query failed: {}", e);
                }
                classification
            }
        };

        Resolution {
            classification,
            elapsed: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::dns::types::DomainBucket;

    /// Answers every query on a local socket with `code`, or never answers.
    async fn spawn_responder(code: Option<ResponseCode>) -> (u16, tokio::task::JoinHandle<()>) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_UDP_MESSAGE_SIZE];
            loop {
                let (len, peer) = socket.recv_from(&mut buffer).await.unwrap();
                let Some(code) = code else { continue };

                let request = Message::from_vec(&buffer[..len]).unwrap();
                let mut response = Message::new();
                response
                    .set_id(request.id())
                    .set_message_type(MessageType::Response)
                    .set_op_code(OpCode::Query)
                    .set_response_code(code)
                    .add_queries(request.queries().to_vec());
                socket
                    .send_to(&response.to_vec().unwrap(), peer)
                    .await
                    .unwrap();
            }
        });

        (port, handle)
    }

    #[tokio::test]
    async fn test_response_codes_are_classified() {
        let cases = [
            (ResponseCode::NoError, Classification::NoError),
            (ResponseCode::NXDomain, Classification::NxDomain),
            (ResponseCode::ServFail, Classification::ServFail),
            (ResponseCode::Refused, Classification::Other),
        ];

        for (code, expected) in cases {
            let (port, handle) = spawn_responder(Some(code)).await;
            let resolver = UdpResolver::new("127.0.0.1", port, Duration::from_secs(2));

            let resolution = resolver.query("test.example.com", QueryKind::A).await;
            assert_eq!(resolution.classification, expected);
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_silent_server_is_a_timeout() {
        let (port, handle) = spawn_responder(None).await;
        let resolver = UdpResolver::new("127.0.0.1", port, Duration::from_millis(150));

        let resolution = resolver.query("test.example.com", QueryKind::Mx).await;
        assert_eq!(resolution.classification, Classification::Timeout);
        assert!(resolution.elapsed >= Duration::from_millis(150));
        handle.abort();
    }

    #[tokio::test]
    async fn test_unencodable_name_is_other() {
        let resolver = UdpResolver::new("127.0.0.1", 9, Duration::from_millis(100));
        let too_long = format!("toolong{}.com", "x".repeat(250));

        let resolution = resolver.query(&too_long, QueryKind::A).await;
        assert_eq!(resolution.classification, Classification::Other);
    }

    #[test]
    fn test_half_of_the_malformed_bucket_never_leaves_the_client() {
        let malformed = DomainBucket::defaults()
            .into_iter()
            .find(|bucket| bucket.expected == Classification::ServFail)
            .unwrap();

        let (sent, rejected): (Vec<&String>, Vec<&String>) = malformed
            .domains
            .iter()
            .partition(|domain| UdpResolver::build_query(domain, QueryKind::A).is_ok());

        assert_eq!(sent, ["", "."]);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0], "invalid..domain");
        assert!(rejected[1].starts_with("toolong"));
    }

    #[tokio::test]
    async fn test_unresolvable_server_is_an_error() {
        let resolver = UdpResolver::new("host.invalid", 53, Duration::from_millis(100));

        let resolution = resolver.query("test.example.com", QueryKind::A).await;
        assert_eq!(resolution.classification, Classification::Error);
    }

    #[tokio::test]
    async fn test_deadline_covers_the_whole_exchange() {
        let resolver = UdpResolver::new("127.0.0.1", 9, Duration::from_millis(100));
        let started = Instant::now();

        // Stands in for an address lookup that never returns.
        let result = resolver
            .bounded(std::future::pending::<Result<ResponseCode, ResolverError>>())
            .await;

        assert!(matches!(result, Err(ResolverError::Timeout(100))));
        assert_eq!(
            classify_error(&result.unwrap_err()),
            Classification::Timeout
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_finished_exchanges() {
        let resolver = UdpResolver::new("127.0.0.1", 9, Duration::from_millis(100));

        let result = resolver.bounded(async { Ok(ResponseCode::NXDomain) }).await;
        assert_eq!(result.unwrap(), ResponseCode::NXDomain);
    }

    #[test]
    fn test_classify_error_keeps_timeout_distinct() {
        assert_eq!(
            classify_error(&ResolverError::Timeout(2000)),
            Classification::Timeout
        );
        assert_eq!(
            classify_error(&ResolverError::NoAddress("x:53".into())),
            Classification::Error
        );
    }
}
