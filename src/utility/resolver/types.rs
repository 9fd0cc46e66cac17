// Standard library
use std::time::Duration;

// 3rd party crates
use hickory_proto::rr::RecordType;

// Project imports
use crate::models::Classification;

/// Query kinds exercised by the canary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    A,
    Aaaa,
    Mx,
    Cname,
    Txt,
    Ns,
}

impl QueryKind {
    pub const ALL: [QueryKind; 6] = [
        QueryKind::A,
        QueryKind::Aaaa,
        QueryKind::Mx,
        QueryKind::Cname,
        QueryKind::Txt,
        QueryKind::Ns,
    ];

    pub fn record_type(&self) -> RecordType {
        match self {
            QueryKind::A => RecordType::A,
            QueryKind::Aaaa => RecordType::AAAA,
            QueryKind::Mx => RecordType::MX,
            QueryKind::Cname => RecordType::CNAME,
            QueryKind::Txt => RecordType::TXT,
            QueryKind::Ns => RecordType::NS,
        }
    }
}

/// Classified answer to a single query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub classification: Classification,
    pub elapsed: Duration,
}

/// Plain UDP resolver client, one attempt per query.
#[derive(Debug, Clone)]
pub struct UdpResolver {
    /// `host:port` of the server under test
    pub target: String,
    pub timeout: Duration,
}
