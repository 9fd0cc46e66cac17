/// Domains served by the resolver under test, expected to answer NOERROR
pub const KNOWN_GOOD_DOMAINS: [&str; 11] = [
    "test.example.com",
    "canary-test-1.example.com",
    "canary-test-2.example.com",
    "canary-test-3.example.com",
    "www.canary-test.example.com",
    "mail.canary-test.example.com",
    "api.canary-test.example.com",
    "db.canary-test.example.com",
    "test-canary.example.com",
    "minimal.example.com",
    "minimal2.example.com",
];

/// Domains that should not exist, expected to answer NXDOMAIN
pub const KNOWN_ABSENT_DOMAINS: [&str; 7] = [
    "nonexistent-domain-12345.com",
    "fake-website-xyz.net",
    "does-not-exist-abc.org",
    "random-gibberish-domain.info",
    "test-nxdomain-response.example",
    "missing-record.test",
    "invalid-hostname-999.local",
];

/// Edge-case inputs, expected to answer SERVFAIL
pub const MALFORMED_INPUTS: [&str; 3] = ["", ".", "invalid..domain"];

/// Length of the repeated run inside the over-long edge-case name
pub const OVERLONG_LABEL_LEN: usize = 250;

pub const KNOWN_GOOD_WEIGHT: u32 = 60;
pub const KNOWN_ABSENT_WEIGHT: u32 = 30;
pub const MALFORMED_WEIGHT: u32 = 10;
