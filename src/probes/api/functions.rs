// Standard library
use std::time::{SystemTime, UNIX_EPOCH};

// 3rd party crates
use rand::Rng;
use tracing::{info, warn};

// Project imports
use crate::models::{Envelope, RecordPayload};

// Current module imports
use super::constants::{CREATE_TTL, RECORDS_PATH, UPDATE_TTL};
use super::types::LifecycleProbe;

/// A fresh `A` record with a name no earlier run has used.
pub fn synthetic_record<R: Rng + ?Sized>(rng: &mut R) -> RecordPayload {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();

    RecordPayload::a(
        format!(
            "canary-lifecycle-{}-{}.test.local",
            millis,
            rng.random_range(1000..=9999)
        ),
        format!(
            "192.168.{}.{}",
            rng.random_range(1..=254),
            rng.random_range(1..=254)
        ),
        CREATE_TTL,
    )
}

/// The update applied to a synthetic record: new address and TTL.
pub fn mutated_record<R: Rng + ?Sized>(name: &str, rng: &mut R) -> RecordPayload {
    RecordPayload::a(
        name,
        format!(
            "10.0.{}.{}",
            rng.random_range(1..=254),
            rng.random_range(1..=254)
        ),
        UPDATE_TTL,
    )
}

/// Records backing the known-good domains of the DNS probe.
pub fn sample_records() -> Vec<RecordPayload> {
    vec![
        RecordPayload::a("canary-test-1.example.com", "192.168.1.10", 300),
        RecordPayload::a("canary-test-2.example.com", "192.168.1.11", 600),
        RecordPayload::a("canary-test-3.example.com", "10.0.0.10", 300),
        RecordPayload::with_value(
            "www.canary-test.example.com",
            "CNAME",
            "canary-test-1.example.com",
            300,
        ),
        RecordPayload::a("mail.canary-test.example.com", "192.168.1.20", 300),
        RecordPayload::with_value(
            "canary-test.example.com",
            "TXT",
            "v=spf1 include:_spf.google.com ~all",
            300,
        ),
        RecordPayload::a("api.canary-test.example.com", "10.0.0.20", 300),
        RecordPayload::a("db.canary-test.example.com", "10.0.0.30", 300),
    ]
}

/// Creates the sample records through the record API.
///
/// Best effort: failures are logged and skipped, nothing is recorded in the
/// aggregator. Created records are tracked for cleanup. Returns the number of
/// records created.
pub async fn prime_datastore(probe: &LifecycleProbe) -> usize {
    info!("Priming datastore with sample records...");
    let url = format!("{}{}", probe.base_url, RECORDS_PATH);
    let mut created = 0;

    for record in sample_records() {
        let response = match probe.client.post(&url).json(&record).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(record = %record.name, "Failed to send priming request: {}", e);
                continue;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(record = %record.name, "Priming request rejected: HTTP {}", status);
            continue;
        }

        match response.json::<Envelope>().await.ok().and_then(|e| e.record_id()) {
            Some(id) => {
                info!(record = %record.name, id = %id, "Created sample record");
                probe.track(&id);
                created += 1;
            }
            None => warn!(record = %record.name, "Priming response carried no record id"),
        }
    }

    info!("Datastore priming complete. Created {} records.", created);
    created
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_synthetic_records_are_unique_a_records() {
        let mut rng = StdRng::seed_from_u64(3);
        let first = synthetic_record(&mut rng);
        let second = synthetic_record(&mut rng);

        assert_ne!(first, second);
        assert!(first.name.starts_with("canary-lifecycle-"));
        assert!(first.name.ends_with(".test.local"));
        assert_eq!(first.record_type, "A");
        assert_eq!(first.ttl, CREATE_TTL);
        assert!(first.ip.as_deref().unwrap().starts_with("192.168."));
    }

    #[test]
    fn test_mutated_record_keeps_name_and_changes_fields() {
        let mut rng = StdRng::seed_from_u64(5);
        let created = synthetic_record(&mut rng);
        let updated = mutated_record(&created.name, &mut rng);

        assert_eq!(updated.name, created.name);
        assert_eq!(updated.ttl, UPDATE_TTL);
        assert!(updated.ip.as_deref().unwrap().starts_with("10.0."));
    }

    #[test]
    fn test_sample_records_cover_known_good_names() {
        let names: Vec<String> = sample_records().into_iter().map(|r| r.name).collect();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"db.canary-test.example.com".to_string()));
    }
}
