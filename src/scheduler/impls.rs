// Standard library
use std::sync::Arc;
use std::time::Duration;

// 3rd party crates
use futures::future::join_all;
use rand::Rng;
use tokio::sync::watch;
use tracing::{error, info};

// Project imports
use crate::metrics::Aggregator;
use crate::probes::Probe;

// Current module imports
use super::functions::{probe_loop, stats_loop};
use super::types::{Cadence, Scheduler, SchedulerHandle};

impl Cadence {
    /// Bounds given in either order are normalised.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_fixed() {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    pub fn next_delay(&self) -> Duration {
        self.sample(&mut rand::rng())
    }
}

impl Scheduler {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        let (running, _) = watch::channel(true);
        Self {
            aggregator,
            running: Arc::new(running),
            workers: Vec::new(),
        }
    }

    /// Starts one worker driving `probe`. The first probe runs immediately.
    pub fn spawn_probe(&mut self, probe: Arc<dyn Probe>, cadence: Cadence) {
        info!(
            family = %probe.family(),
            "⏱️ Scheduling probes every {:?} to {:?}",
            cadence.min,
            cadence.max
        );
        let worker = tokio::spawn(probe_loop(
            probe,
            cadence,
            Arc::clone(&self.aggregator),
            self.running.subscribe(),
        ));
        self.workers.push(worker);
    }

    pub fn spawn_stats_logger(&mut self, interval: Duration) {
        let worker = tokio::spawn(stats_loop(
            Arc::clone(&self.aggregator),
            interval,
            self.running.subscribe(),
        ));
        self.workers.push(worker);
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Waits for every worker to exit. Only returns after `stop` was requested.
    pub async fn join(self) {
        for result in join_all(self.workers).await {
            if let Err(e) = result {
                error!("Scheduler worker terminated abnormally: {}", e);
            }
        }
        info!("All probe workers stopped.");
    }
}

impl SchedulerHandle {
    /// Clears the running flag. Idempotent.
    pub fn stop(&self) {
        self.running.send_replace(false);
    }

    /// Resolves once the running flag has been cleared.
    pub async fn stopped(&self) {
        let mut running = self.running.subscribe();
        let _ = running.wait_for(|running| !*running).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::models::{Family, Outcome};
    use crate::probes::dns::errors::DnsProbeError;
    use crate::probes::ProbeError;

    enum Behaviour {
        Succeed,
        Slow(Duration),
        Fail,
        Panic,
    }

    struct TestProbe {
        behaviour: Behaviour,
        calls: AtomicUsize,
        finished: AtomicBool,
    }

    impl TestProbe {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
                finished: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl Probe for TestProbe {
        fn family(&self) -> Family {
            Family::Dns
        }

        async fn probe(&self) -> Result<Outcome, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(Outcome::success(Duration::from_millis(1))),
                Behaviour::Slow(duration) => {
                    sleep(duration).await;
                    self.finished.store(true, Ordering::SeqCst);
                    Ok(Outcome::success(duration))
                }
                Behaviour::Fail => Err(ProbeError::Dns(DnsProbeError::NoBuckets)),
                Behaviour::Panic => panic!("probe blew up"),
            }
        }
    }

    fn every(interval: Duration) -> Cadence {
        Cadence::new(interval, interval)
    }

    fn fast() -> Cadence {
        every(Duration::from_millis(5))
    }

    #[test]
    fn test_fixed_cadence_never_varies() {
        let cadence = every(Duration::from_millis(250));
        assert!(cadence.is_fixed());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(cadence.sample(&mut rng), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_jittered_cadence_stays_in_bounds() {
        let cadence = Cadence::new(Duration::from_millis(500), Duration::from_millis(100));
        assert_eq!(cadence.min, Duration::from_millis(100));

        let mut rng = StdRng::seed_from_u64(2);
        let delays: Vec<Duration> = (0..1000).map(|_| cadence.sample(&mut rng)).collect();
        assert!(delays.iter().all(|d| *d >= cadence.min && *d <= cadence.max));
        assert!(delays.iter().any(|d| *d != delays[0]));
    }

    #[tokio::test]
    async fn test_every_probe_is_recorded_until_stopped() {
        let aggregator = Arc::new(Aggregator::default());
        let probe = TestProbe::new(Behaviour::Succeed);
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(probe.clone(), fast());

        sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        scheduler.join().await;

        let calls = probe.calls.load(Ordering::SeqCst);
        let snapshot = aggregator.snapshot().await;
        assert!(calls > 1);
        assert_eq!(snapshot.dns.total, calls as u64);
        assert_eq!(snapshot.dns.success, calls as u64);

        sleep(Duration::from_millis(30)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_in_flight_probe_finishes_after_stop() {
        let aggregator = Arc::new(Aggregator::default());
        let probe = TestProbe::new(Behaviour::Slow(Duration::from_millis(150)));
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(probe.clone(), fast());

        sleep(Duration::from_millis(30)).await;
        scheduler.stop();
        scheduler.join().await;

        assert!(probe.finished.load(Ordering::SeqCst));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(aggregator.snapshot().await.dns.success, 1);
    }

    #[tokio::test]
    async fn test_probe_error_records_nothing_and_backs_off() {
        let aggregator = Arc::new(Aggregator::default());
        let probe = TestProbe::new(Behaviour::Fail);
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(probe.clone(), fast());

        sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        scheduler.join().await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(aggregator.snapshot().await.dns.total, 0);
    }

    #[tokio::test]
    async fn test_panicking_probe_is_recorded_as_failure() {
        let aggregator = Arc::new(Aggregator::default());
        let probe = TestProbe::new(Behaviour::Panic);
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(probe.clone(), fast());

        sleep(Duration::from_millis(60)).await;
        scheduler.stop();
        scheduler.join().await;

        let snapshot = aggregator.snapshot().await;
        assert!(snapshot.dns.failure >= 1);
        assert_eq!(snapshot.dns.success, 0);
        assert_eq!(snapshot.dns.failure, probe.calls.load(Ordering::SeqCst) as u64);
    }

    #[tokio::test]
    async fn test_stop_wakes_sleeping_workers() {
        let aggregator = Arc::new(Aggregator::default());
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(
            TestProbe::new(Behaviour::Succeed),
            every(Duration::from_secs(60)),
        );
        scheduler.spawn_stats_logger(Duration::from_secs(60));

        let handle = scheduler.handle();
        sleep(Duration::from_millis(20)).await;
        handle.stop();
        timeout(Duration::from_secs(1), handle.stopped())
            .await
            .expect("stop should be observable");

        timeout(Duration::from_secs(1), scheduler.join())
            .await
            .expect("workers should exit promptly");
        assert_eq!(aggregator.snapshot().await.dns.total, 1);
    }

    struct RecordKeeper;

    #[async_trait]
    impl Probe for RecordKeeper {
        fn family(&self) -> Family {
            Family::ApiLifecycle
        }

        async fn probe(&self) -> Result<Outcome, ProbeError> {
            Ok(Outcome::failure(Duration::from_millis(1)))
        }

        fn active_records(&self) -> Option<usize> {
            Some(4)
        }
    }

    #[tokio::test]
    async fn test_active_records_are_published_after_each_run() {
        let aggregator = Arc::new(Aggregator::default());
        let mut scheduler = Scheduler::new(Arc::clone(&aggregator));
        scheduler.spawn_probe(Arc::new(RecordKeeper), every(Duration::from_secs(60)));

        sleep(Duration::from_millis(30)).await;
        scheduler.stop();
        scheduler.join().await;

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.api.failure, 1);
        assert_eq!(snapshot.active_records, 4);
    }
}
