use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One clock sample shared by every per-tick consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub sequence: u64,
    pub now: DateTime<Utc>,
}

/// Samples `clock` once per `period` until cancelled or the receiver is
/// dropped. Late ticks are skipped rather than bursted.
pub fn spawn_ticker(
    clock: Arc<dyn Clock>,
    period: Duration,
    cancellation_token: CancellationToken,
) -> mpsc::Receiver<Tick> {
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequence = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    log::info!("Ticker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let tick = Tick { sequence, now: clock.now() };
                    if tx.send(tick).await.is_err() {
                        log::debug!("Tick receiver dropped, stopping ticker");
                        break;
                    }
                    sequence += 1;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::TimeDelta;

    use super::*;

    struct SteppingClock {
        start: DateTime<Utc>,
        calls: AtomicI64,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let step = self.calls.fetch_add(1, Ordering::SeqCst);
            self.start + TimeDelta::seconds(step)
        }
    }

    fn clock() -> Arc<SteppingClock> {
        Arc::new(SteppingClock {
            start: DateTime::from_timestamp(1_900_000_000, 0).unwrap(),
            calls: AtomicI64::new(0),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn samples_clock_once_per_tick() {
        let clock = clock();
        let token = CancellationToken::new();
        let mut ticks = spawn_ticker(clock.clone(), Duration::from_secs(1), token.clone());

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(ticks.recv().await.unwrap());
        }
        token.cancel();

        assert_eq!(
            received.iter().map(|t| t.sequence).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(received[2].now - received[0].now, TimeDelta::seconds(2));
        assert!(clock.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_closes_the_channel() {
        let token = CancellationToken::new();
        let mut ticks = spawn_ticker(clock(), Duration::from_secs(1), token.clone());
        ticks.recv().await.unwrap();

        token.cancel();

        let mut remaining = 0;
        while ticks.recv().await.is_some() {
            remaining += 1;
        }
        assert!(remaining <= 4);
    }
}
