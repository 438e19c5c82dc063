use crate::sync::poll_job::PollJob;
use crate::sync::reader::ReadFeed;
use crate::sync::store::IngestionStore;
use log::error;
use std::time::Duration;
use tokio::runtime;
use tokio::time;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConfigError {
    pub msg: String,
}

/// Runs one poll cycle per tick, forever. The first cycle runs immediately,
/// cycle errors are logged and never terminate the loop.
pub struct PollScheduler {
    interval: Duration,
}

impl PollScheduler {
    pub fn new(interval_string: &str) -> Result<Self, ConfigError> {
        let interval = humantime::parse_duration(interval_string).map_err(|err| ConfigError {
            msg: format!("invalid duration {interval_string}: {err}"),
        })?;

        if interval.is_zero() {
            return Err(ConfigError {
                msg: format!("invalid duration {interval_string}: must be positive"),
            });
        }

        Ok(PollScheduler { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&self, store: &mut dyn IngestionStore, reader: &dyn ReadFeed) {
        let tokio_runtime = runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        tokio_runtime.block_on(async {
            let mut interval = time::interval(self.interval);
            let poll_job = PollJob::new();

            loop {
                interval.tick().await;

                if let Err(err) = poll_job.execute(store, reader) {
                    error!("Couldn't complete the poll cycle: {:?}", err);
                }
            }
        })
    }
}
