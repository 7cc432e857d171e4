use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::{
    domain::value_objects::FileId,
    ports::runtime::{Clock, IdGenerator},
};

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random UUID v4 identities and tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn file_id(&self) -> FileId {
        FileId::new(uuid::Uuid::new_v4().to_string()).expect("uuid is a valid file id")
    }

    fn token(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Clock that advances by a fixed step every time it is read.
///
/// Gives strictly increasing, reproducible timestamps for tests.
#[derive(Debug)]
pub struct SteppingClock {
    next_millis: AtomicI64,
    step_millis: i64,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next_millis: AtomicI64::new(start.timestamp_millis()),
            step_millis: step.num_milliseconds(),
        }
    }

    /// Starts at 2024-01-01T00:00:00Z and advances one second per reading
    pub fn starting_at_epoch_2024() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Duration::seconds(1),
        )
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.next_millis.fetch_add(self.step_millis, Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Deterministic identities: `file-000001`, `token-000001`, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    files: AtomicU64,
    tokens: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn file_id(&self) -> FileId {
        let n = self.files.fetch_add(1, Ordering::SeqCst) + 1;
        FileId::new(format!("file-{:06}", n)).expect("sequential id is a valid file id")
    }

    fn token(&self) -> String {
        let n = self.tokens.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{:06}", n)
    }
}
