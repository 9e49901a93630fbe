use std::fmt;
use std::time::Instant;
use uuid::Uuid;
use crate::error::BatchError;
use super::pending_call::ResultSender;

/// Opaque handle of one backend invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// # BatchRecord
///
/// Bookkeeping for a batch that has been handed to the backend but whose
/// results have not been distributed yet.
///
/// The record owns the result slots of every input in the batch, in the same
/// order the inputs were passed to the backend, so output `i` belongs to
/// slot `i`.
pub(crate) struct BatchRecord<O> {
    /// Unique identifier of the backend invocation
    id: BatchId,

    /// Result slots, index-aligned with the inputs handed to the backend
    slots: Vec<ResultSender<O>>,

    /// When the batch was handed to the backend
    dispatched_at: Instant,
}

/// How many slots a distribution reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Delivery {
    /// Slots whose caller received the result
    pub delivered: usize,

    /// Slots whose caller had already gone away
    pub dropped: usize,
}

impl<O> BatchRecord<O> {
    pub fn new(id: BatchId, slots: Vec<ResultSender<O>>) -> Self {
        Self {
            id,
            slots,
            dispatched_at: Instant::now(),
        }
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Number of inputs in the batch.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn dispatched_at(&self) -> Instant {
        self.dispatched_at
    }

    /// Resolves every slot of the batch, consuming the record.
    ///
    /// Outputs are matched to slots by position. A result whose length differs
    /// from the batch is itself a failure and every slot receives
    /// [`BatchError::LengthMismatch`]. A failed batch hands a clone of the same
    /// error to every slot. A slot whose caller is gone is counted and skipped;
    /// it never prevents delivery to the remaining slots.
    pub fn distribute(self, result: Result<Vec<O>, BatchError>) -> Delivery {
        let expected = self.slots.len();
        let result = result.and_then(|outputs| {
            if outputs.len() == expected {
                Ok(outputs)
            } else {
                Err(BatchError::LengthMismatch { expected, actual: outputs.len() })
            }
        });

        let mut delivery = Delivery::default();
        let mut record = |sent: bool| {
            if sent {
                delivery.delivered += 1;
            } else {
                delivery.dropped += 1;
            }
        };

        match result {
            Ok(outputs) => {
                for (slot, output) in self.slots.into_iter().zip(outputs) {
                    record(slot.send(Ok(output)).is_ok());
                }
            }
            Err(error) => {
                for slot in self.slots {
                    record(slot.send(Err(error.clone())).is_ok());
                }
            }
        }
        delivery
    }
}
