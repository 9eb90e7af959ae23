//! Projection runner utilities (read model builders).
//!
//! Read models are **disposable**; the journal is the source of truth.
//! This module provides deterministic replay and cursor tracking without
//! making storage assumptions.

use thiserror::Error;

use carworks_core::AggregateId;

use crate::{EventEnvelope, Projection};

/// Tracks projection progress through a single aggregate journal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProjectionCursor {
    aggregate_id: AggregateId,
    last_position: u64,
}

impl ProjectionCursor {
    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn last_position(&self) -> u64 {
        self.last_position
    }

    /// Position of the next envelope this projection expects.
    pub fn next_position(&self) -> u64 {
        self.last_position + 1
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("envelope from aggregate {found}, projection follows {expected}")]
    AggregateMismatch {
        expected: AggregateId,
        found: AggregateId,
    },

    #[error("non-monotonic position (last: {last}, found: {found})")]
    NonMonotonicPosition { last: u64, found: u64 },
}

/// Runs envelopes through a projection and tracks progress.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    cursor: Option<ProjectionCursor>,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            cursor: None,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    /// Current cursor for this projection (if any envelopes were applied).
    pub fn cursor(&self) -> Option<ProjectionCursor> {
        self.cursor
    }

    /// Apply a single envelope, enforcing aggregate consistency and monotonic positions.
    pub fn apply(&mut self, envelope: &EventEnvelope<P::Ev>) -> Result<(), ProjectionError> {
        let found_aggregate = envelope.aggregate_id();
        let found_position = envelope.position();

        match self.cursor {
            None => {
                self.projection.apply(envelope);
                self.cursor = Some(ProjectionCursor {
                    aggregate_id: found_aggregate,
                    last_position: found_position,
                });
                Ok(())
            }
            Some(mut c) => {
                if c.aggregate_id != found_aggregate {
                    return Err(ProjectionError::AggregateMismatch {
                        expected: c.aggregate_id,
                        found: found_aggregate,
                    });
                }
                if found_position <= c.last_position {
                    return Err(ProjectionError::NonMonotonicPosition {
                        last: c.last_position,
                        found: found_position,
                    });
                }

                self.projection.apply(envelope);
                c.last_position = found_position;
                self.cursor = Some(c);
                Ok(())
            }
        }
    }

    /// Apply many envelopes in order.
    pub fn run<'a>(
        &mut self,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(), ProjectionError>
    where
        P::Ev: 'a,
    {
        for env in envelopes {
            self.apply(env)?;
        }
        Ok(())
    }

    /// Rebuild a projection from scratch by replaying the full event history.
    ///
    /// The factory is used to create a fresh projection instance.
    pub fn rebuild_from_scratch<'a>(
        factory: impl FnOnce() -> P,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(P, Option<ProjectionCursor>), ProjectionError>
    where
        P::Ev: 'a,
    {
        let mut runner = ProjectionRunner::new(factory());
        runner.run(envelopes)?;
        Ok((runner.projection, runner.cursor))
    }
}
