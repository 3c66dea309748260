// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settled promise results

/// The settled result of a single promise.
///
/// Unlike a bare `Result`, an `Outcome` also travels as data inside the
/// aggregates produced by [`all`](crate::all) and [`any`](crate::any), where
/// one sequence mixes successes and failures slot by slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
}

/// Combinator result: one `Outcome` per input promise, index-aligned with the
/// input order regardless of completion order.
pub type AggregateResult<T, E> = Vec<Outcome<T, E>>;

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(*self, Outcome::Success(..))
    }

    pub fn is_failure(&self) -> bool {
        matches!(*self, Outcome::Failure(..))
    }

    /// The success value, if this outcome is one.
    pub fn success(&self) -> Option<&T> {
        match *self {
            Outcome::Success(ref value) => Some(value),
            Outcome::Failure(..) => None,
        }
    }

    /// The failure error, if this outcome is one.
    pub fn failure(&self) -> Option<&E> {
        match *self {
            Outcome::Success(..) => None,
            Outcome::Failure(ref error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Outcome<T, E> {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}
