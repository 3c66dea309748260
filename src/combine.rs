// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fan-in combinators over multiple promises
//!
//! Both combinators subscribe to every input once and assemble an
//! index-aligned [`AggregateResult`]: slot `i` of the result always belongs
//! to input promise `i`, no matter in which order the inputs settle.

use std::sync::Arc;

use log::trace;

use crate::executor::Dispatcher;
use crate::outcome::{AggregateResult, Outcome};
use crate::promise::{Promise, Settler};
use crate::sync::Spinlock;

struct Slots<T, E> {
    results: Vec<Option<Outcome<T, E>>>,
    remaining: usize,
}

impl<T, E> Slots<T, E> {
    fn new(count: usize) -> Arc<Spinlock<Slots<T, E>>> {
        Arc::new(Spinlock::new(Slots {
            results: (0..count).map(|_| None).collect(),
            remaining: count,
        }))
    }

    fn take_all(&mut self) -> AggregateResult<T, E> {
        self.results
            .iter_mut()
            .map(|slot| slot.take().expect("aggregate slot left empty"))
            .collect()
    }
}

/// Wait for every input to fulfill.
///
/// An empty input resolves immediately with an empty sequence. Otherwise the
/// aggregate resolves with one `Success` per input, in input order, once all
/// of them fulfilled; the first rejection rejects the aggregate with that
/// error right away. Fail-fast does not detach from the still-pending
/// siblings: they settle on their own and are ignored.
pub fn all<T, E>(
    dispatcher: &Dispatcher,
    promises: Vec<Promise<T, E>>,
) -> Promise<AggregateResult<T, E>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    if promises.is_empty() {
        return Promise::fulfilled(dispatcher, Vec::new());
    }

    let (aggregate, settler) = Promise::deferred(dispatcher);
    let slots = Slots::new(promises.len());

    for (index, promise) in promises.iter().enumerate() {
        // An input that already settled is folded in right here; no executor
        // hop is needed to observe a terminal state.
        if let Some(outcome) = promise.current() {
            record_all(&slots, &settler, index, outcome);
            continue;
        }

        let slots = slots.clone();
        let settler = settler.clone();
        promise.on_settle(move |outcome| record_all(&slots, &settler, index, outcome));
    }

    aggregate
}

fn record_all<T, E>(
    slots: &Arc<Spinlock<Slots<T, E>>>,
    settler: &Settler<AggregateResult<T, E>, E>,
    index: usize,
    outcome: Outcome<T, E>,
) where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    match outcome {
        Outcome::Failure(error) => {
            trace!("all: input {} rejected, failing the aggregate", index);
            settler.reject(error);
        }
        Outcome::Success(value) => {
            let done = {
                let mut slots = slots.lock();
                slots.results[index] = Some(Outcome::Success(value));
                slots.remaining -= 1;
                slots.remaining == 0
            };

            if done {
                let results = slots.lock().take_all();
                settler.resolve(results);
            }
        }
    }
}

/// Wait for every input to settle, succeeding if at least one did.
///
/// An empty input resolves immediately with an empty sequence. Otherwise the
/// aggregate never fails fast: every slot records its `Success` or `Failure`,
/// and once the last input settles the aggregate resolves with the full mixed
/// sequence, provided any success exists. If every input failed, the
/// aggregate rejects with the last-observed error; when failures race, which
/// one that is stays nondeterministic.
pub fn any<T, E>(
    dispatcher: &Dispatcher,
    promises: Vec<Promise<T, E>>,
) -> Promise<AggregateResult<T, E>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    if promises.is_empty() {
        return Promise::fulfilled(dispatcher, Vec::new());
    }

    let (aggregate, settler) = Promise::deferred(dispatcher);
    let slots = Slots::new(promises.len());

    for (index, promise) in promises.iter().enumerate() {
        if let Some(outcome) = promise.current() {
            record_any(&slots, &settler, index, outcome);
            continue;
        }

        let slots = slots.clone();
        let settler = settler.clone();
        promise.on_settle(move |outcome| record_any(&slots, &settler, index, outcome));
    }

    aggregate
}

fn record_any<T, E>(
    slots: &Arc<Spinlock<Slots<T, E>>>,
    settler: &Settler<AggregateResult<T, E>, E>,
    index: usize,
    outcome: Outcome<T, E>,
) where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let last_error = outcome.failure().cloned();

    let done = {
        let mut slots = slots.lock();
        slots.results[index] = Some(outcome);
        slots.remaining -= 1;
        slots.remaining == 0
    };

    if !done {
        return;
    }

    let results = slots.lock().take_all();

    // Success wins over failure: a single fulfilled input turns the whole
    // aggregate into a success, failure slots included.
    if results.iter().any(Outcome::is_success) {
        settler.resolve(results);
    } else {
        trace!("any: every input rejected");
        settler.reject(last_error.expect("every input failed yet the last outcome succeeded"));
    }
}
