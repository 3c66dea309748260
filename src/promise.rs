// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Promise handles and the chaining algebra
//!
//! A [`Promise`] is the read half of a settle-once cell; a [`Settler`] is the
//! write half. Continuations attached with [`then`](Promise::then),
//! [`catch`](Promise::catch) and [`finally`](Promise::finally) each produce a
//! new promise whose settlement derives from the parent's. Every operator
//! takes a target [`QueueId`] through its `_on` form; the plain form targets
//! the background lane and the `_on_main` form the main lane.

use std::sync::Arc;

use crate::core::PromiseCore;
use crate::executor::{Dispatcher, QueueId};
use crate::outcome::Outcome;

/// What a continuation settles its result promise with.
///
/// `Error` makes a returned error equivalent to a thrown one: the result
/// promise rejects without a separate throw mechanism. `Chain` is flattened,
/// so the result promise settles with whatever the inner promise eventually
/// settles with, through any depth of pending state.
pub enum Resolution<T, E> {
    Value(T),
    Error(E),
    Chain(Promise<T, E>),
}

/// A single-assignment container for a future value or error.
///
/// Handles are cheap to clone and share one underlying state cell. Dropping
/// every handle while the cell is still pending simply abandons it; a promise
/// that never settles is valid, if unproductive.
pub struct Promise<T, E> {
    core: Arc<PromiseCore<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Promise<T, E> {
        Promise {
            core: self.core.clone(),
        }
    }
}

/// The write half of a promise: carries both the resolve and the reject
/// capability. Cloneable so racing producers can each hold one; the first
/// settlement wins and the rest are no-ops.
pub struct Settler<T, E> {
    core: Arc<PromiseCore<T, E>>,
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Settler<T, E> {
        Settler {
            core: self.core.clone(),
        }
    }
}

impl<T, E> Settler<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn resolve(&self, value: T) {
        PromiseCore::settle(&self.core, Outcome::Success(value));
    }

    pub fn reject(&self, error: E) {
        PromiseCore::settle(&self.core, Outcome::Failure(error));
    }

    pub fn settle(&self, outcome: Outcome<T, E>) {
        PromiseCore::settle(&self.core, outcome);
    }

    /// Settle with whatever a continuation handed back, flattening a chained
    /// promise by subscribing to it on the given queue.
    fn apply(&self, queue: QueueId, resolution: Resolution<T, E>) {
        match resolution {
            Resolution::Value(value) => self.resolve(value),
            Resolution::Error(error) => self.reject(error),
            Resolution::Chain(promise) => {
                let settler = self.clone();
                promise.on_settle_at(queue, move |outcome| settler.settle(outcome));
            }
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// The deferred pattern: a pending promise plus its settle half.
    pub fn deferred(dispatcher: &Dispatcher) -> (Promise<T, E>, Settler<T, E>) {
        let core = PromiseCore::pending(dispatcher);

        (
            Promise { core: core.clone() },
            Settler { core },
        )
    }

    /// An immediately fulfilled promise. Short-circuits straight to the
    /// terminal state; no executor hop happens.
    pub fn fulfilled(dispatcher: &Dispatcher, value: T) -> Promise<T, E> {
        Promise {
            core: PromiseCore::settled(dispatcher, Outcome::Success(value)),
        }
    }

    /// An immediately rejected promise.
    pub fn rejected(dispatcher: &Dispatcher, error: E) -> Promise<T, E> {
        Promise {
            core: PromiseCore::settled(dispatcher, Outcome::Failure(error)),
        }
    }

    /// Run `body` on the background lane with the settle half of a fresh
    /// promise. The body is dispatched, never run in the caller.
    pub fn spawn<F>(dispatcher: &Dispatcher, body: F) -> Promise<T, E>
    where
        F: FnOnce(Settler<T, E>) + Send + 'static,
    {
        Promise::spawn_on(dispatcher, QueueId::Background, body)
    }

    /// Like [`spawn`](Promise::spawn) with an explicit target lane.
    pub fn spawn_on<F>(dispatcher: &Dispatcher, queue: QueueId, body: F) -> Promise<T, E>
    where
        F: FnOnce(Settler<T, E>) + Send + 'static,
    {
        let (promise, settler) = Promise::deferred(dispatcher);

        dispatcher.submit(queue, Box::new(move || body(settler)));

        promise
    }

    pub fn is_pending(&self) -> bool {
        self.core.current().is_none()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self.core.current(), Some(Outcome::Success(..)))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.core.current(), Some(Outcome::Failure(..)))
    }

    /// Best-effort read of the fulfilled value.
    pub fn value(&self) -> Option<T> {
        match self.core.current() {
            Some(Outcome::Success(value)) => Some(value),
            _ => None,
        }
    }

    /// Best-effort read of the rejection error.
    pub fn error(&self) -> Option<E> {
        match self.core.current() {
            Some(Outcome::Failure(error)) => Some(error),
            _ => None,
        }
    }

    /// Non-blocking snapshot of the settled outcome, if any.
    pub fn current(&self) -> Option<Outcome<T, E>> {
        self.core.current()
    }

    /// Run `f` with the settled outcome on the background lane. Fires exactly
    /// once, always via the executor, whether the promise is already settled
    /// or not.
    pub fn on_settle<F>(&self, f: F)
    where
        F: FnOnce(Outcome<T, E>) + Send + 'static,
    {
        self.on_settle_at(QueueId::Background, f);
    }

    /// Like [`on_settle`](Promise::on_settle) with an explicit target lane.
    pub fn on_settle_at<F>(&self, queue: QueueId, f: F)
    where
        F: FnOnce(Outcome<T, E>) + Send + 'static,
    {
        PromiseCore::subscribe(&self.core, queue, Box::new(f));
    }

    /// Map the fulfilled value into the next link of the chain.
    ///
    /// `f` never runs when the parent rejects; the error propagates untouched
    /// to the result promise. On fulfillment `f` runs asynchronously on the
    /// background lane and its [`Resolution`] settles the result.
    pub fn then<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Resolution<U, E> + Send + 'static,
    {
        self.then_on(QueueId::Background, f)
    }

    /// [`then`](Promise::then) targeting the main lane.
    pub fn then_on_main<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Resolution<U, E> + Send + 'static,
    {
        self.then_on(QueueId::Main, f)
    }

    /// [`then`](Promise::then) with an explicit target lane.
    pub fn then_on<U, F>(&self, queue: QueueId, f: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Resolution<U, E> + Send + 'static,
    {
        let core = PromiseCore::pending(self.core.dispatcher());
        let settler = Settler { core: core.clone() };

        PromiseCore::subscribe(
            &self.core,
            queue,
            Box::new(move |outcome| match outcome {
                Outcome::Success(value) => settler.apply(queue, f(value)),
                Outcome::Failure(error) => settler.reject(error),
            }),
        );

        Promise { core }
    }

    /// Intercept a rejection; the dual of [`then`](Promise::then).
    ///
    /// `f` never runs when the parent fulfills; the value is forwarded. On
    /// rejection `f` runs asynchronously and may recover with a value, pass
    /// on an error, or chain another promise.
    pub fn catch<F>(&self, f: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Resolution<T, E> + Send + 'static,
    {
        self.catch_on(QueueId::Background, f)
    }

    /// [`catch`](Promise::catch) targeting the main lane.
    pub fn catch_on_main<F>(&self, f: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Resolution<T, E> + Send + 'static,
    {
        self.catch_on(QueueId::Main, f)
    }

    /// [`catch`](Promise::catch) with an explicit target lane.
    pub fn catch_on<F>(&self, queue: QueueId, f: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Resolution<T, E> + Send + 'static,
    {
        let core = PromiseCore::pending(self.core.dispatcher());
        let settler = Settler { core: core.clone() };

        PromiseCore::subscribe(
            &self.core,
            queue,
            Box::new(move |outcome| match outcome {
                Outcome::Success(value) => settler.resolve(value),
                Outcome::Failure(error) => settler.apply(queue, f(error)),
            }),
        );

        Promise { core }
    }

    /// Observe settlement regardless of outcome.
    ///
    /// `f` takes no argument and cannot alter the result: the original
    /// outcome is forwarded unchanged to the returned promise.
    pub fn finally<F>(&self, f: F) -> Promise<T, E>
    where
        F: FnOnce() + Send + 'static,
    {
        self.finally_on(QueueId::Background, f)
    }

    /// [`finally`](Promise::finally) targeting the main lane.
    pub fn finally_on_main<F>(&self, f: F) -> Promise<T, E>
    where
        F: FnOnce() + Send + 'static,
    {
        self.finally_on(QueueId::Main, f)
    }

    /// [`finally`](Promise::finally) with an explicit target lane.
    pub fn finally_on<F>(&self, queue: QueueId, f: F) -> Promise<T, E>
    where
        F: FnOnce() + Send + 'static,
    {
        let core = PromiseCore::pending(self.core.dispatcher());
        let settler = Settler { core: core.clone() };

        PromiseCore::subscribe(
            &self.core,
            queue,
            Box::new(move |outcome| {
                f();
                settler.settle(outcome);
            }),
        );

        Promise { core }
    }
}
