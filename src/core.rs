// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The promise state machine
//!
//! A `PromiseCore` is the shared cell behind every [`Promise`] handle: the
//! pending/settled state word, the list of subscribed continuations, and the
//! executor they are dispatched through. All public promise operations reduce
//! to `settle` and `subscribe` on a core.
//!
//! [`Promise`]: crate::Promise

use std::mem;
use std::sync::Arc;

use log::trace;

use crate::executor::{Dispatcher, QueueId};
use crate::outcome::Outcome;
use crate::sync::Spinlock;

/// A continuation subscribed to a core. Receives the settled outcome, runs at
/// most once, always on an executor thread.
pub type Handler<T, E> = Box<dyn FnOnce(Outcome<T, E>) + Send + 'static>;

enum State<T, E> {
    Pending,
    Settled(Outcome<T, E>),
}

struct Inner<T, E> {
    state: State<T, E>,
    handlers: Vec<(QueueId, Handler<T, E>)>,
}

pub struct PromiseCore<T, E> {
    inner: Spinlock<Inner<T, E>>,
    dispatcher: Dispatcher,
}

impl<T, E> PromiseCore<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn pending(dispatcher: &Dispatcher) -> Arc<PromiseCore<T, E>> {
        PromiseCore::with_state(dispatcher, State::Pending)
    }

    /// A core born settled. No subscribers exist yet, so no dispatch happens.
    pub fn settled(dispatcher: &Dispatcher, outcome: Outcome<T, E>) -> Arc<PromiseCore<T, E>> {
        PromiseCore::with_state(dispatcher, State::Settled(outcome))
    }

    fn with_state(dispatcher: &Dispatcher, state: State<T, E>) -> Arc<PromiseCore<T, E>> {
        Arc::new(PromiseCore {
            inner: Spinlock::new(Inner {
                state,
                handlers: Vec::new(),
            }),
            dispatcher: dispatcher.clone(),
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Transition pending → settled. First caller wins; every later attempt
    /// is a silent no-op. All currently subscribed handlers are submitted to
    /// their recorded queues and the list is cleared, so a handler can never
    /// fire twice or be retained after firing.
    pub fn settle(this: &Arc<PromiseCore<T, E>>, outcome: Outcome<T, E>) {
        let fired = {
            let mut inner = this.inner.lock();

            if let State::Settled(..) = inner.state {
                trace!("settle on an already settled promise ignored");
                return;
            }

            inner.state = State::Settled(outcome);
            mem::take(&mut inner.handlers)
        };

        trace!("promise settled, dispatching {} handler(s)", fired.len());

        for (queue, handler) in fired {
            PromiseCore::dispatch(this, queue, handler);
        }
    }

    /// Register a continuation. On a pending core it is appended under the
    /// same lock `settle` takes; on a settled core it is submitted to the
    /// executor immediately. Either way it never runs inline in the caller,
    /// so continuations behave uniformly whether attached before or after
    /// settlement.
    pub fn subscribe(this: &Arc<PromiseCore<T, E>>, queue: QueueId, handler: Handler<T, E>) {
        {
            let mut inner = this.inner.lock();

            if let State::Pending = inner.state {
                inner.handlers.push((queue, handler));
                return;
            }
        }

        PromiseCore::dispatch(this, queue, handler);
    }

    /// Non-blocking consistent read of the settled outcome, if any.
    pub fn current(&self) -> Option<Outcome<T, E>> {
        match self.inner.lock().state {
            State::Pending => None,
            State::Settled(ref outcome) => Some(outcome.clone()),
        }
    }

    fn dispatch(this: &Arc<PromiseCore<T, E>>, queue: QueueId, handler: Handler<T, E>) {
        let core = this.clone();

        this.dispatcher.submit(
            queue,
            Box::new(move || handler(core.settled_outcome())),
        );
    }

    fn settled_outcome(&self) -> Outcome<T, E> {
        match self.inner.lock().state {
            State::Settled(ref outcome) => outcome.clone(),
            // A handler only ever runs after its core settled. Observing
            // `Pending` here means the lock discipline is broken, which the
            // rest of the library cannot recover from.
            State::Pending => panic!("continuation dispatched while its promise is still pending"),
        }
    }
}
