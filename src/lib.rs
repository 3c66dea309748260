// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolve-once promises with chained continuations over named dispatch queues
//!
//! A [`Promise`] settles exactly once, fulfilled with a value or rejected
//! with an error, and notifies its subscribed continuations through an
//! injected [`Executor`] with two logical lanes, `Main` and `Background`.
//! Chains are built with [`then`](Promise::then), [`catch`](Promise::catch)
//! and [`finally`](Promise::finally); several promises combine through
//! [`all`] and [`any`].
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::mpsc::channel;
//!
//! use dispatch_promise::{Dispatcher, Outcome, Promise, Resolution, ThreadDispatcher};
//!
//! let dispatcher: Dispatcher = Arc::new(ThreadDispatcher::new());
//! let (promise, settler) = Promise::<i32, String>::deferred(&dispatcher);
//!
//! let doubled = promise.then(|v| Resolution::Value(v * 2));
//! settler.resolve(25);
//!
//! let (tx, rx) = channel();
//! doubled.on_settle(move |outcome| tx.send(outcome).unwrap());
//! assert_eq!(rx.recv().unwrap(), Outcome::Success(50));
//! ```

pub use crate::combine::{all, any};
pub use crate::executor::{Dispatcher, Executor, QueueId, ThreadDispatcher, Work};
pub use crate::outcome::{AggregateResult, Outcome};
pub use crate::promise::{Promise, Resolution, Settler};

pub mod combine;
pub mod executor;
pub mod outcome;
pub mod promise;
pub mod sync;
mod core;

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::mpsc::channel;
    use std::sync::Arc;
    use std::time::Duration;

    fn dispatcher() -> Dispatcher {
        Arc::new(ThreadDispatcher::new())
    }

    #[test]
    fn test_deferred_chain_doubles() {
        let dispatcher = dispatcher();
        let (promise, settler) = Promise::<i32, String>::deferred(&dispatcher);
        let (tx, rx) = channel();

        promise
            .then(|v| Resolution::Value(v * 2))
            .then(move |v| {
                assert_eq!(v, 50);
                tx.send(v).unwrap();
                Resolution::Value(())
            });

        settler.resolve(25);

        assert_eq!(rx.recv_timeout(Duration::from_secs(10)).unwrap(), 50);
    }

    #[test]
    fn test_all_of_immediates_is_observable_without_waiting() {
        let dispatcher = dispatcher();

        let aggregate = all(
            &dispatcher,
            vec![
                Promise::<i32, String>::fulfilled(&dispatcher, 1),
                Promise::fulfilled(&dispatcher, 2),
            ],
        );

        // Already-settled inputs short-circuit, so the aggregate is settled
        // by the time `all` returns.
        assert_eq!(
            aggregate.value(),
            Some(vec![Outcome::Success(1), Outcome::Success(2)])
        );
    }
}
