// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dispatch_promise::{all, any, Dispatcher, Outcome, Promise, Settler, ThreadDispatcher};

const WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestError(&'static str);

fn dispatcher() -> Dispatcher {
    Arc::new(ThreadDispatcher::new())
}

fn deferred_batch(
    dispatcher: &Dispatcher,
    count: usize,
) -> (Vec<Promise<usize, TestError>>, Vec<Settler<usize, TestError>>) {
    (0..count).map(|_| Promise::deferred(dispatcher)).unzip()
}

#[test]
fn test_all_of_nothing_resolves_immediately() {
    let dispatcher = dispatcher();

    let aggregate = all::<usize, TestError>(&dispatcher, Vec::new());

    assert!(aggregate.is_fulfilled());
    assert_eq!(aggregate.value(), Some(Vec::new()));
}

#[test]
fn test_all_success_is_index_aligned_regardless_of_completion_order() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 5);

    let aggregate = all(&dispatcher, promises);
    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    // Settle back to front; slot order must still follow input order.
    for (index, settler) in settlers.into_iter().enumerate().rev() {
        settler.resolve(index * 10);
    }

    let results = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(
        results,
        Outcome::Success(vec![
            Outcome::Success(0),
            Outcome::Success(10),
            Outcome::Success(20),
            Outcome::Success(30),
            Outcome::Success(40),
        ])
    );
}

#[test]
fn test_all_rejects_fast_on_the_first_failure() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 3);

    let aggregate = all(&dispatcher, promises);
    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    settlers[0].resolve(1);
    settlers[1].reject(TestError("sank the batch"));
    // The aggregate must not wait for the third input.

    let outcome = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(outcome, Outcome::Failure(TestError("sank the batch")));

    // The straggler settling later is ignored.
    settlers[2].resolve(3);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        aggregate.current(),
        Some(Outcome::Failure(TestError("sank the batch")))
    );
}

#[test]
fn test_all_first_rejection_wins_under_contention() {
    let dispatcher = dispatcher();

    for _ in 0..20 {
        let (promises, settlers) = deferred_batch(&dispatcher, 4);
        let aggregate = all(&dispatcher, promises);

        let mut racers = Vec::new();
        for (index, settler) in settlers.into_iter().enumerate() {
            racers.push(thread::spawn(move || {
                settler.reject(TestError(if index % 2 == 0 { "even" } else { "odd" }));
            }));
        }
        for racer in racers {
            racer.join().unwrap();
        }

        let (tx, rx) = channel();
        aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

        // Exactly one rejection settled the aggregate; which one is a race.
        match rx.recv_timeout(WAIT).unwrap() {
            Outcome::Failure(TestError(msg)) => assert!(msg == "even" || msg == "odd"),
            other => panic!("aggregate unexpectedly fulfilled: {:?}", other),
        }
    }
}

#[test]
fn test_all_with_mixed_settled_and_pending_inputs() {
    let dispatcher = dispatcher();

    let (pending, settler) = Promise::<usize, TestError>::deferred(&dispatcher);
    let inputs = vec![
        Promise::fulfilled(&dispatcher, 1),
        pending,
        Promise::fulfilled(&dispatcher, 3),
    ];

    let aggregate = all(&dispatcher, inputs);
    assert!(aggregate.is_pending());

    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    settler.resolve(2);

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        Outcome::Success(vec![
            Outcome::Success(1),
            Outcome::Success(2),
            Outcome::Success(3),
        ])
    );
}

#[test]
fn test_any_of_nothing_resolves_immediately() {
    let dispatcher = dispatcher();

    let aggregate = any::<usize, TestError>(&dispatcher, Vec::new());

    assert!(aggregate.is_fulfilled());
    assert_eq!(aggregate.value(), Some(Vec::new()));
}

#[test]
fn test_any_mixes_successes_and_failures_index_aligned() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 4);

    let aggregate = any(&dispatcher, promises);
    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    // One failure does not fail the batch, and completion order (3, 0, 2, 1)
    // must not leak into slot order.
    settlers[3].reject(TestError("slot three"));
    settlers[0].resolve(100);
    settlers[2].resolve(102);
    settlers[1].reject(TestError("slot one"));

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        Outcome::Success(vec![
            Outcome::Success(100),
            Outcome::Failure(TestError("slot one")),
            Outcome::Success(102),
            Outcome::Failure(TestError("slot three")),
        ])
    );
}

#[test]
fn test_any_waits_for_every_input() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 2);

    let aggregate = any(&dispatcher, promises);

    settlers[0].resolve(1);
    thread::sleep(Duration::from_millis(50));

    // One success is not enough; the last input has not settled yet.
    assert!(aggregate.is_pending());

    settlers[1].resolve(2);

    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());
    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        Outcome::Success(vec![Outcome::Success(1), Outcome::Success(2)])
    );
}

#[test]
fn test_any_rejects_when_every_input_fails() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 3);

    let aggregate = any(&dispatcher, promises);
    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    settlers[0].reject(TestError("first"));
    settlers[1].reject(TestError("second"));
    settlers[2].reject(TestError("third"));

    // All inputs failed, so the aggregate rejects. When failures race, which
    // error wins is deliberately unspecified; assert only that one is there.
    match rx.recv_timeout(WAIT).unwrap() {
        Outcome::Failure(TestError(..)) => {}
        other => panic!("aggregate unexpectedly fulfilled: {:?}", other),
    }
}

#[test]
fn test_any_single_success_beats_many_failures() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 4);

    let aggregate = any(&dispatcher, promises);
    let (tx, rx) = channel();
    aggregate.on_settle(move |outcome| tx.send(outcome).unwrap());

    let mut racers = Vec::new();
    for (index, settler) in settlers.into_iter().enumerate() {
        racers.push(thread::spawn(move || {
            if index == 2 {
                settler.resolve(7);
            } else {
                settler.reject(TestError("noise"));
            }
        }));
    }
    for racer in racers {
        racer.join().unwrap();
    }

    let results = match rx.recv_timeout(WAIT).unwrap() {
        Outcome::Success(results) => results,
        Outcome::Failure(err) => panic!("aggregate rejected despite a success: {:?}", err),
    };

    assert_eq!(results.len(), 4);
    assert_eq!(results[2], Outcome::Success(7));
    for (index, slot) in results.iter().enumerate() {
        if index != 2 {
            assert_eq!(*slot, Outcome::Failure(TestError("noise")));
        }
    }
}

#[test]
fn test_combinators_feed_into_further_chains() {
    let dispatcher = dispatcher();
    let (promises, settlers) = deferred_batch(&dispatcher, 3);

    let (tx, rx) = channel();

    all(&dispatcher, promises)
        .then(move |results| {
            let sum: usize = results
                .iter()
                .filter_map(|outcome| outcome.success().copied())
                .sum();
            dispatch_promise::Resolution::Value(sum)
        })
        .on_settle(move |outcome| tx.send(outcome).unwrap());

    for (index, settler) in settlers.into_iter().enumerate() {
        settler.resolve(index + 1);
    }

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Outcome::Success(6));
}
