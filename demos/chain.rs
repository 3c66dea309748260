// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::mpsc::channel;
use std::sync::Arc;

use dispatch_promise::{Dispatcher, Promise, Resolution, ThreadDispatcher};

fn main() {
    env_logger::init();

    let dispatcher: Dispatcher = Arc::new(ThreadDispatcher::new());
    let (done_tx, done_rx) = channel();

    Promise::<f64, String>::spawn(&dispatcher, |settler| {
        // Pretend this is a slow computation on the background lane.
        settler.resolve(1.23);
    })
    .then(|value| {
        assert_eq!(value, 1.23);
        println!("background step got {}", value);
        Resolution::Value(34)
    })
    .then_on_main(|value| {
        println!("main lane step got {}", value);
        if value == 34 {
            Resolution::Value(value + 1)
        } else {
            Resolution::Error("unexpected value".to_string())
        }
    })
    .catch(|err| {
        println!("recovering from: {}", err);
        Resolution::Value(0)
    })
    .finally(move || {
        println!("chain settled");
        done_tx.send(()).unwrap();
    });

    done_rx.recv().unwrap();
}
