// Copyright 2026 The dispatch-promise Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Named dispatch queues and the executor abstraction

use std::fmt;
use std::panic;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error, trace};

/// Logical lane a unit of work is submitted to.
///
/// `Main` models the designated UI/main thread of the host application,
/// `Background` the default lane for continuations. Which real thread backs
/// each lane is entirely up to the `Executor` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueId {
    Main,
    Background,
}

impl QueueId {
    pub fn name(&self) -> &'static str {
        match *self {
            QueueId::Main => "main",
            QueueId::Background => "background",
        }
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A zero-argument unit of work.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Accepts units of work for eventual, asynchronous execution.
///
/// Submissions to the same queue run in FIFO order; across queues there is no
/// ordering guarantee. `submit` must never run the work inline on the calling
/// thread.
pub trait Executor: Send + Sync {
    fn submit(&self, queue: QueueId, work: Work);
}

/// The injected executor handle every promise carries.
///
/// Constructed once at process start and passed explicitly; the library keeps
/// no global queue singletons.
pub type Dispatcher = Arc<dyn Executor>;

enum LaneMessage {
    Work(Work),
    Shutdown,
}

struct Lane {
    sender: Mutex<Sender<LaneMessage>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// An in-process `Executor` running one worker thread per lane.
///
/// Each lane is an mpsc channel drained by a single named thread
/// (`lane-main`, `lane-background`), which yields FIFO-per-queue by
/// construction. Dropping the dispatcher drains both lanes and joins the
/// workers; work already queued still runs.
pub struct ThreadDispatcher {
    main: Lane,
    background: Lane,
}

impl ThreadDispatcher {
    pub fn new() -> ThreadDispatcher {
        ThreadDispatcher {
            main: Lane::spawn(QueueId::Main),
            background: Lane::spawn(QueueId::Background),
        }
    }

    fn lane(&self, queue: QueueId) -> &Lane {
        match queue {
            QueueId::Main => &self.main,
            QueueId::Background => &self.background,
        }
    }
}

impl Default for ThreadDispatcher {
    fn default() -> ThreadDispatcher {
        ThreadDispatcher::new()
    }
}

impl Executor for ThreadDispatcher {
    fn submit(&self, queue: QueueId, work: Work) {
        trace!("submitting work to lane {}", queue);

        self.lane(queue)
            .sender
            .lock()
            .expect("lane sender lock poisoned")
            .send(LaneMessage::Work(work))
            .expect("lane worker is gone");
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        for lane in [&self.main, &self.background] {
            lane.shutdown();
        }
    }
}

impl Lane {
    fn spawn(queue: QueueId) -> Lane {
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("lane-{}", queue.name()))
            .spawn(move || {
                debug!("lane {} worker started", queue);

                while let Ok(msg) = rx.recv() {
                    match msg {
                        LaneMessage::Work(work) => {
                            // A panicking continuation must not take the
                            // whole lane down with it.
                            if panic::catch_unwind(panic::AssertUnwindSafe(work)).is_err() {
                                error!("work item panicked on lane {}", queue);
                            }
                        }
                        LaneMessage::Shutdown => break,
                    }
                }

                debug!("lane {} worker stopped", queue);
            })
            .expect("failed to spawn lane worker");

        Lane {
            sender: Mutex::new(tx),
            handle: Mutex::new(Some(handle)),
        }
    }

    fn shutdown(&self) {
        // The worker may already be gone if it panicked outside of a work
        // item; ignore the send error and join whatever is left.
        let _ = self
            .sender
            .lock()
            .expect("lane sender lock poisoned")
            .send(LaneMessage::Shutdown);

        let handle = self
            .handle
            .lock()
            .expect("lane handle lock poisoned")
            .take();

        if let Some(handle) = handle {
            // Promise cores keep the dispatcher alive, so the final drop can
            // happen inside a work item on this very lane. A lane cannot join
            // itself; it winds down on its own once it reaches the shutdown
            // message.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
