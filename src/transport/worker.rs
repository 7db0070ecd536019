// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::Cell;
use std::sync::Arc;
use std::thread::JoinHandle;

use logforth_core::Error;
use logforth_core::Trap;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::task::JoinSet;

use crate::Completion;
use crate::LogEntry;
use crate::Metadata;
use crate::handler::Handler;

thread_local! {
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is a delivery worker.
///
/// The HTTP stack may log through the global logger while sending; such records must not be
/// forwarded to Discord again.
pub(crate) fn on_worker_thread() -> bool {
    ON_WORKER.with(Cell::get)
}

pub(crate) enum Task {
    Deliver {
        handler: Arc<Handler>,
        entry: LogEntry,
        metadata: Arc<Metadata>,
        done: Completion,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
}

#[derive(Debug)]
pub(crate) struct WorkerState(Option<State>);

#[derive(Debug)]
struct State {
    sender: mpsc::UnboundedSender<Task>,
    handle: JoinHandle<()>,
}

impl WorkerState {
    pub(crate) fn spawn(thread_name: String, trap: Arc<dyn Trap>) -> Result<Self, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::new("failed to build delivery runtime").with_source(err))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = Worker {
            runtime,
            receiver,
            trap,
        };
        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || worker.run())
            .map_err(|err| Error::new("failed to spawn delivery thread").with_source(err))?;

        Ok(Self(Some(State { sender, handle })))
    }

    pub(crate) fn send_task(&self, task: Task) -> Result<(), Error> {
        // SAFETY: state is always Some before dropped.
        let State { sender, handle: _ } = self.0.as_ref().unwrap();

        sender.send(task).map_err(|err| {
            Error::new(match err.0 {
                Task::Deliver { .. } => "failed to send delivery task to Discord worker",
                Task::Flush { .. } => "failed to send flush task to Discord worker",
            })
        })
    }
}

impl Drop for WorkerState {
    fn drop(&mut self) {
        // SAFETY: state is always Some before dropped.
        let State { sender, handle } = self.0.take().unwrap();

        // the worker finishes in-flight deliveries once the channel closes
        drop(sender);

        // a transport dropped from its own worker cannot wait for itself
        if on_worker_thread() {
            return;
        }

        // wait for the thread to finish
        if handle.join().is_err() {
            eprintln!("failed to join Discord delivery thread");
        }
    }
}

struct Worker {
    runtime: Runtime,
    receiver: mpsc::UnboundedReceiver<Task>,
    trap: Arc<dyn Trap>,
}

impl Worker {
    fn run(self) {
        let Worker {
            runtime,
            mut receiver,
            trap,
        } = self;

        ON_WORKER.with(|on_worker| on_worker.set(true));

        runtime.block_on(async move {
            let mut inflight = JoinSet::new();

            loop {
                tokio::select! {
                    task = receiver.recv() => match task {
                        Some(Task::Deliver { handler, entry, metadata, done }) => {
                            inflight.spawn(async move {
                                handler.log(entry, &metadata, done).await;
                            });
                        }
                        Some(Task::Flush { done }) => {
                            drain(&mut inflight, trap.as_ref()).await;
                            let _ = done.send(());
                        }
                        None => break,
                    },
                    Some(result) = inflight.join_next(), if !inflight.is_empty() => {
                        reap(result, trap.as_ref());
                    }
                }
            }

            drain(&mut inflight, trap.as_ref()).await;
        });
    }
}

async fn drain(inflight: &mut JoinSet<()>, trap: &dyn Trap) {
    while let Some(result) = inflight.join_next().await {
        reap(result, trap);
    }
}

// a panicked delivery has already fired its completion on unwind
fn reap(result: Result<(), JoinError>, trap: &dyn Trap) {
    if let Err(err) = result {
        trap.trap(&Error::new("Discord delivery task failed").with_source(err));
    }
}
