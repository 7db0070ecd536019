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

use std::fmt;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// A one-shot signal that an entry has been handled.
///
/// The callback runs exactly once: on [`complete`](Completion::complete), or when the completion
/// is dropped without having been completed, e.g. when a delivery task panics.
///
/// # Examples
///
/// ```
/// use std::sync::mpsc;
///
/// use logforth_append_discord::Completion;
///
/// let (tx, rx) = mpsc::channel();
/// let done = Completion::new(move || tx.send(()).unwrap());
/// done.complete();
/// assert!(rx.try_recv().is_ok());
/// ```
pub struct Completion {
    callback: Option<Callback>,
}

impl Completion {
    /// Create a completion that runs `callback`.
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// A completion that does nothing.
    pub fn noop() -> Self {
        Self { callback: None }
    }

    /// Signal that the entry has been handled.
    pub fn complete(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    fn counting() -> (Arc<AtomicUsize>, Completion) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let done = Completion::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, done)
    }

    #[test]
    fn test_complete_fires_once() {
        let (count, done) = counting();
        done.complete();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_fires_pending() {
        let (count, done) = counting();
        drop(done);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_fires_pending() {
        let (count, done) = counting();
        let result = std::thread::spawn(move || {
            let _done = done;
            panic!("delivery panicked");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
