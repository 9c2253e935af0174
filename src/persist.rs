use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::game::Effect;
use crate::history::GameRecord;
use crate::session::SessionSnapshot;
use crate::store::GameStore;
use crate::user::User;

#[derive(Debug)]
enum Request {
    Save(SessionSnapshot),
    Archive(GameRecord),
    Clear,
    Shutdown,
}

/// Background writer. Requests are applied one at a time in submission
/// order, so a later snapshot can never be overwritten by an earlier one.
/// Failures are logged and otherwise ignored; the live game stays authoritative.
pub struct Persister {
    tx: Sender<Request>,
    handle: Option<JoinHandle<Box<dyn GameStore>>>,
}

impl Persister {
    pub fn spawn(mut store: Box<dyn GameStore>, user: User) -> Self {
        let (tx, rx) = mpsc::channel::<Request>();

        let handle = thread::spawn(move || {
            for request in rx {
                let outcome = match request {
                    Request::Save(snapshot) => store.save_session(&user.id, &snapshot),
                    Request::Clear => store.clear_session(&user.id),
                    Request::Archive(mut record) => {
                        record.username = user.username.clone();
                        store.append_history(&user.id, &record).map(|stored| {
                            debug!(id = ?stored.id, word = %stored.word, "game archived");
                        })
                    }
                    Request::Shutdown => break,
                };
                if let Err(err) = outcome {
                    warn!(%err, "persistence request failed");
                }
            }
            store
        });

        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Queue the storage side of an effect. Non-storage effects are ignored.
    pub fn submit(&self, effect: &Effect) {
        let request = match effect {
            Effect::Save(snapshot) => Request::Save(snapshot.clone()),
            Effect::Archive(record) => Request::Archive(record.clone()),
            Effect::Clear => Request::Clear,
            Effect::Validate { .. } | Effect::Message(_) => return,
        };
        if self.tx.send(request).is_err() {
            warn!("persistence worker is gone; dropping request");
        }
    }

    pub fn submit_all(&self, effects: &[Effect]) {
        for effect in effects {
            self.submit(effect);
        }
    }

    /// Drain the queue and hand the store back.
    pub fn finish(mut self) -> Option<Box<dyn GameStore>> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Box<dyn GameStore>> {
        let handle = self.handle.take()?;
        let _ = self.tx.send(Request::Shutdown);
        handle.join().ok()
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        self.shutdown();
    }
}
