//! Connections whose client handle must stay on the thread that opened it.
//!
//! The handle lives on a dedicated worker thread; the [`ConfinedConnection`]
//! returned to the catalog only holds a request channel, so it can move
//! between threads with its owner while the handle never does.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use super::{DriverConnection, Row, SqlValue};
use crate::error::DriverError;

/// Statement runner owned by a worker thread.
pub(crate) trait Session {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError>;

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError>;
}

type Reply<T> = mpsc::Sender<Result<T, DriverError>>;

enum Request {
    Query {
        sql: String,
        params: Vec<SqlValue>,
        reply: Reply<Vec<Row>>,
    },
    Execute {
        sql: String,
        params: Vec<SqlValue>,
        reply: Reply<u64>,
    },
}

/// Handle to a [`Session`] running on its own thread. Dropping the handle
/// closes the session and joins the thread.
pub(crate) struct ConfinedConnection {
    requests: Option<mpsc::Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl ConfinedConnection {
    /// Starts a worker thread, opens the session on it and waits for the
    /// outcome.
    pub(crate) fn spawn<S, F>(name: &str, open: F) -> Result<Self, DriverError>
    where
        S: Session,
        F: FnOnce() -> Result<S, DriverError> + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (requests, inbox) = mpsc::channel::<Request>();
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut session = match open() {
                    Ok(session) => session,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                for request in inbox {
                    match request {
                        Request::Query { sql, params, reply } => {
                            let _ = reply.send(session.query(&sql, &params));
                        }
                        Request::Execute { sql, params, reply } => {
                            let _ = reply.send(session.execute(&sql, &params));
                        }
                    }
                }
            })
            .map_err(|e| DriverError::client(format!("failed to start {name} thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                requests: Some(requests),
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(DriverError::client(format!("{name} thread exited while opening")))
            }
        }
    }

    fn call<T>(&self, request: impl FnOnce(Reply<T>) -> Request) -> Result<T, DriverError> {
        let (reply, answer) = mpsc::channel();
        let sent = match &self.requests {
            Some(requests) => requests.send(request(reply)).is_ok(),
            None => false,
        };
        if !sent {
            return Err(gone());
        }
        answer.recv().unwrap_or_else(|_| Err(gone()))
    }
}

fn gone() -> DriverError {
    DriverError::client("connection thread is gone")
}

impl DriverConnection for ConfinedConnection {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        self.call(|reply| Request::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
            reply,
        })
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DriverError> {
        self.call(|reply| Request::Execute {
            sql: sql.to_string(),
            params: params.to_vec(),
            reply,
        })
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        drop(self);
        Ok(())
    }
}

impl Drop for ConfinedConnection {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("connection thread panicked");
            }
        }
    }
}
