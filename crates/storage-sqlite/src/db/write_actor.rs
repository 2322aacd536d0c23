use super::DbPool;
use crate::errors::StorageError;
use bookloop_core::errors::{DatabaseError, Error, Result};
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// Every job runs inside its own IMMEDIATE transaction on the writer's connection.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type Envelope = (
    Job<Box<dyn Any + Send + 'static>>,
    oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
);

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// All writes in the process are serialised through here, so a job that
    /// reads and then conditionally writes sees no interleaving writer.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("writer actor is not running"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("writer actor dropped the reply"))??;

        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| writer_gone("writer actor returned an unexpected type"))
    }
}

fn writer_gone(reason: &str) -> Error {
    Error::Database(DatabaseError::Internal(reason.to_string()))
}

/// Spawns a background Tokio task that acts as the single writer to the database.
/// The actor owns one pooled connection and processes jobs serially.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The caller may have gone away (request cancelled).
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
