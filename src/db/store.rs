//! Owner-scoped persistence with snapshot subscriptions.
//!
//! A subscriber receives the owner's full collection right away and again
//! after every create or delete for that owner. Snapshots always replace
//! the previous one; nothing is delivered incrementally.
use crate::db::{budget_repository, connection, repository};
use crate::error::{Result, ValidationError};
use crate::models::budget::{Budget, NewBudget};
use crate::models::transaction::{NewTransaction, Transaction};
use rusqlite::Connection;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type Snapshot<T> = Vec<T>;

pub trait Store {
    fn subscribe_transactions(&mut self, owner_id: &str) -> Result<Receiver<Snapshot<Transaction>>>;
    fn create_transaction(&mut self, owner_id: &str, new: NewTransaction) -> Result<Transaction>;
    fn delete_transaction(&mut self, owner_id: &str, id: &str) -> Result<()>;

    fn subscribe_budgets(&mut self, owner_id: &str) -> Result<Receiver<Snapshot<Budget>>>;
    fn create_budget(&mut self, owner_id: &str, new: NewBudget) -> Result<Budget>;
    fn delete_budget(&mut self, owner_id: &str, id: &str) -> Result<()>;
}

struct Subscribers<T> {
    senders: Vec<(String, Sender<Snapshot<T>>)>,
}

impl<T: Clone> Subscribers<T> {
    fn new() -> Self {
        Self { senders: Vec::new() }
    }

    fn add(&mut self, owner_id: &str, initial: Snapshot<T>) -> Receiver<Snapshot<T>> {
        let (tx, rx) = mpsc::channel();
        // The receiver is still in hand, so this send cannot fail.
        let _ = tx.send(initial);
        self.senders.push((owner_id.to_string(), tx));
        rx
    }

    fn is_watching(&self, owner_id: &str) -> bool {
        self.senders.iter().any(|(owner, _)| owner == owner_id)
    }

    /// Sends to every live subscriber of `owner_id`, dropping closed ones.
    fn publish(&mut self, owner_id: &str, snapshot: &[T]) {
        self.senders
            .retain(|(owner, tx)| owner != owner_id || tx.send(snapshot.to_vec()).is_ok());
    }
}

pub struct SqliteStore {
    conn: Connection,
    transaction_subscribers: Subscribers<Transaction>,
    budget_subscribers: Subscribers<Budget>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            transaction_subscribers: Subscribers::new(),
            budget_subscribers: Subscribers::new(),
        }
    }

    pub fn open(path: &str) -> Result<Self> {
        let conn = connection::establish_connection(path)?;
        info!(path, "opened transaction store");
        Ok(Self::new(conn))
    }

    fn publish_transactions(&mut self, owner_id: &str) -> Result<()> {
        if !self.transaction_subscribers.is_watching(owner_id) {
            return Ok(());
        }
        let snapshot = repository::get_transactions_for_owner(&self.conn, owner_id)?;
        debug!(owner_id, count = snapshot.len(), "publishing transaction snapshot");
        self.transaction_subscribers.publish(owner_id, &snapshot);
        Ok(())
    }

    fn publish_budgets(&mut self, owner_id: &str) -> Result<()> {
        if !self.budget_subscribers.is_watching(owner_id) {
            return Ok(());
        }
        let snapshot = budget_repository::get_budgets_for_owner(&self.conn, owner_id)?;
        debug!(owner_id, count = snapshot.len(), "publishing budget snapshot");
        self.budget_subscribers.publish(owner_id, &snapshot);
        Ok(())
    }

    // The write already succeeded, so a failed re-read must not fail the caller.
    fn notify_transactions(&mut self, owner_id: &str) {
        if let Err(e) = self.publish_transactions(owner_id) {
            warn!(owner_id, error = %e, "failed to publish transaction snapshot");
        }
    }

    fn notify_budgets(&mut self, owner_id: &str) {
        if let Err(e) = self.publish_budgets(owner_id) {
            warn!(owner_id, error = %e, "failed to publish budget snapshot");
        }
    }
}

fn require_owner(owner_id: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(ValidationError::MissingOwner.into());
    }
    Ok(())
}

impl Store for SqliteStore {
    fn subscribe_transactions(&mut self, owner_id: &str) -> Result<Receiver<Snapshot<Transaction>>> {
        require_owner(owner_id)?;
        let initial = repository::get_transactions_for_owner(&self.conn, owner_id)?;
        Ok(self.transaction_subscribers.add(owner_id, initial))
    }

    fn create_transaction(&mut self, owner_id: &str, new: NewTransaction) -> Result<Transaction> {
        require_owner(owner_id)?;
        let transaction = new.into_transaction(Uuid::new_v4().to_string(), owner_id.to_string());
        repository::add_transaction(&self.conn, &transaction)?;
        info!(owner_id, id = %transaction.id, "transaction created");
        self.notify_transactions(owner_id);
        Ok(transaction)
    }

    fn delete_transaction(&mut self, owner_id: &str, id: &str) -> Result<()> {
        require_owner(owner_id)?;
        repository::remove_transaction(&self.conn, owner_id, id)?;
        info!(owner_id, id, "transaction deleted");
        self.notify_transactions(owner_id);
        Ok(())
    }

    fn subscribe_budgets(&mut self, owner_id: &str) -> Result<Receiver<Snapshot<Budget>>> {
        require_owner(owner_id)?;
        let initial = budget_repository::get_budgets_for_owner(&self.conn, owner_id)?;
        Ok(self.budget_subscribers.add(owner_id, initial))
    }

    fn create_budget(&mut self, owner_id: &str, new: NewBudget) -> Result<Budget> {
        require_owner(owner_id)?;
        let budget = new.into_budget(Uuid::new_v4().to_string(), owner_id.to_string());
        budget_repository::add_budget(&self.conn, &budget)?;
        info!(owner_id, id = %budget.id, "budget created");
        self.notify_budgets(owner_id);
        Ok(budget)
    }

    fn delete_budget(&mut self, owner_id: &str, id: &str) -> Result<()> {
        require_owner(owner_id)?;
        budget_repository::delete_budget(&self.conn, owner_id, id)?;
        info!(owner_id, id, "budget deleted");
        self.notify_budgets(owner_id);
        Ok(())
    }
}
