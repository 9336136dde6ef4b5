use crate::db::store::Store;
use crate::error::{Result, ValidationError};

pub fn remove_transaction_from_store<S: Store>(store: &mut S, owner_id: &str, id_input: &str) -> Result<()> {
    let id = id_input.trim();
    if id.is_empty() {
        return Err(ValidationError::InvalidInput("Transaction ID cannot be empty.".to_string()).into());
    }
    store.delete_transaction(owner_id, id)
}
