use rusqlite::{Connection, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        amount TEXT NOT NULL,
        transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
        category TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_owner ON transactions (owner_id, date);
    CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        category TEXT NOT NULL,
        limit_amount TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_owner ON budgets (owner_id);
";

pub fn establish_connection(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
