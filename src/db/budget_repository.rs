use crate::db::repository::conversion_error;
use crate::error::{AppError, Result};
use crate::models::budget::Budget;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn add_budget(conn: &Connection, budget: &Budget) -> Result<()> {
    conn.execute(
        "INSERT INTO budgets (id, owner_id, category, limit_amount) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            &budget.id,
            &budget.owner_id,
            &budget.category,
            budget.limit.to_string(),
        ],
    )?;
    Ok(())
}

/// Budgets of one owner in creation order.
pub fn get_budgets_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, category, limit_amount FROM budgets WHERE owner_id = ?1 ORDER BY rowid ASC",
    )?;

    let budgets = stmt
        .query_map([owner_id], |row| {
            let limit_str: String = row.get(3)?;
            Ok(Budget {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                category: row.get(2)?,
                limit: Decimal::from_str(&limit_str).map_err(|e| conversion_error(3, e))?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(budgets)
}

pub fn delete_budget(conn: &Connection, owner_id: &str, id: &str) -> Result<()> {
    let rows = conn.execute(
        "DELETE FROM budgets WHERE id = ?1 AND owner_id = ?2",
        [id, owner_id],
    )?;

    if rows == 0 {
        return Err(AppError::NotFound(format!("Budget with ID {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;

    fn create_test_budget(id: &str, owner: &str, category: &str) -> Budget {
        Budget {
            id: id.to_string(),
            owner_id: owner.to_string(),
            category: category.to_string(),
            limit: Decimal::new(2500, 2),
        }
    }

    #[test]
    fn test_get_budgets_empty() {
        let conn = establish_test_connection().unwrap();
        assert!(get_budgets_for_owner(&conn, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_add_budget_and_retrieve_in_creation_order() {
        let conn = establish_test_connection().unwrap();
        add_budget(&conn, &create_test_budget("b2", "alice", "Transport")).unwrap();
        add_budget(&conn, &create_test_budget("b1", "alice", "Food")).unwrap();
        add_budget(&conn, &create_test_budget("b3", "bob", "Food")).unwrap();

        let budgets = get_budgets_for_owner(&conn, "alice").unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Transport");
        assert_eq!(budgets[1].category, "Food");
        assert_eq!(budgets[1].limit, Decimal::new(2500, 2));
    }

    #[test]
    fn test_delete_budget_success() {
        let conn = establish_test_connection().unwrap();
        add_budget(&conn, &create_test_budget("b1", "alice", "Food")).unwrap();

        delete_budget(&conn, "alice", "b1").unwrap();
        assert!(get_budgets_for_owner(&conn, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_delete_budget_not_found() {
        let conn = establish_test_connection().unwrap();
        add_budget(&conn, &create_test_budget("b1", "alice", "Food")).unwrap();

        let result = delete_budget(&conn, "bob", "b1");
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
