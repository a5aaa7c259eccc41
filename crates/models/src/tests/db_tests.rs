use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use anyhow::Result;

use super::setup_test_db;

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

/// Test that every scheduling table exists after migrations
#[tokio::test]
async fn test_schema_tables_present() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    for table in [
        "user",
        "user_credentials",
        "department",
        "employee",
        "employee_department",
        "service_order",
        "service_order_department",
        "service_order_collaborator",
        "service_day",
    ] {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT COUNT(*)::int AS n FROM information_schema.tables WHERE table_name = $1",
            [table.into()],
        );
        let row = db.query_one(stmt).await?.expect("count row");
        let n: i32 = row.try_get("", "n")?;
        assert_eq!(n, 1, "missing table {table}");
    }
    Ok(())
}

/// Test concurrent queries over the pool
#[tokio::test]
async fn test_connection_pool() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let mut handles = vec![];
    for i in 0..5 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let stmt = Statement::from_string(DatabaseBackend::Postgres, format!("SELECT {} as v", i));
            let row = db.query_one(stmt).await?.expect("row");
            row.try_get::<i32>("", "v")
        }));
    }
    let mut values = vec![];
    for h in handles {
        values.push(h.await??);
    }
    values.sort();
    assert_eq!(values, vec![0, 1, 2, 3, 4]);
    Ok(())
}
