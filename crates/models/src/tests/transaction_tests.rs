use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use super::{setup_test_db, unique};
use crate::{department, employee, service_day, service_order, service_order_collaborator, service_order_department};

fn order_am(code: &str) -> service_order::ActiveModel {
    let now = Utc::now().into();
    service_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        title: Set("Transaction test".into()),
        client: Set(None),
        description: Set(None),
        status: Set(service_order::Status::Scheduled.to_string()),
        created_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Rolled back transaction leaves neither parent nor children
#[tokio::test]
async fn test_transaction_rollback_discards_children() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let code = unique("OS-RB");
    let txn = db.begin().await?;
    let order = order_am(&code).insert(&txn).await?;
    service_day::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order.id),
        day: Set(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
    }
    .insert(&txn)
    .await?;
    txn.rollback().await?;

    assert!(service_order::Entity::find_by_id(order.id).one(&db).await?.is_none());
    let days = service_day::Entity::find()
        .filter(service_day::Column::ServiceOrderId.eq(order.id))
        .all(&db)
        .await?;
    assert!(days.is_empty());
    Ok(())
}

/// Deleting a service order cascades to every child table
#[tokio::test]
async fn test_service_order_cascade() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let d = department::create(&db, &unique("Assembly"), None, 1).await?;
    let e = employee::create(&db, employee::NewEmployee { name: "Joao".into(), active: true, ..Default::default() }).await?;

    let txn = db.begin().await?;
    let order = order_am(&unique("OS-CASCADE")).insert(&txn).await?;
    let start = Utc::now();
    service_order_department::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order.id),
        department_id: Set(d.id),
        start_at: Set(start.into()),
        end_at: Set((start + chrono::Duration::hours(4)).into()),
    }
    .insert(&txn)
    .await?;
    service_order_collaborator::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order.id),
        department_id: Set(d.id),
        employee_id: Set(e.id),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    // referenced department and employee are protected while the order exists
    assert!(department::Entity::delete_by_id(d.id).exec(&db).await.is_err());
    assert!(employee::Entity::delete_by_id(e.id).exec(&db).await.is_err());

    service_order::Entity::delete_by_id(order.id).exec(&db).await?;
    let left = service_order_collaborator::Entity::find()
        .filter(service_order_collaborator::Column::ServiceOrderId.eq(order.id))
        .all(&db)
        .await?;
    assert!(left.is_empty());

    employee::Entity::delete_by_id(e.id).exec(&db).await?;
    department::Entity::delete_by_id(d.id).exec(&db).await?;
    Ok(())
}

/// Duplicate service day for the same order violates the unique index
#[tokio::test]
async fn test_duplicate_service_day_rejected() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let order = order_am(&unique("OS-DAY")).insert(&db).await?;
    let day = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
    let mk = || service_day::ActiveModel { id: Set(Uuid::new_v4()), service_order_id: Set(order.id), day: Set(day) };
    mk().insert(&db).await?;
    assert!(mk().insert(&db).await.is_err());

    service_order::Entity::delete_by_id(order.id).exec(&db).await?;
    Ok(())
}
