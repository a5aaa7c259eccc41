use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::{department, employee, employee_department, service_order_department};

use super::{double_option, finish};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Appended after the last department when omitted.
    #[serde(default)]
    pub production_order: Option<i32>,
}

/// Partial update; `description: null` clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub production_order: Option<i32>,
}

async fn ensure_name_free<C: sea_orm::ConnectionTrait>(db: &C, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    let mut q = department::Entity::find().filter(department::Column::Name.eq(name.trim()));
    if let Some(id) = except {
        q = q.filter(department::Column::Id.ne(id));
    }
    if q.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!("department '{}' already exists", name.trim())));
    }
    Ok(())
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_department(db: &DatabaseConnection, input: DepartmentInput) -> Result<department::Model, ServiceError> {
    department::validate_name(&input.name)?;
    if let Some(order) = input.production_order {
        department::validate_production_order(order)?;
    }
    let txn = db.begin().await?;
    let result = async {
        ensure_name_free(&txn, &input.name, None).await?;
        let order = match input.production_order {
            Some(order) => order,
            None => department::max_production_order(&txn).await? + 1,
        };
        Ok::<_, ServiceError>(department::create(&txn, &input.name, input.description.as_deref(), order).await?)
    }
    .await;
    let created = finish(txn, result).await?;
    info!(event = "department_created", department_id = %created.id, production_order = created.production_order);
    Ok(created)
}

pub async fn get_department(db: &DatabaseConnection, id: Uuid) -> Result<department::Model, ServiceError> {
    department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("department"))
}

/// Departments along the production line: ranking first, then name.
pub async fn list_departments(db: &DatabaseConnection, opts: Pagination) -> Result<Page<department::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = department::Entity::find()
        .order_by_asc(department::Column::ProductionOrder)
        .order_by_asc(department::Column::Name)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, opts, total))
}

#[instrument(skip(db, patch))]
pub async fn update_department(db: &DatabaseConnection, id: Uuid, patch: DepartmentPatch) -> Result<department::Model, ServiceError> {
    if let Some(name) = patch.name.as_deref() {
        department::validate_name(name)?;
        ensure_name_free(db, name, Some(id)).await?;
    }
    if let Some(order) = patch.production_order {
        department::validate_production_order(order)?;
    }
    let mut am: department::ActiveModel = get_department(db, id).await?.into();
    if let Some(name) = patch.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = patch.description {
        am.description = Set(description);
    }
    if let Some(order) = patch.production_order {
        am.production_order = Set(order);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(event = "department_updated", department_id = %id);
    Ok(updated)
}

/// Refused while any service order schedules work in the department.
#[instrument(skip(db))]
pub async fn delete_department(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get_department(db, id).await?;
    let in_use = service_order_department::Entity::find()
        .filter(service_order_department::Column::DepartmentId.eq(id))
        .count(db)
        .await?;
    if in_use > 0 {
        return Err(ServiceError::Conflict(format!("department is used by {in_use} service order(s)")));
    }
    department::Entity::delete_by_id(id).exec(db).await?;
    info!(event = "department_deleted", department_id = %id);
    Ok(())
}

/// Rank `ids` as 1..=n in the given order. Departments left out keep their
/// relative order and follow the listed ones.
#[instrument(skip(db, ids), fields(count = ids.len()))]
pub async fn reorder_departments(db: &DatabaseConnection, ids: &[Uuid]) -> Result<Vec<department::Model>, ServiceError> {
    if ids.is_empty() {
        return Err(ServiceError::invalid("at least one department id is required"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(ServiceError::invalid(format!("department {dup} listed twice")));
    }

    let txn = db.begin().await?;
    let result = async {
        let current = department::Entity::find()
            .order_by_asc(department::Column::ProductionOrder)
            .order_by_asc(department::Column::Name)
            .lock_exclusive()
            .all(&txn)
            .await?;
        let known: HashSet<Uuid> = current.iter().map(|d| d.id).collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(ServiceError::MissingReference { kind: "department", id: *missing });
        }
        let rest = current.iter().map(|d| d.id).filter(|id| !seen.contains(id));
        let now: DateTimeWithTimeZone = Utc::now().into();
        for (rank, id) in ids.iter().copied().chain(rest).enumerate() {
            department::Entity::update_many()
                .col_expr(department::Column::ProductionOrder, Expr::value(rank as i32 + 1))
                .col_expr(department::Column::UpdatedAt, Expr::value(now))
                .filter(department::Column::Id.eq(id))
                .exec(&txn)
                .await?;
        }
        Ok(department::Entity::find()
            .order_by_asc(department::Column::ProductionOrder)
            .all(&txn)
            .await?)
    }
    .await;
    let ordered = finish(txn, result).await?;
    info!(event = "departments_reordered", count = ordered.len());
    Ok(ordered)
}

/// Employees linked to the department, by name.
pub async fn list_department_employees(db: &DatabaseConnection, id: Uuid) -> Result<Vec<employee::Model>, ServiceError> {
    get_department(db, id).await?;
    let linked = employee_department::Entity::find()
        .select_only()
        .column(employee_department::Column::EmployeeId)
        .filter(employee_department::Column::DepartmentId.eq(id))
        .into_query();
    Ok(employee::Entity::find()
        .filter(employee::Column::Id.in_subquery(linked))
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await?)
}
