use std::collections::HashSet;

use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::{department, employee, employee_department, service_order_collaborator};

use super::{double_option, finish};
use crate::errors::ServiceError;

fn default_active() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub shift_start: Option<NaiveTime>,
    #[serde(default)]
    pub shift_end: Option<NaiveTime>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
}

/// Partial update. Nullable fields take `null` to clear them; a present
/// `department_ids` replaces the whole association set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub shift_start: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "double_option")]
    pub shift_end: Option<Option<NaiveTime>>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub department_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EmployeeFilter {
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: employee::Model,
    pub department_ids: Vec<Uuid>,
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Every id must name an existing department.
async fn ensure_departments<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: HashSet<Uuid> = department::Entity::find()
        .filter(department::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(ServiceError::MissingReference { kind: "department", id: *missing }),
        None => Ok(()),
    }
}

#[instrument(skip(db, input), fields(name = %input.name, departments = input.department_ids.len()))]
pub async fn create_employee(db: &DatabaseConnection, input: EmployeeInput) -> Result<EmployeeDetail, ServiceError> {
    let department_ids = dedup(&input.department_ids);
    let new = employee::NewEmployee {
        name: input.name,
        email: input.email,
        role: input.role,
        shift_start: input.shift_start,
        shift_end: input.shift_end,
        active: input.active,
    };
    employee::validate_name(&new.name)?;
    employee::validate_shift(new.shift_start, new.shift_end)?;

    let txn = db.begin().await?;
    let result = async {
        ensure_departments(&txn, &department_ids).await?;
        let created = employee::create(&txn, new).await?;
        employee_department::replace_for_employee(&txn, created.id, &department_ids).await?;
        Ok::<_, ServiceError>(created)
    }
    .await;
    let created = finish(txn, result).await?;
    info!(event = "employee_created", employee_id = %created.id);
    Ok(EmployeeDetail { employee: created, department_ids })
}

pub async fn get_employee(db: &DatabaseConnection, id: Uuid) -> Result<EmployeeDetail, ServiceError> {
    let found = employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("employee"))?;
    let department_ids = employee_department::department_ids_of(db, id).await?;
    Ok(EmployeeDetail { employee: found, department_ids })
}

pub async fn list_employees(
    db: &DatabaseConnection,
    filter: EmployeeFilter,
    opts: Pagination,
) -> Result<Page<employee::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut q = employee::Entity::find();
    if let Some(active) = filter.active {
        q = q.filter(employee::Column::Active.eq(active));
    }
    if let Some(dept) = filter.department_id {
        let linked = employee_department::Entity::find()
            .select_only()
            .column(employee_department::Column::EmployeeId)
            .filter(employee_department::Column::DepartmentId.eq(dept))
            .into_query();
        q = q.filter(employee::Column::Id.in_subquery(linked));
    }
    let paginator = q
        .order_by_asc(employee::Column::Name)
        .order_by_asc(employee::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, opts, total))
}

#[instrument(skip(db, patch))]
pub async fn update_employee(db: &DatabaseConnection, id: Uuid, patch: EmployeePatch) -> Result<EmployeeDetail, ServiceError> {
    if let Some(name) = patch.name.as_deref() {
        employee::validate_name(name)?;
    }
    if let Some(Some(email)) = patch.email.as_ref() {
        models::user::validate_email(email)?;
    }
    let department_ids = patch.department_ids.as_deref().map(dedup);

    let txn = db.begin().await?;
    let result = async {
        let current = employee::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("employee"))?;
        let shift_start = patch.shift_start.unwrap_or(current.shift_start);
        let shift_end = patch.shift_end.unwrap_or(current.shift_end);
        employee::validate_shift(shift_start, shift_end)?;

        let mut am: employee::ActiveModel = current.into();
        if let Some(name) = patch.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(email) = patch.email {
            am.email = Set(email);
        }
        if let Some(role) = patch.role {
            am.role = Set(role);
        }
        if let Some(active) = patch.active {
            am.active = Set(active);
        }
        am.shift_start = Set(shift_start);
        am.shift_end = Set(shift_end);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&txn).await?;

        if let Some(ids) = department_ids.as_deref() {
            ensure_departments(&txn, ids).await?;
            employee_department::replace_for_employee(&txn, id, ids).await?;
        }
        let linked = employee_department::department_ids_of(&txn, id).await?;
        Ok::<_, ServiceError>(EmployeeDetail { employee: updated, department_ids: linked })
    }
    .await;
    let detail = finish(txn, result).await?;
    info!(event = "employee_updated", employee_id = %id);
    Ok(detail)
}

/// Refused while the employee is assigned to any service order.
#[instrument(skip(db))]
pub async fn delete_employee(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("employee"))?;
    let assigned = service_order_collaborator::Entity::find()
        .filter(service_order_collaborator::Column::EmployeeId.eq(id))
        .count(db)
        .await?;
    if assigned > 0 {
        return Err(ServiceError::Conflict(format!("employee is assigned to {assigned} service order slot(s)")));
    }
    employee::Entity::delete_by_id(id).exec(db).await?;
    info!(event = "employee_deleted", employee_id = %id);
    Ok(())
}
