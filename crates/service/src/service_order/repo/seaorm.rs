use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::{department, employee, service_day, service_order, service_order_collaborator, service_order_department};

use crate::db::finish;
use crate::errors::ServiceError;
use crate::service_order::domain::{DepartmentSchedule, ListCriteria, ServiceOrderDetail, ServiceOrderPlan};
use crate::service_order::repository::ServiceOrderRepository;

pub struct SeaOrmServiceOrderRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmServiceOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// Departments first, then collaborators; the first unknown id is reported.
/// Found rows are held `FOR SHARE` until the transaction ends so they cannot be
/// deleted before the child rows reference them.
async fn ensure_references<C: ConnectionTrait>(db: &C, plan: &ServiceOrderPlan) -> Result<(), ServiceError> {
    let wanted = plan.department_ids();
    let known: HashSet<Uuid> = department::Entity::find()
        .filter(department::Column::Id.is_in(wanted.clone()))
        .lock_shared()
        .all(db)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();
    if let Some(id) = wanted.into_iter().find(|id| !known.contains(id)) {
        return Err(ServiceError::MissingReference { kind: "department", id });
    }

    let wanted = plan.employee_ids();
    if wanted.is_empty() {
        return Ok(());
    }
    let people: HashMap<Uuid, bool> = employee::Entity::find()
        .filter(employee::Column::Id.is_in(wanted.clone()))
        .lock_shared()
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e.active))
        .collect();
    for id in wanted {
        match people.get(&id) {
            None => return Err(ServiceError::MissingReference { kind: "employee", id }),
            Some(false) => return Err(ServiceError::invalid(format!("employee {id} is inactive"))),
            Some(true) => {}
        }
    }
    Ok(())
}

async fn ensure_code_free<C: ConnectionTrait>(db: &C, code: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    let mut q = service_order::Entity::find().filter(service_order::Column::Code.eq(code));
    if let Some(id) = except {
        q = q.filter(service_order::Column::Id.ne(id));
    }
    if q.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!("service order code '{code}' already exists")));
    }
    Ok(())
}

async fn insert_children<C: ConnectionTrait>(db: &C, order_id: Uuid, plan: &ServiceOrderPlan) -> Result<(), ServiceError> {
    let windows = plan.departments.iter().map(|d| service_order_department::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order_id),
        department_id: Set(d.department_id),
        start_at: Set(d.start_at),
        end_at: Set(d.end_at),
    });
    service_order_department::Entity::insert_many(windows).exec(db).await?;

    let people: Vec<service_order_collaborator::ActiveModel> = plan
        .departments
        .iter()
        .flat_map(|d| {
            d.collaborator_ids.iter().map(move |e| service_order_collaborator::ActiveModel {
                id: Set(Uuid::new_v4()),
                service_order_id: Set(order_id),
                department_id: Set(d.department_id),
                employee_id: Set(*e),
            })
        })
        .collect();
    if !people.is_empty() {
        service_order_collaborator::Entity::insert_many(people).exec(db).await?;
    }

    let days = plan.days.iter().map(|day| service_day::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order_id),
        day: Set(*day),
    });
    service_day::Entity::insert_many(days).exec(db).await?;
    Ok(())
}

async fn delete_children<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<(), ServiceError> {
    service_order_collaborator::Entity::delete_many()
        .filter(service_order_collaborator::Column::ServiceOrderId.eq(order_id))
        .exec(db)
        .await?;
    service_order_department::Entity::delete_many()
        .filter(service_order_department::Column::ServiceOrderId.eq(order_id))
        .exec(db)
        .await?;
    service_day::Entity::delete_many()
        .filter(service_day::Column::ServiceOrderId.eq(order_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Attach days, windows and collaborators to each parent, one query per child table.
async fn load_details<C: ConnectionTrait>(db: &C, parents: Vec<service_order::Model>) -> Result<Vec<ServiceOrderDetail>, ServiceError> {
    if parents.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = parents.iter().map(|p| p.id).collect();

    let mut days: HashMap<Uuid, Vec<chrono::NaiveDate>> = HashMap::new();
    for d in service_day::Entity::find()
        .filter(service_day::Column::ServiceOrderId.is_in(ids.clone()))
        .order_by_asc(service_day::Column::Day)
        .all(db)
        .await?
    {
        days.entry(d.service_order_id).or_default().push(d.day);
    }

    let mut people: HashMap<(Uuid, Uuid), Vec<Uuid>> = HashMap::new();
    for c in service_order_collaborator::Entity::find()
        .filter(service_order_collaborator::Column::ServiceOrderId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        people.entry((c.service_order_id, c.department_id)).or_default().push(c.employee_id);
    }

    let windows = service_order_department::Entity::find()
        .filter(service_order_department::Column::ServiceOrderId.is_in(ids))
        .all(db)
        .await?;
    let dept_ids: Vec<Uuid> = windows.iter().map(|w| w.department_id).collect::<HashSet<_>>().into_iter().collect();
    let names: HashMap<Uuid, department::Model> = department::Entity::find()
        .filter(department::Column::Id.is_in(dept_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    let mut schedules: HashMap<Uuid, Vec<DepartmentSchedule>> = HashMap::new();
    for w in windows {
        let dept = names
            .get(&w.department_id)
            .ok_or(ServiceError::MissingReference { kind: "department", id: w.department_id })?;
        let collaborator_ids = people.remove(&(w.service_order_id, w.department_id)).unwrap_or_default();
        schedules.entry(w.service_order_id).or_default().push(DepartmentSchedule {
            department_id: w.department_id,
            department_name: dept.name.clone(),
            production_order: dept.production_order,
            start_at: w.start_at,
            end_at: w.end_at,
            collaborator_ids,
        });
    }

    parents
        .into_iter()
        .map(|p| {
            let mut departments = schedules.remove(&p.id).unwrap_or_default();
            departments.sort_by(|a, b| (a.production_order, &a.department_name).cmp(&(b.production_order, &b.department_name)));
            Ok::<_, ServiceError>(ServiceOrderDetail {
                status: p.status.parse::<models::service_order::Status>()?,
                days: days.remove(&p.id).unwrap_or_default(),
                departments,
                id: p.id,
                code: p.code,
                title: p.title,
                client: p.client,
                description: p.description,
                created_by: p.created_by,
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
        })
        .collect()
}

async fn load_detail<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<ServiceOrderDetail>, ServiceError> {
    let Some(parent) = service_order::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    Ok(load_details(db, vec![parent]).await?.pop())
}

#[async_trait::async_trait]
impl ServiceOrderRepository for SeaOrmServiceOrderRepository {
    async fn create(&self, plan: &ServiceOrderPlan, created_by: Option<Uuid>) -> Result<ServiceOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;
        let result = async {
            ensure_references(&txn, plan).await?;
            ensure_code_free(&txn, &plan.code, None).await?;
            let now = Utc::now().into();
            let parent = service_order::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(plan.code.clone()),
                title: Set(plan.title.clone()),
                client: Set(plan.client.clone()),
                description: Set(plan.description.clone()),
                status: Set(plan.status.to_string()),
                created_by: Set(created_by),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            debug!(service_order_id = %parent.id, "parent inserted");
            insert_children(&txn, parent.id, plan).await?;
            load_detail(&txn, parent.id)
                .await?
                .ok_or_else(|| ServiceError::not_found("service order"))
        }
        .await;
        let detail = finish(txn, result).await?;
        info!(
            event = "service_order_created",
            service_order_id = %detail.id,
            code = %detail.code,
            departments = detail.departments.len(),
            days = detail.days.len()
        );
        Ok(detail)
    }

    async fn update(&self, id: Uuid, plan: &ServiceOrderPlan) -> Result<ServiceOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;
        let result = async {
            let current = service_order::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("service order"))?;
            ensure_references(&txn, plan).await?;
            ensure_code_free(&txn, &plan.code, Some(id)).await?;

            let mut am: service_order::ActiveModel = current.into();
            am.code = Set(plan.code.clone());
            am.title = Set(plan.title.clone());
            am.client = Set(plan.client.clone());
            am.description = Set(plan.description.clone());
            am.status = Set(plan.status.to_string());
            am.updated_at = Set(Utc::now().into());
            am.update(&txn).await?;

            delete_children(&txn, id).await?;
            insert_children(&txn, id, plan).await?;
            load_detail(&txn, id)
                .await?
                .ok_or_else(|| ServiceError::not_found("service order"))
        }
        .await;
        let detail = finish(txn, result).await?;
        info!(event = "service_order_updated", service_order_id = %id, code = %detail.code);
        Ok(detail)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceOrderDetail>, ServiceError> {
        load_detail(&self.db, id).await
    }

    async fn list(&self, criteria: &ListCriteria, opts: Pagination) -> Result<Page<ServiceOrderDetail>, ServiceError> {
        let mut q = service_order::Entity::find();
        if let Some(status) = criteria.status {
            q = q.filter(service_order::Column::Status.eq(status.as_str()));
        }
        if let Some(dept) = criteria.department_id {
            let orders = service_order_department::Entity::find()
                .select_only()
                .column(service_order_department::Column::ServiceOrderId)
                .filter(service_order_department::Column::DepartmentId.eq(dept))
                .into_query();
            q = q.filter(service_order::Column::Id.in_subquery(orders));
        }
        if criteria.from.is_some() || criteria.to.is_some() {
            let mut days = service_day::Entity::find()
                .select_only()
                .column(service_day::Column::ServiceOrderId);
            if let Some(from) = criteria.from {
                days = days.filter(service_day::Column::Day.gte(from));
            }
            if let Some(to) = criteria.to {
                days = days.filter(service_day::Column::Day.lte(to));
            }
            q = q.filter(service_order::Column::Id.in_subquery(days.into_query()));
        }

        let (page_idx, per_page) = opts.normalize();
        let paginator = q
            .order_by_desc(service_order::Column::CreatedAt)
            .order_by_asc(service_order::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let parents = paginator.fetch_page(page_idx).await?;
        let items = load_details(&self.db, parents).await?;
        Ok(Page::new(items, opts, total))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = service_order::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected > 0 {
            info!(event = "service_order_deleted", service_order_id = %id);
        }
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{department_service, employee_service};
    use crate::service_order::domain::{DepartmentAssignmentInput, ServiceOrderInput};
    use crate::test_support::{get_db, unique};
    use sea_orm::sea_query::{LockBehavior, LockType};

    struct Seed {
        dept: department::Model,
        other: department::Model,
        worker: Uuid,
    }

    async fn seed(db: &DatabaseConnection) -> Result<Seed, ServiceError> {
        let dept = department_service::create_department(
            db,
            department_service::DepartmentInput { name: unique("so_dept"), description: None, production_order: Some(2) },
        )
        .await?;
        let other = department_service::create_department(
            db,
            department_service::DepartmentInput { name: unique("so_dept"), description: None, production_order: Some(1) },
        )
        .await?;
        let worker = employee_service::create_employee(
            db,
            employee_service::EmployeeInput {
                name: unique("so_worker"),
                email: None,
                role: None,
                shift_start: None,
                shift_end: None,
                active: true,
                department_ids: vec![dept.id],
            },
        )
        .await?;
        Ok(Seed { dept, other, worker: worker.employee.id })
    }

    async fn cleanup(db: &DatabaseConnection, s: &Seed) -> Result<(), ServiceError> {
        employee_service::delete_employee(db, s.worker).await?;
        department_service::delete_department(db, s.dept.id).await?;
        department_service::delete_department(db, s.other.id).await?;
        Ok(())
    }

    fn plan(code: &str, departments: Vec<(Uuid, Vec<Uuid>)>) -> ServiceOrderPlan {
        ServiceOrderInput {
            code: code.into(),
            title: "Conveyor frame".into(),
            client: None,
            description: None,
            status: None,
            days: vec!["2031-03-04".parse().unwrap(), "2031-03-03".parse().unwrap()],
            departments: departments
                .into_iter()
                .map(|(department_id, collaborator_ids)| DepartmentAssignmentInput {
                    department_id,
                    start_at: "2031-03-03T08:00:00-03:00".parse().unwrap(),
                    end_at: "2031-03-04T17:00:00-03:00".parse().unwrap(),
                    collaborator_ids,
                })
                .collect(),
        }
        .into_plan()
        .unwrap()
    }

    async fn children(db: &DatabaseConnection, order_id: Uuid) -> Result<(u64, u64, u64), ServiceError> {
        let w = service_order_department::Entity::find()
            .filter(service_order_department::Column::ServiceOrderId.eq(order_id))
            .count(db)
            .await?;
        let c = service_order_collaborator::Entity::find()
            .filter(service_order_collaborator::Column::ServiceOrderId.eq(order_id))
            .count(db)
            .await?;
        let d = service_day::Entity::find()
            .filter(service_day::Column::ServiceOrderId.eq(order_id))
            .count(db)
            .await?;
        Ok((w, c, d))
    }

    #[tokio::test]
    async fn create_persists_children_and_reads_them_back() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let s = seed(&db).await?;
        let repo = SeaOrmServiceOrderRepository::new(db.clone());

        let code = unique("OS");
        let created = repo.create(&plan(&code, vec![(s.dept.id, vec![s.worker]), (s.other.id, vec![])]), None).await?;
        assert_eq!(children(&db, created.id).await?, (2, 1, 2));
        assert_eq!(created.departments[0].department_id, s.other.id);
        assert_eq!(created.departments[1].collaborator_ids, vec![s.worker]);

        let again = repo.get(created.id).await?.unwrap();
        assert_eq!(again, created);

        let in_use = department_service::delete_department(&db, s.dept.id).await;
        assert!(matches!(in_use, Err(ServiceError::Conflict(_))));
        let busy = employee_service::delete_employee(&db, s.worker).await;
        assert!(matches!(busy, Err(ServiceError::Conflict(_))));

        assert!(repo.delete(created.id).await?);
        assert_eq!(children(&db, created.id).await?, (0, 0, 0));
        cleanup(&db, &s).await?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_collaborator_rolls_back_everything() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let s = seed(&db).await?;
        let repo = SeaOrmServiceOrderRepository::new(db.clone());

        let code = unique("OS");
        let ghost = Uuid::new_v4();
        let err = repo.create(&plan(&code, vec![(s.dept.id, vec![s.worker, ghost])]), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference { kind: "employee", id } if id == ghost));
        let left = service_order::Entity::find().filter(service_order::Column::Code.eq(code)).count(&db).await?;
        assert_eq!(left, 0);
        cleanup(&db, &s).await?;
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_children_and_guards_code() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let s = seed(&db).await?;
        let repo = SeaOrmServiceOrderRepository::new(db.clone());

        let a = repo.create(&plan(&unique("OS"), vec![(s.dept.id, vec![s.worker])]), None).await?;
        let b = repo.create(&plan(&unique("OS"), vec![(s.other.id, vec![])]), None).await?;

        let taken = repo.update(a.id, &plan(&b.code, vec![(s.dept.id, vec![])])).await;
        assert!(matches!(taken, Err(ServiceError::Conflict(_))));
        assert_eq!(children(&db, a.id).await?, (1, 1, 2));

        let mut next = plan(&a.code, vec![(s.other.id, vec![s.worker])]);
        next.days.truncate(1);
        let updated = repo.update(a.id, &next).await?;
        assert_eq!(updated.departments.len(), 1);
        assert_eq!(updated.departments[0].department_id, s.other.id);
        assert_eq!(children(&db, a.id).await?, (1, 1, 1));

        let missing = repo.update(Uuid::new_v4(), &next).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        repo.delete(a.id).await?;
        repo.delete(b.id).await?;
        cleanup(&db, &s).await?;
        Ok(())
    }

    #[tokio::test]
    async fn checked_references_cannot_be_deleted_mid_transaction() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let s = seed(&db).await?;

        let txn = db.begin().await?;
        ensure_references(&txn, &plan(&unique("OS"), vec![(s.other.id, vec![s.worker])])).await?;

        let rival = db.begin().await?;
        let dept = department::Entity::find_by_id(s.other.id)
            .lock_with_behavior(LockType::Update, LockBehavior::Nowait)
            .one(&rival)
            .await;
        assert!(dept.is_err());
        rival.rollback().await?;

        let rival = db.begin().await?;
        let worker = employee::Entity::find_by_id(s.worker)
            .lock_with_behavior(LockType::Update, LockBehavior::Nowait)
            .one(&rival)
            .await;
        assert!(worker.is_err());
        rival.rollback().await?;

        txn.rollback().await?;
        cleanup(&db, &s).await?;
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_department_and_day_range() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let s = seed(&db).await?;
        let repo = SeaOrmServiceOrderRepository::new(db.clone());
        let o = repo.create(&plan(&unique("OS"), vec![(s.dept.id, vec![])]), None).await?;

        let by_dept = ListCriteria { department_id: Some(s.dept.id), ..Default::default() };
        let page = repo.list(&by_dept, Pagination::default()).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, o.id);

        let day = |v: &str| v.parse::<chrono::NaiveDate>().unwrap();
        let hit = ListCriteria { department_id: Some(s.dept.id), from: Some(day("2031-03-04")), to: Some(day("2031-03-04")), ..Default::default() };
        assert_eq!(repo.list(&hit, Pagination::default()).await?.total, 1);
        let miss = ListCriteria { department_id: Some(s.dept.id), from: Some(day("2031-03-05")), ..Default::default() };
        assert_eq!(repo.list(&miss, Pagination::default()).await?.total, 0);

        repo.delete(o.id).await?;
        cleanup(&db, &s).await?;
        Ok(())
    }
}
