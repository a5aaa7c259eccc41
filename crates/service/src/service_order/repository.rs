use async_trait::async_trait;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};

use super::domain::{ListCriteria, ServiceOrderDetail, ServiceOrderPlan};
use crate::errors::ServiceError;

/// Persistence for service orders. `create` and `update` are all-or-nothing:
/// on error no row of the order (parent or child) is changed.
#[async_trait]
pub trait ServiceOrderRepository: Send + Sync {
    async fn create(&self, plan: &ServiceOrderPlan, created_by: Option<Uuid>) -> Result<ServiceOrderDetail, ServiceError>;
    async fn update(&self, id: Uuid, plan: &ServiceOrderPlan) -> Result<ServiceOrderDetail, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<ServiceOrderDetail>, ServiceError>;
    async fn list(&self, criteria: &ListCriteria, opts: Pagination) -> Result<Page<ServiceOrderDetail>, ServiceError>;
    /// `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// In-memory repository for tests. Departments and employees must be seeded
/// before they can be referenced.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use crate::service_order::domain::DepartmentSchedule;

    #[derive(Default)]
    struct State {
        departments: HashMap<Uuid, (String, i32)>,
        employees: HashMap<Uuid, bool>, // value: active
        orders: HashMap<Uuid, ServiceOrderDetail>,
    }

    #[derive(Default)]
    pub struct MockServiceOrderRepository {
        state: Mutex<State>,
    }

    fn poisoned<T>(_: T) -> ServiceError { ServiceError::Db("mock lock poisoned".into()) }

    impl MockServiceOrderRepository {
        pub fn with_department(&self, name: &str, production_order: i32) -> Uuid {
            let id = Uuid::new_v4();
            if let Ok(mut s) = self.state.lock() {
                s.departments.insert(id, (name.to_string(), production_order));
            }
            id
        }

        pub fn with_employee(&self, active: bool) -> Uuid {
            let id = Uuid::new_v4();
            if let Ok(mut s) = self.state.lock() {
                s.employees.insert(id, active);
            }
            id
        }

        pub fn len(&self) -> usize {
            self.state.lock().map(|s| s.orders.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    impl State {
        fn check(&self, plan: &ServiceOrderPlan, except: Option<Uuid>) -> Result<(), ServiceError> {
            for id in plan.department_ids() {
                if !self.departments.contains_key(&id) {
                    return Err(ServiceError::MissingReference { kind: "department", id });
                }
            }
            for id in plan.employee_ids() {
                match self.employees.get(&id) {
                    None => return Err(ServiceError::MissingReference { kind: "employee", id }),
                    Some(false) => return Err(ServiceError::invalid(format!("employee {id} is inactive"))),
                    Some(true) => {}
                }
            }
            if self.orders.values().any(|o| o.code == plan.code && Some(o.id) != except) {
                return Err(ServiceError::Conflict(format!("service order code '{}' already exists", plan.code)));
            }
            Ok(())
        }

        fn schedules(&self, plan: &ServiceOrderPlan) -> Vec<DepartmentSchedule> {
            let mut out: Vec<DepartmentSchedule> = plan
                .departments
                .iter()
                .map(|d| {
                    let (name, order) = self.departments.get(&d.department_id).cloned().unwrap_or_default();
                    DepartmentSchedule {
                        department_id: d.department_id,
                        department_name: name,
                        production_order: order,
                        start_at: d.start_at,
                        end_at: d.end_at,
                        collaborator_ids: d.collaborator_ids.clone(),
                    }
                })
                .collect();
            out.sort_by(|a, b| (a.production_order, &a.department_name).cmp(&(b.production_order, &b.department_name)));
            out
        }
    }

    #[async_trait]
    impl ServiceOrderRepository for MockServiceOrderRepository {
        async fn create(&self, plan: &ServiceOrderPlan, created_by: Option<Uuid>) -> Result<ServiceOrderDetail, ServiceError> {
            let mut s = self.state.lock().map_err(poisoned)?;
            s.check(plan, None)?;
            let now = Utc::now().into();
            let detail = ServiceOrderDetail {
                id: Uuid::new_v4(),
                code: plan.code.clone(),
                title: plan.title.clone(),
                client: plan.client.clone(),
                description: plan.description.clone(),
                status: plan.status,
                created_by,
                created_at: now,
                updated_at: now,
                days: plan.days.clone(),
                departments: s.schedules(plan),
            };
            s.orders.insert(detail.id, detail.clone());
            Ok(detail)
        }

        async fn update(&self, id: Uuid, plan: &ServiceOrderPlan) -> Result<ServiceOrderDetail, ServiceError> {
            let mut s = self.state.lock().map_err(poisoned)?;
            if !s.orders.contains_key(&id) {
                return Err(ServiceError::not_found("service order"));
            }
            s.check(plan, Some(id))?;
            let departments = s.schedules(plan);
            let order = s.orders.get_mut(&id).ok_or_else(|| ServiceError::not_found("service order"))?;
            order.code = plan.code.clone();
            order.title = plan.title.clone();
            order.client = plan.client.clone();
            order.description = plan.description.clone();
            order.status = plan.status;
            order.days = plan.days.clone();
            order.departments = departments;
            order.updated_at = Utc::now().into();
            Ok(order.clone())
        }

        async fn get(&self, id: Uuid) -> Result<Option<ServiceOrderDetail>, ServiceError> {
            let s = self.state.lock().map_err(poisoned)?;
            Ok(s.orders.get(&id).cloned())
        }

        async fn list(&self, criteria: &ListCriteria, opts: Pagination) -> Result<Page<ServiceOrderDetail>, ServiceError> {
            let s = self.state.lock().map_err(poisoned)?;
            let mut hits: Vec<ServiceOrderDetail> = s
                .orders
                .values()
                .filter(|o| criteria.status.map_or(true, |st| o.status == st))
                .filter(|o| criteria.department_id.map_or(true, |d| o.departments.iter().any(|x| x.department_id == d)))
                .filter(|o| criteria.matches_days(&o.days))
                .cloned()
                .collect();
            hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
            let total = hits.len() as u64;
            let (idx, per_page) = opts.normalize();
            let items = hits.into_iter().skip((idx * per_page) as usize).take(per_page as usize).collect();
            Ok(Page::new(items, opts, total))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut s = self.state.lock().map_err(poisoned)?;
            Ok(s.orders.remove(&id).is_some())
        }
    }
}
