use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};

use super::domain::{ServiceOrderDetail, ServiceOrderFilter, ServiceOrderInput};
use super::repository::ServiceOrderRepository;
use crate::errors::ServiceError;

/// Service-order workflows. Input is validated here; existence checks and
/// writes happen inside the repository's transaction.
pub struct ServiceOrderService {
    repo: Arc<dyn ServiceOrderRepository>,
}

impl ServiceOrderService {
    pub fn new(repo: Arc<dyn ServiceOrderRepository>) -> Self { Self { repo } }

    /// Create an order with its departments, collaborators and days.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::service_order::{ServiceOrderService, repository::mock::MockServiceOrderRepository};
    /// use service::service_order::domain::{ServiceOrderInput, DepartmentAssignmentInput};
    /// let repo = Arc::new(MockServiceOrderRepository::default());
    /// let cutting = repo.with_department("Cutting", 1);
    /// let svc = ServiceOrderService::new(repo);
    /// let input = ServiceOrderInput {
    ///     code: "OS-1".into(), title: "Gate".into(), client: None, description: None, status: None,
    ///     days: vec!["2024-06-03".parse().unwrap()],
    ///     departments: vec![DepartmentAssignmentInput {
    ///         department_id: cutting,
    ///         start_at: "2024-06-03T08:00:00Z".parse().unwrap(),
    ///         end_at: "2024-06-03T12:00:00Z".parse().unwrap(),
    ///         collaborator_ids: vec![],
    ///     }],
    /// };
    /// let order = tokio_test::block_on(svc.create(input, None)).unwrap();
    /// assert_eq!(order.departments[0].department_name, "Cutting");
    /// ```
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: ServiceOrderInput, created_by: Option<Uuid>) -> Result<ServiceOrderDetail, ServiceError> {
        let plan = input.into_plan().inspect_err(|e| warn!(error = %e, "service order rejected"))?;
        let detail = self.repo.create(&plan, created_by).await?;
        info!(event = "service_order_scheduled", service_order_id = %detail.id, created_by = ?created_by);
        Ok(detail)
    }

    /// Replace every field and child of an existing order.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn update(&self, id: Uuid, input: ServiceOrderInput) -> Result<ServiceOrderDetail, ServiceError> {
        let plan = input.into_plan()?;
        self.repo.update(id, &plan).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceOrderDetail, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("service order"))
    }

    /// Newest first.
    pub async fn list(&self, filter: ServiceOrderFilter, opts: Pagination) -> Result<Page<ServiceOrderDetail>, ServiceError> {
        let criteria = filter.into_criteria()?;
        self.repo.list(&criteria, opts).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_order::domain::DepartmentAssignmentInput;
    use crate::service_order::repository::mock::MockServiceOrderRepository;
    use models::service_order::Status;

    struct Fixture {
        repo: Arc<MockServiceOrderRepository>,
        svc: ServiceOrderService,
        cutting: Uuid,
        welding: Uuid,
        ana: Uuid,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockServiceOrderRepository::default());
        let welding = repo.with_department("Welding", 2);
        let cutting = repo.with_department("Cutting", 1);
        let ana = repo.with_employee(true);
        let svc = ServiceOrderService::new(repo.clone());
        Fixture { repo, svc, cutting, welding, ana }
    }

    fn assignment(dept: Uuid, people: Vec<Uuid>, day: u32) -> DepartmentAssignmentInput {
        DepartmentAssignmentInput {
            department_id: dept,
            start_at: format!("2024-06-{day:02}T08:00:00Z").parse().unwrap(),
            end_at: format!("2024-06-{day:02}T17:00:00Z").parse().unwrap(),
            collaborator_ids: people,
        }
    }

    fn input(code: &str, departments: Vec<DepartmentAssignmentInput>) -> ServiceOrderInput {
        ServiceOrderInput {
            code: code.into(),
            title: "Trailer chassis".into(),
            client: Some("ACME".into()),
            description: None,
            status: None,
            days: vec!["2024-06-04".parse().unwrap(), "2024-06-03".parse().unwrap()],
            departments,
        }
    }

    #[tokio::test]
    async fn create_orders_departments_along_the_line() {
        let f = fixture();
        let by = Uuid::new_v4();
        let order = f
            .svc
            .create(input("OS-1", vec![assignment(f.welding, vec![f.ana], 4), assignment(f.cutting, vec![], 3)]), Some(by))
            .await
            .unwrap();
        let names: Vec<&str> = order.departments.iter().map(|d| d.department_name.as_str()).collect();
        assert_eq!(names, ["Cutting", "Welding"]);
        assert_eq!(order.departments[1].collaborator_ids, vec![f.ana]);
        assert_eq!(order.created_by, Some(by));
        assert_eq!(order.status, Status::Scheduled);
        assert!(order.days.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn missing_department_is_reported_before_missing_employee() {
        let f = fixture();
        let ghost_dept = Uuid::new_v4();
        let ghost_emp = Uuid::new_v4();
        let err = f.svc.create(input("OS-2", vec![assignment(ghost_dept, vec![ghost_emp], 3)]), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference { kind: "department", id } if id == ghost_dept));

        let err = f.svc.create(input("OS-2", vec![assignment(f.cutting, vec![ghost_emp], 3)]), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference { kind: "employee", id } if id == ghost_emp));
        assert!(f.repo.is_empty());
    }

    #[tokio::test]
    async fn inactive_collaborator_is_a_validation_error() {
        let f = fixture();
        let gone = f.repo.with_employee(false);
        let err = f.svc.create(input("OS-3", vec![assignment(f.cutting, vec![gone], 3)]), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_code_conflicts_but_update_may_keep_its_own() {
        let f = fixture();
        let first = f.svc.create(input("OS-4", vec![assignment(f.cutting, vec![], 3)]), None).await.unwrap();
        let err = f.svc.create(input("OS-4", vec![assignment(f.cutting, vec![], 3)]), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let mut changed = input("OS-4", vec![assignment(f.welding, vec![f.ana], 5)]);
        changed.status = Some("in_progress".into());
        let updated = f.svc.update(first.id, changed).await.unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.departments.len(), 1);
        assert_eq!(updated.departments[0].department_id, f.welding);
    }

    #[tokio::test]
    async fn update_of_unknown_order_is_not_found() {
        let f = fixture();
        let err = f.svc.update(Uuid::new_v4(), input("OS-5", vec![assignment(f.cutting, vec![], 3)])).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_repository() {
        let f = fixture();
        let mut bad = input("OS-6", vec![assignment(f.cutting, vec![], 3)]);
        bad.days.clear();
        assert!(matches!(f.svc.create(bad, None).await, Err(ServiceError::Validation(_))));
        assert!(f.repo.is_empty());
    }

    #[tokio::test]
    async fn list_filters_and_delete() {
        let f = fixture();
        let a = f.svc.create(input("OS-7", vec![assignment(f.cutting, vec![], 3)]), None).await.unwrap();
        let mut later = input("OS-8", vec![assignment(f.welding, vec![], 10)]);
        later.days = vec!["2024-06-10".parse().unwrap()];
        f.svc.create(later, None).await.unwrap();

        let by_dept = f
            .svc
            .list(ServiceOrderFilter { department_id: Some(f.cutting), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_dept.total, 1);
        assert_eq!(by_dept.items[0].id, a.id);

        let by_range = f
            .svc
            .list(
                ServiceOrderFilter { from: Some("2024-06-09".parse().unwrap()), to: None, ..Default::default() },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_range.total, 1);
        assert_eq!(by_range.items[0].code, "OS-8");

        assert!(f.svc.delete(a.id).await.unwrap());
        assert!(!f.svc.delete(a.id).await.unwrap());
        assert!(matches!(f.svc.get(a.id).await, Err(ServiceError::NotFound(_))));
    }
}
