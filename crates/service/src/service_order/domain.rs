use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::service_order::{self, Status};
use models::service_order_department;

use crate::errors::ServiceError;

/// Body of `POST /service-orders` and `PUT /service-orders/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceOrderInput {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `scheduled`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub days: Vec<NaiveDate>,
    #[serde(default)]
    pub departments: Vec<DepartmentAssignmentInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentAssignmentInput {
    pub department_id: Uuid,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    #[serde(default)]
    pub collaborator_ids: Vec<Uuid>,
}

/// A validated input, ready to be written. Days are sorted and every list
/// is free of duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOrderPlan {
    pub code: String,
    pub title: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: Status,
    pub days: Vec<NaiveDate>,
    pub departments: Vec<PlannedDepartment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDepartment {
    pub department_id: Uuid,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    pub collaborator_ids: Vec<Uuid>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ServiceOrderInput {
    /// Everything that can be checked without the database.
    pub fn into_plan(self) -> Result<ServiceOrderPlan, ServiceError> {
        service_order::validate_code(&self.code)?;
        service_order::validate_title(&self.title)?;
        let status = match self.status.as_deref() {
            Some(s) => s.parse::<Status>()?,
            None => Status::default(),
        };

        if self.days.is_empty() {
            return Err(ServiceError::invalid("at least one service day is required"));
        }
        let mut days = self.days;
        days.sort_unstable();
        if let Some(w) = days.windows(2).find(|w| w[0] == w[1]) {
            return Err(ServiceError::invalid(format!("service day {} listed twice", w[0])));
        }

        if self.departments.is_empty() {
            return Err(ServiceError::invalid("at least one department is required"));
        }
        let mut seen_departments = HashSet::new();
        let mut departments = Vec::with_capacity(self.departments.len());
        for d in self.departments {
            if !seen_departments.insert(d.department_id) {
                return Err(ServiceError::invalid(format!("department {} listed twice", d.department_id)));
            }
            service_order_department::validate_window(&d.start_at, &d.end_at)
                .map_err(|_| ServiceError::invalid(format!("department {}: start_at must be before end_at", d.department_id)))?;
            let mut seen_people = HashSet::new();
            if let Some(dup) = d.collaborator_ids.iter().find(|id| !seen_people.insert(**id)) {
                return Err(ServiceError::invalid(format!(
                    "collaborator {} listed twice for department {}",
                    dup, d.department_id
                )));
            }
            departments.push(PlannedDepartment {
                department_id: d.department_id,
                start_at: d.start_at,
                end_at: d.end_at,
                collaborator_ids: d.collaborator_ids,
            });
        }

        Ok(ServiceOrderPlan {
            code: self.code.trim().to_string(),
            title: self.title.trim().to_string(),
            client: non_blank(self.client),
            description: non_blank(self.description),
            status,
            days,
            departments,
        })
    }
}

impl ServiceOrderPlan {
    pub fn department_ids(&self) -> Vec<Uuid> {
        self.departments.iter().map(|d| d.department_id).collect()
    }

    /// Every collaborator once, in first-seen order.
    pub fn employee_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.departments
            .iter()
            .flat_map(|d| d.collaborator_ids.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// A service order with all of its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceOrderDetail {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: Status,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    /// Ascending.
    pub days: Vec<NaiveDate>,
    /// Along the production line.
    pub departments: Vec<DepartmentSchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSchedule {
    pub department_id: Uuid,
    pub department_name: String,
    pub production_order: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    pub collaborator_ids: Vec<Uuid>,
}

/// Query string of `GET /service-orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceOrderFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    /// First service day of the range, inclusive.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last service day of the range, inclusive.
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// A checked `ServiceOrderFilter`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListCriteria {
    pub status: Option<Status>,
    pub department_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ServiceOrderFilter {
    pub fn into_criteria(self) -> Result<ListCriteria, ServiceError> {
        let status = self.status.as_deref().map(str::parse::<Status>).transpose()?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ServiceError::invalid("`from` must not be after `to`"));
            }
        }
        Ok(ListCriteria { status, department_id: self.department_id, from: self.from, to: self.to })
    }
}

impl ListCriteria {
    /// Whether any of `days` falls inside the `from..=to` range.
    pub fn matches_days(&self, days: &[NaiveDate]) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        days.iter().any(|d| self.from.map_or(true, |f| *d >= f) && self.to.map_or(true, |t| *d <= t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(s: &str) -> DateTimeWithTimeZone { DateTime::parse_from_rfc3339(s).unwrap() }
    fn day(s: &str) -> NaiveDate { s.parse().unwrap() }

    fn assignment(dept: Uuid, people: Vec<Uuid>) -> DepartmentAssignmentInput {
        DepartmentAssignmentInput {
            department_id: dept,
            start_at: at("2024-06-03T08:00:00-03:00"),
            end_at: at("2024-06-03T17:00:00-03:00"),
            collaborator_ids: people,
        }
    }

    fn input() -> ServiceOrderInput {
        ServiceOrderInput {
            code: " OS-0001 ".into(),
            title: "Frame welding".into(),
            client: Some("  ".into()),
            description: Some(" rush ".into()),
            status: None,
            days: vec![day("2024-06-04"), day("2024-06-03")],
            departments: vec![assignment(Uuid::new_v4(), vec![Uuid::new_v4()])],
        }
    }

    #[test]
    fn plan_normalises_fields() {
        let plan = input().into_plan().unwrap();
        assert_eq!(plan.code, "OS-0001");
        assert_eq!(plan.client, None);
        assert_eq!(plan.description.as_deref(), Some("rush"));
        assert_eq!(plan.status, Status::Scheduled);
        assert_eq!(plan.days, vec![day("2024-06-03"), day("2024-06-04")]);
    }

    #[test]
    fn empty_days_or_departments_are_rejected() {
        let mut i = input();
        i.days.clear();
        assert!(matches!(i.into_plan(), Err(ServiceError::Validation(_))));
        let mut i = input();
        i.departments.clear();
        assert!(matches!(i.into_plan(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut i = input();
        i.days.push(day("2024-06-03"));
        assert!(i.into_plan().is_err());

        let dept = Uuid::new_v4();
        let mut i = input();
        i.departments = vec![assignment(dept, vec![]), assignment(dept, vec![])];
        assert!(i.into_plan().is_err());

        let who = Uuid::new_v4();
        let mut i = input();
        i.departments = vec![assignment(Uuid::new_v4(), vec![who, who])];
        assert!(i.into_plan().is_err());
    }

    #[test]
    fn same_collaborator_in_two_departments_is_fine() {
        let who = Uuid::new_v4();
        let mut i = input();
        i.departments = vec![assignment(Uuid::new_v4(), vec![who]), assignment(Uuid::new_v4(), vec![who])];
        let plan = i.into_plan().unwrap();
        assert_eq!(plan.employee_ids(), vec![who]);
        assert_eq!(plan.department_ids().len(), 2);
    }

    #[test]
    fn inverted_window_and_bad_status_are_rejected() {
        let mut i = input();
        i.departments[0].end_at = i.departments[0].start_at;
        assert!(matches!(i.into_plan(), Err(ServiceError::Validation(_))));

        let mut i = input();
        i.status = Some("paused".into());
        assert!(matches!(i.into_plan(), Err(ServiceError::Validation(_))));

        let mut i = input();
        i.status = Some("In_Progress".into());
        assert_eq!(i.into_plan().unwrap().status, Status::InProgress);
    }

    #[test]
    fn filter_checks_range_and_status() {
        let f = ServiceOrderFilter { from: Some(day("2024-06-05")), to: Some(day("2024-06-01")), ..Default::default() };
        assert!(f.into_criteria().is_err());
        let f = ServiceOrderFilter { status: Some("nope".into()), ..Default::default() };
        assert!(f.into_criteria().is_err());
        let c = ServiceOrderFilter { status: Some("completed".into()), ..Default::default() }.into_criteria().unwrap();
        assert_eq!(c.status, Some(Status::Completed));
    }

    #[test]
    fn day_range_is_inclusive() {
        let c = ListCriteria { from: Some(day("2024-06-03")), to: Some(day("2024-06-03")), ..Default::default() };
        assert!(c.matches_days(&[day("2024-06-03")]));
        assert!(!c.matches_days(&[day("2024-06-04")]));
        assert!(ListCriteria::default().matches_days(&[]));
    }

    #[test]
    fn input_parses_from_json() {
        let raw = r#"{
            "code": "OS-9", "title": "Paint",
            "days": ["2024-06-03"],
            "departments": [{
                "department_id": "00000000-0000-0000-0000-000000000001",
                "start_at": "2024-06-03T08:00:00Z", "end_at": "2024-06-03T12:00:00Z"
            }]
        }"#;
        let parsed: ServiceOrderInput = serde_json::from_str(raw).unwrap();
        let plan = parsed.into_plan().unwrap();
        assert!(plan.departments[0].collaborator_ids.is_empty());
    }
}
