// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::ids::*;
use crate::iso_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl AdmissionStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::UnderReview,
        Self::Approved,
        Self::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "under_review" => Some(Self::UnderReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Passed,
    Failed,
}

impl ResultStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Students,
    Teachers,
    Admissions,
    Exams,
    Results,
    Fees,
}

impl ScreenKind {
    pub const ALL: [Self; 6] = [
        Self::Students,
        Self::Teachers,
        Self::Admissions,
        Self::Exams,
        Self::Results,
        Self::Fees,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Admissions => "admissions",
            Self::Exams => "exams",
            Self::Results => "results",
            Self::Fees => "fees",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Teachers => "Teachers",
            Self::Admissions => "Admissions",
            Self::Exams => "Exams",
            Self::Results => "Exam Results",
            Self::Fees => "Pending Fees",
        }
    }
}

/// Embedded relation that only carries a display name, such as a student's
/// class or section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

impl NamedRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub id: AdmissionId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub grade_applying: Option<i64>,
    pub status: AdmissionStatus,
    #[serde(default, with = "iso_date::option")]
    pub applied_date: Option<Date>,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_applying: Option<i64>,
}

impl Admission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn apply(&mut self, patch: &AdmissionPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(grade) = patch.grade_applying {
            self.grade_applying = Some(grade);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub section_id: Option<SectionId>,
    #[serde(rename = "Class", default)]
    pub class: Option<NamedRef>,
    #[serde(rename = "Section", default)]
    pub section: Option<NamedRef>,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn apply(&mut self, patch: &StudentPatch) {
        if let Some(status) = &patch.status {
            self.status.clone_from(status);
        }
        if let Some(name) = &patch.parent_name {
            self.parent_name.clone_from(name);
        }
        if let Some(phone) = &patch.parent_phone {
            self.parent_phone.clone_from(phone);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeacherPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn apply(&mut self, patch: &TeacherPatch) {
        if let Some(status) = &patch.status {
            self.status.clone_from(status);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(specialization) = &patch.specialization {
            self.specialization.clone_from(specialization);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub exam_type: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Exam {
    pub fn apply(&mut self, patch: &ExamPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub name: String,
    pub marks: f64,
    pub total: f64,
    #[serde(default)]
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: ExamResultId,
    pub student_name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(rename = "class", default)]
    pub class_name: String,
    pub exam_name: String,
    #[serde(default, with = "iso_date::option")]
    pub exam_date: Option<Date>,
    #[serde(default)]
    pub subjects: Vec<SubjectMark>,
    #[serde(default)]
    pub total_marks: f64,
    #[serde(default)]
    pub max_marks: f64,
    pub percentage: f64,
    #[serde(default)]
    pub overall_grade: String,
    #[serde(default)]
    pub rank: Option<i64>,
    pub status: ResultStatus,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamResultPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ExamResult {
    pub fn apply(&mut self, patch: &ExamResultPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(remarks) = &patch.remarks {
            self.remarks.clone_from(remarks);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStudent {
    #[serde(default)]
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "Class", default)]
    pub class: Option<NamedRef>,
    #[serde(rename = "Section", default)]
    pub section: Option<NamedRef>,
}

impl FeeStudent {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingFee {
    pub id: FeeId,
    #[serde(default)]
    pub student_id: Option<StudentId>,
    #[serde(rename = "Student", default)]
    pub student: Option<FeeStudent>,
    #[serde(deserialize_with = "lenient_amount")]
    pub total_amount: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub paid_amount: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub pending_amount: f64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PendingFee {
    /// Recording a paid amount also recomputes what is still pending.
    pub fn apply(&mut self, patch: &FeePatch) {
        if let Some(paid) = patch.paid_amount {
            self.paid_amount = paid;
            self.pending_amount = (self.total_amount - paid).max(0.0);
        }
        if let Some(status) = &patch.status {
            self.status.clone_from(status);
        }
    }
}

/// Accepts amounts sent either as JSON numbers or as numeric strings.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(value) => Ok(value),
        Amount::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{Admission, AdmissionStatus, FeePatch, PendingFee, ScreenKind};
    use time::{Date, Month};

    #[test]
    fn admission_decodes_camel_case_payload() {
        let admission: Admission = serde_json::from_str(
            r#"{
                "id": 1,
                "firstName": "John",
                "lastName": "Doe",
                "email": "john.doe@example.com",
                "gradeApplying": 9,
                "status": "under_review",
                "appliedDate": "2024-01-15",
                "guardianName": "Jane Doe",
                "phone": "+1 (555) 123-4567"
            }"#,
        )
        .expect("decode admission");
        assert_eq!(admission.status, AdmissionStatus::UnderReview);
        assert_eq!(admission.grade_applying, Some(9));
        assert_eq!(
            admission.applied_date,
            Some(Date::from_calendar_date(2024, Month::January, 15).expect("valid date"))
        );
    }

    #[test]
    fn admission_tolerates_missing_optional_fields() {
        let admission: Admission = serde_json::from_str(
            r#"{"id": 2, "firstName": "A", "lastName": "B", "email": "a@b.co", "status": "pending"}"#,
        )
        .expect("decode sparse admission");
        assert_eq!(admission.grade_applying, None);
        assert_eq!(admission.applied_date, None);
    }

    #[test]
    fn pending_fee_accepts_string_amounts() {
        let fee: PendingFee = serde_json::from_str(
            r#"{
                "id": 7,
                "Student": {"first_name": "Riya", "last_name": "Sen", "Class": {"name": "Grade 5"}},
                "total_amount": "1500.00",
                "paid_amount": 500,
                "pending_amount": "1000",
                "status": "partial"
            }"#,
        )
        .expect("decode fee");
        assert_eq!(fee.total_amount, 1500.0);
        assert_eq!(fee.pending_amount, 1000.0);
        assert_eq!(
            fee.student
                .as_ref()
                .and_then(|student| student.class.as_ref())
                .map(|class| class.name.as_str()),
            Some("Grade 5")
        );
        assert!(fee.student.and_then(|student| student.section).is_none());
    }

    #[test]
    fn pending_fee_rejects_non_numeric_amount() {
        let result = serde_json::from_str::<PendingFee>(
            r#"{"id": 1, "total_amount": "lots", "paid_amount": 0, "pending_amount": 0}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn fee_patch_recomputes_pending_amount() {
        let mut fee: PendingFee = serde_json::from_str(
            r#"{"id": 1, "total_amount": 1200, "paid_amount": 0, "pending_amount": 1200}"#,
        )
        .expect("decode fee");
        fee.apply(&FeePatch {
            paid_amount: Some(1500.0),
            status: Some("paid".to_owned()),
        });
        assert_eq!(fee.pending_amount, 0.0);
        assert_eq!(fee.status, "paid");
    }

    #[test]
    fn status_and_screen_names_round_trip() {
        for status in AdmissionStatus::ALL {
            assert_eq!(AdmissionStatus::parse(status.as_str()), Some(status));
        }
        for screen in ScreenKind::ALL {
            assert_eq!(ScreenKind::parse(screen.as_str()), Some(screen));
        }
        assert_eq!(ScreenKind::parse("timetable"), None);
    }
}
