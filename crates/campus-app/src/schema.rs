// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Declared field paths and [`Record`] bindings for each list screen.

use crate::ids::*;
use crate::model::*;
use crate::{Field, FieldValue, Record, SortSpec, ValueKind};

macro_rules! record_fields {
    ($name:ident { $($variant:ident => ($path:literal, $label:literal, $kind:ident)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Field for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn path(self) -> &'static str {
                match self {
                    $(Self::$variant => $path),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn kind(self) -> ValueKind {
                match self {
                    $(Self::$variant => ValueKind::$kind),+
                }
            }
        }
    };
}

record_fields!(AdmissionField {
    Id => ("id", "ID", Integer),
    FirstName => ("firstName", "First Name", Text),
    LastName => ("lastName", "Last Name", Text),
    Email => ("email", "Email", Text),
    GradeApplying => ("gradeApplying", "Grade", Integer),
    Status => ("status", "Status", Text),
    AppliedDate => ("appliedDate", "Applied", Date),
    GuardianName => ("guardianName", "Guardian", Text),
    Phone => ("phone", "Phone", Text),
});

record_fields!(StudentField {
    Id => ("id", "ID", Integer),
    AdmissionNumber => ("admission_number", "Admission No", Text),
    FirstName => ("first_name", "First Name", Text),
    LastName => ("last_name", "Last Name", Text),
    Email => ("email", "Email", Text),
    ClassId => ("class_id", "Class ID", Integer),
    SectionId => ("section_id", "Section ID", Integer),
    ClassName => ("Class.name", "Class", Text),
    SectionName => ("Section.name", "Section", Text),
    ParentName => ("parent_name", "Parent Name", Text),
    ParentPhone => ("parent_phone", "Parent Phone", Text),
    Status => ("status", "Status", Text),
});

record_fields!(TeacherField {
    Id => ("id", "ID", Integer),
    EmployeeId => ("employee_id", "Employee ID", Text),
    FirstName => ("first_name", "First Name", Text),
    LastName => ("last_name", "Last Name", Text),
    Email => ("email", "Email", Text),
    Qualification => ("qualification", "Qualification", Text),
    Specialization => ("specialization", "Specialization", Text),
    Phone => ("phone", "Phone", Text),
    Status => ("status", "Status", Text),
});

record_fields!(ExamField {
    Id => ("id", "ID", Integer),
    Name => ("name", "Exam Name", Text),
    ExamType => ("type", "Type", Text),
    AcademicYear => ("academic_year", "Academic Year", Text),
    StartDate => ("start_date", "Start Date", Date),
    EndDate => ("end_date", "End Date", Date),
    IsActive => ("is_active", "Active", Bool),
});

record_fields!(ExamResultField {
    Id => ("id", "ID", Integer),
    StudentName => ("studentName", "Student", Text),
    RollNumber => ("rollNumber", "Roll No", Text),
    ClassName => ("class", "Class", Text),
    ExamName => ("examName", "Exam", Text),
    ExamDate => ("examDate", "Exam Date", Date),
    TotalMarks => ("totalMarks", "Marks", Decimal),
    MaxMarks => ("maxMarks", "Max Marks", Decimal),
    Percentage => ("percentage", "Percentage", Decimal),
    OverallGrade => ("overallGrade", "Grade", Text),
    Rank => ("rank", "Rank", Integer),
    Status => ("status", "Status", Text),
});

record_fields!(FeeField {
    Id => ("id", "ID", Integer),
    AdmissionNumber => ("Student.admission_number", "Admission No", Text),
    StudentFirstName => ("Student.first_name", "First Name", Text),
    StudentLastName => ("Student.last_name", "Last Name", Text),
    ClassName => ("Student.Class.name", "Class", Text),
    SectionName => ("Student.Section.name", "Section", Text),
    TotalAmount => ("total_amount", "Total", Decimal),
    PaidAmount => ("paid_amount", "Paid", Decimal),
    PendingAmount => ("pending_amount", "Pending", Decimal),
    Status => ("status", "Status", Text),
});

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::text(value))
}

fn named(relation: Option<&NamedRef>) -> Option<FieldValue> {
    relation.map(|relation| FieldValue::text(&relation.name))
}

impl Record for Admission {
    type Id = AdmissionId;
    type Field = AdmissionField;
    type Patch = AdmissionPatch;

    const SINGULAR: &'static str = "application";
    const PLURAL: &'static str = "applications";

    fn id(&self) -> AdmissionId {
        self.id
    }

    fn field(&self, field: AdmissionField) -> Option<FieldValue> {
        match field {
            AdmissionField::Id => Some(FieldValue::Integer(self.id.get())),
            AdmissionField::FirstName => text(&self.first_name),
            AdmissionField::LastName => text(&self.last_name),
            AdmissionField::Email => text(&self.email),
            AdmissionField::GradeApplying => self.grade_applying.map(FieldValue::Integer),
            AdmissionField::Status => text(self.status.as_str()),
            AdmissionField::AppliedDate => self.applied_date.map(FieldValue::Date),
            AdmissionField::GuardianName => text(&self.guardian_name),
            AdmissionField::Phone => text(&self.phone),
        }
    }

    fn search_fields() -> &'static [AdmissionField] {
        &[
            AdmissionField::FirstName,
            AdmissionField::LastName,
            AdmissionField::Email,
            AdmissionField::GuardianName,
        ]
    }

    fn default_sort() -> Option<SortSpec<AdmissionField>> {
        Some(SortSpec::desc(AdmissionField::AppliedDate))
    }

    fn apply_patch(&mut self, patch: &AdmissionPatch) {
        self.apply(patch);
    }
}

impl Record for Student {
    type Id = StudentId;
    type Field = StudentField;
    type Patch = StudentPatch;

    const SINGULAR: &'static str = "student";
    const PLURAL: &'static str = "students";

    fn id(&self) -> StudentId {
        self.id
    }

    fn field(&self, field: StudentField) -> Option<FieldValue> {
        match field {
            StudentField::Id => Some(FieldValue::Integer(self.id.get())),
            StudentField::AdmissionNumber => text(&self.admission_number),
            StudentField::FirstName => text(&self.first_name),
            StudentField::LastName => text(&self.last_name),
            StudentField::Email => text(&self.email),
            StudentField::ClassId => self.class_id.map(|id| FieldValue::Integer(id.get())),
            StudentField::SectionId => self.section_id.map(|id| FieldValue::Integer(id.get())),
            StudentField::ClassName => named(self.class.as_ref()),
            StudentField::SectionName => named(self.section.as_ref()),
            StudentField::ParentName => text(&self.parent_name),
            StudentField::ParentPhone => text(&self.parent_phone),
            StudentField::Status => text(&self.status),
        }
    }

    fn search_fields() -> &'static [StudentField] {
        &[
            StudentField::AdmissionNumber,
            StudentField::FirstName,
            StudentField::LastName,
            StudentField::Email,
            StudentField::ParentName,
        ]
    }

    fn apply_patch(&mut self, patch: &StudentPatch) {
        self.apply(patch);
    }
}

impl Record for Teacher {
    type Id = TeacherId;
    type Field = TeacherField;
    type Patch = TeacherPatch;

    const SINGULAR: &'static str = "teacher";
    const PLURAL: &'static str = "teachers";

    fn id(&self) -> TeacherId {
        self.id
    }

    fn field(&self, field: TeacherField) -> Option<FieldValue> {
        match field {
            TeacherField::Id => Some(FieldValue::Integer(self.id.get())),
            TeacherField::EmployeeId => text(&self.employee_id),
            TeacherField::FirstName => text(&self.first_name),
            TeacherField::LastName => text(&self.last_name),
            TeacherField::Email => text(&self.email),
            TeacherField::Qualification => text(&self.qualification),
            TeacherField::Specialization => text(&self.specialization),
            TeacherField::Phone => text(&self.phone),
            TeacherField::Status => text(&self.status),
        }
    }

    fn search_fields() -> &'static [TeacherField] {
        &[
            TeacherField::EmployeeId,
            TeacherField::FirstName,
            TeacherField::LastName,
            TeacherField::Email,
            TeacherField::Specialization,
        ]
    }

    fn apply_patch(&mut self, patch: &TeacherPatch) {
        self.apply(patch);
    }
}

impl Record for Exam {
    type Id = ExamId;
    type Field = ExamField;
    type Patch = ExamPatch;

    const SINGULAR: &'static str = "exam";
    const PLURAL: &'static str = "exams";

    fn id(&self) -> ExamId {
        self.id
    }

    fn field(&self, field: ExamField) -> Option<FieldValue> {
        match field {
            ExamField::Id => Some(FieldValue::Integer(self.id.get())),
            ExamField::Name => text(&self.name),
            ExamField::ExamType => text(&self.exam_type),
            ExamField::AcademicYear => text(&self.academic_year),
            ExamField::StartDate => self.start_date.map(FieldValue::Date),
            ExamField::EndDate => self.end_date.map(FieldValue::Date),
            ExamField::IsActive => Some(FieldValue::Bool(self.is_active)),
        }
    }

    fn search_fields() -> &'static [ExamField] {
        &[ExamField::Name, ExamField::ExamType, ExamField::AcademicYear]
    }

    fn default_sort() -> Option<SortSpec<ExamField>> {
        Some(SortSpec::desc(ExamField::StartDate))
    }

    fn apply_patch(&mut self, patch: &ExamPatch) {
        self.apply(patch);
    }
}

impl Record for ExamResult {
    type Id = ExamResultId;
    type Field = ExamResultField;
    type Patch = ExamResultPatch;

    const SINGULAR: &'static str = "result";
    const PLURAL: &'static str = "results";

    fn id(&self) -> ExamResultId {
        self.id
    }

    fn field(&self, field: ExamResultField) -> Option<FieldValue> {
        match field {
            ExamResultField::Id => Some(FieldValue::Integer(self.id.get())),
            ExamResultField::StudentName => text(&self.student_name),
            ExamResultField::RollNumber => text(&self.roll_number),
            ExamResultField::ClassName => text(&self.class_name),
            ExamResultField::ExamName => text(&self.exam_name),
            ExamResultField::ExamDate => self.exam_date.map(FieldValue::Date),
            ExamResultField::TotalMarks => Some(FieldValue::Decimal(self.total_marks)),
            ExamResultField::MaxMarks => Some(FieldValue::Decimal(self.max_marks)),
            ExamResultField::Percentage => Some(FieldValue::Decimal(self.percentage)),
            ExamResultField::OverallGrade => text(&self.overall_grade),
            ExamResultField::Rank => self.rank.map(FieldValue::Integer),
            ExamResultField::Status => text(self.status.as_str()),
        }
    }

    fn search_fields() -> &'static [ExamResultField] {
        &[
            ExamResultField::StudentName,
            ExamResultField::RollNumber,
            ExamResultField::ExamName,
        ]
    }

    fn apply_patch(&mut self, patch: &ExamResultPatch) {
        self.apply(patch);
    }
}

impl Record for PendingFee {
    type Id = FeeId;
    type Field = FeeField;
    type Patch = FeePatch;

    const SINGULAR: &'static str = "fee";
    const PLURAL: &'static str = "fees";

    fn id(&self) -> FeeId {
        self.id
    }

    fn field(&self, field: FeeField) -> Option<FieldValue> {
        let student = self.student.as_ref();
        match field {
            FeeField::Id => Some(FieldValue::Integer(self.id.get())),
            FeeField::AdmissionNumber => student.and_then(|s| text(&s.admission_number)),
            FeeField::StudentFirstName => student.and_then(|s| text(&s.first_name)),
            FeeField::StudentLastName => student.and_then(|s| text(&s.last_name)),
            FeeField::ClassName => student.and_then(|s| named(s.class.as_ref())),
            FeeField::SectionName => student.and_then(|s| named(s.section.as_ref())),
            FeeField::TotalAmount => Some(FieldValue::Decimal(self.total_amount)),
            FeeField::PaidAmount => Some(FieldValue::Decimal(self.paid_amount)),
            FeeField::PendingAmount => Some(FieldValue::Decimal(self.pending_amount)),
            FeeField::Status => text(&self.status),
        }
    }

    fn search_fields() -> &'static [FeeField] {
        &[
            FeeField::AdmissionNumber,
            FeeField::StudentFirstName,
            FeeField::StudentLastName,
        ]
    }

    fn default_sort() -> Option<SortSpec<FeeField>> {
        Some(SortSpec::desc(FeeField::PendingAmount))
    }

    fn apply_patch(&mut self, patch: &FeePatch) {
        self.apply(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::{AdmissionField, FeeField, StudentField};
    use crate::{
        FeeId, FeeStudent, Field, FieldValue, NamedRef, PendingFee, Record, ValueKind,
    };

    fn fee(student: Option<FeeStudent>) -> PendingFee {
        PendingFee {
            id: FeeId::new(1),
            student_id: None,
            student,
            total_amount: 1200.0,
            paid_amount: 200.0,
            pending_amount: 1000.0,
            status: "partial".to_owned(),
        }
    }

    #[test]
    fn paths_parse_ignoring_case() {
        assert_eq!(
            AdmissionField::parse("gradeapplying"),
            Some(AdmissionField::GradeApplying)
        );
        assert_eq!(
            FeeField::parse("Student.Class.name"),
            Some(FeeField::ClassName)
        );
        assert_eq!(StudentField::parse("Class.name.length"), None);
    }

    #[test]
    fn declared_paths_are_unique() {
        for (index, field) in FeeField::ALL.iter().enumerate() {
            assert_eq!(FeeField::parse(field.path()), Some(*field));
            assert!(FeeField::ALL[index + 1..]
                .iter()
                .all(|other| other.path() != field.path()));
        }
    }

    #[test]
    fn nested_path_resolves_through_student_and_class() {
        let fee = fee(Some(FeeStudent {
            admission_number: "ADM-7".to_owned(),
            first_name: "Riya".to_owned(),
            last_name: "Sen".to_owned(),
            class: Some(NamedRef::new(5, "Grade 5")),
            section: None,
        }));
        assert_eq!(
            fee.field(FeeField::ClassName),
            Some(FieldValue::text("Grade 5"))
        );
        assert_eq!(fee.field(FeeField::SectionName), None);
    }

    #[test]
    fn missing_intermediate_object_resolves_to_none() {
        let fee = fee(None);
        assert_eq!(fee.field(FeeField::ClassName), None);
        assert_eq!(fee.field(FeeField::AdmissionNumber), None);
        assert_eq!(
            fee.field(FeeField::PendingAmount),
            Some(FieldValue::Decimal(1000.0))
        );
    }

    #[test]
    fn id_fields_are_numeric() {
        assert_eq!(AdmissionField::Id.kind(), ValueKind::Integer);
        assert_eq!(StudentField::ClassId.kind(), ValueKind::Integer);
    }
}
