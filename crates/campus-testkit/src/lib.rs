// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use campus_app::{
    Admission, AdmissionId, AdmissionStatus, ClassId, Exam, ExamId, ExamResult, ExamResultId,
    FeeId, FeeStudent, NamedRef, PendingFee, ResultStatus, SectionId, Student, StudentId,
    SubjectMark, Teacher, TeacherId,
};
use std::path::PathBuf;
use time::{Date, Duration, Month};

const FIRST_NAMES: [&str; 16] = [
    "Aarav", "Jordan", "Priya", "Riley", "Meera", "Casey", "Arjun", "Quinn", "Sana", "Drew",
    "Kabir", "Elliot", "Ishita", "Cameron", "Rohan", "Noor",
];
const LAST_NAMES: [&str; 16] = [
    "Sharma", "Walker", "Iyer", "Evans", "Khan", "Gray", "Nair", "Young", "Das", "Reed", "Mehta",
    "Turner", "Bose", "Bennett", "Rao", "Foster",
];
const GUARDIAN_FIRST_NAMES: [&str; 8] = [
    "Anita", "Rahul", "Lisa", "David", "Kavita", "Michael", "Sunita", "Robert",
];
const CLASS_NAMES: [&str; 6] = [
    "Grade 5", "Grade 6", "Grade 7", "Grade 8", "Grade 9", "Grade 10",
];
const SECTION_NAMES: [&str; 3] = ["A", "B", "C"];
const QUALIFICATIONS: [&str; 5] = ["B.Ed", "M.Ed", "M.Sc", "M.A", "Ph.D"];
const SUBJECTS: [&str; 8] = [
    "Mathematics",
    "Science",
    "English",
    "History",
    "Geography",
    "Physics",
    "Chemistry",
    "Computer Science",
];
const EXAM_NAMES: [(&str, &str); 4] = [
    ("Unit Test 1", "unit_test"),
    ("Quarterly Test", "quarterly"),
    ("Mid-Term Examination", "mid_term"),
    ("Final Examination", "final"),
];
const EMAIL_DOMAINS: [&str; 4] = ["example.com", "mail.test", "school.test", "family.test"];
const STUDENT_STATUSES: [&str; 3] = ["active", "active", "inactive"];
const FEE_STATUSES: [&str; 3] = ["pending", "partial", "overdue"];

const REFERENCE_YEAR: i32 = 2024;

/// The five applications the admissions screen ships with.
pub fn admissions() -> Vec<Admission> {
    vec![
        admission(
            1,
            ("John", "Doe"),
            "john.doe@example.com",
            9,
            AdmissionStatus::Pending,
            15,
            "Jane Doe",
            "+1 (555) 123-4567",
        ),
        admission(
            2,
            ("Sarah", "Smith"),
            "sarah.smith@example.com",
            7,
            AdmissionStatus::Approved,
            14,
            "Michael Smith",
            "+1 (555) 987-6543",
        ),
        admission(
            3,
            ("Emily", "Johnson"),
            "emily.j@example.com",
            11,
            AdmissionStatus::Rejected,
            13,
            "Robert Johnson",
            "+1 (555) 456-7890",
        ),
        admission(
            4,
            ("Michael", "Brown"),
            "m.brown@example.com",
            5,
            AdmissionStatus::UnderReview,
            12,
            "Lisa Brown",
            "+1 (555) 234-5678",
        ),
        admission(
            5,
            ("Jessica", "Davis"),
            "jessica.d@example.com",
            8,
            AdmissionStatus::Pending,
            11,
            "David Davis",
            "+1 (555) 876-5432",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn admission(
    id: i64,
    (first_name, last_name): (&str, &str),
    email: &str,
    grade: i64,
    status: AdmissionStatus,
    january_day: u8,
    guardian_name: &str,
    phone: &str,
) -> Admission {
    Admission {
        id: AdmissionId::new(id),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        email: email.to_owned(),
        grade_applying: Some(grade),
        status,
        applied_date: Some(fixture_date(REFERENCE_YEAR, Month::January, january_day)),
        guardian_name: guardian_name.to_owned(),
        phone: phone.to_owned(),
    }
}

pub fn exam_results() -> Vec<ExamResult> {
    vec![
        exam_result(ResultRow {
            id: 1,
            student_name: "John Doe",
            roll_number: "STD001",
            class_name: "Grade 10-A",
            exam_name: "Mid-Term Examination 2024",
            exam_date: fixture_date(2024, Month::March, 15),
            marks: &[
                ("Mathematics", 85.0, "A"),
                ("Science", 78.0, "B+"),
                ("English", 92.0, "A+"),
                ("History", 88.0, "A"),
                ("Geography", 76.0, "B"),
            ],
            overall_grade: "A",
            rank: 3,
            remarks: "Excellent performance in English",
        }),
        exam_result(ResultRow {
            id: 2,
            student_name: "Sarah Smith",
            roll_number: "STD002",
            class_name: "Grade 10-A",
            exam_name: "Mid-Term Examination 2024",
            exam_date: fixture_date(2024, Month::March, 15),
            marks: &[
                ("Mathematics", 92.0, "A+"),
                ("Science", 88.0, "A"),
                ("English", 85.0, "A"),
                ("History", 90.0, "A+"),
                ("Geography", 82.0, "A"),
            ],
            overall_grade: "A+",
            rank: 1,
            remarks: "Outstanding performance across all subjects",
        }),
        exam_result(ResultRow {
            id: 3,
            student_name: "Michael Brown",
            roll_number: "STD003",
            class_name: "Grade 9-B",
            exam_name: "Mid-Term Examination 2024",
            exam_date: fixture_date(2024, Month::March, 15),
            marks: &[
                ("Mathematics", 65.0, "C+"),
                ("Science", 72.0, "B"),
                ("English", 68.0, "C+"),
                ("History", 75.0, "B"),
                ("Geography", 70.0, "B-"),
            ],
            overall_grade: "B",
            rank: 12,
            remarks: "Needs improvement in Mathematics",
        }),
        exam_result(ResultRow {
            id: 4,
            student_name: "Emily Johnson",
            roll_number: "STD004",
            class_name: "Grade 11-A",
            exam_name: "Final Examination 2023",
            exam_date: fixture_date(2023, Month::December, 20),
            marks: &[
                ("Physics", 45.0, "F"),
                ("Chemistry", 52.0, "D"),
                ("Biology", 48.0, "F"),
                ("English", 65.0, "C+"),
                ("Mathematics", 38.0, "F"),
            ],
            overall_grade: "F",
            rank: 28,
            remarks: "Failed in 3 subjects. Remedial classes recommended.",
        }),
        exam_result(ResultRow {
            id: 5,
            student_name: "David Wilson",
            roll_number: "STD005",
            class_name: "Grade 8-A",
            exam_name: "Quarterly Test 2024",
            exam_date: fixture_date(2024, Month::February, 10),
            marks: &[
                ("Mathematics", 78.0, "B+"),
                ("Science", 82.0, "A"),
                ("English", 80.0, "A"),
                ("Social Studies", 76.0, "B"),
                ("Computer Science", 88.0, "A"),
            ],
            overall_grade: "A",
            rank: 5,
            remarks: "Good performance. Keep it up!",
        }),
    ]
}

struct ResultRow<'a> {
    id: i64,
    student_name: &'a str,
    roll_number: &'a str,
    class_name: &'a str,
    exam_name: &'a str,
    exam_date: Date,
    marks: &'a [(&'a str, f64, &'a str)],
    overall_grade: &'a str,
    rank: i64,
    remarks: &'a str,
}

/// A subject below 40 marks fails the whole result.
fn exam_result(row: ResultRow<'_>) -> ExamResult {
    let subjects: Vec<SubjectMark> = row
        .marks
        .iter()
        .map(|(name, marks, grade)| SubjectMark {
            name: (*name).to_owned(),
            marks: *marks,
            total: 100.0,
            grade: (*grade).to_owned(),
        })
        .collect();
    let total_marks: f64 = subjects.iter().map(|subject| subject.marks).sum();
    let max_marks: f64 = subjects.iter().map(|subject| subject.total).sum();
    let failed = subjects.iter().filter(|subject| subject.marks < 40.0).count();

    ExamResult {
        id: ExamResultId::new(row.id),
        student_name: row.student_name.to_owned(),
        roll_number: row.roll_number.to_owned(),
        class_name: row.class_name.to_owned(),
        exam_name: row.exam_name.to_owned(),
        exam_date: Some(row.exam_date),
        subjects,
        total_marks,
        max_marks,
        percentage: percentage(total_marks, max_marks),
        overall_grade: row.overall_grade.to_owned(),
        rank: Some(row.rank),
        status: if failed > 0 || row.overall_grade == "F" {
            ResultStatus::Failed
        } else {
            ResultStatus::Passed
        },
        remarks: row.remarks.to_owned(),
    }
}

pub fn pending_fees() -> Vec<PendingFee> {
    vec![
        pending_fee(
            1,
            ("ADM-2024-001", "Aarav", "Sharma"),
            Some(("Grade 5", "A")),
            12_000.0,
            4_000.0,
            "partial",
        ),
        pending_fee(
            2,
            ("ADM-2024-002", "Priya", "Iyer"),
            Some(("Grade 7", "B")),
            15_000.0,
            0.0,
            "overdue",
        ),
        pending_fee(
            3,
            ("ADM-2024-003", "Kabir", "Mehta"),
            None,
            9_500.0,
            0.0,
            "pending",
        ),
        pending_fee(
            4,
            ("ADM-2024-004", "Noor", "Khan"),
            Some(("Grade 5", "B")),
            12_000.0,
            11_000.0,
            "partial",
        ),
    ]
}

fn pending_fee(
    id: i64,
    (admission_number, first_name, last_name): (&str, &str, &str),
    placement: Option<(&str, &str)>,
    total: f64,
    paid: f64,
    status: &str,
) -> PendingFee {
    PendingFee {
        id: FeeId::new(id),
        student_id: Some(StudentId::new(id)),
        student: Some(FeeStudent {
            admission_number: admission_number.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            class: placement.map(|(class, _)| NamedRef::new(id, class)),
            section: placement.map(|(_, section)| NamedRef::new(id, section)),
        }),
        total_amount: total,
        paid_amount: paid,
        pending_amount: total - paid,
        status: status.to_owned(),
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for demo rosters. The same seed always yields the same
/// records.
#[derive(Debug, Clone)]
pub struct SchoolFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl SchoolFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn admission(&mut self, id: i64) -> Admission {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let status = AdmissionStatus::ALL[self.rng.int_n(AdmissionStatus::ALL.len())];
        let applied = self.date_in_year(REFERENCE_YEAR);
        Admission {
            id: AdmissionId::new(id),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: self.email(first, last),
            grade_applying: Some(self.int_range(1, 12)),
            status,
            applied_date: Some(applied),
            guardian_name: format!("{} {last}", self.pick(&GUARDIAN_FIRST_NAMES)),
            phone: self.phone(),
        }
    }

    pub fn student(&mut self, id: i64) -> Student {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let class_index = self.rng.int_n(CLASS_NAMES.len());
        let section_index = self.rng.int_n(SECTION_NAMES.len());
        let class_id = class_index as i64 + 1;
        let section_id = class_id * 10 + section_index as i64;
        Student {
            id: StudentId::new(id),
            admission_number: format!("ADM-{REFERENCE_YEAR}-{id:03}"),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: self.email(first, last),
            class_id: Some(ClassId::new(class_id)),
            section_id: Some(SectionId::new(section_id)),
            class: Some(NamedRef::new(class_id, CLASS_NAMES[class_index])),
            section: Some(NamedRef::new(section_id, SECTION_NAMES[section_index])),
            parent_name: format!("{} {last}", self.pick(&GUARDIAN_FIRST_NAMES)),
            parent_phone: self.phone(),
            status: self.pick(&STUDENT_STATUSES).to_owned(),
        }
    }

    pub fn teacher(&mut self, id: i64) -> Teacher {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        Teacher {
            id: TeacherId::new(id),
            employee_id: format!("EMP{id:04}"),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: self.email(first, last),
            qualification: self.pick(&QUALIFICATIONS).to_owned(),
            specialization: self.pick(&SUBJECTS).to_owned(),
            phone: self.phone(),
            status: if self.rng.int_n(5) == 0 {
                "on_leave".to_owned()
            } else {
                "active".to_owned()
            },
        }
    }

    pub fn exam(&mut self, id: i64) -> Exam {
        let (name, exam_type) = EXAM_NAMES[self.rng.int_n(EXAM_NAMES.len())];
        let start = self.date_in_year(REFERENCE_YEAR);
        let length = self.int_range(1, 10);
        Exam {
            id: ExamId::new(id),
            name: format!("{name} {REFERENCE_YEAR}"),
            exam_type: exam_type.to_owned(),
            academic_year: format!("{REFERENCE_YEAR}-{}", REFERENCE_YEAR + 1),
            start_date: Some(start),
            end_date: Some(start + Duration::days(length)),
            is_active: self.rng.bool(),
        }
    }

    pub fn exam_result(&mut self, id: i64) -> ExamResult {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let (exam_name, _) = EXAM_NAMES[self.rng.int_n(EXAM_NAMES.len())];
        let marks: Vec<(&str, f64, &str)> = (0..5)
            .map(|index| {
                let marks = self.int_range(30, 100) as f64;
                (SUBJECTS[index], marks, letter_grade(marks))
            })
            .collect();
        let total: f64 = marks.iter().map(|(_, marks, _)| marks).sum();
        let roll_number = format!("STD{id:03}");
        let class_name = format!(
            "{}-{}",
            self.pick(&CLASS_NAMES),
            self.pick(&SECTION_NAMES)
        );
        let student_name = format!("{first} {last}");
        let exam_name = format!("{exam_name} {REFERENCE_YEAR}");
        exam_result(ResultRow {
            id,
            student_name: &student_name,
            roll_number: &roll_number,
            class_name: &class_name,
            exam_name: &exam_name,
            exam_date: self.date_in_year(REFERENCE_YEAR),
            marks: &marks,
            overall_grade: letter_grade(total / 5.0),
            rank: self.int_range(1, 40),
            remarks: "",
        })
    }

    pub fn pending_fee(&mut self, id: i64) -> PendingFee {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let admission_number = format!("ADM-{REFERENCE_YEAR}-{id:03}");
        let total = (self.int_range(8, 20) * 1_000) as f64;
        let paid = (self.int_range(0, 7) * 1_000) as f64;
        let placement = if self.rng.int_n(8) == 0 {
            None
        } else {
            Some((self.pick(&CLASS_NAMES), self.pick(&SECTION_NAMES)))
        };
        let status = if paid > 0.0 {
            "partial"
        } else {
            self.pick(&FEE_STATUSES)
        };
        pending_fee(
            id,
            (admission_number.as_str(), first, last),
            placement,
            total,
            paid,
            status,
        )
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let start = fixture_date(year, Month::January, 1);
        start + Duration::days(self.int_range(0, 364))
    }

    fn email(&mut self, first: &str, last: &str) -> String {
        format!(
            "{}.{}@{}",
            first.to_ascii_lowercase(),
            last.to_ascii_lowercase(),
            self.pick(&EMAIL_DOMAINS)
        )
    }

    fn phone(&mut self) -> String {
        format!(
            "+1 ({:03}) {:03}-{:04}",
            self.int_range(200, 999),
            self.int_range(200, 999),
            self.int_range(0, 9_999),
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

fn letter_grade(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B",
        p if p >= 60.0 => "C",
        p if p >= 40.0 => "D",
        _ => "F",
    }
}

fn percentage(total: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (total * 1_000.0 / max).round() / 10.0
}

pub fn fixture_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid fixture date")
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn temp_session_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("session.json");
    Ok((dir, path))
}
