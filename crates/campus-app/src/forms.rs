// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{FeeId, StudentId, iso_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionFormInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub gender: Option<Gender>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub previous_school: String,
    pub grade_applying: Option<i64>,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: String,
    pub guardian_relation: String,
    pub medical_notes: String,
}

impl AdmissionFormInput {
    pub fn blank() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            gender: None,
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            previous_school: String::new(),
            grade_applying: None,
            guardian_name: String::new(),
            guardian_phone: String::new(),
            guardian_email: String::new(),
            guardian_relation: String::new(),
            medical_notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            bail!("first name is required -- enter the applicant's first name and retry");
        }
        if self.last_name.trim().is_empty() {
            bail!("last name is required -- enter the applicant's last name and retry");
        }
        if self.date_of_birth.is_none() {
            bail!("date of birth is required -- use YYYY-MM-DD");
        }
        if self.gender.is_none() {
            bail!("gender is required -- choose male, female, or other");
        }
        if self.email.trim().is_empty() {
            bail!("email is required -- enter a contact email and retry");
        }
        if !looks_like_email(&self.email) {
            bail!("email {:?} is invalid -- expected something like name@example.com", self.email);
        }
        if self.phone.trim().is_empty() {
            bail!("phone number is required -- enter a contact number and retry");
        }
        match self.grade_applying {
            None => bail!("grade is required -- choose the grade applied for"),
            Some(grade) if !(1..=12).contains(&grade) => {
                bail!("grade {grade} is out of range -- expected 1 through 12")
            }
            Some(_) => {}
        }
        if self.guardian_name.trim().is_empty() {
            bail!("guardian name is required -- enter a parent or guardian and retry");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Online,
    Cheque,
    #[serde(rename = "dd")]
    DemandDraft,
    Card,
}

impl PaymentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Online => "online",
            Self::Cheque => "cheque",
            Self::DemandDraft => "dd",
            Self::Card => "card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "online" => Some(Self::Online),
            "cheque" => Some(Self::Cheque),
            "dd" => Some(Self::DemandDraft),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentFormInput {
    pub student_id: Option<StudentId>,
    pub fee_id: Option<FeeId>,
    pub amount: f64,
    pub payment_mode: PaymentMode,
    #[serde(with = "iso_date")]
    pub payment_date: Date,
    pub transaction_id: String,
    pub cheque_number: String,
    pub bank_name: String,
    pub remarks: String,
}

impl PaymentFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.student_id.is_none_or(|id| id.get() <= 0) {
            bail!("student is required -- choose a student and retry");
        }
        if self.fee_id.is_none_or(|id| id.get() <= 0) {
            bail!("please select a fee record");
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            bail!("payment amount must be positive");
        }
        match self.payment_mode {
            PaymentMode::Cheque | PaymentMode::DemandDraft => {
                if self.cheque_number.trim().is_empty() {
                    bail!("cheque number is required for {} payments", self.payment_mode.as_str());
                }
                if self.bank_name.trim().is_empty() {
                    bail!("bank name is required for {} payments", self.payment_mode.as_str());
                }
            }
            PaymentMode::Online | PaymentMode::Card => {
                if self.transaction_id.trim().is_empty() {
                    bail!("transaction id is required for {} payments", self.payment_mode.as_str());
                }
            }
            PaymentMode::Cash => {}
        }
        Ok(())
    }
}

/// Something, an `@`, something, a dot, something, all without whitespace.
fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        let Some(at) = token.char_indices().skip(1).find(|(_, ch)| *ch == '@').map(|(i, _)| i)
        else {
            return false;
        };
        token
            .char_indices()
            .any(|(index, ch)| ch == '.' && index >= at + 2 && index + 1 < token.len())
    })
}
