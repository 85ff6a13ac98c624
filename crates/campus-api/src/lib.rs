// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use campus_app::{
    Admission, AdmissionFormInput, AdmissionId, AdmissionStatus, Exam, ExamResult,
    PaymentFormInput, PendingFee, Persistence, Record, Session, SessionUser, Student, Teacher,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";

const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in or session expired -- sign in again with --login")]
    Unauthorized,
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("cannot reach {base_url} -- check api.base_url and that the server is running ({source})")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("decode {what}")]
    Decode {
        what: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// True when any cause in the chain is a 401 from the API.
pub fn is_unauthorized(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized)
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
}

/// Paging metadata the server returns next to `data` on paged lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: u32,
    #[serde(default)]
    pub limit: Option<u32>,
    pub total: u64,
    pub pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// One page of a server-paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .map_err(|error| anyhow::anyhow!("api.base_url {base_url:?} is invalid: {error}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "api.base_url must use http or https, got {:?} -- e.g. {DEFAULT_BASE_URL}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| anyhow::anyhow!("build HTTP client: {error}"))?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Exchanges credentials for a hydrated session. A 401 here is a bad
    /// credential and keeps the server's message.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let body = LoginRequest { email, password };
        let response =
            self.dispatch(self.http.post(self.endpoint("auth/login")).json(&body))?;
        let envelope: Envelope<LoginPayload> =
            decode(ensure_success(response)?, "login response")?;
        let payload = envelope.data;
        let mut session = Session::anonymous();
        session.hydrate(payload.user, payload.token);
        debug!(email, "signed in");
        Ok(session)
    }

    pub fn profile(&self, session: &Session) -> Result<SessionUser, ApiError> {
        self.fetch(session, "auth/me", NO_QUERY, "profile")
    }

    pub fn list_students(
        &self,
        session: &Session,
        query: &StudentQuery,
    ) -> Result<Paged<Student>, ApiError> {
        self.fetch_paged(session, "students", query, "student list")
    }

    pub fn list_teachers(
        &self,
        session: &Session,
        query: &PageQuery,
    ) -> Result<Paged<Teacher>, ApiError> {
        self.fetch_paged(session, "teachers", query, "teacher list")
    }

    pub fn list_admissions(&self, session: &Session) -> Result<Vec<Admission>, ApiError> {
        self.fetch(session, "admissions", NO_QUERY, "admission list")
    }

    pub fn list_exams(&self, session: &Session) -> Result<Vec<Exam>, ApiError> {
        self.fetch(session, "exams", NO_QUERY, "exam list")
    }

    pub fn list_results(&self, session: &Session) -> Result<Vec<ExamResult>, ApiError> {
        self.fetch(session, "exams/results/report", NO_QUERY, "result report")
    }

    pub fn list_pending_fees(
        &self,
        session: &Session,
        query: &FeeQuery,
    ) -> Result<Vec<PendingFee>, ApiError> {
        let payload: PendingFeesPayload =
            self.fetch(session, "fees/pending", query, "pending fees")?;
        Ok(payload.pending_fees)
    }

    pub fn update_admission_status(
        &self,
        session: &Session,
        id: AdmissionId,
        status: AdmissionStatus,
    ) -> Result<(), ApiError> {
        let body = StatusRequest { status };
        self.send_ignoring_body(
            session,
            self.http
                .put(self.endpoint(&format!("admissions/{id}/status")))
                .json(&body),
        )
    }

    /// `PUT /{resource}/{id}` with a partial body.
    pub fn update<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        resource: &str,
        id: impl Display,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send_ignoring_body(
            session,
            self.http
                .put(self.endpoint(&format!("{resource}/{id}")))
                .json(body),
        )
    }

    pub fn delete(
        &self,
        session: &Session,
        resource: &str,
        id: impl Display,
    ) -> Result<(), ApiError> {
        self.send_ignoring_body(
            session,
            self.http.delete(self.endpoint(&format!("{resource}/{id}"))),
        )
    }

    /// Submits an application. Validation runs before any request is sent.
    pub fn create_admission(
        &self,
        session: &Session,
        form: &AdmissionFormInput,
    ) -> anyhow::Result<Admission> {
        form.validate()?;
        Ok(self.send(
            session,
            self.http.post(self.endpoint("admissions")).json(form),
            "created admission",
        )?)
    }

    pub fn record_payment(
        &self,
        session: &Session,
        form: &PaymentFormInput,
    ) -> anyhow::Result<()> {
        form.validate()?;
        Ok(self.send_ignoring_body(
            session,
            self.http.post(self.endpoint("fees/payment")).json(form),
        )?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn fetch<T, Q>(
        &self,
        session: &Session,
        path: &str,
        query: &Q,
        what: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(session, self.http.get(self.endpoint(path)).query(query), what)
    }

    fn fetch_paged<T, Q>(
        &self,
        session: &Session,
        path: &str,
        query: &Q,
        what: &str,
    ) -> Result<Paged<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.execute(session, self.http.get(self.endpoint(path)).query(query))?;
        let envelope: PagedEnvelope<T> = decode(response, what)?;
        Ok(Paged {
            items: envelope.data,
            pagination: envelope.pagination,
        })
    }

    fn send<T: DeserializeOwned>(
        &self,
        session: &Session,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(session, request)?;
        let envelope: Envelope<T> = decode(response, what)?;
        Ok(envelope.data)
    }

    fn send_ignoring_body(
        &self,
        session: &Session,
        request: RequestBuilder,
    ) -> Result<(), ApiError> {
        self.execute(session, request).map(drop)
    }

    fn execute(&self, session: &Session, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match session.bearer() {
            Some(bearer) => request.header(reqwest::header::AUTHORIZATION, bearer),
            None => request,
        };
        let response = self.dispatch(request)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("api rejected the session token");
            return Err(ApiError::Unauthorized);
        }
        ensure_success(response)
    }

    fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        debug!(url = %response.url(), status = response.status().as_u16(), "api response");
        Ok(response)
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(clean_error_response(status, &body));
    }
    Ok(response)
}

fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    response.json().map_err(|source| ApiError::Decode {
        what: what.to_owned(),
        source,
    })
}

/// Maps a record type onto its REST resource.
pub trait Resource: Record {
    /// Collection path below the base URL.
    const PATH: &'static str;

    /// Whether `DELETE /{PATH}/{id}` exists.
    const DELETABLE: bool = true;

    fn persist_patch(
        client: &Client,
        session: &Session,
        id: Self::Id,
        patch: &Self::Patch,
    ) -> anyhow::Result<()>;
}

macro_rules! put_resource {
    ($record:ty, $path:literal) => {
        impl Resource for $record {
            const PATH: &'static str = $path;

            fn persist_patch(
                client: &Client,
                session: &Session,
                id: Self::Id,
                patch: &Self::Patch,
            ) -> anyhow::Result<()> {
                Ok(client.update(session, Self::PATH, id, patch)?)
            }
        }
    };
}

put_resource!(Student, "students");
put_resource!(Teacher, "teachers");
put_resource!(Exam, "exams");

impl Resource for Admission {
    const PATH: &'static str = "admissions";

    fn persist_patch(
        client: &Client,
        session: &Session,
        id: AdmissionId,
        patch: &campus_app::AdmissionPatch,
    ) -> anyhow::Result<()> {
        // Status and grade live behind different endpoints; one patch is one request.
        match (patch.status, patch.grade_applying) {
            (Some(_), Some(_)) => anyhow::bail!(
                "application {id}: change the status and the grade separately"
            ),
            (Some(status), None) => Ok(client.update_admission_status(session, id, status)?),
            (None, Some(_)) => Ok(client.update(session, Self::PATH, id, patch)?),
            (None, None) => Ok(()),
        }
    }
}

impl Resource for ExamResult {
    const PATH: &'static str = "exams/results";
    const DELETABLE: bool = false;

    fn persist_patch(
        _: &Client,
        _: &Session,
        _: Self::Id,
        _: &Self::Patch,
    ) -> anyhow::Result<()> {
        anyhow::bail!("exam results are read-only -- change marks from the exam screen")
    }
}

impl Resource for PendingFee {
    const PATH: &'static str = "fees";
    const DELETABLE: bool = false;

    fn persist_patch(
        _: &Client,
        _: &Session,
        _: Self::Id,
        _: &Self::Patch,
    ) -> anyhow::Result<()> {
        anyhow::bail!("fees change only through payments -- record one with record_payment")
    }
}

/// Server side of a collection view, bound to one session.
pub struct RestResource<'a> {
    client: &'a Client,
    session: &'a Session,
}

impl<'a> RestResource<'a> {
    pub fn new(client: &'a Client, session: &'a Session) -> Self {
        Self { client, session }
    }
}

impl<R: Resource> Persistence<R> for RestResource<'_> {
    fn persist_update(&mut self, id: R::Id, patch: &R::Patch) -> anyhow::Result<()> {
        R::persist_patch(self.client, self.session, id, patch)
    }

    fn persist_delete(&mut self, id: R::Id) -> anyhow::Result<()> {
        if !R::DELETABLE {
            anyhow::bail!("{} cannot be deleted", R::PLURAL);
        }
        Ok(self.client.delete(self.session, R::PATH, id)?)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> ApiError {
    ApiError::Transport {
        base_url: base_url.to_owned(),
        source: error,
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    let status_code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return ApiError::Status {
            status: status_code,
            message,
        };
    }

    let message = if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        body.trim().to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_lowercase()
    };
    ApiError::Status {
        status: status_code,
        message,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct PagedEnvelope<T> {
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    user: SessionUser,
    token: String,
}

#[derive(Debug, Serialize)]
struct StatusRequest {
    status: AdmissionStatus,
}

#[derive(Debug, Deserialize)]
struct PendingFeesPayload {
    #[serde(default)]
    pending_fees: Vec<PendingFee>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
