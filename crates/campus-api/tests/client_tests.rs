// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use campus_api::{
    ApiError, Client, FeeQuery, PageQuery, Pagination, RestResource, StudentQuery,
    is_unauthorized,
};
use campus_app::{
    AdmissionFormInput, AdmissionId, AdmissionPatch, AdmissionStatus, CollectionView, FeeId,
    Gender, PaymentFormInput, PaymentMode, Session, SessionUser, Student, StudentId, UserId,
};
use campus_testkit::{SchoolFaker, admissions, fixture_date};
use std::io::Read;
use std::thread;
use std::time::Duration;
use time::Month;
use tiny_http::{Header, Method, Request, Response, Server};

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/v1", server.server_addr());
    Ok((server, addr))
}

fn json_response(status: u16, body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_owned())
}

fn body_of(request: &mut Request) -> String {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .expect("request body should be readable");
    body
}

fn application() -> AdmissionFormInput {
    AdmissionFormInput {
        first_name: "Asha".to_owned(),
        last_name: "Rao".to_owned(),
        date_of_birth: Some(fixture_date(2012, Month::March, 4)),
        gender: Some(Gender::Female),
        email: "asha.rao@example.com".to_owned(),
        phone: "555-0101".to_owned(),
        grade_applying: Some(6),
        guardian_name: "Meera Rao".to_owned(),
        ..AdmissionFormInput::blank()
    }
}

fn cash_payment() -> PaymentFormInput {
    PaymentFormInput {
        student_id: Some(StudentId::new(2)),
        fee_id: Some(FeeId::new(7)),
        amount: 500.0,
        payment_mode: PaymentMode::Cash,
        payment_date: fixture_date(2024, Month::August, 1),
        transaction_id: String::new(),
        cheque_number: String::new(),
        bank_name: String::new(),
        remarks: String::new(),
    }
}

fn signed_in() -> Session {
    let mut session = Session::anonymous();
    session.hydrate(
        SessionUser {
            id: UserId::new(1),
            email: "admin@school.test".to_owned(),
            name: "Admin".to_owned(),
            role: "admin".to_owned(),
        },
        "tok-123",
    );
    session
}

#[test]
fn unreachable_server_reports_remediation() {
    let client =
        Client::new("http://127.0.0.1:1/api/v1", Duration::from_millis(50)).expect("client");

    let error = client
        .list_admissions(&signed_in())
        .expect_err("nothing listens on port 1");
    assert!(matches!(error, ApiError::Transport { .. }));
    assert!(error.to_string().contains("cannot reach"));
}

#[test]
fn login_hydrates_session_from_envelope() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/v1/auth/login");
        assert_eq!(header(&request, "Authorization"), None);
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read body");
        assert!(body.contains(r#""email":"admin@school.test""#));
        let response = json_response(
            200,
            r#"{"success":true,"data":{"user":{"id":1,"email":"admin@school.test","name":"Admin","role":"admin"},"token":"tok-123"}}"#,
        );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = client.login("admin@school.test", "secret")?;
    assert!(session.is_authenticated());
    assert_eq!(session.user.as_ref().map(|user| user.role.as_str()), Some("admin"));
    assert_eq!(session.bearer().as_deref(), Some("Bearer tok-123"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_admissions_sends_bearer_and_unwraps_data() -> Result<()> {
    let (server, addr) = mock_server()?;
    let payload = serde_json::json!({ "success": true, "data": admissions() }).to_string();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/admissions");
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer tok-123")
        );
        request
            .respond(json_response(200, &payload))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let listed = client.list_admissions(&signed_in())?;
    assert_eq!(listed, admissions());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_queries_carry_only_set_parameters() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/students?class_id=3&status=active");
        request
            .respond(json_response(200, r#"{"data":[]}"#))
            .expect("response should succeed");

        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/fees/pending?academic_year=2024-2025");
        let body = r#"{"data":{"pending_fees":[{"id":7,"student_id":2,"total_amount":"1500.00","paid_amount":500,"pending_amount":"1000.00","status":"partial"}]}}"#;
        request
            .respond(json_response(200, body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();
    let students = client.list_students(
        &session,
        &StudentQuery {
            class_id: Some(3),
            status: Some("active".to_owned()),
            ..StudentQuery::default()
        },
    )?;
    assert!(students.items.is_empty());
    assert_eq!(students.pagination, None);

    let fees = client.list_pending_fees(
        &session,
        &FeeQuery {
            academic_year: Some("2024-2025".to_owned()),
            ..FeeQuery::default()
        },
    )?;
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0].total_amount, 1500.0);
    assert_eq!(fees[0].pending_amount, 1000.0);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unauthorized_response_maps_to_typed_error() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(401, r#"{"success":false,"message":"Token expired"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .list_exams(&signed_in())
        .expect_err("server rejects token");
    assert!(error.is_unauthorized());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn status_change_is_persisted_through_status_endpoint() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.url(), "/api/v1/admissions/5/status");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read body");
        assert_eq!(body, r#"{"status":"approved"}"#);
        request
            .respond(json_response(200, r#"{"success":true}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();
    let mut view = CollectionView::new();
    view.load(admissions());
    view.set_filter_path("status", "pending");

    let patch = AdmissionPatch {
        status: Some(AdmissionStatus::Approved),
        ..AdmissionPatch::default()
    };
    let mut server_side = RestResource::new(&client, &session);
    assert!(view.update_persisted(AdmissionId::new(5), &patch, &mut server_side)?);
    assert_eq!(view.visible_ids(), vec![AdmissionId::new(1)]);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn bulk_delete_stops_at_first_failure_and_restores_the_rest() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..2 {
            let request = server.recv().expect("request expected");
            assert_eq!(request.method(), &Method::Delete);
            seen.push(request.url().to_owned());
            let response = if request.url().ends_with("/4") {
                json_response(500, r#"{"success":false,"message":"Student has fee records"}"#)
            } else {
                json_response(200, r#"{"success":true}"#)
            };
            request.respond(response).expect("response should succeed");
        }
        seen
    });

    let mut faker = SchoolFaker::new(7);
    let students: Vec<Student> = (1..=5).map(|id| faker.student(id)).collect();
    let mut view = CollectionView::new();
    view.load(students);
    for id in [2, 4, 5] {
        view.toggle_selection(StudentId::new(id));
    }

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();
    let mut server_side = RestResource::new(&client, &session);
    let mut accept = |_: &str| true;
    let error = view
        .remove_selected_persisted(&mut accept, &mut server_side)
        .expect_err("second delete fails");

    assert!(format!("{error:#}").contains("Student has fee records"));
    assert_eq!(view.len(), 4);
    assert!(view.get(StudentId::new(2)).is_none());
    assert_eq!(
        view.selection().ids(),
        vec![StudentId::new(4), StudentId::new(5)]
    );

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen, vec!["/api/v1/students/2", "/api/v1/students/4"]);
    Ok(())
}

#[test]
fn unauthorized_delete_is_detectable_through_context() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(401, r#"{"message":"Not authorized"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();
    let mut view = CollectionView::new();
    view.load(admissions());
    let mut server_side = RestResource::new(&client, &session);
    let mut accept = |_: &str| true;
    let error = view
        .remove_persisted(AdmissionId::new(3), &mut accept, &mut server_side)
        .expect_err("token rejected");

    assert!(is_unauthorized(&error));
    assert!(view.get(AdmissionId::new(3)).is_some());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn paged_list_decodes_pagination() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/teachers?page=2&limit=2");
        let body = r#"{"success":true,"data":[],"pagination":{"page":2,"limit":2,"total":5,"pages":3}}"#;
        request
            .respond(json_response(200, body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let teachers = client.list_teachers(
        &signed_in(),
        &PageQuery {
            page: Some(2),
            limit: Some(2),
        },
    )?;
    let pagination = teachers.pagination.expect("server sent pagination");
    assert_eq!(
        pagination,
        Pagination {
            page: 2,
            limit: Some(2),
            total: 5,
            pages: 3,
        }
    );
    assert!(pagination.has_next());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn bad_credentials_keep_server_message() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(
                401,
                r#"{"success":false,"message":"Invalid credentials"}"#,
            ))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .login("admin@school.test", "wrong")
        .expect_err("credentials rejected");
    assert!(!error.is_unauthorized());
    assert_eq!(error.to_string(), "server error (401): Invalid credentials");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn profile_unwraps_current_user() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/v1/auth/me");
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer tok-123")
        );
        let body = r#"{"data":{"id":1,"email":"admin@school.test","name":"Admin","role":"admin"}}"#;
        request
            .respond(json_response(200, body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let user = client.profile(&signed_in())?;
    assert_eq!(user.name, "Admin");
    assert_eq!(user.role, "admin");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn valid_application_is_posted() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/v1/admissions");
        let body: serde_json::Value =
            serde_json::from_str(&body_of(&mut request)).expect("json body");
        assert_eq!(body["firstName"], "Asha");
        assert_eq!(body["dateOfBirth"], "2012-03-04");
        assert_eq!(body["gender"], "female");
        assert_eq!(body["gradeApplying"], 6);
        let created = r#"{"success":true,"data":{"id":9,"firstName":"Asha","lastName":"Rao","email":"asha.rao@example.com","gradeApplying":6,"status":"pending"}}"#;
        request
            .respond(json_response(201, created))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let created = client.create_admission(&signed_in(), &application())?;
    assert_eq!(created.id, AdmissionId::new(9));
    assert_eq!(created.status, AdmissionStatus::Pending);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn invalid_forms_send_no_request() -> Result<()> {
    let (server, addr) = mock_server()?;
    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();

    let mut form = application();
    form.grade_applying = Some(13);
    let error = client
        .create_admission(&session, &form)
        .expect_err("grade out of range");
    assert!(error.to_string().contains("out of range"));

    let mut payment = cash_payment();
    payment.payment_mode = PaymentMode::Cheque;
    let error = client
        .record_payment(&session, &payment)
        .expect_err("cheque needs a number");
    assert!(error.to_string().contains("cheque number is required"));

    assert!(server.try_recv()?.is_none());
    Ok(())
}

#[test]
fn valid_payment_is_posted() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/v1/fees/payment");
        let body: serde_json::Value =
            serde_json::from_str(&body_of(&mut request)).expect("json body");
        assert_eq!(body["student_id"], 2);
        assert_eq!(body["fee_id"], 7);
        assert_eq!(body["payment_mode"], "cash");
        assert_eq!(body["payment_date"], "2024-08-01");
        request
            .respond(json_response(201, r#"{"success":true}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    client.record_payment(&signed_in(), &cash_payment())?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn combined_admission_patch_sends_no_request() -> Result<()> {
    let (server, addr) = mock_server()?;
    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = signed_in();
    let mut view = CollectionView::new();
    view.load(admissions());
    let before = view.records().to_vec();

    let patch = AdmissionPatch {
        status: Some(AdmissionStatus::Approved),
        grade_applying: Some(10),
    };
    let mut server_side = RestResource::new(&client, &session);
    let error = view
        .update_persisted(AdmissionId::new(1), &patch, &mut server_side)
        .expect_err("status and grade go separately");
    assert!(format!("{error:#}").contains("separately"));
    assert_eq!(view.records(), before.as_slice());
    assert!(server.try_recv()?.is_none());
    Ok(())
}
