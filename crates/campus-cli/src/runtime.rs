// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use campus_api::{
    ApiError, Client, FeeQuery, PageQuery, Paged, Pagination, Resource, RestResource,
    StudentQuery, is_unauthorized,
};
use campus_app::{
    Admission, AdmissionId, AdmissionPatch, AdmissionStatus, AppCommand, AppState,
    CollectionView, Confirm, ExamResult, Field, PendingFee, Persistence, Record, ResultStats,
    ScreenKind, Session, ViewMode,
};
use campus_testkit::{SchoolFaker, admissions, exam_results, pending_fees};
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEMO_SEED: u64 = 2024;
const DEMO_ROWS: i64 = 12;

/// Session persisted between invocations as JSON.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read session file {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| {
            format!(
                "parse session file {} -- run `campus --logout` to reset it",
                self.path.display()
            )
        })
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create session directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session).context("encode session")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write session file {}", self.path.display()))
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error)
                .with_context(|| format!("remove session file {}", self.path.display())),
        }
    }
}

/// What the user asked to see and change on one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub sorts: Vec<String>,
    pub view_mode: ViewMode,
    pub page: Option<u32>,
    pub set_status: Option<(i64, String)>,
    pub delete: Vec<i64>,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self {
            search: None,
            filters: Vec::new(),
            sorts: Vec::new(),
            view_mode: ViewMode::Table,
            page: None,
            set_status: None,
            delete: Vec::new(),
        }
    }
}

pub enum Backend {
    Demo,
    Api {
        client: Client,
        session: Session,
        store: SessionStore,
    },
}

/// Accepts every change; demo data lives only for one invocation.
struct DemoServer;

impl<R: Record> Persistence<R> for DemoServer {
    fn persist_update(&mut self, id: R::Id, _: &R::Patch) -> Result<()> {
        debug!(kind = R::SINGULAR, %id, "demo update accepted");
        Ok(())
    }

    fn persist_delete(&mut self, id: R::Id) -> Result<()> {
        debug!(kind = R::SINGULAR, %id, "demo delete accepted");
        Ok(())
    }
}

pub struct Runtime {
    state: AppState,
    backend: Backend,
    page_size: u32,
}

impl Runtime {
    pub fn new(backend: Backend, page_size: u32) -> Self {
        let signed_in = match &backend {
            Backend::Demo => true,
            Backend::Api { session, .. } => session.is_authenticated(),
        };
        Self {
            state: AppState {
                signed_in,
                ..AppState::default()
            },
            backend,
            page_size,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let Backend::Api {
            client,
            session,
            store,
        } = &mut self.backend
        else {
            bail!("--login talks to the API; drop --demo");
        };
        *session = client
            .login(email, password)
            .with_context(|| format!("sign in as {email}"))?;
        store.save(session)?;
        let name = session
            .user
            .as_ref()
            .map_or_else(|| email.to_owned(), |user| user.name.clone());
        info!(email, "session stored");
        self.state.dispatch(AppCommand::SignedIn(name));
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Backend::Api { session, store, .. } = &mut self.backend {
            session.clear();
            store.clear()?;
        }
        self.state.signed_in = false;
        self.state
            .dispatch(AppCommand::Notify("signed out".to_owned()));
        Ok(())
    }

    /// Loads one screen, applies the request, and renders the projection.
    pub fn show(
        &mut self,
        screen: ScreenKind,
        request: &ViewRequest,
        confirm: &mut dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<()> {
        self.state.dispatch(AppCommand::OpenScreen(screen));
        if let Backend::Api { session, .. } = &self.backend
            && !session.is_authenticated()
        {
            bail!("not signed in -- run `campus --login EMAIL PASSWORD` or use --demo");
        }
        if request.set_status.is_some() && screen != ScreenKind::Admissions {
            bail!("--set-status only applies to the admissions screen");
        }
        if request.page.is_some() && !matches!(screen, ScreenKind::Students | ScreenKind::Teachers)
        {
            bail!("--page only applies to the students and teachers screens");
        }

        let result = self.show_screen(screen, request, confirm, out);
        match result {
            Ok(notes) => {
                if let Some(note) = notes.last() {
                    self.state.dispatch(AppCommand::Notify(note.clone()));
                }
                Ok(())
            }
            Err(error) => {
                if is_unauthorized(&error) {
                    self.expire_session()?;
                } else {
                    self.state
                        .dispatch(AppCommand::ReportFailure(format!("{error:#}")));
                }
                Err(error)
            }
        }
    }

    fn show_screen(
        &mut self,
        screen: ScreenKind,
        request: &ViewRequest,
        confirm: &mut dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<Vec<String>> {
        let page = request.page.unwrap_or(1);
        match screen {
            ScreenKind::Students => {
                let query = StudentQuery {
                    page: Some(page),
                    limit: Some(self.page_size),
                    ..StudentQuery::default()
                };
                let paged = self.fetch_page(
                    |client, session| client.list_students(session, &query),
                    page,
                    || demo_rows(SchoolFaker::student),
                )?;
                self.present(paged.items, request, None, paged.pagination, confirm, out)
                    .map(|(_, notes)| notes)
            }
            ScreenKind::Teachers => {
                let query = PageQuery {
                    page: Some(page),
                    limit: Some(self.page_size),
                };
                let paged = self.fetch_page(
                    |client, session| client.list_teachers(session, &query),
                    page,
                    || demo_rows(SchoolFaker::teacher),
                )?;
                self.present(paged.items, request, None, paged.pagination, confirm, out)
                    .map(|(_, notes)| notes)
            }
            ScreenKind::Admissions => {
                let patch = request
                    .set_status
                    .as_ref()
                    .map(|(id, raw)| status_patch(*id, raw))
                    .transpose()?;
                let records: Vec<Admission> = self.fetch(
                    |client, session| client.list_admissions(session),
                    admissions,
                )?;
                self.present(records, request, patch, None, confirm, out)
                    .map(|(_, notes)| notes)
            }
            ScreenKind::Exams => {
                let records = self.fetch(
                    |client, session| client.list_exams(session),
                    || demo_rows(SchoolFaker::exam),
                )?;
                self.present(records, request, None, None, confirm, out)
                    .map(|(_, notes)| notes)
            }
            ScreenKind::Results => {
                let records: Vec<ExamResult> = self.fetch(
                    |client, session| client.list_results(session),
                    exam_results,
                )?;
                let (view, notes) = self.present(records, request, None, None, confirm, out)?;
                render_stats(ResultStats::compute(view.visible()), out)?;
                Ok(notes)
            }
            ScreenKind::Fees => {
                let records: Vec<PendingFee> = self.fetch(
                    |client, session| client.list_pending_fees(session, &FeeQuery::default()),
                    pending_fees,
                )?;
                self.present(records, request, None, None, confirm, out)
                    .map(|(_, notes)| notes)
            }
        }
    }

    fn fetch<R>(
        &self,
        api: impl FnOnce(&Client, &Session) -> Result<Vec<R>, ApiError>,
        demo: impl FnOnce() -> Vec<R>,
    ) -> Result<Vec<R>>
    where
        R: Record,
    {
        let records = match &self.backend {
            Backend::Demo => demo(),
            Backend::Api {
                client, session, ..
            } => api(client, session).with_context(|| format!("load {}", R::PLURAL))?,
        };
        debug!(kind = R::PLURAL, count = records.len(), "loaded");
        Ok(records)
    }

    /// Like `fetch` for server-paginated lists. Demo rows are paged locally.
    fn fetch_page<R>(
        &self,
        api: impl FnOnce(&Client, &Session) -> Result<Paged<R>, ApiError>,
        page: u32,
        demo: impl FnOnce() -> Vec<R>,
    ) -> Result<Paged<R>>
    where
        R: Record,
    {
        let paged = match &self.backend {
            Backend::Demo => demo_page(demo(), page, self.page_size),
            Backend::Api {
                client, session, ..
            } => api(client, session)
                .with_context(|| format!("load {} page {page}", R::PLURAL))?,
        };
        debug!(
            kind = R::PLURAL,
            page,
            count = paged.items.len(),
            "loaded page"
        );
        Ok(paged)
    }

    fn present<R>(
        &self,
        records: Vec<R>,
        request: &ViewRequest,
        patch: Option<(R::Id, R::Patch)>,
        pagination: Option<Pagination>,
        confirm: &mut dyn Confirm,
        out: &mut dyn Write,
    ) -> Result<(CollectionView<R>, Vec<String>)>
    where
        R: Resource,
        R::Id: From<i64>,
    {
        let mut view = CollectionView::new().with_view_mode(request.view_mode);
        view.load(records);
        apply_request(&mut view, request)?;

        let notes = match &self.backend {
            Backend::Demo => mutate(&mut view, request, patch, &mut DemoServer, confirm)?,
            Backend::Api {
                client, session, ..
            } => {
                let mut server = RestResource::new(client, session);
                mutate(&mut view, request, patch, &mut server, confirm)?
            }
        };

        render(&view, pagination.as_ref(), out)?;
        Ok((view, notes))
    }

    fn expire_session(&mut self) -> Result<()> {
        if let Backend::Api { session, store, .. } = &mut self.backend {
            session.clear();
            store.clear()?;
        }
        self.state.dispatch(AppCommand::SessionExpired);
        Ok(())
    }
}

fn demo_rows<R>(make: fn(&mut SchoolFaker, i64) -> R) -> Vec<R> {
    let mut faker = SchoolFaker::new(DEMO_SEED);
    (1..=DEMO_ROWS).map(|id| make(&mut faker, id)).collect()
}

fn demo_page<R>(rows: Vec<R>, page: u32, limit: u32) -> Paged<R> {
    let limit = limit.max(1);
    let total = rows.len() as u64;
    let pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
    let skip = page.saturating_sub(1) as usize * limit as usize;
    Paged {
        items: rows.into_iter().skip(skip).take(limit as usize).collect(),
        pagination: Some(Pagination {
            page,
            limit: Some(limit),
            total,
            pages,
        }),
    }
}

fn status_patch(id: i64, raw: &str) -> Result<(AdmissionId, AdmissionPatch)> {
    let status = AdmissionStatus::parse(raw).ok_or_else(|| {
        let valid: Vec<&str> = AdmissionStatus::ALL
            .iter()
            .map(|status| status.as_str())
            .collect();
        anyhow!("unknown admission status {raw:?}; use one of: {}", valid.join(", "))
    })?;
    Ok((
        AdmissionId::new(id),
        AdmissionPatch {
            status: Some(status),
            ..AdmissionPatch::default()
        },
    ))
}

pub fn apply_request<R: Record>(view: &mut CollectionView<R>, request: &ViewRequest) -> Result<()> {
    if let Some(term) = &request.search {
        view.set_search_term(term.as_str());
    }
    for (path, value) in &request.filters {
        if !view.set_filter_path(path, value) {
            bail!(
                "unknown {} field {path:?}; use one of: {}",
                R::SINGULAR,
                field_paths::<R>()
            );
        }
    }
    for path in &request.sorts {
        if !view.set_sort_path(path) {
            bail!(
                "cannot sort {} by {path:?}; use one of: {}",
                R::PLURAL,
                field_paths::<R>()
            );
        }
    }
    Ok(())
}

fn field_paths<R: Record>() -> String {
    R::Field::ALL
        .iter()
        .map(|field| field.path())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs the requested status change and deletions through the two-phase
/// operations. Returns one note per completed change.
pub fn mutate<R, P>(
    view: &mut CollectionView<R>,
    request: &ViewRequest,
    patch: Option<(R::Id, R::Patch)>,
    server: &mut P,
    confirm: &mut dyn Confirm,
) -> Result<Vec<String>>
where
    R: Record,
    R::Id: From<i64>,
    P: Persistence<R> + ?Sized,
{
    let mut notes = Vec::new();

    if let Some((id, patch)) = patch {
        if !view.update_persisted(id, &patch, server)? {
            bail!("no {} with id {id} is loaded", R::SINGULAR);
        }
        notes.push(format!("updated {} {id}", R::SINGULAR));
    }

    let mut seen = BTreeSet::new();
    let ids: Vec<R::Id> = request
        .delete
        .iter()
        .map(|raw| R::Id::from(*raw))
        .filter(|id| seen.insert(*id))
        .collect();

    match ids.as_slice() {
        [] => {}
        [id] => {
            if view.get(*id).is_none() {
                bail!("no {} with id {id} is loaded", R::SINGULAR);
            }
            if view.remove_persisted(*id, confirm, server)? {
                notes.push(format!("deleted {} {id}", R::SINGULAR));
            } else {
                notes.push(format!("kept {} {id}", R::SINGULAR));
            }
        }
        many => {
            view.clear_selection();
            for id in many {
                if !view.toggle_selection(*id) {
                    bail!(
                        "{} {id} is not in the current view -- adjust --search or --filter",
                        R::SINGULAR
                    );
                }
            }
            let deleted = view.remove_selected_persisted(confirm, server)?;
            if deleted.is_empty() {
                view.clear_selection();
                notes.push(format!("kept {} {}", many.len(), R::PLURAL));
            } else {
                notes.push(format!("deleted {} {}", deleted.len(), R::PLURAL));
            }
        }
    }

    Ok(notes)
}

pub fn render<R: Record>(
    view: &CollectionView<R>,
    pagination: Option<&Pagination>,
    out: &mut dyn Write,
) -> Result<()> {
    match view.view_mode() {
        ViewMode::Table => render_table(view, out)?,
        ViewMode::Grid => render_grid(view, out)?,
    }

    let mut footer = format!("{} of {} {}", view.visible_len(), view.len(), R::PLURAL);
    if let Some(page) = pagination {
        footer.push_str(&format!(
            ", page {} of {} ({} in total)",
            page.page, page.pages, page.total
        ));
    }
    if let Some(sort) = view.sort() {
        footer.push_str(&format!(
            ", sorted by {} {}",
            sort.key.label(),
            sort.direction.arrow()
        ));
    }
    writeln!(out, "{footer}")?;
    if let Some(page) = pagination
        && page.has_next()
    {
        writeln!(out, "more on the server -- pass --page {}", page.page + 1)?;
    }
    Ok(())
}

fn cell<R: Record>(record: &R, field: R::Field) -> String {
    record
        .field(field)
        .map_or_else(|| "-".to_owned(), |value| value.display())
}

fn render_table<R: Record>(view: &CollectionView<R>, out: &mut dyn Write) -> Result<()> {
    let fields = R::Field::ALL;
    let rows: Vec<Vec<String>> = view
        .visible()
        .into_iter()
        .map(|record| fields.iter().map(|field| cell(record, *field)).collect())
        .collect();

    let mut widths: Vec<usize> = fields.iter().map(|field| field.label().len()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let header: Vec<String> = fields
        .iter()
        .zip(&widths)
        .map(|(field, width)| format!("{:<width$}", field.label()))
        .collect();
    writeln!(out, "{}", header.join("  ").trim_end())?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("  "))?;

    for row in rows {
        let padded: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        writeln!(out, "{}", padded.join("  ").trim_end())?;
    }
    Ok(())
}

fn render_grid<R: Record>(view: &CollectionView<R>, out: &mut dyn Write) -> Result<()> {
    let fields = R::Field::ALL;
    let label_width = fields
        .iter()
        .map(|field| field.label().len())
        .max()
        .unwrap_or(0);
    for record in view.visible() {
        writeln!(out, "[{} {}]", R::SINGULAR, record.id())?;
        for field in fields {
            writeln!(
                out,
                "  {:<label_width$}  {}",
                field.label(),
                cell(record, *field)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_stats(stats: Option<ResultStats>, out: &mut dyn Write) -> Result<()> {
    let Some(stats) = stats else {
        return Ok(());
    };
    writeln!(
        out,
        "passed {}/{} ({:.1}%), average {:.1}%, highest {:.1}%, lowest {:.1}%",
        stats.passed,
        stats.total,
        stats.pass_rate(),
        stats.average_percentage,
        stats.highest_percentage,
        stats.lowest_percentage,
    )?;
    Ok(())
}

/// Asks on stderr and reads the answer from stdin. Anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
