// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Optimistic mutations.
//!
//! Every server-backed change is applied locally first and produces a token
//! holding what is needed to undo it. The caller either commits the token
//! once the server accepts the change or hands it back to the view to revert.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::{CollectionView, Confirm, Record};

/// Server side of a collection. Implementations issue the network calls;
/// the view handles local state.
pub trait Persistence<R: Record> {
    fn persist_update(&mut self, id: R::Id, patch: &R::Patch) -> Result<()>;

    fn persist_delete(&mut self, id: R::Id) -> Result<()>;

    /// Deletes in order and stops at the first failure. The failure carries
    /// the ids the server already removed.
    fn persist_bulk_delete(&mut self, ids: &[R::Id]) -> Result<(), BulkDeleteFailure<R::Id>> {
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            if let Err(error) = self.persist_delete(*id) {
                return Err(BulkDeleteFailure { deleted, error });
            }
            deleted.push(*id);
        }
        Ok(())
    }
}

/// A bulk delete that stopped part way.
#[derive(Debug)]
pub struct BulkDeleteFailure<Id> {
    /// Ids removed on the server before the failure.
    pub deleted: Vec<Id>,
    pub error: anyhow::Error,
}

#[must_use = "commit the update once persisted or pass it to revert_update"]
#[derive(Debug)]
pub struct PendingUpdate<R: Record> {
    previous: R,
}

impl<R: Record> PendingUpdate<R> {
    pub fn id(&self) -> R::Id {
        self.previous.id()
    }

    pub fn previous(&self) -> &R {
        &self.previous
    }

    pub fn commit(self) {}
}

#[must_use = "commit the removal once persisted or pass it to revert_removal"]
#[derive(Debug)]
pub struct PendingRemoval<R: Record> {
    removed: Vec<(usize, R)>,
    selected: Vec<R::Id>,
}

impl<R: Record> PendingRemoval<R> {
    /// Removed ids in their original raw order.
    pub fn ids(&self) -> Vec<R::Id> {
        self.removed.iter().map(|(_, record)| record.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn commit(self) {}

    /// Drops `persisted` ids so a later revert restores only the rest.
    /// Positions of the remaining entries shift down past the dropped ones.
    fn forget(&mut self, persisted: &[R::Id]) {
        let mut dropped = 0;
        self.removed = std::mem::take(&mut self.removed)
            .into_iter()
            .filter_map(|(index, record)| {
                if persisted.contains(&record.id()) {
                    dropped += 1;
                    None
                } else {
                    Some((index - dropped, record))
                }
            })
            .collect();
        self.selected.retain(|id| !persisted.contains(id));
    }
}

impl<R: Record> CollectionView<R> {
    /// Applies `patch` locally. `None` when `id` is not loaded.
    pub fn begin_update(&mut self, id: R::Id, patch: &R::Patch) -> Option<PendingUpdate<R>> {
        let index = self.position(id)?;
        let previous = self.records[index].clone();
        self.records[index].apply_patch(patch);
        self.recompute();
        Some(PendingUpdate { previous })
    }

    /// Restores the record captured by `pending`. Returns false when the
    /// record was removed in the meantime.
    pub fn revert_update(&mut self, pending: PendingUpdate<R>) -> bool {
        let Some(index) = self.position(pending.id()) else {
            return false;
        };
        self.records[index] = pending.previous;
        self.recompute();
        true
    }

    /// Removes every loaded record named in `ids`, remembering positions and
    /// selection so the removal can be undone.
    pub fn begin_removal(&mut self, ids: &[R::Id]) -> PendingRemoval<R> {
        let targets: BTreeSet<R::Id> = ids.iter().copied().collect();
        let selected: Vec<R::Id> = targets
            .iter()
            .copied()
            .filter(|id| self.state.selection.contains(*id))
            .collect();

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.records.len());
        for (index, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if targets.contains(&record.id()) {
                removed.push((index, record));
            } else {
                kept.push(record);
            }
        }
        self.records = kept;
        self.recompute();

        PendingRemoval { removed, selected }
    }

    /// Reinserts removed records at their original positions and restores
    /// their selection. Records reloaded meanwhile are not duplicated.
    pub fn revert_removal(&mut self, pending: PendingRemoval<R>) {
        for (index, record) in pending.removed {
            if self.position(record.id()).is_some() {
                continue;
            }
            let index = index.min(self.records.len());
            self.records.insert(index, record);
        }
        for id in pending.selected {
            if self.position(id).is_some() {
                self.state.selection.insert(id);
            }
        }
        self.recompute();
    }

    /// Applies locally, persists, and reverts when persistence fails.
    /// `Ok(false)` when `id` is not loaded.
    pub fn update_persisted<P>(
        &mut self,
        id: R::Id,
        patch: &R::Patch,
        persistence: &mut P,
    ) -> Result<bool>
    where
        P: Persistence<R> + ?Sized,
    {
        let Some(pending) = self.begin_update(id, patch) else {
            debug!(kind = R::PLURAL, %id, "update skipped; record not loaded");
            return Ok(false);
        };
        match persistence.persist_update(id, patch) {
            Ok(()) => {
                pending.commit();
                Ok(true)
            }
            Err(error) => {
                warn!(kind = R::PLURAL, %id, "update rejected; reverting");
                self.revert_update(pending);
                Err(error).with_context(|| format!("update {} {id}", R::SINGULAR))
            }
        }
    }

    /// Deletes one record after confirmation. `Ok(false)` when the record is
    /// not loaded or the confirmation was refused.
    pub fn remove_persisted<C, P>(
        &mut self,
        id: R::Id,
        confirm: &mut C,
        persistence: &mut P,
    ) -> Result<bool>
    where
        C: Confirm + ?Sized,
        P: Persistence<R> + ?Sized,
    {
        if self.position(id).is_none() {
            return Ok(false);
        }
        let prompt = format!("Are you sure you want to delete this {}?", R::SINGULAR);
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }

        let pending = self.begin_removal(&[id]);
        match persistence.persist_delete(id) {
            Ok(()) => {
                pending.commit();
                Ok(true)
            }
            Err(error) => {
                warn!(kind = R::PLURAL, %id, "delete rejected; reverting");
                self.revert_removal(pending);
                Err(error).with_context(|| format!("delete {} {id}", R::SINGULAR))
            }
        }
    }

    /// Deletes every selected record after one confirmation. Returns the
    /// deleted ids. When the server fails part way, records it already
    /// deleted stay removed and the rest of the batch is restored, so the
    /// view matches the server.
    pub fn remove_selected_persisted<C, P>(
        &mut self,
        confirm: &mut C,
        persistence: &mut P,
    ) -> Result<Vec<R::Id>>
    where
        C: Confirm + ?Sized,
        P: Persistence<R> + ?Sized,
    {
        let Some(ids) = self.state.selection.bulk_remove(R::PLURAL, confirm) else {
            return Ok(Vec::new());
        };

        let mut pending = self.begin_removal(&ids);
        pending.selected.clone_from(&ids);
        match persistence.persist_bulk_delete(&ids) {
            Ok(()) => {
                debug!(kind = R::PLURAL, count = ids.len(), "bulk delete persisted");
                pending.commit();
                Ok(ids)
            }
            Err(BulkDeleteFailure { deleted, error }) => {
                warn!(
                    kind = R::PLURAL,
                    count = ids.len(),
                    deleted = deleted.len(),
                    "bulk delete stopped; restoring the rest"
                );
                pending.forget(&deleted);
                self.revert_removal(pending);
                Err(error).with_context(|| {
                    format!(
                        "delete {} {} ({} deleted before the failure)",
                        ids.len(),
                        R::PLURAL,
                        deleted.len()
                    )
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Persistence;
    use crate::{
        Admission, AdmissionId, AdmissionPatch, AdmissionStatus, CollectionView,
    };
    use anyhow::{Result, bail};

    #[derive(Default)]
    struct Recorder {
        updates: Vec<AdmissionId>,
        deletes: Vec<AdmissionId>,
        fail_on: Option<AdmissionId>,
    }

    impl Persistence<Admission> for Recorder {
        fn persist_update(&mut self, id: AdmissionId, _: &AdmissionPatch) -> Result<()> {
            if self.fail_on == Some(id) {
                bail!("server said no");
            }
            self.updates.push(id);
            Ok(())
        }

        fn persist_delete(&mut self, id: AdmissionId) -> Result<()> {
            if self.fail_on == Some(id) {
                bail!("server said no");
            }
            self.deletes.push(id);
            Ok(())
        }
    }

    fn admission(id: i64, status: AdmissionStatus) -> Admission {
        Admission {
            id: AdmissionId::new(id),
            first_name: format!("First{id}"),
            last_name: "Last".to_owned(),
            email: format!("s{id}@example.com"),
            grade_applying: Some(9),
            status,
            applied_date: None,
            guardian_name: String::new(),
            phone: String::new(),
        }
    }

    fn view() -> CollectionView<Admission> {
        let mut view = CollectionView::new();
        view.load((1..=4).map(|id| admission(id, AdmissionStatus::Pending)).collect());
        view
    }

    fn approve() -> AdmissionPatch {
        AdmissionPatch {
            status: Some(AdmissionStatus::Approved),
            ..AdmissionPatch::default()
        }
    }

    #[test]
    fn revert_update_restores_previous_record() {
        let mut view = view();
        let before = view.records().to_vec();
        let pending = view
            .begin_update(AdmissionId::new(2), &approve())
            .expect("record is loaded");
        assert_eq!(
            view.get(AdmissionId::new(2)).map(|r| r.status),
            Some(AdmissionStatus::Approved)
        );
        assert!(view.revert_update(pending));
        assert_eq!(view.records(), before.as_slice());
    }

    #[test]
    fn revert_update_after_removal_is_noop() {
        let mut view = view();
        let pending = view
            .begin_update(AdmissionId::new(2), &approve())
            .expect("record is loaded");
        view.remove_record(AdmissionId::new(2));
        assert!(!view.revert_update(pending));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn revert_removal_restores_positions_and_selection() {
        let mut view = view();
        view.toggle_selection(AdmissionId::new(2));
        view.toggle_selection(AdmissionId::new(4));
        let before = view.records().to_vec();

        let pending = view.begin_removal(&[AdmissionId::new(4), AdmissionId::new(2)]);
        assert_eq!(pending.ids(), vec![AdmissionId::new(2), AdmissionId::new(4)]);
        assert_eq!(view.len(), 2);
        assert!(view.selection().is_empty());

        view.revert_removal(pending);
        assert_eq!(view.records(), before.as_slice());
        assert_eq!(
            view.selection().ids(),
            vec![AdmissionId::new(2), AdmissionId::new(4)]
        );
    }

    #[test]
    fn update_persisted_keeps_change_on_success() {
        let mut view = view();
        let mut server = Recorder::default();
        let updated = view
            .update_persisted(AdmissionId::new(1), &approve(), &mut server)
            .expect("update succeeds");
        assert!(updated);
        assert_eq!(server.updates, vec![AdmissionId::new(1)]);
        assert_eq!(
            view.get(AdmissionId::new(1)).map(|r| r.status),
            Some(AdmissionStatus::Approved)
        );
    }

    #[test]
    fn update_persisted_reverts_on_failure() {
        let mut view = view();
        let before = view.records().to_vec();
        let mut server = Recorder {
            fail_on: Some(AdmissionId::new(1)),
            ..Recorder::default()
        };
        let error = view
            .update_persisted(AdmissionId::new(1), &approve(), &mut server)
            .expect_err("update fails");
        assert!(format!("{error:#}").contains("server said no"));
        assert_eq!(view.records(), before.as_slice());
    }

    #[test]
    fn update_persisted_for_missing_record_skips_server() {
        let mut view = view();
        let mut server = Recorder::default();
        let updated = view
            .update_persisted(AdmissionId::new(99), &approve(), &mut server)
            .expect("no-op");
        assert!(!updated);
        assert!(server.updates.is_empty());
    }

    #[test]
    fn remove_persisted_refused_changes_nothing() {
        let mut view = view();
        let mut server = Recorder::default();
        let mut prompts = Vec::new();
        let mut refuse = |prompt: &str| {
            prompts.push(prompt.to_owned());
            false
        };
        let removed = view
            .remove_persisted(AdmissionId::new(3), &mut refuse, &mut server)
            .expect("refusal is not an error");
        assert!(!removed);
        assert_eq!(view.len(), 4);
        assert!(server.deletes.is_empty());
        assert_eq!(
            prompts,
            vec!["Are you sure you want to delete this application?".to_owned()]
        );
    }

    #[test]
    fn bulk_delete_failure_keeps_what_the_server_deleted() {
        let mut view = view();
        view.select_all_visible();
        let mut server = Recorder {
            fail_on: Some(AdmissionId::new(3)),
            ..Recorder::default()
        };
        let mut accept = |_: &str| true;

        let error = view
            .remove_selected_persisted(&mut accept, &mut server)
            .expect_err("third delete fails");
        assert!(
            format!("{error:#}")
                .starts_with("delete 4 applications (2 deleted before the failure)")
        );
        assert_eq!(server.deletes, vec![AdmissionId::new(1), AdmissionId::new(2)]);
        let remaining: Vec<AdmissionId> = view.records().iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![AdmissionId::new(3), AdmissionId::new(4)]);
        assert_eq!(
            view.selection().ids(),
            vec![AdmissionId::new(3), AdmissionId::new(4)]
        );
    }

    #[test]
    fn forget_shifts_positions_of_restored_records() {
        let mut view = view();
        let mut pending = view.begin_removal(&[AdmissionId::new(1), AdmissionId::new(3)]);
        pending.forget(&[AdmissionId::new(1)]);
        view.revert_removal(pending);
        let ids: Vec<AdmissionId> = view.records().iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![AdmissionId::new(2), AdmissionId::new(3), AdmissionId::new(4)]
        );
    }

    #[test]
    fn bulk_delete_success_clears_selection() {
        let mut view = view();
        view.toggle_selection(AdmissionId::new(1));
        view.toggle_selection(AdmissionId::new(3));
        let mut server = Recorder::default();
        let mut accept = |_: &str| true;

        let deleted = view
            .remove_selected_persisted(&mut accept, &mut server)
            .expect("bulk delete succeeds");
        assert_eq!(deleted, vec![AdmissionId::new(1), AdmissionId::new(3)]);
        assert!(view.selection().is_empty());
        assert_eq!(view.len(), 2);
    }
}
