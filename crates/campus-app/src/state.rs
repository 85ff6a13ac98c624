// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ScreenKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_screen: ScreenKind,
    pub signed_in: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_screen: ScreenKind::Admissions,
            signed_in: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    OpenScreen(ScreenKind),
    SignedIn(String),
    SessionExpired,
    Notify(String),
    ReportFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenChanged(ScreenKind),
    SessionChanged(bool),
    StatusUpdated(String),
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::OpenScreen(screen) => {
                if self.active_screen == screen {
                    return Vec::new();
                }
                self.active_screen = screen;
                vec![AppEvent::ScreenChanged(screen)]
            }
            AppCommand::SignedIn(name) => {
                self.signed_in = true;
                vec![
                    AppEvent::SessionChanged(true),
                    self.set_status(&format!("signed in as {name}")),
                ]
            }
            AppCommand::SessionExpired => {
                self.signed_in = false;
                vec![
                    AppEvent::SessionChanged(false),
                    self.set_status("session expired -- sign in again with --login"),
                ]
            }
            AppCommand::Notify(message) => vec![self.set_status(&message)],
            AppCommand::ReportFailure(message) => {
                vec![self.set_status(&format!("error: {message}"))]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::ScreenKind;

    #[test]
    fn opening_active_screen_emits_nothing() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::OpenScreen(ScreenKind::Admissions)).is_empty());
        assert_eq!(
            state.dispatch(AppCommand::OpenScreen(ScreenKind::Results)),
            vec![AppEvent::ScreenChanged(ScreenKind::Results)]
        );
    }

    #[test]
    fn session_expiry_signs_out_with_status() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SignedIn("Admin".to_owned()));
        assert!(state.signed_in);

        let events = state.dispatch(AppCommand::SessionExpired);
        assert!(!state.signed_in);
        assert_eq!(
            events,
            vec![
                AppEvent::SessionChanged(false),
                AppEvent::StatusUpdated("session expired -- sign in again with --login".to_owned()),
            ]
        );
    }

    #[test]
    fn failure_replaces_status_line() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Notify("3 applications".to_owned()));
        state.dispatch(AppCommand::ReportFailure("delete failed".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("error: delete failed"));
    }
}
