// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dialog state machine.
//
// Every user interaction is a `DialogAction`; `reduce` maps the current state
// and one action to the next state without side effects.  Network work lives
// in `uprint-graph`, which feeds its results back in as actions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    ColorMode, Document, IntegerRange, Orientation, PrintConfiguration, PrinterCapabilities,
    PrinterDefaults, PrinterShare,
};

/// Progress of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintingState {
    /// Loading printer shares.
    Initialization,
    /// User is choosing a printer, file, and settings.
    Configuration,
    /// Job submission in flight.
    Submitting,
    /// Job was started.
    Success,
    /// Loading or submission failed.
    Failure,
}

/// File picked by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Choices offered for the selected printer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterSettings {
    pub copies: Option<IntegerRange>,
    pub orientations: Vec<Orientation>,
    pub color_modes: Vec<ColorMode>,
}

impl From<&PrinterCapabilities> for PrinterSettings {
    fn from(caps: &PrinterCapabilities) -> Self {
        Self {
            copies: caps.copies_per_job,
            orientations: caps.orientations.clone(),
            color_modes: caps.color_modes.clone(),
        }
    }
}

/// The user's current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedConfig {
    pub printer: Option<String>,
    pub copies: Option<u32>,
    pub orientation: Option<Orientation>,
    pub color_mode: Option<ColorMode>,
    pub document: Option<Document>,
}

impl SelectedConfig {
    fn seeded(printer_id: &str, defaults: &PrinterDefaults, document: Option<Document>) -> Self {
        Self {
            printer: Some(printer_id.to_owned()),
            copies: defaults.copies_per_job,
            orientation: defaults.orientation,
            color_mode: defaults.color_mode,
            document,
        }
    }

    /// Job settings derived from the selection; one copy unless chosen.
    pub fn document_configuration(&self) -> PrintConfiguration {
        PrintConfiguration {
            copies: Some(self.copies.unwrap_or(1)),
            orientation: self.orientation,
            color_mode: self.color_mode,
        }
    }
}

/// Whole dialog state.
#[derive(Debug, Clone)]
pub struct PrintDialogState {
    pub printing_state: PrintingState,
    /// Shares sorted by display name.
    pub printers: Vec<PrinterShare>,
    pub settings: PrinterSettings,
    pub selected: SelectedConfig,
    pub error: Option<String>,
}

impl Default for PrintDialogState {
    fn default() -> Self {
        Self {
            printing_state: PrintingState::Initialization,
            printers: Vec::new(),
            settings: PrinterSettings::default(),
            selected: SelectedConfig::default(),
            error: None,
        }
    }
}

impl PrintDialogState {
    /// Whether the current selection may be submitted.
    pub fn ready_to_submit(&self) -> bool {
        self.printing_state == PrintingState::Configuration
            && self.error.is_none()
            && self.selected.printer.is_some()
            && self.selected.document.is_some()
    }
}

/// Everything that can happen to the dialog.
#[derive(Debug, Clone)]
pub enum DialogAction {
    /// Printer shares arrived from Graph.
    SharesLoaded(Vec<PrinterShare>),
    /// Printer shares could not be loaded.
    LoadFailed(String),
    ChangeState(PrintingState),
    /// Select a share by id.
    ChangePrinter(String),
    SelectFile(SelectedFile),
    ChangeCopies(u32),
    ChangeOrientation(Orientation),
    ChangeColorMode(ColorMode),
    UpdateError(String),
}

/// Pure state transition.
pub fn reduce(state: PrintDialogState, action: DialogAction) -> PrintDialogState {
    debug!(action = action_kind(&action), "dialog action");
    match action {
        DialogAction::SharesLoaded(mut shares) => {
            shares.sort_by(|a, b| a.display_name.cmp(&b.display_name));
            match shares.first() {
                Some(first) => PrintDialogState {
                    printing_state: PrintingState::Configuration,
                    settings: PrinterSettings::from(&first.capabilities),
                    selected: SelectedConfig::seeded(&first.id, &first.defaults, None),
                    error: None,
                    printers: shares,
                },
                None => PrintDialogState {
                    printing_state: PrintingState::Failure,
                    error: Some("No printers are shared with you.".into()),
                    ..PrintDialogState::default()
                },
            }
        }

        DialogAction::LoadFailed(message) => PrintDialogState {
            printing_state: PrintingState::Failure,
            error: Some(message),
            ..PrintDialogState::default()
        },

        DialogAction::ChangeState(next) => PrintDialogState {
            printing_state: next,
            error: if next == PrintingState::Submitting {
                None
            } else {
                state.error
            },
            ..state
        },

        DialogAction::ChangePrinter(id) => {
            let found = state.printers.iter().find(|s| s.id == id).cloned();
            // An unknown id drops the previous selection; a later valid
            // file must not revive it.
            let Some(share) = found else {
                return PrintDialogState {
                    selected: SelectedConfig {
                        printer: None,
                        ..state.selected
                    },
                    error: Some(format!("Unknown printer '{id}'.")),
                    ..state
                };
            };
            let settings = PrinterSettings::from(&share.capabilities);
            let selected =
                SelectedConfig::seeded(&share.id, &share.defaults, state.selected.document.clone());
            PrintDialogState {
                settings,
                selected,
                ..state
            }
        }

        DialogAction::SelectFile(file) => {
            match Document::new(file.name, file.content_type.as_deref(), file.bytes) {
                Ok(document) => PrintDialogState {
                    selected: SelectedConfig {
                        document: Some(document),
                        ..state.selected
                    },
                    error: None,
                    ..state
                },
                Err(e) => PrintDialogState {
                    selected: SelectedConfig {
                        document: None,
                        ..state.selected
                    },
                    error: Some(format!("Select a PDF or OXPS file for printing ({e}).")),
                    ..state
                },
            }
        }

        DialogAction::ChangeCopies(count) => {
            let count = count.max(1);
            let count = state.settings.copies.map_or(count, |r| r.clamp(count));
            PrintDialogState {
                selected: SelectedConfig {
                    copies: Some(count),
                    ..state.selected
                },
                ..state
            }
        }

        DialogAction::ChangeOrientation(orientation) => PrintDialogState {
            selected: SelectedConfig {
                orientation: Some(orientation),
                ..state.selected
            },
            ..state
        },

        DialogAction::ChangeColorMode(color_mode) => PrintDialogState {
            selected: SelectedConfig {
                color_mode: Some(color_mode),
                ..state.selected
            },
            ..state
        },

        DialogAction::UpdateError(message) => PrintDialogState {
            error: Some(message),
            ..state
        },
    }
}

fn action_kind(action: &DialogAction) -> &'static str {
    match action {
        DialogAction::SharesLoaded(_) => "shares-loaded",
        DialogAction::LoadFailed(_) => "load-failed",
        DialogAction::ChangeState(_) => "change-state",
        DialogAction::ChangePrinter(_) => "change-printer",
        DialogAction::SelectFile(_) => "select-file",
        DialogAction::ChangeCopies(_) => "change-copies",
        DialogAction::ChangeOrientation(_) => "change-orientation",
        DialogAction::ChangeColorMode(_) => "change-color-mode",
        DialogAction::UpdateError(_) => "update-error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrinterCapabilities;

    fn share(id: &str, name: &str, copies: u32) -> PrinterShare {
        PrinterShare {
            id: id.into(),
            display_name: name.into(),
            model: None,
            status: None,
            defaults: PrinterDefaults {
                copies_per_job: Some(copies),
                orientation: Some(Orientation::Portrait),
                color_mode: Some(ColorMode::Auto),
                ..PrinterDefaults::default()
            },
            capabilities: PrinterCapabilities {
                copies_per_job: Some(IntegerRange { start: 1, end: 10 }),
                orientations: vec![Orientation::Portrait, Orientation::Landscape],
                color_modes: vec![ColorMode::Auto, ColorMode::Grayscale],
                content_types: Vec::new(),
            },
        }
    }

    fn configured() -> PrintDialogState {
        reduce(
            PrintDialogState::default(),
            DialogAction::SharesLoaded(vec![share("P2", "Zebra", 2), share("P1", "Alpha", 1)]),
        )
    }

    fn pdf() -> SelectedFile {
        SelectedFile {
            name: "report.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn loaded_shares_are_sorted_and_first_is_selected() {
        let state = configured();
        assert_eq!(state.printing_state, PrintingState::Configuration);
        assert_eq!(state.printers[0].id, "P1");
        assert_eq!(state.selected.printer.as_deref(), Some("P1"));
        assert_eq!(state.selected.copies, Some(1));
        assert_eq!(state.selected.color_mode, Some(ColorMode::Auto));
    }

    #[test]
    fn no_shares_is_a_failure() {
        let state = reduce(PrintDialogState::default(), DialogAction::SharesLoaded(Vec::new()));
        assert_eq!(state.printing_state, PrintingState::Failure);
        assert!(state.error.is_some());
    }

    #[test]
    fn unsupported_file_sets_error_and_blocks_submit() {
        let state = reduce(
            configured(),
            DialogAction::SelectFile(SelectedFile {
                name: "notes.txt".into(),
                content_type: Some("text/plain".into()),
                bytes: vec![1],
            }),
        );
        assert!(state.error.is_some());
        assert!(state.selected.document.is_none());
        assert!(!state.ready_to_submit());
    }

    #[test]
    fn valid_file_clears_previous_error() {
        let state = reduce(configured(), DialogAction::UpdateError("boom".into()));
        let state = reduce(state, DialogAction::SelectFile(pdf()));
        assert!(state.error.is_none());
        assert!(state.ready_to_submit());
    }

    #[test]
    fn changing_printer_reseeds_defaults_and_keeps_file() {
        let state = reduce(configured(), DialogAction::SelectFile(pdf()));
        let state = reduce(state, DialogAction::ChangePrinter("P2".into()));
        assert_eq!(state.selected.printer.as_deref(), Some("P2"));
        assert_eq!(state.selected.copies, Some(2));
        assert!(state.selected.document.is_some());
    }

    #[test]
    fn unknown_printer_is_reported() {
        let state = reduce(configured(), DialogAction::ChangePrinter("nope".into()));
        assert_eq!(state.selected.printer, None);
        assert!(state.error.is_some());
    }

    #[test]
    fn unknown_printer_stays_unsubmittable_after_file_pick() {
        let state = reduce(configured(), DialogAction::ChangePrinter("TYPO".into()));
        let state = reduce(state, DialogAction::SelectFile(pdf()));
        assert_eq!(state.selected.printer, None);
        assert!(!state.ready_to_submit());
    }

    #[test]
    fn copies_are_clamped_to_capabilities() {
        let state = reduce(configured(), DialogAction::ChangeCopies(0));
        assert_eq!(state.selected.copies, Some(1));
        let state = reduce(state, DialogAction::ChangeCopies(500));
        assert_eq!(state.selected.copies, Some(10));
    }

    #[test]
    fn submitting_clears_error_but_other_states_keep_it() {
        let state = reduce(configured(), DialogAction::UpdateError("x".into()));
        let kept = reduce(state.clone(), DialogAction::ChangeState(PrintingState::Failure));
        assert_eq!(kept.error.as_deref(), Some("x"));
        let cleared = reduce(state, DialogAction::ChangeState(PrintingState::Submitting));
        assert!(cleared.error.is_none());
    }

    #[test]
    fn document_configuration_defaults_to_one_copy() {
        let selected = SelectedConfig::default();
        assert_eq!(selected.document_configuration().copies, Some(1));
    }
}
