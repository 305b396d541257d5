// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people submitting print jobs.
//
// Nothing in uprint retries on its own.  `retriable` tells the person whether
// pressing Print again is worth it; `severity` drives presentation.

use crate::error::UprintError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or a slow service; trying again may work.
    Transient,
    /// User must do something (sign in, pick a file, pick a printer).
    ActionRequired,
    /// Cannot be fixed by trying again.
    Permanent,
    /// Possible spoofed or tampered request.
    Security,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-triggering the action by hand makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert an `UprintError` into a `HumanError`.
pub fn humanize_error(err: &UprintError) -> HumanError {
    match err {
        UprintError::Auth(_) => HumanError::new(
            "We couldn't sign you in to Universal Print.",
            "Sign in again, then retry. Your organisation may need to grant the app permission to print.",
            false,
            Severity::ActionRequired,
        ),

        UprintError::Transport(detail) => HumanError::new(
            "We couldn't reach Universal Print.",
            format!("Check your internet connection and try again. ({detail})"),
            true,
            Severity::Transient,
        ),

        UprintError::Http { status, status_text } => humanize_http(*status, status_text),

        UprintError::MissingHeader(header) => HumanError::new(
            "Universal Print sent an unexpected reply.",
            format!("The {header} header was missing. Try again later."),
            true,
            Severity::Transient,
        ),

        UprintError::OperationFailed { description } => HumanError::new(
            "The printer could not be registered.",
            format!("Universal Print reported: {description}"),
            false,
            Severity::Permanent,
        ),

        UprintError::OperationTimedOut { attempts } => HumanError::new(
            "Printer registration is taking longer than expected.",
            format!(
                "We checked {attempts} times and it was still running. Look in the Universal Print portal before registering again."
            ),
            true,
            Severity::Transient,
        ),

        UprintError::UnsupportedDocument(detail) => HumanError::new(
            "This type of document isn't supported.",
            format!("Save the file as a PDF or OXPS document, then print that. (File type: {detail})"),
            false,
            Severity::ActionRequired,
        ),

        UprintError::EmptyDocument(name) => HumanError::new(
            "This document is empty.",
            format!("'{name}' has no content. Choose a different file."),
            false,
            Severity::ActionRequired,
        ),

        UprintError::NoPrinterSelected => HumanError::new(
            "No printer selected.",
            "Please choose a printer from the list, then try again.",
            false,
            Severity::ActionRequired,
        ),

        UprintError::UnknownPrinter(id) => HumanError::new(
            "That printer isn't shared with you.",
            format!("No printer share has the id '{id}'. Run `uprint shares` to list the ones you can use."),
            false,
            Severity::ActionRequired,
        ),

        UprintError::NoDocumentSelected => HumanError::new(
            "No document selected.",
            "Choose a PDF or OXPS file, then try again.",
            false,
            Severity::ActionRequired,
        ),

        UprintError::JobNotStarted { state } => HumanError::new(
            "The printer didn't start your job.",
            format!("Universal Print left it {state}. Check the printer, then print again."),
            true,
            Severity::Permanent,
        ),

        UprintError::InvalidClientState => HumanError::new(
            "A notification was rejected.",
            "Its client state did not match this subscription. It may not have come from Microsoft Graph.",
            false,
            Severity::Security,
        ),

        UprintError::ResourcePath { path, .. } => HumanError::new(
            "A notification referred to something we don't recognise.",
            format!("Unexpected resource: {path}"),
            false,
            Severity::Permanent,
        ),

        UprintError::Certificate(_) => HumanError::new(
            "Setting up the printer's identity failed.",
            "Try registering the printer again.",
            true,
            Severity::Transient,
        ),

        UprintError::Config(detail) => HumanError::new(
            "uprint isn't configured yet.",
            format!("Fix the configuration and try again. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        UprintError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "It may have been moved or deleted. Try choosing the file again.",
                false,
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "uprint doesn't have permission to read that file.",
                "Check the file permissions, or copy the file somewhere else first.",
                false,
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, your disk may be full.",
                true,
                Severity::Transient,
            ),
        },

        UprintError::Serialization(_) => HumanError::new(
            "Universal Print sent data we couldn't read.",
            "Try again. If this keeps happening, please report it.",
            true,
            Severity::Transient,
        ),
    }
}

/// Map a Graph HTTP status to a message.
fn humanize_http(status: u16, status_text: &str) -> HumanError {
    match status {
        401 => HumanError::new(
            "Your sign-in has expired.",
            "Sign in again, then retry.",
            false,
            Severity::ActionRequired,
        ),
        403 => HumanError::new(
            "You don't have permission to use this printer.",
            "Ask your administrator to share the printer with you.",
            false,
            Severity::ActionRequired,
        ),
        404 => HumanError::new(
            "The printer or job no longer exists.",
            "Refresh the printer list and try again.",
            false,
            Severity::Permanent,
        ),
        413 => HumanError::new(
            "This document is too large to print.",
            "Try a smaller file.",
            false,
            Severity::Permanent,
        ),
        429 | 500..=599 => HumanError::new(
            "Universal Print is busy right now.",
            format!("Wait a moment, then try again. ({status} {status_text})"),
            true,
            Severity::Transient,
        ),
        _ => HumanError::new(
            "Universal Print rejected the request.",
            format!("{status} {status_text}"),
            false,
            Severity::Permanent,
        ),
    }
}
