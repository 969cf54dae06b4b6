//! Keyword classification of menu answers.
//!
//! Runs before any NLU call and decides which flow a message in the
//! `ChoosingAction` step starts.

use regex::Regex;
use std::sync::LazyLock;

use reserva_nlu::NluIntent;

/// What the user picked from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    New,
    Modify,
    Cancel,
    Confirm,
    SmallTalk,
    Unknown,
}

impl From<NluIntent> for MenuChoice {
    fn from(intent: NluIntent) -> Self {
        match intent {
            NluIntent::NewReservation => MenuChoice::New,
            NluIntent::ModifyReservation => MenuChoice::Modify,
            NluIntent::CancelReservation => MenuChoice::Cancel,
            NluIntent::ConfirmReservation => MenuChoice::Confirm,
            NluIntent::SmallTalk => MenuChoice::SmallTalk,
            NluIntent::Unknown => MenuChoice::Unknown,
        }
    }
}

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

struct MenuPatterns {
    digit: Regex,
    cancel: Vec<Regex>,
    modify: Vec<Regex>,
    confirm: Vec<Regex>,
    new: Vec<Regex>,
    small_talk: Vec<Regex>,
}

static MENU_PATTERNS: LazyLock<MenuPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid menu regex"))
            .collect()
    };

    MenuPatterns {
        digit: Regex::new(r"^\s*([1-4])\s*[).]?\s*$").expect("Invalid menu digit regex"),
        // Checked before "new" so "cancel my reservation" is not a booking.
        cancel: mk(&[r"(?i)\bcancel", r"(?i)\bcall\s+off\b"]),
        modify: mk(&[
            r"(?i)\bmodify\b",
            r"(?i)\bchange\b",
            r"(?i)\bupdate\b",
            r"(?i)\bedit\b",
            r"(?i)\breschedule\b",
        ]),
        confirm: mk(&[
            r"(?i)\bconfirm",
            r"(?i)\bdetails?\b",
            r"(?i)\blook\s*up\b",
            r"(?i)\bsee\s+my\b",
        ]),
        new: mk(&[
            r"(?i)\bnew\b",
            r"(?i)\bbook(?:ing)?\b",
            r"(?i)\breserve\b",
            r"(?i)\breservation\b",
            r"(?i)\btable\b",
        ]),
        small_talk: mk(&[
            r"(?i)^\s*(?:hi|hello|hey|hiya|yo)\b",
            r"(?i)^\s*good\s+(?:morning|afternoon|evening)\b",
            r"(?i)\bhow\s+are\s+you\b",
            r"(?i)\bthank(?:s|\s+you)\b",
            r"(?i)^\s*(?:bye|goodbye)\b",
        ]),
    }
});

/// Classify a menu answer by keywords alone.
pub fn classify(message: &str) -> MenuChoice {
    let patterns = &*MENU_PATTERNS;

    if let Some(caps) = patterns.digit.captures(message) {
        return match &caps[1] {
            "1" => MenuChoice::New,
            "2" => MenuChoice::Modify,
            "3" => MenuChoice::Cancel,
            _ => MenuChoice::Confirm,
        };
    }

    if matches_any(&patterns.cancel, message) {
        MenuChoice::Cancel
    } else if matches_any(&patterns.modify, message) {
        MenuChoice::Modify
    } else if matches_any(&patterns.confirm, message) {
        MenuChoice::Confirm
    } else if matches_any(&patterns.new, message) {
        MenuChoice::New
    } else if matches_any(&patterns.small_talk, message) {
        MenuChoice::SmallTalk
    } else {
        MenuChoice::Unknown
    }
}

fn matches_any(set: &[Regex], message: &str) -> bool {
    set.iter().any(|re| re.is_match(message))
}

/// Parse a yes/no answer. `None` for anything else.
pub fn yes_no(message: &str) -> Option<bool> {
    match message.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}
