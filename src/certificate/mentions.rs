//! Mentions: life events recorded in the margin of an existing act.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::{value_to_flag, value_to_text};
use super::dates::date_to_words;
use super::layout::PARAGRAPH_BREAK;

/// A certificate carries at most this many mention slots.
pub const MAX_MENTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MentionKind {
    Recognition,
    Adoption,
    Marriage,
    Divorce,
    NameChange,
    Death,
}

impl MentionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "RECOGNITION" | "RECONNAISSANCE" => Some(MentionKind::Recognition),
            "ADOPTION" => Some(MentionKind::Adoption),
            "MARRIAGE" | "MARIAGE" => Some(MentionKind::Marriage),
            "DIVORCE" => Some(MentionKind::Divorce),
            "NAME_CHANGE" | "CHANGEMENT_DE_NOM" => Some(MentionKind::NameChange),
            "DEATH" | "DECES" | "DÉCÈS" => Some(MentionKind::Death),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionEntry {
    pub kind: Option<MentionKind>,
    pub date: Option<String>,
    pub place: Option<String>,
    pub act_number: Option<String>,
    pub first_names: Option<String>,
    pub family_name: Option<String>,
    pub judgment_number: Option<String>,
    pub court: Option<String>,
    pub spouse_name: Option<String>,
    pub new_name: Option<String>,
}

impl MentionEntry {
    fn from_slot(slot: &Value) -> Self {
        let text = |key: &str| slot.get(key).and_then(value_to_text);
        Self {
            kind: text("type").as_deref().and_then(MentionKind::parse),
            date: text("date"),
            place: text("place"),
            act_number: text("actNumber"),
            first_names: text("firstNames"),
            family_name: text("familyName"),
            judgment_number: text("judgmentNumber"),
            court: text("court"),
            spouse_name: text("spouseName"),
            new_name: text("newName"),
        }
    }

    fn person_name(&self) -> Option<String> {
        match (&self.family_name, &self.first_names) {
            (Some(family), Some(first)) => Some(format!("{family} {first}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }

    fn date_words(&self) -> Option<String> {
        self.date.as_deref().and_then(date_to_words)
    }
}

/// Ordered mention slots, contiguous from the first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionList {
    entries: Vec<MentionEntry>,
}

impl MentionList {
    pub fn new(mut entries: Vec<MentionEntry>) -> Self {
        entries.truncate(MAX_MENTIONS);
        Self { entries }
    }

    /// Read slots in order, stopping at the first one without a truthy
    /// `exists` flag. Populated slots after a gap are never reached.
    pub fn from_slots(slots: Option<&Value>) -> Self {
        let Some(Value::Array(slots)) = slots else {
            return Self::default();
        };
        let entries = slots
            .iter()
            .take(MAX_MENTIONS)
            .take_while(|slot| slot.get("exists").is_some_and(value_to_flag))
            .map(MentionEntry::from_slot)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[MentionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Which mention kinds render prose. The default renders recognitions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MentionOptions {
    pub all_kinds: bool,
}

impl MentionOptions {
    pub fn all_kinds() -> Self {
        Self { all_kinds: true }
    }

    fn renders(&self, kind: MentionKind) -> bool {
        self.all_kinds || kind == MentionKind::Recognition
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionsBlock {
    pub text: String,
    pub has_mention: bool,
}

fn sentence(parts: Vec<Option<String>>) -> String {
    let body: Vec<String> = parts.into_iter().flatten().collect();
    format!("{}.", body.join(" "))
}

fn render_recognition(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Nekena ho zanany".to_string()),
        entry.person_name().map(|n| format!("nataon'i {n}")),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
        entry.place.as_ref().map(|p| format!("tao {p}")),
        entry
            .act_number
            .as_ref()
            .map(|a| format!("araka ny sora-pankatoavana laharana {a}")),
    ])
}

fn render_adoption(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Natsangana ho zanaka".to_string()),
        entry.person_name().map(|n| format!("nataon'i {n}")),
        entry
            .judgment_number
            .as_ref()
            .map(|j| format!("araka ny didim-pitsarana laharana {j}")),
        entry.court.as_ref().map(|c| format!("navoakan'ny {c}")),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
    ])
}

fn render_marriage(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Nanambady".to_string()),
        entry
            .spouse_name
            .clone()
            .or_else(|| entry.person_name())
            .map(|s| format!("an'i {s}")),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
        entry.place.as_ref().map(|p| format!("tao {p}")),
        entry.act_number.as_ref().map(|a| format!("sora-ketra laharana {a}")),
    ])
}

fn render_divorce(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Nisaraka".to_string()),
        entry
            .spouse_name
            .clone()
            .or_else(|| entry.person_name())
            .map(|s| format!("tamin'i {s}")),
        entry
            .judgment_number
            .as_ref()
            .map(|j| format!("araka ny didim-pitsarana laharana {j}")),
        entry.court.as_ref().map(|c| format!("navoakan'ny {c}")),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
    ])
}

fn render_name_change(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Novana".to_string()),
        entry.new_name.as_ref().map(|n| format!("ho {n}")),
        Some("ny anarany".to_string()),
        entry
            .judgment_number
            .as_ref()
            .map(|j| format!("araka ny didim-pitsarana laharana {j}")),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
    ])
}

fn render_death(entry: &MentionEntry) -> String {
    sentence(vec![
        Some("Maty".to_string()),
        entry.date_words().map(|d| format!("tamin'ny {d}")),
        entry.place.as_ref().map(|p| format!("tao {p}")),
        entry.act_number.as_ref().map(|a| format!("sora-ketra laharana {a}")),
    ])
}

pub fn render_mention(entry: &MentionEntry) -> Option<String> {
    let text = match entry.kind? {
        MentionKind::Recognition => render_recognition(entry),
        MentionKind::Adoption => render_adoption(entry),
        MentionKind::Marriage => render_marriage(entry),
        MentionKind::Divorce => render_divorce(entry),
        MentionKind::NameChange => render_name_change(entry),
        MentionKind::Death => render_death(entry),
    };
    Some(text)
}

/// Render every enabled mention, separated by paragraph breaks.
pub fn compose_mentions(list: &MentionList, options: &MentionOptions) -> MentionsBlock {
    let paragraphs: Vec<String> = list
        .entries()
        .iter()
        .filter(|entry| entry.kind.is_some_and(|kind| options.renders(kind)))
        .filter_map(render_mention)
        .collect();

    MentionsBlock {
        has_mention: !paragraphs.is_empty(),
        text: paragraphs.join(PARAGRAPH_BREAK),
    }
}
