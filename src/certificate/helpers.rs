//! Named helper table.
//!
//! Every template helper is a plain function from a [`HelperCall`] to a JSON
//! value. The table is the single place helper names are defined; the
//! Handlebars binding and the `/api/helpers` route both read it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::context::{value_to_flag, value_to_text, RecordContext};
use super::dates::{
    convert_date_with_fallback, convert_time_to_words, to_local_iso, PLACEHOLDER,
};
use super::layout::{wrap_lines, LayoutOptions};
use super::mentions::{compose_mentions, MentionOptions};
use super::numerals::number_str_to_words;
use super::statements::{self, join_values, DEFAULT_SEPARATOR};

/// Arguments of one helper invocation.
#[derive(Debug, Clone)]
pub struct HelperCall<'a> {
    pub params: Vec<Value>,
    pub hash: Map<String, Value>,
    /// Root data of the template being rendered.
    pub root: &'a Value,
}

impl<'a> HelperCall<'a> {
    pub fn new(params: Vec<Value>, hash: Map<String, Value>, root: &'a Value) -> Self {
        Self { params, hash, root }
    }

    fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    fn text_param(&self, index: usize) -> Option<String> {
        self.param(index).and_then(value_to_text)
    }

    /// Record the statement helpers read: an object passed as the first
    /// parameter, otherwise the root data.
    fn record(&self) -> RecordContext {
        match self.param(0) {
            Some(value @ Value::Object(_)) => RecordContext::from_value(value),
            _ => RecordContext::from_value(self.root),
        }
    }
}

pub type HelperFn = fn(&HelperCall<'_>) -> Value;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HelperDescriptor {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Copy)]
struct HelperEntry {
    description: &'static str,
    call: HelperFn,
}

/// Name to function table for every certificate helper.
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: BTreeMap<&'static str, HelperEntry>,
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HelperRegistry {
    pub fn new() -> Self {
        let table: [(&'static str, &'static str, HelperFn); 17] = [
            ("numberToWords", "Integer as Malagasy words", number_to_words),
            ("convertDateToMdgCustomWords", "Date as Malagasy words, optional fallback date", date_words),
            ("convertTimeToMdgCustomWords", "HH:MM time as Malagasy words", time_words),
            ("toLocalIso", "UTC timestamp at the +03:00 offset", local_iso),
            ("join", "Join present values with the `separator` hash argument", join),
            ("eventStatement", "Birth event paragraph", event_statement),
            ("deathEventStatement", "Death event paragraph", death_event_statement),
            ("registrationStatement", "Registration paragraph", registration_statement),
            ("informantStatement", "Informant detail clause", informant_statement),
            ("fatherDetails", "Father paragraph", father_details),
            ("fatherDetailsSimplified", "Father paragraph, deceased fathers included", father_details_simplified),
            ("motherDetails", "Mother paragraph", mother_details),
            ("canShowFatherDetails", "Whether the father paragraph applies", can_show_father_details),
            ("isInformantLegalFather", "Whether the informant is the legal father", is_informant_legal_father),
            ("mentions", "Margin mentions, paragraphs separated by a blank line", mentions),
            ("hasMentions", "Whether any mention renders", has_mentions),
            ("wrapText", "Text wrapped into lines within `maxWidth`", wrap_text),
        ];

        let helpers = table
            .into_iter()
            .map(|(name, description, call)| (name, HelperEntry { description, call }))
            .collect();
        Self { helpers }
    }

    pub fn get(&self, name: &str) -> Option<HelperFn> {
        self.helpers.get(name).map(|entry| entry.call)
    }

    /// Evaluate `name`, `None` when no such helper exists.
    pub fn call(&self, name: &str, call: &HelperCall<'_>) -> Option<Value> {
        self.get(name).map(|helper| helper(call))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.helpers.keys().copied()
    }

    pub fn descriptors(&self) -> Vec<HelperDescriptor> {
        self.helpers
            .iter()
            .map(|(name, entry)| HelperDescriptor {
                name: name.to_string(),
                description: entry.description.to_string(),
            })
            .collect()
    }
}

// ============================================================================
// Scalar helpers
// ============================================================================

fn number_to_words(call: &HelperCall<'_>) -> Value {
    let digits = match call.param(0) {
        Some(Value::Number(n)) => n.as_u64().map(|n| n.to_string()).unwrap_or_default(),
        Some(other) => value_to_text(other).unwrap_or_default(),
        None => String::new(),
    };
    Value::String(number_str_to_words(&digits))
}

fn date_words(call: &HelperCall<'_>) -> Value {
    let fallback = call
        .text_param(1)
        .or_else(|| call.hash.get("fallback").and_then(value_to_text));
    Value::String(convert_date_with_fallback(
        call.text_param(0).as_deref(),
        fallback.as_deref(),
    ))
}

fn time_words(call: &HelperCall<'_>) -> Value {
    let words = call
        .text_param(0)
        .map(|time| convert_time_to_words(&time))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    Value::String(words)
}

fn local_iso(call: &HelperCall<'_>) -> Value {
    let iso = call
        .text_param(0)
        .and_then(|utc| to_local_iso(&utc))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    Value::String(iso)
}

fn join(call: &HelperCall<'_>) -> Value {
    let separator = call
        .hash
        .get("separator")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SEPARATOR);
    Value::String(join_values(call.params.iter().map(value_to_text), separator))
}

// ============================================================================
// Record helpers
// ============================================================================

fn event_statement(call: &HelperCall<'_>) -> Value {
    Value::String(statements::birth_event_statement(&call.record()))
}

fn death_event_statement(call: &HelperCall<'_>) -> Value {
    Value::String(statements::death_event_statement(&call.record()))
}

fn registration_statement(call: &HelperCall<'_>) -> Value {
    Value::String(statements::registration_statement(&call.record()))
}

fn informant_statement(call: &HelperCall<'_>) -> Value {
    Value::String(statements::informant_statement(&call.record()))
}

fn father_details(call: &HelperCall<'_>) -> Value {
    Value::String(statements::father_statement(&call.record()))
}

fn father_details_simplified(call: &HelperCall<'_>) -> Value {
    Value::String(statements::father_statement_simplified(&call.record()))
}

fn mother_details(call: &HelperCall<'_>) -> Value {
    Value::String(statements::mother_statement(&call.record()))
}

fn can_show_father_details(call: &HelperCall<'_>) -> Value {
    Value::Bool(statements::can_show_father_details(&call.record()))
}

fn is_informant_legal_father(call: &HelperCall<'_>) -> Value {
    Value::Bool(statements::is_informant_legal_father(&call.record()))
}

fn mention_options(call: &HelperCall<'_>) -> MentionOptions {
    MentionOptions {
        all_kinds: call.hash.get("allKinds").is_some_and(value_to_flag),
    }
}

fn mentions(call: &HelperCall<'_>) -> Value {
    let record = call.record();
    Value::String(compose_mentions(record.mentions(), &mention_options(call)).text)
}

fn has_mentions(call: &HelperCall<'_>) -> Value {
    let record = call.record();
    Value::Bool(compose_mentions(record.mentions(), &mention_options(call)).has_mention)
}

// ============================================================================
// Layout
// ============================================================================

fn wrap_text(call: &HelperCall<'_>) -> Value {
    let Some(text) = call.param(0).and_then(Value::as_str) else {
        return Value::Array(Vec::new());
    };
    let options = LayoutOptions::from_hash(&call.hash);
    Value::Array(wrap_lines(text, &options).map(Value::String).collect())
}
