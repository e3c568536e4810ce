//! Rich-field normalisation for raw broker records.
//!
//! Four broker attributes (why-choose, safety, pros/cons, FAQ) were written by
//! several generations of extraction pipelines, each with its own JSON shape.
//! Every attribute has an ordered table of [`Shape`]s; the first shape that
//! recognises the input produces the canonical value. Anything unrecognised
//! becomes `None` for that field. Nothing here fails or panics.
//!
//! # Pre-parse
//!
//! All four converters share [`parse_rich_field`]: absent or falsy input is
//! `None`, a string is parsed as JSON, anything else is used as-is.
//!
//! # Default-safe policy
//!
//! Most safety shapes carry no explicit negative signal; those default to
//! `is_safe: true`. Downstream consumers rely on this, so it is kept.

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, trace};

use crate::record::{BrokerRecord, Faq, ProsAndCons, RawBrokerRecord, SafetyInfo, WhyChoose};
use crate::value::{array_field, as_number, is_truthy, string_list, text, truthy_field};

/// A named legacy shape: `convert` returns `Some` only when the input matches.
struct Shape<T> {
    name: &'static str,
    convert: fn(&Value) -> Option<T>,
}

/// Try each shape in order and return the first conversion that matches.
fn first_match<T>(field: &'static str, value: &Value, shapes: &[Shape<T>]) -> Option<T> {
    for shape in shapes {
        if let Some(out) = (shape.convert)(value) {
            trace!(field, shape = shape.name, "rich field matched");
            return Some(out);
        }
    }
    debug!(field, "rich field matched no known shape");
    None
}

/// Shared pre-parse step for rich fields.
///
/// Returns the structured value to inspect, or `None` when the field is
/// absent, empty, falsy, or a string that is not valid JSON.
pub fn parse_rich_field(raw: Option<&Value>) -> Option<Cow<'_, Value>> {
    let raw = raw.filter(|v| is_truthy(v))?;
    match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) if is_truthy(&parsed) => Some(Cow::Owned(parsed)),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "rich field is not valid JSON");
                None
            }
        },
        other => Some(Cow::Borrowed(other)),
    }
}

/// The `part2` list written by the paragraph-split pipeline.
///
/// Both why-choose and safety fields use this shape.
fn part2_items(value: &Value) -> Option<&Vec<Value>> {
    array_field(value, "part2")
}

// ── Why choose ──

const WHY_CHOOSE_SHAPES: &[Shape<Vec<WhyChoose>>] = &[
    Shape { name: "part2", convert: why_choose_part2 },
    Shape { name: "item-array", convert: why_choose_item_array },
    Shape { name: "list-key", convert: why_choose_list_key },
    Shape { name: "single-item", convert: why_choose_single_item },
];

/// Alternate keys under which a why-choose list may be nested, in priority order.
const WHY_CHOOSE_LIST_KEYS: &[&str] = &["reasons", "items", "features", "whychose", "why_choose"];

/// Normalise the why-choose field into `{title, description}` items.
pub fn normalize_why_choose(raw: Option<&Value>) -> Option<Vec<WhyChoose>> {
    let parsed = parse_rich_field(raw)?;
    first_match("whychose", &parsed, WHY_CHOOSE_SHAPES)
}

fn why_choose_part2(value: &Value) -> Option<Vec<WhyChoose>> {
    let items = part2_items(value)?;
    Some(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| WhyChoose {
                title: format!("Key Point {}", i + 1),
                description: text(item),
            })
            .collect(),
    )
}

fn has_title_or_description(item: &Value) -> bool {
    item.is_object()
        && (truthy_field(item, "title").is_some() || truthy_field(item, "description").is_some())
}

fn why_choose_item(item: &Value) -> WhyChoose {
    WhyChoose {
        title: item.get("title").map(text).unwrap_or_default(),
        description: item.get("description").map(text).unwrap_or_default(),
    }
}

fn why_choose_item_array(value: &Value) -> Option<Vec<WhyChoose>> {
    let items = value.as_array()?;
    if !items.iter().all(has_title_or_description) {
        return None;
    }
    Some(items.iter().map(why_choose_item).collect())
}

fn why_choose_list_key(value: &Value) -> Option<Vec<WhyChoose>> {
    value.as_object()?;
    let items = WHY_CHOOSE_LIST_KEYS
        .iter()
        .find_map(|key| array_field(value, key))?;
    // Bare strings become descriptions; items carrying no text are dropped.
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => Some(why_choose_item(item)),
                Value::String(s) => Some(WhyChoose {
                    title: String::new(),
                    description: s.clone(),
                }),
                _ => None,
            })
            .filter(|item| !item.title.is_empty() || !item.description.is_empty())
            .collect(),
    )
}

fn why_choose_single_item(value: &Value) -> Option<Vec<WhyChoose>> {
    has_title_or_description(value).then(|| vec![why_choose_item(value)])
}

// ── Safety ──

const SAFETY_SHAPES: &[Shape<SafetyInfo>] = &[
    Shape { name: "part2", convert: safety_part2 },
    Shape { name: "flat", convert: safety_flat },
    Shape { name: "nested-safe", convert: safety_nested },
    Shape { name: "reasons-only", convert: safety_reasons_only },
    Shape { name: "safety-analysis", convert: safety_analysis },
    Shape { name: "safety-module", convert: safety_module },
    Shape { name: "string-array", convert: safety_string_array },
];

/// Threshold on `safety_score.overall_rating` above which a module report is safe.
const SAFETY_RATING_THRESHOLD: f64 = 70.0;

/// `(section, summary key)` pairs aggregated from a `safety_module` report.
const SAFETY_MODULE_SUMMARIES: &[(&str, &str)] = &[
    ("fund_security", "security_summary"),
    ("regulatory_compliance", "regulation_summary"),
    ("operational_stability", "stability_summary"),
];

/// Normalise the safety field into `{is_safe, reasons}`.
pub fn normalize_safety(raw: Option<&Value>) -> Option<SafetyInfo> {
    let parsed = parse_rich_field(raw)?;
    first_match("safe", &parsed, SAFETY_SHAPES)
}

fn safety_part2(value: &Value) -> Option<SafetyInfo> {
    let items = part2_items(value)?;
    Some(SafetyInfo {
        is_safe: true,
        reasons: items.iter().filter(|v| !v.is_null()).map(text).collect(),
    })
}

fn safety_flat(value: &Value) -> Option<SafetyInfo> {
    let flag = value.get("is_safe")?;
    let reasons = truthy_field(value, "reasons")?;
    Some(SafetyInfo {
        is_safe: is_truthy(flag),
        reasons: string_list(reasons),
    })
}

fn safety_nested(value: &Value) -> Option<SafetyInfo> {
    let inner = value.get("safe").filter(|v| v.is_object())?;
    safety_flat(inner)
}

fn safety_reasons_only(value: &Value) -> Option<SafetyInfo> {
    let reasons = array_field(value, "reasons").filter(|r| !r.is_empty())?;
    Some(SafetyInfo {
        is_safe: true,
        reasons: reasons.iter().filter(|v| !v.is_null()).map(text).collect(),
    })
}

fn safety_analysis(value: &Value) -> Option<SafetyInfo> {
    let analysis = truthy_field(value, "safety_analysis")?;
    let is_safe = analysis.get("is_safe").is_none_or(is_truthy);
    let reasons = match (array_field(analysis, "reasons"), truthy_field(analysis, "summary")) {
        (Some(list), _) => list.iter().filter(|v| !v.is_null()).map(text).collect(),
        (None, Some(summary)) => vec![text(summary)],
        (None, None) => Vec::new(),
    };
    Some(SafetyInfo { is_safe, reasons })
}

fn safety_module(value: &Value) -> Option<SafetyInfo> {
    let module = truthy_field(value, "safety_module")?;
    let is_safe = module
        .get("safety_score")
        .and_then(|score| score.get("overall_rating"))
        .and_then(as_number)
        .is_some_and(|rating| rating >= SAFETY_RATING_THRESHOLD);

    let reasons: Vec<String> = SAFETY_MODULE_SUMMARIES
        .iter()
        .filter_map(|(section, key)| module.get(*section).and_then(|s| truthy_field(s, key)))
        .map(text)
        .collect();

    // A module report with no summaries falls through to the remaining shapes.
    if reasons.is_empty() {
        return None;
    }
    Some(SafetyInfo { is_safe, reasons })
}

fn safety_string_array(value: &Value) -> Option<SafetyInfo> {
    let items = value.as_array()?;
    if !items.first().is_some_and(Value::is_string) {
        return None;
    }
    Some(SafetyInfo {
        is_safe: true,
        reasons: string_list(value),
    })
}

// ── Pros and cons ──

const PROS_CONS_SHAPES: &[Shape<ProsAndCons>] = &[
    Shape { name: "bare-array", convert: pros_cons_array },
    Shape { name: "pros-cons", convert: pros_cons_standard },
    Shape { name: "advantages", convert: pros_cons_advantages },
    Shape { name: "localized", convert: pros_cons_localized },
    Shape { name: "nested", convert: pros_cons_nested },
];

/// Normalise the pros/cons field into `{pros, cons}`.
pub fn normalize_pros_cons(raw: Option<&Value>) -> Option<ProsAndCons> {
    let parsed = parse_rich_field(raw)?;
    first_match("pros", &parsed, PROS_CONS_SHAPES)
}

/// Map a `{pro_key, con_key}` object when at least one side is present.
fn key_pair(value: &Value, pro_key: &str, con_key: &str) -> Option<ProsAndCons> {
    let pros = truthy_field(value, pro_key);
    let cons = truthy_field(value, con_key);
    if pros.is_none() && cons.is_none() {
        return None;
    }
    Some(ProsAndCons {
        pros: pros.map(string_list).unwrap_or_default(),
        cons: cons.map(string_list).unwrap_or_default(),
    })
}

fn pros_cons_array(value: &Value) -> Option<ProsAndCons> {
    value.as_array()?;
    Some(ProsAndCons {
        pros: string_list(value),
        cons: Vec::new(),
    })
}

fn pros_cons_standard(value: &Value) -> Option<ProsAndCons> {
    key_pair(value, "pros", "cons")
}

fn pros_cons_advantages(value: &Value) -> Option<ProsAndCons> {
    key_pair(value, "advantages", "disadvantages")
}

fn pros_cons_localized(value: &Value) -> Option<ProsAndCons> {
    key_pair(value, "优点", "缺点")
}

fn pros_cons_nested(value: &Value) -> Option<ProsAndCons> {
    let inner = truthy_field(value, "pros_cons")?;
    Some(ProsAndCons {
        pros: truthy_field(inner, "pros").map(string_list).unwrap_or_default(),
        cons: truthy_field(inner, "cons").map(string_list).unwrap_or_default(),
    })
}

// ── FAQ ──

/// Normalise the FAQ field. Only arrays are accepted; `q`/`a` and
/// `question`/`answer` spellings are both understood.
pub fn normalize_faq(raw: Option<&Value>) -> Option<Vec<Faq>> {
    let parsed = parse_rich_field(raw)?;
    let Some(items) = parsed.as_array() else {
        debug!(field = "faq", "rich field is not an array");
        return None;
    };
    Some(
        items
            .iter()
            .map(|item| Faq {
                question: first_text(item, &["q", "question"]),
                answer: first_text(item, &["a", "answer"]),
            })
            .collect(),
    )
}

fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| truthy_field(item, key))
        .map(text)
        .unwrap_or_default()
}

// ── Record assembly ──

/// Normalise one raw record. Scalars pass through unchanged.
pub fn normalize(raw: &RawBrokerRecord) -> BrokerRecord {
    BrokerRecord {
        info: raw.info.clone(),
        why_choose: normalize_why_choose(raw.why_choose.as_ref()),
        safe: normalize_safety(raw.safe.as_ref()),
        pros_cons: normalize_pros_cons(raw.pros_cons.as_ref()),
        faq: normalize_faq(raw.faq.as_ref()),
    }
}

/// Normalise a batch of raw records, preserving order.
pub fn normalize_all(raws: &[RawBrokerRecord]) -> Vec<BrokerRecord> {
    raws.iter().map(normalize).collect()
}
