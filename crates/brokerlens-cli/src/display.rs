//! Terminal rendering for broker records.
//!
//! A single record prints as a grouped vertical card; ranked views print as
//! a compact table.

use brokerlens_core::ranking::operating_years;
use brokerlens_core::regulator::format_regulators;
use brokerlens_core::{BrokerRecord, RiskBadge, extract_regulators};

const MAX_LIST_ITEMS: usize = 10;
const NAME_WIDTH: usize = 28;

/// Print one record as a vertical card.
pub fn print_broker_card(record: &BrokerRecord) {
    let info = &record.info;
    println!("=== {} ===", info.name);
    println!("{}", RiskBadge::for_record(record).as_str());
    println!();

    // ── Identity ──
    print_section(
        "Identity",
        &[
            ("code", Some(info.code.clone())),
            ("id", Some(info.id.to_string())),
            ("register_country", info.register_country.clone()),
            ("official_link", Some(info.official_link.clone())),
            ("logo", Some(info.logo.clone())),
            ("total_score", Some(format!("{:.1}", info.total_score))),
        ],
    );

    // ── Licensing ──
    let regulators = extract_regulators(info.license_info.as_deref());
    let weight = (!regulators.is_empty()).then(|| format!("{:.1}", regulators.average_weight()));
    print_section(
        "Licensing",
        &[
            ("license_info", info.license_info.clone()),
            ("regulators", Some(format_regulators(&regulators))),
            ("regulation_weight", weight),
            ("operating_period", info.operating_period.clone()),
            ("operating_years", Some(years_label(info.operating_period.as_deref()))),
        ],
    );

    if let Some(items) = &record.why_choose
        && !items.is_empty()
    {
        println!("Why Choose");
        let lines: Vec<String> = items
            .iter()
            .map(|item| match (item.title.is_empty(), item.description.is_empty()) {
                (false, false) => format!("{}: {}", item.title, item.description),
                (false, true) => item.title.clone(),
                _ => item.description.clone(),
            })
            .collect();
        print_list(&lines);
        println!();
    }

    if let Some(safe) = &record.safe {
        println!("Safety");
        println!("  {:<26} {}", "is_safe", if safe.is_safe { "yes" } else { "no" });
        print_list(&safe.reasons);
        println!();
    }

    if let Some(pc) = &record.pros_cons {
        println!("Pros & Cons");
        if !pc.pros.is_empty() {
            println!("  pros ({}):", pc.pros.len());
            print_list(&pc.pros);
        }
        if !pc.cons.is_empty() {
            println!("  cons ({}):", pc.cons.len());
            print_list(&pc.cons);
        }
        println!();
    }

    if let Some(faq) = &record.faq
        && !faq.is_empty()
    {
        println!("FAQ");
        for entry in faq.iter().take(MAX_LIST_ITEMS) {
            println!("  Q: {}", entry.question);
            println!("  A: {}", entry.answer);
        }
        if faq.len() > MAX_LIST_ITEMS {
            println!("  ... and {} more", faq.len() - MAX_LIST_ITEMS);
        }
        println!();
    }
}

/// Print a ranked view as a table. Empty views print a placeholder line.
pub fn print_ranking(title: &str, records: &[&BrokerRecord]) {
    println!("{title} ({})", records.len());
    if records.is_empty() {
        println!("  (none)");
        println!();
        return;
    }
    println!(
        "  {:>3}  {:<w$}  {:>5}  {:>6}  {:<8}  {}",
        "#",
        "broker",
        "score",
        "years",
        "badge",
        "regulators",
        w = NAME_WIDTH
    );
    for (i, record) in records.iter().enumerate() {
        let regulators = extract_regulators(record.info.license_info.as_deref());
        println!(
            "  {:>3}  {:<w$}  {:>5.1}  {:>6}  {:<8}  {}",
            i + 1,
            truncate(&record.info.name, NAME_WIDTH),
            record.info.total_score,
            years_label(record.info.operating_period.as_deref()),
            RiskBadge::for_record(record).as_str(),
            format_regulators(&regulators),
            w = NAME_WIDTH
        );
    }
    println!();
}

/// Print the regulators recognised in a free-form license string.
pub fn print_regulators(text: &str) {
    let set = extract_regulators(Some(text));
    println!("{}", format_regulators(&set));
    if !set.is_empty() {
        println!("  {:<26} {}", "count", set.len());
        println!("  {:<26} {:.1}", "average_weight", set.average_weight());
    }
    if set.is_unrecognized() {
        println!("  {:<26} yes", "unrecognized");
    }
}

fn print_section(header: &str, rows: &[(&str, Option<String>)]) {
    let has_data = rows
        .iter()
        .any(|(_, v)| v.as_deref().is_some_and(|s| !s.is_empty()));
    if !has_data {
        return;
    }
    println!("{header}");
    for (name, value) in rows {
        if let Some(value) = value
            && !value.is_empty()
        {
            println!("  {:<26} {}", name, value);
        }
    }
    println!();
}

fn print_list(items: &[String]) {
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

fn years_label(period: Option<&str>) -> String {
    let years = operating_years(period);
    if years > 0.0 {
        format!("{years:.0}")
    } else {
        "-".to_string()
    }
}

/// Shorten to `max` characters, ending in "..." when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
