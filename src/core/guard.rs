/// Consistency guard: predicates that decide which phrasings may appear
/// together, expressed as the context tag set the phrasebook is filtered by.
use rustc_hash::FxHashSet;

use crate::core::config::EngineConfig;
use crate::core::normalize::is_blank;
use crate::core::sanitize::FULL_STOP;
use crate::core::timefmt::parse_start_hour;
use crate::schema::crowd::CrowdLevel;
use crate::schema::record::{ObservationRecord, ServicePeriod};

pub const TAG_CALM_START: &str = "start:calm";
pub const TAG_CLOSED_OPENING: &str = "opening:closed";

/// A "calm start" opening is only truthful for lunch, and only when the
/// peak did not begin before the configured hour.
pub fn can_open_calmly(record: &ObservationRecord, config: &EngineConfig) -> bool {
    if record.service != ServicePeriod::Lunch {
        return false;
    }
    match parse_start_hour(&record.peak_range) {
        Some(hour) => hour >= config.calm_start_from_hour,
        None => {
            tracing::warn!(peak = %record.peak_range, "peak start hour unparseable, using brisk opening");
            false
        }
    }
}

/// Dinner may mention tidying up, but only on a quiet night.
pub fn allows_tidying(service: ServicePeriod, crowd: CrowdLevel) -> bool {
    service == ServicePeriod::Dinner && crowd == CrowdLevel::Quiet
}

/// Lunch never talks about closing work.
pub fn bans_closing_vocabulary(service: ServicePeriod) -> bool {
    service == ServicePeriod::Lunch
}

/// Dinner may quote the raw crowd feel next to the peak. Lunch only ever
/// quotes it as the closing aside, so the two never appear together.
pub fn quotes_feel_inline(service: ServicePeriod) -> bool {
    service == ServicePeriod::Dinner
}

/// An opening that already ends its sentence takes the shorter start pool,
/// whose phrasings read as a continuation.
pub fn opening_is_closed(opening: &str) -> bool {
    opening.ends_with(FULL_STOP)
}

/// Tags every phrasebook variant is evaluated against.
pub fn context_tags(
    record: &ObservationRecord,
    crowd: CrowdLevel,
    config: &EngineConfig,
) -> FxHashSet<String> {
    let mut tags = FxHashSet::default();
    tags.insert(record.service.tag().to_string());
    tags.insert(crowd.tag().to_string());

    if can_open_calmly(record, config) {
        tags.insert(TAG_CALM_START.to_string());
    }
    if allows_tidying(record.service, crowd) {
        tags.insert("allow:tidying".to_string());
    }

    let present = [
        ("has:weather", !is_blank(&record.weather)),
        ("has:customers", !record.customers().is_empty()),
        ("has:peak", !is_blank(&record.peak_range)),
        ("has:best_sellers", !record.best_sellers().is_empty()),
        ("has:feel", !is_blank(&record.crowd_feel)),
        ("has:event", record.event_name().is_some()),
        ("has:notice", !is_blank(&record.notice)),
    ];
    for (tag, on) in present {
        if on {
            tags.insert(tag.to_string());
        }
    }

    tracing::debug!(?tags, "context tags");
    tags
}
