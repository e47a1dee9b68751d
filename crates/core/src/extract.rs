use crate::record::{compose_location, NormalizedDeadline, RawConferenceRecord};
use crate::sources::ConferenceData;

const ABSTRACT_KIND: &str = "abstract";
const SUBMISSION_KIND: &str = "submission";

/// Collects current and future deadlines for `name` in source document order.
///
/// `name` is matched case-insensitively against source ids. A name with no
/// fetched source yields an empty list.
pub fn extract(name: &str, data: &ConferenceData, current_year: i32) -> Vec<NormalizedDeadline> {
    let Some(records) = data.get(&name.to_lowercase()) else {
        return Vec::new();
    };

    records
        .iter()
        .filter(|record| record.year.unwrap_or(0) >= current_year)
        .map(normalize)
        .collect()
}

fn normalize(record: &RawConferenceRecord) -> NormalizedDeadline {
    let mut deadline = NormalizedDeadline {
        name: record.title.clone().unwrap_or_default(),
        year: record.year.unwrap_or(0),
        date: record.deadline.clone().unwrap_or_default(),
        link: record.link.clone().unwrap_or_default(),
        location: compose_location(record.city.as_deref(), record.country.as_deref()),
        abstract_deadline: record.abstract_deadline.clone().unwrap_or_default(),
        venue: record.venue.clone().unwrap_or_default(),
        timezone: record.timezone.clone().unwrap_or_default(),
    };

    // Later entries of the same type overwrite earlier ones.
    for entry in record.deadlines.iter().flatten() {
        let date = entry.date.clone().unwrap_or_default();
        match entry.kind.as_deref() {
            Some(ABSTRACT_KIND) => deadline.abstract_deadline = date,
            Some(SUBMISSION_KIND) => deadline.date = date,
            _ => {}
        }
    }

    deadline
}

#[cfg(test)]
mod tests {
    use super::extract;
    use crate::record::{DeadlineEntry, RawConferenceRecord};
    use crate::sources::ConferenceData;

    fn record(year: i32) -> RawConferenceRecord {
        RawConferenceRecord {
            title: Some("ICLR".to_owned()),
            year: Some(year),
            deadline: Some(format!("{year}-01-01")),
            ..RawConferenceRecord::default()
        }
    }

    fn data_with(source_id: &str, records: Vec<RawConferenceRecord>) -> ConferenceData {
        let mut data = ConferenceData::default();
        data.insert(source_id, records);
        data
    }

    #[test]
    fn filters_out_past_years_and_keeps_document_order() {
        let data = data_with("iclr", vec![record(2025), record(2023), record(2024)]);

        let deadlines = extract("ICLR", &data, 2024);

        let years: Vec<i32> = deadlines.iter().map(|deadline| deadline.year).collect();
        assert_eq!(years, vec![2025, 2024]);
    }

    #[test]
    fn missing_year_is_treated_as_historical() {
        let mut undated = record(2030);
        undated.year = None;
        let data = data_with("iclr", vec![undated]);

        assert!(extract("iclr", &data, 2024).is_empty());
    }

    #[test]
    fn unknown_conference_yields_no_deadlines() {
        let data = data_with("iclr", vec![record(2030)]);
        assert!(extract("xyz123", &data, 2024).is_empty());
    }

    #[test]
    fn submission_sub_entry_overrides_flat_deadline() {
        let mut raw = record(2024);
        raw.deadline = Some("2024-01-01".to_owned());
        raw.deadlines = Some(vec![DeadlineEntry {
            kind: Some("submission".to_owned()),
            date: Some("2024-02-01".to_owned()),
        }]);
        let data = data_with("iclr", vec![raw]);

        let deadlines = extract("iclr", &data, 2024);
        assert_eq!(deadlines[0].date, "2024-02-01");
    }

    #[test]
    fn last_matching_sub_entry_wins() {
        let mut raw = record(2026);
        raw.abstract_deadline = Some("flat-abstract".to_owned());
        raw.deadlines = Some(vec![
            DeadlineEntry {
                kind: Some("abstract".to_owned()),
                date: Some("2025-09-01".to_owned()),
            },
            DeadlineEntry { kind: Some("rebuttal".to_owned()), date: Some("2025-11-01".to_owned()) },
            DeadlineEntry {
                kind: Some("submission".to_owned()),
                date: Some("2025-09-20".to_owned()),
            },
            DeadlineEntry { kind: Some("abstract".to_owned()), date: Some("2025-08-15".to_owned()) },
            DeadlineEntry { kind: Some("submission".to_owned()), date: None },
        ]);
        let data = data_with("iclr", vec![raw]);

        let deadlines = extract("iclr", &data, 2024);
        assert_eq!(deadlines[0].abstract_deadline, "2025-08-15");
        assert_eq!(deadlines[0].date, "");
    }

    #[test]
    fn flat_fields_are_carried_over() {
        let raw = RawConferenceRecord {
            title: Some("NeurIPS".to_owned()),
            year: Some(2030),
            deadline: Some("2030-05-15 23:59:59".to_owned()),
            abstract_deadline: Some("2030-05-08 23:59:59".to_owned()),
            link: Some("https://neurips.cc".to_owned()),
            country: Some("USA".to_owned()),
            venue: Some("Convention Center".to_owned()),
            timezone: Some("AoE".to_owned()),
            ..RawConferenceRecord::default()
        };
        let data = data_with("neurips", vec![raw]);

        let deadline = &extract("NeurIPS", &data, 2026)[0];
        assert_eq!(deadline.name, "NeurIPS");
        assert_eq!(deadline.date, "2030-05-15 23:59:59");
        assert_eq!(deadline.abstract_deadline, "2030-05-08 23:59:59");
        assert_eq!(deadline.link, "https://neurips.cc");
        assert_eq!(deadline.location, "USA");
        assert_eq!(deadline.venue, "Convention Center");
        assert_eq!(deadline.timezone, "AoE");
    }
}
