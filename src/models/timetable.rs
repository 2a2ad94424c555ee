use crate::models::user::ClassSection;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

/// A single period in the weekly schedule. `time` is a display label like
/// "09:30-10:30" and is also what the expiry rule parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetablePeriod {
    pub time: String,
    #[serde(rename = "class")]
    pub class_code: String,
    pub subject: String,
}

/// The weekly reference schedule, keyed by day and class section. Typed
/// keys mean unknown day or section names never make it past
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    pub days: BTreeMap<Day, BTreeMap<ClassSection, Vec<TimetablePeriod>>>,
}

/// What `GET /timetable` returns: the full table for staff, or a single
/// section's week for students.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TimetableView {
    Full(Timetable),
    Section(BTreeMap<Day, Vec<TimetablePeriod>>),
}

impl Timetable {
    /// The schedule shipped with the service, used until a principal
    /// replaces it.
    pub fn default_reference() -> Self {
        serde_json::from_str(include_str!("../../timetable.default.json"))
            .expect("embedded default timetable is valid")
    }

    /// Structural checks beyond what the types enforce. Returns the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.days.is_empty() {
            return Err("timetable must cover at least one day".to_string());
        }
        for (day, sections) in &self.days {
            if sections.is_empty() {
                return Err(format!("{:?} has no class sections", day));
            }
            for (section, periods) in sections {
                if periods.is_empty() {
                    return Err(format!("{:?}/{:?} has an empty period list", day, section));
                }
            }
        }
        Ok(())
    }

    pub fn section_view(&self, section: ClassSection) -> BTreeMap<Day, Vec<TimetablePeriod>> {
        self.days
            .iter()
            .filter_map(|(day, sections)| sections.get(&section).map(|periods| (*day, periods.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reference_parses_and_validates() {
        let timetable = Timetable::default_reference();
        assert!(timetable.validate().is_ok());
        assert_eq!(timetable.days.len(), 6);

        let monday = &timetable.days[&Day::Monday];
        assert_eq!(monday[&ClassSection::A5].len(), 6);
        assert_eq!(monday[&ClassSection::A5][0].subject, "Mathematics");
        assert_eq!(monday[&ClassSection::A5][0].class_code, "MC");
    }

    #[test]
    fn unknown_day_names_are_rejected_at_parse_time() {
        let result = serde_json::from_str::<Timetable>(
            r#"{"Funday": {"A5": [{"time": "09:30-10:30", "class": "MC", "subject": "Mathematics"}]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_names_are_rejected_at_parse_time() {
        let result = serde_json::from_str::<Timetable>(
            r#"{"Monday": {"B9": [{"time": "09:30-10:30", "class": "MC", "subject": "Mathematics"}]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_list_period_values_are_rejected_at_parse_time() {
        let result = serde_json::from_str::<Timetable>(r#"{"Monday": {"A5": "not a list"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_empty_structures() {
        let empty: Timetable = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_err());

        let empty_periods: Timetable = serde_json::from_str(r#"{"Monday": {"A5": []}}"#).unwrap();
        assert!(empty_periods.validate().is_err());
    }

    #[test]
    fn section_view_only_contains_that_section() {
        let timetable = Timetable::default_reference();
        let view = timetable.section_view(ClassSection::A6);
        assert_eq!(view.len(), 6);
        assert_eq!(view[&Day::Tuesday][1].class_code, "COMM LAB");
    }
}
