use crate::reference::{sort_options, SelectOption};

/// IANA zones offered for offices, with their display names.
pub const US_TIME_ZONES: &[(&str, &str)] = &[
    ("America/New_York", "Eastern Time"),
    ("America/Detroit", "Eastern Time - Michigan"),
    ("America/Indiana/Indianapolis", "Eastern Time - Indiana"),
    ("America/Chicago", "Central Time"),
    ("America/Denver", "Mountain Time"),
    ("America/Boise", "Mountain Time - Idaho"),
    ("America/Phoenix", "Mountain Standard Time - Arizona"),
    ("America/Los_Angeles", "Pacific Time"),
    ("America/Anchorage", "Alaska Time"),
    ("America/Adak", "Hawaii-Aleutian Time - Aleutian Islands"),
    ("Pacific/Honolulu", "Hawaii-Aleutian Standard Time"),
    ("America/Puerto_Rico", "Atlantic Standard Time"),
    ("Pacific/Guam", "Chamorro Standard Time"),
];

#[must_use]
pub fn us_time_zone_options() -> Vec<SelectOption> {
    let mut options: Vec<_> = US_TIME_ZONES
        .iter()
        .map(|(id, name)| SelectOption::new(*id, *name))
        .collect();
    sort_options(&mut options);
    options
}

#[must_use]
pub fn is_us_time_zone(id: &str) -> bool {
    US_TIME_ZONES.iter().any(|(zone, _)| *zone == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_sorted_and_complete() {
        let options = us_time_zone_options();
        assert_eq!(options.len(), US_TIME_ZONES.len());
        assert_eq!(options[0].text, "Alaska Time");
        assert!(options
            .windows(2)
            .all(|w| w[0].text.to_lowercase() <= w[1].text.to_lowercase()));
    }

    #[test]
    fn knows_its_zones() {
        assert!(is_us_time_zone("America/Chicago"));
        assert!(!is_us_time_zone("Europe/Paris"));
    }
}
