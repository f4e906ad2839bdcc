use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;

use crate::models::{Modality, ScheduleInput, ServiceType};

/// Day arithmetic mode for a milestone offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOffset {
    Calendar(i64),
    Business(i64),
}

impl DayOffset {
    pub fn apply(self, start: NaiveDate) -> NaiveDate {
        match self {
            DayOffset::Calendar(n) => start + chrono::Duration::days(n),
            DayOffset::Business(n) => add_business_days(start, n),
        }
    }
}

/// Moves forward `days` weekdays, skipping Saturdays and Sundays. Zero or
/// negative offsets return the start date unchanged.
pub fn add_business_days(start: NaiveDate, days: i64) -> NaiveDate {
    let mut date = start;
    let mut remaining = days;
    while remaining > 0 {
        date += chrono::Duration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

/// One row of the rule table. `remote_offset` replaces `offset` for remote
/// engagements, `extended_offset` replaces it when the project meets the
/// room threshold. Extension wins when both would apply.
#[derive(Debug, Clone)]
pub struct MilestoneRule {
    pub title: &'static str,
    pub description: &'static str,
    pub offset: DayOffset,
    pub remote_offset: Option<DayOffset>,
    pub extended_offset: Option<DayOffset>,
    pub key_event: bool,
}

impl MilestoneRule {
    fn fixed(title: &'static str, description: &'static str, offset: DayOffset) -> Self {
        MilestoneRule {
            title,
            description,
            offset,
            remote_offset: None,
            extended_offset: None,
            key_event: false,
        }
    }

    fn key(mut self) -> Self {
        self.key_event = true;
        self
    }

    fn remote(mut self, offset: DayOffset) -> Self {
        self.remote_offset = Some(offset);
        self
    }

    fn extended(mut self, offset: DayOffset) -> Self {
        self.extended_offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServiceRules {
    pub milestones: Vec<MilestoneRule>,
    /// Fixed label, not derived from the milestone list.
    pub expected_meetings: &'static str,
}

/// Versioned rule table. Derivation takes the table as input so amended
/// tables can be exercised without touching renderer code.
#[derive(Debug, Clone)]
pub struct TimelineRules {
    pub version: u32,
    /// Projects with at least this many rooms use the extended offsets.
    pub room_threshold: u32,
    pub advisory: ServiceRules,
    pub express: ServiceRules,
    pub full_project: ServiceRules,
    pub turnkey: ServiceRules,
}

impl TimelineRules {
    pub fn current() -> &'static TimelineRules {
        &RULES_V1
    }

    pub fn for_service(&self, service: ServiceType) -> &ServiceRules {
        match service {
            ServiceType::Advisory => &self.advisory,
            ServiceType::Express => &self.express,
            ServiceType::FullProject => &self.full_project,
            ServiceType::Turnkey => &self.turnkey,
        }
    }
}

static RULES_V1: Lazy<TimelineRules> = Lazy::new(|| {
    use DayOffset::{Business, Calendar};

    TimelineRules {
        version: 1,
        room_threshold: 3,
        advisory: ServiceRules {
            expected_meetings: "2 working sessions",
            milestones: vec![
                MilestoneRule::fixed(
                    "Kickoff consultation",
                    "Working session to align on scope, style direction and budget.",
                    Calendar(0),
                )
                .key(),
                MilestoneRule::fixed(
                    "Concept boards",
                    "Curated boards with palette, materials and key furniture directions.",
                    Business(5),
                ),
                MilestoneRule::fixed(
                    "Advisory report",
                    "Final recommendations with sourcing guidance and next steps.",
                    Business(10),
                )
                .key(),
            ],
        },
        express: ServiceRules {
            expected_meetings: "2 meetings",
            milestones: vec![
                MilestoneRule::fixed(
                    "Kickoff & brief",
                    "Short alignment call to confirm rooms, budget and priorities.",
                    Calendar(0),
                )
                .key(),
                MilestoneRule::fixed(
                    "Moodboard review",
                    "Style direction review over the proposed moodboards.",
                    Business(3),
                )
                .remote(Business(2)),
                MilestoneRule::fixed(
                    "Design package delivery",
                    "Layout, shopping list and styling notes for every room in scope.",
                    Business(7),
                ),
                MilestoneRule::fixed(
                    "Styling session",
                    "Styling walkthrough and final adjustments.",
                    Business(12),
                )
                .remote(Business(10))
                .key(),
            ],
        },
        full_project: ServiceRules {
            expected_meetings: "4 meetings",
            milestones: vec![
                MilestoneRule::fixed(
                    "Kickoff meeting",
                    "Project kickoff covering scope, constraints and timeline.",
                    Calendar(0),
                )
                .key(),
                MilestoneRule::fixed(
                    "Site survey",
                    "Measurements and technical notes for every room in scope.",
                    Business(5),
                )
                .remote(Business(3)),
                MilestoneRule::fixed(
                    "Concept presentation",
                    "Concept boards, layout options and budget range.",
                    Business(15),
                )
                .key(),
                MilestoneRule::fixed(
                    "Design development",
                    "Detailed drawings, finishes and final selections.",
                    Business(25),
                ),
                MilestoneRule::fixed(
                    "Deliverables production",
                    "Production of plans, specifications and purchase lists.",
                    Business(35),
                )
                .extended(Business(40)),
                MilestoneRule::fixed(
                    "Final presentation & handover",
                    "Complete design package walkthrough and handover.",
                    Business(45),
                )
                .extended(Business(50))
                .key(),
            ],
        },
        turnkey: ServiceRules {
            expected_meetings: "5 meetings",
            milestones: vec![
                MilestoneRule::fixed(
                    "Kickoff meeting",
                    "Project kickoff covering scope, constraints and timeline.",
                    Calendar(0),
                )
                .key(),
                MilestoneRule::fixed(
                    "Site survey & technical review",
                    "Measurements plus electrical, plumbing and finish review.",
                    Business(5),
                ),
                MilestoneRule::fixed(
                    "Concept presentation",
                    "Concept boards, layout options and budget range.",
                    Business(20),
                )
                .key(),
                MilestoneRule::fixed(
                    "Detailed design & procurement list",
                    "Final drawings with the complete procurement list.",
                    Business(35),
                )
                .extended(Business(40)),
                MilestoneRule::fixed(
                    "Ordering & production",
                    "Purchase orders placed, custom pieces in production.",
                    Business(45),
                )
                .extended(Business(50)),
                MilestoneRule::fixed(
                    "Delivery & installation",
                    "Coordinated delivery and installation across all rooms.",
                    Calendar(75),
                )
                .extended(Calendar(85)),
                MilestoneRule::fixed(
                    "Reveal & handover",
                    "Final styling, reveal and project handover.",
                    Calendar(80),
                )
                .extended(Calendar(90))
                .key(),
            ],
        },
    }
});

/// Dated entry of a derived timeline.
#[derive(Debug, Clone)]
pub struct Milestone {
    pub title: &'static str,
    pub description: &'static str,
    pub date: NaiveDate,
    pub key_event: bool,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub service: ServiceType,
    pub milestones: Vec<Milestone>,
    /// Days between the first and last milestone.
    pub total_days: i64,
    pub expected_meetings: &'static str,
    pub rules_version: u32,
}

/// Derives the dated milestone sequence for one schedule input. Dates come
/// from the rule table only, never from the payload.
pub fn derive_timeline(rules: &TimelineRules, input: &ScheduleInput) -> Timeline {
    let remote = input.modality == Modality::Remote;
    let extended = input.room_count >= rules.room_threshold;
    let service_rules = rules.for_service(input.service);

    let milestones: Vec<Milestone> = service_rules
        .milestones
        .iter()
        .map(|rule| {
            let extension = if extended { rule.extended_offset } else { None };
            let remote_swap = if remote { rule.remote_offset } else { None };
            let offset = extension.or(remote_swap).unwrap_or(rule.offset);
            Milestone {
                title: rule.title,
                description: rule.description,
                date: offset.apply(input.start_date),
                key_event: rule.key_event,
            }
        })
        .collect();

    let total_days = match (milestones.first(), milestones.last()) {
        (Some(first), Some(last)) => last.date.signed_duration_since(first.date).num_days(),
        _ => 0,
    };

    Timeline {
        service: input.service,
        milestones,
        total_days,
        expected_meetings: service_rules.expected_meetings,
        rules_version: rules.version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(service: ServiceType, modality: Modality, rooms: u32) -> ScheduleInput {
        ScheduleInput {
            service,
            // A Monday.
            start_date: date(2025, 3, 3),
            modality,
            room_count: rooms,
        }
    }

    #[test]
    fn business_day_addition_skips_weekends() {
        // 2025-03-07 is a Friday.
        assert_eq!(add_business_days(date(2025, 3, 7), 1), date(2025, 3, 10));
        // Saturday start walks to Monday on the first hop.
        assert_eq!(add_business_days(date(2025, 3, 8), 1), date(2025, 3, 10));
        assert_eq!(add_business_days(date(2025, 3, 3), 5), date(2025, 3, 10));
        assert_eq!(add_business_days(date(2025, 3, 3), 0), date(2025, 3, 3));
    }

    #[test]
    fn express_in_person_matches_the_offset_table() {
        let timeline = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::Express, Modality::InPerson, 1),
        );
        let dates: Vec<NaiveDate> = timeline.milestones.iter().map(|m| m.date).collect();
        assert_eq!(
            dates,
            [date(2025, 3, 3), date(2025, 3, 6), date(2025, 3, 12), date(2025, 3, 19)]
        );
        assert_eq!(timeline.total_days, 16);
        assert_eq!(timeline.expected_meetings, "2 meetings");
    }

    #[test]
    fn remote_modality_only_moves_conditioned_milestones() {
        let in_person = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::Express, Modality::InPerson, 1),
        );
        let remote = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::Express, Modality::Remote, 1),
        );

        assert_eq!(remote.milestones[0].date, in_person.milestones[0].date);
        assert_eq!(remote.milestones[2].date, in_person.milestones[2].date);
        assert_eq!(remote.milestones[1].date, date(2025, 3, 5));
        assert_eq!(remote.milestones[3].date, date(2025, 3, 17));
    }

    #[test]
    fn three_rooms_extend_the_production_phase() {
        let small = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::FullProject, Modality::InPerson, 2),
        );
        let large = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::FullProject, Modality::InPerson, 3),
        );

        // Business(35) vs Business(40) from a Monday start.
        assert_eq!(small.milestones[4].date, date(2025, 4, 21));
        assert_eq!(large.milestones[4].date, date(2025, 4, 28));
        // The handover shifts with it.
        assert_eq!(small.milestones[5].date, date(2025, 5, 5));
        assert_eq!(large.milestones[5].date, date(2025, 5, 12));
        // Earlier milestones are untouched.
        assert_eq!(small.milestones[2].date, large.milestones[2].date);
    }

    #[test]
    fn turnkey_ignores_modality() {
        let in_person = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::Turnkey, Modality::InPerson, 1),
        );
        let remote = derive_timeline(
            TimelineRules::current(),
            &input(ServiceType::Turnkey, Modality::Remote, 1),
        );
        let a: Vec<NaiveDate> = in_person.milestones.iter().map(|m| m.date).collect();
        let b: Vec<NaiveDate> = remote.milestones.iter().map(|m| m.date).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn every_service_yields_ordered_dates_from_the_start() {
        for service in [
            ServiceType::Advisory,
            ServiceType::Express,
            ServiceType::FullProject,
            ServiceType::Turnkey,
        ] {
            let timeline = derive_timeline(
                TimelineRules::current(),
                &input(service, Modality::InPerson, 4),
            );
            assert!(!timeline.milestones.is_empty());
            assert_eq!(timeline.milestones[0].date, date(2025, 3, 3));
            assert!(timeline
                .milestones
                .windows(2)
                .all(|w| w[0].date <= w[1].date));
            assert!(timeline.milestones.iter().any(|m| m.key_event));
            assert_eq!(
                timeline.total_days,
                timeline
                    .milestones
                    .last()
                    .map(|m| m.date.signed_duration_since(date(2025, 3, 3)).num_days())
                    .unwrap_or(0)
            );
        }
    }

    #[test]
    fn amended_rule_tables_are_honored() {
        let mut rules = TimelineRules::current().clone();
        rules.version = 2;
        rules.room_threshold = 2;

        let timeline =
            derive_timeline(&rules, &input(ServiceType::FullProject, Modality::InPerson, 2));
        assert_eq!(timeline.rules_version, 2);
        // Two rooms now trigger the extension.
        assert_eq!(timeline.milestones[4].date, date(2025, 4, 28));
    }

    #[test]
    fn extension_wins_over_remote_when_both_apply() {
        // "Moodboard review" already carries remote Business(2); give it an
        // extension too so one milestone satisfies both conditions.
        let mut rules = TimelineRules::current().clone();
        rules.express.milestones[1].extended_offset = Some(DayOffset::Business(6));

        let timeline =
            derive_timeline(&rules, &input(ServiceType::Express, Modality::Remote, 3));
        // Business(6) from the Monday start, not the remote Business(2).
        assert_eq!(timeline.milestones[1].date, date(2025, 3, 11));
    }
}
