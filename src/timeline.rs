//! Merges upcoming anniversaries with the sponsored pool into the ordered
//! sequence shown to the user.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{anniversary::Anniversary, sponsored::SponsoredItem};

/// Every third slot after the first gets a sponsored item.
const SPONSORED_CADENCE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsoredEntry {
    pub item: SponsoredItem,
    /// Host anniversary target plus one second. Display only.
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    Anniversary(Anniversary),
    Sponsored(SponsoredEntry),
}

impl TimelineEntry {
    pub fn id(&self) -> &str {
        match self {
            TimelineEntry::Anniversary(anniversary) => anniversary.id.as_str(),
            TimelineEntry::Sponsored(entry) => &entry.item.id,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Anniversary(anniversary) => anniversary.target,
            TimelineEntry::Sponsored(entry) => entry.date,
        }
    }

    pub fn is_sponsored(&self) -> bool {
        matches!(self, TimelineEntry::Sponsored(_))
    }
}

fn takes_sponsored_slot(position: usize) -> bool {
    position == 0 || (position + 1) % SPONSORED_CADENCE == 0
}

/// Upcoming anniversaries sorted by target (stable), with one sponsored item
/// spliced in after positions 0, 2, 5, 8, ... drawn round-robin from `pool`.
pub fn compose_timeline(
    anniversaries: &[Anniversary],
    pool: &[SponsoredItem],
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let mut upcoming = anniversaries
        .iter()
        .filter(|anniversary| anniversary.target > now)
        .collect::<Vec<_>>();
    upcoming.sort_by_key(|anniversary| anniversary.target);

    let mut timeline = Vec::with_capacity(upcoming.len() + upcoming.len() / SPONSORED_CADENCE + 1);
    let mut pointer = 0;

    for (position, anniversary) in upcoming.into_iter().enumerate() {
        timeline.push(TimelineEntry::Anniversary(anniversary.clone()));

        if !takes_sponsored_slot(position) || pool.is_empty() {
            continue;
        }

        let item = pool[pointer % pool.len()].clone();
        pointer += 1;
        timeline.push(TimelineEntry::Sponsored(SponsoredEntry {
            item,
            date: anniversary.target + TimeDelta::seconds(1),
        }));
    }

    timeline
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// The `index`th page of `page_size` entries; empty past the end.
pub fn page<T>(entries: &[T], index: usize, page_size: usize) -> &[T] {
    let Some(start) = index.checked_mul(page_size) else {
        return &[];
    };
    if start >= entries.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(entries.len());
    &entries[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingLabel {
    Ended,
    Days(i64),
    Hours(i64),
    Minutes(i64),
}

pub fn remaining_label(target: DateTime<Utc>, now: DateTime<Utc>) -> RemainingLabel {
    let remaining = target - now;
    if remaining < TimeDelta::zero() {
        return RemainingLabel::Ended;
    }

    if remaining.num_days() >= 1 {
        RemainingLabel::Days(remaining.num_days())
    } else if remaining.num_hours() >= 1 {
        RemainingLabel::Hours(remaining.num_hours())
    } else {
        RemainingLabel::Minutes(remaining.num_minutes())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::anniversary::AnniversaryId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn anniversary(id: &str, target: DateTime<Utc>) -> Anniversary {
        Anniversary {
            id: AnniversaryId::from(id),
            name: id.to_owned(),
            target,
            alarm_enabled: false,
            alarm_triggered: false,
            alarm_sound_id: None,
        }
    }

    fn in_days(id: &str, days: i64) -> Anniversary {
        anniversary(id, now() + TimeDelta::days(days))
    }

    fn ad(id: &str) -> SponsoredItem {
        SponsoredItem {
            id: id.to_owned(),
            headline: id.to_owned(),
            body: String::new(),
            image_ref: None,
            call_to_action: String::new(),
            advertiser_name: "Advertiser".to_owned(),
        }
    }

    fn ids(timeline: &[TimelineEntry]) -> Vec<&str> {
        timeline.iter().map(TimelineEntry::id).collect()
    }

    #[test]
    fn splices_ads_after_first_and_every_third() {
        let anniversaries = vec![
            in_days("ann1", 1),
            in_days("ann2", 2),
            in_days("ann3", 5),
            in_days("ann4", 6),
            in_days("ann5", 9),
        ];

        let timeline = compose_timeline(&anniversaries, &[ad("adA"), ad("adB")], now());

        assert_eq!(
            ids(&timeline),
            vec!["ann1", "adA", "ann2", "ann3", "adB", "ann4", "ann5"]
        );
        assert_eq!(timeline[1].date(), now() + TimeDelta::days(1) + TimeDelta::seconds(1));
        assert_eq!(timeline[4].date(), now() + TimeDelta::days(5) + TimeDelta::seconds(1));
    }

    #[test]
    fn pool_wraps_round_robin() {
        let anniversaries = (1..=9).map(|d| in_days(&format!("a{}", d), d)).collect::<Vec<_>>();

        let timeline = compose_timeline(&anniversaries, &[ad("x"), ad("y")], now());

        let sponsored = timeline
            .iter()
            .filter(|e| e.is_sponsored())
            .map(TimelineEntry::id)
            .collect::<Vec<_>>();
        assert_eq!(sponsored, vec!["x", "y", "x", "y"]);
    }

    #[test]
    fn no_anniversaries_means_empty_timeline() {
        assert!(compose_timeline(&[], &[ad("adA")], now()).is_empty());
    }

    #[test]
    fn empty_pool_leaves_only_anniversaries() {
        let anniversaries = vec![in_days("a", 1), in_days("b", 2), in_days("c", 3)];

        let timeline = compose_timeline(&anniversaries, &[], now());

        assert_eq!(ids(&timeline), vec!["a", "b", "c"]);
    }

    #[test]
    fn sorts_by_target_keeping_ties_in_order() {
        let anniversaries = vec![
            in_days("late", 10),
            in_days("tie-first", 3),
            in_days("tie-second", 3),
            in_days("early", 1),
        ];

        let timeline = compose_timeline(&anniversaries, &[], now());

        assert_eq!(ids(&timeline), vec!["early", "tie-first", "tie-second", "late"]);
    }

    #[test]
    fn present_instant_is_excluded() {
        let anniversaries = vec![anniversary("now", now()), in_days("later", 1)];

        let timeline = compose_timeline(&anniversaries, &[ad("adA")], now());

        assert_eq!(ids(&timeline), vec!["later", "adA"]);
    }

    #[proptest]
    fn past_anniversaries_never_appear(
        #[strategy(proptest::collection::vec((-50i64..50, any::<bool>()), 0..30))] offsets: Vec<(i64, bool)>,
    ) {
        let anniversaries = offsets
            .iter()
            .enumerate()
            .map(|(i, (hours, triggered))| {
                let mut a = anniversary(&format!("a{}", i), now() + TimeDelta::hours(*hours));
                a.alarm_triggered = *triggered;
                a
            })
            .collect::<Vec<_>>();

        let timeline = compose_timeline(&anniversaries, &[ad("adA")], now());

        let upcoming = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Anniversary(a) => Some(a),
                TimelineEntry::Sponsored(_) => None,
            })
            .collect::<Vec<_>>();
        prop_assert!(upcoming.iter().all(|a| a.target > now()));
        prop_assert_eq!(
            upcoming.len(),
            offsets.iter().filter(|(hours, _)| *hours > 0).count()
        );
        prop_assert!(upcoming.windows(2).all(|w| w[0].target <= w[1].target));
    }

    #[test]
    fn pages_are_fixed_size() {
        let entries = (0..7).collect::<Vec<_>>();

        assert_eq!(page_count(entries.len(), 3), 3);
        assert_eq!(page(&entries, 0, 3), &[0, 1, 2]);
        assert_eq!(page(&entries, 2, 3), &[6]);
        assert!(page(&entries, 3, 3).is_empty());
        assert_eq!(page_count(0, 3), 0);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn remaining_labels_pick_largest_whole_unit() {
        let n = now();

        assert_eq!(remaining_label(n - TimeDelta::seconds(1), n), RemainingLabel::Ended);
        assert_eq!(remaining_label(n + TimeDelta::hours(49), n), RemainingLabel::Days(2));
        assert_eq!(remaining_label(n + TimeDelta::minutes(150), n), RemainingLabel::Hours(2));
        assert_eq!(remaining_label(n + TimeDelta::seconds(150), n), RemainingLabel::Minutes(2));
        assert_eq!(remaining_label(n, n), RemainingLabel::Minutes(0));
    }
}
