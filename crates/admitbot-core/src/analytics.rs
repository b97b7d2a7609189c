//! Lead analytics, recomputed from the full lead list on every call.
//!
//! Nothing here is maintained incrementally, so every count always equals
//! a recount over the leads passed in.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, TimeZone};
use serde::Serialize;

use crate::models::{Lead, LeadStatus};

/// Aggregate snapshot returned by `GET /api/leads/analytics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAnalytics {
    pub total_leads: usize,
    pub leads_today: usize,
    pub leads_this_week: usize,
    pub leads_this_month: usize,
    /// Percentage of leads with status `enrolled`; `0.0` with no leads.
    pub conversion_rate: f64,
    /// Lead count per source; only sources that occur are present.
    pub source_breakdown: BTreeMap<String, usize>,
    /// Lead count per status; all four statuses are always present.
    pub status_breakdown: BTreeMap<LeadStatus, usize>,
}

impl LeadAnalytics {
    /// Compute analytics relative to `now`.
    ///
    /// "Today" is the calendar day of `now` in `now`'s own time zone, so the
    /// server passes `Local::now()` and tests can pin a fixed zone.
    pub fn compute<Tz: TimeZone>(leads: &[Lead], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let week_ago = now.clone() - Duration::days(7);
        let month_ago = now
            .clone()
            .checked_sub_months(Months::new(1))
            .unwrap_or_else(|| week_ago.clone());

        let mut source_breakdown = BTreeMap::new();
        let mut status_breakdown: BTreeMap<LeadStatus, usize> =
            LeadStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut leads_today = 0;
        let mut leads_this_week = 0;
        let mut leads_this_month = 0;

        for lead in leads {
            let ts = lead.timestamp.with_timezone(&tz);
            if ts.date_naive() == today {
                leads_today += 1;
            }
            if ts >= week_ago {
                leads_this_week += 1;
            }
            if ts >= month_ago {
                leads_this_month += 1;
            }
            *source_breakdown.entry(lead.source.clone()).or_insert(0) += 1;
            *status_breakdown.entry(lead.status).or_insert(0) += 1;
        }

        let total_leads = leads.len();
        let enrolled = status_breakdown[&LeadStatus::Enrolled];
        let conversion_rate = if total_leads == 0 {
            0.0
        } else {
            enrolled as f64 / total_leads as f64 * 100.0
        };

        Self {
            total_leads,
            leads_today,
            leads_this_week,
            leads_this_month,
            conversion_rate,
            source_breakdown,
            status_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadUpdate, NewLead};
    use chrono::{FixedOffset, Utc};

    fn lead_at(source: &str, ts: DateTime<Utc>) -> Lead {
        NewLead {
            name: Some("Jo".into()),
            email: Some("jo@x.com".into()),
            source: Some(source.into()),
            ..Default::default()
        }
        .into_lead(ts)
        .unwrap()
    }

    #[test]
    fn test_empty() {
        let a = LeadAnalytics::compute(&[], &Utc::now());
        assert_eq!(a.total_leads, 0);
        assert_eq!(a.conversion_rate, 0.0);
        assert!(a.source_breakdown.is_empty());
        assert_eq!(a.status_breakdown.len(), 4);
        assert!(a.status_breakdown.values().all(|n| *n == 0));
    }

    #[test]
    fn test_counts_and_conversion() {
        let now = Utc::now();
        let mut leads = vec![
            lead_at("chatbot", now),
            lead_at("voice", now),
            lead_at("chatbot", now),
            lead_at("direct", now),
        ];
        leads[0].apply(
            &LeadUpdate {
                status: Some(LeadStatus::Enrolled),
                notes: None,
            },
            now,
        );

        let a = LeadAnalytics::compute(&leads, &now);
        assert_eq!(a.total_leads, 4);
        assert_eq!(a.leads_today, 4);
        assert_eq!(a.conversion_rate, 25.0);
        assert_eq!(a.source_breakdown["chatbot"], 2);
        assert_eq!(a.source_breakdown["voice"], 1);
        assert_eq!(a.status_breakdown[&LeadStatus::Enrolled], 1);
        assert_eq!(a.status_breakdown[&LeadStatus::New], 3);
    }

    #[test]
    fn test_status_change_moves_one_count() {
        let now = Utc::now();
        let mut leads = vec![lead_at("chatbot", now), lead_at("chatbot", now)];
        let before = LeadAnalytics::compute(&leads, &now);

        leads[1].apply(
            &LeadUpdate {
                status: Some(LeadStatus::Qualified),
                notes: None,
            },
            now,
        );
        let after = LeadAnalytics::compute(&leads, &now);

        assert_eq!(
            after.status_breakdown[&LeadStatus::New],
            before.status_breakdown[&LeadStatus::New] - 1
        );
        assert_eq!(
            after.status_breakdown[&LeadStatus::Qualified],
            before.status_breakdown[&LeadStatus::Qualified] + 1
        );
        assert_eq!(after.total_leads, before.total_leads);
    }

    #[test]
    fn test_today_uses_callers_time_zone() {
        // 23:30 UTC is already the next day at UTC+2.
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let leads = vec![lead_at("chatbot", ts)];

        let utc_now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 45, 0).unwrap();
        assert_eq!(LeadAnalytics::compute(&leads, &utc_now).leads_today, 1);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = plus_two.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(LeadAnalytics::compute(&leads, &local_now).leads_today, 0);
    }

    #[test]
    fn test_week_and_month_windows() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let leads = vec![
            lead_at("chatbot", now - Duration::days(1)),
            lead_at("chatbot", now - Duration::days(10)),
            lead_at("chatbot", now - Duration::days(40)),
        ];
        let a = LeadAnalytics::compute(&leads, &now);
        assert_eq!(a.leads_today, 0);
        assert_eq!(a.leads_this_week, 1);
        assert_eq!(a.leads_this_month, 2);
        assert_eq!(a.total_leads, 3);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(LeadAnalytics::compute(&[], &Utc::now())).unwrap();
        assert_eq!(json["totalLeads"], 0);
        assert_eq!(json["statusBreakdown"]["enrolled"], 0);
        assert!(json["sourceBreakdown"].is_object());
    }
}
