//! Pure report computation over a window of messages.
//!
//! [`compute_report`] takes messages (with their sending users) and returns the overview plus the
//! chart series. Nothing is cached; callers recompute per request.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, TimeZone, Timelike, Utc};
use inbox_core::{Channel, Direction, MessageStatus, MessageWithUser};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub overview: Overview,
    pub charts: Charts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_messages: usize,
    pub total_conversations: usize,
    /// Minutes, one decimal.
    pub average_response_time: f64,
    /// Percent, one decimal.
    pub success_rate: f64,
    pub inbound_count: usize,
    pub outbound_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub volume_over_time: Vec<DailyCount>,
    pub channel_distribution: Vec<ChannelCount>,
    pub channel_distribution_with_direction: Vec<ChannelDirectionCount>,
    pub status_breakdown: Vec<StatusCount>,
    pub response_time_over_time: Vec<DailyResponseTime>,
    pub responses_by_user: Vec<UserCount>,
    pub messages_by_user: Vec<UserCount>,
    pub hourly_activity: Vec<HourlyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCount {
    pub channel: Channel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDirectionCount {
    pub channel: Channel,
    pub direction: Direction,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: MessageStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponseTime {
    pub date: String,
    pub average_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCount {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub count: usize,
}

/// Entries kept in each per-user series.
pub const TOP_USERS: usize = 10;

/// Rounds half up to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

fn day_key(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn minutes_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> f64 {
    (*later - *earlier).num_milliseconds() as f64 / 60_000.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// A user reply directly following an inbound message on the same thread.
fn is_reply_to(previous: &MessageWithUser, current: &MessageWithUser) -> bool {
    previous.message.thread_id == current.message.thread_id
        && previous.message.is_inbound()
        && current.message.is_user_reply()
}

/// Computes the report. Hour-of-day buckets use `tz`; day keys are UTC dates.
pub fn compute_report<Tz: TimeZone>(messages: &[MessageWithUser], tz: &Tz) -> AnalyticsReport {
    let mut sorted: Vec<&MessageWithUser> = messages.iter().collect();
    sorted.sort_by_key(|m| m.message.created_at);

    AnalyticsReport {
        overview: overview(&sorted),
        charts: Charts {
            volume_over_time: volume_over_time(&sorted),
            channel_distribution: count_by(&sorted, |m| m.message.channel)
                .into_iter()
                .map(|(channel, count)| ChannelCount { channel, count })
                .collect(),
            channel_distribution_with_direction: count_by(&sorted, |m| {
                (m.message.channel, m.message.direction)
            })
            .into_iter()
            .map(|((channel, direction), count)| ChannelDirectionCount {
                channel,
                direction,
                count,
            })
            .collect(),
            status_breakdown: count_by(&sorted, |m| m.message.status)
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            response_time_over_time: response_time_over_time(&sorted),
            responses_by_user: top_users(
                sorted
                    .iter()
                    .copied()
                    .filter(|m| m.message.direction == Direction::Outbound),
            ),
            messages_by_user: top_users(sorted.iter().copied()),
            hourly_activity: hourly_activity(&sorted, tz),
        },
    }
}

fn overview(sorted: &[&MessageWithUser]) -> Overview {
    let total = sorted.len();
    let threads: HashSet<&str> = sorted.iter().map(|m| m.message.thread_id.as_str()).collect();
    let inbound = sorted.iter().filter(|m| m.message.is_inbound()).count();
    let successful = sorted.iter().filter(|m| m.message.status.is_success()).count();

    let success_rate = if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    };

    Overview {
        total_messages: total,
        total_conversations: threads.len(),
        average_response_time: round1(mean(&thread_response_times(sorted))),
        success_rate: round1(success_rate),
        inbound_count: inbound,
        outbound_count: total - inbound,
    }
}

/// Response times (minutes) over adjacent inbound -> user reply pairs, paired per thread.
fn thread_response_times(sorted: &[&MessageWithUser]) -> Vec<f64> {
    let mut by_thread: HashMap<&str, Vec<&MessageWithUser>> = HashMap::new();
    for m in sorted {
        by_thread.entry(m.message.thread_id.as_str()).or_default().push(*m);
    }

    by_thread
        .values()
        .flat_map(|thread| {
            thread.windows(2).filter_map(|pair| {
                is_reply_to(pair[0], pair[1]).then(|| {
                    minutes_between(&pair[0].message.created_at, &pair[1].message.created_at)
                })
            })
        })
        .collect()
}

fn volume_over_time(sorted: &[&MessageWithUser]) -> Vec<DailyCount> {
    count_by(sorted, |m| day_key(&m.message.created_at))
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Pairs adjacent messages of the whole window (not per thread), bucketed by reply day.
fn response_time_over_time(sorted: &[&MessageWithUser]) -> Vec<DailyResponseTime> {
    let mut by_day: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for pair in sorted.windows(2) {
        if is_reply_to(pair[0], pair[1]) {
            by_day
                .entry(day_key(&pair[1].message.created_at))
                .or_default()
                .push(minutes_between(
                    &pair[0].message.created_at,
                    &pair[1].message.created_at,
                ));
        }
    }
    by_day
        .into_iter()
        .map(|(date, times)| DailyResponseTime {
            date,
            average_response_time: round1(mean(&times)),
        })
        .collect()
}

/// Counts per user, descending, top [`TOP_USERS`]. Ties keep first-seen order.
fn top_users<'a>(messages: impl Iterator<Item = &'a MessageWithUser>) -> Vec<UserCount> {
    let mut counts: Vec<UserCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for m in messages {
        let (Some(user_id), Some(user)) = (m.message.user_id.as_ref(), m.user.as_ref()) else {
            continue;
        };
        match index.get(user_id) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(user_id.clone(), counts.len());
                counts.push(UserCount {
                    user_id: user_id.clone(),
                    user_name: user.display_name(),
                    email: user.email.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_USERS);
    counts
}

fn hourly_activity<Tz: TimeZone>(sorted: &[&MessageWithUser], tz: &Tz) -> Vec<HourlyCount> {
    let mut buckets = [0usize; 24];
    for m in sorted {
        let hour = m.message.created_at.with_timezone(tz).hour() as usize;
        buckets[hour] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyCount {
            hour: hour as u32,
            count,
        })
        .collect()
}

fn count_by<K: Ord, F>(sorted: &[&MessageWithUser], key: F) -> BTreeMap<K, usize>
where
    F: Fn(&MessageWithUser) -> K,
{
    let mut counts = BTreeMap::new();
    for m in sorted {
        *counts.entry(key(*m)).or_insert(0) += 1;
    }
    counts
}
