// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query engine: filter/sort/page over a snapshot of the canonical table
//! (§4.9). Pure functions over `Vec<Message>` — the Store hands this a
//! consistent snapshot and never blocks the mutation queue for a query.

use crate::render::{render_all, RenderedMessage};
use hub_core::{Kind, Level, LifecycleState, Message, OriginType};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

/// `scalar | {in:[…]} | {notIn:[…]}` over a closed enum field. `in`+`notIn`
/// together is a type error, translated to `BAD_REQUEST` at the command
/// boundary (§7).
#[derive(Debug, Clone)]
pub enum EnumFilter<T> {
    Eq(T),
    In(Vec<T>),
    NotIn(Vec<T>),
}

impl<T: PartialEq> EnumFilter<T> {
    fn matches(&self, value: &T) -> bool {
        match self {
            EnumFilter::Eq(v) => v == value,
            EnumFilter::In(values) => values.contains(value),
            EnumFilter::NotIn(values) => !values.contains(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for EnumFilter<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Scalar(T),
            Object {
                #[serde(default)]
                r#in: Option<Vec<T>>,
                #[serde(default, rename = "notIn")]
                not_in: Option<Vec<T>>,
            },
        }
        match Raw::<T>::deserialize(deserializer)? {
            Raw::Scalar(v) => Ok(EnumFilter::Eq(v)),
            Raw::Object { r#in: Some(_), not_in: Some(_) } => {
                Err(DeError::custom("`in` and `notIn` are mutually exclusive"))
            }
            Raw::Object { r#in: Some(values), not_in: None } => Ok(EnumFilter::In(values)),
            Raw::Object { r#in: None, not_in: Some(values) } => Ok(EnumFilter::NotIn(values)),
            Raw::Object { r#in: None, not_in: None } => {
                Err(DeError::custom("expected a scalar, `in`, or `notIn`"))
            }
        }
    }
}

/// `level`'s richer filter: exact, `{in}`/`{notIn}`, `{min,max}`, or any
/// combination of those except `in`+`notIn` together.
#[derive(Debug, Clone, Default)]
pub struct LevelFilter {
    pub eq: Option<Level>,
    pub r#in: Option<Vec<Level>>,
    pub not_in: Option<Vec<Level>>,
    pub min: Option<Level>,
    pub max: Option<Level>,
}

impl LevelFilter {
    fn matches(&self, value: Level) -> bool {
        if let Some(eq) = self.eq {
            if eq != value {
                return false;
            }
        }
        if let Some(values) = &self.r#in {
            if !values.contains(&value) {
                return false;
            }
        }
        if let Some(values) = &self.not_in {
            if values.contains(&value) {
                return false;
            }
        }
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

impl<'de> Deserialize<'de> for LevelFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scalar(Level),
            Object {
                #[serde(default)]
                r#in: Option<Vec<Level>>,
                #[serde(default, rename = "notIn")]
                not_in: Option<Vec<Level>>,
                #[serde(default)]
                min: Option<Level>,
                #[serde(default)]
                max: Option<Level>,
            },
        }
        match Raw::deserialize(deserializer)? {
            Raw::Scalar(v) => Ok(LevelFilter { eq: Some(v), ..Default::default() }),
            Raw::Object { r#in: Some(_), not_in: Some(_), .. } => {
                Err(DeError::custom("`in` and `notIn` are mutually exclusive"))
            }
            Raw::Object { r#in, not_in, min, max } => Ok(LevelFilter { eq: None, r#in, not_in, min, max }),
        }
    }
}

/// `timing.<field>`: `exact | {min,max}`. A range filter implies existence —
/// a missing/null value fails the filter unless `orMissing` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRangeFilter {
    #[serde(default)]
    pub eq: Option<u64>,
    #[serde(default)]
    pub min: Option<u64>,
    #[serde(default)]
    pub max: Option<u64>,
    #[serde(default)]
    pub or_missing: bool,
}

impl TimingRangeFilter {
    fn matches(&self, value: Option<u64>) -> bool {
        match value {
            None => self.or_missing,
            Some(v) => {
                if let Some(eq) = self.eq {
                    if v != eq {
                        return false;
                    }
                }
                if let Some(min) = self.min {
                    if v < min {
                        return false;
                    }
                }
                if let Some(max) = self.max {
                    if v > max {
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// `scalar | array(any-of) | {in}`, over `details.location`. Implies
/// existence like `TimingRangeFilter`.
#[derive(Debug, Clone)]
pub enum ScalarOrInFilter {
    Eq(String),
    In(Vec<String>),
}

impl ScalarOrInFilter {
    fn matches(&self, value: Option<&str>) -> bool {
        match value {
            None => false,
            Some(v) => match self {
                ScalarOrInFilter::Eq(expected) => expected == v,
                ScalarOrInFilter::In(values) => values.iter().any(|e| e == v),
            },
        }
    }
}

impl<'de> Deserialize<'de> for ScalarOrInFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scalar(String),
            Array(Vec<String>),
            Object {
                #[serde(default)]
                r#in: Option<Vec<String>>,
            },
        }
        match Raw::deserialize(deserializer)? {
            Raw::Scalar(v) => Ok(ScalarOrInFilter::Eq(v)),
            Raw::Array(values) => Ok(ScalarOrInFilter::In(values)),
            Raw::Object { r#in: Some(values) } => Ok(ScalarOrInFilter::In(values)),
            Raw::Object { r#in: None } => Err(DeError::custom("expected a scalar, array, or `in`")),
        }
    }
}

/// `scalar | array(any-of) | {any} | {all}` over a list field
/// (`audience.tags`, `dependencies`). Implies existence.
#[derive(Debug, Clone)]
pub enum ListFilter {
    Any(Vec<String>),
    All(Vec<String>),
}

impl ListFilter {
    fn matches(&self, values: &[String]) -> bool {
        match self {
            ListFilter::Any(wanted) => wanted.iter().any(|w| values.iter().any(|v| v == w)),
            ListFilter::All(wanted) => wanted.iter().all(|w| values.iter().any(|v| v == w)),
        }
    }
}

impl<'de> Deserialize<'de> for ListFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scalar(String),
            Array(Vec<String>),
            Object {
                #[serde(default)]
                any: Option<Vec<String>>,
                #[serde(default)]
                all: Option<Vec<String>>,
            },
        }
        match Raw::deserialize(deserializer)? {
            Raw::Scalar(v) => Ok(ListFilter::Any(vec![v])),
            Raw::Array(values) => Ok(ListFilter::Any(values)),
            Raw::Object { any: Some(_), all: Some(_) } => {
                Err(DeError::custom("`any` and `all` are mutually exclusive"))
            }
            Raw::Object { any: Some(values), all: None } => Ok(ListFilter::Any(values)),
            Raw::Object { any: None, all: Some(values) } => Ok(ListFilter::All(values)),
            Raw::Object { any: None, all: None } => Err(DeError::custom("expected a scalar, array, `any`, or `all`")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingWhere {
    #[serde(default)]
    pub created_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub updated_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub expires_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub notify_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub remind_every: Option<TimingRangeFilter>,
    #[serde(default)]
    pub due_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub start_at: Option<TimingRangeFilter>,
    #[serde(default)]
    pub end_at: Option<TimingRangeFilter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Where {
    #[serde(default)]
    pub kind: Option<EnumFilter<Kind>>,
    #[serde(default, rename = "originType")]
    pub origin_type: Option<EnumFilter<OriginType>>,
    #[serde(default, rename = "lifecycleState")]
    pub lifecycle_state: Option<EnumFilter<LifecycleState>>,
    #[serde(default)]
    pub level: Option<LevelFilter>,
    #[serde(default)]
    pub timing: TimingWhere,
    #[serde(default, rename = "detailsLocation")]
    pub details_location: Option<ScalarOrInFilter>,
    #[serde(default, rename = "audienceTags")]
    pub audience_tags: Option<ListFilter>,
    #[serde(default)]
    pub dependencies: Option<ListFilter>,
    #[serde(default, rename = "routeTo")]
    pub route_to: Option<String>,
}

impl Where {
    fn matches(&self, message: &Message) -> bool {
        if let Some(f) = &self.kind {
            if !f.matches(&message.kind) {
                return false;
            }
        }
        if let Some(f) = &self.origin_type {
            if !f.matches(&message.origin.kind) {
                return false;
            }
        }
        // `notIn` narrows an already-visible set; it never re-admits states
        // hidden by default (§8: `notIn: ["open"]` must not surface deleted
        // or expired messages). Only an explicit `eq`/`in` naming a hidden
        // state opts back in.
        match &self.lifecycle_state {
            Some(EnumFilter::NotIn(states)) => {
                if states.contains(&message.lifecycle.state) || message.lifecycle.state.is_hidden_by_default() {
                    return false;
                }
            }
            Some(f) => {
                if !f.matches(&message.lifecycle.state) {
                    return false;
                }
            }
            None => {
                if message.lifecycle.state.is_hidden_by_default() {
                    return false;
                }
            }
        }
        if let Some(f) = &self.level {
            if !f.matches(message.level) {
                return false;
            }
        }
        if let Some(f) = &self.timing.created_at {
            if !f.matches(Some(message.timing.created_at)) {
                return false;
            }
        }
        if let Some(f) = &self.timing.updated_at {
            if !f.matches(message.timing.updated_at) {
                return false;
            }
        }
        if let Some(f) = &self.timing.expires_at {
            if !f.matches(message.timing.expires_at) {
                return false;
            }
        }
        if let Some(f) = &self.timing.notify_at {
            if !f.matches(message.timing.notify_at) {
                return false;
            }
        }
        if let Some(f) = &self.timing.remind_every {
            if !f.matches(message.timing.remind_every) {
                return false;
            }
        }
        if let Some(f) = &self.timing.due_at {
            if !f.matches(message.timing.due_at) {
                return false;
            }
        }
        if let Some(f) = &self.timing.start_at {
            if !f.matches(message.timing.start_at) {
                return false;
            }
        }
        if let Some(f) = &self.timing.end_at {
            if !f.matches(message.timing.end_at) {
                return false;
            }
        }
        if let Some(f) = &self.details_location {
            let location = message.details.as_ref().and_then(|d| d.location.as_deref());
            if !f.matches(location) {
                return false;
            }
        }
        if let Some(f) = &self.audience_tags {
            let tags = message.audience.as_ref().and_then(|a| a.tags.as_deref()).unwrap_or(&[]);
            if tags.is_empty() || !f.matches(tags) {
                return false;
            }
        }
        if let Some(f) = &self.dependencies {
            if message.dependencies.is_empty() {
                return false;
            }
            let deps: Vec<String> = message.dependencies.iter().map(|r| r.as_str().to_string()).collect();
            if !f.matches(&deps) {
                return false;
            }
        }
        if let Some(channel) = &self.route_to {
            let routes = message.audience.as_ref().map(|a| a.routes_to(Some(channel))).unwrap_or(true);
            if !routes {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[serde(rename = "ref")]
    Ref,
    Level,
    Kind,
    OriginType,
    LifecycleState,
    DetailsLocation,
    TimingCreatedAt,
    TimingUpdatedAt,
    TimingExpiresAt,
    TimingNotifyAt,
    TimingRemindEvery,
    TimingDueAt,
    TimingStartAt,
    TimingEndAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

fn sort_key(message: &Message, field: SortField) -> (bool, String) {
    let value: Option<String> = match field {
        SortField::Ref => Some(message.msg_ref.as_str().to_string()),
        SortField::Level => Some(format!("{:03}", message.level.as_u8())),
        SortField::Kind => Some(message.kind.to_string()),
        SortField::OriginType => Some(message.origin.kind.to_string()),
        SortField::LifecycleState => Some(message.lifecycle.state.to_string()),
        SortField::DetailsLocation => message.details.as_ref().and_then(|d| d.location.clone()),
        SortField::TimingCreatedAt => Some(format!("{:020}", message.timing.created_at)),
        SortField::TimingUpdatedAt => message.timing.updated_at.map(|v| format!("{v:020}")),
        SortField::TimingExpiresAt => message.timing.expires_at.map(|v| format!("{v:020}")),
        SortField::TimingNotifyAt => message.timing.notify_at.map(|v| format!("{v:020}")),
        SortField::TimingRemindEvery => message.timing.remind_every.map(|v| format!("{v:020}")),
        SortField::TimingDueAt => message.timing.due_at.map(|v| format!("{v:020}")),
        SortField::TimingStartAt => message.timing.start_at.map(|v| format!("{v:020}")),
        SortField::TimingEndAt => message.timing.end_at.map(|v| format!("{v:020}")),
    };
    match value {
        Some(v) => (false, v),
        None => (true, String::new()),
    }
}

/// Missing values sort last regardless of direction; ties break by `ref`
/// for deterministic paging (§4.9).
fn apply_sort(messages: &mut [Message], sorts: &[SortSpec]) {
    messages.sort_by(|a, b| {
        for sort in sorts {
            let (a_missing, a_key) = sort_key(a, sort.field);
            let (b_missing, b_key) = sort_key(b, sort.field);
            let ordering = match (a_missing, b_missing) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => return std::cmp::Ordering::Greater,
                (false, true) => return std::cmp::Ordering::Less,
                (false, false) => a_key.cmp(&b_key),
            };
            let ordering = if sort.dir == SortDir::Desc { ordering.reverse() } else { ordering };
            if ordering != std::cmp::Ordering::Equal {
                return ordering;
            }
        }
        a.msg_ref.as_str().cmp(b.msg_ref.as_str())
    });
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageSpec {
    pub size: i64,
    pub index: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuerySpec {
    #[serde(default, rename = "where")]
    pub where_: Where,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    #[serde(default)]
    pub page: Option<PageSpec>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryResult {
    pub total: usize,
    pub pages: usize,
    pub items: Vec<RenderedMessage>,
}

/// `query_messages(spec)` (§4.9). `size ≤ 0` in `page` disables paging.
/// Malformed filter JSON is rejected earlier, when `QuerySpec` is
/// deserialized at the command-bus boundary (`HubError::TypeError`) — by
/// the time a `QuerySpec` reaches here it's already well-formed. Returned
/// items are rendered (§4.4): templates expanded, `display`/`actionsInactive`
/// populated.
pub fn query_messages(messages: &[Message], spec: &QuerySpec, now_ms: u64, locale: &str) -> QueryResult {
    let mut matched: Vec<Message> = messages.iter().filter(|m| spec.where_.matches(m)).cloned().collect();
    apply_sort(&mut matched, &spec.sort);
    let total = matched.len();

    let (page_items, pages) = match spec.page {
        Some(page) if page.size > 0 => {
            let size = page.size as usize;
            let pages = total.div_ceil(size).max(1);
            let start = (page.index.saturating_sub(1) as usize) * size;
            let page_items: Vec<Message> = matched.into_iter().skip(start).take(size).collect();
            (page_items, pages)
        }
        _ => (matched, 1),
    };

    let items = render_all(page_items.iter(), now_ms, locale);
    QueryResult { total, pages, items }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
