//! Change notifications: every successful mutation publishes the table and
//! event kind; subscribers re-fetch whatever list they show.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Departments,
    Employees,
    LeaveRequests,
    ManagerUsers,
    AdminUsers,
}

impl Table {
    /// Tables whose changes anyone may watch. Account tables stay private.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Table::Departments | Table::Employees | Table::LeaveRequests
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Which event types a subscriber cares about; `*` is the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    Any,
    Only(ChangeKind),
}

impl std::str::FromStr for EventFilter {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "*" => Ok(EventFilter::Any),
            other => other.parse().map(EventFilter::Only),
        }
    }
}

impl EventFilter {
    fn matches(&self, kind: ChangeKind) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Only(k) => *k == kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub event: ChangeKind,
    /// Primary key of the touched row, when it has a numeric one
    pub id: Option<u64>,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, table: Table, event: ChangeKind, id: Option<u64>) {
        let change = ChangeEvent {
            table,
            event,
            id,
            at: Utc::now(),
        };
        tracing::debug!(table = %table, event = %event, ?id, "Publishing change");
        // no subscribers is fine
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            table,
            filter,
        }
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    table: Table,
    filter: EventFilter,
}

impl Subscription {
    /// Next matching event, or `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(ev) if ev.table == self.table && self.filter.matches(ev.event) => {
                    return Some(ev);
                }
                Ok(_) => continue,
                // Consumers re-fetch on any event, so skipped ones are harmless.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, table = %self.table, "Change subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse_wildcard_and_kinds() {
        assert_eq!("*".parse::<EventFilter>().ok(), Some(EventFilter::Any));
        assert_eq!(
            "update".parse::<EventFilter>().ok(),
            Some(EventFilter::Only(ChangeKind::Update))
        );
        assert!("upsert".parse::<EventFilter>().is_err());
        assert_eq!("leave_requests".parse::<Table>().ok(), Some(Table::LeaveRequests));
    }

    #[actix_web::test]
    async fn subscriber_sees_only_its_table_and_event() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(Table::LeaveRequests, EventFilter::Only(ChangeKind::Insert));

        feed.publish(Table::Departments, ChangeKind::Insert, Some(1));
        feed.publish(Table::LeaveRequests, ChangeKind::Update, Some(2));
        feed.publish(Table::LeaveRequests, ChangeKind::Insert, Some(3));

        let ev = sub.next().await.unwrap();
        assert_eq!(ev.table, Table::LeaveRequests);
        assert_eq!(ev.event, ChangeKind::Insert);
        assert_eq!(ev.id, Some(3));
    }

    #[actix_web::test]
    async fn wildcard_receives_every_kind_in_order() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(Table::Employees, EventFilter::Any);

        feed.publish(Table::Employees, ChangeKind::Insert, Some(1));
        feed.publish(Table::Employees, ChangeKind::Delete, Some(1));

        assert_eq!(sub.next().await.unwrap().event, ChangeKind::Insert);
        assert_eq!(sub.next().await.unwrap().event, ChangeKind::Delete);
    }

    #[actix_web::test]
    async fn lagging_subscriber_keeps_receiving() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(Table::LeaveRequests, EventFilter::Any);

        for i in 0..(FEED_CAPACITY as u64 + 10) {
            feed.publish(Table::LeaveRequests, ChangeKind::Update, Some(i));
        }

        let ev = sub.next().await.unwrap();
        assert!(ev.id.unwrap() >= 10);
    }

    #[actix_web::test]
    async fn dropped_feed_ends_subscription() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(Table::LeaveRequests, EventFilter::Any);
        drop(feed);
        assert!(sub.next().await.is_none());
    }
}
