//! Per-user alert records.
//!
//! Notifications carry independent read and acknowledged flags with one
//! coupling: acknowledging marks the notification read, never the reverse.

use crate::repo::{generate_id, Collection, Owned, Record};
use crate::storage::Backend;
use crate::{
    AlertSeverity, Error, Notification, NotificationKind, NotificationMeta, Result,
};
use chrono::Utc;
use std::sync::Arc;

const NOTIFICATIONS_KEY: &str = "notifications";

impl Record for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Owned for Notification {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Fields supplied when raising a notification
#[derive(Clone, Debug)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub action_url: Option<String>,
    pub metadata: Option<NotificationMeta>,
}

/// Owns alert records for one user
pub struct NotificationStore {
    backend: Arc<dyn Backend>,
    user_id: String,
}

impl NotificationStore {
    pub fn new(backend: Arc<dyn Backend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
        }
    }

    fn collection(&self) -> Collection<Notification> {
        Collection::new(NOTIFICATIONS_KEY)
    }

    /// The user's notifications, newest first
    pub fn list(&self) -> Vec<Notification> {
        self.collection()
            .for_owner(self.backend.as_ref(), &self.user_id)
    }

    pub fn unread_count(&self) -> usize {
        self.list().iter().filter(|n| !n.is_read).count()
    }

    pub fn add(&self, draft: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: generate_id("notif"),
            user_id: self.user_id.clone(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            timestamp: Utc::now(),
            is_read: false,
            is_acknowledged: false,
            severity: draft.severity,
            action_url: draft.action_url,
            metadata: draft.metadata,
        };

        let mut mine = self.list();
        mine.insert(0, notification.clone());
        self.save(&mine)?;

        tracing::debug!("Raised {:?} notification {}", notification.kind, notification.id);
        Ok(notification)
    }

    pub fn mark_read(&self, id: &str) -> Result<Notification> {
        self.mutate(id, |n| n.is_read = true)
    }

    /// Acknowledge implies read (one-directional)
    pub fn acknowledge(&self, id: &str) -> Result<Notification> {
        self.mutate(id, |n| {
            n.is_acknowledged = true;
            n.is_read = true;
        })
    }

    pub fn mark_all_read(&self) -> Result<()> {
        let mut mine = self.list();
        for n in mine.iter_mut() {
            n.is_read = true;
        }
        self.save(&mine)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut mine = self.list();
        let before = mine.len();
        mine.retain(|n| n.id != id);

        if mine.len() == before {
            return Err(Error::NotFound(format!("notification {}", id)));
        }
        self.save(&mine)
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }

    fn mutate<F>(&self, id: &str, f: F) -> Result<Notification>
    where
        F: FnOnce(&mut Notification),
    {
        let mut mine = self.list();
        let notification = mine
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("notification {}", id)))?;
        f(notification);
        let updated = notification.clone();
        self.save(&mine)?;
        Ok(updated)
    }

    fn save(&self, records: &[Notification]) -> Result<()> {
        self.collection()
            .replace_for_owner(self.backend.as_ref(), &self.user_id, records)
    }
}
