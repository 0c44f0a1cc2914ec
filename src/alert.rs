//! Alerts shown alongside search results.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub priority: i32,
    pub title: String,
    pub description: String,
}

impl Alert {
    pub fn new(priority: i32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            priority,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Keeps the highest-priority alert seen. Ties keep the first.
#[derive(Debug, Default)]
pub struct MaxAlerter {
    alert: Option<Alert>,
}

impl MaxAlerter {
    pub fn add(&mut self, alert: Option<Alert>) {
        let Some(alert) = alert else {
            return;
        };
        match &self.alert {
            Some(current) if current.priority >= alert.priority => {}
            _ => self.alert = Some(alert),
        }
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn into_alert(self) -> Option<Alert> {
        self.alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_alerter_keeps_highest_priority() {
        let mut alerter = MaxAlerter::default();
        alerter.add(None);
        alerter.add(Some(Alert::new(1, "low", "")));
        alerter.add(Some(Alert::new(5, "high", "")));
        alerter.add(Some(Alert::new(5, "tie", "")));
        alerter.add(Some(Alert::new(2, "mid", "")));
        assert_eq!(alerter.alert().map(|a| a.title.as_str()), Some("high"));
    }

    #[test]
    fn test_max_alerter_empty() {
        assert!(MaxAlerter::default().into_alert().is_none());
    }
}
