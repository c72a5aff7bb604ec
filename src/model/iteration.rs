use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where an iteration sits relative to today, per the service's team
/// settings. Anything unrecognized parses to `Unknown` and is treated as
/// not current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Past,
    Current,
    Future,
    Unknown,
}

impl TimeFrame {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "past" => TimeFrame::Past,
            "current" => TimeFrame::Current,
            "future" => TimeFrame::Future,
            _ => TimeFrame::Unknown,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TimeFrame::Past => "past",
            TimeFrame::Current => "current",
            TimeFrame::Future => "future",
            TimeFrame::Unknown => "unknown",
        }
    }
}

impl Serialize for TimeFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimeFrame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TimeFrame::parse(&raw))
    }
}

/// An iteration (sprint): a time-boxed work period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    pub id: String,
    pub name: String,
    pub path: String,
    pub start_date: Option<DateTime<Utc>>,
    pub finish_date: Option<DateTime<Utc>>,
    pub time_frame: TimeFrame,
    pub url: String,
}

impl Iteration {
    pub fn is_current(&self) -> bool {
        self.time_frame == TimeFrame::Current
    }

    pub fn display_name(&self) -> String {
        if self.is_current() {
            format!("{} (current)", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iteration(name: &str, time_frame: TimeFrame) -> Iteration {
        Iteration {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.into(),
            path: format!("Proj\\{name}"),
            start_date: None,
            finish_date: None,
            time_frame,
            url: String::new(),
        }
    }

    #[test]
    fn display_name_marks_current() {
        assert_eq!(
            iteration("Sprint 5", TimeFrame::Current).display_name(),
            "Sprint 5 (current)"
        );
        assert_eq!(iteration("Sprint 4", TimeFrame::Past).display_name(), "Sprint 4");
    }

    #[test]
    fn unknown_time_frame_is_not_current() {
        let json = r#"{"id":"x","name":"n","path":"p","start_date":null,"finish_date":null,"time_frame":"someday","url":""}"#;
        let iter: Iteration = serde_json::from_str(json).unwrap();
        assert_eq!(iter.time_frame, TimeFrame::Unknown);
        assert!(!iter.is_current());
    }
}
