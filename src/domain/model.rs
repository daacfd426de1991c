use crate::utils::error::{MailerError, Result};
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Weekday a registration asked to be reminded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReminderDay {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl ReminderDay {
    pub const ALL: [ReminderDay; 7] = [
        ReminderDay::Monday,
        ReminderDay::Tuesday,
        ReminderDay::Wednesday,
        ReminderDay::Thursday,
        ReminderDay::Friday,
        ReminderDay::Saturday,
        ReminderDay::Sunday,
    ];

    /// 0 = Sunday .. 6 = Saturday.
    pub fn index(self) -> u32 {
        match self {
            ReminderDay::Sunday => 0,
            ReminderDay::Monday => 1,
            ReminderDay::Tuesday => 2,
            ReminderDay::Wednesday => 3,
            ReminderDay::Thursday => 4,
            ReminderDay::Friday => 5,
            ReminderDay::Saturday => 6,
        }
    }

    /// Label stored in the sheet and shown to users.
    pub fn label(self) -> &'static str {
        match self {
            ReminderDay::Monday => "Lunes",
            ReminderDay::Tuesday => "Martes",
            ReminderDay::Wednesday => "Miércoles",
            ReminderDay::Thursday => "Jueves",
            ReminderDay::Friday => "Viernes",
            ReminderDay::Saturday => "Sábado",
            ReminderDay::Sunday => "Domingo",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => ReminderDay::Monday,
            Weekday::Tue => ReminderDay::Tuesday,
            Weekday::Wed => ReminderDay::Wednesday,
            Weekday::Thu => ReminderDay::Thursday,
            Weekday::Fri => ReminderDay::Friday,
            Weekday::Sat => ReminderDay::Saturday,
            Weekday::Sun => ReminderDay::Sunday,
        }
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from_weekday(date.weekday())
    }
}

impl FromStr for ReminderDay {
    type Err = MailerError;

    fn from_str(label: &str) -> Result<Self> {
        let day = match label.trim().to_lowercase().as_str() {
            "lunes" | "monday" => ReminderDay::Monday,
            "martes" | "tuesday" => ReminderDay::Tuesday,
            "miércoles" | "miercoles" | "wednesday" => ReminderDay::Wednesday,
            "jueves" | "thursday" => ReminderDay::Thursday,
            "viernes" | "friday" => ReminderDay::Friday,
            "sábado" | "sabado" | "saturday" => ReminderDay::Saturday,
            "domingo" | "sunday" => ReminderDay::Sunday,
            _ => {
                return Err(MailerError::validation(
                    "diaRecordatorio",
                    format!("Unknown reminder day '{}'", label),
                ))
            }
        };
        Ok(day)
    }
}

impl fmt::Display for ReminderDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ReminderDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ReminderDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored goal submission. Field names match the sheet columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    #[serde(rename = "nombre")]
    pub display_name: String,
    #[serde(rename = "objetivos")]
    pub goals: String,
    #[serde(rename = "diaRecordatorio")]
    pub reminder_day: ReminderDay,
}

/// Raw form body; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub objetivos: Option<String>,
    #[serde(rename = "diaRecordatorio")]
    pub dia_recordatorio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Welcome,
    Daily,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Welcome => f.write_str("welcome"),
            MessageKind::Daily => f.write_str("daily"),
        }
    }
}

/// What the content generator knows about the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentContext {
    pub name: String,
    pub goals: String,
    /// Only set for daily messages, e.g. "miércoles".
    pub day_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub html_body: String,
}

/// Provider-neutral envelope handed to each email provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OutboundEmail {
    pub fn new(to: &str, message: &RenderedMessage) -> Self {
        Self {
            to: to.to_string(),
            subject: message.subject.clone(),
            html: message.html_body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl SendResult {
    pub fn delivered(provider: &str) -> Self {
        Self {
            success: true,
            error: None,
            provider: Some(provider.to_string()),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(detail.into()),
            provider: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn every_label_maps_to_one_index() {
        let mut seen: Vec<u32> = ReminderDay::ALL.iter().map(|d| d.index()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn parses_spanish_and_english_labels() {
        assert_eq!("Martes".parse::<ReminderDay>().unwrap(), ReminderDay::Tuesday);
        assert_eq!("miercoles".parse::<ReminderDay>().unwrap(), ReminderDay::Wednesday);
        assert_eq!("Sábado".parse::<ReminderDay>().unwrap(), ReminderDay::Saturday);
        assert_eq!("Sunday".parse::<ReminderDay>().unwrap(), ReminderDay::Sunday);
        assert_eq!("Domingo".parse::<ReminderDay>().unwrap().index(), 0);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "Funday".parse::<ReminderDay>().unwrap_err();
        assert!(matches!(err, MailerError::ValidationError { .. }));
        assert!("".parse::<ReminderDay>().is_err());
    }

    #[test]
    fn weekday_of_date_matches_index() {
        // 2026-01-07 is a Wednesday
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let day = ReminderDay::of(&date);
        assert_eq!(day, ReminderDay::Wednesday);
        assert_eq!(day.index(), date.weekday().num_days_from_sunday());
    }

    #[test]
    fn registration_uses_sheet_field_names() {
        let json = serde_json::json!({
            "email": "a@b.com",
            "nombre": "Ana",
            "objetivos": "Aprender Rust",
            "diaRecordatorio": "Martes"
        });
        let registration: Registration = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(registration.reminder_day, ReminderDay::Tuesday);
        assert_eq!(serde_json::to_value(&registration).unwrap(), json);
    }
}
