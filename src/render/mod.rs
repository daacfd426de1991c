use crate::domain::model::{ReminderDay, RenderedMessage};
use crate::utils::error::Result;
use askama::Template;
use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;
use std::sync::OnceLock;

/// A run of generated text. Escaping is left to the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
    pub line_break: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            line_break: false,
        }
    }

    fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
            line_break: false,
        }
    }

    fn line_break() -> Self {
        Self {
            text: String::new(),
            bold: false,
            line_break: true,
        }
    }
}

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("static pattern compiles"))
}

/// Split generated copy into `**bold**` runs, plain runs and line breaks.
pub fn segments(content: &str) -> Vec<Segment> {
    let mut out = Vec::new();

    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push(Segment::line_break());
        }

        let mut cursor = 0;
        for caps in bold_pattern().captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > cursor {
                out.push(Segment::plain(&line[cursor..whole.start()]));
            }
            out.push(Segment::bold(inner.as_str()));
            cursor = whole.end();
        }
        if cursor < line.len() {
            out.push(Segment::plain(&line[cursor..]));
        }
    }

    out
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// e.g. `miércoles, 7 de enero de 2026`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} de {} de {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

pub fn welcome_subject(name: &str) -> String {
    format!("🎉 ¡Bienvenido/a {} a Vision Board 2026!", name)
}

pub fn daily_subject(name: &str, date: NaiveDate) -> String {
    format!("🎯 {}, tu plan para hoy - {}", name, long_date(date))
}

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeTemplate<'a> {
    name: &'a str,
    segments: Vec<Segment>,
    is_test: bool,
}

#[derive(Template)]
#[template(path = "daily.html")]
struct DailyTemplate<'a> {
    name: &'a str,
    date: String,
    reminder_day: &'a str,
    segments: Vec<Segment>,
}

pub fn render_welcome(name: &str, content: &str, is_test: bool) -> Result<RenderedMessage> {
    let html_body = WelcomeTemplate {
        name,
        segments: segments(content),
        is_test,
    }
    .render()?;

    Ok(RenderedMessage {
        subject: welcome_subject(name),
        html_body,
    })
}

pub fn render_daily(
    name: &str,
    content: &str,
    reminder_day: ReminderDay,
    date: NaiveDate,
) -> Result<RenderedMessage> {
    let html_body = DailyTemplate {
        name,
        date: long_date(date),
        reminder_day: reminder_day.label(),
        segments: segments(content),
    }
    .render()?;

    Ok(RenderedMessage {
        subject: daily_subject(name, date),
        html_body,
    })
}
