//! Schedule rendering.
//!
//! The backend hands out raw lessons; this service turns them into the
//! texts the schedule buttons reply with. The day of a lesson comes from
//! its weekday name when the backend sets one, otherwise from its date.

use std::sync::Arc;

use chrono::{Datelike, DateTime, Days, Local, NaiveDate, NaiveDateTime, Weekday};

use crate::backend::{BackendError, Schedule, ScheduleLesson};
use crate::session::UserId;

const NO_LESSONS_TODAY: &str =
    "No classes today. Check back later, the schedule may have been updated.";
const NO_LESSONS_THIS_WEEK: &str =
    "No classes found for this week. Check back later or refresh the schedule.";

/// How many upcoming lessons the daily view falls back to when nothing
/// is scheduled for today itself.
const UPCOMING_LIMIT: usize = 4;

/// Renders a user's timetable for the schedule menu.
pub struct ScheduleService {
    backend: Arc<dyn Schedule>,
    today: fn() -> NaiveDate,
}

impl ScheduleService {
    pub fn new(backend: Arc<dyn Schedule>) -> Self {
        Self {
            backend,
            today: || Local::now().date_naive(),
        }
    }

    /// Same service with a fixed clock, for tests.
    pub fn with_clock(backend: Arc<dyn Schedule>, today: fn() -> NaiveDate) -> Self {
        Self { backend, today }
    }

    /// Today's lessons. When today itself is free but the week is not,
    /// shows the next few lessons instead of an empty answer.
    pub async fn today(&self, user_id: UserId) -> Result<String, BackendError> {
        let (lessons, _) = self.fetch_week(user_id).await?;

        let today = (self.today)().weekday();
        let mut todays: Vec<ScheduleLesson> = lessons
            .iter()
            .filter(|lesson| detect_weekday(lesson) == Some(today))
            .cloned()
            .collect();
        if todays.is_empty() && !lessons.is_empty() {
            todays = upcoming_lessons(&lessons, UPCOMING_LIMIT);
        }
        if todays.is_empty() {
            return Ok(NO_LESSONS_TODAY.to_string());
        }

        sort_lessons(&mut todays);

        let mut out = String::from("Your schedule for today:\n\n");
        for (i, lesson) in todays.iter().enumerate() {
            out.push_str(&format_lesson_block(i + 1, lesson));
            out.push_str("\n\n");
        }
        out.push_str("Have a good day!");
        Ok(out.trim().to_string())
    }

    /// The whole week, grouped by day. Lessons whose day cannot be
    /// determined end up in a trailing section instead of being dropped.
    pub async fn week(&self, user_id: UserId) -> Result<String, BackendError> {
        let (lessons, week_start) = self.fetch_week(user_id).await?;
        if lessons.is_empty() {
            return Ok(NO_LESSONS_THIS_WEEK.to_string());
        }

        let mut without_day = Vec::new();
        let mut grouped: Vec<Vec<ScheduleLesson>> = vec![Vec::new(); 7];
        for lesson in lessons {
            match detect_weekday(&lesson) {
                Some(day) => grouped[day.num_days_from_monday() as usize].push(lesson),
                None => without_day.push(lesson),
            }
        }

        let week_end = week_start + Days::new(6);
        let mut out = format!(
            "Schedule for the week {} - {}:\n\n",
            week_start.format("%d.%m"),
            week_end.format("%d.%m"),
        );

        for (day_index, day_lessons) in grouped.iter_mut().enumerate() {
            if day_lessons.is_empty() {
                continue;
            }
            sort_lessons(day_lessons);
            out.push_str(WEEKDAY_TITLES[day_index]);
            out.push_str(":\n");
            for (i, lesson) in day_lessons.iter().enumerate() {
                out.push_str(&format_lesson_line(i + 1, lesson));
                out.push('\n');
            }
            out.push('\n');
        }

        if !without_day.is_empty() {
            sort_lessons(&mut without_day);
            out.push_str("Lessons without a set day:\n");
            for (i, lesson) in without_day.iter().enumerate() {
                out.push_str(&format_lesson_line(i + 1, lesson));
                out.push('\n');
            }
        }

        Ok(out.trim().to_string())
    }

    async fn fetch_week(
        &self,
        user_id: UserId,
    ) -> Result<(Vec<ScheduleLesson>, NaiveDate), BackendError> {
        let start = start_of_week((self.today)());
        let lessons = self.backend.list(user_id, Some(start)).await?;
        Ok((lessons, start))
    }
}

const WEEKDAY_TITLES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// The day a lesson belongs to: its weekday name when one parses,
/// otherwise the weekday of its date.
fn detect_weekday(lesson: &ScheduleLesson) -> Option<Weekday> {
    if let Some(day) = parse_weekday(&lesson.weekday) {
        return Some(day);
    }

    let date = lesson.date.trim();
    if date.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.weekday());
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(date, format) {
            return Some(parsed.weekday());
        }
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.weekday());
    }
    None
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.trim().to_lowercase().as_str() {
        "monday" | "понедельник" => Some(Weekday::Mon),
        "tuesday" | "вторник" => Some(Weekday::Tue),
        "wednesday" | "среда" => Some(Weekday::Wed),
        "thursday" | "четверг" => Some(Weekday::Thu),
        "friday" | "пятница" => Some(Weekday::Fri),
        "saturday" | "суббота" => Some(Weekday::Sat),
        "sunday" | "воскресенье" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Stable order: weekday (unknown days last), then slot number, then
/// subject.
fn sort_lessons(lessons: &mut [ScheduleLesson]) {
    lessons.sort_by(|a, b| {
        day_rank(a)
            .cmp(&day_rank(b))
            .then_with(|| a.pair_no.cmp(&b.pair_no))
            .then_with(|| a.subject.cmp(&b.subject))
    });
}

fn day_rank(lesson: &ScheduleLesson) -> u32 {
    parse_weekday(&lesson.weekday)
        .map(|day| day.num_days_from_monday())
        .unwrap_or(7)
}

fn upcoming_lessons(lessons: &[ScheduleLesson], limit: usize) -> Vec<ScheduleLesson> {
    let mut sorted = lessons.to_vec();
    sort_lessons(&mut sorted);
    sorted.truncate(limit);
    sorted
}

fn lesson_time(lesson: &ScheduleLesson) -> String {
    let time = lesson.time.trim();
    if !time.is_empty() {
        time.to_string()
    } else if lesson.pair_no > 0 {
        format!("Slot #{}", lesson.pair_no)
    } else {
        "Time TBD".to_string()
    }
}

fn safe_text<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn format_lesson_line(index: usize, lesson: &ScheduleLesson) -> String {
    let time = lesson_time(lesson);
    let subject = safe_text(&lesson.subject, "Subject TBD");
    let room = safe_text(&lesson.room, "");
    let teacher = safe_text(&lesson.teacher, "");

    let mut meta = Vec::new();
    if !room.is_empty() {
        meta.push(room.to_string());
    }
    if !teacher.is_empty() {
        meta.push(format!("Lecturer {teacher}"));
    }
    if !lesson.groups.is_empty() {
        meta.push(format!("Groups: {}", lesson.groups.join(", ")));
    }

    let details = if meta.is_empty() {
        String::new()
    } else {
        format!(" ({})", meta.join("; "))
    };
    format!("{index}) {time} - {subject}{details}")
}

fn format_lesson_block(index: usize, lesson: &ScheduleLesson) -> String {
    let subject = safe_text(&lesson.subject, "Subject TBD");
    let room = safe_text(&lesson.room, "");
    let teacher = safe_text(&lesson.teacher, "");

    let mut lines = vec![format!("{index}) {}", lesson_time(lesson)), subject.to_string()];
    if !room.is_empty() {
        lines.push(room.to_string());
    }
    if !teacher.is_empty() {
        lines.push(teacher.to_string());
    }
    lines.join("\n")
}
