//! Line-oriented command surface used by the binary.

mod execute;

use std::{fmt::Write, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

pub use execute::execute;

use crate::{
    anniversary::{Anniversary, AnniversaryForm, BirthEntry, TargetEntry},
    audio::catalog,
    profile::{Language, UnknownLanguage},
    progress::{LifeProgress, format_countdown},
    timeline::{self, RemainingLabel, TimelineEntry},
    units::{TimeUnit, UnknownTimeUnit},
};

pub const PAGE_SIZE: usize = 10;

pub const HELP: &str = "\
Commands:
  birth <YYYY-MM-DD [HH:MM]|clear>      set or clear the birth date (noon by default)
  add <when> [alarm[:sound]] <name>     add an anniversary
  edit <id> <when> [alarm[:sound]] <name>
  remove <id>                           delete an anniversary
  unit <years|months|days|hours|minutes|seconds>
  next | prev                           page through units
  dismiss                               dismiss the ringing alarm
  hide <sponsored-id>                   never show a sponsored item again
  lang <en|ko|ja|de|sv>                 change language
  list [page]                           show the timeline
  status                                show the countdown
  help                                  show this text
  quit                                  exit
<when> is a date (2031-05-01) or an offset from now (+3m, +10d, +1m5d).
<id> may be any unique prefix of an anniversary id.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Birth(Option<BirthEntry>),
    Add(AnniversaryForm),
    Edit { id: String, form: AnniversaryForm },
    Remove { id: String },
    Unit(TimeUnit),
    Next,
    Prev,
    Dismiss,
    Hide { id: String },
    Lang(Language),
    List { page: usize },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    #[error("invalid offset `{0}`, expected e.g. +3m, +10d or +1m5d")]
    InvalidOffset(String),
    #[error("unknown alarm sound `{0}`")]
    UnknownSound(String),
    #[error("invalid page `{0}`")]
    InvalidPage(String),
    #[error(transparent)]
    Unit(#[from] UnknownTimeUnit),
    #[error(transparent)]
    Language(#[from] UnknownLanguage),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let args = words.collect::<Vec<_>>();

        // Free-text names make `add` and `edit` variadic; every other
        // command takes a fixed number of arguments.
        let (command, max_args) = match name.to_ascii_lowercase().as_str() {
            "birth" => (Command::Birth(parse_birth(&args)?), 2),
            "add" => return Ok(Command::Add(parse_form(&args)?)),
            "edit" => {
                let id = required(&args, 0, "anniversary id")?.to_owned();
                let form = parse_form(&args[1..])?;
                return Ok(Command::Edit { id, form });
            }
            "remove" | "rm" => (
                Command::Remove {
                    id: required(&args, 0, "anniversary id")?.to_owned(),
                },
                1,
            ),
            "unit" => (Command::Unit(required(&args, 0, "unit")?.parse()?), 1),
            "next" => (Command::Next, 0),
            "prev" => (Command::Prev, 0),
            "dismiss" => (Command::Dismiss, 0),
            "hide" => (
                Command::Hide {
                    id: required(&args, 0, "sponsored id")?.to_owned(),
                },
                1,
            ),
            "lang" => (Command::Lang(required(&args, 0, "language")?.parse()?), 1),
            "list" | "ls" => (
                Command::List {
                    page: parse_page(args.first().copied())?,
                },
                1,
            ),
            "status" => (Command::Status, 0),
            "help" | "?" => (Command::Help, 0),
            "quit" | "exit" => (Command::Quit, 0),
            other => return Err(CommandError::UnknownCommand(other.to_owned())),
        };

        match args.get(max_args) {
            Some(extra) => Err(CommandError::UnexpectedArgument((*extra).to_owned())),
            None => Ok(command),
        }
    }
}

fn required<'a>(args: &[&'a str], index: usize, what: &'static str) -> Result<&'a str, CommandError> {
    args.get(index).copied().ok_or(CommandError::MissingArgument(what))
}

/// `clear`, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
fn parse_birth(args: &[&str]) -> Result<Option<BirthEntry>, CommandError> {
    let date = match required(args, 0, "birth date")? {
        "clear" => {
            return match args.get(1) {
                Some(extra) => Err(CommandError::UnexpectedArgument((*extra).to_owned())),
                None => Ok(None),
            };
        }
        date => parse_date(date)?,
    };

    let entry = BirthEntry::new(date);
    Ok(Some(match args.get(1) {
        Some(time) => entry.at(parse_time(time)?),
        None => entry,
    }))
}

fn parse_time(value: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| CommandError::InvalidTime(value.to_owned()))
}

fn parse_date(value: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CommandError::InvalidDate(value.to_owned()))
}

fn parse_when(value: &str) -> Result<TargetEntry, CommandError> {
    match value.strip_prefix('+') {
        Some(offset) => parse_offset(offset).ok_or_else(|| CommandError::InvalidOffset(value.to_owned())),
        None => parse_date(value).map(TargetEntry::Date),
    }
}

/// `3m`, `10d`, `1m5d`: months first, then days, each at most once.
fn parse_offset(value: &str) -> Option<TargetEntry> {
    let (months, rest) = match value.split_once('m') {
        Some((months, rest)) => (months.parse().ok()?, rest),
        None => (0, value),
    };
    let days = match rest {
        "" => 0,
        rest => rest.strip_suffix('d')?.parse().ok()?,
    };

    if value.is_empty() {
        return None;
    }
    Some(TargetEntry::Offset { months, days })
}

fn parse_form(args: &[&str]) -> Result<AnniversaryForm, CommandError> {
    let entry = parse_when(required(args, 0, "date or offset")?)?;

    let mut rest = &args[1..];
    let alarm = match rest.first().copied() {
        Some("alarm") => Some(None),
        Some(word) => match word.strip_prefix("alarm:") {
            Some(sound) if catalog::find_sound(sound).is_some() => Some(Some(sound.to_owned())),
            Some(sound) => return Err(CommandError::UnknownSound(sound.to_owned())),
            None => None,
        },
        None => None,
    };
    if alarm.is_some() {
        rest = &rest[1..];
    }

    if rest.is_empty() {
        return Err(CommandError::MissingArgument("name"));
    }

    let form = AnniversaryForm::new(rest.join(" "), entry);
    Ok(match alarm {
        Some(sound) => form.with_alarm(sound),
        None => form,
    })
}

/// Pages are numbered from 1 for the user and from 0 internally.
fn parse_page(value: Option<&str>) -> Result<usize, CommandError> {
    let Some(value) = value else {
        return Ok(0);
    };

    match value.parse::<usize>() {
        Ok(page) if page > 0 => Ok(page - 1),
        _ => Err(CommandError::InvalidPage(value.to_owned())),
    }
}

pub fn render_progress(progress: Option<&LifeProgress>, unit: TimeUnit) -> String {
    match progress {
        Some(progress) => format!(
            "{} {} left ({:.4}% remaining)",
            format_countdown(progress.remaining(unit), unit),
            unit,
            progress.percentage
        ),
        None => "No birth date set. Use `birth YYYY-MM-DD [HH:MM]`.".to_owned(),
    }
}

pub fn render_remaining(label: RemainingLabel) -> String {
    match label {
        RemainingLabel::Ended => "ended".to_owned(),
        RemainingLabel::Days(days) => format!("in {} days", days),
        RemainingLabel::Hours(hours) => format!("in {} hours", hours),
        RemainingLabel::Minutes(minutes) => format!("in {} minutes", minutes),
    }
}

pub fn render_anniversary(anniversary: &Anniversary, now: DateTime<Utc>) -> String {
    let alarm = if anniversary.alarm_enabled {
        let sound = anniversary.alarm_sound_id.as_deref().unwrap_or(catalog::DEFAULT_SOUND_ID);
        format!(" [alarm: {}]", sound)
    } else {
        String::new()
    };

    format!(
        "{:.8}  {}  {}  {}{}",
        anniversary.id.as_str(),
        anniversary.target.format("%Y-%m-%d %H:%M"),
        anniversary.name,
        render_remaining(timeline::remaining_label(anniversary.target, now)),
        alarm
    )
}

pub fn render_timeline(entries: &[TimelineEntry], page: usize, now: DateTime<Utc>) -> String {
    let pages = timeline::page_count(entries.len(), PAGE_SIZE);
    if pages == 0 {
        return "No upcoming anniversaries. Use `add` to create one.".to_owned();
    }

    let mut out = String::new();
    for entry in timeline::page(entries, page, PAGE_SIZE) {
        let line = match entry {
            TimelineEntry::Anniversary(anniversary) => render_anniversary(anniversary, now),
            TimelineEntry::Sponsored(sponsored) => format!(
                "  ad  {}  {} ({})",
                sponsored.item.id, sponsored.item.headline, sponsored.item.advertiser_name
            ),
        };
        let _ = writeln!(out, "{}", line);
    }
    let _ = write!(out, "page {}/{}", (page + 1).min(pages), pages);

    out
}

pub fn render_fired(anniversary: &Anniversary) -> String {
    format!(
        "*** {} is here! Type `dismiss` to stop the alarm. ***",
        anniversary.name
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{anniversary::AnniversaryId, sponsored::SponsoredItem, timeline::SponsoredEntry};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!("next".parse::<Command>(), Ok(Command::Next));
        assert_eq!(" PREV ".parse::<Command>(), Ok(Command::Prev));
        assert_eq!("unit hours".parse::<Command>(), Ok(Command::Unit(TimeUnit::Hours)));
        assert_eq!("lang ko".parse::<Command>(), Ok(Command::Lang(Language::Ko)));
        assert_eq!("list".parse::<Command>(), Ok(Command::List { page: 0 }));
        assert_eq!("list 3".parse::<Command>(), Ok(Command::List { page: 2 }));
        assert_eq!("birth clear".parse::<Command>(), Ok(Command::Birth(None)));
    }

    #[test]
    fn birth_defaults_to_noon_and_keeps_a_typed_time() {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let dawn = NaiveTime::from_hms_opt(5, 40, 0).unwrap();

        assert_eq!(
            "birth 1990-04-12".parse(),
            Ok(Command::Birth(Some(BirthEntry {
                date: date(1990, 4, 12),
                time: noon
            })))
        );
        assert_eq!(
            "birth 1990-04-12 05:40".parse(),
            Ok(Command::Birth(Some(BirthEntry::new(date(1990, 4, 12)).at(dawn))))
        );
        assert_eq!(
            "birth 1990-04-12 25:00".parse::<Command>(),
            Err(CommandError::InvalidTime("25:00".to_owned()))
        );
    }

    #[test]
    fn trailing_arguments_are_rejected() {
        let unexpected = |word: &str| Err(CommandError::UnexpectedArgument(word.to_owned()));

        assert_eq!("birth 1990-04-12 05:40 UTC".parse::<Command>(), unexpected("UTC"));
        assert_eq!("birth clear now".parse::<Command>(), unexpected("now"));
        assert_eq!("remove 3f2a 9b1c".parse::<Command>(), unexpected("9b1c"));
        assert_eq!("unit days hours".parse::<Command>(), unexpected("hours"));
        assert_eq!("hide ad-1 ad-2".parse::<Command>(), unexpected("ad-2"));
        assert_eq!("lang ko en".parse::<Command>(), unexpected("en"));
        assert_eq!("list 2 3".parse::<Command>(), unexpected("3"));
        assert_eq!("next 2".parse::<Command>(), unexpected("2"));
        assert_eq!("prev please".parse::<Command>(), unexpected("please"));
        assert_eq!("dismiss all".parse::<Command>(), unexpected("all"));
        assert_eq!("status now".parse::<Command>(), unexpected("now"));
        assert_eq!("help add".parse::<Command>(), unexpected("add"));
        assert_eq!("quit now".parse::<Command>(), unexpected("now"));
    }

    #[test]
    fn names_may_span_several_words() {
        let command = "add +3d Dinner with the whole family".parse::<Command>().unwrap();

        assert_eq!(
            command,
            Command::Add(AnniversaryForm::new(
                "Dinner with the whole family",
                TargetEntry::Offset { months: 0, days: 3 }
            ))
        );
    }

    #[test]
    fn parses_add_with_offset_and_alarm_sound() {
        let command = "add +1m5d alarm:chime Mom's birthday".parse::<Command>().unwrap();

        let expected = AnniversaryForm::new("Mom's birthday", TargetEntry::Offset { months: 1, days: 5 })
            .with_alarm(Some("chime".to_owned()));
        assert_eq!(command, Command::Add(expected));
    }

    #[test]
    fn parses_edit_with_date_and_default_alarm() {
        let command = "edit 3f2a 2031-01-01 alarm New year".parse::<Command>().unwrap();

        let expected = AnniversaryForm::new("New year", TargetEntry::Date(date(2031, 1, 1))).with_alarm(None);
        assert_eq!(
            command,
            Command::Edit {
                id: "3f2a".to_owned(),
                form: expected
            }
        );
    }

    #[test]
    fn offsets_accept_either_part() {
        assert_eq!(parse_offset("3m"), Some(TargetEntry::Offset { months: 3, days: 0 }));
        assert_eq!(parse_offset("10d"), Some(TargetEntry::Offset { months: 0, days: 10 }));
        assert_eq!(parse_offset(""), None);
        assert_eq!(parse_offset("5"), None);
        assert_eq!(parse_offset("d"), None);
        assert_eq!(parse_offset("2d3m"), None);
    }

    #[test]
    fn reports_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "fly".parse::<Command>(),
            Err(CommandError::UnknownCommand("fly".to_owned()))
        );
        assert_eq!(
            "add +3d".parse::<Command>(),
            Err(CommandError::MissingArgument("name"))
        );
        assert_eq!(
            "add 2031-02-30 Nope".parse::<Command>(),
            Err(CommandError::InvalidDate("2031-02-30".to_owned()))
        );
        assert_eq!(
            "add +3x Nope".parse::<Command>(),
            Err(CommandError::InvalidOffset("+3x".to_owned()))
        );
        assert_eq!(
            "add +3d alarm:kazoo Party".parse::<Command>(),
            Err(CommandError::UnknownSound("kazoo".to_owned()))
        );
        assert_eq!(
            "list 0".parse::<Command>(),
            Err(CommandError::InvalidPage("0".to_owned()))
        );
        assert!(matches!("unit decades".parse::<Command>(), Err(CommandError::Unit(_))));
        assert!(matches!("lang fr".parse::<Command>(), Err(CommandError::Language(_))));
    }

    #[test]
    fn renders_timeline_pages() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let anniversary = Anniversary {
            id: AnniversaryId::from("0123456789abcdef"),
            name: "Launch".to_owned(),
            target: now + TimeDelta::days(3),
            alarm_enabled: true,
            alarm_triggered: false,
            alarm_sound_id: None,
        };
        let entries = vec![
            TimelineEntry::Anniversary(anniversary.clone()),
            TimelineEntry::Sponsored(SponsoredEntry {
                item: SponsoredItem {
                    id: "ad-1".to_owned(),
                    headline: "Test Ad".to_owned(),
                    body: String::new(),
                    image_ref: None,
                    call_to_action: String::new(),
                    advertiser_name: "Sponsored".to_owned(),
                },
                date: anniversary.target + TimeDelta::seconds(1),
            }),
        ];

        let rendered = render_timeline(&entries, 0, now);

        assert_eq!(
            rendered,
            "01234567  2030-01-04 00:00  Launch  in 3 days [alarm: zen]\n  ad  ad-1  Test Ad (Sponsored)\npage 1/1"
        );
        assert_eq!(
            render_timeline(&[], 0, now),
            "No upcoming anniversaries. Use `add` to create one."
        );
    }

    #[test]
    fn renders_missing_progress_hint() {
        assert!(render_progress(None, TimeUnit::Days).contains("birth"));
    }
}
