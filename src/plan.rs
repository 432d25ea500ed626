//! Building dated job queues.
//!
//! A plan is a command template run once per day over a date range. Each day
//! becomes one job whose id is the day formatted as `YYYYMMDD`.

use chrono::{Days, NaiveDate};

use crate::error::{Result, RunnerError};
use crate::scheduler::{Job, JobQueue};

/// Placeholders understood by [`format_command`].
const PLACEHOLDERS: [(&str, &str); 2] = [("{yyyymmdd}", "%Y%m%d"), ("{yyyy-mm-dd}", "%Y-%m-%d")];

/// Days from `start` up to but not including `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<impl Iterator<Item = NaiveDate>> {
    if end < start {
        return Err(RunnerError::InvalidDateRange { start, end });
    }
    let days = (end - start).num_days() as u64;
    Ok((0..days).filter_map(move |n| start.checked_add_days(Days::new(n))))
}

/// Substitute the date placeholders in `template` with `day`.
pub fn format_command(template: &str, day: NaiveDate) -> String {
    PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |cmd, &(placeholder, format)| {
            if cmd.contains(placeholder) {
                cmd.replace(placeholder, &day.format(format).to_string())
            } else {
                cmd
            }
        })
}

/// Job id for a day
pub fn job_id(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Add one job per day in `[start, end)` to `queue`. Returns the number added.
pub fn populate(
    queue: &mut JobQueue,
    start: NaiveDate,
    end: NaiveDate,
    template: &str,
) -> Result<usize> {
    let mut added = 0;
    for day in date_range(start, end)? {
        queue.add(Job::new(job_id(day), format_command(template, day)))?;
        added += 1;
    }
    tracing::info!(queue = %queue.name(), added, %start, %end, "Populated queue");
    Ok(added)
}

/// Parse a manually specified job of the form `ID=COMMAND`.
pub fn parse_job_spec(spec: &str) -> Result<Job> {
    match spec.split_once('=') {
        Some((id, command)) if !id.trim().is_empty() && !command.trim().is_empty() => {
            Ok(Job::new(id.trim(), command))
        }
        _ => Err(RunnerError::InvalidJobSpec(spec.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_excludes_end() {
        let days: Vec<_> = date_range(day(2018, 1, 1), day(2018, 1, 4)).unwrap().collect();
        assert_eq!(days, vec![day(2018, 1, 1), day(2018, 1, 2), day(2018, 1, 3)]);
    }

    #[test]
    fn date_range_crosses_month_and_leap_day() {
        let days: Vec<_> = date_range(day(2020, 2, 28), day(2020, 3, 2)).unwrap().collect();
        assert_eq!(days, vec![day(2020, 2, 28), day(2020, 2, 29), day(2020, 3, 1)]);
    }

    #[test]
    fn empty_and_reversed_ranges() {
        assert_eq!(date_range(day(2018, 1, 1), day(2018, 1, 1)).unwrap().count(), 0);
        let err = date_range(day(2018, 1, 2), day(2018, 1, 1)).err().unwrap();
        assert!(matches!(err, RunnerError::InvalidDateRange { .. }));
    }

    #[test]
    fn format_command_substitutes_all_placeholders() {
        let cmd = format_command(
            "loadDate -db TAQ -date {yyyymmdd} --iso {yyyy-mm-dd} --again {yyyymmdd}",
            day(2018, 1, 9),
        );
        assert_eq!(
            cmd,
            "loadDate -db TAQ -date 20180109 --iso 2018-01-09 --again 20180109"
        );
    }

    #[test]
    fn format_command_without_placeholders_is_unchanged() {
        assert_eq!(format_command("echo hi", day(2018, 1, 1)), "echo hi");
    }

    #[test]
    fn populate_creates_one_job_per_day() {
        let mut queue = JobQueue::new("test");
        let added = populate(
            &mut queue,
            day(2018, 1, 1),
            day(2018, 1, 11),
            "echo Hello, today is {yyyymmdd}",
        )
        .unwrap();

        assert_eq!(added, 10);
        assert_eq!(queue.len(), 10);
        assert_eq!(queue.ids().first(), Some(&"20180101"));
        assert_eq!(queue.ids().last(), Some(&"20180110"));
        assert_eq!(
            queue.get("20180105").unwrap().command(),
            "echo Hello, today is 20180105"
        );
    }

    #[test]
    fn populate_rejects_overlapping_days() {
        let mut queue = JobQueue::new("test");
        populate(&mut queue, day(2018, 1, 1), day(2018, 1, 3), "echo {yyyymmdd}").unwrap();
        let err = populate(&mut queue, day(2018, 1, 2), day(2018, 1, 4), "echo {yyyymmdd}")
            .unwrap_err();
        assert!(matches!(err, RunnerError::DuplicateJob(id) if id == "20180102"));
    }

    #[test]
    fn parse_job_spec_variants() {
        let job = parse_job_spec("99999999=echo Manually added job").unwrap();
        assert_eq!(job.id(), "99999999");
        assert_eq!(job.command(), "echo Manually added job");

        let job = parse_job_spec("x=a=b").unwrap();
        assert_eq!(job.command(), "a=b");

        assert!(parse_job_spec("no-separator").is_err());
        assert!(parse_job_spec("=echo").is_err());
        assert!(parse_job_spec("id=").is_err());
    }
}
