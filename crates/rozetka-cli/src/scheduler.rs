//! Recurring harvest runs.
//!
//! Cron expressions use the six-field `sec min hour day-of-month month
//! day-of-week` form and are evaluated in UTC.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use rozetka_core::AppConfig;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

const WEEKDAYS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Wall-clock time of day, parsed from `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid time \"{s}\": expected HH:MM");
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily { at: TimeOfDay },
    /// `weekday` is 0 for Monday through 6 for Sunday.
    Weekly { weekday: u8, at: TimeOfDay },
    Monthly { day: u8, at: TimeOfDay },
}

impl Cadence {
    #[must_use]
    pub fn cron_expression(&self) -> String {
        match *self {
            Self::Daily { at } => format!("0 {} {} * * *", at.minute, at.hour),
            Self::Weekly { weekday, at } => format!(
                "0 {} {} * * {}",
                at.minute,
                at.hour,
                WEEKDAYS[usize::from(weekday.min(6))]
            ),
            Self::Monthly { day, at } => format!("0 {} {} {day} * *", at.minute, at.hour),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { at } => write!(f, "daily at {at} UTC"),
            Self::Weekly { weekday, at } => write!(
                f,
                "weekly on {} at {at} UTC",
                WEEKDAYS[usize::from((*weekday).min(6))]
            ),
            Self::Monthly { day, at } => write!(f, "monthly on day {day} at {at} UTC"),
        }
    }
}

/// Registers the harvest job and blocks until Ctrl-C.
///
/// A tick that fires while the previous run is still going is skipped.
pub async fn run_scheduled(config: AppConfig, cadence: Cadence) -> anyhow::Result<()> {
    let cron = cadence.cron_expression();
    let config = Arc::new(config);
    let running = Arc::new(Mutex::new(()));

    let mut scheduler = JobScheduler::new()
        .await
        .context("failed to create job scheduler")?;

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);
        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous harvest still running; skipping this tick");
                return;
            };
            tracing::info!("scheduler: starting harvest run");
            match crate::harvest::run_once(&config).await {
                Ok(()) => tracing::info!("scheduler: harvest run complete"),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: harvest run failed"),
            }
        })
    })
    .with_context(|| format!("invalid cron expression \"{cron}\""))?;

    scheduler.add(job).await.context("failed to register harvest job")?;
    scheduler.start().await.context("failed to start job scheduler")?;
    tracing::info!(%cadence, cron = %cron, "scheduler: harvest job registered; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("scheduler: shutting down");
    scheduler
        .shutdown()
        .await
        .context("failed to shut down job scheduler")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay { hour, minute }
    }

    #[test]
    fn time_of_day_parses_and_validates() {
        assert_eq!("14:30".parse::<TimeOfDay>().unwrap(), at(14, 30));
        assert_eq!(" 7:05 ".parse::<TimeOfDay>().unwrap(), at(7, 5));
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
        assert!("1230".parse::<TimeOfDay>().is_err());
        assert!("ab:cd".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_displays_zero_padded() {
        assert_eq!(at(7, 5).to_string(), "07:05");
    }

    #[test]
    fn daily_cron_runs_every_day() {
        let cadence = Cadence::Daily { at: at(14, 30) };
        assert_eq!(cadence.cron_expression(), "0 30 14 * * *");
    }

    #[test]
    fn weekly_cron_maps_zero_to_monday() {
        let monday = Cadence::Weekly {
            weekday: 0,
            at: at(9, 0),
        };
        let sunday = Cadence::Weekly {
            weekday: 6,
            at: at(9, 0),
        };
        assert_eq!(monday.cron_expression(), "0 0 9 * * MON");
        assert_eq!(sunday.cron_expression(), "0 0 9 * * SUN");
    }

    #[test]
    fn monthly_cron_pins_day_of_month() {
        let cadence = Cadence::Monthly {
            day: 31,
            at: at(23, 59),
        };
        assert_eq!(cadence.cron_expression(), "0 59 23 31 * *");
    }

    #[test]
    fn cadence_describes_itself() {
        let cadence = Cadence::Weekly {
            weekday: 4,
            at: at(8, 15),
        };
        assert_eq!(cadence.to_string(), "weekly on FRI at 08:15 UTC");
    }

    #[tokio::test]
    async fn every_cadence_builds_a_valid_job() {
        for cadence in [
            Cadence::Daily { at: at(0, 0) },
            Cadence::Weekly {
                weekday: 2,
                at: at(12, 0),
            },
            Cadence::Monthly {
                day: 1,
                at: at(3, 45),
            },
        ] {
            let cron = cadence.cron_expression();
            let job = Job::new_async(cron.as_str(), |_uuid, _lock| Box::pin(async {}));
            assert!(job.is_ok(), "{cron} rejected: {:?}", job.err());
        }
    }
}
