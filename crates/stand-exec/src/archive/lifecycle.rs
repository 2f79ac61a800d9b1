//! Version extraction from the application lifecycle log.
//!
//! The log gets a start line on every application start; the last one in the
//! file describes the version running when the diagnostics were collected.

use std::sync::LazyLock;

use regex::Regex;
use stand_model::VersionInfo;

static START_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} INFO  start - CDI application \[([\w ]+) ([0-9\.]+)-SNAPSHOT (?:.*?)\(([0-9a-z]+), core ([0-9a-z]+)\)\] \[(?:.*?)\] started in \d+ s\.$",
    )
    .ok()
});

static LISTENER_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} INFO  LifecycleEventListener - CDI application \[([\w ]+) ([0-9\.]+)-SNAPSHOT (?:.*?)\(([0-9a-z]+), core ([0-9a-z]+)\)\] \[[0-9\.]+\] started in \d+ s\.",
    )
    .ok()
});

/// Version of the last start recorded in `log`, with the customer name as reported.
pub fn last_started_version(log: &str) -> Option<VersionInfo> {
    log.lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            [&START_LINE, &LISTENER_LINE]
                .into_iter()
                .find_map(|re| re.as_ref()?.captures(line))
        })
        .last()
        .map(|caps| VersionInfo {
            customer_name: caps[1].trim().to_string(),
            factor_version: caps[2].to_string(),
            customer_revision: caps[3].to_string(),
            core_revision: caps[4].to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
2021-02-01 10:00:00,001 INFO  start - CDI application [Demo 21.18-SNAPSHOT (aaaa1111, core bbbb2222)] [x] started in 80 s.
2021-02-03 09:12:44,512 INFO  LifecycleEventListener - CDI application [Demo 21.19-SNAPSHOT build 7 (01fbd6f4, core 2c980808)] [21.19.0] started in 95 s.
2021-02-04 11:00:00,000 INFO  migrate - Application migration finished
";

    #[test]
    fn last_start_wins() {
        let v = last_started_version(LOG).unwrap();
        assert_eq!(
            v,
            VersionInfo {
                core_revision: "2c980808".into(),
                customer_revision: "01fbd6f4".into(),
                customer_name: "Demo".into(),
                factor_version: "21.19".into(),
            }
        );
    }

    #[test]
    fn multi_word_customer_name() {
        let line = "2020-11-30 08:00:00,000 INFO  start - CDI application [Long Name 20.12-SNAPSHOT (eb02e922, core badfd026)] [node-1] started in 120 s.";
        let v = last_started_version(line).unwrap();
        assert_eq!(v.customer_name, "Long Name");
        assert_eq!(v.factor_version, "20.12");
        assert_eq!(v.customer_revision, "eb02e922");
        assert_eq!(v.core_revision, "badfd026");
    }

    #[test]
    fn no_start_line() {
        assert!(last_started_version("2021-02-04 11:00:00,000 INFO  stop - bye\n").is_none());
        assert!(last_started_version("").is_none());
    }
}
