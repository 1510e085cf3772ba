use super::Instant;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
}

impl InnerTimer {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }
}

/// A flat collection of named phase timers, kept in first-use order.
#[derive(Debug, Default, Clone)]
pub(crate) struct Timers {
    timers: Vec<(&'static str, InnerTimer)>,
}

impl Timers {
    fn entry(&mut self, key: &'static str) -> &mut InnerTimer {
        let pos = match self.timers.iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                self.timers.push((key, InnerTimer::default()));
                self.timers.len() - 1
            }
        };
        &mut self.timers[pos].1
    }

    pub fn start(&mut self, key: &'static str) {
        self.entry(key).start();
    }

    pub fn stop(&mut self, key: &'static str) {
        self.entry(key).stop();
    }

    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.timers
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(Duration::ZERO, |(_, t)| t.elapsed)
    }

    pub fn total_time(&self) -> Duration {
        self.timers
            .iter()
            .fold(Duration::ZERO, |acc, (_, t)| acc + t.elapsed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.timers.iter().map(|(k, t)| (*k, t.elapsed))
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {
        $timer.start($key);
        $(
            $tt
        )+
        $timer.stop($key);
    }
}
pub(crate) use timeit;

#[test]
fn test_timers() {
    let mut timers = Timers::default();
    timeit! {timers => "first"; {
        std::thread::sleep(Duration::from_millis(2));
    }}
    timeit! {timers => "second"; {
        let _x = 1 + 1;
    }}
    assert!(timers.elapsed("first") >= Duration::from_millis(2));
    assert_eq!(timers.elapsed("missing"), Duration::ZERO);
    let keys: Vec<_> = timers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["first", "second"]);
    assert!(timers.total_time() >= timers.elapsed("first"));
}
