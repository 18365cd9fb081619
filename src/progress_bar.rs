//! Event-count progress display for `Generator::generate`'s
//! acceptance/rejection loop
//!
//! The loop's own `log::info!`/`log::warn!` calls (grid-maximum raises,
//! efficiency summaries) would otherwise scroll the bar off-screen, so
//! showing it at all means muting the logger for its lifetime.

/// A backend a progress bar can be rendered through
trait ProgressBackend {
    fn inc(&self, i: u64);
    fn finish(&self);
}

impl ProgressBackend for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl ProgressBackend for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Renders through `indicatif` on an attended terminal, `logbar`
/// otherwise, or nothing at all below `Info` level (`debug`-level runs
/// want every `VegasIntegrator` iteration line, not a bar overwriting them)
#[derive(Default)]
pub struct ProgressBar {
    backend: Option<Box<dyn ProgressBackend>>,
    muted_level: Option<log::LevelFilter>,
}

impl ProgressBar {
    pub fn new(num_events: u64, message: &str) -> Self {
        if log::max_level().to_level() != Some(log::Level::Info) {
            return ProgressBar::default();
        }
        let muted_level = Some(log::max_level());
        let backend: Box<dyn ProgressBackend> = if console::Term::stderr().features().is_attended() {
            Box::new(Self::indicatif_bar(num_events, message))
        } else {
            Box::new(Self::logbar_bar(num_events, message))
        };
        log::set_max_level(log::LevelFilter::Off);
        ProgressBar {
            backend: Some(backend),
            muted_level,
        }
    }

    pub fn inc(&self, events_accepted: u64) {
        if let Some(backend) = &self.backend {
            backend.inc(events_accepted);
        }
    }

    pub fn finish(&self) {
        if let Some(backend) = &self.backend {
            backend.finish();
        }
        if let Some(level) = self.muted_level {
            log::set_max_level(level);
        }
    }

    fn indicatif_bar(num_events: u64, message: &str) -> indicatif::ProgressBar {
        let bar = indicatif::ProgressBar::new(num_events);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]")
                .expect("valid progress bar template"),
        );
        bar.set_message(message.to_owned());
        bar
    }

    fn logbar_bar(num_events: u64, message: &str) -> logbar::ProgressBar {
        eprintln!("{message}");
        let style = logbar::Style::new().indicator('█');
        logbar::ProgressBar::with_style(num_events as usize, style)
    }
}
