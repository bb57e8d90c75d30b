//! Runs every configuration of a benchmark.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use tracing::{info, warn};

use crate::config::{BenchmarkConfig, EvalConfig};
use crate::driver::{DriverOptions, EvaluationDriver};
use crate::error::Result;
use crate::evaluation::AggregateResult;
use crate::io::{DatasetFrames, TrajectoryPair};
use crate::system::{CancelToken, RenderContext};
use crate::tracking::TrackerFactory;

use super::report::{BatchReport, ConfigOutcome, ConfigReport};

pub struct BatchRunner<F: TrackerFactory> {
    config: BenchmarkConfig,
    factory: F,
    cancel: CancelToken,
}

impl<F> BatchRunner<F>
where
    F: TrackerFactory + Sync,
{
    pub fn new(config: BenchmarkConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Load the two shared ground-truth trajectories.
    pub fn load_trajectories(&self) -> Result<TrajectoryPair> {
        TrajectoryPair::load(
            self.config.primary_poses_path(),
            self.config.occluder_poses_path(),
            self.config.frame_count,
        )
    }

    /// Load the shared trajectories, then run every configuration. If the
    /// trajectories cannot be loaded, every configuration is reported as
    /// failed with the load error.
    pub fn run<R>(&self, mut on_report: R) -> BatchReport
    where
        R: FnMut(&ConfigReport),
    {
        match self.load_trajectories() {
            Ok(trajectories) => self.run_with(&trajectories, on_report),
            Err(e) => {
                warn!("Ground truth unavailable: {}", e);
                self.fail_all(&e.to_string(), &mut on_report)
            }
        }
    }

    /// Run every configuration against already-loaded trajectories.
    /// `on_report` sees each report in configuration order as soon as it and
    /// all earlier ones are done.
    pub fn run_with<R>(&self, trajectories: &TrajectoryPair, mut on_report: R) -> BatchReport
    where
        R: FnMut(&ConfigReport),
    {
        let configs = self.config.configs();
        let options = self.driver_options();
        info!(
            "Running {} configurations ({} frames each, {} worker(s))",
            configs.len(),
            self.config.frame_count,
            self.config.jobs
        );

        let reports = if self.config.jobs <= 1 {
            self.run_sequential(&configs, trajectories, &options, &mut on_report)
        } else {
            self.run_parallel(&configs, trajectories, &options, &mut on_report)
        };

        let report = BatchReport { reports };
        let failed = report.failed().count();
        if failed > 0 {
            warn!("{} of {} configurations failed", failed, report.reports.len());
        }
        report
    }

    /// Evaluate one configuration with a fresh tracker.
    pub fn run_config(
        &self,
        config: &EvalConfig,
        trajectories: &TrajectoryPair,
        options: &DriverOptions,
        render: &RenderContext,
    ) -> Result<AggregateResult> {
        info!("Evaluating {}", config.label());
        let setup = self.config.tracker_setup(config);
        let mut tracker = self.factory.create(config, &setup)?;
        let frames = DatasetFrames::new(&self.config.dataset_dir, &config.body, &config.sequence);

        EvaluationDriver::for_config(config, &mut tracker, &frames, trajectories, options)
            .run(render)
    }

    fn fail_all(&self, reason: &str, on_report: &mut dyn FnMut(&ConfigReport)) -> BatchReport {
        let mut reports = Vec::new();
        for config in self.config.configs() {
            if self.cancel.is_cancelled() {
                break;
            }
            let report = ConfigReport {
                config,
                outcome: ConfigOutcome::Failed(reason.to_string()),
            };
            on_report(&report);
            reports.push(report);
        }
        BatchReport { reports }
    }

    fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            frame_count: self.config.frame_count,
            undistort: self.config.undistort,
            evaluator: self.config.evaluator(),
            timeout: self.config.timeout_secs.map(Duration::from_secs),
            cancel: self.cancel.clone(),
        }
    }

    fn report(
        &self,
        config: &EvalConfig,
        trajectories: &TrajectoryPair,
        options: &DriverOptions,
        render: &RenderContext,
    ) -> ConfigReport {
        let outcome = match self.run_config(config, trajectories, options, render) {
            Ok(result) => ConfigOutcome::Completed(result),
            Err(e) => {
                warn!("{} failed: {}", config.label(), e);
                ConfigOutcome::Failed(e.to_string())
            }
        };
        ConfigReport {
            config: config.clone(),
            outcome,
        }
    }

    fn run_sequential(
        &self,
        configs: &[EvalConfig],
        trajectories: &TrajectoryPair,
        options: &DriverOptions,
        on_report: &mut dyn FnMut(&ConfigReport),
    ) -> Vec<ConfigReport> {
        let render = RenderContext::new("main");
        let mut reports = Vec::with_capacity(configs.len());
        for config in configs {
            if self.cancel.is_cancelled() {
                warn!("Batch cancelled, skipping remaining configurations");
                break;
            }
            let report = self.report(config, trajectories, options, &render);
            on_report(&report);
            reports.push(report);
        }
        reports
    }

    /// Configurations are pulled from a shared queue by `jobs` workers. Each
    /// worker owns its render context, so runs never share one.
    fn run_parallel(
        &self,
        configs: &[EvalConfig],
        trajectories: &TrajectoryPair,
        options: &DriverOptions,
        on_report: &mut dyn FnMut(&ConfigReport),
    ) -> Vec<ConfigReport> {
        let (job_tx, job_rx) = unbounded::<(usize, &EvalConfig)>();
        let (result_tx, result_rx) = unbounded::<(usize, ConfigReport)>();
        for job in configs.iter().enumerate() {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let mut reports = Vec::with_capacity(configs.len());
        thread::scope(|s| {
            for worker in 0..self.config.jobs.min(configs.len()) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    let render = RenderContext::new(format!("worker-{}", worker));
                    for (idx, config) in job_rx.iter() {
                        if self.cancel.is_cancelled() {
                            break;
                        }
                        let report = self.report(config, trajectories, options, &render);
                        if result_tx.send((idx, report)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            // Re-order: emit a report once all earlier ones are in.
            let mut pending = BTreeMap::new();
            let mut next = 0;
            for (idx, report) in result_rx.iter() {
                pending.insert(idx, report);
                while let Some(report) = pending.remove(&next) {
                    on_report(&report);
                    reports.push(report);
                    next += 1;
                }
            }
            // Only after cancellation can earlier configurations be missing.
            for report in pending.into_values() {
                on_report(&report);
                reports.push(report);
            }
        });

        if self.cancel.is_cancelled() {
            warn!("Batch cancelled, skipping remaining configurations");
        }
        reports
    }
}
