//! Benchmark configuration.
//!
//! A benchmark is described by a [`BenchmarkConfig`], usually loaded from a
//! YAML file. Missing keys fall back to the RBOT defaults:
//!
//! ```yaml
//! dataset_dir: /data/RBOT_dataset
//! frame_count: 1000
//! bodies: [bakingsoda, broccolisoup, clown, cube, koalacandy]
//! sequences:
//!   - name: a_regular
//!   - name: d_occlusion
//!     model_occlusions: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluation::pose_error::{DEFAULT_ROT_THRESHOLD_DEG, DEFAULT_TRANS_THRESHOLD};
use crate::evaluation::PoseErrorEvaluator;

/// Objects evaluated by default.
pub const DEFAULT_BODIES: [&str; 5] = ["bakingsoda", "broccolisoup", "clown", "cube", "koalacandy"];

/// Every object of the RBOT dataset.
pub const RBOT_BODIES: [&str; 18] = [
    "ape",
    "bakingsoda",
    "benchviseblue",
    "broccolisoup",
    "cam",
    "can",
    "cat",
    "clown",
    "cube",
    "driller",
    "duck",
    "eggbox",
    "glue",
    "iron",
    "koalacandy",
    "lamp",
    "phone",
    "squirrel",
];

/// Sequences evaluated by default, none with a modeled occluder.
pub const DEFAULT_SEQUENCES: [&str; 4] = ["a_regular", "b_dynamiclight", "c_noisy", "d_occlusion"];

/// One benchmark run: an object tracked through one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvalConfig {
    pub body: String,
    pub sequence: String,
    /// Also track the occluding body so its occlusions are modeled.
    pub model_occlusions: bool,
}

impl EvalConfig {
    pub fn new(
        body: impl Into<String>,
        sequence: impl Into<String>,
        model_occlusions: bool,
    ) -> Self {
        Self {
            body: body.into(),
            sequence: sequence.into(),
            model_occlusions,
        }
    }

    /// `"<sequence>[ (modeled)] - <body>"`.
    pub fn label(&self) -> String {
        let modeled = if self.model_occlusions { " (modeled)" } else { "" };
        format!("{}{} - {}", self.sequence, modeled, self.body)
    }

    /// Number of bodies the tracker has to follow.
    pub fn num_bodies(&self) -> usize {
        if self.model_occlusions { 2 } else { 1 }
    }
}

/// A sequence and whether its occluder is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSpec {
    pub name: String,
    #[serde(default)]
    pub model_occlusions: bool,
}

impl SequenceSpec {
    pub fn new(name: impl Into<String>, model_occlusions: bool) -> Self {
        Self {
            name: name.into(),
            model_occlusions,
        }
    }
}

/// Camera and renderer parameters forwarded to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    /// `[fx, fy, cx, cy]`
    pub intrinsics: [f64; 4],
    pub dist_coeffs: [f64; 4],
    pub z_near: f64,
    pub z_far: f64,
    /// Camera distances used to generate pose detection templates.
    pub template_distances: Vec<f64>,
    pub quality_threshold: f64,
}

impl CameraConfig {
    pub fn k(&self) -> Matrix3<f64> {
        let [fx, fy, cx, cy] = self.intrinsics;
        Matrix3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 512,
            intrinsics: [650.048, 647.183, 324.328, 257.323],
            dist_coeffs: [0.0; 4],
            z_near: 10.0,
            z_far: 10000.0,
            template_distances: vec![200.0, 400.0, 600.0],
            quality_threshold: 0.55,
        }
    }
}

/// Mesh of one tracked body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyModel {
    pub name: String,
    pub mesh_path: PathBuf,
}

/// Everything a tracker needs to be built for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSetup {
    pub camera: CameraConfig,
    /// Index `i` is the model of `BodyId(i)`.
    pub bodies: Vec<BodyModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub dataset_dir: PathBuf,
    /// Ground truth of the evaluated object, relative to `dataset_dir`.
    pub primary_poses: PathBuf,
    /// Ground truth of the occluding object, relative to `dataset_dir`.
    pub occluder_poses: PathBuf,
    /// Mesh of the occluding object, relative to `dataset_dir`.
    pub occluder_mesh: PathBuf,
    /// Evaluated frames per configuration (N); trajectories hold N + 1 poses.
    pub frame_count: usize,
    pub undistort: bool,
    pub trans_threshold: f64,
    pub rot_threshold_deg: f64,
    pub bodies: Vec<String>,
    pub sequences: Vec<SequenceSpec>,
    /// Worker threads; configurations are independent.
    pub jobs: usize,
    /// Per-configuration time limit.
    pub timeout_secs: Option<u64>,
    pub camera: CameraConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("RBOT_dataset"),
            primary_poses: PathBuf::from("poses_first.txt"),
            occluder_poses: PathBuf::from("poses_second.txt"),
            occluder_mesh: PathBuf::from("squirrel_small.obj"),
            frame_count: 1000,
            undistort: false,
            trans_threshold: DEFAULT_TRANS_THRESHOLD,
            rot_threshold_deg: DEFAULT_ROT_THRESHOLD_DEG,
            bodies: DEFAULT_BODIES.iter().map(|b| b.to_string()).collect(),
            sequences: DEFAULT_SEQUENCES
                .iter()
                .map(|s| SequenceSpec::new(*s, false))
                .collect(),
            jobs: 1,
            timeout_secs: None,
            camera: CameraConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// The complete RBOT matrix: all 18 objects, every sequence, plus the
    /// occlusion sequence with the occluder modeled.
    pub fn full_rbot() -> Self {
        let mut sequences: Vec<SequenceSpec> = DEFAULT_SEQUENCES
            .iter()
            .map(|s| SequenceSpec::new(*s, false))
            .collect();
        sequences.push(SequenceSpec::new("d_occlusion", true));

        Self {
            bodies: RBOT_BODIES.iter().map(|b| b.to_string()).collect(),
            sequences,
            ..Self::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: BenchmarkConfig =
            serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::Config("frame_count must be at least 1".into()));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".into()));
        }
        if self.bodies.is_empty() || self.sequences.is_empty() {
            return Err(Error::Config(
                "at least one body and one sequence are required".into(),
            ));
        }
        if !(self.trans_threshold >= 0.0 && self.rot_threshold_deg >= 0.0) {
            return Err(Error::Config("thresholds must be non-negative".into()));
        }
        Ok(())
    }

    pub fn evaluator(&self) -> PoseErrorEvaluator {
        PoseErrorEvaluator::with_degrees(self.trans_threshold, self.rot_threshold_deg)
    }

    pub fn primary_poses_path(&self) -> PathBuf {
        self.dataset_dir.join(&self.primary_poses)
    }

    pub fn occluder_poses_path(&self) -> PathBuf {
        self.dataset_dir.join(&self.occluder_poses)
    }

    /// Every object against every sequence, sequence-major. The occlusion
    /// flag comes from the sequence.
    pub fn configs(&self) -> Vec<EvalConfig> {
        self.sequences
            .iter()
            .flat_map(|seq| {
                self.bodies.iter().map(move |body| {
                    EvalConfig::new(body.clone(), seq.name.clone(), seq.model_occlusions)
                })
            })
            .collect()
    }

    pub fn tracker_setup(&self, config: &EvalConfig) -> TrackerSetup {
        let mut bodies = vec![BodyModel {
            name: config.body.clone(),
            mesh_path: self
                .dataset_dir
                .join(&config.body)
                .join(format!("{}.obj", config.body)),
        }];
        if config.model_occlusions {
            let name = self
                .occluder_mesh
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "occluder".to_string());
            bodies.push(BodyModel {
                name,
                mesh_path: self.dataset_dir.join(&self.occluder_mesh),
            });
        }

        TrackerSetup {
            camera: self.camera.clone(),
            bodies,
        }
    }
}
