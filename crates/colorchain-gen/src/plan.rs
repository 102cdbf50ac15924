//! Experiment plan: which (variant, instance, seed) jobs to queue.

use std::path::{Path, PathBuf};

use colorchain_core::job::DEFAULT_PROGRAM;
use colorchain_core::naming::TBT_DIR;
use colorchain_core::{JobSpec, ParamMap};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to read plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid plan {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Plan has no {0}")]
    Empty(&'static str),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Seeds either as a count (`20` means 0..20) or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Seeds {
    Count(u64),
    List(Vec<u64>),
}

impl Seeds {
    pub fn values(&self) -> Vec<u64> {
        match self {
            Self::Count(count) => (0..*count).collect(),
            Self::List(seeds) => seeds.clone(),
        }
    }
}

/// A named solver configuration; its name is the output subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variant {
    pub name: String,
    pub parameters: String,
}

/// A benchmark instance with its starting color budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instance {
    pub name: String,
    pub nb_colors: u32,
    pub nb_iterations: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plan {
    #[serde(default = "default_program")]
    pub program: String,
    pub output_directory: PathBuf,
    pub time_limit: u64,
    #[serde(default = "default_use_target")]
    pub use_target: bool,
    pub rand_seeds: Seeds,
    pub variants: Vec<Variant>,
    pub instances: Vec<Instance>,
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_use_target() -> bool {
    true
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let plan: Plan = serde_json::from_str(&text).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.variants.is_empty() {
            return Err(PlanError::Empty("variants"));
        }
        if self.instances.is_empty() {
            return Err(PlanError::Empty("instances"));
        }
        if self.rand_seeds.values().is_empty() {
            return Err(PlanError::Empty("rand_seeds"));
        }
        Ok(())
    }

    pub fn variant_dir(&self, variant: &Variant) -> PathBuf {
        self.output_directory.join(&variant.name)
    }

    /// Every job, variant-major, then instance, then seed.
    pub fn jobs(&self) -> Vec<JobSpec> {
        let seeds = self.rand_seeds.values();
        let mut jobs = Vec::with_capacity(self.variants.len() * self.instances.len() * seeds.len());
        for variant in &self.variants {
            let output_directory = self.variant_dir(variant).display().to_string();
            for instance in &self.instances {
                for &seed in &seeds {
                    jobs.push(JobSpec {
                        program: self.program.clone(),
                        instance: instance.name.clone(),
                        nb_colors: instance.nb_colors,
                        use_target: Some(self.use_target.to_string()),
                        rand_seed: seed,
                        time_limit: Some(self.time_limit),
                        nb_iterations: Some(instance.nb_iterations),
                        parameters: Some(variant.parameters.clone()),
                        output_directory: output_directory.clone(),
                        extra: ParamMap::new(),
                    });
                }
            }
        }
        jobs
    }

    /// Create `<output_directory>/<variant>/tbt` for every variant.
    pub fn create_output_dirs(&self) -> Result<(), PlanError> {
        for variant in &self.variants {
            let dir = self.variant_dir(variant).join(TBT_DIR);
            std::fs::create_dir_all(&dir).map_err(|source| PlanError::Io { path: dir, source })?;
        }
        Ok(())
    }

    /// Write the queue file, one command line per job.
    pub fn write_queue(&self, queue_path: &Path) -> Result<usize, PlanError> {
        let jobs = self.jobs();
        let mut contents = String::new();
        for job in &jobs {
            contents.push_str(&job.to_command_line());
            contents.push('\n');
        }
        std::fs::write(queue_path, contents).map_err(|source| PlanError::Io {
            path: queue_path.to_path_buf(),
            source,
        })?;
        Ok(jobs.len())
    }
}
